// Focused CLI parsing tests (tests command-line parsing only, not business logic)

use bypassd::cli::Cli;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_flag_combinations_parse() {
    let test_cases = vec![
        vec!["bypassd"],
        vec!["bypassd", "--debug"],
        vec!["bypassd", "--socket", "/run/b.sock", "--com-socket", "/run/c.sock"],
        vec!["bypassd", "--helper", "/usr/local/bin/bypass4netns", "--tracer"],
        vec!["bypassd", "--handle-c2c-connections", "--stop-timeout-secs", "10"],
        vec!["bypassd", "--ready-timeout-secs", "30"],
        vec![
            "bypassd",
            "--multinode",
            "--multinode-etcd-address",
            "http://127.0.0.1:2379",
            "--multinode-host-address",
            "192.168.1.10",
        ],
    ];

    for args in test_cases {
        Cli::try_parse_from(&args).unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", args, e));
    }
}

#[test]
fn test_all_options() {
    let cli = Cli::try_parse_from([
        "bypassd",
        "--socket",
        "/run/user/1000/bypassd.sock",
        "--com-socket",
        "/run/user/1000/bypassd-com.sock",
        "--pid-file",
        "/run/user/1000/bypassd.pid",
        "--helper",
        "/opt/bin/bypass4netns",
        "--debug",
    ])
    .unwrap();

    assert_eq!(cli.socket, PathBuf::from("/run/user/1000/bypassd.sock"));
    assert_eq!(cli.com_socket, PathBuf::from("/run/user/1000/bypassd-com.sock"));
    assert_eq!(cli.pid_file, PathBuf::from("/run/user/1000/bypassd.pid"));
    assert_eq!(cli.helper, PathBuf::from("/opt/bin/bypass4netns"));
    assert!(cli.debug);
    assert!(!cli.tracer);
    assert!(!cli.multinode);
    assert!(cli.ready_timeout_secs.is_none());
}

#[test]
fn test_multinode_requires_addresses() {
    assert!(Cli::try_parse_from(["bypassd", "--multinode"]).is_err());
    assert!(Cli::try_parse_from([
        "bypassd",
        "--multinode",
        "--multinode-etcd-address",
        "http://127.0.0.1:2379",
    ])
    .is_err());
}

#[test]
fn test_invalid_timeout_rejected() {
    assert!(Cli::try_parse_from(["bypassd", "--stop-timeout-secs", "soon"]).is_err());
    assert!(Cli::try_parse_from(["bypassd", "--ready-timeout-secs", "-1"]).is_err());
}
