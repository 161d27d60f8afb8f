use clap::Parser;
use std::path::PathBuf;

use crate::paths;

#[derive(Parser, Debug)]
#[command(
    name = "bypassd",
    version,
    about = "Supervisor daemon for per-container socket bypass helpers"
)]
pub struct Cli {
    /// Control API socket
    #[arg(long, env = "BYPASSD_SOCKET", default_value_os_t = paths::default_socket())]
    pub socket: PathBuf,

    /// Socket helpers report container interfaces to (passed to every helper)
    #[arg(long, env = "BYPASSD_COM_SOCKET", default_value_os_t = paths::default_com_socket())]
    pub com_socket: PathBuf,

    /// Where to write the daemon's pid
    #[arg(long, default_value_os_t = paths::default_pid_file())]
    pub pid_file: PathBuf,

    /// Bypass helper executable
    #[arg(long, env = "BYPASSD_HELPER", default_value = "bypass4netns")]
    pub helper: PathBuf,

    /// Debug logging, also passed on to helpers
    #[arg(long)]
    pub debug: bool,

    /// Let helpers short-circuit container-to-container connections
    #[arg(long)]
    pub handle_c2c_connections: bool,

    /// Enable connection tracing in helpers
    #[arg(long)]
    pub tracer: bool,

    /// Coordinate bypassed connections across hosts through etcd
    #[arg(long, requires_all = ["multinode_etcd_address", "multinode_host_address"])]
    pub multinode: bool,

    /// etcd endpoint for multinode mode
    #[arg(long, value_name = "ADDR")]
    pub multinode_etcd_address: Option<String>,

    /// Address other hosts reach this host at, for multinode mode
    #[arg(long, value_name = "ADDR")]
    pub multinode_host_address: Option<String>,

    /// Give up on a helper that has not reported ready after this many seconds
    /// (default: wait as long as it is alive)
    #[arg(long, value_name = "SECS")]
    pub ready_timeout_secs: Option<u64>,

    /// Send SIGKILL to a helper still running this many seconds after SIGTERM
    /// (default: only when waiting for it fails)
    #[arg(long, value_name = "SECS")]
    pub stop_timeout_secs: Option<u64>,
}
