// Common test utilities for bypassd integration tests
#![allow(dead_code)]

use bypassd::utils;
use bypassd::{Driver, DriverConfig};
use nix::sys::signal::Signal;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Com socket handed to helpers; fixtures never connect to it
pub const TEST_COM_SOCKET: &str = "/tmp/bypassd-test-com.sock";

/// Poll interval used by test drivers so failures surface quickly
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Path to a helper script under tests/fixtures, made executable.
pub fn fixture(name: &str) -> PathBuf {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let mut perms = std::fs::metadata(&path)
        .unwrap_or_else(|e| panic!("missing fixture {}: {}", path.display(), e))
        .permissions();
    if perms.mode() & 0o111 != 0o111 {
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod fixture");
    }
    path
}

pub fn test_config(helper: &str) -> DriverConfig {
    let mut config = DriverConfig::new(fixture(helper), TEST_COM_SOCKET);
    config.readiness.poll_interval = TEST_POLL_INTERVAL;
    config
}

pub fn test_driver(helper: &str) -> Driver {
    Driver::new(test_config(helper))
}

/// Container ID unique within this test binary.
pub fn unique_id(prefix: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!(
        "{}-{}-{}",
        prefix,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

/// Kill and reap a helper the driver no longer tracks.
pub fn reap(pid: u32) {
    if let Some(pid) = utils::to_pid(pid) {
        let _ = utils::send_signal(pid, Signal::SIGKILL);
        let _ = utils::wait_for_exit(pid);
    }
}
