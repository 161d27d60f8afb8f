use std::ffi::OsString;
use std::path::PathBuf;

/// Fallback when XDG_RUNTIME_DIR is not set
const FALLBACK_RUNTIME_DIR: &str = "/tmp";

/// Per-user runtime directory for sockets and the pid file
pub fn runtime_dir() -> PathBuf {
    runtime_dir_from(std::env::var_os("XDG_RUNTIME_DIR"))
}

fn runtime_dir_from(xdg: Option<OsString>) -> PathBuf {
    xdg.filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_RUNTIME_DIR))
}

/// Control API socket
pub fn default_socket() -> PathBuf {
    runtime_dir().join("bypassd.sock")
}

/// Socket helpers report interfaces to
pub fn default_com_socket() -> PathBuf {
    runtime_dir().join("bypassd-com.sock")
}

pub fn default_pid_file() -> PathBuf {
    runtime_dir().join("bypassd.pid")
}
