//! Utility functions for helper process management.

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::io;
use std::path::Path;

/// Check if a process is alive by checking /proc/{pid} existence.
///
/// Zombies still have a /proc entry, so a helper that exited but was not
/// reaped yet counts as alive.
pub fn is_process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

/// Convert a recorded pid into a kernel pid.
///
/// Returns `None` for values that can never name a process (0 would address
/// our own process group, anything above `i32::MAX` is out of range).
pub fn to_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

pub fn send_signal(pid: Pid, sig: Signal) -> nix::Result<()> {
    signal::kill(pid, sig)
}

/// Non-blocking status check of a child process.
pub fn try_wait(pid: Pid) -> nix::Result<WaitStatus> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Err(Errno::EINTR) => continue,
            other => return other,
        }
    }
}

/// Block until the child process exits or is killed.
///
/// Stop/continue notifications are skipped. Fails with `ECHILD` if `pid` is
/// not (or no longer) our child.
pub fn wait_for_exit(pid: Pid) -> nix::Result<WaitStatus> {
    loop {
        match waitpid(pid, None) {
            Err(Errno::EINTR) => continue,
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                return Ok(status)
            }
            Ok(_) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Async version of [`wait_for_exit`] that runs the blocking wait on the
/// blocking thread pool.
pub async fn wait_for_exit_async(pid: Pid) -> io::Result<WaitStatus> {
    tokio::task::spawn_blocking(move || wait_for_exit(pid))
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_process_alive_current_process() {
        assert!(is_process_alive(std::process::id()));
    }

    #[test]
    fn test_is_process_alive_nonexistent() {
        // PID 4294967295 (u32::MAX) is extremely unlikely to exist
        assert!(!is_process_alive(u32::MAX));
    }

    #[test]
    fn test_to_pid() {
        assert_eq!(to_pid(42), Some(Pid::from_raw(42)));
        assert_eq!(to_pid(0), None);
        assert_eq!(to_pid(u32::MAX), None);
    }

    #[test]
    fn test_wait_for_exit_reaps_child() {
        let child = std::process::Command::new("true").spawn().unwrap();
        let pid = to_pid(child.id()).unwrap();

        let status = wait_for_exit(pid).unwrap();
        assert!(matches!(status, WaitStatus::Exited(p, 0) if p == pid));

        // Already reaped
        assert_eq!(wait_for_exit(pid), Err(Errno::ECHILD));
    }

    #[tokio::test]
    async fn test_wait_for_exit_async_signaled() {
        let child = std::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .unwrap();
        let pid = to_pid(child.id()).unwrap();

        send_signal(pid, Signal::SIGTERM).unwrap();
        let status = wait_for_exit_async(pid).await.unwrap();
        assert!(matches!(status, WaitStatus::Signaled(_, Signal::SIGTERM, _)));
    }

    #[test]
    fn test_try_wait_running_child() {
        let child = std::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .unwrap();
        let pid = to_pid(child.id()).unwrap();

        assert_eq!(try_wait(pid), Ok(WaitStatus::StillAlive));

        send_signal(pid, Signal::SIGKILL).unwrap();
        wait_for_exit(pid).unwrap();
    }
}
