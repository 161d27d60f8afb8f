use nix::fcntl::OFlag;
use std::io;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::Command;
use tokio::net::unix::pipe;

/// Descriptor number the helper finds the write end of the ready pipe at.
pub const READY_FD: RawFd = 3;

/// Anonymous pipe a helper uses to announce it is operational.
///
/// Both ends are close-on-exec, so helpers spawned concurrently by other
/// callers never inherit a write end that is not theirs. The only copy that
/// survives exec is the one placed at [`READY_FD`] in our own child.
#[derive(Debug)]
pub struct ReadyPipe {
    read: OwnedFd,
    write: OwnedFd,
}

impl ReadyPipe {
    pub fn new() -> nix::Result<Self> {
        let (read, write) = nix::unistd::pipe2(OFlag::O_CLOEXEC)?;
        Ok(Self { read, write })
    }

    /// Make the write end show up as [`READY_FD`] in the spawned child.
    pub fn install(&self, cmd: &mut Command) {
        let fd = self.write.as_raw_fd();

        // SAFETY: pre_exec runs after fork() but before exec().
        // Only dup2 and fcntl are called, both async-signal-safe, and the
        // closure captures nothing but a plain integer.
        unsafe {
            cmd.pre_exec(move || {
                if fd == READY_FD {
                    // dup2 onto itself keeps FD_CLOEXEC, clear it directly
                    if libc::fcntl(fd, libc::F_SETFD, 0) == -1 {
                        return Err(io::Error::last_os_error());
                    }
                } else if libc::dup2(fd, READY_FD) == -1 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    /// Drop the parent's write end and return the read end for async reads.
    ///
    /// Once the child is the only holder of a write end, its death closes the
    /// pipe and the reader sees end-of-file instead of waiting forever.
    pub fn into_receiver(self) -> io::Result<pipe::Receiver> {
        let Self { read, write } = self;
        drop(write);
        pipe::Receiver::from_owned_fd(read)
    }
}
