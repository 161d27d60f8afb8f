//! Ready-pipe handshake with a freshly spawned helper.
//!
//! The helper writes anything to the descriptor it was handed once it is
//! operational. Until then the supervisor reads the pipe in fixed slices and,
//! between slices, checks whether the helper already died.

pub mod pipe;

pub use pipe::{ReadyPipe, READY_FD};

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::io::ErrorKind;
use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe::Receiver;
use tokio::time::{sleep, timeout, Duration, Instant};
use tracing::{debug, info};

use crate::error::ReadinessError;
use crate::utils;

/// Length of one read slice between liveness checks
pub const READY_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessOptions {
    pub poll_interval: Duration,
    /// Give up after this long. `None` waits for as long as the helper lives.
    pub timeout: Option<Duration>,
}

impl Default for ReadinessOptions {
    fn default() -> Self {
        Self {
            poll_interval: READY_POLL_INTERVAL,
            timeout: None,
        }
    }
}

/// Block until the helper `pid` reports ready on `ready` or is proven dead.
pub async fn wait_for_ready(
    pid: Pid,
    ready: &mut Receiver,
    opts: ReadinessOptions,
) -> Result<(), ReadinessError> {
    let started = Instant::now();
    let mut buf = [0u8; 16];
    let mut pipe_open = true;

    loop {
        let slice = match opts.timeout {
            Some(limit) => opts
                .poll_interval
                .min(limit.saturating_sub(started.elapsed())),
            None => opts.poll_interval,
        };

        if pipe_open {
            match timeout(slice, ready.read(&mut buf)).await {
                Ok(Ok(0)) => {
                    // Every write end is gone, only the liveness check is left
                    debug!(pid = %pid, "ready pipe closed without data");
                    pipe_open = false;
                }
                Ok(Ok(n)) => {
                    info!(pid = %pid, bytes = n, "helper reported ready");
                    return Ok(());
                }
                Ok(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Ok(Err(e)) => return Err(ReadinessError::Read(e)),
                Err(_) => {}
            }
        } else {
            sleep(slice).await;
        }

        match utils::try_wait(pid).map_err(ReadinessError::Status)? {
            WaitStatus::Exited(_, code) => return Err(ReadinessError::Exited { code }),
            WaitStatus::Signaled(_, signal, _) => {
                return Err(ReadinessError::Signaled { signal })
            }
            status => debug!(pid = %pid, ?status, "helper not ready yet"),
        }

        if let Some(limit) = opts.timeout {
            if started.elapsed() >= limit {
                return Err(ReadinessError::TimedOut(limit));
            }
        }
    }
}
