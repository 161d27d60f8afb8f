//! Error types for the bypass driver.

use nix::sys::signal::Signal;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`Driver`](crate::driver::Driver) operations.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to spawn helper {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create ready pipe: {0}")]
    ReadyPipe(#[source] nix::Error),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error("bypass session {0} not found")]
    NotFound(String),

    #[error("failed to send {signal} to pid {pid}: {source}")]
    Signal {
        pid: u32,
        signal: Signal,
        #[source]
        source: nix::Error,
    },

    #[error("no process handle for pid {pid}")]
    ProcessLookup { pid: u32 },
}

/// Terminal failures of the ready-pipe handshake.
#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("helper process failed to start (exit code {code})")]
    Exited { code: i32 },

    #[error("helper process was killed by {signal}")]
    Signaled { signal: Signal },

    #[error("failed to read from ready pipe: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to read helper process status: {0}")]
    Status(#[source] nix::Error),

    #[error("helper process not ready after {0:?}")]
    TimedOut(Duration),
}

impl DriverError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DriverError::NotFound(_))
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;
