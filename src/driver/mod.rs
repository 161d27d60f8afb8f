//! Supervisor for bypass helper processes.
//!
//! One helper runs per container ID. [`Driver::start_bypass`] only returns
//! once the helper has reported ready over its ready pipe, and
//! [`Driver::stop_bypass`] escalates from SIGTERM to SIGKILL when the helper
//! cannot be waited on.
//!
//! Lock domains:
//! - the bypass registry, held exclusively for the whole stop sequence so
//!   two stops of one ID cannot both signal the helper
//! - the interface registry, taken separately and only for single updates

pub mod args;

pub use args::build_args;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DriverError, ReadinessError, Result};
use crate::readiness::{wait_for_ready, ReadinessOptions, ReadyPipe, READY_FD};
use crate::registry::{BypassRegistry, InterfaceRegistry};
use crate::types::{truncate_id, BypassSpec, BypassStatus, ContainerInterfaces};
use crate::utils;

/// Container IDs are shortened to this many characters in logs
pub(crate) const LOG_ID_LEN: usize = 12;

/// Cross-host coordination settings handed to every helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultinodeConfig {
    pub etcd_address: String,
    pub host_address: String,
}

/// Process-wide settings applied to every helper the driver starts.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Helper executable
    pub helper_path: PathBuf,
    /// Socket helpers report their interfaces to
    pub com_socket_path: PathBuf,
    pub debug: bool,
    pub handle_c2c: bool,
    pub tracer: bool,
    pub multinode: Option<MultinodeConfig>,
    pub readiness: ReadinessOptions,
    /// Grace period between SIGTERM and SIGKILL. `None` only escalates when
    /// waiting for the helper fails.
    pub stop_timeout: Option<Duration>,
}

impl DriverConfig {
    pub fn new(helper_path: impl Into<PathBuf>, com_socket_path: impl Into<PathBuf>) -> Self {
        Self {
            helper_path: helper_path.into(),
            com_socket_path: com_socket_path.into(),
            debug: false,
            handle_c2c: false,
            tracer: false,
            multinode: None,
            readiness: ReadinessOptions::default(),
            stop_timeout: None,
        }
    }
}

/// Owns the bypass and interface registries and the helpers behind them.
#[derive(Debug)]
pub struct Driver {
    config: DriverConfig,
    bypass: BypassRegistry,
    interfaces: InterfaceRegistry,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            bypass: BypassRegistry::new(),
            interfaces: InterfaceRegistry::new(),
        }
    }

    pub async fn list_bypass(&self) -> Vec<BypassStatus> {
        self.bypass.list().await
    }

    pub async fn get_bypass(&self, id: &str) -> Option<BypassStatus> {
        self.bypass.get(id).await
    }

    /// Spawn a helper for `spec` and wait until it reports ready.
    ///
    /// Nothing is registered unless the helper became ready. A helper that
    /// fails the handshake is left to the OS; it is not killed here.
    pub async fn start_bypass(&self, spec: BypassSpec) -> Result<BypassStatus> {
        let short_id = truncate_id(&spec.id, LOG_ID_LEN).to_string();
        info!(id = %short_id, "starting bypass");

        let mut args = build_args(&spec, &self.config);
        let ready = ReadyPipe::new().map_err(DriverError::ReadyPipe)?;
        args.push(format!("--ready-fd={}", READY_FD));

        info!(
            id = %short_id,
            helper = %self.config.helper_path.display(),
            args = ?args,
            "spawning bypass helper"
        );

        let mut cmd = Command::new(&self.config.helper_path);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        ready.install(&mut cmd);

        // std's Child neither kills nor reaps on drop; the pid is waited on
        // explicitly by the handshake and by stop_bypass.
        let child = cmd.spawn().map_err(|source| DriverError::Spawn {
            path: self.config.helper_path.clone(),
            source,
        })?;
        let pid = child.id();
        drop(child);

        let mut receiver = ready.into_receiver().map_err(ReadinessError::Read)?;
        let helper = utils::to_pid(pid).ok_or(DriverError::ProcessLookup { pid })?;

        if let Err(e) = wait_for_ready(helper, &mut receiver, self.config.readiness).await {
            warn!(id = %short_id, pid, error = %e, "bypass helper did not become ready");
            return Err(e.into());
        }
        info!(id = %short_id, pid, "bypass helper ready");

        let status = BypassStatus {
            id: spec.id.clone(),
            pid,
            spec,
        };

        if let Some(previous) = self.bypass.insert(status.id.clone(), status.clone()).await {
            if previous.pid != pid && utils::is_process_alive(previous.pid) {
                warn!(
                    id = %short_id,
                    old_pid = previous.pid,
                    pid,
                    "replaced a running bypass session with the same id"
                );
            }
        }
        info!(id = %short_id, pid, "started bypass");

        Ok(status)
    }

    /// Terminate the helper for `id` and drop everything recorded for it.
    pub async fn stop_bypass(&self, id: &str) -> Result<()> {
        let short_id = truncate_id(id, LOG_ID_LEN);
        info!(id = %short_id, "stopping bypass");

        let mut sessions = self.bypass.lock().await;

        let recorded = sessions
            .get(id)
            .map(|status| status.pid)
            .ok_or_else(|| DriverError::NotFound(id.to_string()))?;
        let pid = utils::to_pid(recorded).ok_or(DriverError::ProcessLookup { pid: recorded })?;
        debug!(id = %short_id, pid = recorded, "found bypass helper");

        info!(id = %short_id, pid = recorded, "terminating bypass helper");
        utils::send_signal(pid, Signal::SIGTERM).map_err(|source| DriverError::Signal {
            pid: recorded,
            signal: Signal::SIGTERM,
            source,
        })?;

        let escalation = self.wait_or_kill(pid, short_id).await;
        info!(id = %short_id, pid = recorded, "terminated bypass helper");

        sessions.remove(id);
        drop(sessions);
        info!(id = %short_id, "stopped bypass");

        self.interfaces.remove(id).await;

        escalation
    }

    /// Wait for a helper that was sent SIGTERM, escalating to SIGKILL when
    /// the wait fails or the optional grace period runs out.
    async fn wait_or_kill(&self, pid: Pid, short_id: &str) -> Result<()> {
        let (outcome, pending) = match self.config.stop_timeout {
            None => (utils::wait_for_exit_async(pid).await, None),
            Some(grace) => {
                let mut waiter = tokio::task::spawn_blocking(move || utils::wait_for_exit(pid));
                match tokio::time::timeout(grace, &mut waiter).await {
                    Ok(joined) => (
                        joined
                            .map_err(io::Error::other)
                            .and_then(|r| r.map_err(io::Error::from)),
                        None,
                    ),
                    Err(_) => (
                        Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("still running after {:?}", grace),
                        )),
                        Some(waiter),
                    ),
                }
            }
        };

        let err = match outcome {
            Ok(status) => {
                debug!(id = %short_id, pid = %pid, ?status, "bypass helper exited");
                return Ok(());
            }
            Err(e) => e,
        };

        warn!(
            id = %short_id,
            pid = %pid,
            error = %err,
            "failed to terminate bypass helper with SIGTERM, killing"
        );

        let killed = match utils::send_signal(pid, Signal::SIGKILL) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!(id = %short_id, pid = %pid, "bypass helper already gone");
                Ok(())
            }
            Err(source) => Err(DriverError::Signal {
                pid: pid.as_raw() as u32,
                signal: Signal::SIGKILL,
                source,
            }),
        };

        // Best-effort final wait; its result does not change the outcome
        match pending {
            Some(waiter) => {
                let _ = waiter.await;
            }
            None => {
                let _ = utils::wait_for_exit_async(pid).await;
            }
        }

        killed
    }

    /// Stop every tracked helper, logging the ones that fail.
    pub async fn stop_all(&self) {
        let ids: Vec<String> = self.bypass.list().await.into_iter().map(|s| s.id).collect();

        for id in ids {
            match self.stop_bypass(&id).await {
                Ok(()) => {}
                // Raced with another stop
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    warn!(id = %truncate_id(&id, LOG_ID_LEN), error = %e, "failed to stop bypass")
                }
            }
        }
    }

    pub async fn list_interfaces(&self) -> HashMap<String, ContainerInterfaces> {
        self.interfaces.snapshot().await
    }

    pub async fn get_interface(&self, id: &str) -> Option<ContainerInterfaces> {
        self.interfaces.get(id).await
    }

    /// Store the interface report for `id`, replacing any earlier one.
    pub async fn post_interface(&self, id: &str, interfaces: ContainerInterfaces) {
        debug!(id = %truncate_id(id, LOG_ID_LEN), "storing container interfaces");
        self.interfaces.insert(id.to_string(), interfaces).await;
    }

    pub async fn delete_interface(&self, id: &str) {
        self.interfaces.remove(id).await;
    }
}
