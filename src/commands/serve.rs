//! `bypassd` daemon: hosts the driver behind the control and com sockets.
//!
//! Lifecycle:
//! 1. bind both unix sockets (stale socket files are replaced)
//! 2. write the pid file
//! 3. serve until SIGINT/SIGTERM
//! 4. stop every bypass session, then remove sockets and pid file

use anyhow::{Context, Result};
use std::future::IntoFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::{com, control};
use crate::cli::Cli;
use crate::driver::{Driver, DriverConfig};

pub async fn cmd_serve(cli: Cli) -> Result<()> {
    let config = DriverConfig::try_from(&cli)?;
    info!(
        socket = %cli.socket.display(),
        com_socket = %cli.com_socket.display(),
        helper = %config.helper_path.display(),
        "starting bypassd"
    );

    let driver = Arc::new(Driver::new(config));

    let api_listener = bind_unix(&cli.socket).context("binding control socket")?;
    let com_listener = bind_unix(&cli.com_socket).context("binding com socket")?;

    std::fs::write(&cli.pid_file, format!("{}\n", std::process::id()))
        .with_context(|| format!("writing pid file {}", cli.pid_file.display()))?;

    let mut sigint = signal(SignalKind::interrupt()).context("installing SIGINT handler")?;
    let mut sigterm = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT"),
            _ = sigterm.recv() => info!("received SIGTERM"),
        }
        let _ = shutdown_tx.send(true);
    });

    let api_server = axum::serve(api_listener, control::router(driver.clone()))
        .with_graceful_shutdown(shutdown_requested(shutdown_rx.clone()));
    let com_server = axum::serve(com_listener, com::router(driver.clone()))
        .with_graceful_shutdown(shutdown_requested(shutdown_rx));

    info!("listening");
    let served = tokio::try_join!(api_server.into_future(), com_server.into_future())
        .context("server error");

    info!("shutting down, stopping all bypass sessions");
    driver.stop_all().await;

    cleanup_files(&[cli.socket, cli.com_socket, cli.pid_file]);
    served?;

    info!("bypassd stopped");
    Ok(())
}

async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Bind a unix socket, replacing a stale socket file left by an earlier run.
fn bind_unix(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("removing stale socket {}", path.display()))?;
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    UnixListener::bind(path).with_context(|| format!("binding {}", path.display()))
}

fn cleanup_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove file");
            }
        }
    }
}
