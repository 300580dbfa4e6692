// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal handling: `SIGHUP` reloads the running configuration from disk,
//! `SIGTERM`/`SIGINT` request a graceful shutdown. Both are fanned out
//! through the same [`CancellationToken`] the listener's connection tasks
//! watch, so a reload never races an in-flight `Apply`.

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::lifecycle::DaemonState;

/// Runs until `daemon.shutdown` is canceled by a `SIGTERM`/`SIGINT`,
/// reloading the running config from `$state_dir/running.hcl` on every
/// `SIGHUP` in between.
pub async fn run(daemon: Arc<DaemonState>) {
    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to install SIGHUP handler, reload-on-signal disabled");
            return run_shutdown_only(daemon).await;
        }
    };
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };
    let mut interrupt = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to install SIGINT handler");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = hangup.recv() => reload(&daemon),
            _ = terminate.recv() => {
                info!("SIGTERM received, shutting down");
                daemon.shutdown.cancel();
                return;
            }
            _ = interrupt.recv() => {
                info!("SIGINT received, shutting down");
                daemon.shutdown.cancel();
                return;
            }
            () = daemon.shutdown.cancelled() => return,
        }
    }
}

async fn run_shutdown_only(daemon: Arc<DaemonState>) {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => return,
    };
    tokio::select! {
        _ = terminate.recv() => daemon.shutdown.cancel(),
        () = daemon.shutdown.cancelled() => {}
    }
}

fn reload(daemon: &DaemonState) {
    let path = &daemon.config.running_config_path;
    match ward_config::load(path) {
        Ok((config, warnings)) => {
            for warning in &warnings {
                warn!(%warning, "config loader warning on reload");
            }
            daemon.config_manager.stage(config);
            info!(path = %path.display(), "staged reloaded configuration on SIGHUP, awaiting Apply");
        }
        Err(e) => {
            warn!(error = %e, path = %path.display(), "SIGHUP reload failed, running configuration unchanged");
        }
    }
}
