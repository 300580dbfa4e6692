// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: paths, startup sequencing, and the state
//! the running process carries for as long as it's up.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use ward_adapters::{DhcpReclaimer, LinkLayer};
use ward_core::Clock;
use ward_engine::{ConntrackSync, HaService, HaState};

use crate::config_manager::ConfigManager;

/// Read-only HA role reporting for `GetStatus`, kept separate from
/// [`HaService`]'s concrete generic parameters so [`DaemonState`] can hold
/// it as a trait object regardless of which adapters the platform build
/// wired it with.
pub trait HaStatus: Send + Sync {
    fn state_label(&self) -> &'static str;
}

impl<L, D, S, C> HaStatus for HaService<L, D, S, C>
where
    L: LinkLayer,
    D: DhcpReclaimer,
    S: ConntrackSync,
    C: Clock,
{
    fn state_label(&self) -> &'static str {
        match self.state() {
            HaState::Primary => "primary",
            HaState::Backup => "backup",
            HaState::TakingOver => "taking_over",
            HaState::Failed => "failed",
        }
    }
}

/// Daemon configuration: the filesystem layout rooted at `$state_dir`
/// (`WARD_STATE_DIR`) plus the control socket and PID file rooted at
/// `$run_dir` (`$run_dir/<name>.pid`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (persisted config, backups, transient handoff state).
    pub state_dir: PathBuf,
    /// Path to the control-plane Unix socket.
    pub socket_path: PathBuf,
    /// Path to the PID/lock file.
    pub pid_path: PathBuf,
    /// Path the running config is written back to on every successful `Apply`.
    pub running_config_path: PathBuf,
    /// Directory timestamped config backups are written under.
    pub backups_dir: PathBuf,
    /// Directory cross-upgrade transient handoff state is written under.
    pub transient_dir: PathBuf,
}

impl Config {
    /// Load configuration for the host-resident daemon: fixed paths under
    /// `$state_dir` and `$run_dir`. Exactly one `wardd` instance owns them.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        let run_dir = PathBuf::from("/run/ward");

        Ok(Self {
            socket_path: run_dir.join("wardd.sock"),
            pid_path: run_dir.join("wardd.pid"),
            running_config_path: state_dir.join("running.hcl"),
            backups_dir: state_dir.join("backups"),
            transient_dir: state_dir.join("transient"),
            state_dir,
        })
    }
}

/// Everything the running process holds for its lifetime. Shared between
/// the listener's per-connection tasks (one task per connection) and the
/// signal-handling loop via `Arc`.
pub struct DaemonState {
    pub config: Config,
    // Held only to maintain the exclusive advisory lock; released on drop.
    #[allow(dead_code)]
    pub(crate) lock_file: File,
    pub config_manager: Arc<ConfigManager>,
    pub start_time: Instant,
    pub shutdown: CancellationToken,
    /// `None` when the loaded configuration has HA disabled.
    pub ha: Option<Arc<dyn HaStatus>>,
}

impl DaemonState {
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Release the socket and PID file. Called on graceful shutdown; the
    /// advisory lock itself is released when `lock_file` drops.
    pub fn teardown(&self) {
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                tracing::warn!("failed to remove control socket: {e}");
            }
        }
        if self.config.pid_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.pid_path) {
                tracing::warn!("failed to remove pid file: {e}");
            }
        }
        info!("daemon shutdown complete");
    }
}

/// Result of daemon startup: the daemon state and the bound listener,
/// returned separately so the caller decides when to start accepting
/// connections.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: wardd already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("failed to load configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
