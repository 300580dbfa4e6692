// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use tokio::net::UnixListener;
use tracing::{info, warn};
use ward_core::ApplyHook;

use crate::config_manager::ConfigManager;
use crate::dns_wall_hook::{DnsWallHook, NullDnsAnswerSource};
use crate::ApplyHookHandle;

use super::{Config, DaemonState, HaStatus, LifecycleError, StartupResult};

#[cfg(target_os = "linux")]
type LinkLayerImpl = ward_adapters::NetlinkLinkLayer;
#[cfg(not(target_os = "linux"))]
type LinkLayerImpl = ward_adapters::StubLinkLayer;

#[cfg(target_os = "linux")]
type PacketFilterImpl = ward_adapters::NftPacketFilter;
#[cfg(not(target_os = "linux"))]
type PacketFilterImpl = ward_adapters::StubPacketFilter;

#[cfg(target_os = "linux")]
fn build_link_layer() -> Result<Arc<LinkLayerImpl>, LifecycleError> {
    ward_adapters::NetlinkLinkLayer::connect()
        .map(Arc::new)
        .map_err(|e| LifecycleError::Config(e.to_string()))
}

#[cfg(not(target_os = "linux"))]
fn build_link_layer() -> Result<Arc<LinkLayerImpl>, LifecycleError> {
    Ok(Arc::new(ward_adapters::StubLinkLayer::new()))
}

fn build_packet_filter() -> Arc<PacketFilterImpl> {
    Arc::new(PacketFilterImpl::new())
}

/// Start the daemon.
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock — those
            // files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic; `cleanup_on_failure` is called by `startup` if this
/// returns `Err`.
async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Directories needed before the lock file can even be opened.
    if let Some(parent) = config.pid_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.state_dir)?;
    std::fs::create_dir_all(&config.transient_dir)?;

    // 2. Acquire the PID-file lock first, to prevent races with a second
    // `wardd` instance. Opened with `truncate(false)` so we don't wipe
    // the running daemon's PID before we know whether we hold the lock.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.pid_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Load the running configuration, falling back to a default
    // (disabled, interface-less) document on first boot.
    let running = if config.running_config_path.exists() {
        let (cfg, warnings) = ward_config::load(&config.running_config_path)
            .map_err(|e| LifecycleError::Config(e.to_string()))?;
        for warning in &warnings {
            warn!(%warning, "config loader warning");
        }
        cfg
    } else {
        info!("no running configuration found, starting with an empty document");
        ward_core::Config::default()
    };

    // 4. Build the adapter set and the fixed apply-hook pipeline (Network
    // Reconciler, then DNS Wall resync).
    let link = build_link_layer()?;
    let packet_filter = build_packet_filter();

    let reconciler = ward_engine::NetworkReconciler::new(Arc::clone(&link), Arc::clone(&packet_filter));
    let mut apply_hooks: Vec<ApplyHookHandle> = vec![Box::new(reconciler)];

    if let Some(dns) = running.dns.clone() {
        if dns.egress_filtering {
            let wall = ward_engine::DnsWall::new(NullDnsAnswerSource, Arc::clone(&packet_filter), dns);
            apply_hooks.push(Box::new(DnsWallHook::new(wall)));
        }
    }

    let config_manager = Arc::new(ConfigManager::new(
        running.clone(),
        apply_hooks,
        config.running_config_path.clone(),
        config.state_dir.clone(),
        packet_filter as Arc<dyn ward_adapters::PacketFilter>,
    ));

    // 5. HA service: spawned as an independent heartbeat loop, not part of
    // the apply pipeline — it runs beside `Apply`, not gated by it. Only
    // stood up when the loaded config actually enables it.
    let ha: Option<Arc<dyn HaStatus>> = match running.ha.clone() {
        Some(ha_cfg) if ha_cfg.mode != ward_core::HaMode::Disabled => {
            Some(spawn_ha_service(ha_cfg, Arc::clone(&link)).await)
        }
        _ => None,
    };

    // 6. Remove a stale socket and bind last, only once every earlier
    // validation step has succeeded.
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("wardd started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            config_manager,
            start_time: Instant::now(),
            shutdown: tokio_util::sync::CancellationToken::new(),
            ha,
        },
        listener,
    })
}

/// Binds the heartbeat UDP socket and spawns the send/receive/tick loops
/// `HaService` exposes. Runs for the life of the process; shut down is
/// implicit in process exit since there is no per-connection state to
/// drain.
async fn spawn_ha_service(ha_cfg: ward_core::HaConfig, link: Arc<LinkLayerImpl>) -> Arc<dyn HaStatus> {
    let heartbeat_port = ha_cfg.heartbeat_port;
    let interval = ha_cfg.heartbeat_interval;

    let service = Arc::new(ward_engine::HaService::new(
        ha_cfg,
        link,
        Arc::new(ward_adapters::StubDhcpReclaimer::new()),
        Arc::new(ward_engine::StubConntrackSync::new()),
        ward_core::SystemClock,
        None,
    ));

    let socket = match tokio::net::UdpSocket::bind(("0.0.0.0", heartbeat_port)).await {
        Ok(socket) => Some(Arc::new(socket)),
        Err(e) => {
            warn!(error = %e, "failed to bind HA heartbeat socket, heartbeat loop disabled");
            None
        }
    };

    if let Some(socket) = socket {
        if let Err(e) = service.start_conntrack_sync().await {
            warn!(error = %e, "failed to start conntrack sync");
        }

        let recv_service = Arc::clone(&service);
        let recv_socket = Arc::clone(&socket);
        tokio::spawn(async move {
            loop {
                recv_service.recv_heartbeat(&recv_socket).await;
            }
        });

        let tick_service = Arc::clone(&service);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = tick_service.send_heartbeat(&socket).await {
                    warn!(error = %e, "failed to send heartbeat");
                }
                if let Err(e) = tick_service.tick().await {
                    warn!(error = %e, "ha tick failed");
                }
            }
        });
    }

    service
}

/// Clean up resources on startup failure.
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.pid_path.exists() {
        let _ = std::fs::remove_file(&config.pid_path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
