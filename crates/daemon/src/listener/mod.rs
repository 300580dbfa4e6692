// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O: one Unix control socket, one
//! connection per client, exactly one [`ward_wire::Message`] read
//! followed by exactly one [`ward_wire::Response`] write per connection
//! — no request pipelining, no persistent sessions.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};
use ward_core::{Config, WardError};
use ward_wire::{
    BackupSummary as WireBackupSummary, IpSetEntry, Message, Query, Request, Response, RouteEntry,
    StatusSummary, SystemStats as WireSystemStats,
};

use crate::lifecycle::DaemonState;

/// Every `Apply` opens a confirmation window this wide before auto-reverting
/// unless `SafeApplyConfirm` lands first. Not yet operator configurable
/// over the wire; see the open question recorded in DESIGN.md.
const SAFE_APPLY_WINDOW: Duration = Duration::from_secs(30);

pub struct Listener {
    unix: UnixListener,
    daemon: Arc<DaemonState>,
}

impl Listener {
    pub fn new(unix: UnixListener, daemon: Arc<DaemonState>) -> Self {
        Self { unix, daemon }
    }

    /// Accepts connections until `daemon.shutdown` fires, spawning one task
    /// per connection so a slow or stuck client can never block others.
    pub async fn run(self) {
        loop {
            tokio::select! {
                accepted = self.unix.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let daemon = Arc::clone(&self.daemon);
                            tokio::spawn(async move {
                                let (reader, writer) = stream.into_split();
                                handle_connection(reader, writer, &daemon).await;
                            });
                        }
                        Err(e) => error!(error = %e, "accept failed"),
                    }
                }
                () = self.daemon.shutdown.cancelled() => {
                    info!("listener shutting down");
                    return;
                }
            }
        }
    }
}

async fn handle_connection<R, W>(mut reader: R, mut writer: W, daemon: &DaemonState)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let message: Message = match ward_wire::read_message(&mut reader).await {
        Ok(m) => m,
        Err(ward_wire::ProtocolError::UnexpectedEof) => return,
        Err(e) => {
            warn!(error = %e, "failed to read request frame");
            return;
        }
    };

    let response = match &message {
        Message::Request(r) => {
            info!(request = ?r, "received request");
            dispatch_request(r.clone(), daemon).await
        }
        Message::Query(q) => {
            debug!(query = ?q, "received query");
            dispatch_query(q.clone(), daemon).await
        }
    };

    if let Err(e) = ward_wire::write_message(&mut writer, &response).await {
        warn!(error = %e, "failed to write response frame");
    }
}

async fn dispatch_request(request: Request, daemon: &DaemonState) -> Response {
    let cm = &daemon.config_manager;
    let result: Result<Response, WardError> = async {
        match request {
            Request::SetConfig { hcl } => {
                let config: Config =
                    hcl::from_str(&hcl).map_err(|e| WardError::KernelApplyFailed(e.to_string()))?;
                cm.stage(config);
                Ok(Response::Ok)
            }
            Request::SetConfigSection { path, hcl } => {
                let mut candidate = cm.staged().unwrap_or_else(|| (*cm.running()).clone());
                set_config_section(&mut candidate, &path, &hcl)?;
                cm.stage(candidate);
                Ok(Response::Ok)
            }
            Request::Apply => {
                // `safe_apply` needs an `Arc<ConfigManager>`; the listener
                // is the one caller that holds one (everywhere else inside
                // ConfigManager itself only `&self` is available).
                let cm = Arc::clone(cm);
                cm.safe_apply(SAFE_APPLY_WINDOW).await?;
                Ok(Response::Ok)
            }
            Request::Discard => {
                cm.discard();
                Ok(Response::Ok)
            }
            Request::Rollback { generation } => {
                cm.rollback(generation).await?;
                Ok(Response::Ok)
            }
            Request::SafeApplyConfirm => {
                cm.safe_apply_confirm()?;
                Ok(Response::Ok)
            }
            Request::SafeApplyCancel => {
                cm.safe_apply_cancel().await?;
                Ok(Response::Ok)
            }
            Request::RestartService { name } => {
                restart_service(&name)?;
                Ok(Response::Ok)
            }
            Request::AddInterface { interface } => {
                cm.add_interface(interface).await?;
                Ok(Response::Ok)
            }
            Request::UpdateInterface { name, interface } => {
                cm.update_interface(&name, interface).await?;
                Ok(Response::Ok)
            }
            Request::RemoveInterface { name } => {
                cm.remove_interface(&name).await?;
                Ok(Response::Ok)
            }
            Request::AddVlan { interface, vlan } => {
                cm.add_vlan(&interface, vlan).await?;
                Ok(Response::Ok)
            }
            Request::RemoveVlan { interface, vlan_id } => {
                cm.remove_vlan(&interface, vlan_id).await?;
                Ok(Response::Ok)
            }
            Request::SetBond { interface, bond } => {
                cm.set_bond(&interface, bond).await?;
                Ok(Response::Ok)
            }
            Request::RemoveBond { interface } => {
                cm.remove_bond(&interface).await?;
                Ok(Response::Ok)
            }
            Request::BackupCreate { comment } => {
                let record = cm.backup_create(comment)?;
                Ok(Response::Backup(to_wire_backup(record.summary())))
            }
            Request::BackupRestore { id } => {
                cm.backup_restore(&id)?;
                Ok(Response::Ok)
            }
            Request::BackupPin { id, pinned } => {
                let record = cm.backup_pin(&id, pinned)?;
                Ok(Response::Backup(to_wire_backup(record.summary())))
            }
            Request::AuthorizeIp { set, ip, ttl_secs } => {
                let ttl = Duration::from_secs(u64::from(ttl_secs.unwrap_or(3600)));
                cm.authorize_ip(&set, ip, ttl).await?;
                Ok(Response::Ok)
            }
            Request::RevokeIp { set, ip } => {
                cm.revoke_ip(&set, ip).await?;
                Ok(Response::Ok)
            }
            Request::Upgrade { expected_checksum } => {
                let _ = expected_checksum;
                Err(WardError::UpgradeFailed(
                    "upgrade handoff must be driven by the supervisor, not a single RPC".into(),
                ))
            }
            Request::SystemReboot => {
                reboot_system()?;
                Ok(Response::Ok)
            }
            Request::SafeModeEnter => {
                cm.enter_safe_mode();
                Ok(Response::Ok)
            }
            Request::SafeModeExit => {
                cm.exit_safe_mode();
                Ok(Response::Ok)
            }
            Request::Ping => Ok(Response::Pong),
            Request::CollaboratorCommand { method, .. } => Err(WardError::KernelApplyFailed(
                format!("{method} is not implemented by this build"),
            )),
        }
    }
    .await;

    result.unwrap_or_else(Response::from)
}

async fn dispatch_query(query: Query, daemon: &DaemonState) -> Response {
    let cm = &daemon.config_manager;
    let result: Result<Response, WardError> = async {
        match query {
            Query::GetStatus => Ok(Response::Status(StatusSummary {
                generation: cm.generation(),
                uptime_secs: daemon.uptime_secs(),
                ha_role: daemon.ha.as_ref().map_or("disabled", |ha| ha.state_label()).to_string(),
                safe_mode: cm.in_safe_mode(),
            })),
            Query::GetConfig { staged } => {
                let config = select_config(cm, staged)?;
                let body =
                    hcl::to_string(&config).map_err(|e| WardError::KernelApplyFailed(e.to_string()))?;
                Ok(Response::ConfigDocument(body))
            }
            Query::GetConfigSection { path, staged } => {
                let config = select_config(cm, staged)?;
                let body = get_config_section(&config, &path)?;
                Ok(Response::ConfigDocument(body))
            }
            Query::BackupList => {
                let backups = cm.backup_list()?;
                Ok(Response::BackupList(backups.into_iter().map(to_wire_backup).collect()))
            }
            Query::ListIpSet { set } => {
                let members = cm.list_ipset(&set).await?;
                Ok(Response::IpSetMembers(members.into_iter().map(to_wire_ipset_entry).collect()))
            }
            Query::CheckIpSet { set, ip } => Ok(Response::IpSetCheck(cm.check_ipset(&set, ip).await?)),
            Query::SystemStats => Ok(Response::SystemStats(read_system_stats(daemon.uptime_secs()))),
            Query::SystemRoutes => Ok(Response::SystemRoutes(read_system_routes())),
            Query::Ping => Ok(Response::Pong),
            Query::CollaboratorQuery { method, .. } => Err(WardError::KernelApplyFailed(format!(
                "{method} is not implemented by this build"
            ))),
        }
    }
    .await;

    result.unwrap_or_else(Response::from)
}

fn select_config(
    cm: &crate::config_manager::ConfigManager,
    staged: bool,
) -> Result<Config, WardError> {
    if staged {
        cm.staged().ok_or_else(|| {
            WardError::KernelApplyFailed("no configuration is currently staged".to_string())
        })
    } else {
        Ok((*cm.running()).clone())
    }
}

fn to_wire_backup(s: ward_storage::BackupSummary) -> WireBackupSummary {
    WireBackupSummary { id: s.id, created_at: s.created_at, comment: s.comment, pinned: s.pinned }
}

fn to_wire_ipset_entry(m: ward_adapters::IpSetMember) -> IpSetEntry {
    let expires_in_secs = m.expires_at.map(|at| {
        at.checked_duration_since(Instant::now()).unwrap_or(Duration::ZERO).as_secs()
    });
    IpSetEntry { address: m.address, expires_in_secs }
}

/// Extracts one named top-level section of the declarative tree as its own
/// rendered HCL fragment. `path` is either a bare section name (`"dns"`,
/// `"ssh"`, ...) or `"interface.<name>"` selecting one interface block —
/// the two address shapes a section-scoped HCL edit can name.
fn get_config_section(config: &Config, path: &str) -> Result<String, WardError> {
    if let Some(name) = path.strip_prefix("interface.") {
        let iface = config
            .interface(name)
            .ok_or_else(|| WardError::KernelApplyFailed(format!("no such interface: {name}")))?;
        return hcl::to_string(iface).map_err(|e| WardError::KernelApplyFailed(e.to_string()));
    }
    match path {
        "dns" => to_hcl_opt(&config.dns),
        "ssh" => to_hcl_opt(&config.ssh),
        "vpn" => to_hcl_opt(&config.vpn),
        "mdns" => to_hcl_opt(&config.mdns),
        "ha" => to_hcl_opt(&config.ha),
        "dhcp" => to_hcl_opt(&config.dhcp),
        "replication" => to_hcl_opt(&config.replication),
        "interfaces" => hcl::to_string(&config.interfaces).map_err(hcl_err),
        "zones" => hcl::to_string(&config.zones).map_err(hcl_err),
        "policies" => hcl::to_string(&config.policies).map_err(hcl_err),
        "ipsets" => hcl::to_string(&config.ipsets).map_err(hcl_err),
        "vrfs" => hcl::to_string(&config.vrfs).map_err(hcl_err),
        other => Err(WardError::KernelApplyFailed(format!("unknown config section {other:?}"))),
    }
}

fn to_hcl_opt<T: serde::Serialize>(value: &Option<T>) -> Result<String, WardError> {
    match value {
        Some(v) => hcl::to_string(v).map_err(hcl_err),
        None => Ok(String::new()),
    }
}

fn hcl_err(e: hcl::Error) -> WardError {
    WardError::KernelApplyFailed(e.to_string())
}

/// Replaces one named section of `config` in place with the parsed
/// contents of `hcl`. The counterpart to [`get_config_section`].
fn set_config_section(config: &mut Config, path: &str, hcl_body: &str) -> Result<(), WardError> {
    if let Some(name) = path.strip_prefix("interface.") {
        let parsed: ward_core::Interface = hcl::from_str(hcl_body).map_err(hcl_err)?;
        match config.interfaces.iter_mut().find(|i| i.name == name) {
            Some(slot) => *slot = parsed,
            None => config.interfaces.push(parsed),
        }
        return Ok(());
    }
    match path {
        "dns" => config.dns = Some(hcl::from_str(hcl_body).map_err(hcl_err)?),
        "ssh" => config.ssh = Some(hcl::from_str(hcl_body).map_err(hcl_err)?),
        "vpn" => config.vpn = Some(hcl::from_str(hcl_body).map_err(hcl_err)?),
        "mdns" => config.mdns = Some(hcl::from_str(hcl_body).map_err(hcl_err)?),
        "ha" => config.ha = Some(hcl::from_str(hcl_body).map_err(hcl_err)?),
        "dhcp" => config.dhcp = Some(hcl::from_str(hcl_body).map_err(hcl_err)?),
        "replication" => config.replication = Some(hcl::from_str(hcl_body).map_err(hcl_err)?),
        "interfaces" => config.interfaces = hcl::from_str(hcl_body).map_err(hcl_err)?,
        "zones" => config.zones = hcl::from_str(hcl_body).map_err(hcl_err)?,
        "policies" => config.policies = hcl::from_str(hcl_body).map_err(hcl_err)?,
        "ipsets" => config.ipsets = hcl::from_str(hcl_body).map_err(hcl_err)?,
        "vrfs" => config.vrfs = hcl::from_str(hcl_body).map_err(hcl_err)?,
        other => return Err(WardError::KernelApplyFailed(format!("unknown config section {other:?}"))),
    }
    Ok(())
}

fn restart_service(name: &str) -> Result<(), WardError> {
    run_systemctl(&["restart", name])
}

fn reboot_system() -> Result<(), WardError> {
    run_systemctl(&["reboot"])
}

fn run_systemctl(args: &[&str]) -> Result<(), WardError> {
    std::process::Command::new("systemctl")
        .args(args)
        .status()
        .map_err(|e| WardError::KernelApplyFailed(format!("systemctl {args:?} failed: {e}")))
        .and_then(|status| {
            if status.success() {
                Ok(())
            } else {
                Err(WardError::KernelApplyFailed(format!("systemctl {args:?} exited {status}")))
            }
        })
}

fn read_system_stats(uptime_secs: u64) -> WireSystemStats {
    let (load_avg_1m, load_avg_5m, load_avg_15m) = read_loadavg().unwrap_or((0.0, 0.0, 0.0));
    let (mem_total_bytes, mem_used_bytes) = read_meminfo().unwrap_or((0, 0));
    WireSystemStats { uptime_secs, load_avg_1m, load_avg_5m, load_avg_15m, mem_used_bytes, mem_total_bytes }
}

fn read_loadavg() -> Option<(f64, f64, f64)> {
    let content = std::fs::read_to_string("/proc/loadavg").ok()?;
    let mut fields = content.split_whitespace();
    let one = fields.next()?.parse().ok()?;
    let five = fields.next()?.parse().ok()?;
    let fifteen = fields.next()?.parse().ok()?;
    Some((one, five, fifteen))
}

fn read_meminfo() -> Option<(u64, u64)> {
    let content = std::fs::read_to_string("/proc/meminfo").ok()?;
    let mut total_kb = None;
    let mut available_kb = None;
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let key = parts.next()?;
        let value: u64 = parts.next()?.parse().ok()?;
        match key {
            "MemTotal:" => total_kb = Some(value),
            "MemAvailable:" => available_kb = Some(value),
            _ => {}
        }
    }
    let total = total_kb?;
    let available = available_kb.unwrap_or(0);
    Some((total * 1024, total.saturating_sub(available) * 1024))
}

/// Parses `ip route show` output. Handles the two line shapes that matter
/// to an operator glancing at `wardctl status routes`: a default route
/// (`default via <gw> dev <if> ...`) and a directly-connected subnet
/// (`<cidr> dev <if> ...`); anything else is skipped rather than
/// misparsed.
fn read_system_routes() -> Vec<RouteEntry> {
    let output = match std::process::Command::new("ip").args(["route", "show"]).output() {
        Ok(o) if o.status.success() => o.stdout,
        Ok(o) => {
            warn!(status = %o.status, "ip route show exited non-zero");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "failed to run ip route show");
            return Vec::new();
        }
    };
    let text = String::from_utf8_lossy(&output);
    text.lines().filter_map(parse_route_line).collect()
}

fn parse_route_line(line: &str) -> Option<RouteEntry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    let destination = tokens[0].to_string();
    let mut gateway: Option<IpAddr> = None;
    let mut interface = String::new();
    let mut metric = 0u32;
    let mut i = 1;
    while i < tokens.len() {
        match tokens[i] {
            "via" => {
                gateway = tokens.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "dev" => {
                interface = tokens.get(i + 1).map(|s| s.to_string()).unwrap_or_default();
                i += 2;
            }
            "metric" => {
                metric = tokens.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            _ => i += 1,
        }
    }
    if interface.is_empty() {
        return None;
    }
    Some(RouteEntry { destination, gateway, interface, metric })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
