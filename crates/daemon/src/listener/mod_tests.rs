// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tempfile::TempDir;
use ward_adapters::StubPacketFilter;
use ward_core::{Config, Interface};

use super::*;
use crate::config_manager::ConfigManager;
use crate::lifecycle::{DaemonState, HaStatus};

fn daemon() -> (Arc<DaemonState>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let lifecycle_config = lifecycle_config(&dir);
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&lifecycle_config.pid_path)
        .expect("lock file");

    let manager = ConfigManager::new(
        Config::default(),
        vec![],
        lifecycle_config.running_config_path.clone(),
        lifecycle_config.state_dir.clone(),
        Arc::new(StubPacketFilter::new()),
    );

    let state = DaemonState {
        config: lifecycle_config,
        lock_file,
        config_manager: Arc::new(manager),
        start_time: Instant::now(),
        shutdown: tokio_util::sync::CancellationToken::new(),
        ha: None::<Arc<dyn HaStatus>>,
    };
    (Arc::new(state), dir)
}

fn lifecycle_config(dir: &TempDir) -> crate::lifecycle::Config {
    crate::lifecycle::Config {
        state_dir: dir.path().to_path_buf(),
        socket_path: dir.path().join("wardd.sock"),
        pid_path: dir.path().join("wardd.pid"),
        running_config_path: dir.path().join("running.hcl"),
        backups_dir: dir.path().join("backups"),
        transient_dir: dir.path().join("transient"),
    }
}

#[tokio::test]
async fn ping_request_and_query_both_pong() {
    let (daemon, _dir) = daemon();
    assert_eq!(dispatch_request(Request::Ping, &daemon).await, Response::Pong);
    assert_eq!(dispatch_query(Query::Ping, &daemon).await, Response::Pong);
}

#[tokio::test]
async fn get_status_reports_generation_and_safe_mode() {
    let (daemon, _dir) = daemon();
    let Response::Status(status) = dispatch_query(Query::GetStatus, &daemon).await else {
        panic!("expected Status response");
    };
    assert_eq!(status.generation, 0);
    assert!(!status.safe_mode);
    assert_eq!(status.ha_role, "disabled");
}

#[tokio::test]
async fn add_interface_then_get_config_round_trips() {
    let (daemon, _dir) = daemon();
    let response = dispatch_request(
        Request::AddInterface { interface: Interface::new("eth0") },
        &daemon,
    )
    .await;
    assert_eq!(response, Response::Ok);

    let Response::ConfigDocument(doc) = dispatch_query(Query::GetConfig { staged: false }, &daemon).await
    else {
        panic!("expected ConfigDocument response");
    };
    assert!(doc.contains("eth0"));
}

#[tokio::test]
async fn set_config_then_apply_stages_and_commits() {
    let (daemon, _dir) = daemon();
    let mut staged = Config::default();
    staged.interfaces.push(Interface::new("wan0"));
    let hcl = hcl::to_string(&staged).expect("render");

    let response = dispatch_request(Request::SetConfig { hcl }, &daemon).await;
    assert_eq!(response, Response::Ok);

    let response = dispatch_request(Request::Apply, &daemon).await;
    assert_eq!(response, Response::Ok);
    assert!(daemon.config_manager.running().interface("wan0").is_some());
}

#[tokio::test]
async fn safe_mode_enter_refuses_apply_then_exit_restores_it() {
    let (daemon, _dir) = daemon();
    assert_eq!(dispatch_request(Request::SafeModeEnter, &daemon).await, Response::Ok);

    daemon.config_manager.stage(Config::default());
    let response = dispatch_request(Request::Apply, &daemon).await;
    assert!(matches!(response, Response::Err(_)));

    assert_eq!(dispatch_request(Request::SafeModeExit, &daemon).await, Response::Ok);
    daemon.config_manager.stage(Config::default());
    assert_eq!(dispatch_request(Request::Apply, &daemon).await, Response::Ok);
}

#[tokio::test]
async fn authorize_then_check_then_revoke_ip() {
    let (daemon, _dir) = daemon();
    let ip: std::net::IpAddr = "203.0.113.9".parse().expect("ip");

    let response = dispatch_request(
        Request::AuthorizeIp { set: "guests".into(), ip, ttl_secs: Some(120) },
        &daemon,
    )
    .await;
    assert_eq!(response, Response::Ok);

    let response = dispatch_query(Query::CheckIpSet { set: "guests".into(), ip }, &daemon).await;
    assert_eq!(response, Response::IpSetCheck(true));

    let response = dispatch_request(Request::RevokeIp { set: "guests".into(), ip }, &daemon).await;
    assert_eq!(response, Response::Ok);

    let response = dispatch_query(Query::CheckIpSet { set: "guests".into(), ip }, &daemon).await;
    assert_eq!(response, Response::IpSetCheck(false));
}

#[tokio::test]
async fn get_and_set_config_section_round_trip_dns() {
    let (daemon, _dir) = daemon();
    let dns = ward_core::DnsConfig { egress_filtering: true, ..Default::default() };
    let hcl = hcl::to_string(&dns).expect("render");

    let response =
        dispatch_request(Request::SetConfigSection { path: "dns".into(), hcl }, &daemon).await;
    assert_eq!(response, Response::Ok);
    dispatch_request(Request::Apply, &daemon).await;

    let Response::ConfigDocument(doc) =
        dispatch_query(Query::GetConfigSection { path: "dns".into(), staged: false }, &daemon).await
    else {
        panic!("expected ConfigDocument response");
    };
    assert!(doc.contains("true"));
}

#[tokio::test]
async fn backup_create_then_list() {
    let (daemon, _dir) = daemon();
    let response =
        dispatch_request(Request::BackupCreate { comment: Some("pre-change".into()) }, &daemon).await;
    assert!(matches!(response, Response::Backup(_)));

    let Response::BackupList(backups) = dispatch_query(Query::BackupList, &daemon).await else {
        panic!("expected BackupList response");
    };
    assert_eq!(backups.len(), 1);
}

#[test]
fn parse_route_line_handles_default_and_connected_routes() {
    let default_route = parse_route_line("default via 192.0.2.1 dev wan0 proto dhcp metric 100")
        .expect("default route");
    assert_eq!(default_route.destination, "default");
    assert_eq!(default_route.interface, "wan0");
    assert_eq!(default_route.metric, 100);
    assert_eq!(default_route.gateway, Some("192.0.2.1".parse().expect("ip")));

    let connected = parse_route_line("192.0.2.0/24 dev wan0 proto kernel scope link src 192.0.2.5")
        .expect("connected route");
    assert_eq!(connected.destination, "192.0.2.0/24");
    assert_eq!(connected.interface, "wan0");
    assert!(connected.gateway.is_none());

    assert!(parse_route_line("").is_none());
}
