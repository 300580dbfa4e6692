// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use ward_adapters::StubPacketFilter;
use ward_core::Config as WardConfig;

use super::*;
use crate::config_manager::ConfigManager;

fn daemon_state(dir: &tempfile::TempDir) -> DaemonState {
    let config = Config {
        state_dir: dir.path().to_path_buf(),
        socket_path: dir.path().join("wardd.sock"),
        pid_path: dir.path().join("wardd.pid"),
        running_config_path: dir.path().join("running.hcl"),
        backups_dir: dir.path().join("backups"),
        transient_dir: dir.path().join("transient"),
    };
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&config.pid_path)
        .expect("lock file");
    let manager = ConfigManager::new(
        WardConfig::default(),
        vec![],
        config.running_config_path.clone(),
        config.state_dir.clone(),
        Arc::new(StubPacketFilter::new()),
    );

    DaemonState {
        config,
        lock_file,
        config_manager: Arc::new(manager),
        start_time: Instant::now(),
        shutdown: CancellationToken::new(),
        ha: None,
    }
}

#[test]
fn uptime_secs_reports_elapsed_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    let daemon = daemon_state(&dir);
    std::thread::sleep(std::time::Duration::from_millis(10));
    // Sanity bound only: real wall-clock elapsed, not a fixed stub.
    assert!(daemon.uptime_secs() < 2);
}

#[test]
fn teardown_removes_socket_and_pid_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let daemon = daemon_state(&dir);
    std::fs::write(&daemon.config.socket_path, b"").expect("create fake socket file");
    assert!(daemon.config.socket_path.exists());
    assert!(daemon.config.pid_path.exists());

    daemon.teardown();

    assert!(!daemon.config.socket_path.exists());
    assert!(!daemon.config.pid_path.exists());
}

#[test]
fn teardown_is_idempotent_when_files_are_already_gone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let daemon = daemon_state(&dir);
    std::fs::remove_file(&daemon.config.pid_path).expect("remove pid file");
    daemon.teardown();
}

#[test]
fn config_load_honors_ward_state_dir_env_var() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::env::set_var("WARD_STATE_DIR", dir.path());
    let config = Config::load().expect("load");
    std::env::remove_var("WARD_STATE_DIR");

    assert_eq!(config.state_dir, dir.path());
    assert_eq!(config.running_config_path, dir.path().join("running.hcl"));
    assert_eq!(config.backups_dir, dir.path().join("backups"));
    assert_eq!(config.socket_path, PathBuf::from("/run/ward/wardd.sock"));
}

struct FixedHaStatus(&'static str);

impl HaStatus for FixedHaStatus {
    fn state_label(&self) -> &'static str {
        self.0
    }
}

#[test]
fn ha_status_trait_object_reports_its_label() {
    let status: Arc<dyn HaStatus> = Arc::new(FixedHaStatus("backup"));
    assert_eq!(status.state_label(), "backup");
}
