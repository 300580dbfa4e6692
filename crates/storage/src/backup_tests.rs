// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use jiff::Timestamp;
use ward_core::Config;

fn ts(secs: i64) -> Timestamp {
    Timestamp::from_second(secs).expect("valid timestamp")
}

#[test]
fn create_then_load_round_trips_the_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = BackupStore::new(dir.path());
    let config = Config::default();

    let created = store.create(&config, Some("pre-upgrade".into()), ts(1_000)).expect("create");
    let loaded = store.load(&created.id).expect("load");

    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.comment.as_deref(), Some("pre-upgrade"));
    assert!(!loaded.pinned);
    assert_eq!(loaded.config, config);
}

#[test]
fn list_orders_newest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = BackupStore::new(dir.path());
    let config = Config::default();

    let older = store.create(&config, None, ts(1_000)).expect("create");
    let newer = store.create(&config, None, ts(2_000)).expect("create");

    let summaries = store.list().expect("list");
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
}

#[test]
fn set_pinned_persists_across_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = BackupStore::new(dir.path());
    let created = store.create(&Config::default(), None, ts(1_000)).expect("create");

    store.set_pinned(&created.id, true).expect("pin");
    let reloaded = store.load(&created.id).expect("load");
    assert!(reloaded.pinned);
}

#[test]
fn load_missing_id_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = BackupStore::new(dir.path());
    let err = store.load("bkp_doesnotexist").unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[test]
fn restore_returns_the_backed_up_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = BackupStore::new(dir.path());
    let mut config = Config::default();
    config.state_dir = Some("/var/lib/ward".into());
    let created = store.create(&config, None, ts(1_000)).expect("create");

    let restored = store.restore(&created.id).expect("restore");
    assert_eq!(restored, config);
}
