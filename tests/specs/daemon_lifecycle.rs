//! Daemon startup, `ping`/`status`, and graceful shutdown.

use assert_cmd::cargo::CommandCargoExt;
use std::process::Command;

use crate::support::{require_run_dir, Daemon, RUN_DIR};
use serial_test::serial;

#[test]
#[serial]
fn ping_and_status_succeed_once_the_daemon_is_up() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    let daemon = Daemon::spawn();

    let ping = daemon.wardctl().arg("ping").output().expect("run wardctl ping");
    assert!(ping.status.success());
    assert!(String::from_utf8_lossy(&ping.stdout).contains("pong"));

    let status = daemon.wardctl().arg("status").output().expect("run wardctl status");
    assert!(status.status.success());
    let stdout = String::from_utf8_lossy(&status.stdout);
    assert!(stdout.contains("generation:"));
    assert!(stdout.contains("safe mode: false"));
}

#[test]
#[serial]
fn status_reports_generation_zero_on_first_boot() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    let daemon = Daemon::spawn();

    let status = daemon.wardctl().arg("status").output().expect("run wardctl status");
    assert!(String::from_utf8_lossy(&status.stdout).contains("generation: 0"));
}

#[test]
#[serial]
fn ping_fails_when_the_daemon_is_not_running() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    std::fs::remove_file(std::path::Path::new(RUN_DIR).join("wardd.sock")).ok();

    let output = Command::cargo_bin("wardctl")
        .expect("locate wardctl binary")
        .arg("ping")
        .output()
        .expect("run wardctl ping");

    assert!(!output.status.success());
}
