//! Starting from an empty running config, staging a new interface and
//! applying it makes it visible in the running configuration.

use serial_test::serial;
use std::io::Write;

use crate::support::{require_run_dir, Daemon, DummyInterface};

#[test]
#[serial]
fn add_interface_via_stage_then_apply() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    let Some(_eth1) = DummyInterface::create("eth1") else {
        eprintln!("skipping: could not create a dummy net device (need NET_ADMIN)");
        return;
    };
    let daemon = Daemon::spawn();

    let hcl_path = daemon.state_dir.path().join("eth1.hcl");
    let mut file = std::fs::File::create(&hcl_path).expect("create interface payload");
    file.write_all(b"mtu = 1500\n").expect("write interface payload");

    let add = daemon
        .wardctl()
        .args(["interface", "add", "eth1", hcl_path.to_str().expect("utf8 path")])
        .output()
        .expect("run wardctl interface add");
    assert!(add.status.success(), "stderr: {}", String::from_utf8_lossy(&add.stderr));

    let apply = daemon.wardctl().arg("apply").output().expect("run wardctl apply");
    assert!(apply.status.success(), "stderr: {}", String::from_utf8_lossy(&apply.stderr));

    let config =
        daemon.wardctl().args(["get-config"]).output().expect("run wardctl get-config");
    assert!(config.status.success());
    let document = String::from_utf8_lossy(&config.stdout);
    assert!(document.contains("eth1"), "running config should contain eth1:\n{document}");
}

#[test]
#[serial]
fn discard_drops_a_staged_change_without_applying_it() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    let daemon = Daemon::spawn();

    let hcl_path = daemon.state_dir.path().join("eth2.hcl");
    std::fs::write(&hcl_path, b"mtu = 1500\n").expect("write interface payload");

    daemon
        .wardctl()
        .args(["interface", "add", "eth2", hcl_path.to_str().expect("utf8 path")])
        .output()
        .expect("run wardctl interface add");

    let discard = daemon.wardctl().arg("discard").output().expect("run wardctl discard");
    assert!(discard.status.success());

    // Nothing was ever applied, so the running document must still lack it.
    let running =
        daemon.wardctl().args(["get-config"]).output().expect("run wardctl get-config");
    let document = String::from_utf8_lossy(&running.stdout);
    assert!(!document.contains("eth2"), "discarded interface must not reach running:\n{document}");

    // And the staged slot is empty again, so asking for it is an error.
    let staged = daemon
        .wardctl()
        .args(["get-config", "--staged"])
        .output()
        .expect("run wardctl get-config --staged");
    assert!(!staged.status.success(), "nothing should be staged after discard");
}
