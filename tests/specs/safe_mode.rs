//! Safe mode (DESIGN.md Open Question #4): while active, `Apply` is
//! refused; status/ping stay reachable; `SafeModeExit` restores normal
//! operation.

use serial_test::serial;

use crate::support::{require_run_dir, Daemon};

#[test]
#[serial]
fn apply_is_refused_while_safe_mode_is_active() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    let daemon = Daemon::spawn();

    let enter = daemon.wardctl().args(["safe-mode", "enter"]).output().expect("enter safe mode");
    assert!(enter.status.success());

    let status = daemon.wardctl().arg("status").output().expect("run wardctl status");
    assert!(String::from_utf8_lossy(&status.stdout).contains("safe mode: true"));

    let apply = daemon.wardctl().arg("apply").output().expect("run wardctl apply");
    assert!(!apply.status.success(), "apply must be refused while safe mode is active");

    let ping = daemon.wardctl().arg("ping").output().expect("run wardctl ping");
    assert!(ping.status.success(), "ping must stay reachable in safe mode");
}

#[test]
#[serial]
fn exiting_safe_mode_allows_apply_again() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    let daemon = Daemon::spawn();

    daemon.wardctl().args(["safe-mode", "enter"]).output().expect("enter safe mode");
    let exit = daemon.wardctl().args(["safe-mode", "exit"]).output().expect("exit safe mode");
    assert!(exit.status.success());

    let status = daemon.wardctl().arg("status").output().expect("run wardctl status");
    assert!(String::from_utf8_lossy(&status.stdout).contains("safe mode: false"));

    // Nothing staged, so `apply` fails for a different reason (NothingStaged)
    // than `SafeModeActive` — confirms the safe-mode gate itself lifted.
    let apply = daemon.wardctl().arg("apply").output().expect("run wardctl apply");
    assert!(!apply.status.success());
    assert!(!String::from_utf8_lossy(&apply.stderr).to_lowercase().contains("safe mode"));
}
