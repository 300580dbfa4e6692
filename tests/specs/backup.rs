//! Backup create/list/pin round trip.

use serial_test::serial;

use crate::support::{require_run_dir, Daemon};

#[test]
#[serial]
fn create_then_list_shows_the_new_backup() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    let daemon = Daemon::spawn();

    let create = daemon
        .wardctl()
        .args(["backup", "create", "--comment", "before maintenance"])
        .output()
        .expect("run wardctl backup create");
    assert!(create.status.success(), "stderr: {}", String::from_utf8_lossy(&create.stderr));

    let list = daemon.wardctl().args(["backup", "list"]).output().expect("run wardctl backup list");
    assert!(list.status.success());
    let stdout = String::from_utf8_lossy(&list.stdout);
    assert!(stdout.contains("before maintenance"), "backup list should show the comment:\n{stdout}");
}

#[test]
#[serial]
fn pinning_a_backup_is_reflected_in_the_list() {
    if require_run_dir().is_none() {
        eprintln!("skipping: /run/ward is not writable in this environment");
        return;
    }
    let daemon = Daemon::spawn();

    daemon
        .wardctl()
        .args(["backup", "create", "--comment", "pin-me"])
        .output()
        .expect("run wardctl backup create");

    let listed = daemon.wardctl().args(["backup", "list"]).output().expect("list backups");
    let stdout = String::from_utf8_lossy(&listed.stdout);
    let id = stdout
        .lines()
        .find(|line| line.contains("pin-me"))
        .and_then(|line| line.split_whitespace().next())
        .expect("backup id in list output")
        .to_string();

    let pin = daemon
        .wardctl()
        .args(["backup", "pin", &id, "true"])
        .output()
        .expect("run wardctl backup pin");
    assert!(pin.status.success(), "stderr: {}", String::from_utf8_lossy(&pin.stderr));

    let relisted = daemon.wardctl().args(["backup", "list"]).output().expect("list backups again");
    let relisted_stdout = String::from_utf8_lossy(&relisted.stdout);
    let pinned_line = relisted_stdout
        .lines()
        .find(|line| line.contains("pin-me"))
        .expect("pinned backup still listed");
    assert!(pinned_line.contains("pinned=true"), "line should show pinned=true: {pinned_line}");
}
