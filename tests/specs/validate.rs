//! `wardctl validate` runs the config loader locally, with no daemon
//! involved — a rejected document exits 1 (config error from the loader).

use assert_cmd::cargo::CommandCargoExt;
use std::io::Write;
use std::process::Command;

fn write_doc(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create doc");
    file.write_all(contents.as_bytes()).expect("write doc");
    path
}

#[test]
fn validate_accepts_a_well_formed_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_doc(
        &dir,
        "good.hcl",
        r#"
        interface "eth0" {
          zone = "wan"
          mtu = 1500
        }
        zone "wan" {
          interfaces = ["eth0"]
        }
        "#,
    );

    let output = Command::cargo_bin("wardctl")
        .expect("locate wardctl binary")
        .args(["validate", path.to_str().expect("utf8 path")])
        .output()
        .expect("run wardctl validate");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is valid"));
}

#[test]
fn validate_rejects_mtu_outside_the_documented_range() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_doc(&dir, "bad.hcl", r#"interface "eth0" { mtu = 9217 }"#);

    let output = Command::cargo_bin("wardctl")
        .expect("locate wardctl binary")
        .args(["validate", path.to_str().expect("utf8 path")])
        .output()
        .expect("run wardctl validate");

    assert_eq!(output.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn validate_rejects_a_document_that_does_not_parse() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_doc(&dir, "broken.hcl", "interface \"eth0\" { this is not hcl");

    let output = Command::cargo_bin("wardctl")
        .expect("locate wardctl binary")
        .args(["validate", path.to_str().expect("utf8 path")])
        .output()
        .expect("run wardctl validate");

    assert_eq!(output.status.code(), Some(1));
}
