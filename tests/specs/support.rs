//! Shared harness for workspace-level specs: spawns the real `wardd`
//! binary and drives it with `wardctl`.
//!
//! `wardd`'s control socket and PID file are fixed at `/run/ward/*`
//! (`$run_dir/<name>.sock`, no override) so only one instance can run on
//! a given host at a time; every daemon-spawning test is `#[serial]` and
//! skips instead of failing when `/run/ward` isn't writable, matching how
//! a privileged host-resident daemon is normally exercised in CI (a
//! container with permission to manage `/run`).

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::cargo::CommandCargoExt;

pub const RUN_DIR: &str = "/run/ward";
pub const WAIT_MAX_MS: u64 = 2_000;

/// `None` when the caller lacks permission to manage `/run/ward` — the
/// daemon-spawning tests should print a skip notice and return early
/// rather than fail.
pub fn require_run_dir() -> Option<()> {
    std::fs::create_dir_all(RUN_DIR).ok()?;
    let probe = PathBuf::from(RUN_DIR).join(".wardtest-write-probe");
    std::fs::write(&probe, b"").ok()?;
    let _ = std::fs::remove_file(&probe);
    Some(())
}

pub struct Daemon {
    child: Child,
    pub state_dir: tempfile::TempDir,
}

impl Daemon {
    pub fn spawn() -> Self {
        cleanup_run_dir();
        let state_dir = tempfile::tempdir().expect("tempdir");
        let child = Command::cargo_bin("wardd")
            .expect("locate wardd binary")
            .env("WARD_STATE_DIR", state_dir.path())
            .env("WARD_LOG_LEVEL", "debug")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn wardd");

        let daemon = Self { child, state_dir };
        let socket = PathBuf::from(RUN_DIR).join("wardd.sock");
        let ready = wait_for(WAIT_MAX_MS, || socket.exists());
        assert!(ready, "wardd did not create its control socket in time");
        daemon
    }

    pub fn wardctl(&self) -> Command {
        let mut cmd = Command::cargo_bin("wardctl").expect("locate wardctl binary");
        cmd.env("WARD_STATE_DIR", self.state_dir.path());
        cmd
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        cleanup_run_dir();
    }
}

fn cleanup_run_dir() {
    let _ = std::fs::remove_file(PathBuf::from(RUN_DIR).join("wardd.sock"));
    let _ = std::fs::remove_file(PathBuf::from(RUN_DIR).join("wardd.pid"));
}

/// Creates a `dummy`-type kernel net device for tests that exercise the
/// real Network Reconciler / Link Layer against an interface name — `wardd`
/// configures actual kernel interfaces, so `AddInterface`/`Apply` scenarios
/// need one to exist. Requires `NET_ADMIN` and the `dummy` module; returns
/// `false` (and the test should skip) when the device can't be created.
pub struct DummyInterface {
    name: String,
}

impl DummyInterface {
    pub fn create(name: &str) -> Option<Self> {
        let add = Command::new("ip")
            .args(["link", "add", name, "type", "dummy"])
            .status()
            .ok()?;
        if !add.success() {
            return None;
        }
        let _ = Command::new("ip").args(["link", "set", name, "up"]).status();
        Some(Self { name: name.to_string() })
    }
}

impl Drop for DummyInterface {
    fn drop(&mut self) {
        let _ = Command::new("ip").args(["link", "del", &self.name]).status();
    }
}

pub fn wait_for(max_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
