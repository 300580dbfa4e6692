//! Workspace-level integration specs, run with `cargo test -p ward-specs`.
//!
//! Organized by area under `tests/specs/`, one file per scenario group.

#[path = "specs/support.rs"]
mod support;

#[path = "specs/validate.rs"]
mod validate;

#[path = "specs/daemon_lifecycle.rs"]
mod daemon_lifecycle;

#[path = "specs/config_apply.rs"]
mod config_apply;

#[path = "specs/safe_mode.rs"]
mod safe_mode;

#[path = "specs/backup.rs"]
mod backup;
