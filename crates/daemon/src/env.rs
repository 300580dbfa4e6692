// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: `WARD_STATE_DIR` > `/var/lib/ward`.
///
/// Unlike a per-user tool, `wardd` is a host-resident appliance daemon with
/// no XDG session to anchor on; the system-wide path is the sane default.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("WARD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(PathBuf::from("/var/lib/ward"))
}

/// Log verbosity: `WARD_LOG_LEVEL` > `DEBUG` (any non-empty value means
/// `debug`) > `info`.
pub fn log_level() -> String {
    if let Ok(level) = std::env::var("WARD_LOG_LEVEL") {
        if !level.is_empty() {
            return level;
        }
    }
    if std::env::var("DEBUG").is_ok_and(|v| !v.is_empty()) {
        return "debug".to_string();
    }
    "info".to_string()
}
