// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single response shape every [`crate::Request`]/[`crate::Query`]
//! produces: exactly one per request, `Err` carrying the closed
//! [`WardError`] taxonomy so a client can match on failure kind regardless
//! of which subsystem raised it.

use crate::types::{BackupSummary, IpSetEntry, RouteEntry, StatusSummary, SystemStats};
use serde::{Deserialize, Serialize};
use ward_core::WardError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Status(StatusSummary),
    /// Rendered HCL (or JSON, depending on the request) for `GetConfig`/
    /// `GetConfigSection`.
    ConfigDocument(String),
    BackupList(Vec<BackupSummary>),
    Backup(BackupSummary),
    IpSetMembers(Vec<IpSetEntry>),
    IpSetCheck(bool),
    SystemStats(SystemStats),
    SystemRoutes(Vec<RouteEntry>),
    Pong,
    Collaborator(serde_json::Value),
    Err(WardError),
}

impl Response {
    pub fn is_ok(&self) -> bool {
        !matches!(self, Response::Err(_))
    }

    pub fn err(&self) -> Option<&WardError> {
        match self {
            Response::Err(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WardError> for Response {
    fn from(err: WardError) -> Self {
        Response::Err(err)
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
