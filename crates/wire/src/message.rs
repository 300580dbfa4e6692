// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The envelope one control-socket frame carries inbound: either a
//! mutating [`crate::Request`] or a read-only [`crate::Query`]. Kept as an
//! explicit outer tag (rather than `#[serde(untagged)]`) since `Request`
//! and `Query` both carry a bare `Ping` variant with an identical wire
//! shape — untagged deserialization could never distinguish them.

use serde::{Deserialize, Serialize};

use crate::{Query, Request};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "body")]
pub enum Message {
    Request(Request),
    Query(Query),
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
