// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC Protocol for `wardd`/`wardctl` communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod message;
mod query;
mod request;
mod response;
mod types;
mod wire;

pub use message::Message;
pub use query::Query;
pub use request::Request;
pub use response::Response;
pub use types::{BackupSummary, IpSetEntry, RouteEntry, StatusSummary, SystemStats};
pub use wire::{decode, encode, read_message, write_message, ProtocolError, MAX_FRAME_LEN};
