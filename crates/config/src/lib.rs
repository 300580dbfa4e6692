// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ward-config: parses the declarative HCL configuration document into a
//! [`ward_core::Config`].

pub mod error;
pub mod loader;
pub mod raw;

pub use error::{LoadError, RecoveredError, Warning};
pub use loader::{forgiving_load, load};
