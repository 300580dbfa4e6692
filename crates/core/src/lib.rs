// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ward-core: the configuration model, diff engine, schedule compiler, clock
//! abstraction, and closed error taxonomy shared by every other `ward-*`
//! crate.

pub mod macros;

pub mod apply_hook;
pub mod clock;
pub mod diff;
pub mod error;
pub mod id;
pub mod model;
pub mod schedule;

pub use apply_hook::{ApplyHook, HookError};
pub use clock::{Clock, FakeClock, SystemClock};
pub use diff::{diff, Change, ConfigDiff};
pub use error::WardError;
pub use id::{short, IdBuf};
pub use model::{
    validate, Action, AddressMatch, Bond, BondMode, Config, ConfigMeta, ConfigSource, DhcpConfig,
    DhcpScope, DnsConfig, HaConfig, HaMode, Interface, IpSet, MacAddr, MdnsConfig, PortSpec,
    Policy, Protocol, ReplicationConfig, Rule, SshConfig, TimeOfDay, ValidationIssue,
    ValidationReport, VirtualIp, VirtualMac, VirtualResource, Vlan, VpnConfig, VrfConfig, Weekday,
    Zone, ZoneManagement, ZoneMatch, MTU_MAX, MTU_MIN, SCHEMA_VERSION,
};
pub use schedule::{compile_window, HourRange, ScheduleError};
