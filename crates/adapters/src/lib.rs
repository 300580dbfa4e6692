// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel-facing capability traits `wardd` drives: the Link Layer,
//! Packet-Filter Layer, DHCP lease reclaim, and eBPF offload bridge. Each
//! has a Linux backend and a stub backend used on other platforms, in
//! tests, and by the `DryRun` renderer.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod dhcp;
pub mod ebpf;
pub mod link;
pub mod packet_filter;

pub use dhcp::{DhcpError, DhcpReclaimer, StubDhcpReclaimer};
pub use ebpf::{BudgetCoordinator, EbpfBridge, EbpfBudget, EbpfError, EbpfFeature, FlowKey, StubEbpfBridge, Verdict};
pub use link::{derive_status, derive_virtual_mac, Duplex, InterfaceState, LinkError, LinkLayer, LinkStats, LinkStatus, StubLinkLayer};
pub use packet_filter::{IpSetMember, PacketFilter, PacketFilterError, StubPacketFilter};

#[cfg(target_os = "linux")]
pub use link::NetlinkLinkLayer;
#[cfg(target_os = "linux")]
pub use packet_filter::NftPacketFilter;
