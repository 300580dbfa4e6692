// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! eBPF Offload Bridge: a pinned set of programs (XDP blocklist, TC
//! classifier, socket filters, DNS bloom) driven behind a feature
//! registry, each feature gated by [`budget::BudgetCoordinator`]. Program
//! authoring itself is out of scope; this crate specifies only the
//! interface the core uses to drive it.

pub mod budget;
mod stub;

pub use budget::{BudgetCoordinator, EbpfBudget, FeatureCost};
pub use stub::StubEbpfBridge;

use std::net::Ipv4Addr;

use async_trait::async_trait;
use thiserror::Error;
use ward_core::WardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EbpfFeature {
    XdpBlocklist,
    TcClassifier,
    SocketFilter,
    DnsBloom,
}

impl EbpfFeature {
    pub const ALL: [EbpfFeature; 4] =
        [EbpfFeature::XdpBlocklist, EbpfFeature::TcClassifier, EbpfFeature::SocketFilter, EbpfFeature::DnsBloom];
}

/// A flow as the kernel verdict hook sees it: the fields needed to key
/// into the conntrack-seeded flow map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: u8,
}

/// The verdict a flow's callback returns. Never an error: callers treat
/// any internal failure as [`Verdict::Accept`] (fail-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Drop,
    Accept,
    AcceptWithMark(u32),
}

#[derive(Debug, Error)]
pub enum EbpfError {
    #[error("feature {0:?} not attached")]
    NotAttached(EbpfFeature),

    #[error("program load failed: {0}")]
    LoadFailed(String),

    #[error("map update failed: {0}")]
    MapUpdateFailed(String),
}

impl From<EbpfError> for WardError {
    fn from(err: EbpfError) -> Self {
        WardError::KernelApplyFailed(err.to_string())
    }
}

/// Drive the pinned eBPF programs. `verdict` is fail-open by contract:
/// implementations must never propagate an internal error through it.
#[async_trait]
pub trait EbpfBridge: Send + Sync {
    async fn attach(&self, feature: EbpfFeature) -> Result<(), EbpfError>;
    async fn detach(&self, feature: EbpfFeature) -> Result<(), EbpfError>;

    /// Records `ip` in the blocklist map at `unix_nanos`, the time the
    /// caller observed it (host byte order, as seen on the wire).
    async fn update_blocklist(&self, ip: Ipv4Addr, unix_nanos: u64) -> Result<(), EbpfError>;

    async fn update_bloom(&self, domain: &str) -> Result<(), EbpfError>;

    /// Seeds the flow map from the kernel's existing conntrack table;
    /// called once at startup before the verdict hook sees live traffic.
    async fn seed_flows_from_conntrack(&self) -> Result<(), EbpfError>;

    async fn verdict(&self, flow: &FlowKey) -> Verdict;
}
