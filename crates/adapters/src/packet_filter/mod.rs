// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Packet-Filter Layer: compiles policies to kernel filter rules and
//! maintains named IP-sets, static and dynamic.

pub mod compile;
mod stub;

#[cfg(target_os = "linux")]
mod nft;

pub use stub::StubPacketFilter;

#[cfg(target_os = "linux")]
pub use nft::NftPacketFilter;

use std::net::IpAddr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use ward_core::{IpSet, Policy, WardError};

#[derive(Debug, Error)]
pub enum PacketFilterError {
    #[error("rule compilation failed: {0}")]
    Compile(String),

    #[error("no such ipset: {0}")]
    UnknownSet(String),

    #[error("kernel packet-filter operation failed: {0}")]
    Kernel(String),
}

impl From<PacketFilterError> for WardError {
    fn from(err: PacketFilterError) -> Self {
        WardError::KernelApplyFailed(err.to_string())
    }
}

/// One element of a dynamic or static ipset, with its expiry if dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpSetMember {
    pub address: IpAddr,
    pub expires_at: Option<Instant>,
}

/// Compile policies/ipsets to kernel state and maintain dynamic
/// authorizations.
#[async_trait]
pub trait PacketFilter: Send + Sync {
    /// Builds the full ruleset from `policies`/`ipsets` and swaps it in
    /// atomically; never leaves the kernel half-applied.
    async fn apply(&self, policies: &[Policy], ipsets: &[IpSet]) -> Result<(), PacketFilterError>;

    async fn authorize_ip(
        &self,
        set: &str,
        ip: IpAddr,
        ttl: Duration,
    ) -> Result<(), PacketFilterError>;

    async fn revoke_ip(&self, set: &str, ip: IpAddr) -> Result<(), PacketFilterError>;

    async fn list_ipset(&self, set: &str) -> Result<Vec<IpSetMember>, PacketFilterError>;

    async fn check_ipset(&self, set: &str, ip: IpAddr) -> Result<bool, PacketFilterError>;
}
