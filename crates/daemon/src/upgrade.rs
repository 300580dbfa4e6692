// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upgrade Manager, platform-specific half: the UNIX-socket FD-passing
//! transport that hands listening sockets from the old process to the
//! standby across an `exec`, and the PID-file keeper that keeps
//! `$run_dir/wardd.pid` pointed at whichever process currently holds the
//! control socket.
//!
//! The handoff state machine and checksum verification are
//! platform-independent and live in `ward_engine::upgrade::UpgradeManager`;
//! this module only moves bytes and file descriptors across the socket.

use std::io::Write;
use std::os::fd::RawFd;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

use nix::sys::socket::{recvmsg, sendmsg, ControlMessage, ControlMessageOwned, MsgFlags};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::warn;
use ward_core::WardError;

#[derive(Debug, Error)]
pub enum HandoffTransportError {
    #[error("failed to encode handoff manifest: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("handoff socket I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("handoff socket operation failed: {0}")]
    Errno(#[from] nix::Error),
    #[error("peer sent no file descriptors")]
    NoFdsReceived,
    #[error("manifest named {expected} descriptors but {received} arrived")]
    CountMismatch { expected: usize, received: usize },
}

impl From<HandoffTransportError> for WardError {
    fn from(err: HandoffTransportError) -> Self {
        WardError::UpgradeFailed(err.to_string())
    }
}

/// Sends every `(name, fd)` pair in one `sendmsg` call: the manifest
/// (just the ordered names) travels as the regular message body, the
/// descriptors themselves ride along in an `SCM_RIGHTS` control message
/// in the same order, so the receiver can zip them back together.
pub fn send_handoff(stream: &UnixStream, entries: &[(String, RawFd)]) -> Result<(), HandoffTransportError> {
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    let manifest = serde_json::to_vec(&names)?;
    let fds: Vec<RawFd> = entries.iter().map(|(_, fd)| *fd).collect();
    let cmsg = [ControlMessage::ScmRights(&fds)];

    let iov = [std::io::IoSlice::new(&manifest)];
    let no_addr: Option<&nix::sys::socket::UnixAddr> = None;
    sendmsg(stream.as_fd_raw(), &iov, &cmsg, MsgFlags::empty(), no_addr)?;
    Ok(())
}

/// Receives a handoff sent by [`send_handoff`], returning the manifest
/// names zipped with the descriptors that arrived in the same order.
pub fn recv_handoff(stream: &UnixStream) -> Result<Vec<(String, RawFd)>, HandoffTransportError> {
    let mut buf = [0u8; 4096];
    let mut cmsg_buf = nix::cmsg_space!([RawFd; 16]);
    let mut iov = [std::io::IoSliceMut::new(&mut buf)];

    let msg = recvmsg::<nix::sys::socket::UnixAddr>(
        stream.as_fd_raw(),
        &mut iov,
        Some(&mut cmsg_buf),
        MsgFlags::empty(),
    )?;

    let mut fds = Vec::new();
    for cmsg in msg.cmsgs()? {
        if let ControlMessageOwned::ScmRights(received) = cmsg {
            fds.extend(received);
        }
    }
    if fds.is_empty() {
        return Err(HandoffTransportError::NoFdsReceived);
    }

    let n = msg.bytes;
    let names: Vec<String> = serde_json::from_slice(&buf[..n])?;
    if names.len() != fds.len() {
        return Err(HandoffTransportError::CountMismatch { expected: names.len(), received: fds.len() });
    }
    Ok(names.into_iter().zip(fds).collect())
}

trait AsRawFdExt {
    fn as_fd_raw(&self) -> RawFd;
}

impl AsRawFdExt for UnixStream {
    fn as_fd_raw(&self) -> RawFd {
        std::os::fd::AsRawFd::as_raw_fd(self)
    }
}

/// Keeps `$run_dir/wardd.pid` pointed at this process on a fixed tick.
///
/// Exists for the upgrade handoff: the PID file is part of what a process
/// manager (systemd, a supervisor) watches to know which PID currently
/// owns the service, and the standby takes over that identity the moment
/// it starts accepting connections rather than when the old process
/// finally exits.
pub struct PidFileKeeper {
    handle: JoinHandle<()>,
}

impl PidFileKeeper {
    pub fn spawn(path: PathBuf, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = rewrite_pid_file(&path) {
                    warn!(error = %e, "failed to refresh pid file");
                }
            }
        });
        Self { handle }
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

fn rewrite_pid_file(path: &PathBuf) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new().write(true).truncate(true).create(true).open(path)?;
    writeln!(file, "{}", std::process::id())
}

#[cfg(test)]
#[path = "upgrade_tests.rs"]
mod tests;
