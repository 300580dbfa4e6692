// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin RPC client: connect to the control socket, send exactly one
//! [`Message`], read exactly one [`Response`] back.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::net::UnixStream;
use ward_wire::{Message, ProtocolError, Query, Request, Response};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to wardd at {path}: {source}")]
    Connect { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("wardd returned an error: {0}")]
    Daemon(String),
}

impl ClientError {
    /// True when the socket simply isn't there — the usual "daemon not
    /// running" case, as opposed to a protocol-level failure.
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::Connect { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    pub async fn connect(socket_path: &Path) -> Result<Self, ClientError> {
        let stream =
            UnixStream::connect(socket_path).await.map_err(|e| ClientError::Connect {
                path: socket_path.to_path_buf(),
                source: e,
            })?;
        Ok(Self { stream })
    }

    pub async fn request(mut self, request: Request) -> Result<Response, ClientError> {
        ward_wire::write_message(&mut self.stream, &Message::Request(request)).await?;
        let response: Response = ward_wire::read_message(&mut self.stream).await?;
        Ok(response)
    }

    pub async fn query(mut self, query: Query) -> Result<Response, ClientError> {
        ward_wire::write_message(&mut self.stream, &Message::Query(query)).await?;
        let response: Response = ward_wire::read_message(&mut self.stream).await?;
        Ok(response)
    }
}

/// Unwrap a successful, non-error [`Response`] or turn `Response::Err` into
/// a [`ClientError`] — every command handler funnels its response through
/// this before inspecting the variant it actually wants.
pub fn ok_or_daemon_error(response: Response) -> Result<Response, ClientError> {
    match response.err() {
        Some(err) => Err(ClientError::Daemon(err.to_string())),
        None => Ok(response),
    }
}
