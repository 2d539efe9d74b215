/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// A fixed peer, such as a proxy server, to which new streams can be opened.
#[async_trait]
pub trait StreamEndpoint: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Open a new connection to the peer.
    ///
    /// The returned stream is owned by the caller, who is responsible for closing it.
    async fn connect_stream(&self, cancel: &CancellationToken) -> io::Result<Self::Stream>;
}

pub struct TcpStreamEndpoint {
    peer: String,
    connect_timeout: Option<Duration>,
}

impl TcpStreamEndpoint {
    pub fn new<T: Into<String>>(peer: T) -> Self {
        TcpStreamEndpoint {
            peer: peer.into(),
            connect_timeout: None,
        }
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = Some(timeout);
    }

    #[inline]
    pub fn peer(&self) -> &str {
        &self.peer
    }
}

#[async_trait]
impl StreamEndpoint for TcpStreamEndpoint {
    type Stream = TcpStream;

    async fn connect_stream(&self, cancel: &CancellationToken) -> io::Result<TcpStream> {
        tcp_connect(&self.peer, self.connect_timeout, cancel).await
    }
}

pub(crate) async fn tcp_connect(
    addr: &str,
    connect_timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> io::Result<TcpStream> {
    let connect = with_connect_timeout(TcpStream::connect(addr), connect_timeout);

    let stream = tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            Err(io::Error::new(io::ErrorKind::Interrupted, "tcp connect cancelled"))
        }
        r = connect => r,
    }?;
    trace!("tcp connected to {addr} from {:?}", stream.local_addr());
    Ok(stream)
}

async fn with_connect_timeout<F, T>(connect: F, timeout: Option<Duration>) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "tcp connect timed out"))?,
        None => connect.await,
    }
}
