/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use dial_transport::{PacketDialer, StreamDialer, StreamEndpoint};

use crate::client::socks5_request;
use crate::{Socks5Credentials, Socks5DialError, SocksCommand, SocksCredentialError};

/// Dial streams through a socks5 proxy reached by `E`.
///
/// The auth method, the credentials and the connect request are sent in one
/// write, which saves a round trip compared to a step by step negotiation.
pub struct Socks5StreamDialer<E> {
    endpoint: E,
    packet_dialer: Option<Box<dyn PacketDialer>>,
    credentials: Option<Socks5Credentials>,
}

impl<E: StreamEndpoint> Socks5StreamDialer<E> {
    pub fn new(endpoint: E) -> Self {
        Socks5StreamDialer {
            endpoint,
            packet_dialer: None,
            credentials: None,
        }
    }

    #[inline]
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Use username/password auth for all later requests.
    pub fn set_credentials(
        &mut self,
        username: &[u8],
        password: &[u8],
    ) -> Result<(), SocksCredentialError> {
        let credentials = Socks5Credentials::new(username, password)?;
        self.use_credentials(credentials);
        Ok(())
    }

    pub fn use_credentials(&mut self, credentials: Socks5Credentials) {
        self.credentials = Some(credentials);
    }

    #[inline]
    pub fn credentials(&self) -> Option<&Socks5Credentials> {
        self.credentials.as_ref()
    }

    pub fn enable_packet<P: PacketDialer + 'static>(&mut self, packet_dialer: P) {
        self.packet_dialer = Some(Box::new(packet_dialer));
    }

    pub fn packet_dialer(&self) -> Option<&dyn PacketDialer> {
        self.packet_dialer.as_deref()
    }

    /// Open a new connection to the proxy and send `command` for `addr` on it.
    ///
    /// On success the connection and the bind address reported by the proxy
    /// are returned, and the caller becomes responsible for the connection.
    /// On failure the connection is closed before returning.
    pub async fn request(
        &self,
        cancel: &CancellationToken,
        command: SocksCommand,
        addr: &str,
    ) -> Result<(E::Stream, String), Socks5DialError> {
        let mut stream = tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(Socks5DialError::Cancelled),
            r = self.endpoint.connect_stream(cancel) => r.map_err(Socks5DialError::ConnectFailed),
        }?;

        let r = tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(Socks5DialError::Cancelled),
            r = socks5_request(&mut stream, self.credentials.as_ref(), command, addr) => r,
        };
        match r {
            Ok(bind_addr) => Ok((stream, bind_addr)),
            Err(e) => {
                debug!("socks5 {command} request to {addr} failed: {e}");
                // close at once, data left unread is dropped with the stream
                let _ = stream.shutdown().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<E: StreamEndpoint> StreamDialer for Socks5StreamDialer<E> {
    type Stream = E::Stream;
    type Error = Socks5DialError;

    /// The returned error will be [`Socks5DialError::RequestFailed`] if the
    /// proxy replied with a non-zero reply code.
    async fn dial_stream(
        &self,
        cancel: &CancellationToken,
        addr: &str,
    ) -> Result<E::Stream, Socks5DialError> {
        let (stream, _bind_addr) = self.request(cancel, SocksCommand::TcpConnect, addr).await?;
        Ok(stream)
    }
}
