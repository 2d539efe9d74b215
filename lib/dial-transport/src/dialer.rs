/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UdpSocket};
use tokio_util::sync::CancellationToken;

use crate::endpoint::tcp_connect;

/// Create stream connections to arbitrary `host:port` destinations.
#[async_trait]
pub trait StreamDialer: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;
    type Error: Error + Send + Sync + 'static;

    async fn dial_stream(
        &self,
        cancel: &CancellationToken,
        addr: &str,
    ) -> Result<Self::Stream, Self::Error>;
}

/// Create datagram sockets connected to arbitrary `host:port` destinations.
#[async_trait]
pub trait PacketDialer: Send + Sync {
    async fn dial_packet(&self, cancel: &CancellationToken, addr: &str) -> io::Result<UdpSocket>;
}

#[derive(Default)]
pub struct TcpStreamDialer {
    connect_timeout: Option<Duration>,
}

impl TcpStreamDialer {
    pub fn with_connect_timeout(timeout: Duration) -> Self {
        TcpStreamDialer {
            connect_timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl StreamDialer for TcpStreamDialer {
    type Stream = TcpStream;
    type Error = io::Error;

    async fn dial_stream(&self, cancel: &CancellationToken, addr: &str) -> io::Result<TcpStream> {
        tcp_connect(addr, self.connect_timeout, cancel).await
    }
}

#[derive(Default)]
pub struct UdpPacketDialer {}

impl UdpPacketDialer {
    async fn connect(addr: &str) -> io::Result<UdpSocket> {
        let peer = tokio::net::lookup_host(addr).await?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no address resolved for host")
        })?;
        let bind_ip = match peer {
            SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let socket = UdpSocket::bind(SocketAddr::new(bind_ip, 0)).await?;
        socket.connect(peer).await?;
        Ok(socket)
    }
}

#[async_trait]
impl PacketDialer for UdpPacketDialer {
    async fn dial_packet(&self, cancel: &CancellationToken, addr: &str) -> io::Result<UdpSocket> {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                Err(io::Error::new(io::ErrorKind::Interrupted, "udp connect cancelled"))
            }
            r = UdpPacketDialer::connect(addr) => r,
        }
    }
}
