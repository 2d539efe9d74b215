/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! Conversion between `host:port` strings and the socks5 address encoding:
//!
//! +------+----------+----------+
//! | ATYP |   ADDR   |   PORT   |
//! +------+----------+----------+
//! |  1   | Variable |    2     |
//! +------+----------+----------+

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use dial_transport::{join_host_port, split_host_port};

use crate::{Socks5AddrError, SocksNegotiationError, SocksReplyParseError};

pub const ATYP_IPV4: u8 = 0x01;
pub const ATYP_DOMAIN: u8 = 0x03;
pub const ATYP_IPV6: u8 = 0x04;

const DOMAIN_MAX_LENGTH: usize = u8::MAX as usize;

/// Append the encoded form of `addr` to `buf`.
///
/// IP literals are sent as is, any other host is sent as a domain name.
/// Nothing is appended if an error is returned.
pub fn put_socks5_addr(buf: &mut BytesMut, addr: &str) -> Result<(), Socks5AddrError> {
    let (host, port) = split_host_port(addr)?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Socks5AddrError::InvalidPort(port.to_string()));
    }
    let port = u16::from_str(port).map_err(|_| Socks5AddrError::InvalidPort(port.to_string()))?;

    match IpAddr::from_str(host) {
        Ok(IpAddr::V4(ip4)) => {
            buf.put_u8(ATYP_IPV4);
            buf.put_slice(&ip4.octets());
        }
        Ok(IpAddr::V6(ip6)) => {
            // No need to do ipv4 mapped address check here
            buf.put_u8(ATYP_IPV6);
            buf.put_slice(&ip6.octets());
        }
        Err(_) => {
            if host.len() > DOMAIN_MAX_LENGTH {
                return Err(Socks5AddrError::DomainTooLong(host.len()));
            }
            buf.put_u8(ATYP_DOMAIN);
            buf.put_u8(host.len() as u8);
            buf.put_slice(host.as_bytes());
        }
    }
    buf.put_u16(port);
    Ok(())
}

/// Read the address body and port that follow the `addr_type` byte,
/// and return them as a `host:port` string.
pub async fn read_socks5_addr<R>(
    reader: &mut R,
    addr_type: u8,
) -> Result<String, SocksReplyParseError>
where
    R: AsyncRead + Unpin,
{
    let host = match addr_type {
        ATYP_IPV4 => {
            let mut ip_bytes = [0u8; 4];
            reader.read_exact(&mut ip_bytes).await?;
            Ipv4Addr::from(ip_bytes).to_string()
        }
        ATYP_IPV6 => {
            let mut ip_bytes = [0u8; 16];
            reader.read_exact(&mut ip_bytes).await?;
            Ipv6Addr::from(ip_bytes).to_string()
        }
        ATYP_DOMAIN => {
            let len = reader.read_u8().await?;
            let mut domain = vec![0u8; len as usize];
            reader.read_exact(&mut domain).await?;
            String::from_utf8_lossy(&domain).into_owned()
        }
        _ => return Err(SocksNegotiationError::InvalidAddrType(addr_type).into()),
    };
    let port = reader.read_u16().await?;
    Ok(join_host_port(&host, &port.to_string()))
}
