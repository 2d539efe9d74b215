/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

/// The REP field of a socks5 reply.
///
/// Codes not assigned by rfc1928 are kept as [`Socks5ReplyCode::Unassigned`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Socks5ReplyCode {
    Succeeded,
    GeneralServerFailure,
    ForbiddenByRule,
    NetworkUnreachable,
    HostUnreachable,
    ConnectionRefused,
    TtlExpired,
    CommandNotSupported,
    AddressTypeNotSupported,
    Unassigned(u8),
}

impl Socks5ReplyCode {
    pub const fn code(&self) -> u8 {
        match self {
            Socks5ReplyCode::Succeeded => 0x00,
            Socks5ReplyCode::GeneralServerFailure => 0x01,
            Socks5ReplyCode::ForbiddenByRule => 0x02,
            Socks5ReplyCode::NetworkUnreachable => 0x03,
            Socks5ReplyCode::HostUnreachable => 0x04,
            Socks5ReplyCode::ConnectionRefused => 0x05,
            Socks5ReplyCode::TtlExpired => 0x06,
            Socks5ReplyCode::CommandNotSupported => 0x07,
            Socks5ReplyCode::AddressTypeNotSupported => 0x08,
            Socks5ReplyCode::Unassigned(n) => *n,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Socks5ReplyCode::Succeeded)
    }

    const fn message(&self) -> Option<&'static str> {
        let msg = match self {
            // message from rfc1928
            Socks5ReplyCode::Succeeded => "succeeded",
            Socks5ReplyCode::GeneralServerFailure => "general SOCKS server failure",
            Socks5ReplyCode::ForbiddenByRule => "connection not allowed by ruleset",
            Socks5ReplyCode::NetworkUnreachable => "network unreachable",
            Socks5ReplyCode::HostUnreachable => "host unreachable",
            Socks5ReplyCode::ConnectionRefused => "connection refused",
            Socks5ReplyCode::TtlExpired => "TTL expired",
            Socks5ReplyCode::CommandNotSupported => "command not supported",
            Socks5ReplyCode::AddressTypeNotSupported => "address type not supported",
            Socks5ReplyCode::Unassigned(_) => return None,
        };
        Some(msg)
    }
}

impl From<u8> for Socks5ReplyCode {
    fn from(code: u8) -> Self {
        match code {
            0x00 => Socks5ReplyCode::Succeeded,
            0x01 => Socks5ReplyCode::GeneralServerFailure,
            0x02 => Socks5ReplyCode::ForbiddenByRule,
            0x03 => Socks5ReplyCode::NetworkUnreachable,
            0x04 => Socks5ReplyCode::HostUnreachable,
            0x05 => Socks5ReplyCode::ConnectionRefused,
            0x06 => Socks5ReplyCode::TtlExpired,
            0x07 => Socks5ReplyCode::CommandNotSupported,
            0x08 => Socks5ReplyCode::AddressTypeNotSupported,
            n => Socks5ReplyCode::Unassigned(n),
        }
    }
}

impl fmt::Display for Socks5ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => f.write_str(msg),
            None => write!(f, "unknown reply code {}", self.code()),
        }
    }
}

impl std::error::Error for Socks5ReplyCode {}
