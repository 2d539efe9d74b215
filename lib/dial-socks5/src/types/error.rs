/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use dial_transport::AddrSplitError;

use super::SocksAuthMethod;
use crate::Socks5ReplyCode;

#[derive(Error, Debug)]
pub enum SocksNegotiationError {
    #[error("invalid protocol version {0}, expected 5")]
    InvalidVersion(u8),
    #[error("invalid auth version {0}, expected 1")]
    InvalidAuthVersion(u8),
    #[error("invalid addr type {0}")]
    InvalidAddrType(u8),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SocksCredentialError {
    #[error("username must be at least 1 byte")]
    EmptyUsername,
    #[error("username exceeds 255 bytes ({0})")]
    UsernameTooLong(usize),
    #[error("password must be at least 1 byte")]
    EmptyPassword,
    #[error("password exceeds 255 bytes ({0})")]
    PasswordTooLong(usize),
}

#[derive(Error, Debug)]
pub enum Socks5AddrError {
    #[error("invalid host:port address: {0}")]
    InvalidHostPort(#[from] AddrSplitError),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    #[error("domain name of {0} bytes exceeds 255 bytes")]
    DomainTooLong(usize),
}

#[derive(Error, Debug)]
pub enum SocksReplyParseError {
    #[error("read failed: {0:?}")]
    ReadFailed(#[from] io::Error),
    #[error("invalid socks protocol: {0}")]
    InvalidProtocol(#[from] SocksNegotiationError),
}

#[derive(Error, Debug)]
pub enum Socks5DialError {
    #[error("could not connect to socks5 proxy: {0}")]
    ConnectFailed(io::Error),
    #[error("failed to create socks5 address: {0}")]
    InvalidAddress(#[from] Socks5AddrError),
    #[error("write failed: {0:?}")]
    WriteFailed(io::Error),
    #[error("read failed: {0:?}")]
    ReadFailed(io::Error),
    #[error("invalid socks protocol: {0}")]
    InvalidProtocol(#[from] SocksNegotiationError),
    #[error("unsupported auth method {0} selected by server")]
    UnsupportedAuthMethod(SocksAuthMethod),
    #[error("auth failed with status {0}")]
    AuthFailed(u8),
    #[error("request failed: {0}")]
    RequestFailed(Socks5ReplyCode),
    #[error("cancelled")]
    Cancelled,
}

impl Socks5DialError {
    /// The reply code sent by the proxy, if the request was rejected by it.
    pub fn reply_code(&self) -> Option<Socks5ReplyCode> {
        if let Socks5DialError::RequestFailed(code) = self {
            Some(*code)
        } else {
            None
        }
    }
}

impl From<SocksReplyParseError> for Socks5DialError {
    fn from(e: SocksReplyParseError) -> Self {
        match e {
            SocksReplyParseError::ReadFailed(e) => Socks5DialError::ReadFailed(e),
            SocksReplyParseError::InvalidProtocol(e) => Socks5DialError::InvalidProtocol(e),
        }
    }
}
