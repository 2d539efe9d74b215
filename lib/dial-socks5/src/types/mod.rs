/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod auth;
pub use auth::SocksAuthMethod;

mod error;
pub use error::{
    Socks5AddrError, Socks5DialError, SocksCredentialError, SocksNegotiationError,
    SocksReplyParseError,
};

mod cmd;
pub use cmd::SocksCommand;

pub(crate) const SOCKS5_VERSION: u8 = 0x05;
pub(crate) const USER_AUTH_VERSION: u8 = 0x01;
