/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod types;
pub use types::*;

pub mod addr;
pub mod client;

mod reply;
pub use reply::Socks5ReplyCode;

mod credentials;
pub use credentials::Socks5Credentials;

mod dialer;
pub use dialer::Socks5StreamDialer;

pub mod config;
