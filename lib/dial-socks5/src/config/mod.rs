/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use dial_transport::{
    AddressOverride, OverrideStreamDialer, SplitConfig, SplitStreamDialer, TcpStreamEndpoint,
};

use crate::{Socks5Credentials, Socks5StreamDialer};

mod url;
mod yaml;

pub const DEFAULT_SOCKS5_PORT: u16 = 1080;

pub type Socks5ConfiguredDialer =
    OverrideStreamDialer<SplitStreamDialer<Socks5StreamDialer<TcpStreamEndpoint>>>;

/// Everything needed to build a socks5 dialer on top of tcp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Socks5DialerConfig {
    /// `host:port` of the proxy server
    pub proxy: String,
    pub credentials: Option<Socks5Credentials>,
    pub connect_timeout: Option<Duration>,
    /// how the tunnelled outgoing data should be split into writes
    pub split: SplitConfig,
    /// host and port override applied to every destination address
    pub addr_override: AddressOverride,
}

impl Socks5DialerConfig {
    pub fn new<T: Into<String>>(proxy: T) -> Self {
        Socks5DialerConfig {
            proxy: proxy.into(),
            credentials: None,
            connect_timeout: None,
            split: SplitConfig::default(),
            addr_override: AddressOverride::default(),
        }
    }

    pub fn build(&self) -> Socks5ConfiguredDialer {
        let mut endpoint = TcpStreamEndpoint::new(self.proxy.clone());
        if let Some(timeout) = self.connect_timeout {
            endpoint.set_connect_timeout(timeout);
        }

        let mut socks5 = Socks5StreamDialer::new(endpoint);
        if let Some(credentials) = &self.credentials {
            socks5.use_credentials(credentials.clone());
        }

        OverrideStreamDialer::new(
            SplitStreamDialer::new(socks5, self.split),
            self.addr_override.clone(),
        )
    }
}
