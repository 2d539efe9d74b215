/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use async_trait::async_trait;
use log::trace;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{AddrSplitError, StreamDialer, join_host_port, split_host_port};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressOverrideParseError {
    #[error("{0} option must have exactly one value")]
    DuplicateOption(&'static str),
    #[error("invalid port value {0:?}")]
    InvalidPort(String),
    #[error("unsupported option {0}")]
    UnsupportedOption(String),
}

#[derive(Debug, Error)]
pub enum OverrideDialError<E: std::error::Error> {
    #[error("address is not valid host:port: {0}")]
    InvalidAddress(#[from] AddrSplitError),
    #[error("{0}")]
    DialFailed(E),
}

/// Replace the host and/or port of a destination address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressOverride {
    host: Option<String>,
    port: Option<u16>,
}

impl AddressOverride {
    pub fn new(host: Option<String>, port: Option<u16>) -> Self {
        AddressOverride { host, port }
    }

    #[inline]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    #[inline]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.port.is_none()
    }

    pub fn apply(&self, addr: &str) -> Result<String, AddrSplitError> {
        match (&self.host, self.port) {
            // the input address is not used at all
            (Some(host), Some(port)) => Ok(join_host_port(host, &port.to_string())),
            (None, None) => Ok(addr.to_string()),
            (host_override, port_override) => {
                let (host, port) = split_host_port(addr)?;
                let host = host_override.as_deref().unwrap_or(host);
                match port_override {
                    Some(port) => Ok(join_host_port(host, &port.to_string())),
                    None => Ok(join_host_port(host, port)),
                }
            }
        }
    }
}

impl FromStr for AddressOverride {
    type Err = AddressOverrideParseError;

    /// Parse from a query string like `host=example.net&port=443`.
    ///
    /// An empty value leaves that part of the address unchanged.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut value = AddressOverride::default();
        let mut host_set = false;
        let mut port_set = false;
        for (k, v) in url::form_urlencoded::parse(s.as_bytes()) {
            match k.to_lowercase().as_str() {
                "host" => {
                    if host_set {
                        return Err(AddressOverrideParseError::DuplicateOption("host"));
                    }
                    host_set = true;
                    if !v.is_empty() {
                        value.host = Some(v.into_owned());
                    }
                }
                "port" => {
                    if port_set {
                        return Err(AddressOverrideParseError::DuplicateOption("port"));
                    }
                    port_set = true;
                    if !v.is_empty() {
                        let port = u16::from_str(&v)
                            .map_err(|_| AddressOverrideParseError::InvalidPort(v.to_string()))?;
                        value.port = Some(port);
                    }
                }
                _ => return Err(AddressOverrideParseError::UnsupportedOption(k.into_owned())),
            }
        }
        Ok(value)
    }
}

pub struct OverrideStreamDialer<D> {
    inner: D,
    addr_override: AddressOverride,
}

impl<D: StreamDialer> OverrideStreamDialer<D> {
    pub fn new(inner: D, addr_override: AddressOverride) -> Self {
        OverrideStreamDialer {
            inner,
            addr_override,
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }
}

#[async_trait]
impl<D: StreamDialer> StreamDialer for OverrideStreamDialer<D> {
    type Stream = D::Stream;
    type Error = OverrideDialError<D::Error>;

    async fn dial_stream(
        &self,
        cancel: &CancellationToken,
        addr: &str,
    ) -> Result<Self::Stream, Self::Error> {
        let addr = self.addr_override.apply(addr)?;
        trace!("dial to overridden address {addr}");
        self.inner
            .dial_stream(cancel, &addr)
            .await
            .map_err(OverrideDialError::DialFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    use crate::TcpStreamDialer;

    #[test]
    fn parse_ok() {
        let v = AddressOverride::from_str("host=example.net&port=443").unwrap();
        assert_eq!(v.host(), Some("example.net"));
        assert_eq!(v.port(), Some(443));

        let v = AddressOverride::from_str("Port=8080").unwrap();
        assert_eq!(v.host(), None);
        assert_eq!(v.port(), Some(8080));

        let v = AddressOverride::from_str("host=%3A%3A1").unwrap();
        assert_eq!(v.host(), Some("::1"));

        let v = AddressOverride::from_str("").unwrap();
        assert!(v.is_empty());

        let v = AddressOverride::from_str("host=&port=").unwrap();
        assert!(v.is_empty());

        let v = AddressOverride::from_str("host=&port=8443").unwrap();
        assert_eq!(v.host(), None);
        assert_eq!(v.port(), Some(8443));
    }

    #[test]
    fn parse_err() {
        assert_eq!(
            AddressOverride::from_str("host=a&host=b").unwrap_err(),
            AddressOverrideParseError::DuplicateOption("host")
        );
        assert_eq!(
            AddressOverride::from_str("port=1&PORT=2").unwrap_err(),
            AddressOverrideParseError::DuplicateOption("port")
        );
        assert_eq!(
            AddressOverride::from_str("host=&host=b").unwrap_err(),
            AddressOverrideParseError::DuplicateOption("host")
        );
        assert_eq!(
            AddressOverride::from_str("port=&port=").unwrap_err(),
            AddressOverrideParseError::DuplicateOption("port")
        );
        assert_eq!(
            AddressOverride::from_str("port=65536").unwrap_err(),
            AddressOverrideParseError::InvalidPort("65536".to_string())
        );
        assert_eq!(
            AddressOverride::from_str("path=/").unwrap_err(),
            AddressOverrideParseError::UnsupportedOption("path".to_string())
        );
    }

    #[test]
    fn apply() {
        let v = AddressOverride::new(Some("example.net".to_string()), Some(443));
        assert_eq!(v.apply("not an address").unwrap(), "example.net:443");

        let v = AddressOverride::new(Some("::1".to_string()), None);
        assert_eq!(v.apply("example.com:80").unwrap(), "[::1]:80");
        assert!(v.apply("example.com").is_err());

        let v = AddressOverride::new(None, Some(8443));
        assert_eq!(v.apply("[2001:db8::1]:443").unwrap(), "[2001:db8::1]:8443");

        let v = AddressOverride::default();
        assert_eq!(v.apply("example.com:80").unwrap(), "example.com:80");

        let v = AddressOverride::from_str("host=").unwrap();
        assert_eq!(v.apply("example.com:80").unwrap(), "example.com:80");

        let v = AddressOverride::from_str("host=&port=").unwrap();
        assert_eq!(v.apply("example.com:80").unwrap(), "example.com:80");
    }

    #[tokio::test]
    async fn dial_overridden() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let listen_addr = listener.local_addr().unwrap();

        let addr_override = AddressOverride::new(None, Some(listen_addr.port()));
        let dialer = OverrideStreamDialer::new(TcpStreamDialer::default(), addr_override);
        let cancel = CancellationToken::new();
        let stream = dialer.dial_stream(&cancel, "127.0.0.1:1").await.unwrap();
        let (accepted, _) = listener.accept().await.unwrap();
        assert_eq!(stream.local_addr().unwrap(), accepted.peer_addr().unwrap());

        let err = dialer.dial_stream(&cancel, "127.0.0.1").await.unwrap_err();
        assert!(matches!(err, OverrideDialError::InvalidAddress(_)));
    }
}
