/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

use dial_transport::{AddressOverride, SplitConfig, split_host_port};

use super::Socks5DialerConfig;
use crate::Socks5Credentials;

impl Socks5DialerConfig {
    /// Parse from a yaml map, or from a yaml string in url form.
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        match value {
            Yaml::Hash(map) => Self::parse_yaml_map(map),
            Yaml::String(s) => Socks5DialerConfig::from_str(s),
            _ => Err(anyhow!(
                "yaml value type for socks5 dialer config should be 'map' or 'url string'"
            )),
        }
    }

    fn parse_yaml_map(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut proxy: Option<String> = None;
        let mut username: Option<String> = None;
        let mut password: Option<String> = None;
        let mut connect_timeout: Option<Duration> = None;
        let mut split = SplitConfig::default();
        let mut addr_override = AddressOverride::default();

        foreach_kv(map, |k, v| match normalize_key(k).as_str() {
            "proxy" | "proxy_addr" => {
                let addr = as_string(v)?;
                split_host_port(&addr).context(format!("invalid host:port value {addr}"))?;
                proxy = Some(addr);
                Ok(())
            }
            "username" | "user" => {
                username = Some(as_string(v)?);
                Ok(())
            }
            "password" | "passwd" => {
                password = Some(as_string(v)?);
                Ok(())
            }
            "connect_timeout" => {
                connect_timeout = Some(as_duration(v)?);
                Ok(())
            }
            "split" => {
                let s = as_string(v)?;
                split = SplitConfig::from_str(&s)?;
                Ok(())
            }
            "override" => {
                let s = as_string(v)?;
                addr_override = AddressOverride::from_str(&s)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;

        let Some(proxy) = proxy else {
            return Err(anyhow!("no proxy address set"));
        };
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(
                Socks5Credentials::new(username, password).context("invalid credentials")?,
            ),
            (None, None) => None,
            _ => return Err(anyhow!("username and password should be set together")),
        };

        Ok(Socks5DialerConfig {
            proxy,
            credentials,
            connect_timeout,
            split,
            addr_override,
        })
    }
}

fn normalize_key(key: &str) -> String {
    key.to_lowercase().replace('-', "_")
}

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Real(s) => Ok(s.to_string()),
        _ => Err(anyhow!(
            "yaml value type for string should be 'string' / 'integer' / 'real'"
        )),
    }
}

fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                let u = u64::from_str(value).map_err(|_| anyhow!("invalid duration string"))?;
                Ok(Duration::from_secs(u))
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        _ => Err(anyhow!("yaml value type for duration should be 'string' or 'integer'")),
    }
}
