/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddrSplitError {
    #[error("missing port in address")]
    MissingPort,
    #[error("too many colons in address")]
    TooManyColons,
    #[error("missing ']' in address")]
    MissingRightBracket,
    #[error("unexpected '[' in address")]
    UnexpectedLeftBracket,
    #[error("unexpected ']' in address")]
    UnexpectedRightBracket,
}

/// Split a `host:port` or `[host]:port` string into its host and port parts.
///
/// The port part is not validated. A host containing colons must be enclosed
/// in square brackets.
pub fn split_host_port(addr: &str) -> Result<(&str, &str), AddrSplitError> {
    let Some(last_colon) = addr.rfind(':') else {
        return Err(AddrSplitError::MissingPort);
    };

    let (host, host_start, host_end) = if addr.starts_with('[') {
        let Some(end) = addr.find(']') else {
            return Err(AddrSplitError::MissingRightBracket);
        };
        if end + 1 == addr.len() {
            return Err(AddrSplitError::MissingPort);
        }
        if end + 1 != last_colon {
            // "[host]:port" is the only allowed bracket form
            return if addr.as_bytes()[end + 1] == b':' {
                Err(AddrSplitError::TooManyColons)
            } else {
                Err(AddrSplitError::MissingPort)
            };
        }
        (&addr[1..end], 1, end + 1)
    } else {
        let host = &addr[..last_colon];
        if host.contains(':') {
            return Err(AddrSplitError::TooManyColons);
        }
        (host, 0, 0)
    };

    if addr[host_start..].contains('[') {
        return Err(AddrSplitError::UnexpectedLeftBracket);
    }
    if addr[host_end..].contains(']') {
        return Err(AddrSplitError::UnexpectedRightBracket);
    }

    Ok((host, &addr[last_colon + 1..]))
}

/// Join host and port, enclosing the host in square brackets if it contains a colon.
pub fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
