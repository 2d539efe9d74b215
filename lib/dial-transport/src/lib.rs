/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod addr;
pub use addr::{AddrSplitError, join_host_port, split_host_port};

mod endpoint;
pub use endpoint::{StreamEndpoint, TcpStreamEndpoint};

mod dialer;
pub use dialer::{PacketDialer, StreamDialer, TcpStreamDialer, UdpPacketDialer};

mod split;
pub use split::{SplitConfig, SplitConfigParseError, SplitStream, SplitStreamDialer};

mod rewrite;
pub use rewrite::{
    AddressOverride, AddressOverrideParseError, OverrideDialError, OverrideStreamDialer,
};

pub use tokio_util::sync::CancellationToken;
