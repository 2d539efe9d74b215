/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use bytes::{BufMut, BytesMut};
use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::addr::{put_socks5_addr, read_socks5_addr};
use crate::{
    SOCKS5_VERSION, Socks5AddrError, Socks5Credentials, Socks5DialError, Socks5ReplyCode,
    SocksAuthMethod, SocksCommand, SocksNegotiationError, USER_AUTH_VERSION,
};

// method selection + user auth + command request with the longest domain address
const MAX_REQUEST_SIZE: usize = 3 + (1 + 1 + 255 + 1 + 255) + 3 + (1 + 1 + 255 + 2);

/// Build the method selection, the optional user auth and the command request
/// into a single message.
///
/// Only one auth method is offered, so the server has nothing to choose from
/// and the client needn't wait for its method reply before going on.
pub fn build_request(
    buf: &mut BytesMut,
    credentials: Option<&Socks5Credentials>,
    command: SocksCommand,
    addr: &str,
) -> Result<(), Socks5AddrError> {
    // +----+----------+----------+
    // |VER | NMETHODS | METHODS  |
    // +----+----------+----------+
    // | 1  |    1     | 1 to 255 |
    // +----+----------+----------+
    match credentials {
        Some(cred) => {
            buf.put_slice(&[SOCKS5_VERSION, 0x01, SocksAuthMethod::User.code()]);
            cred.put_auth_request(buf);
        }
        None => buf.put_slice(&[SOCKS5_VERSION, 0x01, SocksAuthMethod::None.code()]),
    }

    // +----+-----+-------+------+----------+----------+
    // |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
    // +----+-----+-------+------+----------+----------+
    // | 1  |  1  | X'00' |  1   | Variable |    2     |
    // +----+-----+-------+------+----------+----------+
    buf.put_slice(&[SOCKS5_VERSION, command.code(), 0x00]);
    put_socks5_addr(buf, addr)
}

async fn recv_method_reply<R>(reader: &mut R) -> Result<(), Socks5DialError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 2];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(Socks5DialError::ReadFailed)?;
    if buf[0] != SOCKS5_VERSION {
        return Err(SocksNegotiationError::InvalidVersion(buf[0]).into());
    }

    match SocksAuthMethod::from(buf[1]) {
        SocksAuthMethod::None => Ok(()),
        SocksAuthMethod::User => {
            reader
                .read_exact(&mut buf)
                .await
                .map_err(Socks5DialError::ReadFailed)?;
            if buf[0] != USER_AUTH_VERSION {
                return Err(SocksNegotiationError::InvalidAuthVersion(buf[0]).into());
            }
            if buf[1] != 0x00 {
                return Err(Socks5DialError::AuthFailed(buf[1]));
            }
            Ok(())
        }
        method => Err(Socks5DialError::UnsupportedAuthMethod(method)),
    }
}

async fn recv_reply<R>(reader: &mut R) -> Result<String, Socks5DialError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(Socks5DialError::ReadFailed)?;
    if buf[0] != SOCKS5_VERSION {
        return Err(SocksNegotiationError::InvalidVersion(buf[0]).into());
    }

    let code = Socks5ReplyCode::from(buf[1]);
    if !code.is_success() {
        // the layout of what follows is not reliable for failed replies
        return Err(Socks5DialError::RequestFailed(code));
    }

    let _rsv = buf[2];

    let addr = read_socks5_addr(reader, buf[3]).await?;
    Ok(addr)
}

/// Send a socks5 request on an established connection to the proxy.
///
/// Return the bind address reported by the server.
/// The stream is left as is on error, it's up to the caller to close it.
pub async fn socks5_request<S>(
    stream: &mut S,
    credentials: Option<&Socks5Credentials>,
    command: SocksCommand,
    addr: &str,
) -> Result<String, Socks5DialError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(MAX_REQUEST_SIZE);
    build_request(&mut buf, credentials, command, addr)?;

    stream
        .write_all(buf.as_ref())
        .await
        .map_err(Socks5DialError::WriteFailed)?;
    stream.flush().await.map_err(Socks5DialError::WriteFailed)?;

    recv_method_reply(stream).await?;
    let bind_addr = recv_reply(stream).await?;
    trace!("socks5 {command} request to {addr} succeeded, bind address {bind_addr}");
    Ok(bind_addr)
}
