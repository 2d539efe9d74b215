/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll, ready};

use async_trait::async_trait;
use pin_project_lite::pin_project;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::sync::CancellationToken;

use crate::StreamDialer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitConfigParseError {
    #[error("invalid non-negative number {0:?}")]
    InvalidNumber(String),
    #[error("too many values, expected <prefix>[,<repeats>,<skip>]")]
    TooManyValues,
    #[error("skip bytes should be greater than 0 if repeats is set")]
    ZeroSkipBytes,
}

/// Where the outgoing byte stream should be cut into separate writes.
///
/// The first cut is after `prefix_bytes`, followed by `repeats` more cuts
/// every `skip_bytes`. The default value makes no cut at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitConfig {
    prefix_bytes: u64,
    repeats: u64,
    skip_bytes: u64,
}

impl SplitConfig {
    pub fn new(
        prefix_bytes: u64,
        repeats: u64,
        skip_bytes: u64,
    ) -> Result<Self, SplitConfigParseError> {
        if repeats > 0 && skip_bytes == 0 {
            return Err(SplitConfigParseError::ZeroSkipBytes);
        }
        Ok(SplitConfig {
            prefix_bytes,
            repeats,
            skip_bytes,
        })
    }

    #[inline]
    pub fn prefix_bytes(&self) -> u64 {
        self.prefix_bytes
    }

    #[inline]
    pub fn repeats(&self) -> u64 {
        self.repeats
    }

    #[inline]
    pub fn skip_bytes(&self) -> u64 {
        self.skip_bytes
    }

    pub fn is_passthrough(&self) -> bool {
        self.prefix_bytes == 0 && self.repeats == 0
    }

    fn next_cut(&self, written: u64) -> Option<u64> {
        if written < self.prefix_bytes {
            return Some(self.prefix_bytes);
        }
        if self.repeats > 0 {
            let end = self
                .prefix_bytes
                .saturating_add(self.repeats.saturating_mul(self.skip_bytes));
            if written < end {
                let done = (written - self.prefix_bytes) / self.skip_bytes;
                // no more cut if it's beyond what a u64 counter can reach
                return (done + 1)
                    .checked_mul(self.skip_bytes)
                    .and_then(|n| n.checked_add(self.prefix_bytes));
            }
        }
        None
    }
}

impl FromStr for SplitConfig {
    type Err = SplitConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = [0u64; 3];
        for (i, part) in s.split(',').enumerate() {
            if i >= values.len() {
                return Err(SplitConfigParseError::TooManyValues);
            }
            values[i] = u64::from_str(part.trim())
                .map_err(|_| SplitConfigParseError::InvalidNumber(part.to_string()))?;
        }
        SplitConfig::new(values[0], values[1], values[2])
    }
}

pin_project! {
    /// A stream whose writes are cut at the offsets set in a [`SplitConfig`].
    ///
    /// Each cut becomes a separate write on the inner stream. Reads are not changed.
    pub struct SplitStream<S> {
        #[pin]
        inner: S,
        config: SplitConfig,
        written: u64,
    }
}

impl<S> SplitStream<S> {
    pub fn new(inner: S, config: SplitConfig) -> Self {
        SplitStream {
            inner,
            config,
            written: 0,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AsyncRead> AsyncRead for SplitStream<S> {
    #[inline]
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.project().inner.poll_read(cx, buf)
    }
}

impl<S: AsyncWrite> AsyncWrite for SplitStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        let buf = match this.config.next_cut(*this.written) {
            Some(cut) => {
                let max = (cut - *this.written).min(buf.len() as u64) as usize;
                &buf[..max]
            }
            None => buf,
        };
        let nw = ready!(this.inner.poll_write(cx, buf))?;
        *this.written += nw as u64;
        Poll::Ready(Ok(nw))
    }

    #[inline]
    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    #[inline]
    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }
}

pub struct SplitStreamDialer<D> {
    inner: D,
    config: SplitConfig,
}

impl<D: StreamDialer> SplitStreamDialer<D> {
    pub fn new(inner: D, config: SplitConfig) -> Self {
        SplitStreamDialer { inner, config }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }
}

#[async_trait]
impl<D: StreamDialer> StreamDialer for SplitStreamDialer<D> {
    type Stream = SplitStream<D::Stream>;
    type Error = D::Error;

    async fn dial_stream(
        &self,
        cancel: &CancellationToken,
        addr: &str,
    ) -> Result<Self::Stream, Self::Error> {
        let stream = self.inner.dial_stream(cancel, addr).await?;
        Ok(SplitStream::new(stream, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::TcpStreamDialer;

    #[derive(Default)]
    struct RecordWriter {
        writes: Vec<Vec<u8>>,
    }

    impl AsyncWrite for RecordWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.writes.push(buf.to_vec());
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn parse_ok() {
        let config = SplitConfig::from_str("2").unwrap();
        assert_eq!(config, SplitConfig::new(2, 0, 0).unwrap());

        let config = SplitConfig::from_str("1,3,2").unwrap();
        assert_eq!(config.prefix_bytes(), 1);
        assert_eq!(config.repeats(), 3);
        assert_eq!(config.skip_bytes(), 2);

        let config = SplitConfig::from_str("0").unwrap();
        assert!(config.is_passthrough());
    }

    #[test]
    fn parse_err() {
        assert_eq!(
            SplitConfig::from_str("-1").unwrap_err(),
            SplitConfigParseError::InvalidNumber("-1".to_string())
        );
        assert_eq!(
            SplitConfig::from_str("").unwrap_err(),
            SplitConfigParseError::InvalidNumber(String::new())
        );
        assert_eq!(
            SplitConfig::from_str("1,2,3,4").unwrap_err(),
            SplitConfigParseError::TooManyValues
        );
        assert_eq!(
            SplitConfig::from_str("1,2").unwrap_err(),
            SplitConfigParseError::ZeroSkipBytes
        );
        assert_eq!(
            SplitConfig::from_str("1,2,0").unwrap_err(),
            SplitConfigParseError::ZeroSkipBytes
        );
    }

    #[test]
    fn next_cut() {
        let config = SplitConfig::new(2, 2, 3).unwrap();
        assert_eq!(config.next_cut(0), Some(2));
        assert_eq!(config.next_cut(1), Some(2));
        assert_eq!(config.next_cut(2), Some(5));
        assert_eq!(config.next_cut(4), Some(5));
        assert_eq!(config.next_cut(5), Some(8));
        assert_eq!(config.next_cut(8), None);

        let config = SplitConfig::default();
        assert_eq!(config.next_cut(0), None);

        let config = SplitConfig::new(1, 1, u64::MAX).unwrap();
        assert_eq!(config.next_cut(0), Some(1));
        assert_eq!(config.next_cut(1), None);

        let config = SplitConfig::new(u64::MAX - 1, 3, u64::MAX).unwrap();
        assert_eq!(config.next_cut(0), Some(u64::MAX - 1));
        assert_eq!(config.next_cut(u64::MAX - 1), None);
    }

    #[tokio::test]
    async fn write_huge_values() {
        let config = SplitConfig::from_str("1,1,18446744073709551615").unwrap();
        let mut stream = SplitStream::new(RecordWriter::default(), config);
        stream.write_all(b"ab").await.unwrap();
        stream.write_all(b"cd").await.unwrap();
        assert_eq!(
            stream.get_ref().writes,
            vec![b"a".to_vec(), b"b".to_vec(), b"cd".to_vec()]
        );

        let config = SplitConfig::new(u64::MAX, 0, 0).unwrap();
        let mut stream = SplitStream::new(RecordWriter::default(), config);
        stream.write_all(b"abc").await.unwrap();
        assert_eq!(stream.get_ref().writes, vec![b"abc".to_vec()]);
    }

    #[tokio::test]
    async fn write_prefix_only() {
        let config = SplitConfig::new(3, 0, 0).unwrap();
        let mut stream = SplitStream::new(RecordWriter::default(), config);
        stream.write_all(b"abcdefgh").await.unwrap();
        stream.write_all(b"ij").await.unwrap();
        assert_eq!(
            stream.get_ref().writes,
            vec![b"abc".to_vec(), b"defgh".to_vec(), b"ij".to_vec()]
        );
    }

    #[tokio::test]
    async fn write_repeats() {
        let config = SplitConfig::new(1, 2, 2).unwrap();
        let mut stream = SplitStream::new(RecordWriter::default(), config);
        stream.write_all(b"abc").await.unwrap();
        stream.write_all(b"defghij").await.unwrap();
        assert_eq!(
            stream.into_inner().writes,
            vec![
                b"a".to_vec(),
                b"bc".to_vec(),
                b"de".to_vec(),
                b"fghij".to_vec()
            ]
        );
    }

    #[tokio::test]
    async fn dial_split() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let listen_addr = listener.local_addr().unwrap();

        let dialer = SplitStreamDialer::new(
            TcpStreamDialer::default(),
            SplitConfig::from_str("2,1,1").unwrap(),
        );
        let cancel = CancellationToken::new();
        let mut stream = dialer
            .dial_stream(&cancel, &listen_addr.to_string())
            .await
            .unwrap();
        let (mut accepted, _) = listener.accept().await.unwrap();

        stream.write_all(b"hello").await.unwrap();
        stream.shutdown().await.unwrap();

        let mut buf = Vec::new();
        accepted.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"hello");
    }
}
