//! Dialogue session: send a line, wait for one of several prompts.
//!
//! A [`Session`] owns the byte stream to the server. Flows drive it with two
//! operations: [`Session::send_line`] and [`Session::expect`]. Every
//! operation takes `&mut self`, so at most one wait is ever outstanding.

mod config;

pub use config::{DEFAULT_HOST, DEFAULT_PORT, SessionConfig};

use std::fmt::Debug;
use std::time::Duration;

use bytes::BytesMut;
use log::{debug, trace};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::channel::{Match, PatternBuffer, PatternSet, TelnetFilter};
use crate::error::{Result, SessionError, TransportError};

const READ_CHUNK: usize = 4096;

/// Outcome of waiting for a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect<T> {
    /// A pattern matched before the deadline.
    Matched(Match<T>),

    /// Nothing matched before the deadline.
    Timeout,
}

/// A live text dialogue with the server.
///
/// Generic over the stream so flows can be driven by scripted transcripts
/// in tests; production sessions use [`Session::connect`].
pub struct Session<S = TcpStream> {
    stream: S,
    buffer: PatternBuffer,
    telnet: TelnetFilter,
    read_buf: BytesMut,
    config: SessionConfig,
}

impl Session<TcpStream> {
    /// Connect to the server described by `config`.
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let stream =
            crate::transport::connect(&config.host, config.port, config.connect_timeout).await?;
        Ok(Self::new(stream, config))
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already established stream.
    pub fn new(stream: S, config: SessionConfig) -> Self {
        Self {
            stream,
            buffer: PatternBuffer::new(config.search_depth),
            telnet: TelnetFilter::new(),
            read_buf: BytesMut::with_capacity(READ_CHUNK),
            config,
        }
    }

    /// Wait for one of `patterns` using the configured timeout.
    pub async fn expect<T: Copy + Debug>(&mut self, patterns: &PatternSet<T>) -> Result<Expect<T>> {
        self.expect_within(patterns, self.config.timeout).await
    }

    /// Wait for one of `patterns`, giving up after `timeout`.
    ///
    /// Output already buffered is searched before anything is read. Patterns
    /// are tried in listed order and the first that matches wins; the buffer
    /// is consumed through the end of the match.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] if the stream ends before a match.
    pub async fn expect_within<T: Copy + Debug>(
        &mut self,
        patterns: &PatternSet<T>,
        timeout: Duration,
    ) -> Result<Expect<T>> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(found) = self.buffer.search(patterns) {
                debug!("matched {:?}: {:?}", found.tag, found.matched);
                return Ok(Expect::Matched(found));
            }

            self.read_buf.clear();
            let read = tokio::time::timeout_at(deadline, self.stream.read_buf(&mut self.read_buf)).await;

            let n = match read {
                Err(_) => {
                    debug!(
                        "no pattern matched within {:?}; buffered: {:?}",
                        timeout,
                        self.buffer.as_str_lossy()
                    );
                    return Ok(Expect::Timeout);
                }
                Ok(Ok(0)) => {
                    debug!("stream closed by remote");
                    return Err(SessionError::Closed.into());
                }
                Ok(Ok(n)) => n,
                Ok(Err(e)) => return Err(TransportError::Io(e).into()),
            };

            trace!("read {} bytes: {:?}", n, String::from_utf8_lossy(&self.read_buf));

            let filtered = self.telnet.filter(&self.read_buf);
            if !filtered.replies.is_empty() {
                trace!("refusing telnet options: {:?}", filtered.replies);
                self.write_all(&filtered.replies).await?;
            }
            self.buffer.extend(&filtered.data);
        }
    }

    /// Send `text` followed by the line terminator.
    pub async fn send_line(&mut self, text: &str) -> Result<()> {
        debug!("sending {:?}", text);
        self.write_line(text).await
    }

    /// Send a secret followed by the line terminator, without logging it.
    pub async fn send_secret(&mut self, secret: &SecretString) -> Result<()> {
        debug!("sending <hidden>");
        self.write_line(secret.expose_secret()).await
    }

    /// Shut down the write half of the stream.
    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(TransportError::Io)?;
        Ok(())
    }

    /// Get the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the default timeout.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Output received but not yet consumed by a match.
    pub fn pending_output(&self) -> std::borrow::Cow<'_, str> {
        self.buffer.as_str_lossy()
    }

    async fn write_line(&mut self, text: &str) -> Result<()> {
        let mut line = Vec::with_capacity(text.len() + self.config.line_ending.len());
        line.extend_from_slice(text.as_bytes());
        line.extend_from_slice(self.config.line_ending.as_bytes());
        self.write_all(&line).await
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await.map_err(TransportError::Io)?;
        self.stream.flush().await.map_err(TransportError::Io)?;
        Ok(())
    }
}
