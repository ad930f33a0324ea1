//! Client side of the framed IPC channel
//!
//! A [`Client`] owns one connection to a daemon and exchanges exactly one
//! request frame for one response frame at a time. Responses are matched to
//! requests purely by order on the connection, so the daemon must answer each
//! request before reading the next one.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncWriteExt, ReadHalf, WriteHalf};

use crate::common::{Error, Result};

use super::address::{endpoint_address_with_suffix, Platform};
use super::codec::Codec;
use super::frame::{self, DEFAULT_MAX_FRAME_LEN};
use super::transport::{self, Stream};

/// Settings for a client connection
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Payload encoding, must match the daemon's
    pub codec: Codec,
    /// Maximum time a single `send` may take; `None` waits forever
    pub request_timeout: Option<Duration>,
    /// Largest frame accepted in either direction
    pub max_frame_len: u32,
    /// Optional channel suffix appended to the application name
    pub suffix: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            codec: Codec::default(),
            request_timeout: None,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            suffix: None,
        }
    }
}

impl ClientConfig {
    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the payload codec
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }
}

/// Request/response client over a single local connection
///
/// `send` takes `&mut self`, so at most one request can be outstanding per
/// client. Share a client between tasks behind a mutex or give it a single
/// owning task.
pub struct Client<Req, Res> {
    address: String,
    reader: ReadHalf<Stream>,
    writer: WriteHalf<Stream>,
    config: ClientConfig,
    broken: bool,
    _types: PhantomData<fn(Req) -> Res>,
}

impl<Req, Res> fmt::Debug for Client<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("address", &self.address)
            .field("config", &self.config)
            .field("broken", &self.broken)
            .finish_non_exhaustive()
    }
}

impl<Req, Res> Client<Req, Res>
where
    Req: Serialize,
    Res: DeserializeOwned,
{
    /// Connect to the daemon serving `app_name` with default settings
    pub async fn connect(app_name: &str) -> Result<Self> {
        Self::connect_with(app_name, ClientConfig::default()).await
    }

    /// Connect to the daemon serving `app_name`
    ///
    /// Fails immediately with a connection error if nothing is listening;
    /// retrying is up to the caller.
    pub async fn connect_with(app_name: &str, config: ClientConfig) -> Result<Self> {
        let address =
            endpoint_address_with_suffix(app_name, config.suffix.as_deref(), Platform::current())?;

        let stream = transport::connect(&address)
            .await
            .map_err(|e| Error::connect_failed(&address, e))?;
        tracing::debug!(%address, codec = %config.codec, "Connected to daemon");

        let (reader, writer) = tokio::io::split(stream);

        Ok(Self {
            address,
            reader,
            writer,
            config,
            broken: false,
            _types: PhantomData,
        })
    }

    /// Send a request and wait for its response
    ///
    /// A malformed response leaves the connection usable. Any failure in the
    /// middle of a frame (write error, read error, timeout) marks the
    /// connection broken and later calls fail with [`Error::ConnectionBroken`].
    pub async fn send(&mut self, request: &Req) -> Result<Res> {
        if self.broken {
            return Err(Error::ConnectionBroken);
        }

        let payload = self.config.codec.encode(request)?;
        if payload.len() > self.config.max_frame_len as usize {
            return Err(Error::FrameTooLarge {
                len: payload.len(),
                max: self.config.max_frame_len,
            });
        }

        tracing::trace!(address = %self.address, bytes = payload.len(), "Sending request");

        let result = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(&payload))
                .await
                .unwrap_or(Err(Error::Timeout(limit))),
            None => self.exchange(&payload).await,
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                if e.poisons_connection() {
                    tracing::warn!(address = %self.address, error = %e, "Connection marked broken");
                    self.broken = true;
                }
                return Err(e);
            }
        };

        tracing::trace!(address = %self.address, bytes = response.len(), "Received response");
        self.config.codec.decode(&response)
    }

    /// Write one request frame and read one response frame
    ///
    /// The response read is armed before any request byte is written and both
    /// directions are driven together, so a reply that arrives while the
    /// request is still being written is picked up, and a daemon that starts
    /// replying before draining a large request cannot deadlock us.
    async fn exchange(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        let max_len = self.config.max_frame_len;

        let response = frame::read_frame(&mut self.reader, max_len);
        let request = frame::write_frame(&mut self.writer, payload, max_len);
        tokio::pin!(response, request);

        let mut written = false;
        loop {
            tokio::select! {
                biased;

                result = &mut request, if !written => {
                    result.map_err(Error::Write)?;
                    written = true;
                }

                result = &mut response => {
                    if !written {
                        // The request must still go out whole to keep the
                        // stream aligned. If the peer went away, the write
                        // failure is the error to report.
                        request.as_mut().await.map_err(Error::Write)?;
                    }
                    return result.map_err(read_error);
                }
            }
        }
    }
}

impl<Req, Res> Client<Req, Res> {
    /// Address this client is connected to
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether an earlier failure made this connection unusable
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Close the connection
    ///
    /// Shuts down the write direction so the daemon sees end of stream, then
    /// releases the connection. Dropping a client also closes it, without the
    /// orderly shutdown.
    pub async fn close(mut self) -> Result<()> {
        tracing::debug!(address = %self.address, "Closing connection");
        if self.broken {
            return Ok(());
        }
        self.writer.shutdown().await?;
        Ok(())
    }
}

fn read_error(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        Error::Read(e)
    }
}
