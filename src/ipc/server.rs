//! Daemon side of the framed IPC channel
//!
//! Accepts connections at the application's endpoint and serves each one on
//! its own task, strictly one request at a time: read a frame, decode, hand it
//! to the [`RequestHandler`], encode, write the reply frame. This is the
//! non-multiplexing peer that [`Client`](super::Client) expects.

use interprocess::local_socket::traits::tokio::Listener as _;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::common::{Error, Result};

use super::address::{endpoint_address_with_suffix, Platform};
use super::codec::Codec;
use super::frame::{self, DEFAULT_MAX_FRAME_LEN};
use super::handler::RequestHandler;
use super::transport::{self, Listener, Stream};

/// Settings for a daemon endpoint
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Payload encoding, must match the clients'
    pub codec: Codec,
    /// Largest frame accepted in either direction
    pub max_frame_len: u32,
    /// Optional channel suffix appended to the application name
    pub suffix: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            codec: Codec::default(),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            suffix: None,
        }
    }
}

/// Listener bound to an application's endpoint
pub struct Server<H> {
    address: String,
    listener: Listener,
    config: ServerConfig,
    handler: H,
}

impl<H: RequestHandler> Server<H> {
    /// Bind the endpoint for `app_name`
    pub fn bind(app_name: &str, config: ServerConfig, handler: H) -> Result<Self> {
        let address =
            endpoint_address_with_suffix(app_name, config.suffix.as_deref(), Platform::current())?;

        let listener = transport::create_listener(&address).map_err(|source| Error::Bind {
            address: address.clone(),
            source,
        })?;

        Ok(Self {
            address,
            listener,
            config,
            handler,
        })
    }

    /// Address the server is listening on
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Accept and serve connections until `shutdown` is cancelled
    ///
    /// Open connections are aborted on shutdown and the socket file is
    /// removed.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(address = %self.address, codec = %self.config.codec, "Daemon listening");

        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested, closing listener");
                    break;
                }
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok(stream) => {
                            tracing::debug!(active = connections.len() + 1, "Client connected");
                            connections.spawn(serve_connection(
                                stream,
                                self.handler.clone(),
                                self.config.codec,
                                self.config.max_frame_len,
                            ));
                        }
                        Err(e) => {
                            tracing::error!("Accept error: {}", e);
                        }
                    }
                }
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Connection task failed: {}", e);
                    }
                }
            }
        }

        connections.shutdown().await;
        drop(self.listener);
        transport::remove_stale_socket(&self.address)?;
        tracing::info!("Daemon shutdown complete");

        Ok(())
    }
}

/// Serve one connection until the client disconnects or misbehaves
async fn serve_connection<H: RequestHandler>(
    stream: Stream,
    mut handler: H,
    codec: Codec,
    max_len: u32,
) {
    let (mut reader, mut writer) = tokio::io::split(stream);

    loop {
        let payload = match frame::read_frame(&mut reader, max_len).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                tracing::debug!("Client disconnected");
                break;
            }
            Err(e) => {
                tracing::error!("Error reading request: {}", e);
                break;
            }
        };

        let request: H::Req = match codec.decode(&payload) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(bytes = payload.len(), "Dropping client after undecodable request: {}", e);
                break;
            }
        };

        let response = handler.handle(request).await;

        let reply = match codec.encode(&response) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Failed to encode response: {}", e);
                break;
            }
        };

        if let Err(e) = frame::write_frame(&mut writer, &reply, max_len).await {
            tracing::error!("Error writing response: {}", e);
            break;
        }
        tracing::trace!(request_bytes = payload.len(), response_bytes = reply.len(), "Request served");
    }
}
