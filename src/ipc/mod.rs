//! Framed request/response IPC over local sockets
//!
//! Uses Unix domain sockets on Unix/macOS and named pipes on Windows
//! via the interprocess crate. Each message is a big-endian `u32` length
//! followed by a structured-text payload.

pub mod address;
pub mod client;
pub mod codec;
pub mod frame;
pub mod handler;
pub mod server;
pub mod transport;

pub use address::{endpoint_address, endpoint_address_with_suffix, Platform};
pub use client::{Client, ClientConfig};
pub use codec::Codec;
pub use handler::{EchoHandler, RequestHandler};
pub use server::{Server, ServerConfig};
