//! ipc-link - request/response client for local daemons
//!
//! Connects to a daemon over a Unix domain socket or Windows named pipe
//! derived from an application name, and exchanges length-prefixed
//! structured-text frames, one request at a time.

pub mod cli;
pub mod commands;
pub mod common;
pub mod ipc;

pub use common::{Error, Result};
pub use ipc::{
    Client, ClientConfig, Codec, EchoHandler, Platform, RequestHandler, Server, ServerConfig,
};
