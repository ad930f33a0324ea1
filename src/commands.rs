//! CLI command definitions
//!
//! Defines the clap commands for the ipc-link CLI.

use clap::Subcommand;

use crate::ipc::{Codec, Platform};

#[derive(Subcommand)]
pub enum Commands {
    /// Print the endpoint address an application name resolves to
    Address {
        /// Logical application name
        app: String,

        /// Channel suffix appended to the application name
        #[arg(long)]
        suffix: Option<String>,

        /// Resolve for another platform (posix or windows)
        #[arg(long)]
        platform: Option<Platform>,
    },

    /// Send one request to a daemon and print its response
    Send {
        /// Logical application name
        app: String,

        /// Request payload as JSON
        payload: String,

        /// Channel suffix appended to the application name
        #[arg(long)]
        suffix: Option<String>,

        /// Seconds to wait for the response (0 waits forever)
        #[arg(long, short)]
        timeout: Option<u64>,

        /// Payload encoding on the wire (json or toml)
        #[arg(long)]
        codec: Option<Codec>,
    },

    /// Run a daemon that replies to every request with the request itself
    Serve {
        /// Logical application name
        app: String,

        /// Channel suffix appended to the application name
        #[arg(long)]
        suffix: Option<String>,

        /// Payload encoding on the wire (json or toml)
        #[arg(long)]
        codec: Option<Codec>,
    },
}
