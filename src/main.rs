//! ipc-link CLI - talk to a local daemon over a framed IPC channel

use clap::Parser;
use ipc_link::common::logging;
use ipc_link::{cli, commands::Commands};

#[derive(Parser)]
#[command(name = "ipc-link", about = "Send requests to a local daemon over a framed IPC channel")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { .. } => {
            if let Some(path) = logging::init_daemon() {
                tracing::debug!(log = %path.display(), "Logging to file");
            }
        }
        _ => logging::init_cli(),
    }

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
