//! CLI command handling
//!
//! Dispatches CLI commands and formats output. Responses go to stdout,
//! everything else to stderr.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::commands::Commands;
use crate::common::{config::Config, Error, Result};
use crate::ipc::{endpoint_address_with_suffix, Client, EchoHandler, Platform, Server};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Address {
            app,
            suffix,
            platform,
        } => {
            let platform = platform.unwrap_or(Platform::current());
            let address = endpoint_address_with_suffix(&app, suffix.as_deref(), platform)?;
            println!("{}", address);
            Ok(())
        }

        Commands::Send {
            app,
            payload,
            suffix,
            timeout,
            codec,
        } => {
            let config = Config::load()?;
            let mut client_config = config.client_config();
            client_config.suffix = suffix;
            if let Some(secs) = timeout {
                client_config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
            }
            if let Some(codec) = codec {
                client_config.codec = codec;
            }

            let request: serde_json::Value = serde_json::from_str(&payload)
                .map_err(|e| Error::InvalidPayload(e.to_string()))?;

            let mut client: Client<serde_json::Value, serde_json::Value> =
                Client::connect_with(&app, client_config).await?;
            let response = client.send(&request).await?;
            client.close().await?;

            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| Error::MalformedResponse(e.to_string()))?
            );
            Ok(())
        }

        Commands::Serve { app, suffix, codec } => {
            let config = Config::load()?;
            let mut server_config = config.server_config();
            server_config.suffix = suffix;
            if let Some(codec) = codec {
                server_config.codec = codec;
            }

            let server = Server::bind(&app, server_config, EchoHandler)?;
            println!("Listening on {}", server.address());

            let shutdown = CancellationToken::new();
            let on_signal = shutdown.clone();
            let signalled = shutdown_signal()?;
            tokio::spawn(async move {
                signalled.await;
                on_signal.cancel();
            });

            server.run(shutdown).await
        }
    }
}

/// Install handlers for SIGTERM and SIGINT (Ctrl+C)
///
/// Handlers are in place once this returns; the future resolves on the
/// first signal.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
            }
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down gracefully"),
            // Without a handler the daemon runs until killed
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sigterm_triggers_shutdown() {
        let signalled = shutdown_signal().unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), signalled)
            .await
            .expect("SIGTERM was not observed");
    }
}
