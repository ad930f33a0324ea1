//! Cross-platform IPC transport layer
//!
//! Abstracts Unix domain sockets (Unix/macOS) and named pipes (Windows)
//! using the interprocess crate. Both kinds of address are filesystem-style
//! paths (`/tmp/<app>.sock` or `\\.\pipe\<app>`), so one code path serves
//! both platforms.

use std::io;

use interprocess::local_socket::tokio::prelude::*;
use interprocess::local_socket::{GenericFilePath, ListenerOptions};

pub use interprocess::local_socket::tokio::{Listener, Stream};

/// Open a stream to the endpoint at `address`
pub async fn connect(address: &str) -> io::Result<Stream> {
    let name = address.to_fs_name::<GenericFilePath>()?;
    Stream::connect(name).await
}

/// Bind a listener at `address`
///
/// On Unix a leftover socket file from a daemon that did not shut down
/// cleanly is removed first, and the new socket is restricted to its owner.
/// A socket that still accepts connections belongs to a live daemon and
/// fails the bind with `io::ErrorKind::AddrInUse`.
pub fn create_listener(address: &str) -> io::Result<Listener> {
    reclaim_socket(address)?;

    let name = address.to_fs_name::<GenericFilePath>()?;
    let listener = ListenerOptions::new().name(name).create_tokio()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(address, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(listener)
}

/// Remove the socket file at `address` unless a daemon is still serving it
#[cfg(unix)]
fn reclaim_socket(address: &str) -> io::Result<()> {
    use interprocess::local_socket::{prelude::*, Stream as BlockingStream};
    use std::os::unix::fs::FileTypeExt;

    match std::fs::symlink_metadata(address) {
        Ok(meta) if meta.file_type().is_socket() => {
            let name = address.to_fs_name::<GenericFilePath>()?;
            match BlockingStream::connect(name) {
                Ok(_) => Err(io::Error::new(
                    io::ErrorKind::AddrInUse,
                    format!("another daemon is already listening at {address}"),
                )),
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    tracing::debug!(%address, "Removing stale socket");
                    std::fs::remove_file(address)
                }
                Err(e) => Err(e),
            }
        }
        _ => remove_stale_socket(address),
    }
}

#[cfg(windows)]
fn reclaim_socket(_address: &str) -> io::Result<()> {
    Ok(())
}

/// Remove the socket file at `address` if one exists
#[cfg(unix)]
pub fn remove_stale_socket(address: &str) -> io::Result<()> {
    use std::os::unix::fs::FileTypeExt;

    match std::fs::symlink_metadata(address) {
        Ok(meta) if meta.file_type().is_socket() => std::fs::remove_file(address),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{address} exists and is not a socket"),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(windows)]
pub fn remove_stale_socket(_address: &str) -> io::Result<()> {
    // Named pipes are cleaned up by the OS when the last handle closes
    Ok(())
}
