//! Length-prefixed framing
//!
//! Every message on the wire is a 4-byte unsigned big-endian length followed
//! by exactly that many payload bytes. The prefix does not count itself.
//! Readers accumulate until the whole frame is present, so frames may be
//! fragmented or coalesced arbitrarily by the transport.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the length prefix in bytes
pub const PREFIX_LEN: usize = 4;

/// Default maximum payload size (16 MiB)
pub const DEFAULT_MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Encode a payload as a complete frame
pub fn encode_frame(payload: &[u8]) -> io::Result<Vec<u8>> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Payload too large for a frame: {} bytes", payload.len()),
        )
    })?;

    let mut frame = Vec::with_capacity(PREFIX_LEN + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Write one frame and flush it
///
/// Payloads larger than `max_len` are rejected before anything is written,
/// leaving the stream untouched.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
    max_len: u32,
) -> io::Result<()> {
    if payload.len() > max_len as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Message too large: {} bytes", payload.len()),
        ));
    }

    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame, returning its payload without the prefix
///
/// End of stream before the first prefix byte yields
/// `io::ErrorKind::UnexpectedEof`, as does end of stream mid-frame.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R, max_len: u32) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; PREFIX_LEN];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);

    if len > max_len {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: {} bytes", len),
        ));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}
