//! Byte pumps between caller streams and process pipes.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the copy buffer used for every pipe direction.
const PIPE_BUFFER_SIZE: usize = 64 * 1024;

/// Which end of a pump failed.
#[derive(Debug)]
pub(crate) enum PumpError {
    Read(io::Error),
    Write(io::Error),
}

/// Copies `reader` into `writer` until EOF, then flushes `writer`.
///
/// Unlike [`tokio::io::copy`] the failing side is reported, so that a
/// broken caller stream can be told apart from a closed process pipe.
/// `copied` counts the bytes read so far and stays valid when the pump
/// fails or is dropped midway.
pub(crate) async fn pump<R, W>(
    reader: &mut R,
    writer: &mut W,
    copied: &mut u64,
) -> Result<(), PumpError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; PIPE_BUFFER_SIZE];

    loop {
        let n = match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PumpError::Read(e)),
        };
        *copied += n as u64;
        writer
            .write_all(&buffer[..n])
            .await
            .map_err(PumpError::Write)?;
    }

    writer.flush().await.map_err(PumpError::Write)
}

/// Reads `reader` to EOF, keeping at most `limit` bytes as lossy UTF-8.
///
/// Everything past the limit is still consumed so the process never blocks
/// on a full stderr pipe.
pub(crate) async fn collect_diagnostics<R>(reader: &mut R, limit: usize) -> io::Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut kept = Vec::new();
    let mut buffer = vec![0u8; 8 * 1024];
    let mut truncated = false;

    loop {
        let n = match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let room = limit.saturating_sub(kept.len());
        if n > room {
            truncated = true;
        }
        kept.extend_from_slice(&buffer[..n.min(room)]);
    }

    let mut text = String::from_utf8_lossy(&kept).into_owned();
    if truncated {
        text.push_str("\n[stderr truncated]");
    }
    Ok(text)
}
