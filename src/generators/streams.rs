//! Deterministic byte sources
//!
//! Each generator pushes its bytes into an open batch, one `enqueue` per
//! byte, and returns how many bytes it sent. Draining the batch is left
//! to the caller.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::feed::{BatchWriter, FeedError};

/// Opening half of one `valid_stream` repetition; `a` is filler.
const VALID_OPEN: &[u8] = b"[{a";
/// Closing half of one `valid_stream` repetition.
const VALID_CLOSE: &[u8] = b"}]";

/// Excess closers emitted by `insufficient_open_brackets`.
pub const INSUFFICIENT_DEFICIT: u64 = 5;

/// Read size used by `stream_reader`.
const READ_CHUNK: usize = 8 * 1024;

/// Errors from byte sources
#[derive(Debug, Error)]
pub enum SourceError {
    /// Feed rejected a byte
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Reading the input failed
    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Writes `[{a` `count` times, then `}]` `count` times.
///
/// The result is a single valid candidate of `4 * count` brackets.
pub async fn valid_stream(batch: &mut BatchWriter<'_>, count: u64) -> Result<u64, FeedError> {
    for _ in 0..count {
        batch.enqueue_all(VALID_OPEN).await?;
    }
    for _ in 0..count {
        batch.enqueue_all(VALID_CLOSE).await?;
    }
    Ok(count * (VALID_OPEN.len() + VALID_CLOSE.len()) as u64)
}

/// Writes `size - 5` opening brackets followed by `size` closing ones.
///
/// The openers are all matched first (one valid candidate when
/// `size > 5`), then each of the five excess closers is rejected.
pub async fn insufficient_open_brackets(
    batch: &mut BatchWriter<'_>,
    size: u64,
) -> Result<u64, FeedError> {
    let opens = size.saturating_sub(INSUFFICIENT_DEFICIT);
    for _ in 0..opens {
        batch.enqueue(b'[').await?;
    }
    for _ in 0..size {
        batch.enqueue(b']').await?;
    }
    Ok(opens + size)
}

/// Streams every byte of `reader` into the batch.
///
/// Reads in fixed-size chunks, so memory use does not depend on the
/// input length.
pub async fn stream_reader<R>(batch: &mut BatchWriter<'_>, mut reader: R) -> Result<u64, SourceError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; READ_CHUNK];
    let mut total = 0u64;
    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        batch.enqueue_all(&buffer[..read]).await?;
        total += read as u64;
    }
    Ok(total)
}
