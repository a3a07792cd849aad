//! Block Module
//!
//! Reads, decompresses and decodes data blocks.
//!
//! ## Record Format (after decompression)
//! ```text
//! ┌────────────────┬──────────────────────────────────────┐
//! │ Len (1 or 2)   │ Payload (Len - width bytes)          │
//! └────────────────┴──────────────────────────────────────┘
//! ... repeated to the end of the block ...
//! ```
//! `Len` counts the whole record including itself. The prefix width is not
//! stored in the file; callers pass it with each query.

mod codec;
mod decoder;

pub use codec::BlockCodec;
pub use decoder::{reconstruct_primary_key, BlockDecoder, RecordIter};

use crate::error::{KtdError, Result};
use crate::index::BlockRange;
use crate::storage::ByteSource;

/// Width of the length prefix in front of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineWidth {
    One = 1,
    Two = 2,
}

impl LineWidth {
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Decode the length prefix at the start of `buf`, which must hold at
    /// least `self.bytes()` bytes
    fn read_prefix(self, buf: &[u8]) -> usize {
        match self {
            LineWidth::One => buf[0] as usize,
            LineWidth::Two => u16::from_le_bytes([buf[0], buf[1]]) as usize,
        }
    }
}

impl TryFrom<u8> for LineWidth {
    type Error = KtdError;

    fn try_from(width: u8) -> Result<Self> {
        match width {
            1 => Ok(LineWidth::One),
            2 => Ok(LineWidth::Two),
            other => Err(KtdError::InvalidLineWidth(other)),
        }
    }
}

/// Read the compressed bytes of `range` and decompress them
pub fn read_block<S: ByteSource + ?Sized>(
    source: &S,
    range: BlockRange,
    codec: BlockCodec,
    max_block_size: usize,
) -> Result<Vec<u8>> {
    let offset = range.start as u64;
    let len = range.len().ok_or_else(|| {
        KtdError::corrupt_block(offset, format!("block end {} precedes start", range.end))
    })?;
    if len > max_block_size {
        return Err(KtdError::corrupt_block(
            offset,
            format!("{} byte block exceeds limit of {} bytes", len, max_block_size),
        ));
    }

    let compressed = source.read_at(offset, len)?;
    let block = codec
        .decompress(&compressed)
        .map_err(|e| KtdError::corrupt_block(offset, format!("decompression failed: {}", e)))?;

    tracing::trace!(offset, compressed = len, decompressed = block.len(), "block loaded");
    Ok(block)
}
