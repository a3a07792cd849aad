//! Secondary Index Indirection
//!
//! Secondary indexes do not carry their own block pointers. A secondary key
//! index leads to a compressed block of `[Key][PkSlot u16]` entries, and the
//! slot is a position in the primary key index whose entry holds the data
//! block range.

use bytes::Buf;

use crate::block::{read_block, BlockCodec};
use crate::error::Result;
use crate::storage::ByteSource;

use super::key_index::{key_at_or_after, BlockRange, KeyIndex};

/// Width of the primary index slot stored after each secondary key
pub const SLOT_SIZE: usize = 2;

/// Scan a decompressed secondary index block for the first key >= `search`
/// and return its primary index slot. A trailing partial entry ends the scan.
pub fn find_primary_slot(block: &[u8], key_length: usize, search: &[u8]) -> Option<u16> {
    block
        .chunks_exact(key_length + SLOT_SIZE)
        .find(|entry| key_at_or_after(&entry[..key_length], search, key_length))
        .map(|entry| (&entry[key_length..]).get_u16_le())
}

/// Resolve a secondary block range to the data block range it points at
/// through the primary index
pub fn resolve_primary_range<S: ByteSource + ?Sized>(
    source: &S,
    primary: &KeyIndex<'_, S>,
    secondary_range: BlockRange,
    key_length: usize,
    search: &[u8],
    codec: BlockCodec,
    max_block_size: usize,
) -> Result<Option<BlockRange>> {
    let block = read_block(source, secondary_range, codec, max_block_size)?;

    let Some(slot) = find_primary_slot(&block, key_length, search) else {
        tracing::trace!(
            start = secondary_range.start,
            entries = block.len() / (key_length + SLOT_SIZE),
            "no secondary entry at or after key"
        );
        return Ok(None);
    };

    let entry = primary.entry(slot as u32)?;
    tracing::trace!(slot, start = entry.range.start, end = entry.range.end, "secondary slot resolved");
    Ok(Some(entry.range))
}
