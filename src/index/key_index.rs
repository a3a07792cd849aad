//! Key Index
//!
//! A key index is a u32 entry count followed by fixed-size entries
//! `[Key][BlockStart u32][BlockEnd u32]`, sorted ascending by key bytes.

use bytes::Buf;

use crate::error::{KtdError, Result};
use crate::storage::ByteSource;

use super::IndexSearch;

/// BlockStart (4) + BlockEnd (4)
pub const ENTRY_TRAILER_SIZE: usize = 8;

/// Entries read per positioned read during a linear scan
const SCAN_BATCH: usize = 256;

/// Byte range `[start, end)` of a compressed block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u32,
    pub end: u32,
}

impl BlockRange {
    /// Compressed length, or `None` if `end` precedes `start`
    pub fn len(&self) -> Option<usize> {
        self.end.checked_sub(self.start).map(|len| len as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIndexEntry {
    pub key: Vec<u8>,
    pub range: BlockRange,
}

impl KeyIndexEntry {
    fn decode(raw: &[u8], key_length: usize) -> Self {
        let key = raw[..key_length].to_vec();
        let mut trailer = &raw[key_length..];
        let start = trailer.get_u32_le();
        let end = trailer.get_u32_le();
        Self {
            key,
            range: BlockRange { start, end },
        }
    }
}

/// Whether an entry key sorts at or after the search key, comparing the
/// first `key_length` bytes. Either side being shorter than `key_length`
/// never qualifies.
pub fn key_at_or_after(entry_key: &[u8], search: &[u8], key_length: usize) -> bool {
    if entry_key.len() < key_length || search.len() < key_length {
        return false;
    }
    entry_key[..key_length] >= search[..key_length]
}

/// View over one key index inside a byte source
pub struct KeyIndex<'a, S: ?Sized> {
    source: &'a S,
    offset: u64,
    key_length: usize,
    entry_count: u32,
}

impl<'a, S: ByteSource + ?Sized> KeyIndex<'a, S> {
    /// Open the index at `offset`, reading its entry count
    pub fn open(source: &'a S, offset: u32, key_length: usize) -> Result<Self> {
        let entry_count = source.read_u32_le(offset as u64)?;
        Ok(Self {
            source,
            offset: offset as u64,
            key_length,
            entry_count,
        })
    }

    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    pub fn key_length(&self) -> usize {
        self.key_length
    }

    /// Key + BlockStart + BlockEnd
    pub fn entry_size(&self) -> usize {
        self.key_length + ENTRY_TRAILER_SIZE
    }

    fn entry_offset(&self, slot: u32) -> u64 {
        self.offset + 4 + slot as u64 * self.entry_size() as u64
    }

    /// Read the entry in `slot`
    pub fn entry(&self, slot: u32) -> Result<KeyIndexEntry> {
        if slot >= self.entry_count {
            return Err(KtdError::IndexOutOfRange {
                slot,
                entries: self.entry_count,
            });
        }
        let raw = self.source.read_at(self.entry_offset(slot), self.entry_size())?;
        Ok(KeyIndexEntry::decode(&raw, self.key_length))
    }

    /// Block range of the first entry whose key is >= `search`
    pub fn resolve(&self, search: &[u8], strategy: IndexSearch) -> Result<Option<BlockRange>> {
        let slot = match strategy {
            IndexSearch::Linear => self.lower_bound_linear(search)?,
            IndexSearch::Binary => self.lower_bound_binary(search)?,
        };

        match slot {
            Some((slot, entry)) => {
                tracing::trace!(slot, start = entry.range.start, end = entry.range.end, "index hit");
                Ok(Some(entry.range))
            }
            None => Ok(None),
        }
    }

    fn lower_bound_linear(&self, search: &[u8]) -> Result<Option<(u32, KeyIndexEntry)>> {
        let entry_size = self.entry_size();
        let mut slot = 0u32;

        while slot < self.entry_count {
            let batch = (self.entry_count - slot).min(SCAN_BATCH as u32);
            let raw = self
                .source
                .read_at(self.entry_offset(slot), batch as usize * entry_size)?;

            for (i, chunk) in raw.chunks_exact(entry_size).enumerate() {
                if key_at_or_after(&chunk[..self.key_length], search, self.key_length) {
                    let entry = KeyIndexEntry::decode(chunk, self.key_length);
                    return Ok(Some((slot + i as u32, entry)));
                }
            }
            slot += batch;
        }

        Ok(None)
    }

    fn lower_bound_binary(&self, search: &[u8]) -> Result<Option<(u32, KeyIndexEntry)>> {
        let (mut lo, mut hi) = (0u32, self.entry_count);
        let mut found = None;

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = self.entry(mid)?;
            if key_at_or_after(&entry.key, search, self.key_length) {
                hi = mid;
                found = Some((mid, entry));
            } else {
                lo = mid + 1;
            }
        }

        Ok(found)
    }
}
