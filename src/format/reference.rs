//! Reference Tables
//!
//! Small fixed-width dictionaries that packed columns index into. All of
//! them are loaded at open time.

use bytes::Buf;

use crate::error::{KtdError, Result};
use crate::storage::ByteSource;

/// Reference table header: RowCount (4) + RowWidth (4)
const TABLE_HEADER_SIZE: usize = 8;

/// One reference table: `row_count` rows of `row_width` bytes each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    row_count: usize,
    row_width: usize,
    data: Vec<u8>,
}

impl ReferenceTable {
    /// Build a table from raw contiguous rows
    pub fn new(row_width: usize, data: Vec<u8>) -> Self {
        let row_count = if row_width == 0 { 0 } else { data.len() / row_width };
        Self {
            row_count,
            row_width,
            data,
        }
    }

    /// Load the table stored at `offset`
    pub fn load<S: ByteSource + ?Sized>(source: &S, offset: u32, max_size: usize) -> Result<Self> {
        let header = source.read_at(offset as u64, TABLE_HEADER_SIZE)?;
        let mut header = &header[..];
        let row_count = header.get_u32_le() as usize;
        let row_width = header.get_u32_le() as usize;

        let size = row_count
            .checked_mul(row_width)
            .filter(|&size| size <= max_size)
            .ok_or_else(|| {
                KtdError::MalformedHeader(format!(
                    "reference table at {} declares {} rows of {} bytes (limit {} bytes)",
                    offset, row_count, row_width, max_size
                ))
            })?;

        let data = source.read_at(offset as u64 + TABLE_HEADER_SIZE as u64, size)?;

        Ok(Self {
            row_count,
            row_width,
            data,
        })
    }

    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn row_width(&self) -> usize {
        self.row_width
    }

    /// Raw bytes of row `index`
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        if index >= self.row_count {
            return None;
        }
        let start = index * self.row_width;
        self.data.get(start..start + self.row_width)
    }
}

/// Load a table for every nonzero offset, keeping header slot order
pub fn load_reference_tables<S: ByteSource + ?Sized>(
    source: &S,
    offsets: &[u32],
    max_size: usize,
) -> Result<Vec<ReferenceTable>> {
    offsets
        .iter()
        .filter(|&&offset| offset > 0)
        .map(|&offset| {
            let table = ReferenceTable::load(source, offset, max_size)?;
            tracing::trace!(offset, rows = table.len(), width = table.row_width(), "loaded reference table");
            Ok(table)
        })
        .collect()
}
