//! Block Decoder
//!
//! Walks the length-prefixed records of a decompressed data block and turns
//! each payload into a [`Row`].

use bytes::Buf;

use crate::error::{KtdError, Result};
use crate::format::{Column, FieldSpec, ReferenceTable, Schema, PACKED_WIDTH};
use crate::row::Row;

use super::LineWidth;

// =============================================================================
// Record iteration
// =============================================================================

/// Iterator over record payloads in a decompressed block
pub struct RecordIter<'a> {
    block: &'a [u8],
    /// Offset of the next record within `block`
    pos: usize,
    width: LineWidth,
    /// File offset of the block, for error reports
    block_offset: u64,
}

impl<'a> RecordIter<'a> {
    pub fn new(block: &'a [u8], width: LineWidth, block_offset: u64) -> Self {
        Self {
            block,
            pos: 0,
            width,
            block_offset,
        }
    }

    fn corrupt(&mut self, reason: String) -> Option<Result<&'a [u8]>> {
        // Nothing after a bad prefix can be trusted
        self.pos = self.block.len();
        Some(Err(KtdError::corrupt_block(self.block_offset, reason)))
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.block.len() {
            return None;
        }

        let width = self.width.bytes();
        let block = self.block;
        let remaining = &block[self.pos..];
        if remaining.len() < width {
            return self.corrupt(format!("truncated length prefix at record offset {}", self.pos));
        }

        let record_len = self.width.read_prefix(remaining);
        if record_len < width {
            return self.corrupt(format!(
                "record length {} at offset {} is shorter than its prefix",
                record_len, self.pos
            ));
        }
        if record_len > remaining.len() {
            return self.corrupt(format!(
                "record of {} bytes at offset {} overruns block of {} bytes",
                record_len,
                self.pos,
                self.block.len()
            ));
        }

        let payload = &remaining[width..record_len];
        self.pos += record_len;
        Some(Ok(payload))
    }
}

// =============================================================================
// Row decoding
// =============================================================================

/// Decodes record payloads using a schema's column layout
pub struct BlockDecoder<'a> {
    schema: &'a Schema,
    references: &'a [ReferenceTable],
}

impl<'a> BlockDecoder<'a> {
    pub fn new(schema: &'a Schema, references: &'a [ReferenceTable]) -> Self {
        Self { schema, references }
    }

    /// Decode every column of one record payload and rebuild its primary key
    pub fn decode_record(&self, payload: &[u8], block_offset: u64) -> Result<Row> {
        let values = self
            .schema
            .columns
            .iter()
            .map(|column| match column.reference_table {
                Some(table) => self.decode_packed(column, table, payload, block_offset),
                None => Ok(decode_plain(column, payload)),
            })
            .collect::<Result<Vec<_>>>()?;

        let primary_key = reconstruct_primary_key(&values, &self.schema.primary_key);
        Ok(Row::new(self.schema.column_names().clone(), values, primary_key))
    }

    /// Return the first record whose `match_column` equals `match_value`
    pub fn find(
        &self,
        block: &[u8],
        width: LineWidth,
        match_column: &str,
        match_value: &str,
        block_offset: u64,
    ) -> Result<Option<Row>> {
        for (record, payload) in RecordIter::new(block, width, block_offset).enumerate() {
            let row = self.decode_record(payload?, block_offset)?;
            if row.get(match_column) == Some(match_value) {
                tracing::trace!(record, block_offset, "record matched");
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn decode_packed(
        &self,
        column: &Column,
        table: usize,
        payload: &[u8],
        block_offset: u64,
    ) -> Result<String> {
        let pos = column.packed_position;
        let mut raw = payload.get(pos..pos + PACKED_WIDTH).ok_or_else(|| {
            KtdError::corrupt_block(
                block_offset,
                format!(
                    "packed column '{}' at {} past end of {} byte record",
                    column.name(),
                    pos,
                    payload.len()
                ),
            )
        })?;
        let index = raw.get_u16_le() as usize;

        self.references
            .get(table)
            .and_then(|t| t.row(index))
            .map(|row| row.iter().map(|&b| b as char).collect())
            .ok_or_else(|| {
                KtdError::corrupt_block(
                    block_offset,
                    format!(
                        "column '{}' references row {} missing from reference table {}",
                        column.name(),
                        index,
                        table
                    ),
                )
            })
    }
}

/// Plain text column: the declared start is shifted back by the padding of
/// earlier packed columns, and the range is clamped to the payload
fn decode_plain(column: &Column, payload: &[u8]) -> String {
    let len = payload.len() as i64;
    let start = column.spec.start_position as i64 - column.padding_before as i64;
    let end = match column.spec.length {
        0 => len,
        declared => start + declared as i64,
    };

    let start = start.clamp(0, len);
    let end = end.clamp(start, len);

    payload[start as usize..end as usize]
        .iter()
        .map(|&b| (b & 0x7f) as char)
        .collect()
}

/// Rebuild a primary key from decoded column values.
///
/// The values are concatenated in column order and each key field is cut
/// from that string by character position, so the result depends on the
/// decoded text widths rather than the on-disk record layout.
pub fn reconstruct_primary_key(values: &[String], key_fields: &[FieldSpec]) -> String {
    let whole: Vec<char> = values.iter().flat_map(|v| v.chars()).collect();

    key_fields
        .iter()
        .flat_map(|field| {
            let start = (field.start_position as usize).min(whole.len());
            let end = (start + field.length as usize).min(whole.len());
            whole[start..end].iter()
        })
        .collect()
}
