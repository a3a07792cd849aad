//! Header parsing
//!
//! Decodes the fixed 768-byte header into a [`Header`]. Repeated field
//! records are gated by the counts that precede them, so a short buffer is
//! only detected while walking them.

use bytes::Buf;

use crate::error::{KtdError, Result};

use super::{NAME_SIZE, REFERENCE_SLOTS, SECONDARY_SLOTS};

/// Column or key field type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Tag 0: a u16 index into a reference table
    PackedReference,
    /// Any other tag: inline ASCII text
    Text(u8),
}

impl DataType {
    pub fn tag(self) -> u8 {
        match self {
            DataType::PackedReference => 0,
            DataType::Text(tag) => tag,
        }
    }

    pub fn is_packed(self) -> bool {
        matches!(self, DataType::PackedReference)
    }
}

impl From<u8> for DataType {
    fn from(tag: u8) -> Self {
        match tag {
            0 => DataType::PackedReference,
            other => DataType::Text(other),
        }
    }
}

/// A key field or column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub data_type: DataType,
    /// Logical start position within the record
    pub start_position: u8,
    /// Declared length; 0 means "to end of record"
    pub length: u8,
}

/// Raw header contents, before any derived layout is computed
#[derive(Debug, Clone)]
pub struct Header {
    pub version: u16,
    pub record_count: u32,
    pub block_size: u16,
    pub reference_offsets: [u32; REFERENCE_SLOTS],
    pub primary_index_offset: u32,
    pub secondary_index_offsets: [u32; SECONDARY_SLOTS],
    pub table_name: String,
    pub primary_key: Vec<FieldSpec>,
    pub secondary_groups: Vec<Vec<FieldSpec>>,
    pub columns: Vec<FieldSpec>,
}

impl Header {
    /// Parse a header from the start of a container
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut cursor = HeaderCursor { buf };

        let version = cursor.u16("version")?;
        let record_count = cursor.u32("record count")?;
        let block_size = cursor.u16("block size")?;

        let mut reference_offsets = [0u32; REFERENCE_SLOTS];
        for offset in reference_offsets.iter_mut() {
            *offset = cursor.u32("reference table offset")?;
        }

        let primary_index_offset = cursor.u32("primary key index offset")?;

        let mut secondary_index_offsets = [0u32; SECONDARY_SLOTS];
        for offset in secondary_index_offsets.iter_mut() {
            *offset = cursor.u32("secondary key index offset")?;
        }

        let table_name = cursor.name("table name")?;

        let primary_count = cursor.u8("primary key field count")?;
        let primary_key = cursor.fields(primary_count, "primary key field")?;

        let group_count = cursor.u8("secondary key group count")?;
        if group_count as usize > SECONDARY_SLOTS {
            return Err(KtdError::MalformedHeader(format!(
                "{} secondary key groups declared, at most {} supported",
                group_count, SECONDARY_SLOTS
            )));
        }
        let mut secondary_groups = Vec::with_capacity(group_count as usize);
        for _ in 0..group_count {
            let count = cursor.u8("secondary key field count")?;
            secondary_groups.push(cursor.fields(count, "secondary key field")?);
        }

        let column_count = cursor.u8("column count")?;
        let columns = cursor.fields(column_count, "column")?;

        Ok(Header {
            version,
            record_count,
            block_size,
            reference_offsets,
            primary_index_offset,
            secondary_index_offsets,
            table_name,
            primary_key,
            secondary_groups,
            columns,
        })
    }
}

// =============================================================================
// Bounds-checked cursor
// =============================================================================

struct HeaderCursor<'a> {
    buf: &'a [u8],
}

impl HeaderCursor<'_> {
    fn ensure(&self, needed: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(KtdError::MalformedHeader(format!(
                "truncated at {}: need {} bytes, {} left",
                what,
                needed,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        self.ensure(1, what)?;
        Ok(self.buf.get_u8())
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        self.ensure(2, what)?;
        Ok(self.buf.get_u16_le())
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        self.ensure(4, what)?;
        Ok(self.buf.get_u32_le())
    }

    fn name(&mut self, what: &str) -> Result<String> {
        self.ensure(NAME_SIZE, what)?;
        let name = decode_name(&self.buf[..NAME_SIZE]);
        self.buf.advance(NAME_SIZE);
        Ok(name)
    }

    fn field(&mut self, what: &str) -> Result<FieldSpec> {
        let name = self.name(what)?;
        let data_type = DataType::from(self.u8(what)?);
        let start_position = self.u8(what)?;
        let length = self.u8(what)?;
        Ok(FieldSpec {
            name,
            data_type,
            start_position,
            length,
        })
    }

    fn fields(&mut self, count: u8, what: &str) -> Result<Vec<FieldSpec>> {
        (0..count).map(|_| self.field(what)).collect()
    }
}

/// Fixed-width ASCII with trailing NULs stripped
fn decode_name(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| (b & 0x7f) as char)
        .collect::<String>()
        .trim_end_matches('\0')
        .to_string()
}
