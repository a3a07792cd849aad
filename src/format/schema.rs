//! Schema
//!
//! The parsed header plus the layout derived from it once at open time:
//! key lengths, packed column positions, reference table bindings and
//! padding corrections.

use std::sync::Arc;

use crate::error::{KtdError, Result};

use super::{FieldSpec, Header, PACKED_WIDTH, REFERENCE_SLOTS};

/// A column together with its precomputed on-disk layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub spec: FieldSpec,
    /// Byte offset within a record payload, counting every earlier packed
    /// column as 2 bytes and every earlier plain column at its declared length
    pub packed_position: usize,
    /// Reference table this column resolves through (packed columns only)
    pub reference_table: Option<usize>,
    /// Sum of (declared length - 2) over the packed columns before this one
    pub padding_before: i32,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn is_packed(&self) -> bool {
        self.spec.data_type.is_packed()
    }
}

/// A named group of secondary key fields sharing one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryKeyGroup {
    pub fields: Vec<FieldSpec>,
    /// Sum of the field lengths; the key width of this group's index
    pub key_length: usize,
    /// File offset of this group's key index (0 if absent)
    pub index_offset: u32,
}

impl SecondaryKeyGroup {
    pub fn contains(&self, field_name: &str) -> bool {
        self.fields.iter().any(|f| f.name == field_name)
    }
}

/// Immutable table description loaded once per reader
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: u16,
    pub record_count: u32,
    pub block_size: u16,
    pub table_name: String,
    pub reference_offsets: [u32; REFERENCE_SLOTS],
    pub primary_index_offset: u32,
    pub primary_key: Vec<FieldSpec>,
    /// Sum of the primary key field lengths
    pub primary_key_length: usize,
    pub secondary_groups: Vec<SecondaryKeyGroup>,
    pub columns: Vec<Column>,
    /// Sum of (declared length - 2) over all packed columns
    pub reference_padding: i32,
    column_names: Arc<[String]>,
}

impl Schema {
    /// Derive the schema layout from a parsed header
    pub fn from_header(header: Header) -> Self {
        let primary_key_length = key_length(&header.primary_key);

        let secondary_groups = header
            .secondary_groups
            .into_iter()
            .zip(header.secondary_index_offsets)
            .map(|(fields, index_offset)| SecondaryKeyGroup {
                key_length: key_length(&fields),
                fields,
                index_offset,
            })
            .collect();

        let (columns, reference_padding) = layout_columns(header.columns);
        let column_names = columns.iter().map(|c| c.spec.name.clone()).collect();

        Schema {
            version: header.version,
            record_count: header.record_count,
            block_size: header.block_size,
            table_name: header.table_name,
            reference_offsets: header.reference_offsets,
            primary_index_offset: header.primary_index_offset,
            primary_key: header.primary_key,
            primary_key_length,
            secondary_groups,
            columns,
            reference_padding,
            column_names,
        }
    }

    /// Check that every packed column has a loaded reference table to
    /// resolve through
    pub fn check_reference_bindings(&self, loaded_tables: usize) -> Result<()> {
        for column in &self.columns {
            if let Some(table) = column.reference_table {
                if table >= loaded_tables {
                    return Err(KtdError::MalformedHeader(format!(
                        "packed column '{}' needs reference table {} but only {} loaded",
                        column.name(),
                        table,
                        loaded_tables
                    )));
                }
            }
        }
        Ok(())
    }

    /// Column names in declared order, shared by every decoded row
    pub fn column_names(&self) -> &Arc<[String]> {
        &self.column_names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.spec.name == name)
    }

    /// First secondary key group containing a field named `field_name`
    pub fn secondary_group_for(&self, field_name: &str) -> Option<(usize, &SecondaryKeyGroup)> {
        self.secondary_groups
            .iter()
            .enumerate()
            .find(|(_, group)| group.contains(field_name))
    }
}

fn key_length(fields: &[FieldSpec]) -> usize {
    fields.iter().map(|f| f.length as usize).sum()
}

/// Assign packed positions, reference bindings and padding to each column.
/// Packed columns bind to reference tables by occurrence order.
fn layout_columns(specs: Vec<FieldSpec>) -> (Vec<Column>, i32) {
    let mut position = 0;
    let mut next_table = 0;
    let mut padding = 0i32;

    let columns = specs
        .into_iter()
        .map(|spec| {
            let packed_position = position;
            let padding_before = padding;
            let reference_table = if spec.data_type.is_packed() {
                position += PACKED_WIDTH;
                padding += spec.length as i32 - PACKED_WIDTH as i32;
                next_table += 1;
                Some(next_table - 1)
            } else {
                position += spec.length as usize;
                None
            };
            Column {
                spec,
                packed_position,
                reference_table,
                padding_before,
            }
        })
        .collect();

    (columns, padding)
}
