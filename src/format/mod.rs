//! Format Module
//!
//! Header parsing, derived schema layout and reference tables.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Header (768 bytes, little-endian)                           │
//! │   Version u16 | Records u32 | BlockSize u16                 │
//! │   RefOffsets 5×u32 | PkIndex u32 | SkIndexes 3×u32          │
//! │   TableName [u8; 20]                                        │
//! │   PkCount u8  + PkCount × Field                             │
//! │   SkCount u8  + SkCount × (Count u8 + Count × Field)        │
//! │   ColCount u8 + ColCount × Field                            │
//! │   Field = Name [u8; 20] | DataType u8 | Start u8 | Len u8   │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Reference Tables (at each nonzero RefOffset)                │
//! │   RowCount u32 | RowWidth u32 | RowCount × RowWidth bytes   │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Key Indexes (primary and secondary)                         │
//! │   Count u32 | Count × ([Key] | Start u32 | End u32)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Blocks (compressed)                                         │
//! │   data: length-prefixed records                             │
//! │   secondary index: ([Key] | PkSlot u16) repeated            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod header;
mod reference;
mod schema;

pub use header::{DataType, FieldSpec, Header};
pub use reference::{load_reference_tables, ReferenceTable};
pub use schema::{Column, Schema, SecondaryKeyGroup};

// =============================================================================
// Shared Constants
// =============================================================================

/// Size of the fixed header region at the start of the file
pub const HEADER_SIZE: usize = 768;

/// Width of table and field names
pub const NAME_SIZE: usize = 20;

/// Field record: Name (20) + DataType (1) + Start (1) + Length (1)
pub const FIELD_RECORD_SIZE: usize = NAME_SIZE + 3;

/// Number of reference table offset slots in the header
pub const REFERENCE_SLOTS: usize = 5;

/// Number of secondary key index offset slots in the header
pub const SECONDARY_SLOTS: usize = 3;

/// On-disk width of a packed reference column
pub const PACKED_WIDTH: usize = 2;
