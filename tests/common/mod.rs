//! Fixture writer for KTD containers
//!
//! Builds complete containers in memory (header, reference tables, blocks,
//! key indexes) so tests can exercise the reader against real files.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use bzip2::write::BzEncoder;
use bzip2::Compression;

pub const HEADER_SIZE: usize = 768;

// =============================================================================
// Fixture description
// =============================================================================

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub data_type: u8,
    pub start: u8,
    pub length: u8,
}

pub fn field(name: &str, data_type: u8, start: u8, length: u8) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        data_type,
        start,
        length,
    }
}

#[derive(Debug, Clone)]
pub struct RefTableDef {
    /// Header slot (0..5) holding this table's offset
    pub slot: usize,
    pub width: u32,
    pub rows: Vec<Vec<u8>>,
}

pub fn ref_table(slot: usize, rows: &[&str]) -> RefTableDef {
    let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
    RefTableDef {
        slot,
        width,
        rows: rows.iter().map(|r| r.as_bytes().to_vec()).collect(),
    }
}

/// A data block and the primary index key that points at it
#[derive(Debug, Clone)]
pub struct DataBlockDef {
    pub index_key: Vec<u8>,
    /// Record payloads, without length prefixes
    pub payloads: Vec<Vec<u8>>,
}

/// A secondary index block and the secondary index key that points at it
#[derive(Debug, Clone)]
pub struct SecondaryBlockDef {
    pub index_key: Vec<u8>,
    /// (secondary key, primary index slot)
    pub entries: Vec<(Vec<u8>, u16)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureCodec {
    Bzip2,
    Raw,
}

#[derive(Debug, Clone)]
pub struct Fixture {
    pub version: u16,
    pub record_count: u32,
    pub block_size: u16,
    pub table_name: String,
    pub primary_key: Vec<FieldDef>,
    pub secondary_groups: Vec<Vec<FieldDef>>,
    pub columns: Vec<FieldDef>,
    pub reference_tables: Vec<RefTableDef>,
    pub blocks: Vec<DataBlockDef>,
    /// One list of secondary blocks per secondary group
    pub secondary_blocks: Vec<Vec<SecondaryBlockDef>>,
    /// Record length prefix width (1 or 2)
    pub line_width: u8,
    pub codec: FixtureCodec,
    /// Place the primary index at this offset instead of right after the blocks
    pub primary_index_at: Option<u32>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            version: 1,
            record_count: 0,
            block_size: 0,
            table_name: "TEST".to_string(),
            primary_key: Vec::new(),
            secondary_groups: Vec::new(),
            columns: Vec::new(),
            reference_tables: Vec::new(),
            blocks: Vec::new(),
            secondary_blocks: Vec::new(),
            line_width: 1,
            codec: FixtureCodec::Bzip2,
            primary_index_at: None,
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

pub fn compress(codec: FixtureCodec, data: &[u8]) -> Vec<u8> {
    match codec {
        FixtureCodec::Bzip2 => {
            let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        FixtureCodec::Raw => data.to_vec(),
    }
}

/// Prefix a payload with its total record length
pub fn encode_record(line_width: u8, payload: &[u8]) -> Vec<u8> {
    let total = payload.len() + line_width as usize;
    let mut record = Vec::with_capacity(total);
    match line_width {
        1 => record.push(u8::try_from(total).unwrap()),
        2 => record.extend_from_slice(&u16::try_from(total).unwrap().to_le_bytes()),
        other => panic!("unsupported line width {}", other),
    }
    record.extend_from_slice(payload);
    record
}

/// Concatenate length-prefixed records into one uncompressed block
pub fn encode_block(line_width: u8, payloads: &[Vec<u8>]) -> Vec<u8> {
    payloads
        .iter()
        .flat_map(|p| encode_record(line_width, p))
        .collect()
}

pub fn put_name(buf: &mut Vec<u8>, name: &str) {
    let mut raw = [0u8; 20];
    raw[..name.len()].copy_from_slice(name.as_bytes());
    buf.extend_from_slice(&raw);
}

fn put_fields(buf: &mut Vec<u8>, fields: &[FieldDef]) {
    buf.push(fields.len() as u8);
    for f in fields {
        put_name(buf, &f.name);
        buf.push(f.data_type);
        buf.push(f.start);
        buf.push(f.length);
    }
}

/// Serialize a key index: count followed by (key, start, end)
pub fn encode_key_index(entries: &[(Vec<u8>, u32, u32)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for (key, start, end) in entries {
        buf.extend_from_slice(key);
        buf.extend_from_slice(&start.to_le_bytes());
        buf.extend_from_slice(&end.to_le_bytes());
    }
    buf
}

/// Serialize a secondary index block body: (key, slot) pairs
pub fn encode_secondary_block(entries: &[(Vec<u8>, u16)]) -> Vec<u8> {
    let mut buf = Vec::new();
    for (key, slot) in entries {
        buf.extend_from_slice(key);
        buf.extend_from_slice(&slot.to_le_bytes());
    }
    buf
}

impl Fixture {
    /// Header bytes with the given region offsets
    pub fn encode_header(
        &self,
        reference_offsets: [u32; 5],
        primary_index_offset: u32,
        secondary_offsets: [u32; 3],
    ) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.record_count.to_le_bytes());
        buf.extend_from_slice(&self.block_size.to_le_bytes());
        for offset in reference_offsets {
            buf.extend_from_slice(&offset.to_le_bytes());
        }
        buf.extend_from_slice(&primary_index_offset.to_le_bytes());
        for offset in secondary_offsets {
            buf.extend_from_slice(&offset.to_le_bytes());
        }
        put_name(&mut buf, &self.table_name);
        put_fields(&mut buf, &self.primary_key);
        buf.push(self.secondary_groups.len() as u8);
        for group in &self.secondary_groups {
            put_fields(&mut buf, group);
        }
        put_fields(&mut buf, &self.columns);

        assert!(buf.len() <= HEADER_SIZE, "fixture header too large");
        buf.resize(HEADER_SIZE, 0);
        buf
    }

    /// Full container bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = vec![0u8; HEADER_SIZE];

        let mut reference_offsets = [0u32; 5];
        for table in &self.reference_tables {
            reference_offsets[table.slot] = body.len() as u32;
            body.extend_from_slice(&(table.rows.len() as u32).to_le_bytes());
            body.extend_from_slice(&table.width.to_le_bytes());
            for row in &table.rows {
                body.extend_from_slice(row);
            }
        }

        let mut primary_entries = Vec::new();
        for block in &self.blocks {
            let start = body.len() as u32;
            body.extend(compress(self.codec, &encode_block(self.line_width, &block.payloads)));
            primary_entries.push((block.index_key.clone(), start, body.len() as u32));
        }

        if let Some(at) = self.primary_index_at {
            assert!(body.len() <= at as usize, "primary index offset overlaps data");
            body.resize(at as usize, 0);
        }
        let primary_index_offset = body.len() as u32;
        body.extend(encode_key_index(&primary_entries));

        let mut secondary_offsets = [0u32; 3];
        for (group, blocks) in self.secondary_blocks.iter().enumerate() {
            let mut entries = Vec::new();
            for block in blocks {
                let start = body.len() as u32;
                body.extend(compress(self.codec, &encode_secondary_block(&block.entries)));
                entries.push((block.index_key.clone(), start, body.len() as u32));
            }
            secondary_offsets[group] = body.len() as u32;
            body.extend(encode_key_index(&entries));
        }

        let header = self.encode_header(reference_offsets, primary_index_offset, secondary_offsets);
        body[..HEADER_SIZE].copy_from_slice(&header);
        body
    }

    /// Write the container into `dir` and return its path
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("table.ktd");
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

// =============================================================================
// Sample tables
// =============================================================================

pub const DEPARTMENTS: [&str; 3] = ["SALE", "ENGR", "HRMN"];
pub const CITIES: [&str; 2] = ["TOKYO   ", "OSAKA   "];

/// (id, department index, city index, name, note)
pub const PEOPLE: [(&str, u16, u16, &str, &str); 6] = [
    ("000001", 0, 0, "Alice", "first"),
    ("000002", 1, 1, "Bob", ""),
    ("000003", 2, 0, "Carol", "likes tea"),
    ("000004", 1, 0, "Dave", "x"),
    ("000005", 0, 1, "Erin", "remote worker"),
    ("000006", 2, 1, "Frank", "on leave"),
];

pub fn pad(value: &str, width: usize) -> String {
    format!("{:<width$}", value, width = width)
}

/// Payload layout: ID(6) DEPT(u16) CITY(u16) NAME(10) NOTE(rest)
pub fn person_payload(person: &(&str, u16, u16, &str, &str)) -> Vec<u8> {
    let (id, dept, city, name, note) = person;
    let mut payload = Vec::new();
    payload.extend_from_slice(id.as_bytes());
    payload.extend_from_slice(&dept.to_le_bytes());
    payload.extend_from_slice(&city.to_le_bytes());
    payload.extend_from_slice(pad(name, 10).as_bytes());
    payload.extend_from_slice(note.as_bytes());
    payload
}

/// A people table: ID primary key, NAME secondary key, two packed columns,
/// rows split over two blocks (ids 1-3 and 4-6)
pub fn people_fixture(line_width: u8) -> Fixture {
    let columns = vec![
        field("ID", 1, 0, 6),
        field("DEPT", 0, 6, 4),
        field("CITY", 0, 10, 8),
        field("NAME", 1, 18, 10),
        field("NOTE", 1, 28, 0),
    ];

    let blocks = PEOPLE
        .chunks(3)
        .map(|chunk| DataBlockDef {
            index_key: chunk.last().unwrap().0.as_bytes().to_vec(),
            payloads: chunk.iter().map(person_payload).collect(),
        })
        .collect();

    let secondary_entries = PEOPLE
        .iter()
        .enumerate()
        .map(|(i, p)| (pad(p.3, 10).into_bytes(), (i / 3) as u16))
        .collect::<Vec<_>>();

    Fixture {
        version: 3,
        record_count: PEOPLE.len() as u32,
        block_size: 3,
        table_name: "PEOPLE".to_string(),
        primary_key: vec![field("ID", 1, 0, 6)],
        secondary_groups: vec![vec![field("NAME", 1, 18, 10)]],
        columns,
        reference_tables: vec![ref_table(0, &DEPARTMENTS), ref_table(1, &CITIES)],
        blocks,
        secondary_blocks: vec![vec![SecondaryBlockDef {
            index_key: pad("Frank", 10).into_bytes(),
            entries: secondary_entries,
        }]],
        line_width,
        codec: FixtureCodec::Bzip2,
        primary_index_at: None,
    }
}
