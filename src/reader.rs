//! Reader Module
//!
//! The query engine that ties the schema, indexes and block decoder
//! together.
//!
//! ## Responsibilities
//! - Open the container and load the schema and reference tables once
//! - Answer primary key lookups: primary index → data block → record scan
//! - Answer secondary key lookups: secondary index → secondary block →
//!   primary index slot → data block → record scan
//! - Release the file handle on `close()` or drop

use std::path::{Path, PathBuf};

use crate::block::{read_block, BlockDecoder, LineWidth};
use crate::config::Config;
use crate::error::{KtdError, Result};
use crate::format::{load_reference_tables, Header, ReferenceTable, Schema, HEADER_SIZE};
use crate::index::{resolve_primary_range, BlockRange, KeyIndex};
use crate::row::{Row, PRIMARY_KEY_COLUMN};
use crate::storage::{ByteSource, FileHandle};

/// Read-only point lookups over a KTD container
///
/// The schema and reference tables are immutable after `open`. Every query
/// does its own positioned reads and owns its buffers; a lookup that finds
/// nothing returns `Ok(None)`.
pub struct KtdReader {
    path: PathBuf,
    handle: FileHandle,
    schema: Schema,
    references: Vec<ReferenceTable>,
    config: Config,
}

impl KtdReader {
    /// Open a container with the default config
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Open a container
    ///
    /// On open:
    /// 1. Open the file (released again if any later step fails)
    /// 2. Parse the 768-byte header
    /// 3. Load every reference table with a nonzero offset
    /// 4. Derive the column layout and bind packed columns to tables
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref();
        let handle = FileHandle::open(path)?;

        let header_bytes = handle.read_up_to(0, HEADER_SIZE)?;
        let header = Header::parse(&header_bytes)?;

        let references = load_reference_tables(
            &handle,
            &header.reference_offsets,
            config.max_reference_table_size,
        )?;

        let schema = Schema::from_header(header);
        schema.check_reference_bindings(references.len())?;

        tracing::debug!(
            path = %path.display(),
            table = %schema.table_name,
            version = schema.version,
            records = schema.record_count,
            columns = schema.columns.len(),
            secondary_groups = schema.secondary_groups.len(),
            reference_tables = references.len(),
            "opened container"
        );

        Ok(Self {
            path: path.to_path_buf(),
            handle,
            schema,
            references,
            config,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find the row whose rebuilt primary key equals `keyword`
    pub fn find_by_primary_key(&self, keyword: &str, width: LineWidth) -> Result<Option<Row>> {
        let primary = self.primary_index()?;

        let Some(range) = primary.resolve(keyword.as_bytes(), self.config.index_search)? else {
            tracing::trace!(keyword, "primary key past end of index");
            return Ok(None);
        };

        self.find_in_block(range, width, PRIMARY_KEY_COLUMN, keyword)
    }

    /// Find the row whose `field_name` column equals `keyword`, using the
    /// first secondary key group that contains `field_name`
    pub fn find_by_secondary_key(
        &self,
        field_name: &str,
        keyword: &str,
        width: LineWidth,
    ) -> Result<Option<Row>> {
        let (group_no, group) = self
            .schema
            .secondary_group_for(field_name)
            .ok_or_else(|| KtdError::UnknownSecondaryKey(field_name.to_string()))?;

        if group.index_offset == 0 {
            tracing::warn!(field_name, group = group_no, "secondary key group has no index offset");
            return Err(KtdError::MissingIndex { group: group_no });
        }

        let secondary = KeyIndex::open(&self.handle, group.index_offset, group.key_length)?;
        let Some(secondary_range) = secondary.resolve(keyword.as_bytes(), self.config.index_search)?
        else {
            tracing::trace!(field_name, keyword, "secondary key past end of index");
            return Ok(None);
        };

        let primary = self.primary_index()?;
        let Some(range) = resolve_primary_range(
            &self.handle,
            &primary,
            secondary_range,
            group.key_length,
            keyword.as_bytes(),
            self.config.codec,
            self.config.max_block_size,
        )?
        else {
            return Ok(None);
        };

        self.find_in_block(range, width, field_name, keyword)
    }

    fn primary_index(&self) -> Result<KeyIndex<'_, FileHandle>> {
        KeyIndex::open(
            &self.handle,
            self.schema.primary_index_offset,
            self.schema.primary_key_length,
        )
    }

    fn find_in_block(
        &self,
        range: BlockRange,
        width: LineWidth,
        match_column: &str,
        match_value: &str,
    ) -> Result<Option<Row>> {
        let block = read_block(&self.handle, range, self.config.codec, self.config.max_block_size)?;
        BlockDecoder::new(&self.schema, &self.references).find(
            &block,
            width,
            match_column,
            match_value,
            range.start as u64,
        )
    }

    // =========================================================================
    // Accessors / lifecycle
    // =========================================================================

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Loaded reference tables in header slot order
    pub fn reference_tables(&self) -> &[ReferenceTable] {
        &self.references
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the file handle. Safe to call more than once; later queries
    /// fail with [`KtdError::Closed`].
    pub fn close(&self) {
        self.handle.close();
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }
}
