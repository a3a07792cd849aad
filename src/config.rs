//! Configuration for ktdreader
//!
//! Centralized configuration with sensible defaults.

use crate::block::BlockCodec;
use crate::index::IndexSearch;

/// Configuration for opening a KTD container
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// How key indexes are searched for the first entry >= the search key
    pub index_search: IndexSearch,

    // -------------------------------------------------------------------------
    // Block Configuration
    // -------------------------------------------------------------------------
    /// Codec used for data blocks and secondary index blocks
    pub codec: BlockCodec,

    /// Largest compressed block the reader will load (in bytes)
    pub max_block_size: usize,

    // -------------------------------------------------------------------------
    // Reference Table Configuration
    // -------------------------------------------------------------------------
    /// Largest reference table the reader will load at open (in bytes)
    pub max_reference_table_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_search: IndexSearch::Binary,
            codec: BlockCodec::Bzip2,
            max_block_size: 64 * 1024 * 1024,           // 64 MB
            max_reference_table_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the key index search strategy
    pub fn index_search(mut self, search: IndexSearch) -> Self {
        self.config.index_search = search;
        self
    }

    /// Set the block codec
    pub fn codec(mut self, codec: BlockCodec) -> Self {
        self.config.codec = codec;
        self
    }

    /// Set the maximum compressed block size (in bytes)
    pub fn max_block_size(mut self, size: usize) -> Self {
        self.config.max_block_size = size;
        self
    }

    /// Set the maximum reference table size (in bytes)
    pub fn max_reference_table_size(mut self, size: usize) -> Self {
        self.config.max_reference_table_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
