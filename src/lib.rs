//! # ktdreader
//!
//! A read-only decoder and point-lookup engine for KTD flat-file tables:
//! - Header and schema parsing with derived packed-column layout
//! - Reference (dictionary) tables for packed columns
//! - Primary key lookups through a sorted key index
//! - Secondary key lookups through an extra hop into the primary index
//! - bzip2 block decompression and record decoding
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        KtdReader                             │
//! │        find_by_primary_key / find_by_secondary_key           │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!   ┌─────────────────────────┐      ┌──────────────────────┐
//!   │   Index (first >= key)  │      │   Schema + Reference │
//!   │ primary ◄── secondary   │      │   Tables (at open)   │
//!   └────────────┬────────────┘      └──────────┬───────────┘
//!                │ block range                  │ layout
//!                ▼                              ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │            Block (decompress → records → Row)            │
//!   └────────────────────────────┬────────────────────────────┘
//!                                │
//!                                ▼
//!                       ┌─────────────────┐
//!                       │     Storage     │
//!                       │ (positioned I/O)│
//!                       └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod format;
pub mod index;
pub mod block;
pub mod row;
pub mod reader;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KtdError, Result};
pub use config::Config;
pub use block::{BlockCodec, LineWidth};
pub use index::IndexSearch;
pub use reader::KtdReader;
pub use row::{Row, PRIMARY_KEY_COLUMN};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ktdreader
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
