//! Index Module
//!
//! Locates the data block that may hold a key.
//!
//! ## Responsibilities
//! - Resolve a search key against a sorted on-disk key index to the first
//!   entry whose key is >= the search key
//! - Follow a secondary index block to a slot in the primary index, and from
//!   there to the data block range
//!
//! A hit only means the returned block is the one that would hold the key;
//! the block decoder still has to find an exact match.

mod key_index;
mod secondary;

pub use key_index::{key_at_or_after, BlockRange, KeyIndex, KeyIndexEntry, ENTRY_TRAILER_SIZE};
pub use secondary::{find_primary_slot, resolve_primary_range, SLOT_SIZE};

/// Strategy for finding the first index entry >= a search key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexSearch {
    /// Read entries in order and stop at the first qualifying one
    Linear,
    /// Lower-bound binary search over the sorted entries
    #[default]
    Binary,
}
