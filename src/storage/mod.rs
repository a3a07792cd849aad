//! Storage Module
//!
//! Positioned reads against the backing container.
//!
//! ## Responsibilities
//! - Own the file handle for the lifetime of a reader
//! - Serve fixed-offset reads to the index resolvers and block decoder
//! - Release the handle on `close()` or drop, whichever comes first
//!
//! Everything above this layer talks to a [`ByteSource`], so the resolvers
//! and decoder work the same over a file or an in-memory buffer.

mod handle;

use std::io;

use bytes::Buf;

use crate::error::Result;

pub use handle::FileHandle;

/// Fixed-offset reads from a byte container
pub trait ByteSource {
    /// Read exactly `len` bytes starting at `offset`
    fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>>;

    /// Read up to `len` bytes starting at `offset`, stopping early at the end
    /// of the source
    fn read_up_to(&self, offset: u64, len: usize) -> Result<Vec<u8>>;

    /// Read a little-endian u32 at `offset`
    fn read_u32_le(&self, offset: u64) -> Result<u32> {
        let buf = self.read_at(offset, 4)?;
        Ok((&buf[..]).get_u32_le())
    }
}

impl ByteSource for [u8] {
    fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        start
            .checked_add(len)
            .and_then(|end| self.get(start..end))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("read of {} bytes at {} past end of buffer", len, offset),
                )
                .into()
            })
    }

    fn read_up_to(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(self.len());
        let end = start.saturating_add(len).min(self.len());
        Ok(self[start..end].to_vec())
    }
}

impl ByteSource for Vec<u8> {
    fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.as_slice().read_at(offset, len)
    }

    fn read_up_to(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.as_slice().read_up_to(offset, len)
    }
}
