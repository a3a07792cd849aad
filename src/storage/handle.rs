//! File Handle
//!
//! Owns the container's file descriptor and serves positioned reads.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use parking_lot::Mutex;

use crate::error::{KtdError, Result};

use super::ByteSource;

/// Read-only handle to a container file
///
/// The file lives behind a mutex so lookups can take `&self` while still
/// seeking. `close()` drops the file early; dropping the handle closes it
/// otherwise.
pub struct FileHandle {
    /// `None` once closed
    file: Mutex<Option<File>>,
}

impl FileHandle {
    /// Open a container file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| KtdError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            file: Mutex::new(Some(file)),
        })
    }

    /// Release the file descriptor. Calling this more than once is a no-op.
    pub fn close(&self) {
        if self.file.lock().take().is_some() {
            tracing::trace!("file handle closed");
        }
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }

    fn with_file<T>(&self, f: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
        let mut guard = self.file.lock();
        let file = guard.as_mut().ok_or(KtdError::Closed)?;
        f(file)
    }
}

impl ByteSource for FileHandle {
    fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.with_file(|file| {
            file.seek(SeekFrom::Start(offset))?;
            let mut buf = vec![0u8; len];
            file.read_exact(&mut buf)?;
            Ok(buf)
        })
    }

    fn read_up_to(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.with_file(|file| {
            file.seek(SeekFrom::Start(offset))?;
            let mut buf = Vec::with_capacity(len);
            file.take(len as u64).read_to_end(&mut buf)?;
            Ok(buf)
        })
    }
}
