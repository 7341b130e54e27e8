//! In-memory stream for testing.

use crate::error::StorageResult;
use crate::stream::RandomAccessStream;
use parking_lot::RwLock;

/// An in-memory random-access stream.
///
/// This stream stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral streams that don't need persistence
///
/// Zero-filled gaps occupy real memory, so [`is_sparse`] reports `false`.
///
/// [`is_sparse`]: RandomAccessStream::is_sparse
///
/// # Example
///
/// ```rust
/// use veilfs_storage::{MemoryStream, RandomAccessStream};
///
/// let mut stream = MemoryStream::new();
/// stream.write_at(0, b"test data").unwrap();
/// assert_eq!(stream.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStream {
    data: RwLock<Vec<u8>>,
}

impl MemoryStream {
    /// Creates a new empty in-memory stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory stream with pre-existing data.
    ///
    /// Useful for testing reopen and recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of all data in the stream.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Consumes the stream, returning its raw contents.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data.into_inner()
    }
}

impl RandomAccessStream for MemoryStream {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> StorageResult<usize> {
        let data = self.data.read();
        let offset = offset as usize;
        if offset >= data.len() || buf.is_empty() {
            return Ok(0);
        }

        let n = buf.len().min(data.len() - offset);
        buf[..n].copy_from_slice(&data[offset..offset + n]);
        Ok(n)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> StorageResult<()> {
        let mut data = self.data.write();
        let offset = offset as usize;
        let end = offset + buf.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(buf);
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn resize(&mut self, new_size: u64) -> StorageResult<()> {
        self.data.write().resize(new_size as usize, 0);
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        // In-memory stream has no pending writes
        Ok(())
    }
}
