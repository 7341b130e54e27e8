//! Random-access stream trait definition.

use crate::error::StorageResult;

/// A byte-addressable storage stream.
///
/// Streams are **opaque byte stores**. They provide positional reads and
/// writes, exact resizing, and flushing. VeilFS owns all format
/// interpretation — streams do not understand headers, blocks, or
/// ciphertext framing.
///
/// # Invariants
///
/// - `read_at` returns exactly the bytes previously written at that offset
/// - Writing or resizing past the current end zero-fills the gap
/// - `flush` ensures all buffered writes have reached the backing store
///
/// # Implementors
///
/// - [`super::MemoryStream`] - For testing
/// - [`super::FileStream`] - For persistent storage
pub trait RandomAccessStream: Send {
    /// Reads up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read. Reads past the end of the stream
    /// are not an error: the count comes back short, and zero once `offset`
    /// is at or beyond [`size`](Self::size).
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> StorageResult<usize>;

    /// Writes all of `buf` at `offset`.
    ///
    /// Writing past the current end implicitly zero-fills the gap between
    /// the old end and `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> StorageResult<()>;

    /// Returns the current size of the stream in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Grows (zero-filling) or shrinks the stream to exactly `new_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the resize operation fails.
    fn resize(&mut self, new_size: u64) -> StorageResult<()>;

    /// Flushes all pending writes to the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Whether zero-filled regions are stored without occupying space.
    fn is_sparse(&self) -> bool {
        false
    }
}

impl<S: RandomAccessStream + ?Sized> RandomAccessStream for Box<S> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> StorageResult<usize> {
        (**self).read_at(offset, buf)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> StorageResult<()> {
        (**self).write_at(offset, buf)
    }

    fn size(&self) -> StorageResult<u64> {
        (**self).size()
    }

    fn resize(&mut self, new_size: u64) -> StorageResult<()> {
        (**self).resize(new_size)
    }

    fn flush(&mut self) -> StorageResult<()> {
        (**self).flush()
    }

    fn is_sparse(&self) -> bool {
        (**self).is_sparse()
    }
}
