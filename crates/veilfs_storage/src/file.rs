//! File-based stream for persistent storage.

use crate::error::StorageResult;
use crate::stream::RandomAccessStream;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-backed random-access stream.
///
/// This stream provides persistent storage using OS file APIs.
/// Data survives process restarts.
///
/// Writing or resizing past the current end relies on the OS to zero-fill
/// the gap; on most filesystems the zero region is stored as a hole, so
/// [`is_sparse`] reports `true`.
///
/// [`is_sparse`]: RandomAccessStream::is_sparse
///
/// # Durability
///
/// - `flush()` calls `File::flush()` to push data to the OS
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
///
/// # Example
///
/// ```no_run
/// use veilfs_storage::{FileStream, RandomAccessStream};
/// use std::path::Path;
///
/// let mut stream = FileStream::open(Path::new("data.bin")).unwrap();
/// stream.write_at(0, b"persistent data").unwrap();
/// stream.sync().unwrap();  // Ensure data is durable
/// ```
#[derive(Debug)]
pub struct FileStream {
    path: PathBuf,
    file: RwLock<File>,
    size: RwLock<u64>,
}

impl FileStream {
    /// Opens or creates a file stream at the given path.
    ///
    /// If the file exists, it is opened for reading and writing.
    /// If it doesn't exist, a new file is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(size),
        })
    }

    /// Opens or creates a file stream, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Syncs all data and metadata to durable storage.
    ///
    /// This is a stronger guarantee than `flush` - it ensures that file
    /// metadata (size, timestamps) is also durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    pub fn sync(&mut self) -> StorageResult<()> {
        let file = self.file.write();
        file.sync_all()?;
        Ok(())
    }
}

impl RandomAccessStream for FileStream {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> StorageResult<usize> {
        let size = *self.size.read();
        if offset >= size || buf.is_empty() {
            return Ok(0);
        }

        let n = (buf.len() as u64).min(size - offset) as usize;

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf[..n])?;

        Ok(n)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> StorageResult<()> {
        if buf.is_empty() {
            return Ok(());
        }

        let mut file = self.file.write();
        let mut size = self.size.write();

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;

        let end = offset + buf.len() as u64;
        if end > *size {
            *size = end;
        }

        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(*self.size.read())
    }

    fn resize(&mut self, new_size: u64) -> StorageResult<()> {
        let file = self.file.write();
        let mut size = self.size.write();

        file.set_len(new_size)?;
        *size = new_size;

        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        Ok(())
    }

    fn is_sparse(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let stream = FileStream::open(&path).unwrap();
        assert_eq!(stream.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut stream = FileStream::open(&path).unwrap();
        stream.write_at(0, b"hello world").unwrap();
        assert_eq!(stream.size().unwrap(), 11);

        let mut buf = [0u8; 11];
        assert_eq!(stream.read_at(0, &mut buf).unwrap(), 11);
        assert_eq!(&buf, b"hello world");
    }

    #[test]
    fn file_read_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut stream = FileStream::open(&path).unwrap();
        stream.write_at(0, b"hello world").unwrap();

        let mut buf = [0u8; 5];
        assert_eq!(stream.read_at(6, &mut buf).unwrap(), 5);
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn file_read_past_end_is_short() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut stream = FileStream::open(&path).unwrap();
        stream.write_at(0, b"hello").unwrap();

        let mut buf = [0u8; 10];
        assert_eq!(stream.read_at(3, &mut buf).unwrap(), 2);
        assert_eq!(stream.read_at(100, &mut buf).unwrap(), 0);
    }

    #[test]
    fn file_write_past_end_zero_fills() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut stream = FileStream::open(&path).unwrap();
        stream.write_at(0, b"ab").unwrap();
        stream.write_at(6, b"cd").unwrap();

        assert_eq!(stream.size().unwrap(), 8);

        let mut buf = [0u8; 8];
        stream.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"ab\0\0\0\0cd");
    }

    #[test]
    fn file_resize_grow_and_shrink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut stream = FileStream::open(&path).unwrap();
        stream.write_at(0, b"hello").unwrap();

        stream.resize(8).unwrap();
        assert_eq!(stream.size().unwrap(), 8);

        let mut buf = [0u8; 8];
        stream.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"hello\0\0\0");

        stream.resize(2).unwrap();
        assert_eq!(stream.size().unwrap(), 2);
        assert_eq!(stream.read_at(0, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"he");
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        // Write data
        {
            let mut stream = FileStream::open(&path).unwrap();
            stream.write_at(0, b"persistent data").unwrap();
            stream.sync().unwrap();
        }

        // Reopen and read
        {
            let stream = FileStream::open(&path).unwrap();
            assert_eq!(stream.size().unwrap(), 15);

            let mut buf = [0u8; 15];
            stream.read_at(0, &mut buf).unwrap();
            assert_eq!(&buf, b"persistent data");
        }
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("test.bin");

        let stream = FileStream::open_with_create_dirs(&path).unwrap();
        assert_eq!(stream.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn file_is_sparse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let stream = FileStream::open(&path).unwrap();
        assert!(stream.is_sparse());
    }

    #[test]
    fn file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let stream = FileStream::open(&path).unwrap();
        assert_eq!(stream.path(), path);
    }
}
