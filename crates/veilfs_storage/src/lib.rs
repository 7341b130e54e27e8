//! # VeilFS Storage
//!
//! Underlying stream trait and implementations for VeilFS.
//!
//! This crate provides the lowest-level storage abstraction for VeilFS.
//! Underlying streams are **opaque byte stores** - they do not interpret
//! the data they store.
//!
//! ## Design Principles
//!
//! - Streams are simple byte stores (positional read/write, resize, flush)
//! - No knowledge of VeilFS headers, block framing, or ciphertext layout
//! - Reads past the end come back short instead of erroring, so layers
//!   above can probe for ragged tails
//! - Writes and resizes past the end zero-fill the gap
//!
//! ## Available Streams
//!
//! - [`MemoryStream`] - For testing and ephemeral storage
//! - [`FileStream`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use veilfs_storage::{MemoryStream, RandomAccessStream};
//!
//! let mut stream = MemoryStream::new();
//! stream.write_at(0, b"hello world").unwrap();
//!
//! let mut buf = [0u8; 11];
//! stream.read_at(0, &mut buf).unwrap();
//! assert_eq!(&buf, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod stream;

pub use error::{StorageError, StorageResult};
pub use file::FileStream;
pub use memory::MemoryStream;
pub use stream::RandomAccessStream;
