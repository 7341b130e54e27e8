//! # VeilFS Crypt
//!
//! Authenticated block-level encryption for VeilFS streams.
//!
//! This crate turns a plaintext random-access file into a ciphertext
//! random-access file and back. Plaintext is cut into fixed-size blocks,
//! each sealed independently with AES-256-GCM under a per-file session
//! key; the caller keeps ordinary `read`/`write`/`resize` semantics over
//! the plaintext view.
//!
//! ## Design Principles
//!
//! - Per-block authenticated encryption, so random access stays O(1)
//! - The file id and block number are bound into every tag: ciphertext
//!   blocks cannot move between files or positions undetected
//! - All-zero block regions are sparse holes decoding to plaintext zeros,
//!   so hole-punching underlying stores stay cheap
//! - The session key is persisted only XOR-masked with the master key
//!
//! ## Layers
//!
//! - [`BlockStream`] / [`BlockStore`]: the generic engine translating
//!   byte-level operations into whole-block operations
//! - [`AesGcmCryptStream`]: the concrete AES-GCM block store over any
//!   [`veilfs_storage::RandomAccessStream`]
//!
//! ## Example
//!
//! ```rust
//! use veilfs_crypt::{AesGcmCryptStream, CryptOptions, FileId, MasterKey};
//! use veilfs_storage::MemoryStream;
//!
//! let key = MasterKey::generate();
//! let mut stream = AesGcmCryptStream::open(
//!     MemoryStream::new(),
//!     &key,
//!     FileId::random(),
//!     &CryptOptions::default(),
//! )
//! .unwrap();
//!
//! stream.write(b"secret bytes", 0).unwrap();
//! assert_eq!(stream.size().unwrap(), 12);
//! stream.flush().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod aead;
mod block;
mod error;
mod keys;
mod stream;

pub use aead::{MAX_IV_SIZE, MIN_IV_SIZE, TAG_SIZE};
pub use block::{BlockStore, BlockStream};
pub use error::{CryptError, CryptResult};
pub use keys::{FileId, MasterKey, SessionKey, ID_SIZE, KEY_SIZE};
pub use stream::{AesGcmCryptStream, CryptOptions, HEADER_SIZE, MIN_BLOCK_SIZE};
