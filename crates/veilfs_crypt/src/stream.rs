//! The AES-GCM crypt stream.
//!
//! Presents a plaintext random-access view over a ciphertext underlying
//! stream. Layout of the underlying stream:
//!
//! ```text
//! offset 0        : 32-byte masked session-key header (session ⊕ master)
//! offset 32       : block 0 = IV[iv_size] ‖ CT[≤ block_size] ‖ TAG[16]
//! offset 32 + UBS : block 1
//! ...
//! ```
//!
//! where `UBS = iv_size + block_size + 16` and only the final block may be
//! short. A block region that is entirely zero bytes is a sparse hole and
//! decodes to plaintext zeros without touching GCM.

use crate::aead::{BlockCipher, MAX_IV_SIZE, MIN_IV_SIZE, TAG_SIZE};
use crate::block::{BlockStore, BlockStream};
use crate::error::{CryptError, CryptResult};
use crate::keys::{is_all_zeros, random_nonzero_iv, FileId, MasterKey, SessionKey, ID_SIZE};
use veilfs_storage::RandomAccessStream;

/// Size of the masked session-key header at the start of the underlying
/// stream, equal to the key size.
pub const HEADER_SIZE: usize = 32;

/// Smallest accepted plaintext block size.
pub const MIN_BLOCK_SIZE: usize = 32;

/// Open-time options for a crypt stream.
///
/// # Example
///
/// ```rust
/// use veilfs_crypt::CryptOptions;
///
/// let options = CryptOptions::new().block_size(64).iv_size(16);
/// assert!(options.verify);
/// ```
#[derive(Debug, Clone)]
pub struct CryptOptions {
    /// Plaintext bytes per block. Must be at least 32.
    pub block_size: usize,

    /// Per-block IV length in bytes. Must be within 12..=32.
    pub iv_size: usize,

    /// Whether a failed authentication tag aborts the read.
    ///
    /// Disabling this tolerates corrupt blocks and returns their bytes
    /// unverified; it exists for read-only forensic recovery and must stay
    /// on for normal use.
    pub verify: bool,
}

impl Default for CryptOptions {
    fn default() -> Self {
        Self {
            block_size: 4096,
            iv_size: 12,
            verify: true,
        }
    }
}

impl CryptOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the plaintext block size.
    #[must_use]
    pub const fn block_size(mut self, value: usize) -> Self {
        self.block_size = value;
        self
    }

    /// Sets the per-block IV length.
    #[must_use]
    pub const fn iv_size(mut self, value: usize) -> Self {
        self.iv_size = value;
        self
    }

    /// Sets whether authentication failures abort reads.
    #[must_use]
    pub const fn verify(mut self, value: bool) -> Self {
        self.verify = value;
        self
    }
}

/// The concrete block store: frames each plaintext block as
/// `IV ‖ ciphertext ‖ tag` in the underlying stream.
struct GcmBlocks<S> {
    underlying: S,
    cipher: BlockCipher,
    id: FileId,
    block_size: usize,
    iv_size: usize,
    verify: bool,
    /// Scratch for one underlying record, `iv_size + block_size + TAG_SIZE`.
    record: Vec<u8>,
    /// Scratch for the per-block AAD, `id ‖ little_endian_u64(block_number)`.
    aux: [u8; ID_SIZE + 8],
}

impl<S: RandomAccessStream> GcmBlocks<S> {
    fn open(
        mut underlying: S,
        master_key: &MasterKey,
        id: FileId,
        options: &CryptOptions,
    ) -> CryptResult<Self> {
        if !(MIN_IV_SIZE..=MAX_IV_SIZE).contains(&options.iv_size) {
            return Err(CryptError::invalid_argument("IV size too small or too large"));
        }
        if options.block_size < MIN_BLOCK_SIZE {
            return Err(CryptError::invalid_argument("block size too small"));
        }

        let mut header = [0u8; HEADER_SIZE];
        let rc = underlying.read_at(0, &mut header)?;
        let session_key = if rc == 0 {
            let session_key = SessionKey::generate();
            underlying.write_at(0, &session_key.mask(master_key))?;
            tracing::debug!(
                block_size = options.block_size,
                iv_size = options.iv_size,
                "initialized crypt stream header"
            );
            session_key
        } else if rc == HEADER_SIZE {
            SessionKey::recover(&header, master_key)
        } else {
            return Err(CryptError::invalid_argument(
                "underlying stream has invalid header size",
            ));
        };

        let cipher = BlockCipher::new(session_key.as_bytes(), options.iv_size)
            .ok_or_else(|| CryptError::invalid_argument("IV size too small or too large"))?;

        let mut aux = [0u8; ID_SIZE + 8];
        aux[..ID_SIZE].copy_from_slice(id.as_bytes());

        Ok(Self {
            underlying,
            cipher,
            id,
            block_size: options.block_size,
            iv_size: options.iv_size,
            verify: options.verify,
            record: vec![0u8; options.iv_size + options.block_size + TAG_SIZE],
            aux,
        })
    }

    fn underlying_block_size(&self) -> usize {
        self.record.len()
    }

    fn record_offset(&self, block_number: u64) -> u64 {
        HEADER_SIZE as u64 + block_number * self.underlying_block_size() as u64
    }

    fn fill_aad(&mut self, block_number: u64) {
        self.aux[ID_SIZE..].copy_from_slice(&block_number.to_le_bytes());
    }
}

impl<S: RandomAccessStream> BlockStore for GcmBlocks<S> {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read_block(&mut self, block_number: u64, out: &mut [u8]) -> CryptResult<usize> {
        let offset = self.record_offset(block_number);
        let rc = self.underlying.read_at(offset, &mut self.record)?;
        if rc <= self.iv_size + TAG_SIZE {
            // Absent, or too short to be a valid record; both mean EOF.
            return Ok(0);
        }

        let out_size = rc - self.iv_size - TAG_SIZE;

        if is_all_zeros(&self.record[..rc]) {
            // Sparse hole: the whole region decodes to zeros, unauthenticated.
            out[..self.block_size].fill(0);
            return Ok(out_size);
        }

        self.fill_aad(block_number);
        let (iv, rest) = self.record[..rc].split_at(self.iv_size);
        let (ciphertext, tag) = rest.split_at(out_size);
        out[..out_size].copy_from_slice(ciphertext);

        if !self.cipher.open(iv, &self.aux, &mut out[..out_size], tag) {
            if self.verify {
                return Err(CryptError::MessageVerification {
                    id: self.id.clone(),
                    offset: block_number * self.block_size as u64,
                });
            }
            tracing::warn!(
                block = block_number,
                "block failed authentication; returning unverified bytes"
            );
        }

        Ok(out_size)
    }

    fn write_block(&mut self, block_number: u64, data: &[u8]) -> CryptResult<()> {
        debug_assert!(!data.is_empty() && data.len() <= self.block_size);

        self.fill_aad(block_number);

        let record_len = self.iv_size + data.len() + TAG_SIZE;
        let (iv, rest) = self.record[..record_len].split_at_mut(self.iv_size);
        let (body, tag_out) = rest.split_at_mut(data.len());

        // An all-zero IV would collide with the sparse-hole encoding.
        random_nonzero_iv(iv);
        body.copy_from_slice(data);

        let tag = self
            .cipher
            .seal(iv, &self.aux, body)
            .map_err(|_| CryptError::invalid_argument("block too large to seal"))?;
        tag_out.copy_from_slice(&tag);

        let offset = self.record_offset(block_number);
        self.underlying
            .write_at(offset, &self.record[..record_len])?;
        Ok(())
    }

    fn adjust_logical_size(&mut self, new_logical: u64) -> CryptResult<()> {
        let q = new_logical / self.block_size as u64;
        let r = new_logical % self.block_size as u64;
        let tail = if r > 0 {
            r + (self.iv_size + TAG_SIZE) as u64
        } else {
            0
        };
        let new_underlying =
            HEADER_SIZE as u64 + q * self.underlying_block_size() as u64 + tail;
        self.underlying.resize(new_underlying)?;
        Ok(())
    }

    fn size(&self) -> CryptResult<u64> {
        let underlying = self.underlying.size()?;
        if underlying <= HEADER_SIZE as u64 {
            return Ok(0);
        }

        let payload = underlying - HEADER_SIZE as u64;
        let ubs = self.underlying_block_size() as u64;
        let overhead = (self.iv_size + TAG_SIZE) as u64;
        let num_blocks = payload / ubs;
        let residue = payload % ubs;

        Ok(num_blocks * self.block_size as u64
            + if residue > overhead { residue - overhead } else { 0 })
    }

    fn flush(&mut self) -> CryptResult<()> {
        self.underlying.flush()?;
        Ok(())
    }
}

/// An authenticated encrypting stream.
///
/// Owns an underlying ciphertext stream and presents a plaintext
/// random-access view with `read`/`write`/`resize` semantics. Each
/// plaintext block is sealed independently with AES-256-GCM under a
/// per-file session key, with the file id and block number bound into the
/// authentication tag, so blocks cannot be transplanted between files or
/// repositioned within one.
///
/// A single instance assumes a single opener; callers serialize access
/// (every mutating operation takes `&mut self`).
///
/// # Example
///
/// ```rust
/// use veilfs_crypt::{AesGcmCryptStream, CryptOptions, FileId, MasterKey};
/// use veilfs_storage::MemoryStream;
///
/// let key = MasterKey::generate();
/// let mut stream = AesGcmCryptStream::open(
///     MemoryStream::new(),
///     &key,
///     FileId::random(),
///     &CryptOptions::new().block_size(64),
/// )
/// .unwrap();
///
/// stream.write(b"hello", 0).unwrap();
/// let mut buf = [0u8; 5];
/// stream.read(&mut buf, 0).unwrap();
/// assert_eq!(&buf, b"hello");
/// ```
pub struct AesGcmCryptStream<S> {
    inner: BlockStream<GcmBlocks<S>>,
}

impl<S: RandomAccessStream> AesGcmCryptStream<S> {
    /// Binds to an underlying ciphertext stream.
    ///
    /// An empty underlying stream is initialized with a fresh session key
    /// and its masked header; a non-empty one must begin with a full
    /// 32-byte header, from which the session key is recovered as
    /// `header ⊕ master`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::InvalidArgument`] when `options.iv_size` is
    /// outside 12..=32, `options.block_size` is below 32, or the existing
    /// header is truncated.
    pub fn open(
        underlying: S,
        master_key: &MasterKey,
        id: FileId,
        options: &CryptOptions,
    ) -> CryptResult<Self> {
        let blocks = GcmBlocks::open(underlying, master_key, id, options)?;
        Ok(Self {
            inner: BlockStream::new(blocks),
        })
    }

    /// Reads plaintext bytes at `offset` into `buf`.
    ///
    /// Returns the number of bytes read, short when crossing EOF.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::MessageVerification`] when a covered block
    /// fails authentication and verification is enabled, or a storage error
    /// from the underlying stream.
    pub fn read(&mut self, buf: &mut [u8], offset: u64) -> CryptResult<usize> {
        self.inner.read(buf, offset)
    }

    /// Writes `buf` at `offset`, extending the stream as needed.
    ///
    /// # Errors
    ///
    /// Propagates authentication failures from read-modify-write of partial
    /// blocks and storage errors from the underlying stream.
    pub fn write(&mut self, buf: &[u8], offset: u64) -> CryptResult<()> {
        self.inner.write(buf, offset)
    }

    /// Logical plaintext size, computed from the underlying stream size.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from the underlying stream.
    pub fn size(&self) -> CryptResult<u64> {
        self.inner.size()
    }

    /// Grows (zero-extending) or shrinks the stream to `new_size` bytes.
    ///
    /// # Errors
    ///
    /// Propagates block and storage errors from the underlying stream.
    pub fn resize(&mut self, new_size: u64) -> CryptResult<()> {
        self.inner.resize(new_size)
    }

    /// Flushes the underlying stream.
    ///
    /// Nothing is flushed implicitly on drop; callers flush.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from the underlying stream.
    pub fn flush(&mut self) -> CryptResult<()> {
        self.inner.flush()
    }

    /// Whether the underlying stream stores zero regions as holes.
    #[must_use]
    pub fn is_sparse(&self) -> bool {
        self.inner.store().underlying.is_sparse()
    }

    /// The identifier this stream was opened with.
    #[must_use]
    pub fn id(&self) -> &FileId {
        &self.inner.store().id
    }

    /// Plaintext bytes per block.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.inner.store().block_size
    }

    /// Per-block IV length in bytes.
    #[must_use]
    pub fn iv_size(&self) -> usize {
        self.inner.store().iv_size
    }

    /// Consumes the stream, returning the underlying ciphertext stream.
    ///
    /// Buffered writes are not flushed; call [`flush`](Self::flush) first.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner.into_store().underlying
    }
}
