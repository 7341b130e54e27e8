//! Key material, file identifiers, and small byte primitives.

use crate::error::{CryptError, CryptResult};
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of master and session keys in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the per-file identifier in bytes.
pub const ID_SIZE: usize = 32;

/// Long-term key supplied by the caller at open.
///
/// The key is automatically zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> CryptResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptError::invalid_argument(format!(
                "invalid key size: expected {KEY_SIZE}, got {}",
                bytes.len()
            )));
        }
        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Generates a new random master key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Returns the key as a byte slice.
    ///
    /// # Security
    ///
    /// Be careful with this method - don't log or serialize the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Per-file ephemeral key, derived at open.
///
/// Never persisted directly: the file header stores `session ⊕ master`,
/// so neither key alone is recoverable from the ciphertext file.
/// Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    bytes: [u8; KEY_SIZE],
}

impl SessionKey {
    /// Generates a fresh random session key for a new file.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Recovers the session key from a stored header: `header ⊕ master`.
    #[must_use]
    pub fn recover(header: &[u8; KEY_SIZE], master: &MasterKey) -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        xor_bytes(header, master.as_bytes(), &mut bytes);
        Self { bytes }
    }

    /// Computes the masked header bytes to persist: `session ⊕ master`.
    #[must_use]
    pub fn mask(&self, master: &MasterKey) -> [u8; KEY_SIZE] {
        let mut header = [0u8; KEY_SIZE];
        xor_bytes(&self.bytes, master.as_bytes(), &mut header);
        header
    }

    /// Returns the key as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// 32-byte per-file identifier.
///
/// Bound into every block's authentication tag, so ciphertext blocks cannot
/// be transplanted between files. Not secret; displayed as hex in
/// diagnostics.
#[derive(Clone, PartialEq, Eq)]
pub struct FileId([u8; ID_SIZE]);

impl FileId {
    /// Creates an identifier from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generates a random identifier for a new file.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; ID_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the identifier as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({self})")
    }
}

/// XORs `a` and `b` byte-wise into `out`. All three must be equal length.
pub(crate) fn xor_bytes(a: &[u8], b: &[u8], out: &mut [u8]) {
    debug_assert!(a.len() == b.len() && b.len() == out.len());
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x ^ y;
    }
}

/// Whether every byte of `buf` is zero.
///
/// Zero-detection runs on IVs and ciphertext, not plaintext, so a plain
/// scan is fine here.
pub(crate) fn is_all_zeros(buf: &[u8]) -> bool {
    buf.iter().all(|&b| b == 0)
}

/// Fills `iv` from the CSPRNG, resampling until it is not all zeros.
///
/// An all-zero record is the sparse-hole encoding, so real IVs must never
/// be all-zero.
pub(crate) fn random_nonzero_iv(iv: &mut [u8]) {
    let mut rng = rand::thread_rng();
    loop {
        rng.fill_bytes(iv);
        if !is_all_zeros(iv) {
            return;
        }
    }
}
