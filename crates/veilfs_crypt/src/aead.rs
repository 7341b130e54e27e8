//! AES-256-GCM with a runtime-selected IV length.
//!
//! The ciphertext format stores `iv_size` bytes of IV in front of every
//! block, where `iv_size` is chosen at open time (12..=32). GCM accepts any
//! IV length through its GHASH-based counter derivation, but the `aes-gcm`
//! crate fixes the length at the type level, so each supported length is a
//! distinct `AesGcm<Aes256, _>` instantiation behind one enum.

use aes_gcm::aead::consts::{
    U12, U13, U14, U15, U16, U17, U18, U19, U20, U21, U22, U23, U24, U25, U26, U27, U28, U29, U30,
    U31, U32,
};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, Error as AeadError, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;

/// GCM authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Smallest supported per-block IV length.
pub const MIN_IV_SIZE: usize = 12;

/// Largest supported per-block IV length.
pub const MAX_IV_SIZE: usize = 32;

macro_rules! variable_iv_gcm {
    ($($len:literal => $variant:ident($size:ty)),+ $(,)?) => {
        /// AES-256-GCM instantiated for one of the supported IV lengths.
        pub(crate) enum BlockCipher {
            $($variant(AesGcm<Aes256, $size>),)+
        }

        impl BlockCipher {
            /// Builds a cipher for `iv_size`, or `None` when the length is
            /// outside 12..=32.
            pub(crate) fn new(key: &[u8; 32], iv_size: usize) -> Option<Self> {
                let key = GenericArray::from_slice(key);
                match iv_size {
                    $($len => Some(Self::$variant(AesGcm::new(key))),)+
                    _ => None,
                }
            }

            /// The IV length this cipher was instantiated with.
            pub(crate) fn iv_size(&self) -> usize {
                match self {
                    $(Self::$variant(_) => $len,)+
                }
            }

            /// Encrypts `buffer` in place and returns the detached tag.
            ///
            /// `iv.len()` must equal [`iv_size`](Self::iv_size).
            pub(crate) fn seal(
                &self,
                iv: &[u8],
                aad: &[u8],
                buffer: &mut [u8],
            ) -> Result<[u8; TAG_SIZE], AeadError> {
                match self {
                    $(Self::$variant(cipher) => {
                        let tag = cipher.encrypt_in_place_detached(
                            GenericArray::from_slice(iv),
                            aad,
                            buffer,
                        )?;
                        let mut out = [0u8; TAG_SIZE];
                        out.copy_from_slice(&tag);
                        Ok(out)
                    })+
                }
            }

            /// Decrypts `buffer` in place, verifying the detached tag.
            ///
            /// Returns `false` when authentication fails; `buffer` is then
            /// left holding the undecrypted ciphertext bytes.
            pub(crate) fn open(&self, iv: &[u8], aad: &[u8], buffer: &mut [u8], tag: &[u8]) -> bool {
                match self {
                    $(Self::$variant(cipher) => cipher
                        .decrypt_in_place_detached(
                            GenericArray::from_slice(iv),
                            aad,
                            buffer,
                            GenericArray::from_slice(tag),
                        )
                        .is_ok(),)+
                }
            }
        }
    };
}

variable_iv_gcm! {
    12 => Iv12(U12),
    13 => Iv13(U13),
    14 => Iv14(U14),
    15 => Iv15(U15),
    16 => Iv16(U16),
    17 => Iv17(U17),
    18 => Iv18(U18),
    19 => Iv19(U19),
    20 => Iv20(U20),
    21 => Iv21(U21),
    22 => Iv22(U22),
    23 => Iv23(U23),
    24 => Iv24(U24),
    25 => Iv25(U25),
    26 => Iv26(U26),
    27 => Iv27(U27),
    28 => Iv28(U28),
    29 => Iv29(U29),
    30 => Iv30(U30),
    31 => Iv31(U31),
    32 => Iv32(U32),
}

impl std::fmt::Debug for BlockCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockCipher")
            .field("iv_size", &self.iv_size())
            .finish_non_exhaustive()
    }
}
