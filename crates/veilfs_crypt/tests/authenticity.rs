//! Tamper detection and block-binding guarantees.

use std::collections::HashSet;
use veilfs_crypt::{AesGcmCryptStream, CryptError, CryptOptions, FileId, MasterKey};
use veilfs_storage::MemoryStream;

const BLOCK_SIZE: usize = 64;
const IV_SIZE: usize = 12;
const MAC_SIZE: usize = 16;
const HEADER: usize = 32;
const UBS: usize = IV_SIZE + BLOCK_SIZE + MAC_SIZE;

fn options() -> CryptOptions {
    CryptOptions::new().block_size(BLOCK_SIZE).iv_size(IV_SIZE)
}

fn master() -> MasterKey {
    MasterKey::from_bytes(&[0x42; 32]).unwrap()
}

fn open(data: Vec<u8>, id: FileId) -> AesGcmCryptStream<MemoryStream> {
    AesGcmCryptStream::open(MemoryStream::with_data(data), &master(), id, &options()).unwrap()
}

fn id_a() -> FileId {
    FileId::from_bytes([0xAA; 32])
}

fn id_b() -> FileId {
    FileId::from_bytes([0xBB; 32])
}

fn sealed_file() -> Vec<u8> {
    let mut stream = open(Vec::new(), id_a());
    stream.write(&[0x5A; 2 * BLOCK_SIZE], 0).unwrap();
    stream.flush().unwrap();
    stream.into_inner().into_data()
}

#[test]
fn single_bit_flips_are_detected_across_the_record() {
    // One position inside each region of block 1: IV, ciphertext, tag.
    let block_base = HEADER + UBS;
    let positions = [
        block_base + 3,                        // IV
        block_base + IV_SIZE + 17,             // ciphertext
        block_base + IV_SIZE + BLOCK_SIZE + 9, // tag
    ];

    for position in positions {
        for bit in 0..8 {
            let mut raw = sealed_file();
            raw[position] ^= 1 << bit;

            let mut stream = open(raw, id_a());
            let mut buf = [0u8; BLOCK_SIZE];
            let result = stream.read(&mut buf, BLOCK_SIZE as u64);
            assert!(
                matches!(
                    result,
                    Err(CryptError::MessageVerification { offset, .. }) if offset == BLOCK_SIZE as u64
                ),
                "bit {bit} at byte {position} went undetected"
            );
        }
    }
}

#[test]
fn untampered_blocks_still_read_after_a_neighbor_is_corrupted() {
    let mut raw = sealed_file();
    raw[HEADER + UBS + IV_SIZE] ^= 0xFF; // corrupt block 1 only

    let mut stream = open(raw, id_a());
    let mut buf = [0u8; BLOCK_SIZE];
    assert_eq!(stream.read(&mut buf, 0).unwrap(), BLOCK_SIZE);
    assert_eq!(buf, [0x5A; BLOCK_SIZE]);
}

#[test]
fn block_copied_into_another_file_fails() {
    // Opening the same ciphertext under a different file id models a block
    // transplanted between files that share a session key.
    let raw = sealed_file();

    let mut stolen = open(raw.clone(), id_b());
    let mut buf = [0u8; BLOCK_SIZE];
    assert!(matches!(
        stolen.read(&mut buf, 0),
        Err(CryptError::MessageVerification { .. })
    ));

    // Control: the rightful id still decodes.
    let mut rightful = open(raw, id_a());
    assert_eq!(rightful.read(&mut buf, 0).unwrap(), BLOCK_SIZE);
}

#[test]
fn block_moved_to_another_position_fails() {
    let mut raw = sealed_file();

    // Transplant block 0's record over block 1's.
    let block0: Vec<u8> = raw[HEADER..HEADER + UBS].to_vec();
    raw[HEADER + UBS..HEADER + 2 * UBS].copy_from_slice(&block0);

    let mut stream = open(raw, id_a());
    let mut buf = [0u8; BLOCK_SIZE];

    assert!(matches!(
        stream.read(&mut buf, BLOCK_SIZE as u64),
        Err(CryptError::MessageVerification { offset, .. }) if offset == BLOCK_SIZE as u64
    ));

    // The original position still authenticates.
    assert_eq!(stream.read(&mut buf, 0).unwrap(), BLOCK_SIZE);
}

#[test]
fn reopening_with_same_key_recovers_the_same_session() {
    let raw = sealed_file();
    let header_before = raw[..HEADER].to_vec();

    let mut stream = open(raw, id_a());
    let mut buf = [0u8; 2 * BLOCK_SIZE];
    assert_eq!(stream.read(&mut buf, 0).unwrap(), 2 * BLOCK_SIZE);
    assert_eq!(buf, [0x5A; 2 * BLOCK_SIZE]);

    // Reopening must not rewrite the header.
    assert_eq!(&stream.into_inner().into_data()[..HEADER], &header_before[..]);
}

#[test]
fn fresh_files_get_distinct_session_keys() {
    // Same master key, two empty files: the masked headers must differ, or
    // the per-file session key would be shared.
    let a = open(Vec::new(), id_a()).into_inner().into_data();
    let b = open(Vec::new(), id_a()).into_inner().into_data();
    assert_ne!(a[..HEADER], b[..HEADER]);
}

#[test]
fn block_ivs_are_unique_and_nonzero() {
    let mut stream = open(Vec::new(), id_a());
    const BLOCKS: usize = 50;
    for i in 0..BLOCKS {
        stream
            .write(&[i as u8; BLOCK_SIZE], (i * BLOCK_SIZE) as u64)
            .unwrap();
    }
    let raw = stream.into_inner().into_data();

    let mut seen = HashSet::new();
    for i in 0..BLOCKS {
        let start = HEADER + i * UBS;
        let iv = &raw[start..start + IV_SIZE];
        assert!(iv.iter().any(|&b| b != 0), "block {i} has an all-zero IV");
        assert!(seen.insert(iv.to_vec()), "duplicate IV at block {i}");
    }
}

#[test]
fn rewriting_a_block_resamples_its_iv() {
    let mut stream = open(Vec::new(), id_a());
    stream.write(&[1u8; BLOCK_SIZE], 0).unwrap();
    let raw = stream.into_inner().into_data();
    let iv1 = raw[HEADER..HEADER + IV_SIZE].to_vec();

    let mut stream = open(raw, id_a());
    stream.write(&[1u8; BLOCK_SIZE], 0).unwrap();
    let iv2 = stream.into_inner().into_data()[HEADER..HEADER + IV_SIZE].to_vec();

    assert_ne!(iv1, iv2);
}
