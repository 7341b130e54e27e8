//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random stream operations that stay
//! within a few blocks of the origin, so property tests cover block
//! boundaries without wandering into huge sparse files.

use proptest::prelude::*;

/// A single mutation applied to a plaintext stream.
#[derive(Debug, Clone)]
pub enum StreamOp {
    /// Write the payload at the offset.
    Write {
        /// Plaintext offset of the write.
        offset: u64,
        /// Bytes to write.
        bytes: Vec<u8>,
    },
    /// Resize the stream to the given logical size.
    Resize {
        /// New logical size in bytes.
        new_size: u64,
    },
}

/// Strategy for a non-empty payload of up to `max_len` bytes.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len)
}

/// Strategy for one stream operation within `max_offset`.
///
/// Writes dominate; the occasional resize exercises truncation and
/// zero-extension paths.
pub fn stream_op(max_offset: u64, max_len: usize) -> impl Strategy<Value = StreamOp> {
    prop_oneof![
        4 => (0..max_offset, payload(max_len))
            .prop_map(|(offset, bytes)| StreamOp::Write { offset, bytes }),
        1 => (0..max_offset).prop_map(|new_size| StreamOp::Resize { new_size }),
    ]
}

/// Strategy for a sequence of up to `max_ops` stream operations.
pub fn stream_ops(
    max_offset: u64,
    max_len: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StreamOp>> {
    prop::collection::vec(stream_op(max_offset, max_len), 1..=max_ops)
}

/// Strategy for `(block_size, iv_size)` open parameters.
///
/// Small block sizes keep the block count per test high; every supported
/// IV length gets coverage over time.
pub fn block_geometry() -> impl Strategy<Value = (usize, usize)> {
    (32usize..=96, 12usize..=32)
}
