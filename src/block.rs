//! The block-oriented primitive framework.
//!
//! Every primitive in this crate -- the three Merkle-Damgard hashes, the two
//! BLAKE2 variants, and ChaCha20 -- consumes its input in fixed-size blocks.
//! [`BlockPrimitive`] captures exactly the part of that which differs
//! between primitives (the compression/keystream round function and the
//! padding rule); [`Driver`] captures the part that's identical for all of
//! them (buffering a partial block across calls, tracking the total length,
//! and keeping the buffers handed to the primitive aligned).
use std::marker::PhantomData;

/// A primitive that processes data in fixed-size blocks.
///
/// Implementors supply only a pure transformation of `State`; the `Driver`
/// takes care of turning an arbitrary byte stream into calls to
/// [`process_blocks`](BlockPrimitive::process_blocks) and
/// [`process_last`](BlockPrimitive::process_last).
pub trait BlockPrimitive {
    /// The primitive's working state (chaining value, counters, ...).
    type State;

    /// Size of one block in bytes.
    const BLOCK_SIZE: usize;

    /// Extra block-sized scratch space the primitive's own
    /// `process_last` needs beyond the message buffer (e.g. SHA's
    /// length-padding can require one extra block). Purely informational --
    /// implementations are free to allocate this themselves.
    const ADDITIONAL_BLOCKS: usize = 0;

    /// Alignment the driver guarantees for the buffers it hands to
    /// `process_blocks`/`process_last`. 32 bytes is a safe upper bound for
    /// SIMD-friendly implementations; primitives that don't care can ignore
    /// it.
    const BUFFER_ALIGNMENT: usize = 32;

    /// The primitive's initial state.
    fn init(&self) -> Self::State;

    /// Consume `blocks.len() / BLOCK_SIZE` whole blocks of input, updating
    /// `state` in place. `blocks.len()` is always an exact multiple of
    /// `BLOCK_SIZE`, and `n_blocks == blocks.len() / BLOCK_SIZE`.
    fn process_blocks(&self, state: &mut Self::State, blocks: &[u8], n_blocks: usize);

    /// Consume the final, possibly empty, partial block (`last.len() <
    /// BLOCK_SIZE`) and apply the primitive's padding/finalisation rule.
    /// `total_len` is the total number of bytes absorbed across the whole
    /// session, which Merkle-Damgard-style padding needs to encode.
    fn process_last(&self, state: &mut Self::State, last: &[u8], total_len: u128);
}

/// Scratch space the [`Driver`] copies unaligned input through before
/// calling into a primitive, satisfying [`BlockPrimitive::BUFFER_ALIGNMENT`]
/// regardless of how the caller's bytes happen to be laid out.
///
/// Sized generously enough to hold many blocks of the largest block size
/// used in this crate (128 bytes, SHA-512/BLAKE2b) so that absorbing large
/// inputs doesn't degrade into one `process_blocks` call per block.
#[repr(align(32))]
struct AlignedScratch([u8; Self::CAPACITY]);

impl AlignedScratch {
    const CAPACITY: usize = 4096;
}

impl Default for AlignedScratch {
    fn default() -> Self {
        Self([0; Self::CAPACITY])
    }
}

/// Drives a [`BlockPrimitive`] over a stream of `absorb` calls, buffering the
/// trailing partial block and tracking total length, then finalises with
/// `process_last` on `finalize`.
pub struct Driver<P: BlockPrimitive> {
    primitive: P,
    state: P::State,
    /// Bytes absorbed since the last whole block was emitted; always
    /// `< P::BLOCK_SIZE`.
    buf: Vec<u8>,
    total_len: u128,
    scratch: AlignedScratch,
    _marker: PhantomData<P>,
}

impl<P: BlockPrimitive> Driver<P> {
    pub fn new(primitive: P) -> Self {
        let state = primitive.init();
        Self {
            primitive,
            state,
            buf: Vec::with_capacity(P::BLOCK_SIZE),
            total_len: 0,
            scratch: AlignedScratch::default(),
            _marker: PhantomData,
        }
    }

    /// Feed `bytes` into the session. May be called any number of times with
    /// any chunking; the result after `finalize` depends only on the
    /// concatenation of everything absorbed (see the streaming-equivalence
    /// property in the crate's tests).
    pub fn absorb(&mut self, bytes: &[u8]) {
        self.total_len = self
            .total_len
            .checked_add(bytes.len() as u128)
            .expect("absorbed length overflowed u128");

        let mut input = bytes;

        if !self.buf.is_empty() {
            let need = P::BLOCK_SIZE - self.buf.len();
            if input.len() < need {
                self.buf.extend_from_slice(input);
                return;
            }
            let (head, rest) = input.split_at(need);
            self.buf.extend_from_slice(head);
            self.process_buffered_block();
            self.buf.clear();
            input = rest;
        }

        let whole = (input.len() / P::BLOCK_SIZE) * P::BLOCK_SIZE;
        let mut offset = 0;
        let chunk_blocks = AlignedScratch::CAPACITY / P::BLOCK_SIZE;
        let chunk_bytes = chunk_blocks * P::BLOCK_SIZE;
        while offset < whole {
            let take = chunk_bytes.min(whole - offset);
            let n_blocks = take / P::BLOCK_SIZE;
            self.scratch.0[..take].copy_from_slice(&input[offset..offset + take]);
            self.primitive
                .process_blocks(&mut self.state, &self.scratch.0[..take], n_blocks);
            offset += take;
        }

        self.buf.extend_from_slice(&input[whole..]);
    }

    /// Process the one block currently sitting in `self.buf` (known full).
    fn process_buffered_block(&mut self) {
        self.scratch.0[..P::BLOCK_SIZE].copy_from_slice(&self.buf);
        self.primitive
            .process_blocks(&mut self.state, &self.scratch.0[..P::BLOCK_SIZE], 1);
    }

    /// Consume the session, returning the final state.
    pub fn finalize(mut self) -> P::State {
        let buf = std::mem::take(&mut self.buf);
        self.primitive
            .process_last(&mut self.state, &buf, self.total_len);
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A toy primitive: 4-byte blocks, state is a running byte sum, final
    /// block adds `total_len as u8` once more. Exists only to exercise the
    /// driver's buffering logic in isolation from any real cryptography.
    struct Sum;

    impl BlockPrimitive for Sum {
        type State = u64;

        const BLOCK_SIZE: usize = 4;

        fn init(&self) -> Self::State {
            0
        }

        fn process_blocks(&self, state: &mut Self::State, blocks: &[u8], n_blocks: usize) {
            assert_eq!(blocks.len(), n_blocks * Self::BLOCK_SIZE);
            for b in blocks {
                *state += *b as u64;
            }
        }

        fn process_last(&self, state: &mut Self::State, last: &[u8], total_len: u128) {
            for b in last {
                *state += *b as u64;
            }
            *state += total_len as u64;
        }
    }

    fn one_shot(input: &[u8]) -> u64 {
        let mut d = Driver::new(Sum);
        d.absorb(input);
        d.finalize()
    }

    #[test]
    fn chunking_does_not_change_the_result() {
        let input: Vec<u8> = (0u8..200).collect();
        let whole = one_shot(&input);

        let mut d = Driver::new(Sum);
        for chunk in input.chunks(3) {
            d.absorb(chunk);
        }
        let chunked = d.finalize();

        assert_eq!(whole, chunked);
    }

    #[test]
    fn empty_input() {
        assert_eq!(one_shot(&[]), 0);
    }

    #[test]
    fn exact_multiple_of_block_size() {
        let input = [1u8, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(one_shot(&input), 36 + input.len() as u64);
    }
}
