//! SHA-1, specified by [FIPS
//! 180-4](https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.180-4.pdf).
//!
//! SHA-1 is a Merkle-Damgard construction over SHACAL-1 run in Davies-Meyer
//! mode (the step is modular addition of the previous and new state). It is
//! a weak hash with known collision attacks and is kept here only for
//! [HMAC-SHA1](crate::mac::Hmac) compatibility -- it is not meant to be
//! chosen for new general-purpose hashing.
use crate::{block::BlockPrimitive, hash::Hash};

const BLOCK_SIZE: usize = 64;

type State = [u32; 5];

const IV: State = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

/// SHA-1. See the [module documentation](self).
#[derive(Debug, Default)]
pub struct Sha1;

impl BlockPrimitive for Sha1 {
    type State = State;

    const BLOCK_SIZE: usize = BLOCK_SIZE;
    const ADDITIONAL_BLOCKS: usize = 2;

    fn init(&self) -> Self::State {
        IV
    }

    fn process_blocks(&self, state: &mut Self::State, blocks: &[u8], n_blocks: usize) {
        debug_assert_eq!(blocks.len(), n_blocks * BLOCK_SIZE);
        for block in blocks.chunks_exact(BLOCK_SIZE) {
            compress(state, block.try_into().unwrap());
        }
    }

    fn process_last(&self, state: &mut Self::State, last: &[u8], total_len: u128) {
        for block in pad(last, total_len) {
            compress(state, &block);
        }
    }
}

impl Hash for Sha1 {
    type Output = [u8; 20];

    fn extract(state: &Self::State) -> Self::Output {
        let mut out = [0; 20];
        for (word, chunk) in state.iter().zip(out.chunks_exact_mut(4)) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}

/// One round of SHACAL-1: 80 rounds of the FIPS 180-4 SHA-1 permutation.
fn compress(state: &mut State, block: &[u8; BLOCK_SIZE]) {
    let mut w = [0u32; 80];
    for (i, chunk) in block.chunks_exact(4).enumerate() {
        w[i] = u32::from_be_bytes(chunk.try_into().unwrap());
    }
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;
    for (t, &wt) in w.iter().enumerate() {
        let (f, k) = match t {
            0..=19 => ((b & c) ^ ((!b) & d), 0x5a827999u32),
            20..=39 => (b ^ c ^ d, 0x6ed9eba1),
            40..=59 => ((b & c) ^ (b & d) ^ (c & d), 0x8f1bbcdc),
            _ => (b ^ c ^ d, 0xca62c1d6),
        };
        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(wt);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
}

/// Merkle-Damgard length padding: `0x80`, zeros, then the 64-bit
/// big-endian bit length, filling out to a multiple of `BLOCK_SIZE`.
fn pad(last: &[u8], total_len: u128) -> Vec<[u8; BLOCK_SIZE]> {
    debug_assert!(last.len() < BLOCK_SIZE);
    let bit_len = (total_len * 8) as u64;

    let mut padded = Vec::with_capacity(last.len() + 1 + 8 + BLOCK_SIZE);
    padded.extend_from_slice(last);
    padded.push(0x80);
    while (padded.len() % BLOCK_SIZE) != BLOCK_SIZE - 8 {
        padded.push(0);
    }
    padded.extend_from_slice(&bit_len.to_be_bytes());

    padded
        .chunks_exact(BLOCK_SIZE)
        .map(|c| c.try_into().unwrap())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::digest_of;

    fn hex(input: &[u8]) -> String {
        digest_of::<Sha1>(input).to_string()
    }

    #[test]
    fn empty_string() {
        assert_eq!(hex(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn abc() {
        assert_eq!(hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn two_block_message() {
        assert_eq!(
            hex(b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"),
            "84983e441c3bd26ebaae4aa1f95129e5e54670f1"
        );
    }

    #[test]
    fn quick_brown_fox() {
        assert_eq!(
            hex(b"The quick brown fox jumps over the lazy dog"),
            "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12"
        );
    }
}
