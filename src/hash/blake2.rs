//! BLAKE2b and BLAKE2s, specified by [RFC
//! 7693](https://www.rfc-editor.org/rfc/rfc7693). No personalisation, salt,
//! key or tree-mode parameters are supported -- the parameter block is
//! fixed to the unkeyed, sequential (fanout = depth = 1) defaults.
//!
//! Unlike the SHA family, BLAKE2's finalisation flag must land on the true
//! last message block, even when that block is full-size (i.e. the message
//! length is an exact multiple of the block size). The [block-primitive
//! framework](crate::block) only ever hands a primitive a *partial*
//! (`< BLOCK_SIZE`) tail in `process_last`, so both variants here keep one
//! block of look-ahead in their own `State` (`pending`) and compress it one
//! call later than it arrives, once it's known not to be the final block --
//! or, in `process_last`, compress it *as* the final block, flag set.
use crate::{block::BlockPrimitive, hash::Hash};

/// Message-word permutation schedule, shared by both variants. BLAKE2b
/// cycles through it for 12 rounds (`SIGMA[round % 10]`); BLAKE2s uses it
/// once per round for its 10 rounds (`SIGMA[round]`).
const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

// ---------------------------------------------------------------- BLAKE2b --

const BLOCK_B: usize = 128;
const ROUNDS_B: usize = 12;
const DIGEST_B: usize = 64;

const IV_B: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

/// Streaming state for [`Blake2b`]: the chaining value, the byte counter,
/// and one block of look-ahead (see the [module documentation](self)).
#[derive(Clone)]
pub struct Blake2bState {
    h: [u64; 8],
    t: u128,
    pending: Option<[u8; BLOCK_B]>,
}

/// BLAKE2b, 64-byte digest. See the [module documentation](self).
#[derive(Debug, Default)]
pub struct Blake2b;

impl BlockPrimitive for Blake2b {
    type State = Blake2bState;

    const BLOCK_SIZE: usize = BLOCK_B;

    fn init(&self) -> Self::State {
        let mut h = IV_B;
        h[0] ^= (DIGEST_B as u64) | 0x0101_0000;
        Blake2bState {
            h,
            t: 0,
            pending: None,
        }
    }

    fn process_blocks(&self, state: &mut Self::State, blocks: &[u8], n_blocks: usize) {
        debug_assert_eq!(blocks.len(), n_blocks * BLOCK_B);
        for block in blocks.chunks_exact(BLOCK_B) {
            let block: [u8; BLOCK_B] = block.try_into().unwrap();
            if let Some(prev) = state.pending.replace(block) {
                state.t += BLOCK_B as u128;
                compress_b(&mut state.h, &prev, state.t, false);
            }
        }
    }

    fn process_last(&self, state: &mut Self::State, last: &[u8], total_len: u128) {
        finalize_b(state, last, total_len);
    }
}

impl Hash for Blake2b {
    type Output = [u8; DIGEST_B];

    fn extract(state: &Self::State) -> Self::Output {
        let mut out = [0; DIGEST_B];
        for (word, chunk) in state.h.iter().zip(out.chunks_exact_mut(8)) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

fn finalize_b(state: &mut Blake2bState, last: &[u8], total_len: u128) {
    debug_assert!(last.len() < BLOCK_B);
    let final_block = match (state.pending.take(), last.is_empty() && total_len > 0) {
        (Some(block), true) => block,
        (pending, _) => {
            if let Some(prev) = pending {
                state.t += BLOCK_B as u128;
                compress_b(&mut state.h, &prev, state.t, false);
            }
            let mut block = [0u8; BLOCK_B];
            block[..last.len()].copy_from_slice(last);
            block
        }
    };
    state.t = total_len;
    compress_b(&mut state.h, &final_block, state.t, true);
}

fn compress_b(h: &mut [u64; 8], block: &[u8; BLOCK_B], t: u128, last: bool) {
    let mut m = [0u64; 16];
    for (i, chunk) in block.chunks_exact(8).enumerate() {
        m[i] = u64::from_le_bytes(chunk.try_into().unwrap());
    }

    let mut v = [0u64; 16];
    v[..8].copy_from_slice(h);
    v[8..16].copy_from_slice(&IV_B);
    v[12] ^= t as u64;
    v[13] ^= (t >> 64) as u64;
    if last {
        v[14] = !v[14];
    }

    for round in 0..ROUNDS_B {
        let s = &SIGMA[round % 10];
        g_b(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g_b(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g_b(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g_b(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g_b(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g_b(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g_b(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g_b(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

#[allow(clippy::too_many_arguments)]
fn g_b(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

// ---------------------------------------------------------------- BLAKE2s --

const BLOCK_S: usize = 64;
const ROUNDS_S: usize = 10;
const DIGEST_S: usize = 32;

const IV_S: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Streaming state for [`Blake2s`]; see [`Blake2bState`] for why `pending`
/// is here.
#[derive(Clone)]
pub struct Blake2sState {
    h: [u32; 8],
    t: u64,
    pending: Option<[u8; BLOCK_S]>,
}

/// BLAKE2s, 32-byte digest. See the [module documentation](self).
#[derive(Debug, Default)]
pub struct Blake2s;

impl BlockPrimitive for Blake2s {
    type State = Blake2sState;

    const BLOCK_SIZE: usize = BLOCK_S;

    fn init(&self) -> Self::State {
        let mut h = IV_S;
        h[0] ^= (DIGEST_S as u32) | 0x0101_0000;
        Blake2sState {
            h,
            t: 0,
            pending: None,
        }
    }

    fn process_blocks(&self, state: &mut Self::State, blocks: &[u8], n_blocks: usize) {
        debug_assert_eq!(blocks.len(), n_blocks * BLOCK_S);
        for block in blocks.chunks_exact(BLOCK_S) {
            let block: [u8; BLOCK_S] = block.try_into().unwrap();
            if let Some(prev) = state.pending.replace(block) {
                state.t += BLOCK_S as u64;
                compress_s(&mut state.h, &prev, state.t, false);
            }
        }
    }

    fn process_last(&self, state: &mut Self::State, last: &[u8], total_len: u128) {
        finalize_s(state, last, total_len as u64);
    }
}

impl Hash for Blake2s {
    type Output = [u8; DIGEST_S];

    fn extract(state: &Self::State) -> Self::Output {
        let mut out = [0; DIGEST_S];
        for (word, chunk) in state.h.iter().zip(out.chunks_exact_mut(4)) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

fn finalize_s(state: &mut Blake2sState, last: &[u8], total_len: u64) {
    debug_assert!(last.len() < BLOCK_S);
    let final_block = match (state.pending.take(), last.is_empty() && total_len > 0) {
        (Some(block), true) => block,
        (pending, _) => {
            if let Some(prev) = pending {
                state.t += BLOCK_S as u64;
                compress_s(&mut state.h, &prev, state.t, false);
            }
            let mut block = [0u8; BLOCK_S];
            block[..last.len()].copy_from_slice(last);
            block
        }
    };
    state.t = total_len;
    compress_s(&mut state.h, &final_block, state.t, true);
}

fn compress_s(h: &mut [u32; 8], block: &[u8; BLOCK_S], t: u64, last: bool) {
    let mut m = [0u32; 16];
    for (i, chunk) in block.chunks_exact(4).enumerate() {
        m[i] = u32::from_le_bytes(chunk.try_into().unwrap());
    }

    let mut v = [0u32; 16];
    v[..8].copy_from_slice(h);
    v[8..16].copy_from_slice(&IV_S);
    v[12] ^= t as u32;
    v[13] ^= (t >> 32) as u32;
    if last {
        v[14] = !v[14];
    }

    for round in 0..ROUNDS_S {
        let s = &SIGMA[round];
        g_s(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g_s(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g_s(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g_s(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g_s(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g_s(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g_s(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g_s(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

#[allow(clippy::too_many_arguments)]
fn g_s(v: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize, x: u32, y: u32) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(12);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(8);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(7);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::digest_of;

    #[test]
    fn blake2b_empty_string() {
        assert_eq!(
            digest_of::<Blake2b>(b"").to_string(),
            "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419\
             d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce"
        );
    }

    #[test]
    fn blake2b_abc() {
        assert_eq!(
            digest_of::<Blake2b>(b"abc").to_string(),
            "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
             7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
        );
    }

    #[test]
    fn blake2s_empty_string() {
        assert_eq!(
            digest_of::<Blake2s>(b"").to_string(),
            "69217a3079908094e11121d042354a7c1f55b6482ca1a51e1b250dfd1ed0eef9"
        );
    }

    #[test]
    fn blake2s_abc() {
        assert_eq!(
            digest_of::<Blake2s>(b"abc").to_string(),
            "508c5e8c327c14e2e1a72ba34eeb452f37458b209ed63a294d999b4c86675982"
        );
    }

    #[test]
    fn exact_block_multiple_marks_last_block_final() {
        // Two full BLAKE2b blocks (256 bytes): regression check for the
        // look-ahead finalisation logic -- if `process_blocks` ever
        // compressed the final block with f = 0, this would equal the
        // hash of the same bytes with one trailing byte removed plus
        // padding, which it must not.
        let msg = vec![0x61u8; 256];
        let full = digest_of::<Blake2b>(&msg);
        let mut truncated = msg.clone();
        truncated.pop();
        let short = digest_of::<Blake2b>(&truncated);
        assert_ne!(full, short);
    }
}
