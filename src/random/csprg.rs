//! The fast-key-erasure CSPRG: a ChaCha20-based generator that reseeds from
//! OS entropy, periodically rekeys itself from its own keystream, and
//! erases every byte it hands out.
use zeroize::Zeroize;

use super::entropy::{Entropy, OsEntropy};
use crate::{
    cipher::chacha20::{ChaCha20, BLOCK_SIZE, KEY_LEN, NONCE_LEN},
    secure::SecureBytes,
    Error,
};

const BUFFER_BLOCKS: usize = 16;
const BUFFER_LEN: usize = BUFFER_BLOCKS * BLOCK_SIZE;
const REKEY_LEN: usize = KEY_LEN + NONCE_LEN;

/// Reseed threshold: 2^30 blocks of keystream (~64 GiB) since the last
/// reseed. Chosen to match this crate's ChaCha20 nonce size rather than the
/// 8-byte nonce the figure is stated against in most fast-key-erasure
/// writeups -- see `DESIGN.md`.
const RESEED_THRESHOLD_BYTES: u64 = (1u64 << 30) * BLOCK_SIZE as u64;

/// A fast-key-erasure pseudo-random generator.
///
/// State (key, nonce, block counter, 1024-byte sampling buffer) lives in
/// [`SecureBytes`] for the lifetime of the generator. Every byte drawn is
/// zeroed in the buffer the instant it's copied out, and every refill
/// replaces the key that produced the buffer with bytes drawn from that
/// same buffer -- a compromise of the generator's current state reveals
/// nothing about bytes it has already produced.
///
/// Generic over the entropy source so tests can substitute a deterministic
/// one; production code uses [`Csprg::from_os_entropy`].
pub struct Csprg<E: Entropy = OsEntropy> {
    entropy: E,
    key: SecureBytes<KEY_LEN>,
    nonce: SecureBytes<NONCE_LEN>,
    counter: u32,
    buf: SecureBytes<BUFFER_LEN>,
    pos: usize,
    bytes_since_seed: u64,
    seeded: bool,
}

impl<E: Entropy> Csprg<E> {
    /// Construct a generator over `entropy`. Does not touch the entropy
    /// source yet -- per the fast-key-erasure guarantee, the first call to
    /// [`draw`](Self::draw) always reseeds before producing anything.
    pub fn new(entropy: E) -> Result<Self, Error> {
        Ok(Self {
            entropy,
            key: SecureBytes::new(false)?,
            nonce: SecureBytes::new(false)?,
            counter: 0,
            buf: SecureBytes::new(false)?,
            pos: BUFFER_LEN,
            bytes_since_seed: 0,
            seeded: false,
        })
    }

    /// Draw `out.len()` bytes of output, reseeding and refilling as needed.
    pub fn draw(&mut self, out: &mut [u8]) -> Result<(), Error> {
        if !self.seeded {
            self.reseed()?;
        }

        let mut remaining = out;
        while !remaining.is_empty() {
            if self.pos == BUFFER_LEN {
                self.refill()?;
            }
            let take = remaining.len().min(BUFFER_LEN - self.pos);
            let (chunk, rest) = remaining.split_at_mut(take);
            chunk.copy_from_slice(&self.buf.as_slice()[self.pos..self.pos + take]);
            self.buf.as_mut_slice()[self.pos..self.pos + take].fill(0);
            self.pos += take;
            self.bytes_since_seed += take as u64;
            remaining = rest;
        }

        if self.bytes_since_seed >= RESEED_THRESHOLD_BYTES {
            self.reseed()?;
        }
        Ok(())
    }

    /// Alias for [`draw`](Self::draw) matching this crate's public-facing
    /// terminology (`fill_random`) for the same operation.
    pub fn fill_random(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.draw(buf)
    }

    /// Force a reseed from the entropy source regardless of the threshold.
    /// Exposed for callers that want to reseed proactively, e.g. after a
    /// suspected compromise of the process's memory.
    pub fn reseed(&mut self) -> Result<(), Error> {
        tracing::debug!("CSPRG reseeding from entropy source");
        let mut tmp = SecureBytes::<REKEY_LEN>::new(false)?;
        self.entropy.fill(tmp.as_mut_slice())?;
        self.key
            .as_mut_slice()
            .copy_from_slice(&tmp.as_slice()[..KEY_LEN]);
        self.nonce
            .as_mut_slice()
            .copy_from_slice(&tmp.as_slice()[KEY_LEN..]);
        self.counter = 0;
        self.bytes_since_seed = 0;
        drop(tmp); // zeroised and unlocked by `SecureBytes`'s `Drop`

        self.seeded = true;
        self.refill()
    }

    /// Run ChaCha20 to fill the sampling buffer, then consume its own
    /// leading bytes to rekey itself (fast key erasure).
    fn refill(&mut self) -> Result<(), Error> {
        let key: [u8; KEY_LEN] = self.key.as_slice().try_into().unwrap();
        let nonce: [u8; NONCE_LEN] = self.nonce.as_slice().try_into().unwrap();
        let mut cipher = ChaCha20::with_counter(key, nonce, self.counter);

        for block in self.buf.as_mut_slice().chunks_mut(BLOCK_SIZE) {
            block.copy_from_slice(&cipher.keystream_block());
            cipher.advance()?;
        }
        self.counter = cipher.counter();

        let mut rekey = [0u8; REKEY_LEN];
        rekey.copy_from_slice(&self.buf.as_slice()[..REKEY_LEN]);
        self.key.as_mut_slice().copy_from_slice(&rekey[..KEY_LEN]);
        self.nonce
            .as_mut_slice()
            .copy_from_slice(&rekey[KEY_LEN..]);
        rekey.zeroize();
        self.buf.as_mut_slice()[..REKEY_LEN].fill(0);

        self.pos = REKEY_LEN;
        Ok(())
    }

    #[cfg(test)]
    fn key_snapshot(&self) -> [u8; KEY_LEN] {
        self.key.as_slice().try_into().unwrap()
    }
}

impl Csprg<OsEntropy> {
    /// The generator production code should use: seeded from the
    /// operating system's entropy source.
    pub fn from_os_entropy() -> Result<Self, Error> {
        Self::new(OsEntropy)
    }
}
