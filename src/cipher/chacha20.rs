//! ChaCha20, the IETF variant specified by [RFC
//! 7539](https://www.rfc-editor.org/rfc/rfc7539): 256-bit key, 96-bit nonce,
//! 32-bit block counter, 20 rounds (10 double-rounds), 64-byte blocks.
//!
//! Unlike the hashes in [`crate::hash`], ChaCha20 doesn't fit the
//! [block-primitive framework](crate::block) directly -- its "process a
//! block" step produces a keystream block to XOR against caller-supplied
//! output, rather than folding the block into an opaque chaining state. The
//! block function itself ([`block`]) is still the same shape the hash cores
//! use: a pure transformation of a fixed-size state, callable in isolation
//! (the [CSPRG](crate::random::Csprg) calls it directly to generate
//! keystream with no associated plaintext at all).
use crate::Error;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;
/// Nonce length in bytes (the 96-bit IETF variant).
pub const NONCE_LEN: usize = 12;
/// Block size in bytes.
pub const BLOCK_SIZE: usize = 64;

const ROUNDS: usize = 10; // 10 double-rounds = 20 rounds

const CONSTANTS: [u32; 4] = [0x61707865, 0x3320646e, 0x79622d32, 0x6b206574];

/// A ChaCha20 key/nonce/counter triple, ready to generate keystream or
/// encrypt/decrypt in place.
///
/// Encryption and decryption are the same operation (XOR with keystream);
/// there is no distinct `decrypt` method.
pub struct ChaCha20 {
    key: [u8; KEY_LEN],
    nonce: [u8; NONCE_LEN],
    counter: u32,
}

impl ChaCha20 {
    pub fn new(key: [u8; KEY_LEN], nonce: [u8; NONCE_LEN]) -> Self {
        Self::with_counter(key, nonce, 0)
    }

    pub fn with_counter(key: [u8; KEY_LEN], nonce: [u8; NONCE_LEN], counter: u32) -> Self {
        Self {
            key,
            nonce,
            counter,
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Generate the next keystream block without consuming it. Does not
    /// advance the counter -- callers that want the counter to move on use
    /// [`apply_keystream`](Self::apply_keystream), or advance it explicitly
    /// via [`advance`](Self::advance).
    pub fn keystream_block(&self) -> [u8; BLOCK_SIZE] {
        block(&self.key, &self.nonce, self.counter)
    }

    /// Advance the block counter by one, failing rather than wrapping past
    /// `u32::MAX`.
    pub fn advance(&mut self) -> Result<(), Error> {
        self.counter = self.counter.checked_add(1).ok_or(Error::CounterExhausted)?;
        Ok(())
    }

    /// XOR `buf` with the keystream in place, advancing the counter by one
    /// block per `BLOCK_SIZE` bytes (the tail, if any, consumes one more
    /// block and only its leading bytes are used).
    ///
    /// Checks up front that enough counter space remains for the whole
    /// buffer; on [`Error::CounterExhausted`], `buf` is left untouched
    /// rather than partially encrypted.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let n_blocks = (buf.len() + BLOCK_SIZE - 1) / BLOCK_SIZE;
        self.counter
            .checked_add(n_blocks as u32)
            .ok_or(Error::CounterExhausted)?;

        for chunk in buf.chunks_mut(BLOCK_SIZE) {
            let ks = self.keystream_block();
            for (b, k) in chunk.iter_mut().zip(ks.iter()) {
                *b ^= k;
            }
            self.counter += 1;
        }
        Ok(())
    }
}

/// The ChaCha20 block function: state-in, keystream-block-out, no side
/// effects. `nonce` is 12 bytes (the 96-bit IETF nonce); `counter` is the
/// 32-bit little-endian block counter.
pub fn block(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], counter: u32) -> [u8; BLOCK_SIZE] {
    let mut state = [0u32; 16];
    state[0..4].copy_from_slice(&CONSTANTS);
    for (i, chunk) in key.chunks_exact(4).enumerate() {
        state[4 + i] = u32::from_le_bytes(chunk.try_into().unwrap());
    }
    state[12] = counter;
    for (i, chunk) in nonce.chunks_exact(4).enumerate() {
        state[13 + i] = u32::from_le_bytes(chunk.try_into().unwrap());
    }

    let mut working = state;
    for _ in 0..ROUNDS {
        quarter_round(&mut working, 0, 4, 8, 12);
        quarter_round(&mut working, 1, 5, 9, 13);
        quarter_round(&mut working, 2, 6, 10, 14);
        quarter_round(&mut working, 3, 7, 11, 15);
        quarter_round(&mut working, 0, 5, 10, 15);
        quarter_round(&mut working, 1, 6, 11, 12);
        quarter_round(&mut working, 2, 7, 8, 13);
        quarter_round(&mut working, 3, 4, 9, 14);
    }

    let mut out = [0u8; BLOCK_SIZE];
    for (i, chunk) in out.chunks_exact_mut(4).enumerate() {
        let word = working[i].wrapping_add(state[i]);
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}

fn quarter_round(s: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    s[a] = s[a].wrapping_add(s[b]);
    s[d] ^= s[a];
    s[d] = s[d].rotate_left(16);

    s[c] = s[c].wrapping_add(s[d]);
    s[b] ^= s[c];
    s[b] = s[b].rotate_left(12);

    s[a] = s[a].wrapping_add(s[b]);
    s[d] ^= s[a];
    s[d] = s[d].rotate_left(8);

    s[c] = s[c].wrapping_add(s[d]);
    s[b] ^= s[c];
    s[b] = s[b].rotate_left(7);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_key_nonce_counter_keystream() {
        let ks = block(&[0; KEY_LEN], &[0; NONCE_LEN], 0);
        assert_eq!(
            hex::encode(ks),
            "76b8e0ada0f13d90405d6ae55386bd28bdd219b8a08ded1aa836efcc8b770dc\
             7da41597c5157488d7724e03fb8d84a376a43b8f41518a11cc387b669b2ee65\
             86"
        );
    }

    #[test]
    fn rfc7539_section_2_4_2_encryption() {
        let mut key = [0u8; KEY_LEN];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        let nonce: [u8; NONCE_LEN] = hex_literal::hex!("000000000000004a00000000");

        let mut cipher = ChaCha20::with_counter(key, nonce, 1);
        let plaintext = b"Ladies and Gentlemen of the class of '99: If I could offer you \
                           only one tip for the future, sunscreen would be it.";
        let mut buf = plaintext.to_vec();
        cipher.apply_keystream(&mut buf).unwrap();

        assert_eq!(
            hex::encode(&buf),
            "6e2e359a2568f98041ba0728dd0d6981e97e7aec1d4360c20a27afccfd9fae0\
             bf91b65c5524733ab8f593dabcd62b3571639d624e65152ab8f530c359f0861\
             d807ca0dbf500d6a6156a38e088a22b65e52bc514d16ccf806818ce91ab7793\
             7365af90bbf74a35be6b40b8eedf2785e42874d"
        );
    }

    #[test]
    fn xor_is_an_involution() {
        let key = [7u8; KEY_LEN];
        let nonce = [9u8; NONCE_LEN];
        let message = b"round trip this please, across more than one block of data!!".repeat(3);

        let mut ciphertext = message.clone();
        ChaCha20::new(key, nonce)
            .apply_keystream(&mut ciphertext)
            .unwrap();
        assert_ne!(ciphertext, message);

        let mut plaintext = ciphertext;
        ChaCha20::new(key, nonce).apply_keystream(&mut plaintext).unwrap();
        assert_eq!(plaintext, message);
    }

    #[test]
    fn counter_exhaustion_leaves_buffer_untouched() {
        let mut cipher = ChaCha20::with_counter([1; KEY_LEN], [2; NONCE_LEN], u32::MAX);
        let mut buf = vec![0xAAu8; BLOCK_SIZE * 2];
        let original = buf.clone();
        let err = cipher.apply_keystream(&mut buf).unwrap_err();
        assert!(matches!(err, Error::CounterExhausted));
        assert_eq!(buf, original);
    }

    proptest::proptest! {
        /// `decrypt(encrypt(m)) == m` for arbitrary key, nonce and message.
        #[test]
        fn xor_is_an_involution_for_any_key_and_message(
            key: [u8; KEY_LEN],
            nonce: [u8; NONCE_LEN],
            message in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..300),
        ) {
            let mut ciphertext = message.clone();
            ChaCha20::new(key, nonce).apply_keystream(&mut ciphertext).unwrap();

            let mut plaintext = ciphertext;
            ChaCha20::new(key, nonce).apply_keystream(&mut plaintext).unwrap();

            proptest::prop_assert_eq!(plaintext, message);
        }
    }
}
