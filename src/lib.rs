//! A small, from-scratch cryptographic library: hash functions (SHA-1,
//! SHA-256, SHA-512, BLAKE2b, BLAKE2s), HMAC built generically over any of
//! them, the ChaCha20 stream cipher, and a fast-key-erasure CSPRG seeded
//! from OS entropy.
//!
//! Everything that consumes data in fixed-size chunks -- the hashes and
//! ChaCha20 alike -- is expressed against the [block-primitive
//! framework](block); the hashes are driven through it by the streaming
//! facade in [`hash`], and the CSPRG in [`random`] drives ChaCha20 directly
//! to generate keystream with no associated plaintext. [`ct`] and
//! [`secure`] cross-cut all of it: every comparison of secret-derived data
//! is constant-time, and every buffer holding key material is locked and
//! zeroised.
mod block;
mod bytes;
mod cipher;
mod ct;
mod error;
mod hash;
mod mac;
mod random;
mod secure;

pub use block::{BlockPrimitive, Driver};
pub use bytes::Bytes;
pub use cipher::{chacha20, ChaCha20};
pub use ct::{ct_eq, Secret};
pub use error::Error;
pub use hash::{
    blake2,
    digest_of,
    digest_of_file,
    digest_of_source,
    sha1,
    sha2,
    Blake2b,
    Blake2s,
    ByteSource,
    Digest,
    Hash,
    Sha1,
    Sha256,
    Sha512,
};
pub use mac::{hmac_of, Hmac};
pub use random::{
    random,
    random_bytes,
    randomise_in_place,
    Csprg,
    Entropy,
    OsEntropy,
    RandomGeneratable,
};
pub use secure::SecureBytes;
