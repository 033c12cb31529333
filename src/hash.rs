//! Hash functions and the streaming facade over them.
//!
//! SHA-1, SHA-256 and SHA-512 are Merkle-Damgard constructions built from
//! the SHACAL family of block ciphers run in Davies-Meyer mode; BLAKE2b and
//! BLAKE2s are their own, non-Merkle-Damgard, construction. All five are
//! expressed as [`BlockPrimitive`]s and driven by the same [`Driver`].
pub mod blake2;
pub mod sha1;
pub mod sha2;

use std::{fmt, io::Read, marker::PhantomData, path::Path, str::FromStr};

use crate::{
    block::{BlockPrimitive, Driver},
    bytes::Bytes,
    ct::Secret,
    Error,
};

pub use blake2::{Blake2b, Blake2s};
pub use sha1::Sha1;
pub use sha2::{Sha256, Sha512};

/// A cryptographic hash function built on the [block-primitive
/// framework](crate::block).
///
/// `Hash` is a thin layer over [`BlockPrimitive`]: it only adds the rule for
/// turning the primitive's internal `State` into the externally-visible
/// digest bytes (truncation, endian conversion, ...).
pub trait Hash: BlockPrimitive + Default {
    /// The digest's backing byte array, e.g. `[u8; 32]` for SHA-256.
    type Output: Bytes;

    /// Extract the digest from a finalised state.
    fn extract(state: &Self::State) -> Self::Output;
}

/// The output of hashing something with `H`.
///
/// Digests of different hashes are different Rust types -- comparing a
/// `Digest<Sha256>` to a `Digest<Sha512>` is a compile error, not a runtime
/// mismatch. Equality is constant-time.
#[derive(Clone, Copy)]
pub struct Digest<H: Hash>(Secret<H::Output>, PhantomData<H>);

impl<H: Hash> Digest<H> {
    pub fn as_bytes(&self) -> &[u8] {
        self.0 .0.as_ref()
    }

    pub fn into_bytes(self) -> H::Output {
        self.0 .0
    }
}

impl<H: Hash> PartialEq for Digest<H> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<H: Hash> Eq for Digest<H> {}

impl<H: Hash> fmt::Debug for Digest<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl<H: Hash> fmt::Display for Digest<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_bytes()))
    }
}

impl<H: Hash> FromStr for Digest<H> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidDigestEncoding)?;
        let output =
            H::Output::try_from(bytes.as_slice()).map_err(|_| Error::InvalidDigestEncoding)?;
        Ok(Digest(Secret(output), PhantomData))
    }
}

/// A pull-based source of bytes, the abstraction [`digest_of_source`] and
/// [`digest_of_file`] stream through. Implemented for anything that
/// implements [`std::io::Read`].
pub trait ByteSource {
    /// Read up to `buf.len()` bytes, returning how many were actually read.
    /// `Ok(0)` means end of stream.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Error>;
}

impl<R: Read> ByteSource for R {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        Ok(self.read(buf)?)
    }
}

/// Hash `input` in one shot. Infallible: in-memory hashing cannot fail.
pub fn digest_of<H: Hash>(input: &[u8]) -> Digest<H> {
    let mut driver = Driver::new(H::default());
    driver.absorb(input);
    Digest(Secret(H::extract(&driver.finalize())), PhantomData)
}

/// Hash everything pulled from `source` until it reports EOF.
pub fn digest_of_source<H: Hash>(source: &mut impl ByteSource) -> Result<Digest<H>, Error> {
    let mut driver = Driver::new(H::default());
    // A handful of blocks per read keeps syscall count down without
    // committing to a large fixed buffer.
    let mut buf = vec![0u8; H::BLOCK_SIZE * 64];
    loop {
        let n = source.read_into(&mut buf)?;
        if n == 0 {
            break;
        }
        driver.absorb(&buf[..n]);
    }
    Ok(Digest(Secret(H::extract(&driver.finalize())), PhantomData))
}

/// Hash the contents of the file at `path`.
pub fn digest_of_file<H: Hash>(path: impl AsRef<Path>) -> Result<Digest<H>, Error> {
    let path = path.as_ref();
    tracing::trace!(path = %path.display(), "hashing file");
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let digest = digest_of_source::<H>(&mut reader)?;
    tracing::trace!(path = %path.display(), digest = %digest, "hashed file");
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_matches_one_shot() {
        let input: Vec<u8> = (0u8..=255).cycle().take(5000).collect();
        let one_shot = digest_of::<Sha256>(&input);

        let mut driver = Driver::new(Sha256::default());
        for chunk in input.chunks(17) {
            driver.absorb(chunk);
        }
        let streamed =
            Digest::<Sha256>(Secret(Sha256::extract(&driver.finalize())), PhantomData);

        assert_eq!(one_shot, streamed);
    }

    #[test]
    fn hex_round_trip() {
        let d = digest_of::<Sha256>(b"round trip");
        let s = d.to_string();
        let parsed: Digest<Sha256> = s.parse().unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn bad_hex_is_rejected() {
        let err = "not hex".parse::<Digest<Sha256>>().unwrap_err();
        assert!(matches!(err, Error::InvalidDigestEncoding));
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = "aa".parse::<Digest<Sha256>>().unwrap_err();
        assert!(matches!(err, Error::InvalidDigestEncoding));
    }

    proptest::proptest! {
        /// Splitting the input into any sequence of chunks and absorbing
        /// them in order must yield the same digest as one-shot hashing,
        /// regardless of how the chunk boundaries fall.
        #[test]
        fn streaming_equivalence(
            data: Vec<u8>,
            chunk_sizes in proptest::collection::vec(1usize..37, 0..20),
        ) {
            let one_shot = digest_of::<Sha256>(&data);

            let mut driver = Driver::new(Sha256::default());
            let mut offset = 0;
            for &size in &chunk_sizes {
                if offset >= data.len() {
                    break;
                }
                let end = (offset + size).min(data.len());
                driver.absorb(&data[offset..end]);
                offset = end;
            }
            driver.absorb(&data[offset..]);
            let streamed = Digest::<Sha256>(Secret(Sha256::extract(&driver.finalize())), PhantomData);

            proptest::prop_assert_eq!(one_shot, streamed);
        }

        /// `parse(show(d)) == d` for any digest produced from arbitrary
        /// input bytes.
        #[test]
        fn hex_round_trip_is_total(data: Vec<u8>) {
            let d = digest_of::<Sha256>(&data);
            let parsed: Digest<Sha256> = d.to_string().parse().unwrap();
            proptest::prop_assert_eq!(d, parsed);
        }
    }
}
