//! HMAC, specified by [RFC 2104](https://www.rfc-editor.org/rfc/rfc2104),
//! generic over any [block hash](crate::hash::Hash).
use std::{fmt, marker::PhantomData, str::FromStr};

use crate::{
    block::{BlockPrimitive, Driver},
    bytes::Bytes,
    ct::Secret,
    hash::Hash,
    Error,
};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// An HMAC tag produced with hash `H`.
///
/// Distinct from [`Digest<H>`](crate::hash::Digest) -- a MAC tag and a plain
/// hash of the same underlying bytes are not interchangeable, and the type
/// system keeps them from being compared to one another. Equality is
/// constant-time.
#[derive(Clone, Copy)]
pub struct Hmac<H: Hash>(Secret<H::Output>, PhantomData<H>);

impl<H: Hash> Hmac<H> {
    pub fn as_bytes(&self) -> &[u8] {
        self.0 .0.as_ref()
    }

    pub fn into_bytes(self) -> H::Output {
        self.0 .0
    }
}

impl<H: Hash> PartialEq for Hmac<H> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<H: Hash> Eq for Hmac<H> {}

impl<H: Hash> fmt::Debug for Hmac<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hmac({})", self)
    }
}

impl<H: Hash> fmt::Display for Hmac<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_bytes()))
    }
}

impl<H: Hash> FromStr for Hmac<H> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidDigestEncoding)?;
        let output =
            H::Output::try_from(bytes.as_slice()).map_err(|_| Error::InvalidDigestEncoding)?;
        Ok(Hmac(Secret(output), PhantomData))
    }
}

/// Compute HMAC(`key`, `message`) using hash `H`, per RFC 2104 §2:
///
/// 1. If `key` is longer than `H`'s block size, replace it with `H(key)`.
/// 2. Right-pad the (possibly replaced) key with zeros to the block size.
/// 3. `inner = H((key' xor ipad) ‖ message)`.
/// 4. `HMAC = H((key' xor opad) ‖ inner)`.
pub fn hmac_of<H: Hash>(key: &[u8], message: &[u8]) -> Hmac<H> {
    let block_size = H::BLOCK_SIZE;

    let mut key_block = vec![0u8; block_size];
    if key.len() > block_size {
        let shortened = crate::hash::digest_of::<H>(key);
        key_block[..shortened.as_bytes().len()].copy_from_slice(shortened.as_bytes());
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let ipad_key: Vec<u8> = key_block.iter().map(|b| b ^ IPAD).collect();
    let opad_key: Vec<u8> = key_block.iter().map(|b| b ^ OPAD).collect();

    let mut inner = Driver::new(H::default());
    inner.absorb(&ipad_key);
    inner.absorb(message);
    let inner_digest = H::extract(&inner.finalize());

    let mut outer = Driver::new(H::default());
    outer.absorb(&opad_key);
    outer.absorb(inner_digest.as_ref());
    let tag = H::extract(&outer.finalize());

    Hmac(Secret(tag), PhantomData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{Sha1, Sha256};

    fn hex(h: &impl fmt::Display) -> String {
        h.to_string()
    }

    #[test]
    fn rfc2202_hmac_sha1_short_key() {
        let key = [0x0bu8; 20];
        let tag = hmac_of::<Sha1>(&key, b"Hi There");
        assert_eq!(hex(&tag), "b617318655057264e28bc0b6fb378c8ef146be00");
    }

    #[test]
    fn rfc2202_hmac_sha1_long_key_and_data() {
        let key = [0xaau8; 20];
        let msg = [0xddu8; 50];
        let tag = hmac_of::<Sha1>(&key, &msg);
        assert_eq!(hex(&tag), "125d7342b9ac11cd91a39af48aa17b4f63f175d3");
    }

    #[test]
    fn rfc2202_hmac_sha1_ascii_key() {
        let tag = hmac_of::<Sha1>(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(hex(&tag), "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
    }

    #[test]
    fn rfc2202_hmac_sha1_key_longer_than_block() {
        let key = [0xaau8; 80];
        let tag = hmac_of::<Sha1>(
            &key,
            b"Test Using Larger Than Block-Size Key and Larger Than One Block-Size Data",
        );
        assert_eq!(hex(&tag), "e8e99d0f45237d786d6bbaa7965c7808bbff1a91");
    }

    #[test]
    fn rfc4231_hmac_sha256_short_key() {
        let key = [0x0bu8; 20];
        let tag = hmac_of::<Sha256>(&key, b"Hi There");
        assert_eq!(
            hex(&tag),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn rfc4231_hmac_sha256_ascii_key() {
        let tag = hmac_of::<Sha256>(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex(&tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn rfc4231_hmac_sha256_key_longer_than_block() {
        let key = [0xaau8; 131];
        let tag = hmac_of::<Sha256>(
            &key,
            b"Test Using Larger Than Block-Size Key - Hash Key First",
        );
        assert_eq!(
            hex(&tag),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn different_keys_produce_different_tags() {
        let a = hmac_of::<Sha256>(b"key-a", b"same message");
        let b = hmac_of::<Sha256>(b"key-b", b"same message");
        assert_ne!(a, b);
    }
}
