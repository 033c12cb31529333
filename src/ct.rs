//! Constant-time equality.
//!
//! Every comparison of secret-derived data in this crate (digests, MAC tags,
//! keys) goes through [`ConstantTimeEq::ct_eq`] rather than `==`. Slice and
//! array `PartialEq` short-circuits on the first differing byte, which leaks
//! the position of that byte through timing; `ct_eq` instead XORs every byte
//! and accumulates, so the running time depends only on the operand length.
use subtle::ConstantTimeEq;

/// Compare two equal-length byte slices without branching on their content.
///
/// Returns `false` if the lengths differ -- that comparison does leak
/// length, but length is never secret for the digests and tags this crate
/// deals with (it's fixed by the algorithm).
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.ct_eq(b))
}

/// Marker wrapper giving a byte array constant-time [`PartialEq`]/[`Eq`].
///
/// [`crate::hash::Digest`] and [`crate::mac::Hmac`] both store their payload
/// behind this so that deriving `PartialEq` on them can't accidentally
/// regress to a short-circuiting comparison.
#[derive(Debug, Clone, Copy)]
pub struct Secret<T>(pub T);

impl<T: AsRef<[u8]>> PartialEq for Secret<T> {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(self.0.as_ref(), other.0.as_ref())
    }
}

impl<T: AsRef<[u8]>> Eq for Secret<T> {}
