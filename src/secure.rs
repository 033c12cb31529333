//! Secure memory: locked pages and zeroisation for key material and PRG
//! state.
//!
//! [`SecureBytes`] is the building block the rest of the crate uses whenever
//! it needs to hold a secret (a ChaCha20 key, a CSPRG sampling buffer, an
//! HMAC key) in memory. It locks its backing page with `mlock` on platforms
//! where that's available, and zeroes its contents on every exit path via
//! [`zeroize::ZeroizeOnDrop`] -- normal drop, panic unwind, or an explicit
//! [`SecureBytes::release`].
use zeroize::Zeroize;

use crate::Error;

/// A fixed-size byte buffer that is best-effort locked against paging and
/// unconditionally zeroised before it's freed.
///
/// Locking can fail (no `mlock`, `RLIMIT_MEMLOCK` exhausted, non-Unix
/// target). By default that's downgraded to an unlocked allocation with a
/// [`tracing::warn!`]; pass `strict = true` to [`SecureBytes::new`] to turn
/// the failure into [`Error::SecureAllocFailure`] instead.
///
/// Drop both zeroises and unlocks, in that order; `Zeroize` is derived and
/// `Drop` implemented by hand rather than deriving `ZeroizeOnDrop`, since
/// unlocking needs its own code to run alongside the zeroise.
#[derive(Zeroize)]
pub struct SecureBytes<const N: usize> {
    #[zeroize(skip)]
    locked: bool,
    bytes: [u8; N],
}

impl<const N: usize> SecureBytes<N> {
    /// Allocate `N` zeroed, locked bytes. Falls back to an unlocked
    /// allocation (with a diagnostic) unless `strict` is set.
    pub fn new(strict: bool) -> Result<Self, Error> {
        let bytes = [0u8; N];
        let locked = match lock(&bytes) {
            Ok(()) => true,
            Err(()) if strict => return Err(Error::SecureAllocFailure),
            Err(()) => {
                tracing::warn!(bytes = N, "failed to lock secure memory page; continuing unlocked");
                false
            }
        };
        Ok(Self { bytes, locked })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Zero and unlock explicitly, ahead of drop. Dropping without calling
    /// this still zeroises and unlocks; this exists so callers that want the
    /// release to happen at a specific point (e.g. right after rekeying) can
    /// make that visible in the code.
    pub fn release(mut self) {
        self.zeroize();
        // `self` is dropped at the end of this scope; `Drop::drop` (derived
        // via `ZeroizeOnDrop`) runs again on already-zero bytes, which is
        // harmless.
    }
}

impl<const N: usize> Drop for SecureBytes<N> {
    fn drop(&mut self) {
        self.zeroize();
        if self.locked {
            unlock(&self.bytes);
        }
    }
}

#[cfg(unix)]
fn lock(bytes: &[u8]) -> Result<(), ()> {
    // Safety: `bytes` is a valid, live slice for the duration of this call;
    // `mlock` only inspects the address range, it doesn't retain the pointer.
    let ret = unsafe { libc::mlock(bytes.as_ptr().cast(), bytes.len()) };
    if ret == 0 {
        Ok(())
    } else {
        Err(())
    }
}

#[cfg(unix)]
fn unlock(bytes: &[u8]) {
    // Safety: see `lock`. Failure to unlock isn't actionable at drop time.
    unsafe {
        libc::munlock(bytes.as_ptr().cast(), bytes.len());
    }
}

#[cfg(not(unix))]
fn lock(_bytes: &[u8]) -> Result<(), ()> {
    Err(())
}

#[cfg(not(unix))]
fn unlock(_bytes: &[u8]) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroize_clears_the_buffer() {
        let mut secret = SecureBytes::<32>::new(false).unwrap();
        secret.as_mut_slice().fill(0xAA);
        assert!(secret.as_slice().iter().all(|&b| b == 0xAA));
        secret.zeroize();
        assert!(secret.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn release_consumes_without_panicking() {
        let mut secret = SecureBytes::<32>::new(false).unwrap();
        secret.as_mut_slice().fill(0xAA);
        secret.release();
    }
}
