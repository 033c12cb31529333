//! OS-entropy seeding, abstracted behind a trait so the CSPRG can be tested
//! without depending on the real OS entropy call.
use crate::Error;

/// A source of cryptographically strong entropy, consulted only at
/// (re)seed time.
pub trait Entropy {
    /// Fill `buf` entirely with fresh entropy, or fail.
    fn fill(&self, buf: &mut [u8]) -> Result<(), Error>;
}

/// Entropy backed by the operating system's CSPRNG -- `getrandom(2)` on
/// Linux, `arc4random` on BSD/macOS, `CryptGenRandom`/`BCryptGenRandom` on
/// Windows -- via the platform dispatch in the [`getrandom`] crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), Error> {
        getrandom::getrandom(buf)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) struct FixedEntropy {
    pub seed: u8,
}

#[cfg(test)]
impl Entropy for FixedEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), Error> {
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.seed.wrapping_add(i as u8);
        }
        Ok(())
    }
}
