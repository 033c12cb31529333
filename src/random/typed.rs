//! Typed random generation built on top of the [`Csprg`].
//!
//! `random<T>` is only sound for types that are uniformly distributed over
//! their byte representation -- the fixed-width integers and fixed-size
//! byte arrays. A refined type (a die roll, a shuffle index, anything with
//! a restricted range) must not pick up a blanket impl of this shape; it
//! implements [`RandomGeneratable`] itself, typically with rejection
//! sampling, rather than being handed bytes that might not land in range.
use super::{csprg::Csprg, entropy::Entropy};
use crate::{secure::SecureBytes, Error};

/// A type that knows how to fill itself from CSPRG output.
///
/// The blanket impls below (integers, fixed-size byte arrays) are valid
/// only because every bit pattern of those types is a legal, equally
/// likely value. There is deliberately no generic "fill the bytes and
/// transmute" impl for arbitrary `T` -- that would silently miscompile a
/// refined type into non-uniform output.
pub trait RandomGeneratable: Sized {
    fn generate<E: Entropy>(csprg: &mut Csprg<E>) -> Result<Self, Error>;
}

macro_rules! impl_random_generatable_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl RandomGeneratable for $t {
                fn generate<E: Entropy>(csprg: &mut Csprg<E>) -> Result<Self, Error> {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    csprg.draw(&mut buf)?;
                    Ok(<$t>::from_le_bytes(buf))
                }
            }
        )*
    };
}

impl_random_generatable_for_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl<const N: usize> RandomGeneratable for [u8; N] {
    fn generate<E: Entropy>(csprg: &mut Csprg<E>) -> Result<Self, Error> {
        let mut buf = [0u8; N];
        csprg.draw(&mut buf)?;
        Ok(buf)
    }
}

/// Generate a `T` from `csprg`. See [`RandomGeneratable`] for which types
/// this is sound for.
pub fn random<T: RandomGeneratable, E: Entropy>(csprg: &mut Csprg<E>) -> Result<T, Error> {
    T::generate(csprg)
}

/// Draw `n` fresh random bytes into a freshly allocated, ordinary (not
/// locked) `Vec`. Not suitable for key material -- use
/// [`randomise_in_place`] when the output must stay in secure memory.
pub fn random_bytes<E: Entropy>(csprg: &mut Csprg<E>, n: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; n];
    csprg.draw(&mut buf)?;
    Ok(buf)
}

/// Fill an existing secure cell directly from the PRG, so the random value
/// never exists in memory that isn't locked and zeroised.
pub fn randomise_in_place<E: Entropy, const N: usize>(
    csprg: &mut Csprg<E>,
    cell: &mut SecureBytes<N>,
) -> Result<(), Error> {
    csprg.draw(cell.as_mut_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::entropy::FixedEntropy;

    fn csprg(seed: u8) -> Csprg<FixedEntropy> {
        Csprg::new(FixedEntropy { seed }).unwrap()
    }

    #[test]
    fn random_u64_is_reproducible_from_a_fixed_entropy_source() {
        let a: u64 = random(&mut csprg(1)).unwrap();
        let b: u64 = random(&mut csprg(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_bytes_returns_requested_length() {
        let bytes = random_bytes(&mut csprg(2), 100).unwrap();
        assert_eq!(bytes.len(), 100);
    }

    #[test]
    fn randomise_in_place_fills_the_whole_cell() {
        let mut cell = SecureBytes::<32>::new(false).unwrap();
        randomise_in_place(&mut csprg(3), &mut cell).unwrap();
        assert!(cell.as_slice().iter().any(|&b| b != 0));
    }

    #[test]
    fn fixed_size_array_generation_fills_every_byte() {
        let arr: [u8; 16] = random(&mut csprg(4)).unwrap();
        assert!(arr.iter().any(|&b| b != 0));
    }
}
