/// A fixed-size byte array.
///
/// Implemented for `[u8; N]` for every `N`. Digests, keys, IVs and blocks are
/// all expressed in terms of this trait so that the rest of the crate can be
/// generic over their size.
pub trait Bytes:
    'static
    + for<'a> TryFrom<&'a [u8], Error = std::array::TryFromSliceError>
    + AsRef<[u8]>
    + AsMut<[u8]>
    + Clone
    + Copy
    + Sized
    + Default
    + IntoIterator<Item = u8>
    + std::fmt::Debug
{
    /// Number of bytes in this array, spelled out as an associated constant
    /// so it's usable from contexts where `Self` isn't (e.g. other
    /// associated-type bounds).
    const LEN: usize;
}

impl<const N: usize> Bytes for [u8; N] {
    const LEN: usize = N;
}
