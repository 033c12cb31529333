use thiserror::Error;

/// Errors produced anywhere in this crate.
///
/// In-memory hash, HMAC and ChaCha20 operations are infallible and never
/// produce one of these; only file-backed and PRG operations can fail, per
/// the propagation rule described on [`crate::hash::digest_of_file`] and
/// [`crate::random::Csprg`].
#[derive(Debug, Error)]
pub enum Error {
    /// Hex decoding of a [`Digest`](crate::hash::Digest) or
    /// [`Hmac`](crate::mac::Hmac) failed, either because the string wasn't
    /// valid hex or because its length didn't match the expected digest size.
    #[error("invalid digest encoding")]
    InvalidDigestEncoding,

    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The OS entropy source could not supply requested bytes.
    #[error("OS entropy unavailable: {0}")]
    EntropyUnavailable(#[from] getrandom::Error),

    /// The ChaCha20 block counter would overflow under the current
    /// (key, iv) pair. Callers must rekey before producing more keystream.
    #[error("ChaCha20 block counter exhausted")]
    CounterExhausted,

    /// Locked, zeroised memory could not be allocated and the caller
    /// requested strict mode rather than an unlocked fallback.
    #[error("secure memory allocation failed")]
    SecureAllocFailure,
}
