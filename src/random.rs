//! OS-seeded randomness: the fast-key-erasure [CSPRG](csprg::Csprg) and a
//! typed API built on top of it.
pub mod csprg;
pub mod entropy;
pub mod typed;

pub use csprg::Csprg;
pub use entropy::{Entropy, OsEntropy};
pub use typed::{random, random_bytes, randomise_in_place, RandomGeneratable};
