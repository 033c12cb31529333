//! Keyed message authentication codes.
pub mod hmac;

pub use hmac::{hmac_of, Hmac};
