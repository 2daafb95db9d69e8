//! Local P-256 key handling shared by software authenticators.

mod p256;
pub use p256::P256Key;
