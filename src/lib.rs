//! # Passkey Account
//!
//! Signs smart account actions with WebAuthn passkeys and encodes the resulting P-256 signatures
//! for on-chain verification.

pub mod authenticator;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod serde;
pub mod signers;
pub mod types;
pub mod version;
