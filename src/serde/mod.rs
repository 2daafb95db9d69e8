//! Serde helpers.

pub mod base64url;
