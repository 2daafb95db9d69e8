//! Base64url helpers.
//!
//! WebAuthn transports every binary field as URL-safe base64. Encoding never pads, decoding
//! accepts both padded and unpadded input since authenticator libraries disagree on it.

use base64::{
    Engine,
    alphabet::URL_SAFE,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::{Deserialize, Deserializer, Serializer};

/// URL-safe engine that writes no padding and tolerates it on input.
pub const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes `data` as unpadded base64url.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    BASE64_URL.encode(data)
}

/// Decodes base64url `data`, padded or not.
pub fn decode(data: impl AsRef<[u8]>) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_URL.decode(data)
}

/// Serializes bytes as an unpadded base64url string.
pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&encode(bytes))
}

/// Deserializes bytes from a base64url string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    decode(s).map_err(serde::de::Error::custom)
}
