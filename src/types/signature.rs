//! Raw ECDSA signature components recovered from an authenticator's DER output.
//!
//! Authenticators return ES256 signatures as an ASN.1 `ECDSA-Sig-Value`:
//!
//! ```text
//! 0x30 [total-length] 0x02 [r-length] [r] 0x02 [s-length] [s]
//! ```
//!
//! DER integers are signed, so a value whose first significant byte has the high bit set carries
//! an extra leading `0x00`. The on-chain verifier expects the plain unsigned values.

use crate::{error::SignatureError, serde::base64url};
use alloy::primitives::U256;

/// ASN.1 SEQUENCE tag.
const SEQUENCE_TAG: u8 = 0x30;

/// ASN.1 INTEGER tag.
const INTEGER_TAG: u8 = 0x02;

/// The `r` and `s` values of a P-256 ECDSA signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSignature {
    /// The r value.
    pub r: U256,
    /// The s value.
    pub s: U256,
}

impl RawSignature {
    /// Decodes a base64url DER signature as returned by an authentication ceremony.
    pub fn from_base64url(signature: &str) -> Result<Self, SignatureError> {
        Self::from_der(&base64url::decode(signature)?)
    }

    /// Decodes a DER `ECDSA-Sig-Value`.
    ///
    /// Values shorter than 32 bytes are kept as they are; widening happens at ABI encoding.
    pub fn from_der(der: &[u8]) -> Result<Self, SignatureError> {
        let mut outer = DerReader(der);
        let mut sequence = DerReader(outer.read(SEQUENCE_TAG)?);
        outer.finish()?;

        let r = sequence.read(INTEGER_TAG)?;
        let s = sequence.read(INTEGER_TAG)?;
        sequence.finish()?;

        Ok(Self { r: to_uint(strip_sign_padding(r))?, s: to_uint(strip_sign_padding(s))? })
    }
}

impl From<p256::ecdsa::Signature> for RawSignature {
    fn from(signature: p256::ecdsa::Signature) -> Self {
        Self {
            r: U256::from_be_slice(&signature.r().to_bytes()),
            s: U256::from_be_slice(&signature.s().to_bytes()),
        }
    }
}

/// Removes the `0x00` that DER prepends to keep a value with the high bit set non-negative.
///
/// Only a single padding byte is removed, and only when the following byte has its high bit set.
pub fn strip_sign_padding(bytes: &[u8]) -> &[u8] {
    match bytes {
        [0x00, next, ..] if next & 0x80 != 0 => &bytes[1..],
        _ => bytes,
    }
}

fn to_uint(bytes: &[u8]) -> Result<U256, SignatureError> {
    if bytes.is_empty() {
        return Err(SignatureError::MalformedSignature("empty integer"));
    }
    U256::try_from_be_slice(bytes)
        .ok_or(SignatureError::MalformedSignature("integer exceeds 256 bits"))
}

/// Cursor over a run of DER TLV elements.
struct DerReader<'a>(&'a [u8]);

impl<'a> DerReader<'a> {
    /// Reads the next element, which must carry `tag`, and returns its content.
    fn read(&mut self, tag: u8) -> Result<&'a [u8], SignatureError> {
        let (&actual, rest) =
            self.0.split_first().ok_or(SignatureError::MalformedSignature("truncated encoding"))?;
        if actual != tag {
            return Err(SignatureError::MalformedSignature("unexpected tag"));
        }

        let (len, consumed) = parse_length(rest)?;
        let rest = &rest[consumed..];
        if rest.len() < len {
            return Err(SignatureError::MalformedSignature("truncated encoding"));
        }

        let (content, rest) = rest.split_at(len);
        self.0 = rest;
        Ok(content)
    }

    /// Fails if any element is left unread.
    fn finish(self) -> Result<(), SignatureError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(SignatureError::MalformedSignature("unexpected trailing data"))
        }
    }
}

/// Parses a DER length, returning `(length, bytes_consumed)`.
///
/// Short form covers 0-127, long form uses the low bits of the first byte as the number of
/// length bytes that follow. Non-minimal encodings are rejected.
fn parse_length(bytes: &[u8]) -> Result<(usize, usize), SignatureError> {
    let &first = bytes.first().ok_or(SignatureError::MalformedSignature("truncated encoding"))?;
    if first & 0x80 == 0 {
        return Ok((usize::from(first), 1));
    }

    let len_bytes = usize::from(first & 0x7f);
    if len_bytes == 0 || len_bytes > 4 {
        return Err(SignatureError::MalformedSignature("unsupported length encoding"));
    }
    let encoded = bytes
        .get(1..=len_bytes)
        .ok_or(SignatureError::MalformedSignature("truncated encoding"))?;
    if encoded[0] == 0 {
        return Err(SignatureError::MalformedSignature("non-canonical length"));
    }

    let len = encoded.iter().fold(0usize, |len, &byte| (len << 8) | usize::from(byte));
    if len < 0x80 {
        return Err(SignatureError::MalformedSignature("non-canonical length"));
    }
    Ok((len, 1 + len_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::hex;
    use p256::ecdsa::{SigningKey, signature::hazmat::PrehashSigner};

    /// Wraps `r` and `s` INTEGER contents into an `ECDSA-Sig-Value`.
    fn der(r: &[u8], s: &[u8]) -> Vec<u8> {
        let mut content = vec![INTEGER_TAG, r.len() as u8];
        content.extend_from_slice(r);
        content.extend_from_slice(&[INTEGER_TAG, s.len() as u8]);
        content.extend_from_slice(s);

        let mut out = vec![SEQUENCE_TAG, content.len() as u8];
        out.extend(content);
        out
    }

    #[test]
    fn values_without_high_bit_are_unchanged() {
        let r = hex!("7f00000000000000000000000000000000000000000000000000000000000001");
        let s = hex!("0102030405");

        let signature = RawSignature::from_der(&der(&r, &s)).unwrap();

        assert_eq!(signature.r, U256::from_be_bytes(r));
        assert_eq!(signature.s, U256::from_be_slice(&s));
    }

    #[test]
    fn strips_sign_padding() {
        let mut padded = [0u8; 33];
        padded[1] = 0x80;
        padded[32] = 0x01;

        assert_eq!(strip_sign_padding(&padded), &padded[1..]);
        assert_eq!(strip_sign_padding(&padded[1..]).len(), 32);

        let signature = RawSignature::from_der(&der(&padded, &padded)).unwrap();
        assert_eq!(signature.r, U256::from_be_slice(&padded[1..]));
        assert_eq!(signature.s, signature.r);
    }

    #[test]
    fn keeps_zero_not_followed_by_high_bit() {
        assert_eq!(strip_sign_padding(&[0x00, 0x7f]), &[0x00, 0x7f]);
        assert_eq!(strip_sign_padding(&[0x00]), &[0x00]);
        assert_eq!(strip_sign_padding(&[]), &[] as &[u8]);
    }

    #[test]
    fn matches_p256_der_parsing() {
        let key = SigningKey::from_slice(&[0x17; 32]).unwrap();
        for digest in [[0x01u8; 32], [0xfe; 32], [0x5a; 32]] {
            let signature: p256::ecdsa::Signature = key.sign_prehash(&digest).unwrap();
            let der = signature.to_der();

            let raw = RawSignature::from_base64url(&base64url::encode(der.as_bytes())).unwrap();
            assert_eq!(raw, RawSignature::from(signature));
        }
    }

    #[test]
    fn malformed_signatures() {
        let cases: &[(&str, Vec<u8>)] = &[
            ("empty", vec![]),
            ("wrong sequence tag", vec![0x31, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]),
            ("wrong integer tag", vec![0x30, 0x06, 0x03, 0x01, 0x01, 0x02, 0x01, 0x02]),
            ("truncated", vec![0x30, 0x08, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]),
            ("one integer", vec![0x30, 0x03, 0x02, 0x01, 0x01]),
            ("three integers", vec![0x30, 0x09, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x01, 0x03]),
            ("trailing data", vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0xff]),
            ("empty integer", vec![0x30, 0x05, 0x02, 0x00, 0x02, 0x01, 0x02]),
            ("non-canonical length", vec![0x30, 0x81, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]),
        ];

        for (name, der) in cases {
            assert!(
                matches!(RawSignature::from_der(der), Err(SignatureError::MalformedSignature(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn rejects_oversized_integer() {
        let r = [0x01; 33];
        assert!(matches!(
            RawSignature::from_der(&der(&r, &[0x01])),
            Err(SignatureError::MalformedSignature(_))
        ));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            RawSignature::from_base64url("***"),
            Err(SignatureError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn long_form_length() {
        assert_eq!(parse_length(&[0x81, 0x80]).unwrap(), (128, 2));
        assert_eq!(parse_length(&[0x82, 0x01, 0x00]).unwrap(), (256, 3));
        assert!(parse_length(&[0x82, 0x00, 0x80]).is_err());
        assert!(parse_length(&[0x80]).is_err());
        assert!(parse_length(&[0x81]).is_err());
    }
}
