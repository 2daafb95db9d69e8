//! P-256 public key coordinates as the account contract stores them.

use crate::{error::KeyError, serde::base64url};
use alloy::primitives::U256;
use p256::{
    EncodedPoint, PublicKey, ecdsa::VerifyingKey, elliptic_curve::sec1::FromEncodedPoint,
    pkcs8::DecodePublicKey,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Affine coordinates of a P-256 public key.
///
/// `(0, 0)` is the contract's marker for an unregistered credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EcPoint {
    /// The x coordinate.
    pub x: U256,
    /// The y coordinate.
    pub y: U256,
}

/// The subset of a [JSON Web Key](https://www.rfc-editor.org/rfc/rfc7517) needed to read EC
/// coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, `EC` for elliptic curve keys.
    pub kty: String,
    /// Curve name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// Base64url big-endian x coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Base64url big-endian y coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl EcPoint {
    /// Creates a point from its coordinates.
    pub const fn new(x: U256, y: U256) -> Self {
        Self { x, y }
    }

    /// Extracts the coordinates from a base64url SPKI public key, as returned by a registration
    /// ceremony for an ES256 credential.
    ///
    /// The key is imported as a P-256 key, exported as a JWK, and the `x`/`y` members are read
    /// back.
    pub fn from_spki(public_key: &str) -> Result<Self, KeyError> {
        let der = base64url::decode(public_key).map_err(|_| KeyError::InvalidPublicKey)?;
        let key = PublicKey::from_public_key_der(&der).map_err(|_| KeyError::InvalidPublicKey)?;
        let jwk: Jwk = serde_json::from_str(&key.to_jwk_string())
            .map_err(|_| KeyError::InvalidPublicKey)?;

        trace!(kty = %jwk.kty, crv = ?jwk.crv, "Exported credential public key");

        Self::try_from(&jwk)
    }

    /// Whether this is the unregistered marker `(0, 0)`.
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Returns the ECDSA verifying key for these coordinates, if they lie on the curve.
    pub fn verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        let point = EncodedPoint::from_affine_coordinates(
            &self.x.to_be_bytes::<32>().into(),
            &self.y.to_be_bytes::<32>().into(),
            false,
        );
        Option::<PublicKey>::from(PublicKey::from_encoded_point(&point))
            .map(VerifyingKey::from)
            .ok_or(KeyError::InvalidPublicKey)
    }
}

impl TryFrom<&Jwk> for EcPoint {
    type Error = KeyError;

    fn try_from(jwk: &Jwk) -> Result<Self, Self::Error> {
        let (Some(x), Some(y)) = (&jwk.x, &jwk.y) else {
            return Err(KeyError::InvalidPublicKey);
        };
        Ok(Self { x: coordinate(x)?, y: coordinate(y)? })
    }
}

impl From<&VerifyingKey> for EcPoint {
    fn from(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        // uncompressed points always carry both coordinates
        let x = point.x().map(|x| U256::from_be_slice(x)).unwrap_or_default();
        let y = point.y().map(|y| U256::from_be_slice(y)).unwrap_or_default();
        Self { x, y }
    }
}

/// Decodes a base64url big-endian JWK coordinate.
fn coordinate(encoded: &str) -> Result<U256, KeyError> {
    let bytes = base64url::decode(encoded).map_err(|_| KeyError::InvalidPublicKey)?;
    U256::try_from_be_slice(&bytes).ok_or(KeyError::CoordinateOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::{ecdsa::SigningKey, pkcs8::EncodePublicKey};

    fn jwk(x: Option<&[u8]>, y: Option<&[u8]>) -> Jwk {
        Jwk {
            kty: "EC".into(),
            crv: Some("P-256".into()),
            x: x.map(base64url::encode),
            y: y.map(base64url::encode),
        }
    }

    #[test]
    fn reads_jwk_coordinates_big_endian() {
        let point = EcPoint::try_from(&jwk(Some(&[0x01; 32]), Some(&[0x02; 32]))).unwrap();

        assert_eq!(point.x, U256::from_be_bytes([0x01; 32]));
        assert_eq!(point.y, U256::from_be_bytes([0x02; 32]));
    }

    #[test]
    fn missing_coordinate_is_invalid() {
        let err = EcPoint::try_from(&jwk(Some(&[0x01; 32]), None)).unwrap_err();
        assert!(matches!(err, KeyError::InvalidPublicKey));

        let err = EcPoint::try_from(&jwk(None, Some(&[0x02; 32]))).unwrap_err();
        assert!(matches!(err, KeyError::InvalidPublicKey));
    }

    #[test]
    fn oversized_coordinate() {
        let err = EcPoint::try_from(&jwk(Some(&[0x01; 33]), Some(&[0x02; 32]))).unwrap_err();
        assert!(matches!(err, KeyError::CoordinateOverflow));
    }

    #[test]
    fn extracts_spki_coordinates() {
        let key = SigningKey::from_slice(&[0x42; 32]).unwrap();
        let verifying_key = key.verifying_key();
        let spki = PublicKey::from(verifying_key).to_public_key_der().unwrap();

        let point = EcPoint::from_spki(&base64url::encode(spki.as_bytes())).unwrap();
        let encoded = verifying_key.to_encoded_point(false);

        assert_eq!(point.x, U256::from_be_slice(encoded.x().unwrap()));
        assert_eq!(point.y, U256::from_be_slice(encoded.y().unwrap()));
        assert_eq!(point, EcPoint::from(verifying_key));
        assert_eq!(&point.verifying_key().unwrap(), verifying_key);
    }

    #[test]
    fn rejects_non_spki_blob() {
        let blob = base64url::encode([0x30, 0x03, 0x02, 0x01, 0x01]);
        let err = EcPoint::from_spki(&blob).unwrap_err();
        assert!(matches!(err, KeyError::InvalidPublicKey));

        let err = EcPoint::from_spki("not base64!").unwrap_err();
        assert!(matches!(err, KeyError::InvalidPublicKey));
    }

    #[test]
    fn zero_point() {
        assert!(EcPoint::default().is_zero());
        assert!(!EcPoint::new(U256::from(1), U256::ZERO).is_zero());
        assert!(EcPoint::default().verifying_key().is_err());
    }
}
