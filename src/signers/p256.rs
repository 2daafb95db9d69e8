//! P-256 key abstraction with WebAuthn-friendly helpers.

use crate::types::EcPoint;
use alloy::primitives::Bytes;
use p256::{
    PublicKey,
    ecdsa::{Signature, SigningKey, VerifyingKey, signature::hazmat::PrehashSigner},
    pkcs8::EncodePublicKey,
};

/// Trait for all signers that use a [`SigningKey`] underneath.
pub trait P256Key {
    /// Return reference to the P256 signing key.
    fn signing_key(&self) -> &SigningKey;

    /// Signs a prehashed digest with the p256 key.
    ///
    /// The signature is normalized to low-s.
    fn sign_prehash(&self, digest: &[u8]) -> eyre::Result<Signature> {
        Ok(self
            .signing_key()
            .sign_prehash(digest)
            .map(|s: Signature| s.normalize_s().unwrap_or(s))?)
    }

    /// Returns the verifying key.
    fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key().verifying_key()
    }

    /// Returns the public key coordinates.
    fn public_point(&self) -> EcPoint {
        EcPoint::from(self.verifying_key())
    }

    /// Returns the public key as DER `SubjectPublicKeyInfo`.
    fn public_key_spki(&self) -> eyre::Result<Bytes> {
        let der = PublicKey::from(self.verifying_key())
            .to_public_key_der()
            .map_err(|err| eyre::eyre!("failed to encode public key: {err}"))?;
        Ok(der.as_bytes().to_vec().into())
    }
}
