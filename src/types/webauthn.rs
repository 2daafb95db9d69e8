//! The WebAuthn signature encoding consumed by the passkey account contract.

use super::{ChallengeSplit, EcPoint, RawSignature};
use crate::{authenticator::AuthenticationResult, error::SignatureError, serde::base64url};
use alloy::{
    primitives::Bytes,
    signers::k256::sha2::{Digest, Sha256},
    sol,
    sol_types::SolValue,
};
use p256::ecdsa::{Signature, signature::Verifier};
use tracing::trace;

sol! {
    /// A WebAuthn P-256 signature, split so the contract can re-insert the challenge.
    ///
    /// Encoded with `abi.encode(r, s, authenticatorData, clientDataPrefix, clientDataSuffix)`.
    #[derive(Debug, PartialEq, Eq)]
    struct WebAuthnSignature {
        /// The r value of the secp256r1 signature.
        uint256 r;
        /// The s value of the secp256r1 signature.
        uint256 s;
        /// The WebAuthn authenticator data.
        /// See: https://www.w3.org/TR/webauthn-2/#dom-authenticatorassertionresponse-authenticatordata.
        bytes authenticatorData;
        /// `clientDataJSON` up to the challenge.
        string clientDataPrefix;
        /// `clientDataJSON` after the challenge.
        string clientDataSuffix;
    }
}

impl WebAuthnSignature {
    /// Assembles the signature from its decoded parts.
    pub fn new(signature: RawSignature, authenticator_data: Bytes, split: ChallengeSplit) -> Self {
        Self {
            r: signature.r,
            s: signature.s,
            authenticatorData: authenticator_data,
            clientDataPrefix: split.prefix,
            clientDataSuffix: split.suffix,
        }
    }

    /// Decodes an authentication ceremony's output for the given `challenge`.
    pub fn from_assertion(
        assertion: &AuthenticationResult,
        challenge: &str,
    ) -> Result<Self, SignatureError> {
        let signature = RawSignature::from_base64url(&assertion.signature)?;
        let authenticator_data = base64url::decode(&assertion.authenticator_data)?;
        let client_data = base64url::decode(&assertion.client_data)?;
        let split = ChallengeSplit::locate(&client_data, challenge)?;

        trace!(
            credential_id = %assertion.credential_id,
            prefix = %split.prefix,
            suffix = %split.suffix,
            "Located challenge in client data"
        );

        Ok(Self::new(signature, authenticator_data.into(), split))
    }

    /// The decoded signature components.
    pub const fn raw_signature(&self) -> RawSignature {
        RawSignature { r: self.r, s: self.s }
    }

    /// ABI-encodes the signature as the contract expects it.
    pub fn encode(&self) -> Bytes {
        self.abi_encode_params().into()
    }

    /// Decodes an encoding produced by [`Self::encode`].
    pub fn decode(data: &[u8]) -> Result<Self, alloy::sol_types::Error> {
        Self::abi_decode_params(data)
    }

    /// Reassembles `clientDataJSON` with `challenge` in place.
    pub fn client_data(&self, challenge: &str) -> String {
        [self.clientDataPrefix.as_str(), challenge, self.clientDataSuffix.as_str()].concat()
    }

    /// The bytes the authenticator signed: `authenticatorData || sha256(clientDataJSON)`.
    pub fn signed_message(&self, challenge: &str) -> Vec<u8> {
        let client_data_hash = Sha256::digest(self.client_data(challenge).as_bytes());
        [&self.authenticatorData[..], &client_data_hash[..]].concat()
    }

    /// Verifies the signature off-chain the way the contract does on-chain.
    pub fn verify(&self, challenge: &str, public_key: &EcPoint) -> bool {
        let Ok(key) = public_key.verifying_key() else {
            return false;
        };
        let Ok(signature) =
            Signature::from_scalars(self.r.to_be_bytes::<32>(), self.s.to_be_bytes::<32>())
        else {
            return false;
        };
        key.verify(&self.signed_message(challenge), &signature).is_ok()
    }
}

impl From<WebAuthnSignature> for Bytes {
    fn from(signature: WebAuthnSignature) -> Self {
        signature.encode()
    }
}
