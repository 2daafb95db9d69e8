use super::EcPoint;
use crate::{authenticator::RegistrationResult, error::KeyError};
use serde::{Deserialize, Serialize};

/// A registered passkey: the authenticator's credential id and its public key.
///
/// The id is handed back by the authenticator on every assertion and selects the key the
/// contract verifies against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Opaque credential identifier, base64url.
    pub credential_id: String,
    /// The credential's public key.
    pub public_key: EcPoint,
}

impl Credential {
    /// Creates a new credential.
    pub fn new(credential_id: impl Into<String>, public_key: EcPoint) -> Self {
        Self { credential_id: credential_id.into(), public_key }
    }

    /// Extracts the credential from a registration ceremony's output.
    pub fn from_registration(registration: &RegistrationResult) -> Result<Self, KeyError> {
        Ok(Self::new(
            registration.credential_id.clone(),
            EcPoint::from_spki(&registration.public_key)?,
        ))
    }
}
