//! WebAuthn authenticator capability.
//!
//! The ceremonies themselves happen outside this crate, in a browser or on a security key. They
//! are modelled as an injected [`Authenticator`] so that the parsing and encoding logic can run
//! against canned ceremony outputs.

use crate::error::AuthenticatorError;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

mod software;
pub use software::SoftwareAuthenticator;

/// An authenticator able to run registration and authentication ceremonies.
#[async_trait::async_trait]
pub trait Authenticator: fmt::Debug + Send + Sync {
    /// Creates a new ES256 credential for `username`.
    async fn register(
        &self,
        username: &str,
        user_handle: &str,
        options: &CeremonyOptions,
    ) -> Result<RegistrationResult, AuthenticatorError>;

    /// Signs `challenge` with one of `allowed_credentials`.
    ///
    /// An empty list lets the authenticator pick a discoverable credential.
    async fn authenticate(
        &self,
        allowed_credentials: &[String],
        challenge: &str,
        options: &CeremonyOptions,
    ) -> Result<AuthenticationResult, AuthenticatorError>;
}

#[async_trait::async_trait]
impl<T: Authenticator + ?Sized> Authenticator for Arc<T> {
    async fn register(
        &self,
        username: &str,
        user_handle: &str,
        options: &CeremonyOptions,
    ) -> Result<RegistrationResult, AuthenticatorError> {
        (**self).register(username, user_handle, options).await
    }

    async fn authenticate(
        &self,
        allowed_credentials: &[String],
        challenge: &str,
        options: &CeremonyOptions,
    ) -> Result<AuthenticationResult, AuthenticatorError> {
        (**self).authenticate(allowed_credentials, challenge, options).await
    }
}

/// Output of a registration ceremony. Binary fields are base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    /// The new credential's id.
    pub credential_id: String,
    /// DER `SubjectPublicKeyInfo` of the credential public key.
    pub public_key: String,
    /// COSE algorithm identifier of the credential.
    pub algorithm: i64,
}

/// Output of an authentication ceremony. Binary fields are base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResult {
    /// The credential that signed.
    pub credential_id: String,
    /// [authenticatorData](https://w3c.github.io/webauthn/#authenticator-data).
    pub authenticator_data: String,
    /// [clientDataJSON](https://w3c.github.io/webauthn/#dom-authenticatorresponse-clientdatajson).
    pub client_data: String,
    /// DER `ECDSA-Sig-Value`.
    pub signature: String,
}

/// Options passed to both ceremonies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CeremonyOptions {
    /// Which kind of authenticator to use.
    #[serde(default)]
    pub authenticator_type: AuthenticatorType,
    /// Whether the user must be verified.
    #[serde(default)]
    pub user_verification: UserVerification,
    /// Ceremony timeout in milliseconds.
    ///
    /// Forwarded to authenticators that prompt the user. [`SoftwareAuthenticator`] never prompts
    /// and ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Authenticator attachment preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticatorType {
    /// Let the platform decide.
    #[default]
    Auto,
    /// Platform authenticator only.
    Local,
    /// Roaming authenticator (security key, phone) only.
    Roaming,
    /// Either.
    Both,
}

/// User verification requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UserVerification {
    /// The user must be verified.
    Required,
    /// Verify the user if the authenticator can.
    #[default]
    Preferred,
    /// Do not verify the user.
    Discouraged,
}

impl UserVerification {
    /// Whether the authenticator should verify the user.
    #[inline]
    pub const fn is_requested(&self) -> bool {
        !matches!(self, Self::Discouraged)
    }
}

/// The [client data](https://w3c.github.io/webauthn/#dictdef-collectedclientdata) an
/// authenticator signs over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedClientData {
    /// Ceremony type.
    #[serde(rename = "type")]
    pub typ: ClientDataType,
    /// Base64url challenge.
    pub challenge: String,
    /// Origin of the relying party.
    pub origin: String,
    /// Whether the request came from a cross-origin frame.
    pub cross_origin: bool,
}

/// Ceremony type recorded in the client data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientDataType {
    /// Serializes to the string `"webauthn.create"`
    #[serde(rename = "webauthn.create")]
    Create,
    /// Serializes to the string `"webauthn.get"`
    #[serde(rename = "webauthn.get")]
    Get,
}
