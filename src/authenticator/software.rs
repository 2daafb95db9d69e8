use super::{
    AuthenticationResult, Authenticator, AuthenticatorType, CeremonyOptions, ClientDataType,
    CollectedClientData, RegistrationResult,
};
use crate::{
    constants::{AUTH_DATA_FLAGS_UP, AUTH_DATA_FLAGS_UV, COSE_ALG_ES256},
    error::AuthenticatorError,
    serde::base64url,
    signers::P256Key,
};
use alloy::{
    primitives::{B128, B256},
    signers::k256::sha2::{Digest, Sha256},
};
use eyre::WrapErr;
use p256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::Path,
    sync::atomic::{AtomicU32, Ordering},
};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// An in-process ES256 authenticator.
///
/// Produces the same artifacts as a platform authenticator: SPKI public keys on registration, and
/// DER signatures over `authenticatorData || sha256(clientDataJSON)` on authentication. Intended
/// for development chains and tests.
///
/// It acts as a platform authenticator: ceremonies requesting a roaming authenticator are
/// rejected.
#[derive(Debug)]
pub struct SoftwareAuthenticator {
    rp_id: String,
    origin: String,
    credentials: RwLock<BTreeMap<String, SoftwareCredential>>,
    counter: AtomicU32,
}

#[derive(Debug)]
struct SoftwareCredential {
    user_handle: String,
    key: SigningKey,
}

impl P256Key for SoftwareCredential {
    fn signing_key(&self) -> &SigningKey {
        &self.key
    }
}

/// A persisted credential.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeystoreEntry {
    credential_id: String,
    user_handle: String,
    #[serde(with = "crate::serde::base64url")]
    secret_key: Vec<u8>,
}

impl SoftwareAuthenticator {
    /// Creates an authenticator without credentials, bound to a relying party.
    pub fn new(rp_id: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            rp_id: rp_id.into(),
            origin: origin.into(),
            credentials: Default::default(),
            counter: AtomicU32::new(0),
        }
    }

    /// Loads credentials from a JSON keystore. A missing file yields an empty authenticator.
    pub fn load_keystore(
        path: &Path,
        rp_id: impl Into<String>,
        origin: impl Into<String>,
    ) -> eyre::Result<Self> {
        let this = Self::new(rp_id, origin);
        if !path.exists() {
            return Ok(this);
        }

        let entries: Vec<KeystoreEntry> = serde_json::from_slice(
            &std::fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()))?,
        )
        .wrap_err_with(|| format!("malformed keystore {}", path.display()))?;

        let mut credentials = BTreeMap::new();
        for entry in entries {
            let key = SigningKey::from_slice(&entry.secret_key)
                .wrap_err_with(|| format!("invalid key for credential {}", entry.credential_id))?;
            credentials
                .insert(entry.credential_id, SoftwareCredential { user_handle: entry.user_handle, key });
        }

        debug!(path = %path.display(), credentials = credentials.len(), "Loaded keystore");

        Ok(Self { credentials: RwLock::new(credentials), ..this })
    }

    /// Writes all credentials to a JSON keystore, creating parent directories as needed.
    pub async fn save_keystore(&self, path: &Path) -> eyre::Result<()> {
        let entries = self
            .credentials
            .read()
            .await
            .iter()
            .map(|(id, credential)| KeystoreEntry {
                credential_id: id.clone(),
                user_handle: credential.user_handle.clone(),
                secret_key: credential.key.to_bytes().to_vec(),
            })
            .collect::<Vec<_>>();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&entries)?)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;

        debug!(path = %path.display(), credentials = entries.len(), "Saved keystore");

        Ok(())
    }

    /// Ids of all known credentials.
    pub async fn credential_ids(&self) -> Vec<String> {
        self.credentials.read().await.keys().cloned().collect()
    }

    /// `sha256(rpId) || flags || signCount`.
    fn authenticator_data(&self, options: &CeremonyOptions) -> Vec<u8> {
        let mut flags = AUTH_DATA_FLAGS_UP;
        if options.user_verification.is_requested() {
            flags |= AUTH_DATA_FLAGS_UV;
        }
        let counter = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);

        let mut data = Sha256::digest(self.rp_id.as_bytes()).to_vec();
        data.push(flags);
        data.extend_from_slice(&counter.to_be_bytes());
        data
    }
}

#[async_trait::async_trait]
impl Authenticator for SoftwareAuthenticator {
    async fn register(
        &self,
        username: &str,
        user_handle: &str,
        options: &CeremonyOptions,
    ) -> Result<RegistrationResult, AuthenticatorError> {
        ensure_platform(options)?;

        let key = SigningKey::from_slice(B256::random().as_slice())
            .wrap_err("failed to generate credential key")?;
        let credential = SoftwareCredential { user_handle: user_handle.to_string(), key };
        let public_key = credential.public_key_spki()?;
        let credential_id = base64url::encode(B128::random());

        info!(%username, %credential_id, "Created software credential");

        self.credentials.write().await.insert(credential_id.clone(), credential);

        Ok(RegistrationResult {
            credential_id,
            public_key: base64url::encode(public_key),
            algorithm: COSE_ALG_ES256,
        })
    }

    async fn authenticate(
        &self,
        allowed_credentials: &[String],
        challenge: &str,
        options: &CeremonyOptions,
    ) -> Result<AuthenticationResult, AuthenticatorError> {
        ensure_platform(options)?;

        let credentials = self.credentials.read().await;
        let selected = if allowed_credentials.is_empty() {
            credentials.iter().next()
        } else {
            allowed_credentials.iter().find_map(|id| credentials.get_key_value(id))
        };
        let (credential_id, credential) = selected
            .ok_or_else(|| AuthenticatorError::UnknownCredential(allowed_credentials.to_vec()))?;

        let authenticator_data = self.authenticator_data(options);
        let client_data = serde_json::to_vec(&CollectedClientData {
            typ: ClientDataType::Get,
            challenge: challenge.to_string(),
            origin: self.origin.clone(),
            cross_origin: false,
        })
        .map_err(eyre::Error::from)?;

        // SHA256(authenticatorData || SHA256(clientDataJSON))
        let mut hasher = Sha256::new();
        hasher.update(&authenticator_data);
        hasher.update(Sha256::digest(&client_data));
        let digest = hasher.finalize();

        let signature = credential.sign_prehash(&digest)?;

        debug!(%credential_id, %challenge, "Signed assertion");

        Ok(AuthenticationResult {
            credential_id: credential_id.clone(),
            authenticator_data: base64url::encode(authenticator_data),
            client_data: base64url::encode(client_data),
            signature: base64url::encode(signature.to_der()),
        })
    }
}

/// Rejects ceremonies that ask for a roaming authenticator.
fn ensure_platform(options: &CeremonyOptions) -> Result<(), AuthenticatorError> {
    if options.authenticator_type == AuthenticatorType::Roaming {
        return Err(AuthenticatorError::Rejected(
            "no roaming authenticator available, only a platform one".into(),
        ));
    }
    Ok(())
}
