//! Passkey account configuration.
use crate::{
    authenticator::{AuthenticatorType, CeremonyOptions, UserVerification},
    constants::{
        DEFAULT_CHAIN_ID, DEFAULT_KEYSTORE, DEFAULT_ORIGIN, DEFAULT_RP_ID, DEFAULT_RPC_ENDPOINT,
    },
};
use alloy::primitives::Address;
use alloy_chains::Chain;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Passkey account configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasskeyConfig {
    /// Chain configuration.
    #[serde(default)]
    pub chain: ChainConfig,
    /// Passkey account contract address.
    #[serde(default)]
    pub account: Address,
    /// Relying party the software authenticator signs for.
    #[serde(default)]
    pub relying_party: RelyingPartyConfig,
    /// Default ceremony options.
    #[serde(default)]
    pub ceremony: CeremonyOptions,
    /// Path of the software authenticator keystore.
    #[serde(default = "default_keystore")]
    pub keystore: PathBuf,
}

impl Default for PasskeyConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            account: Address::ZERO,
            relying_party: RelyingPartyConfig::default(),
            ceremony: CeremonyOptions::default(),
            keystore: default_keystore(),
        }
    }
}

impl PasskeyConfig {
    /// Sets the chain.
    pub fn with_chain(mut self, chain: Option<Chain>) -> Self {
        if let Some(chain) = chain {
            self.chain.chain = chain;
        }
        self
    }

    /// Sets the RPC endpoint.
    pub fn with_endpoint(mut self, endpoint: Option<Url>) -> Self {
        if let Some(endpoint) = endpoint {
            self.chain.endpoint = endpoint;
        }
        self
    }

    /// Sets the passkey account address.
    pub fn with_account(mut self, account: Option<Address>) -> Self {
        if let Some(account) = account {
            self.account = account;
        }
        self
    }

    /// Sets the relying party id.
    pub fn with_rp_id(mut self, id: Option<String>) -> Self {
        if let Some(id) = id {
            self.relying_party.id = id;
        }
        self
    }

    /// Sets the relying party origin.
    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        if let Some(origin) = origin {
            self.relying_party.origin = origin;
        }
        self
    }

    /// Sets the authenticator type requested in ceremonies.
    pub fn with_authenticator_type(mut self, authenticator_type: Option<AuthenticatorType>) -> Self {
        if let Some(authenticator_type) = authenticator_type {
            self.ceremony.authenticator_type = authenticator_type;
        }
        self
    }

    /// Sets the user verification requirement.
    pub fn with_user_verification(mut self, user_verification: Option<UserVerification>) -> Self {
        if let Some(user_verification) = user_verification {
            self.ceremony.user_verification = user_verification;
        }
        self
    }

    /// Sets the ceremony timeout in milliseconds.
    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.ceremony.timeout = timeout.or(self.ceremony.timeout);
        self
    }

    /// Sets the keystore path.
    pub fn with_keystore(mut self, keystore: Option<PathBuf>) -> Self {
        if let Some(keystore) = keystore {
            self.keystore = keystore;
        }
        self
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Chain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// The chain the account is deployed on.
    pub chain: Chain,
    /// The RPC endpoint of the chain.
    pub endpoint: Url,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain: Chain::from_id(DEFAULT_CHAIN_ID),
            endpoint: DEFAULT_RPC_ENDPOINT.parse().expect("valid default endpoint"),
        }
    }
}

/// Relying party configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingPartyConfig {
    /// Relying party id, usually the domain.
    pub id: String,
    /// Origin recorded in client data.
    pub origin: String,
}

impl Default for RelyingPartyConfig {
    fn default() -> Self {
        Self { id: DEFAULT_RP_ID.to_string(), origin: DEFAULT_ORIGIN.to_string() }
    }
}

fn default_keystore() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(DEFAULT_KEYSTORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn defaults_to_mumbai() {
        let config = PasskeyConfig::default();
        assert_eq!(config.chain.chain.id(), 80001);
        assert_eq!(config.chain.endpoint.as_str(), "http://localhost:8545/");
        assert_eq!(config.ceremony.user_verification, UserVerification::Preferred);
        assert!(config.keystore.ends_with("keystore.json"));
    }

    #[test]
    fn yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passkey.yaml");

        let config = PasskeyConfig::default()
            .with_chain(Some(Chain::from_id(31337)))
            .with_endpoint(Some("http://127.0.0.1:9545".parse().unwrap()))
            .with_account(Some(address!("0x5fbdb2315678afecb367f032d93f642f64180aa3")))
            .with_origin(Some("https://example.com".into()))
            .with_rp_id(Some("example.com".into()))
            .with_user_verification(Some(UserVerification::Required))
            .with_timeout(Some(60_000))
            .with_keystore(Some(dir.path().join("keystore.json")));
        config.save_to_file(&path).unwrap();

        assert_eq!(PasskeyConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config: PasskeyConfig =
            serde_yaml::from_str("account: \"0x5fbdb2315678afecb367f032d93f642f64180aa3\"\n")
                .unwrap();
        assert_eq!(config.chain, ChainConfig::default());
        assert_eq!(config.relying_party, RelyingPartyConfig::default());
    }

    #[test]
    fn unset_overrides_keep_values() {
        let config = PasskeyConfig::default().with_timeout(Some(1_000));
        let merged = config.clone().with_chain(None).with_account(None).with_timeout(None);
        assert_eq!(merged, config);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PasskeyConfig::load_from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
