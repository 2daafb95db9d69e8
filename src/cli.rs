//! # Passkey CLI
use crate::{
    authenticator::{AuthenticatorType, SoftwareAuthenticator, UserVerification},
    client::{PasskeyClient, PasskeySigner},
    config::PasskeyConfig,
    types::{Action, Call, EcPoint, PasskeyAccount, Payload},
    version::{PASSKEY_LONG_VERSION, PASSKEY_SHORT_VERSION},
};
use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use alloy_chains::Chain;
use clap::{Parser, Subcommand};
use eyre::OptionExt;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;
use url::Url;

/// Registers passkeys with a passkey account and signs account actions with them.
#[derive(Debug, Parser)]
#[command(
    author,
    version = PASSKEY_SHORT_VERSION,
    long_version = PASSKEY_LONG_VERSION,
    about = "Passkey",
    long_about = None
)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, a default one will be used and stored in the working directory under
    /// `passkey.yaml`.
    #[arg(long, value_name = "CONFIG", env = "PASSKEY_CONFIG", default_value = "passkey.yaml")]
    pub config: PathBuf,
    /// The RPC endpoint of the chain the account is deployed on.
    #[arg(long, value_name = "RPC_ENDPOINT", env = "PASSKEY_RPC_URL", global = true)]
    pub endpoint: Option<Url>,
    /// The chain the account is deployed on.
    #[arg(long, value_name = "CHAIN", global = true)]
    pub chain: Option<Chain>,
    /// The address of the passkey account contract.
    #[arg(long, value_name = "ADDRESS", global = true)]
    pub account: Option<Address>,
    /// The secret key to sign transactions with.
    #[arg(long, value_name = "SECRET_KEY", env = "PASSKEY_SK", hide_env_values = true)]
    pub private_key: Option<String>,
    /// The software authenticator keystore.
    #[arg(long, value_name = "PATH", global = true)]
    pub keystore: Option<PathBuf>,
    /// The relying party id.
    #[arg(long = "rp-id", value_name = "ID", global = true)]
    pub rp_id: Option<String>,
    /// The relying party origin.
    #[arg(long, value_name = "ORIGIN", global = true)]
    pub origin: Option<String>,
    /// The authenticator attachment to request.
    #[arg(long, value_enum, global = true)]
    pub authenticator_type: Option<AuthenticatorType>,
    /// The user verification requirement.
    #[arg(long, value_enum, global = true)]
    pub user_verification: Option<UserVerification>,
    /// The ceremony timeout.
    #[arg(long, value_name = "MILLIS", global = true)]
    pub timeout: Option<u64>,
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Passkey commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a passkey and register its public key with the account.
    Register {
        /// The user name shown by the authenticator.
        #[arg(long)]
        username: String,
    },
    /// Look up the public key registered for a credential.
    Lookup {
        /// The credential id.
        #[arg(long)]
        credential_id: String,
    },
    /// Mint a token, authorized by a passkey.
    Mint {
        /// The credential id.
        #[arg(long)]
        credential_id: String,
        /// The mint recipient.
        #[arg(long)]
        to: Address,
    },
    /// Execute a call from the account, authorized by a passkey.
    Exec {
        /// The credential id.
        #[arg(long)]
        credential_id: String,
        /// The call to execute.
        #[command(flatten)]
        call: CallArgs,
    },
    /// Print the packed bytes, hash and challenge of an action without signing it.
    #[command(subcommand)]
    Payload(PayloadCommand),
}

/// Offline payload commands.
#[derive(Debug, Clone, Subcommand)]
pub enum PayloadCommand {
    /// A registration binding.
    Register {
        /// The x coordinate of the public key.
        #[arg(long)]
        x: U256,
        /// The y coordinate of the public key.
        #[arg(long)]
        y: U256,
        /// The registration nonce. A random UUID if omitted.
        #[arg(long)]
        nonce: Option<String>,
    },
    /// A mint.
    Mint {
        /// The mint recipient.
        #[arg(long)]
        to: Address,
    },
    /// An account call.
    Exec {
        /// The call to execute.
        #[command(flatten)]
        call: CallArgs,
    },
}

/// A call performed by the account.
#[derive(Debug, Clone, clap::Args)]
pub struct CallArgs {
    /// The call target.
    #[arg(long)]
    pub to: Address,
    /// The native value to send.
    #[arg(long, default_value = "0")]
    pub value: U256,
    /// The calldata, hex encoded.
    #[arg(long, default_value = "0x")]
    pub data: Bytes,
}

impl PayloadCommand {
    /// The action this command describes.
    pub fn into_action(self) -> Action {
        match self {
            Self::Register { x, y, nonce: Some(nonce) } => {
                Action::Register { public_key: EcPoint::new(x, y), nonce }
            }
            Self::Register { x, y, nonce: None } => Action::register(EcPoint::new(x, y)),
            Self::Mint { to } => Action::Mint { recipient: to },
            Self::Exec { call } => Action::Exec(call.into()),
        }
    }
}

impl From<CallArgs> for Call {
    fn from(args: CallArgs) -> Self {
        Self::new(args.to, args.value, args.data)
    }
}

impl Args {
    /// Run the command.
    pub async fn run(self) -> eyre::Result<()> {
        if let Command::Payload(command) = &self.command {
            let action = command.clone().into_action();
            print_payload(&action, &action.payload());
            return Ok(());
        }

        let config = if !self.config.exists() {
            let config = self.merge_config(PasskeyConfig::default());
            config.save_to_file(&self.config)?;
            info!(path = %self.config.display(), "Wrote default config");
            config
        } else {
            self.merge_config(PasskeyConfig::load_from_file(&self.config)?)
        };

        match self.command {
            Command::Lookup { credential_id } => {
                let provider = ProviderBuilder::new()
                    .connect_http(config.chain.endpoint.clone())
                    .erased();
                let account = PasskeyAccount::new(config.account, provider);
                account.ensure_chain(config.chain.chain.id()).await?;

                match account.public_key(&credential_id).await? {
                    Some(credential) => {
                        println!("credential: {}", credential.credential_id);
                        println!("x:          {}", credential.public_key.x);
                        println!("y:          {}", credential.public_key.y);
                    }
                    None => println!("credential {credential_id} is not registered"),
                }
            }
            command => {
                let signer: PrivateKeySigner = self
                    .private_key
                    .as_deref()
                    .ok_or_eyre("a transaction signer key is required, set --private-key")?
                    .parse()?;
                info!(signer = %signer.address(), account = %config.account, "Using transaction signer");

                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(config.chain.endpoint.clone())
                    .erased();
                let authenticator = Arc::new(SoftwareAuthenticator::load_keystore(
                    &config.keystore,
                    config.relying_party.id.clone(),
                    config.relying_party.origin.clone(),
                )?);
                let client = PasskeyClient::new(
                    PasskeySigner::new(authenticator.clone(), config.ceremony),
                    PasskeyAccount::new(config.account, provider),
                    config.chain.chain.id(),
                );

                let result = run_signed(&client, command, &config.keystore).await;
                authenticator.save_keystore(&config.keystore).await?;
                result?;
            }
        }

        Ok(())
    }

    /// Merges [`Args`] values into an existing [`PasskeyConfig`] instance.
    pub fn merge_config(&self, config: PasskeyConfig) -> PasskeyConfig {
        config
            .with_chain(self.chain)
            .with_endpoint(self.endpoint.clone())
            .with_account(self.account)
            .with_keystore(self.keystore.clone())
            .with_rp_id(self.rp_id.clone())
            .with_origin(self.origin.clone())
            .with_authenticator_type(self.authenticator_type)
            .with_user_verification(self.user_verification)
            .with_timeout(self.timeout)
    }
}

/// Runs a command that needs a passkey signature and a transaction.
///
/// A new credential is written to `keystore` before its public key is submitted.
async fn run_signed(
    client: &PasskeyClient<Arc<SoftwareAuthenticator>, DynProvider>,
    command: Command,
    keystore: &Path,
) -> eyre::Result<()> {
    match command {
        Command::Register { username } => {
            let registration = client.signer().register(&username).await?;
            client.signer().authenticator().save_keystore(keystore).await?;

            let tx_hash = client.submit_registration(&registration).await?;
            let credential = registration.credential;
            println!("credential: {}", credential.credential_id);
            println!("x:          {}", credential.public_key.x);
            println!("y:          {}", credential.public_key.y);
            println!("tx:         {tx_hash}");
        }
        Command::Mint { credential_id, to } => {
            let tx_hash = client.mint(&credential_id, to).await?;
            println!("tx: {tx_hash}");
        }
        Command::Exec { credential_id, call } => {
            let tx_hash = client.exec(&credential_id, call.into()).await?;
            println!("tx: {tx_hash}");
        }
        Command::Lookup { .. } | Command::Payload(_) => {
            eyre::bail!("command does not need a signature")
        }
    }
    Ok(())
}

fn print_payload(action: &Action, payload: &Payload) {
    println!("action:    {}", action.kind());
    println!("packed:    {}", payload.packed());
    println!("hash:      {}", payload.hash());
    println!("challenge: {}", payload.challenge());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticator::CeremonyOptions;
    use alloy::providers::mock::Asserter;

    #[test]
    fn parses_exec_with_defaults() {
        let args = Args::parse_from([
            "passkey",
            "exec",
            "--credential-id",
            "abc",
            "--to",
            "0x00000000000000000000000000000000000000aa",
        ]);

        let Command::Exec { credential_id, call } = args.command else { panic!("expected exec") };
        assert_eq!(credential_id, "abc");
        assert_eq!(call.value, U256::ZERO);
        assert!(call.data.is_empty());
    }

    #[test]
    fn merges_overrides_over_file_config() {
        let args = Args::parse_from([
            "passkey",
            "--chain",
            "31337",
            "--user-verification",
            "discouraged",
            "lookup",
            "--credential-id",
            "abc",
        ]);
        let config = args.merge_config(PasskeyConfig::default());

        assert_eq!(config.chain.chain.id(), 31337);
        assert_eq!(config.ceremony.user_verification, UserVerification::Discouraged);
        assert_eq!(config.chain.endpoint, PasskeyConfig::default().chain.endpoint);
    }

    #[test]
    fn payload_register_with_nonce() {
        let args =
            Args::parse_from(["passkey", "payload", "register", "--x", "1", "--y", "2", "--nonce", "n"]);
        let Command::Payload(PayloadCommand::Register { x, y, nonce }) = args.command else {
            panic!("expected payload register")
        };
        assert_eq!((x, y, nonce.as_deref()), (U256::from(1), U256::from(2), Some("n")));
    }

    #[tokio::test]
    async fn payload_command_does_not_write_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("passkey.yaml");
        let args = Args::parse_from([
            "passkey",
            "--config",
            config.to_str().unwrap(),
            "payload",
            "mint",
            "--to",
            "0x00000000000000000000000000000000000000aa",
        ]);

        args.run().await.unwrap();
        assert!(!config.exists());
    }

    #[tokio::test]
    async fn credential_is_kept_when_submission_fails() {
        let dir = tempfile::tempdir().unwrap();
        let keystore = dir.path().join("keystore.json");

        // no responses are queued, so submitting the registration fails
        let provider = ProviderBuilder::new().connect_mocked_client(Asserter::new()).erased();
        let authenticator =
            Arc::new(SoftwareAuthenticator::new("localhost", "http://localhost:3000"));
        let client = PasskeyClient::new(
            PasskeySigner::new(authenticator.clone(), CeremonyOptions::default()),
            PasskeyAccount::new(Address::repeat_byte(0x11), provider),
            80001,
        );

        let _ = run_signed(&client, Command::Register { username: "alice".into() }, &keystore)
            .await
            .unwrap_err();

        let reloaded =
            SoftwareAuthenticator::load_keystore(&keystore, "localhost", "http://localhost:3000")
                .unwrap();
        assert_eq!(reloaded.credential_ids().await, authenticator.credential_ids().await);
        assert_eq!(reloaded.credential_ids().await.len(), 1);
    }

    #[test]
    fn payload_register_defaults_to_random_nonce() {
        let command = PayloadCommand::Register { x: U256::from(1), y: U256::from(2), nonce: None };
        let Action::Register { nonce, .. } = command.into_action() else {
            panic!("expected register")
        };
        assert_eq!(nonce.len(), 36);
    }
}
