//! Bindings for the passkey account contract.

use super::{Credential, EcPoint};
use crate::error::ContractError;
use IPasskeyAccount::IPasskeyAccountInstance;
use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{PendingTransactionBuilder, Provider},
    sol,
};
use tracing::{debug, info};

sol! {
    /// A call the account performs on behalf of the passkey holder.
    #[derive(Debug, PartialEq, Eq)]
    struct Call {
        /// The call target.
        address target;
        /// Amount of native value to send to the target.
        uint256 value;
        /// The calldata bytes.
        bytes data;
    }

    /// Account contract that authorizes actions with WebAuthn P-256 signatures.
    ///
    /// Every `signature` argument is a [`crate::types::WebAuthnSignature`] encoding.
    #[sol(rpc)]
    #[derive(Debug)]
    contract IPasskeyAccount {
        /// A registered credential public key.
        #[derive(PartialEq, Eq)]
        struct PublicKey {
            string credentialId;
            uint256 pubX;
            uint256 pubY;
        }

        /// Registers a credential public key.
        ///
        /// Authorized by a signature over `abi.encodePacked(pubX, pubY, nonce)`.
        function setPublicKey(
            string calldata credentialId,
            uint256 pubX,
            uint256 pubY,
            string calldata nonce,
            bytes calldata signature
        ) external;

        /// Returns the public key registered for `credentialId`, `(0, 0)` if there is none.
        function publicKey(string calldata credentialId) external view returns (PublicKey memory);

        /// Mints a token to `recipient`.
        ///
        /// Authorized by a signature over `abi.encodePacked(recipient)`.
        function mint(string calldata credentialId, address recipient, bytes calldata signature)
            external;

        /// Executes `call` from the account.
        ///
        /// Authorized by a signature over `abi.encodePacked(target, value, data)`.
        function exec(Call calldata call, bytes calldata signature) external payable;
    }
}

impl Call {
    /// Creates a new call.
    pub const fn new(target: Address, value: U256, data: Bytes) -> Self {
        Self { target, value, data }
    }

    /// A plain value transfer to `target`.
    pub const fn transfer(target: Address, value: U256) -> Self {
        Self { target, value, data: Bytes::new() }
    }
}

impl IPasskeyAccount::PublicKey {
    /// Converts the lookup result into a credential, `None` for the `(0, 0)` marker.
    pub fn into_credential(self) -> Option<Credential> {
        let point = EcPoint::new(self.pubX, self.pubY);
        (!point.is_zero()).then(|| Credential::new(self.credentialId, point))
    }
}

/// A deployed passkey account.
#[derive(Debug, Clone)]
pub struct PasskeyAccount<P: Provider> {
    contract: IPasskeyAccountInstance<P>,
}

impl<P: Provider> PasskeyAccount<P> {
    /// Create a new instance of [`PasskeyAccount`].
    pub fn new(address: Address, provider: P) -> Self {
        Self { contract: IPasskeyAccountInstance::new(address, provider) }
    }

    /// Returns the address of the account.
    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Fails unless the provider serves `chain_id`.
    pub async fn ensure_chain(&self, chain_id: u64) -> Result<(), ContractError> {
        let actual = self.contract.provider().get_chain_id().await?;
        if actual != chain_id {
            return Err(ContractError::ChainMismatch { expected: chain_id, actual });
        }
        Ok(())
    }

    /// Looks up the public key registered for `credential_id`.
    ///
    /// Returns `None` if the credential is not registered.
    pub async fn public_key(&self, credential_id: &str) -> Result<Option<Credential>, ContractError> {
        debug!(account = %self.address(), %credential_id, "Fetching public key");

        let key = self.contract.publicKey(credential_id.to_string()).call().await?;
        Ok(key.into_credential())
    }

    /// Registers `credential` with a signature over its registration binding.
    pub async fn set_public_key(
        &self,
        credential: &Credential,
        nonce: &str,
        signature: Bytes,
    ) -> Result<TxHash, ContractError> {
        let pending = self
            .contract
            .setPublicKey(
                credential.credential_id.clone(),
                credential.public_key.x,
                credential.public_key.y,
                nonce.to_string(),
                signature,
            )
            .send()
            .await?;
        Self::confirm("setPublicKey", pending).await
    }

    /// Mints to `recipient`, authorized by `credential_id`.
    pub async fn mint(
        &self,
        credential_id: &str,
        recipient: Address,
        signature: Bytes,
    ) -> Result<TxHash, ContractError> {
        let pending =
            self.contract.mint(credential_id.to_string(), recipient, signature).send().await?;
        Self::confirm("mint", pending).await
    }

    /// Executes `call` from the account.
    pub async fn exec(&self, call: Call, signature: Bytes) -> Result<TxHash, ContractError> {
        let pending = self.contract.exec(call, signature).send().await?;
        Self::confirm("exec", pending).await
    }

    /// Waits for the receipt and fails if the transaction reverted.
    async fn confirm(
        method: &'static str,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TxHash, ContractError> {
        let tx_hash = *pending.tx_hash();
        debug!(method, %tx_hash, "Submitted transaction");

        let receipt = pending.get_receipt().await?;
        if !ReceiptResponse::status(&receipt) {
            return Err(ContractError::Reverted(tx_hash));
        }

        info!(method, %tx_hash, block = ?receipt.block_number, "Transaction confirmed");
        Ok(tx_hash)
    }
}
