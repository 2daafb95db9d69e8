//! Passkey signing flows and the account client built on top of them.

use crate::{
    authenticator::{Authenticator, CeremonyOptions},
    error::{PasskeyError, SignatureError},
    types::{Action, Call, Credential, PasskeyAccount, Payload, WebAuthnSignature},
};
use alloy::{
    primitives::{Address, TxHash},
    providers::Provider,
};
use tracing::{debug, info, instrument};

/// A payload signed by a passkey, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// The credential that signed.
    pub credential_id: String,
    /// The signed payload.
    pub payload: Payload,
    /// The contract-facing signature.
    pub signature: WebAuthnSignature,
}

/// A freshly created credential together with its signed registration binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The new credential.
    pub credential: Credential,
    /// The registration nonce.
    pub nonce: String,
    /// Signature over `(pubX, pubY, nonce)`.
    pub signed: SignedPayload,
}

/// Signs account actions with an [`Authenticator`].
#[derive(Debug, Clone)]
pub struct PasskeySigner<A> {
    authenticator: A,
    options: CeremonyOptions,
}

impl<A: Authenticator> PasskeySigner<A> {
    /// Creates a signer that runs ceremonies with `options`.
    pub const fn new(authenticator: A, options: CeremonyOptions) -> Self {
        Self { authenticator, options }
    }

    /// Returns the underlying authenticator.
    pub const fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Creates a credential for `username` and signs its registration binding with it.
    ///
    /// Fails if the binding signature does not verify under the extracted public key, since the
    /// contract would reject it.
    pub async fn register(&self, username: &str) -> Result<Registration, PasskeyError> {
        let user_handle = uuid::Uuid::new_v4().to_string();
        let result = self.authenticator.register(username, &user_handle, &self.options).await?;
        let credential = Credential::from_registration(&result)?;

        debug!(
            credential_id = %credential.credential_id,
            x = %credential.public_key.x,
            y = %credential.public_key.y,
            "Extracted credential public key"
        );

        let nonce = uuid::Uuid::new_v4().to_string();
        let action = Action::Register { public_key: credential.public_key, nonce: nonce.clone() };

        let signed = self.sign(&action, &[credential.credential_id.clone()]).await?;
        if !signed.signature.verify(&signed.payload.challenge(), &credential.public_key) {
            return Err(SignatureError::VerificationFailed(credential.credential_id).into());
        }

        Ok(Registration { credential, nonce, signed })
    }

    /// Signs `action` with one of `allowed_credentials`, any credential if empty.
    pub async fn sign(
        &self,
        action: &Action,
        allowed_credentials: &[String],
    ) -> Result<SignedPayload, PasskeyError> {
        let payload = action.payload();
        let challenge = payload.challenge();

        debug!(action = action.kind(), hash = %payload.hash(), %challenge, "Requesting assertion");

        let assertion =
            self.authenticator.authenticate(allowed_credentials, &challenge, &self.options).await?;
        let signature = WebAuthnSignature::from_assertion(&assertion, &challenge)?;

        Ok(SignedPayload { credential_id: assertion.credential_id, payload, signature })
    }
}

/// User-level passkey account flows: sign with the authenticator, submit to the account.
#[derive(Debug)]
pub struct PasskeyClient<A, P: Provider> {
    signer: PasskeySigner<A>,
    account: PasskeyAccount<P>,
    chain_id: u64,
}

impl<A: Authenticator, P: Provider> PasskeyClient<A, P> {
    /// Creates a client for the account on `chain_id`.
    pub const fn new(signer: PasskeySigner<A>, account: PasskeyAccount<P>, chain_id: u64) -> Self {
        Self { signer, account, chain_id }
    }

    /// Returns the signer.
    pub const fn signer(&self) -> &PasskeySigner<A> {
        &self.signer
    }

    /// Returns the account.
    pub const fn account(&self) -> &PasskeyAccount<P> {
        &self.account
    }

    /// Creates a passkey and registers its public key with the account.
    ///
    /// The chain is only contacted once the credential's public key has been extracted and its
    /// binding signed.
    #[instrument(skip(self))]
    pub async fn register(&self, username: &str) -> Result<(Credential, TxHash), PasskeyError> {
        let registration = self.signer.register(username).await?;
        let tx_hash = self.submit_registration(&registration).await?;
        Ok((registration.credential, tx_hash))
    }

    /// Submits a signed registration binding produced by [`PasskeySigner::register`].
    #[instrument(skip_all, fields(credential_id = %registration.credential.credential_id))]
    pub async fn submit_registration(
        &self,
        registration: &Registration,
    ) -> Result<TxHash, PasskeyError> {
        self.account.ensure_chain(self.chain_id).await?;

        let tx_hash = self
            .account
            .set_public_key(
                &registration.credential,
                &registration.nonce,
                registration.signed.signature.encode(),
            )
            .await?;

        info!(credential_id = %registration.credential.credential_id, %tx_hash, "Registered passkey");
        Ok(tx_hash)
    }

    /// Looks up the public key registered for `credential_id`.
    #[instrument(skip(self))]
    pub async fn lookup(&self, credential_id: &str) -> Result<Option<Credential>, PasskeyError> {
        Ok(self.account.public_key(credential_id).await?)
    }

    /// Mints to `recipient`, authorized by the passkey `credential_id`.
    #[instrument(skip(self))]
    pub async fn mint(
        &self,
        credential_id: &str,
        recipient: Address,
    ) -> Result<TxHash, PasskeyError> {
        self.account.ensure_chain(self.chain_id).await?;
        let signed =
            self.signer.sign(&Action::Mint { recipient }, &[credential_id.to_string()]).await?;

        Ok(self.account.mint(&signed.credential_id, recipient, signed.signature.encode()).await?)
    }

    /// Executes `call` from the account, authorized by the passkey `credential_id`.
    #[instrument(skip(self, call), fields(target = %call.target, value = %call.value))]
    pub async fn exec(&self, credential_id: &str, call: Call) -> Result<TxHash, PasskeyError> {
        self.account.ensure_chain(self.chain_id).await?;
        let signed =
            self.signer.sign(&Action::Exec(call.clone()), &[credential_id.to_string()]).await?;

        Ok(self.account.exec(call, signed.signature.encode()).await?)
    }
}
