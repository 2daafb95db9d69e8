//! Passkey account error types.
use thiserror::Error;

mod authenticator;
pub use authenticator::AuthenticatorError;

mod contracts;
pub use contracts::ContractError;

mod keys;
pub use keys::KeyError;

mod signature;
pub use signature::SignatureError;

/// The overarching error type returned by passkey flows.
#[derive(Debug, Error)]
pub enum PasskeyError {
    /// Errors related to credential public keys.
    #[error(transparent)]
    Key(#[from] KeyError),
    /// Errors related to authenticator signatures and client data.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// The authenticator rejected or failed the ceremony.
    #[error(transparent)]
    Authenticator(#[from] AuthenticatorError),
    /// Submitting to or reading from the account contract failed.
    #[error(transparent)]
    Contract(#[from] ContractError),
    /// An error occurred during ABI encoding/decoding.
    #[error(transparent)]
    AbiError(#[from] alloy::sol_types::Error),
    /// An internal error occurred.
    #[error(transparent)]
    InternalError(#[from] eyre::Error),
}

impl PasskeyError {
    /// Whether the error was raised by the authenticator ceremony.
    pub fn is_authenticator_rejected(&self) -> bool {
        matches!(self, Self::Authenticator(_))
    }

    /// Whether the error was raised while talking to the account contract.
    pub fn is_contract_call_failed(&self) -> bool {
        matches!(self, Self::Contract(_))
    }
}
