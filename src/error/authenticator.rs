use thiserror::Error;

/// Errors raised by an authenticator ceremony.
///
/// These are not recoverable locally: retrying means running the ceremony again.
#[derive(Debug, Error)]
pub enum AuthenticatorError {
    /// The user cancelled or the authenticator refused the ceremony.
    #[error("authenticator rejected the ceremony: {0}")]
    Rejected(String),
    /// None of the allowed credentials is known to the authenticator.
    #[error("no credential matching {0:?}")]
    UnknownCredential(Vec<String>),
    /// The authenticator failed internally.
    #[error(transparent)]
    Internal(#[from] eyre::Error),
}
