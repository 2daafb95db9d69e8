use thiserror::Error;

/// Errors related to authenticator assertions.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// A binary field was not valid base64url.
    #[error("invalid base64url encoding: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The DER `ECDSA-Sig-Value` could not be parsed.
    #[error("malformed signature: {0}")]
    MalformedSignature(&'static str),
    /// The client data is not UTF-8 text.
    #[error("client data is not valid UTF-8")]
    InvalidClientData(#[from] std::str::Utf8Error),
    /// The signature does not verify under the credential's public key.
    #[error("signature by credential {0} does not verify under its public key")]
    VerificationFailed(String),
    /// The challenge does not occur in the client data.
    #[error("challenge {0:?} not found in client data")]
    ChallengeNotFound(String),
}
