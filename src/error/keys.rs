use thiserror::Error;

/// Errors related to credential public keys.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key blob is not a P-256 public key, or its JWK export lacks EC coordinates.
    #[error("invalid public key")]
    InvalidPublicKey,
    /// A coordinate does not fit into 256 bits.
    #[error("public key coordinate exceeds 32 bytes")]
    CoordinateOverflow,
}
