use alloy::{
    primitives::TxHash,
    providers::PendingTransactionError,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

/// Errors raised while submitting to or reading from the account contract.
///
/// Calls are never retried: each signature is bound to a one-time challenge.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The call could not be built, sent or decoded.
    #[error(transparent)]
    Call(#[from] alloy::contract::Error),
    /// The transaction was sent but its receipt could not be obtained.
    #[error(transparent)]
    Pending(#[from] PendingTransactionError),
    /// The transaction was mined and reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    /// The RPC endpoint serves another chain than the configured one.
    #[error("endpoint serves chain {actual}, expected {expected}")]
    ChainMismatch {
        /// The configured chain id.
        expected: u64,
        /// The chain id reported by the endpoint.
        actual: u64,
    },
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
}
