//! Action payloads and the WebAuthn challenges derived from them.
//!
//! Every authorized action is bound to a challenge: the fields the contract will re-derive are
//! tightly packed (`abi.encodePacked`), hashed with Keccak-256, and the hash is sent to the
//! authenticator as unpadded base64url.

use super::{Call, EcPoint};
use crate::serde::base64url;
use alloy::{
    primitives::{Address, B256, Bytes, keccak256},
    sol_types::SolValue,
};
use std::fmt;

/// An action that needs a passkey signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Binds a credential public key to the account.
    ///
    /// Packed as `(uint256 pubX, uint256 pubY, string nonce)`.
    Register {
        /// The credential's public key.
        public_key: EcPoint,
        /// One-time nonce, a UUID string.
        nonce: String,
    },
    /// Mints a token to `recipient`.
    ///
    /// Packed as `(address recipient)`.
    Mint {
        /// The mint recipient.
        recipient: Address,
    },
    /// Executes an arbitrary call from the account.
    ///
    /// Packed as `(address target, uint256 value, bytes data)`.
    Exec(Call),
}

impl Action {
    /// A registration binding with a fresh random nonce.
    pub fn register(public_key: EcPoint) -> Self {
        Self::Register { public_key, nonce: uuid::Uuid::new_v4().to_string() }
    }

    /// The packed encoding the contract hashes for this action.
    pub fn encode_packed(&self) -> Vec<u8> {
        match self {
            Self::Register { public_key, nonce } => {
                (public_key.x, public_key.y, nonce.clone()).abi_encode_packed()
            }
            Self::Mint { recipient } => recipient.abi_encode_packed(),
            Self::Exec(call) => {
                (call.target, call.value, call.data.clone()).abi_encode_packed()
            }
        }
    }

    /// Builds the payload for this action.
    pub fn payload(&self) -> Payload {
        Payload::new(self.encode_packed())
    }

    /// The action's name, as used in logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Mint { .. } => "mint",
            Self::Exec(_) => "exec",
        }
    }
}

/// Packed action bytes together with their hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    packed: Bytes,
    hash: B256,
}

impl Payload {
    /// Hashes `packed` into a payload.
    pub fn new(packed: impl Into<Bytes>) -> Self {
        let packed = packed.into();
        let hash = keccak256(&packed);
        Self { packed, hash }
    }

    /// The packed bytes.
    pub fn packed(&self) -> &Bytes {
        &self.packed
    }

    /// The Keccak-256 hash of the packed bytes.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// The WebAuthn challenge: the hash as unpadded base64url.
    pub fn challenge(&self) -> String {
        base64url::encode(self.hash)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hash)
    }
}
