//! Error types for delegatable-core.
//!
//! Chain-validation failures (`SignerMismatch`, `AuthorityChainBroken`) are
//! first-class outcomes a caller evaluating an untrusted chain is expected to
//! branch on. Everything else represents malformed input or construction-time
//! misuse and should be corrected at the call site; nothing is retried
//! internally.

use alloy_primitives::{Address, B256};
use thiserror::Error;

/// Result type alias for delegatable operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in delegatable operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// A message value does not match its declared typed-data schema
    /// (wrong arity, non-hex string, wrong byte length for a fixed-size type).
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Private key is not exactly 32 bytes after hex decoding, or is not a
    /// valid curve scalar.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Signature bytes are malformed (wrong length, unknown recovery byte).
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Cryptographic operation failed.
    #[error("cryptographic error: {0}")]
    Crypto(String),

    /// A chain link was signed by a key other than the previous link's
    /// delegate.
    #[error("delegation {index} signed by {actual}, expected signer {expected}")]
    SignerMismatch {
        index: usize,
        expected: Address,
        actual: Address,
    },

    /// A chain link's authority field does not equal the hash of the link it
    /// claims to extend.
    #[error("delegation {index} authority {actual} does not match prior link hash {expected}")]
    AuthorityChainBroken {
        index: usize,
        expected: B256,
        actual: B256,
    },

    /// An invitation with no signed delegations and no key has no authority
    /// to validate.
    #[error("invitation carries no signed delegations and no key")]
    EmptyChain,

    /// Chain exceeds the protocol-level length cap.
    #[error("chain length {length} exceeds maximum {max}")]
    ChainTooLong { length: usize, max: usize },

    /// Membership construction without a resolvable signing key.
    #[error("either a key or a keyed invitation is required")]
    MissingCredentials,

    /// Membership construction without a verifying contract.
    #[error("contract info with a verifying contract is required")]
    MissingContractInfo,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Serialized payload exceeds the decode size cap.
    #[error("payload size {size} bytes exceeds maximum {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },
}

impl Error {
    /// Whether this error is a chain-of-custody violation, as opposed to
    /// malformed input or API misuse.
    ///
    /// Callers evaluating an untrusted invitation branch on this to
    /// distinguish "invalid chain" from "could not even attempt validation".
    pub fn is_chain_violation(&self) -> bool {
        matches!(
            self,
            Self::SignerMismatch { .. }
                | Self::AuthorityChainBroken { .. }
                | Self::EmptyChain
                | Self::ChainTooLong { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<k256::ecdsa::Error> for Error {
    fn from(e: k256::ecdsa::Error) -> Self {
        Error::Crypto(e.to_string())
    }
}
