//! Invocation batching and signing.
//!
//! An invocation pairs a concrete transaction with the authority chain that
//! justifies it (empty chain = the invoker is the root authority). A batch of
//! invocations is signed and applied as one unit, under a `(queue, nonce)`
//! replay-protection pair: each queue is an independent sequence line, and
//! the external executor only accepts a batch whose nonce is that queue's
//! current nonce + 1. This core produces and verifies those tokens; it never
//! adjudicates races between them.

use crate::crypto::{recover_address, PrivateKey, Signature};
use crate::delegation::SignedDelegation;
use crate::error::Result;
use crate::typed_data::{self, ContractInfo};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// The transaction an invocation asks the executor to perform.
///
/// `from` is advisory metadata for the executor; it is not part of the signed
/// encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub to: Address,
    pub gas_limit: U256,
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
}

impl Transaction {
    pub fn new(to: Address, gas_limit: U256, data: Bytes) -> Self {
        Self {
            to,
            gas_limit,
            data,
            from: None,
        }
    }
}

/// Replay protection for a batch: `nonce` must be `queue`'s current nonce + 1
/// to be accepted by the external executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayProtection {
    pub nonce: U256,
    pub queue: U256,
}

impl ReplayProtection {
    pub fn new(queue: u64, nonce: u64) -> Self {
        Self {
            nonce: U256::from(nonce),
            queue: U256::from(queue),
        }
    }
}

/// One transaction under one authority chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub transaction: Transaction,
    /// Full chain from root to the signer of the enclosing batch; empty if
    /// the signer is the root authority itself.
    #[serde(default)]
    pub authority: Vec<SignedDelegation>,
}

impl Invocation {
    /// An invocation with no authority chain attached yet.
    pub fn of(transaction: Transaction) -> Self {
        Self {
            transaction,
            authority: Vec::new(),
        }
    }
}

/// A unit-signed, unit-applied batch of invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocations {
    pub batch: Vec<Invocation>,
    pub replay_protection: ReplayProtection,
}

impl Invocations {
    pub fn new(batch: Vec<Invocation>, replay_protection: ReplayProtection) -> Self {
        Self {
            batch,
            replay_protection,
        }
    }

    /// The domain-separated digest the batch signer commits to.
    pub fn digest(&self, info: &ContractInfo) -> Result<B256> {
        typed_data::digest_of("Invocations", self, info)
    }

    /// Sign the whole batch as one unit.
    pub fn sign(&self, key: &PrivateKey, info: &ContractInfo) -> Result<SignedInvocation> {
        let signature = key.sign_digest(self.digest(info)?)?;
        Ok(SignedInvocation {
            invocations: self.clone(),
            signature,
        })
    }
}

/// A signed invocation batch, ready for submission to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInvocation {
    pub invocations: Invocations,
    pub signature: Signature,
}

impl SignedInvocation {
    /// Recover the address that signed this batch under the given domain.
    pub fn recover_signer(&self, info: &ContractInfo) -> Result<Address> {
        recover_address(self.invocations.digest(info)?, &self.signature)
    }
}
