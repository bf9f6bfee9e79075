//! Revocation intents.
//!
//! A delegator voids an outstanding delegation by signing an
//! `IntentionToRevoke` naming the link's hash — the same
//! `structHash("SignedDelegation", link)` the chain builder and validator
//! compute. The external executor marks that hash (and everything chained
//! from it) invalid for future invocations; nothing in this core tracks
//! revocation state.

use crate::crypto::{recover_address, PrivateKey, Signature};
use crate::error::Result;
use crate::invitation::Invitation;
use crate::typed_data::{self, ContractInfo};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A statement that the delegation with the named hash should be voided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentionToRevoke {
    pub delegation_hash: B256,
}

impl IntentionToRevoke {
    pub fn new(delegation_hash: B256) -> Self {
        Self { delegation_hash }
    }

    /// An intent naming the LAST link of the given invitation — the link the
    /// holder of `invitation` was granted.
    ///
    /// Only meaningful when the eventual signer is the delegator of that
    /// link; the executor checks that, not this core.
    pub fn for_invitation(invitation: &Invitation) -> Result<Self> {
        let last = invitation
            .last()
            .ok_or(crate::error::Error::EmptyChain)?;
        Ok(Self {
            delegation_hash: last.hash()?,
        })
    }

    /// The domain-separated digest the delegator commits to.
    pub fn digest(&self, info: &ContractInfo) -> Result<B256> {
        typed_data::digest_of("IntentionToRevoke", self, info)
    }

    /// Sign the intent under the given contract domain.
    pub fn sign(&self, key: &PrivateKey, info: &ContractInfo) -> Result<SignedIntentionToRevoke> {
        let signature = key.sign_digest(self.digest(info)?)?;
        Ok(SignedIntentionToRevoke {
            intention_to_revoke: *self,
            signature,
        })
    }
}

/// A signed revocation intent, ready for submission to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIntentionToRevoke {
    pub intention_to_revoke: IntentionToRevoke,
    pub signature: Signature,
}

impl SignedIntentionToRevoke {
    /// Recover the address that signed this intent under the given domain.
    pub fn recover_signer(&self, info: &ContractInfo) -> Result<Address> {
        recover_address(self.intention_to_revoke.digest(info)?, &self.signature)
    }
}
