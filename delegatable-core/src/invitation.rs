//! Invitations: portable authority chains.
//!
//! An invitation bundles an ordered chain of signed delegations — index 0
//! signed by the root, each later entry extending the hash of the previous —
//! with, optionally, the private key needed to exercise the terminal
//! authority. The two shapes are distinct variants rather than one struct
//! with an optional field meaning different things in different call paths:
//!
//! - [`Invitation::Keyed`]: a self-custody hand-off; the builder generated a
//!   keypair on the delegate's behalf and the bundle carries it.
//! - [`Invitation::Keyless`]: a delegation to a known external address; the
//!   recipient already holds their own key.
//!
//! Building is cheap and unchecked: the builder signs with whatever key it
//! is given and never verifies that the signer matches the chain tail's
//! delegate. [`crate::chain::validate_invitation`] is the only path to a
//! trusted chain.

use crate::crypto::PrivateKey;
use crate::delegation::{Caveat, DelegationDraft, SignedDelegation};
use crate::error::{Error, Result};
use crate::typed_data::ContractInfo;
use crate::ROOT_AUTHORITY;
use alloy_primitives::{Address, B256};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A chain of signed delegations, optionally with the terminal delegate's
/// private key.
#[derive(Debug, Clone)]
pub enum Invitation {
    /// Chain plus the delegate key generated on the recipient's behalf.
    Keyed {
        signed_delegations: Vec<SignedDelegation>,
        key: PrivateKey,
    },
    /// Chain delegating to an address whose key the recipient holds
    /// themselves.
    Keyless {
        signed_delegations: Vec<SignedDelegation>,
    },
}

impl Invitation {
    pub fn keyed(signed_delegations: Vec<SignedDelegation>, key: PrivateKey) -> Self {
        Self::Keyed {
            signed_delegations,
            key,
        }
    }

    pub fn keyless(signed_delegations: Vec<SignedDelegation>) -> Self {
        Self::Keyless { signed_delegations }
    }

    /// The chain, in authority order.
    pub fn signed_delegations(&self) -> &[SignedDelegation] {
        match self {
            Self::Keyed {
                signed_delegations, ..
            }
            | Self::Keyless { signed_delegations } => signed_delegations,
        }
    }

    /// The carried delegate key, if any.
    pub fn key(&self) -> Option<&PrivateKey> {
        match self {
            Self::Keyed { key, .. } => Some(key),
            Self::Keyless { .. } => None,
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, Self::Keyed { .. })
    }

    /// The last link of the chain, if any.
    pub fn last(&self) -> Option<&SignedDelegation> {
        self.signed_delegations().last()
    }

    /// The authority a new link extending this chain must carry: the hash of
    /// the last link, or the zero hash for an empty chain.
    pub fn tail_authority(&self) -> Result<B256> {
        match self.last() {
            Some(link) => link.hash(),
            None => Ok(ROOT_AUTHORITY),
        }
    }
}

// An invitation serializes to its portable JSON form; the key, when present,
// is exposed as hex because hand-off is the point of a keyed invitation.
impl Serialize for Invitation {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let keyed = self.is_keyed();
        let mut state =
            serializer.serialize_struct("Invitation", if keyed { 2 } else { 1 })?;
        state.serialize_field("signedDelegations", self.signed_delegations())?;
        if let Some(key) = self.key() {
            state.serialize_field("key", &key.to_hex())?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for Invitation {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Repr {
            signed_delegations: Vec<SignedDelegation>,
            key: Option<String>,
        }

        let repr = Repr::deserialize(deserializer)?;
        match repr.key {
            Some(hex) => {
                let key = PrivateKey::from_hex(&hex).map_err(serde::de::Error::custom)?;
                Ok(Invitation::keyed(repr.signed_delegations, key))
            }
            None => Ok(Invitation::keyless(repr.signed_delegations)),
        }
    }
}

/// Builds invitations: a fresh root chain, or an extension of an existing
/// one.
///
/// The signing key is resolved in order: an explicit [`signing_key`], then
/// the key carried by the invitation being extended. The delegate is resolved
/// in order: the draft's delegate, then an explicit [`recipient`], then a
/// freshly generated keypair — and only in that last case does the resulting
/// invitation carry a key.
///
/// [`signing_key`]: InvitationBuilder::signing_key
/// [`recipient`]: InvitationBuilder::recipient
#[derive(Debug)]
pub struct InvitationBuilder<'a> {
    contract_info: &'a ContractInfo,
    base: Option<&'a Invitation>,
    recipient: Option<Address>,
    draft: Option<DelegationDraft>,
    signing_key: Option<&'a PrivateKey>,
}

impl<'a> InvitationBuilder<'a> {
    /// Start a new root chain: the signer delegates their own on-chain
    /// privileges.
    pub fn root(contract_info: &'a ContractInfo) -> Self {
        Self {
            contract_info,
            base: None,
            recipient: None,
            draft: None,
            signing_key: None,
        }
    }

    /// Extend an existing invitation's authority. Extending an empty chain
    /// behaves as [`root`](Self::root).
    pub fn extending(invitation: &'a Invitation, contract_info: &'a ContractInfo) -> Self {
        Self {
            contract_info,
            base: Some(invitation),
            recipient: None,
            draft: None,
            signing_key: None,
        }
    }

    /// Delegate to a known address instead of generating a keypair.
    pub fn recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Supply the delegation explicitly. Its delegate takes precedence over
    /// [`recipient`](Self::recipient); its authority, when pinned, takes
    /// precedence over the derived chain-tail hash.
    pub fn delegation(mut self, draft: DelegationDraft) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Sign with this key instead of the base invitation's key.
    pub fn signing_key(mut self, key: &'a PrivateKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Sign the new link and append it, producing an unvalidated invitation.
    pub fn build(self) -> Result<Invitation> {
        let chain: &[SignedDelegation] = self
            .base
            .map(Invitation::signed_delegations)
            .unwrap_or_default();

        let signer = self
            .signing_key
            .or_else(|| self.base.and_then(Invitation::key))
            .ok_or(Error::MissingCredentials)?;

        let derived_authority = match chain.last() {
            Some(link) => link.hash()?,
            None => ROOT_AUTHORITY,
        };

        let mut draft = self.draft.unwrap_or_else(|| {
            DelegationDraft::to(self.recipient.unwrap_or(Address::ZERO))
                .with_caveat(Caveat::deferring_to(self.contract_info.verifying_contract))
        });

        // A zero delegate means nobody named one: generate a keypair on the
        // recipient's behalf and hand it off in the result.
        let generated = if draft.delegate == Address::ZERO {
            let key = PrivateKey::generate();
            draft.delegate = key.address();
            Some(key)
        } else {
            None
        };

        let delegation = draft.resolve(derived_authority);
        debug!(
            delegate = %delegation.delegate,
            authority = %delegation.authority,
            chain_len = chain.len(),
            "signing delegation link"
        );
        let signed = delegation.sign(signer, self.contract_info)?;

        let mut signed_delegations = chain.to_vec();
        signed_delegations.push(signed);

        Ok(match generated {
            Some(key) => Invitation::keyed(signed_delegations, key),
            None => Invitation::keyless(signed_delegations),
        })
    }
}
