//! Delegation model: the links of an authority chain.
//!
//! A `Delegation` grants an address a (possibly caveated) share of authority,
//! rooted either in a prior signed delegation (its `authority` field names
//! that link's hash) or in the signer's own on-chain privileges (`authority`
//! is the zero hash). Signing one produces a `SignedDelegation`, which is
//! immutable: altering any field invalidates the signature.

use crate::crypto::{recover_address, PrivateKey, Signature};
use crate::error::Result;
use crate::typed_data::{self, ContractInfo};
use crate::ROOT_AUTHORITY;
use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// An opaque policy restriction attached to a delegation link.
///
/// Interpreted only by the external enforcement engine; this core forwards
/// caveats verbatim and never evaluates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caveat {
    /// Address of the enforcer contract that interprets `terms`.
    pub enforcer: Address,
    /// Enforcer-specific terms.
    pub terms: Bytes,
}

impl Caveat {
    pub fn new(enforcer: Address, terms: Bytes) -> Self {
        Self { enforcer, terms }
    }

    /// The default caveat attached to synthesized delegations: defer to the
    /// verifying contract itself (which doubles as a revocation enforcer)
    /// with zero terms.
    pub fn deferring_to(enforcer: Address) -> Self {
        Self {
            enforcer,
            terms: Bytes::from(vec![0u8; 32]),
        }
    }
}

/// A statement granting `delegate` a share of the signer's authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    /// The address being granted authority.
    pub delegate: Address,
    /// Zero for a root delegation; otherwise the hash of the
    /// `SignedDelegation` this one extends.
    pub authority: B256,
    /// Restrictions on the granted authority, in order.
    pub caveats: Vec<Caveat>,
}

impl Delegation {
    /// Whether this delegation is rooted in the signer's own privileges.
    pub fn is_root(&self) -> bool {
        self.authority == ROOT_AUTHORITY
    }

    /// The domain-separated digest a signer commits to.
    pub fn digest(&self, info: &ContractInfo) -> Result<B256> {
        typed_data::digest_of("Delegation", self, info)
    }

    /// Sign this delegation under the given contract domain.
    ///
    /// Signing does not check that `key` belongs to the delegate of any prior
    /// link; that invariant is checked centrally by chain validation.
    pub fn sign(&self, key: &PrivateKey, info: &ContractInfo) -> Result<SignedDelegation> {
        let signature = key.sign_digest(self.digest(info)?)?;
        Ok(SignedDelegation {
            delegation: self.clone(),
            signature,
        })
    }
}

/// A delegation awaiting an authority binding.
///
/// Callers describing a new link usually know the delegate and caveats but
/// want the authority derived from the chain they are extending; an explicit
/// authority, when set, always wins.
#[derive(Debug, Clone)]
pub struct DelegationDraft {
    pub delegate: Address,
    pub authority: Option<B256>,
    pub caveats: Vec<Caveat>,
}

impl DelegationDraft {
    /// A caveat-free draft delegating to `delegate`.
    pub fn to(delegate: Address) -> Self {
        Self {
            delegate,
            authority: None,
            caveats: Vec::new(),
        }
    }

    /// Pin the authority explicitly instead of deriving it from a chain tail.
    pub fn with_authority(mut self, authority: B256) -> Self {
        self.authority = Some(authority);
        self
    }

    /// Attach a caveat.
    pub fn with_caveat(mut self, caveat: Caveat) -> Self {
        self.caveats.push(caveat);
        self
    }

    /// Bind the draft to an authority, producing a signable delegation.
    /// An explicitly pinned authority takes precedence over `derived`.
    pub fn resolve(self, derived: B256) -> Delegation {
        Delegation {
            delegate: self.delegate,
            authority: self.authority.unwrap_or(derived),
            caveats: self.caveats,
        }
    }
}

/// A delegation plus the signature that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedDelegation {
    pub delegation: Delegation,
    pub signature: Signature,
}

impl SignedDelegation {
    /// The canonical hash of this link: `structHash("SignedDelegation", self)`.
    ///
    /// This is the value a child link's `authority` field must carry, and the
    /// value a revocation intent names. It is domain-independent.
    pub fn hash(&self) -> Result<B256> {
        typed_data::struct_hash("SignedDelegation", &serde_json::to_value(self)?)
    }

    /// Recover the address that signed this link under the given domain.
    pub fn recover_signer(&self, info: &ContractInfo) -> Result<Address> {
        recover_address(self.delegation.digest(info)?, &self.signature)
    }
}
