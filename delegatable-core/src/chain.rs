//! Chain-of-custody validation.
//!
//! Walks an invitation's signed delegations in authority order and confirms
//! two things per link: the link was signed by the previous link's delegate,
//! and the link's `authority` equals the hash of the previous link. Link 0's
//! signer is taken as the root; whether that root actually holds privileges
//! on the verifying contract is chain-external trust and stays the caller's
//! responsibility.
//!
//! Caveats are deliberately not evaluated here. The validator's job is
//! chain-of-custody integrity; policy belongs to the external enforcement
//! engine.

use crate::delegation::SignedDelegation;
use crate::error::{Error, Result};
use crate::invitation::Invitation;
use crate::typed_data::ContractInfo;
use crate::MAX_CHAIN_LENGTH;
use alloy_primitives::{Address, B256};
use tracing::trace;

/// Result of a successful chain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Recovered signer of link 0. `None` for a bare-key invitation, which
    /// has no chain to recover from.
    pub root_signer: Option<Address>,
    /// The address holding the terminal authority: the last link's delegate,
    /// or the bare key's address.
    pub terminal_delegate: Address,
    /// Number of links walked.
    pub length: usize,
}

/// Validate an invitation's chain of custody.
///
/// A zero-length chain with a bare key is accepted as self-authority (there
/// is nothing to recover); a zero-length chain without a key fails with
/// [`Error::EmptyChain`]. Broken chains fail with [`Error::SignerMismatch`]
/// or [`Error::AuthorityChainBroken`] naming the offending index — callers
/// evaluating untrusted chains branch on these rather than a bare `false`.
pub fn validate_invitation(invitation: &Invitation, info: &ContractInfo) -> Result<ChainReport> {
    let chain = invitation.signed_delegations();

    if chain.is_empty() {
        return match invitation.key() {
            Some(key) => Ok(ChainReport {
                root_signer: None,
                terminal_delegate: key.address(),
                length: 0,
            }),
            None => Err(Error::EmptyChain),
        };
    }

    if chain.len() > MAX_CHAIN_LENGTH {
        return Err(Error::ChainTooLong {
            length: chain.len(),
            max: MAX_CHAIN_LENGTH,
        });
    }

    let mut root_signer = Address::ZERO;
    let mut expected_signer = Address::ZERO;
    let mut previous_hash: Option<B256> = None;

    for (index, entry) in chain.iter().enumerate() {
        let signer = entry.recover_signer(info)?;

        if index == 0 {
            // The root trusts itself; callers check it against the contract
            // owner out of band.
            root_signer = signer;
        } else if signer != expected_signer {
            return Err(Error::SignerMismatch {
                index,
                expected: expected_signer,
                actual: signer,
            });
        }

        if let Some(previous) = previous_hash {
            if entry.delegation.authority != previous {
                return Err(Error::AuthorityChainBroken {
                    index,
                    expected: previous,
                    actual: entry.delegation.authority,
                });
            }
        }

        trace!(index, signer = %signer, delegate = %entry.delegation.delegate, "chain link verified");
        previous_hash = Some(entry.hash()?);
        expected_signer = entry.delegation.delegate;
    }

    Ok(ChainReport {
        root_signer: Some(root_signer),
        terminal_delegate: expected_signer,
        length: chain.len(),
    })
}

impl Invitation {
    /// Validate this invitation's chain of custody under the given domain.
    ///
    /// See [`validate_invitation`].
    pub fn validate(&self, info: &ContractInfo) -> Result<ChainReport> {
        validate_invitation(self, info)
    }
}

/// Validate a bare chain slice without the invitation wrapper, e.g. the
/// `authority` field carried by an invocation. An empty slice is accepted as
/// root authority for `signer`.
pub fn validate_authority(
    authority: &[SignedDelegation],
    signer: Address,
    info: &ContractInfo,
) -> Result<ChainReport> {
    if authority.is_empty() {
        return Ok(ChainReport {
            root_signer: None,
            terminal_delegate: signer,
            length: 0,
        });
    }
    let invitation = Invitation::keyless(authority.to_vec());
    validate_invitation(&invitation, info)
}
