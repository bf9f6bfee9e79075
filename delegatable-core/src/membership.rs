//! Membership: the external-facing capability object.
//!
//! A membership binds a signing key and a contract domain to an optional
//! invitation, and exposes the protocol's operations — delegating onward,
//! signing invocation batches, signing revocation intents — as one cohesive
//! object. It holds no other state and is reconstructible from its parts.
//!
//! Construction takes a tagged [`MembershipOptions`] union, resolved exactly
//! once; there is no later re-inspection of which fields happened to be
//! present.

use crate::chain::{validate_invitation, ChainReport};
use crate::crypto::PrivateKey;
use crate::delegation::{DelegationDraft, SignedDelegation};
use crate::error::{Error, Result};
use crate::invitation::{Invitation, InvitationBuilder};
use crate::invocation::{Invocations, SignedInvocation};
use crate::revocation::{IntentionToRevoke, SignedIntentionToRevoke};
use crate::typed_data::ContractInfo;
use alloy_primitives::Address;
use tracing::debug;

/// How to construct a membership. Exactly three shapes exist.
#[derive(Debug)]
pub enum MembershipOptions {
    /// An owner acting under their own on-chain privileges; no chain.
    OwnerOnly {
        key: PrivateKey,
        contract_info: ContractInfo,
    },
    /// A delegate exercising a keyed invitation.
    FromInvitation {
        invitation: Invitation,
        contract_info: ContractInfo,
    },
    /// A delegate exercising an invitation with their own key — the usual
    /// shape for a keyless invitation addressed to them.
    FromInvitationWithOverrideKey {
        invitation: Invitation,
        key: PrivateKey,
        contract_info: ContractInfo,
    },
}

/// A capability object for issuing delegations, invocations, and
/// revocations under one contract domain.
#[derive(Debug, Clone)]
pub struct Membership {
    contract_info: ContractInfo,
    key: PrivateKey,
    invitation: Option<Invitation>,
}

impl Membership {
    /// Resolve options into a membership.
    ///
    /// Fails with [`Error::MissingCredentials`] if no signing key is
    /// resolvable, [`Error::MissingContractInfo`] if the verifying contract
    /// is absent (zero), or a chain violation if a supplied invitation does
    /// not validate.
    pub fn new(options: MembershipOptions) -> Result<Self> {
        let (key, invitation, contract_info) = match options {
            MembershipOptions::OwnerOnly { key, contract_info } => (key, None, contract_info),
            MembershipOptions::FromInvitation {
                invitation,
                contract_info,
            } => {
                let key = invitation.key().cloned().ok_or(Error::MissingCredentials)?;
                (key, Some(invitation), contract_info)
            }
            MembershipOptions::FromInvitationWithOverrideKey {
                invitation,
                key,
                contract_info,
            } => (key, Some(invitation), contract_info),
        };

        if contract_info.verifying_contract == Address::ZERO {
            return Err(Error::MissingContractInfo);
        }

        if let Some(invitation) = &invitation {
            validate_invitation(invitation, &contract_info)?;
        }

        Ok(Self {
            contract_info,
            key,
            invitation,
        })
    }

    /// The address this membership signs as.
    pub fn address(&self) -> Address {
        self.key.address()
    }

    pub fn contract_info(&self) -> &ContractInfo {
        &self.contract_info
    }

    pub fn invitation(&self) -> Option<&Invitation> {
        self.invitation.as_ref()
    }

    /// Validate this membership's own chain.
    pub fn validate(&self) -> Result<ChainReport> {
        match &self.invitation {
            Some(invitation) => validate_invitation(invitation, &self.contract_info),
            None => Ok(ChainReport {
                root_signer: None,
                terminal_delegate: self.address(),
                length: 0,
            }),
        }
    }

    fn chain(&self) -> &[SignedDelegation] {
        self.invitation
            .as_ref()
            .map(Invitation::signed_delegations)
            .unwrap_or_default()
    }

    /// Delegate (a part of) this membership's authority onward.
    ///
    /// The result is validated before it is returned, so an internal bug
    /// surfaces here rather than at the recipient.
    pub fn create_invitation(&self, request: InvitationRequest) -> Result<Invitation> {
        let mut builder = match &self.invitation {
            Some(invitation) if !invitation.signed_delegations().is_empty() => {
                InvitationBuilder::extending(invitation, &self.contract_info)
            }
            _ => InvitationBuilder::root(&self.contract_info),
        }
        .signing_key(&self.key);

        if let Some(recipient) = request.recipient {
            builder = builder.recipient(recipient);
        }
        if let Some(draft) = request.delegation {
            builder = builder.delegation(draft);
        }

        let invitation = builder.build()?;
        validate_invitation(&invitation, &self.contract_info)?;
        debug!(
            links = invitation.signed_delegations().len(),
            keyed = invitation.is_keyed(),
            "issued invitation"
        );
        Ok(invitation)
    }

    /// Sign a single delegation link, with the authority auto-populated from
    /// this membership's chain tail unless the draft pins one.
    ///
    /// The result is a raw link, not necessarily a usable standalone
    /// invitation.
    pub fn sign_delegation(&self, draft: DelegationDraft) -> Result<SignedDelegation> {
        let derived = match &self.invitation {
            Some(invitation) => invitation.tail_authority()?,
            None => crate::ROOT_AUTHORITY,
        };
        draft.resolve(derived).sign(&self.key, &self.contract_info)
    }

    /// Sign an invocation batch as one unit, populating each entry's
    /// authority with this membership's chain (or leaving it empty if this
    /// membership is the root). Entries that already carry an explicit
    /// authority are left untouched.
    pub fn sign_invocations(&self, mut invocations: Invocations) -> Result<SignedInvocation> {
        let chain = self.chain();
        for invocation in &mut invocations.batch {
            if invocation.authority.is_empty() {
                invocation.authority = chain.to_vec();
            }
        }
        invocations.sign(&self.key, &self.contract_info)
    }

    /// Sign an intent to revoke the last delegation of the given invitation.
    ///
    /// Only meaningful when this membership's key is the original delegator
    /// of that link; the executor enforces that.
    pub fn sign_revocation_message(
        &self,
        invitation: &Invitation,
    ) -> Result<SignedIntentionToRevoke> {
        IntentionToRevoke::for_invitation(invitation)?.sign(&self.key, &self.contract_info)
    }
}

/// Parameters for [`Membership::create_invitation`]: optionally a recipient
/// address, optionally an explicit delegation draft. With neither, a keypair
/// is generated for the recipient and the invitation carries it.
#[derive(Debug, Clone, Default)]
pub struct InvitationRequest {
    pub recipient: Option<Address>,
    pub delegation: Option<DelegationDraft>,
}

impl InvitationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_recipient(recipient: Address) -> Self {
        Self {
            recipient: Some(recipient),
            delegation: None,
        }
    }

    pub fn with_delegation(draft: DelegationDraft) -> Self {
        Self {
            recipient: None,
            delegation: Some(draft),
        }
    }
}
