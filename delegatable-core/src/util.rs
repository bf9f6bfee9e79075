//! Per-contract convenience wrapper.
//!
//! Most call sites work against one contract for their whole lifetime;
//! `DelegatableUtil` curries the `ContractInfo` so they don't thread it
//! through every call. Everything here delegates to the underlying pure
//! operations.

use crate::chain::{validate_invitation, ChainReport};
use crate::crypto::PrivateKey;
use crate::delegation::{Delegation, SignedDelegation};
use crate::error::Result;
use crate::invitation::Invitation;
use crate::invocation::{Invocations, SignedInvocation};
use crate::revocation::{IntentionToRevoke, SignedIntentionToRevoke};
use crate::typed_data::ContractInfo;
use alloy_primitives::{Address, B256};

/// Protocol operations curried over one contract's domain.
#[derive(Debug, Clone)]
pub struct DelegatableUtil {
    contract_info: ContractInfo,
}

impl DelegatableUtil {
    pub fn new(contract_info: ContractInfo) -> Self {
        Self { contract_info }
    }

    pub fn contract_info(&self) -> &ContractInfo {
        &self.contract_info
    }

    pub fn sign_delegation(
        &self,
        delegation: &Delegation,
        key: &PrivateKey,
    ) -> Result<SignedDelegation> {
        delegation.sign(key, &self.contract_info)
    }

    pub fn recover_delegation_signer(&self, signed: &SignedDelegation) -> Result<Address> {
        signed.recover_signer(&self.contract_info)
    }

    /// The canonical link hash; what a child's `authority` carries and a
    /// revocation intent names.
    pub fn signed_delegation_hash(&self, signed: &SignedDelegation) -> Result<B256> {
        signed.hash()
    }

    pub fn sign_invocations(
        &self,
        invocations: &Invocations,
        key: &PrivateKey,
    ) -> Result<SignedInvocation> {
        invocations.sign(key, &self.contract_info)
    }

    pub fn recover_invocation_signer(&self, signed: &SignedInvocation) -> Result<Address> {
        signed.recover_signer(&self.contract_info)
    }

    pub fn sign_revocation(
        &self,
        intention: &IntentionToRevoke,
        key: &PrivateKey,
    ) -> Result<SignedIntentionToRevoke> {
        intention.sign(key, &self.contract_info)
    }

    pub fn recover_revocation_signer(
        &self,
        signed: &SignedIntentionToRevoke,
    ) -> Result<Address> {
        signed.recover_signer(&self.contract_info)
    }

    pub fn validate_invitation(&self, invitation: &Invitation) -> Result<ChainReport> {
        validate_invitation(invitation, &self.contract_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invitation::InvitationBuilder;
    use crate::ROOT_AUTHORITY;

    #[test]
    fn curried_operations_match_direct_calls() {
        let info = ContractInfo::new("PhisherRegistry", 1, Address::repeat_byte(0xaa));
        let util = DelegatableUtil::new(info.clone());
        let key = PrivateKey::generate();

        let delegation = Delegation {
            delegate: Address::repeat_byte(0xbb),
            authority: ROOT_AUTHORITY,
            caveats: vec![],
        };
        let signed = util.sign_delegation(&delegation, &key).unwrap();
        assert_eq!(signed, delegation.sign(&key, &info).unwrap());
        assert_eq!(
            util.recover_delegation_signer(&signed).unwrap(),
            key.address()
        );
        assert_eq!(
            util.signed_delegation_hash(&signed).unwrap(),
            signed.hash().unwrap()
        );

        let invitation = InvitationBuilder::root(&info)
            .signing_key(&key)
            .build()
            .unwrap();
        util.validate_invitation(&invitation).unwrap();
    }
}
