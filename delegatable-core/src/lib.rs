//! # Delegatable Core
//!
//! Off-chain capability delegation for smart-contract authority.
//!
//! A party holding authority over a contract's state-mutating functions can
//! delegate a bounded subset of it to another party, who may re-delegate
//! onward, producing a verifiable chain of custody that terminates in a
//! concrete invocation. This crate builds and verifies those chains: typed-
//! data hashing under a contract domain, recoverable ECDSA signatures, chain
//! walking, invocation batching with replay protection, and revocation
//! intents. Executing invocations and evaluating caveats happen on-chain, in
//! an external verifier this crate's encodings are byte-compatible with.
//!
//! ## Key Concepts
//!
//! - **Delegation**: a signed grant of authority to an address, rooted in a
//!   prior signed delegation or in the signer's own on-chain privileges
//! - **Invitation**: a portable authority chain, optionally bundled with the
//!   private key needed to exercise it
//! - **Membership**: a key + contract domain + optional invitation, exposing
//!   delegation, invocation, and revocation operations as one object
//!
//! ## Example
//!
//! ```rust,ignore
//! use delegatable_core::{
//!     ContractInfo, InvitationRequest, Membership, MembershipOptions, PrivateKey,
//! };
//!
//! let contract_info = ContractInfo::new("PhisherRegistry", 1, registry_address);
//!
//! // The contract owner delegates their authority.
//! let owner = Membership::new(MembershipOptions::OwnerOnly {
//!     key: PrivateKey::from_hex(owner_key)?,
//!     contract_info: contract_info.clone(),
//! })?;
//! let invitation = owner.create_invitation(InvitationRequest::new())?;
//!
//! // The recipient exercises it, and can delegate onward.
//! let member = Membership::new(MembershipOptions::FromInvitation {
//!     invitation,
//!     contract_info,
//! })?;
//! let signed = member.sign_invocations(invocations)?;
//! ```
//!
//! Building is cheap and unchecked; [`chain::validate_invitation`] is the
//! only path to a trusted chain. All operations are pure functions of their
//! inputs — the signing domain is passed explicitly everywhere, so concurrent
//! callers never share mutable state.

pub mod chain;
pub mod crypto;
pub mod delegation;
pub mod error;
pub mod invitation;
pub mod invocation;
pub mod membership;
pub mod revocation;
pub mod typed_data;
pub mod util;
pub mod wire;

// Re-exports for convenience
pub use chain::{validate_invitation, ChainReport};
pub use crypto::{recover_address, PrivateKey, Signature, SIGNATURE_LENGTH};
pub use delegation::{Caveat, Delegation, DelegationDraft, SignedDelegation};
pub use error::{Error, Result};
pub use invitation::{Invitation, InvitationBuilder};
pub use invocation::{
    Invocation, Invocations, ReplayProtection, SignedInvocation, Transaction,
};
pub use membership::{InvitationRequest, Membership, MembershipOptions};
pub use revocation::{IntentionToRevoke, SignedIntentionToRevoke};
pub use typed_data::ContractInfo;
pub use util::DelegatableUtil;
pub use wire::{typed_message, TypedMessage, MAX_PAYLOAD_SIZE};

use alloy_primitives::B256;

/// The authority value of a root delegation: the zero hash. A delegation
/// carrying it is granted directly by the signer's own on-chain privileges.
pub const ROOT_AUTHORITY: B256 = B256::ZERO;

/// Domain version string, fixed by the external verifier.
pub const DOMAIN_VERSION: &str = "1";

/// Maximum delegation chain length accepted by validation (protocol-level
/// hard cap, prevents unbounded work on hostile input).
pub const MAX_CHAIN_LENGTH: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    #[test]
    fn basic_delegation_flow() {
        let contract_info = ContractInfo::new("PhisherRegistry", 1, Address::repeat_byte(0xaa));
        let owner_key = PrivateKey::generate();

        let owner = Membership::new(MembershipOptions::OwnerOnly {
            key: owner_key.clone(),
            contract_info: contract_info.clone(),
        })
        .unwrap();

        let invitation = owner.create_invitation(InvitationRequest::new()).unwrap();
        let report = validate_invitation(&invitation, &contract_info).unwrap();
        assert_eq!(report.root_signer, Some(owner_key.address()));
        assert_eq!(report.length, 1);
    }
}
