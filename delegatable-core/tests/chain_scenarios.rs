//! End-to-end delegation scenarios.
//!
//! These walk the protocol the way real parties do: an owner key roots a
//! chain, delegates hand authority onward, and a terminal delegate signs an
//! invocation batch that an executor could verify. Forged variants confirm
//! the validator rejects exactly the link that was tampered with.

use alloy_primitives::{Address, Bytes, U256};
use delegatable_core::{
    validate_invitation, ContractInfo, DelegationDraft, Error, IntentionToRevoke, Invitation,
    InvitationBuilder, InvitationRequest, Invocation, Invocations, Membership,
    MembershipOptions, PrivateKey, ReplayProtection, Transaction,
};

fn registry() -> ContractInfo {
    ContractInfo::new("PhisherRegistry", 1, Address::repeat_byte(0xaa))
}

fn single_invocation_batch(nonce: u64) -> Invocations {
    Invocations::new(
        vec![Invocation::of(Transaction::new(
            registry().verifying_contract,
            U256::from(10_000_000u64),
            Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        ))],
        ReplayProtection::new(0u64, nonce),
    )
}

/// Root key K0 delegates to A1; A1 re-delegates to A2 with no caveats; A2
/// signs an invocation under the 2-link chain. The validator accepts the
/// chain and the invocation signer recovers to A2.
#[test]
fn two_link_chain_authorizes_an_invocation() {
    let info = registry();
    let k0 = PrivateKey::generate();
    let k1 = PrivateKey::generate();
    let k2 = PrivateKey::generate();

    let owner = Membership::new(MembershipOptions::OwnerOnly {
        key: k0.clone(),
        contract_info: info.clone(),
    })
    .unwrap();
    let to_a1 = owner
        .create_invitation(InvitationRequest::for_recipient(k1.address()))
        .unwrap();
    assert!(!to_a1.is_keyed());

    let m1 = Membership::new(MembershipOptions::FromInvitationWithOverrideKey {
        invitation: to_a1,
        key: k1.clone(),
        contract_info: info.clone(),
    })
    .unwrap();
    let to_a2 = m1
        .create_invitation(InvitationRequest::with_delegation(DelegationDraft::to(
            k2.address(),
        )))
        .unwrap();

    let report = validate_invitation(&to_a2, &info).unwrap();
    assert_eq!(report.root_signer, Some(k0.address()));
    assert_eq!(report.terminal_delegate, k2.address());
    assert_eq!(report.length, 2);
    // A1's link carries no caveats, as requested.
    assert!(to_a2.signed_delegations()[1].delegation.caveats.is_empty());

    let m2 = Membership::new(MembershipOptions::FromInvitationWithOverrideKey {
        invitation: to_a2.clone(),
        key: k2.clone(),
        contract_info: info.clone(),
    })
    .unwrap();
    let signed = m2.sign_invocations(single_invocation_batch(1)).unwrap();

    assert_eq!(signed.recover_signer(&info).unwrap(), k2.address());
    // The batch carries the full chain the executor will walk.
    assert_eq!(
        signed.invocations.batch[0].authority,
        to_a2.signed_delegations()
    );
}

/// Same chain, but link 2 is signed by a key that is not A1: the validator
/// reports a signer mismatch at index 1.
#[test]
fn wrong_signer_on_link_two_is_rejected() {
    let info = registry();
    let k0 = PrivateKey::generate();
    let k1 = PrivateKey::generate();
    let k2 = PrivateKey::generate();
    let interloper = PrivateKey::generate();

    let to_a1 = InvitationBuilder::root(&info)
        .signing_key(&k0)
        .recipient(k1.address())
        .build()
        .unwrap();

    let forged = InvitationBuilder::extending(&to_a1, &info)
        .recipient(k2.address())
        .signing_key(&interloper)
        .build()
        .unwrap();

    match validate_invitation(&forged, &info) {
        Err(Error::SignerMismatch {
            index,
            expected,
            actual,
        }) => {
            assert_eq!(index, 1);
            assert_eq!(expected, k1.address());
            assert_eq!(actual, interloper.address());
        }
        other => panic!("expected SignerMismatch, got {other:?}"),
    }
}

/// A delegator revokes the delegation they issued: the signed intent names
/// exactly the hash the chain builder computed for that link, and the
/// delegator's address recovers from it.
#[test]
fn revocation_names_the_chain_hash() {
    let info = registry();
    let k0 = PrivateKey::generate();
    let k1 = PrivateKey::generate();
    let k2 = PrivateKey::generate();

    let owner = Membership::new(MembershipOptions::OwnerOnly {
        key: k0,
        contract_info: info.clone(),
    })
    .unwrap();
    let to_a1 = owner
        .create_invitation(InvitationRequest::for_recipient(k1.address()))
        .unwrap();

    let m1 = Membership::new(MembershipOptions::FromInvitationWithOverrideKey {
        invitation: to_a1,
        key: k1.clone(),
        contract_info: info.clone(),
    })
    .unwrap();
    let to_a2 = m1
        .create_invitation(InvitationRequest::for_recipient(k2.address()))
        .unwrap();

    let signed = m1.sign_revocation_message(&to_a2).unwrap();
    assert_eq!(
        signed.intention_to_revoke.delegation_hash,
        to_a2.signed_delegations().last().unwrap().hash().unwrap()
    );
    assert_eq!(
        IntentionToRevoke::for_invitation(&to_a2).unwrap().delegation_hash,
        signed.intention_to_revoke.delegation_hash
    );
    assert_eq!(signed.recover_signer(&info).unwrap(), k1.address());
}

/// Queued replay protection: two batches on queue 0 with nonces 1 and 2 are
/// both well-formed, and the same (queue, nonce) signed over different data
/// yields two distinct signed invocations.
#[test]
fn replay_protection_tokens_are_produced_not_adjudicated() {
    let info = registry();
    let key = PrivateKey::generate();
    let member = Membership::new(MembershipOptions::OwnerOnly {
        key: key.clone(),
        contract_info: info.clone(),
    })
    .unwrap();

    let first = member.sign_invocations(single_invocation_batch(1)).unwrap();
    let second = member.sign_invocations(single_invocation_batch(2)).unwrap();
    assert_eq!(first.recover_signer(&info).unwrap(), key.address());
    assert_eq!(second.recover_signer(&info).unwrap(), key.address());

    let mut conflicting = single_invocation_batch(1);
    conflicting.batch[0].transaction.data = Bytes::from(vec![0x01]);
    let third = member.sign_invocations(conflicting).unwrap();

    assert_ne!(first.signature, third.signature);
    assert_ne!(first.invocations, third.invocations);
    assert_eq!(third.recover_signer(&info).unwrap(), key.address());
}

/// A root member invokes with an empty authority chain: the invoker is the
/// root authority itself.
#[test]
fn root_membership_signs_with_empty_authority() {
    let info = registry();
    let key = PrivateKey::generate();
    let owner = Membership::new(MembershipOptions::OwnerOnly {
        key: key.clone(),
        contract_info: info.clone(),
    })
    .unwrap();

    let signed = owner.sign_invocations(single_invocation_batch(1)).unwrap();
    assert!(signed.invocations.batch[0].authority.is_empty());
    assert_eq!(signed.recover_signer(&info).unwrap(), key.address());
}

/// A keyed invitation hand-off: the owner generates the recipient's keypair,
/// the recipient reconstructs a membership from the serialized invitation
/// alone and delegates onward.
#[test]
fn keyed_invitation_round_trips_and_extends() {
    let info = registry();
    let owner_key = PrivateKey::generate();
    let owner = Membership::new(MembershipOptions::OwnerOnly {
        key: owner_key,
        contract_info: info.clone(),
    })
    .unwrap();

    let invitation = owner.create_invitation(InvitationRequest::new()).unwrap();
    assert!(invitation.is_keyed());

    // Hand-off happens as JSON.
    let json = serde_json::to_string(&invitation).unwrap();
    let received: Invitation = serde_json::from_str(&json).unwrap();

    let member = Membership::new(MembershipOptions::FromInvitation {
        invitation: received,
        contract_info: info.clone(),
    })
    .unwrap();
    let onward = member.create_invitation(InvitationRequest::new()).unwrap();
    let report = validate_invitation(&onward, &info).unwrap();
    assert_eq!(report.length, 2);
}

/// Signing under chain id 1 does not verify under chain id 2's domain.
#[test]
fn chains_do_not_transfer_across_domains() {
    let info = registry();
    let k0 = PrivateKey::generate();

    let invitation = InvitationBuilder::root(&info)
        .signing_key(&k0)
        .build()
        .unwrap();

    let mut other = info.clone();
    other.chain_id = 2;
    match validate_invitation(&invitation, &other) {
        Ok(report) => assert_ne!(report.root_signer, Some(k0.address())),
        Err(e) => assert!(e.is_chain_violation() || matches!(e, Error::Crypto(_))),
    }
}
