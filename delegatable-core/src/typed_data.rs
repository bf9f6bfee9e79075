//! Canonical typed-data hashing (EIP-712).
//!
//! All signable structures in the protocol — delegations, invocation batches,
//! revocation intents — are hashed through one fixed, process-wide schema.
//! The verifying contract re-derives the same digests on-chain, so every
//! encoding here must be byte-for-byte what the external verifier computes.
//!
//! The contract domain (`ContractInfo`) is a pure per-call parameter.
//! Nothing in this module holds per-call state, so concurrent callers hashing
//! under different domains never observe cross-talk.
//!
//! Message values are JSON trees in the same shape as the wallet-facing
//! envelope: addresses and byte strings as `0x`-hex, `uint256` as decimal or
//! hex strings (JSON numbers also accepted). A value that does not match its
//! declared field type fails with [`Error::Encoding`].

use crate::error::{Error, Result};
use crate::DOMAIN_VERSION;
use alloy_primitives::{keccak256, Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Prefix bytes of the signable digest (EIP-191 version 0x01).
pub const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];

/// One field of a struct schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeField {
    /// Field name as it appears in the message object.
    pub name: &'static str,
    /// Declared type: an atomic type, a struct name, or `T[]`.
    #[serde(rename = "type")]
    pub kind: &'static str,
}

const fn field(name: &'static str, kind: &'static str) -> TypeField {
    TypeField { name, kind }
}

/// The fixed protocol schema, one entry per message type, fields in
/// declaration order. Shared by hashing here and by the wallet envelope in
/// [`crate::wire`].
pub const TYPES: &[(&str, &[TypeField])] = &[
    (
        "EIP712Domain",
        &[
            field("name", "string"),
            field("version", "string"),
            field("chainId", "uint256"),
            field("verifyingContract", "address"),
        ],
    ),
    (
        "Caveat",
        &[field("enforcer", "address"), field("terms", "bytes")],
    ),
    (
        "Delegation",
        &[
            field("delegate", "address"),
            field("authority", "bytes32"),
            field("caveats", "Caveat[]"),
        ],
    ),
    (
        "SignedDelegation",
        &[
            field("delegation", "Delegation"),
            field("signature", "bytes"),
        ],
    ),
    (
        "IntentionToRevoke",
        &[field("delegationHash", "bytes32")],
    ),
    (
        "Transaction",
        &[
            field("to", "address"),
            field("gasLimit", "uint256"),
            field("data", "bytes"),
        ],
    ),
    (
        "Invocation",
        &[
            field("transaction", "Transaction"),
            field("authority", "SignedDelegation[]"),
        ],
    ),
    (
        "ReplayProtection",
        &[field("nonce", "uint256"), field("queue", "uint256")],
    ),
    (
        "Invocations",
        &[
            field("batch", "Invocation[]"),
            field("replayProtection", "ReplayProtection"),
        ],
    ),
    (
        "SignedInvocation",
        &[
            field("invocations", "Invocations"),
            field("signature", "bytes"),
        ],
    ),
];

/// Identity of the verifying contract: the signing domain.
///
/// Passed explicitly into every hashing call; never stored on shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    /// Human-readable contract name.
    pub name: String,
    /// Chain identifier.
    pub chain_id: u64,
    /// Address of the contract that will verify signatures.
    pub verifying_contract: Address,
}

impl ContractInfo {
    pub fn new(name: impl Into<String>, chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: name.into(),
            chain_id,
            verifying_contract,
        }
    }
}

/// Look up the field list for a struct type.
pub fn schema(type_name: &str) -> Option<&'static [TypeField]> {
    TYPES
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, fields)| *fields)
}

fn element_type(kind: &str) -> &str {
    kind.strip_suffix("[]").unwrap_or(kind)
}

fn collect_dependencies(type_name: &str, out: &mut BTreeSet<&'static str>) -> Result<()> {
    let fields = schema(type_name)
        .ok_or_else(|| Error::Encoding(format!("unknown type '{type_name}'")))?;
    for f in fields {
        let elem = element_type(f.kind);
        if let Some((name, _)) = TYPES.iter().find(|(name, _)| *name == elem) {
            if out.insert(name) {
                collect_dependencies(name, out)?;
            }
        }
    }
    Ok(())
}

/// The deterministic schema string for `type_name`: the primary type first,
/// then every transitively referenced struct type, each declared exactly
/// once, sorted by name.
pub fn encode_type(type_name: &str) -> Result<String> {
    let mut deps = BTreeSet::new();
    collect_dependencies(type_name, &mut deps)?;
    deps.remove(type_name);

    let mut ordered = vec![type_name];
    ordered.extend(deps);

    let mut encoded = String::new();
    for name in ordered {
        let fields = schema(name)
            .ok_or_else(|| Error::Encoding(format!("unknown type '{name}'")))?;
        encoded.push_str(name);
        encoded.push('(');
        for (i, f) in fields.iter().enumerate() {
            if i > 0 {
                encoded.push(',');
            }
            encoded.push_str(f.kind);
            encoded.push(' ');
            encoded.push_str(f.name);
        }
        encoded.push(')');
    }
    Ok(encoded)
}

/// Hash of the schema string for `type_name`.
pub fn type_hash(type_name: &str) -> Result<B256> {
    Ok(keccak256(encode_type(type_name)?.as_bytes()))
}

fn hex_bytes(context: &str, value: &Value) -> Result<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| Error::Encoding(format!("{context}: expected a hex string")))?;
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| Error::Encoding(format!("{context}: {e}")))
}

fn encode_address(context: &str, value: &Value) -> Result<[u8; 32]> {
    let s = value
        .as_str()
        .ok_or_else(|| Error::Encoding(format!("{context}: expected an address string")))?;
    let address =
        Address::from_str(s).map_err(|e| Error::Encoding(format!("{context}: {e}")))?;
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    Ok(word)
}

fn encode_uint256(context: &str, value: &Value) -> Result<[u8; 32]> {
    let parsed = match value {
        Value::Number(n) => {
            let n = n
                .as_u64()
                .ok_or_else(|| Error::Encoding(format!("{context}: expected a uint")))?;
            U256::from(n)
        }
        Value::String(s) => {
            U256::from_str(s).map_err(|e| Error::Encoding(format!("{context}: {e}")))?
        }
        _ => return Err(Error::Encoding(format!("{context}: expected a uint"))),
    };
    Ok(parsed.to_be_bytes::<32>())
}

fn encode_bytes32(context: &str, value: &Value) -> Result<[u8; 32]> {
    let bytes = hex_bytes(context, value)?;
    let word: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
        Error::Encoding(format!("{context}: expected 32 bytes, got {}", b.len()))
    })?;
    Ok(word)
}

/// Encode one value as its 32-byte word per the declared type: atomic values
/// in place, dynamic `bytes`/`string` as the hash of their contents, structs
/// as their struct hash.
fn encode_value(kind: &str, context: &str, value: &Value) -> Result<[u8; 32]> {
    match kind {
        "address" => encode_address(context, value),
        "uint256" => encode_uint256(context, value),
        "bytes32" => encode_bytes32(context, value),
        "bytes" => Ok(keccak256(hex_bytes(context, value)?).0),
        "string" => {
            let s = value
                .as_str()
                .ok_or_else(|| Error::Encoding(format!("{context}: expected a string")))?;
            Ok(keccak256(s.as_bytes()).0)
        }
        _ if schema(kind).is_some() => Ok(struct_hash(kind, value)?.0),
        _ => Err(Error::Encoding(format!(
            "{context}: unknown field type '{kind}'"
        ))),
    }
}

fn encode_field(f: &TypeField, type_name: &str, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let context = format!("{type_name}.{}", f.name);
    if let Some(elem) = f.kind.strip_suffix("[]") {
        let items = value
            .as_array()
            .ok_or_else(|| Error::Encoding(format!("{context}: expected an array")))?;
        let mut encoded = Vec::with_capacity(items.len() * 32);
        for (i, item) in items.iter().enumerate() {
            let word = encode_value(elem, &format!("{context}[{i}]"), item)?;
            encoded.extend_from_slice(&word);
        }
        out.extend_from_slice(keccak256(&encoded).as_slice());
    } else {
        out.extend_from_slice(&encode_value(f.kind, &context, value)?);
    }
    Ok(())
}

/// Canonical hash of `value` encoded as `type_name`:
/// `keccak256(typeHash ‖ encoded fields)`.
///
/// Message keys not declared in the schema are ignored; declared fields must
/// all be present.
pub fn struct_hash(type_name: &str, value: &Value) -> Result<B256> {
    let fields = schema(type_name)
        .ok_or_else(|| Error::Encoding(format!("unknown type '{type_name}'")))?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::Encoding(format!("{type_name}: expected an object")))?;

    let mut encoded = Vec::with_capacity((fields.len() + 1) * 32);
    encoded.extend_from_slice(type_hash(type_name)?.as_slice());
    for f in fields {
        let field_value = object.get(f.name).ok_or_else(|| {
            Error::Encoding(format!("{type_name}.{}: missing field", f.name))
        })?;
        encode_field(f, type_name, field_value, &mut encoded)?;
    }
    Ok(keccak256(&encoded))
}

/// Domain separator for a contract: the struct hash of
/// `{name, version: "1", chainId, verifyingContract}`.
pub fn domain_separator(info: &ContractInfo) -> B256 {
    // EIP712Domain is atomic-only, so the encoding is done directly rather
    // than through the JSON path.
    let domain_type =
        "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(keccak256(domain_type.as_bytes()).as_slice());
    encoded.extend_from_slice(keccak256(info.name.as_bytes()).as_slice());
    encoded.extend_from_slice(keccak256(DOMAIN_VERSION.as_bytes()).as_slice());
    encoded.extend_from_slice(&U256::from(info.chain_id).to_be_bytes::<32>());
    let mut contract_word = [0u8; 32];
    contract_word[12..].copy_from_slice(info.verifying_contract.as_slice());
    encoded.extend_from_slice(&contract_word);
    keccak256(&encoded)
}

/// The digest that is actually signed and recovered:
/// `keccak256(0x19 0x01 ‖ domainSeparator ‖ structHash)`.
pub fn digest(type_name: &str, message: &Value, info: &ContractInfo) -> Result<B256> {
    let mut preimage = Vec::with_capacity(2 + 32 + 32);
    preimage.extend_from_slice(&EIP712_PREFIX);
    preimage.extend_from_slice(domain_separator(info).as_slice());
    preimage.extend_from_slice(struct_hash(type_name, message)?.as_slice());
    Ok(keccak256(&preimage))
}

/// Digest of any serializable message.
pub fn digest_of<T: Serialize>(type_name: &str, message: &T, info: &ContractInfo) -> Result<B256> {
    digest(type_name, &serde_json::to_value(message)?, info)
}
