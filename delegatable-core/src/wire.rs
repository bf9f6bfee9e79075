//! Wire format: the wallet-facing typed-data envelope and portable JSON.
//!
//! External signing infrastructure consumes a JSON envelope
//! `{types, primaryType, domain, message}` enumerating the full protocol
//! schema. The envelope produced here hashes to exactly the digest computed
//! by [`crate::typed_data`], so a wallet signature over it recovers
//! identically.
//!
//! ## Security Limits
//!
//! Decoding untrusted JSON is capped at [`MAX_PAYLOAD_SIZE`] to prevent
//! memory exhaustion. Typical invitations are a few KB.

use crate::error::{Error, Result};
use crate::typed_data::{ContractInfo, TYPES};
use crate::DOMAIN_VERSION;
use alloy_primitives::Address;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum allowed size for a decoded JSON payload in bytes (64 KB).
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// The signing domain as it appears in the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl From<&ContractInfo> for Domain {
    fn from(info: &ContractInfo) -> Self {
        Self {
            name: info.name.clone(),
            version: DOMAIN_VERSION.to_string(),
            chain_id: info.chain_id,
            verifying_contract: info.verifying_contract,
        }
    }
}

/// The complete typed-data envelope handed to external wallet
/// infrastructure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedMessage {
    pub types: Value,
    pub primary_type: String,
    pub domain: Domain,
    pub message: Value,
}

/// The full schema table in envelope form: type name → field list.
pub fn schema_json() -> Value {
    let mut types = serde_json::Map::new();
    for (name, fields) in TYPES {
        // TypeField serialization is infallible.
        let rendered = fields
            .iter()
            .map(|f| serde_json::to_value(f).unwrap_or(Value::Null))
            .collect();
        types.insert((*name).to_string(), Value::Array(rendered));
    }
    Value::Object(types)
}

/// Build the envelope for signing `message` as `primary_type` under the
/// given contract domain.
pub fn typed_message<T: Serialize>(
    primary_type: &str,
    message: &T,
    info: &ContractInfo,
) -> Result<TypedMessage> {
    Ok(TypedMessage {
        types: schema_json(),
        primary_type: primary_type.to_string(),
        domain: Domain::from(info),
        message: serde_json::to_value(message)?,
    })
}

/// Encode any protocol object to its portable JSON form.
pub fn encode_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a protocol object from untrusted JSON.
///
/// Returns `PayloadTooLarge` if the input exceeds [`MAX_PAYLOAD_SIZE`].
pub fn decode_json<T: DeserializeOwned>(data: &str) -> Result<T> {
    // Check size BEFORE attempting deserialization.
    if data.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::PayloadTooLarge {
            size: data.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(serde_json::from_str(data)?)
}
