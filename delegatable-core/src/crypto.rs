//! Signing and recovery primitives.
//!
//! Signatures are 65-byte recoverable ECDSA over secp256k1 (`r ‖ s ‖ v`),
//! computed over a 32-byte typed-data digest. Signing is deterministic
//! (RFC 6979): the same key and digest always produce the same signature.
//!
//! Private keys are wrapped in `Secret` for:
//! 1. Guaranteed zeroization on drop
//! 2. Prevention of accidental logging (Debug is redacted)
//! 3. Safe cloning (zeroizes the old memory)

use crate::error::{Error, Result};
use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use secrecy::{CloneableSecret, ExposeSecret, Secret, Zeroize};

/// Length of a recoverable signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// Length of a private key in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// A secp256k1 private key for signing delegations, invocations, and
/// revocation intents.
#[derive(Clone)]
pub struct PrivateKey {
    signing_key: Secret<SigningKeyWrapper>,
}

// Wrapper to implement Zeroize and Clone for the k256 SigningKey.
// k256's SigningKey zeroizes its scalar on Drop, so Zeroize is a no-op here.
struct SigningKeyWrapper(SigningKey);

impl Clone for SigningKeyWrapper {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Zeroize for SigningKeyWrapper {
    fn zeroize(&mut self) {
        // No-op: the inner key handles zeroization on Drop.
    }
}

impl CloneableSecret for SigningKeyWrapper {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("signing_key", &"***SECRET***")
            .finish()
    }
}

impl PrivateKey {
    /// Generate a new random private key.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        Self {
            signing_key: Secret::new(SigningKeyWrapper(signing_key)),
        }
    }

    /// Create a private key from 32 raw bytes.
    ///
    /// Fails with `InvalidKey` if the bytes are not a valid curve scalar
    /// (zero, or at least the group order).
    pub fn from_bytes(bytes: &[u8; PRIVATE_KEY_LENGTH]) -> Result<Self> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(Self {
            signing_key: Secret::new(SigningKeyWrapper(signing_key)),
        })
    }

    /// Create a private key from a hex string, with or without a `0x` prefix.
    ///
    /// Fails with `InvalidKey` unless the string decodes to exactly 32 bytes.
    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(stripped).map_err(|e| Error::InvalidKey(e.to_string()))?;
        let bytes: [u8; PRIVATE_KEY_LENGTH] = decoded.try_into().map_err(|b: Vec<u8>| {
            Error::InvalidKey(format!("expected 32 bytes, got {}", b.len()))
        })?;
        Self::from_bytes(&bytes)
    }

    /// The address corresponding to this key.
    pub fn address(&self) -> Address {
        Address::from_public_key(self.signing_key.expose_secret().0.verifying_key())
    }

    /// Sign a 32-byte digest, producing a recoverable signature.
    ///
    /// The signature is normalized to low-`s` form, as the external verifier
    /// requires.
    pub fn sign_digest(&self, digest: B256) -> Result<Signature> {
        let (signature, recovery_id) = self
            .signing_key
            .expose_secret()
            .0
            .sign_prehash_recoverable(digest.as_slice())?;

        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => {
                let flipped = RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
                    .ok_or_else(|| Error::Crypto("recovery id out of range".into()))?;
                (normalized, flipped)
            }
            None => (signature, recovery_id),
        };

        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = 27 + recovery_id.to_byte();
        Ok(Signature(bytes))
    }

    /// The raw secret key bytes.
    pub fn secret_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.signing_key.expose_secret().0.to_bytes().into()
    }

    /// The secret key as a `0x`-prefixed hex string.
    ///
    /// This exposes key material; only call it when serializing a keyed
    /// invitation for hand-off.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret_bytes()))
    }
}

/// A 65-byte recoverable signature (`r ‖ s ‖ v`).
///
/// `v` is written as `27 + recovery_id`; both `0`/`1` and `27`/`28` are
/// accepted when recovering.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Create a signature from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| {
            Error::InvalidSignature(format!("expected 65 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(bytes))
    }

    /// Parse a signature from a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let decoded =
            hex::decode(stripped).map_err(|e| Error::InvalidSignature(e.to_string()))?;
        Self::from_bytes(&decoded)
    }

    /// The signature as raw bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.0
    }

    /// The `r` component.
    pub fn r(&self) -> B256 {
        B256::from_slice(&self.0[..32])
    }

    /// The `s` component.
    pub fn s(&self) -> B256 {
        B256::from_slice(&self.0[32..64])
    }

    /// The recovery byte as written.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    fn recovery_id(&self) -> Result<RecoveryId> {
        let normalized = match self.v() {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - 27,
            v => {
                return Err(Error::InvalidSignature(format!(
                    "unknown recovery byte {v}"
                )))
            }
        };
        RecoveryId::from_byte(normalized)
            .ok_or_else(|| Error::InvalidSignature("recovery id out of range".into()))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature(0x{})", hex::encode(self.0))
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl serde::Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Recover the address that signed `digest`.
pub fn recover_address(digest: B256, signature: &Signature) -> Result<Address> {
    let rs = EcdsaSignature::from_slice(&signature.0[..64])
        .map_err(|e| Error::InvalidSignature(e.to_string()))?;
    let recovery_id = signature.recovery_id()?;
    let verifying_key = VerifyingKey::recover_from_prehash(digest.as_slice(), &rs, recovery_id)
        .map_err(|e| Error::Crypto(e.to_string()))?;
    Ok(Address::from_public_key(&verifying_key))
}
