//! Ed25519 account keys.
//!
//! A ledger secret key is 64 bytes: the 32-byte seed followed by the
//! 32-byte public key. The embedded public key is redundant but
//! conventional, and is cross-checked against the derived key on import.

use algo_types::address::Address;
use algo_types::constants::SIGNATURE_LENGTH;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

/// Length of a seed (the private scalar input) in bytes.
pub const SEED_LENGTH: usize = 32;

/// Length of a full secret key (seed followed by public key) in bytes.
pub const SECRET_KEY_LENGTH: usize = 64;

/// Length of a public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("secret key must be 64 bytes, got {0}")]
    InvalidSecretKeyLength(usize),

    #[error("public key must be 32 bytes, got {0}")]
    InvalidPublicKeyLength(usize),

    #[error("embedded public key does not match the derived public key")]
    PublicKeyMismatch,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("key material is neither valid hex nor valid base64")]
    UnrecognizedEncoding,

    #[error("key pair has no secret key")]
    MissingSecretKey,
}

/// An ed25519 key pair. The secret half is optional so verify-only pairs
/// imported from a bare public key share the same type.
#[derive(Clone)]
pub struct KeyPair {
    signing: Option<SigningKey>,
    verifying: VerifyingKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS entropy source.
    pub fn random() -> Self {
        let signing = SigningKey::generate(&mut OsRng);
        let verifying = signing.verifying_key();
        KeyPair { signing: Some(signing), verifying }
    }

    /// Derive a key pair from a 32-byte seed.
    pub fn from_seed(seed: [u8; SEED_LENGTH]) -> Self {
        let signing = SigningKey::from_bytes(&seed);
        let verifying = signing.verifying_key();
        KeyPair { signing: Some(signing), verifying }
    }

    /// Import a 64-byte secret key (seed followed by public key). The
    /// embedded public key must match the one derived from the seed.
    pub fn from_secret_key(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKeyLength(bytes.len()));
        }
        let mut seed = [0u8; SEED_LENGTH];
        seed.copy_from_slice(&bytes[..SEED_LENGTH]);
        let signing = SigningKey::from_bytes(&seed);
        let verifying = signing.verifying_key();
        if verifying.as_bytes()[..] != bytes[SEED_LENGTH..] {
            return Err(KeyError::PublicKeyMismatch);
        }
        Ok(KeyPair { signing: Some(signing), verifying })
    }

    /// Import a verify-only pair from a 32-byte public key.
    pub fn from_public_key(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(KeyError::InvalidPublicKeyLength(bytes.len()));
        }
        let mut key = [0u8; PUBLIC_KEY_LENGTH];
        key.copy_from_slice(bytes);
        let verifying = VerifyingKey::from_bytes(&key)
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
        Ok(KeyPair { signing: None, verifying })
    }

    /// Whether this pair can sign.
    pub fn has_secret_key(&self) -> bool {
        self.signing.is_some()
    }

    /// The public key bytes.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying.to_bytes()
    }

    /// The full 64-byte secret key (seed followed by public key), if present.
    pub fn secret_key(&self) -> Option<[u8; SECRET_KEY_LENGTH]> {
        self.signing.as_ref().map(|signing| {
            let mut out = [0u8; SECRET_KEY_LENGTH];
            out[..SEED_LENGTH].copy_from_slice(&signing.to_bytes());
            out[SEED_LENGTH..].copy_from_slice(&self.verifying.to_bytes());
            out
        })
    }

    /// The account address derived from the public key.
    pub fn address(&self) -> Address {
        Address(self.verifying.to_bytes())
    }

    /// Sign a message, returning the 64-byte signature.
    pub fn sign_bytes(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], KeyError> {
        let signing = self.signing.as_ref().ok_or(KeyError::MissingSecretKey)?;
        Ok(signing.sign(message).to_bytes())
    }

    /// Verify a signature over a message against this pair's public key.
    pub fn verify_bytes(&self, message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> bool {
        self.verifying
            .verify(message, &Signature::from_bytes(signature))
            .is_ok()
    }
}

// Secret material stays out of debug output.
impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.verifying.to_bytes()))
            .field("has_secret_key", &self.signing.is_some())
            .finish()
    }
}

/// Raw key material as supplied by a caller: either bytes, or text that may
/// be hex or base64.
#[derive(Clone)]
pub enum KeySpec {
    Bytes(Vec<u8>),
    Text(String),
}

impl KeySpec {
    /// Decode to raw bytes without interpreting them as a key. Text is
    /// tried as hex first, then as base64.
    fn decode(&self) -> Result<Vec<u8>, KeyError> {
        match self {
            KeySpec::Bytes(bytes) => Ok(bytes.clone()),
            KeySpec::Text(text) => {
                if let Ok(bytes) = hex::decode(text) {
                    return Ok(bytes);
                }
                base64::engine::general_purpose::STANDARD
                    .decode(text)
                    .map_err(|_| KeyError::UnrecognizedEncoding)
            }
        }
    }
}

impl std::fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySpec::Bytes(bytes) => write!(f, "KeySpec::Bytes({} bytes)", bytes.len()),
            KeySpec::Text(text) => write!(f, "KeySpec::Text({} chars)", text.len()),
        }
    }
}

/// Normalize caller-supplied key material into a signing key pair.
pub fn normalize_secret_key(spec: &KeySpec) -> Result<KeyPair, KeyError> {
    KeyPair::from_secret_key(&spec.decode()?)
}

/// Whether base64 text decodes to a well-formed 64-byte secret key.
pub fn is_valid_secret_key(text: &str) -> bool {
    let decoded = match base64::engine::general_purpose::STANDARD.decode(text) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    KeyPair::from_secret_key(&decoded).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let pair = KeyPair::random();
        let message = b"arbitrary payload";
        let signature = pair.sign_bytes(message).unwrap();
        assert!(pair.verify_bytes(message, &signature));
        assert!(!pair.verify_bytes(b"different payload", &signature));
    }

    #[test]
    fn test_from_seed_deterministic() {
        let a = KeyPair::from_seed([7u8; SEED_LENGTH]);
        let b = KeyPair::from_seed([7u8; SEED_LENGTH]);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.secret_key(), b.secret_key());
    }

    #[test]
    fn test_secret_key_roundtrip() {
        let pair = KeyPair::random();
        let secret = pair.secret_key().unwrap();
        let restored = KeyPair::from_secret_key(&secret).unwrap();
        assert_eq!(restored.public_key(), pair.public_key());
    }

    #[test]
    fn test_embedded_public_key_mismatch() {
        let pair = KeyPair::random();
        let mut secret = pair.secret_key().unwrap();
        secret[SEED_LENGTH] ^= 0x01;
        assert!(matches!(
            KeyPair::from_secret_key(&secret),
            Err(KeyError::PublicKeyMismatch)
        ));
    }

    #[test]
    fn test_secret_key_length() {
        assert!(matches!(
            KeyPair::from_secret_key(&[0u8; 32]),
            Err(KeyError::InvalidSecretKeyLength(32))
        ));
    }

    #[test]
    fn test_public_only_pair() {
        let pair = KeyPair::random();
        let public = KeyPair::from_public_key(&pair.public_key()).unwrap();
        assert!(!public.has_secret_key());
        assert!(public.secret_key().is_none());
        assert!(matches!(
            public.sign_bytes(b"x"),
            Err(KeyError::MissingSecretKey)
        ));

        let signature = pair.sign_bytes(b"x").unwrap();
        assert!(public.verify_bytes(b"x", &signature));
    }

    #[test]
    fn test_normalize_accepts_bytes_hex_and_base64() {
        let pair = KeyPair::random();
        let secret = pair.secret_key().unwrap();

        let from_bytes = normalize_secret_key(&KeySpec::Bytes(secret.to_vec())).unwrap();
        let from_hex = normalize_secret_key(&KeySpec::Text(hex::encode(secret))).unwrap();
        let from_b64 = normalize_secret_key(&KeySpec::Text(
            base64::engine::general_purpose::STANDARD.encode(secret),
        ))
        .unwrap();

        assert_eq!(from_bytes.public_key(), pair.public_key());
        assert_eq!(from_hex.public_key(), pair.public_key());
        assert_eq!(from_b64.public_key(), pair.public_key());
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(matches!(
            normalize_secret_key(&KeySpec::Text("not-a-key!!".to_string())),
            Err(KeyError::UnrecognizedEncoding)
        ));
        // Valid hex, wrong length.
        assert!(matches!(
            normalize_secret_key(&KeySpec::Text("abcd".to_string())),
            Err(KeyError::InvalidSecretKeyLength(2))
        ));
    }

    #[test]
    fn test_is_valid_secret_key() {
        let pair = KeyPair::random();
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(pair.secret_key().unwrap());
        assert!(is_valid_secret_key(&encoded));
        assert!(!is_valid_secret_key("???"));
        assert!(!is_valid_secret_key(
            &base64::engine::general_purpose::STANDARD.encode([0u8; 16])
        ));
    }

    #[test]
    fn test_address_derivation() {
        let pair = KeyPair::random();
        let address = pair.address();
        assert_eq!(address.as_bytes(), &pair.public_key());
        assert_eq!(address.encode().len(), 58);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let pair = KeyPair::random();
        let debug = format!("{:?}", pair);
        let secret_hex = hex::encode(pair.secret_key().unwrap());
        assert!(!debug.contains(&secret_hex[..16]));
        assert!(debug.contains("has_secret_key"));
    }
}
