//! Account address encoding, parsing, and validation.
//!
//! An address is the unpadded base32 form of a 32-byte ed25519 public key
//! followed by a 4-byte checksum (the trailing bytes of the key's
//! SHA-512/256 digest), 58 characters in total.

use crate::base32;
use crate::constants::{ADDRESS_LENGTH, CHECKSUM_LENGTH, KEY_LENGTH};
use sha2::{Digest, Sha512_256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address must be a non-empty string")]
    Empty,

    #[error("invalid address length ({0}, expected 58)")]
    InvalidLength(usize),

    #[error("base32 decode error: {0}")]
    Base32(#[from] base32::Base32Error),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("public key must be {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },
}

/// A 32-byte public key interpreted as an account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; KEY_LENGTH]);

impl Address {
    /// The zero address (all-zero public key).
    pub const ZERO: Address = Address([0u8; KEY_LENGTH]);

    /// Wrap raw public key bytes.
    pub fn from_public_key(key: &[u8]) -> Result<Self, AddressError> {
        if key.len() != KEY_LENGTH {
            return Err(AddressError::InvalidKeySize {
                expected: KEY_LENGTH,
                actual: key.len(),
            });
        }
        let mut bytes = [0u8; KEY_LENGTH];
        bytes.copy_from_slice(key);
        Ok(Address(bytes))
    }

    /// The raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Checksum over a public key: the trailing 4 bytes of SHA-512/256.
    fn checksum(key: &[u8; KEY_LENGTH]) -> [u8; CHECKSUM_LENGTH] {
        let digest = Sha512_256::digest(key);
        let mut checksum = [0u8; CHECKSUM_LENGTH];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LENGTH..]);
        checksum
    }

    /// Encode to the 58-character string form.
    pub fn encode(&self) -> String {
        let mut data = [0u8; KEY_LENGTH + CHECKSUM_LENGTH];
        data[..KEY_LENGTH].copy_from_slice(&self.0);
        data[KEY_LENGTH..].copy_from_slice(&Self::checksum(&self.0));
        base32::encode(&data)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s)
    }
}

/// Parse and validate an address string. No normalization: surrounding
/// whitespace fails the length check like any other stray character.
pub fn parse_address(address: &str) -> Result<Address, AddressError> {
    if address.is_empty() {
        return Err(AddressError::Empty);
    }
    if address.len() != ADDRESS_LENGTH {
        return Err(AddressError::InvalidLength(address.len()));
    }

    let decoded = base32::decode(address)?;
    if decoded.len() != KEY_LENGTH + CHECKSUM_LENGTH {
        return Err(AddressError::InvalidLength(address.len()));
    }

    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&decoded[..KEY_LENGTH]);

    if decoded[KEY_LENGTH..] != Address::checksum(&key) {
        return Err(AddressError::ChecksumMismatch);
    }

    Ok(Address(key))
}

/// Validate an address string.
pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[test]
    fn test_zero_address() {
        assert_eq!(Address::ZERO.encode(), ZERO_ADDRESS);
        assert_eq!(parse_address(ZERO_ADDRESS).unwrap(), Address::ZERO);
    }

    #[test]
    fn test_known_vector() {
        let address = Address([0x01; 32]);
        assert_eq!(
            address.encode(),
            "AEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEA5RCDXMI"
        );
    }

    #[test]
    fn test_roundtrip() {
        let key: Vec<u8> = (0..32u8).collect();
        let address = Address::from_public_key(&key).unwrap();
        let encoded = address.encode();
        assert_eq!(encoded.len(), ADDRESS_LENGTH);
        let parsed = parse_address(&encoded).unwrap();
        assert_eq!(parsed, address);
        assert_eq!(parsed.as_bytes()[..], key[..]);
    }

    #[test]
    fn test_malformed_strings() {
        assert!(matches!(parse_address(""), Err(AddressError::Empty)));
        assert!(matches!(parse_address("asdf"), Err(AddressError::InvalidLength(4))));
        assert!(!is_valid_address("asdf"));
        assert!(is_valid_address(ZERO_ADDRESS));
    }

    #[test]
    fn test_checksum_mismatch() {
        // Corrupt a character in the key portion; the string still decodes
        // but the checksum no longer matches.
        let mut corrupted = String::from(ZERO_ADDRESS);
        corrupted.replace_range(5..6, "B");
        assert!(matches!(
            parse_address(&corrupted),
            Err(AddressError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        let padded = format!("  {}\n", ZERO_ADDRESS);
        assert!(matches!(parse_address(&padded), Err(AddressError::InvalidLength(61))));
        assert!(!is_valid_address(&format!("{ZERO_ADDRESS}\n")));
    }

    #[test]
    fn test_from_public_key_length() {
        assert!(matches!(
            Address::from_public_key(&[0u8; 31]),
            Err(AddressError::InvalidKeySize { expected: 32, actual: 31 })
        ));
    }
}
