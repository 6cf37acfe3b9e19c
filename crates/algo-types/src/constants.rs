//! Ledger constants, field limits, and network parameters.

use serde::{Deserialize, Serialize};

// =============================================================================
// Fees and Field Limits
// =============================================================================

/// Minimum flat transaction fee in microalgos.
pub const MIN_TXN_FEE: u64 = 1000;

/// Maximum length of the optional note field in bytes.
pub const MAX_NOTE_LENGTH: usize = 1000;

// =============================================================================
// Key and Data Sizes
// =============================================================================

/// Size of an ed25519 public key in bytes.
pub const KEY_LENGTH: usize = 32;

/// Size of the address checksum in bytes.
pub const CHECKSUM_LENGTH: usize = 4;

/// Length of an encoded address string (unpadded base32 of key + checksum).
pub const ADDRESS_LENGTH: usize = 58;

/// Size of a genesis hash or group id in bytes.
pub const HASH_LENGTH: usize = 32;

/// Size of a lease (anti-replay nonce) in bytes.
pub const LEASE_LENGTH: usize = 32;

/// Size of an ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Domain separator prepended to a canonical transaction body before
/// signing it or hashing it into a transaction id.
pub const TX_ID_PREFIX: &[u8] = b"TX";

// =============================================================================
// Networks
// =============================================================================

/// Network type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    MainNet,
    TestNet,
    BetaNet,
}

// Genesis hashes: the raw bytes of the conventional base64 `gh` values.
const MAINNET_GENESIS_HASH: [u8; HASH_LENGTH] = [
    0xc0, 0x61, 0xc4, 0xd8, 0xfc, 0x1d, 0xbd, 0xde, 0xd2, 0xd7, 0x60, 0x4b,
    0xe4, 0x56, 0x8e, 0x3f, 0x6d, 0x04, 0x19, 0x87, 0xac, 0x37, 0xbd, 0xe4,
    0xb6, 0x20, 0xb5, 0xab, 0x39, 0x24, 0x8a, 0xdf,
];

const TESTNET_GENESIS_HASH: [u8; HASH_LENGTH] = [
    0x48, 0x63, 0xb5, 0x18, 0xa4, 0xb3, 0xc8, 0x4e, 0xc8, 0x10, 0xf2, 0x2d,
    0x4f, 0x10, 0x81, 0xcb, 0x0f, 0x71, 0xf0, 0x59, 0xa7, 0xac, 0x20, 0xde,
    0xc6, 0x2f, 0x7f, 0x70, 0xe5, 0x09, 0x3a, 0x22,
];

const BETANET_GENESIS_HASH: [u8; HASH_LENGTH] = [
    0x98, 0x58, 0x1a, 0xcc, 0x5f, 0xb6, 0xb9, 0x14, 0xb5, 0xb4, 0xc8, 0x8b,
    0xf5, 0xdb, 0x23, 0xd3, 0x58, 0x49, 0x1b, 0x24, 0x84, 0x98, 0xf3, 0x76,
    0xf0, 0x1f, 0xd3, 0x8e, 0x3b, 0xe9, 0x55, 0x6d,
];

impl Network {
    /// The genesis id string (the wire `gen` field).
    pub fn genesis_id(&self) -> &'static str {
        match self {
            Self::MainNet => "mainnet-v1.0",
            Self::TestNet => "testnet-v1.0",
            Self::BetaNet => "betanet-v1.0",
        }
    }

    /// The genesis hash (the wire `gh` field), raw bytes.
    pub fn genesis_hash(&self) -> [u8; HASH_LENGTH] {
        match self {
            Self::MainNet => MAINNET_GENESIS_HASH,
            Self::TestNet => TESTNET_GENESIS_HASH,
            Self::BetaNet => BETANET_GENESIS_HASH,
        }
    }

    /// The genesis hash in its conventional base64 form.
    pub fn genesis_hash_b64(&self) -> &'static str {
        match self {
            Self::MainNet => "wGHE2Pwdvd7S12BL5FaOP20EGYesN73ktiC1qzkkit8=",
            Self::TestNet => "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=",
            Self::BetaNet => "mFgazF+2uRS1tMiL9dsj01hJGySEmPN28B/TjjvpVW0=",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.genesis_id())
    }
}
