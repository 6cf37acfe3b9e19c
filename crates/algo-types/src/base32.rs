//! RFC 4648 base32 encoding without padding.
//!
//! Addresses and transaction ids use the plain A-Z 2-7 alphabet with the
//! trailing `=` padding stripped, so this codec never emits or accepts
//! padding characters.

use thiserror::Error;

/// RFC 4648 base32 alphabet.
const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

#[derive(Debug, Error)]
pub enum Base32Error {
    #[error("invalid character '{0}' at position {1}")]
    InvalidCharacter(char, usize),

    #[error("non-zero trailing bits in final character")]
    TrailingBits,
}

/// Build reverse alphabet lookup table at compile time.
const fn build_reverse_alphabet() -> [u8; 128] {
    let mut table = [0xFFu8; 128];
    let mut i = 0;
    while i < 32 {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

static REVERSE_ALPHABET: [u8; 128] = build_reverse_alphabet();

/// Encode binary data to unpadded base32.
pub fn encode(data: &[u8]) -> String {
    let mut result = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            result.push(ALPHABET[((buffer >> bits) & 0x1F) as usize] as char);
        }
    }

    if bits > 0 {
        result.push(ALPHABET[((buffer << (5 - bits)) & 0x1F) as usize] as char);
    }

    result
}

/// Decode unpadded base32 to binary data.
pub fn decode(encoded: &str) -> Result<Vec<u8>, Base32Error> {
    let mut result = Vec::with_capacity(encoded.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for (i, ch) in encoded.bytes().enumerate() {
        if ch >= 128 {
            return Err(Base32Error::InvalidCharacter(ch as char, i));
        }
        let value = REVERSE_ALPHABET[ch as usize];
        if value == 0xFF {
            return Err(Base32Error::InvalidCharacter(ch as char, i));
        }
        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            result.push(((buffer >> bits) & 0xFF) as u8);
        }
    }

    // The final character's leftover bits are encoding slack; a canonical
    // encoder always leaves them zero.
    if bits > 0 && buffer & ((1 << bits) - 1) != 0 {
        return Err(Base32Error::TrailingBits);
    }

    Ok(result)
}
