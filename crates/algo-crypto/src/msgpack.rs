//! Canonical MessagePack subset for the ledger wire format.
//!
//! Canonical form means map keys sorted by raw bytes, integers in their
//! smallest encoding, and definite-length markers only. Zero-value omission
//! (a zero int or empty field is not encoded at all) is the transaction
//! layer's policy; entries are filtered before the writer sees them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MsgpackError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),

    #[error("expected {expected} at offset {offset}, found marker 0x{found:02x}")]
    TypeMismatch {
        expected: &'static str,
        found: u8,
        offset: usize,
    },

    #[error("length {0} exceeds the encodable maximum")]
    TooLong(usize),

    #[error("trailing bytes after value at offset {0}")]
    TrailingBytes(usize),
}

// ─── Writer ──────────────────────────────────────────────────────────────────

/// Write an unsigned integer in its smallest encoding.
pub fn write_uint(buf: &mut Vec<u8>, value: u64) {
    if value <= 0x7f {
        buf.push(value as u8);
    } else if value <= 0xff {
        buf.push(0xcc);
        buf.push(value as u8);
    } else if value <= 0xffff {
        buf.push(0xcd);
        buf.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= 0xffff_ffff {
        buf.push(0xce);
        buf.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        buf.push(0xcf);
        buf.extend_from_slice(&value.to_be_bytes());
    }
}

/// Write a UTF-8 string (fixstr or str8).
pub fn write_str(buf: &mut Vec<u8>, value: &str) -> Result<(), MsgpackError> {
    let bytes = value.as_bytes();
    if bytes.len() <= 31 {
        buf.push(0xa0 | bytes.len() as u8);
    } else if bytes.len() <= 0xff {
        buf.push(0xd9);
        buf.push(bytes.len() as u8);
    } else {
        return Err(MsgpackError::TooLong(bytes.len()));
    }
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Write a binary blob (bin8 or bin16).
pub fn write_bin(buf: &mut Vec<u8>, value: &[u8]) -> Result<(), MsgpackError> {
    if value.len() <= 0xff {
        buf.push(0xc4);
        buf.push(value.len() as u8);
    } else if value.len() <= 0xffff {
        buf.push(0xc5);
        buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
    } else {
        return Err(MsgpackError::TooLong(value.len()));
    }
    buf.extend_from_slice(value);
    Ok(())
}

/// Write a map header (fixmap or map16).
pub fn write_map_len(buf: &mut Vec<u8>, len: usize) -> Result<(), MsgpackError> {
    if len <= 15 {
        buf.push(0x80 | len as u8);
    } else if len <= 0xffff {
        buf.push(0xde);
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        return Err(MsgpackError::TooLong(len));
    }
    Ok(())
}

/// A value tree for composing canonical maps before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt(u64),
    Str(String),
    Bin(Vec<u8>),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Append the canonical encoding of this value. Map entries are sorted
    /// by raw key bytes regardless of insertion order.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), MsgpackError> {
        match self {
            Value::UInt(value) => {
                write_uint(buf, *value);
                Ok(())
            }
            Value::Str(value) => write_str(buf, value),
            Value::Bin(value) => write_bin(buf, value),
            Value::Map(entries) => {
                let mut sorted: Vec<&(String, Value)> = entries.iter().collect();
                sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
                write_map_len(buf, sorted.len())?;
                for (key, value) in sorted {
                    write_str(buf, key)?;
                    value.encode(buf)?;
                }
                Ok(())
            }
        }
    }

    /// Canonical encoding as a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MsgpackError> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

// ─── Reader ──────────────────────────────────────────────────────────────────

/// Bounds-checked reader over msgpack bytes. Strict: unknown markers are
/// errors, nothing is skipped.
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { data, offset: 0 }
    }

    /// Current read position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reset the read position (used for lookahead during envelope sniffing).
    pub fn seek(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Remaining unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], MsgpackError> {
        if self.remaining() < len {
            return Err(MsgpackError::UnexpectedEof(self.offset));
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take_byte(&mut self) -> Result<u8, MsgpackError> {
        Ok(self.take(1)?[0])
    }

    /// Read a map header, returning the entry count.
    pub fn read_map_len(&mut self) -> Result<usize, MsgpackError> {
        let offset = self.offset;
        let marker = self.take_byte()?;
        match marker {
            0x80..=0x8f => Ok((marker & 0x0f) as usize),
            0xde => {
                let len = self.take(2)?;
                Ok(u16::from_be_bytes([len[0], len[1]]) as usize)
            }
            _ => Err(MsgpackError::TypeMismatch { expected: "map", found: marker, offset }),
        }
    }

    /// Read a string (fixstr or str8).
    pub fn read_str(&mut self) -> Result<&'a str, MsgpackError> {
        let offset = self.offset;
        let marker = self.take_byte()?;
        let len = match marker {
            0xa0..=0xbf => (marker & 0x1f) as usize,
            0xd9 => self.take_byte()? as usize,
            _ => {
                return Err(MsgpackError::TypeMismatch {
                    expected: "string",
                    found: marker,
                    offset,
                })
            }
        };
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map_err(|_| MsgpackError::TypeMismatch {
            expected: "utf-8 string",
            found: marker,
            offset,
        })
    }

    /// Read a binary blob (bin8 or bin16).
    pub fn read_bin(&mut self) -> Result<&'a [u8], MsgpackError> {
        let offset = self.offset;
        let marker = self.take_byte()?;
        let len = match marker {
            0xc4 => self.take_byte()? as usize,
            0xc5 => {
                let len = self.take(2)?;
                u16::from_be_bytes([len[0], len[1]]) as usize
            }
            _ => {
                return Err(MsgpackError::TypeMismatch {
                    expected: "binary",
                    found: marker,
                    offset,
                })
            }
        };
        self.take(len)
    }

    /// Read an unsigned integer of any width.
    pub fn read_uint(&mut self) -> Result<u64, MsgpackError> {
        let offset = self.offset;
        let marker = self.take_byte()?;
        match marker {
            0x00..=0x7f => Ok(marker as u64),
            0xcc => Ok(self.take_byte()? as u64),
            0xcd => {
                let b = self.take(2)?;
                Ok(u16::from_be_bytes([b[0], b[1]]) as u64)
            }
            0xce => {
                let b = self.take(4)?;
                Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64)
            }
            0xcf => {
                let b = self.take(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(b);
                Ok(u64::from_be_bytes(raw))
            }
            _ => Err(MsgpackError::TypeMismatch {
                expected: "unsigned integer",
                found: marker,
                offset,
            }),
        }
    }

    /// Error if any input remains unconsumed.
    pub fn finish(&self) -> Result<(), MsgpackError> {
        if self.remaining() > 0 {
            return Err(MsgpackError::TrailingBytes(self.offset));
        }
        Ok(())
    }
}
