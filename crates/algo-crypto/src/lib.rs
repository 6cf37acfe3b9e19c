//! Key management and wire-format primitives for algo-rs.
//!
//! Two concerns live here: ed25519 account keys (generation, import,
//! signing) and the canonical MessagePack subset the ledger uses for
//! transaction encoding.

pub mod keys;
pub mod msgpack;

pub use keys::{is_valid_secret_key, normalize_secret_key, KeyError, KeyPair, KeySpec};
pub use msgpack::{Cursor, MsgpackError, Value};
