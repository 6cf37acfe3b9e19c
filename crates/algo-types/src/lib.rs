//! Core types and constants for the Algorand ledger family.
//!
//! This crate provides the foundational pieces used across all algo-rs
//! crates: network parameters, the unpadded base32 codec, account address
//! encoding/validation, and the size constants shared by the key and
//! transaction layers.

pub mod address;
pub mod base32;
pub mod constants;

pub use address::{is_valid_address, parse_address, Address, AddressError};
pub use constants::{Network, MIN_TXN_FEE};
