//! Transaction construction, validation, parsing, and signing for the
//! Algorand ledger family.
//!
//! Each transaction kind gets a fluent builder over a shared abstract core;
//! a factory recovers the right builder from raw bytes by trial decoding;
//! validation is two-tier: setters fail fast per field, and a declarative
//! schema checks the whole produced body at build/parse time.

pub mod builder;
pub mod factory;
pub mod schema;
pub mod transaction;
pub mod types;

pub mod asset_transfer;
pub mod key_registration;
pub mod transfer;

pub use asset_transfer::AssetTransferBuilder;
pub use builder::{TransactionBuilder, TxnKind};
pub use factory::{AnyBuilder, TransactionBuilderFactory};
pub use key_registration::KeyRegistrationBuilder;
pub use schema::{Schema, TxnSnapshot};
pub use transaction::Transaction;
pub use transfer::TransferBuilder;
pub use types::{SignatureEntry, TransactionBody, TxnFields, TxnHeader, TxType};

use algo_crypto::keys::KeyError;
use algo_types::address::AddressError;
use thiserror::Error;

/// Errors surfaced by builders, the factory, and the transaction envelope.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("address validation failed: {0}")]
    AddressValidation(#[from] AddressError),

    #[error("insufficient fee: {fee} is below the minimum of {min_fee}")]
    InsufficientFee { fee: u64, min_fee: u64 },

    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("transaction bytes did not match any supported kind")]
    NotSupported,

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}
