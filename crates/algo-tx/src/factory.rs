//! Network-scoped entry point: hands out fresh builders and recovers one of
//! the right kind from raw transaction bytes.

use crate::asset_transfer::AssetTransferBuilder;
use crate::key_registration::KeyRegistrationBuilder;
use crate::transaction::Transaction;
use crate::transfer::TransferBuilder;
use crate::types::TxType;
use crate::TxError;
use algo_types::Network;
use log::debug;

/// A builder of whichever kind matched a byte stream.
#[derive(Debug)]
pub enum AnyBuilder {
    Transfer(TransferBuilder),
    AssetTransfer(AssetTransferBuilder),
    KeyRegistration(KeyRegistrationBuilder),
}

impl AnyBuilder {
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Transfer(_) => TxType::Payment,
            Self::AssetTransfer(_) => TxType::AssetTransfer,
            Self::KeyRegistration(_) => TxType::KeyRegistration,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Transfer(builder) => builder.transaction(),
            Self::AssetTransfer(builder) => builder.transaction(),
            Self::KeyRegistration(builder) => builder.transaction(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TransactionBuilderFactory {
    network: Network,
}

impl TransactionBuilderFactory {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// A payment builder preconfigured for this factory's network.
    pub fn transfer_builder(&self) -> TransferBuilder {
        let mut builder = TransferBuilder::new();
        builder.on_network(self.network);
        builder
    }

    pub fn asset_transfer_builder(&self) -> AssetTransferBuilder {
        let mut builder = AssetTransferBuilder::new();
        builder.on_network(self.network);
        builder
    }

    pub fn key_registration_builder(&self) -> KeyRegistrationBuilder {
        let mut builder = KeyRegistrationBuilder::new();
        builder.on_network(self.network);
        builder
    }

    /// A builder for an already-known transaction type.
    pub fn builder_for_type(&self, tx_type: TxType) -> Result<AnyBuilder, TxError> {
        match tx_type {
            TxType::Payment => Ok(AnyBuilder::Transfer(self.transfer_builder())),
            TxType::AssetTransfer => Ok(AnyBuilder::AssetTransfer(self.asset_transfer_builder())),
            TxType::KeyRegistration => {
                Ok(AnyBuilder::KeyRegistration(self.key_registration_builder()))
            }
            TxType::AssetConfig => Err(TxError::NotImplemented("asset config builder")),
            TxType::AssetFreeze => Err(TxError::NotImplemented("asset freeze builder")),
            TxType::Application => Err(TxError::NotImplemented("application builder")),
        }
    }

    /// Recover a builder from raw bytes by offering them to each supported
    /// kind in turn. A kind that rejects them is skipped; if none accepts,
    /// the bytes are not a supported transaction.
    pub fn from(&self, raw: &[u8]) -> Result<AnyBuilder, TxError> {
        let mut builder = self.key_registration_builder();
        match builder.from(raw).map(|_| ()) {
            Ok(()) => return Ok(AnyBuilder::KeyRegistration(builder)),
            Err(err) => debug!("key registration probe rejected bytes: {err}"),
        }

        let mut builder = self.asset_transfer_builder();
        match builder.from(raw).map(|_| ()) {
            Ok(()) => return Ok(AnyBuilder::AssetTransfer(builder)),
            Err(err) => debug!("asset transfer probe rejected bytes: {err}"),
        }

        let mut builder = self.transfer_builder();
        match builder.from(raw).map(|_| ()) {
            Ok(()) => return Ok(AnyBuilder::Transfer(builder)),
            Err(err) => debug!("payment probe rejected bytes: {err}"),
        }

        Err(TxError::NotSupported)
    }
}
