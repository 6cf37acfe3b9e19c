//! Asset transfer builder, including opt-in (zero amount to self) and
//! clawback-style transfers.

use crate::builder::{TransactionBuilder, TxnKind};
use crate::schema::{asset_transfer_schema, Schema};
use crate::types::{TxnFields, TxType};
use crate::TxError;
use algo_types::address::{parse_address, Address};

/// Kind state for an asset transfer.
#[derive(Debug)]
pub struct AssetTransfer {
    asset_index: Option<u64>,
    amount: Option<u64>,
    receiver: Option<Address>,
    clawback: Option<Address>,
    close_to: Option<Address>,
    allow_zero_amount: bool,
}

impl Default for AssetTransfer {
    fn default() -> Self {
        Self {
            asset_index: None,
            amount: None,
            receiver: None,
            clawback: None,
            close_to: None,
            allow_zero_amount: true,
        }
    }
}

pub type AssetTransferBuilder = TransactionBuilder<AssetTransfer>;

impl TransactionBuilder<AssetTransfer> {
    /// Whether `asset_amount(0)` is accepted. On by default: a zero-amount
    /// transfer to self is how an account opts in to an asset. Turn it off
    /// to catch unset amounts early.
    pub fn allow_zero_amount(&mut self, allow: bool) -> &mut Self {
        self.kind.allow_zero_amount = allow;
        self
    }

    pub fn asset_index(&mut self, index: u64) -> Result<&mut Self, TxError> {
        if index == 0 {
            return Err(TxError::InvalidParameter(
                "assetIndex must be a positive number".to_string(),
            ));
        }
        self.kind.asset_index = Some(index);
        Ok(self)
    }

    pub fn asset_amount(&mut self, amount: u64) -> Result<&mut Self, TxError> {
        if amount == 0 && !self.kind.allow_zero_amount {
            return Err(TxError::InvalidParameter("assetAmount cannot be 0".to_string()));
        }
        self.kind.amount = Some(amount);
        Ok(self)
    }

    pub fn receiver(&mut self, address: &str) -> Result<&mut Self, TxError> {
        self.kind.receiver = Some(parse_address(address)?);
        Ok(self)
    }

    /// The account whose holdings are debited (wire `asnd`).
    pub fn clawback_address(&mut self, address: &str) -> Result<&mut Self, TxError> {
        self.kind.clawback = Some(parse_address(address)?);
        Ok(self)
    }

    /// Close out the asset holding, sending the remainder here.
    pub fn close_to(&mut self, address: &str) -> Result<&mut Self, TxError> {
        self.kind.close_to = Some(parse_address(address)?);
        Ok(self)
    }
}

impl TxnKind for AssetTransfer {
    const TX_TYPE: TxType = TxType::AssetTransfer;

    fn assemble(&self) -> Result<TxnFields, TxError> {
        let asset_index = self.asset_index.ok_or(TxError::MissingField("assetIndex"))?;
        let amount = self.amount.ok_or(TxError::MissingField("assetAmount"))?;
        let receiver = self.receiver.ok_or(TxError::MissingField("receiver"))?;
        let clawback = self.clawback.ok_or(TxError::MissingField("clawbackAddress"))?;
        Ok(TxnFields::AssetTransfer {
            asset_index,
            amount,
            receiver: Some(receiver),
            clawback: Some(clawback),
            close_to: self.close_to,
        })
    }

    fn absorb(&mut self, fields: &TxnFields) -> Result<(), TxError> {
        match fields {
            TxnFields::AssetTransfer { asset_index, amount, receiver, clawback, close_to } => {
                self.asset_index = Some(*asset_index);
                self.amount = Some(*amount);
                self.receiver = *receiver;
                self.clawback = *clawback;
                self.close_to = *close_to;
                Ok(())
            }
            other => Err(TxError::InvalidTransaction(format!(
                "expected an asset transfer, got {}",
                other.tx_type()
            ))),
        }
    }

    fn schema() -> Schema {
        asset_transfer_schema()
    }
}
