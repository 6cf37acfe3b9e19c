//! Payment transaction builder.

use crate::builder::{TransactionBuilder, TxnKind};
use crate::schema::{payment_schema, Schema};
use crate::types::{TxnFields, TxType};
use crate::TxError;
use algo_types::address::{parse_address, Address};

/// Kind state for a payment.
#[derive(Debug, Default)]
pub struct Transfer {
    amount: Option<u64>,
    receiver: Option<Address>,
    close_to: Option<Address>,
}

pub type TransferBuilder = TransactionBuilder<Transfer>;

impl TransactionBuilder<Transfer> {
    /// Amount in microalgos. Zero is legal; a zero payment can still carry
    /// a close-out or rekey.
    pub fn amount(&mut self, amount: u64) -> &mut Self {
        self.kind.amount = Some(amount);
        self
    }

    pub fn receiver(&mut self, address: &str) -> Result<&mut Self, TxError> {
        self.kind.receiver = Some(parse_address(address)?);
        Ok(self)
    }

    /// Close the sender account, sending its remaining balance here.
    pub fn close_remainder_to(&mut self, address: &str) -> Result<&mut Self, TxError> {
        self.kind.close_to = Some(parse_address(address)?);
        Ok(self)
    }
}

impl TxnKind for Transfer {
    const TX_TYPE: TxType = TxType::Payment;

    fn assemble(&self) -> Result<TxnFields, TxError> {
        let amount = self.amount.ok_or(TxError::MissingField("amount"))?;
        let receiver = self.receiver.ok_or(TxError::MissingField("receiver"))?;
        Ok(TxnFields::Payment { amount, receiver: Some(receiver), close_to: self.close_to })
    }

    fn absorb(&mut self, fields: &TxnFields) -> Result<(), TxError> {
        match fields {
            TxnFields::Payment { amount, receiver, close_to } => {
                self.amount = Some(*amount);
                self.receiver = *receiver;
                self.close_to = *close_to;
                Ok(())
            }
            other => Err(TxError::InvalidTransaction(format!(
                "expected a payment, got {}",
                other.tx_type()
            ))),
        }
    }

    fn schema() -> Schema {
        payment_schema()
    }
}
