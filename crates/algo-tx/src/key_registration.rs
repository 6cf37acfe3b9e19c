//! Key registration builder: brings an account online for consensus
//! participation with its voting and VRF selection keys.

use crate::builder::{b64_key32, TransactionBuilder, TxnKind};
use crate::schema::{key_registration_schema, Schema};
use crate::types::{TxnFields, TxType};
use crate::TxError;

/// Kind state for a key registration.
#[derive(Debug, Default)]
pub struct KeyRegistration {
    vote_key: Option<[u8; 32]>,
    selection_key: Option<[u8; 32]>,
    vote_first: Option<u64>,
    vote_last: Option<u64>,
    vote_key_dilution: Option<u64>,
}

pub type KeyRegistrationBuilder = TransactionBuilder<KeyRegistration>;

impl TransactionBuilder<KeyRegistration> {
    /// The participation vote key, base64 of 32 bytes.
    pub fn vote_key(&mut self, key: &str) -> Result<&mut Self, TxError> {
        self.kind.vote_key = Some(b64_key32(key, "voteKey")?);
        Ok(self)
    }

    /// The VRF selection key, base64 of 32 bytes.
    pub fn selection_key(&mut self, key: &str) -> Result<&mut Self, TxError> {
        self.kind.selection_key = Some(b64_key32(key, "selectionKey")?);
        Ok(self)
    }

    pub fn vote_first(&mut self, round: u64) -> Result<&mut Self, TxError> {
        if round == 0 {
            return Err(TxError::InvalidParameter(
                "voteFirst must be a positive number".to_string(),
            ));
        }
        self.kind.vote_first = Some(round);
        Ok(self)
    }

    pub fn vote_last(&mut self, round: u64) -> Result<&mut Self, TxError> {
        if round == 0 {
            return Err(TxError::InvalidParameter(
                "voteLast must be a positive number".to_string(),
            ));
        }
        self.kind.vote_last = Some(round);
        Ok(self)
    }

    pub fn vote_key_dilution(&mut self, dilution: u64) -> Result<&mut Self, TxError> {
        if dilution == 0 {
            return Err(TxError::InvalidParameter(
                "voteKeyDilution must be a positive number".to_string(),
            ));
        }
        self.kind.vote_key_dilution = Some(dilution);
        Ok(self)
    }
}

impl TxnKind for KeyRegistration {
    const TX_TYPE: TxType = TxType::KeyRegistration;

    fn assemble(&self) -> Result<TxnFields, TxError> {
        let vote_key = self.vote_key.ok_or(TxError::MissingField("voteKey"))?;
        let selection_key = self.selection_key.ok_or(TxError::MissingField("selectionKey"))?;
        let vote_first = self.vote_first.ok_or(TxError::MissingField("voteFirst"))?;
        let vote_last = self.vote_last.ok_or(TxError::MissingField("voteLast"))?;
        let vote_key_dilution =
            self.vote_key_dilution.ok_or(TxError::MissingField("voteKeyDilution"))?;
        Ok(TxnFields::KeyRegistration {
            vote_key: Some(vote_key),
            selection_key: Some(selection_key),
            vote_first,
            vote_last,
            vote_key_dilution,
        })
    }

    fn absorb(&mut self, fields: &TxnFields) -> Result<(), TxError> {
        match fields {
            TxnFields::KeyRegistration {
                vote_key,
                selection_key,
                vote_first,
                vote_last,
                vote_key_dilution,
            } => {
                self.vote_key = *vote_key;
                self.selection_key = *selection_key;
                self.vote_first = Some(*vote_first);
                self.vote_last = Some(*vote_last);
                self.vote_key_dilution = Some(*vote_key_dilution);
                Ok(())
            }
            other => Err(TxError::InvalidTransaction(format!(
                "expected a key registration, got {}",
                other.tx_type()
            ))),
        }
    }

    fn schema() -> Schema {
        key_registration_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algo_types::address::Address;
    use algo_types::Network;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn configured() -> KeyRegistrationBuilder {
        let mut builder = KeyRegistrationBuilder::new();
        builder.fee(1000).unwrap();
        builder.first_round(5000).unwrap();
        builder.last_round(6000).unwrap();
        builder.sender(&Address([0x01; 32]).encode()).unwrap();
        builder.on_network(Network::TestNet);
        builder.vote_key(&STANDARD.encode([0x11; 32])).unwrap();
        builder.selection_key(&STANDARD.encode([0x22; 32])).unwrap();
        builder.vote_first(5000).unwrap();
        builder.vote_last(3_000_000).unwrap();
        builder.vote_key_dilution(1733).unwrap();
        builder
    }

    #[test]
    fn test_build_key_registration() {
        let mut builder = configured();
        let txn = builder.build().unwrap();
        assert_eq!(txn.tx_type(), Some(TxType::KeyRegistration));
        assert_eq!(txn.id().unwrap().len(), 52);
    }

    #[test]
    fn test_keys_must_be_32_byte_base64() {
        let mut builder = KeyRegistrationBuilder::new();
        assert!(builder.vote_key("not base64!").is_err());
        assert!(builder.vote_key(&STANDARD.encode([0u8; 16])).is_err());
        assert!(builder.selection_key(&STANDARD.encode([0u8; 48])).is_err());
        builder.vote_key(&STANDARD.encode([0x11; 32])).unwrap();
    }

    #[test]
    fn test_vote_rounds_must_be_positive() {
        let mut builder = KeyRegistrationBuilder::new();
        assert!(builder.vote_first(0).is_err());
        assert!(builder.vote_last(0).is_err());
        assert!(builder.vote_key_dilution(0).is_err());
    }

    #[test]
    fn test_inverted_vote_window_rejected_at_build() {
        let mut builder = configured();
        builder.vote_first(4_000_000).unwrap();
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("voteFirst cannot be greater than voteLast"));
    }

    #[test]
    fn test_missing_vote_key_reported() {
        let mut builder = KeyRegistrationBuilder::new();
        builder.fee(1000).unwrap();
        builder.first_round(1).unwrap();
        builder.last_round(2).unwrap();
        builder.sender(&Address([0x01; 32]).encode()).unwrap();
        builder.on_network(Network::TestNet);

        let err = builder.build().unwrap_err();
        assert!(matches!(err, TxError::MissingField("voteKey")));
    }

    #[test]
    fn test_from_round_trips() {
        let mut builder = configured();
        let bytes = builder.build().unwrap().to_bytes().unwrap();
        let id = builder.transaction().id().unwrap();

        let mut parsed = KeyRegistrationBuilder::new();
        parsed.from(&bytes).unwrap();
        assert_eq!(parsed.transaction().id().unwrap(), id);
        assert_eq!(parsed.transaction().to_bytes().unwrap(), bytes);
    }
}
