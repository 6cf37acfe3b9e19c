//! The transaction held by a builder: a validated body plus any attached
//! signatures. The body is only ever installed by a builder transition, so
//! holding a `Transaction` means its contents passed schema validation.

use crate::types::{decode_transaction, encode_body, encode_signed, SignatureEntry, TransactionBody, TxType};
use crate::TxError;
use algo_types::base32;
use algo_types::constants::TX_ID_PREFIX;
use sha2::{Digest, Sha512_256};

#[derive(Debug, Clone, Default)]
pub struct Transaction {
    body: Option<TransactionBody>,
    signatures: Vec<SignatureEntry>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> Option<&TransactionBody> {
        self.body.as_ref()
    }

    pub fn tx_type(&self) -> Option<TxType> {
        self.body.as_ref().map(TransactionBody::tx_type)
    }

    pub fn signatures(&self) -> &[SignatureEntry] {
        &self.signatures
    }

    pub fn signer_count(&self) -> usize {
        self.signatures.len()
    }

    fn require_body(&self) -> Result<&TransactionBody, TxError> {
        self.body
            .as_ref()
            .ok_or_else(|| TxError::InvalidTransaction("empty transaction".to_string()))
    }

    /// Install a freshly built body. Signatures from any previous build no
    /// longer match the bytes, so they are dropped.
    pub(crate) fn set_body(&mut self, body: TransactionBody) {
        self.body = Some(body);
        self.signatures.clear();
    }

    /// Install a body recovered from wire bytes together with the signature
    /// that arrived with it.
    pub(crate) fn set_signed_body(&mut self, body: TransactionBody, entry: Option<SignatureEntry>) {
        self.body = Some(body);
        self.signatures.clear();
        if let Some(entry) = entry {
            self.signatures.push(entry);
        }
    }

    pub(crate) fn attach_signature(&mut self, entry: SignatureEntry) {
        self.signatures.push(entry);
    }

    /// The bytes a signature commits to: the domain prefix followed by the
    /// canonical body encoding.
    pub fn signing_payload(&self) -> Result<Vec<u8>, TxError> {
        let encoded = encode_body(self.require_body()?)?;
        let mut payload = Vec::with_capacity(TX_ID_PREFIX.len() + encoded.len());
        payload.extend_from_slice(TX_ID_PREFIX);
        payload.extend_from_slice(&encoded);
        Ok(payload)
    }

    /// The transaction id: base32 of the SHA-512/256 digest of the signing
    /// payload, 52 characters.
    pub fn id(&self) -> Result<String, TxError> {
        let digest = Sha512_256::digest(self.signing_payload()?);
        Ok(base32::encode(&digest))
    }

    /// Wire encoding. With at least one signature attached this is the
    /// signed envelope; otherwise the bare body map.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TxError> {
        let body = self.require_body()?;
        match self.signatures.first() {
            Some(entry) => encode_signed(body, &entry.signature),
            None => encode_body(body),
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, TxError> {
        let (body, entry) = decode_transaction(data)?;
        let mut txn = Self::new();
        txn.set_signed_body(body, entry);
        Ok(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TxnFields, TxnHeader};
    use algo_types::address::Address;

    fn sample_body() -> TransactionBody {
        TransactionBody {
            header: TxnHeader {
                fee: 1000,
                first_round: 1,
                last_round: 10,
                sender: Some(Address([0x01; 32])),
                genesis_id: Some("testnet-v1.0".to_string()),
                genesis_hash: Some([0xAB; 32]),
                ..TxnHeader::default()
            },
            fields: TxnFields::Payment {
                amount: 5000,
                receiver: Some(Address([0x02; 32])),
                close_to: None,
            },
        }
    }

    #[test]
    fn test_empty_transaction_has_no_bytes() {
        let txn = Transaction::new();
        assert!(txn.body().is_none());
        assert_eq!(txn.signer_count(), 0);
        let err = txn.to_bytes().unwrap_err();
        assert!(err.to_string().contains("empty transaction"));
        assert!(txn.id().is_err());
    }

    #[test]
    fn test_id_is_stable() {
        let mut txn = Transaction::new();
        txn.set_body(sample_body());
        let id = txn.id().unwrap();
        assert_eq!(id.len(), 52);
        assert_eq!(id, "GQPWMUVG6SOB5OBTFINDCMUDGRZUBXMB4TFO3EXO4G5JJTUM7ECA");
        // The id covers the body only, not signatures.
        txn.attach_signature(SignatureEntry { public_key: [0x01; 32], signature: [0x5A; 64] });
        assert_eq!(txn.id().unwrap(), id);
    }

    #[test]
    fn test_signing_payload_has_domain_prefix() {
        let mut txn = Transaction::new();
        txn.set_body(sample_body());
        let payload = txn.signing_payload().unwrap();
        assert_eq!(&payload[..2], b"TX");
        assert_eq!(&payload[2..], &encode_body(&sample_body()).unwrap()[..]);
    }

    #[test]
    fn test_rebuild_clears_signatures() {
        let mut txn = Transaction::new();
        txn.set_body(sample_body());
        txn.attach_signature(SignatureEntry { public_key: [0x01; 32], signature: [0x5A; 64] });
        assert_eq!(txn.signer_count(), 1);
        txn.set_body(sample_body());
        assert_eq!(txn.signer_count(), 0);
    }

    #[test]
    fn test_unsigned_and_signed_bytes() {
        let mut txn = Transaction::new();
        txn.set_body(sample_body());
        let unsigned = txn.to_bytes().unwrap();
        assert_eq!(unsigned, encode_body(&sample_body()).unwrap());

        txn.attach_signature(SignatureEntry { public_key: [0x01; 32], signature: [0x5A; 64] });
        let signed = txn.to_bytes().unwrap();
        assert_ne!(signed, unsigned);

        let parsed = Transaction::from_bytes(&signed).unwrap();
        assert_eq!(parsed.body(), Some(&sample_body()));
        assert_eq!(parsed.signer_count(), 1);
        assert_eq!(parsed.signatures()[0].signature, [0x5A; 64]);
    }
}
