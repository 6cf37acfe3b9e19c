//! The builder lifecycle shared by every transaction kind.
//!
//! A builder is configured through fallible setters (each rejects bad input
//! immediately), then driven through one of two transitions: [`build`]
//! assembles a body from the configured fields, [`from`] recovers one from
//! wire bytes. Both validate against the kind's schema before the body is
//! stored, so a builder never holds a transaction that failed validation.
//!
//! [`build`]: TransactionBuilder::build
//! [`from`]: TransactionBuilder::from

use crate::schema::{Schema, TxnSnapshot};
use crate::transaction::Transaction;
use crate::types::{decode_transaction, SignatureEntry, TransactionBody, TxnFields, TxnHeader, TxType};
use crate::TxError;
use algo_crypto::keys::{normalize_secret_key, KeyPair, KeySpec};
use algo_types::address::{parse_address, Address};
use algo_types::constants::{HASH_LENGTH, KEY_LENGTH, LEASE_LENGTH, MAX_NOTE_LENGTH, MIN_TXN_FEE};
use algo_types::Network;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Kind-specific half of a builder: assembles its fields into a body,
/// absorbs them back out of a decoded one, and names its schema.
pub trait TxnKind: Default {
    const TX_TYPE: TxType;

    /// Collect the configured kind fields, failing on any that are missing.
    fn assemble(&self) -> Result<TxnFields, TxError>;

    /// Adopt the kind fields of a decoded body.
    fn absorb(&mut self, fields: &TxnFields) -> Result<(), TxError>;

    /// The validation rules for this kind.
    fn schema() -> Schema;
}

#[derive(Debug)]
pub struct TransactionBuilder<K: TxnKind> {
    fee: Option<u64>,
    first_round: Option<u64>,
    last_round: Option<u64>,
    sender: Option<Address>,
    genesis_id: Option<String>,
    genesis_hash: Option<[u8; 32]>,
    note: Option<Vec<u8>>,
    lease: Option<[u8; 32]>,
    rekey_to: Option<Address>,
    group: Option<[u8; 32]>,
    key_pairs: Vec<KeyPair>,
    transaction: Transaction,
    pub(crate) kind: K,
}

impl<K: TxnKind> TransactionBuilder<K> {
    pub fn new() -> Self {
        Self {
            fee: None,
            first_round: None,
            last_round: None,
            sender: None,
            genesis_id: None,
            genesis_hash: None,
            note: None,
            lease: None,
            rekey_to: None,
            group: None,
            key_pairs: Vec::new(),
            transaction: Transaction::new(),
            kind: K::default(),
        }
    }

    // ─── Common field setters ────────────────────────────────────────────────

    /// Set the fee in microalgos. Values below the network minimum are
    /// rejected here rather than at build time.
    pub fn fee(&mut self, fee: u64) -> Result<&mut Self, TxError> {
        if fee < MIN_TXN_FEE {
            return Err(TxError::InsufficientFee { fee, min_fee: MIN_TXN_FEE });
        }
        self.fee = Some(fee);
        Ok(self)
    }

    pub fn sender(&mut self, address: &str) -> Result<&mut Self, TxError> {
        self.sender = Some(parse_address(address)?);
        Ok(self)
    }

    pub fn first_round(&mut self, round: u64) -> Result<&mut Self, TxError> {
        if round == 0 {
            return Err(TxError::InvalidParameter(
                "firstRound must be a positive number".to_string(),
            ));
        }
        self.first_round = Some(round);
        Ok(self)
    }

    pub fn last_round(&mut self, round: u64) -> Result<&mut Self, TxError> {
        if round == 0 {
            return Err(TxError::InvalidParameter(
                "lastRound must be a positive number".to_string(),
            ));
        }
        self.last_round = Some(round);
        Ok(self)
    }

    /// Set the genesis hash from its base64 form.
    pub fn genesis_hash(&mut self, hash: &str) -> Result<&mut Self, TxError> {
        self.genesis_hash = Some(b64_key32(hash, "genesisHash")?);
        Ok(self)
    }

    pub fn genesis_hash_bytes(&mut self, hash: [u8; 32]) -> &mut Self {
        self.genesis_hash = Some(hash);
        self
    }

    pub fn genesis_id(&mut self, id: &str) -> &mut Self {
        self.genesis_id = Some(id.to_string());
        self
    }

    /// Set genesis id and hash from a well-known network.
    pub fn on_network(&mut self, network: Network) -> &mut Self {
        self.genesis_id(network.genesis_id());
        self.genesis_hash_bytes(network.genesis_hash())
    }

    pub fn note(&mut self, note: &[u8]) -> Result<&mut Self, TxError> {
        if note.len() > MAX_NOTE_LENGTH {
            return Err(TxError::InvalidParameter(format!(
                "note cannot exceed 1000 bytes, got {}",
                note.len()
            )));
        }
        self.note = Some(note.to_vec());
        Ok(self)
    }

    pub fn lease(&mut self, lease: &[u8]) -> Result<&mut Self, TxError> {
        self.lease = Some(exact_bytes::<LEASE_LENGTH>(lease, "lease")?);
        Ok(self)
    }

    pub fn rekey_to(&mut self, address: &str) -> Result<&mut Self, TxError> {
        self.rekey_to = Some(parse_address(address)?);
        Ok(self)
    }

    pub fn group(&mut self, group: &[u8]) -> Result<&mut Self, TxError> {
        self.group = Some(exact_bytes::<HASH_LENGTH>(group, "group")?);
        Ok(self)
    }

    /// Check that a key decodes to a usable signing key without holding on
    /// to it.
    pub fn validate_key(&self, key: &KeySpec) -> Result<(), TxError> {
        normalize_secret_key(key)?;
        Ok(())
    }

    // ─── Transitions ─────────────────────────────────────────────────────────

    fn assemble_header(&self) -> Result<TxnHeader, TxError> {
        let fee = self.fee.ok_or(TxError::MissingField("fee"))?;
        let first_round = self.first_round.ok_or(TxError::MissingField("firstRound"))?;
        let last_round = self.last_round.ok_or(TxError::MissingField("lastRound"))?;
        let sender = self.sender.ok_or(TxError::MissingField("sender"))?;
        let genesis_hash = self.genesis_hash.ok_or(TxError::MissingField("genesisHash"))?;
        Ok(TxnHeader {
            fee,
            first_round,
            last_round,
            sender: Some(sender),
            genesis_id: self.genesis_id.clone(),
            genesis_hash: Some(genesis_hash),
            note: self.note.clone(),
            lease: self.lease,
            rekey_to: self.rekey_to,
            group: self.group,
        })
    }

    fn validated(body: &TransactionBody) -> Result<(), TxError> {
        K::schema().validate(&TxnSnapshot::of(body))
    }

    /// Assemble the configured fields into a body, validate it against the
    /// kind's schema, and install it. Signatures attached to a previous
    /// build are dropped.
    pub fn build(&mut self) -> Result<&Transaction, TxError> {
        let header = self.assemble_header()?;
        let fields = self.kind.assemble()?;
        let body = TransactionBody { header, fields };
        Self::validated(&body)?;
        self.transaction.set_body(body);
        Ok(&self.transaction)
    }

    /// Initialize the builder from wire bytes of this kind. The decoded
    /// body must pass the kind's schema; on any failure the builder is left
    /// untouched.
    pub fn from(&mut self, raw: &[u8]) -> Result<&mut Self, TxError> {
        let (body, signature) = decode_transaction(raw)?;
        if body.tx_type() != K::TX_TYPE {
            return Err(TxError::InvalidTransaction(format!(
                "expected a {} transaction, got {}",
                K::TX_TYPE,
                body.tx_type()
            )));
        }
        Self::validated(&body)?;

        let mut kind = K::default();
        kind.absorb(&body.fields)?;

        let header = &body.header;
        self.fee = Some(header.fee);
        self.first_round = Some(header.first_round);
        self.last_round = Some(header.last_round);
        self.sender = header.sender;
        self.genesis_id = header.genesis_id.clone();
        self.genesis_hash = header.genesis_hash;
        self.note = header.note.clone();
        self.lease = header.lease;
        self.rekey_to = header.rekey_to;
        self.group = header.group;
        self.kind = kind;
        self.transaction.set_signed_body(body, signature);
        Ok(self)
    }

    /// Sign the held transaction and attach the signature. The key pair is
    /// retained so later rebuilds can be re-signed.
    pub fn sign(&mut self, key: &KeySpec) -> Result<&mut Self, TxError> {
        let key_pair = normalize_secret_key(key)?;
        let payload = self.transaction.signing_payload()?;
        let signature = key_pair.sign_bytes(&payload)?;
        self.transaction
            .attach_signature(SignatureEntry { public_key: key_pair.public_key(), signature });
        self.key_pairs.push(key_pair);
        Ok(self)
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn key_pairs(&self) -> &[KeyPair] {
        &self.key_pairs
    }
}

impl<K: TxnKind> Default for TransactionBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn exact_bytes<const N: usize>(
    value: &[u8],
    field: &'static str,
) -> Result<[u8; N], TxError> {
    if value.len() != N {
        return Err(TxError::InvalidParameter(format!(
            "{field} must be {N} bytes, got {}",
            value.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(value);
    Ok(out)
}

pub(crate) fn b64_key32(value: &str, field: &'static str) -> Result<[u8; KEY_LENGTH], TxError> {
    let bytes = STANDARD
        .decode(value)
        .map_err(|_| TxError::InvalidParameter(format!("{field} is not valid base64")))?;
    exact_bytes::<KEY_LENGTH>(&bytes, field)
}
