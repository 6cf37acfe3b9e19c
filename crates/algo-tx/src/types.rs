//! Typed transaction representation and the canonical wire codec.
//!
//! A body is a header (fields every kind shares) plus one kind-specific
//! field set. On the wire a transaction is a canonical msgpack map with
//! short field keys, zero-valued fields omitted; a signed transaction wraps
//! the body in a `{"sig", "txn"}` envelope. Decoding mirrors the omission
//! rule: a required address key that is absent reads back as the zero
//! address.

use crate::TxError;
use algo_crypto::msgpack::{Cursor, MsgpackError, Value};
use algo_types::address::Address;
use algo_types::constants::SIGNATURE_LENGTH;
use serde::{Deserialize, Serialize};

/// Transaction type tag (the wire `type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    #[serde(rename = "pay")]
    Payment,
    #[serde(rename = "keyreg")]
    KeyRegistration,
    #[serde(rename = "axfer")]
    AssetTransfer,
    #[serde(rename = "acfg")]
    AssetConfig,
    #[serde(rename = "afrz")]
    AssetFreeze,
    #[serde(rename = "appl")]
    Application,
}

impl TxType {
    /// The wire tag string.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Payment => "pay",
            Self::KeyRegistration => "keyreg",
            Self::AssetTransfer => "axfer",
            Self::AssetConfig => "acfg",
            Self::AssetFreeze => "afrz",
            Self::Application => "appl",
        }
    }

    /// Parse a wire tag string.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "pay" => Some(Self::Payment),
            "keyreg" => Some(Self::KeyRegistration),
            "axfer" => Some(Self::AssetTransfer),
            "acfg" => Some(Self::AssetConfig),
            "afrz" => Some(Self::AssetFreeze),
            "appl" => Some(Self::Application),
            _ => None,
        }
    }
}

impl std::fmt::Display for TxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Common fields shared by every transaction kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxnHeader {
    pub fee: u64,
    pub first_round: u64,
    pub last_round: u64,
    pub sender: Option<Address>,
    pub genesis_id: Option<String>,
    pub genesis_hash: Option<[u8; 32]>,
    pub note: Option<Vec<u8>>,
    pub lease: Option<[u8; 32]>,
    pub rekey_to: Option<Address>,
    pub group: Option<[u8; 32]>,
}

/// Kind-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum TxnFields {
    Payment {
        amount: u64,
        receiver: Option<Address>,
        close_to: Option<Address>,
    },
    AssetTransfer {
        asset_index: u64,
        amount: u64,
        receiver: Option<Address>,
        /// Revocation source for clawback-style transfers (wire `asnd`).
        clawback: Option<Address>,
        close_to: Option<Address>,
    },
    KeyRegistration {
        vote_key: Option<[u8; 32]>,
        selection_key: Option<[u8; 32]>,
        vote_first: u64,
        vote_last: u64,
        vote_key_dilution: u64,
    },
}

impl TxnFields {
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Payment { .. } => TxType::Payment,
            Self::AssetTransfer { .. } => TxType::AssetTransfer,
            Self::KeyRegistration { .. } => TxType::KeyRegistration,
        }
    }
}

/// A complete transaction body. Produced only by a builder's build/parse
/// transition or by decoding wire bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBody {
    pub header: TxnHeader,
    pub fields: TxnFields,
}

impl TransactionBody {
    pub fn tx_type(&self) -> TxType {
        self.fields.tx_type()
    }
}

/// One attached signature with the public key it verifies under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureEntry {
    pub public_key: [u8; 32],
    pub signature: [u8; SIGNATURE_LENGTH],
}

// ─── Encoding ────────────────────────────────────────────────────────────────

fn push_uint(entries: &mut Vec<(String, Value)>, key: &str, value: u64) {
    if value != 0 {
        entries.push((key.to_string(), Value::UInt(value)));
    }
}

fn push_str(entries: &mut Vec<(String, Value)>, key: &str, value: &str) {
    if !value.is_empty() {
        entries.push((key.to_string(), Value::Str(value.to_string())));
    }
}

fn push_bin(entries: &mut Vec<(String, Value)>, key: &str, value: &[u8]) {
    if !value.is_empty() {
        entries.push((key.to_string(), Value::Bin(value.to_vec())));
    }
}

fn push_address(entries: &mut Vec<(String, Value)>, key: &str, value: &Option<Address>) {
    if let Some(address) = value {
        if *address != Address::ZERO {
            entries.push((key.to_string(), Value::Bin(address.as_bytes().to_vec())));
        }
    }
}

/// Collect the non-zero fields of a body as canonical map entries. Zero
/// values are omitted entirely per the ledger's encoding rules.
fn body_entries(body: &TransactionBody) -> Vec<(String, Value)> {
    let header = &body.header;
    let mut entries = Vec::with_capacity(16);

    push_uint(&mut entries, "fee", header.fee);
    push_uint(&mut entries, "fv", header.first_round);
    push_uint(&mut entries, "lv", header.last_round);
    if let Some(genesis_id) = &header.genesis_id {
        push_str(&mut entries, "gen", genesis_id);
    }
    if let Some(genesis_hash) = &header.genesis_hash {
        push_bin(&mut entries, "gh", genesis_hash);
    }
    push_address(&mut entries, "snd", &header.sender);
    if let Some(note) = &header.note {
        push_bin(&mut entries, "note", note);
    }
    if let Some(lease) = &header.lease {
        push_bin(&mut entries, "lx", lease);
    }
    push_address(&mut entries, "rekey", &header.rekey_to);
    if let Some(group) = &header.group {
        push_bin(&mut entries, "grp", group);
    }
    entries.push(("type".to_string(), Value::Str(body.tx_type().tag().to_string())));

    match &body.fields {
        TxnFields::Payment { amount, receiver, close_to } => {
            push_uint(&mut entries, "amt", *amount);
            push_address(&mut entries, "rcv", receiver);
            push_address(&mut entries, "close", close_to);
        }
        TxnFields::AssetTransfer { asset_index, amount, receiver, clawback, close_to } => {
            push_uint(&mut entries, "xaid", *asset_index);
            push_uint(&mut entries, "aamt", *amount);
            push_address(&mut entries, "arcv", receiver);
            push_address(&mut entries, "asnd", clawback);
            push_address(&mut entries, "aclose", close_to);
        }
        TxnFields::KeyRegistration {
            vote_key,
            selection_key,
            vote_first,
            vote_last,
            vote_key_dilution,
        } => {
            if let Some(vote_key) = vote_key {
                push_bin(&mut entries, "votekey", vote_key);
            }
            if let Some(selection_key) = selection_key {
                push_bin(&mut entries, "selkey", selection_key);
            }
            push_uint(&mut entries, "votefst", *vote_first);
            push_uint(&mut entries, "votelst", *vote_last);
            push_uint(&mut entries, "votekd", *vote_key_dilution);
        }
    }

    entries
}

/// Canonical wire encoding of an unsigned transaction body.
pub fn encode_body(body: &TransactionBody) -> Result<Vec<u8>, TxError> {
    Value::Map(body_entries(body))
        .to_bytes()
        .map_err(|e| TxError::InvalidTransaction(format!("encode failed: {e}")))
}

/// Canonical wire encoding of a signed transaction: `{"sig", "txn"}`.
pub fn encode_signed(
    body: &TransactionBody,
    signature: &[u8; SIGNATURE_LENGTH],
) -> Result<Vec<u8>, TxError> {
    let envelope = Value::Map(vec![
        ("sig".to_string(), Value::Bin(signature.to_vec())),
        ("txn".to_string(), Value::Map(body_entries(body))),
    ]);
    envelope
        .to_bytes()
        .map_err(|e| TxError::InvalidTransaction(format!("encode failed: {e}")))
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Field accumulator for one pass over a body map. Keys arrive in sorted
/// order, so the type tag can appear after kind fields; everything is
/// collected first and assembled once the map is exhausted.
#[derive(Default)]
struct RawTxn {
    fee: u64,
    first_round: u64,
    last_round: u64,
    genesis_id: Option<String>,
    genesis_hash: Option<[u8; 32]>,
    sender: Option<Address>,
    note: Option<Vec<u8>>,
    lease: Option<[u8; 32]>,
    rekey_to: Option<Address>,
    group: Option<[u8; 32]>,
    type_tag: Option<String>,
    amount: u64,
    receiver: Option<Address>,
    close_to: Option<Address>,
    asset_index: u64,
    asset_amount: u64,
    asset_receiver: Option<Address>,
    asset_clawback: Option<Address>,
    asset_close_to: Option<Address>,
    vote_key: Option<[u8; 32]>,
    selection_key: Option<[u8; 32]>,
    vote_first: u64,
    vote_last: u64,
    vote_key_dilution: u64,
}

fn decode_err(e: MsgpackError) -> TxError {
    TxError::InvalidTransaction(e.to_string())
}

fn read_hash32(cursor: &mut Cursor<'_>, key: &str) -> Result<[u8; 32], TxError> {
    let bytes = cursor.read_bin().map_err(decode_err)?;
    if bytes.len() != 32 {
        return Err(TxError::InvalidTransaction(format!(
            "field \"{key}\" must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn read_address(cursor: &mut Cursor<'_>, key: &str) -> Result<Address, TxError> {
    Ok(Address(read_hash32(cursor, key)?))
}

fn decode_body_map(cursor: &mut Cursor<'_>) -> Result<TransactionBody, TxError> {
    let len = cursor.read_map_len().map_err(decode_err)?;
    if len == 0 {
        return Err(TxError::InvalidTransaction("empty transaction".to_string()));
    }
    let mut raw = RawTxn::default();

    for _ in 0..len {
        let key = cursor.read_str().map_err(decode_err)?;
        match key {
            "fee" => raw.fee = cursor.read_uint().map_err(decode_err)?,
            "fv" => raw.first_round = cursor.read_uint().map_err(decode_err)?,
            "lv" => raw.last_round = cursor.read_uint().map_err(decode_err)?,
            "gen" => raw.genesis_id = Some(cursor.read_str().map_err(decode_err)?.to_string()),
            "gh" => raw.genesis_hash = Some(read_hash32(cursor, "gh")?),
            "snd" => raw.sender = Some(read_address(cursor, "snd")?),
            "note" => raw.note = Some(cursor.read_bin().map_err(decode_err)?.to_vec()),
            "lx" => raw.lease = Some(read_hash32(cursor, "lx")?),
            "rekey" => raw.rekey_to = Some(read_address(cursor, "rekey")?),
            "grp" => raw.group = Some(read_hash32(cursor, "grp")?),
            "type" => raw.type_tag = Some(cursor.read_str().map_err(decode_err)?.to_string()),
            "amt" => raw.amount = cursor.read_uint().map_err(decode_err)?,
            "rcv" => raw.receiver = Some(read_address(cursor, "rcv")?),
            "close" => raw.close_to = Some(read_address(cursor, "close")?),
            "xaid" => raw.asset_index = cursor.read_uint().map_err(decode_err)?,
            "aamt" => raw.asset_amount = cursor.read_uint().map_err(decode_err)?,
            "arcv" => raw.asset_receiver = Some(read_address(cursor, "arcv")?),
            "asnd" => raw.asset_clawback = Some(read_address(cursor, "asnd")?),
            "aclose" => raw.asset_close_to = Some(read_address(cursor, "aclose")?),
            "votekey" => raw.vote_key = Some(read_hash32(cursor, "votekey")?),
            "selkey" => raw.selection_key = Some(read_hash32(cursor, "selkey")?),
            "votefst" => raw.vote_first = cursor.read_uint().map_err(decode_err)?,
            "votelst" => raw.vote_last = cursor.read_uint().map_err(decode_err)?,
            "votekd" => raw.vote_key_dilution = cursor.read_uint().map_err(decode_err)?,
            _ => {
                return Err(TxError::InvalidTransaction(format!("unknown field \"{key}\"")))
            }
        }
    }

    let type_tag = raw
        .type_tag
        .ok_or_else(|| TxError::InvalidTransaction("transaction has no type tag".to_string()))?;
    let tx_type = TxType::from_tag(&type_tag).ok_or_else(|| {
        TxError::InvalidTransaction(format!("unknown transaction type \"{type_tag}\""))
    })?;

    // The encoder drops all-zero addresses, so a required address key that
    // is absent reads back as the zero address; optional ones stay unset.
    let fields = match tx_type {
        TxType::Payment => TxnFields::Payment {
            amount: raw.amount,
            receiver: Some(raw.receiver.unwrap_or(Address::ZERO)),
            close_to: raw.close_to,
        },
        TxType::AssetTransfer => TxnFields::AssetTransfer {
            asset_index: raw.asset_index,
            amount: raw.asset_amount,
            receiver: Some(raw.asset_receiver.unwrap_or(Address::ZERO)),
            clawback: Some(raw.asset_clawback.unwrap_or(Address::ZERO)),
            close_to: raw.asset_close_to,
        },
        TxType::KeyRegistration => TxnFields::KeyRegistration {
            vote_key: raw.vote_key,
            selection_key: raw.selection_key,
            vote_first: raw.vote_first,
            vote_last: raw.vote_last,
            vote_key_dilution: raw.vote_key_dilution,
        },
        other => {
            return Err(TxError::InvalidTransaction(format!(
                "no decoder for transaction type \"{}\"",
                other.tag()
            )))
        }
    };

    let header = TxnHeader {
        fee: raw.fee,
        first_round: raw.first_round,
        last_round: raw.last_round,
        sender: Some(raw.sender.unwrap_or(Address::ZERO)),
        genesis_id: raw.genesis_id,
        genesis_hash: raw.genesis_hash,
        note: raw.note,
        lease: raw.lease,
        rekey_to: raw.rekey_to,
        group: raw.group,
    };

    Ok(TransactionBody { header, fields })
}

/// Decode wire bytes: either a bare unsigned body map or the signed
/// `{"sig", "txn"}` envelope. Multisig envelopes are rejected.
pub fn decode_transaction(
    data: &[u8],
) -> Result<(TransactionBody, Option<SignatureEntry>), TxError> {
    if data.is_empty() {
        return Err(TxError::InvalidTransaction("empty transaction".to_string()));
    }

    let mut cursor = Cursor::new(data);
    let len = cursor.read_map_len().map_err(decode_err)?;
    if len == 0 {
        return Err(TxError::InvalidTransaction("empty transaction".to_string()));
    }

    // Sniff the first key to tell a signed envelope from a bare body; no
    // body field shares a name with the envelope keys.
    let sniff = cursor.offset();
    let first_key = cursor.read_str().map_err(decode_err)?;
    let is_envelope = matches!(first_key, "msig" | "sgnr" | "sig" | "txn");
    cursor.seek(sniff);

    if !is_envelope {
        cursor.seek(0);
        let body = decode_body_map(&mut cursor)?;
        cursor.finish().map_err(decode_err)?;
        return Ok((body, None));
    }

    let mut signature: Option<[u8; SIGNATURE_LENGTH]> = None;
    let mut signer: Option<Address> = None;
    let mut body: Option<TransactionBody> = None;

    for _ in 0..len {
        let key = cursor.read_str().map_err(decode_err)?;
        match key {
            "sig" => {
                let bytes = cursor.read_bin().map_err(decode_err)?;
                if bytes.len() != SIGNATURE_LENGTH {
                    return Err(TxError::InvalidTransaction(format!(
                        "signature must be {SIGNATURE_LENGTH} bytes, got {}",
                        bytes.len()
                    )));
                }
                let mut sig = [0u8; SIGNATURE_LENGTH];
                sig.copy_from_slice(bytes);
                signature = Some(sig);
            }
            "sgnr" => signer = Some(read_address(&mut cursor, "sgnr")?),
            "txn" => body = Some(decode_body_map(&mut cursor)?),
            "msig" => {
                return Err(TxError::InvalidTransaction(
                    "multisig envelopes are not supported".to_string(),
                ))
            }
            _ => {
                return Err(TxError::InvalidTransaction(format!(
                    "unexpected envelope field \"{key}\""
                )))
            }
        }
    }
    cursor.finish().map_err(decode_err)?;

    let body = body.ok_or_else(|| {
        TxError::InvalidTransaction("envelope has no \"txn\" field".to_string())
    })?;

    let entry = signature.map(|sig| {
        let public_key = signer
            .or(body.header.sender)
            .map(|address| *address.as_bytes())
            .unwrap_or([0u8; 32]);
        SignatureEntry { public_key, signature: sig }
    });

    Ok((body, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal payment over testnet parameters; the expected bytes pin the
    // canonical form (sorted keys, omitted zero fields, smallest ints).
    const PAYMENT_VECTOR_HEX: &str = concat!(
        "89a3616d74cd1388a3666565cd03e8a2667601a367656eac746573746e65742d",
        "76312e30a26768c420ababababababababababababababababababababababab",
        "abababababababababa26c760aa3726376c42002020202020202020202020202",
        "02020202020202020202020202020202020202a3736e64c42001010101010101",
        "01010101010101010101010101010101010101010101010101a474797065a370",
        "6179",
    );

    pub(crate) fn sample_payment_body() -> TransactionBody {
        TransactionBody {
            header: TxnHeader {
                fee: 1000,
                first_round: 1,
                last_round: 10,
                sender: Some(Address([0x01; 32])),
                genesis_id: Some("testnet-v1.0".to_string()),
                genesis_hash: Some([0xAB; 32]),
                note: None,
                lease: None,
                rekey_to: None,
                group: None,
            },
            fields: TxnFields::Payment {
                amount: 5000,
                receiver: Some(Address([0x02; 32])),
                close_to: None,
            },
        }
    }

    #[test]
    fn test_payment_canonical_vector() {
        let body = sample_payment_body();
        let encoded = encode_body(&body).unwrap();
        assert_eq!(hex::encode(&encoded), PAYMENT_VECTOR_HEX);
    }

    #[test]
    fn test_payment_decode_roundtrip() {
        let body = sample_payment_body();
        let encoded = encode_body(&body).unwrap();
        let (decoded, signature) = decode_transaction(&encoded).unwrap();
        assert_eq!(decoded, body);
        assert!(signature.is_none());
    }

    #[test]
    fn test_zero_fields_are_omitted() {
        let mut body = sample_payment_body();
        if let TxnFields::Payment { amount, .. } = &mut body.fields {
            *amount = 0;
        }
        let encoded = encode_body(&body).unwrap();
        // One fewer entry than the vector's nine: "amt" disappears.
        assert_eq!(encoded[0], 0x88);
        let (decoded, _) = decode_transaction(&encoded).unwrap();
        assert!(matches!(decoded.fields, TxnFields::Payment { amount: 0, .. }));
    }

    #[test]
    fn test_absent_addresses_decode_as_zero() {
        let mut body = sample_payment_body();
        body.header.sender = Some(Address::ZERO);
        if let TxnFields::Payment { receiver, .. } = &mut body.fields {
            *receiver = Some(Address::ZERO);
        }
        let encoded = encode_body(&body).unwrap();
        // Neither "snd" nor "rcv" made it onto the wire.
        assert_eq!(encoded[0], 0x87);
        let (decoded, _) = decode_transaction(&encoded).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn test_asset_transfer_roundtrip() {
        let body = TransactionBody {
            header: sample_payment_body().header,
            fields: TxnFields::AssetTransfer {
                asset_index: 31566704,
                amount: 250,
                receiver: Some(Address([0x03; 32])),
                clawback: Some(Address([0x04; 32])),
                close_to: None,
            },
        };
        let encoded = encode_body(&body).unwrap();
        let (decoded, _) = decode_transaction(&encoded).unwrap();
        assert_eq!(decoded, body);
        assert_eq!(decoded.tx_type(), TxType::AssetTransfer);
    }

    #[test]
    fn test_key_registration_roundtrip() {
        let body = TransactionBody {
            header: sample_payment_body().header,
            fields: TxnFields::KeyRegistration {
                vote_key: Some([0x11; 32]),
                selection_key: Some([0x22; 32]),
                vote_first: 1,
                vote_last: 3_000_000,
                vote_key_dilution: 1733,
            },
        };
        let encoded = encode_body(&body).unwrap();
        let (decoded, _) = decode_transaction(&encoded).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn test_signed_envelope_roundtrip() {
        let body = sample_payment_body();
        let signature = [0x5A; 64];
        let encoded = encode_signed(&body, &signature).unwrap();

        let (decoded, entry) = decode_transaction(&encoded).unwrap();
        assert_eq!(decoded, body);
        let entry = entry.unwrap();
        assert_eq!(entry.signature, signature);
        // No sgnr field: the signature is attributed to the sender.
        assert_eq!(entry.public_key, [0x01; 32]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let bogus = Value::Map(vec![
            ("type".to_string(), Value::Str("pay".to_string())),
            ("bogus".to_string(), Value::UInt(1)),
        ]);
        let err = decode_transaction(&bogus.to_bytes().unwrap()).unwrap_err();
        assert!(err.to_string().contains("unknown field \"bogus\""));
    }

    #[test]
    fn test_unknown_type_tag_rejected() {
        let bogus = Value::Map(vec![("type".to_string(), Value::Str("stake".to_string()))]);
        let err = decode_transaction(&bogus.to_bytes().unwrap()).unwrap_err();
        assert!(err.to_string().contains("unknown transaction type"));
    }

    #[test]
    fn test_missing_type_tag_rejected() {
        let bogus = Value::Map(vec![("fee".to_string(), Value::UInt(1000))]);
        let err = decode_transaction(&bogus.to_bytes().unwrap()).unwrap_err();
        assert!(err.to_string().contains("no type tag"));
    }

    #[test]
    fn test_multisig_envelope_rejected() {
        let envelope = Value::Map(vec![
            ("msig".to_string(), Value::Map(vec![])),
            ("txn".to_string(), Value::Map(vec![])),
        ]);
        let err = decode_transaction(&envelope.to_bytes().unwrap()).unwrap_err();
        assert!(err.to_string().contains("multisig"));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut encoded = encode_body(&sample_payment_body()).unwrap();
        encoded.push(0x00);
        let err = decode_transaction(&encoded).unwrap_err();
        assert!(err.to_string().contains("trailing bytes"));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode_transaction(&[]).is_err());
        assert!(decode_transaction(&[0xff, 0x00, 0x12]).is_err());
        assert!(decode_transaction(b"definitely not msgpack").is_err());
    }

    #[test]
    fn test_tx_type_tags() {
        for tx_type in [
            TxType::Payment,
            TxType::KeyRegistration,
            TxType::AssetTransfer,
            TxType::AssetConfig,
            TxType::AssetFreeze,
            TxType::Application,
        ] {
            assert_eq!(TxType::from_tag(tx_type.tag()), Some(tx_type));
        }
        assert_eq!(TxType::from_tag("xfer"), None);
    }
}
