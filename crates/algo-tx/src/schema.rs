//! Whole-transaction validation.
//!
//! Setters catch bad values one field at a time; the schema checks a
//! complete body before it is accepted, covering presence and cross-field
//! constraints a single setter cannot see. Rules run against a
//! [`TxnSnapshot`], a flattened string/number view of the body, so the same
//! checks apply whether a body was assembled locally or decoded from wire
//! bytes.

use crate::types::{TransactionBody, TxnFields, TxType};
use crate::TxError;
use algo_types::address::is_valid_address;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Flattened view of a transaction body. Addresses are re-encoded to their
/// checksum form and fixed-size binaries to base64, matching how callers
/// supplied them.
#[derive(Debug, Clone, Default)]
pub struct TxnSnapshot {
    pub fee: u64,
    pub first_round: u64,
    pub last_round: u64,
    pub sender: Option<String>,
    pub genesis_id: Option<String>,
    pub genesis_hash: Option<String>,
    pub note: Option<Vec<u8>>,
    pub lease: Option<Vec<u8>>,
    pub rekey_to: Option<String>,
    pub type_tag: Option<String>,
    pub amount: Option<u64>,
    pub receiver: Option<String>,
    pub close_to: Option<String>,
    pub asset_index: Option<u64>,
    pub asset_amount: Option<u64>,
    pub clawback: Option<String>,
    pub vote_key: Option<String>,
    pub selection_key: Option<String>,
    pub vote_first: Option<u64>,
    pub vote_last: Option<u64>,
    pub vote_key_dilution: Option<u64>,
}

impl TxnSnapshot {
    pub fn of(body: &TransactionBody) -> Self {
        let header = &body.header;
        let mut snapshot = Self {
            fee: header.fee,
            first_round: header.first_round,
            last_round: header.last_round,
            sender: header.sender.as_ref().map(|a| a.encode()),
            genesis_id: header.genesis_id.clone(),
            genesis_hash: header.genesis_hash.as_ref().map(|h| STANDARD.encode(h)),
            note: header.note.clone(),
            lease: header.lease.as_ref().map(|l| l.to_vec()),
            rekey_to: header.rekey_to.as_ref().map(|a| a.encode()),
            type_tag: Some(body.tx_type().tag().to_string()),
            ..Self::default()
        };

        match &body.fields {
            TxnFields::Payment { amount, receiver, close_to } => {
                snapshot.amount = Some(*amount);
                snapshot.receiver = receiver.as_ref().map(|a| a.encode());
                snapshot.close_to = close_to.as_ref().map(|a| a.encode());
            }
            TxnFields::AssetTransfer { asset_index, amount, receiver, clawback, close_to } => {
                snapshot.asset_index = Some(*asset_index);
                snapshot.asset_amount = Some(*amount);
                snapshot.receiver = receiver.as_ref().map(|a| a.encode());
                snapshot.clawback = clawback.as_ref().map(|a| a.encode());
                snapshot.close_to = close_to.as_ref().map(|a| a.encode());
            }
            TxnFields::KeyRegistration {
                vote_key,
                selection_key,
                vote_first,
                vote_last,
                vote_key_dilution,
            } => {
                snapshot.vote_key = vote_key.as_ref().map(|k| STANDARD.encode(k));
                snapshot.selection_key = selection_key.as_ref().map(|k| STANDARD.encode(k));
                snapshot.vote_first = Some(*vote_first);
                snapshot.vote_last = Some(*vote_last);
                snapshot.vote_key_dilution = Some(*vote_key_dilution);
            }
        }

        snapshot
    }
}

/// One named validation rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&TxnSnapshot) -> Result<(), String>,
}

/// A rule set: per-field rules plus cross-field rules that only make sense
/// once every field-level rule holds.
#[derive(Debug, Clone)]
pub struct Schema {
    rules: Vec<Rule>,
    cross_rules: Vec<Rule>,
}

impl Schema {
    /// Rules every transaction kind shares.
    pub fn base() -> Self {
        Self { rules: BASE_RULES.to_vec(), cross_rules: BASE_CROSS_RULES.to_vec() }
    }

    pub fn extend(mut self, rules: &[Rule], cross_rules: &[Rule]) -> Self {
        self.rules.extend_from_slice(rules);
        self.cross_rules.extend_from_slice(cross_rules);
        self
    }

    /// Run field rules, then cross-field rules, stopping at the first
    /// failure.
    pub fn validate(&self, snapshot: &TxnSnapshot) -> Result<(), TxError> {
        for rule in self.rules.iter().chain(self.cross_rules.iter()) {
            if let Err(message) = (rule.check)(snapshot) {
                return Err(TxError::InvalidTransaction(format!("{}: {message}", rule.name)));
            }
        }
        Ok(())
    }
}

// ─── Check helpers ───────────────────────────────────────────────────────────

fn required_positive(value: Option<u64>) -> Result<(), String> {
    match value {
        None => Err("is required".to_string()),
        Some(0) => Err("must be a positive number".to_string()),
        Some(_) => Ok(()),
    }
}

fn valid_address(text: &str) -> Result<(), String> {
    if is_valid_address(text) {
        Ok(())
    } else {
        Err(format!("\"{text}\" is not a valid address"))
    }
}

fn require_address(value: &Option<String>) -> Result<(), String> {
    match value {
        None => Err("is required".to_string()),
        Some(text) => valid_address(text),
    }
}

fn optional_address(value: &Option<String>) -> Result<(), String> {
    match value {
        None => Ok(()),
        Some(text) => valid_address(text),
    }
}

fn require_b64_key32(value: &Option<String>) -> Result<(), String> {
    let text = match value {
        None => return Err("is required".to_string()),
        Some(text) => text,
    };
    match STANDARD.decode(text) {
        Ok(bytes) if bytes.len() == 32 => Ok(()),
        Ok(bytes) => Err(format!("must decode to 32 bytes, got {}", bytes.len())),
        Err(_) => Err("is not valid base64".to_string()),
    }
}

// ─── Base rules ──────────────────────────────────────────────────────────────

fn check_fee(snapshot: &TxnSnapshot) -> Result<(), String> {
    if snapshot.fee > 0 {
        Ok(())
    } else {
        Err("must be present and positive".to_string())
    }
}

fn check_first_round(snapshot: &TxnSnapshot) -> Result<(), String> {
    required_positive(Some(snapshot.first_round))
}

fn check_last_round(snapshot: &TxnSnapshot) -> Result<(), String> {
    required_positive(Some(snapshot.last_round))
}

fn check_sender(snapshot: &TxnSnapshot) -> Result<(), String> {
    require_address(&snapshot.sender)
}

fn check_genesis_hash(snapshot: &TxnSnapshot) -> Result<(), String> {
    require_b64_key32(&snapshot.genesis_hash)
}

fn check_tx_type(snapshot: &TxnSnapshot) -> Result<(), String> {
    match &snapshot.type_tag {
        None => Err("is required".to_string()),
        Some(tag) => match TxType::from_tag(tag) {
            Some(_) => Ok(()),
            None => Err(format!("unknown transaction type \"{tag}\"")),
        },
    }
}

fn check_rekey_to(snapshot: &TxnSnapshot) -> Result<(), String> {
    optional_address(&snapshot.rekey_to)
}

fn cross_round_window(snapshot: &TxnSnapshot) -> Result<(), String> {
    if snapshot.first_round < snapshot.last_round {
        Ok(())
    } else {
        Err("firstRound must be strictly less than lastRound".to_string())
    }
}

static BASE_RULES: &[Rule] = &[
    Rule { name: "fee", check: check_fee },
    Rule { name: "firstRound", check: check_first_round },
    Rule { name: "lastRound", check: check_last_round },
    Rule { name: "sender", check: check_sender },
    Rule { name: "genesisHash", check: check_genesis_hash },
    Rule { name: "txType", check: check_tx_type },
    Rule { name: "reKeyTo", check: check_rekey_to },
];

static BASE_CROSS_RULES: &[Rule] = &[Rule { name: "roundWindow", check: cross_round_window }];

// ─── Payment rules ───────────────────────────────────────────────────────────

fn check_receiver(snapshot: &TxnSnapshot) -> Result<(), String> {
    require_address(&snapshot.receiver)
}

fn check_close_to(snapshot: &TxnSnapshot) -> Result<(), String> {
    optional_address(&snapshot.close_to)
}

pub fn payment_schema() -> Schema {
    Schema::base().extend(
        &[
            Rule { name: "receiver", check: check_receiver },
            Rule { name: "closeTo", check: check_close_to },
        ],
        &[],
    )
}

// ─── Asset transfer rules ────────────────────────────────────────────────────

fn check_asset_index(snapshot: &TxnSnapshot) -> Result<(), String> {
    required_positive(snapshot.asset_index)
}

fn check_asset_amount(snapshot: &TxnSnapshot) -> Result<(), String> {
    // Zero is a legal transfer amount; only absence is an error.
    match snapshot.asset_amount {
        None => Err("is required".to_string()),
        Some(_) => Ok(()),
    }
}

fn check_clawback(snapshot: &TxnSnapshot) -> Result<(), String> {
    require_address(&snapshot.clawback)
}

pub fn asset_transfer_schema() -> Schema {
    Schema::base().extend(
        &[
            Rule { name: "assetIndex", check: check_asset_index },
            Rule { name: "assetAmount", check: check_asset_amount },
            Rule { name: "receiver", check: check_receiver },
            Rule { name: "clawbackAddress", check: check_clawback },
            Rule { name: "closeTo", check: check_close_to },
        ],
        &[],
    )
}

// ─── Key registration rules ──────────────────────────────────────────────────

fn check_vote_key(snapshot: &TxnSnapshot) -> Result<(), String> {
    require_b64_key32(&snapshot.vote_key)
}

fn check_selection_key(snapshot: &TxnSnapshot) -> Result<(), String> {
    require_b64_key32(&snapshot.selection_key)
}

fn check_vote_first(snapshot: &TxnSnapshot) -> Result<(), String> {
    required_positive(snapshot.vote_first)
}

fn check_vote_last(snapshot: &TxnSnapshot) -> Result<(), String> {
    required_positive(snapshot.vote_last)
}

fn check_vote_key_dilution(snapshot: &TxnSnapshot) -> Result<(), String> {
    required_positive(snapshot.vote_key_dilution)
}

fn cross_vote_rounds(snapshot: &TxnSnapshot) -> Result<(), String> {
    match (snapshot.vote_first, snapshot.vote_last) {
        (Some(first), Some(last)) if first > last => {
            Err("voteFirst cannot be greater than voteLast".to_string())
        }
        _ => Ok(()),
    }
}

pub fn key_registration_schema() -> Schema {
    Schema::base().extend(
        &[
            Rule { name: "voteKey", check: check_vote_key },
            Rule { name: "selectionKey", check: check_selection_key },
            Rule { name: "voteFirst", check: check_vote_first },
            Rule { name: "voteLast", check: check_vote_last },
            Rule { name: "voteKeyDilution", check: check_vote_key_dilution },
        ],
        &[Rule { name: "voteRounds", check: cross_vote_rounds }],
    )
}
