// Entities owned by the discovery engine plus the checkpoint payloads
// each job persists between runs.

use serde::{Deserialize, Serialize};

/// Direction of an ingested transaction relative to the discovery source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    Incoming,
    Outgoing,
}

impl TransactionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionMode::Incoming => "incoming",
            TransactionMode::Outgoing => "outgoing",
        }
    }

    pub fn from_str(raw: &str) -> Self {
        match raw {
            "incoming" => TransactionMode::Incoming,
            _ => TransactionMode::Outgoing,
        }
    }
}

/// One mosaic quantity attached to a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAsset {
    pub mosaic_id: String,
    pub amount: u64,
}

/// Local copy of a ledger transaction. Keyed by hash, immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub transaction_hash: String,
    pub transaction_mode: TransactionMode,
    pub source_address: String,
    pub recipient_address: Option<String>,
    pub signer_address: Option<String>,
    pub signer_public_key: Option<String>,
    pub transaction_type: u16,
    pub transaction_message: Option<String>,
    pub transaction_assets: Vec<TransactionAsset>,
    pub signature: Option<String>,
    pub encoded_body: Option<String>,
    pub creation_block: Option<u64>,
    pub discovered_at: i64,
}

/// Account sighted as a transaction recipient. One row per address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    pub transactions_count: Option<u64>,
    pub first_transaction_at: Option<i64>,
    pub first_transaction_at_block: Option<u64>,
    pub referred_by: Option<String>,
}

/// Mosaic quantity attributed to a user, keyed by (hash, user, mosaic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub transaction_hash: String,
    pub user_address: String,
    pub mosaic_id: String,
    pub amount: u64,
    pub creation_block: Option<u64>,
}

fn first_page() -> u64 {
    1
}

/// Global checkpoint of the transaction discovery job
/// (`discovery:transactions`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionTotals {
    pub last_used_account: Option<String>,
    pub total_number_of_transactions: u64,
}

/// Per-source checkpoint of the transaction discovery job
/// (`discovery:transactions:<source>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceProgress {
    pub last_page_number: u64,
    pub sync: bool,
}

impl Default for SourceProgress {
    fn default() -> Self {
        Self {
            last_page_number: first_page(),
            sync: false,
        }
    }
}

/// Checkpoint of the account discovery job (`discovery:accounts`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountProgress {
    pub last_page_number: u64,
    pub last_executed_at: i64,
}

impl Default for AccountProgress {
    fn default() -> Self {
        Self {
            last_page_number: first_page(),
            last_executed_at: 0,
        }
    }
}

/// Per-source checkpoint of the asset discovery job
/// (`discovery:assets:<source>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetProgress {
    pub last_page_number: u64,
    pub sync: bool,
    pub last_executed_at: i64,
}

impl Default for AssetProgress {
    fn default() -> Self {
        Self {
            last_page_number: first_page(),
            sync: false,
            last_executed_at: 0,
        }
    }
}

/// Global checkpoint of the asset discovery job (`discovery:assets`),
/// holding only the round-robin position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetTotals {
    pub last_used_account: Option<String>,
}
