use crate::models::{LedgerTransaction, TransactionAsset, TransactionMode};
use crate::validation;
use serde::Deserialize;

/// Hex length of the common transaction header (size, reserved words,
/// signature, signer key, version/network/type, fee, deadline) preceding
/// the type-specific body in a serialized payload.
const HEADER_HEX_LEN: usize = 256;

/// Which pool of the node a transaction page is read from. Only the
/// confirmed pool is a stable paginated history; the other two are a
/// bounded window of recent entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfirmationPool {
    Confirmed,
    Unconfirmed,
    Partial,
}

impl ConfirmationPool {
    pub fn as_path(&self) -> &'static str {
        match self {
            ConfirmationPool::Confirmed => "confirmed",
            ConfirmationPool::Unconfirmed => "unconfirmed",
            ConfirmationPool::Partial => "partial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query filter for a page of transactions involving one participant.
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub address: String,
    pub transaction_types: Vec<u16>,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionMeta {
    pub hash: String,
    #[serde(default)]
    pub height: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMosaic {
    pub mosaic_id: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionBody {
    #[serde(rename = "type")]
    pub transaction_type: u16,
    #[serde(default)]
    pub signer_public_key: Option<String>,
    #[serde(default)]
    pub recipient_address: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub mosaics: Vec<RawMosaic>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
}

/// One transaction as returned by the node.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub meta: RawTransactionMeta,
    pub transaction: RawTransactionBody,
}

/// One page of a pool query. `is_last_page` reflects the node's view of
/// the confirmed history; the recent-window pools always report true.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub items: Vec<RawTransaction>,
    pub page_number: u64,
    pub is_last_page: bool,
}

/// Convert a node transaction into our database model, deriving the
/// direction from the discovery source's vantage point.
pub fn extract_transaction(
    raw: &RawTransaction,
    source_address: &str,
    network_id: u8,
    discovered_at: i64,
) -> LedgerTransaction {
    let body = &raw.transaction;

    let transaction_mode = match &body.recipient_address {
        Some(recipient) if recipient == source_address => TransactionMode::Incoming,
        _ => TransactionMode::Outgoing,
    };

    let signer_address = body
        .signer_public_key
        .as_deref()
        .and_then(|key| validation::address_from_public_key(key, network_id).ok());

    let transaction_assets = body
        .mosaics
        .iter()
        .map(|mosaic| TransactionAsset {
            mosaic_id: mosaic.mosaic_id.clone(),
            amount: mosaic.amount,
        })
        .collect();

    LedgerTransaction {
        transaction_hash: raw.meta.hash.clone(),
        transaction_mode,
        source_address: source_address.to_string(),
        recipient_address: body.recipient_address.clone(),
        signer_address,
        signer_public_key: body.signer_public_key.clone(),
        transaction_type: body.transaction_type,
        transaction_message: body.message.clone(),
        transaction_assets,
        signature: body.signature.clone(),
        encoded_body: body.payload.as_deref().and_then(strip_header),
        creation_block: raw.meta.height,
        discovered_at,
    }
}

fn strip_header(payload: &str) -> Option<String> {
    if payload.len() > HEADER_HEX_LEN {
        Some(payload[HEADER_HEX_LEN..].to_string())
    } else {
        None
    }
}
