//! Shared fixtures for the discovery engine test suites.

mod account_discovery_tests;
mod rotation_tests;

use crate::config::Config;
use crate::db::migration;
use crate::ledger::client::{ClientError, LedgerReader};
use crate::ledger::models::{
    ConfirmationPool, RawMosaic, RawTransaction, RawTransactionBody, RawTransactionMeta,
    TransactionFilter, TransactionPage,
};
use crate::models::{LedgerTransaction, TransactionAsset, TransactionMode};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Mutex;
use std::time::Duration;

pub const SOURCE_A: &str = "NA3PXPEN63XCTJHDGVRDJIHHLITQJRCHZOU2HFA";
pub const SOURCE_B: &str = "NB7QMOSNM3ZJ2ZXEZXRBGY5L5YQ5JSVVHKQDR2Y";
pub const SOURCE_C: &str = "NCFDLOGYKLNM5AOFVSBLUOB5U6I764NALEVMAWA";
pub const RECIPIENT_1: &str = "NDTWO5E3F4BJP2LXOMRRIG7GYDNDKJI6MGHBRXQ";
pub const RECIPIENT_2: &str = "NAZSURF5YB75NVCVLWBVMEZFFQMAWDXFDMVU2SA";

/// In-memory database shared by a whole test, one connection so every
/// query sees the same schema.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    migration::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        node_url: "http://localhost:3000".to_string(),
        network_id: 104,
        discovery_sources: Vec::new(),
        primary_address: SOURCE_A.to_string(),
        primary_public_key: String::new(),
        page_size: 100,
        transaction_interval: Duration::from_secs(60),
        account_interval: Duration::from_secs(120),
        asset_interval: Duration::from_secs(120),
        include_unconfirmed: false,
        include_partial: false,
        transaction_types: vec![16724],
        node_timeout_secs: 5,
        verbose_discovery: false,
    }
}

/// A ledger transaction as the node would hand it back.
pub fn raw_transfer(
    hash: &str,
    recipient: &str,
    height: Option<u64>,
    mosaics: &[(&str, u64)],
) -> RawTransaction {
    RawTransaction {
        meta: RawTransactionMeta {
            hash: hash.to_string(),
            height,
        },
        transaction: RawTransactionBody {
            transaction_type: 16724,
            signer_public_key: None,
            recipient_address: Some(recipient.to_string()),
            message: None,
            mosaics: mosaics
                .iter()
                .map(|(mosaic_id, amount)| RawMosaic {
                    mosaic_id: mosaic_id.to_string(),
                    amount: *amount,
                })
                .collect(),
            signature: None,
            payload: None,
        },
    }
}

/// A transaction as the mirror stores it, for seeding the derivation jobs.
pub fn mirror_transfer(
    hash: &str,
    source: &str,
    recipient: Option<&str>,
    height: u64,
    assets: &[(&str, u64)],
) -> LedgerTransaction {
    LedgerTransaction {
        transaction_hash: hash.to_string(),
        transaction_mode: TransactionMode::Incoming,
        source_address: source.to_string(),
        recipient_address: recipient.map(|r| r.to_string()),
        signer_address: None,
        signer_public_key: None,
        transaction_type: 16724,
        transaction_message: None,
        transaction_assets: assets
            .iter()
            .map(|(mosaic_id, amount)| TransactionAsset {
                mosaic_id: mosaic_id.to_string(),
                amount: *amount,
            })
            .collect(),
        signature: None,
        encoded_body: None,
        creation_block: Some(height),
        discovered_at: 1_700_000_000,
    }
}

/// Scripted ledger: confirmed pages indexed by page number, pending pools
/// pinned to a single window, every call recorded.
#[derive(Default)]
pub struct MockLedger {
    pub confirmed: Vec<TransactionPage>,
    pub unconfirmed: Vec<RawTransaction>,
    pub partial: Vec<RawTransaction>,
    pub fail_confirmed: bool,
    pub calls: Mutex<Vec<(ConfirmationPool, u64)>>,
}

impl MockLedger {
    pub fn new(confirmed: Vec<TransactionPage>) -> Self {
        Self {
            confirmed,
            ..Default::default()
        }
    }

    pub fn page(items: Vec<RawTransaction>, page_number: u64, is_last_page: bool) -> TransactionPage {
        TransactionPage {
            items,
            page_number,
            is_last_page,
        }
    }

    pub fn calls_for(&self, pool: ConfirmationPool) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| *called == pool)
            .count()
    }
}

impl LedgerReader for MockLedger {
    async fn query_page(
        &self,
        _filter: &TransactionFilter,
        pool: ConfirmationPool,
        page_number: u64,
        _page_size: u64,
    ) -> Result<TransactionPage, ClientError> {
        self.calls.lock().unwrap().push((pool, page_number));

        if self.fail_confirmed && pool == ConfirmationPool::Confirmed {
            return Err(ClientError::Status(500, "mock node outage".to_string()));
        }

        match pool {
            ConfirmationPool::Confirmed => Ok(self
                .confirmed
                .get(page_number.saturating_sub(1) as usize)
                .cloned()
                .unwrap_or(TransactionPage {
                    items: Vec::new(),
                    page_number,
                    is_last_page: true,
                })),
            ConfirmationPool::Unconfirmed => Ok(TransactionPage {
                items: self.unconfirmed.clone(),
                page_number: 1,
                is_last_page: true,
            }),
            ConfirmationPool::Partial => Ok(TransactionPage {
                items: self.partial.clone(),
                page_number: 1,
                is_last_page: true,
            }),
        }
    }
}
