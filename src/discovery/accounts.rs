// Derives account rows from the locally ingested transaction mirror.
// Downstream of transaction discovery: it pages through the mirror, not
// the ledger, and always works from the application's primary account.

use crate::config::Config;
use crate::db::checkpoint::CheckpointStore;
use crate::db::{account, transaction};
use crate::discovery::job::{self, Discovery, DiscoveryError, RunArgs, RunReport};
use crate::discovery::rewind_cursor;
use crate::discovery::transactions::GLOBAL_CHECKPOINT as TRANSACTIONS_CHECKPOINT;
use crate::models::{Account, AccountProgress, TransactionTotals};
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::info;

/// Upper bound of local pages scanned in one invocation.
const MAX_PAGES_PER_RUN: u64 = 10;
const LOCAL_PAGE_SIZE: u64 = 100;

pub const CHECKPOINT: &str = "discovery:accounts";

pub struct AccountDiscovery<'a> {
    pool: &'a SqlitePool,
    checkpoints: &'a CheckpointStore,
    config: &'a Config,
}

impl<'a> AccountDiscovery<'a> {
    pub fn new(pool: &'a SqlitePool, checkpoints: &'a CheckpointStore, config: &'a Config) -> Self {
        Self {
            pool,
            checkpoints,
            config,
        }
    }

    pub async fn run_as_scheduler(&self) {
        // Implicit source: the primary account, never the rotated list
        let args = RunArgs {
            source: None,
            verbose: self.config.verbose_discovery,
        };
        let _ = job::run(self, self.checkpoints, &args).await;
    }
}

impl Discovery for AccountDiscovery<'_> {
    type State = AccountProgress;

    fn name(&self) -> &'static str {
        "account discovery"
    }

    fn checkpoint_name(&self, _source: Option<&str>) -> String {
        CHECKPOINT.to_string()
    }

    async fn discover(
        &self,
        progress: &mut Self::State,
        _args: &RunArgs,
    ) -> Result<RunReport, DiscoveryError> {
        let mut report = RunReport::default();

        // The transaction job's running total tells us where the mirror
        // ends; a stale read at worst causes one extra tail pass
        let total_transactions = self
            .checkpoints
            .load::<TransactionTotals>(TRANSACTIONS_CHECKPOINT)
            .await?
            .map(|totals| totals.total_number_of_transactions)
            .unwrap_or(0);

        let mut cursor = rewind_cursor(progress.last_page_number, total_transactions, LOCAL_PAGE_SIZE);

        let mut seen = HashSet::new();
        let mut sighted: Vec<Account> = Vec::new();

        for _ in 0..MAX_PAGES_PER_RUN {
            let rows = transaction::find_page(self.pool, cursor, LOCAL_PAGE_SIZE).await?;
            report.pages_read += 1;
            let row_count = rows.len() as u64;

            for row in rows {
                let Some(recipient) = row.recipient_address else {
                    continue;
                };
                if seen.insert(recipient.clone()) {
                    sighted.push(Account {
                        address: recipient,
                        transactions_count: None,
                        first_transaction_at: Some(row.discovered_at),
                        first_transaction_at_block: row.creation_block,
                        referred_by: None,
                    });
                }
            }

            if row_count < LOCAL_PAGE_SIZE {
                break;
            }
            cursor += 1;
        }

        for candidate in sighted {
            if account::exists(self.pool, &candidate.address).await? {
                continue;
            }
            if account::add_account(self.pool, &candidate).await? {
                report.created += 1;
            }
        }

        if report.created > 0 {
            info!(
                "account discovery: registered {} new account(s)",
                report.created
            );
        }

        progress.last_page_number = cursor;
        progress.last_executed_at = Utc::now().timestamp();

        Ok(report)
    }
}
