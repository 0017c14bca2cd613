// Pulls pages of transactions from the remote ledger into the local
// mirror, one discovery source per run. Confirmed history advances a
// persistent per-source page cursor; the unconfirmed and partial pools
// are a recent window pinned to their first page.

use crate::config::Config;
use crate::db::checkpoint::CheckpointStore;
use crate::db::transaction;
use crate::discovery::job::{self, Discovery, DiscoveryError, RunArgs, RunReport};
use crate::discovery::rotation;
use crate::ledger::{
    extract_transaction, ConfirmationPool, LedgerReader, RawTransaction, SortOrder,
    TransactionFilter,
};
use crate::models::{SourceProgress, TransactionTotals};
use crate::validation;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{error, info};

/// Upper bound of confirmed pages read in one invocation.
const MAX_PAGES_PER_RUN: u64 = 5;

pub const GLOBAL_CHECKPOINT: &str = "discovery:transactions";

pub struct TransactionDiscovery<'a, L> {
    pool: &'a SqlitePool,
    checkpoints: &'a CheckpointStore,
    ledger: &'a L,
    config: &'a Config,
}

impl<'a, L: LedgerReader> TransactionDiscovery<'a, L> {
    pub fn new(
        pool: &'a SqlitePool,
        checkpoints: &'a CheckpointStore,
        ledger: &'a L,
        config: &'a Config,
    ) -> Self {
        Self {
            pool,
            checkpoints,
            ledger,
            config,
        }
    }

    /// Scheduler entry point: resolves the source through the rotation
    /// policy and swallows failures, which the job base already logged.
    pub async fn run_as_scheduler(&self) {
        let resolved: Vec<String> = self
            .config
            .discovery_sources
            .iter()
            .map(|raw| {
                validation::resolve_source(raw, self.config.network_id, &self.config.primary_address)
            })
            .collect();

        let source = if resolved.is_empty() {
            Some(self.config.primary_address.clone())
        } else {
            match rotation::next_source(self.checkpoints, &resolved, GLOBAL_CHECKPOINT).await {
                Ok(source) => source,
                Err(e) => {
                    error!("transaction discovery: source rotation failed: {}", e);
                    return;
                }
            }
        };

        let Some(source) = source else {
            return;
        };

        let args = RunArgs {
            source: Some(source),
            verbose: self.config.verbose_discovery,
        };
        let _ = job::run(self, self.checkpoints, &args).await;
    }

    /// Read up to `MAX_PAGES_PER_RUN` confirmed pages from the stored
    /// cursor, plus the pinned recent-window pools when enabled. Advances
    /// `progress` as pages complete; a last or short page ends the round.
    async fn read_round(
        &self,
        progress: &mut SourceProgress,
        source: &str,
        report: &mut RunReport,
    ) -> Result<Vec<RawTransaction>, DiscoveryError> {
        let page_size = self.config.page_size;
        let filter = TransactionFilter {
            address: source.to_string(),
            transaction_types: self.config.transaction_types.clone(),
            order: SortOrder::Asc,
        };

        let mut collected = Vec::new();
        let start_page = progress.last_page_number.max(1);

        for offset in 0..MAX_PAGES_PER_RUN {
            let page_number = start_page + offset;
            let page = self
                .ledger
                .query_page(&filter, ConfirmationPool::Confirmed, page_number, page_size)
                .await?;
            report.pages_read += 1;

            let short_page = (page.items.len() as u64) < page_size;
            let last_page = page.is_last_page;
            collected.extend(page.items);

            if self.config.include_unconfirmed {
                let pending = self
                    .ledger
                    .query_page(&filter, ConfirmationPool::Unconfirmed, 1, page_size)
                    .await?;
                collected.extend(pending.items);
            }
            if self.config.include_partial {
                let partial = self
                    .ledger
                    .query_page(&filter, ConfirmationPool::Partial, 1, page_size)
                    .await?;
                collected.extend(partial.items);
            }

            // The cursor stays on a last or short page so the append-only
            // tail is re-read next run; it never moves backwards.
            progress.last_page_number = page_number;
            if last_page || short_page {
                progress.sync = last_page;
                return Ok(collected);
            }
            progress.last_page_number = page_number + 1;
        }

        progress.sync = false;
        Ok(collected)
    }
}

impl<L: LedgerReader> Discovery for TransactionDiscovery<'_, L> {
    type State = SourceProgress;

    fn name(&self) -> &'static str {
        "transaction discovery"
    }

    fn checkpoint_name(&self, source: Option<&str>) -> String {
        let source = source.unwrap_or(&self.config.primary_address);
        format!("{}:{}", GLOBAL_CHECKPOINT, source)
    }

    async fn discover(
        &self,
        progress: &mut Self::State,
        args: &RunArgs,
    ) -> Result<RunReport, DiscoveryError> {
        let source = args
            .source
            .clone()
            .unwrap_or_else(|| self.config.primary_address.clone());
        let mut report = RunReport::default();

        // Global running total, seeded from the local mirror on first run
        let mut totals = match self
            .checkpoints
            .load::<TransactionTotals>(GLOBAL_CHECKPOINT)
            .await?
        {
            Some(totals) => totals,
            None => TransactionTotals {
                last_used_account: None,
                total_number_of_transactions: transaction::count_all(self.pool).await?,
            },
        };

        let collected = self.read_round(progress, &source, &mut report).await?;

        // Dedup by hash across every page fetched this round, then skip
        // hashes the mirror already holds
        let now = Utc::now().timestamp();
        let mut seen = HashSet::new();
        let mut fresh = Vec::new();
        for raw in collected {
            if !seen.insert(raw.meta.hash.clone()) {
                continue;
            }
            if transaction::exists_by_hash(self.pool, &raw.meta.hash).await? {
                continue;
            }
            fresh.push(extract_transaction(
                &raw,
                &source,
                self.config.network_id,
                now,
            ));
        }

        let created = transaction::add_transactions(self.pool, &fresh).await?;
        report.created = created;

        if created > 0 {
            info!(
                "transaction discovery: ingested {} new transaction(s) for {}",
                created, source
            );
        }

        totals.total_number_of_transactions += created;
        totals.last_used_account = Some(source);
        self.checkpoints.save(GLOBAL_CHECKPOINT, &totals).await?;

        Ok(report)
    }
}
