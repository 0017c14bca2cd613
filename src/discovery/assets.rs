// Derives per-user mosaic holdings from the locally ingested transaction
// mirror, one rotated discovery source per run. Shares the account job's
// tail-rewinding read but scans a deeper window.

use crate::config::Config;
use crate::db::checkpoint::CheckpointStore;
use crate::db::{asset, transaction};
use crate::discovery::job::{self, Discovery, DiscoveryError, RunArgs, RunReport};
use crate::discovery::rewind_cursor;
use crate::discovery::rotation;
use crate::discovery::transactions::GLOBAL_CHECKPOINT as TRANSACTIONS_CHECKPOINT;
use crate::models::{Asset, AssetProgress, AssetTotals, TransactionTotals};
use crate::validation;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{error, info};

/// Upper bound of local pages scanned in one invocation.
const MAX_PAGES_PER_RUN: u64 = 20;
const LOCAL_PAGE_SIZE: u64 = 100;

pub const GLOBAL_CHECKPOINT: &str = "discovery:assets";

pub struct AssetDiscovery<'a> {
    pool: &'a SqlitePool,
    checkpoints: &'a CheckpointStore,
    config: &'a Config,
}

impl<'a> AssetDiscovery<'a> {
    pub fn new(pool: &'a SqlitePool, checkpoints: &'a CheckpointStore, config: &'a Config) -> Self {
        Self {
            pool,
            checkpoints,
            config,
        }
    }

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
                    error!("asset discovery: source rotation failed: {}", e);
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
}

impl Discovery for AssetDiscovery<'_> {
    type State = AssetProgress;

    fn name(&self) -> &'static str {
        "asset discovery"
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

        // Rewound off the job-wide transaction total; with several sources
        // this is a knowingly coarse bound on one source's mirror
        let total_transactions = self
            .checkpoints
            .load::<TransactionTotals>(TRANSACTIONS_CHECKPOINT)
            .await?
            .map(|totals| totals.total_number_of_transactions)
            .unwrap_or(0);

        let mut cursor = rewind_cursor(progress.last_page_number, total_transactions, LOCAL_PAGE_SIZE);

        let mut seen_hashes = HashSet::new();
        let mut candidates: Vec<Asset> = Vec::new();
        let mut drained = false;

        for _ in 0..MAX_PAGES_PER_RUN {
            let rows =
                transaction::find_page_by_source(self.pool, &source, cursor, LOCAL_PAGE_SIZE)
                    .await?;
            report.pages_read += 1;
            let row_count = rows.len() as u64;

            for row in rows {
                // One candidate set per transaction hash
                if !seen_hashes.insert(row.transaction_hash.clone()) {
                    continue;
                }
                let Some(user_address) = row.recipient_address else {
                    continue;
                };
                for attached in &row.transaction_assets {
                    if attached.amount == 0 {
                        continue;
                    }
                    candidates.push(Asset {
                        transaction_hash: row.transaction_hash.clone(),
                        user_address: user_address.clone(),
                        mosaic_id: attached.mosaic_id.clone(),
                        amount: attached.amount,
                        creation_block: row.creation_block,
                    });
                }
            }

            if row_count < LOCAL_PAGE_SIZE {
                drained = true;
                break;
            }
            cursor += 1;
        }

        let mut fresh = Vec::new();
        for candidate in candidates {
            if asset::exists(
                self.pool,
                &candidate.transaction_hash,
                &candidate.user_address,
                &candidate.mosaic_id,
            )
            .await?
            {
                continue;
            }
            fresh.push(candidate);
        }

        report.created = asset::add_assets(self.pool, &fresh).await?;

        if report.created > 0 {
            info!(
                "asset discovery: recorded {} new asset entry(ies) for {}",
                report.created, source
            );
        }

        progress.last_page_number = cursor;
        progress.sync = drained;
        progress.last_executed_at = Utc::now().timestamp();

        self.checkpoints
            .save(
                GLOBAL_CHECKPOINT,
                &AssetTotals {
                    last_used_account: Some(source),
                },
            )
            .await?;

        Ok(report)
    }
}
