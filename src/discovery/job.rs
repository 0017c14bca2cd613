// Lifecycle shared by every discovery job: load the checkpoint, run the
// job-specific discovery, persist the checkpoint only on success. A failed
// run leaves the checkpoint untouched so the next scheduled tick replays
// the same window.

use crate::db::checkpoint::{CheckpointError, CheckpointStore};
use crate::ledger::client::ClientError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] ClientError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Per-invocation parameters resolved by the scheduler entry points.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub source: Option<String>,
    pub verbose: bool,
}

/// Counters accumulated over one run, reported for logging and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunReport {
    pub created: u64,
    pub pages_read: u64,
}

/// One discovery pipeline. `State` is the job's checkpoint payload; it is
/// loaded fresh for every run and never shared across instances.
#[allow(async_fn_in_trait)]
pub trait Discovery {
    type State: Serialize + DeserializeOwned + Default;

    fn name(&self) -> &'static str;

    /// Checkpoint identifier, keyed by the resolved source where the job
    /// tracks per-source progress.
    fn checkpoint_name(&self, source: Option<&str>) -> String;

    async fn discover(
        &self,
        state: &mut Self::State,
        args: &RunArgs,
    ) -> Result<RunReport, DiscoveryError>;
}

pub async fn run<D: Discovery>(
    job: &D,
    checkpoints: &CheckpointStore,
    args: &RunArgs,
) -> Result<RunReport, DiscoveryError> {
    let checkpoint_name = job.checkpoint_name(args.source.as_deref());
    let started = Instant::now();

    if args.verbose {
        debug!("{}: starting run for '{}'", job.name(), checkpoint_name);
    }

    // Absence is the normal first-run state
    let mut state = checkpoints
        .load::<D::State>(&checkpoint_name)
        .await?
        .unwrap_or_default();

    match job.discover(&mut state, args).await {
        Ok(report) => {
            checkpoints.save(&checkpoint_name, &state).await?;
            if args.verbose {
                debug!(
                    "{}: created {} row(s) over {} page(s) in {:?}",
                    job.name(),
                    report.created,
                    report.pages_read,
                    started.elapsed()
                );
            }
            Ok(report)
        }
        Err(e) => {
            // Checkpoint left untouched; the next tick retries this window
            error!(
                "{}: run failed after {:?}: {}",
                job.name(),
                started.elapsed(),
                e
            );
            Err(e)
        }
    }
}
