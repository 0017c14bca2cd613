// Chooses which configured discovery source to synchronize next. Sources
// that never completed a full pass are drained first to bound staleness;
// once every source is caught up the choice degrades to round-robin.

use crate::db::checkpoint::{CheckpointError, CheckpointStore};
use serde::Deserialize;

/// Minimal view of a per-source checkpoint; other fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SyncFlag {
    sync: bool,
}

/// Minimal view of a job's global checkpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RoundRobin {
    last_used_account: Option<String>,
}

/// Pick the next source for the job identified by `job_prefix`, whose
/// per-source checkpoints live under `"<job_prefix>:<source>"`.
pub async fn next_source(
    checkpoints: &CheckpointStore,
    sources: &[String],
    job_prefix: &str,
) -> Result<Option<String>, CheckpointError> {
    if sources.is_empty() {
        return Ok(None);
    }

    // Unsynchronized sources win immediately, list order as tiebreak
    for source in sources {
        let name = format!("{}:{}", job_prefix, source);
        match checkpoints.load::<SyncFlag>(&name).await? {
            Some(flag) if flag.sync => {}
            _ => return Ok(Some(source.clone())),
        }
    }

    // Everyone is caught up; continue after the last account used
    let last_used = checkpoints
        .load::<RoundRobin>(job_prefix)
        .await?
        .and_then(|global| global.last_used_account);

    let next = match last_used.and_then(|last| sources.iter().position(|s| *s == last)) {
        Some(position) => sources.get((position + 1) % sources.len()),
        None => sources.first(),
    };

    Ok(next.cloned())
}
