// Persistence for per-job resumption state. One row per checkpoint name,
// created lazily on the first successful run and overwritten thereafter.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid checkpoint payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub name: String,
    pub data: Value,
}

/// Read/upsert access to the checkpoints table, shared by every discovery
/// job. A single logical writer per name is assumed; writers to different
/// names go through independent rows and never block each other.
#[derive(Clone)]
pub struct CheckpointStore {
    pool: SqlitePool,
}

impl CheckpointStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, name: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let row = sqlx::query("SELECT name, data FROM checkpoints WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.get("data");
                let data = serde_json::from_str(&raw)?;
                Ok(Some(Checkpoint {
                    name: row.get("name"),
                    data,
                }))
            }
            None => Ok(None),
        }
    }

    /// Shallow-merge `patch` over the stored payload and persist the result.
    pub async fn upsert(&self, name: &str, patch: Value) -> Result<Checkpoint, CheckpointError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<String> =
            sqlx::query_scalar("SELECT data FROM checkpoints WHERE name = ?")
                .bind(name)
                .fetch_optional(&mut *tx)
                .await?;

        let mut data = match existing {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Value::Object(Default::default()),
        };
        merge_into(&mut data, patch);

        let raw = serde_json::to_string(&data)?;
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO checkpoints (name, data, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        )
        .bind(name)
        .bind(&raw)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Checkpoint {
            name: name.to_string(),
            data,
        })
    }

    /// Typed read of a job checkpoint. Absence is a normal state, not an
    /// error; callers default the counters themselves.
    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, CheckpointError> {
        match self.find(name).await? {
            Some(checkpoint) => Ok(Some(serde_json::from_value(checkpoint.data)?)),
            None => Ok(None),
        }
    }

    /// Typed write of a job checkpoint through the merge path.
    pub async fn save<T: Serialize>(&self, name: &str, state: &T) -> Result<(), CheckpointError> {
        let patch = serde_json::to_value(state)?;
        self.upsert(name, patch).await?;
        Ok(())
    }
}

fn merge_into(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(base), Value::Object(additions)) => {
            for (key, value) in additions {
                base.insert(key, value);
            }
        }
        (slot, value) => *slot = value,
    }
}
