use crate::models::Asset;
use sqlx::{Pool, Sqlite};

pub async fn exists(
    pool: &Pool<Sqlite>,
    transaction_hash: &str,
    user_address: &str,
    mosaic_id: &str,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        "SELECT transaction_hash FROM assets
         WHERE transaction_hash = ? AND user_address = ? AND mosaic_id = ?",
    )
    .bind(transaction_hash)
    .bind(user_address)
    .bind(mosaic_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Batch insert keyed by the (hash, user, mosaic) triple. Re-discovered
/// entries collapse to no-ops; the return value counts rows created.
pub async fn add_assets(pool: &Pool<Sqlite>, assets: &[Asset]) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut created = 0;

    for asset in assets {
        let creation_block = asset.creation_block.map(|block| block as i64);

        let result = sqlx::query(
            "INSERT INTO assets
             (transaction_hash, user_address, mosaic_id, amount, creation_block)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(transaction_hash, user_address, mosaic_id) DO NOTHING",
        )
        .bind(&asset.transaction_hash)
        .bind(&asset.user_address)
        .bind(&asset.mosaic_id)
        .bind(asset.amount as i64)
        .bind(creation_block)
        .execute(&mut *tx)
        .await?;

        created += result.rows_affected();
    }

    tx.commit().await?;

    Ok(created)
}

pub async fn count_all(pool: &Pool<Sqlite>) -> Result<u64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
        .fetch_one(pool)
        .await?;

    Ok(count as u64)
}
