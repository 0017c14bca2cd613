use crate::models::{LedgerTransaction, TransactionMode};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// Batch insert inside one database transaction. Duplicate hashes are
/// silently skipped; the return value counts rows actually created.
pub async fn add_transactions(
    pool: &Pool<Sqlite>,
    transactions: &[LedgerTransaction],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut created = 0;

    for transaction in transactions {
        let assets = serde_json::to_string(&transaction.transaction_assets)
            .unwrap_or_else(|_| "[]".to_string());
        let creation_block = transaction.creation_block.map(|block| block as i64);

        let result = sqlx::query(
            r#"
            INSERT INTO transactions
            (transaction_hash, transaction_mode, source_address, recipient_address,
             signer_address, signer_public_key, transaction_type, transaction_message,
             transaction_assets, signature, encoded_body, creation_block, discovered_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(transaction_hash) DO NOTHING
            "#,
        )
        .bind(&transaction.transaction_hash)
        .bind(transaction.transaction_mode.as_str())
        .bind(&transaction.source_address)
        .bind(&transaction.recipient_address)
        .bind(&transaction.signer_address)
        .bind(&transaction.signer_public_key)
        .bind(transaction.transaction_type as i64)
        .bind(&transaction.transaction_message)
        .bind(assets)
        .bind(&transaction.signature)
        .bind(&transaction.encoded_body)
        .bind(creation_block)
        .bind(transaction.discovered_at)
        .execute(&mut *tx)
        .await?;

        created += result.rows_affected();
    }

    tx.commit().await?;

    Ok(created)
}

pub async fn exists_by_hash(pool: &Pool<Sqlite>, hash: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT transaction_hash FROM transactions WHERE transaction_hash = ?")
        .bind(hash)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub async fn count_all(pool: &Pool<Sqlite>) -> Result<u64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await?;

    Ok(count as u64)
}

/// One page of the local mirror in creation order, 1-indexed.
pub async fn find_page(
    pool: &Pool<Sqlite>,
    page_number: u64,
    page_size: u64,
) -> Result<Vec<LedgerTransaction>, sqlx::Error> {
    let offset = page_number.saturating_sub(1) * page_size;

    let rows = sqlx::query(
        r#"SELECT transaction_hash, transaction_mode, source_address, recipient_address,
                  signer_address, signer_public_key, transaction_type, transaction_message,
                  transaction_assets, signature, encoded_body, creation_block, discovered_at
           FROM transactions
           ORDER BY creation_block ASC, discovered_at ASC, transaction_hash ASC
           LIMIT ? OFFSET ?"#,
    )
    .bind(page_size as i64)
    .bind(offset as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_transaction).collect())
}

/// Same page read restricted to one discovery source's vantage.
pub async fn find_page_by_source(
    pool: &Pool<Sqlite>,
    source_address: &str,
    page_number: u64,
    page_size: u64,
) -> Result<Vec<LedgerTransaction>, sqlx::Error> {
    let offset = page_number.saturating_sub(1) * page_size;

    let rows = sqlx::query(
        r#"SELECT transaction_hash, transaction_mode, source_address, recipient_address,
                  signer_address, signer_public_key, transaction_type, transaction_message,
                  transaction_assets, signature, encoded_body, creation_block, discovered_at
           FROM transactions
           WHERE source_address = ?
           ORDER BY creation_block ASC, discovered_at ASC, transaction_hash ASC
           LIMIT ? OFFSET ?"#,
    )
    .bind(source_address)
    .bind(page_size as i64)
    .bind(offset as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_transaction).collect())
}

fn row_to_transaction(row: &SqliteRow) -> LedgerTransaction {
    let mode: String = row.get("transaction_mode");
    let assets: String = row.get("transaction_assets");

    LedgerTransaction {
        transaction_hash: row.get("transaction_hash"),
        transaction_mode: TransactionMode::from_str(&mode),
        source_address: row.get("source_address"),
        recipient_address: row.get("recipient_address"),
        signer_address: row.get("signer_address"),
        signer_public_key: row.get("signer_public_key"),
        transaction_type: row.get::<i64, _>("transaction_type") as u16,
        transaction_message: row.get("transaction_message"),
        transaction_assets: serde_json::from_str(&assets).unwrap_or_default(),
        signature: row.get("signature"),
        encoded_body: row.get("encoded_body"),
        creation_block: row
            .get::<Option<i64>, _>("creation_block")
            .map(|block| block as u64),
        discovered_at: row.get("discovered_at"),
    }
}
