use crate::models::Account;
use sqlx::{Pool, Sqlite};

pub async fn exists(pool: &Pool<Sqlite>, address: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT address FROM accounts WHERE address = ?")
        .bind(address)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Insert a newly sighted account. A concurrent insert of the same address
/// collapses to a no-op; the return value reports whether a row was created.
pub async fn add_account(pool: &Pool<Sqlite>, account: &Account) -> Result<bool, sqlx::Error> {
    let transactions_count = account.transactions_count.map(|count| count as i64);
    let first_block = account.first_transaction_at_block.map(|block| block as i64);

    let result = sqlx::query(
        "INSERT INTO accounts
         (address, transactions_count, first_transaction_at, first_transaction_at_block, referred_by)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(address) DO NOTHING",
    )
    .bind(&account.address)
    .bind(transactions_count)
    .bind(account.first_transaction_at)
    .bind(first_block)
    .bind(&account.referred_by)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_all(pool: &Pool<Sqlite>) -> Result<u64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;

    Ok(count as u64)
}
