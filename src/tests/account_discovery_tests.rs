use crate::db::checkpoint::CheckpointStore;
use crate::db::{account, transaction};
use crate::discovery::accounts::{AccountDiscovery, CHECKPOINT};
use crate::discovery::job::{self, RunArgs};
use crate::discovery::transactions::GLOBAL_CHECKPOINT as TRANSACTIONS_CHECKPOINT;
use crate::models::{AccountProgress, TransactionTotals};
use crate::tests::{memory_pool, mirror_transfer, test_config, RECIPIENT_1, RECIPIENT_2, SOURCE_A};
use sqlx::SqlitePool;

async fn seed_totals(checkpoints: &CheckpointStore, total: u64) {
    checkpoints
        .save(
            TRANSACTIONS_CHECKPOINT,
            &TransactionTotals {
                last_used_account: Some(SOURCE_A.to_string()),
                total_number_of_transactions: total,
            },
        )
        .await
        .unwrap();
}

async fn run_job(pool: &SqlitePool, checkpoints: &CheckpointStore) -> job::RunReport {
    let config = test_config();
    let job = AccountDiscovery::new(pool, checkpoints, &config);
    job::run(&job, checkpoints, &RunArgs::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn distinct_recipients_become_accounts() {
    let pool = memory_pool().await;
    let checkpoints = CheckpointStore::new(pool.clone());

    transaction::add_transactions(
        &pool,
        &[
            mirror_transfer("HASH-1", SOURCE_A, Some(RECIPIENT_1), 10, &[]),
            mirror_transfer("HASH-2", SOURCE_A, Some(RECIPIENT_1), 11, &[]),
            mirror_transfer("HASH-3", SOURCE_A, Some(RECIPIENT_2), 12, &[]),
            mirror_transfer("HASH-4", SOURCE_A, None, 13, &[]),
        ],
    )
    .await
    .unwrap();
    seed_totals(&checkpoints, 4).await;

    let report = run_job(&pool, &checkpoints).await;

    assert_eq!(report.created, 2);
    assert_eq!(account::count_all(&pool).await.unwrap(), 2);
    assert!(account::exists(&pool, RECIPIENT_1).await.unwrap());
    assert!(account::exists(&pool, RECIPIENT_2).await.unwrap());

    let progress: AccountProgress = checkpoints.load(CHECKPOINT).await.unwrap().unwrap();
    assert!(progress.last_executed_at > 0);
    assert_eq!(progress.last_page_number, 1);
}

#[tokio::test]
async fn known_accounts_are_not_recreated() {
    let pool = memory_pool().await;
    let checkpoints = CheckpointStore::new(pool.clone());

    transaction::add_transactions(
        &pool,
        &[mirror_transfer("HASH-1", SOURCE_A, Some(RECIPIENT_1), 10, &[])],
    )
    .await
    .unwrap();
    seed_totals(&checkpoints, 1).await;

    run_job(&pool, &checkpoints).await;
    let second = run_job(&pool, &checkpoints).await;

    assert_eq!(second.created, 0);
    assert_eq!(account::count_all(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn first_sighting_records_the_origin_transaction() {
    let pool = memory_pool().await;
    let checkpoints = CheckpointStore::new(pool.clone());

    transaction::add_transactions(
        &pool,
        &[mirror_transfer("HASH-1", SOURCE_A, Some(RECIPIENT_1), 42, &[])],
    )
    .await
    .unwrap();
    seed_totals(&checkpoints, 1).await;

    run_job(&pool, &checkpoints).await;

    let block: Option<i64> =
        sqlx::query_scalar("SELECT first_transaction_at_block FROM accounts WHERE address = ?")
            .bind(RECIPIENT_1)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(block, Some(42));
}

#[tokio::test]
async fn cursor_past_the_mirror_end_is_rewound() {
    let pool = memory_pool().await;
    let checkpoints = CheckpointStore::new(pool.clone());

    // A stale cursor from before the mirror was compacted
    checkpoints
        .save(
            CHECKPOINT,
            &AccountProgress {
                last_page_number: 39,
                last_executed_at: 0,
            },
        )
        .await
        .unwrap();
    seed_totals(&checkpoints, 250).await;

    run_job(&pool, &checkpoints).await;

    // 39 * 100 > 250 rewinds to page 2; the empty page keeps it there
    let progress: AccountProgress = checkpoints.load(CHECKPOINT).await.unwrap().unwrap();
    assert_eq!(progress.last_page_number, 2);
}

#[tokio::test]
async fn empty_mirror_is_a_clean_noop() {
    let pool = memory_pool().await;
    let checkpoints = CheckpointStore::new(pool.clone());

    let report = run_job(&pool, &checkpoints).await;

    assert_eq!(report.created, 0);
    assert_eq!(account::count_all(&pool).await.unwrap(), 0);
}
