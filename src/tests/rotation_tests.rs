use crate::db::checkpoint::CheckpointStore;
use crate::discovery::rotation;
use crate::models::{SourceProgress, TransactionTotals};
use crate::tests::{memory_pool, SOURCE_A, SOURCE_B, SOURCE_C};

const JOB: &str = "discovery:transactions";

fn sources() -> Vec<String> {
    vec![
        SOURCE_A.to_string(),
        SOURCE_B.to_string(),
        SOURCE_C.to_string(),
    ]
}

async fn mark_synced(store: &CheckpointStore, source: &str, sync: bool) {
    store
        .save(
            &format!("{}:{}", JOB, source),
            &SourceProgress {
                last_page_number: 1,
                sync,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn unsynchronized_sources_have_priority() {
    let store = CheckpointStore::new(memory_pool().await);

    // A has no checkpoint, B is mid-sync, C is caught up
    mark_synced(&store, SOURCE_B, false).await;
    mark_synced(&store, SOURCE_C, true).await;

    let next = rotation::next_source(&store, &sources(), JOB).await.unwrap();
    assert_eq!(next.as_deref(), Some(SOURCE_A));
}

#[tokio::test]
async fn list_order_breaks_ties_between_lagging_sources() {
    let store = CheckpointStore::new(memory_pool().await);

    mark_synced(&store, SOURCE_A, true).await;
    mark_synced(&store, SOURCE_B, false).await;
    mark_synced(&store, SOURCE_C, false).await;

    let next = rotation::next_source(&store, &sources(), JOB).await.unwrap();
    assert_eq!(next.as_deref(), Some(SOURCE_B));
}

#[tokio::test]
async fn round_robin_wraps_to_the_first_source() {
    let store = CheckpointStore::new(memory_pool().await);

    let pair = vec![SOURCE_A.to_string(), SOURCE_B.to_string()];
    mark_synced(&store, SOURCE_A, true).await;
    mark_synced(&store, SOURCE_B, true).await;
    store
        .save(
            JOB,
            &TransactionTotals {
                last_used_account: Some(SOURCE_B.to_string()),
                total_number_of_transactions: 10,
            },
        )
        .await
        .unwrap();

    let next = rotation::next_source(&store, &pair, JOB).await.unwrap();
    assert_eq!(next.as_deref(), Some(SOURCE_A));
}

#[tokio::test]
async fn round_robin_advances_past_the_last_used_account() {
    let store = CheckpointStore::new(memory_pool().await);

    mark_synced(&store, SOURCE_A, true).await;
    mark_synced(&store, SOURCE_B, true).await;
    mark_synced(&store, SOURCE_C, true).await;
    store
        .save(
            JOB,
            &TransactionTotals {
                last_used_account: Some(SOURCE_A.to_string()),
                total_number_of_transactions: 10,
            },
        )
        .await
        .unwrap();

    let next = rotation::next_source(&store, &sources(), JOB).await.unwrap();
    assert_eq!(next.as_deref(), Some(SOURCE_B));
}

#[tokio::test]
async fn missing_global_checkpoint_selects_the_first_source() {
    let store = CheckpointStore::new(memory_pool().await);

    mark_synced(&store, SOURCE_A, true).await;
    mark_synced(&store, SOURCE_B, true).await;
    mark_synced(&store, SOURCE_C, true).await;

    let next = rotation::next_source(&store, &sources(), JOB).await.unwrap();
    assert_eq!(next.as_deref(), Some(SOURCE_A));
}

#[tokio::test]
async fn unknown_last_used_account_selects_the_first_source() {
    let store = CheckpointStore::new(memory_pool().await);

    mark_synced(&store, SOURCE_A, true).await;
    mark_synced(&store, SOURCE_B, true).await;
    mark_synced(&store, SOURCE_C, true).await;
    store
        .save(
            JOB,
            &TransactionTotals {
                last_used_account: Some("no-longer-configured".to_string()),
                total_number_of_transactions: 10,
            },
        )
        .await
        .unwrap();

    let next = rotation::next_source(&store, &sources(), JOB).await.unwrap();
    assert_eq!(next.as_deref(), Some(SOURCE_A));
}

#[tokio::test]
async fn no_sources_yields_none() {
    let store = CheckpointStore::new(memory_pool().await);

    let next = rotation::next_source(&store, &[], JOB).await.unwrap();
    assert!(next.is_none());
}
