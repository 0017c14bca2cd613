// Fixed-interval triggers for the three discovery jobs. Each job runs on
// its own cadence; failures inside a run never stop the loop, the next
// tick is the retry.

use crate::db::checkpoint::CheckpointStore;
use crate::discovery::accounts::AccountDiscovery;
use crate::discovery::assets::AssetDiscovery;
use crate::discovery::transactions::TransactionDiscovery;
use crate::ledger::NodeClient;
use crate::state::AppState;
use std::sync::Arc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn start_discovery(state: Arc<AppState>, shutdown: CancellationToken) {
    info!("Starting discovery scheduler");

    let checkpoints = CheckpointStore::new(state.db_pool.clone());
    let ledger = NodeClient::new(&state.config);

    // Transaction ingestion, every minute
    let transactions_state = state.clone();
    let transactions_checkpoints = checkpoints.clone();
    let transactions_ledger = ledger.clone();
    let transactions_shutdown = shutdown.clone();
    let transactions_handle = tokio::spawn(async move {
        let mut ticker = interval(transactions_state.config.transaction_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let job = TransactionDiscovery::new(
                        &transactions_state.db_pool,
                        &transactions_checkpoints,
                        &transactions_ledger,
                        &transactions_state.config,
                    );
                    job.run_as_scheduler().await;
                }
                _ = transactions_shutdown.cancelled() => {
                    info!("Shutting down transaction discovery");
                    break;
                }
            }
        }
    });

    // Account derivation, every two minutes
    let accounts_state = state.clone();
    let accounts_checkpoints = checkpoints.clone();
    let accounts_shutdown = shutdown.clone();
    let accounts_handle = tokio::spawn(async move {
        let mut ticker = interval(accounts_state.config.account_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let job = AccountDiscovery::new(
                        &accounts_state.db_pool,
                        &accounts_checkpoints,
                        &accounts_state.config,
                    );
                    job.run_as_scheduler().await;
                }
                _ = accounts_shutdown.cancelled() => {
                    info!("Shutting down account discovery");
                    break;
                }
            }
        }
    });

    // Asset derivation, every two minutes
    let assets_state = state.clone();
    let assets_checkpoints = checkpoints.clone();
    let assets_shutdown = shutdown.clone();
    let assets_handle = tokio::spawn(async move {
        let mut ticker = interval(assets_state.config.asset_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let job = AssetDiscovery::new(
                        &assets_state.db_pool,
                        &assets_checkpoints,
                        &assets_state.config,
                    );
                    job.run_as_scheduler().await;
                }
                _ = assets_shutdown.cancelled() => {
                    info!("Shutting down asset discovery");
                    break;
                }
            }
        }
    });

    let _ = tokio::join!(transactions_handle, accounts_handle, assets_handle);
}
