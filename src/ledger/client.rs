use crate::config::Config;
use crate::ledger::models::{ConfirmationPool, RawTransaction, TransactionFilter, TransactionPage};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Node request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Node returned status {0} for {1}")]
    Status(u16, String),
}

/// Read access to the remote ledger. Network failures propagate to the
/// caller; the engine relies on the next scheduled run instead of retrying.
#[allow(async_fn_in_trait)]
pub trait LedgerReader {
    async fn query_page(
        &self,
        filter: &TransactionFilter,
        pool: ConfirmationPool,
        page_number: u64,
        page_size: u64,
    ) -> Result<TransactionPage, ClientError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsResponse {
    #[serde(default)]
    data: Vec<RawTransaction>,
}

/// REST client for the ledger node's transaction endpoints.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl NodeClient {
    pub fn new(config: &Config) -> Self {
        let base_url = config.node_url.trim_end_matches('/').to_string();

        info!("Initializing ledger node client for {}", base_url);

        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout: Duration::from_secs(config.node_timeout_secs),
        }
    }
}

impl LedgerReader for NodeClient {
    async fn query_page(
        &self,
        filter: &TransactionFilter,
        pool: ConfirmationPool,
        page_number: u64,
        page_size: u64,
    ) -> Result<TransactionPage, ClientError> {
        let url = format!("{}/transactions/{}", self.base_url, pool.as_path());

        let mut request = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .query(&[("address", filter.address.as_str())])
            .query(&[
                ("pageNumber", page_number.to_string()),
                ("pageSize", page_size.to_string()),
            ])
            .query(&[("order", filter.order.as_str())]);

        for transaction_type in &filter.transaction_types {
            request = request.query(&[("type", transaction_type.to_string())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16(), url));
        }

        let body: TransactionsResponse = response.json().await?;
        // The node does not report the page count; a short page marks the
        // end of the pool's history.
        let is_last_page = (body.data.len() as u64) < page_size;

        debug!(
            "Fetched {} {} transaction(s) for {} (page {})",
            body.data.len(),
            pool.as_path(),
            filter.address,
            page_number
        );

        Ok(TransactionPage {
            items: body.data,
            page_number,
            is_last_page,
        })
    }
}
