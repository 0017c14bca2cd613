// Configuration for:
// - Ledger node REST endpoint and network identifier
// - Database connection string
// - Discovery source addresses and the application's primary account
// - Per-job scheduling intervals and page size
// - Confirmation pool toggles and transaction type filter

use dotenv::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub node_url: String,
    pub network_id: u8,
    pub discovery_sources: Vec<String>,
    pub primary_address: String,
    pub primary_public_key: String,
    pub page_size: u64,
    pub transaction_interval: Duration,
    pub account_interval: Duration,
    pub asset_interval: Duration,
    pub include_unconfirmed: bool,
    pub include_partial: bool,
    pub transaction_types: Vec<u16>,
    pub node_timeout_secs: u64,
    pub verbose_discovery: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:///data.db".to_string());
        let node_url = env::var("NODE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let network_id = env::var("NETWORK_ID")
            .unwrap_or_else(|_| "104".to_string())
            .parse()
            .unwrap_or(104);
        let discovery_sources = env::var("DISCOVERY_SOURCES")
            .map(|v| parse_list(&v))
            .unwrap_or_default();
        let primary_address = env::var("PRIMARY_ADDRESS").unwrap_or_default();
        let primary_public_key = env::var("PRIMARY_PUBLIC_KEY").unwrap_or_default();
        let page_size = env::var("PAGE_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100);
        let transaction_interval = env::var("TRANSACTION_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));
        let account_interval = env::var("ACCOUNT_INTERVAL_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(120));
        let asset_interval = env::var("ASSET_INTERVAL_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(120));
        let include_unconfirmed = env::var("INCLUDE_UNCONFIRMED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let include_partial = env::var("INCLUDE_PARTIAL")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let transaction_types = env::var("TRANSACTION_TYPES")
            .map(|v| {
                parse_list(&v)
                    .iter()
                    .filter_map(|t| t.parse().ok())
                    .collect()
            })
            .unwrap_or_else(|_| vec![16724]); // transfer
        let node_timeout_secs = env::var("NODE_TIMEOUT_SECS")
            .map(|v| v.parse().unwrap_or(30))
            .unwrap_or(30);
        let verbose_discovery = env::var("VERBOSE_DISCOVERY")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            database_url,
            node_url,
            network_id,
            discovery_sources,
            primary_address,
            primary_public_key,
            page_size,
            transaction_interval,
            account_interval,
            asset_interval,
            include_unconfirmed,
            include_partial,
            transaction_types,
            node_timeout_secs,
            verbose_discovery,
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
