pub mod config;
pub mod db;
pub mod discovery;
pub mod ledger;
pub mod models;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use db::checkpoint::CheckpointStore;
pub use db::connection;
pub use db::migration;
pub use models::{Account, Asset, LedgerTransaction, TransactionMode};
pub use validation::{address_from_public_key, canonical_address, resolve_source};
