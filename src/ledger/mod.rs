pub mod client;
pub mod models;

// Re-exports for convenience
pub use client::{ClientError, LedgerReader, NodeClient};
pub use models::{
    extract_transaction, ConfirmationPool, RawTransaction, SortOrder, TransactionFilter,
    TransactionPage,
};
