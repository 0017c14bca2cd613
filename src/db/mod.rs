pub mod account;
pub mod asset;
pub mod checkpoint;
pub mod connection;
pub mod migration;
pub mod transaction;

pub const INIT_SCHEMA: &str = r#"
-- Checkpoints: one state blob per job identifier
CREATE TABLE IF NOT EXISTS checkpoints (
    name TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Local mirror of ledger transactions, keyed by hash
CREATE TABLE IF NOT EXISTS transactions (
    transaction_hash TEXT PRIMARY KEY,
    transaction_mode TEXT NOT NULL,
    source_address TEXT NOT NULL,
    recipient_address TEXT,
    signer_address TEXT,
    signer_public_key TEXT,
    transaction_type INTEGER NOT NULL,
    transaction_message TEXT,
    transaction_assets TEXT NOT NULL,
    signature TEXT,
    encoded_body TEXT,
    creation_block INTEGER,
    discovered_at INTEGER NOT NULL
);

-- Accounts sighted in ingested transactions
CREATE TABLE IF NOT EXISTS accounts (
    address TEXT PRIMARY KEY,
    transactions_count INTEGER,
    first_transaction_at INTEGER,
    first_transaction_at_block INTEGER,
    referred_by TEXT
);

-- Mosaic quantities attributed to users
CREATE TABLE IF NOT EXISTS assets (
    transaction_hash TEXT NOT NULL,
    user_address TEXT NOT NULL,
    mosaic_id TEXT NOT NULL,
    amount INTEGER NOT NULL,
    creation_block INTEGER,
    PRIMARY KEY (transaction_hash, user_address, mosaic_id)
);

-- Indexes for the paged reads the discovery jobs issue
CREATE INDEX IF NOT EXISTS idx_transactions_creation ON transactions(creation_block, transaction_hash);
CREATE INDEX IF NOT EXISTS idx_transactions_source_creation ON transactions(source_address, creation_block);
"#;
