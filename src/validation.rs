use base32::Alphabet;
use ripemd::Ripemd160;
use sha3::{Digest, Sha3_256};
use thiserror::Error;
use tracing::warn;

const ALPHABET: Alphabet = Alphabet::Rfc4648 { padding: false };

/// Raw address layout: network byte + 20-byte account hash + 3-byte checksum.
const RAW_ADDRESS_LEN: usize = 24;
const CHECKSUM_LEN: usize = 3;
const ENCODED_ADDRESS_LEN: usize = 39;
const PUBLIC_KEY_HEX_LEN: usize = 64;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid ledger address format: {0}")]
    InvalidAddress(String),

    #[error("Address {0} does not belong to network {1}")]
    WrongNetwork(String, u8),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Validate a base32 address against the configured network and return its
/// canonical (uppercase, unhyphenated) form.
pub fn canonical_address(address: &str, network_id: u8) -> Result<String, ValidationError> {
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    // Accept the pretty format with dashes
    let normalized: String = address
        .trim()
        .chars()
        .filter(|c| *c != '-')
        .collect::<String>()
        .to_uppercase();

    if normalized.len() != ENCODED_ADDRESS_LEN {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    let raw = base32::decode(ALPHABET, &normalized)
        .ok_or_else(|| ValidationError::InvalidAddress(address.to_string()))?;
    if raw.len() != RAW_ADDRESS_LEN {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    if raw[0] != network_id {
        return Err(ValidationError::WrongNetwork(normalized, network_id));
    }

    let body = &raw[..RAW_ADDRESS_LEN - CHECKSUM_LEN];
    let checksum = &raw[RAW_ADDRESS_LEN - CHECKSUM_LEN..];
    let expected = Sha3_256::digest(body);
    if checksum != &expected[..CHECKSUM_LEN] {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    Ok(normalized)
}

/// Derive the base32 address of a hex-encoded public key on the given network.
pub fn address_from_public_key(public_key: &str, network_id: u8) -> Result<String, ValidationError> {
    let trimmed = public_key.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingParameter("publicKey".to_string()));
    }
    if trimmed.len() != PUBLIC_KEY_HEX_LEN {
        return Err(ValidationError::InvalidPublicKey(public_key.to_string()));
    }

    let key_bytes = hex::decode(trimmed)
        .map_err(|_| ValidationError::InvalidPublicKey(public_key.to_string()))?;

    let key_hash = Sha3_256::digest(&key_bytes);
    let account_hash = Ripemd160::digest(key_hash);

    let mut raw = Vec::with_capacity(RAW_ADDRESS_LEN);
    raw.push(network_id);
    raw.extend_from_slice(&account_hash);

    let checksum = Sha3_256::digest(&raw);
    raw.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    Ok(base32::encode(ALPHABET, &raw))
}

/// Resolve a configured discovery source (address or public key) into a
/// canonical address, falling back to the primary account when the input
/// cannot be parsed either way.
pub fn resolve_source(input: &str, network_id: u8, primary_address: &str) -> String {
    match canonical_address(input, network_id) {
        Ok(address) => address,
        Err(_) => match address_from_public_key(input, network_id) {
            Ok(address) => address,
            Err(e) => {
                warn!(
                    "Could not resolve discovery source '{}' ({}), falling back to primary account",
                    input, e
                );
                primary_address.to_string()
            }
        },
    }
}
