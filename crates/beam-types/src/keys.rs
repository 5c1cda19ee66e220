//! Deterministic string keys for every entity kind.
//!
//! Addresses are lower-cased before they are folded into a key so that the same
//! on-chain account always maps to the same row no matter how the caller spelled
//! its checksum casing.

/// Canonical form of an address used inside keys and stored records.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

pub fn pool_key(pool: &str) -> String {
    normalize_address(pool)
}

pub fn beam_key(pool: &str, recipient: &str) -> String {
    format!("{}_{}", normalize_address(pool), normalize_address(recipient))
}

pub fn account_key(chain_id: u64, address: &str) -> String {
    format!("{chain_id}_{}", normalize_address(address))
}

pub fn user_key(fid: u64) -> String {
    fid.to_string()
}

/// Correlation id for one upstream log entry.
pub fn event_key(chain_id: u64, tx_hash: &str, log_index: u64) -> String {
    format!("{chain_id}_{}_{log_index}", normalize_address(tx_hash))
}
