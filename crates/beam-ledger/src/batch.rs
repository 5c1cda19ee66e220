//! Input shape delivered by the upstream feed, one value per batch.

use beam_types::keys::event_key;
use serde::{Deserialize, Serialize};

/// Where a batch came from, used to correlate logs with the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOrigin {
    pub tx_hash: String,
    pub block_number: u64,
    pub log_index: u64,
    /// Block timestamp; becomes `last_updated` on every touched row.
    pub timestamp: u64,
}

impl BatchOrigin {
    pub fn event_key(&self, chain_id: u64) -> String {
        event_key(chain_id, &self.tx_hash, self.log_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub address: String,
    pub units: u128,
}

/// External profile ids routing one adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub sender_fid: u64,
    pub receiver_fid: u64,
}

/// One units-update call as emitted on chain. `members`, `pools` and
/// `routes` are parallel arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsBatch {
    pub chain_id: u64,
    pub origin: BatchOrigin,
    /// 0 = update, 1 = increase, 2 = decrease.
    pub action: u8,
    /// `(sentinel, json)` tuple.
    pub metadata: (u128, String),
    pub members: Vec<Member>,
    pub pools: Vec<String>,
    pub routes: Vec<Route>,
}
