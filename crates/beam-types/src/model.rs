use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::{account_key, normalize_address, pool_key, user_key};

/// How a units adjustment is applied to the current balance of a beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Absolute set; the last writer in a batch wins.
    Update,
    Increase,
    Decrease,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized action code {0}")]
pub struct UnknownActionCode(pub u8);

impl Action {
    pub fn code(self) -> u8 {
        match self {
            Action::Update => 0,
            Action::Increase => 1,
            Action::Decrease => 2,
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = UnknownActionCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Action::Update),
            1 => Ok(Action::Increase),
            2 => Ok(Action::Decrease),
            other => Err(UnknownActionCode(other)),
        }
    }
}

/// Pool flavour carried in batch metadata. Encoded as its numeric discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PoolType {
    #[default]
    Unknown,
    Tip,
    Earn,
}

impl TryFrom<u8> for PoolType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PoolType::Unknown),
            1 => Ok(PoolType::Tip),
            2 => Ok(PoolType::Earn),
            other => Err(format!("unknown pool type {other}")),
        }
    }
}

impl From<PoolType> for u8 {
    fn from(value: PoolType) -> Self {
        match value {
            PoolType::Unknown => 0,
            PoolType::Tip => 1,
            PoolType::Earn => 2,
        }
    }
}

/// Identity keyed by an external profile id (fid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub fid: u64,
}

impl User {
    pub fn new(fid: u64) -> Self {
        Self {
            id: user_key(fid),
            fid,
        }
    }
}

/// On-chain recipient account, optionally linked to a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub chain_id: u64,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Account {
    pub fn new(chain_id: u64, address: &str, user: Option<String>) -> Self {
        Self {
            id: account_key(chain_id, address),
            chain_id,
            address: normalize_address(address),
            user,
        }
    }
}

/// Ledger row: one recipient's units inside one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beam {
    pub id: String,
    pub chain_id: u64,
    /// User key of the routing sender.
    pub sender: String,
    /// User key of the routing receiver.
    pub receiver: String,
    /// Pool key of the owning pool.
    pub pool: String,
    /// Account key of the recipient address.
    pub recipient: String,
    pub units: u128,
    pub is_receiver_connected: bool,
    pub last_updated: u64,
}

/// Per-pool aggregate over all of its beams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub chain_id: u64,
    /// Account key of the pool creator.
    pub creator: String,
    pub token: String,
    pub total_units: u128,
    pub beam_count: u64,
    /// Every recipient address that ever held a beam in this pool.
    #[serde(default)]
    pub members: Vec<String>,
    pub last_updated: u64,
    #[serde(default)]
    pub flow_rate: i128,
    #[serde(default)]
    pub creator_flow_rate: i128,
    #[serde(default)]
    pub adjustment_flow_rate: i128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_member: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub has_distributed: bool,
}

impl Pool {
    /// Empty pool as recorded at creation time.
    pub fn new(chain_id: u64, address: &str, creator: &str, token: &str, created_at: u64) -> Self {
        Self {
            id: pool_key(address),
            chain_id,
            creator: account_key(chain_id, creator),
            token: normalize_address(token),
            total_units: 0,
            beam_count: 0,
            members: Vec::new(),
            last_updated: created_at,
            flow_rate: 0,
            creator_flow_rate: 0,
            adjustment_flow_rate: 0,
            adjustment_member: None,
            active: false,
            has_distributed: false,
        }
    }
}
