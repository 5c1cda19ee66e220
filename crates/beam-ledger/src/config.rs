use std::{fmt, str::FromStr};

use beam_types::schemas::ONCHAIN_EVENT;
use serde::{Deserialize, Serialize};

/// What a decrease below zero does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnderflowPolicy {
    /// Floor the balance at zero and log a warning.
    #[default]
    Clamp,
    /// Drop every adjustment to that (pool, recipient) pair in the batch.
    RejectPair,
    /// Fail the whole batch with `InsufficientUnits`.
    RejectBatch,
}

/// How far an unknown pool reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureScope {
    /// Reject the batch; nothing is written.
    #[default]
    Batch,
    /// Skip the instructions that name the unknown pool and apply the rest.
    Pool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LedgerConfig {
    /// Marker expected as the first element of the metadata tuple.
    pub sentinel: u128,
    pub underflow: UnderflowPolicy,
    pub failure_scope: FailureScope,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            sentinel: ONCHAIN_EVENT,
            underflow: UnderflowPolicy::default(),
            failure_scope: FailureScope::default(),
        }
    }
}

impl FromStr for UnderflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(UnderflowPolicy::Clamp),
            "reject-pair" | "pair" => Ok(UnderflowPolicy::RejectPair),
            "reject-batch" | "batch" => Ok(UnderflowPolicy::RejectBatch),
            other => Err(format!(
                "unknown underflow policy '{other}' (expected clamp, reject-pair, reject-batch)"
            )),
        }
    }
}

impl fmt::Display for UnderflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnderflowPolicy::Clamp => "clamp",
            UnderflowPolicy::RejectPair => "reject-pair",
            UnderflowPolicy::RejectBatch => "reject-batch",
        })
    }
}

impl FromStr for FailureScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" => Ok(FailureScope::Batch),
            "pool" => Ok(FailureScope::Pool),
            other => Err(format!(
                "unknown failure scope '{other}' (expected batch, pool)"
            )),
        }
    }
}

impl fmt::Display for FailureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureScope::Batch => "batch",
            FailureScope::Pool => "pool",
        })
    }
}
