use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("store error: {0}")]
    Store(#[from] beam_store::StoreError),
    #[error("unrecognized action code {code}")]
    InvalidAction { code: u8 },
    #[error("invalid metadata: {reason}")]
    InvalidMetadata { reason: String },
    #[error(
        "batch arrays differ in length: {members} members, {pools} pools, {routes} routes"
    )]
    LengthMismatch {
        members: usize,
        pools: usize,
        routes: usize,
    },
    #[error("pool '{pool}' is unknown on chain {chain_id}")]
    UnknownPool { pool: String, chain_id: u64 },
    #[error("beam '{beam}' holds {available} units, cannot decrease by {requested}")]
    InsufficientUnits {
        beam: String,
        available: u128,
        requested: u128,
    },
    #[error("beam '{beam}' units overflow adding {requested} to {available}")]
    UnitsOverflow {
        beam: String,
        available: u128,
        requested: u128,
    },
}

impl LedgerError {
    pub(crate) fn invalid_metadata(reason: impl Into<String>) -> Self {
        LedgerError::InvalidMetadata {
            reason: reason.into(),
        }
    }
}
