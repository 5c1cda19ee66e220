//! Batch shape validation and per-member instruction records.

use beam_types::{
    Action,
    keys::{beam_key, normalize_address, pool_key},
};

use crate::{
    batch::{BatchOrigin, UnitsBatch},
    config::LedgerConfig,
    error::LedgerError,
    metadata::{BatchMetadata, parse_metadata},
};

/// One units adjustment addressed to a single (pool, recipient) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Position in the submitted batch.
    pub index: usize,
    pub chain_id: u64,
    pub pool: String,
    pub recipient: String,
    pub sender_fid: u64,
    pub receiver_fid: u64,
    pub amount: u128,
    pub action: Action,
}

impl Instruction {
    pub fn beam_key(&self) -> String {
        beam_key(&self.pool, &self.recipient)
    }

    pub fn pool_key(&self) -> String {
        pool_key(&self.pool)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBatch {
    pub chain_id: u64,
    pub origin: BatchOrigin,
    pub action: Action,
    pub metadata: BatchMetadata,
    /// Same order as the submitted arrays.
    pub instructions: Vec<Instruction>,
}

/// Checks the batch shape and expands it into one [`Instruction`] per member.
///
/// The action code is checked first, then the metadata tuple, then the
/// parallel array lengths.
pub fn normalize(batch: &UnitsBatch, config: &LedgerConfig) -> Result<NormalizedBatch, LedgerError> {
    let action =
        Action::try_from(batch.action).map_err(|err| LedgerError::InvalidAction { code: err.0 })?;
    let metadata = parse_metadata(&batch.metadata, config.sentinel)?;

    let (members, pools, routes) = (batch.members.len(), batch.pools.len(), batch.routes.len());
    if members != pools || members != routes {
        return Err(LedgerError::LengthMismatch {
            members,
            pools,
            routes,
        });
    }

    let instructions = batch
        .members
        .iter()
        .zip(&batch.pools)
        .zip(&batch.routes)
        .enumerate()
        .map(|(index, ((member, pool), route))| Instruction {
            index,
            chain_id: batch.chain_id,
            pool: normalize_address(pool),
            recipient: normalize_address(&member.address),
            sender_fid: route.sender_fid,
            receiver_fid: route.receiver_fid,
            amount: member.units,
            action,
        })
        .collect();

    Ok(NormalizedBatch {
        chain_id: batch.chain_id,
        origin: batch.origin.clone(),
        action,
        metadata,
        instructions,
    })
}
