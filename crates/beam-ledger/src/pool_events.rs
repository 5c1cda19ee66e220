//! Pool-contract events that touch beam and pool rows outside of units batches.

use beam_store::{EntityStore, Record};
use beam_types::{
    Account, Beam, Pool,
    keys::{beam_key, normalize_address, pool_key},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{batch::BatchOrigin, engine::LedgerEngine, error::LedgerError};

/// Whether an event changed any row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The event named a pool or beam this ledger does not track.
    Ignored,
}

/// A recipient connected to or disconnected from a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    pub chain_id: u64,
    pub pool: String,
    pub account: String,
    pub connected: bool,
    pub origin: BatchOrigin,
}

/// New flow rates reported for a pool's distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionUpdate {
    pub chain_id: u64,
    pub pool: String,
    pub distributor: String,
    pub operator: String,
    pub old_flow_rate: i128,
    pub new_distributor_to_pool_flow_rate: i128,
    pub new_total_distribution_flow_rate: i128,
    pub adjustment_flow_recipient: String,
    pub adjustment_flow_rate: i128,
    pub origin: BatchOrigin,
}

impl<S: EntityStore> LedgerEngine<S> {
    pub async fn apply_connection_update(
        &mut self,
        update: &ConnectionUpdate,
    ) -> Result<Outcome, LedgerError> {
        let store = self.store();
        let pool_id = pool_key(&update.pool);
        if load::<Pool, _>(store, &pool_id).await?.is_none() {
            debug!(chain_id = update.chain_id, pool = %pool_id, "connection update for untracked pool");
            return Ok(Outcome::Ignored);
        }

        let key = beam_key(&update.pool, &update.account);
        let Some(beam) = load::<Beam, _>(store, &key).await? else {
            error!(
                chain_id = update.chain_id,
                pool = %pool_id,
                account = %normalize_address(&update.account),
                tx = %update.origin.tx_hash,
                "beam not found for connection update"
            );
            return Ok(Outcome::Ignored);
        };

        store
            .set(Record::Beam(Beam {
                is_receiver_connected: update.connected,
                ..beam
            }))
            .await?;
        Ok(Outcome::Applied)
    }

    pub async fn apply_distribution_update(
        &mut self,
        update: &DistributionUpdate,
    ) -> Result<Outcome, LedgerError> {
        let store = self.store();
        let pool_id = pool_key(&update.pool);
        let Some(pool) = load::<Pool, _>(store, &pool_id).await? else {
            debug!(chain_id = update.chain_id, pool = %pool_id, "distribution update for untracked pool");
            return Ok(Outcome::Ignored);
        };

        let creator = load::<Account, _>(store, &pool.creator).await?;
        let distributor = normalize_address(&update.distributor);
        let creator_flow_rate = match creator {
            Some(account) if account.address == distributor => {
                update.new_distributor_to_pool_flow_rate
            }
            _ => pool.creator_flow_rate,
        };
        let active = update.new_total_distribution_flow_rate != 0;

        info!(
            chain_id = update.chain_id,
            pool = %pool_id,
            flow_rate = %update.new_total_distribution_flow_rate,
            active,
            "distribution updated"
        );

        store
            .set(Record::Pool(Pool {
                flow_rate: update.new_total_distribution_flow_rate,
                creator_flow_rate,
                adjustment_flow_rate: update.adjustment_flow_rate,
                adjustment_member: Some(normalize_address(&update.adjustment_flow_recipient)),
                has_distributed: pool.has_distributed || active,
                active,
                last_updated: update.origin.timestamp,
                ..pool
            }))
            .await?;
        Ok(Outcome::Applied)
    }
}

async fn load<E, S>(store: &S, key: &str) -> Result<Option<E>, LedgerError>
where
    E: beam_store::Entity,
    S: EntityStore + ?Sized,
{
    let keys = [key.to_string()];
    let mut found = beam_store::load_many::<E, S>(store, &keys).await?;
    Ok(found.remove(key))
}
