//! Batched reads of every row a batch can touch.

use std::collections::{BTreeSet, HashMap};

use beam_store::{EntityStore, load_many};
use beam_types::{
    Account, Beam, Pool, User,
    keys::{account_key, user_key},
};
use tracing::error;

use crate::{
    config::{FailureScope, LedgerConfig},
    error::LedgerError,
    normalize::Instruction,
};

/// Rows that already exist for the keys a batch references.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub pools: HashMap<String, Pool>,
    pub beams: HashMap<String, Beam>,
    pub users: HashMap<String, User>,
    pub accounts: HashMap<String, Account>,
    /// Unknown pools whose instructions are dropped (pool failure scope only).
    pub skipped_pools: Vec<String>,
}

#[derive(Debug, Default)]
struct KeySets {
    pools: BTreeSet<String>,
    beams: BTreeSet<String>,
    users: BTreeSet<String>,
    accounts: BTreeSet<String>,
}

impl KeySets {
    fn collect(instructions: &[Instruction]) -> Self {
        let mut keys = KeySets::default();
        for ix in instructions {
            keys.pools.insert(ix.pool_key());
            keys.beams.insert(ix.beam_key());
            keys.users.insert(user_key(ix.sender_fid));
            keys.users.insert(user_key(ix.receiver_fid));
            keys.accounts.insert(account_key(ix.chain_id, &ix.recipient));
        }
        keys
    }
}

/// Loads pools, beams, users and accounts in one concurrent round.
///
/// Missing beams, users and accounts are first sightings and not errors. A
/// missing pool fails the batch unless `config.failure_scope` is
/// [`FailureScope::Pool`], in which case it is listed in `skipped_pools`.
pub async fn resolve<S>(
    store: &S,
    instructions: &[Instruction],
    config: &LedgerConfig,
) -> Result<Resolved, LedgerError>
where
    S: EntityStore + ?Sized,
{
    let Some(chain_id) = instructions.first().map(|ix| ix.chain_id) else {
        return Ok(Resolved::default());
    };

    let keys = KeySets::collect(instructions);
    let pool_keys: Vec<String> = keys.pools.into_iter().collect();
    let beam_keys: Vec<String> = keys.beams.into_iter().collect();
    let user_keys: Vec<String> = keys.users.into_iter().collect();
    let account_keys: Vec<String> = keys.accounts.into_iter().collect();

    let (pools, beams, users, accounts) = futures::try_join!(
        load_many::<Pool, S>(store, &pool_keys),
        load_many::<Beam, S>(store, &beam_keys),
        load_many::<User, S>(store, &user_keys),
        load_many::<Account, S>(store, &account_keys),
    )?;

    let mut skipped_pools = Vec::new();
    for pool in pool_keys.iter().filter(|key| !pools.contains_key(*key)) {
        match config.failure_scope {
            FailureScope::Batch => {
                error!(chain_id, pool = %pool, "batch references unknown pool");
                return Err(LedgerError::UnknownPool {
                    pool: pool.clone(),
                    chain_id,
                });
            }
            FailureScope::Pool => {
                error!(chain_id, pool = %pool, "skipping instructions for unknown pool");
                skipped_pools.push(pool.clone());
            }
        }
    }

    Ok(Resolved {
        pools,
        beams,
        users,
        accounts,
        skipped_pools,
    })
}
