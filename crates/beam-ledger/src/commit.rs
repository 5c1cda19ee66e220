//! Ordered write-back of consolidated rows.

use beam_store::{EntityStore, Record};
use serde::{Deserialize, Serialize};

use crate::{consolidate::Mutations, error::LedgerError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub users: usize,
    pub accounts: usize,
    pub beams: usize,
    pub pools: usize,
}

/// Writes users, accounts, beams and finally pools.
///
/// Users and first-seen accounts go through
/// [`EntityStore::insert_if_absent`], so a row another writer created in the
/// meantime is left alone and not counted.
///
/// Pools go last because their totals only hold once every beam is stored.
/// There is no cross-entity transaction: a store failure leaves the writes
/// already issued in place and returns the error.
pub async fn commit<S>(store: &S, mutations: Mutations) -> Result<CommitStats, LedgerError>
where
    S: EntityStore + ?Sized,
{
    if mutations.is_empty() {
        return Ok(CommitStats::default());
    }
    let Mutations {
        users,
        accounts,
        account_links,
        beams,
        pools,
        rejected: _,
    } = mutations;
    let mut stats = CommitStats::default();

    for user in users {
        if store.insert_if_absent(Record::User(user)).await? {
            stats.users += 1;
        }
    }
    for account in accounts {
        if store.insert_if_absent(Record::Account(account)).await? {
            stats.accounts += 1;
        }
    }
    for account in account_links {
        store.set(Record::Account(account)).await?;
        stats.accounts += 1;
    }
    for beam in beams {
        store.set(Record::Beam(beam)).await?;
        stats.beams += 1;
    }
    for pool in pools {
        store.set(Record::Pool(pool)).await?;
        stats.pools += 1;
    }

    Ok(stats)
}
