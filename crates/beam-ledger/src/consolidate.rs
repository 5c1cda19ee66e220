//! Nets every instruction of a batch per (pool, recipient) pair and derives
//! the resulting beam, pool and identity rows.
//!
//! Runs entirely over the maps produced by [`crate::resolve`]; nothing here
//! touches the store. Beam-count transitions are judged on the consolidated
//! `(prior, final)` pair of each beam, so a recipient that moves 0 -> 1 -> 4
//! inside one batch is counted once.

use std::collections::{HashMap, HashSet};

use beam_types::{
    Account, Action, Beam, Pool, User,
    keys::{account_key, user_key},
};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    config::{LedgerConfig, UnderflowPolicy},
    error::LedgerError,
    normalize::Instruction,
    resolve::Resolved,
};

/// Rows to write for one batch. Each list holds at most one row per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mutations {
    pub users: Vec<User>,
    /// Accounts seen for the first time; only written when still absent.
    pub accounts: Vec<Account>,
    /// Stored accounts that gain a user link.
    pub account_links: Vec<Account>,
    pub beams: Vec<Beam>,
    pub pools: Vec<Pool>,
    pub rejected: Vec<Rejection>,
}

impl Mutations {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.accounts.is_empty()
            && self.account_links.is_empty()
            && self.beams.is_empty()
            && self.pools.is_empty()
    }
}

/// A (pool, recipient) pair whose adjustments were dropped from the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub beam: String,
    pub pool: String,
    pub recipient: String,
    /// Batch position of the instruction that tripped the check.
    pub instruction: usize,
    pub reason: String,
}

#[derive(Debug)]
struct BeamAcc<'a> {
    existing: Option<&'a Beam>,
    chain_id: u64,
    pool: String,
    recipient: String,
    prior: u128,
    units: u128,
    sender_fid: u64,
    receiver_fid: u64,
}

impl BeamAcc<'_> {
    /// `+1` when the beam becomes active, `-1` when it drains, else `0`.
    fn count_delta(&self) -> i8 {
        match (self.prior == 0, self.units == 0) {
            (true, false) => 1,
            (false, true) => -1,
            _ => 0,
        }
    }

    fn into_beam(self, key: String, timestamp: u64) -> Beam {
        let sender = user_key(self.sender_fid);
        let receiver = user_key(self.receiver_fid);
        match self.existing {
            Some(beam) => Beam {
                sender,
                receiver,
                units: self.units,
                last_updated: timestamp,
                ..beam.clone()
            },
            None => Beam {
                id: key,
                chain_id: self.chain_id,
                sender,
                receiver,
                pool: self.pool,
                recipient: account_key(self.chain_id, &self.recipient),
                units: self.units,
                is_receiver_connected: false,
                last_updated: timestamp,
            },
        }
    }
}

struct PoolAcc {
    pool: Pool,
    members: HashSet<String>,
}

enum Step {
    Applied(u128),
    Reject(LedgerError),
}

fn step(
    prev: u128,
    ix: &Instruction,
    beam: &str,
    policy: UnderflowPolicy,
) -> Result<Step, LedgerError> {
    match ix.action {
        Action::Update => Ok(Step::Applied(ix.amount)),
        Action::Increase => match prev.checked_add(ix.amount) {
            Some(next) => Ok(Step::Applied(next)),
            None => {
                let err = LedgerError::UnitsOverflow {
                    beam: beam.to_string(),
                    available: prev,
                    requested: ix.amount,
                };
                escalate(err, policy)
            }
        },
        Action::Decrease => match prev.checked_sub(ix.amount) {
            Some(next) => Ok(Step::Applied(next)),
            None if policy == UnderflowPolicy::Clamp => {
                warn!(
                    chain_id = ix.chain_id,
                    pool = %ix.pool,
                    recipient = %ix.recipient,
                    available = %prev,
                    requested = %ix.amount,
                    "decrease exceeds units; clamping to zero"
                );
                Ok(Step::Applied(0))
            }
            None => {
                let err = LedgerError::InsufficientUnits {
                    beam: beam.to_string(),
                    available: prev,
                    requested: ix.amount,
                };
                escalate(err, policy)
            }
        },
    }
}

fn escalate(err: LedgerError, policy: UnderflowPolicy) -> Result<Step, LedgerError> {
    match policy {
        UnderflowPolicy::RejectBatch => Err(err),
        UnderflowPolicy::Clamp | UnderflowPolicy::RejectPair => Ok(Step::Reject(err)),
    }
}

/// Folds `instructions` into the final rows for this batch.
///
/// Every instruction must name a pool present in `resolved.pools` or listed
/// in `resolved.skipped_pools`; anything else is `UnknownPool`, so no beam is
/// ever produced without its pool.
pub fn consolidate(
    instructions: &[Instruction],
    resolved: &Resolved,
    config: &LedgerConfig,
    timestamp: u64,
) -> Result<Mutations, LedgerError> {
    let skipped: HashSet<&str> = resolved.skipped_pools.iter().map(String::as_str).collect();
    let mut beams: IndexMap<String, BeamAcc<'_>> = IndexMap::new();
    let mut rejected_keys: HashSet<String> = HashSet::new();
    let mut rejected = Vec::new();

    for ix in instructions {
        let pool_key = ix.pool_key();
        if !resolved.pools.contains_key(&pool_key) {
            if skipped.contains(pool_key.as_str()) {
                continue;
            }
            return Err(LedgerError::UnknownPool {
                pool: pool_key,
                chain_id: ix.chain_id,
            });
        }

        let key = ix.beam_key();
        if rejected_keys.contains(&key) {
            continue;
        }

        let acc = beams.entry(key.clone()).or_insert_with(|| {
            let existing = resolved.beams.get(&key);
            let prior = existing.map_or(0, |beam| beam.units);
            BeamAcc {
                existing,
                chain_id: ix.chain_id,
                pool: pool_key.clone(),
                recipient: ix.recipient.clone(),
                prior,
                units: prior,
                sender_fid: ix.sender_fid,
                receiver_fid: ix.receiver_fid,
            }
        });

        match step(acc.units, ix, &key, config.underflow)? {
            Step::Applied(units) => {
                acc.units = units;
                acc.sender_fid = ix.sender_fid;
                acc.receiver_fid = ix.receiver_fid;
            }
            Step::Reject(err) => {
                error!(
                    chain_id = ix.chain_id,
                    pool = %ix.pool,
                    recipient = %ix.recipient,
                    instruction = ix.index,
                    error = %err,
                    "dropping adjustments for pair"
                );
                beams.shift_remove(&key);
                rejected.push(Rejection {
                    beam: key.clone(),
                    pool: pool_key,
                    recipient: ix.recipient.clone(),
                    instruction: ix.index,
                    reason: err.to_string(),
                });
                rejected_keys.insert(key);
            }
        }
    }

    let (users, accounts, account_links) = identities(instructions, &beams, resolved);
    let mut pools: IndexMap<String, PoolAcc> = IndexMap::new();
    let mut beam_rows = Vec::with_capacity(beams.len());

    for (key, acc) in beams {
        let Some(stored) = resolved.pools.get(&acc.pool) else {
            continue;
        };
        let entry = pools.entry(acc.pool.clone()).or_insert_with(|| PoolAcc {
            members: stored.members.iter().cloned().collect(),
            pool: stored.clone(),
        });
        apply_to_pool(entry, &acc, timestamp);
        beam_rows.push(acc.into_beam(key, timestamp));
    }

    Ok(Mutations {
        users,
        accounts,
        account_links,
        beams: beam_rows,
        pools: pools.into_values().map(|acc| acc.pool).collect(),
        rejected,
    })
}

fn apply_to_pool(entry: &mut PoolAcc, acc: &BeamAcc<'_>, timestamp: u64) {
    let pool = &mut entry.pool;
    if acc.units >= acc.prior {
        let gain = acc.units - acc.prior;
        pool.total_units = pool.total_units.checked_add(gain).unwrap_or_else(|| {
            error!(pool = %pool.id, "pool total units overflow; saturating");
            u128::MAX
        });
    } else {
        let loss = acc.prior - acc.units;
        pool.total_units = pool.total_units.checked_sub(loss).unwrap_or_else(|| {
            error!(
                chain_id = pool.chain_id,
                pool = %pool.id,
                total_units = %pool.total_units,
                loss = %loss,
                "pool total below released units; flooring at zero"
            );
            0
        });
    }

    match acc.count_delta() {
        1 => pool.beam_count = pool.beam_count.saturating_add(1),
        -1 => {
            if pool.beam_count == 0 {
                error!(pool = %pool.id, "beam count already zero while a beam drained");
            }
            pool.beam_count = pool.beam_count.saturating_sub(1);
        }
        _ => {}
    }

    if entry.members.insert(acc.recipient.clone()) {
        pool.members.push(acc.recipient.clone());
    }
    pool.last_updated = timestamp;
}

/// Users for unseen fids, accounts for unseen recipients and links for
/// unlinked ones, limited to pairs that survived consolidation.
fn identities(
    instructions: &[Instruction],
    beams: &IndexMap<String, BeamAcc<'_>>,
    resolved: &Resolved,
) -> (Vec<User>, Vec<Account>, Vec<Account>) {
    let mut fids: IndexSet<u64> = IndexSet::new();
    for ix in instructions {
        if beams.contains_key(&ix.beam_key()) {
            fids.insert(ix.sender_fid);
            fids.insert(ix.receiver_fid);
        }
    }
    let users = fids
        .into_iter()
        .filter(|fid| !resolved.users.contains_key(&user_key(*fid)))
        .map(User::new)
        .collect();

    let mut accounts = Vec::new();
    let mut links = Vec::new();
    let mut seen: HashMap<String, u64> = HashMap::new();
    for acc in beams.values() {
        let key = account_key(acc.chain_id, &acc.recipient);
        let receiver = user_key(acc.receiver_fid);
        if let Some(previous) = seen.insert(key.clone(), acc.receiver_fid) {
            if previous != acc.receiver_fid {
                warn!(account = %key, previous, current = acc.receiver_fid, "recipient routed to several receivers in one batch");
            }
            continue;
        }
        match resolved.accounts.get(&key) {
            None => accounts.push(Account::new(acc.chain_id, &acc.recipient, Some(receiver))),
            Some(account) if account.user.is_none() => links.push(Account {
                user: Some(receiver),
                ..account.clone()
            }),
            Some(account) if account.user.as_deref() != Some(receiver.as_str()) => {
                warn!(
                    account = %key,
                    linked = ?account.user,
                    receiver = %receiver,
                    "recipient already linked to another user; keeping existing link"
                );
            }
            Some(_) => {}
        }
    }

    (users, accounts, links)
}
