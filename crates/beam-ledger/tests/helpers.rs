#![allow(dead_code)]

use beam_ledger::{BatchOrigin, LedgerConfig, LedgerEngine, Member, Route, UnitsBatch};
use beam_store::{EntityKind, EntityStore, MemStore, Record};
use beam_types::{Beam, Pool, schemas::ONCHAIN_EVENT};

pub const CHAIN: u64 = 8453;
pub const POOL: &str = "0xPoolA";
pub const OTHER_POOL: &str = "0xPoolB";

/// Store with two empty pools created by the same account.
pub fn seeded_store() -> MemStore {
    MemStore::from_records([
        Record::Pool(Pool::new(CHAIN, POOL, "0xCreator", "0xToken", 1)),
        Record::Pool(Pool::new(CHAIN, OTHER_POOL, "0xCreator", "0xToken", 1)),
    ])
}

pub fn engine_with(config: LedgerConfig) -> LedgerEngine<MemStore> {
    LedgerEngine::new(seeded_store(), config)
}

pub fn engine() -> LedgerEngine<MemStore> {
    engine_with(LedgerConfig::default())
}

/// Single-pool batch; every member is routed from fid 1 to fid 2.
pub fn batch(action: u8, block: u64, members: &[(&str, u128)]) -> UnitsBatch {
    batch_in(action, block, &members.iter().map(|(a, u)| (POOL, *a, *u)).collect::<Vec<_>>())
}

pub fn batch_in(action: u8, block: u64, members: &[(&str, &str, u128)]) -> UnitsBatch {
    UnitsBatch {
        chain_id: CHAIN,
        origin: BatchOrigin {
            tx_hash: format!("0xtx{block}"),
            block_number: block,
            log_index: 0,
            timestamp: 1_000 + block,
        },
        action,
        metadata: (ONCHAIN_EVENT, r#"{"poolType":1}"#.to_string()),
        members: members
            .iter()
            .map(|(_, address, units)| Member {
                address: address.to_string(),
                units: *units,
            })
            .collect(),
        pools: members.iter().map(|(pool, _, _)| pool.to_string()).collect(),
        routes: members
            .iter()
            .map(|_| Route {
                sender_fid: 1,
                receiver_fid: 2,
            })
            .collect(),
    }
}

pub async fn beam(store: &MemStore, pool: &str, recipient: &str) -> Option<Beam> {
    let key = beam_types::keys::beam_key(pool, recipient);
    match store.get(EntityKind::Beam, &key).await.unwrap() {
        Some(Record::Beam(beam)) => Some(beam),
        _ => None,
    }
}

pub async fn pool(store: &MemStore, pool: &str) -> Pool {
    let key = beam_types::keys::pool_key(pool);
    match store.get(EntityKind::Pool, &key).await.unwrap() {
        Some(Record::Pool(pool)) => pool,
        other => panic!("expected pool {key}, got {other:?}"),
    }
}

pub async fn assert_consistent(store: &MemStore) {
    let records = store.snapshot().await;
    let violations = beam_ledger::audit(&records);
    assert!(violations.is_empty(), "invariant violations: {violations:?}");
}
