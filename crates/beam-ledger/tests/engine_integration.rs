use beam_ledger::{FailureScope, LedgerConfig, LedgerError, UnderflowPolicy};
use beam_store::{EntityKind, EntityStore, Record};

mod helpers;
use helpers::{
    CHAIN, OTHER_POOL, POOL, assert_consistent, batch, batch_in, beam, engine, engine_with, pool,
};

const UPDATE: u8 = 0;
const INCREASE: u8 = 1;
const DECREASE: u8 = 2;

/// Two increases for one pair land as one beam write and one pool delta.
#[tokio::test]
async fn repeated_increases_consolidate() {
    let mut engine = engine();
    engine
        .apply_batch(&batch(INCREASE, 1, &[("0xAlice", 5)]))
        .await
        .unwrap();
    engine.store().clear_write_log().await;

    let report = engine
        .apply_batch(&batch(INCREASE, 2, &[("0xAlice", 3), ("0xalice", 2)]))
        .await
        .unwrap();

    assert_eq!(report.written.beams, 1);
    assert_eq!(report.written.pools, 1);
    let store = engine.store();
    assert_eq!(beam(store, POOL, "0xalice").await.unwrap().units, 10);
    let pool = pool(store, POOL).await;
    assert_eq!(pool.total_units, 10);
    assert_eq!(pool.beam_count, 1);
    assert_eq!(pool.members, vec!["0xalice".to_string()]);

    let beam_writes = store
        .write_log()
        .await
        .into_iter()
        .filter(|(kind, _)| *kind == EntityKind::Beam)
        .count();
    assert_eq!(beam_writes, 1);
    assert_consistent(store).await;
}

/// 0 -> 4 units through +1 and +3 in one batch counts one active beam.
#[tokio::test]
async fn activation_through_two_steps_counts_once() {
    let mut engine = engine();
    engine
        .apply_batch(&batch(INCREASE, 1, &[("0xbob", 1), ("0xbob", 3)]))
        .await
        .unwrap();
    let pool = pool(engine.store(), POOL).await;
    assert_eq!(pool.beam_count, 1);
    assert_eq!(pool.total_units, 4);
    assert_consistent(engine.store()).await;
}

#[tokio::test]
async fn replaying_update_batch_changes_nothing() {
    let mut engine = engine();
    let update = batch(UPDATE, 3, &[("0xalice", 6), ("0xbob", 2)]);
    engine.apply_batch(&update).await.unwrap();
    let before = engine.store().snapshot().await;

    engine.apply_batch(&update).await.unwrap();
    let after = engine.store().snapshot().await;
    assert_eq!(before, after);
    assert_consistent(engine.store()).await;
}

#[tokio::test]
async fn unknown_pool_rejects_batch_without_writes() {
    let mut engine = engine();
    let bad = batch_in(
        INCREASE,
        1,
        &[(POOL, "0xalice", 1), ("0xNowhere", "0xbob", 2)],
    );
    let err = engine.apply_batch(&bad).await.unwrap_err();
    assert!(matches!(err, LedgerError::UnknownPool { ref pool, chain_id: CHAIN } if pool == "0xnowhere"));
    assert!(engine.store().write_log().await.is_empty());
}

#[tokio::test]
async fn pool_scope_applies_known_pools() {
    let mut engine = engine_with(LedgerConfig {
        failure_scope: FailureScope::Pool,
        ..LedgerConfig::default()
    });
    let mixed = batch_in(
        INCREASE,
        1,
        &[(POOL, "0xalice", 1), ("0xNowhere", "0xbob", 2)],
    );
    let report = engine.apply_batch(&mixed).await.unwrap();
    assert_eq!(report.skipped_pools, vec!["0xnowhere".to_string()]);
    assert_eq!(report.written.beams, 1);
    assert!(beam(engine.store(), "0xnowhere", "0xbob").await.is_none());
    assert_consistent(engine.store()).await;
}

#[tokio::test]
async fn clamped_decrease_drains_beam() {
    let mut engine = engine();
    engine
        .apply_batch(&batch(INCREASE, 1, &[("0xalice", 2), ("0xbob", 4)]))
        .await
        .unwrap();
    engine
        .apply_batch(&batch(DECREASE, 2, &[("0xalice", 5)]))
        .await
        .unwrap();

    let store = engine.store();
    let alice = beam(store, POOL, "0xalice").await.unwrap();
    assert_eq!(alice.units, 0);
    let pool = pool(store, POOL).await;
    assert_eq!(pool.beam_count, 1);
    assert_eq!(pool.total_units, 4);
    assert_eq!(pool.members.len(), 2);
    assert_consistent(store).await;
}

#[tokio::test]
async fn strict_pair_policy_keeps_other_pairs() {
    let mut engine = engine_with(LedgerConfig {
        underflow: UnderflowPolicy::RejectPair,
        ..LedgerConfig::default()
    });
    engine
        .apply_batch(&batch(INCREASE, 1, &[("0xalice", 2), ("0xbob", 4)]))
        .await
        .unwrap();
    let report = engine
        .apply_batch(&batch(DECREASE, 2, &[("0xalice", 5), ("0xbob", 1)]))
        .await
        .unwrap();

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].recipient, "0xalice");
    let store = engine.store();
    assert_eq!(beam(store, POOL, "0xalice").await.unwrap().units, 2);
    assert_eq!(beam(store, POOL, "0xbob").await.unwrap().units, 3);
    assert_eq!(pool(store, POOL).await.total_units, 5);
    assert_consistent(store).await;
}

#[tokio::test]
async fn strict_batch_policy_writes_nothing() {
    let mut engine = engine_with(LedgerConfig {
        underflow: UnderflowPolicy::RejectBatch,
        ..LedgerConfig::default()
    });
    engine
        .apply_batch(&batch(INCREASE, 1, &[("0xalice", 2)]))
        .await
        .unwrap();
    engine.store().clear_write_log().await;

    let err = engine
        .apply_batch(&batch(DECREASE, 2, &[("0xbob", 0), ("0xalice", 3)]))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientUnits { .. }));
    assert!(engine.store().write_log().await.is_empty());
}

#[tokio::test]
async fn first_increase_creates_beam_and_identities() {
    let mut engine = engine();
    let mut first = batch(INCREASE, 1, &[("0xCarol", 9)]);
    first.routes[0].sender_fid = 11;
    first.routes[0].receiver_fid = 12;
    let report = engine.apply_batch(&first).await.unwrap();
    assert_eq!(report.written.users, 2);
    assert_eq!(report.written.accounts, 1);

    let store = engine.store();
    let carol = beam(store, POOL, "0xcarol").await.unwrap();
    assert_eq!(carol.units, 9);
    assert_eq!(carol.sender, "11");
    assert_eq!(carol.receiver, "12");
    assert_eq!(carol.last_updated, 1_001);

    for fid in ["11", "12"] {
        assert!(matches!(
            store.get(EntityKind::User, fid).await.unwrap(),
            Some(Record::User(_))
        ));
    }
    match store
        .get(EntityKind::Account, &format!("{CHAIN}_0xcarol"))
        .await
        .unwrap()
    {
        Some(Record::Account(account)) => assert_eq!(account.user.as_deref(), Some("12")),
        other => panic!("expected account, got {other:?}"),
    }
}

#[tokio::test]
async fn batches_across_pools_keep_each_pool_consistent() {
    let mut engine = engine();
    engine
        .apply_batch(&batch_in(
            INCREASE,
            1,
            &[
                (POOL, "0xalice", 3),
                (OTHER_POOL, "0xalice", 7),
                (POOL, "0xbob", 1),
            ],
        ))
        .await
        .unwrap();
    engine
        .apply_batch(&batch_in(
            UPDATE,
            2,
            &[(OTHER_POOL, "0xalice", 0), (POOL, "0xbob", 10)],
        ))
        .await
        .unwrap();

    let store = engine.store();
    let a = pool(store, POOL).await;
    assert_eq!((a.total_units, a.beam_count), (13, 2));
    let b = pool(store, OTHER_POOL).await;
    assert_eq!((b.total_units, b.beam_count), (0, 0));
    assert_eq!(b.members, vec!["0xalice".to_string()]);
    assert!(beam(store, OTHER_POOL, "0xalice").await.is_some());
    assert_consistent(store).await;
}

#[tokio::test]
async fn malformed_batches_are_rejected_without_writes() {
    let mut engine = engine();

    let mut bad_action = batch(INCREASE, 1, &[("0xalice", 1)]);
    bad_action.action = 9;
    assert!(matches!(
        engine.apply_batch(&bad_action).await,
        Err(LedgerError::InvalidAction { code: 9 })
    ));

    let mut bad_meta = batch(INCREASE, 1, &[("0xalice", 1)]);
    bad_meta.metadata.0 = 1;
    assert!(matches!(
        engine.apply_batch(&bad_meta).await,
        Err(LedgerError::InvalidMetadata { .. })
    ));

    let mut short = batch(INCREASE, 1, &[("0xalice", 1)]);
    short.routes.clear();
    assert!(matches!(
        engine.apply_batch(&short).await,
        Err(LedgerError::LengthMismatch { .. })
    ));

    assert!(engine.store().write_log().await.is_empty());
}

#[tokio::test]
async fn engine_runs_over_shared_dyn_store() {
    use beam_ledger::LedgerEngine;
    use beam_store::DynStore;
    use std::sync::Arc;

    let mem = helpers::seeded_store();
    let shared: DynStore = Arc::new(mem.clone());
    let mut engine = LedgerEngine::new(shared, LedgerConfig::default());
    engine
        .apply_batch(&batch(INCREASE, 1, &[("0xalice", 4)]))
        .await
        .unwrap();
    assert_eq!(pool(&mem, POOL).await.total_units, 4);
    assert!(engine.store().get(EntityKind::Pool, "0xpoola").await.unwrap().is_some());
}
