#![allow(dead_code)]

use std::{fs, path::PathBuf, process::Command};

use beam_ledger::{BatchOrigin, Member, Route, UnitsBatch};
use beam_store::Record;
use beam_types::{Pool, schemas::ONCHAIN_EVENT};
use tempfile::TempDir;

pub const CHAIN: u64 = 8453;
pub const POOL: &str = "0xpoola";

pub fn beam_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("beam"));
    for key in ["BEAM_UNDERFLOW", "BEAM_FAILURE_SCOPE", "BEAM_SENTINEL", "RUST_LOG"] {
        cmd.env_remove(key);
    }
    cmd
}

pub fn batch(action: u8, block: u64, members: &[(&str, &str, u128)]) -> UnitsBatch {
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

/// Temp dir holding `state.json` with one empty pool and `batches.json`.
pub struct Fixture {
    pub dir: TempDir,
    pub state: PathBuf,
    pub batches: PathBuf,
}

impl Fixture {
    pub fn new(batches: &[UnitsBatch]) -> Self {
        let dir = TempDir::new().expect("tmpdir");
        let state = dir.path().join("state.json");
        let records = vec![Record::Pool(Pool::new(CHAIN, POOL, "0xcreator", "0xtoken", 1))];
        fs::write(&state, serde_json::to_vec(&records).unwrap()).unwrap();
        let path = dir.path().join("batches.json");
        fs::write(&path, serde_json::to_vec(batches).unwrap()).unwrap();
        Self {
            dir,
            state,
            batches: path,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn records(&self, name: &str) -> Vec<Record> {
        let bytes = fs::read(self.path(name)).expect("read state");
        serde_json::from_slice(&bytes).expect("parse state")
    }
}

pub fn find_pool(records: &[Record]) -> Pool {
    records
        .iter()
        .find_map(|r| match r {
            Record::Pool(pool) => Some(pool.clone()),
            _ => None,
        })
        .expect("pool record")
}
