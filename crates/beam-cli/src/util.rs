use std::{fs, path::Path};

use anyhow::{Context, Result};
use beam_ledger::UnitsBatch;
use beam_store::MemStore;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays parseable in `--json` mode.
pub fn setup_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn load_state(path: &Path) -> Result<MemStore> {
    MemStore::load_json(path).with_context(|| format!("load state {}", path.display()))
}

/// Reads a JSON array of batches, in the order they are to be applied.
pub fn read_batches(path: &Path) -> Result<Vec<UnitsBatch>> {
    let bytes = fs::read(path).with_context(|| format!("read batches {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse batches {}", path.display()))
}
