//! `beam replay`: applies units batches to a records snapshot.
//!
//! A batch that fails is reported and skipped; later batches still run
//! against whatever the earlier ones committed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use beam_ledger::{BatchReport, LedgerEngine};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::opts::LedgerOpts;
use crate::output::{print_json, print_warnings};
use crate::util::{load_state, read_batches};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Records snapshot to start from (JSON array)
    #[arg(long)]
    pub state: PathBuf,

    /// Units batches to apply in order (JSON array)
    #[arg(long)]
    pub batches: PathBuf,

    /// Where to write the resulting snapshot (default: overwrite --state)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FailedBatch {
    index: usize,
    event: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    applied: Vec<BatchReport>,
    failed: Vec<FailedBatch>,
    out: String,
}

pub async fn cmd_replay(opts: &LedgerOpts, args: &ReplayArgs) -> Result<()> {
    let store = load_state(&args.state)?;
    let batches = read_batches(&args.batches)?;
    let mut engine = LedgerEngine::new(store, opts.ledger_config());
    info!(
        batches = batches.len(),
        state = %args.state.display(),
        config = ?engine.config(),
        "replaying units batches"
    );

    let mut applied = Vec::new();
    let mut failed = Vec::new();
    for (index, batch) in batches.iter().enumerate() {
        match engine.apply_batch(batch).await {
            Ok(report) => applied.push(report),
            Err(err) => failed.push(FailedBatch {
                index,
                event: batch.origin.event_key(batch.chain_id),
                error: err.to_string(),
            }),
        }
    }

    let out = args.out.as_ref().unwrap_or(&args.state);
    engine
        .store()
        .save_json(out)
        .await
        .with_context(|| format!("write state {}", out.display()))?;

    let warnings: Vec<String> = failed
        .iter()
        .map(|f| format!("batch {} ({}) skipped: {}", f.index, f.event, f.error))
        .collect();

    if opts.wants_json() {
        let summary = ReplaySummary {
            applied,
            failed,
            out: out.display().to_string(),
        };
        return print_json(opts, serde_json::to_value(&summary)?, &warnings);
    }

    for report in &applied {
        println!(
            "{} {:?}: {} instructions, {} beams, {} pools, {} users, {} accounts written",
            report.event,
            report.action,
            report.instructions,
            report.written.beams,
            report.written.pools,
            report.written.users,
            report.written.accounts,
        );
        for rejection in &report.rejected {
            println!("  rejected {}: {}", rejection.beam, rejection.reason);
        }
        for pool in &report.skipped_pools {
            println!("  skipped unknown pool {pool}");
        }
    }
    print_warnings(&warnings);
    println!(
        "replayed {}/{} batches -> {}",
        applied.len(),
        batches.len(),
        out.display()
    );
    Ok(())
}
