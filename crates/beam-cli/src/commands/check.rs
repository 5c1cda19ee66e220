//! `beam check`: audits a records snapshot.

use std::path::PathBuf;

use anyhow::{Result, bail};
use beam_ledger::audit;
use beam_store::Record;
use clap::Args;
use serde_json::json;

use crate::opts::LedgerOpts;
use crate::output::print_json;
use crate::util::load_state;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Records snapshot to audit (JSON array)
    #[arg(long)]
    pub state: PathBuf,
}

pub async fn cmd_check(opts: &LedgerOpts, args: &CheckArgs) -> Result<()> {
    let records = load_state(&args.state)?.snapshot().await;
    let violations = audit(&records);
    let pools = records
        .iter()
        .filter(|r| matches!(r, Record::Pool(_)))
        .count();
    let beams = records
        .iter()
        .filter(|r| matches!(r, Record::Beam(_)))
        .count();

    if opts.wants_json() {
        let data = json!({
            "pools": pools,
            "beams": beams,
            "violations": serde_json::to_value(&violations)?,
        });
        print_json(opts, data, &[])?;
    } else if violations.is_empty() {
        println!("ok: {pools} pools, {beams} beams consistent");
    } else {
        for violation in &violations {
            println!("{violation}");
        }
    }

    if !violations.is_empty() {
        bail!(
            "{} invariant violation(s) in {}",
            violations.len(),
            args.state.display()
        );
    }
    Ok(())
}
