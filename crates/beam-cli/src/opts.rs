//! Global CLI options shared by every command.

use beam_ledger::{FailureScope, LedgerConfig, UnderflowPolicy};
use clap::Args;

/// Ledger and output options.
///
/// The ledger knobs can also be set through env vars; an explicit flag wins.
#[derive(Args, Debug, Clone)]
pub struct LedgerOpts {
    /// Decrease below zero: clamp, reject-pair or reject-batch (env: BEAM_UNDERFLOW)
    #[arg(long, global = true, env = "BEAM_UNDERFLOW")]
    pub underflow: Option<UnderflowPolicy>,

    /// Unknown pool: fail the batch or skip the pool (env: BEAM_FAILURE_SCOPE)
    #[arg(long, global = true, env = "BEAM_FAILURE_SCOPE")]
    pub failure_scope: Option<FailureScope>,

    /// Metadata sentinel override (env: BEAM_SENTINEL)
    #[arg(long, global = true, env = "BEAM_SENTINEL", hide = true)]
    pub sentinel: Option<u128>,

    /// JSON output envelope
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Log batch progress at info level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl LedgerOpts {
    pub fn ledger_config(&self) -> LedgerConfig {
        let mut cfg = LedgerConfig::default();
        if let Some(policy) = self.underflow {
            cfg.underflow = policy;
        }
        if let Some(scope) = self.failure_scope {
            cfg.failure_scope = scope;
        }
        if let Some(sentinel) = self.sentinel {
            cfg.sentinel = sentinel;
        }
        cfg
    }

    pub fn wants_json(&self) -> bool {
        self.json || self.pretty
    }
}
