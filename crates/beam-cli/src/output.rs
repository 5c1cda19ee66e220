//! Output helpers for human and JSON modes.
//!
//! JSON mode wraps responses in `{ data, warnings? }`; human mode leaves the
//! printing to the command and sends warnings to stderr.

use anyhow::Result;
use serde_json::{Value, json};

use crate::opts::LedgerOpts;

pub fn print_json(opts: &LedgerOpts, data: Value, warnings: &[String]) -> Result<()> {
    let mut root = json!({ "data": data });
    if !warnings.is_empty() {
        root["warnings"] = warnings.iter().cloned().map(Value::String).collect();
    }
    if opts.pretty {
        println!("{}", serde_json::to_string_pretty(&root)?);
    } else {
        println!("{}", serde_json::to_string(&root)?);
    }
    Ok(())
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}
