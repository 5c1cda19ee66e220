mod commands;
mod opts;
mod output;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::check::CheckArgs;
use commands::replay::ReplayArgs;
use opts::LedgerOpts;

#[derive(Parser, Debug)]
#[command(name = "beam", version, about = "Beam units ledger tools")]
struct Cli {
    #[command(flatten)]
    opts: LedgerOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply units batches to a records snapshot
    Replay(ReplayArgs),

    /// Audit pool aggregates against their beams
    Check(CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let opts = &cli.opts;
    util::setup_logging(opts.verbose);

    match cli.command {
        Command::Replay(args) => commands::replay::cmd_replay(opts, &args).await,
        Command::Check(args) => commands::check::cmd_check(opts, &args).await,
    }
}
