use std::io;

use clap::Parser;
use tracing::debug;

use rate_cli::{cli::Cli, commands, logging};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.log_file.as_deref())?;
    debug!(command = ?cli.command, "starting");

    let stdout = io::stdout();
    commands::run(&cli, &mut stdout.lock())
}
