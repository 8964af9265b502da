//! Single-argument ingestion entry point, meant for shell hooks and log
//! monitors: `healthbar-log "<raw message>"`. Without a message it does
//! nothing. There are no flags: the first argument is recorded verbatim,
//! `--help` included, and any further arguments are ignored.

use anyhow::Context;
use clap::Parser;
use healthbar::{logging, Config};

#[derive(Parser)]
#[command(
    name = "healthbar-log",
    about = "Record one warning or error in the health log",
    disable_help_flag = true
)]
struct Cli {
    /// Raw diagnostic message, exactly as emitted.
    #[arg(allow_hyphen_values = true)]
    message: Option<String>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    rest: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_defaults();
    logging::init_logging(&config.logging.level, false)?;

    if !cli.rest.is_empty() {
        tracing::debug!(ignored = cli.rest.len(), "extra arguments ignored");
    }

    let Some(message) = cli.message else {
        tracing::debug!("no message given, nothing to record");
        return Ok(());
    };

    let store = config.store.store();
    healthbar::ingest(&store, &message)
        .with_context(|| format!("failed to record message in {}", store.path().display()))?;
    Ok(())
}
