use anyhow::Context;
use clap::{Parser, Subcommand};
use healthbar::{logging, server, Config, HealthSummary, Store};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "healthbar", about = "Health bar: deduplicated warning/error counter")]
struct Cli {
    /// Write debug logs to /tmp/healthbar-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    /// Store file to use instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record one raw message.
    Ingest {
        #[arg(allow_hyphen_values = true)]
        message: String,
    },
    /// Print the health label once.
    Status,
    /// Print the JSON view served at /api/logs.
    List,
    /// Serve /api/logs and the browser viewer.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Directory of viewer assets; the built-in page is used when unset.
        #[arg(long, value_name = "DIR")]
        static_dir: Option<PathBuf>,
    },
    /// Terminal health gauge, refreshed on the configured poll interval.
    Tui,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_defaults();

    // Anything on stderr would tear through the TUI, so it only logs with --debug.
    if cli.debug || !matches!(cli.command, Command::Tui) {
        logging::init_logging(&config.logging.level, cli.debug)?;
    }

    let store = cli
        .store
        .map(Store::new)
        .unwrap_or_else(|| config.store.store());

    match cli.command {
        Command::Ingest { message } => {
            healthbar::ingest(&store, &message)
                .with_context(|| format!("failed to record message in {}", store.path().display()))?;
        }
        Command::Status => {
            let entries = store.load_or_empty();
            println!("{}", HealthSummary::from_entries(&entries, config.tray.max_health).label());
        }
        Command::List => {
            let entries = store.load_or_empty();
            println!("{}", serde_json::to_string_pretty(&healthbar::log_views(&entries))?);
        }
        Command::Serve { host, port, static_dir } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let state = server::AppState {
                store,
                max_health: config.tray.max_health,
                static_dir: static_dir.or(config.server.static_dir),
            };
            tokio::runtime::Runtime::new()?.block_on(server::run_server(state, &host, port))?;
        }
        Command::Tui => healthbar_tui::run(store, &config.tray)?,
    }
    Ok(())
}
