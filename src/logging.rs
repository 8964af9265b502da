//! `tracing` subscriber setup shared by the binaries.
//!
//! Events go to stderr so ingestion hooks keep stdout clean. `--debug`
//! redirects everything to [`DEBUG_LOG_PATH`] at `debug` level instead.

use tracing_subscriber::EnvFilter;

pub const DEBUG_LOG_PATH: &str = "/tmp/healthbar-debug.log";

/// Install the global subscriber. `level` is the fallback filter when
/// `RUST_LOG` is unset. Must be called at most once.
pub fn init_logging(level: &str, debug: bool) -> anyhow::Result<()> {
    if debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(DEBUG_LOG_PATH)?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("healthbar debug log started, tail -f {DEBUG_LOG_PATH}");
        return Ok(());
    }

    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
    Ok(())
}
