use std::path::PathBuf;

use anyhow::{Context, Result};
use castellan::config::{Settings, DEFAULT_CONFIG_PATH};
use castellan::logging::init_logging;
use castellan::{ChromiumLauncher, RunLoop};
use clap::Parser;
use tracing::{info, warn};

/// Castellan - scripted maintenance for Lords & Knights accounts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Run a single pass over all accounts and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config problems are reported before any logging is set up.
    let settings = match Settings::load(&cli.config) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {:#}", anyhow::Error::new(err));
            std::process::exit(1);
        }
    };

    let _guard = init_logging(&cli.log_level, cli.log_dir.as_deref())
        .context("failed to initialise logging")?;

    info!(
        "Starting Castellan v{} with {} account(s)",
        env!("CARGO_PKG_VERSION"),
        settings.accounts.len()
    );

    let launcher = ChromiumLauncher::from_settings(&settings);
    let run_loop = RunLoop::new(settings, launcher);

    let cancel = run_loop.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current account");
            cancel.cancel();
        }
    });

    run_loop.run(cli.once).await;
    Ok(())
}
