//! GridLedger - interactive energy-trading ledger
//!
//! Loads the transaction store, runs the menu on stdin/stdout, and writes the
//! store back on exit.

mod menu;

use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridledger_common::LedgerConfig;
use gridledger_ledger::{store, Ledger};

use crate::menu::Menu;

/// GridLedger - energy-trading ledger
#[derive(Parser, Debug, Clone)]
#[command(name = "gridledger")]
#[command(about = "Record and report peer-to-peer energy trades")]
struct Args {
    /// JSON configuration file; defaults apply when omitted
    #[arg(long, env = "GRIDLEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Transaction store file, overrides the configured path
    #[arg(long, env = "GRIDLEDGER_STORE")]
    store: Option<PathBuf>,

    /// Log level for GridLedger targets (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::from_json_file(path)?,
            None => LedgerConfig::default(),
        };
        if let Some(store) = &self.store {
            config.store_path = store.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they do not interleave with menu tables.
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "gridledger={0},gridledger_ledger={0},gridledger_index={0},warn",
                    log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        store = %config.store_path.display(),
        index_degree = config.index_degree,
        "starting GridLedger"
    );

    let mut ledger = Ledger::new(&config)?;
    store::import(&config.store_path, &mut ledger)?;

    let stdin = io::stdin();
    let mut menu = Menu::new(stdin.lock(), io::stdout().lock(), ledger);
    menu.run()?;

    let ledger = menu.into_ledger();
    let written = store::export(&config.store_path, ledger.registry())?;
    println!(
        "Saved {} transactions to {}",
        written,
        config.store_path.display()
    );
    Ok(())
}
