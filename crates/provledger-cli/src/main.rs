//! Provledger CLI - Command-line interface for the provenance ledger.

use clap::Parser;
use provledger_cli::commands;
use provledger_cli::{Cli, Command, Formatter, ProvledgerConfig};
use provledger_contract::ProvenanceContract;
use provledger_store::SqliteLedger;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let formatter = Formatter::new(cli.format.into(), !cli.no_color);

    let config = match ProvledgerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", formatter.error(&e.to_string()));
            std::process::exit(1);
        }
    };

    // Log to stderr; RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli, config, &formatter) {
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: ProvledgerConfig, formatter: &Formatter) -> provledger_cli::Result<()> {
    match cli.command {
        Command::Inspect(args) => commands::execute_inspect(args, formatter),
        Command::Init => {
            let contract = open_contract(cli.ledger, &config)?;
            let config_path = match cli.config {
                Some(path) => path,
                None => ProvledgerConfig::default_path()?,
            };
            commands::execute_init(&contract, &config, &config_path, formatter)
        }
        Command::Set(args) => {
            let mut contract = open_contract(cli.ledger, &config)?;
            commands::execute_set(args, &mut contract, formatter)
        }
        Command::Invoke(args) => {
            let mut contract = open_contract(cli.ledger, &config)?;
            commands::execute_invoke(args, &mut contract)
        }
        Command::Get(args) => {
            let mut contract = open_contract(cli.ledger, &config)?;
            commands::execute_get(args, &mut contract, formatter)
        }
        Command::Delete(args) => {
            let mut contract = open_contract(cli.ledger, &config)?;
            commands::execute_delete(args, &mut contract, formatter)
        }
    }
}

/// Open the SQLite ledger, creating its directory on first use
fn open_contract(
    ledger: Option<PathBuf>,
    config: &ProvledgerConfig,
) -> provledger_cli::Result<ProvenanceContract<SqliteLedger>> {
    let path = ledger.unwrap_or_else(|| config.ledger_path.clone());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    tracing::debug!(path = %path.display(), "opening ledger");
    let ledger = SqliteLedger::new(&path)?;
    Ok(ProvenanceContract::new(ledger, config.contract.clone()))
}
