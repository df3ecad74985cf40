//! Init command implementation.

use super::accepted;
use crate::config::ProvledgerConfig;
use crate::error::Result;
use crate::output::Formatter;
use provledger_contract::ProvenanceContract;
use provledger_domain::traits::Ledger;
use std::fmt::Display;
use std::path::Path;

/// Execute the init command.
///
/// Writes `config` to `config_path` when that file does not exist yet.
pub fn execute_init<L>(
    contract: &ProvenanceContract<L>,
    config: &ProvledgerConfig,
    config_path: &Path,
    formatter: &Formatter,
) -> Result<()>
where
    L: Ledger,
    L::Error: Display,
{
    let token = accepted(contract.init())?;

    if !config_path.exists() {
        config.save(config_path)?;
        println!(
            "{}",
            formatter.success(&format!("Wrote {}", config_path.display()))
        );
    }

    println!("{}", formatter.success(&String::from_utf8_lossy(&token)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use provledger_contract::ContractConfig;
    use provledger_store::MemoryLedger;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_missing_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let contract = ProvenanceContract::new(MemoryLedger::new(), ContractConfig::default());
        let formatter = Formatter::new(OutputFormat::Text, false);

        execute_init(&contract, &ProvledgerConfig::default(), &path, &formatter).unwrap();
        assert_eq!(
            ProvledgerConfig::from_file(&path).unwrap(),
            ProvledgerConfig::default()
        );
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_filter = \"debug\"\n").unwrap();
        let contract = ProvenanceContract::new(MemoryLedger::new(), ContractConfig::default());
        let formatter = Formatter::new(OutputFormat::Text, false);

        execute_init(&contract, &ProvledgerConfig::default(), &path, &formatter).unwrap();
        assert_eq!(ProvledgerConfig::from_file(&path).unwrap().log_filter, "debug");
    }
}
