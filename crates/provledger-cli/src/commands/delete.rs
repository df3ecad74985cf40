//! Delete command implementation.

use crate::cli::DeleteArgs;
use crate::error::Result;
use crate::output::Formatter;
use provledger_contract::ProvenanceContract;
use provledger_domain::traits::Ledger;
use std::fmt::Display;

/// Execute the delete command.
pub fn execute_delete<L>(
    args: DeleteArgs,
    contract: &mut ProvenanceContract<L>,
    formatter: &Formatter,
) -> Result<()>
where
    L: Ledger,
    L::Error: Display,
{
    contract.delete(&args.hash)?;
    println!("{}", formatter.success(&format!("Deleted {}", args.hash)));
    Ok(())
}
