//! Invoke command implementation.

use super::accepted;
use crate::cli::InvokeArgs;
use crate::error::Result;
use provledger_contract::ProvenanceContract;
use provledger_domain::traits::Ledger;
use std::fmt::Display;

/// Execute the invoke command, printing the raw success payload.
pub fn execute_invoke<L>(
    args: InvokeArgs,
    contract: &mut ProvenanceContract<L>,
) -> Result<()>
where
    L: Ledger,
    L::Error: Display,
{
    let payload = accepted(contract.invoke(&args.function, &args.args))?;
    println!("{}", String::from_utf8_lossy(&payload));
    Ok(())
}
