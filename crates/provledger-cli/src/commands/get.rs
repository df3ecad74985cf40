//! Get command implementation.

use super::accepted;
use crate::cli::GetArgs;
use crate::error::Result;
use crate::output::Formatter;
use provledger_contract::{CombinedEnvelope, ProvenanceContract, ReturnedMessage};
use provledger_domain::traits::Ledger;
use std::fmt::Display;

/// Execute the get command.
pub fn execute_get<L>(
    args: GetArgs,
    contract: &mut ProvenanceContract<L>,
    formatter: &Formatter,
) -> Result<()>
where
    L: Ledger,
    L::Error: Display,
{
    let body = accepted(contract.invoke("get", &[args.hash.as_str()]))?;

    if !args.decode {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    let message: ReturnedMessage = serde_json::from_slice(&body)?;
    let envelope = CombinedEnvelope::decode_payload(&message.provenance)?;
    print!("{}", formatter.format_envelope(&envelope)?);
    Ok(())
}
