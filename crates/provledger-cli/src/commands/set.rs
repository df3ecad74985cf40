//! Set command implementation.

use super::accepted;
use crate::cli::SetArgs;
use crate::error::Result;
use crate::output::Formatter;
use chrono::{SecondsFormat, Utc};
use provledger_contract::ProvenanceContract;
use provledger_domain::traits::Ledger;
use std::fmt::Display;

/// Execute the set command.
///
/// The typed flags are encoded into the positional form and sent through
/// the same dispatch path as a raw `set` invocation.
pub fn execute_set<L>(
    args: SetArgs,
    contract: &mut ProvenanceContract<L>,
    formatter: &Formatter,
) -> Result<()>
where
    L: Ledger,
    L::Error: Display,
{
    let request = args.into_request(now);
    let token = accepted(contract.invoke("set", &request.to_args()))?;

    println!(
        "{}",
        formatter.success(&format!(
            "{} {} ({} segment(s))",
            String::from_utf8_lossy(&token),
            request.content_hash,
            request.segment_hashes.len()
        ))
    );
    Ok(())
}

/// Current instant in the generation time layout
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
