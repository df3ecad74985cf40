//! Inspect command implementation.

use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use provledger_contract::document::parse_document;
use provledger_contract::{CombinedEnvelope, ReturnedMessage};
use std::io::Read;

/// Execute the inspect command.
///
/// Accepts either the bare payload or a whole `get` response.
pub fn execute_inspect(args: InspectArgs, formatter: &Formatter) -> Result<()> {
    let input = match (args.payload, args.file) {
        (Some(payload), _) => payload,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let envelope = decode_input(&input)?;
    print!("{}", formatter.format_envelope(&envelope)?);

    let original = envelope.original_bytes()?;
    let document = String::from_utf8(original)
        .map_err(|e| CliError::InvalidInput(format!("stored value is not UTF-8: {}", e)))?;
    match parse_document(&document) {
        Ok(record) => {
            println!();
            print!("{}", formatter.format_record(&record)?);
        }
        Err(e) => {
            let message = format!("Not a provenance document: {}", e);
            println!("{}", formatter.warning(&message));
        }
    }
    Ok(())
}

/// Envelope from a bare payload or a `{"Provenance": ...}` response
pub(crate) fn decode_input(input: &str) -> Result<CombinedEnvelope> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::InvalidInput("empty payload".to_string()));
    }

    let payload = if input.starts_with('{') {
        serde_json::from_str::<ReturnedMessage>(input)?.provenance
    } else {
        input.to_string()
    };
    Ok(CombinedEnvelope::decode_payload(&payload)?)
}
