//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use provledger_contract::WriteRequest;
use provledger_domain::{Agent, Location};
use std::path::PathBuf;

/// Provledger CLI - Record and inspect document provenance.
#[derive(Debug, Parser)]
#[command(name = "provledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "text")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PROVLEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ledger database path, overriding the configured one
    #[arg(short, long, global = true)]
    pub ledger: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Human readable text (default)
    Text,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the contract's instantiation hook
    Init,

    /// Record the provenance of a document and its segments
    Set(SetArgs),

    /// Send a raw positional invocation to the contract
    Invoke(InvokeArgs),

    /// Read the provenance of a hash
    Get(GetArgs),

    /// Mark a hash as deleted; its history is kept
    Delete(DeleteArgs),

    /// Decode a read payload without touching the ledger
    Inspect(InspectArgs),
}

/// Arguments for the set command.
#[derive(Debug, Args)]
pub struct SetArgs {
    /// Content hash of the document
    pub hash: String,

    /// Agent type (e.g., an OID)
    #[arg(long)]
    pub agent_type: String,

    /// Agent identifier
    #[arg(long)]
    pub agent_id: String,

    /// Agent display name
    #[arg(long, default_value = "")]
    pub agent_name: String,

    /// Identity provider that authenticated the agent
    #[arg(long, default_value = "")]
    pub idp: String,

    /// Location identifier
    #[arg(long, default_value = "")]
    pub location_id: String,

    /// Location name
    #[arg(long, default_value = "")]
    pub location_name: String,

    /// Location locality
    #[arg(long, default_value = "")]
    pub locality: String,

    /// Document identifier at the location
    #[arg(long, default_value = "")]
    pub doc_id: String,

    /// Action performed
    #[arg(short, long, default_value = "ex:CREATE")]
    pub action: String,

    /// Generation time (YYYY-MM-DDTHH:MM:SS.mmmZ); defaults to now
    #[arg(short, long)]
    pub date: Option<String>,

    /// Segment hash; repeat for several segments
    #[arg(short, long = "segment")]
    pub segments: Vec<String>,
}

impl SetArgs {
    /// Build the write request, stamping `now` when no date was given
    pub fn into_request(self, now: impl FnOnce() -> String) -> WriteRequest {
        WriteRequest {
            content_hash: self.hash,
            agent: Agent::new(self.agent_type, self.agent_id, self.agent_name, self.idp),
            location: Location::new(
                self.location_id,
                self.location_name,
                self.locality,
                self.doc_id,
            ),
            action: self.action,
            date: self.date.unwrap_or_else(now),
            segment_hashes: self.segments,
        }
    }
}

/// Arguments for the invoke command.
#[derive(Debug, Args)]
pub struct InvokeArgs {
    /// Function name (`set`, `get`, ...)
    pub function: String,

    /// Positional arguments passed through unchanged
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the get command.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Hash to read
    pub hash: String,

    /// Decode the payload instead of printing the raw response
    #[arg(short, long)]
    pub decode: bool,
}

/// Arguments for the delete command.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Hash to delete
    pub hash: String,
}

/// Arguments for the inspect command.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Payload or `{"Provenance": ...}` response; read from stdin if absent
    pub payload: Option<String>,

    /// Read the payload from a file
    #[arg(short = 'i', long, conflicts_with = "payload")]
    pub file: Option<PathBuf>,
}

impl From<CliFormat> for crate::output::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => crate::output::OutputFormat::Text,
            CliFormat::Json => crate::output::OutputFormat::Json,
        }
    }
}
