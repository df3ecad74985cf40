//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use provledger_contract::{CombinedEnvelope, HistorySection, NO_HISTORY_AVAILABLE};
use provledger_domain::ProvenanceRecord;
use std::fmt::Write;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable text
    Text,
    /// JSON format
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a decoded read envelope.
    ///
    /// Text output shows the stored document followed by one line per
    /// version; JSON output keeps the wire field names but with `Original`
    /// decoded.
    pub fn format_envelope(&self, envelope: &CombinedEnvelope) -> Result<String> {
        let original = String::from_utf8_lossy(&envelope.original_bytes()?).into_owned();

        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "Original": original,
                    "History": envelope.history,
                });
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Text => Ok(self.format_envelope_text(&original, &envelope.history)),
        }
    }

    fn format_envelope_text(&self, original: &str, history: &HistorySection) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.colorize("Current document:", "cyan"));
        let _ = writeln!(out, "{}", original);
        let _ = writeln!(out);

        match history {
            HistorySection::Entries(entries) => {
                let heading = format!("History ({} versions):", entries.len());
                let _ = writeln!(out, "{}", self.colorize(&heading, "cyan"));
                for (i, entry) in entries.iter().enumerate() {
                    let marker = if entry.is_delete {
                        self.colorize(" [deleted]", "red")
                    } else {
                        String::new()
                    };
                    let _ = writeln!(
                        out,
                        "  {}. {} at {}{}",
                        i + 1,
                        entry.tx_id,
                        entry.timestamp,
                        marker
                    );
                }
            }
            HistorySection::Unavailable => {
                let line = format!("History: {}", NO_HISTORY_AVAILABLE);
                let _ = writeln!(out, "{}", self.warning(&line));
            }
        }
        out
    }

    /// Summarize a provenance graph.
    pub fn format_record(&self, record: &ProvenanceRecord) -> Result<String> {
        if self.format == OutputFormat::Json {
            let relations: Vec<_> = record
                .relations
                .iter()
                .map(|r| {
                    let [from, to] = r.endpoints();
                    serde_json::json!({ "relation": r.name(), "from": from, "to": to })
                })
                .collect();
            let entities: Vec<_> = record
                .entities
                .iter()
                .map(|e| serde_json::json!({ "id": e.id, "label": e.label, "value": e.value }))
                .collect();
            let json = serde_json::json!({
                "entities": entities,
                "activity": { "id": record.activity.id, "type": record.activity.activity_type },
                "agent": {
                    "id": record.agent.id,
                    "type": record.agent.agent_type,
                    "name": record.agent.name,
                    "idp": record.agent.identity_provider,
                },
                "relations": relations,
            });
            return Ok(serde_json::to_string_pretty(&json)?);
        }

        let mut out = String::new();
        for entity in &record.entities {
            let _ = writeln!(
                out,
                "entity   {} ({}) = {}",
                entity.id, entity.label, entity.value
            );
        }
        let _ = writeln!(
            out,
            "activity {} ({})",
            record.activity.id, record.activity.activity_type
        );
        let _ = writeln!(
            out,
            "agent    {} ({}) {} via {}",
            record.agent.id,
            record.agent.agent_type,
            record.agent.name,
            record.agent.identity_provider
        );
        for relation in &record.relations {
            let [from, to] = relation.endpoints();
            let name = self.colorize(relation.name(), "magenta");
            let _ = writeln!(out, "  {} -[{}]-> {}", from, name, to);
        }
        Ok(out)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}
