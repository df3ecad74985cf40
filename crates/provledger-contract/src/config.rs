//! Contract configuration

use serde::{Deserialize, Serialize};

/// Dispatch behaviour of [`crate::ProvenanceContract`]
///
/// Loaded from the `[contract]` table of the CLI configuration file.
///
/// ```toml
/// [contract]
/// legacy_dispatch = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Route every function other than `set` to the read path, as early
    /// deployments did, instead of rejecting unknown names
    #[serde(default)]
    pub legacy_dispatch: bool,
}

impl ContractConfig {
    /// Configuration compatible with clients that send arbitrary read verbs
    pub fn legacy() -> Self {
        Self {
            legacy_dispatch: true,
        }
    }
}
