//! Which stored-object session the plugin monitors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Id of the interactive whose stored objects are listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_interactive: Option<String>,
}

impl SourceConfig {
    /// The configured source id, ignoring blank values.
    #[must_use]
    pub fn source_id(&self) -> Option<&str> {
        self.data_source_interactive
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
