//! Names of the host data context the plugin imports into.

use serde::{Deserialize, Serialize};

fn default_data_context() -> String {
    String::from("DatalogPluginData")
}

fn default_title() -> String {
    String::from("Datalog Data")
}

fn default_parent_collection() -> String {
    String::from("datasets")
}

fn default_child_collection() -> String {
    String::from("data")
}

fn default_name_attribute() -> String {
    String::from("name")
}

fn default_identity_attribute() -> String {
    String::from("__objectId")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    /// Name of the host data context holding every import.
    #[serde(default = "default_data_context")]
    pub data_context: String,

    /// Title shown for the data context.
    #[serde(default = "default_title")]
    pub title: String,

    /// Parent collection, one case per imported data set.
    #[serde(default = "default_parent_collection")]
    pub parent_collection: String,

    /// Child collection, one case per imported row.
    #[serde(default = "default_child_collection")]
    pub child_collection: String,

    /// Categorical parent attribute holding the data set's display name.
    #[serde(default = "default_name_attribute")]
    pub name_attribute: String,

    /// Hidden attribute holding the source object id.
    #[serde(default = "default_identity_attribute")]
    pub identity_attribute: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            data_context: default_data_context(),
            title: default_title(),
            parent_collection: default_parent_collection(),
            child_collection: default_child_collection(),
            name_attribute: default_name_attribute(),
            identity_attribute: default_identity_attribute(),
        }
    }
}

impl WorkspaceConfig {
    /// Resource path of the data context, e.g. `dataContext[DatalogPluginData]`.
    #[must_use]
    pub fn resource(&self) -> String {
        format!("dataContext[{}]", self.data_context)
    }

    /// Resource path under the data context, e.g. `dataContext[X].item`.
    #[must_use]
    pub fn child_resource(&self, suffix: &str) -> String {
        format!("dataContext[{}].{suffix}", self.data_context)
    }
}
