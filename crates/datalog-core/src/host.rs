//! Wire types exchanged with the host application.
//!
//! The host speaks a generic `{ action, resource, values }` request protocol
//! and pushes `notify` messages for changes to its live data.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute values of one host item or case.
pub type AttributeValues = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HostAction {
    Get,
    Create,
    Update,
    Delete,
}

impl HostAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HostRequest {
    pub action: HostAction,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<serde_json::Value>,
}

impl HostRequest {
    #[must_use]
    pub fn get(resource: impl Into<String>) -> Self {
        Self {
            action: HostAction::Get,
            resource: resource.into(),
            values: None,
        }
    }

    #[must_use]
    pub fn create(resource: impl Into<String>, values: serde_json::Value) -> Self {
        Self {
            action: HostAction::Create,
            resource: resource.into(),
            values: Some(values),
        }
    }

    #[must_use]
    pub fn update(resource: impl Into<String>, values: serde_json::Value) -> Self {
        Self {
            action: HostAction::Update,
            resource: resource.into(),
            values: Some(values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HostResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<serde_json::Value>,
}

impl HostResponse {
    #[must_use]
    pub const fn ok(values: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            values,
        }
    }

    #[must_use]
    pub const fn failed() -> Self {
        Self {
            success: false,
            values: None,
        }
    }
}

/// Dimensions requested for the plugin frame during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PluginDimensions {
    pub width: u32,
    pub height: u32,
}

// ---------------------------------------------------------------------------
// Live data
// ---------------------------------------------------------------------------

/// One item in a host data context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HostItem {
    pub id: u64,
    #[serde(default)]
    pub values: AttributeValues,
}

impl HostItem {
    /// Non-empty string value of `attribute`, if any.
    #[must_use]
    pub fn text(&self, attribute: &str) -> Option<&str> {
        text_value(&self.values, attribute)
    }
}

/// Non-empty string value of `attribute` in an attribute map.
#[must_use]
pub fn text_value<'a>(values: &'a AttributeValues, attribute: &str) -> Option<&'a str> {
    values
        .get(attribute)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum NotifyAction {
    Create,
    Update,
    Delete,
    /// Any action this plugin does not react to.
    #[serde(other)]
    Other,
}

/// A change notification for a host data context's cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HostNotification {
    pub action: NotifyAction,
    #[serde(default)]
    pub values: NotificationValues,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationValues {
    #[serde(default)]
    pub cases: Vec<NotifiedCase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NotifiedCase {
    #[serde(default)]
    pub values: AttributeValues,
}

impl HostNotification {
    #[must_use]
    pub fn new(action: NotifyAction, cases: Vec<AttributeValues>) -> Self {
        Self {
            action,
            values: NotificationValues {
                cases: cases
                    .into_iter()
                    .map(|values| NotifiedCase { values })
                    .collect(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Interactive API
// ---------------------------------------------------------------------------

/// Persisted plugin state kept by the host between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveState {
    #[serde(default)]
    pub imported_data_table_ids: Vec<String>,
}

/// Descriptor returned by `get interactiveApi`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveApi {
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_interactive: Option<InitInteractive>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitInteractive {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_storage_config: Option<ObjectStorageConfig>,
}

/// Opaque storage configuration handed through to the storage factory.
///
/// Two configs are the same binding when their JSON is equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ObjectStorageConfig(pub serde_json::Map<String, serde_json::Value>);

impl ObjectStorageConfig {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }
}
