//! Plugin identity and frame settings sent during the host handshake.

use datalog_core::host::PluginDimensions;
use serde::{Deserialize, Serialize};

fn default_name() -> String {
    String::from("Datalog")
}

fn default_version() -> String {
    String::from("0.0.1")
}

const fn default_width() -> u32 {
    300
}

const fn default_height() -> u32 {
    400
}

const fn default_cannot_close() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginConfig {
    /// Plugin name announced to the host.
    #[serde(default = "default_name")]
    pub name: String,

    /// Plugin version announced to the host.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Ask the host to hide the frame's close button. The plugin lives in a
    /// shared document and cannot be reopened once closed.
    #[serde(default = "default_cannot_close")]
    pub cannot_close: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            width: default_width(),
            height: default_height(),
            cannot_close: default_cannot_close(),
        }
    }
}

impl PluginConfig {
    #[must_use]
    pub const fn dimensions(&self) -> PluginDimensions {
        PluginDimensions {
            width: self.width,
            height: self.height,
        }
    }
}
