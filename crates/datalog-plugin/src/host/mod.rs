//! The host application as seen by the plugin.
//!
//! [`HostClient`] is the transport seam: the generic request channel, the
//! interactive-state blob, and the `notify` push subscription. The typed
//! calls the engine actually makes live in [`api`].

pub mod api;

use async_trait::async_trait;
use datalog_core::host::{HostNotification, HostRequest, HostResponse, PluginDimensions};

use crate::error::HostError;
use crate::subscription::Subscription;

/// Callback invoked for every notification on a subscribed resource.
pub type NotifyHandler = Box<dyn Fn(HostNotification) + Send + Sync>;

#[async_trait]
pub trait HostClient: Send + Sync {
    /// One-time handshake. Must complete before any other call.
    async fn initialize(
        &self,
        name: &str,
        version: &str,
        dimensions: PluginDimensions,
    ) -> Result<(), HostError>;

    /// Generic `{ action, resource, values }` request.
    async fn send_request(&self, request: HostRequest) -> Result<HostResponse, HostError>;

    /// The persisted interactive-state blob, if any.
    async fn get_interactive_state(&self) -> Result<Option<serde_json::Value>, HostError>;

    async fn update_interactive_state(&self, state: serde_json::Value) -> Result<(), HostError>;

    /// Subscribe to `notify` messages for `resource`.
    fn on_notify(&self, resource: &str, handler: NotifyHandler) -> Subscription;
}
