//! Host handshake and Interactive API checks.
//!
//! Every check failure is fatal and maps to one user-facing message; see
//! [`HandshakeError`].

use datalog_config::DatalogConfig;
use datalog_core::host::InteractiveApi;

use crate::error::HandshakeError;
use crate::host::{HostClient, api};
use crate::storage::StorageBinding;

/// Initialize the plugin with the host and work out what to monitor.
///
/// # Errors
///
/// Returns the first failed check as a `HandshakeError`.
pub async fn connect(
    host: &dyn HostClient,
    config: &DatalogConfig,
) -> Result<StorageBinding, HandshakeError> {
    let plugin = &config.plugin;
    host.initialize(&plugin.name, &plugin.version, plugin.dimensions())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "plugin initialization failed");
            HandshakeError::ApiUnreachable
        })?;

    if plugin.cannot_close {
        if let Err(e) = api::update_interactive_frame(host, true).await {
            tracing::warn!(error = %e, "could not hide the close button");
        }
    }

    let response = api::get_interactive_api(host).await.map_err(|e| {
        tracing::error!(error = %e, "interactive API request failed");
        HandshakeError::ApiUnreachable
    })?;
    if !response.success {
        tracing::error!(?response, "failed to get interactive API");
        return Err(HandshakeError::ApiUnreachable);
    }

    let descriptor: InteractiveApi = match response.values {
        None => InteractiveApi::default(),
        Some(values) => serde_json::from_value(values).map_err(|e| {
            tracing::error!(error = %e, "interactive API response is not valid");
            HandshakeError::ApiMalformed
        })?,
    };
    if !descriptor.available {
        tracing::error!("interactive API is not available");
        return Err(HandshakeError::ApiUnavailable);
    }

    let init = descriptor.init_interactive.ok_or_else(|| {
        tracing::error!("initInteractive is missing");
        HandshakeError::ApiMalformed
    })?;
    let storage_config = init.object_storage_config.ok_or_else(|| {
        tracing::error!("objectStorageConfig is missing");
        HandshakeError::MissingStorageConfig
    })?;
    let source_id = config.source.source_id().ok_or_else(|| {
        tracing::error!("dataSourceInteractive is not configured");
        HandshakeError::MissingSourceId
    })?;

    Ok(StorageBinding {
        config: storage_config,
        source_id: source_id.to_string(),
    })
}
