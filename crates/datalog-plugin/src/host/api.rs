//! Typed host calls built on [`HostClient::send_request`].

use datalog_config::WorkspaceConfig;
use datalog_core::host::{AttributeValues, HostItem, HostRequest, HostResponse};
use serde_json::json;

use super::HostClient;
use crate::error::HostError;

/// Send a request and turn `success: false` into [`HostError::Rejected`].
async fn expect_success(
    host: &dyn HostClient,
    request: HostRequest,
) -> Result<HostResponse, HostError> {
    let action = request.action.to_string();
    let resource = request.resource.clone();
    let response = host.send_request(request).await?;
    if response.success {
        Ok(response)
    } else {
        Err(HostError::Rejected { action, resource })
    }
}

/// Every item currently in the workspace's data context.
///
/// Returns `Ok(None)` when the host reports failure, which is also what it
/// does when the data context does not exist yet.
///
/// # Errors
///
/// Returns `HostError` on transport failure or a malformed item list.
pub async fn get_all_items(
    host: &dyn HostClient,
    workspace: &WorkspaceConfig,
) -> Result<Option<Vec<HostItem>>, HostError> {
    let resource = workspace.child_resource("itemSearch[*]");
    let response = host.send_request(HostRequest::get(resource.clone())).await?;
    if !response.success {
        return Ok(None);
    }
    let values = response.values.unwrap_or_else(|| json!([]));
    serde_json::from_value(values)
        .map(Some)
        .map_err(|e| HostError::Malformed {
            resource,
            reason: e.to_string(),
        })
}

/// Whether the workspace's data context exists.
///
/// # Errors
///
/// Returns `HostError` on transport failure.
pub async fn data_context_exists(
    host: &dyn HostClient,
    workspace: &WorkspaceConfig,
) -> Result<bool, HostError> {
    let response = host
        .send_request(HostRequest::get(workspace.resource()))
        .await?;
    Ok(response.success)
}

/// Create a data context from a full definition.
///
/// # Errors
///
/// Returns `HostError` if the host rejects the definition.
pub async fn create_data_context(
    host: &dyn HostClient,
    definition: serde_json::Value,
) -> Result<(), HostError> {
    expect_success(host, HostRequest::create("dataContext", definition)).await?;
    Ok(())
}

/// Append items to the workspace's data context in one batch.
///
/// # Errors
///
/// Returns `HostError` if the host rejects the batch.
pub async fn create_items(
    host: &dyn HostClient,
    workspace: &WorkspaceConfig,
    items: Vec<AttributeValues>,
) -> Result<(), HostError> {
    let values = serde_json::Value::Array(items.into_iter().map(serde_json::Value::Object).collect());
    expect_success(
        host,
        HostRequest::create(workspace.child_resource("item"), values),
    )
    .await?;
    Ok(())
}

/// Ask the host to show a case table for the workspace.
///
/// # Errors
///
/// Returns `HostError` if the host rejects the component.
pub async fn create_table(
    host: &dyn HostClient,
    workspace: &WorkspaceConfig,
) -> Result<(), HostError> {
    expect_success(
        host,
        HostRequest::create(
            "component",
            json!({"type": "caseTable", "dataContext": workspace.data_context}),
        ),
    )
    .await?;
    Ok(())
}

/// Replace the host's selection with the given item ids.
///
/// # Errors
///
/// Returns `HostError` if the host rejects the selection.
pub async fn create_selection_list(
    host: &dyn HostClient,
    workspace: &WorkspaceConfig,
    ids: &[u64],
) -> Result<(), HostError> {
    expect_success(
        host,
        HostRequest::create(workspace.child_resource("selectionList"), json!(ids)),
    )
    .await?;
    Ok(())
}

/// Hide the frame's close button.
///
/// # Errors
///
/// Returns `HostError` if the host rejects the update.
pub async fn update_interactive_frame(
    host: &dyn HostClient,
    cannot_close: bool,
) -> Result<(), HostError> {
    expect_success(
        host,
        HostRequest::update("interactiveFrame", json!({"cannotClose": cannot_close})),
    )
    .await?;
    Ok(())
}

/// Raw `get interactiveApi` response; the handshake interprets it.
///
/// # Errors
///
/// Returns `HostError` on transport failure.
pub async fn get_interactive_api(host: &dyn HostClient) -> Result<HostResponse, HostError> {
    host.send_request(HostRequest::get("interactiveApi")).await
}
