//! Selection/Highlight Coordinator.
//!
//! Selects every host item belonging to a data set so the user can see which
//! rows of the shared workspace came from the chosen object. Best-effort:
//! failures are logged and never reach the caller.

use datalog_config::WorkspaceConfig;

use crate::host::{HostClient, api};

/// Select all items whose name attribute equals `name`.
///
/// Returns the selected item ids, or `None` if the host could not be queried
/// or refused the selection.
pub async fn highlight_data_set(
    host: &dyn HostClient,
    workspace: &WorkspaceConfig,
    name: &str,
) -> Option<Vec<u64>> {
    let items = match api::get_all_items(host, workspace).await {
        Ok(Some(items)) => items,
        Ok(None) => {
            tracing::debug!(name, "nothing to highlight; item scan failed");
            return None;
        }
        Err(e) => {
            tracing::warn!(name, error = %e, "highlight skipped");
            return None;
        }
    };

    let ids: Vec<u64> = items
        .iter()
        .filter(|item| {
            item.values.get(&workspace.name_attribute).and_then(|v| v.as_str()) == Some(name)
        })
        .map(|item| item.id)
        .collect();

    if let Err(e) = api::create_selection_list(host, workspace, &ids).await {
        tracing::warn!(name, error = %e, "host refused selection");
        return None;
    }
    Some(ids)
}
