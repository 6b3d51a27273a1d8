use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use datalog_core::host::{
    AttributeValues, HostAction, HostItem, HostNotification, HostRequest, HostResponse,
    NotifyAction, PluginDimensions,
};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::error::HostError;
use crate::host::{HostClient, NotifyHandler};
use crate::subscription::Subscription;

type SharedHandler = Arc<dyn Fn(HostNotification) + Send + Sync>;

#[derive(Debug, Default)]
struct DataContext {
    definition: Option<Value>,
    items: Vec<HostItem>,
    selection: Vec<u64>,
}

#[derive(Debug, Default)]
struct HostState {
    initialized: bool,
    fail_initialize: bool,
    dimensions: Option<PluginDimensions>,
    cannot_close: Option<bool>,
    interactive_api: Option<HostResponse>,
    interactive_state: Option<Value>,
    contexts: IndexMap<String, DataContext>,
    next_item_id: u64,
    failing: HashSet<String>,
    requests: Vec<HostRequest>,
    tables: Vec<Value>,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: HashMap<u64, (String, SharedHandler)>,
}

/// A host that keeps its data contexts in memory.
///
/// Item ids are assigned from one counter starting at 1. Creating or deleting
/// items pushes a `notify` message to subscribers of
/// `dataContext[<name>].case`.
#[derive(Clone, Default)]
pub struct MemoryHost {
    state: Arc<Mutex<HostState>>,
    subscribers: Arc<Mutex<Subscribers>>,
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("state", &*self.state.lock())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Split `dataContext[name].suffix` into `(name, Some(suffix))`.
fn parse_context(resource: &str) -> Option<(&str, Option<&str>)> {
    let rest = resource.strip_prefix("dataContext[")?;
    let end = rest.find(']')?;
    let (name, tail) = (&rest[..end], &rest[end + 1..]);
    match tail.strip_prefix('.') {
        Some(suffix) => Some((name, Some(suffix))),
        None if tail.is_empty() => Some((name, None)),
        None => None,
    }
}

fn case_resource(data_context: &str) -> String {
    format!("dataContext[{data_context}].case")
}

impl MemoryHost {
    /// A host that rejects `get interactiveApi` until one is configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose Interactive API hands out `storage_config`.
    #[must_use]
    pub fn with_storage_config(storage_config: Value) -> Self {
        let host = Self::new();
        host.set_interactive_api(HostResponse::ok(Some(json!({
            "available": true,
            "initInteractive": {"objectStorageConfig": storage_config}
        }))));
        host
    }

    pub fn set_interactive_api(&self, response: HostResponse) {
        self.state.lock().interactive_api = Some(response);
    }

    /// Make `initialize` fail with a transport error.
    pub fn fail_initialize(&self) {
        self.state.lock().fail_initialize = true;
    }

    /// Make every request for `resource` fail with a transport error.
    pub fn fail_resource(&self, resource: &str) {
        self.state.lock().failing.insert(resource.to_string());
    }

    pub fn set_interactive_state(&self, state: Value) {
        self.state.lock().interactive_state = Some(state);
    }

    #[must_use]
    pub fn interactive_state(&self) -> Option<Value> {
        self.state.lock().interactive_state.clone()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<PluginDimensions> {
        self.state.lock().dimensions
    }

    #[must_use]
    pub fn frame_cannot_close(&self) -> Option<bool> {
        self.state.lock().cannot_close
    }

    /// Add items directly, creating the data context if needed. Subscribers
    /// are notified as if the user had created them.
    pub fn seed_items(&self, data_context: &str, items: Vec<AttributeValues>) -> Vec<u64> {
        let ids = {
            let mut state = self.state.lock();
            state.contexts.entry(data_context.to_string()).or_default();
            Self::insert_items(&mut state, data_context, items.clone())
        };
        self.emit(data_context, HostNotification::new(NotifyAction::Create, items));
        ids
    }

    /// Delete every item of `data_context` matching `predicate`. Returns how
    /// many were removed.
    pub fn delete_items_where(
        &self,
        data_context: &str,
        predicate: impl Fn(&AttributeValues) -> bool,
    ) -> usize {
        let removed: Vec<AttributeValues> = {
            let mut state = self.state.lock();
            let Some(ctx) = state.contexts.get_mut(data_context) else {
                return 0;
            };
            let (gone, kept): (Vec<HostItem>, Vec<HostItem>) =
                ctx.items.drain(..).partition(|item| predicate(&item.values));
            ctx.items = kept;
            gone.into_iter().map(|item| item.values).collect()
        };
        let count = removed.len();
        if count > 0 {
            self.emit(data_context, HostNotification::new(NotifyAction::Delete, removed));
        }
        count
    }

    #[must_use]
    pub fn items(&self, data_context: &str) -> Vec<HostItem> {
        self.state
            .lock()
            .contexts
            .get(data_context)
            .map(|ctx| ctx.items.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn selection(&self, data_context: &str) -> Vec<u64> {
        self.state
            .lock()
            .contexts
            .get(data_context)
            .map(|ctx| ctx.selection.clone())
            .unwrap_or_default()
    }

    /// The definition the data context was created with.
    #[must_use]
    pub fn data_context(&self, data_context: &str) -> Option<Value> {
        self.state
            .lock()
            .contexts
            .get(data_context)
            .and_then(|ctx| ctx.definition.clone())
    }

    /// How many data contexts were created through requests.
    #[must_use]
    pub fn data_contexts_created(&self) -> usize {
        self.requests_for(HostAction::Create, "dataContext")
    }

    /// Components requested so far.
    #[must_use]
    pub fn tables(&self) -> Vec<Value> {
        self.state.lock().tables.clone()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<HostRequest> {
        self.state.lock().requests.clone()
    }

    #[must_use]
    pub fn requests_for(&self, action: HostAction, resource: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.action == action && r.resource == resource)
            .count()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().handlers.len()
    }

    fn insert_items(state: &mut HostState, data_context: &str, items: Vec<AttributeValues>) -> Vec<u64> {
        let mut ids = Vec::with_capacity(items.len());
        let mut created = Vec::with_capacity(items.len());
        for values in items {
            state.next_item_id += 1;
            ids.push(state.next_item_id);
            created.push(HostItem {
                id: state.next_item_id,
                values,
            });
        }
        if let Some(ctx) = state.contexts.get_mut(data_context) {
            ctx.items.extend(created);
        }
        ids
    }

    fn emit(&self, data_context: &str, notification: HostNotification) {
        let resource = case_resource(data_context);
        let handlers: Vec<SharedHandler> = self
            .subscribers
            .lock()
            .handlers
            .values()
            .filter(|(r, _)| *r == resource)
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(notification.clone());
        }
    }

    fn handle_context(
        &self,
        action: HostAction,
        name: &str,
        suffix: Option<&str>,
        values: Option<Value>,
    ) -> HostResponse {
        let mut state = self.state.lock();
        if !state.contexts.contains_key(name) {
            return HostResponse::failed();
        }

        match (action, suffix) {
            (HostAction::Get, None) => {
                let definition = state
                    .contexts
                    .get(name)
                    .and_then(|ctx| ctx.definition.clone())
                    .unwrap_or_else(|| json!({"name": name}));
                HostResponse::ok(Some(definition))
            }
            (HostAction::Get, Some("itemSearch[*]")) => {
                let items = state
                    .contexts
                    .get(name)
                    .map(|ctx| ctx.items.clone())
                    .unwrap_or_default();
                match serde_json::to_value(items) {
                    Ok(values) => HostResponse::ok(Some(values)),
                    Err(_) => HostResponse::failed(),
                }
            }
            (HostAction::Create, Some("item")) => {
                let items: Vec<AttributeValues> = match values {
                    Some(Value::Array(list)) => list
                        .into_iter()
                        .filter_map(|v| match v {
                            Value::Object(map) => Some(map),
                            _ => None,
                        })
                        .collect(),
                    Some(Value::Object(map)) => vec![map],
                    _ => return HostResponse::failed(),
                };
                let ids = Self::insert_items(&mut state, name, items.clone());
                drop(state);
                self.emit(name, HostNotification::new(NotifyAction::Create, items));
                let ids: Vec<Value> = ids.into_iter().map(|id| json!({"id": id})).collect();
                HostResponse::ok(Some(Value::Array(ids)))
            }
            (HostAction::Create, Some("selectionList")) => {
                let Some(ids) = values.and_then(|v| serde_json::from_value::<Vec<u64>>(v).ok())
                else {
                    return HostResponse::failed();
                };
                if let Some(ctx) = state.contexts.get_mut(name) {
                    ctx.selection = ids;
                }
                HostResponse::ok(None)
            }
            _ => HostResponse::failed(),
        }
    }
}

#[async_trait]
impl HostClient for MemoryHost {
    async fn initialize(
        &self,
        name: &str,
        version: &str,
        dimensions: PluginDimensions,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.fail_initialize {
            return Err(HostError::Transport("host did not answer".into()));
        }
        tracing::debug!(name, version, "plugin initialized");
        state.initialized = true;
        state.dimensions = Some(dimensions);
        Ok(())
    }

    async fn send_request(&self, request: HostRequest) -> Result<HostResponse, HostError> {
        {
            let mut state = self.state.lock();
            if state.failing.contains(&request.resource) {
                return Err(HostError::Transport(format!(
                    "{} {} failed",
                    request.action, request.resource
                )));
            }
            state.requests.push(request.clone());
        }

        let HostRequest {
            action,
            resource,
            values,
        } = request;
        if let Some((name, suffix)) = parse_context(&resource) {
            return Ok(self.handle_context(action, name, suffix, values));
        }

        let mut state = self.state.lock();
        let response = match (action, resource.as_str()) {
            (HostAction::Update, "interactiveFrame") => {
                state.cannot_close = values
                    .as_ref()
                    .and_then(|v| v.get("cannotClose"))
                    .and_then(Value::as_bool);
                HostResponse::ok(None)
            }
            (HostAction::Get, "interactiveApi") => state
                .interactive_api
                .clone()
                .unwrap_or_else(HostResponse::failed),
            (HostAction::Create, "dataContext") => {
                let name = values
                    .as_ref()
                    .and_then(|v| v.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                match name {
                    Some(name) => {
                        state.contexts.entry(name).or_default().definition = values;
                        HostResponse::ok(None)
                    }
                    None => HostResponse::failed(),
                }
            }
            (HostAction::Create, "component") => {
                state.tables.push(values.unwrap_or(Value::Null));
                HostResponse::ok(None)
            }
            _ => {
                tracing::debug!(%action, %resource, "unhandled host request");
                HostResponse::failed()
            }
        };
        Ok(response)
    }

    async fn get_interactive_state(&self) -> Result<Option<Value>, HostError> {
        Ok(self.state.lock().interactive_state.clone())
    }

    async fn update_interactive_state(&self, state: Value) -> Result<(), HostError> {
        self.state.lock().interactive_state = Some(state);
        Ok(())
    }

    fn on_notify(&self, resource: &str, handler: NotifyHandler) -> Subscription {
        let id = {
            let mut subscribers = self.subscribers.lock();
            subscribers.next_id += 1;
            let id = subscribers.next_id;
            subscribers
                .handlers
                .insert(id, (resource.to_string(), Arc::from(handler)));
            id
        };
        let subscribers = Arc::clone(&self.subscribers);
        Subscription::new(move || {
            subscribers.lock().handlers.remove(&id);
        })
    }
}
