//! Thumbnail urls for catalog entries, fetched once per object.

use std::collections::{HashMap, HashSet};

use datalog_core::tables::ImageData;

use crate::normalizer::CatalogEntry;
use crate::storage::ObjectStorage;

#[derive(Debug, Default)]
pub struct Thumbnails {
    fetched: HashSet<String>,
    urls: HashMap<String, String>,
}

impl Thumbnails {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch thumbnails for entries not attempted yet. Failures are logged and
    /// not retried.
    pub async fn refresh(&mut self, storage: &dyn ObjectStorage, entries: &[CatalogEntry]) {
        for entry in entries {
            let Some(thumbnail) = &entry.thumbnail else {
                continue;
            };
            if !self.fetched.insert(entry.object_id().to_string()) {
                continue;
            }

            let raw = match storage
                .read_data_item(entry.object_id(), &thumbnail.item_id)
                .await
            {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(object_id = entry.object_id(), error = %e, "thumbnail read failed");
                    continue;
                }
            };
            match serde_json::from_value::<ImageData>(raw) {
                Ok(ImageData { url: Some(url) }) => {
                    self.urls.insert(entry.object_id().to_string(), url);
                }
                Ok(ImageData { url: None }) => {}
                Err(e) => {
                    tracing::warn!(object_id = entry.object_id(), error = %e, "thumbnail payload unreadable");
                }
            }
        }
    }

    #[must_use]
    pub fn url(&self, object_id: &str) -> Option<&str> {
        self.urls.get(object_id).map(String::as_str)
    }
}
