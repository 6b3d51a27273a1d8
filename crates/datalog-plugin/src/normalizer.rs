//! Metadata Normalizer: stored object → importable data table.
//!
//! Pure transformation. An object without a `dataTable` item yields nothing;
//! so does an object whose metadata matches no known schema.

use datalog_core::constants::fallback_name;
use datalog_core::objects::{ImageItem, ObjectMetadata, StoredObject};
use datalog_core::tables::{ImportableDataTable, ThumbnailRef};
use serde::Serialize;

/// One catalog row: the table plus the image chosen to represent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub table: ImportableDataTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ThumbnailRef>,
}

impl CatalogEntry {
    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.table.object_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.table.name
    }
}

/// Normalizes the objects of one snapshot, in traversal order.
///
/// Holds the counter for synthetic names, so one instance must see the whole
/// snapshot and nothing else.
#[derive(Debug, Default)]
pub struct Normalizer {
    unnamed: usize,
}

impl Normalizer {
    #[must_use]
    pub const fn new() -> Self {
        Self { unnamed: 0 }
    }

    pub fn normalize(&mut self, object: &StoredObject) -> Option<CatalogEntry> {
        let metadata = match object.parse_metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(object_id = %object.id, error = %e, "skipping object");
                return None;
            }
        };

        let Some((item_id, table_item)) = metadata.data_table_item() else {
            tracing::debug!(object_id = %object.id, "no data table item");
            return None;
        };

        let name = self.display_name(&metadata);
        Some(CatalogEntry {
            table: ImportableDataTable {
                name,
                object_id: object.id.clone(),
                data_table_item_id: item_id.to_string(),
                columns: table_item.cols.clone(),
            },
            thumbnail: select_thumbnail(&metadata.image_items()),
        })
    }

    /// Description, else name, else the next synthetic `Data Set N`.
    fn display_name(&mut self, metadata: &ObjectMetadata) -> String {
        let usable = |s: Option<&str>| s.filter(|s| !s.trim().is_empty()).map(str::to_string);
        usable(metadata.description())
            .or_else(|| usable(metadata.name()))
            .unwrap_or_else(|| {
                self.unnamed += 1;
                fallback_name(self.unnamed)
            })
    }
}

/// Normalize a full snapshot. Objects repeating an earlier id are dropped.
#[must_use]
pub fn normalize_snapshot(objects: &[StoredObject]) -> Vec<CatalogEntry> {
    let mut normalizer = Normalizer::new();
    let mut seen = std::collections::HashSet::new();
    objects
        .iter()
        .filter(|object| seen.insert(object.id.as_str()))
        .filter_map(|object| normalizer.normalize(object))
        .collect()
}

/// Pick the representative image.
///
/// An image whose sub-type includes "thumbnail" wins outright. Otherwise the
/// smallest declared area wins, first one on ties.
#[must_use]
pub fn select_thumbnail(images: &[(&str, &ImageItem)]) -> Option<ThumbnailRef> {
    let chosen = images
        .iter()
        .find(|(_, image)| image.is_thumbnail())
        .or_else(|| {
            images.iter().reduce(|best, candidate| {
                if candidate.1.area() < best.1.area() {
                    candidate
                } else {
                    best
                }
            })
        })?;

    let (item_id, image) = *chosen;
    Some(ThumbnailRef {
        item_id: item_id.to_string(),
        width: image.width,
        height: image.height,
    })
}
