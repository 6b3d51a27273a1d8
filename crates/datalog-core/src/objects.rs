//! Stored objects and their schema-versioned metadata.
//!
//! The storage collaborator delivers objects whose metadata is an open JSON
//! bag that has changed shape across releases. [`StoredObject`] keeps that
//! bag untouched; [`ObjectMetadata::parse`] is the single place where it is
//! checked and turned into a closed union. Nothing past that boundary sees
//! untyped metadata.
//!
//! ```text
//! { "version": 1, "type": "typed",   "name": ..., "items": { id: { "type": "dataTable", ... } } }
//! { "version": 1, "type": "untyped", "name": ..., "items": { id: { ... } } }
//! { "name": ..., "items": { ... } }      // pre-versioned, treated as typed v1
//! ```

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_METADATA_VERSION, SUB_TYPE_THUMBNAIL};
use crate::errors::CoreError;

/// One object as delivered in a storage snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoredObject {
    /// Identifier, unique within the session scope.
    pub id: String,
    /// Raw metadata bag. Decode with [`ObjectMetadata::parse`].
    pub metadata: serde_json::Value,
}

impl StoredObject {
    #[must_use]
    pub fn new(id: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            metadata,
        }
    }

    /// Decode this object's metadata.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Metadata` when the bag matches no known schema.
    pub fn parse_metadata(&self) -> Result<ObjectMetadata, CoreError> {
        ObjectMetadata::parse(&self.id, &self.metadata)
    }
}

// ---------------------------------------------------------------------------
// Metadata union
// ---------------------------------------------------------------------------

/// Decoded object metadata, one variant per schema family.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMetadata {
    /// Items carry a `type` tag and type-specific fields.
    Typed(TypedMetadata),
    /// Items are opaque; such objects never contain importable tables.
    Untyped(UntypedMetadata),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedMetadata {
    pub version: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Items in manifest order.
    pub items: IndexMap<String, ItemMetadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UntypedMetadata {
    pub version: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub item_ids: Vec<String>,
}

/// Wire shape shared by every schema family.
#[derive(Deserialize)]
struct WireMetadata {
    #[serde(default)]
    version: Option<u32>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    items: IndexMap<String, serde_json::Value>,
}

impl ObjectMetadata {
    /// Check a raw metadata bag and decode it.
    ///
    /// Individual items that fail to decode are kept as [`ItemMetadata::Other`]
    /// so one malformed item never hides the rest of the manifest.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Metadata` if the bag is not an object, a known
    /// field has the wrong type, or the declared `type` is unknown.
    pub fn parse(object_id: &str, raw: &serde_json::Value) -> Result<Self, CoreError> {
        let wire: WireMetadata =
            serde_json::from_value(raw.clone()).map_err(|e| CoreError::Metadata {
                object_id: object_id.to_string(),
                reason: e.to_string(),
            })?;
        let version = wire.version.unwrap_or(DEFAULT_METADATA_VERSION);

        match wire.kind.as_deref() {
            None | Some("typed") => {
                let items = wire
                    .items
                    .into_iter()
                    .map(|(item_id, value)| {
                        let item = ItemMetadata::decode(object_id, &item_id, value);
                        (item_id, item)
                    })
                    .collect();
                Ok(Self::Typed(TypedMetadata {
                    version,
                    name: wire.name,
                    description: wire.description,
                    items,
                }))
            }
            Some("untyped") => Ok(Self::Untyped(UntypedMetadata {
                version,
                name: wire.name,
                description: wire.description,
                item_ids: wire.items.into_keys().collect(),
            })),
            Some(other) => Err(CoreError::Metadata {
                object_id: object_id.to_string(),
                reason: format!("unknown metadata type '{other}'"),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Typed(m) => m.name.as_deref(),
            Self::Untyped(m) => m.name.as_deref(),
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Typed(m) => m.description.as_deref(),
            Self::Untyped(m) => m.description.as_deref(),
        }
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        match self {
            Self::Typed(m) => m.version,
            Self::Untyped(m) => m.version,
        }
    }

    /// First item tagged as a data table, in manifest order.
    #[must_use]
    pub fn data_table_item(&self) -> Option<(&str, &DataTableItem)> {
        match self {
            Self::Typed(m) => m.items.iter().find_map(|(id, item)| match item {
                ItemMetadata::DataTable(table) => Some((id.as_str(), table)),
                _ => None,
            }),
            Self::Untyped(_) => None,
        }
    }

    /// All image items, in manifest order.
    #[must_use]
    pub fn image_items(&self) -> Vec<(&str, &ImageItem)> {
        match self {
            Self::Typed(m) => m
                .items
                .iter()
                .filter_map(|(id, item)| match item {
                    ItemMetadata::Image(image) => Some((id.as_str(), image)),
                    _ => None,
                })
                .collect(),
            Self::Untyped(_) => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Metadata of one item in an object's manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemMetadata {
    DataTable(DataTableItem),
    Image(ImageItem),
    /// Any other item type, or an item that failed to decode.
    #[serde(other)]
    Other,
}

impl ItemMetadata {
    fn decode(object_id: &str, item_id: &str, value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(item) => item,
            Err(e) => {
                tracing::debug!(object_id, item_id, error = %e, "undecodable item treated as opaque");
                Self::Other
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DataTableItem {
    /// Column names, positionally aligned with every row's cells.
    pub cols: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<SubType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ImageItem {
    #[must_use]
    pub fn is_thumbnail(&self) -> bool {
        self.sub_type
            .as_ref()
            .is_some_and(|s| s.includes(SUB_TYPE_THUMBNAIL))
    }

    /// Declared area; a missing dimension counts as unbounded.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.unwrap_or(f64::MAX) * self.height.unwrap_or(f64::MAX)
    }
}

/// Declared image sub-type: a single string or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SubType {
    One(String),
    Many(Vec<String>),
}

impl SubType {
    /// Substring match for the string form, membership for the list form.
    #[must_use]
    pub fn includes(&self, tag: &str) -> bool {
        match self {
            Self::One(s) => s.contains(tag),
            Self::Many(tags) => tags.iter().any(|t| t == tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unversioned_metadata_is_typed_v1() {
        let meta = ObjectMetadata::parse(
            "A",
            &json!({"name": "Sheep Run 1", "items": {"t1": {"type": "dataTable", "cols": ["time", "sheep"]}}}),
        )
        .unwrap();
        assert_eq!(meta.version(), 1);
        let (item_id, table) = meta.data_table_item().unwrap();
        assert_eq!(item_id, "t1");
        assert_eq!(table.cols, vec!["time", "sheep"]);
    }

    #[test]
    fn untyped_metadata_has_no_tables() {
        let meta = ObjectMetadata::parse(
            "B",
            &json!({"version": 1, "type": "untyped", "items": {"t1": {"type": "dataTable", "cols": []}}}),
        )
        .unwrap();
        assert!(meta.data_table_item().is_none());
        assert!(matches!(meta, ObjectMetadata::Untyped(ref m) if m.item_ids == ["t1"]));
    }

    #[test]
    fn unknown_metadata_type_is_rejected() {
        let err = ObjectMetadata::parse("C", &json!({"type": "encrypted", "items": {}})).unwrap_err();
        assert!(err.to_string().contains("encrypted"));
    }

    #[test]
    fn non_object_metadata_is_rejected() {
        assert!(ObjectMetadata::parse("D", &json!("nope")).is_err());
        assert!(ObjectMetadata::parse("D", &json!({"name": 42, "items": {}})).is_err());
    }

    #[test]
    fn malformed_table_item_is_opaque() {
        let meta = ObjectMetadata::parse(
            "E",
            &json!({"items": {"t1": {"type": "dataTable"}, "t2": {"type": "dataTable", "cols": ["x"]}}}),
        )
        .unwrap();
        assert_eq!(meta.data_table_item().map(|(id, _)| id), Some("t2"));
    }

    #[test]
    fn items_keep_manifest_order() {
        let meta = ObjectMetadata::parse(
            "F",
            &json!({"items": {
                "zz": {"type": "image", "width": 1, "height": 1},
                "aa": {"type": "image"},
                "mm": {"type": "text"}
            }}),
        )
        .unwrap();
        let ids: Vec<&str> = meta.image_items().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["zz", "aa"]);
    }

    #[test]
    fn sub_type_matching() {
        assert!(SubType::One("thumbnail".into()).includes("thumbnail"));
        assert!(SubType::One("small-thumbnail".into()).includes("thumbnail"));
        assert!(SubType::Many(vec!["preview".into(), "thumbnail".into()]).includes("thumbnail"));
        assert!(!SubType::Many(vec!["thumbnails".into()]).includes("thumbnail"));
    }

    #[test]
    fn missing_dimension_is_unbounded() {
        let image = ImageItem {
            sub_type: None,
            width: Some(5.0),
            height: None,
            name: None,
        };
        assert!(image.area() > 1.0e300);
    }
}
