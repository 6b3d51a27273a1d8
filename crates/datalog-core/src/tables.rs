//! Normalized data tables and the row payloads fetched for them.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Display-ready projection of a stored object's tabular item.
///
/// `name` is never empty and `data_table_item_id` always references an item
/// tagged `dataTable` in the source object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportableDataTable {
    pub name: String,
    pub object_id: String,
    pub data_table_item_id: String,
    pub columns: Vec<String>,
}

/// The image item chosen to represent an object in the list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailRef {
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Row data as returned for a data table item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DataTableData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<TableRows>,
}

/// Rows keyed by row index, or a plain sequence of rows.
///
/// Each row is a list of cells aligned positionally with the table's columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TableRows {
    Sequence(Vec<Vec<serde_json::Value>>),
    Indexed(IndexMap<String, Vec<serde_json::Value>>),
}

impl DataTableData {
    /// Decode a raw item payload.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the payload is not a row container.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Rows in import order. A missing `rows` field means no rows.
    #[must_use]
    pub fn ordered_rows(&self) -> Vec<&[serde_json::Value]> {
        match &self.rows {
            None => Vec::new(),
            Some(TableRows::Sequence(rows)) => rows.iter().map(Vec::as_slice).collect(),
            Some(TableRows::Indexed(rows)) => ordered_indexed_rows(rows),
        }
    }
}

/// Canonical integer keys ascending, then remaining keys in insertion order.
///
/// Row `"10"` follows row `"9"`, not row `"1"`.
fn ordered_indexed_rows(rows: &IndexMap<String, Vec<serde_json::Value>>) -> Vec<&[serde_json::Value]> {
    let mut indexed: Vec<(u32, &[serde_json::Value])> = Vec::new();
    let mut named: Vec<&[serde_json::Value]> = Vec::new();
    for (key, row) in rows {
        match canonical_index(key) {
            Some(index) => indexed.push((index, row.as_slice())),
            None => named.push(row.as_slice()),
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, row)| row).chain(named).collect()
}

fn canonical_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    // "01" or "+1" are ordinary keys, and u32::MAX is not a valid array index.
    (index != u32::MAX && index.to_string() == key).then_some(index)
}

/// Payload returned for an image item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn firsts(data: &DataTableData) -> Vec<serde_json::Value> {
        data.ordered_rows().iter().map(|row| row[0].clone()).collect()
    }

    #[test]
    fn indexed_rows_sort_numerically() {
        let data = DataTableData::from_value(json!({
            "rows": {"10": [10], "2": [2], "0": [0], "1": [1]}
        }))
        .unwrap();
        assert_eq!(firsts(&data), vec![json!(0), json!(1), json!(2), json!(10)]);
    }

    #[test]
    fn non_index_keys_follow_in_insertion_order() {
        let data = DataTableData::from_value(json!({
            "rows": {"b": ["b"], "1": [1], "01": ["01"], "a": ["a"], "0": [0]}
        }))
        .unwrap();
        assert_eq!(
            firsts(&data),
            vec![json!(0), json!(1), json!("b"), json!("01"), json!("a")]
        );
    }

    #[test]
    fn sequence_rows_keep_order() {
        let data = DataTableData::from_value(json!({"rows": [[3], [1], [2]]})).unwrap();
        assert_eq!(firsts(&data), vec![json!(3), json!(1), json!(2)]);
    }

    #[test]
    fn missing_rows_means_empty() {
        let data = DataTableData::from_value(json!({})).unwrap();
        assert!(data.ordered_rows().is_empty());
    }

    #[test]
    fn non_container_payload_is_rejected() {
        assert!(DataTableData::from_value(json!({"rows": "nope"})).is_err());
    }
}
