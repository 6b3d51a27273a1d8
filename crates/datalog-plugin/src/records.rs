//! Host-side shape of an import: the data context definition and the items.
//!
//! ```text
//! <parent_collection>            name (categorical)
//! └── <child_collection>         one numeric attribute per source column,
//!                                then the hidden identity attribute
//! ```

use datalog_config::WorkspaceConfig;
use datalog_core::host::AttributeValues;
use datalog_core::tables::{DataTableData, ImportableDataTable};
use serde_json::{Value, json};

/// Full `create dataContext` definition for a first import with `columns`.
///
/// Later imports with different columns reuse whatever schema exists.
#[must_use]
pub fn data_context_definition(workspace: &WorkspaceConfig, columns: &[String]) -> Value {
    let mut attrs: Vec<Value> = columns
        .iter()
        .map(|col| json!({"name": col, "type": "numeric"}))
        .collect();
    attrs.push(json!({
        "name": workspace.identity_attribute,
        "type": "categorical",
        "hidden": true
    }));

    json!({
        "name": workspace.data_context,
        "title": workspace.title,
        "collections": [
            {
                "name": workspace.parent_collection,
                "labels": {"singleCase": "dataset", "pluralCase": "datasets"},
                "attrs": [{"name": workspace.name_attribute, "type": "categorical"}]
            },
            {
                "name": workspace.child_collection,
                "parent": workspace.parent_collection,
                "labels": {"singleCase": "data", "pluralCase": "data"},
                "attrs": attrs
            }
        ]
    })
}

/// One host item per row, in row order.
///
/// Cells map to columns by position; a row shorter than the column list
/// leaves the trailing attributes unset and extra cells are ignored. The name
/// and identity attributes are written last so a same-named column cannot
/// detach the item from its data set.
#[must_use]
pub fn materialize(
    workspace: &WorkspaceConfig,
    table: &ImportableDataTable,
    data: &DataTableData,
) -> Vec<AttributeValues> {
    data.ordered_rows()
        .into_iter()
        .map(|row| {
            let mut item = AttributeValues::new();
            for (col, cell) in table.columns.iter().zip(row) {
                item.insert(col.clone(), cell.clone());
            }
            item.insert(workspace.name_attribute.clone(), json!(table.name));
            item.insert(
                workspace.identity_attribute.clone(),
                json!(table.object_id),
            );
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheep_table() -> ImportableDataTable {
        ImportableDataTable {
            name: "Sheep Run 1".into(),
            object_id: "A".into(),
            data_table_item_id: "t1".into(),
            columns: vec!["time".into(), "sheep".into()],
        }
    }

    fn as_item(value: Value) -> AttributeValues {
        match value {
            Value::Object(map) => map,
            _ => AttributeValues::new(),
        }
    }

    #[test]
    fn sheep_rows_become_items_in_order() {
        let ws = WorkspaceConfig::default();
        let data = DataTableData::from_value(json!({"rows": {"0": [0, 10], "1": [10, 15]}})).unwrap();
        let items = materialize(&ws, &sheep_table(), &data);
        assert_eq!(
            items,
            vec![
                as_item(json!({"name": "Sheep Run 1", "__objectId": "A", "time": 0, "sheep": 10})),
                as_item(json!({"name": "Sheep Run 1", "__objectId": "A", "time": 10, "sheep": 15})),
            ]
        );
    }

    #[test]
    fn short_and_long_rows() {
        let ws = WorkspaceConfig::default();
        let data = DataTableData::from_value(json!({"rows": [[1], [2, 3, 4]]})).unwrap();
        let items = materialize(&ws, &sheep_table(), &data);
        assert_eq!(items[0].get("time"), Some(&json!(1)));
        assert_eq!(items[0].get("sheep"), None);
        assert_eq!(items[1].get("sheep"), Some(&json!(3)));
        assert_eq!(items[1].len(), 4);
    }

    #[test]
    fn name_column_does_not_override_data_set_name() {
        let ws = WorkspaceConfig::default();
        let mut table = sheep_table();
        table.columns = vec!["name".into()];
        let data = DataTableData::from_value(json!({"rows": [["shadow"]]})).unwrap();
        let items = materialize(&ws, &table, &data);
        assert_eq!(items[0].get("name"), Some(&json!("Sheep Run 1")));
    }

    #[test]
    fn definition_has_columns_in_order_then_hidden_identity() {
        let ws = WorkspaceConfig::default();
        let def = data_context_definition(&ws, &["time".into(), "sheep".into()]);
        assert_eq!(def["name"], "DatalogPluginData");
        assert_eq!(def["collections"][0]["attrs"], json!([{"name": "name", "type": "categorical"}]));
        assert_eq!(def["collections"][1]["parent"], "datasets");
        assert_eq!(
            def["collections"][1]["attrs"],
            json!([
                {"name": "time", "type": "numeric"},
                {"name": "sheep", "type": "numeric"},
                {"name": "__objectId", "type": "categorical", "hidden": true}
            ])
        );
    }
}
