//! Schema inference from sampled records.
//!
//! Candidate columns are the union of keys across the sampled records, in
//! first-seen order. The column type comes from the first non-null value
//! observed for the key; a key that is always null or absent defaults to
//! `Text`.

use super::{ColumnDef, TableSchema};
use crate::core::{ApiError, DataType, Result};
use serde_json::{Map, Value as JsonValue};

pub fn infer_table_schema(
    table: &str,
    records: &[Map<String, JsonValue>],
) -> Result<TableSchema> {
    if records.is_empty() {
        return Err(ApiError::Schema(format!(
            "endpoint for table '{}' returned no records to infer a schema from",
            table
        )));
    }

    let mut order: Vec<String> = Vec::new();
    let mut types: Vec<Option<DataType>> = Vec::new();
    let mut seen_null: Vec<bool> = Vec::new();

    for record in records {
        for (key, value) in record {
            let idx = match order.iter().position(|k| k == key) {
                Some(idx) => idx,
                None => {
                    order.push(key.clone());
                    types.push(None);
                    seen_null.push(false);
                    order.len() - 1
                }
            };

            if value.is_null() {
                seen_null[idx] = true;
            } else if types[idx].is_none() {
                types[idx] = Some(infer_type_from_value(value));
            }
        }
    }

    let columns = order
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let data_type = types[idx].unwrap_or(DataType::Text);
            let absent_somewhere = records.iter().any(|r| !r.contains_key(&name));
            let column = ColumnDef::new(name, data_type);
            if seen_null[idx] || absent_somewhere {
                column
            } else {
                column.not_null()
            }
        })
        .collect();

    Ok(TableSchema::new(table, columns))
}

/// Map a JSON value onto the connector's type enumeration.
pub fn infer_type_from_value(value: &JsonValue) -> DataType {
    match value {
        JsonValue::Null => DataType::Text,
        JsonValue::Bool(_) => DataType::Boolean,
        JsonValue::Number(n) => {
            if n.is_i64() {
                DataType::Integer
            } else {
                DataType::Float
            }
        }
        JsonValue::String(_) => DataType::Text,
        // Nested structures are flattened to JSON strings at projection time
        JsonValue::Array(_) | JsonValue::Object(_) => DataType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(docs: &[JsonValue]) -> Vec<Map<String, JsonValue>> {
        docs.iter()
            .map(|d| d.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_union_of_keys_first_seen_order() {
        let docs = records(&[
            json!({"id": 1, "name": "a"}),
            json!({"id": 2, "email": "b@example.com"}),
        ]);

        let schema = infer_table_schema("users", &docs).unwrap();
        assert_eq!(schema.column_names(), vec!["id", "name", "email"]);
    }

    #[test]
    fn test_type_from_first_non_null() {
        let docs = records(&[
            json!({"score": null, "active": true}),
            json!({"score": 9.5, "active": false}),
        ]);

        let schema = infer_table_schema("players", &docs).unwrap();
        assert_eq!(schema.column("score").unwrap().data_type, DataType::Float);
        assert_eq!(
            schema.column("active").unwrap().data_type,
            DataType::Boolean
        );
    }

    #[test]
    fn test_all_null_defaults_to_text() {
        let docs = records(&[json!({"note": null}), json!({"note": null})]);

        let schema = infer_table_schema("t", &docs).unwrap();
        let note = schema.column("note").unwrap();
        assert_eq!(note.data_type, DataType::Text);
        assert!(note.nullable);
    }

    #[test]
    fn test_nullability() {
        let docs = records(&[
            json!({"id": 1, "name": "a"}),
            json!({"id": 2}),
        ]);

        let schema = infer_table_schema("t", &docs).unwrap();
        assert!(!schema.column("id").unwrap().nullable);
        assert!(schema.column("name").unwrap().nullable);
    }

    #[test]
    fn test_nested_values_infer_text() {
        let docs = records(&[json!({"tags": ["a", "b"], "meta": {"k": 1}})]);

        let schema = infer_table_schema("t", &docs).unwrap();
        assert_eq!(schema.column("tags").unwrap().data_type, DataType::Text);
        assert_eq!(schema.column("meta").unwrap().data_type, DataType::Text);
    }

    #[test]
    fn test_empty_sample_fails() {
        let err = infer_table_schema("t", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Schema(_)));
    }

    #[test]
    fn test_infer_type_from_value() {
        assert_eq!(infer_type_from_value(&json!(42)), DataType::Integer);
        assert_eq!(infer_type_from_value(&json!(3.5)), DataType::Float);
        assert_eq!(infer_type_from_value(&json!("hi")), DataType::Text);
        assert_eq!(infer_type_from_value(&json!(true)), DataType::Boolean);
        assert_eq!(infer_type_from_value(&json!(null)), DataType::Text);
    }
}
