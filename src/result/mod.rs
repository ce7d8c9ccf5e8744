//! Tabular query results.

use crate::core::{ApiError, Result, Row, Value};
use crate::parser::ast::Projection;
use crate::schema::{ColumnDef, TableSchema};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<ColumnDef>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|col| col.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|col| col.name == column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn print(&self) {
        if self.columns.is_empty() {
            println!("Empty result set");
            return;
        }

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.name.len()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.to_string().len());
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{:width$}", col.name, width = widths[i]))
            .collect();
        println!("{}", header.join(" | "));

        let separator: String = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");
        println!("{}", separator);

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, val)| format!("{:width$}", val.to_string(), width = widths[i]))
                .collect();
            println!("{}", cells.join(" | "));
        }

        println!("\n{} row(s)", self.rows.len());
    }
}

/// Project response records onto the cached column set.
///
/// Missing keys become `Null`, keys outside the schema are dropped, and
/// the row count is capped at `limit`.
pub(crate) fn project_rows(
    schema: &TableSchema,
    projection: &Projection,
    records: &[Map<String, JsonValue>],
    limit: usize,
) -> Result<QueryResult> {
    let columns: Vec<ColumnDef> = match projection {
        Projection::Wildcard => schema.columns().to_vec(),
        Projection::Columns(names) => names
            .iter()
            .map(|name| {
                schema.column(name).cloned().ok_or_else(|| {
                    ApiError::Schema(format!(
                        "column '{}' not found in table '{}'",
                        name,
                        schema.name()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    let rows = records
        .iter()
        .take(limit)
        .map(|record| {
            columns
                .iter()
                .map(|col| {
                    record
                        .get(&col.name)
                        .map(Value::from_json)
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    Ok(QueryResult::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use serde_json::json;

    fn schema() -> TableSchema {
        TableSchema::new(
            "users",
            vec![
                ColumnDef::new("id", DataType::Integer),
                ColumnDef::new("name", DataType::Text),
            ],
        )
    }

    fn records(docs: &[JsonValue]) -> Vec<Map<String, JsonValue>> {
        docs.iter()
            .map(|d| d.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_missing_key_becomes_null() {
        let docs = records(&[json!({"id": 1})]);
        let result = project_rows(&schema(), &Projection::Wildcard, &docs, 100).unwrap();

        assert_eq!(result.rows()[0], vec![Value::Integer(1), Value::Null]);
    }

    #[test]
    fn test_extra_keys_dropped() {
        let docs = records(&[json!({"id": 1, "name": "a", "surprise": true})]);
        let result = project_rows(&schema(), &Projection::Wildcard, &docs, 100).unwrap();

        assert_eq!(result.column_names(), vec!["id", "name"]);
        assert_eq!(result.rows()[0].len(), 2);
    }

    #[test]
    fn test_column_subset_projection() {
        let docs = records(&[json!({"id": 1, "name": "a"})]);
        let projection = Projection::Columns(vec!["name".into()]);
        let result = project_rows(&schema(), &projection, &docs, 100).unwrap();

        assert_eq!(result.column_names(), vec!["name"]);
        assert_eq!(result.rows()[0], vec![Value::Text("a".into())]);
    }

    #[test]
    fn test_unknown_projected_column_fails() {
        let docs = records(&[json!({"id": 1})]);
        let projection = Projection::Columns(vec!["email".into()]);
        let err = project_rows(&schema(), &projection, &docs, 100).unwrap_err();

        assert!(matches!(err, ApiError::Schema(_)));
    }

    #[test]
    fn test_limit_truncates() {
        let docs = records(&[
            json!({"id": 1, "name": "a"}),
            json!({"id": 2, "name": "b"}),
            json!({"id": 3, "name": "c"}),
        ]);
        let result = project_rows(&schema(), &Projection::Wildcard, &docs, 2).unwrap();

        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn test_get_by_name() {
        let docs = records(&[json!({"id": 7, "name": "x"})]);
        let result = project_rows(&schema(), &Projection::Wildcard, &docs, 100).unwrap();

        assert_eq!(result.get(0, "id"), Some(&Value::Integer(7)));
        assert_eq!(result.get(0, "missing"), None);
    }
}
