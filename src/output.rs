//! JSON output of query results.
//!
//! Results are converted to a `serde_json` document and printed either
//! compactly or with 2-space indentation. Absence (a filter masking out every
//! entry of an axis) is printed as `null`, and so are non-finite floats.
//!
//! # Examples
//!
//! ```
//! use axis_query::{QueryResult, Value};
//! use axis_query::output::to_json;
//!
//! let result = QueryResult::Scalar(Value::Int(42));
//! assert_eq!(to_json(Some(&result)), r#"{"type":"scalar","value":42}"#);
//! assert_eq!(to_json(None), "null");
//! ```
//!
//! Vectors list their axis and entries next to the values. Matrices list
//! their values row by row:
//!
//! ```text
//! {
//!   "type": "matrix",
//!   "rows_axis": "cell",
//!   "columns_axis": "gene",
//!   "row_entries": ["C1", "C2"],
//!   "column_entries": ["FOX1", "CD4"],
//!   "values": [[0, 1], [3, 0]]
//! }
//! ```

use serde_json::{Map, json};

use crate::value::{Array, NamedMatrix, NamedVector, QueryResult, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, result: Option<&QueryResult>) -> String {
        let document = match result {
            None => serde_json::Value::Null,
            Some(result) => result_json(result),
        };
        let printed = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        // A `serde_json::Value` always serializes.
        printed.unwrap_or_default()
    }
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(x) => serde_json::Value::from(*x),
        Value::String(s) => serde_json::Value::String(s.clone()),
    }
}

fn array_json(array: &Array) -> serde_json::Value {
    let values = (0..array.len())
        .filter_map(|index| array.get(index))
        .map(|value| value_json(&value))
        .collect();
    serde_json::Value::Array(values)
}

fn vector_json(vector: &NamedVector) -> serde_json::Value {
    json!({
        "type": "vector",
        "axis": vector.axis,
        "entries": vector.entries,
        "values": array_json(&vector.values),
    })
}

fn matrix_json(named: &NamedMatrix) -> serde_json::Value {
    let matrix = &named.matrix;
    let rows: Vec<serde_json::Value> = (0..matrix.nrows)
        .map(|row| {
            let values = (0..matrix.ncols)
                .filter_map(|column| matrix.get(row, column))
                .map(|value| value_json(&value))
                .collect();
            serde_json::Value::Array(values)
        })
        .collect();
    json!({
        "type": "matrix",
        "rows_axis": named.rows_axis,
        "columns_axis": named.columns_axis,
        "row_entries": named.row_entries,
        "column_entries": named.column_entries,
        "values": rows,
    })
}

fn result_json(result: &QueryResult) -> serde_json::Value {
    match result {
        QueryResult::Scalar(value) => {
            let mut object = Map::new();
            object.insert("type".to_string(), json!("scalar"));
            object.insert("value".to_string(), value_json(value));
            serde_json::Value::Object(object)
        }
        QueryResult::Vector(vector) => vector_json(vector),
        QueryResult::Matrix(matrix) => matrix_json(matrix),
    }
}

/// Converts a result to compact JSON.
pub fn to_json(result: Option<&QueryResult>) -> String {
    JsonPrinter::new(false).print(result)
}

/// Converts a result to JSON with 2-space indentation.
pub fn to_json_pretty(result: Option<&QueryResult>) -> String {
    JsonPrinter::new(true).print(result)
}
