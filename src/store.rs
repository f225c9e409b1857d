//! Data stores queries are evaluated against.
//!
//! The evaluator only needs read access through the [`DataStore`] trait.
//! [`MemoryStore`] is a simple implementation holding everything in memory,
//! which can also be loaded from a JSON document:
//!
//! ```json
//! {
//!   "name": "pbmc",
//!   "scalars": { "version": 2 },
//!   "axes": { "cell": ["C1", "C2"], "gene": ["FOX1", "CD4", "RPL1"] },
//!   "vectors": { "gene": { "marker": [true, false, true] } },
//!   "matrices": [
//!     { "rows": "cell", "columns": "gene", "name": "UMIs",
//!       "values": [[0, 1, 7], [3, 0, 5]] }
//!   ]
//! }
//! ```
//!
//! Matrix values in JSON are listed row by row.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

use crate::value::{Array, Matrix, Value};

/// Read access to scalars, axes, vectors and matrices.
///
/// Matrices are keyed by an unordered pair of axes: asking for
/// `(columns, rows)` of a matrix stored as `(rows, columns)` returns its
/// transpose.
pub trait DataStore {
    /// Identifies the store in error messages.
    fn name(&self) -> &str;

    fn has_axis(&self, axis: &str) -> bool;

    /// The unique entry names of an axis, in order.
    fn axis_entries(&self, axis: &str) -> Option<&[String]>;

    fn axis_length(&self, axis: &str) -> Option<usize> {
        self.axis_entries(axis).map(<[String]>::len)
    }

    fn has_scalar(&self, name: &str) -> bool;

    fn get_scalar(&self, name: &str) -> Option<Value>;

    fn has_vector(&self, axis: &str, name: &str) -> bool;

    /// Values aligned with [`DataStore::axis_entries`].
    fn get_vector(&self, axis: &str, name: &str) -> Option<Array>;

    fn has_matrix(&self, rows_axis: &str, columns_axis: &str, name: &str) -> bool;

    /// Column-major values with one row per entry of `rows_axis`.
    fn get_matrix(&self, rows_axis: &str, columns_axis: &str, name: &str) -> Option<Matrix>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("existing axis: {axis}\nin the data: {store}")]
    ExistingAxis { axis: String, store: String },

    #[error("non-unique entry: {entry}\nof the axis: {axis}\nin the data: {store}")]
    DuplicateEntry {
        entry: String,
        axis: String,
        store: String,
    },

    #[error("missing axis: {axis}\nin the data: {store}")]
    MissingAxis { axis: String, store: String },

    #[error("{message}\nin the data: {store}")]
    Shape { message: String, store: String },
}

/// An in-memory [`DataStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    name: String,
    scalars: BTreeMap<String, Value>,
    axes: BTreeMap<String, Vec<String>>,
    vectors: BTreeMap<String, BTreeMap<String, Array>>,
    matrices: BTreeMap<(String, String), BTreeMap<String, Matrix>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryStore {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn set_scalar(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.scalars.insert(name.into(), value);
        self
    }

    pub fn add_axis<S: Into<String>>(
        &mut self,
        axis: impl Into<String>,
        entries: impl IntoIterator<Item = S>,
    ) -> Result<&mut Self, StoreError> {
        let axis = axis.into();
        if self.axes.contains_key(&axis) {
            return Err(StoreError::ExistingAxis {
                axis,
                store: self.name.clone(),
            });
        }
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.as_str()) {
                return Err(StoreError::DuplicateEntry {
                    entry: entry.clone(),
                    axis,
                    store: self.name.clone(),
                });
            }
        }
        self.axes.insert(axis, entries);
        Ok(self)
    }

    fn require_axis_length(&self, axis: &str) -> Result<usize, StoreError> {
        self.axis_length(axis).ok_or_else(|| StoreError::MissingAxis {
            axis: axis.to_string(),
            store: self.name.clone(),
        })
    }

    pub fn set_vector(
        &mut self,
        axis: &str,
        name: impl Into<String>,
        values: Array,
    ) -> Result<&mut Self, StoreError> {
        let name = name.into();
        let length = self.require_axis_length(axis)?;
        if values.len() != length {
            return Err(StoreError::Shape {
                message: format!(
                    "vector: {} has length: {} instead of the length: {} of the axis: {}",
                    name,
                    values.len(),
                    length,
                    axis
                ),
                store: self.name.clone(),
            });
        }
        self.vectors
            .entry(axis.to_string())
            .or_default()
            .insert(name, values);
        Ok(self)
    }

    pub fn set_matrix(
        &mut self,
        rows_axis: &str,
        columns_axis: &str,
        name: impl Into<String>,
        matrix: Matrix,
    ) -> Result<&mut Self, StoreError> {
        let name = name.into();
        let nrows = self.require_axis_length(rows_axis)?;
        let ncols = self.require_axis_length(columns_axis)?;
        if (matrix.nrows, matrix.ncols) != (nrows, ncols) {
            return Err(StoreError::Shape {
                message: format!(
                    "matrix: {} has shape: {} x {} instead of: {} x {} for the axes: {} , {}",
                    name, matrix.nrows, matrix.ncols, nrows, ncols, rows_axis, columns_axis
                ),
                store: self.name.clone(),
            });
        }
        let key = (rows_axis.to_string(), columns_axis.to_string());
        // The unordered pair is stored once.
        if let Some(flipped) = self
            .matrices
            .get_mut(&(columns_axis.to_string(), rows_axis.to_string()))
        {
            flipped.remove(&name);
        }
        self.matrices.entry(key).or_default().insert(name, matrix);
        Ok(self)
    }

    /// Load a store from its JSON description (see the module documentation).
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let file: StoreFile = serde_json::from_str(json)?;
        let mut store = MemoryStore::new(file.name);
        for (axis, entries) in file.axes {
            store.add_axis(axis, entries)?;
        }
        for (name, value) in file.scalars {
            store.set_scalar(name, value);
        }
        for (axis, vectors) in file.vectors {
            for (name, values) in vectors {
                store.set_vector(&axis, name, values)?;
            }
        }
        for entry in file.matrices {
            let matrix = entry.values.into_matrix().ok_or_else(|| StoreError::Shape {
                message: format!("ragged rows in the matrix: {}", entry.name),
                store: store.name.clone(),
            })?;
            store.set_matrix(&entry.rows, &entry.columns, entry.name, matrix)?;
        }
        tracing::debug!(store = %store.name, axes = store.axes.len(), "loaded store from JSON");
        Ok(store)
    }
}

impl DataStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_axis(&self, axis: &str) -> bool {
        self.axes.contains_key(axis)
    }

    fn axis_entries(&self, axis: &str) -> Option<&[String]> {
        self.axes.get(axis).map(Vec::as_slice)
    }

    fn has_scalar(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    fn get_scalar(&self, name: &str) -> Option<Value> {
        self.scalars.get(name).cloned()
    }

    fn has_vector(&self, axis: &str, name: &str) -> bool {
        self.vectors
            .get(axis)
            .is_some_and(|vectors| vectors.contains_key(name))
    }

    fn get_vector(&self, axis: &str, name: &str) -> Option<Array> {
        self.vectors.get(axis)?.get(name).cloned()
    }

    fn has_matrix(&self, rows_axis: &str, columns_axis: &str, name: &str) -> bool {
        let lookup = |rows: &str, columns: &str| {
            self.matrices
                .get(&(rows.to_string(), columns.to_string()))
                .is_some_and(|matrices| matrices.contains_key(name))
        };
        lookup(rows_axis, columns_axis) || lookup(columns_axis, rows_axis)
    }

    fn get_matrix(&self, rows_axis: &str, columns_axis: &str, name: &str) -> Option<Matrix> {
        let stored = |rows: &str, columns: &str| {
            self.matrices
                .get(&(rows.to_string(), columns.to_string()))
                .and_then(|matrices| matrices.get(name))
        };
        if let Some(matrix) = stored(rows_axis, columns_axis) {
            return Some(matrix.clone());
        }
        stored(columns_axis, rows_axis).map(Matrix::transpose)
    }
}

#[derive(Deserialize)]
struct StoreFile {
    name: String,
    #[serde(default)]
    scalars: BTreeMap<String, Value>,
    #[serde(default)]
    axes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    vectors: BTreeMap<String, BTreeMap<String, Array>>,
    #[serde(default)]
    matrices: Vec<MatrixEntry>,
}

#[derive(Deserialize)]
struct MatrixEntry {
    rows: String,
    columns: String,
    name: String,
    values: RowMajor,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RowMajor {
    Bool(Vec<Vec<bool>>),
    Int(Vec<Vec<i64>>),
    Float(Vec<Vec<f64>>),
    String(Vec<Vec<String>>),
}

impl RowMajor {
    fn into_matrix(self) -> Option<Matrix> {
        fn column_major<T: Clone>(rows: Vec<Vec<T>>) -> Option<(usize, usize, Vec<T>)> {
            let nrows = rows.len();
            let ncols = rows.first().map_or(0, Vec::len);
            if rows.iter().any(|row| row.len() != ncols) {
                return None;
            }
            let values = (0..ncols)
                .flat_map(|column| rows.iter().map(move |row| row[column].clone()))
                .collect();
            Some((nrows, ncols, values))
        }

        let (nrows, ncols, values) = match self {
            RowMajor::Bool(rows) => column_major(rows).map(|(r, c, v)| (r, c, Array::Bool(v)))?,
            RowMajor::Int(rows) => column_major(rows).map(|(r, c, v)| (r, c, Array::Int(v)))?,
            RowMajor::Float(rows) => column_major(rows).map(|(r, c, v)| (r, c, Array::Float(v)))?,
            RowMajor::String(rows) => {
                column_major(rows).map(|(r, c, v)| (r, c, Array::String(v)))?
            }
        };
        Matrix::new(nrows, ncols, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "name": "tiny",
        "scalars": { "version": 2 },
        "axes": { "cell": ["C1", "C2"], "gene": ["FOX1", "CD4", "RPL1"] },
        "vectors": { "gene": { "marker": [true, false, true] } },
        "matrices": [
            { "rows": "cell", "columns": "gene", "name": "UMIs", "values": [[0, 1, 7], [3, 0, 5]] }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let store = MemoryStore::from_json(JSON).unwrap();
        assert_eq!(store.name(), "tiny");
        assert_eq!(store.get_scalar("version"), Some(Value::Int(2)));
        assert_eq!(store.axis_length("gene"), Some(3));
        assert_eq!(
            store.get_vector("gene", "marker"),
            Some(Array::Bool(vec![true, false, true]))
        );
        let umis = store.get_matrix("cell", "gene", "UMIs").unwrap();
        assert_eq!(umis.get(0, 2), Some(Value::Int(7)));
        assert_eq!(umis.get(1, 0), Some(Value::Int(3)));
    }

    #[test]
    fn test_matrix_axes_are_unordered() {
        let store = MemoryStore::from_json(JSON).unwrap();
        assert!(store.has_matrix("gene", "cell", "UMIs"));
        let flipped = store.get_matrix("gene", "cell", "UMIs").unwrap();
        assert_eq!((flipped.nrows, flipped.ncols), (3, 2));
        assert_eq!(flipped.get(2, 0), Some(Value::Int(7)));
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let mut store = MemoryStore::new("bad");
        let error = store.add_axis("cell", ["C1", "C1"]).unwrap_err();
        assert!(matches!(error, StoreError::DuplicateEntry { .. }));
    }

    #[test]
    fn test_vector_length_checked() {
        let mut store = MemoryStore::new("bad");
        store.add_axis("cell", ["C1", "C2"]).unwrap();
        let error = store
            .set_vector("cell", "age", Array::Int(vec![1]))
            .unwrap_err();
        assert!(matches!(error, StoreError::Shape { .. }));
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let json = r#"{
            "name": "ragged",
            "axes": { "a": ["x", "y"], "b": ["z"] },
            "matrices": [ { "rows": "a", "columns": "b", "name": "m", "values": [[1], []] } ]
        }"#;
        assert!(matches!(
            MemoryStore::from_json(json).unwrap_err(),
            StoreError::Shape { .. }
        ));
    }
}
