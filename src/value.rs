use std::fmt;

use serde::{Deserialize, Serialize};

/// The element type of a scalar, vector or matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Bool,
    Int,
    Float,
    String,
}

impl ElementType {
    /// Whether element-wise and reduction operations accept this type.
    pub fn is_numeric(self) -> bool {
        matches!(self, ElementType::Int | ElementType::Float)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Bool => f.write_str("Bool"),
            ElementType::Int => f.write_str("Int64"),
            ElementType::Float => f.write_str("Float64"),
            ElementType::String => f.write_str("String"),
        }
    }
}

/// A single value stored in (or computed from) a data store.
///
/// # Examples
///
/// ```
/// use axis_query::{ElementType, Value};
///
/// let value = Value::Float(0.5);
/// assert_eq!(value.element_type(), ElementType::Float);
/// assert_eq!(value.as_f64(), Some(0.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn element_type(&self) -> ElementType {
        match self {
            Value::Bool(_) => ElementType::Bool,
            Value::Int(_) => ElementType::Int,
            Value::Float(_) => ElementType::Float,
            Value::String(_) => ElementType::String,
        }
    }

    /// Get as float, for numeric values only
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
        }
    }
}

/// A homogeneous column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Array {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    String(Vec<String>),
}

impl Array {
    pub fn len(&self) -> usize {
        match self {
            Array::Bool(values) => values.len(),
            Array::Int(values) => values.len(),
            Array::Float(values) => values.len(),
            Array::String(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Array::Bool(_) => ElementType::Bool,
            Array::Int(_) => ElementType::Int,
            Array::Float(_) => ElementType::Float,
            Array::String(_) => ElementType::String,
        }
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Array::Bool(values) => values.get(index).copied().map(Value::Bool),
            Array::Int(values) => values.get(index).copied().map(Value::Int),
            Array::Float(values) => values.get(index).copied().map(Value::Float),
            Array::String(values) => values.get(index).cloned().map(Value::String),
        }
    }

    /// Gather the values at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Array {
        match self {
            Array::Bool(values) => Array::Bool(indices.iter().map(|&i| values[i]).collect()),
            Array::Int(values) => Array::Int(indices.iter().map(|&i| values[i]).collect()),
            Array::Float(values) => Array::Float(indices.iter().map(|&i| values[i]).collect()),
            Array::String(values) => {
                Array::String(indices.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }

    /// A one-element array holding `value`.
    pub fn from_value(value: Value) -> Array {
        match value {
            Value::Bool(b) => Array::Bool(vec![b]),
            Value::Int(n) => Array::Int(vec![n]),
            Value::Float(x) => Array::Float(vec![x]),
            Value::String(s) => Array::String(vec![s]),
        }
    }

    /// Numeric values as floats, `None` for boolean or string arrays.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Array::Int(values) => Some(values.iter().map(|&n| n as f64).collect()),
            Array::Float(values) => Some(values.clone()),
            _ => None,
        }
    }
}

/// Convert the entries selected by a mask into their indices.
pub fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(index, _)| index)
        .collect()
}

/// A dense matrix in column-major layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub nrows: usize,
    pub ncols: usize,
    pub values: Array,
}

impl Matrix {
    /// Returns `None` unless `values` holds exactly `nrows * ncols` elements.
    pub fn new(nrows: usize, ncols: usize, values: Array) -> Option<Self> {
        (values.len() == nrows * ncols).then_some(Matrix {
            nrows,
            ncols,
            values,
        })
    }

    pub fn get(&self, row: usize, column: usize) -> Option<Value> {
        if row >= self.nrows || column >= self.ncols {
            return None;
        }
        self.values.get(column * self.nrows + row)
    }

    pub fn column(&self, column: usize) -> Array {
        let indices: Vec<usize> = (0..self.nrows).map(|row| column * self.nrows + row).collect();
        self.values.select(&indices)
    }

    /// Keep only the listed rows and columns.
    pub fn select(&self, rows: &[usize], columns: &[usize]) -> Matrix {
        let indices: Vec<usize> = columns
            .iter()
            .flat_map(|&column| rows.iter().map(move |&row| column * self.nrows + row))
            .collect();
        Matrix {
            nrows: rows.len(),
            ncols: columns.len(),
            values: self.values.select(&indices),
        }
    }

    pub fn transpose(&self) -> Matrix {
        let indices: Vec<usize> = (0..self.nrows)
            .flat_map(|row| (0..self.ncols).map(move |column| column * self.nrows + row))
            .collect();
        Matrix {
            nrows: self.ncols,
            ncols: self.nrows,
            values: self.values.select(&indices),
        }
    }
}

/// A vector tagged with its axis and entry names.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedVector {
    pub axis: String,
    pub entries: Vec<String>,
    pub values: Array,
}

impl NamedVector {
    /// The value of a named entry.
    pub fn get(&self, entry: &str) -> Option<Value> {
        let index = self.entries.iter().position(|name| name == entry)?;
        self.values.get(index)
    }
}

/// A matrix tagged with both axes and their entry names.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMatrix {
    pub rows_axis: String,
    pub columns_axis: String,
    pub row_entries: Vec<String>,
    pub column_entries: Vec<String>,
    pub matrix: Matrix,
}

impl NamedMatrix {
    /// The value at a named row and column.
    pub fn get(&self, row: &str, column: &str) -> Option<Value> {
        let row = self.row_entries.iter().position(|name| name == row)?;
        let column = self.column_entries.iter().position(|name| name == column)?;
        self.matrix.get(row, column)
    }
}

/// The result of a query of any arity.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Scalar(Value),
    Vector(NamedVector),
    Matrix(NamedMatrix),
}
