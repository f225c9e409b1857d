use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

use crate::{
    ast::{
        AxisEntry, AxisLookup, ComparisonOperator, EltwiseOperation, FilteredAxis, MatrixQuery,
        PropertyComparison, PropertyLookup, Query, ReductionOperation, ScalarDataLookup,
        ScalarQuery, VectorDataLookup, VectorQuery,
    },
    registry::{OperationKind, OperationRegistry},
    store::DataStore,
    value::{Array, ElementType, Matrix, NamedMatrix, NamedVector, QueryResult, Value, mask_indices},
};

/// The reserved vector property holding the entry names of an axis.
pub const NAME_PROPERTY: &str = "name";

/// Errors that can occur during query evaluation.
///
/// Every variant names the data store the query was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Reference to an axis the store does not have
    #[error("missing axis: {axis}\nin the data: {store}")]
    MissingAxis { axis: String, store: String },

    /// Reference to a scalar, vector or matrix the store does not have
    #[error("missing {property}\nin the data: {store}")]
    MissingProperty { property: String, store: String },

    /// Reference to an entry its axis does not have
    #[error("missing entry: {entry}\nof the axis: {axis}\nin the data: {store}")]
    MissingEntry {
        entry: String,
        axis: String,
        store: String,
    },

    /// A value of the wrong type for the requested operation
    #[error("{message}\nin the data: {store}")]
    TypeMismatch { message: String, store: String },

    /// A chained lookup value that is not an entry of the next axis
    #[error(
        "invalid value: {value}\nof the chained property: {property}\nof the axis: {axis}\nis missing from the fetched axis: {target_axis}\nin the data: {store}"
    )]
    ChainResolution {
        value: String,
        property: String,
        axis: String,
        target_axis: String,
        store: String,
    },

    /// An operation missing from the registry used for evaluation
    #[error("unknown {kind} operation: {operation}")]
    UnknownOperation {
        kind: OperationKind,
        operation: String,
    },
}

/// Evaluates parsed queries against a data store.
///
/// The evaluator only borrows the store and the registry, so any number of
/// queries may be evaluated against the same snapshot.
///
/// # Examples
///
/// ```
/// use axis_query::{Evaluator, MemoryStore, VectorQuery, registry::OperationRegistry};
/// use axis_query::value::Array;
///
/// let mut store = MemoryStore::new("example");
/// store.add_axis("gene", ["A", "B", "C"]).unwrap();
/// store.set_vector("gene", "score", Array::Float(vec![0.1, 0.9, 0.5])).unwrap();
///
/// let registry = OperationRegistry::default();
/// let query = VectorQuery::parse("gene @ score > 0.4", &registry).unwrap();
/// let result = Evaluator::new(&store, &registry).eval_vector(&query).unwrap().unwrap();
/// assert_eq!(result.values, Array::Bool(vec![false, true, true]));
/// ```
pub struct Evaluator<'a, S: DataStore + ?Sized> {
    store: &'a S,
    registry: &'a OperationRegistry,
}

impl<'a, S: DataStore + ?Sized> Evaluator<'a, S> {
    pub fn new(store: &'a S, registry: &'a OperationRegistry) -> Self {
        Evaluator { store, registry }
    }

    /// Evaluate a query of any arity. `Ok(None)` means a filter masked out
    /// every entry of an axis.
    pub fn eval(&self, query: &Query) -> Result<Option<QueryResult>, EvalError> {
        tracing::debug!(store = %self.store.name(), query = %query, "evaluating query");
        Ok(match query {
            Query::Scalar(query) => self.eval_scalar(query)?.map(QueryResult::Scalar),
            Query::Vector(query) => self.eval_vector(query)?.map(QueryResult::Vector),
            Query::Matrix(query) => self.eval_matrix(query)?.map(QueryResult::Matrix),
        })
    }

    pub fn eval_scalar(&self, query: &ScalarQuery) -> Result<Option<Value>, EvalError> {
        let (value, eltwise) = match query {
            ScalarQuery::Lookup { lookup, eltwise } => (self.scalar_lookup(lookup)?, eltwise),
            ScalarQuery::Reduction {
                vector,
                reduction,
                eltwise,
            } => {
                let Some(vector) = self.eval_vector(vector)? else {
                    return Ok(None);
                };
                let values = self.numeric(&vector.values, &reduction.name)?;
                (Value::Float(self.reduce(reduction, &values)?), eltwise)
            }
        };
        if eltwise.is_empty() {
            return Ok(Some(value));
        }
        let values = self.numeric(&Array::from_value(value), &eltwise[0].name)?;
        let values = self.apply_eltwise(eltwise, values)?;
        Ok(Some(Value::Float(values[0])))
    }

    pub fn eval_vector(&self, query: &VectorQuery) -> Result<Option<NamedVector>, EvalError> {
        let (vector, eltwise) = match query {
            VectorQuery::Lookup { lookup, eltwise } => match self.vector_lookup(lookup)? {
                Some(vector) => (vector, eltwise),
                None => return Ok(None),
            },
            VectorQuery::Reduction {
                matrix,
                reduction,
                eltwise,
            } => {
                let Some(matrix) = self.eval_matrix(matrix)? else {
                    return Ok(None);
                };
                (self.reduce_matrix(reduction, matrix)?, eltwise)
            }
        };
        if eltwise.is_empty() {
            return Ok(Some(vector));
        }
        let values = self.numeric(&vector.values, &eltwise[0].name)?;
        Ok(Some(NamedVector {
            values: Array::Float(self.apply_eltwise(eltwise, values)?),
            ..vector
        }))
    }

    pub fn eval_matrix(&self, query: &MatrixQuery) -> Result<Option<NamedMatrix>, EvalError> {
        let Some(named) = self.matrix_lookup(query)? else {
            return Ok(None);
        };
        if query.eltwise.is_empty() {
            return Ok(Some(named));
        }
        let values = self.numeric(&named.matrix.values, &query.eltwise[0].name)?;
        let values = Array::Float(self.apply_eltwise(&query.eltwise, values)?);
        Ok(Some(NamedMatrix {
            matrix: Matrix {
                values,
                ..named.matrix
            },
            ..named
        }))
    }

    // ========================================
    // Errors
    // ========================================

    fn store_name(&self) -> String {
        self.store.name().to_string()
    }

    fn type_mismatch(&self, message: String) -> EvalError {
        EvalError::TypeMismatch {
            message,
            store: self.store_name(),
        }
    }

    fn missing_property(&self, property: String) -> EvalError {
        EvalError::MissingProperty {
            property,
            store: self.store_name(),
        }
    }

    // ========================================
    // Axes
    // ========================================

    fn axis_entries(&self, axis: &str) -> Result<&'a [String], EvalError> {
        self.store
            .axis_entries(axis)
            .ok_or_else(|| EvalError::MissingAxis {
                axis: axis.to_string(),
                store: self.store_name(),
            })
    }

    fn entry_index(&self, entry: &AxisEntry) -> Result<usize, EvalError> {
        self.axis_entries(&entry.axis)?
            .iter()
            .position(|name| *name == entry.entry)
            .ok_or_else(|| EvalError::MissingEntry {
                entry: entry.entry.clone(),
                axis: entry.axis.clone(),
                store: self.store_name(),
            })
    }

    /// The mask of a filtered axis, `None` when it has no filters.
    ///
    /// Filters combine strictly left to right, in the order written.
    fn axis_mask(&self, axis: &FilteredAxis) -> Result<Option<Vec<bool>>, EvalError> {
        let length = self.axis_entries(&axis.axis)?.len();
        if axis.filters.is_empty() {
            return Ok(None);
        }
        let mut mask = vec![true; length];
        for filter in &axis.filters {
            let values = self.axis_lookup(&axis.axis, &filter.lookup)?;
            let Array::Bool(values) = values else {
                return Err(self.type_mismatch(format!(
                    "non-Bool filter: {}\nof the axis: {}\nhas type: {}",
                    filter.lookup,
                    axis.axis,
                    values.element_type()
                )));
            };
            for (keep, value) in mask.iter_mut().zip(values) {
                *keep = filter.operator.combine(*keep, value);
            }
        }
        tracing::trace!(axis = %axis.axis, selected = mask.iter().filter(|keep| **keep).count(), "computed mask");
        Ok(Some(mask))
    }

    /// Indices selected by a filtered axis, `None` if nothing is selected.
    fn axis_indices(&self, axis: &FilteredAxis) -> Result<Option<Vec<usize>>, EvalError> {
        let indices = match self.axis_mask(axis)? {
            None => (0..self.axis_entries(&axis.axis)?.len()).collect(),
            Some(mask) => {
                if !mask.contains(&true) {
                    tracing::debug!(axis = %axis.axis, "filters selected no entries");
                    return Ok(None);
                }
                mask_indices(&mask)
            }
        };
        Ok(Some(indices))
    }

    // ========================================
    // Properties
    // ========================================

    fn vector_property(&self, axis: &str, name: &str) -> Result<Array, EvalError> {
        let entries = self.axis_entries(axis)?;
        if name == NAME_PROPERTY {
            return Ok(Array::String(entries.to_vec()));
        }
        tracing::trace!(axis, property = name, "fetching vector");
        self.store
            .get_vector(axis, name)
            .ok_or_else(|| self.missing_property(format!("vector: {}\nof the axis: {}", name, axis)))
    }

    /// The axis a chained property refers to: the axis with the same name,
    /// or the part of the name before the first `.`.
    fn chained_axis<'p>(&self, property: &'p str) -> Result<&'p str, EvalError> {
        if self.store.has_axis(property) {
            return Ok(property);
        }
        if let Some((prefix, _)) = property.split_once('.')
            && self.store.has_axis(prefix)
        {
            return Ok(prefix);
        }
        Err(EvalError::MissingAxis {
            axis: property.to_string(),
            store: self.store_name(),
        })
    }

    /// Follow the rest of a property chain starting from `values`, which are
    /// the values of the first property of `lookup` on `axis`.
    fn resolve_chain(&self, axis: &str, lookup: &PropertyLookup, mut values: Array) -> Result<Array, EvalError> {
        let mut current_axis = axis.to_string();
        for step in lookup.names.windows(2) {
            let (property, next_property) = (&step[0], &step[1]);
            let Array::String(names) = &values else {
                return Err(self.type_mismatch(format!(
                    "non-String chained property: {}\nof the axis: {}\nhas type: {}",
                    property,
                    current_axis,
                    values.element_type()
                )));
            };

            let target_axis = self.chained_axis(property)?;
            let positions: HashMap<&str, usize> = self
                .axis_entries(target_axis)?
                .iter()
                .enumerate()
                .map(|(index, name)| (name.as_str(), index))
                .collect();
            let mut indices = Vec::with_capacity(names.len());
            for name in names {
                let Some(index) = positions.get(name.as_str()) else {
                    return Err(EvalError::ChainResolution {
                        value: name.clone(),
                        property: property.clone(),
                        axis: current_axis,
                        target_axis: target_axis.to_string(),
                        store: self.store_name(),
                    });
                };
                indices.push(*index);
            }

            values = self.vector_property(target_axis, next_property)?.select(&indices);
            current_axis = target_axis.to_string();
        }
        Ok(values)
    }

    /// Values of an axis lookup for every entry of `axis`.
    fn axis_lookup(&self, axis: &str, lookup: &AxisLookup) -> Result<Array, EvalError> {
        let values = self.vector_property(axis, lookup.property.first())?;
        let values = self.resolve_chain(axis, &lookup.property, values)?;
        self.finish_axis_lookup(axis, lookup, values)
    }

    /// Apply the inversion or comparison of an axis lookup.
    fn finish_axis_lookup(&self, axis: &str, lookup: &AxisLookup, values: Array) -> Result<Array, EvalError> {
        if lookup.inverted {
            return match values {
                Array::Bool(values) => Ok(Array::Bool(values.into_iter().map(|value| !value).collect())),
                values => Err(self.type_mismatch(format!(
                    "non-Bool inverted property: {}\nof the axis: {}\nhas type: {}",
                    lookup.property,
                    axis,
                    values.element_type()
                ))),
            };
        }
        match &lookup.comparison {
            None => Ok(values),
            Some(comparison) => Ok(Array::Bool(self.compare(axis, &lookup.property, &values, comparison)?)),
        }
    }

    fn compare(
        &self,
        axis: &str,
        property: &PropertyLookup,
        values: &Array,
        comparison: &PropertyComparison,
    ) -> Result<Vec<bool>, EvalError> {
        let operator = comparison.operator;
        let literal = comparison.value.as_str();

        if operator.is_regex() {
            let Array::String(values) = values else {
                return Err(self.type_mismatch(format!(
                    "non-String property: {}\nof the axis: {}\nhas type: {}\nfor the match operator: {}",
                    property,
                    axis,
                    values.element_type(),
                    operator.operator()
                )));
            };
            let regex = Regex::new(&format!("^(?:{})$", literal)).map_err(|error| {
                self.type_mismatch(format!(
                    "invalid regular expression: {}\nfor the property: {}\nof the axis: {}\n{}",
                    literal, property, axis, error
                ))
            })?;
            let keep = operator == ComparisonOperator::Match;
            return Ok(values.iter().map(|value| regex.is_match(value) == keep).collect());
        }

        let unparsable = |element_type: ElementType| {
            self.type_mismatch(format!(
                "invalid {} value: {}\nfor the property: {}\nof the axis: {}",
                element_type, literal, property, axis
            ))
        };
        Ok(match values {
            Array::String(values) => compare_all(values.iter().map(String::as_str), &literal, operator),
            Array::Int(values) => {
                let literal: i64 = literal.parse().map_err(|_| unparsable(ElementType::Int))?;
                compare_all(values.iter().copied(), &literal, operator)
            }
            Array::Float(values) => {
                let literal: f64 = literal.parse().map_err(|_| unparsable(ElementType::Float))?;
                compare_all(values.iter().copied(), &literal, operator)
            }
            Array::Bool(values) => {
                let literal: bool = literal.parse().map_err(|_| unparsable(ElementType::Bool))?;
                compare_all(values.iter().copied(), &literal, operator)
            }
        })
    }

    // ========================================
    // Lookups
    // ========================================

    fn scalar_lookup(&self, lookup: &ScalarDataLookup) -> Result<Value, EvalError> {
        match lookup {
            ScalarDataLookup::Scalar(lookup) => self
                .store
                .get_scalar(&lookup.name)
                .ok_or_else(|| self.missing_property(format!("scalar: {}", lookup.name))),
            ScalarDataLookup::VectorEntry(lookup) => {
                let axis = &lookup.entry.axis;
                let index = self.entry_index(&lookup.entry)?;
                let values = self
                    .vector_property(axis, lookup.property.property.first())?
                    .select(&[index]);
                let values = self.resolve_chain(axis, &lookup.property.property, values)?;
                let values = self.finish_axis_lookup(axis, &lookup.property, values)?;
                values
                    .get(0)
                    .ok_or_else(|| self.missing_property(format!("entry value of: {}", lookup)))
            }
            ScalarDataLookup::MatrixEntry(lookup) => {
                let (rows, columns) = (&lookup.axes.rows, &lookup.axes.columns);
                let row = self.entry_index(rows)?;
                let column = self.entry_index(columns)?;
                let matrix = self.matrix_property(&rows.axis, &columns.axis, &lookup.name)?;
                matrix
                    .get(row, column)
                    .ok_or_else(|| self.missing_property(format!("entry value of: {}", lookup)))
            }
        }
    }

    fn vector_lookup(&self, lookup: &VectorDataLookup) -> Result<Option<NamedVector>, EvalError> {
        match lookup {
            VectorDataLookup::Vector(lookup) => {
                let axis = &lookup.axis.axis;
                let Some(indices) = self.axis_indices(&lookup.axis)? else {
                    return Ok(None);
                };
                let values = self.axis_lookup(axis, &lookup.property)?;
                Ok(Some(self.named_vector(axis, &indices, &values)?))
            }
            VectorDataLookup::MatrixSlice(lookup) => {
                let (axis, entry) = (&lookup.axes.axis, &lookup.axes.entry);
                let Some(indices) = self.axis_indices(axis)? else {
                    return Ok(None);
                };
                let column = self.entry_index(entry)?;
                let matrix = self.matrix_property(&axis.axis, &entry.axis, &lookup.name)?;
                Ok(Some(self.named_vector(&axis.axis, &indices, &matrix.column(column))?))
            }
        }
    }

    fn named_vector(&self, axis: &str, indices: &[usize], values: &Array) -> Result<NamedVector, EvalError> {
        let entries = self.axis_entries(axis)?;
        Ok(NamedVector {
            axis: axis.to_string(),
            entries: indices.iter().map(|&index| entries[index].clone()).collect(),
            values: values.select(indices),
        })
    }

    fn matrix_property(&self, rows_axis: &str, columns_axis: &str, name: &str) -> Result<Matrix, EvalError> {
        self.axis_entries(rows_axis)?;
        self.axis_entries(columns_axis)?;
        tracing::trace!(rows_axis, columns_axis, property = name, "fetching matrix");
        self.store.get_matrix(rows_axis, columns_axis, name).ok_or_else(|| {
            self.missing_property(format!(
                "matrix: {}\nfor the rows axis: {}\nand the columns axis: {}",
                name, rows_axis, columns_axis
            ))
        })
    }

    fn matrix_lookup(&self, query: &MatrixQuery) -> Result<Option<NamedMatrix>, EvalError> {
        let axes = &query.lookup.axes;
        let Some(rows) = self.axis_indices(&axes.rows)? else {
            return Ok(None);
        };
        let Some(columns) = self.axis_indices(&axes.columns)? else {
            return Ok(None);
        };
        let matrix = self.matrix_property(&axes.rows.axis, &axes.columns.axis, &query.lookup.name)?;
        let row_entries = self.axis_entries(&axes.rows.axis)?;
        let column_entries = self.axis_entries(&axes.columns.axis)?;
        Ok(Some(NamedMatrix {
            rows_axis: axes.rows.axis.clone(),
            columns_axis: axes.columns.axis.clone(),
            row_entries: rows.iter().map(|&index| row_entries[index].clone()).collect(),
            column_entries: columns.iter().map(|&index| column_entries[index].clone()).collect(),
            matrix: matrix.select(&rows, &columns),
        }))
    }

    // ========================================
    // Operations
    // ========================================

    fn numeric(&self, values: &Array, operation: &str) -> Result<Vec<f64>, EvalError> {
        values.to_f64().ok_or_else(|| {
            self.type_mismatch(format!(
                "non-numeric input: {}\nfor the operation: {}",
                values.element_type(),
                operation
            ))
        })
    }

    fn apply_eltwise(&self, eltwise: &[EltwiseOperation], mut values: Vec<f64>) -> Result<Vec<f64>, EvalError> {
        for operation in eltwise {
            let function = self
                .registry
                .construct_eltwise(&operation.name, &operation.parameters)
                .ok_or_else(|| EvalError::UnknownOperation {
                    kind: OperationKind::Eltwise,
                    operation: operation.name.clone(),
                })?;
            tracing::trace!(operation = %operation, "applying eltwise");
            for value in values.iter_mut() {
                *value = function.apply(*value);
            }
        }
        Ok(values)
    }

    fn reduce(&self, reduction: &ReductionOperation, values: &[f64]) -> Result<f64, EvalError> {
        let function = self
            .registry
            .construct_reduction(&reduction.name, &reduction.parameters)
            .ok_or_else(|| EvalError::UnknownOperation {
                kind: OperationKind::Reduction,
                operation: reduction.name.clone(),
            })?;
        tracing::trace!(operation = %reduction, "applying reduction");
        Ok(function.reduce(values))
    }

    /// Collapse the rows of a matrix, giving a vector along its columns.
    fn reduce_matrix(&self, reduction: &ReductionOperation, named: NamedMatrix) -> Result<NamedVector, EvalError> {
        let values = self.numeric(&named.matrix.values, &reduction.name)?;
        let nrows = named.matrix.nrows;
        let reduced = (0..named.matrix.ncols)
            .map(|column| self.reduce(reduction, &values[column * nrows..(column + 1) * nrows]))
            .collect::<Result<Vec<f64>, EvalError>>()?;
        Ok(NamedVector {
            axis: named.columns_axis,
            entries: named.column_entries,
            values: Array::Float(reduced),
        })
    }
}

fn compare_all<T: PartialOrd>(
    values: impl Iterator<Item = T>,
    literal: &T,
    operator: ComparisonOperator,
) -> Vec<bool> {
    values
        .map(|value| operator.holds(value.partial_cmp(literal)))
        .collect()
}
