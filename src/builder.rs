//! Typed query construction from the generic expression tree.
//!
//! Each builder expects a specific operator (or operand) at the root of the
//! subtree it is given and recurses into the children. When the shape does
//! not match, the error names the construct that was expected and the
//! sub-expression that was found instead.

use std::collections::HashSet;

use crate::{
    ast::{
        AxisEntry, AxisFilter, AxisLookup, ComparisonOperator, EltwiseOperation, Expr,
        FilterOperator, FilteredAxis, MatrixAxes, MatrixEntryAxes, MatrixEntryLookup,
        MatrixPropertyLookup, MatrixQuery, MatrixSliceAxes, MatrixSliceLookup, Operator,
        Parameters, PropertyComparison, PropertyLookup, Query, ReductionOperation,
        ScalarDataLookup, ScalarPropertyLookup, ScalarQuery, VectorDataLookup, VectorEntryLookup,
        VectorPropertyLookup, VectorQuery,
    },
    parser::{ParseError, parse_expression},
    registry::{OperationKind, OperationRegistry},
};

pub struct Builder<'a> {
    query: &'a str,
    registry: &'a OperationRegistry,
}

/// Split a binary node into its (present) operands.
fn children(expr: &Expr) -> Option<(Option<&Expr>, &Expr)> {
    match expr {
        Expr::Binary { left, right, .. } => Some((left.as_deref(), right)),
        Expr::Operand { .. } => None,
    }
}

/// The left and right operands if `expr` is rooted at `operator`.
fn split(expr: &Expr, operator: Operator) -> Option<(&Expr, &Expr)> {
    if expr.operator() != Some(operator) {
        return None;
    }
    match children(expr)? {
        (Some(left), right) => Some((left, right)),
        (None, _) => None,
    }
}

fn is_entry(expr: &Expr) -> bool {
    expr.operator() == Some(Operator::Equal)
}

impl<'a> Builder<'a> {
    pub fn new(query: &'a str, registry: &'a OperationRegistry) -> Self {
        Builder { query, registry }
    }

    fn expected(&self, what: &str, found: &Expr) -> ParseError {
        ParseError::Syntax {
            query: self.query.to_string(),
            position: found.position(),
            message: format!("expected: {}\nfound: {}", what, found),
        }
    }

    fn name(&self, expr: &Expr, what: &str) -> Result<String, ParseError> {
        match expr.as_operand() {
            Some(value) => Ok(value.to_string()),
            None => Err(self.expected(what, expr)),
        }
    }

    // ========================================
    // Queries
    // ========================================

    /// Build a query, inferring its arity from its shape.
    pub fn query(&self, expr: &Expr) -> Result<Query, ParseError> {
        let mut base = expr;
        let mut reductions = 0;
        while let Some((left, _)) = split(base, Operator::Reduce) {
            reductions += 1;
            base = left;
        }
        if let Some((left, _)) = split(base, Operator::Eltwise) {
            base = left;
        }

        let lookup_ndims = self.lookup_ndims(base)?;
        match lookup_ndims.checked_sub(reductions) {
            Some(0) => Ok(Query::Scalar(self.scalar_query(expr)?)),
            Some(1) => Ok(Query::Vector(self.vector_query(expr)?)),
            Some(_) => Ok(Query::Matrix(self.matrix_query(expr)?)),
            None => Err(self.expected("at most one reduction per axis", expr)),
        }
    }

    fn lookup_ndims(&self, base: &Expr) -> Result<usize, ParseError> {
        if base.as_operand().is_some() {
            return Ok(0);
        }
        let Some((axes, _)) = split(base, Operator::Lookup) else {
            return Err(self.expected("property lookup", base));
        };
        if axes.operator() == Some(Operator::Semicolon) {
            return Err(self.expected("matrix axes (rows , columns)", axes));
        }
        match split(axes, Operator::Comma) {
            Some((rows, columns)) => Ok(match (is_entry(rows), is_entry(columns)) {
                (true, true) => 0,
                (true, false) | (false, true) => 1,
                (false, false) => 2,
            }),
            None if is_entry(axes) => Ok(0),
            None => Ok(1),
        }
    }

    pub fn scalar_query(&self, expr: &Expr) -> Result<ScalarQuery, ParseError> {
        if let Some((input, stage)) = split(expr, Operator::Reduce) {
            let vector = self.vector_query(input)?;
            let (reduction, eltwise) = self.reduction_stage(stage)?;
            return Ok(ScalarQuery::Reduction {
                vector: Box::new(vector),
                reduction,
                eltwise,
            });
        }
        let (base, eltwise) = self.split_eltwise(expr)?;
        Ok(ScalarQuery::Lookup {
            lookup: self.scalar_data_lookup(base)?,
            eltwise,
        })
    }

    pub fn vector_query(&self, expr: &Expr) -> Result<VectorQuery, ParseError> {
        if let Some((input, stage)) = split(expr, Operator::Reduce) {
            let matrix = self.matrix_query(input)?;
            let (reduction, eltwise) = self.reduction_stage(stage)?;
            return Ok(VectorQuery::Reduction {
                matrix: Box::new(matrix),
                reduction,
                eltwise,
            });
        }
        let (base, eltwise) = self.split_eltwise(expr)?;
        Ok(VectorQuery::Lookup {
            lookup: self.vector_data_lookup(base)?,
            eltwise,
        })
    }

    pub fn matrix_query(&self, expr: &Expr) -> Result<MatrixQuery, ParseError> {
        if expr.operator() == Some(Operator::Reduce) {
            return Err(self.expected("matrix query (no reductions)", expr));
        }
        let (base, eltwise) = self.split_eltwise(expr)?;
        Ok(MatrixQuery {
            lookup: self.matrix_property_lookup(base)?,
            eltwise,
        })
    }

    // ========================================
    // Operations
    // ========================================

    fn split_eltwise<'e>(&self, expr: &'e Expr) -> Result<(&'e Expr, Vec<EltwiseOperation>), ParseError> {
        match split(expr, Operator::Eltwise) {
            Some((base, operations)) => Ok((base, self.eltwise_chain(operations)?)),
            None => Ok((expr, Vec::new())),
        }
    }

    fn eltwise_chain(&self, expr: &Expr) -> Result<Vec<EltwiseOperation>, ParseError> {
        let mut operations = Vec::new();
        let mut rest = expr;
        while let Some((operation, next)) = split(rest, Operator::Eltwise) {
            operations.push(self.eltwise_operation(operation)?);
            rest = next;
        }
        operations.push(self.eltwise_operation(rest)?);
        Ok(operations)
    }

    fn reduction_stage(
        &self,
        expr: &Expr,
    ) -> Result<(ReductionOperation, Vec<EltwiseOperation>), ParseError> {
        match split(expr, Operator::Eltwise) {
            Some((reduction, eltwise)) => {
                Ok((self.reduction_operation(reduction)?, self.eltwise_chain(eltwise)?))
            }
            None => Ok((self.reduction_operation(expr)?, Vec::new())),
        }
    }

    pub fn eltwise_operation(&self, expr: &Expr) -> Result<EltwiseOperation, ParseError> {
        let (name, parameters) = self.operation(expr, OperationKind::Eltwise)?;
        Ok(EltwiseOperation { name, parameters })
    }

    pub fn reduction_operation(&self, expr: &Expr) -> Result<ReductionOperation, ParseError> {
        let (name, parameters) = self.operation(expr, OperationKind::Reduction)?;
        Ok(ReductionOperation { name, parameters })
    }

    /// `Name` or `Name ; parameter = value , parameter = value`
    fn operation(&self, expr: &Expr, kind: OperationKind) -> Result<(String, Parameters), ParseError> {
        let what = format!("{} operation", kind);
        let (name, assignments) = match split(expr, Operator::Semicolon) {
            Some((name, assignments)) => {
                (self.name(name, &what)?, self.parameter_assignments(assignments)?)
            }
            None => (self.name(expr, &what)?, Vec::new()),
        };

        let Some(schema) = self.registry.lookup(kind, &name) else {
            return Err(ParseError::UnknownOperation {
                kind,
                operation: name,
                query: self.query.to_string(),
            });
        };

        let mut seen = HashSet::new();
        for (parameter, _) in &assignments {
            if schema.find_parameter(parameter).is_none() {
                return Err(ParseError::UnknownParameter {
                    kind,
                    operation: name,
                    parameter: parameter.clone(),
                    query: self.query.to_string(),
                });
            }
            if !seen.insert(parameter.as_str()) {
                return Err(ParseError::DuplicateParameter {
                    kind,
                    operation: name,
                    parameter: parameter.clone(),
                    query: self.query.to_string(),
                });
            }
        }

        let mut values = Vec::with_capacity(schema.parameters.len());
        for declared in &schema.parameters {
            let value = match assignments.iter().find(|(parameter, _)| parameter == declared.name) {
                None => declared.default,
                Some((_, literal)) => declared.kind.parse(literal).ok_or_else(|| {
                    ParseError::InvalidParameterValue {
                        kind,
                        operation: name.clone(),
                        parameter: declared.name.to_string(),
                        value: literal.clone(),
                        expected: declared.kind.describe().to_string(),
                        query: self.query.to_string(),
                    }
                })?,
            };
            values.push((declared.name.to_string(), value));
        }

        Ok((name, Parameters { values }))
    }

    fn parameter_assignments(&self, expr: &Expr) -> Result<Vec<(String, String)>, ParseError> {
        let mut assignments = Vec::new();
        let mut rest = expr;
        while let Some((assignment, next)) = split(rest, Operator::Comma) {
            assignments.push(self.parameter_assignment(assignment)?);
            rest = next;
        }
        assignments.push(self.parameter_assignment(rest)?);
        Ok(assignments)
    }

    fn parameter_assignment(&self, expr: &Expr) -> Result<(String, String), ParseError> {
        let what = "parameter assignment (name = value)";
        let Some((name, value)) = split(expr, Operator::Equal) else {
            return Err(self.expected(what, expr));
        };
        Ok((self.name(name, what)?, self.name(value, "parameter value")?))
    }

    // ========================================
    // Lookups
    // ========================================

    pub fn scalar_data_lookup(&self, expr: &Expr) -> Result<ScalarDataLookup, ParseError> {
        if let Some(name) = expr.as_operand() {
            return Ok(ScalarDataLookup::Scalar(ScalarPropertyLookup {
                name: name.to_string(),
            }));
        }
        let Some((axes, property)) = split(expr, Operator::Lookup) else {
            return Err(self.expected("scalar lookup", expr));
        };
        if axes.operator() == Some(Operator::Comma) {
            Ok(ScalarDataLookup::MatrixEntry(MatrixEntryLookup {
                axes: self.matrix_entry_axes(axes)?,
                name: self.name(property, "matrix property name")?,
            }))
        } else {
            Ok(ScalarDataLookup::VectorEntry(VectorEntryLookup {
                entry: self.axis_entry(axes)?,
                property: self.axis_lookup(property)?,
            }))
        }
    }

    pub fn vector_data_lookup(&self, expr: &Expr) -> Result<VectorDataLookup, ParseError> {
        let Some((axes, property)) = split(expr, Operator::Lookup) else {
            return Err(self.expected("vector lookup (axis @ property)", expr));
        };
        if axes.operator() == Some(Operator::Comma) {
            Ok(VectorDataLookup::MatrixSlice(MatrixSliceLookup {
                axes: self.matrix_slice_axes(axes)?,
                name: self.name(property, "matrix property name")?,
            }))
        } else {
            Ok(VectorDataLookup::Vector(VectorPropertyLookup {
                axis: self.filtered_axis(axes)?,
                property: self.axis_lookup(property)?,
            }))
        }
    }

    pub fn matrix_property_lookup(&self, expr: &Expr) -> Result<MatrixPropertyLookup, ParseError> {
        let Some((axes, name)) = split(expr, Operator::Lookup) else {
            return Err(self.expected("matrix lookup (rows , columns @ property)", expr));
        };
        Ok(MatrixPropertyLookup {
            axes: self.matrix_axes(axes)?,
            name: self.name(name, "matrix property name")?,
        })
    }

    fn matrix_axes(&self, expr: &Expr) -> Result<MatrixAxes, ParseError> {
        let Some((rows, columns)) = split(expr, Operator::Comma) else {
            return Err(self.expected("matrix axes (rows , columns)", expr));
        };
        Ok(MatrixAxes {
            rows: self.filtered_axis(rows)?,
            columns: self.filtered_axis(columns)?,
        })
    }

    /// `axis , axis = entry`, or the same pair with the entry first.
    fn matrix_slice_axes(&self, expr: &Expr) -> Result<MatrixSliceAxes, ParseError> {
        let Some((left, right)) = split(expr, Operator::Comma) else {
            return Err(self.expected("matrix slice axes (axis , axis = entry)", expr));
        };
        let (axis, entry) = if is_entry(left) && !is_entry(right) {
            (right, left)
        } else {
            (left, right)
        };
        Ok(MatrixSliceAxes {
            axis: self.filtered_axis(axis)?,
            entry: self.axis_entry(entry)?,
        })
    }

    fn matrix_entry_axes(&self, expr: &Expr) -> Result<MatrixEntryAxes, ParseError> {
        let Some((rows, columns)) = split(expr, Operator::Comma) else {
            return Err(self.expected("matrix entry axes (axis = entry , axis = entry)", expr));
        };
        Ok(MatrixEntryAxes {
            rows: self.axis_entry(rows)?,
            columns: self.axis_entry(columns)?,
        })
    }

    pub fn axis_entry(&self, expr: &Expr) -> Result<AxisEntry, ParseError> {
        let what = "axis entry (axis = entry)";
        let Some((axis, entry)) = split(expr, Operator::Equal) else {
            return Err(self.expected(what, expr));
        };
        Ok(AxisEntry {
            axis: self.name(axis, what)?,
            entry: self.name(entry, "entry name")?,
        })
    }

    /// `axis`, followed by zero or more `& lookup`, `| lookup`, `^ lookup`.
    pub fn filtered_axis(&self, expr: &Expr) -> Result<FilteredAxis, ParseError> {
        let what = "filtered axis";
        if let Some(axis) = expr.as_operand() {
            return Ok(FilteredAxis::new(axis));
        }

        let Some(mut operator) = expr.operator().and_then(FilterOperator::from_operator) else {
            return Err(self.expected(what, expr));
        };
        let Some((axis, mut rest)) = split(expr, operator.operator()) else {
            return Err(self.expected(what, expr));
        };
        let axis = self.name(axis, "axis name")?;

        // Right associativity puts the next filter in the right child.
        let mut filters = Vec::new();
        loop {
            let next = rest.operator().and_then(FilterOperator::from_operator);
            match next.and_then(|next| split(rest, next.operator()).map(|parts| (next, parts))) {
                Some((next, (lookup, remaining))) => {
                    filters.push(AxisFilter {
                        operator,
                        lookup: self.axis_lookup(lookup)?,
                    });
                    operator = next;
                    rest = remaining;
                }
                None => {
                    filters.push(AxisFilter {
                        operator,
                        lookup: self.axis_lookup(rest)?,
                    });
                    break;
                }
            }
        }

        Ok(FilteredAxis { axis, filters })
    }

    /// `property`, `~ property`, or `property <comparison> value`.
    pub fn axis_lookup(&self, expr: &Expr) -> Result<AxisLookup, ParseError> {
        if let Expr::Binary {
            operator: Operator::Match,
            left: None,
            right,
            ..
        } = expr
        {
            return Ok(AxisLookup::new(self.property_lookup(right)?).invert());
        }

        if let Some(operator) = expr.operator().and_then(ComparisonOperator::from_operator)
            && let Some((property, value)) = split(expr, operator.operator())
        {
            return Ok(AxisLookup {
                property: self.property_lookup(property)?,
                comparison: Some(PropertyComparison {
                    operator,
                    value: self.name(value, "comparison value")?,
                }),
                inverted: false,
            });
        }

        Ok(AxisLookup::new(self.property_lookup(expr)?))
    }

    /// `name` or `name : name : ...`
    pub fn property_lookup(&self, expr: &Expr) -> Result<PropertyLookup, ParseError> {
        let what = "property name";
        let mut names = Vec::new();
        let mut rest = expr;
        while let Some((name, next)) = split(rest, Operator::Chain) {
            names.push(self.name(name, what)?);
            rest = next;
        }
        names.push(self.name(rest, what)?);
        Ok(PropertyLookup { names })
    }
}

impl Query {
    /// Parse a query of any arity.
    ///
    /// # Examples
    ///
    /// ```
    /// use axis_query::{Query, registry::OperationRegistry};
    ///
    /// let registry = OperationRegistry::default();
    /// let query = Query::parse("cell , gene @ UMIs %> Sum", &registry).unwrap();
    /// assert_eq!(query.ndims(), 1);
    /// ```
    pub fn parse(input: &str, registry: &OperationRegistry) -> Result<Query, ParseError> {
        let (expr, cleaned) = parse_expression(input)?;
        let query = Builder::new(&cleaned, registry).query(&expr)?;
        tracing::debug!(query = %query, ndims = query.ndims(), "parsed query");
        Ok(query)
    }
}

impl ScalarQuery {
    pub fn parse(input: &str, registry: &OperationRegistry) -> Result<ScalarQuery, ParseError> {
        let (expr, cleaned) = parse_expression(input)?;
        Builder::new(&cleaned, registry).scalar_query(&expr)
    }
}

impl VectorQuery {
    pub fn parse(input: &str, registry: &OperationRegistry) -> Result<VectorQuery, ParseError> {
        let (expr, cleaned) = parse_expression(input)?;
        Builder::new(&cleaned, registry).vector_query(&expr)
    }
}

impl MatrixQuery {
    pub fn parse(input: &str, registry: &OperationRegistry) -> Result<MatrixQuery, ParseError> {
        let (expr, cleaned) = parse_expression(input)?;
        Builder::new(&cleaned, registry).matrix_query(&expr)
    }
}
