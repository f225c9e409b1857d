//! Canonical rendering of parsed queries.
//!
//! The [`Display`](fmt::Display) of every query node is its canonical form:
//! names and values are escaped, every binary operator has exactly one space
//! on each side, every operation parameter is listed explicitly in schema
//! order, and runs of consecutive filters sharing a combinator are sorted.
//! Two queries mean the same thing iff their canonical forms are equal.
//!
//! ```
//! use axis_query::{canonical, registry::OperationRegistry};
//!
//! let registry = OperationRegistry::default();
//! assert_eq!(
//!     canonical("gene&b&a,cell@UMIs%Log;eps=1", &registry).unwrap(),
//!     "gene & a & b , cell @ UMIs % Log ; base = e , eps = 1"
//! );
//! ```

use std::fmt;

use crate::{
    ast::{
        AxisEntry, AxisFilter, AxisLookup, EltwiseOperation, FilteredAxis, MatrixAxes,
        MatrixEntryAxes, MatrixEntryLookup, MatrixPropertyLookup, MatrixQuery, MatrixSliceAxes,
        MatrixSliceLookup, Operator, ParameterValue, Parameters, PropertyComparison,
        PropertyLookup, Query, ReductionOperation, ScalarDataLookup, ScalarPropertyLookup,
        ScalarQuery, VectorDataLookup, VectorEntryLookup, VectorPropertyLookup, VectorQuery,
    },
    escape::escape,
    parser::ParseError,
    registry::OperationRegistry,
};

/// Parse a query of any arity and return its canonical form.
pub fn canonical(input: &str, registry: &OperationRegistry) -> Result<String, ParseError> {
    Ok(Query::parse(input, registry)?.to_string())
}

impl fmt::Display for PropertyLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, name) in self.names.iter().enumerate() {
            if index > 0 {
                write!(f, " {} ", Operator::Chain)?;
            }
            f.write_str(&escape(name))?;
        }
        Ok(())
    }
}

impl fmt::Display for PropertyComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator.operator(), escape(&self.value))
    }
}

impl fmt::Display for AxisLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            write!(f, "{} ", Operator::Match)?;
        }
        write!(f, "{}", self.property)?;
        if let Some(comparison) = &self.comparison {
            write!(f, " {}", comparison)?;
        }
        Ok(())
    }
}

impl fmt::Display for AxisFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator.operator(), self.lookup)
    }
}

impl fmt::Display for FilteredAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape(&self.axis))?;
        for run in self.filters.chunk_by(|a, b| a.operator == b.operator) {
            let mut run: Vec<&AxisFilter> = run.iter().collect();
            run.sort_by(|a, b| a.lookup.cmp(&b.lookup));
            for filter in run {
                write!(f, " {}", filter)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for AxisEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", escape(&self.axis), Operator::Equal, escape(&self.entry))
    }
}

impl fmt::Display for MatrixAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.rows, Operator::Comma, self.columns)
    }
}

impl fmt::Display for MatrixSliceAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.axis, Operator::Comma, self.entry)
    }
}

impl fmt::Display for MatrixEntryAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.rows, Operator::Comma, self.columns)
    }
}

impl fmt::Display for ScalarPropertyLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape(&self.name))
    }
}

impl fmt::Display for VectorPropertyLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.axis, Operator::Lookup, self.property)
    }
}

impl fmt::Display for MatrixPropertyLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.axes, Operator::Lookup, escape(&self.name))
    }
}

impl fmt::Display for MatrixSliceLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.axes, Operator::Lookup, escape(&self.name))
    }
}

impl fmt::Display for VectorEntryLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.entry, Operator::Lookup, self.property)
    }
}

impl fmt::Display for MatrixEntryLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.axes, Operator::Lookup, escape(&self.name))
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Float(x) => f.write_str(&escape(&x.to_string())),
            ParameterValue::Integer(n) => write!(f, "{}", n),
            ParameterValue::E => f.write_str("e"),
            ParameterValue::Auto => f.write_str("auto"),
        }
    }
}

/// Renders ` ; name = value , name = value`, or nothing without parameters.
impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.values.iter().enumerate() {
            let separator = if index == 0 { Operator::Semicolon } else { Operator::Comma };
            write!(f, " {} {} {} {}", separator, escape(name), Operator::Equal, value)?;
        }
        Ok(())
    }
}

impl fmt::Display for EltwiseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", escape(&self.name), self.parameters)
    }
}

impl fmt::Display for ReductionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", escape(&self.name), self.parameters)
    }
}

fn write_eltwise(f: &mut fmt::Formatter<'_>, eltwise: &[EltwiseOperation]) -> fmt::Result {
    for operation in eltwise {
        write!(f, " {} {}", Operator::Eltwise, operation)?;
    }
    Ok(())
}

impl fmt::Display for ScalarDataLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarDataLookup::Scalar(lookup) => write!(f, "{}", lookup),
            ScalarDataLookup::VectorEntry(lookup) => write!(f, "{}", lookup),
            ScalarDataLookup::MatrixEntry(lookup) => write!(f, "{}", lookup),
        }
    }
}

impl fmt::Display for VectorDataLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorDataLookup::Vector(lookup) => write!(f, "{}", lookup),
            VectorDataLookup::MatrixSlice(lookup) => write!(f, "{}", lookup),
        }
    }
}

impl fmt::Display for ScalarQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarQuery::Lookup { lookup, eltwise } => {
                write!(f, "{}", lookup)?;
                write_eltwise(f, eltwise)
            }
            ScalarQuery::Reduction {
                vector,
                reduction,
                eltwise,
            } => {
                write!(f, "{} {} {}", vector, Operator::Reduce, reduction)?;
                write_eltwise(f, eltwise)
            }
        }
    }
}

impl fmt::Display for VectorQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorQuery::Lookup { lookup, eltwise } => {
                write!(f, "{}", lookup)?;
                write_eltwise(f, eltwise)
            }
            VectorQuery::Reduction {
                matrix,
                reduction,
                eltwise,
            } => {
                write!(f, "{} {} {}", matrix, Operator::Reduce, reduction)?;
                write_eltwise(f, eltwise)
            }
        }
    }
}

impl fmt::Display for MatrixQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lookup)?;
        write_eltwise(f, &self.eltwise)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Scalar(query) => write!(f, "{}", query),
            Query::Vector(query) => write!(f, "{}", query),
            Query::Matrix(query) => write!(f, "{}", query),
        }
    }
}
