//! # Axis Query Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the axis query
//! language, a compact language for looking up scalars, vectors along one
//! axis, and matrices along a pair of axes.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens and the operator table
//! - **[expressions]** - The generic binary tree produced by the precedence parser
//! - **[operators]** - Comparison and filter operators
//! - **[lookups]** - Property lookups, filtered axes, entries and axis pairs
//! - **[operations]** - Element-wise and reduction operation invocations
//! - **[query]** - Complete scalar, vector and matrix queries
//!
//! ## Quick Start
//!
//! ```text
//! cell & ~doublet , gene & marker @ UMIs % Log ; base = 2 , eps = 1
//! ```
//!
//! This query returns the log of the UMIs matrix, restricted to cells that
//! are not doublets and to marker genes.
//!
//! ## Operators
//!
//! | Symbol | Meaning | Precedence | Associativity |
//! |---|---|---|---|
//! | `%>` | reduce | 0 | left |
//! | `%` | element-wise | 1 | right |
//! | `@` | lookup | 2 | right |
//! | `;` `,` | parameters / axes pairing | 3 | right |
//! | `&` `\|` `^` | filters | 4 | right |
//! | `<` `<=` `=` `!=` `>=` `>` `~` `!~` | comparisons | 5 | right |
//! | `:` | chained lookup | 6 | right |
//!
//! A `~` with no left operand inverts a boolean property (`~ doublet`).
//!
//! ## Result Arity
//!
//! - `version` - a scalar property
//! - `cell = C1 @ age` - one entry of a vector
//! - `cell = C1 , gene = FOX1 @ UMIs` - one entry of a matrix
//! - `cell @ batch : age` - a vector, resolved through the `batch` axis
//! - `cell , gene = FOX1 @ UMIs` - one column of a matrix
//! - `cell , gene @ UMIs` - a matrix
//!
//! Each `%>` reduction removes one axis from the result:
//!
//! ```text
//! cell , gene @ UMIs %> Sum %> Max
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;
pub mod lookups;
pub mod operations;
pub mod query;

pub use tokens::{Associativity, Operator, Token};
pub use expressions::Expr;
pub use operators::{ComparisonOperator, FilterOperator};
pub use lookups::{
    AxisEntry, AxisFilter, AxisLookup, FilteredAxis, MatrixAxes, MatrixEntryAxes,
    MatrixEntryLookup, MatrixPropertyLookup, MatrixSliceAxes, MatrixSliceLookup,
    PropertyComparison, PropertyLookup, ScalarPropertyLookup, VectorEntryLookup,
    VectorPropertyLookup,
};
pub use operations::{EltwiseOperation, ParameterValue, Parameters, ReductionOperation};
pub use query::{MatrixQuery, Query, ScalarDataLookup, ScalarQuery, VectorDataLookup, VectorQuery};
