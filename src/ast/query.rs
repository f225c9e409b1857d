use crate::ast::{
    EltwiseOperation, MatrixEntryLookup, MatrixPropertyLookup, MatrixSliceLookup,
    ReductionOperation, ScalarPropertyLookup, VectorEntryLookup, VectorPropertyLookup,
};

/// The data access at the base of a scalar query.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarDataLookup {
    Scalar(ScalarPropertyLookup),
    VectorEntry(VectorEntryLookup),
    MatrixEntry(MatrixEntryLookup),
}

/// The data access at the base of a vector query.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorDataLookup {
    Vector(VectorPropertyLookup),
    MatrixSlice(MatrixSliceLookup),
}

/// A query producing a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarQuery {
    /// `version % Abs`, `cell = C1 @ age`
    Lookup {
        lookup: ScalarDataLookup,
        eltwise: Vec<EltwiseOperation>,
    },
    /// `gene @ score %> Max`
    Reduction {
        vector: Box<VectorQuery>,
        reduction: ReductionOperation,
        eltwise: Vec<EltwiseOperation>,
    },
}

/// A query producing a vector along one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorQuery {
    /// `gene & marker @ score % Abs`
    Lookup {
        lookup: VectorDataLookup,
        eltwise: Vec<EltwiseOperation>,
    },
    /// `cell , gene @ UMIs %> Sum`
    Reduction {
        matrix: Box<MatrixQuery>,
        reduction: ReductionOperation,
        eltwise: Vec<EltwiseOperation>,
    },
}

/// A query producing a matrix along a pair of axes.
///
/// # Example
/// ```text
/// cell , gene @ UMIs % Log ; base = 2 , eps = 1
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixQuery {
    pub lookup: MatrixPropertyLookup,
    pub eltwise: Vec<EltwiseOperation>,
}

/// A query of any result arity.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Scalar(ScalarQuery),
    Vector(VectorQuery),
    Matrix(MatrixQuery),
}

impl Query {
    /// Number of axes of the result: 0, 1 or 2.
    pub fn ndims(&self) -> usize {
        match self {
            Query::Scalar(_) => 0,
            Query::Vector(_) => 1,
            Query::Matrix(_) => 2,
        }
    }
}

impl From<ScalarQuery> for Query {
    fn from(query: ScalarQuery) -> Self {
        Query::Scalar(query)
    }
}

impl From<VectorQuery> for Query {
    fn from(query: VectorQuery) -> Self {
        Query::Vector(query)
    }
}

impl From<MatrixQuery> for Query {
    fn from(query: MatrixQuery) -> Self {
        Query::Matrix(query)
    }
}
