pub mod ast;
pub mod builder;
pub mod canonical;
pub mod cli;
pub mod escape;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod registry;
pub mod store;
pub mod value;

pub use ast::{Expr, MatrixQuery, Operator, Query, ScalarQuery, Token, VectorQuery};
pub use canonical::canonical;
pub use escape::{escape, unescape};
pub use evaluator::{EvalError, Evaluator};
pub use lexer::{LexError, Lexer};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use registry::OperationRegistry;
pub use store::{DataStore, MemoryStore, StoreError};
pub use value::{Array, ElementType, Matrix, NamedMatrix, NamedVector, QueryResult, Value};
