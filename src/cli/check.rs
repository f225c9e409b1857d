//! Execute queries against a JSON data store

use super::CliError;
use crate::{
    Evaluator, MemoryStore, Query, QueryResult, canonical,
    registry::{OperationKind, OperationRegistry},
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query to execute
    pub query: String,
    /// JSON description of the data store
    pub store: Option<String>,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed; holds the canonical form
    SyntaxValid(String),
    /// Query executed; `None` when a filter selected no entries
    Success(Option<QueryResult>),
}

/// Parse a query and, unless only checking syntax, evaluate it
pub fn execute_check(options: &CheckOptions, registry: &OperationRegistry) -> Result<CheckResult, CliError> {
    let query = Query::parse(&options.query, registry)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid(query.to_string()));
    }

    let json = options.store.as_ref().ok_or(CliError::NoInput)?;
    let store = MemoryStore::from_json(json)?;

    let result = Evaluator::new(&store, registry).eval(&query)?;
    Ok(CheckResult::Success(result))
}

/// The canonical form of a query
pub fn execute_canonical(query: &str, registry: &OperationRegistry) -> Result<String, CliError> {
    Ok(canonical(query, registry)?)
}

/// Human readable listing of the registered operations and their parameters
pub fn operations_listing(registry: &OperationRegistry) -> String {
    let mut listing = String::new();
    for (kind, title) in [
        (OperationKind::Eltwise, "ELEMENT-WISE OPERATIONS (%)"),
        (OperationKind::Reduction, "REDUCTION OPERATIONS (%>)"),
    ] {
        if !listing.is_empty() {
            listing.push('\n');
        }
        listing.push_str(title);
        listing.push('\n');
        for schema in registry.schemas().filter(|schema| schema.kind() == kind) {
            listing.push_str(&format!("  {:<10} {}\n", schema.name, schema.description));
            for parameter in &schema.parameters {
                listing.push_str(&format!(
                    "    {} : {} = {}    {}\n",
                    parameter.name,
                    parameter.kind.describe(),
                    parameter.default,
                    parameter.description
                ));
            }
        }
    }
    listing
}
