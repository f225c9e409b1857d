//! Documentation content for the axq CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Filters,
    Operations,
    Queries,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "escaping" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "filters" | "filter" | "masks" => Some(Self::Filters),
            "operations" | "eltwise" | "reductions" => Some(Self::Operations),
            "queries" | "query" | "lookups" => Some(Self::Queries),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"AXQ DOCUMENTATION

axq queries a data store of named axes, plus scalars, per-axis vectors and
per-axis-pair matrices. A query is a flat string of names joined by
single-character operators; the number of axes it names decides whether it
returns a scalar, a vector or a matrix.

DOCUMENTATION CATEGORIES

  syntax            Names, escaping, whitespace and comments
  operators         The operator table with precedence and associativity
  filters           Masking axes with properties, comparisons and combinators
  operations        Element-wise (%) and reduction (%>) operations
  queries           Scalar, vector and matrix lookups

QUICK REFERENCE

  version                       Scalar lookup
  gene @ score                  Vector lookup
  gene = FOX1 @ score           Entry of a vector
  cell , gene @ UMIs            Matrix lookup
  gene & marker @ score         Filtered vector
  cell , gene @ UMIs %> Sum     Reduce the rows of a matrix

Run 'axq doc <category>' for detailed documentation.
Run 'axq operations' to list the available operations.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Filters) => Ok(FILTERS_DOC),
        Some(DocCategory::Operations) => Ok(OPERATIONS_DOC),
        Some(DocCategory::Queries) => Ok(QUERIES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r##"SYNTAX

NAMES
  Names and values are runs of letters, digits, '_', '.', '+' and '-'.
  Any non-ASCII character is also part of a name.

    gene
    cell.type
    -1.5e3

ESCAPING
  Any other character is made part of a name by preceding it with '\'.

    cell\ type          The name "cell type"
    a\,b                The name "a,b"
    \#tag               The name "#tag"

WHITESPACE
  Whitespace between names and operators is optional:

    cell,gene@UMIs   is the same as   cell , gene @ UMIs

COMMENTS
  An unescaped '#' starts a comment running to the end of the line.

    gene @ score   # per-gene score

  An escaped whitespace character, including a line break, becomes an
  escaped space.
"##;

const OPERATORS_DOC: &str = r#"OPERATORS

From the loosest to the tightest binding:

  %>                  0  left    Reduction
  %                   1  right   Element-wise operation
  @                   2  right   Lookup
  ;  ,                3  right   Parameters, axis pairs
  &  |  ^             4  right   Filter combinators
  <  <=  !=  =  >=  > 5  right   Comparisons
  ~  !~               5  right   Regular expression (mis)match
  :                   6  right   Chained property

A prefix '~' inverts a boolean property:

  gene & ~ marker @ score

Longer operators win over their prefixes: '%>' over '%', '<=' over '<',
'!~' over '~'.
"#;

const FILTERS_DOC: &str = r#"FILTERS

An axis can be followed by filters, each a combinator and a property:

  gene & marker                 Keep marker genes
  gene & ~ marker               Keep non-marker genes
  gene & score > 0.5            Keep genes by comparison
  gene & name ~ RP\[SL\].\*     Keep genes by regular expression
  gene & marker | score > 0.5   Combine filters

COMBINATORS
  &   and      |   or      ^   xor

  Filters are applied left to right, starting from all entries selected.
  A filter property without a comparison must be boolean.

COMPARISONS
  Values are compared with the type of the property: numeric properties
  compare numerically, string properties lexicographically. Regular
  expressions must match the whole value, and their special characters
  must be escaped:  name ~ RP\[SL\].\*

CHAINED PROPERTIES
  A string property naming entries of another axis can be followed through:

    cell & batch : donor : age > 60

  The next axis is the property name itself, or its part before the first '.'
  (so 'batch.original' refers to the 'batch' axis).

EMPTY RESULTS
  If filters select no entries of an axis, the query has no result and
  axq prints 'null'.
"#;

const OPERATIONS_DOC: &str = r#"OPERATIONS

ELEMENT-WISE (%)
  Apply a function to every value, keeping the shape:

    gene @ score % Abs
    cell , gene @ UMIs % Log ; base = 2 , eps = 1

REDUCTIONS (%>)
  Collapse the rows of a matrix into a vector, or a vector into a scalar:

    cell , gene @ UMIs %> Sum           Vector along the genes
    gene @ score %> Mean                Scalar

PARAMETERS
  Parameters follow the operation name after ';', separated by ','. Omitted
  parameters take their defaults; the canonical form lists all of them.

Run 'axq operations' for the full list of operations and parameters.
"#;

const QUERIES_DOC: &str = r#"QUERIES

SCALARS
  version                         A scalar property
  gene = FOX1 @ score             One entry of a vector
  cell = C1 , gene = FOX1 @ UMIs  One entry of a matrix
  gene @ score %> Max             A reduced vector

VECTORS
  gene @ score                    A vector property
  gene @ name                     The entry names of the axis
  cell , gene = FOX1 @ UMIs       A column of a matrix
  gene = FOX1 , cell @ UMIs       The same column, entry first
  cell , gene @ UMIs %> Sum       A reduced matrix

MATRICES
  cell , gene @ UMIs              Rows along cells, columns along genes
  gene , cell @ UMIs              The same data, transposed

CANONICAL FORM
  'axq canonical <QUERY>' prints the normalized form of a query: single
  spaces around operators, escaped names, explicit parameters and sorted
  runs of identical filter combinators.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!(DocCategory::from_name("OPS"), Some(DocCategory::Operators));
        assert_eq!(DocCategory::from_name("reductions"), Some(DocCategory::Operations));
        assert_eq!(DocCategory::from_name("nope"), None);
    }

    #[test]
    fn test_syntax_doc_keeps_hash_examples() {
        let doc = get_doc_category("syntax").unwrap();
        assert!(doc.contains("\\#tag               The name \"#tag\""));
        assert!(doc.contains("WHITESPACE"));
        assert!(doc.trim_end().ends_with("escaped space."));
    }

    #[test]
    fn test_every_category_renders() {
        for name in ["syntax", "operators", "filters", "operations", "queries"] {
            let doc = get_doc_category(name).unwrap();
            assert!(doc.starts_with(&name.to_uppercase()), "Bad heading for: {}", name);
        }
    }

    #[test]
    fn test_unknown_category() {
        assert!(matches!(get_doc_category("nope"), Err(CliError::UnknownCategory(_))));
    }
}
