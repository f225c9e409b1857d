use crate::ast::Operator;
use crate::escape::escape;

/// Generic binary expression tree built by the precedence parser.
///
/// This is the untyped intermediate form of a query. The builders in
/// [`crate::builder`] re-interpret subtrees according to the operator at
/// their root to produce the typed query nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A name or literal value
    ///
    /// # Example
    /// ```text
    /// UMIs
    /// ```
    Operand {
        value: String,
        /// Character offset in the cleaned query
        position: usize,
    },

    /// An operator applied to its operands
    ///
    /// `left` is `None` only for the prefix inversion `~ name`.
    ///
    /// # Example
    /// ```text
    /// cell , gene @ UMIs
    /// ```
    Binary {
        operator: Operator,
        left: Option<Box<Expr>>,
        right: Box<Expr>,
        /// Character offset of the operator in the cleaned query
        position: usize,
    },
}

impl Expr {
    pub fn operand(value: impl Into<String>, position: usize) -> Self {
        Expr::Operand {
            value: value.into(),
            position,
        }
    }

    pub fn binary(operator: Operator, left: Option<Expr>, right: Expr, position: usize) -> Self {
        Expr::Binary {
            operator,
            left: left.map(Box::new),
            right: Box::new(right),
            position,
        }
    }

    /// The operator at the root of this subtree, if any.
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Expr::Operand { .. } => None,
            Expr::Binary { operator, .. } => Some(*operator),
        }
    }

    /// The operand value if this subtree is a single operand.
    pub fn as_operand(&self) -> Option<&str> {
        match self {
            Expr::Operand { value, .. } => Some(value),
            Expr::Binary { .. } => None,
        }
    }

    /// Offset of the leftmost character of this subtree.
    pub fn position(&self) -> usize {
        match self {
            Expr::Operand { position, .. } => *position,
            Expr::Binary {
                left: Some(left), ..
            } => left.position(),
            Expr::Binary { position, .. } => *position,
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Operand { value, .. } => f.write_str(&escape(value)),
            Expr::Binary {
                operator,
                left: Some(left),
                right,
                ..
            } => write!(f, "{} {} {}", left, operator, right),
            Expr::Binary {
                operator, right, ..
            } => write!(f, "{} {}", operator, right),
        }
    }
}
