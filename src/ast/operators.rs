use std::cmp::Ordering;

use crate::ast::Operator;

/// Operators comparing a property value with a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparisonOperator {
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Equal (`=`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Regex match (`~`)
    Match,
    /// Regex not-match (`!~`)
    NotMatch,
}

impl ComparisonOperator {
    pub fn from_operator(operator: Operator) -> Option<Self> {
        match operator {
            Operator::LessThan => Some(ComparisonOperator::LessThan),
            Operator::LessEqual => Some(ComparisonOperator::LessEqual),
            Operator::Equal => Some(ComparisonOperator::Equal),
            Operator::NotEqual => Some(ComparisonOperator::NotEqual),
            Operator::GreaterThan => Some(ComparisonOperator::GreaterThan),
            Operator::GreaterEqual => Some(ComparisonOperator::GreaterEqual),
            Operator::Match => Some(ComparisonOperator::Match),
            Operator::NotMatch => Some(ComparisonOperator::NotMatch),
            _ => None,
        }
    }

    pub fn operator(self) -> Operator {
        match self {
            ComparisonOperator::LessThan => Operator::LessThan,
            ComparisonOperator::LessEqual => Operator::LessEqual,
            ComparisonOperator::Equal => Operator::Equal,
            ComparisonOperator::NotEqual => Operator::NotEqual,
            ComparisonOperator::GreaterThan => Operator::GreaterThan,
            ComparisonOperator::GreaterEqual => Operator::GreaterEqual,
            ComparisonOperator::Match => Operator::Match,
            ComparisonOperator::NotMatch => Operator::NotMatch,
        }
    }

    /// Whether this is `~` or `!~`, which need a string property.
    pub fn is_regex(self) -> bool {
        matches!(self, ComparisonOperator::Match | ComparisonOperator::NotMatch)
    }

    /// Whether `value <op> literal` holds given `value.partial_cmp(literal)`.
    ///
    /// Unordered values (NaN) only satisfy `!=`.
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (ComparisonOperator::NotEqual, None) => true,
            (_, None) => false,
            (ComparisonOperator::LessThan, Some(o)) => o == Ordering::Less,
            (ComparisonOperator::LessEqual, Some(o)) => o != Ordering::Greater,
            (ComparisonOperator::Equal, Some(o)) => o == Ordering::Equal,
            (ComparisonOperator::NotEqual, Some(o)) => o != Ordering::Equal,
            (ComparisonOperator::GreaterThan, Some(o)) => o == Ordering::Greater,
            (ComparisonOperator::GreaterEqual, Some(o)) => o != Ordering::Less,
            (ComparisonOperator::Match | ComparisonOperator::NotMatch, Some(_)) => false,
        }
    }
}

/// Boolean combinators applied to the running mask of a filtered axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterOperator {
    /// Keep entries in both (`&`)
    And,
    /// Keep entries in either (`|`)
    Or,
    /// Keep entries in exactly one (`^`)
    Xor,
}

impl FilterOperator {
    pub fn from_operator(operator: Operator) -> Option<Self> {
        match operator {
            Operator::And => Some(FilterOperator::And),
            Operator::Or => Some(FilterOperator::Or),
            Operator::Xor => Some(FilterOperator::Xor),
            _ => None,
        }
    }

    pub fn operator(self) -> Operator {
        match self {
            FilterOperator::And => Operator::And,
            FilterOperator::Or => Operator::Or,
            FilterOperator::Xor => Operator::Xor,
        }
    }

    /// Combine one entry of the running mask with one entry of a filter.
    pub fn combine(self, mask: bool, filter: bool) -> bool {
        match self {
            FilterOperator::And => mask && filter,
            FilterOperator::Or => mask || filter,
            FilterOperator::Xor => mask != filter,
        }
    }
}
