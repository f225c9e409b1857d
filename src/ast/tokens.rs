/// Lexical tokens produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A name or a literal value, already unescaped
    ///
    /// # Examples
    /// ```text
    /// cell
    /// UMIs
    /// 0.4
    /// T\ cell
    /// ```
    Operand(String),

    /// One of the fixed operator symbols
    Operator(Operator),

    /// End of query
    Eof,
}

/// Whether chains of the same operator group to the left or to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Every operator symbol of the query language.
///
/// The precedence and associativity of each symbol are part of the query
/// format and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// Reduce a matrix to a vector, or a vector to a scalar (`%>`)
    Reduce,
    /// Apply an element-wise operation (`%`)
    Eltwise,
    /// Look up a property (`@`)
    Lookup,
    /// Separate an operation name from its parameters (`;`)
    Semicolon,
    /// Pair axes, or separate parameter assignments (`,`)
    Comma,
    /// Filter AND (`&`)
    And,
    /// Filter OR (`|`)
    Or,
    /// Filter XOR (`^`)
    Xor,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Equal, entry selection, or parameter assignment (`=`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Regex match, or boolean inversion when used as a prefix (`~`)
    Match,
    /// Regex not-match (`!~`)
    NotMatch,
    /// Chained property lookup (`:`)
    Chain,
}

impl Operator {
    /// Operators ordered so that multi-character symbols are tried first.
    pub const LEXING_ORDER: [Operator; 17] = [
        Operator::Reduce,
        Operator::LessEqual,
        Operator::GreaterEqual,
        Operator::NotEqual,
        Operator::NotMatch,
        Operator::Eltwise,
        Operator::Lookup,
        Operator::Semicolon,
        Operator::Comma,
        Operator::And,
        Operator::Or,
        Operator::Xor,
        Operator::LessThan,
        Operator::Equal,
        Operator::GreaterThan,
        Operator::Match,
        Operator::Chain,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Reduce => "%>",
            Operator::Eltwise => "%",
            Operator::Lookup => "@",
            Operator::Semicolon => ";",
            Operator::Comma => ",",
            Operator::And => "&",
            Operator::Or => "|",
            Operator::Xor => "^",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterEqual => ">=",
            Operator::GreaterThan => ">",
            Operator::Match => "~",
            Operator::NotMatch => "!~",
            Operator::Chain => ":",
        }
    }

    /// Binding strength, 0 being the loosest.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Reduce => 0,
            Operator::Eltwise => 1,
            Operator::Lookup => 2,
            Operator::Semicolon | Operator::Comma => 3,
            Operator::And | Operator::Or | Operator::Xor => 4,
            Operator::LessThan
            | Operator::LessEqual
            | Operator::Equal
            | Operator::NotEqual
            | Operator::GreaterEqual
            | Operator::GreaterThan
            | Operator::Match
            | Operator::NotMatch => 5,
            Operator::Chain => 6,
        }
    }

    pub fn associativity(self) -> Associativity {
        match self {
            Operator::Reduce => Associativity::Left,
            _ => Associativity::Right,
        }
    }

    /// Whether this is one of the filter combinators `&`, `|`, `^`.
    pub fn is_filter(self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Xor)
    }

    /// Whether this operator compares a property with a literal value.
    pub fn is_comparison(self) -> bool {
        self.precedence() == 5
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
