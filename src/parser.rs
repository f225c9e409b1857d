use thiserror::Error;

use crate::{
    ast::{Associativity, Expr, Operator, Token},
    lexer::{LexError, Lexer},
    registry::OperationKind,
};

/// Errors raised while parsing a query string into a typed query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("empty query")]
    EmptyQuery,

    #[error("{message}\nin query: {query}\nat position: {position}")]
    Syntax {
        query: String,
        position: usize,
        message: String,
    },

    #[error("unknown {kind} operation: {operation}\nin query: {query}")]
    UnknownOperation {
        kind: OperationKind,
        operation: String,
        query: String,
    },

    #[error("unknown parameter: {parameter}\nfor the {kind} operation: {operation}\nin query: {query}")]
    UnknownParameter {
        kind: OperationKind,
        operation: String,
        parameter: String,
        query: String,
    },

    #[error("repeated parameter: {parameter}\nfor the {kind} operation: {operation}\nin query: {query}")]
    DuplicateParameter {
        kind: OperationKind,
        operation: String,
        parameter: String,
        query: String,
    },

    #[error(
        "invalid value: {value}\nfor the parameter: {parameter}\nof the {kind} operation: {operation}\nexpected: {expected}\nin query: {query}"
    )]
    InvalidParameterValue {
        kind: OperationKind,
        operation: String,
        parameter: String,
        value: String,
        expected: String,
        query: String,
    },
}

/// Precedence parser producing the generic binary [`Expr`] tree.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_position: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_position();
        Ok(Parser {
            lexer,
            current_token,
            current_position,
        })
    }

    /// The cleaned one-line query being parsed.
    pub fn query(&self) -> &str {
        self.lexer.query()
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.current_position = self.lexer.token_position();
        Ok(())
    }

    fn syntax_error(&self, message: String) -> ParseError {
        ParseError::Syntax {
            query: self.query().to_string(),
            position: self.current_position,
            message,
        }
    }

    fn describe_current(&self) -> String {
        match &self.current_token {
            Token::Operand(value) => format!("operand: {}", crate::escape::escape(value)),
            Token::Operator(operator) => format!("operator: {}", operator),
            Token::Eof => "end of query".to_string(),
        }
    }

    /// Parse an operand, or the prefix inversion `~ operand`.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match std::mem::replace(&mut self.current_token, Token::Eof) {
            Token::Operand(value) => {
                let position = self.current_position;
                self.advance()?;
                Ok(Expr::operand(value, position))
            }
            Token::Operator(Operator::Match) => {
                let position = self.current_position;
                self.advance()?;
                let right = self.parse_expression(Operator::Match.precedence())?;
                Ok(Expr::binary(Operator::Match, None, right, position))
            }
            token => {
                self.current_token = token;
                Err(self.syntax_error(format!(
                    "expected: operand\nfound: {}",
                    self.describe_current()
                )))
            }
        }
    }

    /// Precedence climbing over the binary operators.
    fn parse_expression(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;

        while let Token::Operator(operator) = self.current_token {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            let position = self.current_position;
            self.advance()?;

            let next_precedence = match operator.associativity() {
                Associativity::Left => precedence + 1,
                Associativity::Right => precedence,
            };
            let right = self.parse_expression(next_precedence)?;
            left = Expr::binary(operator, Some(left), right, position);
        }

        Ok(left)
    }

    /// Parse the whole query into a generic expression tree.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.current_token == Token::Eof {
            return Err(ParseError::EmptyQuery);
        }
        let expr = self.parse_expression(0)?;
        if self.current_token != Token::Eof {
            return Err(self.syntax_error(format!(
                "expected: operator\nfound: {}",
                self.describe_current()
            )));
        }
        tracing::trace!(query = %self.query(), "parsed expression tree");
        Ok(expr)
    }
}

/// Tokenize and parse `input` into a generic expression tree.
///
/// Returns the tree together with the cleaned query it was parsed from.
pub fn parse_expression(input: &str) -> Result<(Expr, String), ParseError> {
    let mut parser = Parser::new(Lexer::new(input))?;
    let expr = parser.parse()?;
    Ok((expr, parser.query().to_string()))
}

#[test]
fn test_empty_query() {
    assert_eq!(parse_expression("  # nothing here\n").unwrap_err(), ParseError::EmptyQuery);
}

#[test]
fn test_reduce_is_left_associative() {
    let (expr, _) = parse_expression("m %> Sum %> Max").unwrap();
    match expr {
        Expr::Binary {
            operator: Operator::Reduce,
            left: Some(left),
            right,
            ..
        } => {
            assert_eq!(left.operator(), Some(Operator::Reduce));
            assert_eq!(right.as_operand(), Some("Max"));
        }
        _ => panic!("Expected reduction at the root"),
    }
}
