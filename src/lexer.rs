use thiserror::Error;

use crate::ast::{Operator, Token};
use crate::escape::is_safe_char;

/// Errors raised while splitting a query into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character: '{character}'\nin query: {query}\nat position: {position}")]
    UnexpectedCharacter {
        character: char,
        position: usize,
        query: String,
    },

    #[error("dangling escape character '\\' at the end of query: {query}")]
    DanglingEscape { position: usize, query: String },
}

/// Clean a raw query string into the single line all errors refer to.
///
/// Escaped characters are copied verbatim, except escaped whitespace, which
/// becomes an escaped space. An unescaped `#` starts a comment running to the
/// end of the line. Whitespace runs collapse into a single space with none
/// left at either end.
pub fn preprocess(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut pending_space = false;
    let mut in_comment = false;
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            continue;
        }
        match ch {
            '#' => {
                in_comment = true;
                pending_space = true;
            }
            c if c.is_whitespace() => pending_space = true,
            c => {
                if pending_space && !cleaned.is_empty() {
                    cleaned.push(' ');
                }
                pending_space = false;
                cleaned.push(c);
                if c == '\\'
                    && let Some(escaped) = chars.next()
                {
                    // Any escaped whitespace is an escaped space.
                    cleaned.push(if escaped.is_whitespace() { ' ' } else { escaped });
                }
            }
        }
    }

    cleaned
}

pub struct Lexer {
    query: String,
    input: Vec<char>,
    position: usize,
    token_position: usize,
}

impl Lexer {
    /// Create a lexer over the preprocessed form of `input`.
    pub fn new(input: &str) -> Self {
        let query = preprocess(input);
        Lexer {
            input: query.chars().collect(),
            query,
            position: 0,
            token_position: 0,
        }
    }

    /// The cleaned one-line query being tokenized.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Character offset of the token most recently returned.
    pub fn token_position(&self) -> usize {
        self.token_position
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.current_char() == Some(' ') {
            self.advance();
        }
    }

    fn read_operand(&mut self) -> Result<String, LexError> {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '\\' {
                match self.peek_char(1) {
                    Some(escaped) => {
                        result.push(escaped);
                        self.advance();
                        self.advance();
                    }
                    None => {
                        return Err(LexError::DanglingEscape {
                            position: self.position,
                            query: self.query.clone(),
                        });
                    }
                }
            } else if is_safe_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Ok(result)
    }

    fn read_operator(&mut self) -> Option<Operator> {
        let operator = Operator::LEXING_ORDER.into_iter().find(|operator| {
            operator
                .symbol()
                .chars()
                .enumerate()
                .all(|(offset, expected)| self.peek_char(offset) == Some(expected))
        })?;
        self.position += operator.symbol().chars().count();
        Some(operator)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_position = self.position;

        match self.current_char() {
            None => Ok(Token::Eof),
            Some(ch) if ch == '\\' || is_safe_char(ch) => Ok(Token::Operand(self.read_operand()?)),
            Some(ch) => match self.read_operator() {
                Some(operator) => Ok(Token::Operator(operator)),
                None => Err(LexError::UnexpectedCharacter {
                    character: ch,
                    position: self.position,
                    query: self.query.clone(),
                }),
            },
        }
    }
}

#[test]
fn test_preprocess_strips_comments_and_whitespace() {
    let cleaned = preprocess("  cell , gene   # the axes\n\t@ UMIs # the matrix\n");
    assert_eq!(cleaned, "cell , gene @ UMIs");
}

#[test]
fn test_preprocess_keeps_escaped_characters() {
    assert_eq!(preprocess("a\\#b # c"), "a\\#b");
    assert_eq!(preprocess("x = a\\ \\ b  "), "x = a\\ \\ b");
    assert_eq!(preprocess("name = end\\ "), "name = end\\ ");
}

#[test]
fn test_preprocess_turns_escaped_whitespace_into_space() {
    assert_eq!(preprocess("gene & a\\\nb @ name"), "gene & a\\ b @ name");
    assert_eq!(preprocess("a\\\tb\\\r\n"), "a\\ b\\ ");
}

#[test]
fn test_longest_operator_wins() {
    let mut lexer = Lexer::new("%> <= >= != !~ % < > = ~");
    let expected = [
        Operator::Reduce,
        Operator::LessEqual,
        Operator::GreaterEqual,
        Operator::NotEqual,
        Operator::NotMatch,
        Operator::Eltwise,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::Equal,
        Operator::Match,
    ];
    for operator in expected {
        assert_eq!(lexer.next_token().unwrap(), Token::Operator(operator));
    }
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}
