// tests/lexer_tests.rs

use axis_query::ast::{Operator, Token};
use axis_query::lexer::{LexError, Lexer, preprocess};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        if token == Token::Eof {
            return tokens;
        }
        tokens.push(token);
    }
}

fn operand(value: &str) -> Token {
    Token::Operand(value.to_string())
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_single_char_operators() {
    let test_cases = vec![
        ("%", Operator::Eltwise),
        ("@", Operator::Lookup),
        (";", Operator::Semicolon),
        (",", Operator::Comma),
        ("&", Operator::And),
        ("|", Operator::Or),
        ("^", Operator::Xor),
        ("<", Operator::LessThan),
        ("=", Operator::Equal),
        (">", Operator::GreaterThan),
        ("~", Operator::Match),
        (":", Operator::Chain),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, Token::Operator(expected), "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_two_char_operators() {
    let test_cases = vec![
        ("%>", Operator::Reduce),
        ("<=", Operator::LessEqual),
        ("!=", Operator::NotEqual),
        (">=", Operator::GreaterEqual),
        ("!~", Operator::NotMatch),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap(), Token::Operator(expected), "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_operators_without_spaces() {
    assert_eq!(
        tokens("a%>b<=c"),
        vec![
            operand("a"),
            Token::Operator(Operator::Reduce),
            operand("b"),
            Token::Operator(Operator::LessEqual),
            operand("c"),
        ]
    );
}

#[test]
fn test_operator_precedence_table() {
    assert_eq!(Operator::Reduce.precedence(), 0);
    assert_eq!(Operator::Eltwise.precedence(), 1);
    assert_eq!(Operator::Lookup.precedence(), 2);
    assert_eq!(Operator::Semicolon.precedence(), 3);
    assert_eq!(Operator::Comma.precedence(), 3);
    assert_eq!(Operator::Xor.precedence(), 4);
    assert_eq!(Operator::NotMatch.precedence(), 5);
    assert_eq!(Operator::Chain.precedence(), 6);
}

// ============================================================================
// Operands
// ============================================================================

#[test]
fn test_operand_characters() {
    assert_eq!(tokens("cell.type_2"), vec![operand("cell.type_2")]);
    assert_eq!(tokens("-1.5e+3"), vec![operand("-1.5e+3")]);
    assert_eq!(tokens("Zellgröße"), vec![operand("Zellgröße")]);
}

#[test]
fn test_escaped_operands() {
    assert_eq!(tokens("cell\\ type"), vec![operand("cell type")]);
    assert_eq!(tokens("a\\,b , c"), vec![operand("a,b"), Token::Operator(Operator::Comma), operand("c")]);
    assert_eq!(tokens("\\#tag"), vec![operand("#tag")]);
    assert_eq!(tokens("\\@"), vec![operand("@")]);
}

#[test]
fn test_full_query() {
    assert_eq!(
        tokens("cell & ~ doublet , gene @ UMIs"),
        vec![
            operand("cell"),
            Token::Operator(Operator::And),
            Token::Operator(Operator::Match),
            operand("doublet"),
            Token::Operator(Operator::Comma),
            operand("gene"),
            Token::Operator(Operator::Lookup),
            operand("UMIs"),
        ]
    );
}

// ============================================================================
// Preprocessing
// ============================================================================

#[test]
fn test_comments_are_removed() {
    assert_eq!(
        tokens("gene # the axis\n @ score # the property"),
        vec![operand("gene"), Token::Operator(Operator::Lookup), operand("score")]
    );
}

#[test]
fn test_escaped_line_break_stays_on_one_line() {
    let cleaned = preprocess("gene & a\\\nb @ name");
    assert_eq!(cleaned, "gene & a\\ b @ name");
    assert!(!cleaned.contains('\n'));
    assert_eq!(tokens("a\\\nb"), vec![operand("a b")]);
}

#[test]
fn test_preprocess_collapses_whitespace() {
    assert_eq!(preprocess("\n  gene\t\t@   score  \n"), "gene @ score");
    assert_eq!(preprocess("# only a comment"), "");
}

#[test]
fn test_token_positions_refer_to_cleaned_query() {
    let mut lexer = Lexer::new("   gene    @ score");
    assert_eq!(lexer.query(), "gene @ score");
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_position(), 0);
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_position(), 5);
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_position(), 7);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unexpected_character() {
    let mut lexer = Lexer::new("gene @ (score)");
    assert_eq!(lexer.next_token().unwrap(), operand("gene"));
    assert_eq!(lexer.next_token().unwrap(), Token::Operator(Operator::Lookup));
    let error = lexer.next_token().unwrap_err();
    assert_eq!(
        error,
        LexError::UnexpectedCharacter {
            character: '(',
            position: 7,
            query: "gene @ (score)".to_string(),
        }
    );
    assert!(error.to_string().starts_with("unexpected character: '('"));
}

#[test]
fn test_lone_bang_is_rejected() {
    let mut lexer = Lexer::new("!");
    assert!(matches!(
        lexer.next_token(),
        Err(LexError::UnexpectedCharacter { character: '!', .. })
    ));
}

#[test]
fn test_dangling_escape() {
    let mut lexer = Lexer::new("score\\");
    assert!(matches!(lexer.next_token(), Err(LexError::DanglingEscape { .. })));
}
