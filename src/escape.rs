//! Escaping of names and values embedded in query strings.
//!
//! Operands in a query are maximal runs of *safe* characters. Anything else
//! (spaces, operator symbols, quotes, ...) must be preceded by a backslash to
//! be part of an operand:
//!
//! ```
//! use axis_query::escape::{escape, unescape};
//!
//! assert_eq!(escape("T cell"), "T\\ cell");
//! assert_eq!(unescape("T\\ cell"), "T cell");
//! ```

/// Whether a character may appear in an operand without a preceding `\`.
pub fn is_safe_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '+' | '-') || !ch.is_ascii()
}

/// Prefix every unsafe character with a backslash.
pub fn escape(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for ch in token.chars() {
        if !is_safe_char(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Remove escaping backslashes, keeping the character following each one.
///
/// A trailing lone backslash is kept as-is; the lexer rejects such operands
/// before they ever reach this function.
pub fn unescape(token: &str) -> String {
    let mut unescaped = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => unescaped.push(next),
                None => unescaped.push('\\'),
            }
        } else {
            unescaped.push(ch);
        }
    }
    unescaped
}
