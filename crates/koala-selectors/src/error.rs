//! Errors raised while compiling or evaluating selectors.
//!
//! Matching is total: missing attributes, absent ids, and malformed `an+b`
//! arguments are plain non-matches. Only two things are errors: text that
//! does not parse, and a pseudo-class the predicate library does not know.

use thiserror::Error;

use crate::tokenizer::TokenKind;

/// Any failure surfaced by the public query operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector text is malformed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A syntactically valid pseudo-class that no predicate implements.
    ///
    /// Raised lazily, only when matching actually evaluates it.
    #[error("unsupported pseudo-class `:{name}`")]
    UnsupportedPseudo {
        /// The pseudo-class name as written (without the colon).
        name: String,
    },
}

/// [Selectors API § 6](https://www.w3.org/TR/selectors-api2/#processing-selectors)
/// "If parsing fails, throw a `SyntaxError` exception."
///
/// Carries everything needed to point at the failure: where it happened,
/// what was found there, what the parser would have accepted instead, and
/// the rendered caret context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unexpected {found} at offset {position}, expected one of: {}\n{context}",
    join_kinds(.expected)
)]
pub struct SyntaxError {
    /// Character offset of the offending token in the selector text.
    pub position: usize,
    /// Kind of the offending token.
    pub found: TokenKind,
    /// Token kinds that had a valid action in the parser state at `position`.
    pub expected: Vec<TokenKind>,
    /// The selector text with a caret line under `position`.
    pub context: String,
}

impl SyntaxError {
    /// Build an error for `found` at `position` in `source`.
    #[must_use]
    pub fn new(source: &str, position: usize, found: TokenKind, expected: Vec<TokenKind>) -> Self {
        Self {
            position,
            found,
            expected,
            context: caret_context(source, position),
        }
    }
}

/// Render `source` followed by a line with `^` under the character at `position`.
///
/// Newlines and tabs in the selector are shown as spaces so the caret lines up.
fn caret_context(source: &str, position: usize) -> String {
    let line: String = source
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    format!("{line}\n{}^", " ".repeat(position))
}

fn join_kinds(kinds: &[TokenKind]) -> String {
    if kinds.is_empty() {
        return "nothing".to_string();
    }
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
