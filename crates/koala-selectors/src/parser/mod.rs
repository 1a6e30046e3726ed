//! Selector compiler: tokenizer output in, [`SelectorGroup`] out.
//!
//! A classic table-driven LR parser. The action and goto tables are plain
//! data in [`tables`]; [`driver`] is the loop that interprets them and
//! assembles the AST in the semantic actions.

/// The shift-reduce loop and semantic actions.
pub mod driver;
/// Action and goto tables.
pub mod tables;

pub use driver::parse;

use crate::error::SyntaxError;
use crate::selector::{CompiledSelector, SelectorGroup};
use crate::tokenizer::tokenize;

/// Tokenize and parse `text`.
///
/// # Errors
///
/// Returns a [`SyntaxError`] if `text` is not a valid selector group.
pub fn compile(text: &str) -> Result<CompiledSelector, SyntaxError> {
    let group = parse(tokenize(text), text)?;
    Ok(CompiledSelector {
        text: text.to_string(),
        group,
    })
}
