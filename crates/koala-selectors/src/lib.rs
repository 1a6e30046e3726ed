//! CSS selector compiler and tree-matching engine.
//!
//! Turns selector text such as `ul > li:nth-child(2n+1)[data-x^='a']` into a
//! reusable [`CompiledSelector`] and evaluates it against any tree that
//! implements [`TreeAdapter`].
//!
//! # Pipeline
//!
//! ```text
//! text ──► tokenizer ──► parser (shift-reduce tables) ──► CompiledSelector
//!                                                              │  (cached)
//! tree ◄── predicates ◄── matcher (memoized) ◄── seeds ◄──────┘
//! ```
//!
//! - [`tokenizer`]: flat token stream, with a start-condition stack for
//!   attribute brackets, function arguments, and `:not(...)`.
//! - [`parser`]: table-driven SLR parser whose semantic actions build the
//!   [`selector`] model.
//! - [`cache`]: compiled selectors by exact text.
//! - [`matcher`]: seed generation, right-to-left chain matching with
//!   memoized backtracking, and the [`matcher::predicates`] library.
//! - [`engine`]: `querySelectorAll`, `querySelector`, `matches`, `closest`.
//!
//! # Example
//!
//! ```
//! use koala_dom::TreeBuilder;
//! use koala_selectors::QueryEngine;
//!
//! let mut builder = TreeBuilder::new();
//! let div = builder.open("div", &[]);
//! let _ = builder.open("p", &[]);
//! let span = builder.leaf("span", &[]);
//! let tree = builder.finish();
//!
//! let engine = QueryEngine::new();
//! assert_eq!(engine.closest(&tree, span, "div").unwrap(), Some(div));
//! assert!(engine.matches(&tree, span, "div span").unwrap());
//! ```

pub mod adapter;
pub mod cache;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod selector;
pub mod tokenizer;

pub use adapter::{NodeKind, TreeAdapter};
pub use cache::{CacheStats, SelectorCache};
pub use engine::{DEFAULT_CACHE_CAPACITY, EngineConfig, QueryEngine};
pub use error::{SelectorError, SyntaxError};
pub use parser::compile;
pub use selector::{
    AnPlusB, AttributeOperator, AttributeSelector, Combinator, CompiledSelector, NthKind,
    PseudoClass, PseudoSelector, SelectorChain, SelectorGroup, SimpleSelector,
    SimpleSelectorSequence,
};
