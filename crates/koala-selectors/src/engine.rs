//! The public query API.
//!
//! [Selectors API Level 2](https://www.w3.org/TR/selectors-api2/) and
//! [DOM § 4.2.6](https://dom.spec.whatwg.org/#interface-parentnode):
//! `querySelectorAll`, `querySelector`, `matches`, `closest`.
//!
//! A [`QueryEngine`] owns the compiled-selector cache. Nothing else is kept
//! between calls: every query builds its own memo table and drops it on return.

use std::sync::Arc;

use serde::Deserialize;

use crate::adapter::TreeAdapter;
use crate::cache::SelectorCache;
use crate::error::SelectorError;
use crate::selector::CompiledSelector;

/// Default bound on the number of cached compiled selectors.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Engine settings.
///
/// Deserializable so a host can load it from its own configuration; any
/// missing field takes its default.
///
/// ```
/// use koala_selectors::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.cache_capacity, Some(1024));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of compiled selectors to keep. `None` keeps every
    /// selector ever compiled; `Some(0)` disables caching.
    pub cache_capacity: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: Some(DEFAULT_CACHE_CAPACITY),
        }
    }
}

/// Compiles, caches, and evaluates selectors against any [`TreeAdapter`].
///
/// ```
/// use koala_dom::TreeBuilder;
/// use koala_selectors::QueryEngine;
///
/// let mut builder = TreeBuilder::new();
/// let _ = builder.open("ul", &[]);
/// let first = builder.leaf("li", &[("class", "done")]);
/// let _ = builder.leaf("li", &[]);
/// let tree = builder.finish();
///
/// let engine = QueryEngine::new();
/// let done = engine.query_selector_all(&tree, tree.root(), "ul > li.done").unwrap();
/// assert_eq!(done, vec![first]);
/// ```
#[derive(Debug, Default)]
pub struct QueryEngine {
    cache: SelectorCache,
}

impl QueryEngine {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with `config`.
    #[must_use]
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            cache: SelectorCache::new(config.cache_capacity),
        }
    }

    /// The compiled-selector cache.
    #[must_use]
    pub const fn cache(&self) -> &SelectorCache {
        &self.cache
    }

    /// Compile `text`, or fetch it from the cache.
    ///
    /// # Errors
    ///
    /// [`SelectorError::Syntax`] if `text` is not a valid selector group.
    pub fn compile(&self, text: &str) -> Result<Arc<CompiledSelector>, SelectorError> {
        Ok(self.cache.get_or_compile(text)?)
    }

    /// [§ 6.4 querySelectorAll](https://www.w3.org/TR/selectors-api2/#dom-parentnode-queryselectorall)
    ///
    /// Every element under `root` matched by `text`, de-duplicated and in
    /// document order. `root` itself is never included. Never `None`: no
    /// match is an empty vector.
    ///
    /// # Errors
    ///
    /// [`SelectorError::Syntax`] if `text` does not compile;
    /// [`SelectorError::UnsupportedPseudo`] if matching reaches an
    /// unsupported pseudo-class.
    pub fn query_selector_all<A: TreeAdapter>(
        &self,
        tree: &A,
        root: A::Handle,
        text: &str,
    ) -> Result<Vec<A::Handle>, SelectorError> {
        self.compile(text)?.select(tree, root)
    }

    /// [§ 6.3 querySelector](https://www.w3.org/TR/selectors-api2/#dom-parentnode-queryselector)
    ///
    /// The first element, in document order, that `query_selector_all` would return.
    ///
    /// # Errors
    ///
    /// As for [`QueryEngine::query_selector_all`].
    pub fn query_selector<A: TreeAdapter>(
        &self,
        tree: &A,
        root: A::Handle,
        text: &str,
    ) -> Result<Option<A::Handle>, SelectorError> {
        Ok(self.query_selector_all(tree, root, text)?.into_iter().next())
    }

    /// [DOM § 4.9 matches](https://dom.spec.whatwg.org/#dom-element-matches)
    ///
    /// Whether `element` is matched by `text`. Non-element nodes never match.
    ///
    /// # Errors
    ///
    /// As for [`QueryEngine::query_selector_all`].
    pub fn matches<A: TreeAdapter>(
        &self,
        tree: &A,
        element: A::Handle,
        text: &str,
    ) -> Result<bool, SelectorError> {
        self.compile(text)?.matches(tree, element)
    }

    /// [DOM § 4.9 closest](https://dom.spec.whatwg.org/#dom-element-closest)
    ///
    /// "Return the first (starting at element) inclusive ancestor of element
    /// that matches selectors, and null otherwise."
    ///
    /// The walk stops at the first non-element ancestor (the document).
    ///
    /// # Errors
    ///
    /// As for [`QueryEngine::query_selector_all`].
    pub fn closest<A: TreeAdapter>(
        &self,
        tree: &A,
        element: A::Handle,
        text: &str,
    ) -> Result<Option<A::Handle>, SelectorError> {
        let compiled = self.compile(text)?;

        let mut current = Some(element).filter(|&node| tree.is_element(node));
        while let Some(node) = current {
            if compiled.matches(tree, node)? {
                return Ok(Some(node));
            }
            current = tree.parent(node).filter(|&parent| tree.is_element(parent));
        }
        Ok(None)
    }
}
