//! Tree matching: seeds, right-to-left chain matching, and result merging.
//!
//! A chain is matched from its subject leftwards. Child and next-sibling
//! combinators admit exactly one candidate and are walked directly
//! ([`Matcher::match_immediate`]); descendant and subsequent-sibling
//! combinators branch, and every branch point is memoized by
//! `(node, sequence order)` ([`Matcher::match_sub`]) so that a query costs at
//! most O(tree size x chain length) sub-matches.

/// Attribute and pseudo-class predicates.
pub mod predicates;

use std::collections::{HashMap, HashSet};

use crate::adapter::TreeAdapter;
use crate::error::SelectorError;
use crate::selector::{
    Combinator, CompiledSelector, SelectorChain, SelectorGroup, SimpleSelectorSequence,
};

pub use predicates::{attribute_value_matches, matches_simple, pseudo_matches};

/// Outcome of [`Matcher::match_immediate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<H> {
    /// The whole rest of the chain matched.
    Matched,
    /// Some sequence on the non-branching path failed.
    Failed,
    /// `node` matched the sequence at `order`, whose combinator branches; the
    /// remainder must be resolved by [`Matcher::match_sub`].
    Branch(H, usize),
}

/// Matches nodes against one chain, memoizing branch points.
///
/// The memo table lives exactly as long as the matcher. Create one per query:
/// results are only valid while the tree is not mutated.
pub struct Matcher<'a, A: TreeAdapter> {
    tree: &'a A,
    chain: &'a SelectorChain,
    memo: HashMap<(A::Handle, usize), bool>,
}

impl<'a, A: TreeAdapter> Matcher<'a, A> {
    /// Create a matcher with an empty memo table.
    #[must_use]
    pub fn new(tree: &'a A, chain: &'a SelectorChain) -> Self {
        Self {
            tree,
            chain,
            memo: HashMap::new(),
        }
    }

    /// Whether `node` is matched by the whole chain.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnsupportedPseudo`] if evaluation reaches an
    /// unsupported pseudo-class.
    pub fn matches(&mut self, node: A::Handle) -> Result<bool, SelectorError> {
        if !self.tree.is_element(node) {
            return Ok(false);
        }
        match self.chain.sequences.as_slice() {
            [] => Ok(false),
            [only] => self.single_match(node, only),
            _ => self.match_from(node, 0),
        }
    }

    /// AND of every simple selector in `sequence`, short-circuiting on the
    /// first failure.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnsupportedPseudo`] from the predicate library.
    pub fn single_match(
        &self,
        node: A::Handle,
        sequence: &SimpleSelectorSequence,
    ) -> Result<bool, SelectorError> {
        for selector in &sequence.selectors {
            if !matches_simple(self.tree, node, selector)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Match `node` against the sequence at `order`, then follow child and
    /// next-sibling combinators leftwards without branching.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnsupportedPseudo`] from the predicate library.
    pub fn match_immediate(
        &self,
        node: A::Handle,
        order: usize,
    ) -> Result<Step<A::Handle>, SelectorError> {
        let mut node = node;
        let mut order = order;

        loop {
            let Some(sequence) = self.chain.sequences.get(order) else {
                return Ok(Step::Failed);
            };
            if !self.single_match(node, sequence)? {
                return Ok(Step::Failed);
            }

            let next = match sequence.combinator {
                None => return Ok(Step::Matched),
                Some(Combinator::Child) => self.parent_element(node),
                Some(Combinator::NextSibling) => self.tree.previous_element_sibling(node),
                Some(Combinator::Descendant | Combinator::SubsequentSibling) => {
                    return Ok(Step::Branch(node, order));
                }
            };

            let Some(next) = next else {
                return Ok(Step::Failed);
            };
            node = next;
            order += 1;
        }
    }

    /// Given that `node` matched the sequence at `order`, whether any node
    /// reachable through that sequence's branching combinator (every element
    /// ancestor, or every preceding element sibling) matches the rest of the
    /// chain. Memoized by `(node, order)`.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnsupportedPseudo`] from the predicate library.
    pub fn match_sub(&mut self, node: A::Handle, order: usize) -> Result<bool, SelectorError> {
        if let Some(&cached) = self.memo.get(&(node, order)) {
            return Ok(cached);
        }

        let combinator = self
            .chain
            .sequences
            .get(order)
            .and_then(|sequence| sequence.combinator);
        let step = |tree: &A, current: A::Handle| match combinator {
            Some(Combinator::SubsequentSibling) => tree.previous_element_sibling(current),
            _ => tree
                .parent(current)
                .filter(|&parent| tree.is_element(parent)),
        };

        let mut found = false;
        let mut candidate = step(self.tree, node);
        while let Some(current) = candidate {
            if self.match_from(current, order + 1)? {
                found = true;
                break;
            }
            candidate = step(self.tree, current);
        }

        let _ = self.memo.insert((node, order), found);
        Ok(found)
    }

    fn match_from(&mut self, node: A::Handle, order: usize) -> Result<bool, SelectorError> {
        match self.match_immediate(node, order)? {
            Step::Matched => Ok(true),
            Step::Failed => Ok(false),
            Step::Branch(branch, branch_order) => self.match_sub(branch, branch_order),
        }
    }

    fn parent_element(&self, node: A::Handle) -> Option<A::Handle> {
        self.tree
            .parent(node)
            .filter(|&parent| self.tree.is_element(parent))
    }
}

/// Candidate nodes for a chain whose subject is `tail`, in document order.
///
/// In priority order:
/// 1. exactly one id selector, and the tree offers an id lookup: the node it
///    returns, after checking its id really is the requested one and that it
///    lies under `root`;
/// 2. a concrete type selector: the elements under `root` with that name;
/// 3. otherwise every element under `root`.
///
/// `root` itself is never a seed.
#[must_use]
pub fn seeds<A: TreeAdapter>(
    tree: &A,
    tail: &SimpleSelectorSequence,
    root: A::Handle,
) -> Vec<A::Handle> {
    if let Some(id) = tail.sole_id()
        && let Some(found) = tree.element_by_id(id)
        && tree.id(found) == Some(id)
        && is_strict_descendant(tree, found, root)
    {
        log::trace!(target: "koala::selectors", "seeded #{id} from id lookup");
        return vec![found];
    }

    let elements = subtree_elements(tree, root);
    match tail.type_name() {
        Some(name) => elements
            .into_iter()
            .filter(|&node| {
                tree.local_name(node)
                    .is_some_and(|local| local.eq_ignore_ascii_case(name))
            })
            .collect(),
        None => elements,
    }
}

/// Every element strictly under `root`, in tree order (pre-order, depth first).
#[must_use]
pub fn subtree_elements<A: TreeAdapter>(tree: &A, root: A::Handle) -> Vec<A::Handle> {
    let mut elements = Vec::new();
    let mut stack: Vec<A::Handle> = tree.children(root).collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        if tree.is_element(node) {
            elements.push(node);
        }
        let first = stack.len();
        stack.extend(tree.children(node));
        stack[first..].reverse();
    }
    elements
}

fn is_strict_descendant<A: TreeAdapter>(tree: &A, node: A::Handle, root: A::Handle) -> bool {
    let mut current = tree.parent(node);
    while let Some(ancestor) = current {
        if ancestor == root {
            return true;
        }
        current = tree.parent(ancestor);
    }
    false
}

/// Every node under `root` matched by `chain`, in document order.
///
/// # Errors
///
/// [`SelectorError::UnsupportedPseudo`] from the predicate library.
pub fn select_chain<A: TreeAdapter>(
    tree: &A,
    chain: &SelectorChain,
    root: A::Handle,
) -> Result<Vec<A::Handle>, SelectorError> {
    let Some(tail) = chain.tail() else {
        return Ok(Vec::new());
    };

    let mut matcher = Matcher::new(tree, chain);
    let mut matched = Vec::new();
    for seed in seeds(tree, tail, root) {
        if matcher.matches(seed)? {
            matched.push(seed);
        }
    }
    Ok(matched)
}

/// Every node under `root` matched by any chain of `group`: de-duplicated,
/// in document order.
///
/// # Errors
///
/// [`SelectorError::UnsupportedPseudo`] from the predicate library.
pub fn select_group<A: TreeAdapter>(
    tree: &A,
    group: &SelectorGroup,
    root: A::Handle,
) -> Result<Vec<A::Handle>, SelectorError> {
    let mut per_chain = Vec::with_capacity(group.chains.len());
    for chain in &group.chains {
        let matched = select_chain(tree, chain, root)?;
        if !matched.is_empty() {
            per_chain.push(matched);
        }
    }

    if per_chain.len() <= 1 {
        return Ok(per_chain.pop().unwrap_or_default());
    }

    // More than one alternative contributed: merge, then restore tree order.
    let merged: HashSet<A::Handle> = per_chain.into_iter().flatten().collect();
    Ok(subtree_elements(tree, root)
        .into_iter()
        .filter(|node| merged.contains(node))
        .collect())
}

impl CompiledSelector {
    /// [Selectors API § 6.4 querySelectorAll](https://www.w3.org/TR/selectors-api2/#dom-parentnode-queryselectorall)
    ///
    /// Every element under `root` (excluding `root`) that this selector
    /// matches, in document order.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnsupportedPseudo`] if matching reaches an
    /// unsupported pseudo-class.
    pub fn select<A: TreeAdapter>(
        &self,
        tree: &A,
        root: A::Handle,
    ) -> Result<Vec<A::Handle>, SelectorError> {
        select_group(tree, &self.group, root)
    }

    /// Whether `element` is matched by any chain of this selector.
    ///
    /// Ancestors and siblings are not limited to any scoping root.
    ///
    /// # Errors
    ///
    /// [`SelectorError::UnsupportedPseudo`] if matching reaches an
    /// unsupported pseudo-class.
    pub fn matches<A: TreeAdapter>(
        &self,
        tree: &A,
        element: A::Handle,
    ) -> Result<bool, SelectorError> {
        for chain in &self.group.chains {
            if Matcher::new(tree, chain).matches(element)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
