//! The predicate library: one test per simple selector kind.
//!
//! Predicates are pure functions of node state. A missing attribute or a
//! malformed `an+b` argument is a non-match, never an error; the only error
//! is a pseudo-class with no predicate at all.

use crate::adapter::{NodeKind, TreeAdapter};
use crate::error::SelectorError;
use crate::selector::{
    AnPlusB, AttributeSelector, NthKind, PseudoClass, PseudoSelector, SimpleSelector,
};

/// Elements that [§ 4.10.18.5](https://html.spec.whatwg.org/multipage/form-control-infrastructure.html#concept-fe-disabled)
/// can be actually disabled, and so match `:enabled` or `:disabled`.
const DISABLEABLE: &[&str] = &[
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

/// Test one simple selector against `node`.
///
/// # Errors
///
/// [`SelectorError::UnsupportedPseudo`] if evaluation reaches a pseudo-class
/// the library does not implement.
pub fn matches_simple<A: TreeAdapter>(
    tree: &A,
    node: A::Handle,
    selector: &SimpleSelector,
) -> Result<bool, SelectorError> {
    let matched = match selector {
        SimpleSelector::Type(name) => tree
            .local_name(node)
            .is_some_and(|local| local.eq_ignore_ascii_case(name)),
        SimpleSelector::Universal => tree.is_element(node),
        SimpleSelector::Id(id) => tree.id(node) == Some(id.as_str()),
        SimpleSelector::Class(class) => tree.has_class(node, class),
        SimpleSelector::Attribute(attribute) => tree
            .attribute(node, attribute.name())
            .is_some_and(|actual| attribute_value_matches(attribute, actual)),
        SimpleSelector::Pseudo(pseudo) => return pseudo_matches(tree, node, pseudo),
        SimpleSelector::Negation(inner) => !matches_simple(tree, node, inner)?,
    };
    Ok(matched)
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Test an attribute's `actual` value (the attribute is known to be present).
///
/// "If 'val' contains whitespace, it will never represent anything (since the
/// words are separated by spaces). Also if 'val' is the empty string, it will
/// never represent anything." The same empty-string rule applies to `^=`,
/// `$=`, and `*=`.
#[must_use]
pub fn attribute_value_matches(selector: &AttributeSelector, actual: &str) -> bool {
    match selector {
        AttributeSelector::Exists(_) => true,
        AttributeSelector::Equals(_, value) => actual == value,
        AttributeSelector::Includes(_, value) => {
            !value.is_empty()
                && !value.contains(|c: char| c.is_ascii_whitespace())
                && actual.split_ascii_whitespace().any(|word| word == value)
        }
        AttributeSelector::DashMatch(_, value) => {
            actual == value
                || actual
                    .strip_prefix(value.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttributeSelector::PrefixMatch(_, value) => {
            !value.is_empty() && actual.starts_with(value.as_str())
        }
        AttributeSelector::SuffixMatch(_, value) => {
            !value.is_empty() && actual.ends_with(value.as_str())
        }
        AttributeSelector::SubstringMatch(_, value) => {
            !value.is_empty() && actual.contains(value.as_str())
        }
    }
}

/// Test a pseudo-class.
///
/// # Errors
///
/// [`SelectorError::UnsupportedPseudo`] for [`PseudoSelector::Unsupported`].
pub fn pseudo_matches<A: TreeAdapter>(
    tree: &A,
    node: A::Handle,
    pseudo: &PseudoSelector,
) -> Result<bool, SelectorError> {
    match pseudo {
        PseudoSelector::Class(class) => Ok(pseudo_class_matches(tree, node, *class)),
        PseudoSelector::Nth { kind, formula, .. } => {
            Ok(formula.is_some_and(|formula| nth_matches(tree, node, *kind, formula)))
        }
        PseudoSelector::Lang(lang) => Ok(lang_matches(tree, node, lang)),
        PseudoSelector::Unsupported { name, .. } => {
            Err(SelectorError::UnsupportedPseudo { name: name.clone() })
        }
    }
}

fn pseudo_class_matches<A: TreeAdapter>(tree: &A, node: A::Handle, class: PseudoClass) -> bool {
    match class {
        // [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
        // "The :root pseudo-class represents an element that is the root of the document."
        PseudoClass::Root => tree.document_element(node) == Some(node),

        // "Same as :nth-child(1)." and friends.
        PseudoClass::FirstChild => nth_matches(tree, node, NthKind::NthChild, AnPlusB::FIRST),
        PseudoClass::LastChild => nth_matches(tree, node, NthKind::NthLastChild, AnPlusB::FIRST),
        PseudoClass::FirstOfType => nth_matches(tree, node, NthKind::NthOfType, AnPlusB::FIRST),
        PseudoClass::LastOfType => {
            nth_matches(tree, node, NthKind::NthLastOfType, AnPlusB::FIRST)
        }

        // "Same as :first-child:last-child"
        PseudoClass::OnlyChild => {
            pseudo_class_matches(tree, node, PseudoClass::FirstChild)
                && pseudo_class_matches(tree, node, PseudoClass::LastChild)
        }
        PseudoClass::OnlyOfType => {
            pseudo_class_matches(tree, node, PseudoClass::FirstOfType)
                && pseudo_class_matches(tree, node, PseudoClass::LastOfType)
        }

        // [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
        // No element, text, or CDATA children. Comments do not count; a
        // whitespace-only text node does.
        PseudoClass::Empty => tree.children(node).all(|child| {
            !matches!(
                tree.node_kind(child),
                NodeKind::Element | NodeKind::Text | NodeKind::CData
            )
        }),

        // [§ 8.2 :link](https://www.w3.org/TR/selectors-4/#the-link-pseudo)
        // "a and area elements that have an href attribute"
        PseudoClass::Link => {
            local_name_is(tree, node, &["a", "area"]) && tree.attribute(node, "href").is_some()
        }

        PseudoClass::Enabled => {
            local_name_is(tree, node, DISABLEABLE) && tree.attribute(node, "disabled").is_none()
        }
        PseudoClass::Disabled => {
            local_name_is(tree, node, DISABLEABLE) && tree.attribute(node, "disabled").is_some()
        }

        // [§ 4.16.3 :checked](https://html.spec.whatwg.org/multipage/semantics-other.html#selector-checked)
        // "input elements whose checkedness is true, option elements whose
        // selectedness is true"
        PseudoClass::Checked => {
            (local_name_is(tree, node, &["input"]) && tree.attribute(node, "checked").is_some())
                || (local_name_is(tree, node, &["option"])
                    && tree.attribute(node, "selected").is_some())
        }

        // [§ 8.4 :target](https://www.w3.org/TR/selectors-4/#the-target-pseudo)
        PseudoClass::Target => tree
            .target_fragment()
            .is_some_and(|fragment| !fragment.is_empty() && tree.id(node) == Some(fragment)),

        PseudoClass::Focus => tree.focused_element() == Some(node),

        PseudoClass::Hover | PseudoClass::Active | PseudoClass::Visited => false,
    }
}

/// [§ 14.3.4 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
///
/// Counts element siblings (of the same type, for the `-of-type` kinds) in
/// the direction `kind` names, giving a 1-based position, and tests it
/// against `formula`.
fn nth_matches<A: TreeAdapter>(
    tree: &A,
    node: A::Handle,
    kind: NthKind,
    formula: AnPlusB,
) -> bool {
    let Some(name) = tree.local_name(node) else {
        return false;
    };

    let step = |sibling: A::Handle| {
        if kind.from_end() {
            tree.next_element_sibling(sibling)
        } else {
            tree.previous_element_sibling(sibling)
        }
    };

    let mut position: i64 = 1;
    let mut sibling = step(node);
    while let Some(current) = sibling {
        let counted = !kind.of_type()
            || tree
                .local_name(current)
                .is_some_and(|other| other.eq_ignore_ascii_case(name));
        if counted {
            position += 1;
        }
        sibling = step(current);
    }

    formula.matches(position)
}

/// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
///
/// The language of an element comes from the nearest inclusive ancestor with
/// a `lang` attribute. "The matching of C against the element's language
/// value is performed case-insensitively." A range `en` also matches `en-US`.
fn lang_matches<A: TreeAdapter>(tree: &A, node: A::Handle, range: &str) -> bool {
    if range.is_empty() {
        return false;
    }

    let mut current = Some(node);
    while let Some(element) = current {
        if let Some(lang) = tree.attribute(element, "lang") {
            let subtag_match = lang
                .get(..range.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(range))
                && lang.as_bytes().get(range.len()) == Some(&b'-');
            return subtag_match || lang.eq_ignore_ascii_case(range);
        }
        current = tree.parent(element).filter(|&parent| tree.is_element(parent));
    }
    false
}

fn local_name_is<A: TreeAdapter>(tree: &A, node: A::Handle, names: &[&str]) -> bool {
    tree.local_name(node)
        .is_some_and(|local| names.iter().any(|name| local.eq_ignore_ascii_case(name)))
}
