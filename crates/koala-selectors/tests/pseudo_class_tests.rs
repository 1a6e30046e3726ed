//! Integration tests for structural, state, and functional pseudo-classes.

use koala_dom::{DomTree, NodeId, TreeBuilder};
use koala_selectors::{QueryEngine, SelectorError};

fn select(tree: &DomTree, text: &str) -> Vec<NodeId> {
    QueryEngine::new()
        .query_selector_all(tree, tree.root(), text)
        .unwrap()
}

fn is_match(tree: &DomTree, node: NodeId, text: &str) -> bool {
    QueryEngine::new().matches(tree, node, text).unwrap()
}

/// `<div>` with six `<li>` children, returned in order.
fn six_children() -> (DomTree, Vec<NodeId>) {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("div", &[]);
    let children = (0..6).map(|_| builder.leaf("li", &[])).collect();
    (builder.finish(), children)
}

/// `<section>` with mixed children: p, span, p, text, span, p.
fn mixed_children() -> (DomTree, Vec<NodeId>) {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("section", &[]);
    let p0 = builder.leaf("p", &[]);
    let s0 = builder.leaf("span", &[]);
    let p1 = builder.leaf("p", &[]);
    let _ = builder.text("between");
    let s1 = builder.leaf("span", &[]);
    let p2 = builder.leaf("p", &[]);
    (builder.finish(), vec![p0, s0, p1, s1, p2])
}

// :nth-*
// [§ 14.3 Child-indexed Pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)

#[test]
fn test_nth_child_odd_positions() {
    let (tree, c) = six_children();
    let expected = vec![c[0], c[2], c[4]];
    assert_eq!(select(&tree, "li:nth-child(2n+1)"), expected);
    assert_eq!(select(&tree, "li:nth-child(odd)"), expected);
}

#[test]
fn test_nth_child_formulas() {
    let (tree, c) = six_children();
    assert_eq!(select(&tree, ":nth-child(even)"), vec![c[1], c[3], c[5]]);
    assert_eq!(select(&tree, "li:nth-child(3)"), vec![c[2]]);
    assert_eq!(select(&tree, "li:nth-child(-n+2)"), vec![c[0], c[1]]);
    assert_eq!(select(&tree, "li:nth-child(n+5)"), vec![c[4], c[5]]);
    assert_eq!(select(&tree, "li:nth-child(3n)"), vec![c[2], c[5]]);
    assert_eq!(select(&tree, "li:nth-child(n)"), c);
    assert!(select(&tree, "li:nth-child(0)").is_empty());
    assert!(select(&tree, "li:nth-child(7)").is_empty());
}

#[test]
fn test_nth_last_child() {
    let (tree, c) = six_children();
    assert_eq!(select(&tree, "li:nth-last-child(1)"), vec![c[5]]);
    assert_eq!(select(&tree, "li:nth-last-child(2n)"), vec![c[0], c[2], c[4]]);
}

#[test]
fn test_nth_of_type_counts_same_name_only() {
    let (tree, n) = mixed_children();
    let (p0, s0, p1, s1, p2) = (n[0], n[1], n[2], n[3], n[4]);

    assert_eq!(select(&tree, "p:nth-of-type(2)"), vec![p1]);
    assert_eq!(select(&tree, ":nth-of-type(2)"), vec![p1, s1]);
    assert_eq!(select(&tree, "p:nth-last-of-type(1)"), vec![p2]);
    assert_eq!(select(&tree, "span:nth-last-of-type(2)"), vec![s0]);
    assert_eq!(select(&tree, "p:nth-child(3)"), vec![p1]);
    assert!(select(&tree, "span:nth-child(2n+1)").is_empty());
    assert_eq!(select(&tree, "p:nth-of-type(odd)"), vec![p0, p2]);
}

#[test]
fn test_malformed_nth_argument_never_matches() {
    let (tree, _) = six_children();
    for text in [
        "li:nth-child(banana)",
        "li:nth-child()",
        "li:nth-child(2n+)",
        "li:nth-child(n-n)",
    ] {
        assert!(select(&tree, text).is_empty(), "{text}");
    }
}

// first / last / only

#[test]
fn test_first_and_last_child() {
    let (tree, c) = six_children();
    assert_eq!(select(&tree, "li:first-child"), vec![c[0]]);
    assert_eq!(select(&tree, "li:last-child"), vec![c[5]]);
    assert!(select(&tree, "li:only-child").is_empty());
}

#[test]
fn test_of_type_variants() {
    let (tree, n) = mixed_children();
    assert_eq!(select(&tree, "section > :first-of-type"), vec![n[0], n[1]]);
    assert_eq!(select(&tree, "section > :last-of-type"), vec![n[3], n[4]]);
    assert!(select(&tree, "section > :only-of-type").is_empty());
    assert_eq!(select(&tree, "section:only-of-type").len(), 1);
}

#[test]
fn test_only_child_and_only_of_type() {
    let mut builder = TreeBuilder::new();
    let outer = builder.open("div", &[]);
    let lone = builder.leaf("em", &[]);
    builder.close();
    let _ = builder.open("div", &[]);
    let _ = builder.leaf("b", &[]);
    let unique_i = builder.leaf("i", &[]);
    let _ = builder.leaf("b", &[]);
    let tree = builder.finish();

    assert_eq!(select(&tree, "div > :only-child"), vec![lone]);
    assert_eq!(select(&tree, "div > :only-of-type"), vec![lone, unique_i]);
    // The document has two `div` children, so neither is only-of-type.
    assert!(!is_match(&tree, outer, ":only-of-type"));
}

#[test]
fn test_first_child_ignores_leading_text() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("p", &[]);
    let _ = builder.text("lead");
    let _ = builder.comment("c");
    let first = builder.leaf("b", &[]);
    let tree = builder.finish();

    assert!(is_match(&tree, first, ":first-child"));
    assert!(is_match(&tree, first, ":only-child"));
}

// :empty
// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)

#[test]
fn test_empty() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("div", &[]);
    let bare = builder.leaf("p", &[]);
    let spaced = builder.open("p", &[]);
    let _ = builder.text(" ");
    builder.close();
    let commented = builder.open("p", &[]);
    let _ = builder.comment("nothing here");
    builder.close();
    let cdata = builder.open("p", &[]);
    let _ = builder.cdata("x");
    builder.close();
    let parent = builder.open("p", &[]);
    let _ = builder.leaf("br", &[]);
    let tree = builder.finish();

    assert!(is_match(&tree, bare, ":empty"));
    assert!(!is_match(&tree, spaced, ":empty"));
    assert!(is_match(&tree, commented, ":empty"));
    assert!(!is_match(&tree, cdata, ":empty"));
    assert!(!is_match(&tree, parent, ":empty"));
}

// :root

#[test]
fn test_root_is_the_document_element() {
    let mut builder = TreeBuilder::new();
    let _ = builder.comment("doctype-ish");
    let html = builder.open("html", &[]);
    let body = builder.leaf("body", &[]);
    let tree = builder.finish();

    assert_eq!(select(&tree, ":root"), vec![html]);
    assert!(!is_match(&tree, body, ":root"));
    assert_eq!(select(&tree, ":root > body"), vec![body]);
}

// :lang()
// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)

#[test]
fn test_lang_inherits_from_ancestors() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("html", &[("lang", "en-US")]);
    let p = builder.leaf("p", &[]);
    let _ = builder.open("div", &[("lang", "fr")]);
    let french = builder.leaf("span", &[]);
    let tree = builder.finish();

    assert!(is_match(&tree, p, ":lang(en)"));
    assert!(is_match(&tree, p, ":lang(EN-us)"));
    assert!(!is_match(&tree, p, ":lang(fr)"));
    assert!(!is_match(&tree, p, ":lang(en-GB)"));

    // The nearest declaration wins.
    assert!(is_match(&tree, french, ":lang(fr)"));
    assert!(!is_match(&tree, french, ":lang(en)"));
}

#[test]
fn test_lang_requires_subtag_boundary() {
    let mut builder = TreeBuilder::new();
    let english = builder.leaf("p", &[("lang", "english")]);
    let unset = builder.leaf("p", &[]);
    let tree = builder.finish();

    assert!(!is_match(&tree, english, ":lang(en)"));
    assert!(!is_match(&tree, unset, ":lang(en)"));
    assert!(!is_match(&tree, english, ":lang('')"));
}

// Document state

#[test]
fn test_target_follows_url_fragment() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("body", &[]);
    let intro = builder.leaf("h2", &[("id", "intro")]);
    let _ = builder.leaf("h2", &[("id", "usage")]);
    let mut tree = builder.finish();

    assert!(select(&tree, ":target").is_empty());

    tree.set_url_fragment(Some("#intro"));
    assert_eq!(select(&tree, ":target"), vec![intro]);
    assert_eq!(select(&tree, "h2:not(:target)").len(), 1);

    tree.set_url_fragment(None);
    assert!(select(&tree, ":target").is_empty());
}

#[test]
fn test_focus_follows_focused_element() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("form", &[]);
    let name = builder.leaf("input", &[("name", "n")]);
    let _ = builder.leaf("input", &[("name", "e")]);
    builder.tree_mut().set_focused(Some(name));
    let tree = builder.finish();

    assert_eq!(select(&tree, ":focus"), vec![name]);
    assert!(
        QueryEngine::new()
            .closest(&tree, name, "form:not(:focus)")
            .unwrap()
            .is_some()
    );
}

// Form state

#[test]
fn test_enabled_and_disabled_apply_to_form_controls_only() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("form", &[]);
    let enabled = builder.leaf("input", &[]);
    let disabled = builder.leaf("button", &[("disabled", "")]);
    let div = builder.leaf("div", &[("disabled", "")]);
    let tree = builder.finish();

    assert_eq!(select(&tree, ":enabled"), vec![enabled]);
    assert_eq!(select(&tree, ":disabled"), vec![disabled]);
    assert!(!is_match(&tree, div, ":enabled"));
    assert!(!is_match(&tree, div, ":disabled"));
}

#[test]
fn test_checked() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("form", &[]);
    let on = builder.leaf("input", &[("type", "checkbox"), ("checked", "")]);
    let _ = builder.leaf("input", &[("type", "checkbox")]);
    let _ = builder.open("select", &[]);
    let picked = builder.leaf("option", &[("selected", "selected")]);
    let _ = builder.leaf("option", &[("checked", "")]);
    let tree = builder.finish();

    assert_eq!(select(&tree, ":checked"), vec![on, picked]);
}

#[test]
fn test_link() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("nav", &[]);
    let a = builder.leaf("a", &[("href", "/")]);
    let _ = builder.leaf("a", &[("name", "anchor")]);
    let area = builder.leaf("area", &[("href", "#x")]);
    let _ = builder.leaf("link", &[("href", "style.css")]);
    let tree = builder.finish();

    assert_eq!(select(&tree, ":link"), vec![a, area]);
}

#[test]
fn test_interaction_states_never_match() {
    let mut builder = TreeBuilder::new();
    let a = builder.leaf("a", &[("href", "/")]);
    let tree = builder.finish();

    for text in ["a:hover", "a:active", "a:visited"] {
        assert!(!is_match(&tree, a, text), "{text}");
    }
    assert!(is_match(&tree, a, "a:not(:hover)"));
}

// Unsupported pseudo-classes

#[test]
fn test_unsupported_pseudo_errors_at_match_time() {
    let mut builder = TreeBuilder::new();
    let p = builder.leaf("p", &[]);
    let tree = builder.finish();

    let engine = QueryEngine::new();
    assert!(engine.compile("p:frobnicate").is_ok());
    assert_eq!(
        engine.matches(&tree, p, "p:frobnicate"),
        Err(SelectorError::UnsupportedPseudo {
            name: "frobnicate".into()
        })
    );
    assert_eq!(
        engine
            .query_selector_all(&tree, tree.root(), ":not(:contains(x))")
            .unwrap_err()
            .to_string(),
        "unsupported pseudo-class `:contains`"
    );
}

#[test]
fn test_unsupported_pseudo_is_lazy() {
    let mut builder = TreeBuilder::new();
    let p = builder.leaf("p", &[]);
    let tree = builder.finish();

    let engine = QueryEngine::new();
    // No seed reaches the predicate.
    assert_eq!(
        engine
            .query_selector_all(&tree, tree.root(), "div:frobnicate")
            .unwrap(),
        vec![]
    );
    // An earlier selector in the sequence fails first.
    assert!(!engine.matches(&tree, p, "p.missing:frobnicate").unwrap());
}
