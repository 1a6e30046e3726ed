//! Property tests: `an+b` arithmetic, `tag.class` soundness, and stable
//! compilation.

use koala_dom::{DomTree, NodeId, TreeBuilder};
use koala_selectors::{AnPlusB, QueryEngine, compile};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

const TAGS: &[&str] = &["div", "p", "span", "LI", "section"];
const CLASSES: &[&str] = &["a", "b", "c", "d"];

/// Build a tree from a flat description: each step appends one element,
/// optionally opening it, and sometimes closes the current element.
fn build_tree(shape: &[(u8, u8, bool)]) -> DomTree {
    let mut builder = TreeBuilder::new();
    for &(tag, class_bits, open) in shape.iter().take(48) {
        let tag_name = TAGS[usize::from(tag) % TAGS.len()];
        let class = CLASSES
            .iter()
            .enumerate()
            .filter(|(bit, _)| class_bits & (1 << bit) != 0)
            .map(|(_, class)| *class)
            .collect::<Vec<_>>()
            .join(" ");
        let attrs = [("class", class.as_str())];
        if open {
            let _ = builder.open(tag_name, &attrs);
        } else {
            let _ = builder.leaf(tag_name, &attrs);
        }
        if tag % 3 == 0 {
            builder.close();
        }
    }
    builder.finish()
}

/// A syntactically valid selector group drawn from a small vocabulary.
#[derive(Debug, Clone)]
struct SelectorText(String);

impl Arbitrary for SelectorText {
    fn arbitrary(g: &mut Gen) -> Self {
        const HEADS: &[&str] = &["div", "p", "*", "span", ".a", "#x", "[title]"];
        const SUFFIXES: &[&str] = &[
            ".a",
            ".b",
            "#x",
            "[title]",
            "[class~=c]",
            "[class^='a']",
            "[lang|=en]",
            ":first-child",
            ":last-of-type",
            ":nth-child(2n+1)",
            ":nth-last-child(-n+2)",
            ":empty",
            ":not(.d)",
            ":not(p)",
            ":root",
        ];
        const COMBINATORS: &[&str] = &[" ", " > ", " + ", " ~ ", ">", "  "];

        let mut chains = Vec::new();
        for _ in 0..=u8::arbitrary(g) % 2 {
            let mut chain = String::new();
            for i in 0..=u8::arbitrary(g) % 3 {
                if i > 0 {
                    chain.push_str(g.choose(COMBINATORS).unwrap());
                }
                chain.push_str(g.choose(HEADS).unwrap());
                for _ in 0..u8::arbitrary(g) % 3 {
                    chain.push_str(g.choose(SUFFIXES).unwrap());
                }
            }
            chains.push(chain);
        }
        Self(chains.join(","))
    }
}

// [§ 6.6.5.2](https://www.w3.org/TR/selectors-3/#nth-child-pseudo)
// "for any positive integer or zero value of n"
#[quickcheck]
fn an_plus_b_agrees_with_enumeration(a: i8, b: i8, position: u8) -> bool {
    let a = i64::from(a % 16);
    let b = i64::from(b);
    let position = i64::from(position) + 1;

    let enumerated = (0..=600).any(|n| a * n + b == position);
    AnPlusB::new(a, b).matches(position) == enumerated
}

#[quickcheck]
fn an_plus_b_text_reparses(a: i8, b: i8) -> bool {
    let formula = AnPlusB::new(i64::from(a), i64::from(b));
    AnPlusB::parse(&formula.to_string()) == Some(formula)
}

#[quickcheck]
fn tag_class_results_are_sound_and_complete(
    shape: Vec<(u8, u8, bool)>,
    tag: u8,
    class: u8,
) -> bool {
    let tree = build_tree(&shape);
    let tag = TAGS[usize::from(tag) % TAGS.len()];
    let class = CLASSES[usize::from(class) % CLASSES.len()];

    let found = QueryEngine::new()
        .query_selector_all(&tree, tree.root(), &format!("{tag}.{class}"))
        .unwrap();

    let expected: Vec<NodeId> = tree
        .descendants(tree.root())
        .filter(|&id| {
            tree.as_element(id).is_some_and(|element| {
                element.tag_name.eq_ignore_ascii_case(tag) && element.classes().contains(class)
            })
        })
        .collect();

    found == expected
}

#[quickcheck]
fn rendered_selector_recompiles_to_same_ast(text: SelectorText) -> bool {
    let compiled = compile(&text.0).unwrap();
    let rendered = compiled.to_string();
    let again = compile(&rendered).unwrap();
    again.group == compiled.group && again.to_string() == rendered
}

#[quickcheck]
fn compiling_twice_gives_identical_results(text: SelectorText, shape: Vec<(u8, u8, bool)>) -> bool {
    let tree = build_tree(&shape);
    let first = compile(&text.0).unwrap();
    let second = compile(&text.0).unwrap();

    first.select(&tree, tree.root()).unwrap() == second.select(&tree, tree.root()).unwrap()
}

#[quickcheck]
fn query_results_are_unique_and_in_document_order(
    text: SelectorText,
    shape: Vec<(u8, u8, bool)>,
) -> bool {
    let tree = build_tree(&shape);
    let found = QueryEngine::new()
        .query_selector_all(&tree, tree.root(), &text.0)
        .unwrap();

    let order: Vec<NodeId> = tree.descendants(tree.root()).collect();
    let positions: Vec<usize> = found
        .iter()
        .filter_map(|node| order.iter().position(|n| n == node))
        .collect();
    positions.len() == found.len() && positions.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn matches_agrees_with_query_selector_all(text: SelectorText, shape: Vec<(u8, u8, bool)>) -> bool {
    let tree = build_tree(&shape);
    let engine = QueryEngine::new();
    let found = engine
        .query_selector_all(&tree, tree.root(), &text.0)
        .unwrap();

    tree.descendants(tree.root())
        .filter(|&id| tree.as_element(id).is_some())
        .all(|id| engine.matches(&tree, id, &text.0).unwrap() == found.contains(&id))
}
