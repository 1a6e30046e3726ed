//! JSON description of a document, and conversion into a [`DomTree`].
//!
//! ```json
//! {
//!   "fragment": "intro",
//!   "focus": "search",
//!   "children": [
//!     { "type": "element", "tag": "html", "attributes": { "lang": "en" },
//!       "children": [ { "type": "text", "content": "hi" } ] }
//!   ]
//! }
//! ```
//!
//! A bare node object is accepted too and becomes the only child of the
//! document.

use std::collections::BTreeMap;

use koala_dom::{DomTree, TreeBuilder};
use serde::Deserialize;

/// One node of the input tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonNode {
    /// An element with attributes and children.
    Element {
        /// Local name.
        tag: String,
        /// Attribute name to value.
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        /// Child nodes in order.
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    /// A text node.
    Text {
        /// Character data.
        content: String,
    },
    /// A comment.
    Comment {
        /// Comment text.
        content: String,
    },
    /// A CDATA section.
    Cdata {
        /// Character data.
        content: String,
    },
}

/// A whole document plus the state pseudo-classes read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonDocument {
    /// URL fragment, for `:target`.
    #[serde(default)]
    pub fragment: Option<String>,
    /// Id of the focused element, for `:focus`.
    #[serde(default)]
    pub focus: Option<String>,
    /// Top-level nodes.
    #[serde(default)]
    pub children: Vec<JsonNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Document(JsonDocument),
    Node(JsonNode),
}

/// Parse `text` as a document object or a single node.
///
/// # Errors
///
/// Returns the JSON error if `text` is neither.
pub fn parse(text: &str) -> serde_json::Result<JsonDocument> {
    Ok(match serde_json::from_str(text)? {
        Input::Document(document) => document,
        Input::Node(node) => JsonDocument {
            children: vec![node],
            ..JsonDocument::default()
        },
    })
}

/// Build the arena tree for `document`.
#[must_use]
pub fn build(document: &JsonDocument) -> DomTree {
    let mut builder = TreeBuilder::new();
    for node in &document.children {
        append(&mut builder, node);
    }

    let tree = builder.tree_mut();
    tree.set_url_fragment(document.fragment.as_deref());
    if let Some(id) = &document.focus {
        let focused = tree.get_element_by_id(id);
        if focused.is_none() {
            log::warn!("focus target #{id} not found");
        }
        tree.set_focused(focused);
    }
    builder.finish()
}

fn append(builder: &mut TreeBuilder, node: &JsonNode) {
    match node {
        JsonNode::Element {
            tag,
            attributes,
            children,
        } => {
            let attrs: Vec<(&str, &str)> = attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();
            let _ = builder.open(tag, &attrs);
            for child in children {
                append(builder, child);
            }
            builder.close();
        }
        JsonNode::Text { content } => {
            let _ = builder.text(content);
        }
        JsonNode::Comment { content } => {
            let _ = builder.comment(content);
        }
        JsonNode::Cdata { content } => {
            let _ = builder.cdata(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use koala_dom::NodeId;

    #[test]
    fn test_parse_document_with_state() {
        let document = parse(
            r#"{
                "fragment": "x",
                "focus": "q",
                "children": [
                    {"type": "element", "tag": "p", "attributes": {"id": "x"}},
                    {"type": "element", "tag": "input", "attributes": {"id": "q"}}
                ]
            }"#,
        )
        .unwrap();
        let tree = build(&document);

        assert_eq!(tree.url_fragment(), Some("x"));
        assert_eq!(tree.focused(), Some(NodeId(2)));
        assert_eq!(tree.children(tree.root()).len(), 2);
    }

    #[test]
    fn test_parse_bare_node() {
        let document = parse(
            r#"{"type": "element", "tag": "ul", "children": [
                {"type": "text", "content": " "},
                {"type": "element", "tag": "li"},
                {"type": "comment", "content": "c"},
                {"type": "cdata", "content": "d"}
            ]}"#,
        )
        .unwrap();
        let tree = build(&document);

        let ul = tree.document_element().unwrap();
        assert_eq!(tree.as_element(ul).unwrap().tag_name, "ul");
        assert_eq!(tree.children(ul).len(), 4);
        assert_eq!(tree.as_text(tree.children(ul)[0]), Some(" "));
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        assert!(parse(r#"{"type": "doctype", "name": "html"}"#).is_err());
    }
}
