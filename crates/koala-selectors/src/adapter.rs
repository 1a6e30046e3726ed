//! The node capability interface the engine needs from a host DOM.
//!
//! Matching never touches a concrete tree type directly. Any tree that can
//! answer these questions can be queried; [`koala_dom::DomTree`] is the
//! in-workspace implementation.

use core::fmt::Debug;
use core::hash::Hash;

use koala_dom::{DomTree, NodeId, NodeType};

/// [§ 4.4 nodeType](https://dom.spec.whatwg.org/#dom-node-nodetype), reduced
/// to the kinds selector matching distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document node.
    Document,
    /// An element.
    Element,
    /// A text node.
    Text,
    /// A CDATA section.
    CData,
    /// A comment.
    Comment,
    /// Anything else (doctypes, processing instructions).
    Other,
}

/// Read-only access to a tree of nodes.
///
/// `Handle` is the node identity: memoization keys on it, so it must stay
/// stable for the duration of a query and never be derived from mutable node
/// state.
pub trait TreeAdapter {
    /// A cheap, stable node identity.
    type Handle: Copy + Eq + Hash + Debug;

    /// What kind of node `node` is.
    fn node_kind(&self, node: Self::Handle) -> NodeKind;

    /// The element's local name, or `None` for non-elements.
    fn local_name(&self, node: Self::Handle) -> Option<&str>;

    /// The parent node, element or document.
    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// All child nodes, in tree order.
    fn children(&self, node: Self::Handle) -> impl Iterator<Item = Self::Handle> + '_;

    /// The nearest preceding sibling that is an element.
    fn previous_element_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The nearest following sibling that is an element.
    fn next_element_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// The value of attribute `name`, looked up ASCII case-insensitively.
    fn attribute(&self, node: Self::Handle, name: &str) -> Option<&str>;

    /// The element's id.
    fn id(&self, node: Self::Handle) -> Option<&str> {
        self.attribute(node, "id")
    }

    /// The element's raw class attribute (space-delimited).
    fn class_name(&self, node: Self::Handle) -> Option<&str> {
        self.attribute(node, "class")
    }

    /// The document element of the tree `node` belongs to.
    fn document_element(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// [§ 4.2.4 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// Optional fast path for id selectors. The engine verifies whatever
    /// this returns, so a stale index only costs a fallback scan.
    fn element_by_id(&self, _id: &str) -> Option<Self::Handle> {
        None
    }

    /// The fragment of the document's URL, without `#`, for `:target`.
    fn target_fragment(&self) -> Option<&str> {
        None
    }

    /// The document's focused element, for `:focus`.
    fn focused_element(&self) -> Option<Self::Handle> {
        None
    }

    /// Whether `node` is an element.
    fn is_element(&self, node: Self::Handle) -> bool {
        self.node_kind(node) == NodeKind::Element
    }

    /// Whether the class attribute of `node` contains `class` as a token.
    fn has_class(&self, node: Self::Handle, class: &str) -> bool {
        self.class_name(node)
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }
}

impl TreeAdapter for DomTree {
    type Handle = NodeId;

    fn node_kind(&self, node: NodeId) -> NodeKind {
        match self.get(node).map(|n| &n.node_type) {
            Some(NodeType::Document) => NodeKind::Document,
            Some(NodeType::Element(_)) => NodeKind::Element,
            Some(NodeType::Text(_)) => NodeKind::Text,
            Some(NodeType::CData(_)) => NodeKind::CData,
            Some(NodeType::Comment(_)) => NodeKind::Comment,
            None => NodeKind::Other,
        }
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        self.as_element(node).map(|data| data.tag_name.as_str())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        Self::children(self, node).iter().copied()
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        Self::previous_element_sibling(self, node)
    }

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        Self::next_element_sibling(self, node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.as_element(node)?.attribute(name)
    }

    fn document_element(&self, _node: NodeId) -> Option<NodeId> {
        Self::document_element(self)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.get_element_by_id(id)
    }

    fn target_fragment(&self) -> Option<&str> {
        self.url_fragment()
    }

    fn focused_element(&self) -> Option<NodeId> {
        self.focused()
    }
}
