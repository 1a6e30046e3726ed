//! Incremental construction of a [`DomTree`].
//!
//! The builder keeps a stack of open elements, the same way an HTML tree
//! constructor keeps its "stack of open elements": new nodes are appended to
//! the current node, and [`TreeBuilder::open`] pushes onto the stack.

use crate::{DomTree, ElementData, NodeId, NodeType};

/// Builds a [`DomTree`] top-down.
///
/// ```
/// use koala_dom::TreeBuilder;
///
/// let mut builder = TreeBuilder::new();
/// let ul = builder.open("ul", &[("class", "menu")]);
/// let first = builder.leaf("li", &[]);
/// builder.close();
/// let tree = builder.finish();
///
/// assert_eq!(tree.children(ul), &[first]);
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    tree: DomTree,
    open_elements: Vec<NodeId>,
}

impl TreeBuilder {
    /// Start a new document. The current node is the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: DomTree::new(),
            open_elements: vec![NodeId::ROOT],
        }
    }

    fn current(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn append(&mut self, node_type: NodeType) -> NodeId {
        let id = self.tree.alloc(node_type);
        let parent = self.current();
        self.tree.append_child(parent, id);
        id
    }

    /// Append an element to the current node and make it the current node.
    pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.append(NodeType::Element(ElementData::new(tag, attrs)));
        self.open_elements.push(id);
        id
    }

    /// Append an element with no children to the current node.
    pub fn leaf(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.append(NodeType::Element(ElementData::new(tag, attrs)))
    }

    /// Append a text node to the current node.
    pub fn text(&mut self, content: &str) -> NodeId {
        self.append(NodeType::Text(content.to_string()))
    }

    /// Append a comment node to the current node.
    pub fn comment(&mut self, content: &str) -> NodeId {
        self.append(NodeType::Comment(content.to_string()))
    }

    /// Append a CDATA section to the current node.
    pub fn cdata(&mut self, content: &str) -> NodeId {
        self.append(NodeType::CData(content.to_string()))
    }

    /// Pop the current element. The Document node is never popped.
    pub fn close(&mut self) {
        if self.open_elements.len() > 1 {
            let _ = self.open_elements.pop();
        }
    }

    /// Borrow the tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Mutably borrow the tree built so far (for document state such as
    /// the URL fragment or focus).
    pub const fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Finish building and return the tree. Open elements are implicitly closed.
    #[must_use]
    pub fn finish(self) -> DomTree {
        self.tree
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
