//! The tree capability the chapter and xref passes run against.
//!
//! Anything that can list elements by tag in document order, look one up by
//! identifier, read attributes, inspect a first child, and insert nodes can
//! be post-processed. [`ArenaDom`] is the implementation shipped with the
//! crate.

use crate::dom::{ArenaDom, ArenaNodeData, ArenaNodeId};

/// First child of an element, as seen by the passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildNode<'a, H> {
    Text(&'a str),
    Element { tag: &'a str, handle: H },
    /// Comments, doctypes, anything else.
    Other,
}

/// Mutable document tree.
pub trait DocumentTree {
    type Handle: Copy + std::fmt::Debug;

    /// Elements whose tag name satisfies `tag_predicate`, in document order.
    fn query_all(&self, tag_predicate: &dyn Fn(&str) -> bool) -> Vec<Self::Handle>;

    /// First element in document order whose identifier is `id`.
    fn get_by_id(&self, id: &str) -> Option<Self::Handle>;

    fn attribute(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// Whitespace-separated tokens of the class attribute.
    fn class_tokens(&self, element: Self::Handle) -> Vec<&str> {
        self.attribute(element, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    fn first_child(&self, element: Self::Handle) -> Option<ChildNode<'_, Self::Handle>>;

    /// Concatenated text of all descendant text nodes.
    fn text_content(&self, element: Self::Handle) -> String;

    /// Replace every child of `element` with a single text node.
    fn set_text_content(&mut self, element: Self::Handle, text: &str);

    /// Create a detached element.
    fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Self::Handle;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> Self::Handle;

    fn append_child(&mut self, parent: Self::Handle, child: Self::Handle);

    /// Insert `child` before the current first child of `parent`.
    fn prepend_child(&mut self, parent: Self::Handle, child: Self::Handle);
}

impl DocumentTree for ArenaDom {
    type Handle = ArenaNodeId;

    fn query_all(&self, tag_predicate: &dyn Fn(&str) -> bool) -> Vec<ArenaNodeId> {
        self.elements_by(tag_predicate)
    }

    fn get_by_id(&self, id: &str) -> Option<ArenaNodeId> {
        ArenaDom::get_by_id(self, id)
    }

    fn attribute(&self, element: ArenaNodeId, name: &str) -> Option<&str> {
        self.get_attr(element, name)
    }

    fn class_tokens(&self, element: ArenaNodeId) -> Vec<&str> {
        self.element_classes(element)
            .iter()
            .map(String::as_str)
            .collect()
    }

    fn first_child(&self, element: ArenaNodeId) -> Option<ChildNode<'_, ArenaNodeId>> {
        let first = self.get(element)?.first_child;
        let node = self.get(first)?;
        Some(match &node.data {
            ArenaNodeData::Text(text) => ChildNode::Text(text),
            ArenaNodeData::Element { name, .. } => ChildNode::Element {
                tag: name.local.as_ref(),
                handle: first,
            },
            _ => ChildNode::Other,
        })
    }

    fn text_content(&self, element: ArenaNodeId) -> String {
        self.collect_text(element)
    }

    fn set_text_content(&mut self, element: ArenaNodeId, text: &str) {
        self.set_text(element, text);
    }

    fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> ArenaNodeId {
        self.create_html_element(tag, attrs)
    }

    fn create_text(&mut self, text: &str) -> ArenaNodeId {
        ArenaDom::create_text(self, text.to_string())
    }

    fn append_child(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        self.append(parent, child);
    }

    fn prepend_child(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        self.prepend(parent, child);
    }
}
