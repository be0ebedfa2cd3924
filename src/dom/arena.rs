//! Arena-allocated document tree.
//!
//! html5ever parses into this tree through [`super::tree_sink::ArenaSink`];
//! the chapter and xref passes then mutate it in place through the
//! [`DocumentTree`](crate::document::DocumentTree) capability.

use std::collections::HashMap;

use html5ever::{LocalName, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id attribute.
        id: Option<String>,
        /// Pre-extracted class tokens.
        classes: Vec<String>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node and its tree links.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Arena-based document tree.
///
/// Nodes live in one vector and link to each other by index. Detached nodes
/// stay allocated; they are simply unreachable from the document root.
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
    /// id attribute -> elements carrying it, in creation order.
    id_map: HashMap<String, Vec<ArenaNodeId>>,
    /// `<template>` element -> its detached contents fragment.
    templates: HashMap<ArenaNodeId, ArenaNodeId>,
}

impl ArenaDom {
    /// Create an empty tree holding only the document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
            id_map: HashMap::new(),
            templates: HashMap::new(),
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        let mut id = None;
        let mut classes = Vec::new();

        for attr in &attrs {
            match attr.name.local.as_ref() {
                "id" => id = Some(attr.value.clone()),
                "class" => classes = class_tokens(&attr.value),
                _ => {}
            }
        }

        let node_id = self.alloc(ArenaNode::new(ArenaNodeData::Element {
            name,
            attrs,
            id: id.clone(),
            classes,
        }));

        if let Some(id_str) = id {
            self.id_map.entry(id_str).or_default().push(node_id);
        }

        node_id
    }

    /// Add `attr` to an element unless it already has an attribute of that
    /// name. The cached id, class tokens and id index follow the new value.
    pub fn add_attribute(&mut self, element: ArenaNodeId, attr: Attribute) {
        let Some(ArenaNode {
            data:
                ArenaNodeData::Element {
                    attrs, id, classes, ..
                },
            ..
        }) = self.get_mut(element)
        else {
            return;
        };
        if attrs.iter().any(|a| a.name == attr.name) {
            return;
        }

        let mut new_id = None;
        match attr.name.local.as_ref() {
            "id" => {
                *id = Some(attr.value.clone());
                new_id = Some(attr.value.clone());
            }
            "class" => *classes = class_tokens(&attr.value),
            _ => {}
        }
        attrs.push(attr);

        if let Some(id_str) = new_id {
            self.id_map.entry(id_str).or_default().push(element);
        }
    }

    /// Contents fragment of a `<template>` element, allocated on first use.
    ///
    /// The fragment is a parentless `Document` node, so traversal from the
    /// document root and [`get_by_id`](Self::get_by_id) never enter it.
    pub fn template_contents_or_insert(&mut self, template: ArenaNodeId) -> ArenaNodeId {
        if let Some(&fragment) = self.templates.get(&template) {
            return fragment;
        }
        let fragment = self.alloc(ArenaNode::new(ArenaNodeData::Document));
        self.templates.insert(template, fragment);
        fragment
    }

    pub fn template_contents(&self, template: ArenaNodeId) -> Option<ArenaNodeId> {
        self.templates.get(&template).copied()
    }

    /// Create a detached HTML element from a tag name and attribute pairs.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> ArenaNodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: html_name(name),
                value: (*value).to_string(),
            })
            .collect();
        self.create_element(html_element_name(tag), attrs)
    }

    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment(text)))
    }

    pub fn create_doctype(
        &mut self,
        name: String,
        public_id: String,
        system_id: String,
    ) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = ArenaNodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert `child` as the first child of `parent`, shifting existing
    /// children right.
    pub fn prepend(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        if first.is_some() {
            self.insert_before(first, child);
        } else {
            self.append(parent, child);
        }
    }

    /// Unlink `id` from its parent and siblings.
    pub fn detach(&mut self, id: ArenaNodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(id) {
            node.parent = ArenaNodeId::NONE;
            node.prev_sibling = ArenaNodeId::NONE;
            node.next_sibling = ArenaNodeId::NONE;
        }
    }

    /// Detach every child of `parent`.
    pub fn clear_children(&mut self, parent: ArenaNodeId) {
        let children: Vec<_> = self.children(parent).collect();
        for child in children {
            if let Some(c) = self.get_mut(child) {
                c.parent = ArenaNodeId::NONE;
                c.prev_sibling = ArenaNodeId::NONE;
                c.next_sibling = ArenaNodeId::NONE;
            }
        }
        if let Some(p) = self.get_mut(parent) {
            p.first_child = ArenaNodeId::NONE;
            p.last_child = ArenaNodeId::NONE;
        }
    }

    /// Append text to a trailing text child, or create one.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let ArenaNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// First attached element, in document order, whose id attribute is `id`.
    pub fn get_by_id(&self, id: &str) -> Option<ArenaNodeId> {
        let candidates = self.id_map.get(id)?;
        match candidates.as_slice() {
            [] => None,
            [only] => self.is_attached(*only).then_some(*only),
            _ => self
                .descendants(self.document)
                .find(|n| candidates.contains(n)),
        }
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_attached(&self, id: ArenaNodeId) -> bool {
        let mut current = id;
        while let Some(node) = self.get(current) {
            if current == self.document {
                return true;
            }
            current = node.parent;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds only the document root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Pre-order traversal of the subtree below `root`, excluding `root`.
    pub fn descendants(&self, root: ArenaNodeId) -> Descendants<'_> {
        let mut stack: Vec<_> = self.children(root).collect();
        stack.reverse();
        Descendants { dom: self, stack }
    }

    /// Elements whose local name satisfies `predicate`, in document order.
    pub fn elements_by<F>(&self, predicate: F) -> Vec<ArenaNodeId>
    where
        F: Fn(&str) -> bool,
    {
        self.descendants(self.document)
            .filter(|&id| self.element_name(id).is_some_and(|n| predicate(n.as_ref())))
            .collect()
    }

    /// First element with the given tag, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.descendants(self.document)
            .find(|&id| self.element_name(id).is_some_and(|n| n.as_ref() == tag))
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

pub struct Descendants<'a> {
    dom: &'a ArenaDom,
    stack: Vec<ArenaNodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let mut children: Vec<_> = self.dom.children(id).collect();
        children.reverse();
        self.stack.extend(children);
        Some(id)
    }
}

/// Element accessors.
impl ArenaDom {
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    pub fn element_id(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    pub fn element_classes(&self, id: ArenaNodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                ArenaNodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Value of a text node.
    pub fn text_content(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of every text node below `id` (or `id` itself if
    /// it is a text node).
    pub fn collect_text(&self, id: ArenaNodeId) -> String {
        if let Some(text) = self.text_content(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text_content(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text(&mut self, id: ArenaNodeId, text: &str) {
        self.clear_children(id);
        let node = self.create_text(text.to_string());
        self.append(id, node);
    }
}

fn class_tokens(value: &str) -> Vec<String> {
    value.split_whitespace().map(|s| s.to_string()).collect()
}

/// Qualified name for an element in the HTML namespace.
pub fn html_element_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}

/// Qualified name for an attribute (no namespace).
pub fn html_name(local: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_elements() {
        let mut dom = ArenaDom::new();
        let div = dom.create_html_element("div", &[("id", "main")]);
        dom.append(dom.document(), div);

        assert_eq!(dom.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.get_by_id("main"), Some(div));
    }

    #[test]
    fn test_detached_element_not_found_by_id() {
        let mut dom = ArenaDom::new();
        let div = dom.create_html_element("div", &[("id", "loose")]);

        assert_eq!(dom.element_id(div), Some("loose"));
        assert_eq!(dom.get_by_id("loose"), None);
    }

    #[test]
    fn test_duplicate_ids_resolve_to_document_order() {
        let mut dom = ArenaDom::new();
        let first = dom.create_html_element("p", &[("id", "dup")]);
        let second = dom.create_html_element("p", &[("id", "dup")]);
        // Attach in reverse creation order.
        dom.append(dom.document(), second);
        dom.append(dom.document(), first);

        assert_eq!(dom.get_by_id("dup"), Some(second));
    }

    #[test]
    fn test_prepend_shifts_children() {
        let mut dom = ArenaDom::new();
        let h1 = dom.create_html_element("h1", &[]);
        dom.append(dom.document(), h1);
        dom.append_text(h1, "Title");

        let span = dom.create_html_element("span", &[]);
        dom.prepend(h1, span);

        let children: Vec<_> = dom.children(h1).collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], span);
        assert_eq!(dom.text_content(children[1]), Some("Title"));
    }

    #[test]
    fn test_prepend_into_empty_parent() {
        let mut dom = ArenaDom::new();
        let h1 = dom.create_html_element("h1", &[]);
        dom.append(dom.document(), h1);
        let span = dom.create_html_element("span", &[]);
        dom.prepend(h1, span);

        assert_eq!(dom.children(h1).collect::<Vec<_>>(), vec![span]);
        assert_eq!(dom.get(h1).unwrap().last_child, span);
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut dom = ArenaDom::new();
        let a = dom.create_html_element("a", &[]);
        dom.append(dom.document(), a);
        let b = dom.create_html_element("b", &[]);
        dom.append(a, b);
        dom.append_text(b, "old");

        dom.set_text(a, "new");

        assert_eq!(dom.collect_text(a), "new");
        assert_eq!(dom.children(a).count(), 1);
    }

    #[test]
    fn test_text_merging() {
        let mut dom = ArenaDom::new();
        let p = dom.create_html_element("p", &[]);
        dom.append(dom.document(), p);

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text_content(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_add_attribute_updates_id_index() {
        let mut dom = ArenaDom::new();
        let body = dom.create_html_element("body", &[("class", "old")]);
        dom.append(dom.document(), body);

        dom.add_attribute(
            body,
            Attribute {
                name: html_name("id"),
                value: "late".to_string(),
            },
        );
        dom.add_attribute(
            body,
            Attribute {
                name: html_name("class"),
                value: "new".to_string(),
            },
        );

        assert_eq!(dom.element_id(body), Some("late"));
        assert_eq!(dom.get_by_id("late"), Some(body));
        // Existing attributes are left alone.
        assert_eq!(dom.element_classes(body), ["old"]);
        assert_eq!(dom.get_attr(body, "class"), Some("old"));
    }

    #[test]
    fn test_template_contents_are_outside_the_document() {
        let mut dom = ArenaDom::new();
        let template = dom.create_html_element("template", &[]);
        dom.append(dom.document(), template);
        let fragment = dom.template_contents_or_insert(template);
        let h1 = dom.create_html_element("h1", &[("id", "hidden")]);
        dom.append(fragment, h1);

        assert_eq!(dom.template_contents_or_insert(template), fragment);
        assert_eq!(dom.template_contents(template), Some(fragment));
        assert!(dom.elements_by(|t| t == "h1").is_empty());
        assert_eq!(dom.get_by_id("hidden"), None);
    }

    #[test]
    fn test_elements_by_document_order() {
        let mut dom = ArenaDom::new();
        let outer = dom.create_html_element("div", &[]);
        let first = dom.create_html_element("h1", &[]);
        let nested = dom.create_html_element("h1", &[]);
        let last = dom.create_html_element("h1", &[]);
        dom.append(dom.document(), outer);
        dom.append(outer, first);
        dom.append(first, nested);
        dom.append(outer, last);

        assert_eq!(dom.elements_by(|t| t == "h1"), vec![first, nested, last]);
    }
}
