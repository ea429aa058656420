#![forbid(unsafe_code)]

//! An in-memory [`Dom`].
//!
//! `MemoryDom` is a small arena-backed element tree with attributes, inline
//! styles, a declared computed style and a fixed layout rectangle per node.
//! It has no cascade and no layout engine: callers declare what a browser
//! would report. Ids are never reused, so an id that outlives its node keeps
//! resolving to the (detached) node rather than to a stranger.
//!
//! # Example
//!
//! ```
//! use loupe_core::{Dom, ElementSpec, MemoryDom, Rect};
//!
//! let mut dom = MemoryDom::new();
//! let body = dom.body().unwrap();
//! let card = dom.append(
//!     body,
//!     ElementSpec::new("div").class("card").rect(Rect::new(0.0, 0.0, 200.0, 80.0)),
//! );
//! assert_eq!(dom.class_list(card), vec!["card".to_string()]);
//! assert_eq!(dom.bounding_rect(card).unwrap().width, 200.0);
//! ```

use crate::dom::{Dom, DomError, NodeId};
use crate::geometry::Rect;
use crate::style::ComputedStyle;

#[derive(Debug, Clone, Default)]
struct MemNode {
    tag: String,
    attributes: Vec<(String, String)>,
    inline: Vec<(String, String)>,
    computed: ComputedStyle,
    rect: Option<Rect>,
    text: String,
    click_handler: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Declarative description of an element to insert into a [`MemoryDom`].
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    node: MemNode,
}

impl ElementSpec {
    /// An element with the given tag.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            node: MemNode {
                tag: tag.to_ascii_lowercase(),
                ..MemNode::default()
            },
        }
    }

    /// Set the `id` attribute.
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Append a class to the `class` attribute.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let existing = self
            .node
            .attributes
            .iter_mut()
            .find(|(name, _)| name == "class");
        match existing {
            Some((_, value)) => {
                value.push(' ');
                value.push_str(class);
            }
            None => self.node.attributes.push(("class".into(), class.into())),
        }
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        set_pair(&mut self.node.attributes, name, Some(value));
        self
    }

    /// Set an inline style property.
    #[must_use]
    pub fn inline(mut self, property: &str, value: &str) -> Self {
        set_pair(&mut self.node.inline, property, Some(value));
        self
    }

    /// Declare a computed style property.
    #[must_use]
    pub fn computed(mut self, property: &str, value: &str) -> Self {
        self.node.computed.set(property, value);
        self
    }

    /// Declare the bounding client rectangle.
    #[must_use]
    pub fn rect(mut self, rect: Rect) -> Self {
        self.node.rect = Some(rect);
        self
    }

    /// Attach an inline `onclick` handler.
    #[must_use]
    pub fn onclick(mut self) -> Self {
        self.node.click_handler = true;
        self
    }

    /// Set text content.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.node.text = text.into();
        self
    }
}

/// In-memory document: `<html>` with `<head>` and `<body>`.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<MemNode>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId::new(0),
            head: NodeId::new(0),
            body: NodeId::new(0),
        };
        dom.root = dom.alloc(ElementSpec::new("html").node);
        dom.head = dom.append(dom.root, ElementSpec::new("head"));
        dom.body = dom.append(dom.root, ElementSpec::new("body"));
        dom
    }

    /// The `<head>` element.
    #[must_use]
    pub fn head(&self) -> NodeId {
        self.head
    }

    /// Insert a new element as the last child of `parent`.
    ///
    /// If `parent` is unknown the element is created detached.
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = self.alloc(spec.node);
        if self.node(parent).is_some() {
            self.link(parent, id);
        }
        id
    }

    /// Declare (or replace) a node's bounding rectangle.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(n) = self.node_mut(node) {
            n.rect = Some(rect);
        }
    }

    /// Declare a computed style property.
    pub fn set_computed(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.node_mut(node) {
            n.computed.set(property, value);
        }
    }

    /// Number of nodes ever allocated (attached or not).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inline style declarations in insertion order.
    #[must_use]
    pub fn inline_declarations(&self, node: NodeId) -> Vec<(String, String)> {
        self.node(node).map(|n| n.inline.clone()).unwrap_or_default()
    }

    fn alloc(&mut self, node: MemNode) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> Option<&MemNode> {
        usize::try_from(id.get())
            .ok()
            .and_then(|i| self.nodes.get(i))
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut MemNode> {
        usize::try_from(id.get())
            .ok()
            .and_then(|i| self.nodes.get_mut(i))
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.unlink(child);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).and_then(|c| c.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = None;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn collect_with_attribute(&self, node: NodeId, name: &str, out: &mut Vec<NodeId>) {
        let Some(n) = self.node(node) else {
            return;
        };
        if n.attributes.iter().any(|(k, _)| k == name) {
            out.push(node);
        }
        for &child in &n.children {
            self.collect_with_attribute(child, name, out);
        }
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, name: &str, value: Option<&str>) {
    match (pairs.iter().position(|(k, _)| k == name), value) {
        (Some(i), Some(v)) => pairs[i].1 = v.to_owned(),
        (Some(i), None) => {
            pairs.remove(i);
        }
        (None, Some(v)) => pairs.push((name.to_owned(), v.to_owned())),
        (None, None) => {}
    }
}

impl Dom for MemoryDom {
    fn document_element(&self) -> NodeId {
        self.root
    }

    fn body(&self) -> Option<NodeId> {
        self.is_connected(self.body).then_some(self.body)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).is_some() && self.is_ancestor_or_self(self.root, node)
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.node(node).map(|n| n.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let n = self.node_mut(node).ok_or(DomError::Unknown(node))?;
        set_pair(&mut n.attributes, name, Some(value));
        Ok(())
    }

    fn has_click_handler(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.click_handler)
    }

    fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.node(node)?
            .inline
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty())
    }

    fn set_inline_style(
        &mut self,
        node: NodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), DomError> {
        let n = self.node_mut(node).ok_or(DomError::Unknown(node))?;
        set_pair(&mut n.inline, property, value.filter(|v| !v.is_empty()));
        Ok(())
    }

    fn computed_style(&self, node: NodeId) -> Option<ComputedStyle> {
        if !self.is_connected(node) {
            return None;
        }
        let n = self.node(node)?;
        let mut style = n.computed.clone();
        for (property, value) in &n.inline {
            style.set(property.clone(), value.clone());
        }
        Some(style)
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        if !self.is_connected(node) {
            return None;
        }
        Some(self.node(node)?.rect.unwrap_or_default())
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.alloc(ElementSpec::new(tag).node))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.node(parent).is_none() {
            return Err(DomError::Unknown(parent));
        }
        if self.node(child).is_none() {
            return Err(DomError::Unknown(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::Host("append would create a cycle".into()));
        }
        self.link(parent, child);
        Ok(())
    }

    fn remove(&mut self, node: NodeId) {
        self.unlink(node);
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let n = self.node_mut(node).ok_or(DomError::Unknown(node))?;
        n.text = text.to_owned();
        Ok(())
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.node(node).map(|n| n.text.clone())
    }

    fn query_attribute(&self, name: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_with_attribute(self.root, name, &mut out);
        out
    }
}
