#![forbid(unsafe_code)]

//! The document seam.
//!
//! The inspector never holds element references across events. It works in
//! terms of [`NodeId`]s that the [`Dom`] implementation resolves on every
//! call. Style and geometry reads on a node that is no longer attached return
//! `None`; reads and writes on an id the document has forgotten return
//! `None`/empty and [`DomError::Unknown`] respectively.

use std::fmt;

use serde::Serialize;

use crate::geometry::Rect;
use crate::style::ComputedStyle;

/// Opaque, stable identifier for an element in a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a raw id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Document operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The document does not know this id (never issued, or released).
    Unknown(NodeId),
    /// The document has no `<body>` to attach UI to.
    NoBody,
    /// The host rejected the operation.
    Host(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "node {id} is not known to the document"),
            Self::NoBody => write!(f, "document has no body"),
            Self::Host(msg) => write!(f, "host error: {msg}"),
        }
    }
}

impl std::error::Error for DomError {}

/// Access to a live, externally mutable document.
///
/// Implementations resolve ids on every call and must tolerate ids whose
/// element has been removed in the meantime.
pub trait Dom {
    /// The root element (`<html>`).
    fn document_element(&self) -> NodeId;

    /// The `<body>` element, if present.
    fn body(&self) -> Option<NodeId>;

    /// Whether the node is currently attached to the document.
    fn is_connected(&self, node: NodeId) -> bool;

    /// Parent element, if any.
    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    /// Element children in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Lowercase tag name.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// Attribute value.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    /// Whether the element carries an inline `onclick` handler.
    fn has_click_handler(&self, node: NodeId) -> bool;

    /// Inline (`style=""`) value for a kebab-case property; `None` when unset.
    fn inline_style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Set (`Some`) or clear (`None`) an inline style property.
    fn set_inline_style(
        &mut self,
        node: NodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), DomError>;

    /// Snapshot of the computed style; `None` for detached nodes.
    fn computed_style(&self, node: NodeId) -> Option<ComputedStyle>;

    /// Bounding client rectangle; `None` for detached nodes.
    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Remove a node (and its subtree) from the document. No-op if detached.
    fn remove(&mut self, node: NodeId);

    /// Replace the node's text content.
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError>;

    /// Text content.
    fn text(&self, node: NodeId) -> Option<String>;

    /// Every attached element carrying `name`, in document order.
    fn query_attribute(&self, name: &str) -> Vec<NodeId>;

    /// The element's `id`, if non-empty.
    fn element_id(&self, node: NodeId) -> Option<String> {
        self.attribute(node, "id").filter(|id| !id.is_empty())
    }

    /// Whitespace-separated classes.
    fn class_list(&self, node: NodeId) -> Vec<String> {
        self.attribute(node, "class")
            .map(|c| c.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Nearest inclusive ancestor matching `pred`.
    fn closest<F>(&self, node: NodeId, mut pred: F) -> Option<NodeId>
    where
        Self: Sized,
        F: FnMut(&Self, NodeId) -> bool,
    {
        let mut current = Some(node);
        while let Some(id) = current {
            if pred(self, id) {
                return Some(id);
            }
            current = self.parent_element(id);
        }
        None
    }
}
