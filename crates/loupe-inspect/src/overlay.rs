#![forbid(unsafe_code)]

//! Overlay registry: creation and removal of inspector-owned nodes.
//!
//! Every node is built structurally (element + attributes + per-property
//! inline styles + text content); nothing is parsed from markup, so ids and
//! class names read from the page are only ever used as text.
//!
//! Interactive nodes are bound to a [`UiAction`] instead of carrying their
//! own listeners. The chrome listener scope resolves a click to the nearest
//! bound ancestor and the inspector performs the action.

use std::collections::HashMap;

use loupe_core::dom::{Dom, DomError, NodeId};
use loupe_core::marker::{self, MARKER_ATTR, OverlayRole};
use loupe_core::style::format_px;
use loupe_core::{ToolMode, debug};

/// Z-order shared by all inspector chrome.
pub const Z_CHROME: &str = "999999";

/// Ordered inline style declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decls(Vec<(&'static str, String)>);

impl Decls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration.
    #[must_use]
    pub fn set(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.0.push((property, value.into()));
        self
    }

    /// Add a pixel-valued declaration.
    #[must_use]
    pub fn px(self, property: &'static str, value: f64) -> Self {
        self.set(property, format_px(value))
    }

    /// Look up a declared value.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Write every declaration onto `node`.
    pub fn apply<D: Dom>(&self, dom: &mut D, node: NodeId) -> Result<(), DomError> {
        for (property, value) in &self.0 {
            dom.set_inline_style(node, property, Some(value))?;
        }
        Ok(())
    }
}

/// What clicking an inspector-owned node does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// Toolbar button: switch tool.
    SetTool(ToolMode),
    /// Toolbar close button.
    Deactivate,
    /// Hierarchy row: make this page node the selection.
    Select(NodeId),
    /// Hierarchy expander: flip this sibling's expansion.
    ToggleExpand(NodeId),
    /// Hierarchy panel close control.
    ClosePanel,
}

/// Creates, finds and removes marker-tagged nodes and tracks their actions.
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    actions: HashMap<NodeId, UiAction>,
}

/// Mutable access to the document and the registry, passed to renderers.
pub struct Stage<'a, D: Dom> {
    pub dom: &'a mut D,
    pub overlays: &'a mut OverlayRegistry,
}

impl<'a, D: Dom> Stage<'a, D> {
    pub fn new(dom: &'a mut D, overlays: &'a mut OverlayRegistry) -> Self {
        Self { dom, overlays }
    }

    /// Create a marked node under `parent` (or `<body>` when `None`).
    pub fn create(
        &mut self,
        tag: &str,
        role: OverlayRole,
        parent: Option<NodeId>,
        decls: &Decls,
    ) -> Result<NodeId, DomError> {
        self.overlays.create(self.dom, tag, role, parent, decls)
    }

    /// Create an unmarked node inside a marked container.
    pub fn create_part(
        &mut self,
        tag: &str,
        parent: NodeId,
        decls: &Decls,
        text: Option<&str>,
    ) -> Result<NodeId, DomError> {
        OverlayRegistry::create_part(self.dom, tag, parent, decls, text)
    }
}

impl OverlayRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a marked node under `parent` (or `<body>` when `None`).
    ///
    /// Non-interactive roles get `pointer-events: none` so they never become
    /// event targets.
    pub fn create<D: Dom>(
        &mut self,
        dom: &mut D,
        tag: &str,
        role: OverlayRole,
        parent: Option<NodeId>,
        decls: &Decls,
    ) -> Result<NodeId, DomError> {
        let parent = match parent {
            Some(p) => p,
            None => dom.body().ok_or(DomError::NoBody)?,
        };
        let node = dom.create_element(tag)?;
        dom.set_attribute(node, MARKER_ATTR, role.as_str())?;
        decls.apply(dom, node)?;
        if !role.is_interactive() {
            dom.set_inline_style(node, "pointer-events", Some("none"))?;
        }
        dom.append_child(parent, node)?;
        Ok(node)
    }

    /// Create an unmarked node inside a marked container.
    pub fn create_part<D: Dom>(
        dom: &mut D,
        tag: &str,
        parent: NodeId,
        decls: &Decls,
        text: Option<&str>,
    ) -> Result<NodeId, DomError> {
        let node = dom.create_element(tag)?;
        decls.apply(dom, node)?;
        if let Some(text) = text {
            dom.set_text(node, text)?;
        }
        dom.append_child(parent, node)?;
        Ok(node)
    }

    /// Bind a click action to an inspector-owned node.
    pub fn bind(&mut self, node: NodeId, action: UiAction) {
        self.actions.insert(node, action);
    }

    /// Nearest inclusive ancestor of `target` with a bound action.
    pub fn action_for<D: Dom>(&self, dom: &D, target: NodeId) -> Option<(NodeId, UiAction)> {
        let node = dom.closest(target, |_, id| self.actions.contains_key(&id))?;
        self.actions.get(&node).map(|&action| (node, action))
    }

    /// Number of live action bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.actions.len()
    }

    /// Attached nodes carrying `role`, in document order.
    pub fn find<D: Dom>(dom: &D, role: OverlayRole) -> Vec<NodeId> {
        dom.query_attribute(MARKER_ATTR)
            .into_iter()
            .filter(|&id| marker::role_of(dom, id) == Some(role))
            .collect()
    }

    /// Remove every node whose role is in `roles`. Returns how many went.
    pub fn remove_roles<D: Dom>(&mut self, dom: &mut D, roles: &[OverlayRole]) -> usize {
        let doomed: Vec<NodeId> = dom
            .query_attribute(MARKER_ATTR)
            .into_iter()
            .filter(|&id| marker::role_of(dom, id).is_some_and(|r| roles.contains(&r)))
            .collect();
        for &id in &doomed {
            dom.remove(id);
        }
        self.prune(dom);
        doomed.len()
    }

    /// Remove every marked node in the document, whatever its role.
    pub fn remove_all<D: Dom>(&mut self, dom: &mut D) -> usize {
        let doomed = dom.query_attribute(MARKER_ATTR);
        for &id in &doomed {
            dom.remove(id);
        }
        self.actions.clear();
        debug!(removed = doomed.len(), "removed all overlay nodes");
        doomed.len()
    }

    /// Drop bindings whose node left the document.
    pub fn prune<D: Dom>(&mut self, dom: &D) {
        self.actions.retain(|&id, _| dom.is_connected(id));
    }

    /// Whether `node` belongs to inspector-owned UI.
    pub fn is_own_ui<D: Dom>(dom: &D, node: NodeId) -> bool {
        marker::is_own_ui(dom, node)
    }
}
