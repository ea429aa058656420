#![forbid(unsafe_code)]

//! Hover outline on page elements.
//!
//! The engine remembers the single element it decorated together with that
//! element's prior inline `outline` / `outline-offset`, and undoes exactly
//! that mutation. Author-set outlines on other elements are never touched.

use loupe_core::dom::{Dom, NodeId};
use loupe_core::{marker, trace};

/// Outline applied to the hovered element.
pub const HIGHLIGHT_OUTLINE: &str = "2px solid #FF8A95";
/// Offset applied with [`HIGHLIGHT_OUTLINE`].
pub const HIGHLIGHT_OFFSET: &str = "2px";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Highlighted {
    node: NodeId,
    prior_outline: Option<String>,
    prior_offset: Option<String>,
}

/// Tracks and restores the one element currently outlined.
#[derive(Debug, Default)]
pub struct HighlightEngine {
    current: Option<Highlighted>,
}

impl HighlightEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The element currently outlined, if any.
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.current.as_ref().map(|h| h.node)
    }

    /// Outline `target`. Returns whether anything was outlined.
    ///
    /// Own UI and detached nodes are ignored. A previous highlight on a
    /// different element is restored first.
    pub fn highlight<D: Dom>(&mut self, dom: &mut D, target: NodeId) -> bool {
        if !dom.is_connected(target) || marker::is_own_ui(dom, target) {
            return false;
        }
        if self.current() == Some(target) {
            return true;
        }
        self.unhighlight(dom);

        let prior_outline = dom.inline_style(target, "outline");
        let prior_offset = dom.inline_style(target, "outline-offset");
        let applied = dom
            .set_inline_style(target, "outline", Some(HIGHLIGHT_OUTLINE))
            .and_then(|()| dom.set_inline_style(target, "outline-offset", Some(HIGHLIGHT_OFFSET)));
        if applied.is_err() {
            // Put back whatever half-applied.
            let _ = dom.set_inline_style(target, "outline", prior_outline.as_deref());
            let _ = dom.set_inline_style(target, "outline-offset", prior_offset.as_deref());
            return false;
        }
        trace!(node = %target, "highlight");
        self.current = Some(Highlighted {
            node: target,
            prior_outline,
            prior_offset,
        });
        true
    }

    /// Restore the outlined element, if any. Returns the restored node.
    ///
    /// Restoration also runs when the node has since been detached, so a
    /// reattached node comes back undecorated.
    pub fn unhighlight<D: Dom>(&mut self, dom: &mut D) -> Option<NodeId> {
        let h = self.current.take()?;
        let _ = dom.set_inline_style(h.node, "outline", h.prior_outline.as_deref());
        let _ = dom.set_inline_style(h.node, "outline-offset", h.prior_offset.as_deref());
        trace!(node = %h.node, "unhighlight");
        Some(h.node)
    }
}
