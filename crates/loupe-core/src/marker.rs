#![forbid(unsafe_code)]

//! The marker namespace.
//!
//! Every node the inspector creates carries [`MARKER_ATTR`] with a value
//! naming its [`OverlayRole`]. The attribute is both the styling hook and the
//! "is this our own UI" test: a node with a marked inclusive ancestor is never
//! an inspection target.

use std::fmt;
use std::str::FromStr;

use crate::dom::{Dom, NodeId};
use crate::mode::ToolMode;

/// Attribute carried by every inspector-owned node.
pub const MARKER_ATTR: &str = "data-loupe";

/// Role of an inspector-owned node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayRole {
    Toolbar,
    ToolButton(ToolMode),
    Close,
    Guide,
    Info,
    HierarchyPanel,
    SpacingOverlay,
    SpacingLabel,
    SpacingMargin,
    SpacingPadding,
    ElementHighlight,
}

impl OverlayRole {
    /// Roles rendered by the spacing tool.
    pub const SPACING: [OverlayRole; 4] = [
        Self::SpacingOverlay,
        Self::SpacingLabel,
        Self::SpacingMargin,
        Self::SpacingPadding,
    ];

    /// Marker attribute value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Toolbar => "toolbar",
            Self::ToolButton(ToolMode::Inspect) => "tool-inspect",
            Self::ToolButton(ToolMode::Spacing) => "tool-spacing",
            Self::ToolButton(ToolMode::Color) => "tool-color",
            Self::ToolButton(ToolMode::Font) => "tool-font",
            Self::Close => "close",
            Self::Guide => "guide",
            Self::Info => "info",
            Self::HierarchyPanel => "hierarchy-panel",
            Self::SpacingOverlay => "spacing-overlay",
            Self::SpacingLabel => "spacing-label",
            Self::SpacingMargin => "spacing-margin",
            Self::SpacingPadding => "spacing-padding",
            Self::ElementHighlight => "element-highlight",
        }
    }

    /// Whether the node is a spacing artifact.
    pub const fn is_spacing(self) -> bool {
        matches!(
            self,
            Self::SpacingOverlay | Self::SpacingLabel | Self::SpacingMargin | Self::SpacingPadding
        )
    }

    /// Whether the node receives pointer events. Decoration is
    /// `pointer-events: none` so it never shadows the page.
    pub const fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::Toolbar | Self::ToolButton(_) | Self::Close | Self::HierarchyPanel | Self::Info
        )
    }
}

impl fmt::Display for OverlayRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlayRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mode) = s.strip_prefix("tool-") {
            return mode.parse().map(Self::ToolButton).map_err(|_| ());
        }
        Ok(match s {
            "toolbar" => Self::Toolbar,
            "close" => Self::Close,
            "guide" => Self::Guide,
            "info" => Self::Info,
            "hierarchy-panel" => Self::HierarchyPanel,
            "spacing-overlay" => Self::SpacingOverlay,
            "spacing-label" => Self::SpacingLabel,
            "spacing-margin" => Self::SpacingMargin,
            "spacing-padding" => Self::SpacingPadding,
            "element-highlight" => Self::ElementHighlight,
            _ => return Err(()),
        })
    }
}

/// Whether `node` or any ancestor carries the marker attribute.
pub fn is_own_ui<D: Dom>(dom: &D, node: NodeId) -> bool {
    dom.closest(node, |d, id| d.attribute(id, MARKER_ATTR).is_some())
        .is_some()
}

/// Role of `node` itself (not its ancestors).
pub fn role_of<D: Dom>(dom: &D, node: NodeId) -> Option<OverlayRole> {
    dom.attribute(node, MARKER_ATTR)?.parse().ok()
}
