#![forbid(unsafe_code)]

//! The element navigator panel.
//!
//! The navigator keeps a selected node and a set of expanded siblings, both
//! by [`NodeId`]. Neither is trusted across events: every render prunes
//! expanded entries whose node left the document and drops the panel if the
//! selection itself is gone.
//!
//! Layout, for a selection `b` under parent `p` with children `[a, b, c]`:
//!
//! ```text
//! ↑ p                  ancestor row (omitted when p is <body>)
//!   ▶ a (2)            sibling rows, document order
//!   • b                selected sibling, accent background
//!   ▼ c (1)            expanded sibling
//!       ◦ span         one level of children
//! ```

use std::collections::BTreeSet;

use loupe_core::dom::{Dom, NodeId};
use loupe_core::marker::{MARKER_ATTR, OverlayRole};
use loupe_core::{debug, trace};

use crate::info::describe;
use crate::overlay::{Decls, Stage, UiAction, Z_CHROME};

/// Panel header text.
pub const PANEL_TITLE: &str = "Element Navigator";
/// Background of the selected sibling row and the selection frame.
pub const ACCENT: &str = "#78E2FF";

/// Expand/collapse indicator state of a sibling row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expander {
    Collapsed,
    Expanded,
    /// No listable children.
    Leaf,
}

impl Expander {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Collapsed => "▶",
            Self::Expanded => "▼",
            Self::Leaf => "•",
        }
    }
}

/// Kind of a panel row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// The selection's parent.
    Ancestor,
    /// A child of the selection's parent (the selection included).
    Sibling {
        selected: bool,
        expander: Expander,
        child_count: usize,
    },
    /// A child of an expanded sibling.
    Child,
}

/// One row of the panel, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRow {
    pub kind: RowKind,
    /// Page element the row refers to.
    pub node: NodeId,
    pub label: String,
}

impl HierarchyRow {
    /// Row text as displayed, indicator included.
    #[must_use]
    pub fn text(&self) -> String {
        match self.kind {
            RowKind::Ancestor => format!("↑ {}", self.label),
            RowKind::Sibling { expander, .. } => format!("{} {}", expander.glyph(), self.label),
            RowKind::Child => format!("◦ {}", self.label),
        }
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        matches!(self.kind, RowKind::Sibling { selected: true, .. })
    }
}

/// The panel's content for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyView {
    pub selected: NodeId,
    pub rows: Vec<HierarchyRow>,
}

impl HierarchyView {
    fn count(&self, pred: impl Fn(&RowKind) -> bool) -> usize {
        self.rows.iter().filter(|r| pred(&r.kind)).count()
    }

    #[must_use]
    pub fn ancestor_rows(&self) -> usize {
        self.count(|k| matches!(k, RowKind::Ancestor))
    }

    #[must_use]
    pub fn sibling_rows(&self) -> usize {
        self.count(|k| matches!(k, RowKind::Sibling { .. }))
    }

    #[must_use]
    pub fn child_rows(&self) -> usize {
        self.count(|k| matches!(k, RowKind::Child))
    }

    /// Display text of every row, top to bottom.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.rows.iter().map(HierarchyRow::text).collect()
    }
}

/// Whether `node` gets a row: not script/style, not our own UI.
pub fn is_listed<D: Dom>(dom: &D, node: NodeId) -> bool {
    let tag = dom.tag_name(node).unwrap_or_default();
    tag != "script" && tag != "style" && dom.attribute(node, MARKER_ATTR).is_none()
}

/// Listable element children of `node`, document order.
pub fn listed_children<D: Dom>(dom: &D, node: NodeId) -> Vec<NodeId> {
    dom.children(node)
        .into_iter()
        .filter(|&c| is_listed(dom, c))
        .collect()
}

/// A rendered row: the panel element and what it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRow {
    /// Row element inside the panel.
    pub element: NodeId,
    /// Page element the row refers to.
    pub referent: NodeId,
    pub kind: RowKind,
}

impl PanelRow {
    /// Resting and hover backgrounds. The selected row does not react.
    pub fn backgrounds(&self) -> Option<(&'static str, &'static str)> {
        match self.kind {
            RowKind::Ancestor => Some(("#1a1a1a", "#333")),
            RowKind::Sibling { selected: true, .. } => None,
            RowKind::Sibling { .. } => Some(("transparent", "#333")),
            RowKind::Child => Some(("transparent", "#2a2a2a")),
        }
    }
}

/// Selection, expansion state and the rendered panel.
#[derive(Debug, Default)]
pub struct HierarchyNavigator {
    selected: Option<NodeId>,
    expanded: BTreeSet<NodeId>,
    panel: Option<NodeId>,
    rows: Vec<PanelRow>,
}

impl HierarchyNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    #[must_use]
    pub fn panel(&self) -> Option<NodeId> {
        self.panel
    }

    #[must_use]
    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.expanded.contains(&node)
    }

    #[must_use]
    pub fn expanded_len(&self) -> usize {
        self.expanded.len()
    }

    /// Compute the panel content for the current selection.
    ///
    /// Prunes expanded entries whose node is no longer attached. `None`
    /// when nothing is selected or the selection left the document.
    pub fn view<D: Dom>(&mut self, dom: &D) -> Option<HierarchyView> {
        self.expanded.retain(|&n| dom.is_connected(n));
        let selected = self.selected.filter(|&n| dom.is_connected(n))?;
        let mut rows = Vec::new();
        let Some(parent) = dom.parent_element(selected) else {
            return Some(HierarchyView { selected, rows });
        };

        if Some(parent) != dom.body() {
            rows.push(HierarchyRow {
                kind: RowKind::Ancestor,
                node: parent,
                label: describe(dom, parent, Some(2)),
            });
        }

        for sibling in listed_children(dom, parent) {
            let children = listed_children(dom, sibling);
            let expander = match (children.is_empty(), self.expanded.contains(&sibling)) {
                (true, _) => Expander::Leaf,
                (false, true) => Expander::Expanded,
                (false, false) => Expander::Collapsed,
            };
            let mut label = describe(dom, sibling, Some(2));
            if !children.is_empty() {
                label.push_str(&format!(" ({})", children.len()));
            }
            rows.push(HierarchyRow {
                kind: RowKind::Sibling {
                    selected: sibling == selected,
                    expander,
                    child_count: children.len(),
                },
                node: sibling,
                label,
            });
            if expander == Expander::Expanded {
                rows.extend(children.into_iter().map(|child| HierarchyRow {
                    kind: RowKind::Child,
                    node: child,
                    label: describe(dom, child, Some(1)),
                }));
            }
        }
        Some(HierarchyView { selected, rows })
    }

    /// Select `node` and rebuild the panel around it.
    pub fn open<D: Dom>(&mut self, stage: &mut Stage<'_, D>, node: NodeId) -> Option<HierarchyView> {
        self.selected = Some(node);
        self.render(stage)
    }

    /// Flip `node`'s expansion and rebuild without changing the selection.
    pub fn toggle_expanded<D: Dom>(
        &mut self,
        stage: &mut Stage<'_, D>,
        node: NodeId,
    ) -> Option<HierarchyView> {
        if !self.expanded.remove(&node) {
            self.expanded.insert(node);
        }
        trace!(node = %node, expanded = self.expanded.contains(&node), "toggle expand");
        self.render(stage)
    }

    /// Remove the panel and selection frame. Expansion state survives.
    pub fn close<D: Dom>(&mut self, stage: &mut Stage<'_, D>) {
        stage.overlays.remove_roles(
            stage.dom,
            &[OverlayRole::HierarchyPanel, OverlayRole::ElementHighlight],
        );
        self.selected = None;
        self.panel = None;
        self.rows.clear();
    }

    /// Forget everything, expansion state included. Leaves the document alone.
    pub fn reset(&mut self) {
        self.selected = None;
        self.expanded.clear();
        self.panel = None;
        self.rows.clear();
    }

    /// The rendered row containing `target`, if any.
    pub fn row_at<D: Dom>(&self, dom: &D, target: NodeId) -> Option<PanelRow> {
        let element = dom.closest(target, |_, id| self.rows.iter().any(|r| r.element == id))?;
        self.rows.iter().find(|r| r.element == element).copied()
    }

    /// Rebuild the panel for the current selection.
    ///
    /// Any existing panel (ours or a stray one) is removed first.
    pub fn render<D: Dom>(&mut self, stage: &mut Stage<'_, D>) -> Option<HierarchyView> {
        stage.overlays.remove_roles(
            stage.dom,
            &[OverlayRole::HierarchyPanel, OverlayRole::ElementHighlight],
        );
        self.panel = None;
        self.rows.clear();

        let Some(view) = self.view(stage.dom) else {
            self.selected = None;
            return None;
        };
        match self.build_panel(stage, &view) {
            Ok(panel) => self.panel = Some(panel),
            Err(err) => {
                debug!(error = %err, "hierarchy panel render failed");
                stage.overlays.remove_roles(stage.dom, &[OverlayRole::HierarchyPanel]);
                self.rows.clear();
            }
        }
        frame_selection(stage, view.selected);
        Some(view)
    }

    fn build_panel<D: Dom>(
        &mut self,
        stage: &mut Stage<'_, D>,
        view: &HierarchyView,
    ) -> Result<NodeId, loupe_core::DomError> {
        let panel_decls = Decls::new()
            .set("position", "fixed")
            .set("top", "80px")
            .set("right", "20px")
            .set("width", "280px")
            .set("max-height", "70vh")
            .set("background", "#1a1a1a")
            .set("border", "1px solid #333")
            .set("border-radius", "8px")
            .set("color", "white")
            .set("font-family", "-apple-system, BlinkMacSystemFont, sans-serif")
            .set("z-index", Z_CHROME)
            .set("overflow", "hidden")
            .set("box-shadow", "0 4px 20px rgba(0,0,0,0.3)");
        let panel = stage.create("div", OverlayRole::HierarchyPanel, None, &panel_decls)?;

        let header_decls = Decls::new()
            .set("padding", "12px 16px")
            .set("border-bottom", "1px solid #333")
            .set("background", "#2a2a2a")
            .set("font-weight", "600")
            .set("font-size", "14px")
            .set("display", "flex")
            .set("justify-content", "space-between")
            .set("align-items", "center");
        let header = stage.create_part("div", panel, &header_decls, None)?;
        stage.create_part("span", header, &Decls::new(), Some(PANEL_TITLE))?;
        let close_decls = Decls::new().set("cursor", "pointer").set("opacity", "0.7");
        let close = stage.create_part("span", header, &close_decls, Some("✕"))?;
        stage.overlays.bind(close, UiAction::ClosePanel);

        let content_decls = Decls::new()
            .set("max-height", "calc(70vh - 60px)")
            .set("overflow-y", "auto")
            .set("padding", "8px 0");
        let content = stage.create_part("div", panel, &content_decls, None)?;

        for row in &view.rows {
            let element = render_row(stage, content, row)?;
            self.rows.push(PanelRow {
                element,
                referent: row.node,
                kind: row.kind,
            });
        }
        Ok(panel)
    }
}

fn render_row<D: Dom>(
    stage: &mut Stage<'_, D>,
    content: NodeId,
    row: &HierarchyRow,
) -> Result<NodeId, loupe_core::DomError> {
    let base = Decls::new()
        .set("display", "flex")
        .set("align-items", "center")
        .set("cursor", "pointer")
        .set("font-size", "12px");
    match row.kind {
        RowKind::Ancestor => {
            let decls = base
                .set("padding", "6px 8px")
                .set("color", "#ccc")
                .set("background", "#1a1a1a")
                .set("border-bottom", "1px solid #333");
            let element = stage.create_part("div", content, &decls, Some(&row.text()))?;
            stage.overlays.bind(element, UiAction::Select(row.node));
            Ok(element)
        }
        RowKind::Sibling {
            selected, expander, ..
        } => {
            let (background, color) = if selected {
                (ACCENT, "#1a1a1a")
            } else {
                ("transparent", "#ccc")
            };
            let decls = base
                .set("padding", "6px 12px 6px 24px")
                .set("background", background)
                .set("color", color)
                .set("border-bottom", "1px solid #333")
                .set("border-left", "2px solid #444")
                .set("margin-left", "16px");
            let element = stage.create_part("div", content, &decls, None)?;
            let leaf = expander == Expander::Leaf;
            let indicator_decls = Decls::new()
                .set("width", "12px")
                .set("height", "12px")
                .set("margin-right", "8px")
                .set("display", "flex")
                .set("align-items", "center")
                .set("justify-content", "center")
                .set("font-size", "10px")
                .set("color", if leaf { "#666" } else { "#999" })
                .set("cursor", if leaf { "default" } else { "pointer" });
            let indicator =
                stage.create_part("span", element, &indicator_decls, Some(expander.glyph()))?;
            let label_decls = Decls::new().set("flex", "1");
            stage.create_part("span", element, &label_decls, Some(&row.label))?;
            stage.overlays.bind(element, UiAction::Select(row.node));
            if !leaf {
                stage.overlays.bind(indicator, UiAction::ToggleExpand(row.node));
            }
            Ok(element)
        }
        RowKind::Child => {
            let decls = base
                .set("padding", "4px 12px 4px 48px")
                .set("background", "transparent")
                .set("color", "#ccc")
                .set("border-bottom", "1px solid #2a2a2a");
            let element = stage.create_part("div", content, &decls, None)?;
            let indicator_decls = Decls::new()
                .set("width", "8px")
                .set("height", "8px")
                .set("margin-right", "8px")
                .set("font-size", "8px")
                .set("color", "#666");
            stage.create_part("span", element, &indicator_decls, Some("◦"))?;
            stage.create_part("span", element, &Decls::new().set("flex", "1"), Some(&row.label))?;
            stage.overlays.bind(element, UiAction::Select(row.node));
            Ok(element)
        }
    }
}

/// Frame the selected element with an `element-highlight` box.
fn frame_selection<D: Dom>(stage: &mut Stage<'_, D>, selected: NodeId) {
    let Some(rect) = stage.dom.bounding_rect(selected) else {
        return;
    };
    let decls = Decls::new()
        .set("position", "fixed")
        .px("top", rect.top())
        .px("left", rect.left())
        .px("width", rect.width)
        .px("height", rect.height)
        .set("border", format!("2px solid {ACCENT}"))
        .set("box-sizing", "border-box")
        .set("z-index", "999996");
    if let Err(err) = stage.create("div", OverlayRole::ElementHighlight, None, &decls) {
        debug!(error = %err, "selection frame render failed");
    }
}
