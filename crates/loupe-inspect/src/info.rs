#![forbid(unsafe_code)]

//! The info popup: a transient text box anchored near the pointer.

use std::time::Duration;

use loupe_core::dom::{Dom, NodeId};
use loupe_core::marker::OverlayRole;
use loupe_core::{debug, trace};

use crate::overlay::{Decls, Stage};
use crate::provenance::CssAnalysis;
use crate::spacing::round_px;

/// Vertical offset of the popup from the pointer.
pub const POPUP_LIFT: f64 = 40.0;

/// `tag#id.class1.class2`, keeping at most `class_limit` classes.
pub fn describe<D: Dom>(dom: &D, node: NodeId, class_limit: Option<usize>) -> String {
    let mut out = dom.tag_name(node).unwrap_or_default();
    if let Some(id) = dom.element_id(node) {
        out.push('#');
        out.push_str(&id);
    }
    let classes = dom.class_list(node);
    let take = class_limit.unwrap_or(classes.len());
    for class in classes.iter().take(take) {
        out.push('.');
        out.push_str(class);
    }
    out
}

/// What the selection popup reports about one element.
///
/// Every part except the signature is optional: a node detached between
/// dispatch and collection yields blank entries rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementInfo {
    pub signature: String,
    pub size: Option<(i64, i64)>,
    pub analysis: Option<CssAnalysis>,
    /// `(font-size, primary family)`.
    pub font: Option<(String, String)>,
}

impl ElementInfo {
    pub fn collect<D: Dom>(dom: &D, node: NodeId) -> Self {
        let style = dom.computed_style(node);
        Self {
            signature: describe(dom, node, None),
            size: dom
                .bounding_rect(node)
                .map(|r| (round_px(r.width), round_px(r.height))),
            analysis: CssAnalysis::of(dom, node),
            font: style.map(|s| {
                (
                    s.get("font-size").to_owned(),
                    s.primary_font_family().to_owned(),
                )
            }),
        }
    }

    /// Multi-line popup text.
    #[must_use]
    pub fn render(&self) -> String {
        let size = self
            .size
            .map(|(w, h)| format!("{w}px × {h}px"))
            .unwrap_or_default();
        let (width, height, margin, padding, position) = match &self.analysis {
            Some(a) => (
                a.width.to_string(),
                a.height.to_string(),
                a.margin.as_str(),
                a.padding.as_str(),
                a.position.as_str(),
            ),
            None => (String::new(), String::new(), "", "", ""),
        };
        let font = self
            .font
            .as_ref()
            .map(|(size, family)| format!("{size} {family}"))
            .unwrap_or_default();
        let text = format!(
            "{}\n\nSize: {size}\nWidth: {width}\nHeight: {height}\n\nSpacing:\n{margin}\n{padding}\n\nPosition: {position}\nFont: {font}",
            self.signature
        );
        text.trim().to_owned()
    }
}

/// The singleton info popup and its expiry.
#[derive(Debug, Default)]
pub struct InfoPopup {
    current: Option<(NodeId, Duration)>,
}

impl InfoPopup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The live popup node, if any.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.current.map(|(n, _)| n)
    }

    /// When the live popup expires, on the host clock.
    #[must_use]
    pub fn expires_at(&self) -> Option<Duration> {
        self.current.map(|(_, at)| at)
    }

    /// Replace any popup with `text` at page position (`x`, `y - 40`).
    pub fn show<D: Dom>(
        &mut self,
        stage: &mut Stage<'_, D>,
        text: &str,
        x: f64,
        y: f64,
        expires_at: Duration,
    ) -> Option<NodeId> {
        self.clear(stage);
        let decls = Decls::new()
            .set("position", "absolute")
            .px("left", x)
            .px("top", y - POPUP_LIFT)
            .set("background", "#1a1a1a")
            .set("color", "white")
            .set("padding", "8px 12px")
            .set("border-radius", "4px")
            .set("font-family", "monospace")
            .set("font-size", "11px")
            .set("z-index", "999997")
            .set("white-space", "pre-line")
            .set("border", "1px solid #333");
        let node = match stage.create("div", OverlayRole::Info, None, &decls) {
            Ok(node) => node,
            Err(err) => {
                debug!(error = %err, "info popup creation failed");
                return None;
            }
        };
        if let Err(err) = stage.dom.set_text(node, text) {
            debug!(error = %err, "info popup text failed");
        }
        trace!(node = %node, "info popup shown");
        self.current = Some((node, expires_at));
        Some(node)
    }

    /// Remove the popup if it has expired at `now`. Returns whether it did.
    pub fn sweep<D: Dom>(&mut self, stage: &mut Stage<'_, D>, now: Duration) -> bool {
        match self.current {
            Some((node, at)) if at <= now => {
                stage.dom.remove(node);
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Remove every info node, tracked or not.
    pub fn clear<D: Dom>(&mut self, stage: &mut Stage<'_, D>) {
        self.current = None;
        stage.overlays.remove_roles(stage.dom, &[OverlayRole::Info]);
    }

    /// Forget the tracked popup without touching the document.
    pub fn forget(&mut self) {
        self.current = None;
    }
}
