#![forbid(unsafe_code)]

//! Box-model measurement and the spacing overlay.
//!
//! Rendering is split in two: [`plan`] turns a measured [`BoxModel`] into a
//! list of [`SpacingPiece`]s (pure geometry, easy to test), and
//! [`SpacingAnalyzer`] writes those pieces into the document as
//! spacing-tagged overlay nodes.
//!
//! Only the edges selected by [`Edges`] get margin/padding bands. The
//! default is [`Edges::TOP`].

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use loupe_core::dom::{Dom, NodeId};
use loupe_core::geometry::{Rect, Sides};
use loupe_core::marker::{self, OverlayRole};
use loupe_core::{debug, trace};

use crate::overlay::{Decls, Stage};

bitflags! {
    /// Box edges that get margin/padding bands.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Edges: u8 {
        const TOP    = 0b0001;
        const RIGHT  = 0b0010;
        const BOTTOM = 0b0100;
        const LEFT   = 0b1000;
    }
}

impl Default for Edges {
    fn default() -> Self {
        Self::TOP
    }
}

impl Edges {
    const NAMED: [(Edges, &'static str); 4] = [
        (Edges::TOP, "top"),
        (Edges::RIGHT, "right"),
        (Edges::BOTTOM, "bottom"),
        (Edges::LEFT, "left"),
    ];

    /// Single edges in top/right/bottom/left order.
    pub fn iter_edges(self) -> impl Iterator<Item = Edges> {
        Self::NAMED
            .into_iter()
            .map(|(e, _)| e)
            .filter(move |e| self.contains(*e))
    }
}

impl fmt::Display for Edges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return f.write_str("all");
        }
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(e, _)| self.contains(*e))
            .map(|(_, n)| *n)
            .collect();
        f.write_str(&names.join(","))
    }
}

/// Error parsing an [`Edges`] list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEdge(pub String);

impl fmt::Display for UnknownEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown edge {:?} (expected top, right, bottom, left, all or none)",
            self.0
        )
    }
}

impl std::error::Error for UnknownEdge {}

impl FromStr for Edges {
    type Err = UnknownEdge;

    /// `"all"`, `"none"`, or a comma list such as `"top,left"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut edges = Edges::empty();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let part = part.to_ascii_lowercase();
            edges |= match part.as_str() {
                "all" => Edges::all(),
                "none" => Edges::empty(),
                other => Self::NAMED
                    .iter()
                    .find(|(_, n)| *n == other)
                    .map(|(e, _)| *e)
                    .ok_or_else(|| UnknownEdge(part.clone()))?,
            };
        }
        Ok(edges)
    }
}

/// Round half up, matching how page scripts round pixel readouts.
#[must_use]
pub fn round_px(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Geometry captured once per hover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxModel {
    /// Element box as reported by the host (viewport coordinates).
    pub content_rect: Rect,
    pub margin: Sides<f64>,
    pub padding: Sides<f64>,
}

impl BoxModel {
    /// Snapshot `node`'s rectangle and computed margins/paddings.
    ///
    /// `None` when the node is detached. Unparseable lengths count as zero.
    pub fn measure<D: Dom>(dom: &D, node: NodeId) -> Option<Self> {
        let rect = dom.bounding_rect(node)?;
        let style = dom.computed_style(node)?;
        Some(Self {
            content_rect: rect,
            margin: style.margin_px(),
            padding: style.padding_px(),
        })
    }
}

/// Which box-model layer a band or label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Margin,
    Padding,
}

impl Layer {
    fn prefix(self) -> &'static str {
        match self {
            Self::Margin => "m",
            Self::Padding => "p",
        }
    }
}

/// One element of the spacing overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum SpacingPiece {
    /// Dashed outline over the element box.
    Outline { rect: Rect },
    /// Width or height readout.
    Dimension { x: f64, y: f64, text: String },
    /// Tinted margin or padding band on one edge.
    Band { layer: Layer, edge: Edges, rect: Rect },
    /// Centered `m:Npx` / `p:Npx` label on a band.
    BandLabel {
        layer: Layer,
        x: f64,
        y: f64,
        text: String,
    },
}

impl SpacingPiece {
    /// Marker role the piece renders with.
    pub fn role(&self) -> OverlayRole {
        match self {
            Self::Outline { .. } => OverlayRole::SpacingOverlay,
            Self::Dimension { .. } | Self::BandLabel { .. } => OverlayRole::SpacingLabel,
            Self::Band {
                layer: Layer::Margin,
                ..
            } => OverlayRole::SpacingMargin,
            Self::Band {
                layer: Layer::Padding,
                ..
            } => OverlayRole::SpacingPadding,
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn of(edge: Edges) -> Option<Self> {
        if edge == Edges::TOP {
            Some(Self::Top)
        } else if edge == Edges::RIGHT {
            Some(Self::Right)
        } else if edge == Edges::BOTTOM {
            Some(Self::Bottom)
        } else if edge == Edges::LEFT {
            Some(Self::Left)
        } else {
            None
        }
    }

    fn pick(self, sides: &Sides<f64>) -> f64 {
        match self {
            Self::Top => sides.top,
            Self::Right => sides.right,
            Self::Bottom => sides.bottom,
            Self::Left => sides.left,
        }
    }
}

/// Band rectangle and label anchor for one edge.
fn band(layer: Layer, side: Side, r: &Rect, amount: f64) -> (Rect, (f64, f64)) {
    let (cx, cy) = (r.center_x(), r.center_y());
    match (layer, side) {
        (Layer::Margin, Side::Top) => (
            Rect::new(r.left(), r.top() - amount, r.width, amount),
            (cx, r.top() - amount / 2.0),
        ),
        (Layer::Margin, Side::Right) => (
            Rect::new(r.right(), r.top(), amount, r.height),
            (r.right() + amount / 2.0, cy),
        ),
        (Layer::Margin, Side::Bottom) => (
            Rect::new(r.left(), r.bottom(), r.width, amount),
            (cx, r.bottom() + amount / 2.0),
        ),
        (Layer::Margin, Side::Left) => (
            Rect::new(r.left() - amount, r.top(), amount, r.height),
            (r.left() - amount / 2.0, cy),
        ),
        (Layer::Padding, Side::Top) => (
            Rect::new(r.left(), r.top(), r.width, amount),
            (cx, r.top() + amount / 2.0),
        ),
        (Layer::Padding, Side::Right) => (
            Rect::new(r.right() - amount, r.top(), amount, r.height),
            (r.right() - amount / 2.0, cy),
        ),
        (Layer::Padding, Side::Bottom) => (
            Rect::new(r.left(), r.bottom() - amount, r.width, amount),
            (cx, r.bottom() - amount / 2.0),
        ),
        (Layer::Padding, Side::Left) => (
            Rect::new(r.left(), r.top(), amount, r.height),
            (r.left() + amount / 2.0, cy),
        ),
    }
}

/// Lay out the overlay for `model`.
///
/// Dimension labels come first, then margin and padding bands (each followed
/// by its label) for every selected edge with a positive amount, then the
/// outline.
#[must_use]
pub fn plan(model: &BoxModel, edges: Edges) -> Vec<SpacingPiece> {
    let r = &model.content_rect;
    let mut pieces = vec![
        SpacingPiece::Dimension {
            x: r.center_x(),
            y: r.top() - 20.0,
            text: format!("{}px", round_px(r.width)),
        },
        SpacingPiece::Dimension {
            x: r.left() - 40.0,
            y: r.center_y(),
            text: format!("{}px", round_px(r.height)),
        },
    ];
    for (layer, sides) in [(Layer::Margin, &model.margin), (Layer::Padding, &model.padding)] {
        for edge in edges.iter_edges() {
            let Some(side) = Side::of(edge) else {
                continue;
            };
            let amount = side.pick(sides);
            if amount.is_nan() || amount <= 0.0 {
                continue;
            }
            let (rect, (x, y)) = band(layer, side, r, amount);
            pieces.push(SpacingPiece::Band { layer, edge, rect });
            pieces.push(SpacingPiece::BandLabel {
                layer,
                x,
                y,
                text: format!("{}:{}px", layer.prefix(), round_px(amount)),
            });
        }
    }
    pieces.push(SpacingPiece::Outline { rect: *r });
    pieces
}

fn positioned(rect: &Rect) -> Decls {
    Decls::new()
        .set("position", "fixed")
        .px("top", rect.top())
        .px("left", rect.left())
        .px("width", rect.width)
        .px("height", rect.height)
}

fn label_decls(x: f64, y: f64, background: &str, small: bool) -> Decls {
    let decls = Decls::new()
        .set("position", "fixed")
        .px("left", x)
        .px("top", y)
        .set("background", background)
        .set("color", "white")
        .set("font-family", "monospace")
        .set("z-index", "999998")
        .set("transform", "translateX(-50%) translateY(-50%)");
    if small {
        decls
            .set("padding", "1px 4px")
            .set("border-radius", "2px")
            .set("font-size", "9px")
    } else {
        decls
            .set("padding", "2px 6px")
            .set("border-radius", "3px")
            .set("font-size", "10px")
            .set("white-space", "nowrap")
    }
}

fn piece_decls(piece: &SpacingPiece) -> Decls {
    match piece {
        SpacingPiece::Outline { rect } => positioned(rect)
            .set("border", "1px dashed #FF8A95")
            .set("background", "rgba(120, 226, 255, 0.1)")
            .set("z-index", "999997"),
        SpacingPiece::Dimension { x, y, .. } => label_decls(*x, *y, "#1a1a1a", false),
        SpacingPiece::Band { layer, rect, .. } => {
            let (background, border) = match layer {
                Layer::Margin => ("rgba(255, 165, 0, 0.3)", "1px dashed orange"),
                Layer::Padding => ("rgba(0, 200, 0, 0.3)", "1px dashed green"),
            };
            positioned(rect)
                .set("background", background)
                .set("border", border)
                .set("z-index", "999996")
        }
        SpacingPiece::BandLabel { layer, x, y, .. } => {
            let background = match layer {
                Layer::Margin => "orange",
                Layer::Padding => "green",
            };
            label_decls(*x, *y, background, true)
        }
    }
}

/// Renders and clears the spacing overlay.
#[derive(Debug, Default)]
pub struct SpacingAnalyzer {
    edges: Edges,
}

impl SpacingAnalyzer {
    #[must_use]
    pub fn new(edges: Edges) -> Self {
        Self { edges }
    }

    #[must_use]
    pub fn edges(&self) -> Edges {
        self.edges
    }

    /// Render the overlay for `target`, replacing any previous one.
    ///
    /// Returns the number of nodes created; `None` when the target is our
    /// own UI or no longer attached.
    pub fn show<D: Dom>(&self, stage: &mut Stage<'_, D>, target: NodeId) -> Option<usize> {
        if marker::is_own_ui(stage.dom, target) {
            return None;
        }
        let model = BoxModel::measure(stage.dom, target)?;
        self.hide(stage);
        let pieces = plan(&model, self.edges);
        let mut created = 0;
        for piece in &pieces {
            let text = match piece {
                SpacingPiece::Dimension { text, .. } | SpacingPiece::BandLabel { text, .. } => {
                    Some(text.as_str())
                }
                _ => None,
            };
            match stage.create("div", piece.role(), None, &piece_decls(piece)) {
                Ok(node) => {
                    if let Some(text) = text {
                        let _ = stage.dom.set_text(node, text);
                    }
                    created += 1;
                }
                Err(err) => {
                    debug!(error = %err, "spacing overlay creation failed");
                    break;
                }
            }
        }
        trace!(node = %target, created, "spacing overlay rendered");
        Some(created)
    }

    /// Remove every spacing-tagged node. Returns how many were removed.
    pub fn hide<D: Dom>(&self, stage: &mut Stage<'_, D>) -> usize {
        stage
            .overlays
            .remove_roles(stage.dom, &OverlayRole::SPACING)
    }
}
