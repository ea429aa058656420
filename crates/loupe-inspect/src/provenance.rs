#![forbid(unsafe_code)]

//! Heuristic attribution of computed sizes.
//!
//! Given only computed style (no access to stylesheet rules), guess which
//! constraint class produced an element's width or height. The checks run in
//! a fixed priority order:
//!
//! 1. inline style sets the property
//! 2. a finite `max-*` binds the computed value
//! 3. a non-zero `min-*` binds the computed value
//! 4. the element or its parent is a flex/grid container
//! 5. fallback (`auto` / declared value)
//!
//! This is best-effort. The label names a plausible cause; it does not
//! identify the winning rule.

use std::fmt;

use serde::Serialize;

use loupe_core::dom::{Dom, NodeId};
use loupe_core::geometry::Sides;
use loupe_core::style::{ComputedStyle, parse_px};

/// A size property whose provenance can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Width,
    Height,
}

impl Dimension {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }

    const fn max_property(self) -> &'static str {
        match self {
            Self::Width => "max-width",
            Self::Height => "max-height",
        }
    }

    const fn min_property(self) -> &'static str {
        match self {
            Self::Width => "min-width",
            Self::Height => "min-height",
        }
    }
}

/// The constraint class a value is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ProvenanceSource {
    /// `style=""` sets the property.
    InlineStyle,
    /// The `max-*` constraint (value as computed) caps the size.
    MaxConstraint(String),
    /// The `min-*` constraint (value as computed) floors the size.
    MinConstraint(String),
    /// Sized by a flex or grid formatting context.
    FlexGrid,
    /// Width fell through every check.
    WidthOrAuto,
    /// Height is content-driven.
    ContentHeight,
    /// Height fell through with a declared value.
    DeclaredHeight(String),
}

/// A resolved size and the constraint it is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyProvenance {
    pub dimension: Dimension,
    pub value: String,
    pub source: ProvenanceSource,
}

impl PropertyProvenance {
    /// Human-readable source label.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.source {
            ProvenanceSource::InlineStyle => "inline style".to_owned(),
            ProvenanceSource::MaxConstraint(v) => {
                format!("{}: {v}", self.dimension.max_property())
            }
            ProvenanceSource::MinConstraint(v) => {
                format!("{}: {v}", self.dimension.min_property())
            }
            ProvenanceSource::FlexGrid => "flex/grid sizing".to_owned(),
            ProvenanceSource::WidthOrAuto => "width or auto".to_owned(),
            ProvenanceSource::ContentHeight => "content height (auto)".to_owned(),
            ProvenanceSource::DeclaredHeight(v) => format!("height: {v}"),
        }
    }
}

impl fmt::Display for PropertyProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.label())
    }
}

/// Resolve provenance from already-captured style.
///
/// `inline` is the element's inline value for the dimension (if any) and
/// `parent` its parent's computed style.
#[must_use]
pub fn resolve_from(
    style: &ComputedStyle,
    inline: Option<&str>,
    parent: Option<&ComputedStyle>,
    dimension: Dimension,
) -> PropertyProvenance {
    let value = style.get(dimension.as_str()).to_owned();
    let source = source_for(style, inline, parent, dimension, &value);
    PropertyProvenance {
        dimension,
        value,
        source,
    }
}

fn source_for(
    style: &ComputedStyle,
    inline: Option<&str>,
    parent: Option<&ComputedStyle>,
    dimension: Dimension,
    value: &str,
) -> ProvenanceSource {
    if inline.is_some_and(|v| !v.trim().is_empty()) {
        return ProvenanceSource::InlineStyle;
    }

    let computed = parse_px(value);
    let max = style.get(dimension.max_property());
    if max != "none"
        && let (Some(limit), Some(actual)) = (parse_px(max), computed)
        && limit <= actual
    {
        return ProvenanceSource::MaxConstraint(max.to_owned());
    }

    let min = style.get(dimension.min_property());
    if let (Some(limit), Some(actual)) = (parse_px(min), computed)
        && limit != 0.0
        && limit >= actual
    {
        return ProvenanceSource::MinConstraint(min.to_owned());
    }

    if style.is_flex_or_grid() || parent.is_some_and(ComputedStyle::is_flex_or_grid) {
        return ProvenanceSource::FlexGrid;
    }

    match dimension {
        Dimension::Width => ProvenanceSource::WidthOrAuto,
        Dimension::Height if value == "auto" => ProvenanceSource::ContentHeight,
        Dimension::Height => ProvenanceSource::DeclaredHeight(value.to_owned()),
    }
}

/// Resolve provenance for a live node. `None` when the node is detached.
pub fn resolve<D: Dom>(dom: &D, node: NodeId, dimension: Dimension) -> Option<PropertyProvenance> {
    let style = dom.computed_style(node)?;
    let inline = dom.inline_style(node, dimension.as_str());
    let parent = dom.parent_element(node).and_then(|p| dom.computed_style(p));
    Some(resolve_from(&style, inline.as_deref(), parent.as_ref(), dimension))
}

/// Box-edge property summarized by [`summarize_box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxProperty {
    Margin,
    Padding,
}

impl BoxProperty {
    const fn name(self) -> &'static str {
        match self {
            Self::Margin => "margin",
            Self::Padding => "padding",
        }
    }
}

fn uniform(sides: &Sides<&str>) -> bool {
    let [t, r, b, l] = sides.as_array();
    if t == r && r == b && b == l {
        return true;
    }
    match (parse_px(t), parse_px(r), parse_px(b), parse_px(l)) {
        (Some(t), Some(r), Some(b), Some(l)) => t == r && r == b && b == l,
        _ => false,
    }
}

/// One-line margin/padding summary.
///
/// Four equal sides collapse to one value (`"margin: 10px"`), with zero
/// annotated (`"margin: 0px (no margin)"`). Otherwise all four are listed in
/// top/right/bottom/left order.
#[must_use]
pub fn summarize_box(property: BoxProperty, sides: Sides<&str>) -> String {
    let name = property.name();
    if uniform(&sides) {
        let value = sides.top;
        if parse_px(value) == Some(0.0) {
            format!("{name}: {value} (no {name})")
        } else {
            format!("{name}: {value}")
        }
    } else {
        format!(
            "{name}: {} {} {} {}",
            sides.top, sides.right, sides.bottom, sides.left
        )
    }
}

/// Position mode plus explicit offsets, e.g. `"relative (top:10px left:5px)"`.
#[must_use]
pub fn summarize_position(style: &ComputedStyle) -> String {
    let position = style.position();
    if position == "static" {
        return position.to_owned();
    }
    let offsets: Vec<String> = ["top", "right", "bottom", "left"]
        .into_iter()
        .filter_map(|edge| {
            let v = style.get(edge);
            (v != "auto" && !v.is_empty()).then(|| format!("{edge}:{v}"))
        })
        .collect();
    if offsets.is_empty() {
        position.to_owned()
    } else {
        format!("{position} ({})", offsets.join(" "))
    }
}

/// Everything the info popup reports about sizing and layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssAnalysis {
    pub width: PropertyProvenance,
    pub height: PropertyProvenance,
    pub margin: String,
    pub padding: String,
    pub position: String,
}

impl CssAnalysis {
    /// Analyze a live node. `None` when the node is detached.
    pub fn of<D: Dom>(dom: &D, node: NodeId) -> Option<Self> {
        let style = dom.computed_style(node)?;
        let parent = dom.parent_element(node).and_then(|p| dom.computed_style(p));
        let dim = |d: Dimension| {
            let inline = dom.inline_style(node, d.as_str());
            resolve_from(&style, inline.as_deref(), parent.as_ref(), d)
        };
        Some(Self {
            width: dim(Dimension::Width),
            height: dim(Dimension::Height),
            margin: summarize_box(BoxProperty::Margin, style.margin()),
            padding: summarize_box(BoxProperty::Padding, style.padding()),
            position: summarize_position(&style),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_core::{ElementSpec, MemoryDom};
    use pretty_assertions::assert_eq;

    fn style(pairs: &[(&str, &str)]) -> ComputedStyle {
        pairs.iter().copied().collect()
    }

    #[test]
    fn inline_wins_over_everything() {
        let s = style(&[
            ("width", "200px"),
            ("max-width", "200px"),
            ("min-width", "300px"),
            ("display", "flex"),
        ]);
        let p = resolve_from(&s, Some("200px"), None, Dimension::Width);
        assert_eq!(p.source, ProvenanceSource::InlineStyle);
        assert_eq!(p.to_string(), "200px (inline style)");
    }

    #[test]
    fn binding_max_reports_constraint() {
        let s = style(&[("width", "300px"), ("max-width", "300px")]);
        let p = resolve_from(&s, None, None, Dimension::Width);
        assert_eq!(p.label(), "max-width: 300px");
    }

    #[test]
    fn non_binding_max_is_skipped() {
        let s = style(&[("width", "120px"), ("max-width", "300px")]);
        let p = resolve_from(&s, None, None, Dimension::Width);
        assert_eq!(p.source, ProvenanceSource::WidthOrAuto);
    }

    #[test]
    fn percentage_max_does_not_bind() {
        let s = style(&[("width", "50px"), ("max-width", "10%")]);
        let p = resolve_from(&s, None, None, Dimension::Width);
        assert_eq!(p.source, ProvenanceSource::WidthOrAuto);
    }

    #[test]
    fn binding_min_reports_constraint() {
        let s = style(&[("height", "80px"), ("min-height", "80px")]);
        let p = resolve_from(&s, None, None, Dimension::Height);
        assert_eq!(p.to_string(), "80px (min-height: 80px)");
    }

    #[test]
    fn zero_min_never_binds() {
        let s = style(&[("width", "0px"), ("min-width", "0px")]);
        let p = resolve_from(&s, None, None, Dimension::Width);
        assert_eq!(p.source, ProvenanceSource::WidthOrAuto);
    }

    #[test]
    fn flex_parent_counts() {
        let s = style(&[("width", "140px")]);
        let parent = style(&[("display", "inline-flex")]);
        let p = resolve_from(&s, None, Some(&parent), Dimension::Width);
        assert_eq!(p.label(), "flex/grid sizing");
        let grid_self = style(&[("height", "40px"), ("display", "grid")]);
        let p = resolve_from(&grid_self, None, None, Dimension::Height);
        assert_eq!(p.source, ProvenanceSource::FlexGrid);
    }

    #[test]
    fn height_fallbacks() {
        let auto = style(&[("height", "auto")]);
        assert_eq!(
            resolve_from(&auto, None, None, Dimension::Height).label(),
            "content height (auto)"
        );
        let fixed = style(&[("height", "120px")]);
        assert_eq!(
            resolve_from(&fixed, None, None, Dimension::Height).to_string(),
            "120px (height: 120px)"
        );
    }

    #[test]
    fn margin_summaries() {
        assert_eq!(
            summarize_box(BoxProperty::Margin, Sides::all("10px")),
            "margin: 10px"
        );
        assert_eq!(
            summarize_box(BoxProperty::Margin, Sides::all("0px")),
            "margin: 0px (no margin)"
        );
        assert_eq!(
            summarize_box(BoxProperty::Padding, Sides::new("1px", "2px", "3px", "4px")),
            "padding: 1px 2px 3px 4px"
        );
        assert_eq!(
            summarize_box(BoxProperty::Padding, Sides::new("0", "0px", "0px", "0px")),
            "padding: 0 (no padding)"
        );
    }

    #[test]
    fn position_summaries() {
        assert_eq!(summarize_position(&ComputedStyle::new()), "static");
        let rel = style(&[("position", "relative"), ("top", "10px"), ("left", "5px")]);
        assert_eq!(summarize_position(&rel), "relative (top:10px left:5px)");
        let bare = style(&[("position", "sticky")]);
        assert_eq!(summarize_position(&bare), "sticky");
        let stat = style(&[("position", "static"), ("top", "4px")]);
        assert_eq!(summarize_position(&stat), "static");
    }

    #[test]
    fn live_resolution_reads_inline_and_parent() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let row = dom.append(body, ElementSpec::new("div").computed("display", "flex"));
        let cell = dom.append(row, ElementSpec::new("div").computed("width", "90px"));
        let fixed = dom.append(row, ElementSpec::new("div").inline("width", "200px"));

        let p = resolve(&dom, cell, Dimension::Width).unwrap();
        assert_eq!(p.source, ProvenanceSource::FlexGrid);
        let p = resolve(&dom, fixed, Dimension::Width).unwrap();
        assert_eq!(p.to_string(), "200px (inline style)");

        dom.remove(cell);
        assert!(resolve(&dom, cell, Dimension::Width).is_none());
        assert!(CssAnalysis::of(&dom, cell).is_none());
    }

    #[test]
    fn analysis_bundles_everything() {
        let mut dom = MemoryDom::new();
        let body = dom.body().unwrap();
        let el = dom.append(
            body,
            ElementSpec::new("div")
                .computed("width", "300px")
                .computed("height", "auto")
                .computed("margin-top", "8px")
                .computed("margin-right", "8px")
                .computed("margin-bottom", "8px")
                .computed("margin-left", "8px")
                .computed("position", "absolute")
                .computed("right", "0px"),
        );
        let a = CssAnalysis::of(&dom, el).unwrap();
        assert_eq!(a.width.to_string(), "300px (width or auto)");
        assert_eq!(a.height.to_string(), "auto (content height (auto))");
        assert_eq!(a.margin, "margin: 8px");
        assert_eq!(a.padding, "padding: 0px (no padding)");
        assert_eq!(a.position, "absolute (right:0px)");
    }
}
