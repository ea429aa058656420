#![forbid(unsafe_code)]

//! Computed-style snapshots and CSS length parsing.
//!
//! A [`ComputedStyle`] is captured once per event from the live document and
//! never refreshed; layout changes mid-hover leave it stale.

use std::collections::BTreeMap;

use crate::geometry::Sides;

/// Properties captured when snapshotting a live element's computed style.
pub const SNAPSHOT_PROPERTIES: &[&str] = &[
    "width",
    "height",
    "min-width",
    "max-width",
    "min-height",
    "max-height",
    "display",
    "position",
    "top",
    "right",
    "bottom",
    "left",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "font-family",
    "font-size",
    "font-weight",
    "color",
];

/// Value reported for a property the snapshot does not carry.
///
/// These are the CSS initial values as a browser would serialize them.
pub fn initial_value(property: &str) -> &'static str {
    match property {
        "max-width" | "max-height" => "none",
        "min-width" | "min-height" => "0px",
        "width" | "height" | "top" | "right" | "bottom" | "left" => "auto",
        "display" => "block",
        "position" => "static",
        "font-family" => "serif",
        "font-size" => "16px",
        "font-weight" => "400",
        "color" => "rgb(0, 0, 0)",
        p if p.starts_with("margin-") || p.starts_with("padding-") => "0px",
        _ => "",
    }
}

/// A point-in-time snapshot of an element's computed style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    values: BTreeMap<String, String>,
}

impl ComputedStyle {
    /// Create an empty snapshot (every property reads as its initial value).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property (builder form).
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Set a property.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.values.insert(property.into(), value.into());
    }

    /// Read a property, falling back to its initial value.
    #[must_use]
    pub fn get(&self, property: &str) -> &str {
        self.values
            .get(property)
            .map(String::as_str)
            .unwrap_or_else(|| initial_value(property))
    }

    /// Whether the snapshot carries an explicit value for `property`.
    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    /// The `display` value.
    #[must_use]
    pub fn display(&self) -> &str {
        self.get("display")
    }

    /// The `position` value.
    #[must_use]
    pub fn position(&self) -> &str {
        self.get("position")
    }

    /// Whether `display` establishes a flex or grid container.
    #[must_use]
    pub fn is_flex_or_grid(&self) -> bool {
        let display = self.display();
        display.contains("flex") || display.contains("grid")
    }

    /// Raw margin values in top/right/bottom/left order.
    #[must_use]
    pub fn margin(&self) -> Sides<&str> {
        self.edges("margin")
    }

    /// Raw padding values in top/right/bottom/left order.
    #[must_use]
    pub fn padding(&self) -> Sides<&str> {
        self.edges("padding")
    }

    /// Margin in pixels; unparseable edges read as zero.
    #[must_use]
    pub fn margin_px(&self) -> Sides<f64> {
        self.margin().map(|v| parse_length(v).unwrap_or(0.0))
    }

    /// Padding in pixels; unparseable edges read as zero.
    #[must_use]
    pub fn padding_px(&self) -> Sides<f64> {
        self.padding().map(|v| parse_length(v).unwrap_or(0.0))
    }

    /// First family in the `font-family` list, as the browser spelled it.
    #[must_use]
    pub fn primary_font_family(&self) -> &str {
        self.get("font-family")
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }

    fn edges(&self, prefix: &str) -> Sides<&str> {
        Sides::new(
            self.get_edge(prefix, "top"),
            self.get_edge(prefix, "right"),
            self.get_edge(prefix, "bottom"),
            self.get_edge(prefix, "left"),
        )
    }

    fn get_edge(&self, prefix: &str, edge: &str) -> &str {
        let key = format!("{prefix}-{edge}");
        match self.values.get(&key) {
            Some(v) => v.as_str(),
            None => initial_value(&key),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedStyle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Self::new();
        for (k, v) in iter {
            style.set(k, v);
        }
        style
    }
}

/// Parse the leading number of a CSS value, ignoring any unit.
///
/// Behaves like `parseFloat`: `"12.5px"` → `12.5`, `"1em"` → `1.0`,
/// `"auto"` → `None`.
#[must_use]
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0))
        })
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a pixel length. Bare numbers count as pixels; any other unit or
/// keyword yields `None`.
#[must_use]
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a pixel value the way computed style serializes it (`"12px"`,
/// `"12.5px"`).
#[must_use]
pub fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_properties_read_as_initial_values() {
        let style = ComputedStyle::new();
        assert_eq!(style.get("max-width"), "none");
        assert_eq!(style.get("min-height"), "0px");
        assert_eq!(style.get("position"), "static");
        assert_eq!(style.get("margin-left"), "0px");
        assert_eq!(style.get("top"), "auto");
        assert_eq!(style.get("unknown-prop"), "");
        assert!(!style.contains("width"));
    }

    #[test]
    fn builder_and_from_iter_agree() {
        let a = ComputedStyle::new().with("width", "10px").with("display", "flex");
        let b: ComputedStyle = [("width", "10px"), ("display", "flex")].into_iter().collect();
        assert_eq!(a, b);
        assert!(a.is_flex_or_grid());
    }

    #[test]
    fn flex_and_grid_variants_detected() {
        for display in ["flex", "inline-flex", "grid", "inline-grid"] {
            assert!(ComputedStyle::new().with("display", display).is_flex_or_grid());
        }
        assert!(!ComputedStyle::new().with("display", "block").is_flex_or_grid());
    }

    #[test]
    fn margin_and_padding_edges() {
        let style = ComputedStyle::new()
            .with("margin-top", "10px")
            .with("margin-left", "4.5px")
            .with("padding-bottom", "auto");
        assert_eq!(style.margin(), Sides::new("10px", "0px", "0px", "4.5px"));
        assert_eq!(style.margin_px(), Sides::new(10.0, 0.0, 0.0, 4.5));
        assert_eq!(style.padding_px().bottom, 0.0);
    }

    #[test]
    fn primary_font_family_takes_first_entry() {
        let style = ComputedStyle::new().with("font-family", "\"Helvetica Neue\", Arial, sans-serif");
        assert_eq!(style.primary_font_family(), "\"Helvetica Neue\"");
        assert_eq!(ComputedStyle::new().primary_font_family(), "serif");
    }

    #[test]
    fn parse_length_behaves_like_parse_float() {
        assert_eq!(parse_length("12.5px"), Some(12.5));
        assert_eq!(parse_length("-3px"), Some(-3.0));
        assert_eq!(parse_length("1em"), Some(1.0));
        assert_eq!(parse_length("  0  "), Some(0.0));
        assert_eq!(parse_length("auto"), None);
        assert_eq!(parse_length("none"), None);
        assert_eq!(parse_length(""), None);
    }

    #[test]
    fn parse_px_rejects_other_units() {
        assert_eq!(parse_px("200px"), Some(200.0));
        assert_eq!(parse_px("200"), Some(200.0));
        assert_eq!(parse_px("50%"), None);
        assert_eq!(parse_px("none"), None);
        assert_eq!(parse_px("10em"), None);
    }

    #[test]
    fn format_px_drops_integral_fraction() {
        assert_eq!(format_px(20.0), "20px");
        assert_eq!(format_px(12.5), "12.5px");
    }
}
