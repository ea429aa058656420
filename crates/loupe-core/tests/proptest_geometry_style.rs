//! Property-based invariant tests for geometry and CSS length handling.
//!
//! 1. `outer` then `inner` with the same sides is the identity.
//! 2. `inner` never produces negative sizes.
//! 3. `contains` agrees with the edge accessors.
//! 4. `format_px` output parses back through `parse_px` and `parse_length`.
//! 5. `parse_length` ignores any unit suffix.
//! 6. Unset properties read as their initial value, set ones as written.

use loupe_core::geometry::{Rect, Sides};
use loupe_core::style::{ComputedStyle, format_px, parse_length, parse_px};
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (0u16..=2000, 0u16..=2000, 0u16..=1000, 0u16..=1000)
        .prop_map(|(x, y, w, h)| Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h)))
}

fn sides_strategy() -> impl Strategy<Value = Sides<f64>> {
    (0u16..=200, 0u16..=200, 0u16..=200, 0u16..=200).prop_map(|(t, r, b, l)| {
        Sides::new(f64::from(t), f64::from(r), f64::from(b), f64::from(l))
    })
}

proptest! {
    #[test]
    fn outer_then_inner_is_identity(rect in rect_strategy(), sides in sides_strategy()) {
        prop_assert_eq!(rect.outer(sides).inner(sides), rect);
    }

    #[test]
    fn inner_never_negative(rect in rect_strategy(), sides in sides_strategy()) {
        let inner = rect.inner(sides);
        prop_assert!(inner.width >= 0.0);
        prop_assert!(inner.height >= 0.0);
    }

    #[test]
    fn contains_matches_edges(rect in rect_strategy(), px in 0u16..=3000, py in 0u16..=3000) {
        let (x, y) = (f64::from(px), f64::from(py));
        let expected = x >= rect.left() && x < rect.right() && y >= rect.top() && y < rect.bottom();
        prop_assert_eq!(rect.contains(x, y), expected);
    }

    #[test]
    fn format_px_round_trips(tenths in -100_000i32..=100_000) {
        let value = f64::from(tenths) / 10.0;
        let text = format_px(value);
        prop_assert!(text.ends_with("px"));
        prop_assert_eq!(parse_px(&text), Some(value));
        prop_assert_eq!(parse_length(&text), Some(value));
    }

    #[test]
    fn parse_length_ignores_unit(n in 0u32..=100_000, unit in prop::sample::select(vec!["px", "em", "rem", "%", "vh", ""])) {
        let text = format!("{n}{unit}");
        prop_assert_eq!(parse_length(&text), Some(f64::from(n)));
        prop_assert_eq!(parse_px(&text).is_some(), unit.is_empty() || unit == "px");
    }

    #[test]
    fn set_values_shadow_initial_values(value in "[a-z0-9 ]{1,12}") {
        let style = ComputedStyle::new().with("max-width", value.clone());
        prop_assert_eq!(style.get("max-width"), value.as_str());
        let style = ComputedStyle::new();
        prop_assert_eq!(style.get("max-width"), "none");
    }
}
