#![forbid(unsafe_code)]

//! Geometric primitives in CSS pixels.

use serde::Serialize;

/// A rectangle in viewport coordinates (CSS pixels, origin at top-left).
///
/// Mirrors what `getBoundingClientRect()` reports for an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge. Alias for `self.x`.
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge. Alias for `self.y`.
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink the rectangle by the given insets.
    ///
    /// Width and height clamp at zero.
    pub fn inner(&self, insets: Sides<f64>) -> Rect {
        Rect {
            x: self.x + insets.left,
            y: self.y + insets.top,
            width: (self.width - insets.left - insets.right).max(0.0),
            height: (self.height - insets.top - insets.bottom).max(0.0),
        }
    }

    /// Grow the rectangle by the given outsets.
    pub fn outer(&self, outsets: Sides<f64>) -> Rect {
        Rect {
            x: self.x - outsets.left,
            y: self.y - outsets.top,
            width: self.width + outsets.left + outsets.right,
            height: self.height + outsets.top + outsets.bottom,
        }
    }
}

/// Per-edge values for margin/padding, in CSS shorthand order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T> Sides<T> {
    /// Create new sides with specific values.
    pub const fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Apply `f` to every edge.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Sides<U> {
        Sides {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }

    /// Borrow the edges in top/right/bottom/left order.
    pub fn as_array(&self) -> [&T; 4] {
        [&self.top, &self.right, &self.bottom, &self.left]
    }
}

impl<T: Clone> Sides<T> {
    /// Create new sides with equal values.
    pub fn all(val: T) -> Self {
        Self {
            top: val.clone(),
            right: val.clone(),
            bottom: val.clone(),
            left: val,
        }
    }
}

impl Sides<f64> {
    /// Sum of left and right.
    #[inline]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Sides};

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert_eq!(r.center_x(), 60.0);
        assert_eq!(r.center_y(), 45.0);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(9.5, 9.5));
        assert!(!r.contains(10.0, 5.0));
        assert!(!r.contains(5.0, 10.0));
    }

    #[test]
    fn rect_inner_clamps() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inner = r.inner(Sides::all(8.0));
        assert_eq!(inner.x, 8.0);
        assert_eq!(inner.width, 0.0);
        assert!(inner.is_empty());
    }

    #[test]
    fn rect_outer_grows() {
        let r = Rect::new(10.0, 10.0, 10.0, 10.0);
        let outer = r.outer(Sides::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(outer, Rect::new(6.0, 9.0, 16.0, 14.0));
    }

    #[test]
    fn sides_map_preserves_order() {
        let s = Sides::new("1px", "2px", "3px", "4px").map(|v| v.len());
        assert_eq!(s, Sides::new(3, 3, 3, 3));
        let s = Sides::new(1, 2, 3, 4);
        assert_eq!(s.as_array(), [&1, &2, &3, &4]);
    }

    #[test]
    fn sides_sums() {
        let s = Sides::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(s.horizontal_sum(), 6.0);
        assert_eq!(s.vertical_sum(), 4.0);
    }
}
