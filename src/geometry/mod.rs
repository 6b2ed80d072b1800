//! Geometric primitives for layout analysis.
//!
//! Coordinates follow the PDF convention: the origin is the bottom-left corner
//! of the page and y grows upward, so a box's `y1` is its top edge.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f64,
    /// Bottom edge
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Top edge
    pub y1: f64,
}

impl Rect {
    /// Create a rectangle from its two corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use docpile::geometry::Rect;
    ///
    /// let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.width(), 100.0);
    /// assert_eq!(rect.height(), 50.0);
    /// ```
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Horizontal extent (`x1 - x0`).
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Vertical extent (`y1 - y0`).
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True when the box has no area (zero or negative width or height).
    ///
    /// NaN coordinates are treated as degenerate as well.
    ///
    /// # Examples
    ///
    /// ```
    /// use docpile::geometry::Rect;
    ///
    /// assert!(Rect::new(5.0, 5.0, 5.0, 10.0).is_degenerate());
    /// assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    /// ```
    pub fn is_degenerate(&self) -> bool {
        !(self.x0 < self.x1 && self.y0 < self.y1)
    }

    /// Smallest rectangle containing both boxes.
    ///
    /// # Examples
    ///
    /// ```
    /// use docpile::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
    /// let r2 = Rect::new(25.0, 25.0, 75.0, 75.0);
    /// assert_eq!(r1.union(&r2), Rect::new(0.0, 0.0, 75.0, 75.0));
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Tolerant interval overlap used by the region clusterer.
///
/// `[lo, hi]` overlaps `[bottom, top]` when either of its edges falls inside
/// the span widened by `tolerance` on both sides, or when either edge of the
/// span falls inside `[lo, hi]` widened the same way. The second half catches
/// objects that fully contain the span.
///
/// # Examples
///
/// ```
/// use docpile::geometry::spans_overlap;
///
/// assert!(spans_overlap(10.0, 20.0, 20.5, 40.0, 0.7));
/// assert!(spans_overlap(10.0, 20.0, 0.0, 100.0, 0.7));
/// assert!(!spans_overlap(10.0, 20.0, 21.0, 40.0, 0.7));
/// ```
pub fn spans_overlap(bottom: f64, top: f64, lo: f64, hi: f64, tolerance: f64) -> bool {
    let within = |v: f64, a: f64, b: f64| a - tolerance <= v && v <= b + tolerance;
    within(lo, bottom, top)
        || within(hi, bottom, top)
        || within(bottom, lo, hi)
        || within(top, lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(5.0, 10.0, 105.0, 60.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
    }

    #[test]
    fn test_rect_degenerate() {
        assert!(Rect::new(0.0, 0.0, 0.0, 0.0).is_degenerate());
        assert!(Rect::new(10.0, 0.0, 5.0, 5.0).is_degenerate());
        assert!(Rect::new(0.0, 10.0, 5.0, 5.0).is_degenerate());
        assert!(Rect::new(f64::NAN, 0.0, 5.0, 5.0).is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 0.5, 100.0).is_degenerate());
    }

    #[test]
    fn test_rect_union_contains_both() {
        let r1 = Rect::new(0.0, 10.0, 1.0, 20.0);
        let r2 = Rect::new(0.2, 15.0, 0.8, 40.0);
        let u = r1.union(&r2);
        assert_eq!(u, Rect::new(0.0, 10.0, 1.0, 40.0));
    }

    #[test]
    fn test_spans_overlap_edges() {
        // Edge exactly on the widened boundary counts.
        assert!(spans_overlap(0.0, 10.0, 10.7, 20.0, 0.7));
        assert!(spans_overlap(0.0, 10.0, -20.0, -0.7, 0.7));
        assert!(!spans_overlap(0.0, 10.0, 10.8, 20.0, 0.7));
    }

    #[test]
    fn test_spans_overlap_containment() {
        // Object entirely containing the span.
        assert!(spans_overlap(40.0, 60.0, 0.0, 100.0, 0.0));
        // Span entirely containing the object.
        assert!(spans_overlap(0.0, 100.0, 40.0, 60.0, 0.0));
    }
}
