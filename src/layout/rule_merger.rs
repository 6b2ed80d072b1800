//! Coalescing of duplicate ruling lines.
//!
//! Documents often draw one visible table border as several overlapping thin
//! rectangles. The merger keeps a single segment per physical line: a
//! candidate whose identity coordinate is within tolerance of an accepted
//! segment only stretches that segment along the cross axis.

use crate::geometry::Rect;
use crate::layout::primitives::{Orientation, RuleSegment};

/// What happened to a candidate segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Stored as a new segment at this index
    Accepted(usize),
    /// Folded into the existing segment at this index
    Merged {
        /// Index of the segment that absorbed the candidate
        into: usize,
    },
}

/// Accepted segments of one orientation.
#[derive(Debug, Clone)]
pub struct RuleMerger {
    orientation: Orientation,
    tolerance: f64,
    segments: Vec<RuleSegment>,
}

impl RuleMerger {
    /// Create an empty merger for one orientation.
    pub fn new(orientation: Orientation, tolerance: f64) -> Self {
        Self {
            orientation,
            tolerance,
            segments: Vec::new(),
        }
    }

    /// Offer a candidate segment.
    ///
    /// The first accepted segment whose identity coordinate lies strictly
    /// within tolerance absorbs the candidate. The absorbing segment keeps
    /// its own identity-axis coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use docpile::geometry::Rect;
    /// use docpile::layout::primitives::{Orientation, RuleSegment};
    /// use docpile::layout::rule_merger::{MergeOutcome, RuleMerger};
    ///
    /// let mut merger = RuleMerger::new(Orientation::Vertical, 1.0);
    /// merger.push(RuleSegment::vertical(Rect::new(10.0, 0.0, 10.4, 20.0)));
    /// let outcome = merger.push(RuleSegment::vertical(Rect::new(10.3, 15.0, 10.7, 40.0)));
    ///
    /// assert_eq!(outcome, MergeOutcome::Merged { into: 0 });
    /// assert_eq!(merger.segments()[0].bbox, Rect::new(10.0, 0.0, 10.4, 40.0));
    /// ```
    pub fn push(&mut self, candidate: RuleSegment) -> MergeOutcome {
        debug_assert_eq!(candidate.orientation, self.orientation);

        let id = candidate.identity();
        let close = self
            .segments
            .iter()
            .position(|s| (id - s.identity()).abs() < self.tolerance);

        match close {
            Some(into) => {
                let existing = &mut self.segments[into];
                existing.bbox = extend_cross_axis(&existing.bbox, &candidate.bbox, self.orientation);
                MergeOutcome::Merged { into }
            },
            None => {
                self.segments.push(candidate);
                MergeOutcome::Accepted(self.segments.len() - 1)
            },
        }
    }

    /// Accepted segments in acceptance order.
    pub fn segments(&self) -> &[RuleSegment] {
        &self.segments
    }

    /// Consume the merger and return its segments.
    pub fn into_segments(self) -> Vec<RuleSegment> {
        self.segments
    }
}

/// Union of two boxes along the cross axis, keeping `existing` on the identity axis.
fn extend_cross_axis(existing: &Rect, other: &Rect, orientation: Orientation) -> Rect {
    match orientation {
        Orientation::Vertical => Rect::new(
            existing.x0,
            existing.y0.min(other.y0),
            existing.x1,
            existing.y1.max(other.y1),
        ),
        Orientation::Horizontal => Rect::new(
            existing.x0.min(other.x0),
            existing.y0,
            existing.x1.max(other.x1),
            existing.y1,
        ),
    }
}
