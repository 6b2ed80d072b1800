//! Primitive classification.
//!
//! Flattens a page's primitive tree into typed collections. Text lines become
//! [`TextRun`]s, thin rectangles become rule segments (merged as they are
//! found), images become [`ImageMarker`]s, and everything without structural
//! meaning is dropped and counted.

use crate::config::ConversionConfig;
use crate::error::Error;
use crate::layout::primitives::{ImageMarker, Orientation, Primitive, RuleSegment, TextRun};
use crate::layout::rule_merger::{MergeOutcome, RuleMerger};

/// A rectangle thinner than this along one axis is a rule line.
pub const RULE_THICKNESS: f64 = 1.0;

/// Counts of primitives that did not end up in any region.
///
/// Together with the region contents these account for every primitive of
/// the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DroppedPrimitives {
    /// Rectangles thin in neither direction
    pub thick_rects: usize,
    /// Rule segments shorter than the configured minimum
    pub short_rules: usize,
    /// Rule candidates folded into an existing segment
    pub merged_rules: usize,
    /// Bare lines and curves
    pub lines_and_curves: usize,
    /// Isolated glyphs and decoder annotations
    pub glyphs: usize,
    /// Primitives of unknown kind
    pub unrecognized: usize,
    /// Verticals of table clusters that claimed no text
    pub anchorless_verticals: usize,
    /// Horizontals claimed by no table
    pub unclaimed_horizontals: usize,
    /// Text runs that fit no paragraph bucket
    pub unplaced_texts: usize,
}

impl DroppedPrimitives {
    /// Total number of dropped leaf primitives.
    pub fn total(&self) -> usize {
        self.thick_rects
            + self.short_rules
            + self.merged_rules
            + self.lines_and_curves
            + self.glyphs
            + self.unrecognized
            + self.anchorless_verticals
            + self.unclaimed_horizontals
            + self.unplaced_texts
    }
}

/// Typed collections extracted from one page.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedPage {
    /// Text runs in depth-first order
    pub texts: Vec<TextRun>,
    /// Merged vertical rule segments in acceptance order
    pub verticals: Vec<RuleSegment>,
    /// Merged horizontal rule segments in acceptance order
    pub horizontals: Vec<RuleSegment>,
    /// Image markers in depth-first order
    pub images: Vec<ImageMarker>,
    /// Drop accounting
    pub dropped: DroppedPrimitives,
}

/// Flatten a primitive tree into typed collections.
///
/// Containers are expanded in place so the depth-first order of the leaves is
/// preserved.
pub fn classify(primitives: Vec<Primitive>, config: &ConversionConfig) -> ClassifiedPage {
    let mut verticals = RuleMerger::new(Orientation::Vertical, config.tolerances.vertical);
    let mut horizontals = RuleMerger::new(Orientation::Horizontal, config.tolerances.horizontal);
    let mut page = ClassifiedPage::default();

    let mut stack: Vec<Primitive> = primitives.into_iter().rev().collect();
    while let Some(obj) = stack.pop() {
        match obj {
            Primitive::TextBox { children }
            | Primitive::TextBoxHorizontal { children }
            | Primitive::TextLine { children }
            | Primitive::Figure { children } => {
                stack.extend(children.into_iter().rev());
            },
            Primitive::TextLineHorizontal {
                bbox,
                text,
                font,
                height,
            } => {
                page.texts.push(TextRun::new(bbox, text, font, height));
            },
            Primitive::Rect { bbox } => {
                let segment = if bbox.width() < RULE_THICKNESS {
                    RuleSegment::vertical(bbox)
                } else if bbox.height() < RULE_THICKNESS {
                    RuleSegment::horizontal(bbox)
                } else {
                    page.dropped.thick_rects += 1;
                    continue;
                };

                if segment.length() < config.min_rule_length {
                    page.dropped.short_rules += 1;
                    continue;
                }

                let merger = match segment.orientation {
                    Orientation::Vertical => &mut verticals,
                    Orientation::Horizontal => &mut horizontals,
                };
                if let MergeOutcome::Merged { .. } = merger.push(segment) {
                    page.dropped.merged_rules += 1;
                }
            },
            Primitive::Image { bbox } => {
                page.images.push(ImageMarker::new(bbox));
            },
            Primitive::Line { .. } | Primitive::Curve { .. } => {
                page.dropped.lines_and_curves += 1;
            },
            Primitive::Char { .. } | Primitive::Anno { .. } => {
                page.dropped.glyphs += 1;
            },
            Primitive::Unknown => {
                log::warn!(
                    "{}; dropped",
                    Error::UnrecognizedPrimitiveKind(Primitive::Unknown.kind_name().to_string())
                );
                page.dropped.unrecognized += 1;
            },
        }
    }

    page.verticals = verticals.into_segments();
    page.horizontals = horizontals.into_segments();

    log::debug!(
        "Classified {} texts, {} verticals, {} horizontals, {} images ({} dropped)",
        page.texts.len(),
        page.verticals.len(),
        page.horizontals.len(),
        page.images.len(),
        page.dropped.total()
    );

    page
}
