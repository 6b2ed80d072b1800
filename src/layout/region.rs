//! Regions: the semantic blocks produced by the clusterer.

use crate::layout::primitives::{ImageMarker, RuleSegment, TextRun};
use std::fmt;

/// Kind of a region, derived from its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Ruled table
    Table,
    /// Flowing text
    Paragraph,
    /// Figure
    Image,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionKind::Table => "table",
            RegionKind::Paragraph => "paragraph",
            RegionKind::Image => "image",
        };
        f.write_str(name)
    }
}

/// A connected set of verticals plus the horizontals and text inside their span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRegion {
    /// Column separators
    pub verticals: Vec<RuleSegment>,
    /// Row separators
    pub horizontals: Vec<RuleSegment>,
    /// Text inside the table span
    pub texts: Vec<TextRun>,
}

impl TableRegion {
    /// Vertical extent `(bottom, top)` of the member verticals.
    pub fn extent(&self) -> (f64, f64) {
        vertical_extent(&self.verticals)
    }
}

/// Text between (or around) tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphRegion {
    /// Text runs in page order
    pub texts: Vec<TextRun>,
}

/// A single image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRegion {
    /// The image
    pub image: ImageMarker,
}

/// A semantic block of one page.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Ruled table
    Table(TableRegion),
    /// Flowing text
    Paragraph(ParagraphRegion),
    /// Figure
    Image(ImageRegion),
}

impl Region {
    /// Kind of this region.
    pub fn kind(&self) -> RegionKind {
        match self {
            Region::Table(_) => RegionKind::Table,
            Region::Paragraph(_) => RegionKind::Paragraph,
            Region::Image(_) => RegionKind::Image,
        }
    }

    /// Text runs of the region, in region order.
    pub fn texts(&self) -> &[TextRun] {
        match self {
            Region::Table(t) => &t.texts,
            Region::Paragraph(p) => &p.texts,
            Region::Image(_) => &[],
        }
    }

    /// Sort key: `y0` of the first text run, else of the image.
    pub fn anchor(&self) -> Option<f64> {
        match self {
            Region::Image(img) => Some(img.image.bbox.y0),
            _ => self.texts().first().map(|t| t.bbox.y0),
        }
    }

    /// True for table regions.
    pub fn is_table(&self) -> bool {
        matches!(self, Region::Table(_))
    }
}

/// `(min y0, max y1)` over a set of segments.
pub(crate) fn vertical_extent(segments: &[RuleSegment]) -> (f64, f64) {
    segments
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(bottom, top), s| {
            (bottom.min(s.bbox.y0), top.max(s.bbox.y1))
        })
}
