//! Positioned primitives produced by the upstream page decoder.
//!
//! A page arrives as a depth-first tree of [`Primitive`] nodes. The
//! classifier flattens that tree into [`TextRun`]s, [`RuleSegment`]s and
//! [`ImageMarker`]s, which are the only types the rest of the pipeline sees.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// One page of decoded primitives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Page number as numbered by the decoder
    pub number: usize,
    /// Primitive tree in depth-first order
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

impl Page {
    /// Create a page.
    pub fn new(number: usize, primitives: Vec<Primitive>) -> Self {
        Self { number, primitives }
    }
}

/// A node of the decoded primitive tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    /// Text box container
    TextBox {
        /// Child primitives
        #[serde(default)]
        children: Vec<Primitive>,
    },
    /// Horizontal text box container
    TextBoxHorizontal {
        /// Child primitives
        #[serde(default)]
        children: Vec<Primitive>,
    },
    /// Generic text line container
    TextLine {
        /// Child primitives
        #[serde(default)]
        children: Vec<Primitive>,
    },
    /// Figure (form XObject) container
    Figure {
        /// Child primitives
        #[serde(default)]
        children: Vec<Primitive>,
    },
    /// A measured line of text; becomes a [`TextRun`]
    TextLineHorizontal {
        /// Bounding box
        bbox: Rect,
        /// Raw text, including trailing line feeds
        text: String,
        /// Font name of the first glyph
        #[serde(default)]
        font: String,
        /// Line height
        height: f64,
    },
    /// Filled or stroked rectangle
    Rect {
        /// Bounding box
        bbox: Rect,
    },
    /// Straight line
    Line {
        /// Bounding box
        bbox: Rect,
    },
    /// Bezier curve
    Curve {
        /// Bounding box
        bbox: Rect,
    },
    /// Raster image
    Image {
        /// Bounding box
        bbox: Rect,
    },
    /// Isolated glyph
    Char {
        /// Bounding box
        bbox: Rect,
        /// Glyph text
        #[serde(default)]
        text: String,
    },
    /// Virtual character inserted by the decoder (space, newline)
    Anno {
        /// Annotation text
        #[serde(default)]
        text: String,
    },
    /// Anything the decoder emitted that has no classification rule
    #[serde(other)]
    Unknown,
}

impl Primitive {
    /// Short name of the primitive kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Primitive::TextBox { .. } => "text_box",
            Primitive::TextBoxHorizontal { .. } => "text_box_horizontal",
            Primitive::TextLine { .. } => "text_line",
            Primitive::Figure { .. } => "figure",
            Primitive::TextLineHorizontal { .. } => "text_line_horizontal",
            Primitive::Rect { .. } => "rect",
            Primitive::Line { .. } => "line",
            Primitive::Curve { .. } => "curve",
            Primitive::Image { .. } => "image",
            Primitive::Char { .. } => "char",
            Primitive::Anno { .. } => "anno",
            Primitive::Unknown => "unknown",
        }
    }
}

/// A line of text with its measured box and font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Bounding box
    pub bbox: Rect,
    /// Raw text, may contain line feeds
    pub content: String,
    /// Font name
    pub font_id: String,
    /// Line height
    pub height: f64,
}

impl TextRun {
    /// Create a text run.
    pub fn new(bbox: Rect, content: impl Into<String>, font_id: impl Into<String>, height: f64) -> Self {
        Self {
            bbox,
            content: content.into(),
            font_id: font_id.into(),
            height,
        }
    }

    /// Content with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.content.trim()
    }
}

/// Direction of a rule segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Column separator; identified by `x0`
    Vertical,
    /// Row separator; identified by `y0`
    Horizontal,
}

/// A thin rectangle acting as a table ruling line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSegment {
    /// Bounding box; only its cross-axis extent changes during merging
    pub bbox: Rect,
    /// Direction
    pub orientation: Orientation,
}

impl RuleSegment {
    /// Create a vertical segment.
    pub fn vertical(bbox: Rect) -> Self {
        Self {
            bbox,
            orientation: Orientation::Vertical,
        }
    }

    /// Create a horizontal segment.
    pub fn horizontal(bbox: Rect) -> Self {
        Self {
            bbox,
            orientation: Orientation::Horizontal,
        }
    }

    /// Coordinate that identifies the line: `x0` for verticals, `y0` for horizontals.
    pub fn identity(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.bbox.x0,
            Orientation::Horizontal => self.bbox.y0,
        }
    }

    /// Extent along the line: `[y0, y1]` for verticals, `[x0, x1]` for horizontals.
    pub fn cross_extent(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Vertical => (self.bbox.y0, self.bbox.y1),
            Orientation::Horizontal => (self.bbox.x0, self.bbox.x1),
        }
    }

    /// Length along the line.
    pub fn length(&self) -> f64 {
        let (lo, hi) = self.cross_extent();
        hi - lo
    }
}

/// Position of a raster image on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMarker {
    /// Bounding box
    pub bbox: Rect,
}

impl ImageMarker {
    /// Create an image marker.
    pub fn new(bbox: Rect) -> Self {
        Self { bbox }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_identity_and_extent() {
        let v = RuleSegment::vertical(Rect::new(10.0, 0.0, 10.5, 40.0));
        assert_eq!(v.identity(), 10.0);
        assert_eq!(v.cross_extent(), (0.0, 40.0));
        assert_eq!(v.length(), 40.0);

        let h = RuleSegment::horizontal(Rect::new(0.0, 25.0, 80.0, 25.4));
        assert_eq!(h.identity(), 25.0);
        assert_eq!(h.cross_extent(), (0.0, 80.0));
    }

    #[test]
    fn test_primitive_json() {
        let json = r#"[
            { "kind": "text_box", "children": [
                { "kind": "text_line_horizontal", "bbox": { "x0": 1, "y0": 2, "x1": 3, "y1": 4 },
                  "text": "ADD\n", "font": "Verdana", "height": 2 }
            ] },
            { "kind": "rect", "bbox": { "x0": 0, "y0": 0, "x1": 0.5, "y1": 10 } },
            { "kind": "squiggle" }
        ]"#;
        let prims: Vec<Primitive> = serde_json::from_str(json).unwrap();
        assert_eq!(prims.len(), 3);
        assert_eq!(prims[0].kind_name(), "text_box");
        assert_eq!(prims[1].kind_name(), "rect");
        assert_eq!(prims[2], Primitive::Unknown);
    }

    #[test]
    fn test_text_run_trimmed() {
        let run = TextRun::new(Rect::new(0.0, 0.0, 1.0, 1.0), "  Operation \n", "Font", 1.0);
        assert_eq!(run.trimmed(), "Operation");
    }
}
