//! Table grid reconstruction from ruling lines.
//!
//! The distinct x coordinates of a table's verticals and y coordinates of its
//! horizontals define a dense grid. A grid position becomes a cell only when
//! its left and top borders are really drawn; a missing right or bottom border
//! means the cell spans into the next position(s).

use crate::config::Tolerances;
use crate::error::Error;
use crate::layout::primitives::{Orientation, RuleSegment, TextRun};
use crate::layout::region::TableRegion;

/// One reconstructed table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<'a> {
    /// Grid row of the top-left position
    pub row: usize,
    /// Grid column of the top-left position
    pub col: usize,
    /// Text runs inside the cell
    pub texts: Vec<&'a TextRun>,
    /// Number of columns covered (at least 1)
    pub colspan: usize,
    /// Number of rows covered (at least 1)
    pub rowspan: usize,
}

impl Cell<'_> {
    /// Trimmed run contents joined with single spaces.
    pub fn content(&self) -> String {
        self.texts
            .iter()
            .map(|t| t.trimmed())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A reconstructed table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid<'a> {
    /// Number of grid rows
    pub num_rows: usize,
    /// Number of grid columns
    pub num_cols: usize,
    /// Emitted cells, one vector per grid row (possibly empty)
    pub rows: Vec<Vec<Cell<'a>>>,
}

impl<'a> TableGrid<'a> {
    /// Rebuild the grid of a table region.
    pub fn reconstruct(table: &'a TableRegion, tolerances: &Tolerances) -> Self {
        GridBuilder::new(table, tolerances).build()
    }

    /// The first emitted cell in row-major order.
    pub fn first_cell(&self) -> Option<&Cell<'a>> {
        self.rows.iter().flatten().next()
    }

    /// Number of emitted cells.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

struct GridBuilder<'a> {
    table: &'a TableRegion,
    tolerances: Tolerances,
    /// Column boundaries, left to right
    xs: Vec<f64>,
    /// Row boundaries, top to bottom
    ys: Vec<f64>,
}

impl<'a> GridBuilder<'a> {
    fn new(table: &'a TableRegion, tolerances: &Tolerances) -> Self {
        let mut xs = distinct_identities(&table.verticals);
        xs.sort_by(|a, b| a.total_cmp(b));
        let mut ys = distinct_identities(&table.horizontals);
        ys.sort_by(|a, b| b.total_cmp(a));

        Self {
            table,
            tolerances: *tolerances,
            xs,
            ys,
        }
    }

    fn build(self) -> TableGrid<'a> {
        let num_cols = self.xs.len().saturating_sub(1);
        let num_rows = self.ys.len().saturating_sub(1);

        // Each run can land in at most one cell; unusable boxes never do.
        let mut claimed: Vec<bool> = self
            .table
            .texts
            .iter()
            .map(|t| {
                let degenerate = t.bbox.is_degenerate();
                if degenerate {
                    log::debug!(
                        "{}",
                        Error::MalformedPrimitive(format!("{:?} {:?}", t.bbox, t.trimmed()))
                    );
                }
                degenerate
            })
            .collect();

        let mut rows = Vec::with_capacity(num_rows);
        for row in 0..num_rows {
            let mut cells = Vec::new();
            for col in 0..num_cols {
                let left = self.xs[col];
                let top = self.ys[row];
                let bottom = self.ys[row + 1];
                let right = self.xs[col + 1];

                if !self.line_exists(left, bottom, top, Orientation::Vertical)
                    || !self.line_exists(top, left, right, Orientation::Horizontal)
                {
                    continue;
                }

                let (right, colspan) = self.span(col, &self.xs, bottom, top, Orientation::Vertical);
                let (bottom, rowspan) =
                    self.span(row, &self.ys, left, right, Orientation::Horizontal);

                let texts = self.take_texts(&mut claimed, left, top, right, bottom);
                cells.push(Cell {
                    row,
                    col,
                    texts,
                    colspan,
                    rowspan,
                });
            }
            rows.push(cells);
        }

        TableGrid {
            num_rows,
            num_cols,
            rows,
        }
    }

    /// Walk from `start` until a drawn boundary or the grid edge.
    ///
    /// Returns the boundary coordinate and the number of positions covered.
    fn span(
        &self,
        start: usize,
        coords: &[f64],
        lo: f64,
        hi: f64,
        orientation: Orientation,
    ) -> (f64, usize) {
        let mut span = 1;
        loop {
            let coord = coords[start + span];
            let at_edge = start + span + 1 >= coords.len();
            if at_edge || self.line_exists(coord, lo, hi, orientation) {
                return (coord, span);
            }
            span += 1;
        }
    }

    /// Whether a segment at exactly `target` covers `[lo, hi]` along its length.
    fn line_exists(&self, target: f64, lo: f64, hi: f64, orientation: Orientation) -> bool {
        let (segments, slack) = match orientation {
            Orientation::Vertical => (&self.table.verticals, self.tolerances.vertical),
            Orientation::Horizontal => (&self.table.horizontals, self.tolerances.horizontal),
        };
        segments.iter().any(|s| {
            let (start, end) = s.cross_extent();
            s.identity() == target && start <= lo + slack && hi - slack <= end
        })
    }

    /// Claim unclaimed runs inside the cell box.
    ///
    /// Only the top edge gets the wide horizontal slack; the bottom edge uses
    /// the tight one so runs of the next row stay out.
    fn take_texts(
        &self,
        claimed: &mut [bool],
        left: f64,
        top: f64,
        right: f64,
        bottom: f64,
    ) -> Vec<&'a TextRun> {
        let table: &'a TableRegion = self.table;
        let mut texts = Vec::new();
        for (i, text) in table.texts.iter().enumerate() {
            if claimed[i] {
                continue;
            }
            let b = &text.bbox;
            let inside = left - self.tolerances.vertical <= b.x0
                && b.x0 <= right
                && b.y1 <= top + self.tolerances.horizontal
                && bottom - self.tolerances.vertical <= b.y0;
            if inside {
                claimed[i] = true;
                texts.push(text);
            }
        }
        texts
    }
}

fn distinct_identities(segments: &[RuleSegment]) -> Vec<f64> {
    let mut coords: Vec<f64> = Vec::with_capacity(segments.len());
    for s in segments {
        let id = s.identity();
        if !coords.contains(&id) {
            coords.push(id);
        }
    }
    coords
}
