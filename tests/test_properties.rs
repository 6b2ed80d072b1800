//! Property-based tests for layout invariants
//!
//! Random pages of rule segments and text runs are pushed through the merger,
//! the clusterer and grid reconstruction to check the invariants that hold for
//! every input: nothing is lost or duplicated, ordering is stable, and cells
//! stay inside their grid.

use docpile::config::{ClusterMode, ConversionConfig, Tolerances};
use docpile::geometry::Rect;
use docpile::layout::{
    classify, order_regions, split_regions, MergeOutcome, Orientation, Primitive, Region,
    RuleMerger, RuleSegment, TableGrid, TableRegion, TextRun,
};
use proptest::prelude::*;

// Thin vertical rectangles on a half-unit lattice so that merges happen
prop_compose! {
    fn vertical_rect()(
        x in 0u32..120,
        y0 in 0u32..100,
        len in 1u32..60
    ) -> Rect {
        let x = x as f64 * 0.5;
        Rect::new(x, y0 as f64, x + 0.5, (y0 + len) as f64)
    }
}

prop_compose! {
    fn horizontal_rect()(
        y in 0u32..240,
        x0 in 0u32..60,
        len in 1u32..60
    ) -> Rect {
        let y = y as f64 * 0.5;
        Rect::new(x0 as f64, y, (x0 + len) as f64, y + 0.5)
    }
}

prop_compose! {
    fn text_run()(
        x0 in 0u32..60,
        y0 in 0u32..120,
        height in 4u32..12
    ) -> TextRun {
        let bbox = Rect::new(x0 as f64, y0 as f64, (x0 + 10) as f64, (y0 + height) as f64);
        TextRun::new(bbox, "w", "NeoSansIntel", height as f64)
    }
}

fn cluster_mode() -> impl Strategy<Value = ClusterMode> {
    prop_oneof![Just(ClusterMode::SinglePass), Just(ClusterMode::FixedPoint)]
}

fn page_primitives(
    verticals: &[Rect],
    horizontals: &[Rect],
    texts: &[TextRun],
) -> Vec<Primitive> {
    let mut prims = Vec::new();
    prims.extend(verticals.iter().map(|&bbox| Primitive::Rect { bbox }));
    prims.extend(texts.iter().map(|t| Primitive::TextLineHorizontal {
        bbox: t.bbox,
        text: t.content.clone(),
        font: t.font_id.clone(),
        height: t.height,
    }));
    prims.extend(horizontals.iter().map(|&bbox| Primitive::Rect { bbox }));
    prims
}

/// Sorted distinct identity coordinates of a set of rules.
fn boundaries(segments: &[RuleSegment], descending: bool) -> Vec<f64> {
    let mut coords: Vec<f64> = Vec::new();
    for s in segments {
        if !coords.contains(&s.identity()) {
            coords.push(s.identity());
        }
    }
    coords.sort_by(|a, b| if descending { b.total_cmp(a) } else { a.total_cmp(b) });
    coords
}

/// Whether some rule at exactly `target` covers `[lo, hi]` within `slack`.
fn drawn(segments: &[RuleSegment], target: f64, lo: f64, hi: f64, slack: f64) -> bool {
    segments.iter().any(|s| {
        let (start, end) = s.cross_extent();
        s.identity() == target && start <= lo + slack && hi - slack <= end
    })
}

proptest! {
    #[test]
    fn test_merge_is_idempotent(rects in prop::collection::vec(vertical_rect(), 0..30)) {
        let mut first = RuleMerger::new(Orientation::Vertical, 1.0);
        for bbox in rects {
            first.push(RuleSegment::vertical(bbox));
        }
        let merged = first.into_segments();

        let mut second = RuleMerger::new(Orientation::Vertical, 1.0);
        for segment in merged.iter().copied() {
            prop_assert!(matches!(second.push(segment), MergeOutcome::Accepted(_)));
        }
        prop_assert_eq!(second.into_segments(), merged);
    }

    #[test]
    fn test_partition_is_total(
        verticals in prop::collection::vec(vertical_rect(), 0..12),
        horizontals in prop::collection::vec(horizontal_rect(), 0..12),
        texts in prop::collection::vec(text_run(), 0..20),
        mode in cluster_mode()
    ) {
        let config = ConversionConfig::default().with_cluster_mode(mode);
        let prims = page_primitives(&verticals, &horizontals, &texts);
        let split = split_regions(classify(prims, &config), &config).unwrap();
        let dropped = split.dropped;

        let placed_texts: usize = split.regions.iter().map(|r| r.texts().len()).sum();
        prop_assert_eq!(placed_texts + dropped.unplaced_texts, texts.len());

        let (table_verticals, table_horizontals) = split
            .regions
            .iter()
            .filter_map(|r| match r {
                Region::Table(t) => Some((t.verticals.len(), t.horizontals.len())),
                _ => None,
            })
            .fold((0, 0), |(v, h), (tv, th)| (v + tv, h + th));
        let rules_accounted = table_verticals
            + table_horizontals
            + dropped.merged_rules
            + dropped.anchorless_verticals
            + dropped.unclaimed_horizontals
            + dropped.short_rules
            + dropped.thick_rects;
        prop_assert_eq!(rules_accounted, verticals.len() + horizontals.len());

        // Textless clusters are dropped, never emitted.
        for region in &split.regions {
            if let Region::Table(t) = region {
                prop_assert!(!t.texts.is_empty());
            }
        }
    }

    #[test]
    fn test_ordering_is_stable_and_idempotent(
        verticals in prop::collection::vec(vertical_rect(), 0..10),
        horizontals in prop::collection::vec(horizontal_rect(), 0..10),
        texts in prop::collection::vec(text_run(), 1..20)
    ) {
        let config = ConversionConfig::default();
        let prims = page_primitives(&verticals, &horizontals, &texts);
        let split = split_regions(classify(prims, &config), &config).unwrap();

        let anchors: Vec<f64> = split.regions.iter().filter_map(Region::anchor).collect();
        prop_assert_eq!(anchors.len(), split.regions.len());
        prop_assert!(anchors.windows(2).all(|w| w[0] >= w[1]));

        let reordered = order_regions(split.regions.clone()).unwrap();
        prop_assert_eq!(reordered, split.regions);
    }

    #[test]
    fn test_grid_cells_stay_in_bounds(
        verticals in prop::collection::vec(vertical_rect(), 1..10),
        horizontals in prop::collection::vec(horizontal_rect(), 1..10),
        texts in prop::collection::vec(text_run(), 0..15)
    ) {
        let table = TableRegion {
            verticals: verticals.into_iter().map(RuleSegment::vertical).collect(),
            horizontals: horizontals.into_iter().map(RuleSegment::horizontal).collect(),
            texts,
        };
        let grid = TableGrid::reconstruct(&table, &Tolerances::default());
        prop_assert_eq!(grid.rows.len(), grid.num_rows);

        let mut seen: Vec<*const TextRun> = Vec::new();
        for (r, row) in grid.rows.iter().enumerate() {
            let mut next_free_col = 0;
            for cell in row {
                prop_assert_eq!(cell.row, r);
                prop_assert!(cell.colspan >= 1 && cell.rowspan >= 1);
                prop_assert!(cell.col + cell.colspan <= grid.num_cols);
                prop_assert!(cell.row + cell.rowspan <= grid.num_rows);
                // Cells of one row never overlap.
                prop_assert!(cell.col >= next_free_col);
                next_free_col = cell.col + cell.colspan;

                for text in &cell.texts {
                    let ptr = *text as *const TextRun;
                    prop_assert!(!seen.contains(&ptr));
                    seen.push(ptr);
                }
            }
        }
    }

    #[test]
    fn test_row_spans_account_for_every_column(
        verticals in prop::collection::vec(vertical_rect(), 1..10),
        horizontals in prop::collection::vec(horizontal_rect(), 1..10)
    ) {
        let tolerances = Tolerances::default();
        let table = TableRegion {
            verticals: verticals.into_iter().map(RuleSegment::vertical).collect(),
            horizontals: horizontals.into_iter().map(RuleSegment::horizontal).collect(),
            texts: Vec::new(),
        };
        let grid = TableGrid::reconstruct(&table, &tolerances);
        let xs = boundaries(&table.verticals, false);
        let ys = boundaries(&table.horizontals, true);

        for (r, row) in grid.rows.iter().enumerate() {
            let (top, bottom) = (ys[r], ys[r + 1]);

            // Positions whose left or top border is missing emit no cell.
            let mut starts = Vec::new();
            for c in 0..grid.num_cols {
                let (left, right) = (xs[c], xs[c + 1]);
                if drawn(&table.verticals, left, bottom, top, tolerances.vertical)
                    && drawn(&table.horizontals, top, left, right, tolerances.horizontal)
                {
                    starts.push(c);
                }
            }
            let emitted: Vec<usize> = row.iter().map(|cell| cell.col).collect();
            prop_assert_eq!(&emitted, &starts);

            // Spans plus skipped positions outside any span cover the row once.
            let mut covered = vec![false; grid.num_cols];
            for cell in row {
                for c in cell.col..cell.col + cell.colspan {
                    prop_assert!(!covered[c]);
                    covered[c] = true;
                }
            }
            let spanned: usize = row.iter().map(|cell| cell.colspan).sum();
            let skipped_outside = covered.iter().filter(|&&c| !c).count();
            prop_assert_eq!(spanned + skipped_outside, grid.num_cols);
        }
    }
}
