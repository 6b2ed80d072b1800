//! Region clustering ("pile splitting").
//!
//! Partitions a classified page into table, paragraph and image regions and
//! orders them top to bottom.
//!
//! Tables are grown from seed verticals: any vertical whose span overlaps the
//! cluster's current span joins it, and the span widens. In the default
//! [`ClusterMode::SinglePass`] mode this is one forward scan, so a vertical
//! that only overlaps after a later extension is left to seed its own
//! cluster. [`ClusterMode::FixedPoint`] rescans until nothing changes.

use crate::config::{ClusterMode, ConversionConfig};
use crate::error::{Error, Result};
use crate::geometry::spans_overlap;
use crate::layout::classifier::{ClassifiedPage, DroppedPrimitives};
use crate::layout::primitives::{RuleSegment, TextRun};
use crate::layout::region::{vertical_extent, ImageRegion, ParagraphRegion, Region, TableRegion};

/// Regions of one page plus the primitives that fit none of them.
#[derive(Debug, Clone, Default)]
pub struct RegionSplit {
    /// Regions in final reading order
    pub regions: Vec<Region>,
    /// Drop accounting, including what the classifier dropped
    pub dropped: DroppedPrimitives,
}

/// Split a classified page into ordered regions.
///
/// Every text run, rule segment and image of `page` ends up in exactly one
/// region or in the drop counts.
pub fn split_regions(page: ClassifiedPage, config: &ConversionConfig) -> Result<RegionSplit> {
    let ClassifiedPage {
        texts,
        verticals,
        horizontals,
        images,
        mut dropped,
    } = page;
    let tolerance = config.tolerances.overlap;

    let mut texts: Vec<Option<TextRun>> = texts.into_iter().map(Some).collect();
    let mut horizontals: Vec<Option<RuleSegment>> = horizontals.into_iter().map(Some).collect();

    let tables = find_tables(
        verticals,
        &mut horizontals,
        &mut texts,
        config.cluster_mode,
        tolerance,
        &mut dropped,
    );
    dropped.unclaimed_horizontals += horizontals.iter().flatten().count();

    let paragraphs = find_paragraphs(&tables, texts, &mut dropped);

    let mut regions: Vec<Region> = tables.into_iter().map(Region::Table).collect();
    regions.extend(paragraphs.into_iter().map(Region::Paragraph));
    regions.extend(
        images
            .into_iter()
            .map(|image| Region::Image(ImageRegion { image })),
    );

    let regions = order_regions(regions)?;
    Ok(RegionSplit { regions, dropped })
}

/// Grow table clusters and claim the horizontals and texts inside them.
fn find_tables(
    verticals: Vec<RuleSegment>,
    horizontals: &mut [Option<RuleSegment>],
    texts: &mut [Option<TextRun>],
    mode: ClusterMode,
    tolerance: f64,
    dropped: &mut DroppedPrimitives,
) -> Vec<TableRegion> {
    let mut visited = vec![false; verticals.len()];
    let mut clusters = Vec::new();

    for seed in 0..verticals.len() {
        if visited[seed] {
            continue;
        }
        let members = grow_cluster(seed, &verticals, &visited, mode, tolerance);
        for &m in &members {
            visited[m] = true;
        }
        clusters.push(members);
    }

    let mut verticals: Vec<Option<RuleSegment>> = verticals.into_iter().map(Some).collect();
    let mut tables = Vec::with_capacity(clusters.len());

    for members in clusters {
        let cluster: Vec<RuleSegment> = members.iter().filter_map(|&m| verticals[m].take()).collect();
        let (bottom, top) = vertical_extent(&cluster);

        let table_texts = claim(texts, |t| {
            spans_overlap(bottom, top, t.bbox.y0, t.bbox.y1, tolerance)
        });
        if table_texts.is_empty() {
            log::debug!(
                "Dropping table cluster of {} verticals spanning [{bottom}, {top}]: no text",
                cluster.len()
            );
            dropped.anchorless_verticals += cluster.len();
            continue;
        }

        let table_horizontals = claim(horizontals, |h| {
            spans_overlap(bottom, top, h.bbox.y0, h.bbox.y1, tolerance)
        });

        log::debug!(
            "Table region [{bottom}, {top}]: {} verticals, {} horizontals, {} texts",
            cluster.len(),
            table_horizontals.len(),
            table_texts.len()
        );
        tables.push(TableRegion {
            verticals: cluster,
            horizontals: table_horizontals,
            texts: table_texts,
        });
    }

    tables
}

/// Indices of the verticals connected to `seed`, seed first.
fn grow_cluster(
    seed: usize,
    verticals: &[RuleSegment],
    visited: &[bool],
    mode: ClusterMode,
    tolerance: f64,
) -> Vec<usize> {
    let mut members = vec![seed];
    let mut in_cluster = vec![false; verticals.len()];
    in_cluster[seed] = true;
    let mut bottom = verticals[seed].bbox.y0;
    let mut top = verticals[seed].bbox.y1;

    loop {
        let mut added = false;
        for (i, v) in verticals.iter().enumerate() {
            if in_cluster[i] || visited[i] {
                continue;
            }
            if spans_overlap(bottom, top, v.bbox.y0, v.bbox.y1, tolerance) {
                members.push(i);
                in_cluster[i] = true;
                bottom = bottom.min(v.bbox.y0);
                top = top.max(v.bbox.y1);
                added = true;
            }
        }
        if mode == ClusterMode::SinglePass || !added {
            break;
        }
    }

    members
}

/// Take every remaining item matching `pred`, preserving order.
fn claim<T>(items: &mut [Option<T>], pred: impl Fn(&T) -> bool) -> Vec<T> {
    let mut claimed = Vec::new();
    for slot in items.iter_mut() {
        if slot.as_ref().is_some_and(&pred) {
            claimed.extend(slot.take());
        }
    }
    claimed
}

/// Bucket unclaimed text into the gaps above, between and below the tables.
fn find_paragraphs(
    tables: &[TableRegion],
    texts: Vec<Option<TextRun>>,
    dropped: &mut DroppedPrimitives,
) -> Vec<ParagraphRegion> {
    let mut tops: Vec<f64> = tables.iter().map(|t| t.extent().1).collect();
    tops.sort_by(|a, b| b.total_cmp(a));
    tops.push(f64::NEG_INFINITY);

    let mut buckets: Vec<Vec<TextRun>> = vec![Vec::new(); tops.len()];
    for text in texts.into_iter().flatten() {
        match tops.iter().position(|&top| text.bbox.y0 > top) {
            Some(idx) => buckets[idx].push(text),
            None => {
                log::debug!("Text run fits no paragraph bucket: {:?}", text.bbox);
                dropped.unplaced_texts += 1;
            },
        }
    }

    buckets
        .into_iter()
        .filter(|texts| !texts.is_empty())
        .map(|texts| ParagraphRegion { texts })
        .collect()
}

/// Stable sort by descending anchor.
///
/// Fails with [`Error::NoAnchor`] if a region has neither text nor image.
pub fn order_regions(regions: Vec<Region>) -> Result<Vec<Region>> {
    let mut keyed = Vec::with_capacity(regions.len());
    for (index, region) in regions.into_iter().enumerate() {
        let anchor = region.anchor().ok_or(Error::NoAnchor { index })?;
        keyed.push((anchor, region));
    }
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    Ok(keyed.into_iter().map(|(_, region)| region).collect())
}
