//! Layout analysis: from decoded primitives to ordered regions.
//!
//! - Primitive classification and rule-line merging
//! - Region clustering (tables, paragraphs, images)
//! - Table grid reconstruction from ruling lines

pub mod classifier;
pub mod clusterer;
pub mod primitives;
pub mod region;
pub mod rule_merger;
pub mod table_grid;

// Re-export main types
pub use classifier::{classify, ClassifiedPage, DroppedPrimitives};
pub use clusterer::{order_regions, split_regions, RegionSplit};
pub use primitives::{ImageMarker, Orientation, Page, Primitive, RuleSegment, TextRun};
pub use region::{ImageRegion, ParagraphRegion, Region, RegionKind, TableRegion};
pub use rule_merger::{MergeOutcome, RuleMerger};
pub use table_grid::{Cell, TableGrid};
