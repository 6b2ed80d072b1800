//! End-to-end conversion pipeline.
//!
//! ```text
//! Page (primitive tree)
//!     ↓
//! [classify] (text runs, merged rules, images)
//!     ↓
//! [split_regions] (tables, paragraphs, images; ordered by anchor)
//!     ↓
//! Region[] (all pages, in page order)
//!     ↓
//! [DocumentSegmenter] (per-instruction Markdown)
//!     ↓
//! RenderedDocument[]
//! ```
//!
//! Pages are independent: a page that fails layout is logged, recorded in
//! [`LayoutOutput::failed_pages`] and left out, and the remaining pages go on.

use crate::config::ConversionConfig;
use crate::converters::writer::{DocumentSegmenter, Provenance, RenderedDocument};
use crate::error::{Error, Result};
use crate::layout::classifier::{classify, DroppedPrimitives};
use crate::layout::clusterer::split_regions;
use crate::layout::primitives::Page;
use crate::layout::region::Region;

/// Ordered regions of one page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Page number as supplied by the input
    pub page_number: usize,
    /// Regions in reading order
    pub regions: Vec<Region>,
    /// Primitives that ended up in no region
    pub dropped: DroppedPrimitives,
}

/// A page that could not be laid out.
#[derive(Debug)]
pub struct PageFailure {
    /// Page number as supplied by the input
    pub page: usize,
    /// What went wrong (wrapped in [`Error::Page`])
    pub error: Error,
}

/// Layout results for a batch of pages.
#[derive(Debug, Default)]
pub struct LayoutOutput {
    /// Successful pages, in input order
    pub pages: Vec<PageLayout>,
    /// Pages that failed
    pub failed_pages: Vec<PageFailure>,
}

impl LayoutOutput {
    /// All regions of the successful pages, in page order.
    pub fn into_regions(self) -> Vec<Region> {
        self.pages.into_iter().flat_map(|p| p.regions).collect()
    }

    /// Total primitives dropped across the successful pages.
    pub fn dropped_total(&self) -> usize {
        self.pages.iter().map(|p| p.dropped.total()).sum()
    }
}

/// Lay out a single page.
///
/// Errors are tagged with the page number.
pub fn layout_page(page: Page, config: &ConversionConfig) -> Result<PageLayout> {
    let page_number = page.number;
    let classified = classify(page.primitives, config);
    let split = split_regions(classified, config).map_err(|e| e.on_page(page_number))?;

    log::debug!(
        "Page {}: {} regions, {} primitives dropped",
        page_number,
        split.regions.len(),
        split.dropped.total()
    );

    Ok(PageLayout {
        page_number,
        regions: split.regions,
        dropped: split.dropped,
    })
}

/// Lay out every page, continuing past failures.
pub fn layout_pages(pages: Vec<Page>, config: &ConversionConfig) -> LayoutOutput {
    let mut output = LayoutOutput::default();
    for page in pages {
        let number = page.number;
        match layout_page(page, config) {
            Ok(layout) => output.pages.push(layout),
            Err(error) => {
                log::error!("Skipping page {}: {}", number, error);
                output.failed_pages.push(PageFailure {
                    page: number,
                    error,
                });
            },
        }
    }
    output
}

/// Result of a full conversion.
#[derive(Debug)]
pub struct Conversion {
    /// One document per instruction key
    pub documents: Vec<RenderedDocument>,
    /// Pages left out because layout failed
    pub failed_pages: Vec<PageFailure>,
    /// Primitives dropped across all converted pages
    pub dropped_total: usize,
}

/// Pages in, Markdown documents out.
///
/// # Examples
///
/// ```
/// use docpile::pipeline::DocPipeline;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = DocPipeline::new();
/// let conversion = pipeline.convert(Vec::new())?;
/// assert!(conversion.documents.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DocPipeline {
    config: ConversionConfig,
    provenance: Option<Provenance>,
}

impl DocPipeline {
    /// Pipeline with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ConversionConfig::default())
    }

    /// Pipeline with a custom configuration.
    pub fn with_config(config: ConversionConfig) -> Self {
        Self {
            config,
            provenance: None,
        }
    }

    /// Fix the footer attribution instead of dating documents today.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Lay out `pages`; see [`layout_pages`].
    pub fn layout(&self, pages: Vec<Page>) -> LayoutOutput {
        layout_pages(pages, &self.config)
    }

    /// Convert pages into documents.
    ///
    /// Failing pages are skipped; render errors are fatal.
    pub fn convert(&self, pages: Vec<Page>) -> Result<Conversion> {
        let mut layout = self.layout(pages);
        let failed_pages = std::mem::take(&mut layout.failed_pages);
        let dropped_total = layout.dropped_total();
        let regions = layout.into_regions();

        let mut segmenter = DocumentSegmenter::new(&self.config)?;
        if let Some(provenance) = &self.provenance {
            segmenter = segmenter.with_provenance(provenance.clone());
        }
        let documents = segmenter.segment(&regions)?;

        log::info!(
            "Converted {} regions into {} documents ({} pages failed)",
            regions.len(),
            documents.len(),
            failed_pages.len()
        );

        Ok(Conversion {
            documents,
            failed_pages,
            dropped_total,
        })
    }
}

impl Default for DocPipeline {
    fn default() -> Self {
        Self::new()
    }
}
