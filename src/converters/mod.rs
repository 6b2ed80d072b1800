//! Markdown output for ordered regions.
//!
//! - **Sections**: the heading lexicon and the states it drives
//! - **Renderer**: per-region Markdown (paragraph state machine, HTML tables)
//! - **Writer**: per-instruction documents, repairs, footer, files
//!
//! # Examples
//!
//! ```
//! use docpile::config::ConversionConfig;
//! use docpile::converters::DocumentSegmenter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConversionConfig::default();
//! let segmenter = DocumentSegmenter::new(&config)?;
//! let documents = segmenter.segment(&[])?;
//! assert!(documents.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod renderer;
pub mod section;
pub mod writer;

pub use renderer::{InstructionTitle, RenderState, SectionRenderer, TableAdjacency};
pub use section::SectionKind;
pub use writer::{
    file_name, table_continuation, DocumentSegmenter, DocumentWriter, Provenance, RegionSummary,
    RenderedDocument,
};
