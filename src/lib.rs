// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::needless_range_loop)]

//! # docpile
//!
//! Layout-driven conversion of instruction-set reference pages to Markdown.
//!
//! Input is the primitive tree of each page as emitted by a PDF layout decoder
//! (text lines, thin rectangles standing in for ruling lines, images), in JSON.
//! The crate groups primitives into regions ("piles"), rebuilds table grids
//! with their spans, renders regions through a heading-driven section state
//! machine and splits the result into one Markdown document per instruction.
//!
//! ## Stages
//!
//! - **Classification**: primitive tree → text runs, merged rule segments, images
//! - **Clustering**: spatially connected verticals form tables; the remaining
//!   text is bucketed into paragraphs between them
//! - **Table grids**: row/column boundaries from rule coordinates, with
//!   colspan/rowspan from missing interior lines
//! - **Rendering**: per-section formatting (prose, pseudo-code, intrinsics,
//!   exception lists) and HTML tables
//! - **Segmentation**: one document per instruction key, opcode tables joined
//!   across page breaks
//!
//! ## Quick Start
//!
//! ```no_run
//! use docpile::config::ConversionConfig;
//! use docpile::converters::DocumentWriter;
//! use docpile::layout::Page;
//! use docpile::pipeline::DocPipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("pages.json")?;
//! let pages: Vec<Page> = serde_json::from_str(&json)?;
//!
//! let pipeline = DocPipeline::with_config(ConversionConfig::default());
//! let conversion = pipeline.convert(pages)?;
//!
//! let writer = DocumentWriter::new("out");
//! writer.write_all(&conversion.documents, pipeline.config())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Layout analysis
pub mod geometry;
pub mod layout;

// Markdown output
pub mod converters;

// End-to-end pipeline
pub mod pipeline;

// Re-exports
pub use config::ConversionConfig;
pub use converters::{DocumentSegmenter, DocumentWriter, RenderedDocument};
pub use error::{Error, Result};
pub use layout::{Page, Primitive, Region};
pub use pipeline::{layout_page, layout_pages, DocPipeline};
