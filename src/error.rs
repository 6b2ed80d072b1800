//! Error types for the layout and rendering pipeline.
//!
//! Primitive-level anomalies (degenerate boxes, unknown primitive kinds) are
//! recovered where they occur and only logged; the corresponding variants exist
//! so callers can surface them in diagnostics. Structural violations abort the
//! page or document being processed.

use crate::layout::region::RegionKind;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while laying out or rendering pages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Primitive with unusable geometry
    #[error("Malformed primitive: {0}")]
    MalformedPrimitive(String),

    /// Primitive kind with no classification rule
    #[error("Unrecognized primitive kind: {0}")]
    UnrecognizedPrimitiveKind(String),

    /// Render requested for a region kind the renderer refuses
    #[error("Unsupported region kind: {0}")]
    UnsupportedRegionKind(RegionKind),

    /// A region reached the final ordering without any text or image
    #[error("Region {index} has neither text nor image to anchor it")]
    NoAnchor {
        /// Position of the offending region before sorting
        index: usize,
    },

    /// Fatal error while processing a specific page
    #[error("Page {page}: {source}")]
    Page {
        /// Page number as supplied by the input
        page: usize,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the page number to a fatal error.
    pub fn on_page(self, page: usize) -> Self {
        match self {
            Error::Page { .. } => self,
            other => Error::Page {
                page,
                source: Box::new(other),
            },
        }
    }
}
