//! Error types for the PDF combine library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF combine library
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced source PDF cannot be opened (missing, unreadable, corrupt)
    #[error("Source PDF unavailable: {}: {reason}", .path.display())]
    SourceUnavailable { path: PathBuf, reason: String },

    /// A page index is not valid for its source document
    #[error("Page index {page_index} out of range for {} ({page_count} pages)", .path.display())]
    PageIndexOutOfRange {
        path: PathBuf,
        page_index: usize,
        page_count: usize,
    },

    /// A single text overlay could not be rendered
    #[error("Overlay render failure: {0}")]
    OverlayRender(String),

    /// The final serialize-to-disk step failed
    #[error("Failed to write output {}: {reason}", .path.display())]
    OutputWrite { path: PathBuf, reason: String },

    /// No page in the assembly could be added to the output
    #[error("No pages could be exported")]
    NothingExported,

    /// Rasterizer error (library binding, bad zoom, render failure)
    #[error("Raster error: {0}")]
    Raster(String),

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}
