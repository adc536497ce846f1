//! PDF Combine Library
//!
//! A library for assembling a new PDF out of pages taken from existing ones.
//! It provides:
//! - An in-memory assembly of ordered page references (add, remove, reorder)
//! - Per-page text overlays placed in PDF point coordinates
//! - An editor session that works in zoomed screen coordinates and commits
//!   overlays back in page space
//! - Page rasterization for previews (via PDFium)
//! - An export pipeline that composites overlay layers onto the literal
//!   source pages and writes one merged output file
//!
//! # Example
//!
//! ```no_run
//! use pdf_combine::model::Assembly;
//! use pdf_combine::pdf::export_assembly;
//! use std::path::Path;
//!
//! let mut assembly = Assembly::new();
//! assembly.add_pages(Path::new("intro.pdf")).expect("Failed to add source");
//! assembly.add_pages(Path::new("appendix.pdf")).expect("Failed to add source");
//!
//! let report = export_assembly(&assembly, Path::new("combined.pdf"))
//!     .expect("Export failed");
//! println!("Wrote {} pages, {} warnings", report.pages_written, report.warnings.len());
//! ```

pub mod coords;
pub mod editor;
pub mod error;
pub mod model;
pub mod pdf;
pub mod raster;

// Re-export commonly used items
pub use error::{Error, Result};
