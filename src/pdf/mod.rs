//! PDF manipulation module

pub mod export;
pub mod metadata;
pub mod overlay;

// Re-export commonly used items
pub use export::{export_assembly, ExportReport, ExportWarning};
pub use metadata::count_pages;
