//! PDF page rasterization using PDFium
//!
//! Renders single pages to bitmaps for editor previews and thumbnails. Each
//! call re-opens the source document; nothing is cached. The PDFium library
//! is looked up next to the executable first, then on the system path, and a
//! binding failure is reported as an error rather than a panic so headless
//! callers (and tests) can degrade gracefully.

use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;

use crate::error::{Error, Result};

/// A rasterized page plus its native size in PDF points
///
/// The bitmap dimensions are the page size in points scaled by the zoom
/// factor; `width_pt`/`height_pt` are unaffected by zoom so callers can
/// compute coordinate transforms.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub image: DynamicImage,
    pub width_pt: f32,
    pub height_pt: f32,
}

fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Raster(format!("failed to bind PDFium library: {e}")))?;
    Ok(Pdfium::new(bindings))
}

/// Render one page of a source PDF to a bitmap at the given zoom factor.
///
/// Fails with [`Error::SourceUnavailable`] if the file cannot be opened and
/// [`Error::PageIndexOutOfRange`] if `page_index` is not valid for the
/// document.
pub fn render_page(source_path: &Path, page_index: usize, zoom: f32) -> Result<RenderedPage> {
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(Error::Raster(format!("invalid zoom factor {zoom}")));
    }

    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(source_path, None)
        .map_err(|e| Error::SourceUnavailable {
            path: source_path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    if page_index >= page_count {
        return Err(Error::PageIndexOutOfRange {
            path: source_path.to_path_buf(),
            page_index,
            page_count,
        });
    }

    let page = pages
        .get(page_index as u16)
        .map_err(|e| Error::Raster(e.to_string()))?;

    let width_pt = page.width().value;
    let height_pt = page.height().value;

    let config = PdfRenderConfig::new().scale_page_by_factor(zoom);
    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| Error::Raster(e.to_string()))?;

    Ok(RenderedPage {
        image: bitmap.as_image(),
        width_pt,
        height_pt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_zoom_rejected_before_binding() {
        // Zoom validation runs before the library lookup, so these hold even
        // without a PDFium install.
        for zoom in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = render_page(Path::new("any.pdf"), 0, zoom);
            assert!(matches!(result, Err(Error::Raster(_))), "zoom {zoom} accepted");
        }
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        match render_page(Path::new("nonexistent.pdf"), 0, 1.0) {
            Err(Error::SourceUnavailable { .. }) => {}
            // No PDFium library on this machine; nothing to assert.
            Err(Error::Raster(reason)) => {
                eprintln!("Skipping test: PDFium unavailable ({reason})");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
