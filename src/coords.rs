//! Coordinate transforms between screen space and PDF page space
//!
//! Screen space has its origin at the top-left corner and is scaled by the
//! editor zoom factor. PDF page space has its origin at the bottom-left
//! corner, measured in points (1/72 inch), y increasing upward.

/// Convert a zoom-scaled, top-left-origin screen position to PDF points.
pub fn screen_to_pdf(sx: f32, sy: f32, zoom: f32, page_height_pt: f32) -> (f32, f32) {
    (sx / zoom, page_height_pt - sy / zoom)
}

/// Convert a PDF-point position back to screen space under the same zoom.
///
/// Exact inverse of [`screen_to_pdf`]; used to redisplay committed overlays
/// when an editor session is reopened on a page.
pub fn pdf_to_screen(px: f32, py: f32, zoom: f32, page_height_pt: f32) -> (f32, f32) {
    (px * zoom, (page_height_pt - py) * zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn test_screen_to_pdf_known_values() {
        // One inch in from the left, one inch up from the bottom of a Letter
        // page viewed at 2x zoom.
        let (px, py) = screen_to_pdf(144.0, 1440.0, 2.0, 792.0);
        assert!((px - 72.0).abs() < EPSILON);
        assert!((py - 72.0).abs() < EPSILON);
    }

    #[test]
    fn test_pdf_to_screen_known_values() {
        let (sx, sy) = pdf_to_screen(72.0, 72.0, 2.0, 792.0);
        assert!((sx - 144.0).abs() < EPSILON);
        assert!((sy - 1440.0).abs() < EPSILON);
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            (0.0, 0.0, 1.0, 792.0),
            (50.0, 50.0, 2.0, 792.0),
            (613.5, 100.25, 1.5, 841.89),
            (10.0, 2000.0, 0.5, 792.0), // below the visible page area
        ];

        for (sx, sy, zoom, height) in cases {
            let (px, py) = screen_to_pdf(sx, sy, zoom, height);
            let (rx, ry) = pdf_to_screen(px, py, zoom, height);
            assert!((rx - sx).abs() < EPSILON, "x round trip failed for {:?}", (sx, sy, zoom, height));
            assert!((ry - sy).abs() < EPSILON, "y round trip failed for {:?}", (sx, sy, zoom, height));
        }
    }

    #[test]
    fn test_top_of_page_maps_to_page_height() {
        let (_, py) = screen_to_pdf(0.0, 0.0, 3.0, 792.0);
        assert!((py - 792.0).abs() < EPSILON);
    }
}
