//! Overlay editor session
//!
//! A per-page scratch workspace. The session holds a full-resolution render
//! of one source page and a working list of overlay drafts positioned in
//! screen coordinates (top-left origin, scaled by the session zoom). On
//! commit, draft positions are converted to PDF points and packaged as
//! [`TextOverlay`] records for the caller to write back onto the page entry.
//!
//! Drafts are plain data; rendering them on screen is the presentation
//! layer's job. A session is single-owner and must not be mutated from two
//! call sites at once.

use std::path::Path;

use crate::coords::{pdf_to_screen, screen_to_pdf};
use crate::error::Result;
use crate::model::{Color, TextOverlay};
use crate::raster::{self, RenderedPage};

/// Default font family for new drafts
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";
/// Default font size in points for new drafts
pub const DEFAULT_FONT_SIZE: f32 = 12.0;
/// Default screen position for drafts added without an explicit position
pub const DEFAULT_SCREEN_POSITION: (f32, f32) = (50.0, 50.0);

const PLACEHOLDER_TEXT: &str = "Double-click to edit";

/// Handle to one overlay draft within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(u64);

/// One in-progress text overlay, positioned in screen coordinates
#[derive(Debug, Clone)]
pub struct OverlayDraft {
    id: DraftId,
    pub text: String,
    pub screen_x: f32,
    pub screen_y: f32,
    pub font_family: String,
    pub font_size: f32,
    pub color: Color,
}

impl OverlayDraft {
    pub fn id(&self) -> DraftId {
        self.id
    }
}

/// Partial update for one draft; `None` fields retain their prior values
#[derive(Debug, Clone, Default)]
pub struct DraftUpdate {
    pub text: Option<String>,
    pub screen_position: Option<(f32, f32)>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<Color>,
}

/// A stateful editing workspace for the overlays of one page
#[derive(Debug)]
pub struct EditorSession {
    zoom: f32,
    page_width_pt: f32,
    page_height_pt: f32,
    rendered: Option<RenderedPage>,
    drafts: Vec<OverlayDraft>,
    next_id: u64,
}

impl EditorSession {
    /// Open a session on one source page, rasterizing it at `zoom` for
    /// display. The page's native size is kept for coordinate transforms.
    pub fn open(source_path: &Path, page_index: usize, zoom: f32) -> Result<Self> {
        let rendered = raster::render_page(source_path, page_index, zoom)?;
        let (page_width_pt, page_height_pt) = (rendered.width_pt, rendered.height_pt);
        Ok(Self {
            zoom,
            page_width_pt,
            page_height_pt,
            rendered: Some(rendered),
            drafts: Vec::new(),
            next_id: 0,
        })
    }

    /// Open a session from an already-known page size, without rasterizing.
    ///
    /// Useful when the caller holds its own rendered view of the page; the
    /// coordinate math only needs the zoom and the page height.
    pub fn with_page_size(zoom: f32, page_width_pt: f32, page_height_pt: f32) -> Self {
        Self {
            zoom,
            page_width_pt,
            page_height_pt,
            rendered: None,
            drafts: Vec::new(),
            next_id: 0,
        }
    }

    /// The rasterized page image, if this session was opened with one
    pub fn page_image(&self) -> Option<&image::DynamicImage> {
        self.rendered.as_ref().map(|r| &r.image)
    }

    /// Native page size in PDF points
    pub fn page_size_pt(&self) -> (f32, f32) {
        (self.page_width_pt, self.page_height_pt)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Pre-populate drafts from previously committed overlays, converting
    /// their PDF-point positions back to this session's screen space.
    pub fn load_overlays(&mut self, overlays: &[TextOverlay]) -> Vec<DraftId> {
        overlays
            .iter()
            .map(|overlay| {
                let (sx, sy) =
                    pdf_to_screen(overlay.x, overlay.y, self.zoom, self.page_height_pt);
                self.push_draft(
                    overlay.text.clone(),
                    (sx, sy),
                    overlay.font_family.clone(),
                    overlay.font_size,
                    overlay.color,
                )
            })
            .collect()
    }

    /// Add a new draft with default styling and placeholder text.
    /// `screen_position` of `None` places it at the default position.
    pub fn add_draft(&mut self, screen_position: Option<(f32, f32)>) -> DraftId {
        self.push_draft(
            PLACEHOLDER_TEXT.to_string(),
            screen_position.unwrap_or(DEFAULT_SCREEN_POSITION),
            DEFAULT_FONT_FAMILY.to_string(),
            DEFAULT_FONT_SIZE,
            Color::BLACK,
        )
    }

    /// Mutate exactly the supplied fields of one draft. Returns `false` if
    /// the draft no longer exists.
    pub fn update_draft(&mut self, id: DraftId, update: DraftUpdate) -> bool {
        let Some(draft) = self.drafts.iter_mut().find(|draft| draft.id == id) else {
            return false;
        };

        if let Some(text) = update.text {
            draft.text = text;
        }
        if let Some((sx, sy)) = update.screen_position {
            draft.screen_x = sx;
            draft.screen_y = sy;
        }
        if let Some(font_family) = update.font_family {
            draft.font_family = font_family;
        }
        if let Some(font_size) = update.font_size {
            draft.font_size = font_size;
        }
        if let Some(color) = update.color {
            draft.color = color;
        }
        true
    }

    /// Remove one draft. Returns `false` if it was already deleted.
    pub fn delete_draft(&mut self, id: DraftId) -> bool {
        let before = self.drafts.len();
        self.drafts.retain(|draft| draft.id != id);
        self.drafts.len() != before
    }

    /// Remaining drafts in creation order
    pub fn drafts(&self) -> &[OverlayDraft] {
        &self.drafts
    }

    /// Finalize the session: convert every remaining draft's screen position
    /// to PDF points and emit the overlays in creation order.
    ///
    /// The caller is responsible for writing the result back onto the
    /// corresponding page entry; the session itself never touches the
    /// assembly.
    pub fn commit(self) -> Vec<TextOverlay> {
        let (zoom, page_height_pt) = (self.zoom, self.page_height_pt);
        self.drafts
            .into_iter()
            .map(|draft| {
                let (x, y) = screen_to_pdf(draft.screen_x, draft.screen_y, zoom, page_height_pt);
                TextOverlay {
                    text: draft.text,
                    x,
                    y,
                    font_family: draft.font_family,
                    font_size: draft.font_size,
                    color: draft.color,
                }
            })
            .collect()
    }

    /// End the session without producing overlays.
    pub fn discard(self) {}

    fn push_draft(
        &mut self,
        text: String,
        (screen_x, screen_y): (f32, f32),
        font_family: String,
        font_size: f32,
        color: Color,
    ) -> DraftId {
        let id = DraftId(self.next_id);
        self.next_id += 1;
        self.drafts.push(OverlayDraft {
            id,
            text,
            screen_x,
            screen_y,
            font_family,
            font_size,
            color,
        });
        id
    }
}
