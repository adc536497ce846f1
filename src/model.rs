//! In-memory document model: the assembly of page references and overlays
//!
//! The assembly holds an ordered sequence of page entries, each referencing a
//! page inside a source PDF on disk plus the text overlays to composite onto
//! it at export time. No page content is cached here; the source files must
//! remain readable until export.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pdf::metadata;

/// An RGB color with each channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// One piece of positioned, styled text composited onto a page at export time
///
/// `x`/`y` are in PDF points with the origin at the page's bottom-left corner.
/// Positions outside the page bounds are legal and simply render off the
/// visible area. Empty text is legal and produces no visible glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_family: String,
    pub font_size: f32,
    pub color: Color,
}

/// Opaque identifier for a page entry, stable across reorders and removals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// One reference to a source document page within the assembled output
#[derive(Debug, Clone)]
pub struct PageEntry {
    id: EntryId,
    source_path: PathBuf,
    page_index: usize,
    overlays: Vec<TextOverlay>,
}

impl PageEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Zero-based page index within the source document
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Overlays in z-order (later entries drawn on top)
    pub fn overlays(&self) -> &[TextOverlay] {
        &self.overlays
    }

    pub fn has_overlays(&self) -> bool {
        !self.overlays.is_empty()
    }
}

/// Lightweight entry description for the presentation layer
#[derive(Debug, Clone)]
pub struct PageSummary {
    pub id: EntryId,
    /// File name of the source document (falls back to the full path)
    pub source_name: String,
    /// One-based page number for display
    pub page_number: usize,
    pub has_overlays: bool,
}

/// The full ordered sequence of page entries under construction
///
/// Order is significant and defines the output page order. The same source
/// page may appear any number of times. All operations are synchronous and
/// in-memory; only `add_pages` touches the filesystem (to count pages).
#[derive(Debug, Default)]
pub struct Assembly {
    entries: Vec<PageEntry>,
    next_id: u64,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry per page of `source_path`, in natural page order,
    /// each with no overlays. Returns the ids of the new entries.
    ///
    /// Fails with [`crate::Error::SourceUnavailable`] if the file cannot be
    /// read or has no pages; in that case the assembly is left unchanged.
    pub fn add_pages(&mut self, source_path: &Path) -> Result<Vec<EntryId>> {
        let page_count = metadata::count_pages(source_path)?;

        let mut ids = Vec::with_capacity(page_count);
        for page_index in 0..page_count {
            let id = EntryId(self.next_id);
            self.next_id += 1;
            self.entries.push(PageEntry {
                id,
                source_path: source_path.to_path_buf(),
                page_index,
                overlays: Vec::new(),
            });
            ids.push(id);
        }

        Ok(ids)
    }

    /// Remove the given entries, preserving the order of the rest.
    /// Ids that are already absent are ignored.
    pub fn remove(&mut self, ids: &[EntryId]) {
        self.entries.retain(|entry| !ids.contains(&entry.id));
    }

    /// Shift one entry's position by `delta` slots, clamped to the valid
    /// range. Returns `true` if the order changed.
    pub fn move_entry(&mut self, id: EntryId, delta: isize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };

        let last = self.entries.len() as isize - 1;
        let to = (from as isize + delta).clamp(0, last) as usize;
        if to == from {
            return false;
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    /// Replace an entry's overlay sequence wholesale (the editor session
    /// commit flow). An empty sequence clears any prior overlays.
    /// Returns `false` if the id is not present.
    pub fn set_overlays(&mut self, id: EntryId, overlays: Vec<TextOverlay>) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries[index].overlays = overlays;
                true
            }
            None => false,
        }
    }

    pub fn entry(&self, id: EntryId) -> Option<&PageEntry> {
        self.position(id).map(|index| &self.entries[index])
    }

    /// Entries in output order
    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry descriptions for display, in output order
    pub fn summaries(&self) -> Vec<PageSummary> {
        self.entries
            .iter()
            .map(|entry| PageSummary {
                id: entry.id,
                source_name: entry
                    .source_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| entry.source_path.display().to_string()),
                page_number: entry.page_index + 1,
                has_overlays: entry.has_overlays(),
            })
            .collect()
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembly_with_entries(count: usize) -> (Assembly, Vec<EntryId>) {
        // Build entries directly so model tests need no files on disk.
        let mut assembly = Assembly::new();
        let mut ids = Vec::new();
        for page_index in 0..count {
            let id = EntryId(assembly.next_id);
            assembly.next_id += 1;
            assembly.entries.push(PageEntry {
                id,
                source_path: PathBuf::from("test.pdf"),
                page_index,
                overlays: Vec::new(),
            });
            ids.push(id);
        }
        (assembly, ids)
    }

    fn order(assembly: &Assembly) -> Vec<EntryId> {
        assembly.entries().iter().map(|e| e.id()).collect()
    }

    fn sample_overlay() -> TextOverlay {
        TextOverlay {
            text: "Hi".to_string(),
            x: 72.0,
            y: 72.0,
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            color: Color::BLACK,
        }
    }

    #[test]
    fn test_move_changes_order_not_set() {
        let (mut assembly, ids) = assembly_with_entries(3);

        assert!(assembly.move_entry(ids[0], 2));

        assert_eq!(order(&assembly), vec![ids[1], ids[2], ids[0]]);
        assert_eq!(assembly.len(), 3);
    }

    #[test]
    fn test_move_down_then_up_restores_order() {
        let (mut assembly, ids) = assembly_with_entries(4);
        let original = order(&assembly);

        assert!(assembly.move_entry(ids[1], 1));
        assert!(assembly.move_entry(ids[1], -1));

        assert_eq!(order(&assembly), original);
    }

    #[test]
    fn test_move_clamps_at_boundaries() {
        let (mut assembly, ids) = assembly_with_entries(3);

        // Already at the top; a negative delta is a no-op.
        assert!(!assembly.move_entry(ids[0], -1));
        // A large delta clamps to the last slot.
        assert!(assembly.move_entry(ids[0], 100));
        assert_eq!(order(&assembly), vec![ids[1], ids[2], ids[0]]);
        // And the entry is now pinned at the bottom.
        assert!(!assembly.move_entry(ids[0], 1));
    }

    #[test]
    fn test_move_unknown_id_is_noop() {
        let (mut assembly, _) = assembly_with_entries(2);
        let original = order(&assembly);

        assert!(!assembly.move_entry(EntryId(999), 1));
        assert_eq!(order(&assembly), original);
    }

    #[test]
    fn test_remove_is_idempotent_and_preserves_order() {
        let (mut assembly, ids) = assembly_with_entries(4);

        assembly.remove(&[ids[1], ids[3]]);
        assert_eq!(order(&assembly), vec![ids[0], ids[2]]);

        // Removing the same ids again changes nothing.
        assembly.remove(&[ids[1], ids[3]]);
        assert_eq!(order(&assembly), vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_set_overlays_replaces_wholesale() {
        let (mut assembly, ids) = assembly_with_entries(1);

        assert!(assembly.set_overlays(ids[0], vec![sample_overlay(), sample_overlay()]));
        assert_eq!(assembly.entry(ids[0]).unwrap().overlays().len(), 2);

        // An empty sequence clears prior overlays.
        assert!(assembly.set_overlays(ids[0], Vec::new()));
        assert!(!assembly.entry(ids[0]).unwrap().has_overlays());
    }

    #[test]
    fn test_set_overlays_unknown_id() {
        let (mut assembly, _) = assembly_with_entries(1);
        assert!(!assembly.set_overlays(EntryId(42), vec![sample_overlay()]));
    }

    #[test]
    fn test_summaries() {
        let (mut assembly, ids) = assembly_with_entries(2);
        assembly.set_overlays(ids[1], vec![sample_overlay()]);

        let summaries = assembly.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].source_name, "test.pdf");
        assert_eq!(summaries[0].page_number, 1);
        assert!(!summaries[0].has_overlays);
        assert_eq!(summaries[1].page_number, 2);
        assert!(summaries[1].has_overlays);
    }

    #[test]
    fn test_add_pages_unreadable_source() {
        let mut assembly = Assembly::new();
        let result = assembly.add_pages(Path::new("does-not-exist.pdf"));
        assert!(matches!(
            result,
            Err(crate::Error::SourceUnavailable { .. })
        ));
        assert!(assembly.is_empty());
    }
}
