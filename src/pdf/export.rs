//! Export pipeline: walk the assembly, composite overlays, write one PDF
//!
//! Each entry's source document is loaded fresh, its objects renumbered past
//! the output document's running maximum id, and the literal page object is
//! carried over. Entries whose source fails to resolve are skipped with a
//! warning; the export only fails outright when nothing at all could be
//! written or the final save fails.

use std::fmt;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{Assembly, PageEntry};
use crate::pdf::{metadata, overlay};

/// US Letter, used when a page carries no resolvable media box
const FALLBACK_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Outcome of a completed export
#[derive(Debug)]
pub struct ExportReport {
    /// Number of pages written to the output document
    pub pages_written: usize,
    /// Per-page and per-overlay problems that did not abort the export
    pub warnings: Vec<ExportWarning>,
}

/// A recoverable problem encountered while exporting
#[derive(Debug)]
pub enum ExportWarning {
    /// An entry's page could not be loaded and was left out of the output
    PageSkipped {
        source: PathBuf,
        page_index: usize,
        reason: Error,
    },
    /// A single overlay could not be drawn; the rest of the page was kept
    OverlaySkipped {
        source: PathBuf,
        page_index: usize,
        text: String,
        reason: Error,
    },
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportWarning::PageSkipped {
                source,
                page_index,
                reason,
            } => write!(
                f,
                "skipped page {} of {}: {}",
                page_index + 1,
                source.display(),
                reason
            ),
            ExportWarning::OverlaySkipped {
                source,
                page_index,
                text,
                reason,
            } => write!(
                f,
                "skipped overlay {:?} on page {} of {}: {}",
                text,
                page_index + 1,
                source.display(),
                reason
            ),
        }
    }
}

/// Export the assembly as a single merged PDF at `output_path`.
///
/// Pages appear in assembly order. Entries whose source cannot be resolved
/// are skipped and reported in the returned warning list. Fails with
/// [`Error::NothingExported`] when no page could be added (including the
/// empty-assembly case) and [`Error::OutputWrite`] when the final save
/// fails; a successful return means the file was written, warnings or not.
pub fn export_assembly(assembly: &Assembly, output_path: &Path) -> Result<ExportReport> {
    let mut out = Document::with_version("1.5");
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut warnings: Vec<ExportWarning> = Vec::new();

    for entry in assembly.entries() {
        match append_entry(&mut out, entry, &mut warnings) {
            Ok(page_id) => page_ids.push(page_id),
            Err(reason) => {
                log::warn!(
                    "skipping page {} of {}: {}",
                    entry.page_index() + 1,
                    entry.source_path().display(),
                    reason
                );
                warnings.push(ExportWarning::PageSkipped {
                    source: entry.source_path().to_path_buf(),
                    page_index: entry.page_index(),
                    reason,
                });
            }
        }
    }

    if page_ids.is_empty() {
        return Err(Error::NothingExported);
    }

    // Fresh Pages and Catalog objects referencing the collected pages, with
    // ids above everything copied in from the sources.
    let pages_id = out.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(page_ids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));

    let catalog_id = out.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    out.objects.insert(pages_id, Object::Dictionary(pages_dict));
    out.objects.insert(catalog_id, Object::Dictionary(catalog));
    out.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(page_dict)) = out.get_object_mut(page_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    out.compress();
    out.save(output_path).map_err(|e| Error::OutputWrite {
        path: output_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(ExportReport {
        pages_written: page_ids.len(),
        warnings,
    })
}

/// Copy one entry's page into the output document, compositing its overlay
/// layer if it has one. Returns the page's object id in the output.
fn append_entry(
    out: &mut Document,
    entry: &PageEntry,
    warnings: &mut Vec<ExportWarning>,
) -> Result<ObjectId> {
    let mut source = metadata::load_source(entry.source_path())?;

    let page_count = source.get_pages().len();
    if entry.page_index() >= page_count {
        return Err(Error::PageIndexOutOfRange {
            path: entry.source_path().to_path_buf(),
            page_index: entry.page_index(),
            page_count,
        });
    }

    // Shift every object id in the source past the output's current maximum
    // so the two object sets cannot collide.
    source.renumber_objects_with(out.max_id + 1);

    let page_number = entry.page_index() as u32 + 1;
    let page_id = source
        .get_pages()
        .get(&page_number)
        .copied()
        .ok_or_else(|| Error::PageIndexOutOfRange {
            path: entry.source_path().to_path_buf(),
            page_index: entry.page_index(),
            page_count,
        })?;

    out.max_id = source.max_id;
    out.objects.extend(source.objects);

    if entry.has_overlays() {
        let (width_pt, height_pt) = page_media_box(out, page_id);
        let (layer, skipped) =
            overlay::build_overlay_layer(out, entry.overlays(), width_pt, height_pt);

        for skip in skipped {
            log::warn!(
                "skipping overlay {:?} on page {} of {}: {}",
                skip.text,
                entry.page_index() + 1,
                entry.source_path().display(),
                skip.reason
            );
            warnings.push(ExportWarning::OverlaySkipped {
                source: entry.source_path().to_path_buf(),
                page_index: entry.page_index(),
                text: skip.text,
                reason: skip.reason,
            });
        }

        if let Some(layer_id) = layer {
            overlay::composite_onto_page(out, page_id, layer_id)?;
        }
    }

    Ok(page_id)
}

/// Read a page's media box width/height in points, following Parent
/// inheritance. Falls back to US Letter when nothing resolves.
fn page_media_box(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let mut current = Some(page_id);
    let mut hops = 0;

    while let Some(id) = current {
        // Guard against malformed Parent cycles.
        hops += 1;
        if hops > 64 {
            break;
        }

        let Ok(Object::Dictionary(dict)) = doc.get_object(id) else {
            break;
        };

        if let Ok(media_box) = dict.get(b"MediaBox") {
            let media_box = match media_box {
                Object::Reference(ref_id) => doc.get_object(*ref_id).unwrap_or(media_box),
                other => other,
            };
            if let Object::Array(values) = media_box {
                let nums: Vec<f32> = values
                    .iter()
                    .filter_map(|value| match value {
                        Object::Integer(n) => Some(*n as f32),
                        Object::Real(n) => Some(*n),
                        _ => None,
                    })
                    .collect();
                if nums.len() == 4 {
                    return (nums[2] - nums[0], nums[3] - nums[1]);
                }
            }
        }

        current = match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => Some(*parent_id),
            _ => None,
        };
    }

    FALLBACK_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_box_fallback_on_unknown_object() {
        let doc = Document::with_version("1.5");
        assert_eq!(page_media_box(&doc, (1, 0)), FALLBACK_PAGE_SIZE);
    }

    #[test]
    fn test_media_box_inherited_from_parent() {
        let mut doc = Document::with_version("1.5");
        let mut pages = Dictionary::new();
        pages.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ]),
        );
        let pages_id = doc.add_object(Object::Dictionary(pages));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        let page_id = doc.add_object(Object::Dictionary(page));

        assert_eq!(page_media_box(&doc, page_id), (595.0, 842.0));
    }

    #[test]
    fn test_export_warning_display() {
        let warning = ExportWarning::PageSkipped {
            source: PathBuf::from("gone.pdf"),
            page_index: 2,
            reason: Error::SourceUnavailable {
                path: PathBuf::from("gone.pdf"),
                reason: "file not found".to_string(),
            },
        };
        let message = warning.to_string();
        assert!(message.contains("page 3"));
        assert!(message.contains("gone.pdf"));
    }
}
