//! Source document introspection

use std::path::Path;

use lopdf::{Document, Object};

use crate::error::{Error, Result};

/// Load a source PDF, mapping every open/parse failure to
/// [`Error::SourceUnavailable`] so callers can treat the page as skippable.
pub(crate) fn load_source(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::SourceUnavailable {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    Document::load(path).map_err(|e| Error::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Count pages by reading the Count field from the catalog's Pages
/// dictionary. More reliable than `get_pages()` for nested page trees.
fn count_pages_from_catalog(doc: &Document) -> Option<usize> {
    let Ok(Object::Reference(catalog_id)) = doc.trailer.get(b"Root") else {
        return None;
    };
    let Ok(Object::Dictionary(catalog)) = doc.get_object(*catalog_id) else {
        return None;
    };
    let Ok(Object::Reference(pages_id)) = catalog.get(b"Pages") else {
        return None;
    };
    let Ok(Object::Dictionary(pages)) = doc.get_object(*pages_id) else {
        return None;
    };
    match pages.get(b"Count") {
        Ok(Object::Integer(n)) if *n >= 0 => Some(*n as usize),
        _ => None,
    }
}

/// Count the number of pages in a PDF file.
///
/// A document with zero pages is reported as unavailable; there is nothing
/// the assembly could reference in it.
pub fn count_pages(path: &Path) -> Result<usize> {
    let doc = load_source(path)?;

    let page_count =
        count_pages_from_catalog(&doc).unwrap_or_else(|| doc.get_pages().len());

    if page_count == 0 {
        return Err(Error::SourceUnavailable {
            path: path.to_path_buf(),
            reason: "PDF has no pages".to_string(),
        });
    }

    Ok(page_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(matches!(result, Err(Error::SourceUnavailable { .. })));
    }

    #[test]
    fn test_load_source_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-pdf.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let result = load_source(&path);
        assert!(matches!(result, Err(Error::SourceUnavailable { .. })));
    }
}
