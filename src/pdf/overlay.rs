//! Text overlay layer generation and compositing
//!
//! Overlays for a page are rendered into a single Form XObject sized to the
//! page's media box, with its own font resources, then invoked from a small
//! content stream appended after the page's existing content. Appending
//! draws the layer on top; wrapping the invocation in q/Q keeps the page's
//! trailing graphics state from leaking into the overlay and vice versa.
//!
//! Overlay text is set in the standard 14 PDF base fonts, so nothing is
//! embedded. Text is encoded as WinAnsi (the fonts are declared with
//! /Encoding /WinAnsiEncoding), which covers Latin-1 plus the CP1252
//! punctuation range. A font family that does not resolve to a base font,
//! or a character with no WinAnsi code point, is a per-overlay render
//! failure, not a page failure.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::{Color, TextOverlay};

/// Resource name under which the overlay layer is registered on a page
const OVERLAY_XOBJECT_NAME: &str = "TxOverlay";

/// An overlay that could not be rendered, with the reason it was skipped
#[derive(Debug)]
pub(crate) struct SkippedOverlay {
    pub text: String,
    pub reason: Error,
}

/// Resolve a user-facing font family name to a standard-14 base font.
///
/// Matching is case-insensitive and ignores spaces and hyphens, so
/// "Times New Roman", "times-roman" and "TimesRoman" all resolve.
pub fn resolve_base_font(family: &str) -> Option<&'static str> {
    let key: String = family
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    match key.as_str() {
        "helvetica" | "arial" | "sansserif" => Some("Helvetica"),
        "helveticabold" | "arialbold" => Some("Helvetica-Bold"),
        "helveticaoblique" | "helveticaitalic" | "arialitalic" => Some("Helvetica-Oblique"),
        "times" | "timesroman" | "timesnewroman" | "serif" => Some("Times-Roman"),
        "timesbold" | "timesromanbold" | "timesnewromanbold" => Some("Times-Bold"),
        "timesitalic" | "timesromanitalic" | "timesnewromanitalic" => Some("Times-Italic"),
        "courier" | "couriernew" | "monospace" => Some("Courier"),
        "courierbold" | "couriernewbold" => Some("Courier-Bold"),
        "courieroblique" | "courieritalic" => Some("Courier-Oblique"),
        "symbol" => Some("Symbol"),
        "zapfdingbats" => Some("ZapfDingbats"),
        _ => None,
    }
}

/// Font resource name used inside the overlay layer for a base font
fn font_resource_name(base_font: &str) -> String {
    let stem: String = base_font
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("Tx{stem}")
}

/// Map one character to its WinAnsi (CP1252) byte, if it has one
fn win_ansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        code @ (0x09 | 0x0a | 0x0d | 0x20..=0x7e | 0xa0..=0xff) => Some(code as u8),
        _ => match c {
            '\u{20ac}' => Some(0x80),
            '\u{201a}' => Some(0x82),
            '\u{0192}' => Some(0x83),
            '\u{201e}' => Some(0x84),
            '\u{2026}' => Some(0x85),
            '\u{2020}' => Some(0x86),
            '\u{2021}' => Some(0x87),
            '\u{02c6}' => Some(0x88),
            '\u{2030}' => Some(0x89),
            '\u{0160}' => Some(0x8a),
            '\u{2039}' => Some(0x8b),
            '\u{0152}' => Some(0x8c),
            '\u{017d}' => Some(0x8e),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201c}' => Some(0x93),
            '\u{201d}' => Some(0x94),
            '\u{2022}' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            '\u{02dc}' => Some(0x98),
            '\u{2122}' => Some(0x99),
            '\u{0161}' => Some(0x9a),
            '\u{203a}' => Some(0x9b),
            '\u{0153}' => Some(0x9c),
            '\u{017e}' => Some(0x9e),
            '\u{0178}' => Some(0x9f),
            _ => None,
        },
    }
}

/// Encode text as WinAnsi bytes, escaped for use in a PDF literal string.
/// Fails with the first character that has no WinAnsi code point.
fn encode_literal_text(text: &str) -> std::result::Result<Vec<u8>, char> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match win_ansi_byte(c).ok_or(c)? {
            b'\\' => bytes.extend_from_slice(b"\\\\"),
            b'(' => bytes.extend_from_slice(b"\\("),
            b')' => bytes.extend_from_slice(b"\\)"),
            b'\r' => bytes.extend_from_slice(b"\\r"),
            b'\n' => bytes.extend_from_slice(b"\\n"),
            byte => bytes.push(byte),
        }
    }
    Ok(bytes)
}

/// Check one overlay, resolving its font and encoding its text, or say why
/// it cannot be drawn
fn validate_overlay(overlay: &TextOverlay) -> Result<(&'static str, Vec<u8>)> {
    if !overlay.x.is_finite() || !overlay.y.is_finite() {
        return Err(Error::OverlayRender(format!(
            "non-finite position ({}, {})",
            overlay.x, overlay.y
        )));
    }
    if !overlay.font_size.is_finite() || overlay.font_size <= 0.0 {
        return Err(Error::OverlayRender(format!(
            "invalid font size {}",
            overlay.font_size
        )));
    }
    let Color { r, g, b } = overlay.color;
    for channel in [r, g, b] {
        if !(0.0..=1.0).contains(&channel) {
            return Err(Error::OverlayRender(format!(
                "color channel {channel} outside [0, 1]"
            )));
        }
    }
    let base_font = resolve_base_font(&overlay.font_family).ok_or_else(|| {
        Error::OverlayRender(format!("unknown font family: {}", overlay.font_family))
    })?;
    let text = encode_literal_text(&overlay.text).map_err(|c| {
        Error::OverlayRender(format!("character {c:?} has no WinAnsi encoding"))
    })?;
    Ok((base_font, text))
}

/// Content stream operators drawing one overlay's text run
///
/// Coordinates are already in the page's own space (bottom-left origin,
/// points); no further transform is applied. `text` is the overlay's text
/// already WinAnsi-encoded and escaped.
fn text_run(overlay: &TextOverlay, font_name: &str, text: &[u8]) -> Vec<u8> {
    let Color { r, g, b } = overlay.color;
    let mut run = format!(
        "BT\n/{} {} Tf\n{} {} {} rg\n1 0 0 1 {} {} Tm\n(",
        font_name, overlay.font_size, r, g, b, overlay.x, overlay.y
    )
    .into_bytes();
    run.extend_from_slice(text);
    run.extend_from_slice(b") Tj\nET\n");
    run
}

/// Build the overlay layer for one page as a Form XObject sized to the
/// page's media box.
///
/// Returns the new object's id, or `None` if every overlay was skipped.
/// Skipped overlays are reported individually and never abort the layer.
pub(crate) fn build_overlay_layer(
    doc: &mut Document,
    overlays: &[TextOverlay],
    page_width_pt: f32,
    page_height_pt: f32,
) -> (Option<ObjectId>, Vec<SkippedOverlay>) {
    let mut content: Vec<u8> = Vec::new();
    let mut fonts: Vec<&'static str> = Vec::new();
    let mut skipped = Vec::new();

    for overlay in overlays {
        match validate_overlay(overlay) {
            Ok((base_font, text)) => {
                if !fonts.contains(&base_font) {
                    fonts.push(base_font);
                }
                content.extend_from_slice(&text_run(
                    overlay,
                    &font_resource_name(base_font),
                    &text,
                ));
            }
            Err(reason) => skipped.push(SkippedOverlay {
                text: overlay.text.clone(),
                reason,
            }),
        }
    }

    if content.is_empty() {
        return (None, skipped);
    }

    // One Type1 font object per distinct base font, private to the layer's
    // own resources so page resource names cannot collide.
    let mut font_dict = Dictionary::new();
    for base_font in fonts {
        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(base_font.as_bytes().to_vec()));
        // Symbol and ZapfDingbats only work with their built-in encodings.
        if base_font != "Symbol" && base_font != "ZapfDingbats" {
            font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        }
        let font_id = doc.add_object(Object::Dictionary(font));
        font_dict.set(font_resource_name(base_font), Object::Reference(font_id));
    }
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(font_dict));

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_width_pt),
            Object::Real(page_height_pt),
        ]),
    );
    xobject_dict.set(
        "Matrix",
        Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    xobject_dict.set("Resources", Object::Dictionary(resources));

    let stream = Stream::new(xobject_dict, content);

    (Some(doc.add_object(Object::Stream(stream))), skipped)
}

/// Composite an overlay layer onto a page: register it in the page's
/// resources and append a content stream that invokes it on top of the
/// existing content, aligned exactly with the page's coordinate space.
pub(crate) fn composite_onto_page(
    doc: &mut Document,
    page_id: ObjectId,
    layer_id: ObjectId,
) -> Result<()> {
    add_layer_to_page_resources(doc, page_id, layer_id)?;

    let invoke = format!("q\n/{OVERLAY_XOBJECT_NAME} Do\nQ\n");
    let content_id = doc.add_object(Stream::new(Dictionary::new(), invoke.into_bytes()));
    append_content_to_page(doc, page_id, content_id)
}

/// Find the resources in effect for a page, following Parent inheritance
/// and dereferencing an indirect Resources entry.
fn effective_page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
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

        match dict.get(b"Resources") {
            Ok(Object::Dictionary(resources)) => return resources.clone(),
            Ok(Object::Reference(resources_id)) => {
                if let Ok(Object::Dictionary(resources)) = doc.get_object(*resources_id) {
                    return resources.clone();
                }
            }
            _ => {}
        }

        current = match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => Some(*parent_id),
            _ => None,
        };
    }

    Dictionary::new()
}

/// Register the layer XObject in the page's Resources dictionary.
///
/// The page gets its own copy of the resources in effect for it (inherited
/// entries included, so existing content keeps resolving its fonts), with
/// the layer added under the XObject subdictionary.
fn add_layer_to_page_resources(
    doc: &mut Document,
    page_id: ObjectId,
    layer_id: ObjectId,
) -> Result<()> {
    let mut resources = effective_page_resources(doc, page_id);

    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    xobjects.set(OVERLAY_XOBJECT_NAME, Object::Reference(layer_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    if let Object::Dictionary(page_dict) = doc.get_object_mut(page_id)? {
        page_dict.set("Resources", Object::Dictionary(resources));
    }
    Ok(())
}

/// Append a content stream reference after a page's existing Contents so
/// the new stream is drawn on top.
fn append_content_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    new_content_id: ObjectId,
) -> Result<()> {
    let Object::Dictionary(page_dict) = doc.get_object_mut(page_id)? else {
        return Ok(());
    };

    let contents = match page_dict.get(b"Contents").ok().cloned() {
        Some(Object::Reference(existing_id)) => Object::Array(vec![
            Object::Reference(existing_id),
            Object::Reference(new_content_id),
        ]),
        Some(Object::Array(mut array)) => {
            array.push(Object::Reference(new_content_id));
            Object::Array(array)
        }
        _ => Object::Array(vec![Object::Reference(new_content_id)]),
    };
    page_dict.set("Contents", contents);
    Ok(())
}
