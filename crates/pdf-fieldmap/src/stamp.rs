//! Drawing text onto copied template pages
//!
//! Existing page content is wrapped in `q ... Q` and the stamp is appended
//! after it, so whatever graphics state the template leaves behind never
//! shifts or recolours the stamped text.

use crate::constants::STAMP_FONT_RESOURCE_PREFIX;
use crate::options::TextAlign;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

// =============================================================================
// Geometry
// =============================================================================

/// Convert a stored top-left y to a PDF baseline y
pub fn flip_to_pdf(stored_y: f32, page_height: f32, vertical_offset: f32) -> f32 {
    page_height - stored_y - vertical_offset
}

/// Left edge of text of `width` anchored at `x`
pub fn anchor_x(x: f32, width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
    }
}

/// A run of glyphs positioned in PDF space
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x: f32,
    pub y: f32,
    pub glyphs: Vec<u16>,
}

// =============================================================================
// Content Stream
// =============================================================================

/// Text showing operators for `texts`, one text object each
pub fn text_operations(resource: &str, font_size: f32, texts: &[PlacedText]) -> String {
    let mut ops = String::from("q 0 g\n");

    for text in texts {
        let hex: String = text.glyphs.iter().map(|g| format!("{:04X}", g)).collect();
        ops.push_str(&format!(
            "BT /{} {} Tf {:.2} {:.2} Td <{}> Tj ET\n",
            resource, font_size, text.x, text.y, hex
        ));
    }

    ops.push_str("Q\n");
    ops
}

/// Stamp `texts` onto a page using the Type0 font `font_id`
pub fn stamp_page(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    font_size: f32,
    texts: &[PlacedText],
) -> Result<()> {
    if texts.is_empty() {
        return Ok(());
    }

    let resource = add_font_resource(doc, page_id, font_id)?;
    let ops = text_operations(&resource, font_size, texts);
    append_content(doc, page_id, ops.into_bytes())
}

// =============================================================================
// Page Plumbing
// =============================================================================

/// Resolve a dictionary that may be inline or referenced, as an owned copy
fn owned_dictionary(doc: &Document, obj: &Object) -> Dictionary {
    match obj {
        Object::Dictionary(dict) => dict.clone(),
        Object::Reference(id) => doc
            .get_dictionary(*id)
            .map(|d| d.clone())
            .unwrap_or_default(),
        _ => Dictionary::new(),
    }
}

/// Register `font_id` in the page's font resources under a fresh name.
///
/// Resource dictionaries may be shared between pages, so the page gets its
/// own inline copies of `Resources` and `Resources/Font`.
pub fn add_font_resource(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<String> {
    let page = doc.get_dictionary(page_id)?;

    let mut resources = page
        .get(b"Resources")
        .map(|obj| owned_dictionary(doc, obj))
        .unwrap_or_default();
    let mut fonts = resources
        .get(b"Font")
        .map(|obj| owned_dictionary(doc, obj))
        .unwrap_or_default();

    let name = (0..)
        .map(|i| {
            if i == 0 {
                STAMP_FONT_RESOURCE_PREFIX.to_string()
            } else {
                format!("{}{}", STAMP_FONT_RESOURCE_PREFIX, i)
            }
        })
        .find(|candidate| !fonts.has(candidate.as_bytes()))
        .unwrap_or_else(|| STAMP_FONT_RESOURCE_PREFIX.to_string());

    fonts.set(name.as_bytes(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Resources", Object::Dictionary(resources));

    Ok(name)
}

/// Wrap the page's existing content in `q`/`Q` and append `content`
pub fn append_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> Result<()> {
    let existing = doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();

    let mut parts: Vec<Object> = match existing {
        Some(Object::Reference(id)) => match doc.get_object(id) {
            Ok(Object::Array(items)) => items.clone(),
            Ok(_) => vec![Object::Reference(id)],
            Err(_) => Vec::new(),
        },
        Some(Object::Array(items)) => items,
        Some(Object::Stream(stream)) => vec![Object::Reference(doc.add_object(stream))],
        _ => Vec::new(),
    };

    if !parts.is_empty() {
        let save = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        parts.insert(0, Object::Reference(save));
    }

    let mut stamp = if parts.is_empty() {
        Vec::new()
    } else {
        b"\nQ\n".to_vec()
    };
    stamp.extend_from_slice(&content);
    let stamp_id = doc.add_object(Stream::new(Dictionary::new(), stamp));
    parts.push(Object::Reference(stamp_id));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Contents", Object::Array(parts));
    Ok(())
}
