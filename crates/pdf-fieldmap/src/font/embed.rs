//! Type0 / CIDFontType2 embedding
//!
//! Text is shown with `Identity-H`, so the two-byte codes in content streams
//! are glyph ids of the embedded subset, not of the full font.

use super::program::FontProgram;
use super::subset::{FontSubset, subset_font, subset_tag};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};

/// Symbolic font; glyphs are addressed by id, not a standard encoding
const FONT_FLAGS_SYMBOLIC: i64 = 4;

/// Nominal vertical stem width; TrueType programs carry no such value
const DEFAULT_STEM_V: i64 = 80;

/// Max entries in one `beginbfchar` section
const BFCHAR_CHUNK: usize = 100;

/// A subset font added to a document
#[derive(Debug)]
pub struct EmbeddedFont {
    /// Type0 font dictionary
    pub font_id: ObjectId,
    subset: FontSubset,
}

impl EmbeddedFont {
    /// Two-byte codes for glyphs of the full font; glyphs outside the subset
    /// show as `.notdef`
    pub fn codes(&self, glyphs: &[u16]) -> Vec<u16> {
        glyphs
            .iter()
            .map(|&gid| self.subset.remap(gid).unwrap_or(0))
            .collect()
    }
}

/// Embed a subset of `font` holding the glyphs in `used` (gid -> char they
/// were laid out from).
pub fn embed_subset(
    doc: &mut Document,
    font: &FontProgram,
    used: &BTreeMap<u16, char>,
) -> Result<EmbeddedFont> {
    let glyphs: BTreeSet<u16> = used.keys().copied().chain(std::iter::once(0)).collect();
    let subset = subset_font(font.data(), &glyphs)?;
    let base_font = format!("{}+{}", subset_tag(&glyphs, font.postscript_name()), font.postscript_name());

    // Subset id -> advance and char, in subset order
    let widths: BTreeMap<u16, u16> = glyphs
        .iter()
        .filter_map(|&gid| subset.remap(gid).map(|cid| (cid, font.advance(gid))))
        .collect();
    let chars: BTreeMap<u16, char> = used
        .iter()
        .filter_map(|(&gid, &ch)| subset.remap(gid).map(|cid| (cid, ch)))
        .collect();

    let program = subset.data().to_vec();
    let font_file = Stream::new(
        Dictionary::from_iter(vec![("Length1", Object::Integer(program.len() as i64))]),
        program,
    );
    let font_file_id = doc.add_object(font_file);

    let [x_min, y_min, x_max, y_max] = font.bbox();
    let scaled = |v: i16| Object::Integer(font.to_pdf_units(v as i32));
    let descriptor = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"FontDescriptor".to_vec())),
        ("FontName", Object::Name(base_font.as_bytes().to_vec())),
        ("Flags", Object::Integer(FONT_FLAGS_SYMBOLIC)),
        (
            "FontBBox",
            Object::Array(vec![scaled(x_min), scaled(y_min), scaled(x_max), scaled(y_max)]),
        ),
        ("ItalicAngle", Object::Integer(0)),
        ("Ascent", scaled(font.ascender())),
        ("Descent", scaled(font.descender())),
        ("CapHeight", scaled(font.cap_height())),
        ("StemV", Object::Integer(DEFAULT_STEM_V)),
        ("FontFile2", Object::Reference(font_file_id)),
    ]);
    let descriptor_id = doc.add_object(descriptor);

    let cid_system_info = Dictionary::from_iter(vec![
        ("Registry", Object::string_literal("Adobe")),
        ("Ordering", Object::string_literal("Identity")),
        ("Supplement", Object::Integer(0)),
    ]);
    let cid_font = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
        ("BaseFont", Object::Name(base_font.as_bytes().to_vec())),
        ("CIDSystemInfo", Object::Dictionary(cid_system_info)),
        ("FontDescriptor", Object::Reference(descriptor_id)),
        ("W", Object::Array(widths_array(font, &widths))),
        ("CIDToGIDMap", Object::Name(b"Identity".to_vec())),
    ]);
    let cid_font_id = doc.add_object(cid_font);

    let to_unicode = Stream::new(Dictionary::new(), to_unicode_cmap(&chars).into_bytes());
    let to_unicode_id = doc.add_object(to_unicode);

    let type0 = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type0".to_vec())),
        ("BaseFont", Object::Name(base_font.into_bytes())),
        ("Encoding", Object::Name(b"Identity-H".to_vec())),
        ("DescendantFonts", Object::Array(vec![Object::Reference(cid_font_id)])),
        ("ToUnicode", Object::Reference(to_unicode_id)),
    ]);

    Ok(EmbeddedFont {
        font_id: doc.add_object(type0),
        subset,
    })
}

/// `W` entries: `first [w1 w2 ...]` for each run of consecutive ids
fn widths_array(font: &FontProgram, widths: &BTreeMap<u16, u16>) -> Vec<Object> {
    let mut array = Vec::new();
    let mut run_start: Option<u16> = None;
    let mut run: Vec<Object> = Vec::new();
    let mut previous: Option<u16> = None;

    for (&cid, &advance) in widths {
        let contiguous = previous.is_some_and(|p| p.checked_add(1) == Some(cid));
        if !contiguous {
            if let Some(start) = run_start.take() {
                array.push(Object::Integer(start as i64));
                array.push(Object::Array(std::mem::take(&mut run)));
            }
            run_start = Some(cid);
        }
        run.push(Object::Integer(font.to_pdf_units(advance as i32)));
        previous = Some(cid);
    }

    if let Some(start) = run_start {
        array.push(Object::Integer(start as i64));
        array.push(Object::Array(run));
    }

    array
}

/// ToUnicode CMap so stamped text can be searched and copied
fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let mappings: Vec<(u16, char)> = used
        .iter()
        .filter(|(gid, _)| **gid != 0)
        .map(|(&gid, &ch)| (gid, ch))
        .collect();

    for chunk in mappings.chunks(BFCHAR_CHUNK) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for &(gid, ch) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, utf16));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}
