//! Parsed TrueType font program and text metrics

use crate::constants::FALLBACK_FONT_NAME;
use crate::types::{FieldMapError, Result};
use ttf_parser::{Face, GlyphId, name_id};

/// Glyphs for one piece of text, one per `char`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphRun {
    pub glyphs: Vec<u16>,
    /// Sum of advances in font units
    pub advance_units: u32,
    /// Characters the font has no glyph for (drawn as glyph 0)
    pub missing: Vec<char>,
}

/// A TrueType font ready for per-document embedding
#[derive(Debug, Clone)]
pub struct FontProgram {
    data: Vec<u8>,
    postscript_name: String,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
    advances: Vec<u16>,
}

impl FontProgram {
    /// Parse font bytes. Only single TrueType-outline fonts can be subset and
    /// embedded; collections and CFF-flavoured fonts are rejected.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if ttf_parser::fonts_in_collection(&data).is_some() {
            return Err(FieldMapError::FontParse(
                "font collections (.ttc) are not supported".to_string(),
            ));
        }

        let face = Face::parse(&data, 0).map_err(|e| FieldMapError::FontParse(e.to_string()))?;
        if face.tables().glyf.is_none() {
            return Err(FieldMapError::FontParse(
                "font has no TrueType outlines (glyf/loca)".to_string(),
            ));
        }

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .map(|name| sanitize_font_name(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_FONT_NAME.to_string());

        let advances = (0..face.number_of_glyphs())
            .map(|gid| face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0))
            .collect();

        let global_bbox = face.global_bounding_box();
        let bbox = [
            global_bbox.x_min,
            global_bbox.y_min,
            global_bbox.x_max,
            global_bbox.y_max,
        ];
        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascender);

        Ok(Self {
            data,
            postscript_name,
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox,
            advances,
        })
    }

    fn face(&self) -> Result<Face<'_>> {
        Face::parse(&self.data, 0).map_err(|e| FieldMapError::FontParse(e.to_string()))
    }

    /// Map text to glyphs using the font's cmap
    pub fn layout(&self, text: &str) -> Result<GlyphRun> {
        let face = self.face()?;
        let mut run = GlyphRun::default();

        for ch in text.chars() {
            let gid = match face.glyph_index(ch) {
                Some(GlyphId(gid)) => gid,
                None => {
                    run.missing.push(ch);
                    0
                }
            };
            run.glyphs.push(gid);
            run.advance_units += self.advance(gid) as u32;
        }

        Ok(run)
    }

    /// Glyph ids for `text`, `.notdef` for unmapped characters
    pub fn glyph_ids(&self, text: &str) -> Result<Vec<u16>> {
        Ok(self.layout(text)?.glyphs)
    }

    /// Width of `text` in points at `font_size`
    pub fn text_width(&self, text: &str, font_size: f32) -> Result<f32> {
        let run = self.layout(text)?;
        Ok(self.units_to_points(run.advance_units, font_size))
    }

    pub fn units_to_points(&self, units: u32, font_size: f32) -> f32 {
        units as f32 * font_size / self.units_per_em as f32
    }

    /// Scale font units to the 1000-unit glyph space PDF uses
    pub fn to_pdf_units(&self, value: i32) -> i64 {
        (value as i64 * 1000) / self.units_per_em as i64
    }

    /// Horizontal advance of a glyph in font units
    pub fn advance(&self, gid: u16) -> u16 {
        self.advances.get(gid as usize).copied().unwrap_or(0)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    pub fn descender(&self) -> i16 {
        self.descender
    }

    pub fn cap_height(&self) -> i16 {
        self.cap_height
    }

    pub fn bbox(&self) -> [i16; 4] {
        self.bbox
    }

    pub fn glyph_count(&self) -> usize {
        self.advances.len()
    }
}

/// Keep characters that are valid in a PDF name without escaping
fn sanitize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_font_name() {
        assert_eq!(sanitize_font_name("Sarabun-Regular"), "Sarabun-Regular");
        assert_eq!(sanitize_font_name("My Font (Bold)"), "MyFontBold");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(FontProgram::from_bytes(b"not a font".to_vec()).is_err());
        assert!(FontProgram::from_bytes(Vec::new()).is_err());
    }
}
