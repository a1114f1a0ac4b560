//! Glyph subsetting of the embedded font program
//!
//! Subset fonts number their glyphs compactly: `.notdef` stays 0 and the
//! kept glyphs follow in ascending order of their original ids. Content
//! streams must use the subset ids.

use crate::types::{FieldMapError, Result};
use std::collections::BTreeSet;
use subsetter::GlyphRemapper;

/// A subset font program and the renumbering that produced it
pub struct FontSubset {
    data: Vec<u8>,
    remapper: GlyphRemapper,
}

impl FontSubset {
    /// Bytes of the subset font, ready for `FontFile2`
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Subset id of a glyph of the full font, if it was kept
    pub fn remap(&self, gid: u16) -> Option<u16> {
        self.remapper.get(gid)
    }

    /// Number of glyphs addressable in the subset
    pub fn glyph_count(&self) -> u16 {
        self.remapper.num_gids()
    }
}

impl std::fmt::Debug for FontSubset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSubset")
            .field("bytes", &self.data.len())
            .field("glyphs", &self.glyph_count())
            .finish()
    }
}

/// Subset `data` to `.notdef` plus `glyphs`
pub fn subset_font(data: &[u8], glyphs: &BTreeSet<u16>) -> Result<FontSubset> {
    let mut remapper = GlyphRemapper::new();
    remapper.remap(0);
    for &gid in glyphs {
        remapper.remap(gid);
    }

    let data = subsetter::subset(data, 0, &remapper)
        .map_err(|e| FieldMapError::FontEmbed(format!("Font subsetting failed: {:?}", e)))?;

    Ok(FontSubset { data, remapper })
}

/// Six uppercase letters derived from the glyph set and font name, used as
/// the `ABCDEF+` prefix of a subset font's name.
pub fn subset_tag(glyphs: &BTreeSet<u16>, font_name: &str) -> String {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    let bytes = glyphs
        .iter()
        .flat_map(|gid| gid.to_be_bytes())
        .chain(font_name.bytes());
    for byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    (0..6)
        .map(|_| {
            let letter = (b'A' + (hash % 26) as u8) as char;
            hash /= 26;
            letter
        })
        .collect()
}
