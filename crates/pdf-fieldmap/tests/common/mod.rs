#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, Stream};
use std::collections::BTreeSet;

// =============================================================================
// Test PDFs
// =============================================================================

pub fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

pub fn pdf_bytes(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

pub fn test_pdf_bytes(num_pages: usize) -> Vec<u8> {
    pdf_bytes(create_test_pdf(num_pages))
}

/// Concatenated content of every page of a serialized PDF
pub fn page_contents(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
        .collect()
}

// =============================================================================
// Test Font
// =============================================================================
//
// A TrueType font with one tiny outline per glyph. Digits, ASCII letters,
// space and '-' are mapped; '-' is a composite glyph built from '0'.
// Every advance is 500 units on a 1000 unit em, space is 250.

pub const TEST_FONT_NAME: &str = "TestSans-Regular";
pub const UNITS_PER_EM: u16 = 1000;

fn glyph_chars() -> Vec<char> {
    ('0'..='9')
        .chain('A'..='Z')
        .chain('a'..='z')
        .chain([' ', '-'])
        .collect()
}

/// Glyph id of a mapped character
pub fn gid_for(ch: char) -> u16 {
    glyph_chars()
        .iter()
        .position(|&c| c == ch)
        .map(|i| i as u16 + 1)
        .unwrap()
}

pub fn num_glyphs() -> u16 {
    glyph_chars().len() as u16 + 1
}

/// `<....>` hex string the stamp uses for `text` when it is the only text in
/// the document. Subset ids follow `.notdef` in ascending original-id order.
pub fn hex_glyphs(text: &str) -> String {
    let used: BTreeSet<u16> = text.chars().map(gid_for).collect();
    text.chars()
        .map(|c| {
            let rank = used.iter().position(|&g| g == gid_for(c)).unwrap();
            format!("{:04X}", rank + 1)
        })
        .collect()
}

fn simple_glyph() -> Vec<u8> {
    let mut g = Vec::new();
    g.extend(1i16.to_be_bytes());
    for v in [0i16, 0, 400, 700] {
        g.extend(v.to_be_bytes());
    }
    g.extend(0u16.to_be_bytes()); // endPtsOfContours
    g.extend(0u16.to_be_bytes()); // instructionLength
    g.push(0x01); // on curve
    g.extend(0i16.to_be_bytes());
    g.extend(0i16.to_be_bytes());
    g.push(0);
    g
}

fn composite_glyph(component: u16) -> Vec<u8> {
    let mut g = Vec::new();
    g.extend((-1i16).to_be_bytes());
    for v in [0i16, 0, 400, 700] {
        g.extend(v.to_be_bytes());
    }
    g.extend(0x0003u16.to_be_bytes()); // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES
    g.extend(component.to_be_bytes());
    g.extend(0i16.to_be_bytes());
    g.extend(0i16.to_be_bytes());
    g.extend([0, 0]);
    g
}

fn advance_for(gid: u16) -> u16 {
    if gid != 0 && gid == gid_for(' ') { 250 } else { 500 }
}

fn head_table() -> Vec<u8> {
    let mut t = Vec::new();
    t.extend(0x0001_0000u32.to_be_bytes()); // version
    t.extend(0x0001_0000u32.to_be_bytes()); // fontRevision
    t.extend(0u32.to_be_bytes()); // checkSumAdjustment
    t.extend(0x5F0F_3CF5u32.to_be_bytes()); // magicNumber
    t.extend(0u16.to_be_bytes()); // flags
    t.extend(UNITS_PER_EM.to_be_bytes());
    t.extend(0i64.to_be_bytes()); // created
    t.extend(0i64.to_be_bytes()); // modified
    for v in [0i16, -200, 1000, 800] {
        t.extend(v.to_be_bytes());
    }
    t.extend(0u16.to_be_bytes()); // macStyle
    t.extend(8u16.to_be_bytes()); // lowestRecPPEM
    t.extend(2i16.to_be_bytes()); // fontDirectionHint
    t.extend(1i16.to_be_bytes()); // indexToLocFormat: long
    t.extend(0i16.to_be_bytes()); // glyphDataFormat
    t
}

fn hhea_table(num_glyphs: u16) -> Vec<u8> {
    let mut t = Vec::new();
    t.extend(0x0001_0000u32.to_be_bytes());
    t.extend(800i16.to_be_bytes()); // ascender
    t.extend((-200i16).to_be_bytes()); // descender
    t.extend(0i16.to_be_bytes()); // lineGap
    t.extend(500u16.to_be_bytes()); // advanceWidthMax
    t.extend(0i16.to_be_bytes()); // minLeftSideBearing
    t.extend(0i16.to_be_bytes()); // minRightSideBearing
    t.extend(400i16.to_be_bytes()); // xMaxExtent
    t.extend(1i16.to_be_bytes()); // caretSlopeRise
    t.extend(0i16.to_be_bytes()); // caretSlopeRun
    t.extend(0i16.to_be_bytes()); // caretOffset
    t.extend([0u8; 8]); // reserved
    t.extend(0i16.to_be_bytes()); // metricDataFormat
    t.extend(num_glyphs.to_be_bytes());
    t
}

fn cmap_table(chars: &[char]) -> Vec<u8> {
    let mut segments: Vec<(u16, u16)> = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| (c as u16, i as u16 + 1))
        .collect();
    segments.sort();

    let seg_count = segments.len() as u16 + 1;
    let entry_selector = 15 - seg_count.leading_zeros() as u16;
    let search_range = 2 * (1u16 << entry_selector);
    let range_shift = 2 * seg_count - search_range;

    let mut sub = Vec::new();
    sub.extend(4u16.to_be_bytes());
    sub.extend((16 + 8 * seg_count).to_be_bytes());
    sub.extend(0u16.to_be_bytes()); // language
    sub.extend((seg_count * 2).to_be_bytes());
    sub.extend(search_range.to_be_bytes());
    sub.extend(entry_selector.to_be_bytes());
    sub.extend(range_shift.to_be_bytes());
    for (code, _) in &segments {
        sub.extend(code.to_be_bytes());
    }
    sub.extend(0xFFFFu16.to_be_bytes());
    sub.extend(0u16.to_be_bytes()); // reservedPad
    for (code, _) in &segments {
        sub.extend(code.to_be_bytes());
    }
    sub.extend(0xFFFFu16.to_be_bytes());
    for (code, gid) in &segments {
        sub.extend(gid.wrapping_sub(*code).to_be_bytes());
    }
    sub.extend(1u16.to_be_bytes());
    for _ in 0..seg_count {
        sub.extend(0u16.to_be_bytes());
    }

    let mut t = Vec::new();
    t.extend(0u16.to_be_bytes()); // version
    t.extend(1u16.to_be_bytes()); // numTables
    t.extend(3u16.to_be_bytes()); // platform: Windows
    t.extend(1u16.to_be_bytes()); // encoding: Unicode BMP
    t.extend(12u32.to_be_bytes());
    t.extend(sub);
    t
}

fn name_table() -> Vec<u8> {
    let value: Vec<u8> = TEST_FONT_NAME
        .encode_utf16()
        .flat_map(|u| u.to_be_bytes())
        .collect();

    let mut t = Vec::new();
    t.extend(0u16.to_be_bytes()); // format
    t.extend(1u16.to_be_bytes()); // count
    t.extend(18u16.to_be_bytes()); // stringOffset
    t.extend(3u16.to_be_bytes()); // platform
    t.extend(1u16.to_be_bytes()); // encoding
    t.extend(0x0409u16.to_be_bytes()); // language
    t.extend(6u16.to_be_bytes()); // PostScript name
    t.extend((value.len() as u16).to_be_bytes());
    t.extend(0u16.to_be_bytes());
    t.extend(value);
    t
}

fn write_font(tables: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let entry_selector = 15 - num_tables.leading_zeros() as u16;
    let search_range = 16 * (1u16 << entry_selector);

    let mut out = Vec::new();
    out.extend(0x0001_0000u32.to_be_bytes());
    out.extend(num_tables.to_be_bytes());
    out.extend(search_range.to_be_bytes());
    out.extend(entry_selector.to_be_bytes());
    out.extend((num_tables * 16 - search_range).to_be_bytes());

    let mut offset = 12 + 16 * tables.len();
    for (tag, body) in tables {
        out.extend(tag.iter());
        out.extend(0u32.to_be_bytes());
        out.extend((offset as u32).to_be_bytes());
        out.extend((body.len() as u32).to_be_bytes());
        offset += body.len().div_ceil(4) * 4;
    }
    for (_, body) in tables {
        out.extend(body);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }
    out
}

/// Bytes of the synthesized test font
pub fn test_font() -> Vec<u8> {
    build_font(None)
}

/// The test font plus one extra glyph for `broken`, whose `loca` range runs
/// past the end of `glyf`. Metrics still work; subsetting that glyph fails.
pub fn font_with_broken_glyph(broken: char) -> Vec<u8> {
    build_font(Some(broken))
}

fn build_font(broken: Option<char>) -> Vec<u8> {
    let mut chars = glyph_chars();
    chars.extend(broken);
    let num_glyphs = chars.len() as u16 + 1;
    let zero = gid_for('0');

    let mut glyf = Vec::new();
    let mut loca = Vec::new();
    let mut hmtx = Vec::new();
    for gid in 0..num_glyphs {
        loca.extend((glyf.len() as u32).to_be_bytes());
        match gid.checked_sub(1).map(|i| chars[i as usize]) {
            Some(c) if Some(c) == broken => {}
            Some(' ') => {}
            Some('-') => glyf.extend(composite_glyph(zero)),
            _ => glyf.extend(simple_glyph()),
        }
        hmtx.extend(advance_for(gid).to_be_bytes());
        hmtx.extend(0i16.to_be_bytes());
    }
    let end = if broken.is_some() { glyf.len() + 4096 } else { glyf.len() };
    loca.extend((end as u32).to_be_bytes());

    let mut maxp = Vec::new();
    maxp.extend(0x0000_5000u32.to_be_bytes());
    maxp.extend(num_glyphs.to_be_bytes());

    write_font(&[
        (b"cmap", cmap_table(&chars)),
        (b"glyf", glyf),
        (b"head", head_table()),
        (b"hhea", hhea_table(num_glyphs)),
        (b"hmtx", hmtx),
        (b"loca", loca),
        (b"maxp", maxp),
        (b"name", name_table()),
    ])
}

/// Raw bytes of one table of an sfnt font
pub fn font_table<'a>(font: &'a [u8], tag: &[u8; 4]) -> Option<&'a [u8]> {
    let num_tables = u16::from_be_bytes([font[4], font[5]]) as usize;
    (0..num_tables).find_map(|i| {
        let record = &font[12 + i * 16..28 + i * 16];
        if &record[0..4] != tag {
            return None;
        }
        let offset = u32::from_be_bytes([record[8], record[9], record[10], record[11]]) as usize;
        let length = u32::from_be_bytes([record[12], record[13], record[14], record[15]]) as usize;
        Some(&font[offset..offset + length])
    })
}
