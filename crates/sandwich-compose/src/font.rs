//! Font resources for the invisible text layer.
//!
//! A [`FontResource`] is constructed once per job and owned by the
//! assembler for the lifetime of the document — the one-time
//! registration the text layer depends on.
//!
//! Two variants:
//! - [`FontResource::builtin`]: the standard-14 Helvetica with
//!   WinAnsiEncoding. No font program is embedded. Characters outside
//!   WinAnsi degrade to `?` in the hidden layer; acceptable for
//!   Latin-script documents, documented limitation otherwise.
//! - [`FontResource::embedded`]: a caller-supplied TrueType face,
//!   written as a Type0/Identity-H composite font (CIDFontType2 with
//!   the program in FontFile2) plus a ToUnicode CMap covering every
//!   glyph actually shown, so selection and copy round-trip the full
//!   Unicode range of the source document.

use std::collections::BTreeMap;

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Finish, Name, Pdf, Rect, Ref, Str};
use ttf_parser::{Face, GlyphId};

use crate::error::ComposeError;

/// Resource name under which the layer font is registered on each page.
pub(crate) const FONT_NAME: Name<'static> = Name(b"F0");

/// Glyphs shown so far, keyed by glyph id.
///
/// For the embedded variant this drives the CID widths array and the
/// ToUnicode CMap at finish time. Unmapped characters share the
/// `.notdef` glyph (id 0); the last such character wins its CMap entry.
pub(crate) type GlyphUsage = BTreeMap<u16, (char, f32)>;

/// A font capable of backing the invisible text layer.
#[derive(Debug, Clone)]
pub enum FontResource {
    /// Standard-14 Helvetica, WinAnsiEncoding.
    Builtin,
    /// An embedded TrueType face.
    Embedded {
        /// Raw font program bytes.
        data: Vec<u8>,
    },
}

impl FontResource {
    /// The built-in Helvetica resource.
    pub fn builtin() -> Self {
        FontResource::Builtin
    }

    /// Wrap a TrueType font program, validating that it parses.
    pub fn embedded(data: Vec<u8>) -> Result<Self, ComposeError> {
        Face::parse(&data, 0)
            .map_err(|e| ComposeError::Font(format!("failed to parse font: {e}")))?;
        Ok(FontResource::Embedded { data })
    }

    /// Encode `text` into the byte string shown by a `Tj` operator,
    /// recording glyph usage for the embedded variant.
    pub(crate) fn encode(
        &self,
        text: &str,
        used: &mut GlyphUsage,
    ) -> Result<Vec<u8>, ComposeError> {
        match self {
            FontResource::Builtin => Ok(text
                .chars()
                .map(|c| winansi_byte(c).unwrap_or(b'?'))
                .collect()),
            FontResource::Embedded { data } => {
                let face = Face::parse(data, 0)
                    .map_err(|e| ComposeError::Font(format!("failed to parse font: {e}")))?;
                let upem = f32::from(face.units_per_em());
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let gid = face.glyph_index(c).unwrap_or(GlyphId(0));
                    let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                    used.insert(gid.0, (c, f32::from(advance) * 1000.0 / upem));
                    bytes.extend_from_slice(&gid.0.to_be_bytes());
                }
                Ok(bytes)
            }
        }
    }

    /// Write the font object graph into `pdf` under `font_ref`.
    ///
    /// Called exactly once, at document finish, when the full glyph
    /// usage is known.
    pub(crate) fn write_objects(
        &self,
        pdf: &mut Pdf,
        next_ref: &mut i32,
        font_ref: Ref,
        used: &GlyphUsage,
    ) -> Result<(), ComposeError> {
        match self {
            FontResource::Builtin => {
                pdf.type1_font(font_ref)
                    .base_font(Name(b"Helvetica"))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                Ok(())
            }
            FontResource::Embedded { data } => write_embedded(pdf, next_ref, font_ref, used, data),
        }
    }
}

fn bump(next_ref: &mut i32) -> Ref {
    let id = Ref::new(*next_ref);
    *next_ref += 1;
    id
}

fn write_embedded(
    pdf: &mut Pdf,
    next_ref: &mut i32,
    font_ref: Ref,
    used: &GlyphUsage,
    data: &[u8],
) -> Result<(), ComposeError> {
    let face = Face::parse(data, 0)
        .map_err(|e| ComposeError::Font(format!("failed to parse font: {e}")))?;
    let upem = f32::from(face.units_per_em());
    let scale = 1000.0 / upem;

    let cid_ref = bump(next_ref);
    let descriptor_ref = bump(next_ref);
    let cmap_ref = bump(next_ref);
    let data_ref = bump(next_ref);

    let base_font = Name(b"Embedded");

    pdf.type0_font(font_ref)
        .base_font(base_font)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_ref)
        .to_unicode(cmap_ref);

    let mut cid = pdf.cid_font(cid_ref);
    cid.subtype(CidFontType::Type2)
        .base_font(base_font)
        .system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        })
        .font_descriptor(descriptor_ref)
        .default_width(upem * scale / 2.0);
    {
        let mut widths = cid.widths();
        for (&gid, &(_, advance)) in used {
            widths.consecutive(gid, [advance]);
        }
    }
    cid.cid_to_gid_map_predefined(Name(b"Identity"));
    cid.finish();

    let bbox = face.global_bounding_box();
    pdf.font_descriptor(descriptor_ref)
        .name(base_font)
        .flags(FontFlags::SYMBOLIC)
        .bbox(Rect::new(
            f32::from(bbox.x_min) * scale,
            f32::from(bbox.y_min) * scale,
            f32::from(bbox.x_max) * scale,
            f32::from(bbox.y_max) * scale,
        ))
        .italic_angle(0.0)
        .ascent(f32::from(face.ascender()) * scale)
        .descent(f32::from(face.descender()) * scale)
        .cap_height(f32::from(face.capital_height().unwrap_or(face.ascender())) * scale)
        .stem_v(90.0)
        .font_file2(data_ref);

    let mut cmap = UnicodeCmap::new(
        Name(b"Adobe-Identity-UCS"),
        SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"UCS"),
            supplement: 0,
        },
    );
    for (&gid, &(c, _)) in used {
        cmap.pair(gid, c);
    }
    pdf.cmap(cmap_ref, &cmap.finish());

    pdf.stream(data_ref, data);

    Ok(())
}

/// Map a character to its WinAnsiEncoding byte, if it has one.
///
/// WinAnsi matches Latin-1 except in the 0x80–0x9F range, which carries
/// typographic characters instead of C1 controls.
pub(crate) fn winansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E => Some(code as u8),
        0xA0..=0xFF => Some(code as u8),
        _ => WINANSI_SPECIALS
            .iter()
            .find(|&&(ch, _)| ch == c)
            .map(|&(_, byte)| byte),
    }
}

/// The 0x80–0x9F block of WinAnsiEncoding (undefined slots omitted).
const WINANSI_SPECIALS: &[(char, u8)] = &[
    ('\u{20AC}', 0x80), // euro
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];
