//! Font decoding for text extraction.
//!
//! A [`FontInfo`] turns the bytes of a shown string into Unicode text and
//! glyph advances. Composite (Type0) fonts read two-byte codes and take their
//! advances from the descendant font's `/W` array; simple fonts read single
//! bytes and use `/FirstChar` + `/Widths`.

mod cmap;

pub use cmap::{parse_tounicode_cmap, CMap};

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use crate::object::{self, number};

/// Advance assumed for simple fonts without a `/Widths` array (standard 14 fonts).
const DEFAULT_SIMPLE_WIDTH: f64 = 500.0;
/// `/DW` default for CID fonts (PDF 32000-1, 9.7.4.3).
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// One decoded character code.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Unicode text for the code (may be empty)
    pub text: String,
    /// Advance in glyph space (1/1000 text space units)
    pub width: f64,
    /// True for the single-byte code 32, which receives word spacing
    pub is_space: bool,
}

#[derive(Debug, Clone)]
enum GlyphWidths {
    Simple {
        first_char: u32,
        widths: Vec<f64>,
        missing: f64,
    },
    Cid {
        widths: HashMap<u32, f64>,
        default: f64,
    },
    Uniform(f64),
}

impl GlyphWidths {
    fn width(&self, code: u32) -> f64 {
        match self {
            GlyphWidths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|idx| widths.get(idx as usize))
                .copied()
                .unwrap_or(*missing),
            GlyphWidths::Cid { widths, default } => widths.get(&code).copied().unwrap_or(*default),
            GlyphWidths::Uniform(width) => *width,
        }
    }
}

/// Decoding information for one font resource.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// `/BaseFont` name, for diagnostics
    pub base_font: String,
    composite: bool,
    identity: bool,
    to_unicode: Option<CMap>,
    widths: GlyphWidths,
}

impl FontInfo {
    /// Font used when a `Tf` names a resource that does not exist.
    pub fn fallback() -> Self {
        Self {
            base_font: String::from("(missing)"),
            composite: false,
            identity: false,
            to_unicode: None,
            widths: GlyphWidths::Uniform(DEFAULT_SIMPLE_WIDTH),
        }
    }

    /// Read a font dictionary. Missing pieces degrade to defaults.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let base_font = object::get_name(doc, dict, b"BaseFont")
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .unwrap_or_default();
        let composite = object::get_name(doc, dict, b"Subtype") == Some(b"Type0".as_slice());

        let to_unicode = object::get(doc, dict, b"ToUnicode")
            .and_then(|obj| obj.as_stream().ok())
            .map(|stream| {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                parse_tounicode_cmap(&data)
            });

        let identity = composite
            && matches!(
                object::get_name(doc, dict, b"Encoding"),
                Some(b"Identity-H") | Some(b"Identity-V")
            );
        if composite && !identity {
            log::warn!(
                "Font '{}': Type0 encoding is not Identity-H/V{}",
                base_font,
                if to_unicode.is_some() {
                    ", decoding codes as two bytes"
                } else {
                    " and there is no ToUnicode, text will be dropped"
                }
            );
        }

        let widths = if composite {
            cid_widths(doc, dict)
        } else {
            simple_widths(doc, dict, &base_font)
        };

        Self {
            base_font,
            composite,
            identity,
            to_unicode,
            widths,
        }
    }

    /// True for Type0 fonts.
    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// True for Type0 fonts encoded `Identity-H` or `Identity-V`.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Bytes per character code.
    pub fn code_bytes(&self) -> usize {
        if !self.composite {
            return 1;
        }
        self.to_unicode
            .as_ref()
            .and_then(CMap::code_bytes)
            .filter(|n| (1..=4).contains(n))
            .unwrap_or(2)
    }

    /// Decode a shown string into glyphs.
    ///
    /// A trailing partial code is dropped.
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        let code_bytes = self.code_bytes();
        bytes
            .chunks(code_bytes)
            .filter(|chunk| chunk.len() == code_bytes)
            .map(|chunk| {
                let code = chunk.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
                Glyph {
                    text: self.code_to_text(code),
                    width: self.widths.width(code),
                    is_space: code_bytes == 1 && code == 32,
                }
            })
            .collect()
    }

    fn code_to_text(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|cmap| cmap.get(code)) {
            return text.to_string();
        }
        // Without ToUnicode: UCS-2 for Identity fonts, Latin-1 for simple fonts
        if self.composite && !self.identity {
            return String::new();
        }
        char::from_u32(code)
            .filter(|c| !c.is_control())
            .map(String::from)
            .unwrap_or_default()
    }
}

fn simple_widths(doc: &Document, dict: &Dictionary, base_font: &str) -> GlyphWidths {
    let missing = object::get_dict(doc, dict, b"FontDescriptor")
        .and_then(|desc| object::get_number(doc, desc, b"MissingWidth"))
        .unwrap_or(0.0);

    match object::get_array(doc, dict, b"Widths") {
        Some(array) => {
            let widths = array
                .iter()
                .map(|w| object::resolve(doc, w).and_then(number).unwrap_or(missing))
                .collect();
            let first_char = object::get_number(doc, dict, b"FirstChar").unwrap_or(0.0) as u32;
            GlyphWidths::Simple {
                first_char,
                widths,
                missing,
            }
        },
        None => {
            log::debug!("Font '{}': no /Widths array, using uniform advance", base_font);
            GlyphWidths::Uniform(DEFAULT_SIMPLE_WIDTH)
        },
    }
}

fn cid_widths(doc: &Document, dict: &Dictionary) -> GlyphWidths {
    let descendant = object::get_array(doc, dict, b"DescendantFonts")
        .and_then(|fonts| fonts.first())
        .and_then(|first| object::resolve(doc, first))
        .and_then(|obj| obj.as_dict().ok());

    let Some(descendant) = descendant else {
        return GlyphWidths::Uniform(DEFAULT_CID_WIDTH);
    };

    let default = object::get_number(doc, descendant, b"DW").unwrap_or(DEFAULT_CID_WIDTH);
    let widths = object::get_array(doc, descendant, b"W")
        .map(|w| parse_cid_width_array(doc, w))
        .unwrap_or_default();

    GlyphWidths::Cid { widths, default }
}

/// Parse a `/W` array: `c [w1 w2 ...]` and `c_first c_last w` entries.
fn parse_cid_width_array(doc: &Document, array: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let items: Vec<&Object> = array
        .iter()
        .filter_map(|obj| object::resolve(doc, obj))
        .collect();

    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(items[i]) else {
            break;
        };
        let first = first as u32;

        match items.get(i + 1).copied() {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    let Some(code) = u32::try_from(offset).ok().and_then(|o| first.checked_add(o))
                    else {
                        break;
                    };
                    if let Some(w) = object::resolve(doc, w).and_then(number) {
                        widths.insert(code, w);
                    }
                }
                i += 2;
            },
            Some(last) => {
                let (Some(last), Some(w)) = (number(last), items.get(i + 2).and_then(|o| number(o)))
                else {
                    break;
                };
                for code in first..=(last as u32).min(first.saturating_add(0xFFFF)) {
                    widths.insert(code, w);
                }
                i += 3;
            },
            None => break,
        }
    }

    widths
}
