//! Shared fixtures: in-memory Korean PDFs and signature images.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

/// One `Tj` on a page: text, baseline origin and font size.
#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Shorthand for a 10pt line.
pub fn line(text: &str, x: f64, y: f64) -> Line {
    Line {
        text: text.to_string(),
        x,
        y,
        size: 10.0,
    }
}

/// Builds PDFs whose text is shown in a Type0 Identity-H font.
///
/// Character codes are the UCS-2 values of the text, mapped back through a
/// ToUnicode CMap; every glyph is 1000 units wide, so a run is
/// `chars * size` points long.
#[derive(Debug, Clone)]
pub struct KoreanPdfBuilder {
    pages: Vec<Vec<Line>>,
    media_box: [i64; 4],
}

impl Default for KoreanPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KoreanPdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            media_box: [0, 0, 595, 842],
        }
    }

    pub fn media_box(mut self, media_box: [i64; 4]) -> Self {
        self.media_box = media_box;
        self
    }

    pub fn page(mut self, lines: Vec<Line>) -> Self {
        self.pages.push(lines);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = self.build_document();
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    pub fn build_document(&self) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let chars: BTreeSet<char> = self
            .pages
            .iter()
            .flatten()
            .flat_map(|l| l.text.chars())
            .collect();
        let font_id = add_identity_font(&mut doc, &chars);

        let mut kids = Vec::new();
        for lines in &self.pages {
            let mut operations = Vec::new();
            for l in lines {
                let encoded: Vec<u8> = l
                    .text
                    .encode_utf16()
                    .flat_map(|unit| unit.to_be_bytes())
                    .collect();
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), Object::Real(l.size as _)]));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Real(l.x as _), Object::Real(l.y as _)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encoded, StringFormat::Hexadecimal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations }.encode().unwrap();
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            kids.push(Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
                "MediaBox" => self.media_box.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }
}

fn add_identity_font(doc: &mut Document, chars: &BTreeSet<char>) -> lopdf::ObjectId {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let units: Vec<u16> = chars
        .iter()
        .filter_map(|c| {
            let mut buf = [0u16; 2];
            let encoded = c.encode_utf16(&mut buf);
            (encoded.len() == 1).then(|| encoded[0])
        })
        .collect();
    for chunk in units.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for unit in chunk {
            cmap.push_str(&format!("<{:04X}> <{:04X}>\n", unit, unit));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");

    let to_unicode = doc.add_object(Stream::new(Dictionary::new(), cmap.into_bytes()));
    let cid_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "NanumGothic",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "DW" => 1000,
    });
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "NanumGothic",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font)],
        "ToUnicode" => to_unicode,
    })
}

/// A long-term insurance form with the agent line on `page` of `pages`.
///
/// The agent line reads `보험모집인  홍길동  (서명/인)` at y = 200.
pub fn long_term_form(pages: usize, page: usize) -> Vec<u8> {
    let mut builder = KoreanPdfBuilder::new();
    for index in 0..pages {
        let mut lines = vec![line("장기보험 청약서", 72.0, 780.0)];
        if index == page {
            lines.push(line("보험모집인", 100.0, 200.0));
            lines.push(line("홍길동", 220.0, 200.0));
            lines.push(line("(서명/인)", 300.0, 201.0));
        }
        builder = builder.page(lines);
    }
    builder.build()
}

/// Minimal valid JPEG data (1x1 gray pixel)
pub const MINIMAL_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x01, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06, 0x05, 0x08,
    0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D, 0x0C, 0x0B, 0x0B, 0x0C, 0x19, 0x12,
    0x13, 0x0F, 0x14, 0x1D, 0x1A, 0x1F, 0x1E, 0x1D, 0x1A, 0x1C, 0x1C, 0x20, 0x24, 0x2E, 0x27, 0x20,
    0x22, 0x2C, 0x23, 0x1C, 0x1C, 0x28, 0x37, 0x29, 0x2C, 0x30, 0x31, 0x34, 0x34, 0x34, 0x1F, 0x27,
    0x39, 0x3D, 0x38, 0x32, 0x3C, 0x2E, 0x33, 0x34, 0x32, 0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01,
    0x00, 0x01, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xC4, 0x00, 0x1F, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04,
    0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F,
    0x00, 0xFB, 0xD5, 0xDB, 0x20, 0xA8, 0xF1, 0x47, 0xFF, 0xD9,
];

/// Create a minimal RGBA PNG in memory. `alpha` applies to every pixel.
pub fn create_test_png(width: u32, height: u32, alpha: u8) -> Vec<u8> {
    let mut data = Vec::new();

    // PNG signature
    data.extend_from_slice(b"\x89PNG\r\n\x1a\n");

    let mut raw_pixels = Vec::new();
    for _ in 0..height {
        raw_pixels.push(0); // Filter byte (None)
        for _ in 0..width {
            raw_pixels.extend_from_slice(&[20, 20, 160, alpha]);
        }
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&raw_pixels).unwrap();
    let compressed = encoder.finish().unwrap();

    fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], chunk_data: &[u8]) {
        out.extend_from_slice(&(chunk_data.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(chunk_data);
        let mut crc_data = Vec::new();
        crc_data.extend_from_slice(chunk_type);
        crc_data.extend_from_slice(chunk_data);
        out.extend_from_slice(&crc32fast::hash(&crc_data).to_be_bytes());
    }

    let mut ihdr_data = Vec::new();
    ihdr_data.extend_from_slice(&width.to_be_bytes());
    ihdr_data.extend_from_slice(&height.to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(6); // color type (RGBA)
    ihdr_data.push(0); // compression
    ihdr_data.push(0); // filter
    ihdr_data.push(0); // interlace
    write_chunk(&mut data, b"IHDR", &ihdr_data);
    write_chunk(&mut data, b"IDAT", &compressed);
    write_chunk(&mut data, b"IEND", &[]);

    data
}
