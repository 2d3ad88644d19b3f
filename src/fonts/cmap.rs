//! ToUnicode CMap parser.
//!
//! A ToUnicode CMap maps the character codes a font's strings are written in
//! to Unicode text. Only the parts needed for extraction are read:
//! `codespacerange` (to learn the code width), `bfchar` and `bfrange`.

use regex::Regex;
use std::collections::HashMap;

/// Upper bound on the number of codes expanded from one bfrange.
const MAX_RANGE_EXPANSION: u32 = 0xFFFF;

/// Parsed ToUnicode mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CMap {
    mappings: HashMap<u32, String>,
    code_bytes: Option<usize>,
}

impl CMap {
    /// Unicode text for `code`, if mapped.
    pub fn get(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Code width in bytes declared by the first `codespacerange` entry.
    pub fn code_bytes(&self) -> Option<usize> {
        self.code_bytes
    }

    /// Number of mapped codes.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// True if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Parse a (decompressed) ToUnicode CMap stream.
///
/// Malformed lines are skipped; the parser never fails.
///
/// # Examples
///
/// ```
/// use pdf_seal::fonts::parse_tounicode_cmap;
///
/// let cmap = parse_tounicode_cmap(b"beginbfchar\n<0001> <C11C>\nendbfchar");
/// assert_eq!(cmap.get(0x01), Some("서"));
/// ```
pub fn parse_tounicode_cmap(data: &[u8]) -> CMap {
    lazy_static::lazy_static! {
        static ref CODESPACE: Regex = Regex::new(r"<([0-9A-Fa-f]+)>\s*<[0-9A-Fa-f]+>").unwrap();
    }

    let content = String::from_utf8_lossy(data);
    let mut cmap = CMap::default();

    cmap.code_bytes = extract_sections(&content, "begincodespacerange", "endcodespacerange")
        .into_iter()
        .find_map(|section| CODESPACE.captures(section))
        .map(|caps| caps[1].len().div_ceil(2));

    for section in extract_sections(&content, "beginbfchar", "endbfchar") {
        for (src, dst) in parse_bfchar_section(section) {
            log::trace!("ToUnicode bfchar: 0x{:04X} -> {:?}", src, dst);
            cmap.mappings.insert(src, dst);
        }
    }

    for section in extract_sections(&content, "beginbfrange", "endbfrange") {
        for (src, dst) in parse_bfrange_section(section) {
            cmap.mappings.insert(src, dst);
        }
    }

    cmap
}

/// Bodies between each `begin` ... `end` marker pair.
fn extract_sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut sections = Vec::new();
    let mut remaining = content;

    while let Some(begin_pos) = remaining.find(begin) {
        let after_begin = &remaining[begin_pos + begin.len()..];
        match after_begin.find(end) {
            Some(end_pos) => {
                sections.push(&after_begin[..end_pos]);
                remaining = &after_begin[end_pos + end.len()..];
            },
            None => break,
        }
    }

    sections
}

/// `<src> <dst>` pairs; several pairs may share a line.
fn parse_bfchar_section(section: &str) -> Vec<(u32, String)> {
    lazy_static::lazy_static! {
        static ref PAIR: Regex = Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]*)>").unwrap();
    }

    PAIR.captures_iter(section)
        .filter_map(|caps| {
            let src = u32::from_str_radix(&caps[1], 16).ok()?;
            let dst = decode_destination(&utf16_units(&caps[2])?)?;
            Some((src, dst))
        })
        .collect()
}

/// bfrange entries, `<lo> <hi> <dst>` or `<lo> <hi> [<d0> <d1> ...]`; several
/// entries may share a line.
fn parse_bfrange_section(section: &str) -> Vec<(u32, String)> {
    lazy_static::lazy_static! {
        static ref RANGE: Regex = Regex::new(
            r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*(?:\[((?:\s*<[0-9A-Fa-f]*>\s*)*)\]|<([0-9A-Fa-f]+)>)"
        ).unwrap();
        static ref HEX: Regex = Regex::new(r"<([0-9A-Fa-f]*)>").unwrap();
    }

    let mut mappings = Vec::new();
    for caps in RANGE.captures_iter(section) {
        let (Ok(lo), Ok(hi)) = (
            u32::from_str_radix(&caps[1], 16),
            u32::from_str_radix(&caps[2], 16),
        ) else {
            continue;
        };
        if lo > hi {
            continue;
        }
        let span = (hi - lo).min(MAX_RANGE_EXPANSION);

        if let Some(array) = caps.get(3) {
            let entries: Vec<&str> = HEX
                .captures_iter(array.as_str())
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect();
            let expected = span as usize + 1;
            if entries.len() != expected {
                log::warn!(
                    "ToUnicode bfrange array size mismatch: expected {} entries for 0x{:X}-0x{:X}, got {}",
                    expected,
                    lo,
                    hi,
                    entries.len()
                );
            }
            mappings.extend(
                entries
                    .into_iter()
                    .take(expected)
                    .zip(lo..=hi)
                    .filter_map(|(hex, src)| Some((src, decode_destination(&utf16_units(hex)?)?))),
            );
        } else if let Some(base) = caps.get(4).and_then(|m| utf16_units(m.as_str())) {
            mappings.extend((0..=span).filter_map(|offset| {
                let mut units = base.clone();
                if let Some(last) = units.last_mut() {
                    *last = last.wrapping_add(offset as u16);
                }
                Some((lo + offset, decode_destination(&units)?))
            }));
        }
    }
    mappings
}

/// Split a destination hex string into big-endian UTF-16 code units.
///
/// Strings shorter than four digits are a single unit.
fn utf16_units(hex: &str) -> Option<Vec<u16>> {
    if hex.is_empty() {
        return None;
    }
    if hex.len() <= 4 {
        return u16::from_str_radix(hex, 16).ok().map(|unit| vec![unit]);
    }
    hex.as_bytes()
        .chunks(4)
        .map(|chunk| u16::from_str_radix(std::str::from_utf8(chunk).ok()?, 16).ok())
        .collect()
}

/// Decode UTF-16 units, replacing unpaired surrogates.
fn decode_destination(units: &[u16]) -> Option<String> {
    let text: String = char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bfchar_hangul() {
        let data = b"beginbfchar\n<0001> <BCF4>\n<0002> <D5D8>\nendbfchar";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.get(0x01), Some("보"));
        assert_eq!(cmap.get(0x02), Some("험"));
        assert_eq!(cmap.len(), 2);
    }

    #[test]
    fn test_parse_bfchar_pairs_on_one_line() {
        let data = b"beginbfchar <0041> <0041> <0042> <0042> endbfchar";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.get(0x41), Some("A"));
        assert_eq!(cmap.get(0x42), Some("B"));
    }

    #[test]
    fn test_parse_bfrange_sequential() {
        let data = b"beginbfrange\n<0020> <007E> <0020>\nendbfrange";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.get(0x20), Some(" "));
        assert_eq!(cmap.get(0x41), Some("A"));
        assert_eq!(cmap.get(0x7E), Some("~"));
        assert_eq!(cmap.len(), 0x5F);
    }

    #[test]
    fn test_parse_bfrange_array_ligatures() {
        let data =
            b"beginbfrange\n<005F> <0061> [<00660066> <00660069> <00660066006C>]\nendbfrange";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.get(0x5F), Some("ff"));
        assert_eq!(cmap.get(0x60), Some("fi"));
        assert_eq!(cmap.get(0x61), Some("ffl"));
    }

    #[test]
    fn test_parse_bfranges_on_one_line() {
        let data = b"2 beginbfrange <0001> <0002> <BCF4> <0003> <0004> <D5D8> endbfrange";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.get(0x01), Some("보"));
        assert_eq!(cmap.get(0x02), Some("복"));
        assert_eq!(cmap.get(0x03), Some("험"));
        assert_eq!(cmap.len(), 4);
    }

    #[test]
    fn test_parse_mixed_bfrange_forms_on_one_line() {
        let data = b"beginbfrange <0010> <0011> [<C11C> <BA85>] <0012> <0012> <C778> endbfrange";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.get(0x10), Some("서"));
        assert_eq!(cmap.get(0x11), Some("명"));
        assert_eq!(cmap.get(0x12), Some("인"));
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn test_full_width_bfrange_is_bounded() {
        let data = b"beginbfrange\n<00000000> <FFFFFFFF> [<0041> <0042>]\n<FFFFFFF0> <FFFFFFFF> <0041>\nendbfrange";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.get(0x00), Some("A"));
        assert_eq!(cmap.get(0x01), Some("B"));
        assert_eq!(cmap.get(0xFFFF_FFF0), Some("A"));
        assert_eq!(cmap.get(0xFFFF_FFFF), Some("P"));
    }

    #[test]
    fn test_surrogate_pair_destination() {
        let data = b"beginbfchar\n<0005> <D835DF0C>\nendbfchar";
        let cmap = parse_tounicode_cmap(data);
        assert_eq!(cmap.get(0x05), Some("\u{1D70C}"));
    }

    #[test]
    fn test_codespace_width() {
        let data = b"1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange";
        assert_eq!(parse_tounicode_cmap(data).code_bytes(), Some(2));

        let data = b"1 begincodespacerange\n<00> <FF>\nendcodespacerange";
        assert_eq!(parse_tounicode_cmap(data).code_bytes(), Some(1));

        assert_eq!(parse_tounicode_cmap(b"").code_bytes(), None);
    }

    #[test]
    fn test_inverted_range_is_ignored() {
        let data = b"beginbfrange\n<0043> <0041> <0041>\nendbfrange";
        assert!(parse_tounicode_cmap(data).is_empty());
    }

    #[test]
    fn test_extract_sections() {
        let content =
            "before\nbeginbfchar\ndata1\nendbfchar\nmiddle\nbeginbfchar\ndata2\nendbfchar\nafter";
        let sections = extract_sections(content, "beginbfchar", "endbfchar");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].contains("data1"));
        assert!(sections[1].contains("data2"));
    }

    #[test]
    fn test_unterminated_section() {
        let sections = extract_sections("beginbfchar <01> <41>", "beginbfchar", "endbfchar");
        assert!(sections.is_empty());
    }
}
