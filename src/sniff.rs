//! Magic-number classification of raw input buffers.
//!
//! Documents fetched over HTTP sometimes arrive with a BOM, whitespace or a
//! whole HTML error page in front of the real PDF body. The helpers here find
//! the `%PDF-` header inside a bounded window and slice the garbage away, and
//! recognise the two supported signature image formats.

use crate::error::{Error, Result};
use crate::writer::ImageFormat;

/// The PDF file signature.
pub const PDF_SIGNATURE: &[u8; 5] = b"%PDF-";

/// Default number of leading positions searched for [`PDF_SIGNATURE`].
pub const PDF_HEADER_SCAN_LIMIT: usize = 1024;

const PNG_PREFIX: [u8; 3] = [0x89, b'P', b'N'];
const PNG_MIN_LEN: usize = 8;
const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// What an input buffer is supposed to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// The document to sign
    Pdf,
    /// The signature image to stamp
    SignatureImage,
}

/// Find the offset of the `%PDF-` header.
///
/// Candidate offsets `0..=max_scan` are checked; a match must fit entirely
/// inside the buffer. Returns `None` when no header starts in that window.
///
/// # Examples
///
/// ```
/// use pdf_seal::sniff::detect_pdf_header_offset;
///
/// assert_eq!(detect_pdf_header_offset(b"\xEF\xBB\xBF%PDF-1.7", 1024), Some(3));
/// assert_eq!(detect_pdf_header_offset(b"<html>", 1024), None);
/// ```
pub fn detect_pdf_header_offset(bytes: &[u8], max_scan: usize) -> Option<usize> {
    let window_end = bytes
        .len()
        .min(max_scan.saturating_add(PDF_SIGNATURE.len()));
    bytes[..window_end]
        .windows(PDF_SIGNATURE.len())
        .position(|w| w == PDF_SIGNATURE)
}

/// True if a PDF header occurs within the default scan window.
pub fn is_pdf(bytes: &[u8]) -> bool {
    detect_pdf_header_offset(bytes, PDF_HEADER_SCAN_LIMIT).is_some()
}

/// Strip any prefix in front of the PDF header.
///
/// Returns the input itself when the header is at offset 0.
pub fn normalize_pdf(bytes: &[u8]) -> Result<&[u8]> {
    normalize_pdf_with_limit(bytes, PDF_HEADER_SCAN_LIMIT)
}

/// [`normalize_pdf`] with an explicit scan window.
pub fn normalize_pdf_with_limit(bytes: &[u8], max_scan: usize) -> Result<&[u8]> {
    match detect_pdf_header_offset(bytes, max_scan) {
        Some(0) => Ok(bytes),
        Some(offset) => {
            log::debug!("Dropping {} bytes in front of the PDF header", offset);
            Ok(&bytes[offset..])
        },
        None => Err(Error::InvalidFormat {
            scanned: bytes.len().min(max_scan.saturating_add(PDF_SIGNATURE.len())),
        }),
    }
}

/// PNG check: at least 8 bytes starting with `0x89 'P' 'N'`.
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.len() >= PNG_MIN_LEN && bytes[..3] == PNG_PREFIX
}

/// JPEG check: starts with the SOI marker `FF D8 FF`.
pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= JPEG_SOI.len() && bytes[..3] == JPEG_SOI
}

/// Identify the signature image format, PNG first.
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    if is_png(bytes) {
        Some(ImageFormat::Png)
    } else if is_jpeg(bytes) {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

/// Check that `bytes` plausibly holds `kind`.
///
/// `content_type` is whatever the supplier declared (an HTTP header, a file
/// picker MIME type); it only decorates the error message.
pub fn validate(bytes: &[u8], kind: InputKind, content_type: Option<&str>) -> Result<()> {
    validate_with_limit(bytes, kind, content_type, PDF_HEADER_SCAN_LIMIT)
}

/// [`validate`] with an explicit PDF header scan window.
pub fn validate_with_limit(
    bytes: &[u8],
    kind: InputKind,
    content_type: Option<&str>,
    max_scan: usize,
) -> Result<()> {
    let hint = || content_type.filter(|ct| !ct.is_empty()).map(str::to_string);
    match kind {
        InputKind::Pdf if detect_pdf_header_offset(bytes, max_scan).is_none() => Err(Error::NotAPdf {
            content_type: hint(),
        }),
        InputKind::SignatureImage if detect_image_format(bytes).is_none() => {
            Err(Error::UnsupportedImageFormat {
                content_type: hint(),
            })
        },
        _ => Ok(()),
    }
}
