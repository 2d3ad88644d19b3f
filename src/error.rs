//! Error types for the signing pipeline.
//!
//! Input validation failures, collaborator failures (PDF load/save, image
//! decoding) and configuration problems all surface as [`Error`]. A missing
//! signature line is not an error: placement falls back to a default box.

use crate::writer::ImageError;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while signing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No `%PDF-` header was found inside the scan window
    #[error(
        "No PDF header ('%PDF-') found in the first {scanned} bytes; the response may be an HTML or login page rather than a PDF"
    )]
    InvalidFormat {
        /// Number of leading bytes that were searched
        scanned: usize,
    },

    /// Byte signature check for a PDF failed
    #[error("Input is not a valid PDF file{}", content_type_suffix(.content_type))]
    NotAPdf {
        /// Content type declared by whoever supplied the bytes
        content_type: Option<String>,
    },

    /// Signature image is neither PNG nor JPEG
    #[error("Signature image must be a PNG or JPEG file{}", content_type_suffix(.content_type))]
    UnsupportedImageFormat {
        /// Content type declared by whoever supplied the bytes
        content_type: Option<String>,
    },

    /// Failure reported by the PDF object layer
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Failure while preparing the signature image
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Page index outside the document
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Requested 0-based page index
        index: usize,
        /// Number of pages in the document
        count: usize,
    },

    /// The document has no pages to sign
    #[error("PDF document has no pages")]
    EmptyDocument,

    /// Structurally invalid PDF content
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

fn content_type_suffix(content_type: &Option<String>) -> String {
    match content_type.as_deref() {
        Some(ct) if !ct.is_empty() => format!(" (content type: {})", ct),
        _ => String::new(),
    }
}
