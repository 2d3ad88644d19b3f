//! Text extraction from PDF page content.
//!
//! Produces positioned [`TextRun`](crate::text::TextRun)s from lopdf pages.

pub mod text_runs;

pub use text_runs::extract_page_runs;
