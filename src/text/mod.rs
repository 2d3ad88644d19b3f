//! Positioned text runs and the source that produces them.
//!
//! A [`TextRun`] is one string from a text-showing operator together with its
//! baseline origin and advance width in page user space (origin bottom-left,
//! y grows upward). Anchor resolution only ever reads runs through
//! [`TextRunSource`], so any PDF text layer can feed it.

use crate::error::{Error, Result};

/// A positioned fragment of page text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Decoded text
    pub text: String,
    /// Baseline origin, x
    pub x: f64,
    /// Baseline origin, y
    pub y: f64,
    /// Horizontal advance of the whole run
    pub width: f64,
    /// 0-based page the run belongs to
    pub page_index: usize,
}

impl TextRun {
    /// Create a new text run.
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64, page_index: usize) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            page_index,
        }
    }
}

/// Per-page access to positioned text.
pub trait TextRunSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Runs of page `page_index` (0-based) in content-stream order.
    fn page_runs(&self, page_index: usize) -> Result<Vec<TextRun>>;
}

/// Join the strings of `runs` with single spaces.
pub fn join_text(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|run| run.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// An in-memory [`TextRunSource`], one `Vec` of runs per page.
#[derive(Debug, Clone, Default)]
pub struct PageRuns {
    pages: Vec<Vec<TextRun>>,
}

impl PageRuns {
    /// Wrap already-extracted pages.
    pub fn new(pages: Vec<Vec<TextRun>>) -> Self {
        Self { pages }
    }

    /// Append a page and return its index.
    pub fn push_page(&mut self, runs: Vec<TextRun>) -> usize {
        self.pages.push(runs);
        self.pages.len() - 1
    }
}

impl TextRunSource for PageRuns {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_runs(&self, page_index: usize) -> Result<Vec<TextRun>> {
        self.pages
            .get(page_index)
            .cloned()
            .ok_or(Error::PageOutOfRange {
                index: page_index,
                count: self.pages.len(),
            })
    }
}
