//! Signature-line anchor resolution.
//!
//! The agent line of a form reads like `보험모집인 ... 홍길동 (서명/인)`: a role
//! keyword followed, further right on the same baseline, by a signature/seal
//! marker. The resolver finds the first such marker in document order:
//!
//! 1. pages in ascending order, stopping at the first page with a hit;
//! 2. on a page, base runs containing the keyword in content-stream order;
//! 3. for each base run, runs on the same line at or right of it, in
//!    content-stream order, until one carries a marker.
//!
//! When a run holds both a name and the marker (`조정국(서명/인)`), the returned
//! box is narrowed proportionally to the marker part.

use serde::{Deserialize, Serialize};

use crate::classifier::{classify, DocType};
use crate::error::Result;
use crate::text::{join_text, TextRun, TextRunSource};

/// Marker substrings, checked against whitespace-stripped run text.
const SIGNATURE_MARKERS: [&str; 2] = ["(서명/인)", "서명/인"];
/// Marker suffix, e.g. a bare `(인)`.
const SIGNATURE_SUFFIX: &str = "인)";

/// Tuning knobs for anchor resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Maximum baseline difference for two runs to count as one line.
    ///
    /// Empirical value for the supported form family; layout engines emit
    /// sub-point jitter between visually aligned runs.
    pub line_tolerance: f64,
    /// Width assumed for a marker run that reports no width.
    pub fallback_marker_width: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AnchorConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            line_tolerance: 5.0,
            fallback_marker_width: 40.0,
        }
    }

    /// Set the same-line baseline tolerance.
    pub fn with_line_tolerance(mut self, tolerance: f64) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the width used for zero-width marker runs.
    pub fn with_fallback_marker_width(mut self, width: f64) -> Self {
        self.fallback_marker_width = width;
        self
    }
}

/// Resolved position of the signature marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// 0-based page of the marker
    pub page_index: usize,
    /// Left edge of the marker part of the run
    pub x: f64,
    /// Baseline of the marker run
    pub y: f64,
    /// Width of the marker part of the run
    pub width: f64,
    /// Full text of the matched run
    pub text: String,
    /// Form family the keyword was chosen from
    pub doc_type: DocType,
}

/// True if `text` carries a signature/seal marker.
///
/// # Examples
///
/// ```
/// use pdf_seal::anchor::is_signature_marker;
///
/// assert!(is_signature_marker("( 서명 / 인 )"));
/// assert!(is_signature_marker("홍길동 (인)"));
/// assert!(!is_signature_marker("서명"));
/// ```
pub fn is_signature_marker(text: &str) -> bool {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    SIGNATURE_MARKERS.iter().any(|m| compact.contains(m)) || compact.ends_with(SIGNATURE_SUFFIX)
}

/// Horizontal extent `(x, width)` of the marker inside `run`.
///
/// If the run's first `(` is not at the start, the prefix (usually the
/// signer's name) is cut off by its share of the run's characters.
pub fn marker_extent(run: &TextRun, fallback_width: f64) -> (f64, f64) {
    let mut x = run.x;
    let mut width = if run.width == 0.0 || run.width.is_nan() {
        fallback_width
    } else {
        run.width
    };

    let paren = run.text.chars().position(|c| c == '(');
    if let Some(paren) = paren.filter(|&idx| idx > 0) {
        let ratio = paren as f64 / run.text.chars().count() as f64;
        x += width * ratio;
        width *= 1.0 - ratio;
    }

    (x, width)
}

/// Finds the signature anchor in a document's text runs.
#[derive(Debug, Clone, Default)]
pub struct AnchorResolver {
    config: AnchorConfig,
}

impl AnchorResolver {
    /// Create a resolver with the given configuration.
    pub fn new(config: AnchorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Classify the document from page 1, then resolve its anchor.
    ///
    /// The classification is returned even when no anchor is found. An
    /// empty document classifies as the default family.
    pub fn classify_and_resolve<S: TextRunSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(DocType, Option<Anchor>)> {
        let doc_type = if source.page_count() > 0 {
            classify(&join_text(&source.page_runs(0)?))
        } else {
            DocType::default()
        };
        let anchor = self.resolve(source, doc_type)?;
        Ok((doc_type, anchor))
    }

    /// Scan pages in order and return the first marker on the keyword line.
    ///
    /// `Ok(None)` means no page matched; callers fall back to a default box.
    pub fn resolve<S: TextRunSource + ?Sized>(
        &self,
        source: &S,
        doc_type: DocType,
    ) -> Result<Option<Anchor>> {
        let keyword = doc_type.anchor_keyword();

        for page_index in 0..source.page_count() {
            let runs = source.page_runs(page_index)?;
            if let Some(run) = self.find_marker(&runs, keyword) {
                let (x, width) = marker_extent(run, self.config.fallback_marker_width);
                let anchor = Anchor {
                    page_index,
                    x,
                    y: run.y,
                    width,
                    text: run.text.clone(),
                    doc_type,
                };
                log::debug!(
                    "Anchor on page {}: '{}' at ({:.2}, {:.2}) width {:.2}",
                    page_index,
                    anchor.text,
                    anchor.x,
                    anchor.y,
                    anchor.width
                );
                return Ok(Some(anchor));
            }
        }

        log::warn!("No '{}' signature line found; falling back to default placement", keyword);
        Ok(None)
    }

    /// First marker run on the line of any keyword run, in source order.
    pub fn find_marker<'a>(&self, runs: &'a [TextRun], keyword: &str) -> Option<&'a TextRun> {
        let tolerance = self.config.line_tolerance;
        runs.iter()
            .filter(|run| run.text.contains(keyword))
            .find_map(|base| {
                runs.iter()
                    .filter(|run| (run.y - base.y).abs() < tolerance && run.x >= base.x)
                    .find(|run| is_signature_marker(&run.text))
            })
    }
}
