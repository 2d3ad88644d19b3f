//! Insurance form classification.
//!
//! The three supported form families are told apart by a product-category
//! phrase on the first page. The family decides which role keyword marks the
//! agent's signature line.

use std::fmt;

use serde::{Deserialize, Serialize};

const AUTO_PRODUCT: &str = "자동차보험상품";
const GENERAL_PRODUCT: &str = "일반보험상품";
const LONG_TERM_PRODUCT: &str = "보험상품";

/// Role keyword on long-term forms ("insurance solicitor").
pub const LONG_TERM_KEYWORD: &str = "보험모집인";
/// Role keyword on auto and general forms ("planner").
pub const PLANNER_KEYWORD: &str = "설계사";

/// Form family of an insurance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocType {
    /// Long-term insurance products (장기)
    #[default]
    LongTerm,
    /// Automobile insurance products (자동차)
    Auto,
    /// General insurance products (일반)
    General,
}

impl DocType {
    /// Keyword that identifies the agent line on this form.
    pub fn anchor_keyword(self) -> &'static str {
        match self {
            DocType::LongTerm => LONG_TERM_KEYWORD,
            DocType::Auto | DocType::General => PLANNER_KEYWORD,
        }
    }

    /// Korean label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            DocType::LongTerm => "장기",
            DocType::Auto => "자동차",
            DocType::General => "일반",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a document from the concatenated text of its first page.
///
/// The auto phrase is checked first because the long-term phrase is a
/// substring of both others. Text matching nothing is treated as long-term.
///
/// # Examples
///
/// ```
/// use pdf_seal::classifier::{classify, DocType};
///
/// assert_eq!(classify("자동차보험상품 설명서"), DocType::Auto);
/// assert_eq!(classify("일반보험상품 설명서"), DocType::General);
/// assert_eq!(classify("보험상품 설명서"), DocType::LongTerm);
/// assert_eq!(classify(""), DocType::LongTerm);
/// ```
pub fn classify(first_page_text: &str) -> DocType {
    let doc_type = if first_page_text.contains(AUTO_PRODUCT) {
        DocType::Auto
    } else if first_page_text.contains(GENERAL_PRODUCT) {
        DocType::General
    } else if first_page_text.contains(LONG_TERM_PRODUCT) {
        DocType::LongTerm
    } else {
        DocType::default()
    };
    log::debug!(
        "Detected form: {} (anchor keyword: {})",
        doc_type,
        doc_type.anchor_keyword()
    );
    doc_type
}
