//! The signing pipeline.
//!
//! ```text
//! PDF bytes ── validate ── normalize ── load ──┬── classify page 1 ── resolve anchor ──┐
//! image bytes ── validate ── embed ────────────┴────────────── compute placement ──────┴── draw ── save
//! ```
//!
//! A missing signature line is not a failure: the image lands in the fallback
//! box on the last page and [`SignOutcome::status_message`] says so.

use std::path::Path;

use crate::anchor::{Anchor, AnchorResolver};
use crate::classifier::DocType;
use crate::config::SignConfig;
use crate::document::SealDocument;
use crate::error::{Error, Result};
use crate::placement::{PlacementBox, PlacementCalculator, SigningParameters};
use crate::sniff::{self, InputKind};
use crate::text::TextRunSource;
use crate::writer::{Compositor, ImageFormat};

/// Suffix appended to the stem of the signed file's name.
pub const OUTPUT_SUFFIX: &str = "_추가서명.pdf";

/// Inputs of one signing operation.
#[derive(Debug, Clone, Copy)]
pub struct SignRequest<'a> {
    /// Raw PDF bytes, possibly with garbage before the header
    pub pdf: &'a [u8],
    /// Declared content type of the PDF, for error messages
    pub pdf_content_type: Option<&'a str>,
    /// PNG or JPEG signature image
    pub image: &'a [u8],
    /// Declared content type of the image, for error messages
    pub image_content_type: Option<&'a str>,
    /// User adjustments
    pub params: SigningParameters,
}

impl<'a> SignRequest<'a> {
    /// Request with default parameters and no content-type hints.
    pub fn new(pdf: &'a [u8], image: &'a [u8]) -> Self {
        Self {
            pdf,
            pdf_content_type: None,
            image,
            image_content_type: None,
            params: SigningParameters::default(),
        }
    }

    /// Set the user adjustments.
    pub fn with_params(mut self, params: SigningParameters) -> Self {
        self.params = params;
        self
    }

    /// Set the declared content types.
    pub fn with_content_types(mut self, pdf: Option<&'a str>, image: Option<&'a str>) -> Self {
        self.pdf_content_type = pdf;
        self.image_content_type = image;
        self
    }
}

/// Result of a successful signing operation.
#[derive(Debug, Clone)]
pub struct SignOutcome {
    /// The signed document
    pub pdf: Vec<u8>,
    /// Where the signature line was found, if anywhere
    pub anchor: Option<Anchor>,
    /// Form family detected from page 1
    pub doc_type: DocType,
    /// Where the image was drawn
    pub placement: PlacementBox,
}

impl SignOutcome {
    /// True when the signature was placed on a detected signature line.
    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    /// Human-readable status line for the user.
    pub fn status_message(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!(
                "완료! [{}] 양식을 감지하여 서명을 배치했습니다.",
                anchor.doc_type.label()
            ),
            None => "완료! 문구 탐색 실패로 기본 위치에 서명을 배치했습니다.".to_string(),
        }
    }
}

/// Name for the signed copy of `original`: the last non-empty `.ext` of the
/// file name is replaced by [`OUTPUT_SUFFIX`].
///
/// # Examples
///
/// ```
/// use pdf_seal::signer::output_file_name;
///
/// assert_eq!(output_file_name("청약서.v2.pdf"), "청약서.v2_추가서명.pdf");
/// assert_eq!(output_file_name("form"), "form_추가서명.pdf");
/// ```
pub fn output_file_name(original: &str) -> String {
    let file_name = Path::new(original)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| original.to_string());
    let stem = match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => &file_name[..dot],
        _ => file_name.as_str(),
    };
    format!("{}{}", stem, OUTPUT_SUFFIX)
}

/// Runs the signing pipeline with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Signer {
    config: SignConfig,
    resolver: AnchorResolver,
    calculator: PlacementCalculator,
}

impl Signer {
    /// Create a signer.
    pub fn new(config: SignConfig) -> Self {
        Self {
            resolver: AnchorResolver::new(config.anchor.clone()),
            calculator: PlacementCalculator::new(config.placement.clone()),
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SignConfig {
        &self.config
    }

    /// Validate the inputs, then sign the PDF with lopdf.
    pub fn sign(&self, request: &SignRequest<'_>) -> Result<SignOutcome> {
        let limit = self.config.pdf_header_scan_limit;
        sniff::validate_with_limit(request.pdf, InputKind::Pdf, request.pdf_content_type, limit)?;
        let pdf = sniff::normalize_pdf_with_limit(request.pdf, limit)?;
        sniff::validate(request.image, InputKind::SignatureImage, request.image_content_type)?;
        let format = sniff::detect_image_format(request.image).ok_or_else(|| {
            Error::UnsupportedImageFormat {
                content_type: request.image_content_type.map(str::to_string),
            }
        })?;

        let document = SealDocument::load(pdf)?;
        self.sign_document(document, request.image, format, &request.params)
    }

    /// Sign an already-open document.
    pub fn sign_document<D>(
        &self,
        mut document: D,
        image: &[u8],
        format: ImageFormat,
        params: &SigningParameters,
    ) -> Result<SignOutcome>
    where
        D: TextRunSource + Compositor,
    {
        let page_count = TextRunSource::page_count(&document);
        if page_count == 0 {
            return Err(Error::EmptyDocument);
        }

        let (doc_type, anchor) = self.resolver.classify_and_resolve(&document)?;
        log::info!(
            "Document type {} ({}), anchor {}",
            doc_type,
            doc_type.anchor_keyword(),
            if anchor.is_some() { "found" } else { "not found" }
        );

        let embedded = document.embed_image(image, format)?;
        let page_index = PlacementCalculator::target_page(anchor.as_ref(), page_count);
        let page_size = document.page_size(page_index)?;
        let placement = self.calculator.compute(
            anchor.as_ref(),
            embedded.metrics(),
            params,
            page_index,
            page_size,
        );

        document.draw_image(
            page_index,
            &embedded,
            &placement,
            self.calculator.config().opacity,
        )?;
        let pdf = document.serialize()?;
        log::info!("Signed PDF written ({} bytes)", pdf.len());

        Ok(SignOutcome {
            pdf,
            anchor,
            doc_type,
            placement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PageSize;
    use crate::text::{PageRuns, TextRun};
    use crate::writer::EmbeddedImage;

    /// Records draw calls instead of writing a PDF.
    struct Recording {
        runs: PageRuns,
        drawn: Vec<(usize, PlacementBox, f64)>,
        fail_embed: bool,
    }

    impl Recording {
        fn new(pages: Vec<Vec<TextRun>>) -> Self {
            Self {
                runs: PageRuns::new(pages),
                drawn: Vec::new(),
                fail_embed: false,
            }
        }
    }

    impl Compositor for &mut Recording {
        fn page_count(&self) -> usize {
            self.runs.page_count()
        }

        fn page_size(&self, _page_index: usize) -> Result<PageSize> {
            Ok(PageSize::new(595.0, 842.0))
        }

        fn embed_image(&mut self, _bytes: &[u8], _format: ImageFormat) -> Result<EmbeddedImage> {
            if self.fail_embed {
                return Err(Error::Image(crate::writer::ImageError::DecodeError(
                    "broken".to_string(),
                )));
            }
            Ok(EmbeddedImage {
                id: (1, 0),
                width: 200,
                height: 100,
            })
        }

        fn draw_image(
            &mut self,
            page_index: usize,
            _image: &EmbeddedImage,
            placement: &PlacementBox,
            opacity: f64,
        ) -> Result<()> {
            self.drawn.push((page_index, *placement, opacity));
            Ok(())
        }

        fn serialize(self) -> Result<Vec<u8>> {
            Ok(b"%PDF-signed".to_vec())
        }
    }

    impl TextRunSource for &mut Recording {
        fn page_count(&self) -> usize {
            self.runs.page_count()
        }

        fn page_runs(&self, page_index: usize) -> Result<Vec<TextRun>> {
            self.runs.page_runs(page_index)
        }
    }

    fn agent_line(page: usize) -> Vec<TextRun> {
        vec![
            TextRun::new("보험모집인", 60.0, 150.0, 50.0, page),
            TextRun::new("홍길동", 200.0, 150.0, 30.0, page),
            TextRun::new("(서명/인)", 300.0, 151.0, 40.0, page),
        ]
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("contract.pdf"), "contract_추가서명.pdf");
        assert_eq!(output_file_name("dir/계약서.PDF"), "계약서_추가서명.pdf");
        assert_eq!(output_file_name(".hidden"), "_추가서명.pdf");
        assert_eq!(output_file_name("form."), "form._추가서명.pdf");
        assert_eq!(output_file_name("a.b/form"), "form_추가서명.pdf");
    }

    #[test]
    fn test_anchored_signing() {
        let mut doc = Recording::new(vec![vec![], agent_line(1)]);
        let outcome = Signer::default()
            .sign_document(&mut doc, b"", ImageFormat::Png, &SigningParameters::new())
            .unwrap();

        assert!(outcome.is_anchored());
        assert_eq!(outcome.doc_type, DocType::LongTerm);
        assert_eq!(outcome.placement.page_index, 1);
        assert_eq!(outcome.pdf, b"%PDF-signed");
        assert_eq!(
            outcome.status_message(),
            "완료! [장기] 양식을 감지하여 서명을 배치했습니다."
        );

        let (page, placement, opacity) = doc.drawn[0];
        assert_eq!(page, 1);
        assert_eq!(opacity, 1.0);
        assert_eq!((placement.width, placement.height), (120.0, 60.0));
        assert_eq!(placement.x, 320.0 - 60.0);
        assert_eq!(placement.y, 156.0 - 30.0);
    }

    #[test]
    fn test_fallback_goes_to_last_page() {
        let mut doc = Recording::new(vec![vec![TextRun::new("약관", 0.0, 0.0, 10.0, 0)], vec![]]);
        let outcome = Signer::default()
            .sign_document(&mut doc, b"", ImageFormat::Jpeg, &SigningParameters::new())
            .unwrap();

        assert!(!outcome.is_anchored());
        assert_eq!(outcome.placement.page_index, 1);
        assert_eq!((outcome.placement.x, outcome.placement.y), (420.0, 72.0));
        assert_eq!(
            outcome.status_message(),
            "완료! 문구 탐색 실패로 기본 위치에 서명을 배치했습니다."
        );
    }

    #[test]
    fn test_empty_document() {
        let mut doc = Recording::new(vec![]);
        let result =
            Signer::default().sign_document(&mut doc, b"", ImageFormat::Png, &SigningParameters::new());
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_embed_failure_propagates() {
        let mut doc = Recording::new(vec![agent_line(0)]);
        doc.fail_embed = true;
        let result =
            Signer::default().sign_document(&mut doc, b"", ImageFormat::Png, &SigningParameters::new());
        assert!(matches!(result, Err(Error::Image(_))));
        assert!(doc.drawn.is_empty());
    }

    #[test]
    fn test_sign_rejects_html() {
        let request = SignRequest::new(b"<html>login</html>", b"\x89PNG\r\n\x1a\n")
            .with_content_types(Some("text/html"), None);
        let err = Signer::default().sign(&request).unwrap_err();
        assert!(matches!(err, Error::NotAPdf { .. }));
        assert!(err.to_string().contains("text/html"));
    }

    #[test]
    fn test_sign_rejects_unknown_image() {
        let request = SignRequest::new(b"%PDF-1.4", b"GIF89a....")
            .with_content_types(None, Some("image/gif"));
        let err = Signer::default().sign(&request).unwrap_err();
        assert!(matches!(err, Error::UnsupportedImageFormat { .. }));
        assert!(err.to_string().contains("image/gif"));
    }
}
