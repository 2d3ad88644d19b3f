// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Seal
//!
//! Stamps a hand-written signature image onto Korean insurance forms.
//!
//! ## Core Features
//!
//! - **Input sniffing**: finds the `%PDF-` header behind BOMs or HTML error pages,
//!   recognises PNG and JPEG signatures
//! - **Form classification**: long-term, auto or general insurance, from page 1
//! - **Anchor resolution**: locates the `(서명/인)` marker on the agent's line
//!   (`보험모집인` or `설계사`)
//! - **Placement**: scales the image to the requested width and centres it on the
//!   marker, clamped inside the page; falls back to a fixed box on the last page
//! - **Compositing**: embeds the image as an XObject and draws it over the
//!   existing page content
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_seal::{SignConfig, SignRequest, Signer, SigningParameters};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pdf = std::fs::read("청약서.pdf")?;
//! let image = std::fs::read("signature.png")?;
//!
//! let request = SignRequest::new(&pdf, &image)
//!     .with_params(SigningParameters::from_inputs("150", "", "-3"));
//! let outcome = Signer::new(SignConfig::default()).sign(&request)?;
//!
//! println!("{}", outcome.status_message());
//! std::fs::write(pdf_seal::output_file_name("청약서.pdf"), &outcome.pdf)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Input validation
pub mod sniff;

// PDF object access and text extraction
pub mod document;
pub mod extractors;
pub mod fonts;
pub mod geometry;
pub mod object;
pub mod text;

// Signature line detection and placement
pub mod anchor;
pub mod classifier;
pub mod placement;

// PDF writing
pub mod writer;

// Configuration
pub mod config;

// Pipeline
pub mod signer;

// Re-exports
pub use anchor::{Anchor, AnchorConfig, AnchorResolver};
pub use classifier::{classify, DocType};
pub use config::SignConfig;
pub use document::SealDocument;
pub use error::{Error, Result};
pub use placement::{PageSize, PlacementBox, PlacementCalculator, PlacementConfig, SigningParameters};
pub use signer::{output_file_name, SignOutcome, SignRequest, Signer};
pub use text::{TextRun, TextRunSource};
pub use writer::{Compositor, EmbeddedImage, ImageFormat};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
