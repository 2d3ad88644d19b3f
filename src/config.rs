//! Configuration for signing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorConfig;
use crate::error::{Error, Result};
use crate::placement::PlacementConfig;
use crate::sniff::PDF_HEADER_SCAN_LIMIT;

/// Signing configuration.
///
/// Every field has a default, so a JSON file only needs the values it changes:
///
/// ```
/// use pdf_seal::SignConfig;
///
/// let config = SignConfig::from_json_str(r#"{ "placement": { "default_width": 90.0 } }"#).unwrap();
/// assert_eq!(config.placement.default_width, 90.0);
/// assert_eq!(config.anchor.line_tolerance, 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignConfig {
    /// Marker search settings.
    pub anchor: AnchorConfig,

    /// Image placement settings.
    pub placement: PlacementConfig,

    /// Leading bytes searched for the `%PDF-` header.
    pub pdf_header_scan_limit: usize,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SignConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            anchor: AnchorConfig::default(),
            placement: PlacementConfig::default(),
            pdf_header_scan_limit: PDF_HEADER_SCAN_LIMIT,
        }
    }

    /// Replace the marker search settings.
    pub fn with_anchor(mut self, anchor: AnchorConfig) -> Self {
        self.anchor = anchor;
        self
    }

    /// Replace the placement settings.
    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    /// Set the header scan window.
    pub fn with_pdf_header_scan_limit(mut self, limit: usize) -> Self {
        self.pdf_header_scan_limit = limit;
        self
    }

    /// Parse configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject values no document could use.
    pub fn validate(&self) -> Result<()> {
        let p = &self.placement;
        if !(p.default_width.is_finite() && p.default_width > 0.0) {
            return Err(Error::Config(format!(
                "placement.default_width must be positive, got {}",
                p.default_width
            )));
        }
        if !(0.0..=1.0).contains(&p.opacity) {
            return Err(Error::Config(format!(
                "placement.opacity must be within 0..=1, got {}",
                p.opacity
            )));
        }
        if !(self.anchor.line_tolerance.is_finite() && self.anchor.line_tolerance >= 0.0) {
            return Err(Error::Config(format!(
                "anchor.line_tolerance must be non-negative, got {}",
                self.anchor.line_tolerance
            )));
        }
        Ok(())
    }
}
