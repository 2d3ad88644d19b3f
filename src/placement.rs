//! Placement of the signature image.
//!
//! The image is scaled to the requested width (keeping its aspect ratio) and
//! centred on the anchor marker: horizontally on the marker's middle,
//! vertically on the glyph centre, estimated as a fixed offset above the
//! baseline. Without an anchor a fixed bottom-right box on the last page is
//! used. The result is always clamped inside the page.

use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;

/// Tuning knobs for placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Width used when the user gives none
    pub default_width: f64,
    /// Distance from baseline to glyph centre (about half a text line)
    pub baseline_center_offset: f64,
    /// Left edge of the fallback box
    pub fallback_x: f64,
    /// Bottom edge of the fallback box
    pub fallback_y: f64,
    /// Opacity passed to the compositor
    pub opacity: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            default_width: 120.0,
            baseline_center_offset: 5.0,
            fallback_x: 420.0,
            fallback_y: 72.0,
            opacity: 1.0,
        }
    }

    /// Set the default signature width.
    pub fn with_default_width(mut self, width: f64) -> Self {
        self.default_width = width;
        self
    }

    /// Set the baseline-to-centre offset.
    pub fn with_baseline_center_offset(mut self, offset: f64) -> Self {
        self.baseline_center_offset = offset;
        self
    }

    /// Set the fallback box origin.
    pub fn with_fallback_origin(mut self, x: f64, y: f64) -> Self {
        self.fallback_x = x;
        self.fallback_y = y;
        self
    }

    /// Set the drawing opacity (clamped to 0..=1 when drawn).
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// User-supplied size and offsets.
///
/// Absent fields fall back to [`PlacementConfig::default_width`] and zero
/// offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SigningParameters {
    /// Requested signature width in points
    pub desired_width: Option<f64>,
    /// Horizontal nudge in points (positive: right)
    pub offset_x: Option<f64>,
    /// Vertical nudge in points (positive: up)
    pub offset_y: Option<f64>,
}

impl SigningParameters {
    /// Parameters with every field absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.desired_width = Some(width);
        self
    }

    /// Set both offsets.
    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset_x = Some(dx);
        self.offset_y = Some(dy);
        self
    }

    /// Parse raw form-field strings.
    ///
    /// Empty, non-numeric, non-finite and zero inputs count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_seal::placement::SigningParameters;
    ///
    /// let params = SigningParameters::from_inputs("150", "abc", "-4.5");
    /// assert_eq!(params.desired_width, Some(150.0));
    /// assert_eq!(params.offset_x, None);
    /// assert_eq!(params.offset_y, Some(-4.5));
    /// ```
    pub fn from_inputs(width: &str, offset_x: &str, offset_y: &str) -> Self {
        Self {
            desired_width: parse_field(width),
            offset_x: parse_field(offset_x),
            offset_y: parse_field(offset_y),
        }
    }

    fn width_or(&self, default: f64) -> f64 {
        self.desired_width.filter(|w| usable(*w) && *w > 0.0).unwrap_or(default)
    }

    fn offsets(&self) -> (f64, f64) {
        let pick = |v: Option<f64>| v.filter(|v| usable(*v)).unwrap_or(0.0);
        (pick(self.offset_x), pick(self.offset_y))
    }
}

fn usable(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

fn parse_field(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| usable(*v))
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Page width
    pub width: f64,
    /// Page height
    pub height: f64,
}

impl PageSize {
    /// Create a new page size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Natural pixel size of the signature image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetrics {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageMetrics {
    /// Create new image metrics.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height / width, or 1 for a degenerate image.
    pub fn height_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.height as f64 / self.width as f64
        }
    }
}

/// Final rectangle for drawing the signature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementBox {
    /// 0-based target page
    pub page_index: usize,
    /// Left edge
    pub x: f64,
    /// Bottom edge
    pub y: f64,
    /// Drawn width
    pub width: f64,
    /// Drawn height
    pub height: f64,
}

/// Computes [`PlacementBox`]es.
#[derive(Debug, Clone, Default)]
pub struct PlacementCalculator {
    config: PlacementConfig,
}

impl PlacementCalculator {
    /// Create a calculator with the given configuration.
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Page the signature goes on: the anchor's, else the last page.
    pub fn target_page(anchor: Option<&Anchor>, page_count: usize) -> usize {
        anchor.map_or(page_count.saturating_sub(1), |a| a.page_index)
    }

    /// Compute the drawing box on a page of size `page`.
    ///
    /// `page` must be the size of [`Self::target_page`]. A signature larger
    /// than the page is scaled down, keeping its aspect ratio, so that the
    /// box always fits.
    pub fn compute(
        &self,
        anchor: Option<&Anchor>,
        image: ImageMetrics,
        params: &SigningParameters,
        page_index: usize,
        page: PageSize,
    ) -> PlacementBox {
        let (dx, dy) = params.offsets();
        let (width, height) = fit_to_page(params.width_or(self.config.default_width), image, page);

        let (x, y) = match anchor {
            Some(anchor) => {
                let x = anchor.x + anchor.width / 2.0 - width / 2.0 + dx;
                let text_center_y = anchor.y + self.config.baseline_center_offset;
                (x, text_center_y - height / 2.0 + dy)
            },
            None => (self.config.fallback_x + dx, self.config.fallback_y + dy),
        };

        let placement = PlacementBox {
            page_index,
            x: clamp_axis(x, page.width - width),
            y: clamp_axis(y, page.height - height),
            width,
            height,
        };
        log::debug!(
            "Placement on page {}: x={:.2} y={:.2} w={:.2} h={:.2}",
            placement.page_index,
            placement.x,
            placement.y,
            placement.width,
            placement.height
        );
        placement
    }
}

/// Scale `(width, width * ratio)`, shrinking if it exceeds the page.
fn fit_to_page(width: f64, image: ImageMetrics, page: PageSize) -> (f64, f64) {
    let ratio = image.height_ratio();
    let mut width = width;
    let mut height = width * ratio;

    if page.width > 0.0 && width > page.width {
        width = page.width;
        height = width * ratio;
    }
    if page.height > 0.0 && height > page.height {
        height = page.height;
        width = height / ratio;
    }
    (width, height)
}

/// `max(0, min(value, upper))`, which tolerates `upper < 0`.
fn clamp_axis(value: f64, upper: f64) -> f64 {
    value.min(upper).max(0.0)
}
