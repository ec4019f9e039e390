use std::path::PathBuf;

use chrono::Datelike;

use crate::data::schema::RecordHeader;
use crate::render::RenderError;

// ---------------------------------------------------------------------------
// Rendering configuration
// ---------------------------------------------------------------------------

/// Output encodings supported by the plotting backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Svg,
}

impl ImageFormat {
    /// Parse an `imgFormat` value such as `png` or `.SVG`.
    pub fn parse(raw: &str) -> Result<Self, RenderError> {
        let normalized = raw.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "bmp" => Ok(ImageFormat::Bmp),
            "svg" => Ok(ImageFormat::Svg),
            _ => Err(RenderError::UnsupportedFormat(raw.to_string())),
        }
    }

    pub fn is_vector(self) -> bool {
        matches!(self, ImageFormat::Svg)
    }
}

/// License stamp drawn on preliminary products.
#[derive(Debug, Clone, PartialEq)]
pub struct Watermark {
    /// Optional license logo (PNG) placed next to the stamp.
    pub logo: Option<PathBuf>,
    /// Data partner named in the copyright line.
    pub partner_label: String,
    /// Copyright year.
    pub year: i32,
}

/// Highest resolution a record may ask for; larger values are clamped.
pub const MAX_DPI: f64 = 1200.0;

/// Everything a render pass needs besides the figure itself.
///
/// Built once per record and passed to every render call.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Font family for all text.
    pub font_family: String,
    /// Dots per inch; figure sizes are given in inches.
    pub dpi: f64,
    pub format: ImageFormat,
    /// File extension written to disk, as configured (e.g. `jpg`).
    pub extension: String,
    /// Present when the record asks for a watermark.
    pub watermark: Option<Watermark>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            dpi: 80.0,
            format: ImageFormat::Png,
            extension: "png".to_string(),
            watermark: None,
        }
    }
}

impl Style {
    /// Collect the styling hints carried by a record header.
    pub fn from_header(header: &RecordHeader, logo: Option<PathBuf>) -> Result<Self, RenderError> {
        let format = ImageFormat::parse(&header.img_format)?;
        let dpi = match header.fig_dpi {
            dpi if !(dpi.is_finite() && dpi > 0.0) => {
                log::warn!("ignoring invalid figDPI {dpi}");
                Style::default().dpi
            }
            dpi if dpi > MAX_DPI => {
                log::warn!("figDPI {dpi} too large, using {MAX_DPI}");
                MAX_DPI
            }
            dpi => dpi,
        };
        let font_family = match header.process.fontname.trim() {
            "" => Style::default().font_family,
            name => name.to_string(),
        };
        let watermark = header.watermark_on.then(|| Watermark {
            logo,
            partner_label: header.partner_label.clone(),
            year: chrono::Utc::now().year(),
        });

        Ok(Style {
            font_family,
            dpi,
            format,
            extension: header
                .img_format
                .trim()
                .trim_start_matches('.')
                .to_ascii_lowercase(),
            watermark,
        })
    }

    /// Canvas length in pixels for a length in inches.
    pub fn pixels(&self, inches: f64) -> u32 {
        (inches * self.dpi).round().max(1.0) as u32
    }

    /// Font height in pixels for a size in points.
    pub fn font_px(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }

    /// Stroke width in whole pixels for a line width in points.
    pub fn stroke_px(&self, points: f64) -> u32 {
        self.font_px(points).round().max(1.0) as u32
    }

    pub fn with_format(mut self, format: ImageFormat, extension: &str) -> Self {
        self.format = format;
        self.extension = extension.to_string();
        self
    }
}
