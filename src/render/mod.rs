/// Rendering layer: figure descriptions and the routine that draws them.
///
/// Every plot family describes its images as [`Figure`] values; a single
/// [`render_figure`] call turns one description into one file:
/// ```text
///   Figure ──► canvas (PNG/JPEG/BMP or SVG backend)
///                 ├── panels   line series / colormap cells
///                 ├── axes     frame, ticks, tick labels, axis labels
///                 ├── colorbar
///                 └── texts    title, footer, watermark
/// ```
use std::panic;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::RGBColor;

use crate::color::Colormap;
use crate::data::schema::Grid;
use crate::style::Style;

mod axes;
mod backend;
mod error;
mod lines;
mod mesh;
mod text;
pub mod ticks;

use backend::TextSafe;
pub use error::RenderError;
pub(crate) use mesh::cell_edges;
pub use ticks::Ticks;

// ---------------------------------------------------------------------------
// Figure description
// ---------------------------------------------------------------------------

/// Rectangle in figure fractions: `left`/`bottom` measured from the lower
/// left corner, like matplotlib's `add_axes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl AxesRect {
    pub const fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        AxesRect {
            left,
            bottom,
            width,
            height,
        }
    }

    /// Split `self` into side-by-side axes with relative widths `ratios`,
    /// separated by `wspace` times the average axes width.
    pub fn row(self, ratios: &[f64], wspace: f64) -> Vec<AxesRect> {
        let n = ratios.len() as f64;
        let total: f64 = ratios.iter().sum();
        if ratios.is_empty() || total <= 0.0 {
            return Vec::new();
        }
        let unit = self.width / (total * (1.0 + (n - 1.0) * wspace / n));
        let gap = wspace * unit * total / n;
        let mut left = self.left;
        ratios
            .iter()
            .map(|ratio| {
                let rect = AxesRect::new(left, self.bottom, ratio * unit, self.height);
                left += ratio * unit + gap;
                rect
            })
            .collect()
    }

    /// Pixel bounds `(left, top, right, bottom)` on a `w`×`h` canvas.
    pub(crate) fn to_pixels(self, (w, h): (u32, u32)) -> (i32, i32, i32, i32) {
        let (w, h) = (w as f64, h as f64);
        (
            (self.left * w).round() as i32,
            ((1.0 - self.bottom - self.height) * h).round() as i32,
            ((self.left + self.width) * w).round() as i32,
            ((1.0 - self.bottom) * h).round() as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

/// One axis of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: String,
    /// Visible limits in data units.
    pub range: (f64, f64),
    pub scale: Scale,
    pub ticks: Ticks,
    /// Hide tick labels (shared axes).
    pub hide_tick_labels: bool,
}

impl Axis {
    pub fn linear(label: &str, range: (f64, f64), ticks: Ticks) -> Self {
        Axis {
            label: label.to_string(),
            range,
            scale: Scale::Linear,
            ticks,
            hide_tick_labels: false,
        }
    }

    pub fn log(label: &str, range: (f64, f64)) -> Self {
        Axis {
            label: label.to_string(),
            range,
            scale: Scale::Log,
            ticks: Ticks::Decades,
            hide_tick_labels: false,
        }
    }

    /// Whether `value` has a place on this axis: finite, and positive on
    /// log axes.
    pub fn places(&self, value: f64) -> bool {
        value.is_finite() && (self.scale == Scale::Linear || value > 0.0)
    }

    /// Whether `value` lies inside the visible limits.
    pub fn shows(&self, value: f64) -> bool {
        let (lo, hi) = self.limits();
        self.places(value) && value >= lo && value <= hi
    }

    /// Visible limits in ascending order. Limits that cannot be placed fall
    /// back to `(0, 1)`, or one decade on log axes, and equal limits are
    /// widened around their value.
    pub fn limits(&self) -> (f64, f64) {
        let (a, b) = self.range;
        let (lo, hi) = match (self.places(a), self.places(b)) {
            (true, true) => (a.min(b), a.max(b)),
            (true, false) => (a, a),
            (false, true) => (b, b),
            (false, false) => match self.scale {
                Scale::Linear => (0.0, 1.0),
                Scale::Log => (1.0, 10.0),
            },
        };
        if hi > lo {
            return (lo, hi);
        }
        match self.scale {
            Scale::Linear => (lo - 0.5, hi + 0.5),
            Scale::Log => (lo / 10f64.sqrt(), hi * 10f64.sqrt()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Triangle,
    Circle,
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub shape: MarkerShape,
    /// Marker size in points.
    pub size: f64,
    pub face: RGBColor,
    pub edge: RGBColor,
}

/// A labeled data series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: RGBColor,
    pub line: LineStyle,
    pub marker: Option<Marker>,
}

impl Series {
    pub fn line(label: &str, x: Vec<f64>, y: Vec<f64>, color: RGBColor, line: LineStyle) -> Self {
        Series {
            label: label.to_string(),
            x,
            y,
            color,
            line,
            marker: None,
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }
}

/// Horizontal reference line across the whole panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefLine {
    pub y: f64,
    pub color: RGBColor,
    pub line: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    UpperLeft,
    UpperRight,
}

/// Axes holding line series.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePanel {
    pub rect: AxesRect,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
    pub ref_lines: Vec<RefLine>,
    pub grid: bool,
    pub legend: Option<LegendPosition>,
    /// Legend font size in points.
    pub legend_size: f64,
}

/// Ticks of a colorbar, with optional text in place of numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    pub rect: AxesRect,
    pub ticks: Vec<f64>,
    pub labels: Option<Vec<String>>,
    pub title: String,
    /// Tick label size in points.
    pub label_size: f64,
}

/// Axes holding a time-height colormap image.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPanel {
    pub rect: AxesRect,
    pub x: Axis,
    pub y: Axis,
    /// Column centers (one per grid column).
    pub x_centers: Vec<f64>,
    /// Row centers (one per grid row).
    pub y_centers: Vec<f64>,
    pub values: Grid,
    pub limits: (f64, f64),
    pub colormap: Colormap,
    pub colorbar: Colorbar,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FigureBody {
    /// One or more line panels side by side.
    Lines(Vec<LinePanel>),
    Mesh(MeshPanel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// `(x, y)` is the lower left corner of the text block.
    BottomLeft,
    /// `(x, y)` is the middle of the bottom edge.
    BottomCenter,
}

/// Free text placed in figure fractions; `\n` starts a new line.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureText {
    pub text: String,
    pub at: (f64, f64),
    /// Size in points.
    pub size: f64,
    pub anchor: TextAnchor,
    pub color: RGBColor,
    pub bold: bool,
    pub opacity: f64,
}

impl FigureText {
    pub fn new(text: impl Into<String>, at: (f64, f64), size: f64) -> Self {
        FigureText {
            text: text.into(),
            at,
            size,
            anchor: TextAnchor::BottomLeft,
            color: RGBColor(0, 0, 0),
            bold: false,
            opacity: 1.0,
        }
    }

    pub fn centered(mut self) -> Self {
        self.anchor = TextAnchor::BottomCenter;
        self
    }
}

/// A complete image description.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Quantity tag used in the output filename.
    pub tag: String,
    /// Canvas size in inches.
    pub size: (f64, f64),
    /// Title centered above the first panel, if any.
    pub title: Option<String>,
    pub title_size: f64,
    pub body: FigureBody,
    pub texts: Vec<FigureText>,
    /// Stamp the license watermark when the style carries one.
    pub watermark: bool,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// `<out_dir>/<base>_<tag>.<ext>`
pub fn output_path(out_dir: &Path, base: &str, tag: &str, style: &Style) -> PathBuf {
    out_dir.join(format!("{base}_{tag}.{}", style.extension))
}

/// Draw `figure` and write it into `out_dir`, replacing any existing file.
pub fn render_figure(
    figure: &Figure,
    style: &Style,
    out_dir: &Path,
    base: &str,
) -> Result<PathBuf, RenderError> {
    if !out_dir.is_dir() {
        return Err(RenderError::MissingOutputDir(out_dir.to_path_buf()));
    }
    let path = output_path(out_dir, base, &figure.tag, style);
    let size = (style.pixels(figure.size.0), style.pixels(figure.size.1));
    let logo = match figure.watermark {
        true => text::load_logo(style)?,
        false => None,
    };

    let render = || -> anyhow::Result<()> {
        if style.format.is_vector() {
            let root = TextSafe::new(SVGBackend::new(&path, size)).into_drawing_area();
            draw_figure(&root, figure, style, logo.as_ref())
        } else {
            // the bitmap backend picks the encoder from the file extension
            let root = TextSafe::new(BitMapBackend::new(&path, size)).into_drawing_area();
            draw_figure(&root, figure, style, logo.as_ref())
        }
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| RenderError::Backend {
            path: path.clone(),
            message: "plotting backend panicked".to_string(),
        })?
        .map_err(|e| RenderError::Backend {
            path: path.clone(),
            message: format!("{e:#}"),
        })?;

    log::info!("wrote {}", path.display());
    Ok(path)
}

fn draw_figure<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    style: &Style,
    logo: Option<&image::RgbaImage>,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let title_rect = match &figure.body {
        FigureBody::Lines(panels) => {
            for panel in panels {
                lines::draw_line_panel(root, panel, style)?;
            }
            panels.first().map(|p| p.rect)
        }
        FigureBody::Mesh(panel) => {
            mesh::draw_mesh_panel(root, panel, style)?;
            Some(panel.rect)
        }
    };

    if let (Some(title), Some(rect)) = (&figure.title, title_rect) {
        text::draw_title(root, title, rect, figure.title_size, style)?;
    }
    for t in &figure.texts {
        text::draw_figure_text(root, t, style)?;
    }
    if let (true, Some(watermark)) = (figure.watermark, &style.watermark) {
        text::draw_watermark(root, watermark, logo, style)?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ImageFormat;

    #[test]
    fn output_names() {
        let style = Style::default().with_format(ImageFormat::Jpeg, "jpg");
        let path = output_path(Path::new("/tmp/out"), "2019_01_10_Thu_PA_00_00_01", "LC_532", &style);
        assert_eq!(
            path,
            PathBuf::from("/tmp/out/2019_01_10_Thu_PA_00_00_01_LC_532.jpg")
        );
    }

    #[test]
    fn axes_rect_pixels() {
        let rect = AxesRect::new(0.1, 0.15, 0.85, 0.72);
        assert_eq!(rect.to_pixels((900, 500)), (90, 65, 855, 425));
    }

    #[test]
    fn row_splits_by_ratio() {
        let outer = AxesRect::new(0.125, 0.11, 0.845, 0.83);
        let panels = outer.row(&[1.2, 1.0], 0.05);
        assert_eq!(panels.len(), 2);
        let ratio = panels[0].width / panels[1].width;
        assert!((ratio - 1.2).abs() < 1e-9);
        let right = panels[1].left + panels[1].width;
        assert!((right - 0.97).abs() < 1e-9);
        assert!(panels[1].left > panels[0].left + panels[0].width);
    }

    #[test]
    fn log_axis_drops_non_positive() {
        let axis = Axis::log("Signal", (1e-2, 1e3));
        assert!(axis.places(100.0) && axis.shows(100.0));
        assert!(!axis.places(0.0) && !axis.places(f64::NAN));
        assert!(axis.places(1e4) && !axis.shows(1e4));
        assert_eq!(axis.limits(), (1e-2, 1e3));
    }

    #[test]
    fn degenerate_limits_are_widened() {
        let ticks = Ticks::Linspace { count: 2 };
        assert_eq!(Axis::linear("x", (3.0, 3.0), ticks.clone()).limits(), (2.5, 3.5));
        assert_eq!(Axis::linear("x", (5.0, 1.0), ticks.clone()).limits(), (1.0, 5.0));
        assert_eq!(Axis::linear("x", (f64::NAN, f64::NAN), ticks).limits(), (0.0, 1.0));
        let (lo, hi) = Axis::log("Signal", (0.0, -1.0)).limits();
        assert!(lo > 0.0 && hi > lo);
    }

    #[test]
    fn missing_output_dir() {
        let figure = Figure {
            tag: "overlap".into(),
            size: (1.0, 1.0),
            title: None,
            title_size: 15.0,
            body: FigureBody::Lines(Vec::new()),
            texts: Vec::new(),
            watermark: false,
        };
        let err = render_figure(&figure, &Style::default(), Path::new("no/such/dir"), "x").unwrap_err();
        assert!(matches!(err, RenderError::MissingOutputDir(_)));
    }
}
