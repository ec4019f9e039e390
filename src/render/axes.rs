//! Panel charts: plotters coordinates keyed to our tick locators, label
//! areas sized for the tick labels, and the mesh, frame and tick marks.

use std::ops::Range;

use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::text;
use super::{AxesRect, Axis, Scale};
use crate::style::Style;

/// Axis label size in points.
pub(crate) const LABEL_PT: f64 = 15.0;
/// Tick label size in points.
pub(crate) const TICK_LABEL_PT: f64 = 15.0;

const MAJOR_TICK_PT: (f64, f64) = (5.0, 2.0);
const MINOR_TICK_PT: (f64, f64) = (3.5, 1.5);
const FRAME_PT: f64 = 0.8;
const GRID_PT: f64 = 0.8;
const PAD_PT: f64 = 3.5;
const GRID_COLOR: RGBColor = RGBColor(176, 176, 176);

pub(crate) type PanelChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<TickedCoord, TickedCoord>>;

enum Scaled {
    Linear(RangedCoordf64),
    Log(LogCoord<f64>),
}

/// Coordinate of one panel axis. Its bold key points are the major ticks
/// of the [`Axis`] locator, its light key points the minor ticks, and it
/// formats values with the locator's labels.
pub(crate) struct TickedCoord {
    scaled: Scaled,
    majors: Vec<f64>,
    minors: Vec<f64>,
    labels: Vec<String>,
}

impl TickedCoord {
    pub(crate) fn new(axis: &Axis) -> Self {
        let (lo, hi) = axis.limits();
        let scaled = match axis.scale {
            Scale::Linear => Scaled::Linear((lo..hi).into()),
            Scale::Log => Scaled::Log((lo..hi).log_scale().into()),
        };
        let mut coord = TickedCoord {
            scaled,
            majors: Vec::new(),
            minors: Vec::new(),
            labels: Vec::new(),
        };
        for tick in axis.ticks.resolve(lo, hi) {
            if !axis.shows(tick.value) {
                continue;
            }
            match tick.label {
                Some(label) => {
                    coord.majors.push(tick.value);
                    coord
                        .labels
                        .push(if axis.hide_tick_labels { String::new() } else { label });
                }
                None => coord.minors.push(tick.value),
            }
        }
        coord
    }

    pub(crate) fn majors(&self) -> &[f64] {
        &self.majors
    }

    pub(crate) fn minors(&self) -> &[f64] {
        &self.minors
    }

    pub(crate) fn label(&self, value: f64) -> &str {
        self.majors
            .iter()
            .position(|m| *m == value)
            .and_then(|i| self.labels.get(i))
            .map_or("", String::as_str)
    }

    fn widest_label(&self, font_px: f64) -> f64 {
        self.labels
            .iter()
            .map(|l| text::estimate_width(l, font_px))
            .fold(0.0, f64::max)
    }

    fn has_labels(&self) -> bool {
        self.labels.iter().any(|l| !l.trim().is_empty())
    }
}

impl Ranged for TickedCoord {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        match &self.scaled {
            Scaled::Linear(coord) => coord.map(value, limit),
            Scaled::Log(coord) => coord.map(value, limit),
        }
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            self.minors.clone()
        } else {
            self.majors.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        match &self.scaled {
            Scaled::Linear(coord) => coord.range(),
            Scaled::Log(coord) => coord.range(),
        }
    }
}

impl ValueFormatter<f64> for TickedCoord {
    fn format_ext(&self, value: &f64) -> String {
        self.label(*value).to_string()
    }
}

fn tick_px(style: &Style) -> i32 {
    style.font_px(MAJOR_TICK_PT.0).round() as i32
}

/// Chart whose plotting area covers `rect` exactly. The label areas to the
/// left and below are as large as the tick labels and axis labels need,
/// without reaching past the canvas.
pub(crate) fn panel_chart<'a, DB>(
    root: &DrawingArea<DB, Shift>,
    rect: AxesRect,
    x: &Axis,
    y: &Axis,
    style: &Style,
) -> anyhow::Result<PanelChart<'a, DB>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x_coord, y_coord) = (TickedCoord::new(x), TickedCoord::new(y));
    let (canvas_w, canvas_h) = root.dim_in_pixel();
    let (left, top, right, bottom) = rect.to_pixels((canvas_w, canvas_h));

    let tick_label_px = style.font_px(TICK_LABEL_PT);
    let label_px = style.font_px(LABEL_PT);
    let pad = style.font_px(PAD_PT);
    // plotters puts tick labels two tick lengths away from the axis
    let label_dist = 2.0 * tick_px(style) as f64;
    let desc = |axis: &Axis| match axis.label.is_empty() {
        true => 0.0,
        false => pad + label_px * 1.2,
    };
    let y_space = label_dist + y_coord.widest_label(tick_label_px) + desc(y);
    let x_space = label_dist
        + if x_coord.has_labels() { tick_label_px * 1.2 } else { 0.0 }
        + desc(x);
    let y_space = (y_space.round() as i32).clamp(0, left.max(0));
    let x_space = (x_space.round() as i32).clamp(0, (canvas_h as i32 - bottom).max(0));

    let area = root.clone().shrink(
        (left - y_space, top),
        (
            ((right - left) + y_space).max(1) as u32,
            ((bottom - top) + x_space).max(1) as u32,
        ),
    );
    let chart = ChartBuilder::on(&area)
        .set_label_area_size(LabelAreaPosition::Left, y_space)
        .set_label_area_size(LabelAreaPosition::Bottom, x_space)
        .build_cartesian_2d(x_coord, y_coord)?;
    Ok(chart)
}

/// Mesh (grid at the major ticks when `grid` is set), tick labels and axis
/// labels, then the frame and the tick marks plotters does not draw itself:
/// majors on the top and right edges, minors on all four.
pub(crate) fn draw_axes<DB>(
    chart: &mut PanelChart<'_, DB>,
    x: &Axis,
    y: &Axis,
    grid: bool,
    style: &Style,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let frame = BLACK.stroke_width(style.stroke_px(FRAME_PT));
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(x.label.as_str())
            .y_desc(y.label.as_str())
            .axis_desc_style(text::font(style, LABEL_PT))
            .label_style(text::font(style, TICK_LABEL_PT))
            .axis_style(frame)
            .set_all_tick_mark_size(tick_px(style))
            .light_line_style(TRANSPARENT)
            .bold_line_style(GRID_COLOR.stroke_width(style.stroke_px(GRID_PT)));
        if !grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;
    }

    let (x_lo, x_hi) = x.limits();
    let (y_lo, y_hi) = y.limits();
    chart.draw_series(std::iter::once(Rectangle::new(
        [(x_lo, y_hi), (x_hi, y_lo)],
        frame,
    )))?;

    let marks = {
        let coords = chart.as_coord_spec();
        tick_marks(coords.x_spec(), coords.y_spec(), (x_lo, x_hi), (y_lo, y_hi), style)
    };
    chart.draw_series(
        marks
            .into_iter()
            .map(|(at, tip, stroke)| EmptyElement::at(at) + PathElement::new(vec![(0, 0), tip], stroke)),
    )?;
    Ok(())
}

type Mark = ((f64, f64), (i32, i32), ShapeStyle);

/// Outward tick marks: anchor in data space, tip as a pixel offset.
fn tick_marks(
    x: &TickedCoord,
    y: &TickedCoord,
    (x_lo, x_hi): (f64, f64),
    (y_lo, y_hi): (f64, f64),
    style: &Style,
) -> Vec<Mark> {
    let size = |(len, width): (f64, f64)| {
        (
            style.font_px(len).round() as i32,
            BLACK.stroke_width(style.stroke_px(width)),
        )
    };
    let (major, major_stroke) = size(MAJOR_TICK_PT);
    let (minor, minor_stroke) = size(MINOR_TICK_PT);

    let mut marks = Vec::new();
    for &v in x.majors() {
        marks.push(((v, y_hi), (0, -major), major_stroke));
    }
    for &v in x.minors() {
        marks.push(((v, y_lo), (0, minor), minor_stroke));
        marks.push(((v, y_hi), (0, -minor), minor_stroke));
    }
    for &v in y.majors() {
        marks.push(((x_hi, v), (major, 0), major_stroke));
    }
    for &v in y.minors() {
        marks.push(((x_lo, v), (-minor, 0), minor_stroke));
        marks.push(((x_hi, v), (minor, 0), minor_stroke));
    }
    marks
}
