use std::f64::consts::PI;

use plotters::chart::SeriesAnno;
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters_backend::BackendCoord;

use super::axes::{self, PanelChart};
use super::text;
use super::{Axis, LegendPosition, LinePanel, LineStyle, Marker, MarkerShape, Series};
use crate::style::Style;

/// Default line width in points.
const LINE_PT: f64 = 1.5;
const LEGEND_EDGE: RGBColor = RGBColor(204, 204, 204);

type Point = (f64, f64);

/// Dash and gap lengths in multiples of the line width; `None` is solid.
/// Dash-dot is drawn as a long dash with a short gap.
fn dash_pattern(line: LineStyle) -> Option<(f64, f64)> {
    match line {
        LineStyle::Solid => None,
        LineStyle::Dashed => Some((3.7, 1.6)),
        LineStyle::Dotted => Some((1.0, 1.65)),
        LineStyle::DashDot => Some((6.4, 1.6)),
    }
}

fn dash_px(line: LineStyle, style: &Style) -> Option<(u32, u32)> {
    let width = style.font_px(LINE_PT);
    dash_pattern(line).map(|(on, off)| {
        (
            ((on * width).round() as u32).max(1),
            ((off * width).round() as u32).max(1),
        )
    })
}

/// Runs of connected points. A segment is drawn when both ends can be
/// placed on the axes and at least one of them is inside the limits, so
/// lines run out to the frame but never along it.
pub(crate) fn visible_runs(series: &Series, x: &Axis, y: &Axis) -> Vec<Vec<Point>> {
    let points: Vec<Point> = series.x.iter().copied().zip(series.y.iter().copied()).collect();
    let placed = |p: &Point| x.places(p.0) && y.places(p.1);
    let shown = |p: &Point| x.shows(p.0) && y.shows(p.1);

    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if placed(&a) && placed(&b) && (shown(&a) || shown(&b)) {
            if current.is_empty() {
                current.push(a);
            }
            current.push(b);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn draw_runs<'c, 'a, DB>(
    chart: &'c mut PanelChart<'a, DB>,
    runs: Vec<Vec<Point>>,
    dashes: Option<(u32, u32)>,
    stroke: ShapeStyle,
) -> anyhow::Result<&'c mut SeriesAnno<'a, DB>>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    let anno = match dashes {
        None => chart.draw_series(runs.into_iter().flat_map(|run| LineSeries::new(run, stroke)))?,
        Some((dash, gap)) => chart.draw_series(
            runs.into_iter()
                .flat_map(|run| DashedLineSeries::new(run, dash, gap, stroke)),
        )?,
    };
    Ok(anno)
}

/// Vertices of a polygonal marker around the origin with outer radius `r`.
pub(crate) fn marker_outline(shape: MarkerShape, r: f64) -> Vec<(i32, i32)> {
    let vertex = |angle: f64, radius: f64| {
        (
            (radius * angle.cos()).round() as i32,
            (-radius * angle.sin()).round() as i32,
        )
    };
    match shape {
        MarkerShape::Triangle => (0..3)
            .map(|k| vertex(PI / 2.0 + k as f64 * 2.0 * PI / 3.0, r))
            .collect(),
        MarkerShape::Star => (0..10)
            .map(|k| {
                let radius = if k % 2 == 0 { r } else { r * 0.381966 };
                vertex(PI / 2.0 + k as f64 * PI / 5.0, radius)
            })
            .collect(),
        MarkerShape::Circle => (0..16)
            .map(|k| vertex(k as f64 * PI / 8.0, r))
            .collect(),
    }
}

/// Filled marker with its edge, in pixels around `center`.
fn marker_element<'e, DB: DrawingBackend + 'e>(
    marker: &Marker,
    center: BackendCoord,
    r: f64,
) -> DynElement<'e, DB, BackendCoord> {
    let edge = marker.edge.stroke_width(1);
    match marker.shape {
        MarkerShape::Circle => {
            let radius = r.round().max(1.0) as u32;
            (EmptyElement::at(center)
                + Circle::new((0, 0), radius, marker.face.filled())
                + Circle::new((0, 0), radius, edge))
                .into_dyn()
        }
        shape => {
            let outline = marker_outline(shape, r);
            let mut closed = outline.clone();
            closed.extend(outline.first().copied());
            (EmptyElement::at(center)
                + Polygon::new(outline, marker.face.filled())
                + PathElement::new(closed, edge))
                .into_dyn()
        }
    }
}

/// Legend handle: a line sample `length` pixels long starting at `at`,
/// with the series marker in its middle.
fn legend_handle<'e, DB: DrawingBackend + 'e>(
    at: BackendCoord,
    length: i32,
    stroke: ShapeStyle,
    dashes: Option<(u32, u32)>,
    marker: Option<(Marker, f64)>,
) -> DynElement<'e, DB, BackendCoord> {
    let sample = vec![(0, 0), (length, 0)];
    let line: DynElement<'e, DB, BackendCoord> = match dashes {
        None => PathElement::new(sample, stroke).into_dyn(),
        Some((dash, gap)) => DashedPathElement::new(sample, dash, gap, stroke).into_dyn(),
    };
    match marker {
        Some((marker, r)) => {
            (EmptyElement::at(at) + line + marker_element(&marker, (length / 2, 0), r)).into_dyn()
        }
        None => (EmptyElement::at(at) + line).into_dyn(),
    }
}

pub(crate) fn draw_line_panel<DB>(
    root: &DrawingArea<DB, Shift>,
    panel: &LinePanel,
    style: &Style,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = axes::panel_chart(root, panel.rect, &panel.x, &panel.y, style)?;
    axes::draw_axes(&mut chart, &panel.x, &panel.y, panel.grid, style)?;

    let width = style.stroke_px(LINE_PT);
    let (x_lo, x_hi) = panel.x.limits();
    for reference in &panel.ref_lines {
        if !panel.y.shows(reference.y) {
            continue;
        }
        let run = vec![(x_lo, reference.y), (x_hi, reference.y)];
        draw_runs(
            &mut chart,
            vec![run],
            dash_px(reference.line, style),
            reference.color.stroke_width(width),
        )?;
    }

    let handle = (style.font_px(panel.legend_size) * 2.0).round() as i32;
    for series in &panel.series {
        let stroke = series.color.stroke_width(width);
        let dashes = dash_px(series.line, style);
        let runs = visible_runs(series, &panel.x, &panel.y);
        let anno = draw_runs(&mut chart, runs, dashes, stroke)?;

        let marker = series.marker.map(|m| (m, style.font_px(m.size) / 2.0));
        if !series.label.is_empty() {
            anno.label(series.label.as_str())
                .legend(move |at| legend_handle(at, handle, stroke, dashes, marker));
        }

        if let Some((marker, r)) = marker {
            let shown: Vec<Point> = series
                .x
                .iter()
                .copied()
                .zip(series.y.iter().copied())
                .filter(|(x, y)| panel.x.shows(*x) && panel.y.shows(*y))
                .collect();
            chart.draw_series(
                shown
                    .into_iter()
                    .map(|p| EmptyElement::at(p) + marker_element(&marker, (0, 0), r)),
            )?;
        }
    }

    if let Some(position) = panel.legend {
        draw_legend(&mut chart, position, panel.legend_size, handle, style);
    }
    Ok(())
}

/// Legend of the labeled series. Its layout measures text with the font
/// directly, so without a usable font the legend is dropped.
fn draw_legend<DB>(
    chart: &mut PanelChart<'_, DB>,
    position: LegendPosition,
    size: f64,
    handle: i32,
    style: &Style,
) where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let position = match position {
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
    };
    let font_px = style.font_px(size);
    let drawn = chart
        .configure_series_labels()
        .position(position)
        .label_font(text::font(style, size).color(&BLACK))
        .legend_area_size((handle as f64 + 0.8 * font_px).round() as i32)
        .margin((0.4 * font_px).round() as i32)
        .background_style(WHITE.mix(0.8))
        .border_style(LEGEND_EDGE)
        .draw();
    if let Err(e) = drawn {
        log::warn!("legend dropped: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Ticks;

    fn axis(name: &str) -> Axis {
        Axis::linear(name, (0.0, 10.0), Ticks::Linspace { count: 2 })
    }

    fn series(x: Vec<f64>, y: Vec<f64>) -> Series {
        Series::line("s", x, y, RGBColor(0, 0, 0), LineStyle::Solid)
    }

    #[test]
    fn nan_breaks_series() {
        let s = series(vec![1.0, 2.0, f64::NAN, 4.0, 5.0], vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let runs = visible_runs(&s, &axis("x"), &axis("y"));
        assert_eq!(runs, vec![vec![(1.0, 1.0), (2.0, 2.0)], vec![(4.0, 4.0), (5.0, 5.0)]]);
    }

    #[test]
    fn lines_run_out_to_the_frame() {
        let s = series(vec![1.0, 20.0, 2.0], vec![1.0, 5.0, 9.0]);
        let runs = visible_runs(&s, &axis("x"), &axis("y"));
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 3);
    }

    #[test]
    fn lines_outside_the_limits_are_dropped() {
        let s = series(vec![1.0, 20.0, 30.0, 2.0], vec![1.0, 5.0, 6.0, 9.0]);
        let runs = visible_runs(&s, &axis("x"), &axis("y"));
        assert_eq!(runs, vec![vec![(1.0, 1.0), (20.0, 5.0)], vec![(30.0, 6.0), (2.0, 9.0)]]);
    }

    #[test]
    fn log_axis_breaks_at_non_positive_values() {
        let s = series(vec![1.0, 0.0, 10.0, 100.0], vec![1.0, 2.0, 3.0, 4.0]);
        let runs = visible_runs(&s, &Axis::log("Signal [MHz]", (1e-2, 1e3)), &axis("y"));
        assert_eq!(runs, vec![vec![(10.0, 3.0), (100.0, 4.0)]]);
    }

    #[test]
    fn dashes_scale_with_line_width() {
        let style = Style::default();
        assert_eq!(dash_px(LineStyle::Solid, &style), None);
        let (dash, gap) = dash_px(LineStyle::Dashed, &style).unwrap();
        assert!(dash > gap);
        let (dot, _) = dash_px(LineStyle::Dotted, &style).unwrap();
        assert!(dot < dash);
    }

    #[test]
    fn star_has_ten_vertices() {
        assert_eq!(marker_outline(MarkerShape::Star, 5.0).len(), 10);
        let triangle = marker_outline(MarkerShape::Triangle, 5.0);
        assert_eq!(triangle[0], (0, -5));
    }
}
