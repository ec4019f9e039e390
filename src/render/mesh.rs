use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::axes;
use super::text;
use super::ticks::format_ticks;
use super::{Axis, Colorbar, MeshPanel};
use crate::color::Colormap;
use crate::style::Style;

const COLORBAR_TICK_PT: (f64, f64) = (5.0, 2.0);
const COLORBAR_TITLE_PT: f64 = 12.0;
const PAD_PT: f64 = 5.0;

/// Cell boundaries for cells centered on `centers`: midpoints between
/// neighbours, with the outer cells mirrored.
pub(crate) fn cell_edges(centers: &[f64]) -> Vec<f64> {
    match centers {
        [] => Vec::new(),
        [only] => vec![only - 0.5, only + 0.5],
        _ => {
            let n = centers.len();
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centers[0] - (centers[1] - centers[0]) / 2.0);
            edges.extend(centers.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            edges.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
            edges
        }
    }
}

/// Visible part of the interval between two edges, clamped to the axis
/// limits.
fn visible(a: f64, b: f64, axis: &Axis) -> Option<(f64, f64)> {
    if !(axis.places(a) && axis.places(b)) {
        return None;
    }
    let (lo, hi) = axis.limits();
    let (lo, hi) = (a.min(b).max(lo), a.max(b).min(hi));
    (hi > lo).then_some((lo, hi))
}

type Cell = (f64, f64, f64, f64, RGBColor);

/// Cell rectangles `(x0, x1, y0, y1, color)` in data units, with
/// neighbouring cells of one row merged while their color repeats.
pub(crate) fn mesh_cells(panel: &MeshPanel) -> Vec<Cell> {
    let x_edges = cell_edges(&panel.x_centers);
    let y_edges = cell_edges(&panel.y_centers);
    let (vmin, vmax) = panel.limits;

    let rows = panel.values.rows().min(y_edges.len().saturating_sub(1));
    let cols = panel.values.cols().min(x_edges.len().saturating_sub(1));
    let mut cells = Vec::new();
    for r in 0..rows {
        let Some((y0, y1)) = visible(y_edges[r], y_edges[r + 1], &panel.y) else {
            continue;
        };
        let mut run: Option<(f64, f64, RGBColor)> = None;
        for c in 0..cols {
            let Some((x0, x1)) = visible(x_edges[c], x_edges[c + 1], &panel.x) else {
                continue;
            };
            let color = panel.colormap.color_for(panel.values.get(r, c), vmin, vmax);
            run = match run {
                Some((start, end, current)) if current == color && x0 == end => {
                    Some((start, x1, current))
                }
                Some((start, end, current)) => {
                    cells.push((start, end, y0, y1, current));
                    Some((x0, x1, color))
                }
                None => Some((x0, x1, color)),
            };
        }
        if let Some((start, end, current)) = run {
            cells.push((start, end, y0, y1, current));
        }
    }
    cells
}

pub(crate) fn draw_mesh_panel<DB>(
    root: &DrawingArea<DB, Shift>,
    panel: &MeshPanel,
    style: &Style,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = axes::panel_chart(root, panel.rect, &panel.x, &panel.y, style)?;
    chart.draw_series(
        mesh_cells(panel)
            .into_iter()
            .map(|(x0, x1, y0, y1, color)| Rectangle::new([(x0, y1), (x1, y0)], color.filled())),
    )?;
    axes::draw_axes(&mut chart, &panel.x, &panel.y, false, style)?;
    draw_colorbar(root, &panel.colorbar, &panel.colormap, panel.limits, style)
}

/// Vertical colorbar: gradient, frame, inward ticks, labels to the right
/// and an optional title on top.
fn draw_colorbar<DB>(
    root: &DrawingArea<DB, Shift>,
    bar: &Colorbar,
    colormap: &Colormap,
    (vmin, vmax): (f64, f64),
    style: &Style,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (left, top, right, bottom) = bar.rect.to_pixels(root.dim_in_pixel());
    let height = (bottom - top).max(1);

    let mut band: Option<(i32, RGBColor)> = None;
    for py in top..bottom {
        let fraction = (bottom - py) as f64 / height as f64;
        let color = colormap.sample(fraction);
        band = match band {
            Some((start, current)) if current == color => Some((start, current)),
            Some((start, current)) => {
                root.draw(&Rectangle::new([(left, start), (right, py)], current.filled()))?;
                Some((py, color))
            }
            None => Some((py, color)),
        };
    }
    if let Some((start, current)) = band {
        root.draw(&Rectangle::new([(left, start), (right, bottom)], current.filled()))?;
    }
    root.draw(&Rectangle::new(
        [(left, top), (right, bottom)],
        BLACK.stroke_width(style.stroke_px(0.8)),
    ))?;

    let in_range: Vec<f64> = bar
        .ticks
        .iter()
        .copied()
        .filter(|v| *v >= vmin.min(vmax) && *v <= vmin.max(vmax))
        .collect();
    let labels = match &bar.labels {
        Some(labels) => bar
            .ticks
            .iter()
            .zip(labels)
            .filter(|(v, _)| in_range.contains(v))
            .map(|(_, l)| l.clone())
            .collect(),
        None => format_ticks(&in_range),
    };

    let len = style.font_px(COLORBAR_TICK_PT.0).round() as i32;
    let stroke = BLACK.stroke_width(style.stroke_px(COLORBAR_TICK_PT.1));
    let pad = style.font_px(PAD_PT).round() as i32;
    let label_style = text::font(style, bar.label_size)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (value, label) in in_range.iter().zip(&labels) {
        let fraction = if vmax != vmin {
            (value - vmin) / (vmax - vmin)
        } else {
            0.0
        };
        let py = bottom - (fraction * height as f64).round() as i32;
        root.draw(&PathElement::new(vec![(left, py), (left + len, py)], stroke))?;
        root.draw(&PathElement::new(vec![(right, py), (right - len, py)], stroke))?;
        text::draw_text(root, label, (right + pad, py), &label_style);
    }

    if !bar.title.is_empty() {
        let title_style = text::font(style, COLORBAR_TITLE_PT)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        text::draw_text(root, &bar.title, ((left + right) / 2, top - pad), &title_style);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::Grid;
    use crate::render::{AxesRect, Ticks};

    fn panel(values: Grid, x_range: (f64, f64)) -> MeshPanel {
        let ticks = Ticks::Linspace { count: 2 };
        MeshPanel {
            rect: AxesRect::new(0.1, 0.1, 0.8, 0.8),
            x: Axis::linear("Time", x_range, ticks.clone()),
            y: Axis::linear("Height", (0.0, 2.0), ticks),
            x_centers: vec![0.5, 1.5, 2.5, 3.5],
            y_centers: vec![0.5, 1.5],
            values,
            limits: (0.0, 1.0),
            colormap: Colormap::jet(),
            colorbar: Colorbar {
                rect: AxesRect::new(0.92, 0.1, 0.02, 0.8),
                ticks: Vec::new(),
                labels: None,
                title: String::new(),
                label_size: 12.0,
            },
        }
    }

    #[test]
    fn equal_neighbours_share_one_rectangle() {
        let values = Grid::from_fn(2, 4, |r, c| if r == 0 || c < 2 { 0.5 } else { 1.0 });
        let cells = mesh_cells(&panel(values, (0.0, 4.0)));
        assert_eq!(cells.len(), 3);
        assert_eq!((cells[0].0, cells[0].1, cells[0].2, cells[0].3), (0.0, 4.0, 0.0, 1.0));
        assert_eq!((cells[1].0, cells[1].1), (0.0, 2.0));
        assert_eq!((cells[2].0, cells[2].1), (2.0, 4.0));
    }

    #[test]
    fn cells_are_cut_at_the_limits() {
        let values = Grid::from_fn(2, 4, |_, c| c as f64 / 3.0);
        let cells = mesh_cells(&panel(values, (1.25, 2.5)));
        assert!(cells.iter().all(|c| c.0 >= 1.25 && c.1 <= 2.5));
        assert_eq!(cells.first().map(|c| c.0), Some(1.25));
        assert_eq!(cells.last().map(|c| c.1), Some(2.5));
    }

    #[test]
    fn edges_sit_between_centers() {
        assert_eq!(cell_edges(&[0.0, 1.0, 3.0]), vec![-0.5, 0.5, 2.0, 4.0]);
        assert_eq!(cell_edges(&[7.5]), vec![7.0, 8.0]);
        assert!(cell_edges(&[]).is_empty());
    }

    #[test]
    fn visibility_clamps_to_limits() {
        let axis = Axis::linear("x", (0.0, 10.0), Ticks::Linspace { count: 2 });
        assert_eq!(visible(-1.0, 2.0, &axis), Some((0.0, 2.0)));
        assert_eq!(visible(12.0, 11.0, &axis), None);
        assert_eq!(visible(f64::NAN, 1.0, &axis), None);
        let log = Axis::log("Signal", (1e-2, 1e3));
        assert_eq!(visible(-1.0, 2.0, &log), None);
    }
}
