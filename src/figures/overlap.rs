//! Overlap function next to the far-range, near-range and glued signals
//! used to derive it.

use super::site;
use crate::color::hex_or_black;
use crate::data::mask::mask_non_positive;
use crate::data::schema::RecordHeader;
use crate::data::{ResultRecord, SchemaError};
use crate::datenum::parse_polly_filename;
use crate::render::{
    AxesRect, Axis, Figure, FigureBody, FigureText, LegendPosition, LinePanel, LineStyle, RefLine,
    Series, Ticks,
};

const COLOR_532: &str = "#58B13F";

/// Figure area left to the two panels (subplot defaults with `top`/`right`
/// overridden).
const PANELS: AxesRect = AxesRect::new(0.125, 0.11, 0.845, 0.83);

/// Heights at the first and last bins of the normalization range
/// (1-based bin indices).
pub(crate) fn norm_range_heights(
    range: &[f64],
    height: &[f64],
) -> Result<Option<(f64, f64)>, SchemaError> {
    let bin = |raw: f64| -> Result<f64, SchemaError> {
        if raw.fract() != 0.0 || raw < 1.0 || raw > height.len() as f64 {
            return Err(SchemaError::invalid(
                "normRange532",
                format!("{raw} is not a height bin in 1..={}", height.len()),
            ));
        }
        Ok(height[raw as usize - 1])
    };
    match (range.first(), range.last()) {
        (Some(lo), Some(hi)) => Ok(Some((bin(*lo)?, bin(*hi)?))),
        _ => Ok(None),
    }
}

pub fn figures(record: &ResultRecord, header: &RecordHeader) -> Result<Vec<Figure>, SchemaError> {
    let height = record.series("height")?;
    if height.is_empty() {
        return Err(SchemaError::invalid("height", "is empty"));
    }
    let n = height.len();
    let color = hex_or_black(COLOR_532);

    let overlap = record.series_of_len("overlap532", n)?;
    let defaults = record.series_of_len("overlap532Defaults", n)?;
    let signals = [
        ("sig532FR", "FR 532", LineStyle::DashDot),
        ("sig532NR", "NR 532", LineStyle::Dotted),
        ("sig532Gl", "FR Glued 532", LineStyle::Solid),
    ];
    let mut signal_series = Vec::with_capacity(signals.len());
    for (field, label, line) in signals {
        let values = mask_non_positive(&record.series_of_len(field, n)?);
        signal_series.push(Series::line(label, values, height.clone(), color, line));
    }

    let norm_range = match record.contains("normRange532") {
        true => record.series("normRange532")?,
        false => Vec::new(),
    };
    let ref_lines: Vec<RefLine> = norm_range_heights(&norm_range, &height)?
        .map(|(lo, hi)| {
            [lo, hi]
                .into_iter()
                .map(|y| RefLine {
                    y,
                    color,
                    line: LineStyle::Dashed,
                })
                .collect()
        })
        .unwrap_or_default();

    let rects = PANELS.row(&[1.2, 1.0], 0.05);
    let height_axis = Axis::linear(
        "Height (m)",
        (0.0, 3000.0),
        Ticks::Multiple {
            major: 500.0,
            minor: Some(100.0),
        },
    );

    let overlap_panel = LinePanel {
        rect: rects[0],
        x: Axis::linear(
            "Overlap",
            (-0.05, 1.1),
            Ticks::MaxN {
                bins: 5,
                prune_lower: false,
            },
        ),
        y: height_axis.clone(),
        series: vec![
            Series::line("overlap 532 FR", overlap, height.clone(), color, LineStyle::Solid),
            Series::line(
                "default overlap 532 FR",
                defaults,
                height.clone(),
                color,
                LineStyle::Dashed,
            ),
        ],
        ref_lines: Vec::new(),
        grid: true,
        legend: Some(LegendPosition::UpperLeft),
        legend_size: 15.0,
    };

    let signal_panel = LinePanel {
        rect: rects[1],
        x: Axis::log("Signal [MHz]", (1e-2, 1e3)),
        y: Axis {
            label: String::new(),
            hide_tick_labels: true,
            ..height_axis
        },
        series: signal_series,
        ref_lines,
        grid: false,
        legend: Some(LegendPosition::UpperRight),
        legend_size: 15.0,
    };

    let start = match parse_polly_filename(&header.task.data_filename) {
        Some(start) => format!(", {}", start.format("%Y%m%d %H:%M")),
        None => {
            log::warn!(
                "no start time in data filename '{}'",
                header.task.data_filename
            );
            String::new()
        }
    };
    let title = FigureText::new(
        format!("Overlap for {}{start}", site(header)),
        (0.55, 0.96),
        15.0,
    )
    .centered();

    Ok(vec![Figure {
        tag: "overlap".to_string(),
        size: (8.0, 8.0),
        title: None,
        title_size: 15.0,
        body: FigureBody::Lines(vec![overlap_panel, signal_panel]),
        texts: vec![
            title,
            FigureText::new(
                format!("Version {}", header.process.program_version),
                (0.1, 0.02),
                10.0,
            ),
        ],
        watermark: false,
    }])
}
