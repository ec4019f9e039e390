//! Lidar calibration constants retrieved with the Klett, Raman and
//! constrained-AOD methods, one figure per wavelength.

use plotters::style::RGBColor;

use super::{date_footer, first, last, site, time_axis, version_footer};
use crate::color::hex_or_black;
use crate::data::model::expect_len;
use crate::data::schema::RecordHeader;
use crate::data::{ResultRecord, SchemaError};
use crate::render::{
    AxesRect, Axis, Figure, FigureBody, LegendPosition, LinePanel, LineStyle, Marker, MarkerShape,
    Series, Ticks,
};

const WAVELENGTHS: [u32; 5] = [355, 532, 1064, 387, 607];

struct Method {
    suffix: &'static str,
    label: &'static str,
    line: &'static str,
    face: &'static str,
    shape: MarkerShape,
}

const METHODS: [Method; 3] = [
    Method {
        suffix: "klett",
        label: "Klett Method",
        line: "#008040",
        face: "#008040",
        shape: MarkerShape::Triangle,
    },
    Method {
        suffix: "raman",
        label: "Raman Method",
        line: "#400080",
        face: "#400080",
        shape: MarkerShape::Circle,
    },
    Method {
        suffix: "aeronet",
        label: "Constrained-AOD Method",
        line: "#804000",
        face: "#800040",
        shape: MarkerShape::Star,
    },
];

/// Widen `limits` so the constants fit with 20% headroom, ignoring NaN.
pub(crate) fn constant_range(limits: (f64, f64), series: &[&[f64]]) -> (f64, f64) {
    let finite = || series.iter().flat_map(|s| s.iter()).copied().filter(|v| v.is_finite());
    let lo = finite().fold(limits.0, f64::min);
    let hi = finite().fold(limits.1, f64::max);
    (limits.0.min(0.8 * lo), limits.1.max(1.2 * hi))
}

pub fn figures(record: &ResultRecord, header: &RecordHeader) -> Result<Vec<Figure>, SchemaError> {
    let time = record.series("time")?;
    let this_time = record.series("thisTime")?;
    let span = (first(&time, "time")?, last(&time, "time")?);

    let mut figures = Vec::new();
    for wavelength in WAVELENGTHS {
        let mut series = Vec::new();
        let mut values = Vec::new();
        for method in &METHODS {
            let field = format!("LC{wavelength}_{}", method.suffix);
            if !record.contains(&field) {
                continue;
            }
            let constants = record.series(&field)?;
            expect_len(&field, constants.len(), this_time.len())?;
            values.push(constants.clone());
            series.push(
                Series::line(
                    method.label,
                    this_time.clone(),
                    constants,
                    hex_or_black(method.line),
                    LineStyle::Dashed,
                )
                .with_marker(Marker {
                    shape: method.shape,
                    size: 10.0,
                    face: hex_or_black(method.face),
                    edge: RGBColor(0, 0, 0),
                }),
            );
        }
        if series.is_empty() {
            log::debug!("no lidar constants at {wavelength} nm");
            continue;
        }

        let limits = record.limits(&format!("yLim{wavelength}"))?;
        let slices: Vec<&[f64]> = values.iter().map(Vec::as_slice).collect();
        let y = Axis::linear(
            "C",
            constant_range(limits, &slices),
            Ticks::MaxN {
                bins: 8,
                prune_lower: true,
            },
        );

        figures.push(Figure {
            tag: format!("LC_{wavelength}"),
            size: (9.0, 5.0),
            title: Some(format!(
                "Lidar constants {wavelength}nm Far-Range for {}",
                site(header)
            )),
            title_size: 15.0,
            body: FigureBody::Lines(vec![LinePanel {
                rect: AxesRect::new(0.1, 0.15, 0.85, 0.72),
                x: time_axis(record, span)?,
                y,
                series,
                ref_lines: Vec::new(),
                grid: false,
                legend: Some(LegendPosition::UpperRight),
                legend_size: 12.0,
            }]),
            texts: vec![
                date_footer(span.0, (0.05, 0.02), 12.0)?,
                version_footer(header, (0.8, 0.02), 12.0),
            ],
            watermark: false,
        });
    }
    Ok(figures)
}
