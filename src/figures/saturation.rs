//! Far-range signal status: good, saturated or low SNR per time-height cell.

use super::{date_footer, mesh_time_axis, site, time_height, version_footer};
use crate::color::Colormap;
use crate::data::schema::RecordHeader;
use crate::data::{ResultRecord, SchemaError};
use crate::render::{AxesRect, Axis, Colorbar, Figure, FigureBody, MeshPanel, Ticks};

/// Channels in drawing order; 532 nm identifies the family and is required.
const WAVELENGTHS: [u32; 4] = [355, 532, 1064, 407];
const REQUIRED: u32 = 532;

const STATUS_LABELS: [&str; 3] = ["Good Signal", "Saturated", "Low SNR"];

pub fn figures(record: &ResultRecord, header: &RecordHeader) -> Result<Vec<Figure>, SchemaError> {
    let (time, height) = time_height(record)?;
    let y_range = record.limits("yLim_FR_RCS")?;

    let mut figures = Vec::new();
    for wavelength in WAVELENGTHS {
        let field = format!("SAT_FR_{wavelength}");
        if wavelength != REQUIRED && !record.contains(&field) {
            log::debug!("no {field} in record");
            continue;
        }
        let status = record.grid(&field, height.len(), time.len())?;

        let panel = MeshPanel {
            rect: AxesRect::new(0.11, 0.15, 0.74, 0.75),
            x: mesh_time_axis(record, &time)?,
            y: Axis::linear(
                "Height (m)",
                y_range,
                Ticks::Multiple {
                    major: 2500.0,
                    minor: Some(500.0),
                },
            ),
            x_centers: time.clone(),
            y_centers: height.clone(),
            values: status,
            limits: (-0.5, 2.5),
            colormap: Colormap::signal_status(),
            colorbar: Colorbar {
                rect: AxesRect::new(0.865, 0.15, 0.02, 0.75),
                ticks: vec![0.0, 1.0, 2.0],
                labels: Some(STATUS_LABELS.iter().map(|s| s.to_string()).collect()),
                title: String::new(),
                label_size: 12.0,
            },
        };

        figures.push(Figure {
            tag: field,
            size: (10.0, 5.0),
            title: Some(format!(
                "Signal Status at {wavelength}nm Far-Range from {}",
                site(header)
            )),
            title_size: 15.0,
            body: FigureBody::Mesh(panel),
            texts: vec![
                date_footer(time[0], (0.05, 0.04), 15.0)?,
                version_footer(header, (0.8, 0.04), 14.0),
            ],
            watermark: false,
        });
    }
    Ok(figures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figures::testing::{header, record};
    use serde_json::json;

    #[test]
    fn optional_channels_are_skipped() {
        let rec = record(json!({
            "time": [737565.0, 737565.5],
            "height": [7.5, 15.0, 22.5],
            "yLim_FR_RCS": [0, 15000],
            "SAT_FR_532": [[0, 1], [2, 0], [0, 0]],
            "SAT_FR_1064": [[0, 0], [0, 0], [1, 1]]
        }));
        let figs = figures(&rec, &header(&rec)).unwrap();
        let tags: Vec<&str> = figs.iter().map(|f| f.tag.as_str()).collect();
        assert_eq!(tags, vec!["SAT_FR_532", "SAT_FR_1064"]);
        assert_eq!(
            figs[0].title.as_deref(),
            Some("Signal Status at 532nm Far-Range from PollyXT_LACROS at Leipzig")
        );
        let FigureBody::Mesh(panel) = &figs[0].body else {
            panic!("expected a mesh");
        };
        assert_eq!(panel.values.get(1, 0), 2.0);
        assert_eq!(panel.x.range, (737564.75, 737565.75));
    }

    #[test]
    fn grid_must_match_time_and_height() {
        let rec = record(json!({
            "time": [737565.0, 737565.5],
            "height": [7.5, 15.0],
            "yLim_FR_RCS": [0, 15000],
            "SAT_FR_532": [[0, 1, 2], [2, 0, 1]]
        }));
        assert!(matches!(
            figures(&rec, &header(&rec)),
            Err(SchemaError::Shape { field, .. }) if field == "SAT_FR_532"
        ));
    }
}
