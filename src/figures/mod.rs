/// Plot families: each module turns a result record into figure
/// descriptions for the renderer.
///
/// ```text
///   ResultRecord + RecordHeader
///        │  detect()  (marker field per family)
///        ▼
///   Kind ──► build() ──► Vec<Figure> ──► render::render_figure
/// ```
use crate::data::schema::RecordHeader;
use crate::data::{ResultRecord, SchemaError};
use crate::datenum::datenum_to_datetime;
use crate::render::{cell_edges, Axis, Figure, FigureText, Ticks};

pub mod lidar_constants;
pub mod lidar_ratio;
pub mod overlap;
pub mod quasi;
pub mod saturation;

/// A family of plots produced from one kind of result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Kind {
    /// Lidar calibration constants over time (`LC_<wavelength>`)
    LidarConstants,
    /// Overlap function and raw signals (`overlap`)
    Overlap,
    /// Far-range signal status (`SAT_FR_<wavelength>`)
    Saturation,
    /// Quasi-retrieved backscatter, depolarization and Angstrom exponent
    Quasi,
    /// Raman lidar ratio profiles (`<start>_<end>_OC_LR_Raman`)
    LidarRatio,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::LidarConstants,
        Kind::Overlap,
        Kind::Saturation,
        Kind::Quasi,
        Kind::LidarRatio,
    ];

    /// Field whose presence identifies the family.
    pub fn marker_field(self) -> &'static str {
        match self {
            Kind::LidarConstants => "LC532_klett",
            Kind::Overlap => "overlap532",
            Kind::Saturation => "SAT_FR_532",
            Kind::Quasi => "quasi_bsc_532",
            Kind::LidarRatio => "LR532_raman",
        }
    }

    /// The first family whose marker field the record carries.
    pub fn detect(record: &ResultRecord) -> Result<Kind, SchemaError> {
        Kind::ALL
            .into_iter()
            .find(|kind| record.contains(kind.marker_field()))
            .ok_or(SchemaError::UnknownFamily)
    }
}

/// Build every figure of `kind` from the record.
pub fn build(
    kind: Kind,
    record: &ResultRecord,
    header: &RecordHeader,
) -> Result<Vec<Figure>, SchemaError> {
    let figures = match kind {
        Kind::LidarConstants => lidar_constants::figures(record, header)?,
        Kind::Overlap => overlap::figures(record, header)?,
        Kind::Saturation => saturation::figures(record, header)?,
        Kind::Quasi => quasi::figures(record, header)?,
        Kind::LidarRatio => lidar_ratio::figures(record, header)?,
    };
    log::debug!("{kind:?}: {} figure(s)", figures.len());
    Ok(figures)
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// `"<instrument> at <location>"`
pub(crate) fn site(header: &RecordHeader) -> String {
    format!("{} at {}", header.campaign.name, header.campaign.location)
}

/// First value of a non-empty field.
pub(crate) fn first(values: &[f64], field: &str) -> Result<f64, SchemaError> {
    values
        .first()
        .copied()
        .ok_or_else(|| SchemaError::invalid(field, "is empty"))
}

/// Last value of a non-empty field.
pub(crate) fn last(values: &[f64], field: &str) -> Result<f64, SchemaError> {
    values
        .last()
        .copied()
        .ok_or_else(|| SchemaError::invalid(field, "is empty"))
}

/// Footer with the calendar day of the first profile.
pub(crate) fn date_footer(datenum: f64, at: (f64, f64), size: f64) -> Result<FigureText, SchemaError> {
    let day = datenum_to_datetime(datenum)?.format("%Y-%m-%d").to_string();
    Ok(FigureText::new(day, at, size))
}

pub(crate) fn version_footer(header: &RecordHeader, at: (f64, f64), size: f64) -> FigureText {
    FigureText::new(
        format!("Version: {}", header.process.program_version),
        at,
        size,
    )
}

/// `UTC` axis with the record's `xtick`/`xtickstr` ticks.
pub(crate) fn time_axis(record: &ResultRecord, range: (f64, f64)) -> Result<Axis, SchemaError> {
    let (positions, labels) = record.time_ticks()?;
    Ok(Axis::linear("UTC", range, Ticks::Fixed { positions, labels }))
}

/// Time and height centers of a time-height product.
pub(crate) fn time_height(record: &ResultRecord) -> Result<(Vec<f64>, Vec<f64>), SchemaError> {
    let time = record.series("time")?;
    let height = record.series("height")?;
    first(&time, "time")?;
    first(&height, "height")?;
    Ok((time, height))
}

/// Time axis spanning the outer edges of the mesh cells.
pub(crate) fn mesh_time_axis(record: &ResultRecord, time: &[f64]) -> Result<Axis, SchemaError> {
    let edges = cell_edges(time);
    let range = (first(&edges, "time")?, last(&edges, "time")?);
    time_axis(record, range)
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::{json, Map, Value as JsonValue};

    use crate::data::schema::RecordHeader;
    use crate::data::ResultRecord;

    /// Header fields shared by the family tests, merged with `fields`.
    pub fn record(fields: JsonValue) -> ResultRecord {
        let mut all: Map<String, JsonValue> = match json!({
            "campaignInfo": {"name": "PollyXT_LACROS", "location": "Leipzig"},
            "processInfo": {"programVersion": "2.1", "fontname": "sans-serif"},
            "taskInfo": {"dataFilename": "2019_05_20_Mon_LACROS_00_00_01.nc"},
            "imgFormat": "png",
            "figDPI": 80,
            "xtick": [737565.0, 737565.25, 737565.5],
            "xtickstr": [["00:00"], [], ["12:00"]]
        }) {
            JsonValue::Object(m) => m,
            _ => unreachable!(),
        };
        if let JsonValue::Object(extra) = fields {
            all.extend(extra);
        }
        ResultRecord::new("tmp.json", all)
    }

    pub fn header(record: &ResultRecord) -> RecordHeader {
        record.header().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::record;
    use super::*;
    use serde_json::json;

    #[test]
    fn families_are_detected_by_marker_field() {
        assert_eq!(
            Kind::detect(&record(json!({"overlap532": [0.1, 0.5]}))).unwrap(),
            Kind::Overlap
        );
        assert_eq!(
            Kind::detect(&record(json!({"LR532_raman": [50.0]}))).unwrap(),
            Kind::LidarRatio
        );
        assert!(matches!(
            Kind::detect(&record(json!({}))),
            Err(SchemaError::UnknownFamily)
        ));
    }

    #[test]
    fn footers() {
        let rec = record(json!({}));
        let header = rec.header().unwrap();
        let date = date_footer(737426.25, (0.05, 0.02), 12.0).unwrap();
        assert_eq!(date.text, "2019-01-01");
        assert_eq!(version_footer(&header, (0.8, 0.02), 12.0).text, "Version: 2.1");
        assert_eq!(site(&header), "PollyXT_LACROS at Leipzig");
        assert!(matches!(
            date_footer(f64::NAN, (0.0, 0.0), 12.0),
            Err(SchemaError::Date(_))
        ));
    }

    #[test]
    fn time_axis_uses_record_ticks() {
        let rec = record(json!({}));
        let axis = time_axis(&rec, (737565.0, 737565.5)).unwrap();
        assert_eq!(axis.label, "UTC");
        match axis.ticks {
            Ticks::Fixed { positions, labels } => {
                assert_eq!(positions.len(), 3);
                assert_eq!(labels, vec!["00:00", "", "12:00"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
