//! Raman lidar ratio profiles at 355 and 532 nm averaged over one cloud-free
//! window.

use super::site;
use crate::color::hex_or_black;
use crate::data::schema::RecordHeader;
use crate::data::{ResultRecord, SchemaError};
use crate::datenum::datenum_to_datetime;
use crate::render::{
    AxesRect, Axis, Figure, FigureBody, FigureText, LegendPosition, LinePanel, LineStyle, Series,
    Ticks,
};

const PROFILES: [(&str, &str, &str); 2] = [
    ("LR355_raman", "355 nm", "#0000ff"),
    ("LR532_raman", "532 nm", "#00b300"),
];

pub fn figures(record: &ResultRecord, header: &RecordHeader) -> Result<Vec<Figure>, SchemaError> {
    let height = record.series("height")?;
    let time = record.series("time")?;
    let start = datenum_to_datetime(time[record.index("startInd", time.len())?])?;
    let end = datenum_to_datetime(time[record.index("endInd", time.len())?])?;

    let mut series = Vec::with_capacity(PROFILES.len());
    for (field, label, color) in PROFILES {
        let ratio = record.series_of_len(field, height.len())?;
        series.push(Series::line(
            label,
            ratio,
            height.clone(),
            hex_or_black(color),
            LineStyle::Solid,
        ));
    }

    let panel = LinePanel {
        rect: AxesRect::new(0.21, 0.15, 0.74, 0.75),
        x: Axis::linear(
            "Lidar Ratio [Sr]",
            record.limits("xLim_Profi_LR")?,
            Ticks::MaxN {
                bins: 6,
                prune_lower: false,
            },
        ),
        y: Axis::linear(
            "Height (m)",
            record.limits("yLim_Profi_LR")?,
            Ticks::Multiple {
                major: 1000.0,
                minor: Some(200.0),
            },
        ),
        series,
        ref_lines: Vec::new(),
        grid: true,
        legend: Some(LegendPosition::UpperRight),
        legend_size: 15.0,
    };

    Ok(vec![Figure {
        tag: format!(
            "{}_{}_OC_LR_Raman",
            start.format("%H%M"),
            end.format("%H%M")
        ),
        size: (5.0, 8.0),
        title: Some(format!(
            "{}\n[Averaged] {}-{}",
            site(header),
            start.format("%Y%m%d %H:%M"),
            end.format("%H:%M")
        )),
        title_size: 15.0,
        body: FigureBody::Lines(vec![panel]),
        texts: vec![FigureText::new(
            format!(
                "Version: {}\nMethod: Raman",
                header.process.program_version
            ),
            (0.02, 0.01),
            12.0,
        )],
        watermark: true,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figures::testing::{header, record};
    use serde_json::json;

    fn sample() -> ResultRecord {
        record(json!({
            "height": [500.0, 1000.0, 1500.0],
            "time": [737565.0, 737565.25, 737565.5],
            "startInd": [[2]],
            "endInd": 3,
            "LR355_raman": [50.0, null, 60.0],
            "LR532_raman": [45.0, 48.0, 52.0],
            "xLim_Profi_LR": [0, 120],
            "yLim_Profi_LR": [0, 5000]
        }))
    }

    #[test]
    fn tag_and_title_carry_the_averaging_window() {
        let rec = sample();
        let figs = figures(&rec, &header(&rec)).unwrap();
        assert_eq!(figs.len(), 1);
        assert_eq!(figs[0].tag, "0600_1200_OC_LR_Raman");
        assert_eq!(
            figs[0].title.as_deref(),
            Some("PollyXT_LACROS at Leipzig\n[Averaged] 20190520 06:00-12:00")
        );
        assert_eq!(figs[0].texts[0].text, "Version: 2.1\nMethod: Raman");
        assert!(figs[0].watermark);
    }

    #[test]
    fn index_outside_time_is_rejected() {
        let mut rec = sample();
        rec.fields.insert("endInd".into(), json!(4));
        assert!(matches!(
            figures(&rec, &header(&rec)),
            Err(SchemaError::Invalid { field, .. }) if field == "endInd"
        ));
    }

    #[test]
    fn profile_length_must_match_height() {
        let mut rec = sample();
        rec.fields.insert("LR532_raman".into(), json!([45.0, 48.0]));
        assert!(matches!(
            figures(&rec, &header(&rec)),
            Err(SchemaError::LengthMismatch { field, .. }) if field == "LR532_raman"
        ));
    }
}
