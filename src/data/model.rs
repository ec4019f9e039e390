use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::error::SchemaError;
use super::schema::{header_fields, Grid, RecordHeader, Series, SUPPORTED_SCHEMA_VERSION};
use crate::labels::flatten_labels;

// ---------------------------------------------------------------------------
// ResultRecord – the loaded field set
// ---------------------------------------------------------------------------

/// A result record exactly as the upstream pipeline wrote it.
///
/// Loading never validates shapes; typed accessors below check each field
/// when a plot family asks for it, naming the field in the error.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    /// File the record was read from.
    pub source: PathBuf,
    /// Named fields: arrays, scalars and nested records.
    pub fields: Map<String, JsonValue>,
}

impl ResultRecord {
    pub fn new(source: impl Into<PathBuf>, fields: Map<String, JsonValue>) -> Self {
        ResultRecord {
            source: source.into(),
            fields,
        }
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|v| !v.is_null())
    }

    /// Deserialize a required field.
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T, SchemaError> {
        let value = self
            .fields
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| SchemaError::Missing(name.to_string()))?;
        T::deserialize(value).map_err(|e| SchemaError::invalid(name, e))
    }

    /// Deserialize a field that may be absent.
    pub fn optional_field<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, SchemaError> {
        if self.contains(name) {
            self.field(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// A one-dimensional numeric field.
    pub fn series(&self, name: &str) -> Result<Vec<f64>, SchemaError> {
        self.field::<Series>(name).map(Series::into_inner)
    }

    /// A numeric field that must hold exactly `len` values.
    pub fn series_of_len(&self, name: &str, len: usize) -> Result<Vec<f64>, SchemaError> {
        let values = self.series(name)?;
        expect_len(name, values.len(), len)?;
        Ok(values)
    }

    /// A single number, possibly wrapped as `[v]` or `[[v]]`.
    pub fn scalar(&self, name: &str) -> Result<f64, SchemaError> {
        let values = self.series_of_len(name, 1)?;
        Ok(values[0])
    }

    /// A `[lower, upper]` pair such as an axis or color limit.
    pub fn limits(&self, name: &str) -> Result<(f64, f64), SchemaError> {
        let values = self.series_of_len(name, 2)?;
        Ok((values[0], values[1]))
    }

    /// A 1-based index into another field, converted to 0-based.
    pub fn index(&self, name: &str, len: usize) -> Result<usize, SchemaError> {
        let raw = self.scalar(name)?;
        if raw.fract() != 0.0 || raw < 1.0 || raw > len as f64 {
            return Err(SchemaError::invalid(
                name,
                format!("{raw} is not an index in 1..={len}"),
            ));
        }
        Ok(raw as usize - 1)
    }

    /// A two-dimensional field that must be `rows` by `cols`.
    pub fn grid(&self, name: &str, rows: usize, cols: usize) -> Result<Grid, SchemaError> {
        let grid: Grid = self.field(name)?;
        if grid.rows() != rows || grid.cols() != cols {
            return Err(SchemaError::Shape {
                field: name.to_string(),
                rows,
                cols,
                message: format!("found {}x{}", grid.rows(), grid.cols()),
            });
        }
        Ok(grid)
    }

    /// Tick positions (`xtick`) and their flattened labels (`xtickstr`).
    pub fn time_ticks(&self) -> Result<(Vec<f64>, Vec<String>), SchemaError> {
        let positions = self.series("xtick")?;
        let cells: Vec<Vec<String>> = match self.optional_field::<Vec<LabelCell>>("xtickstr")? {
            Some(cells) => cells.into_iter().map(LabelCell::into_vec).collect(),
            None => vec![Vec::new(); positions.len()],
        };
        let labels = flatten_labels(&cells)?;
        expect_len("xtickstr", labels.len(), positions.len())?;
        Ok((positions, labels))
    }

    /// Provenance and styling fields shared by all plot families.
    pub fn header(&self) -> Result<RecordHeader, SchemaError> {
        let subset = header_fields(&self.fields);
        let header: RecordHeader = serde_json::from_value(JsonValue::Object(subset))
            .map_err(|e| SchemaError::invalid("header", e))?;
        if header.schema_version > SUPPORTED_SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                found: header.schema_version,
                supported: SUPPORTED_SCHEMA_VERSION,
            });
        }
        Ok(header)
    }

    /// Base name for output images: the upstream data filename without its
    /// extension, or the record's own file stem when that is blank.
    pub fn output_base(&self, header: &RecordHeader) -> String {
        let stem = |p: &Path| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string()
        };
        let from_task = stem(Path::new(header.task.data_filename.trim()));
        if from_task.is_empty() {
            stem(&self.source)
        } else {
            from_task
        }
    }
}

/// One tick label cell: `[]`, `["label"]` or a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelCell {
    Text(String),
    List(Vec<String>),
}

impl LabelCell {
    fn into_vec(self) -> Vec<String> {
        match self {
            LabelCell::Text(s) => vec![s],
            LabelCell::List(v) => v,
        }
    }
}

pub(crate) fn expect_len(field: &str, found: usize, expected: usize) -> Result<(), SchemaError> {
    if found == expected {
        Ok(())
    } else {
        Err(SchemaError::LengthMismatch {
            field: field.to_string(),
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: JsonValue) -> ResultRecord {
        match value {
            JsonValue::Object(fields) => ResultRecord::new("tmp.json", fields),
            _ => unreachable!(),
        }
    }

    #[test]
    fn typed_accessors_name_the_field() {
        let rec = record(json!({
            "height": [[7.5, 15.0, 22.5]],
            "yLim": [0, 3000],
            "startInd": [[2]],
            "overlap532": [1.0, 2.0]
        }));
        assert_eq!(rec.series("height").unwrap(), vec![7.5, 15.0, 22.5]);
        assert_eq!(rec.limits("yLim").unwrap(), (0.0, 3000.0));
        assert_eq!(rec.index("startInd", 3).unwrap(), 1);

        match rec.series_of_len("overlap532", 3) {
            Err(SchemaError::LengthMismatch { field, expected, found }) => {
                assert_eq!(field, "overlap532");
                assert_eq!((expected, found), (3, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(rec.series("sig532FR"), Err(SchemaError::Missing(f)) if f == "sig532FR"));
        assert!(rec.index("startInd", 1).is_err());
    }

    #[test]
    fn grid_shape_is_checked() {
        let rec = record(json!({"SAT_FR_532": [[0, 1, 2], [2, 1, 0]]}));
        assert!(rec.grid("SAT_FR_532", 2, 3).is_ok());
        assert!(matches!(
            rec.grid("SAT_FR_532", 3, 2),
            Err(SchemaError::Shape { .. })
        ));
    }

    #[test]
    fn tick_labels_follow_positions() {
        let rec = record(json!({
            "xtick": [737426.0, 737426.25, 737426.5],
            "xtickstr": [["00:00"], [], ["12:00"]]
        }));
        let (positions, labels) = rec.time_ticks().unwrap();
        assert_eq!(positions.len(), 3);
        assert_eq!(labels, vec!["00:00", "", "12:00"]);

        let short = record(json!({"xtick": [1.0, 2.0], "xtickstr": [["a"]]}));
        assert!(matches!(
            short.time_ticks(),
            Err(SchemaError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn header_version_gate() {
        let rec = record(json!({
            "campaignInfo": {"name": "Polly_1st", "location": "Punta Arenas"},
            "processInfo": {"programVersion": "2.0"},
            "taskInfo": {"dataFilename": "2019_01_10_Thu_PA_00_00_01.nc"},
            "schemaVersion": 9
        }));
        assert!(matches!(
            rec.header(),
            Err(SchemaError::UnsupportedVersion { found: 9, .. })
        ));
    }

    #[test]
    fn output_base_strips_extension() {
        let rec = record(json!({
            "campaignInfo": {"name": "Polly_1st", "location": "Punta Arenas"},
            "processInfo": {"programVersion": "2.0"},
            "taskInfo": {"dataFilename": "2019_01_10_Thu_PA_00_00_01.nc"}
        }));
        let header = rec.header().unwrap();
        assert_eq!(rec.output_base(&header), "2019_01_10_Thu_PA_00_00_01");
    }
}
