use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};

// ---------------------------------------------------------------------------
// Schema versioning
// ---------------------------------------------------------------------------

/// Newest record layout this crate understands. Records without a
/// `schemaVersion` field are treated as version 1.
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Numeric values
// ---------------------------------------------------------------------------

/// Numbers as the upstream exporter writes them: a scalar, `null` for a
/// missing value, or arbitrarily nested lists (MATLAB `1xN` / `Nx1` shapes).
#[derive(Deserialize)]
#[serde(untagged)]
enum NumericTree {
    Scalar(Option<f64>),
    List(Vec<NumericTree>),
}

impl NumericTree {
    fn flatten_into(self, out: &mut Vec<f64>) {
        match self {
            NumericTree::Scalar(v) => out.push(v.unwrap_or(f64::NAN)),
            NumericTree::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

/// A one-dimensional numeric field. Nesting is flattened in row-major order
/// and `null` entries become NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series(pub Vec<f64>);

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tree = NumericTree::deserialize(deserializer)?;
        let mut values = Vec::new();
        tree.flatten_into(&mut values);
        Ok(Series(values))
    }
}

impl Series {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// A two-dimensional field stored as rows of equal length.
///
/// Time-height products use one row per height bin and one column per
/// profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Vec<Vec<Option<f64>>> = Vec::deserialize(deserializer)?;
        let cols = raw.first().map_or(0, Vec::len);
        if let Some((i, row)) = raw.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(serde::de::Error::custom(format!(
                "row {i} has {} columns, row 0 has {cols}",
                row.len()
            )));
        }
        let rows = raw.len();
        let values = raw
            .into_iter()
            .flatten()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(Grid { rows, cols, values })
    }
}

impl Grid {
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                values.push(f(r, c));
            }
        }
        Grid { rows, cols, values }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    /// Apply `f` to every cell, keeping the shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Grid {
        Grid {
            rows: self.rows,
            cols: self.cols,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }
}

/// A boolean written either as `true`/`false` or as MATLAB `0`/`1`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(Series),
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(b) => b,
        RawFlag::Number(s) => s.0.first().is_some_and(|v| *v != 0.0),
    })
}

fn deserialize_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let series = Series::deserialize(deserializer)?;
    match series.0.as_slice() {
        [v] => Ok(*v),
        other => Err(serde::de::Error::custom(format!(
            "expected a single number, found {} values",
            other.len()
        ))),
    }
}

/// Strings may arrive as empty lists when the exporter had nothing to write.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Wrapped(Vec<String>),
}

fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawText::deserialize(deserializer)? {
        RawText::Text(s) => s,
        RawText::Wrapped(parts) => parts.concat(),
    })
}

// ---------------------------------------------------------------------------
// Record header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignInfo {
    #[serde(deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    #[serde(deserialize_with = "deserialize_text")]
    pub program_version: String,
    #[serde(default = "default_font", deserialize_with = "deserialize_text")]
    pub fontname: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    #[serde(deserialize_with = "deserialize_text")]
    pub data_filename: String,
}

/// Fields shared by every result record: provenance and styling hints.
///
/// Newer exporters name the nested records `CampaignConfig`,
/// `PicassoConfig` and `PollyDataInfo`; both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordHeader {
    #[serde(rename = "campaignInfo", alias = "CampaignConfig")]
    pub campaign: CampaignInfo,

    #[serde(rename = "processInfo", alias = "PicassoConfig")]
    pub process: ProcessInfo,

    #[serde(rename = "taskInfo", alias = "PollyDataInfo")]
    pub task: TaskInfo,

    #[serde(
        rename = "imgFormat",
        default = "default_format",
        deserialize_with = "deserialize_text"
    )]
    pub img_format: String,

    #[serde(rename = "figDPI", default = "default_dpi", deserialize_with = "deserialize_scalar")]
    pub fig_dpi: f64,

    #[serde(rename = "flagWatermarkOn", default, deserialize_with = "deserialize_flag")]
    pub watermark_on: bool,

    #[serde(rename = "partnerLabel", default, deserialize_with = "deserialize_text")]
    pub partner_label: String,

    #[serde(rename = "schemaVersion", default = "default_schema_version")]
    pub schema_version: u32,
}

/// Top-level keys (including aliases) read into [`RecordHeader`].
pub(crate) const HEADER_KEYS: &[&str] = &[
    "campaignInfo",
    "CampaignConfig",
    "processInfo",
    "PicassoConfig",
    "taskInfo",
    "PollyDataInfo",
    "imgFormat",
    "figDPI",
    "flagWatermarkOn",
    "partnerLabel",
    "schemaVersion",
];

/// Legacy and current spellings of the nested header records.
const HEADER_SPELLINGS: &[(&str, &str)] = &[
    ("campaignInfo", "CampaignConfig"),
    ("processInfo", "PicassoConfig"),
    ("taskInfo", "PollyDataInfo"),
];

/// The header keys of `fields`. A record carrying both spellings of one
/// nested record keeps the current spelling.
pub(crate) fn header_fields(fields: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let mut subset: Map<String, JsonValue> = HEADER_KEYS
        .iter()
        .filter_map(|key| fields.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect();
    for (legacy, current) in HEADER_SPELLINGS {
        if subset.contains_key(*current) && subset.remove(*legacy).is_some() {
            log::warn!("record has both {legacy} and {current}, using {current}");
        }
    }
    subset
}

fn default_font() -> String {
    "sans-serif".to_string()
}

fn default_format() -> String {
    "png".to_string()
}

fn default_dpi() -> f64 {
    80.0
}

fn default_schema_version() -> u32 {
    1
}
