use std::path::Path;

use anyhow::{Context, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::error::LoadError;
use super::model::ResultRecord;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a result record from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`          – a single top-level object, one key per field
/// * `.parquet`/`.pq` – one row; each column is a field, list columns hold
///   arrays and struct columns hold nested records
///
/// Unknown extensions are tried as JSON.
pub fn load_file(path: &Path) -> Result<ResultRecord, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let fields = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        _ => load_json(path),
    }?;

    log::debug!("loaded {} fields from {}", fields.len(), path.display());
    Ok(ResultRecord::new(path, fields))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON layout:
///
/// ```json
/// {
///   "campaignInfo": { "name": "PollyXT_LACROS", "location": "Leipzig" },
///   "time": [737426.0, 737426.0104, ...],
///   "height": [7.5, 15.0, ...],
///   "SAT_FR_532": [[0, 0, 1, ...], ...],
///   ...
/// }
/// ```
fn load_json(path: &Path) -> Result<Map<String, JsonValue>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        cause: anyhow::Error::new(e).context("reading JSON file"),
    })?;
    parse_json(&text).map_err(|cause| LoadError::Parse {
        path: path.to_path_buf(),
        cause,
    })
}

fn parse_json(text: &str) -> Result<Map<String, JsonValue>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    match root {
        JsonValue::Object(fields) => Ok(fields),
        _ => anyhow::bail!("Expected top-level JSON object"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load the first row of a Parquet file as a record.
///
/// Rows are converted through Arrow's JSON writer so both file formats share
/// the same field representation.
fn load_parquet(path: &Path) -> Result<Map<String, JsonValue>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        cause: anyhow::Error::new(e).context("opening parquet file"),
    })?;
    read_first_row(file).map_err(|cause| LoadError::Parse {
        path: path.to_path_buf(),
        cause,
    })
}

fn read_first_row(file: std::fs::File) -> Result<Map<String, JsonValue>> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let mut reader = builder.build().context("building parquet reader")?;

    let batch = reader
        .next()
        .context("parquet file holds no record batches")?
        .context("reading parquet record batch")?;
    if batch.num_rows() > 1 {
        log::warn!(
            "parquet record has {} rows; only the first is used",
            batch.num_rows()
        );
    }

    let mut writer = arrow::json::ArrayWriter::new(Vec::new());
    writer
        .write_batches(&[&batch.slice(0, batch.num_rows().min(1))])
        .context("converting parquet row")?;
    writer.finish().context("converting parquet row")?;
    let rows: Vec<Map<String, JsonValue>> =
        serde_json::from_slice(&writer.into_inner()).context("parsing converted row")?;

    rows.into_iter()
        .next()
        .context("parquet record batch is empty")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_must_be_an_object() {
        assert!(parse_json(r#"{"figDPI": 80}"#).is_ok());
        let err = parse_json("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("top-level JSON object"));
        assert!(parse_json("{not json").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let path = Path::new("does/not/exist.json");
        match load_file(path) {
            Err(LoadError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("unexpected {other:?}"),
        }
    }
}
