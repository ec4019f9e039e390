use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Float64Builder, ListBuilder, StringArray, StructArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use polly_display::data::{load_file, LoadError};

fn list(values: &[Option<f64>]) -> ArrayRef {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for v in values {
        builder.values().append_option(*v);
    }
    builder.append(true);
    Arc::new(builder.finish())
}

#[test]
fn parquet_row_becomes_a_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("record.parquet");

    let campaign = StructArray::from(vec![
        (
            Arc::new(Field::new("name", DataType::Utf8, false)),
            Arc::new(StringArray::from(vec!["PollyXT_LACROS"])) as ArrayRef,
        ),
        (
            Arc::new(Field::new("location", DataType::Utf8, false)),
            Arc::new(StringArray::from(vec!["Leipzig"])) as ArrayRef,
        ),
    ]);
    let columns: Vec<(&str, ArrayRef)> = vec![
        ("campaignInfo", Arc::new(campaign)),
        ("figDPI", Arc::new(Float64Array::from(vec![80.0]))),
        ("height", list(&[Some(7.5), None, Some(22.5)])),
    ];
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch =
        RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect()).unwrap();
    let mut writer = ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let record = load_file(&path).unwrap();
    assert_eq!(record.source, path);
    assert_eq!(record.scalar("figDPI").unwrap(), 80.0);

    let height = record.series("height").unwrap();
    assert_eq!(height.len(), 3);
    assert!(height[1].is_nan());
    assert_eq!(record.fields["campaignInfo"]["location"], "Leipzig");
}

#[test]
fn unreadable_parquet_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("record.parquet");
    std::fs::write(&path, b"not parquet").unwrap();
    assert!(matches!(load_file(&path), Err(LoadError::Parse { .. })));
}

#[test]
fn unknown_extension_is_read_as_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("record.mat");
    std::fs::write(&path, r#"{"figDPI": [[120]]}"#).unwrap();
    let record = load_file(&path).unwrap();
    assert_eq!(record.scalar("figDPI").unwrap(), 120.0);
}
