use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Float64Builder, ListBuilder, StringArray, StructArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde_json::{json, Value as JsonValue};

/// Write synthetic Polly result records, one per plot family
#[derive(Parser, Debug)]
#[command(name = "generate-sample", about, long_about = None)]
struct Cli {
    /// Directory the records are written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,
}

/// 2019-05-20 00:00 as a serial day-number.
const DAY: f64 = 737565.0;
const PROFILES: usize = 96;
const BINS: usize = 200;
const BIN_WIDTH: f64 = 60.0;
const DATA_FILENAME: &str = "2019_05_20_Mon_LACROS_00_00_01.nc";

/// Gaussian layer profile peaking at `center`.
fn layer(h: f64, center: f64, width: f64, peak: f64) -> f64 {
    peak * (-(h - center).powi(2) / (2.0 * width.powi(2))).exp()
}

/// Seeded splitmix64 stream, so every run writes the same records.
struct Noise(u64);

impl Noise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        (z ^ (z >> 31)) as f64 / u64::MAX as f64
    }

    /// `center` give or take `spread`.
    fn around(&mut self, center: f64, spread: f64) -> f64 {
        center + spread * (2.0 * self.uniform() - 1.0)
    }
}

// ---------------------------------------------------------------------------
// Shared fields
// ---------------------------------------------------------------------------

fn time() -> Vec<f64> {
    (0..PROFILES)
        .map(|i| DAY + (i as f64 + 0.5) / PROFILES as f64)
        .collect()
}

fn height() -> Vec<f64> {
    (0..BINS).map(|i| (i as f64 + 0.5) * BIN_WIDTH).collect()
}

/// Header and time ticks every three hours, labelled every six.
fn header() -> serde_json::Map<String, JsonValue> {
    let xtick: Vec<f64> = (0..=8).map(|k| DAY + k as f64 / 8.0).collect();
    let xtickstr: Vec<Vec<String>> = (0..=8)
        .map(|k| match k % 2 {
            0 => vec![format!("{:02}:00", k * 3)],
            _ => Vec::new(),
        })
        .collect();
    json!({
        "campaignInfo": {"name": "PollyXT_LACROS", "location": "Leipzig"},
        "processInfo": {"programVersion": "2.1", "fontname": "DejaVu Sans"},
        "taskInfo": {"dataFilename": DATA_FILENAME},
        "imgFormat": "png",
        "figDPI": 80,
        "schemaVersion": 1,
        "xtick": xtick,
        "xtickstr": xtickstr
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

/// Aerosol layer between 1 and 3 km plus noise, one row per height bin.
fn layer_grid(rng: &mut Noise, peak: f64, noise: f64) -> Vec<Vec<f64>> {
    let height = height();
    height
        .iter()
        .map(|&h| {
            (0..PROFILES)
                .map(|_| (layer(h, 2000.0, 600.0, peak) + rng.around(0.0, noise)).max(0.0))
                .collect()
        })
        .collect()
}

fn flag_grid(rng: &mut Noise, rate: f64) -> Vec<Vec<u8>> {
    (0..BINS)
        .map(|_| {
            (0..PROFILES)
                .map(|_| u8::from(rng.uniform() < rate))
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

fn lidar_constants(rng: &mut Noise) -> JsonValue {
    let this_time: Vec<f64> = (0..6).map(|i| DAY + 0.1 + i as f64 * 0.15).collect();
    let mut constants = |level: f64| -> Vec<f64> {
        (0..this_time.len())
            .map(|_| rng.around(level, level * 0.05))
            .collect()
    };
    json!({
        "time": time(),
        "thisTime": this_time,
        "LC355_klett": constants(4.0e14),
        "LC355_raman": constants(4.2e14),
        "LC532_klett": constants(5.0e13),
        "LC532_raman": constants(5.1e13),
        "LC532_aeronet": constants(4.9e13),
        "LC1064_klett": constants(2.5e13),
        "LC387_raman": constants(3.0e14),
        "LC607_raman": constants(1.0e13),
        "yLim355": [0, 8e14],
        "yLim532": [0, 1e14],
        "yLim1064": [0, 5e13],
        "yLim387": [0, 6e14],
        "yLim607": [0, 2e13]
    })
}

fn overlap(rng: &mut Noise) -> JsonValue {
    let height: Vec<f64> = (0..BINS).map(|i| (i as f64 + 0.5) * 15.0).collect();
    let overlap: Vec<f64> = height
        .iter()
        .map(|&h| 1.0 - (-h / 600.0).exp())
        .collect();
    let defaults: Vec<f64> = height
        .iter()
        .map(|&h| 1.0 - (-h / 500.0).exp())
        .collect();
    let glued: Vec<f64> = height
        .iter()
        .map(|&h| 500.0 * (-h / 800.0).exp() * rng.around(1.0, 0.02))
        .collect();
    let far: Vec<f64> = glued.iter().zip(&overlap).map(|(s, o)| s * o).collect();
    let near: Vec<f64> = glued
        .iter()
        .zip(&height)
        .map(|(s, &h)| s * 0.3 * (1.0 - (-h / 100.0).exp()))
        .collect();
    json!({
        "height": height,
        "overlap532": overlap,
        "overlap532Defaults": defaults,
        "sig532FR": far,
        "sig532NR": near,
        "sig532Gl": glued,
        "normRange532": [60, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70]
    })
}

fn saturation(rng: &mut Noise) -> JsonValue {
    let mut status = |rate: f64| -> Vec<Vec<u8>> {
        (0..BINS)
            .map(|bin| {
                (0..PROFILES)
                    .map(|_| match (bin, rng.uniform() < rate) {
                        (_, true) => 1,
                        (b, false) if b > 150 => 2,
                        _ => 0,
                    })
                    .collect()
            })
            .collect()
    };
    json!({
        "time": time(),
        "height": height(),
        "yLim_FR_RCS": [0, 12000],
        "SAT_FR_355": status(0.01),
        "SAT_FR_532": status(0.02),
        "SAT_FR_1064": status(0.01),
        "SAT_FR_407": status(0.005)
    })
}

fn quasi(rng: &mut Noise) -> JsonValue {
    json!({
        "time": time(),
        "height": height(),
        "yLim_Quasi_Params": [0, 12000],
        "quasi_bsc_355": layer_grid(rng, 4e-6, 1e-7),
        "quasi_bsc_532": layer_grid(rng, 2e-6, 1e-7),
        "quasi_bsc_1064": layer_grid(rng, 1e-6, 1e-7),
        "quasi_pardepol_532": layer_grid(rng, 0.25, 0.02),
        "quasi_ang_532_1064": layer_grid(rng, 1.5, 0.1),
        "quality_mask_355": flag_grid(rng, 0.05),
        "quality_mask_532": flag_grid(rng, 0.05),
        "quality_mask_1064": flag_grid(rng, 0.05),
        "quasi_beta_cRange_355": [0, 5],
        "quasi_beta_cRange_532": [0, 3],
        "quasi_beta_cRange_1064": [0, 2],
        "quasi_Par_DR_cRange_532": [0, 0.4]
    })
}

fn lidar_ratio_profiles(rng: &mut Noise) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let height = height();
    let mut profile = |level: f64| -> Vec<f64> {
        height
            .iter()
            .map(|&h| match h {
                h if (500.0..=5000.0).contains(&h) => rng.around(level, 3.0),
                _ => f64::NAN,
            })
            .collect()
    };
    let lr355 = profile(55.0);
    let lr532 = profile(48.0);
    (height, lr355, lr532)
}

fn write_json(dir: &Path, name: &str, mut family: JsonValue) -> Result<PathBuf> {
    if let JsonValue::Object(fields) = &mut family {
        fields.extend(header());
    }
    let path = dir.join(name);
    let text = serde_json::to_string(&family).context("serializing record")?;
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Parquet record (lidar ratio)
// ---------------------------------------------------------------------------

fn list_array(values: &[f64]) -> ArrayRef {
    let mut builder = ListBuilder::new(Float64Builder::new());
    let inner = builder.values();
    for &v in values {
        if v.is_finite() {
            inner.append_value(v);
        } else {
            inner.append_null();
        }
    }
    builder.append(true);
    Arc::new(builder.finish())
}

fn utf8_struct(entries: &[(&str, &str)]) -> StructArray {
    StructArray::from(
        entries
            .iter()
            .map(|(name, value)| {
                (
                    Arc::new(Field::new(*name, DataType::Utf8, false)),
                    Arc::new(StringArray::from(vec![*value])) as ArrayRef,
                )
            })
            .collect::<Vec<_>>(),
    )
}

/// One-row Parquet record: list columns for arrays, struct columns for the
/// nested header records.
fn write_lidar_ratio_parquet(dir: &Path, rng: &mut Noise) -> Result<PathBuf> {
    let (height, lr355, lr532) = lidar_ratio_profiles(rng);

    let columns: Vec<(&str, ArrayRef)> = vec![
        (
            "CampaignConfig",
            Arc::new(utf8_struct(&[("name", "PollyXT_LACROS"), ("location", "Leipzig")])),
        ),
        (
            "PicassoConfig",
            Arc::new(utf8_struct(&[("programVersion", "2.1"), ("fontname", "DejaVu Sans")])),
        ),
        (
            "PollyDataInfo",
            Arc::new(utf8_struct(&[("dataFilename", DATA_FILENAME)])),
        ),
        ("imgFormat", Arc::new(StringArray::from(vec!["png"]))),
        ("figDPI", Arc::new(Float64Array::from(vec![80.0]))),
        ("flagWatermarkOn", Arc::new(BooleanArray::from(vec![true]))),
        ("partnerLabel", Arc::new(StringArray::from(vec!["TROPOS"]))),
        ("startInd", Arc::new(Float64Array::from(vec![37.0]))),
        ("endInd", Arc::new(Float64Array::from(vec![48.0]))),
        ("time", list_array(&time())),
        ("height", list_array(&height)),
        ("LR355_raman", list_array(&lr355)),
        ("LR532_raman", list_array(&lr532)),
        ("xLim_Profi_LR", list_array(&[0.0, 120.0])),
        ("yLim_Profi_LR", list_array(&[0.0, 6000.0])),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )
    .context("creating record batch")?;

    let path = dir.join("lidar_ratio.parquet");
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;
    let dir = cli.output_dir.as_path();
    let mut rng = Noise(42);

    let written = [
        write_json(dir, "lidar_constants.json", lidar_constants(&mut rng))?,
        write_json(dir, "overlap.json", overlap(&mut rng))?,
        write_json(dir, "saturation.json", saturation(&mut rng))?,
        write_json(dir, "quasi.json", quasi(&mut rng))?,
        write_lidar_ratio_parquet(dir, &mut rng)?,
    ];
    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_seeded_and_bounded() {
        let (mut a, mut b) = (Noise(42), Noise(42));
        let draws: Vec<f64> = (0..1000).map(|_| a.around(10.0, 0.5)).collect();
        assert!(draws.iter().all(|v| (9.5..=10.5).contains(v)));
        assert_eq!(draws[..3], [b.around(10.0, 0.5), b.around(10.0, 0.5), b.around(10.0, 0.5)]);
        assert!(draws.iter().any(|v| *v < 10.0) && draws.iter().any(|v| *v > 10.0));
    }

    #[test]
    fn layer_peaks_at_its_center() {
        assert_eq!(layer(2000.0, 2000.0, 600.0, 3.0), 3.0);
        assert!(layer(4000.0, 2000.0, 600.0, 3.0) < 0.01);
    }
}
