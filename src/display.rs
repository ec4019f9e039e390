use std::path::{Path, PathBuf};

use crate::data::{load_file, LoadError, SchemaError};
use crate::figures::{self, Kind};
use crate::render::{render_figure, RenderError};
use crate::style::{ImageFormat, Style};

/// Anything that stops a display run.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{}: {source}", .path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Knobs the caller may set on top of what the record carries.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Plot family; detected from the record's fields when `None`.
    pub kind: Option<Kind>,
    /// License logo drawn next to the watermark stamp.
    pub logo: Option<PathBuf>,
    /// Output format overriding the record's `imgFormat`.
    pub format: Option<String>,
}

/// Render every figure of the record at `input` into `out_dir`.
///
/// Loading and schema problems are reported before anything is written.
/// Returns the written files in drawing order.
pub fn display(input: &Path, out_dir: &Path, options: &Options) -> Result<Vec<PathBuf>, DisplayError> {
    let record = load_file(input)?;
    let schema_error = |source| DisplayError::Schema {
        path: input.to_path_buf(),
        source,
    };

    let header = record.header().map_err(schema_error)?;
    let mut style = Style::from_header(&header, options.logo.clone())?;
    if let Some(raw) = &options.format {
        let format = ImageFormat::parse(raw)?;
        style = style.with_format(format, raw.trim().trim_start_matches('.'));
    }

    let kind = match options.kind {
        Some(kind) => kind,
        None => Kind::detect(&record).map_err(schema_error)?,
    };
    log::info!("{}: {kind:?} record", input.display());

    let figures = figures::build(kind, &record, &header).map_err(schema_error)?;
    let base = record.output_base(&header);

    figures
        .iter()
        .map(|figure| render_figure(figure, &style, out_dir, &base).map_err(DisplayError::from))
        .collect()
}
