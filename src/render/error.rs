use std::path::PathBuf;

/// Errors raised while drawing a figure or writing it to disk.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The output directory is missing
    #[error("output directory {} does not exist", .0.display())]
    MissingOutputDir(PathBuf),

    /// `imgFormat` names an encoding no backend can write
    #[error("unsupported image format '{0}'")]
    UnsupportedFormat(String),

    /// The plotting backend failed (or panicked) while drawing
    #[error("plotting error in {}: {message}", .path.display())]
    Backend { path: PathBuf, message: String },

    /// The watermark logo could not be decoded
    #[error("watermark logo {}: {source}", .path.display())]
    Logo {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
