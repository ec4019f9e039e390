/// Data layer: result records, loading, schema checks and masking.
///
/// Architecture:
/// ```text
///  .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → ResultRecord (fields untouched)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ResultRecord  │  typed accessors, header, shape checks (schema)
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   mask    │  quality flags / log-axis masking → NaN cells
///   └──────────┘
/// ```

pub mod error;
pub mod loader;
pub mod mask;
pub mod model;
pub mod schema;

pub use error::{LoadError, SchemaError};
pub use loader::load_file;
pub use model::ResultRecord;
