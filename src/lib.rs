//! Render Polly/PollyXT lidar result records to plot images.
//!
//! ```text
//!   input file ──► data::load_file ──► ResultRecord
//!                                        │ header(), Kind::detect
//!                                        ▼
//!                          figures::build ──► Vec<Figure>
//!                                        │ Style (font, DPI, format, watermark)
//!                                        ▼
//!                          render::render_figure ──► <base>_<tag>.<ext>
//! ```

pub mod color;
pub mod data;
pub mod datenum;
pub mod display;
pub mod figures;
pub mod labels;
pub mod render;
pub mod style;

pub use display::{display, DisplayError, Options};
