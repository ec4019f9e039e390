use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use polly_display::data::LoadError;
use polly_display::figures::Kind;
use polly_display::{display, DisplayError, Options};

/// Render a Polly lidar result record to image files
#[derive(Parser, Debug)]
#[command(name = "polly-display", author, version, about, long_about = None)]
struct Cli {
    /// Result record (.json or .parquet)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Existing directory the images are written to
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Plot family to draw (detected from the record by default)
    #[arg(long, value_enum)]
    kind: Option<Kind>,

    /// PNG logo placed next to the watermark stamp
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Output format overriding the record's imgFormat (png, jpg, bmp, svg)
    #[arg(long)]
    format: Option<String>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = Options {
        kind: cli.kind,
        logo: cli.logo,
        format: cli.format,
    };

    match display(&cli.input, &cli.output_dir, &options) {
        Ok(paths) => {
            log::info!("{} image(s) written to {}", paths.len(), cli.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(DisplayError::Load(LoadError::NotFound(path))) => {
            println!("{} does not exist.", path.display());
            log::error!("{} does not exist", path.display());
            ExitCode::from(2)
        }
        Err(err @ (DisplayError::Load(_) | DisplayError::Schema { .. })) => {
            println!("Failed reading {}", cli.input.display());
            log::error!("{err}");
            ExitCode::from(2)
        }
        Err(err @ DisplayError::Render(_)) => {
            log::error!("{err}");
            ExitCode::from(1)
        }
    }
}
