use clap::{Parser, Subcommand};
use pixelshift::io::{load_gray_image, save_frame};
use pixelshift::{subtract_background, FrameShift, Image, Region, ShiftConfig, ShiftEstimator};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sub-pixel frame shifts and sky background removal")]
struct Cli {
    /// Optional JSON configuration file; command-line flags take precedence.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for diagnostics.
    #[arg(long, global = true)]
    trace: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate the sub-pixel x,y shift of a frame relative to a reference.
    Shift {
        /// Frame to measure.
        frame: PathBuf,
        /// Reference frame.
        reference: PathBuf,
        /// Minimum background tile size in pixels; should be much larger than
        /// the stellar FWHM.
        #[arg(short = 't', long)]
        tile_size: Option<usize>,
        /// Valid image region as `[x1:x2,y1:y2]` (1-based), applied to both frames.
        #[arg(short, long)]
        region: Option<String>,
        /// Emit a JSON record instead of `x y`.
        #[arg(long)]
        json: bool,
    },
    /// Subtract low-order sky variations from a frame.
    SubtractBackground {
        /// Input frame.
        input: PathBuf,
        /// Output path. `.tif`/`.tiff` is written as lossless 64-bit float;
        /// other extensions as 16-bit grayscale clamped at zero.
        output: PathBuf,
        /// Minimum background tile size in pixels.
        #[arg(short = 't', long)]
        tile_size: Option<usize>,
        /// Valid image region as `[x1:x2,y1:y2]` (1-based).
        #[arg(short, long)]
        region: Option<String>,
    },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
struct Config {
    min_tile_size: usize,
    clip_sigma: f64,
    region: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = ShiftConfig::default();
        Self {
            min_tile_size: cfg.min_tile_size,
            clip_sigma: cfg.clip_sigma,
            region: None,
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                Ok(serde_json::from_str(&text)?)
            }
            None => Ok(Self::default()),
        }
    }

    fn shift_config(&self, tile_size: Option<usize>) -> ShiftConfig {
        ShiftConfig {
            min_tile_size: tile_size.unwrap_or(self.min_tile_size),
            clip_sigma: self.clip_sigma,
        }
    }

    fn region(&self, flag: Option<String>) -> Result<Option<Region>, pixelshift::PixelShiftError> {
        flag.or_else(|| self.region.clone())
            .map(|spec| Region::parse(&spec))
            .transpose()
    }
}

#[derive(Debug, Serialize)]
struct ShiftRecord {
    x: f64,
    y: f64,
    lag_x: isize,
    lag_y: isize,
    refined_x: bool,
    refined_y: bool,
}

impl From<FrameShift> for ShiftRecord {
    fn from(value: FrameShift) -> Self {
        Self {
            x: value.x,
            y: value.y,
            lag_x: value.peak_x.lag,
            lag_y: value.peak_y.lag,
            refined_x: value.peak_x.refined,
            refined_y: value.peak_y.refined,
        }
    }
}

fn load_frame(path: &Path, region: Option<Region>) -> Result<Image, Box<dyn std::error::Error>> {
    let frame = load_gray_image(path).map_err(|err| format!("{}: {err}", path.display()))?;
    Ok(match region {
        Some(region) => frame.with_region(region)?,
        None => frame,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("pixelshift=info".parse()?),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    if cli.print_example {
        println!("{}", serde_json::to_string_pretty(&Config::default())?);
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let Some(command) = cli.command else {
        return Err("a subcommand is required (see --help)".into());
    };

    match command {
        Command::Shift {
            frame,
            reference,
            tile_size,
            region,
            json,
        } => {
            let region = config.region(region)?;
            let frame = load_frame(&frame, region)?;
            let reference = load_frame(&reference, region)?;
            let shift = ShiftEstimator::new(config.shift_config(tile_size))
                .measure(&frame, &reference)?;
            tracing::info!(x = shift.x, y = shift.y, "measured shift");

            if json {
                let record = ShiftRecord::from(shift);
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{:.2} {:.2}", shift.x, shift.y);
            }
        }
        Command::SubtractBackground {
            input,
            output,
            tile_size,
            region,
        } => {
            let region = config.region(region)?;
            let mut frame = load_frame(&input, region)?;
            let cfg = config.shift_config(tile_size);
            cfg.validate()?;
            subtract_background(&mut frame, cfg.min_tile_size)
                .map_err(|err| format!("background subtracting {}: {err}", input.display()))?;
            save_frame(&frame, &output)?;
            tracing::info!(output = %output.display(), "wrote background-subtracted frame");
        }
    }

    Ok(())
}
