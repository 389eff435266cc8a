//! strain-compare: compare two strain surfaces point by point.
//!
//! Aligns the receiver surface to the donor surface, samples the donor
//! strain at every receiver point and writes `strainCompare.vtu` and
//! `strainCompare.txt` to the output directory.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output, or use
//! `-v` (info), `-vv` (debug), `-vvv` (trace):
//! - `RUST_LOG=strain_registration=debug` - ICP iterations
//! - `RUST_LOG=strain_volume=info` - extrusion and probe counts
//!
//! # Example
//!
//! ```bash
//! # Explicit initial transform (translate, then rotate about X, Y, Z)
//! strain-compare dt.vtp instron.vtp out/ --translate 0 0 12.5 --rotate 0 0 90
//!
//! # Three landmark pairs picked on each surface
//! strain-compare dt.vtp instron.vtp out/ \
//!     --receiver-landmarks 0 0 0  10 0 0  0 10 0 \
//!     --donor-landmarks    1 2 0  11 2 0  1 12 0
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod compare;

/// strain-compare - Compare two strain-field surfaces.
///
/// The receiver (moving) surface is aligned onto the donor (fixed) surface;
/// the donor strain is sampled at every receiver point and differenced.
#[derive(Parser, Debug)]
#[command(name = "strain-compare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Receiver (moving) surface, .vtp or .vtu
    pub receiver: PathBuf,

    /// Donor (fixed) surface, .vtp or .vtu
    pub donor: PathBuf,

    /// Directory for strainCompare.vtu and strainCompare.txt
    pub output_dir: PathBuf,

    /// Initial translation of the receiver
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        conflicts_with_all = ["receiver_landmarks", "donor_landmarks"]
    )]
    pub translate: Option<Vec<f64>>,

    /// Initial rotation of the receiver in degrees, applied about X, then Y, then Z
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        conflicts_with_all = ["receiver_landmarks", "donor_landmarks"]
    )]
    pub rotate: Option<Vec<f64>>,

    /// Three landmark points on the receiver (9 coordinates)
    #[arg(
        long,
        num_args = 9,
        value_name = "COORD",
        allow_negative_numbers = true,
        requires = "donor_landmarks"
    )]
    pub receiver_landmarks: Option<Vec<f64>>,

    /// The matching three landmark points on the donor (9 coordinates)
    #[arg(
        long,
        num_args = 9,
        value_name = "COORD",
        allow_negative_numbers = true,
        requires = "receiver_landmarks"
    )]
    pub donor_landmarks: Option<Vec<f64>>,

    /// Donor extrusion direction
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub extrude_direction: Option<Vec<f64>>,

    /// Donor extrusion offset on each side of the surface
    #[arg(long)]
    pub extrude_length: Option<f64>,

    /// Maximum ICP iterations (0 disables refinement)
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Output name for the receiver values [default: Drop Tower Strain]
    #[arg(long)]
    pub receiver_name: Option<String>,

    /// Output name for the donor values [default: Instron Strain]
    #[arg(long)]
    pub donor_name: Option<String>,

    /// JSON pipeline configuration; command-line options override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the aligned receiver and the donor volume
    #[arg(long)]
    pub write_intermediates: bool,

    /// Output format for the summary
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short)]
    pub quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "warn,strain_registration=info,strain_volume=info,strain_compile=info,strain_compare=info",
            2 => "info,strain_registration=debug,strain_volume=debug,strain_compile=debug,strain_io=debug,strain_compare=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = compare::run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {}: {}", "Caused by".yellow(), cause);
        }
        std::process::exit(1);
    }

    Ok(())
}
