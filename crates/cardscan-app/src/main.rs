// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cardscan — business card detection and perspective correction.
//
// Entry point. Initialises logging, loads settings, and runs one subcommand.

mod commands;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use cardscan_core::config::RectifyStrategy;
use cardscan_core::human_errors::humanize_error;
use clap::{Args, Parser, Subcommand, ValueEnum};

use commands::Tone;

#[derive(Parser)]
#[command(name = "cardscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find, straighten and tidy up photos of business cards", long_about = None)]
struct Cli {
    /// Settings file (JSON). Defaults to $XDG_CONFIG_HOME/cardscan/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the detected card outline and confidence as JSON
    Detect {
        image: PathBuf,
    },
    /// Detect the card and correct its perspective
    Rectify {
        image: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Override the configured source-mapping strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Hand the result to the text extractor and print the card record
        #[arg(long)]
        extract: bool,

        #[command(flatten)]
        tone: ToneArgs,
    },
    /// Clip an axis-aligned region
    Crop {
        image: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        x: f32,

        #[arg(long)]
        y: f32,

        #[arg(long)]
        width: f32,

        #[arg(long)]
        height: f32,

        #[command(flatten)]
        tone: ToneArgs,
    },
    /// Rotate and adjust brightness/contrast
    Enhance {
        image: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Rotation in degrees, -180 to 180
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        rotate: f32,

        #[command(flatten)]
        tone: ToneArgs,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct ToneArgs {
    /// Brightness percent, 50 to 200
    #[arg(long, default_value_t = 100.0)]
    brightness: f32,

    /// Contrast percent, 50 to 200
    #[arg(long, default_value_t = 100.0)]
    contrast: f32,
}

impl From<ToneArgs> for Tone {
    fn from(args: ToneArgs) -> Self {
        Tone { brightness: args.brightness, contrast: args.contrast }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Solve the 8x8 linear system
    Linear,
    /// Interpolate along the quad's edges
    Edge,
}

impl From<StrategyArg> for RectifyStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Linear => RectifyStrategy::LinearSystem,
            StrategyArg::Edge => RectifyStrategy::EdgeInterpolation,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "cardscan failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> cardscan_core::error::Result<()> {
    let config = services::load_config(cli.config.as_deref())?;

    let written = match cli.command {
        Commands::Detect { image } => {
            let candidate = commands::detect(&image, &config)?;
            println!("{}", serde_json::to_string_pretty(&candidate)?);
            return Ok(());
        }
        Commands::Rectify { image, output, strategy, extract, tone } => {
            let written =
                commands::rectify(&image, &output, strategy.map(Into::into), tone.into(), extract, &config)?;
            (output, written)
        }
        Commands::Crop { image, output, x, y, width, height, tone } => {
            let written = commands::crop(&image, &output, (x, y, width, height), tone.into(), &config)?;
            (output, written)
        }
        Commands::Enhance { image, output, rotate, tone } => {
            let written = commands::enhance(&image, &output, rotate, tone.into(), &config)?;
            (output, written)
        }
    };

    let (output, written) = written;
    let (width, height) = written.dimensions;
    println!("{} ({width}x{height}) {:?}", output.display(), written.geometry);
    if let Some(card) = &written.card {
        println!("{}", serde_json::to_string_pretty(card)?);
    }
    Ok(())
}
