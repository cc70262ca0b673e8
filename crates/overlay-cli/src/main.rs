//! overlay - Overlay blend CLI
//!
//! Blends a source image with a filter image and times the three execution
//! strategies of `overlay-ops`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use overlay_ops::packet::DEFAULT_PACKET_WIDTH;
use overlay_ops::{BlendOptions, Strategy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Passes timed per run.
const DEFAULT_REPEAT: u32 = 60;

/// Workers for the threaded strategy.
const DEFAULT_THREADS: usize = 16;

#[derive(Parser)]
#[command(name = "overlay")]
#[command(author, version, about = "Overlay blend of two RGB images")]
#[command(long_about = "
Computes the overlay blend of a source image with a filter image:

  dst = (filter / 255) * (filter + (2 * source / 255) * (255 - filter))

per pixel and per channel, using a sequential loop, a statically
partitioned thread pool or fixed-width SIMD packets.

Examples:
  overlay info bailarina.bmp
  overlay blend bailarina.bmp background.bmp -o out.bmp
  overlay blend a.png b.png -o out.png --strategy threads -j 8
  overlay blend a.png b.png -o out.png --strategy simd -w 4 --saturate
  overlay bench bailarina.bmp background.bmp -n 100
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Blend two images and write the result
    #[command(visible_alias = "b")]
    Blend(BlendArgs),

    /// Time every strategy on the same inputs and compare their results
    Bench(BenchArgs),

    /// Display image dimensions
    #[command(visible_alias = "i")]
    Info(InfoArgs),
}

/// Execution strategy selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Scalar loop over every pixel
    #[value(alias = "sequential")]
    Seq,
    /// Static ranges on a thread pool
    #[value(alias = "threaded")]
    Threads,
    /// Fixed-width vector packets with a masked tail
    #[value(alias = "vectorized")]
    Simd,
}

/// Engine parameters shared by `blend` and `bench`.
#[derive(Args, Clone, Debug)]
struct EngineArgs {
    /// Worker threads for the threaded strategy
    #[arg(short = 'j', long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Lanes per packet for the vectorized strategy (1, 2, 4, 8 or 16)
    #[arg(short = 'w', long, default_value_t = DEFAULT_PACKET_WIDTH)]
    packet_width: usize,

    /// Number of blend passes to time
    #[arg(short = 'n', long, default_value_t = DEFAULT_REPEAT,
          value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,

    /// Clamp every result to [0, 255]
    #[arg(long)]
    saturate: bool,
}

impl EngineArgs {
    fn strategy(&self, kind: StrategyArg) -> Strategy {
        match kind {
            StrategyArg::Seq => Strategy::Sequential,
            StrategyArg::Threads => Strategy::Threaded { threads: self.threads },
            StrategyArg::Simd => Strategy::Vectorized { packet_width: self.packet_width },
        }
    }

    fn options(&self, kind: StrategyArg) -> BlendOptions {
        BlendOptions::new(self.strategy(kind)).with_saturate(self.saturate)
    }
}

#[derive(Args)]
struct BlendArgs {
    /// Source image
    source: PathBuf,

    /// Filter image (same dimensions as the source)
    filter: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Execution strategy
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Seq)]
    strategy: StrategyArg,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args)]
struct BenchArgs {
    /// Source image
    source: PathBuf,

    /// Filter image (same dimensions as the source)
    filter: PathBuf,

    /// Write the vectorized result here
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Show per-channel min/max/mean
    #[arg(short, long)]
    stats: bool,
}

/// Installs the console subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose > 1)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Blend(args) => commands::blend::run(args, cli.verbose),
        Commands::Bench(args) => commands::bench::run(args, cli.verbose),
        Commands::Info(args) => commands::info::run(args, cli.verbose),
    }
}
