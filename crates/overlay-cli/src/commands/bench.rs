//! Strategy comparison on one pair of images.
//!
//! Every strategy blends the same inputs `repeat` times. The sequential result
//! is the baseline the others are compared against.

use crate::{BenchArgs, StrategyArg};
use anyhow::{Context, Result};
use overlay_io::PlanarImage;
use overlay_ops::BlendEngine;
use std::time::Duration;
use tracing::info;

struct Measurement {
    label: String,
    elapsed: Duration,
    deviation: f32,
}

pub fn run(args: BenchArgs, verbose: u8) -> Result<()> {
    let (source, filter) = super::load_pair(&args.source, &args.filter)?;
    let repeat = args.engine.repeat;

    println!(
        "{}x{} ({} pixels), {} passes per strategy",
        source.width,
        source.height,
        source.pixel_count(),
        repeat
    );

    let mut baseline: Option<PlanarImage> = None;
    let mut rows = Vec::new();

    for kind in [StrategyArg::Seq, StrategyArg::Threads, StrategyArg::Simd] {
        let options = args.engine.options(kind);
        let engine = BlendEngine::new(options)
            .with_context(|| format!("Invalid configuration for {}", options.strategy))?;

        let mut result = PlanarImage::black(source.width, source.height);
        let elapsed = super::time_passes(&engine, &source, &filter, &mut result, repeat)?;

        let deviation = match &baseline {
            Some(reference) => {
                super::max_deviation(reference.buffer.as_slice(), result.buffer.as_slice())
            }
            None => 0.0,
        };
        info!(strategy = %options.strategy, ?elapsed, deviation, "strategy measured");

        rows.push(Measurement {
            label: options.strategy.to_string(),
            elapsed,
            deviation,
        });

        if kind == StrategyArg::Simd {
            if let Some(ref output) = args.output {
                super::save_image(output, &result)?;
                if verbose > 0 {
                    println!("Vectorized result saved to {}", output.display());
                }
            }
        }
        if baseline.is_none() {
            baseline = Some(result);
        }
    }

    print_table(&rows, repeat);
    Ok(())
}

fn print_table(rows: &[Measurement], repeat: u32) {
    let sequential = rows.first().map(|r| r.elapsed.as_secs_f64()).unwrap_or(0.0);

    println!();
    println!("{:<16} {:>12} {:>12} {:>9} {:>12}", "strategy", "total (s)", "pass (ms)", "speedup", "max dev");
    for row in rows {
        let total = row.elapsed.as_secs_f64();
        let speedup = if total > 0.0 { sequential / total } else { 0.0 };
        println!(
            "{:<16} {:>12.4} {:>12.3} {:>8.2}x {:>12.2e}",
            row.label,
            total,
            total * 1000.0 / f64::from(repeat),
            speedup,
            row.deviation
        );
    }
}
