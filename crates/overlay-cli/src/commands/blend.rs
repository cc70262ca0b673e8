//! Blend command

use crate::BlendArgs;
use anyhow::{Context, Result};
use overlay_io::PlanarImage;
use overlay_ops::BlendEngine;
use tracing::{debug, info};

pub fn run(args: BlendArgs, verbose: u8) -> Result<()> {
    let (source, filter) = super::load_pair(&args.source, &args.filter)?;
    let options = args.engine.options(args.strategy);
    let engine = BlendEngine::new(options).context("Invalid blend configuration")?;
    debug!(?engine, "engine ready");

    if verbose > 0 {
        println!(
            "Blending {} with {} ({}x{}, {}, {} passes)",
            args.source.display(),
            args.filter.display(),
            source.width,
            source.height,
            options.strategy,
            args.engine.repeat
        );
    }

    let mut result = PlanarImage::black(source.width, source.height);
    let elapsed =
        super::time_passes(&engine, &source, &filter, &mut result, args.engine.repeat)?;

    println!("Elapsed time: {:.4}s", elapsed.as_secs_f64());
    info!(
        strategy = %options.strategy,
        passes = args.engine.repeat,
        per_pass_ms = elapsed.as_secs_f64() * 1000.0 / f64::from(args.engine.repeat),
        "blend finished"
    );

    super::save_image(&args.output, &result)?;

    if verbose > 0 {
        println!("Saved {}", args.output.display());
    }

    Ok(())
}
