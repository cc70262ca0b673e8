//! Image info command.

use crate::InfoArgs;
use anyhow::Result;
use overlay_core::Channel;
use overlay_io::PlanarImage;

/// Prints dimensions, and per-channel statistics with `--stats`.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    for path in &args.input {
        let image = super::load_image(path)?;

        println!("{}", path.display());
        println!("  Dimensions: {}x{}", image.width, image.height);
        println!("  Pixels:     {}", image.pixel_count());

        if args.stats || verbose > 0 {
            print_stats(&image);
        }

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}

fn print_stats(image: &PlanarImage) {
    for channel in Channel::ALL {
        let (min, max, mean) = channel_stats(image.buffer.channel(channel));
        println!(
            "  {}: min {:>6.1}  max {:>6.1}  mean {:>8.3}",
            channel.name(),
            min,
            max,
            mean
        );
    }
}

fn channel_stats(values: &[f32]) -> (f32, f32, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let (min, max, sum) = values.iter().fold(
        (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
        |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + f64::from(v)),
    );
    (min, max, sum / values.len() as f64)
}
