//! CLI command implementations

pub mod bench;
pub mod blend;
pub mod info;

use anyhow::{bail, Context, Result};
use overlay_io::PlanarImage;
use overlay_ops::BlendEngine;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::trace;

/// Load image from path
pub fn load_image(path: &Path) -> Result<PlanarImage> {
    overlay_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &PlanarImage) -> Result<()> {
    overlay_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Loads the source and filter, refusing images of different sizes.
pub fn load_pair(source: &Path, filter: &Path) -> Result<(PlanarImage, PlanarImage)> {
    let source = load_image(source)?;
    let filter = load_image(filter)?;

    if !source.same_size(&filter) {
        bail!(
            "Image dimensions don't match: {}x{} vs {}x{}",
            source.width,
            source.height,
            filter.width,
            filter.height
        );
    }
    Ok((source, filter))
}

/// Runs `repeat` full blend passes and returns the wall-clock time they took.
pub fn time_passes(
    engine: &BlendEngine,
    source: &PlanarImage,
    filter: &PlanarImage,
    destination: &mut PlanarImage,
    repeat: u32,
) -> Result<Duration> {
    let start = Instant::now();
    for pass in 0..repeat {
        trace!(pass, "blend pass");
        engine
            .blend(&source.buffer, &filter.buffer, &mut destination.buffer)
            .with_context(|| format!("Blend failed ({})", engine.options().strategy))?;
    }
    Ok(start.elapsed())
}

/// Largest absolute difference between two buffers of equal length.
pub fn max_deviation(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_core::PlanarBuffer;
    use overlay_ops::{BlendOptions, Strategy};
    use tempfile::tempdir;

    #[test]
    fn test_max_deviation() {
        assert_eq!(max_deviation(&[], &[]), 0.0);
        assert_eq!(max_deviation(&[1.0, 5.0, 2.0], &[1.5, 3.0, 2.0]), 2.0);
    }

    #[test]
    fn test_load_pair_rejects_mismatch() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bmp");
        let b = dir.path().join("b.bmp");
        save_image(&a, &PlanarImage::black(4, 3)).unwrap();
        save_image(&b, &PlanarImage::black(3, 4)).unwrap();

        let err = load_pair(&a, &b).unwrap_err();
        assert!(err.to_string().contains("4x3 vs 3x4"), "{err}");
        assert!(load_pair(&a, &a).is_ok());
    }

    #[test]
    fn test_load_missing_has_context() {
        let dir = tempdir().unwrap();
        let err = load_image(&dir.path().join("nope.png")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load:"));
    }

    #[test]
    fn test_time_passes_writes_destination() {
        let source = PlanarImage::new(2, 1, PlanarBuffer::filled(2, [100.0; 3])).unwrap();
        let filter = PlanarImage::new(2, 1, PlanarBuffer::filled(2, [50.0; 3])).unwrap();
        let mut out = PlanarImage::black(2, 1);
        let engine = BlendEngine::new(BlendOptions::new(Strategy::vectorized())).unwrap();

        time_passes(&engine, &source, &filter, &mut out, 3).unwrap();
        for v in out.buffer.as_slice() {
            assert!((v - 41.33).abs() < 1e-3);
        }
    }
}
