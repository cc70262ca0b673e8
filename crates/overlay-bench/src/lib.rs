//! Shared inputs for the overlay benchmarks.
//!
//! Run with: `cargo bench -p overlay-bench`

use overlay_core::{Channel, PlanarBuffer};

/// Pixel counts benchmarked: 64x64, 1024x768 and 1920x1080.
pub const SIZES: [usize; 3] = [64 * 64, 1024 * 768, 1920 * 1080];

/// Deterministic source/filter pair with every channel value in `[0, 255]`.
pub fn inputs(pixel_count: usize) -> (PlanarBuffer, PlanarBuffer) {
    let ramp = |buffer: &mut PlanarBuffer, params: [(usize, usize); 3]| {
        for (channel, (offset, stride)) in Channel::ALL.into_iter().zip(params) {
            for (i, v) in buffer.channel_mut(channel).iter_mut().enumerate() {
                *v = ((i * stride + offset) % 256) as f32;
            }
        }
    };
    let mut source = PlanarBuffer::new(pixel_count);
    let mut filter = PlanarBuffer::new(pixel_count);
    ramp(&mut source, [(0, 1), (85, 3), (170, 7)]);
    ramp(&mut filter, [(13, 5), (200, 11), (42, 2)]);
    (source, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_in_range() {
        let (source, filter) = inputs(1000);
        assert_eq!(source.pixel_count(), 1000);
        assert_eq!(filter.pixel_count(), 1000);
        assert!(source
            .as_slice()
            .iter()
            .chain(filter.as_slice())
            .all(|&v| (0.0..=255.0).contains(&v)));
    }
}
