//! Scalar overlay blend kernel.
//!
//! For a source intensity `X` and a filter intensity `Y`, both nominally in
//! `[0, 255]`, the overlay blend is
//!
//! ```text
//! D = (Y / 255) * (Y + (2 * X / 255) * (255 - Y))
//! ```
//!
//! The formula is applied to each channel independently; channels never
//! interact. The evaluation order here is the one used by the packet kernel
//! in [`crate::packet`], so scalar and vector results agree bit for bit.
//!
//! # Example
//!
//! ```rust
//! use overlay_ops::kernel::overlay;
//!
//! let d = overlay(100.0, 50.0);
//! assert!((d - 41.33).abs() < 1e-2);
//! ```

use overlay_core::{PlanarView, PlanarViewMut, CHANNELS};

/// Upper bound of the nominal intensity range.
pub const CHANNEL_MAX: f32 = 255.0;

/// Overlay-blends one source value with one filter value.
#[inline(always)]
pub fn overlay(x: f32, y: f32) -> f32 {
    let inv_y = CHANNEL_MAX - y;
    let scaled_x = (2.0 * x) / CHANNEL_MAX;
    (y / CHANNEL_MAX) * (y + scaled_x * inv_y)
}

/// Clamps a blended value into `[0, 255]`.
#[inline(always)]
pub fn saturate(v: f32) -> f32 {
    v.max(0.0).min(CHANNEL_MAX)
}

/// Overlay-blends one RGB pixel.
///
/// # Example
///
/// ```rust
/// use overlay_ops::kernel::blend_pixel;
///
/// let d = blend_pixel([100.0, 0.0, 255.0], [50.0, 50.0, 50.0]);
/// assert!((d[0] - 41.33).abs() < 1e-2);
/// ```
#[inline]
pub fn blend_pixel(src: [f32; CHANNELS], filter: [f32; CHANNELS]) -> [f32; CHANNELS] {
    [
        overlay(src[0], filter[0]),
        overlay(src[1], filter[1]),
        overlay(src[2], filter[2]),
    ]
}

/// Blends one channel slice into `dst`.
///
/// All three slices must have the same length; the engine guarantees this
/// before dispatch. With `saturate` set, every written element is clamped at
/// the index it was written to.
#[inline]
pub fn blend_slice(src: &[f32], filter: &[f32], dst: &mut [f32], saturate: bool) {
    debug_assert_eq!(src.len(), filter.len());
    debug_assert_eq!(src.len(), dst.len());

    if saturate {
        for ((d, &x), &y) in dst.iter_mut().zip(src).zip(filter) {
            *d = self::saturate(overlay(x, y));
        }
    } else {
        for ((d, &x), &y) in dst.iter_mut().zip(src).zip(filter) {
            *d = overlay(x, y);
        }
    }
}

/// Blends all three channels of a view triple.
///
/// Used by both the sequential strategy (one call over the whole buffer) and
/// the threaded strategy (one call per worker range).
pub fn blend_range(src: PlanarView<'_>, filter: PlanarView<'_>, dst: PlanarViewMut<'_>, saturate: bool) {
    let src = src.channels();
    let filter = filter.channels();
    for (c, d) in dst.into_channels().into_iter().enumerate() {
        blend_slice(src[c], filter[c], d, saturate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use overlay_core::{Channel, PlanarBuffer};

    fn reference(x: f32, y: f32) -> f32 {
        (y / 255.0) * (y + ((2.0 * x) / 255.0) * (255.0 - y))
    }

    #[test]
    fn test_known_value() {
        assert_relative_eq!(overlay(100.0, 50.0), 41.3302, epsilon = 1e-3);
    }

    #[test]
    fn test_matches_formula() {
        for x in [0.0, 1.0, 64.0, 127.5, 200.0, 255.0] {
            for y in [0.0, 1.0, 50.0, 128.0, 254.0, 255.0] {
                assert_relative_eq!(overlay(x, y), reference(x, y), epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_endpoints() {
        // Black filter gives black, white filter gives white.
        assert_eq!(overlay(123.0, 0.0), 0.0);
        assert_relative_eq!(overlay(123.0, 255.0), 255.0, epsilon = 1e-4);
    }

    #[test]
    fn test_in_range_inputs_stay_in_range() {
        for x in (0..=255).step_by(5) {
            for y in (0..=255).step_by(5) {
                let d = overlay(x as f32, y as f32);
                assert!((0.0..=255.0 + 1e-3).contains(&d), "x={x} y={y} d={d}");
            }
        }
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(-3.0), 0.0);
        assert_eq!(saturate(300.0), 255.0);
        assert_eq!(saturate(12.5), 12.5);
    }

    #[test]
    fn test_blend_slice_unclamped_passthrough() {
        let src = [1000.0, -500.0];
        let filter = [100.0, 100.0];
        let mut dst = [0.0; 2];
        blend_slice(&src, &filter, &mut dst, false);
        assert!(dst[0] > 255.0);
        assert!(dst[1] < 0.0);

        blend_slice(&src, &filter, &mut dst, true);
        assert_eq!(dst, [255.0, 0.0]);
    }

    #[test]
    fn test_blend_range_channels_independent() {
        let src = PlanarBuffer::filled(3, [100.0, 0.0, 255.0]);
        let filter = PlanarBuffer::filled(3, [50.0, 50.0, 50.0]);
        let mut dst = PlanarBuffer::new(3);

        blend_range(src.view(), filter.view(), dst.view_mut(), false);

        for i in 0..3 {
            assert_relative_eq!(dst.channel(Channel::R)[i], reference(100.0, 50.0));
            assert_relative_eq!(dst.channel(Channel::G)[i], reference(0.0, 50.0));
            assert_relative_eq!(dst.channel(Channel::B)[i], reference(255.0, 50.0));
        }
    }
}
