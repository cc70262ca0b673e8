//! Portable fixed-width vector packets.
//!
//! The vectorized strategy is written once against the [`Packet`] trait:
//! load `LANES` consecutive values, do arithmetic, store `LANES` values.
//! Implementations:
//!
//! - [`wide::f32x4`] - 4 lanes (one 128-bit register)
//! - [`wide::f32x8`] - 8 lanes (one 256-bit register)
//! - [`ArrayPacket<N>`] - any lane count, plain arrays the compiler can
//!   auto-vectorize; used for widths 1, 2 and 16
//!
//! # Example
//!
//! ```rust
//! use overlay_ops::packet::{overlay_packet, Packet};
//! use wide::f32x8;
//!
//! let x = f32x8::splat(100.0);
//! let y = f32x8::splat(50.0);
//! let mut out = [0.0f32; 8];
//! Packet::store(overlay_packet(x, y), &mut out);
//! assert!((out[7] - 41.33).abs() < 1e-2);
//! ```

use std::ops::{Add, Div, Mul, Sub};

use wide::{f32x4, f32x8};

use crate::kernel::CHANNEL_MAX;
use crate::{BlendError, BlendResult};

/// Packet widths the vectorized strategy can dispatch to.
pub const SUPPORTED_PACKET_WIDTHS: [usize; 5] = [1, 2, 4, 8, 16];

/// Default packet width: eight `f32` lanes fill one 256-bit register.
pub const DEFAULT_PACKET_WIDTH: usize = 8;

/// Returns `true` if `width` has a packet implementation.
pub fn is_supported_width(width: usize) -> bool {
    SUPPORTED_PACKET_WIDTHS.contains(&width)
}

/// A fixed number of `f32` lanes processed by one operation.
pub trait Packet:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Number of lanes.
    const LANES: usize;

    /// Broadcasts `v` to every lane.
    fn splat(v: f32) -> Self;

    /// Loads the first `LANES` values of `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src` is shorter than `LANES`.
    fn load(src: &[f32]) -> Self;

    /// Stores all lanes into the first `LANES` slots of `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is shorter than `LANES`.
    fn store(self, dst: &mut [f32]);

    /// Lane-wise minimum.
    fn min(self, rhs: Self) -> Self;

    /// Lane-wise maximum.
    fn max(self, rhs: Self) -> Self;
}

impl Packet for f32x4 {
    const LANES: usize = 4;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        f32x4::splat(v)
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; 4];
        lanes.copy_from_slice(&src[..4]);
        f32x4::from(lanes)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..4].copy_from_slice(&self.to_array());
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        f32x4::min(self, rhs)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        f32x4::max(self, rhs)
    }
}

impl Packet for f32x8 {
    const LANES: usize = 8;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        f32x8::splat(v)
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; 8];
        lanes.copy_from_slice(&src[..8]);
        f32x8::from(lanes)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..8].copy_from_slice(&self.to_array());
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        f32x8::min(self, rhs)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        f32x8::max(self, rhs)
    }
}

/// Array-backed packet with `N` lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayPacket<const N: usize>(pub [f32; N]);

impl<const N: usize> ArrayPacket<N> {
    #[inline(always)]
    fn zip_with(self, rhs: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self(std::array::from_fn(|i| f(self.0[i], rhs.0[i])))
    }
}

impl<const N: usize> Add for ArrayPacket<N> {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl<const N: usize> Sub for ArrayPacket<N> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl<const N: usize> Mul for ArrayPacket<N> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a * b)
    }
}

impl<const N: usize> Div for ArrayPacket<N> {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a / b)
    }
}

impl<const N: usize> Packet for ArrayPacket<N> {
    const LANES: usize = N;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        Self([v; N])
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; N];
        lanes.copy_from_slice(&src[..N]);
        Self(lanes)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..N].copy_from_slice(&self.0);
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        self.zip_with(rhs, f32::min)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        self.zip_with(rhs, f32::max)
    }
}

/// Overlay blend of one packet of source values with one packet of filter
/// values, evaluated in the same order as [`crate::kernel::overlay`].
#[inline(always)]
pub fn overlay_packet<P: Packet>(x: P, y: P) -> P {
    let v255 = P::splat(CHANNEL_MAX);
    let v2 = P::splat(2.0);
    let inv_y = v255 - y;
    let scaled_x = (v2 * x) / v255;
    (y / v255) * (y + scaled_x * inv_y)
}

/// Clamps every lane into `[0, 255]`.
#[inline(always)]
pub fn saturate_packet<P: Packet>(v: P) -> P {
    Packet::min(Packet::max(v, P::splat(0.0)), P::splat(CHANNEL_MAX))
}

/// Staging area for a packet that cannot be loaded straight from the
/// channel: the masked tail result, and the zero-padded inputs of a channel
/// shorter than one packet.
///
/// Each channel of each call gets its own scratch, so concurrent calls never
/// share staging memory.
#[derive(Debug)]
pub struct PacketScratch {
    lanes: usize,
    data: Vec<f32>,
}

impl PacketScratch {
    /// Allocates scratch for `lanes`-wide packets.
    pub fn try_new(lanes: usize) -> BlendResult<Self> {
        let len = lanes.saturating_mul(3);
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| BlendError::ScratchAllocation {
                requested: len.saturating_mul(size_of::<f32>()),
            })?;
        data.resize(len, 0.0);
        Ok(Self { lanes, data })
    }

    /// Lane count this scratch was sized for.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Splits into `(source, filter, result)` staging packets, each zeroed.
    pub fn parts_mut(&mut self) -> (&mut [f32], &mut [f32], &mut [f32]) {
        self.data.fill(0.0);
        let (x, rest) = self.data.split_at_mut(self.lanes);
        let (y, out) = rest.split_at_mut(self.lanes);
        (x, y, out)
    }
}
