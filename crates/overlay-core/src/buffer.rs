//! Planar RGB buffers and borrowed channel views.
//!
//! A [`PlanarBuffer`] stores the red, green and blue channels of an image as
//! three equal-length contiguous `f32` arrays, laid out back to back in a
//! single allocation:
//!
//! ```text
//! data: [ R0 R1 .. Rn-1 | G0 G1 .. Gn-1 | B0 B1 .. Bn-1 ]
//! ```
//!
//! Channels are never addressed by pointer offsets. Every access goes through
//! a bounds-checked slice, either directly ([`PlanarBuffer::channel`]) or via
//! the borrowed [`PlanarView`] / [`PlanarViewMut`] triples that the blend
//! engine hands to its workers.
//!
//! # Example
//!
//! ```rust
//! use overlay_core::{Channel, PlanarBuffer};
//!
//! let mut buf = PlanarBuffer::filled(4, [10.0, 20.0, 30.0]);
//! buf.channel_mut(Channel::G)[2] = 99.0;
//!
//! assert_eq!(buf.pixel_count(), 4);
//! assert_eq!(buf.channel(Channel::G), &[20.0, 20.0, 99.0, 20.0]);
//! assert_eq!(buf.pixel(2), [10.0, 99.0, 30.0]);
//! ```

use crate::error::{Error, Result};
use crate::range::PixelRange;

/// Number of color channels in a planar buffer.
pub const CHANNELS: usize = 3;

/// A color channel of a planar buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red
    R,
    /// Green
    G,
    /// Blue
    B,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; CHANNELS] = [Channel::R, Channel::G, Channel::B];

    /// Position of the channel in storage order.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
        }
    }

    /// Short channel name.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::R => "R",
            Channel::G => "G",
            Channel::B => "B",
        }
    }
}

/// Owned planar RGB buffer of `f32` intensities.
///
/// Intensities are nominally in `[0, 255]` but the buffer does not enforce
/// that range.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarBuffer {
    data: Vec<f32>,
    pixel_count: usize,
}

impl PlanarBuffer {
    /// Creates a zero-filled buffer of `pixel_count` pixels.
    pub fn new(pixel_count: usize) -> Self {
        Self {
            data: vec![0.0; pixel_count * CHANNELS],
            pixel_count,
        }
    }

    /// Creates a zero-filled buffer, reporting allocation failure instead of
    /// aborting.
    ///
    /// # Example
    ///
    /// ```rust
    /// use overlay_core::PlanarBuffer;
    ///
    /// let buf = PlanarBuffer::try_new(16).unwrap();
    /// assert_eq!(buf.pixel_count(), 16);
    /// assert!(PlanarBuffer::try_new(usize::MAX).is_err());
    /// ```
    pub fn try_new(pixel_count: usize) -> Result<Self> {
        let len = pixel_count
            .checked_mul(CHANNELS)
            .ok_or_else(|| Error::AllocationFailed {
                requested: usize::MAX,
                reason: format!("{pixel_count} pixels overflow the address space"),
            })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::AllocationFailed {
                requested: len.saturating_mul(size_of::<f32>()),
                reason: e.to_string(),
            })?;
        data.resize(len, 0.0);

        Ok(Self { data, pixel_count })
    }

    /// Creates a buffer where every pixel has the given `[r, g, b]` value.
    pub fn filled(pixel_count: usize, rgb: [f32; CHANNELS]) -> Self {
        let mut buf = Self::new(pixel_count);
        for channel in Channel::ALL {
            buf.channel_mut(channel).fill(rgb[channel.index()]);
        }
        buf
    }

    /// Builds a buffer from three separate channel arrays.
    ///
    /// Fails with [`Error::ChannelLengthMismatch`] if the lengths differ.
    pub fn from_channels(r: Vec<f32>, g: Vec<f32>, b: Vec<f32>) -> Result<Self> {
        if r.len() != g.len() || r.len() != b.len() {
            return Err(Error::ChannelLengthMismatch {
                r: r.len(),
                g: g.len(),
                b: b.len(),
            });
        }

        let pixel_count = r.len();
        let mut data = r;
        data.reserve(pixel_count * 2);
        data.extend_from_slice(&g);
        data.extend_from_slice(&b);

        Ok(Self { data, pixel_count })
    }

    /// Builds a buffer from interleaved `RGBRGB...` samples.
    pub fn from_interleaved_rgb(samples: &[f32]) -> Result<Self> {
        if samples.len() % CHANNELS != 0 {
            return Err(Error::InvalidInterleavedLength { len: samples.len() });
        }

        let pixel_count = samples.len() / CHANNELS;
        let mut buf = Self::new(pixel_count);
        let mut view = buf.view_mut();
        let [r, g, b] = view.channels_mut();
        for (i, px) in samples.chunks_exact(CHANNELS).enumerate() {
            r[i] = px[0];
            g[i] = px[1];
            b[i] = px[2];
        }

        Ok(buf)
    }

    /// Returns the samples interleaved as `RGBRGB...`.
    pub fn to_interleaved_rgb(&self) -> Vec<f32> {
        let view = self.view();
        let mut out = Vec::with_capacity(self.data.len());
        for i in 0..self.pixel_count {
            out.extend_from_slice(&[view.r[i], view.g[i], view.b[i]]);
        }
        out
    }

    /// Number of pixels (length of each channel).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Returns `true` if the buffer holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixel_count == 0
    }

    /// Read-only slice of one channel.
    #[inline]
    pub fn channel(&self, channel: Channel) -> &[f32] {
        let start = channel.index() * self.pixel_count;
        &self.data[start..start + self.pixel_count]
    }

    /// Mutable slice of one channel.
    #[inline]
    pub fn channel_mut(&mut self, channel: Channel) -> &mut [f32] {
        let start = channel.index() * self.pixel_count;
        &mut self.data[start..start + self.pixel_count]
    }

    /// The `[r, g, b]` value of pixel `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= pixel_count()`.
    pub fn pixel(&self, index: usize) -> [f32; CHANNELS] {
        let view = self.view();
        [view.r[index], view.g[index], view.b[index]]
    }

    /// Borrows all three channels read-only.
    pub fn view(&self) -> PlanarView<'_> {
        let n = self.pixel_count;
        let (r, rest) = self.data.split_at(n);
        let (g, b) = rest.split_at(n);
        PlanarView { r, g, b }
    }

    /// Borrows all three channels mutably.
    pub fn view_mut(&mut self) -> PlanarViewMut<'_> {
        let n = self.pixel_count;
        let (r, rest) = self.data.split_at_mut(n);
        let (g, b) = rest.split_at_mut(n);
        PlanarViewMut { r, g, b }
    }

    /// Raw concatenated `R | G | B` storage.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Read-only borrow of the three channels of a planar buffer.
#[derive(Debug, Clone, Copy)]
pub struct PlanarView<'a> {
    /// Red channel
    r: &'a [f32],
    /// Green channel
    g: &'a [f32],
    /// Blue channel
    b: &'a [f32],
}

impl<'a> PlanarView<'a> {
    /// Builds a view from three slices, checking that their lengths agree.
    pub fn new(r: &'a [f32], g: &'a [f32], b: &'a [f32]) -> Result<Self> {
        if r.len() != g.len() || r.len() != b.len() {
            return Err(Error::ChannelLengthMismatch {
                r: r.len(),
                g: g.len(),
                b: b.len(),
            });
        }
        Ok(Self { r, g, b })
    }

    /// Number of pixels in the view.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.r.len()
    }

    /// Slice of one channel.
    #[inline]
    pub fn channel(&self, channel: Channel) -> &'a [f32] {
        match channel {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
        }
    }

    /// All three channels, in storage order.
    #[inline]
    pub fn channels(&self) -> [&'a [f32]; CHANNELS] {
        [self.r, self.g, self.b]
    }

    /// Sub-view over `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` ends past `pixel_count()`.
    pub fn slice(&self, range: PixelRange) -> PlanarView<'a> {
        let r = range.as_range();
        PlanarView {
            r: &self.r[r.clone()],
            g: &self.g[r.clone()],
            b: &self.b[r],
        }
    }
}

/// Mutable borrow of the three channels of a planar buffer.
#[derive(Debug)]
pub struct PlanarViewMut<'a> {
    /// Red channel
    r: &'a mut [f32],
    /// Green channel
    g: &'a mut [f32],
    /// Blue channel
    b: &'a mut [f32],
}

impl<'a> PlanarViewMut<'a> {
    /// Builds a view from three slices, checking that their lengths agree.
    pub fn new(r: &'a mut [f32], g: &'a mut [f32], b: &'a mut [f32]) -> Result<Self> {
        if r.len() != g.len() || r.len() != b.len() {
            return Err(Error::ChannelLengthMismatch {
                r: r.len(),
                g: g.len(),
                b: b.len(),
            });
        }
        Ok(Self { r, g, b })
    }

    /// Number of pixels in the view.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.r.len()
    }

    /// Mutable slice of one channel.
    #[inline]
    pub fn channel_mut(&mut self, channel: Channel) -> &mut [f32] {
        match channel {
            Channel::R => &mut *self.r,
            Channel::G => &mut *self.g,
            Channel::B => &mut *self.b,
        }
    }

    /// All three channels at once, in storage order.
    pub fn channels_mut(&mut self) -> [&mut [f32]; CHANNELS] {
        [&mut *self.r, &mut *self.g, &mut *self.b]
    }

    /// Consumes the view, returning the channel slices with the full lifetime.
    pub fn into_channels(self) -> [&'a mut [f32]; CHANNELS] {
        [self.r, self.g, self.b]
    }

    /// Splits the view into `[0, mid)` and `[mid, pixel_count)`.
    ///
    /// The halves borrow disjoint memory, so they can be written from
    /// different threads.
    ///
    /// # Panics
    ///
    /// Panics if `mid > pixel_count()`.
    pub fn split_at(self, mid: usize) -> (PlanarViewMut<'a>, PlanarViewMut<'a>) {
        let (r0, r1) = self.r.split_at_mut(mid);
        let (g0, g1) = self.g.split_at_mut(mid);
        let (b0, b1) = self.b.split_at_mut(mid);
        (
            PlanarViewMut { r: r0, g: g0, b: b0 },
            PlanarViewMut { r: r1, g: g1, b: b1 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_are_contiguous_and_disjoint() {
        let buf = PlanarBuffer::from_channels(
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
        )
        .unwrap();

        assert_eq!(buf.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(buf.channel(Channel::R), &[1.0, 2.0]);
        assert_eq!(buf.channel(Channel::G), &[3.0, 4.0]);
        assert_eq!(buf.channel(Channel::B), &[5.0, 6.0]);
    }

    #[test]
    fn test_from_channels_rejects_mismatch() {
        let err = PlanarBuffer::from_channels(vec![0.0; 3], vec![0.0; 2], vec![0.0; 3]);
        assert!(matches!(
            err,
            Err(Error::ChannelLengthMismatch { r: 3, g: 2, b: 3 })
        ));
    }

    #[test]
    fn test_interleaved_conversion() {
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let buf = PlanarBuffer::from_interleaved_rgb(&samples).unwrap();
        assert_eq!(buf.pixel_count(), 2);
        assert_eq!(buf.channel(Channel::R), &[1.0, 4.0]);
        assert_eq!(buf.channel(Channel::B), &[3.0, 6.0]);
        assert_eq!(buf.to_interleaved_rgb(), samples.to_vec());

        assert!(PlanarBuffer::from_interleaved_rgb(&[0.0; 4]).is_err());
    }

    #[test]
    fn test_empty_buffer() {
        let buf = PlanarBuffer::new(0);
        assert!(buf.is_empty());
        assert!(buf.channel(Channel::B).is_empty());
        assert_eq!(buf.view().pixel_count(), 0);
    }

    #[test]
    fn test_view_slice() {
        let buf = PlanarBuffer::from_channels(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![10.0, 11.0, 12.0, 13.0],
            vec![20.0, 21.0, 22.0, 23.0],
        )
        .unwrap();
        let sub = buf.view().slice(PixelRange::new(1, 3));
        assert_eq!(sub.pixel_count(), 2);
        assert_eq!(sub.r, &[1.0, 2.0]);
        assert_eq!(sub.channel(Channel::G), &[11.0, 12.0]);
        assert_eq!(sub.b, &[21.0, 22.0]);
    }

    #[test]
    fn test_split_at_gives_disjoint_halves() {
        let mut buf = PlanarBuffer::new(5);
        let (mut left, mut right) = buf.view_mut().split_at(2);
        assert_eq!(left.pixel_count(), 2);
        assert_eq!(right.pixel_count(), 3);

        left.channel_mut(Channel::R).fill(1.0);
        right.channel_mut(Channel::B).fill(2.0);

        assert_eq!(buf.channel(Channel::R), &[1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(buf.channel(Channel::B), &[0.0, 0.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_view_new_checks_lengths() {
        let a = [0.0f32; 3];
        let b = [0.0f32; 2];
        assert!(PlanarView::new(&a, &a, &a).is_ok());
        assert!(PlanarView::new(&a, &b, &a).is_err());
    }

    #[test]
    fn test_try_new_overflow() {
        let err = PlanarBuffer::try_new(usize::MAX / 2).unwrap_err();
        assert!(matches!(err, Error::AllocationFailed { .. }));
    }
}
