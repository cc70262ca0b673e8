//! Static partitioning of a pixel range into work units.
//!
//! Three strategies, selected by [`Strategy`]:
//!
//! - **Sequential** - one range covering `[0, n)`.
//! - **Static threads** - `t` ranges of `n / t` pixels each; the last range
//!   also takes the `n % t` remainder.
//! - **Vector packets** - `n / W` full packets of `W` lanes, plus one masked
//!   tail packet when `n % W != 0` (see [`PacketTail`]).
//!
//! Every partition handed to the engine is validated first: ranges must tile
//! `[0, n)` in order with no gap, overlap or out-of-bounds end.
//!
//! # Example
//!
//! ```rust
//! use overlay_ops::partition::{static_threads, PacketPlan};
//!
//! let part = static_threads(10, 3).unwrap();
//! let lens: Vec<_> = part.iter().map(|r| r.len()).collect();
//! assert_eq!(lens, [3, 3, 4]);
//!
//! let plan = PacketPlan::new(19, 8).unwrap();
//! assert_eq!(plan.packets(), 2);
//! let tail = plan.tail().unwrap();
//! assert_eq!(tail.window.as_range(), 11..19); // full packet ending at n
//! assert_eq!(tail.write.as_range(), 16..19);  // only the 3 leftover lanes
//! ```

use std::fmt;

use overlay_core::{Partition, PixelRange};

use crate::packet::{is_supported_width, DEFAULT_PACKET_WIDTH};
use crate::{BlendError, BlendResult};

/// Execution strategy for a blend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Single-threaded scalar loop.
    #[default]
    Sequential,
    /// Fixed pool of worker threads over a static partition.
    Threaded {
        /// Number of workers (one range each)
        threads: usize,
    },
    /// Single-threaded SIMD loop over fixed-width packets.
    Vectorized {
        /// Lanes per packet
        packet_width: usize,
    },
}

impl Strategy {
    /// Vectorized strategy with the default packet width.
    pub const fn vectorized() -> Self {
        Self::Vectorized { packet_width: DEFAULT_PACKET_WIDTH }
    }

    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Threaded { .. } => "threaded",
            Self::Vectorized { .. } => "vectorized",
        }
    }

    /// Rejects zero thread counts, zero packet widths and packet widths
    /// without an implementation.
    pub fn validate(&self) -> BlendResult<()> {
        match *self {
            Self::Sequential => Ok(()),
            Self::Threaded { threads: 0 } => Err(BlendError::InvalidThreadCount),
            Self::Threaded { .. } => Ok(()),
            Self::Vectorized { packet_width: 0 } => Err(BlendError::InvalidPacketWidth),
            Self::Vectorized { packet_width } if !is_supported_width(packet_width) => {
                Err(BlendError::UnsupportedPacketWidth(packet_width))
            }
            Self::Vectorized { .. } => Ok(()),
        }
    }

    /// Destination ranges this strategy writes, in order.
    ///
    /// For the vectorized strategy these are the full packets followed by the
    /// tail's masked write region.
    pub fn partition(&self, pixel_count: usize) -> BlendResult<Partition> {
        match *self {
            Self::Sequential => Ok(sequential(pixel_count)),
            Self::Threaded { threads } => static_threads(pixel_count, threads),
            Self::Vectorized { packet_width } => {
                Ok(PacketPlan::new(pixel_count, packet_width)?.coverage())
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Threaded { threads } => write!(f, "threaded({threads})"),
            Self::Vectorized { packet_width } => write!(f, "vectorized(x{packet_width})"),
        }
    }
}

/// One range covering the whole buffer.
pub fn sequential(pixel_count: usize) -> Partition {
    Partition::from_ranges(vec![PixelRange::new(0, pixel_count)])
}

/// Splits `[0, pixel_count)` into `threads` consecutive ranges.
///
/// Worker `k < threads - 1` gets `[k * base, (k + 1) * base)` with
/// `base = pixel_count / threads`; the last worker gets
/// `[(threads - 1) * base, pixel_count)`. With more threads than pixels,
/// `base` is zero and every range but the last is empty.
pub fn static_threads(pixel_count: usize, threads: usize) -> BlendResult<Partition> {
    if threads == 0 {
        return Err(BlendError::InvalidThreadCount);
    }

    let base = pixel_count / threads;
    let mut ranges: Vec<PixelRange> = (0..threads - 1)
        .map(|k| PixelRange::new(k * base, (k + 1) * base))
        .collect();
    ranges.push(PixelRange::new((threads - 1) * base, pixel_count));

    let partition = Partition::from_ranges(ranges);
    partition.validate(pixel_count)?;
    Ok(partition)
}

/// The leftover packet of a vectorized pass.
///
/// `window` is the full-width input window: it is shifted backward so that it
/// ends exactly at `pixel_count`, overlapping the last full packet. `write` is
/// the suffix of the window that holds the `pixel_count % width` elements not
/// yet produced; only those lanes are stored.
///
/// When the buffer is shorter than one packet there is nothing to shift back
/// into, so `window == write == [0, pixel_count)` and the inputs are staged in
/// a zero-padded packet instead of read in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketTail {
    /// Input window (full packet ending at `pixel_count`, or the whole
    /// buffer when it is shorter than one packet)
    pub window: PixelRange,
    /// Lanes written back
    pub write: PixelRange,
}

impl PacketTail {
    /// Offset of the first written lane inside the window.
    #[inline]
    pub fn skip(&self) -> usize {
        self.write.start - self.window.start
    }

    /// Returns `true` if the window is a full in-place packet.
    #[inline]
    pub fn is_shifted(&self, width: usize) -> bool {
        self.window.len() == width
    }
}

/// Packet layout of a vectorized pass over `pixel_count` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketPlan {
    pixel_count: usize,
    width: usize,
    packets: usize,
    tail: Option<PacketTail>,
}

impl PacketPlan {
    /// Computes the packet layout.
    ///
    /// Fails with [`BlendError::InvalidPacketWidth`] for `width == 0`.
    pub fn new(pixel_count: usize, width: usize) -> BlendResult<Self> {
        if width == 0 {
            return Err(BlendError::InvalidPacketWidth);
        }

        let packets = pixel_count / width;
        let remainder = pixel_count % width;

        let tail = match (remainder, packets) {
            (0, _) => None,
            (_, 0) => Some(PacketTail {
                window: PixelRange::new(0, pixel_count),
                write: PixelRange::new(0, pixel_count),
            }),
            (r, _) => Some(PacketTail {
                window: PixelRange::new(pixel_count - width, pixel_count),
                write: PixelRange::new(pixel_count - r, pixel_count),
            }),
        };

        let plan = Self { pixel_count, width, packets, tail };
        plan.coverage().validate(pixel_count)?;
        Ok(plan)
    }

    /// Number of elements the plan covers.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Lanes per packet.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of full packets.
    #[inline]
    pub fn packets(&self) -> usize {
        self.packets
    }

    /// The masked tail packet, if `pixel_count % width != 0`.
    #[inline]
    pub fn tail(&self) -> Option<PacketTail> {
        self.tail
    }

    /// Range of full packet `k`.
    #[inline]
    pub fn packet_range(&self, k: usize) -> PixelRange {
        PixelRange::with_len(k * self.width, self.width)
    }

    /// Iterates over the full packet ranges.
    pub fn packet_ranges(&self) -> impl Iterator<Item = PixelRange> + '_ {
        (0..self.packets).map(move |k| self.packet_range(k))
    }

    /// Destination ranges written: every full packet, then the tail's write
    /// region.
    pub fn coverage(&self) -> Partition {
        let mut ranges: Vec<PixelRange> = self.packet_ranges().collect();
        ranges.extend(self.tail.map(|t| t.write));
        Partition::from_ranges(ranges)
    }
}
