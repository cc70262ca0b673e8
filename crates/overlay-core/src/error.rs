//! Error types for overlay-core operations.
//!
//! The [`Error`] enum covers the failure modes of the data model:
//! - Planar buffer construction (channel lengths, interleaved input)
//! - Buffer allocation
//! - Partition validation (gaps, overlaps, out-of-bounds ranges)
//!
//! # Usage
//!
//! ```rust
//! use overlay_core::{Error, PlanarBuffer};
//!
//! let err = PlanarBuffer::from_channels(vec![0.0; 4], vec![0.0; 4], vec![0.0; 3])
//!     .unwrap_err();
//! assert!(matches!(err, Error::ChannelLengthMismatch { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the planar buffer and partition types.
#[derive(Debug, Error)]
pub enum Error {
    /// The three channel arrays handed to a buffer differ in length.
    #[error("channel length mismatch: r={r}, g={g}, b={b}")]
    ChannelLengthMismatch {
        /// Red channel length
        r: usize,
        /// Green channel length
        g: usize,
        /// Blue channel length
        b: usize,
    },

    /// Interleaved RGB input whose length is not a multiple of three.
    #[error("interleaved RGB data of length {len} is not a multiple of 3")]
    InvalidInterleavedLength {
        /// Number of samples supplied
        len: usize,
    },

    /// Memory allocation failed.
    ///
    /// # Fields
    ///
    /// - `requested` - Number of bytes requested
    /// - `reason` - Description reported by the allocator
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// A partition is not an ordered, disjoint cover of `[0, pixel_count)`.
    #[error("invalid partition over {pixel_count} pixels: {reason}")]
    InvalidPartition {
        /// Pixel count the partition was checked against
        pixel_count: usize,
        /// What is wrong with it
        reason: String,
    },
}
