//! Error types for blend operations.

use thiserror::Error;

/// Broad class of a [`BlendError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: mismatched buffers or invalid strategy parameters.
    /// Detected before any work is dispatched; the destination is untouched.
    Configuration,
    /// Worker creation or scratch allocation failed. The destination may be
    /// partially written and must not be trusted.
    Resource,
}

/// Error type for blend operations.
#[derive(Error, Debug)]
pub enum BlendError {
    /// Source, filter and destination do not share one pixel count.
    #[error("size mismatch: source={source_pixels}, filter={filter_pixels}, destination={destination_pixels} pixels")]
    SizeMismatch {
        /// Source pixel count
        source_pixels: usize,
        /// Filter pixel count
        filter_pixels: usize,
        /// Destination pixel count
        destination_pixels: usize,
    },

    /// Threaded strategy requested with zero threads.
    #[error("invalid parameter: thread count must be > 0")]
    InvalidThreadCount,

    /// Vectorized strategy requested with zero lanes.
    #[error("invalid parameter: packet width must be > 0")]
    InvalidPacketWidth,

    /// No packet implementation exists for this lane count.
    #[error("unsupported packet width {0} (supported: 1, 2, 4, 8, 16)")]
    UnsupportedPacketWidth(usize),

    /// Buffer or partition error from the data model.
    #[error(transparent)]
    Core(#[from] overlay_core::Error),

    /// The worker pool could not be created.
    #[error("failed to start worker threads: {0}")]
    ThreadPool(String),

    /// The packet staging area could not be allocated.
    #[error("failed to allocate {requested} bytes of packet scratch")]
    ScratchAllocation {
        /// Bytes requested
        requested: usize,
    },
}

impl BlendError {
    /// Classifies the error as a configuration or resource failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SizeMismatch { .. }
            | Self::InvalidThreadCount
            | Self::InvalidPacketWidth
            | Self::UnsupportedPacketWidth(_) => ErrorKind::Configuration,
            Self::Core(overlay_core::Error::AllocationFailed { .. }) => ErrorKind::Resource,
            Self::Core(_) => ErrorKind::Configuration,
            Self::ThreadPool(_) | Self::ScratchAllocation { .. } => ErrorKind::Resource,
        }
    }

    /// Shorthand for `kind() == ErrorKind::Configuration`.
    pub fn is_config(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

/// Result type for blend operations.
pub type BlendResult<T> = Result<T, BlendError>;
