//! # overlay-core
//!
//! Core types for planar overlay blending.
//!
//! This crate provides the data model shared by the rest of the workspace:
//!
//! - [`PlanarBuffer`] - Owned RGB image stored as three contiguous channel arrays
//! - [`PlanarView`], [`PlanarViewMut`] - Borrowed, bounds-checked channel triples
//! - [`PixelRange`] - Half-open pixel index interval
//! - [`Partition`] - Ordered, validated cover of `[0, pixel_count)`
//!
//! ## Crate Structure
//!
//! ```text
//! overlay-core (this crate)
//!    ^
//!    |
//!    +-- overlay-ops (blend kernel, partitioning, execution engine)
//!    +-- overlay-io (image codec)
//!    +-- overlay-cli (benchmark binary)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use overlay_core::prelude::*;
//!
//! let mut dst = PlanarBuffer::new(3);
//! let (left, right) = dst.view_mut().split_at(1);
//! assert_eq!(left.pixel_count() + right.pixel_count(), 3);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod range;

pub use buffer::{Channel, PlanarBuffer, PlanarView, PlanarViewMut, CHANNELS};
pub use error::{Error, Result};
pub use range::{Partition, PixelRange};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use overlay_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{Channel, PlanarBuffer, PlanarView, PlanarViewMut, CHANNELS};
    pub use crate::error::{Error, Result};
    pub use crate::range::{Partition, PixelRange};
}
