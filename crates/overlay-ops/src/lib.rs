//! # overlay-ops
//!
//! Overlay blending of planar RGB images with three interchangeable
//! execution strategies.
//!
//! # Modules
//!
//! - [`kernel`] - Scalar overlay formula and saturation
//! - [`packet`] - Portable fixed-width vector packets (`wide` + array fallback)
//! - [`partition`] - Static partitioning into thread ranges or vector packets
//! - [`engine`] - Sequential, fork-join threaded and vectorized dispatch
//!
//! All three strategies produce the same destination for the same inputs.
//! Work is split statically by size only; there is no work stealing between
//! ranges.
//!
//! # Example
//!
//! ```rust
//! use overlay_core::PlanarBuffer;
//! use overlay_ops::{BlendEngine, BlendOptions, Strategy};
//!
//! let src = PlanarBuffer::filled(1000, [100.0, 150.0, 200.0]);
//! let filter = PlanarBuffer::filled(1000, [50.0, 50.0, 50.0]);
//!
//! let mut seq = PlanarBuffer::new(1000);
//! let mut simd = PlanarBuffer::new(1000);
//!
//! BlendEngine::new(BlendOptions::default())?.blend(&src, &filter, &mut seq)?;
//! BlendEngine::new(BlendOptions::new(Strategy::vectorized()))?.blend(&src, &filter, &mut simd)?;
//!
//! assert_eq!(seq, simd);
//! # Ok::<(), overlay_ops::BlendError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod engine;
pub mod kernel;
pub mod packet;
pub mod partition;

pub use engine::{blend, BlendEngine, BlendOptions, BlendTask};
pub use error::{BlendError, BlendResult, ErrorKind};
pub use partition::{PacketPlan, PacketTail, Strategy};
