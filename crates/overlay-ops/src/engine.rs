//! Blend execution engine.
//!
//! [`BlendEngine`] drives the overlay kernel over a source/filter pair and
//! writes into a caller-owned destination, using one of three strategies:
//!
//! - **Sequential** - one scalar pass over `[0, n)`.
//! - **Threaded** - the static partition from
//!   [`static_threads`](crate::partition::static_threads) is turned into one
//!   [`BlendTask`] per range and run as a fork-join group on a dedicated
//!   rayon pool. The call returns only after every task has finished.
//! - **Vectorized** - for each channel, full packets are blended with one
//!   packet operation each, then the masked tail packet described by
//!   [`PacketTail`](crate::partition::PacketTail) writes the leftover lanes.
//!
//! Everything that can fail is checked before any destination element is
//! written: buffer sizes, strategy parameters and partition validity. Only
//! resource failures (pool creation at engine construction, scratch
//! allocation during a vectorized pass) can occur later.
//!
//! # Example
//!
//! ```rust
//! use overlay_core::PlanarBuffer;
//! use overlay_ops::{blend, BlendOptions, Strategy};
//!
//! let src = PlanarBuffer::filled(100, [100.0, 100.0, 100.0]);
//! let filter = PlanarBuffer::filled(100, [50.0, 50.0, 50.0]);
//! let mut dst = PlanarBuffer::new(100);
//!
//! blend(&src, &filter, &mut dst, BlendOptions::new(Strategy::Threaded { threads: 4 })).unwrap();
//! assert!((dst.pixel(99)[2] - 41.33).abs() < 1e-2);
//! ```

use overlay_core::{Partition, PixelRange, PlanarBuffer, PlanarView, PlanarViewMut};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};
use wide::{f32x4, f32x8};

use crate::kernel::blend_range;
use crate::packet::{overlay_packet, saturate_packet, ArrayPacket, Packet, PacketScratch};
use crate::partition::{self, PacketPlan, PacketTail, Strategy};
use crate::{BlendError, BlendResult};

/// Runtime configuration of a blend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlendOptions {
    /// How the pixel range is split and executed.
    pub strategy: Strategy,
    /// Clamp every result into `[0, 255]`. Off by default: in-range inputs
    /// never leave the range.
    pub saturate: bool,
}

impl BlendOptions {
    /// Options for `strategy` with saturation off.
    pub const fn new(strategy: Strategy) -> Self {
        Self { strategy, saturate: false }
    }

    /// Sets the saturation flag.
    pub const fn with_saturate(mut self, saturate: bool) -> Self {
        self.saturate = saturate;
        self
    }
}

/// A pixel range bound to its slices of source, filter and destination.
///
/// Tasks built from one validated partition borrow disjoint destination
/// memory, so they can run concurrently without locks.
#[derive(Debug)]
pub struct BlendTask<'a> {
    range: PixelRange,
    source: PlanarView<'a>,
    filter: PlanarView<'a>,
    destination: PlanarViewMut<'a>,
}

impl<'a> BlendTask<'a> {
    /// Splits the buffers along `partition` into one task per range.
    ///
    /// `partition` must already be validated against the buffers' pixel count.
    pub fn split(
        partition: &Partition,
        source: PlanarView<'a>,
        filter: PlanarView<'a>,
        destination: PlanarViewMut<'a>,
    ) -> Vec<BlendTask<'a>> {
        let mut tasks = Vec::with_capacity(partition.len());
        let mut rest = destination;
        for &range in partition {
            let (head, tail) = rest.split_at(range.len());
            rest = tail;
            tasks.push(BlendTask {
                range,
                source: source.slice(range),
                filter: filter.slice(range),
                destination: head,
            });
        }
        tasks
    }

    /// Pixel range this task covers.
    pub fn range(&self) -> PixelRange {
        self.range
    }

    /// Blends the task's range across all three channels.
    pub fn run(self, saturate: bool) {
        trace!(range = %self.range, "blend task");
        blend_range(self.source, self.filter, self.destination, saturate);
    }
}

/// Overlay blend engine bound to one set of [`BlendOptions`].
///
/// Construction validates the options and, for the threaded strategy, starts
/// the worker pool once so repeated calls do not pay thread start-up. Calls
/// hold no state between them and may run concurrently on disjoint buffers.
pub struct BlendEngine {
    options: BlendOptions,
    pool: Option<ThreadPool>,
}

impl std::fmt::Debug for BlendEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlendEngine")
            .field("options", &self.options)
            .field("workers", &self.pool.as_ref().map(ThreadPool::current_num_threads))
            .finish()
    }
}

impl BlendEngine {
    /// Validates `options` and prepares the engine.
    ///
    /// Fails with a configuration error for a zero thread count or an
    /// invalid packet width, and with [`BlendError::ThreadPool`] if the
    /// workers cannot be started.
    pub fn new(options: BlendOptions) -> BlendResult<Self> {
        options.strategy.validate()?;

        let pool = match options.strategy {
            Strategy::Threaded { threads } => Some(build_pool(threads)?),
            Strategy::Sequential | Strategy::Vectorized { .. } => None,
        };

        debug!(strategy = %options.strategy, saturate = options.saturate, "blend engine ready");
        Ok(Self { options, pool })
    }

    /// Options the engine was built with.
    pub fn options(&self) -> &BlendOptions {
        &self.options
    }

    /// Blends `source` with `filter` into `destination`.
    pub fn blend(
        &self,
        source: &PlanarBuffer,
        filter: &PlanarBuffer,
        destination: &mut PlanarBuffer,
    ) -> BlendResult<()> {
        self.blend_views(source.view(), filter.view(), destination.view_mut())
    }

    /// Blends borrowed channel views. All three must share one pixel count.
    pub fn blend_views(
        &self,
        source: PlanarView<'_>,
        filter: PlanarView<'_>,
        destination: PlanarViewMut<'_>,
    ) -> BlendResult<()> {
        let pixel_count = source.pixel_count();
        if filter.pixel_count() != pixel_count || destination.pixel_count() != pixel_count {
            return Err(BlendError::SizeMismatch {
                source_pixels: pixel_count,
                filter_pixels: filter.pixel_count(),
                destination_pixels: destination.pixel_count(),
            });
        }

        debug!(strategy = %self.options.strategy, pixels = pixel_count, "blend");
        if pixel_count == 0 {
            return Ok(());
        }

        let saturate = self.options.saturate;
        match self.options.strategy {
            Strategy::Sequential => {
                partition::sequential(pixel_count).validate(pixel_count)?;
                blend_range(source, filter, destination, saturate);
                Ok(())
            }
            Strategy::Threaded { threads } => {
                let part = partition::static_threads(pixel_count, threads)?;
                let pool = match &self.pool {
                    Some(pool) => pool,
                    None => return Err(BlendError::ThreadPool("worker pool missing".into())),
                };
                run_tasks(pool, BlendTask::split(&part, source, filter, destination), saturate);
                Ok(())
            }
            Strategy::Vectorized { packet_width } => {
                let plan = PacketPlan::new(pixel_count, packet_width)?;
                blend_vectorized(&plan, source, filter, destination, saturate)
            }
        }
    }
}

/// Blends with a one-shot engine built from `options`.
///
/// Convenient for single calls; repeated threaded calls should keep a
/// [`BlendEngine`] to reuse its worker pool.
pub fn blend(
    source: &PlanarBuffer,
    filter: &PlanarBuffer,
    destination: &mut PlanarBuffer,
    options: BlendOptions,
) -> BlendResult<()> {
    // Size check first so a mismatch never costs a pool start.
    if filter.pixel_count() != source.pixel_count()
        || destination.pixel_count() != source.pixel_count()
    {
        return Err(BlendError::SizeMismatch {
            source_pixels: source.pixel_count(),
            filter_pixels: filter.pixel_count(),
            destination_pixels: destination.pixel_count(),
        });
    }
    BlendEngine::new(options)?.blend(source, filter, destination)
}

fn build_pool(threads: usize) -> BlendResult<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("overlay-worker-{i}"))
        .build()
        .map_err(|e| BlendError::ThreadPool(e.to_string()))
}

/// Fork-join: spawn every task into the pool's scope, return when all are done.
fn run_tasks(pool: &ThreadPool, tasks: Vec<BlendTask<'_>>, saturate: bool) {
    trace!(tasks = tasks.len(), "dispatch");
    pool.scope(|scope| {
        for task in tasks {
            scope.spawn(move |_| task.run(saturate));
        }
    });
}

fn blend_vectorized(
    plan: &PacketPlan,
    source: PlanarView<'_>,
    filter: PlanarView<'_>,
    destination: PlanarViewMut<'_>,
    saturate: bool,
) -> BlendResult<()> {
    match plan.width() {
        1 => blend_packets::<ArrayPacket<1>>(plan, source, filter, destination, saturate),
        2 => blend_packets::<ArrayPacket<2>>(plan, source, filter, destination, saturate),
        4 => blend_packets::<f32x4>(plan, source, filter, destination, saturate),
        8 => blend_packets::<f32x8>(plan, source, filter, destination, saturate),
        16 => blend_packets::<ArrayPacket<16>>(plan, source, filter, destination, saturate),
        w => Err(BlendError::UnsupportedPacketWidth(w)),
    }
}

fn blend_packets<P: Packet>(
    plan: &PacketPlan,
    source: PlanarView<'_>,
    filter: PlanarView<'_>,
    destination: PlanarViewMut<'_>,
    saturate: bool,
) -> BlendResult<()> {
    // One staging area per channel, allocated before anything is written.
    let mut scratch = [
        PacketScratch::try_new(P::LANES)?,
        PacketScratch::try_new(P::LANES)?,
        PacketScratch::try_new(P::LANES)?,
    ];

    let src = source.channels();
    let flt = filter.channels();
    for (c, dst) in destination.into_channels().into_iter().enumerate() {
        blend_channel::<P>(plan, src[c], flt[c], dst, &mut scratch[c], saturate);
    }
    Ok(())
}

#[inline(always)]
fn eval<P: Packet>(x: P, y: P, saturate: bool) -> P {
    let d = overlay_packet(x, y);
    if saturate { saturate_packet(d) } else { d }
}

/// One channel of a vectorized pass: full packets in place, then the tail.
fn blend_channel<P: Packet>(
    plan: &PacketPlan,
    src: &[f32],
    filter: &[f32],
    dst: &mut [f32],
    scratch: &mut PacketScratch,
    saturate: bool,
) {
    debug_assert_eq!(plan.width(), P::LANES);

    for range in plan.packet_ranges() {
        let r = range.as_range();
        let d = eval(P::load(&src[r.clone()]), P::load(&filter[r.clone()]), saturate);
        d.store(&mut dst[r]);
    }

    if let Some(tail) = plan.tail() {
        blend_tail::<P>(tail, src, filter, dst, scratch, saturate);
    }
}

/// The leftover packet of one channel. Loads the shifted window (or the
/// zero-padded staging packet when the channel is shorter than `P::LANES`)
/// and writes back only `tail.write`.
fn blend_tail<P: Packet>(
    tail: PacketTail,
    src: &[f32],
    filter: &[f32],
    dst: &mut [f32],
    scratch: &mut PacketScratch,
    saturate: bool,
) {
    trace!(window = %tail.window, write = %tail.write, "tail packet");

    let (x_stage, y_stage, out) = scratch.parts_mut();
    let w = tail.window.as_range();
    let (x, y) = if tail.is_shifted(P::LANES) {
        (P::load(&src[w.clone()]), P::load(&filter[w]))
    } else {
        x_stage[..w.len()].copy_from_slice(&src[w.clone()]);
        y_stage[..w.len()].copy_from_slice(&filter[w]);
        (P::load(x_stage), P::load(y_stage))
    };

    // Masked store: only the lanes past the last full packet reach `dst`.
    eval(x, y, saturate).store(out);
    let skip = tail.skip();
    dst[tail.write.as_range()].copy_from_slice(&out[skip..skip + tail.write.len()]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel;
    use approx::assert_relative_eq;
    use overlay_core::Channel;

    fn ramp(n: usize, seed: f32) -> PlanarBuffer {
        let ch = |k: f32| (0..n).map(|i| (i as f32 * 7.3 + seed * k) % 256.0).collect::<Vec<_>>();
        PlanarBuffer::from_channels(ch(1.0), ch(2.0), ch(3.0)).unwrap()
    }

    #[test]
    fn test_sequential_matches_kernel() {
        let src = ramp(37, 11.0);
        let filter = ramp(37, 101.0);
        let mut dst = PlanarBuffer::new(37);

        blend(&src, &filter, &mut dst, BlendOptions::default()).unwrap();

        for c in Channel::ALL {
            for i in 0..37 {
                let expected = kernel::overlay(src.channel(c)[i], filter.channel(c)[i]);
                assert_relative_eq!(dst.channel(c)[i], expected, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_vectorized_tail_writes_only_leftover() {
        // 19 = 2 full packets of 8 + 3 leftover lanes.
        let src = ramp(19, 3.0);
        let filter = ramp(19, 200.0);
        let plan = PacketPlan::new(19, 8).unwrap();

        let mut dst = vec![-1.0f32; 19];
        let mut scratch = PacketScratch::try_new(8).unwrap();
        blend_channel::<f32x8>(
            &plan,
            src.channel(Channel::R),
            filter.channel(Channel::R),
            &mut dst,
            &mut scratch,
            false,
        );
        for (i, &d) in dst.iter().enumerate() {
            let x = src.channel(Channel::R)[i];
            let y = filter.channel(Channel::R)[i];
            assert_eq!(d, kernel::overlay(x, y), "index {i}");
        }

        // Tail alone must leave the overlapped lanes [11, 16) untouched.
        let mut dst = vec![-1.0f32; 19];
        blend_tail::<f32x8>(
            plan.tail().unwrap(),
            src.channel(Channel::R),
            filter.channel(Channel::R),
            &mut dst,
            &mut scratch,
            false,
        );
        assert!(dst[..16].iter().all(|&v| v == -1.0));
        for i in 16..19 {
            let x = src.channel(Channel::R)[i];
            let y = filter.channel(Channel::R)[i];
            assert_eq!(dst[i], kernel::overlay(x, y), "index {i}");
        }
    }

    #[test]
    fn test_short_tail_writes_only_pixel_count() {
        // 5 pixels in a 16-lane packet: staged, nothing past index 4 exists.
        let src = ramp(5, 9.0);
        let filter = ramp(5, 31.0);
        let plan = PacketPlan::new(5, 16).unwrap();
        let tail = plan.tail().unwrap();
        assert!(!tail.is_shifted(16));

        let mut scratch = PacketScratch::try_new(16).unwrap();
        let mut dst = vec![-1.0f32; 5];
        blend_tail::<ArrayPacket<16>>(
            tail,
            src.channel(Channel::G),
            filter.channel(Channel::G),
            &mut dst,
            &mut scratch,
            true,
        );
        for (i, &d) in dst.iter().enumerate() {
            let x = src.channel(Channel::G)[i];
            let y = filter.channel(Channel::G)[i];
            assert_eq!(d, kernel::saturate(kernel::overlay(x, y)), "index {i}");
        }
    }

    #[test]
    fn test_vectorized_shorter_than_packet() {
        let src = ramp(5, 1.0);
        let filter = ramp(5, 77.0);
        let mut dst = PlanarBuffer::new(5);
        let opts = BlendOptions::new(Strategy::Vectorized { packet_width: 16 });

        blend(&src, &filter, &mut dst, opts).unwrap();

        for c in Channel::ALL {
            for i in 0..5 {
                let expected = kernel::overlay(src.channel(c)[i], filter.channel(c)[i]);
                assert_eq!(dst.channel(c)[i], expected);
            }
        }
    }

    #[test]
    fn test_tasks_follow_partition() {
        let src = ramp(10, 1.0);
        let filter = ramp(10, 2.0);
        let mut dst = PlanarBuffer::new(10);
        let part = partition::static_threads(10, 3).unwrap();

        let tasks = BlendTask::split(&part, src.view(), filter.view(), dst.view_mut());
        let ranges: Vec<_> = tasks.iter().map(BlendTask::range).collect();
        assert_eq!(ranges, part.ranges());
        assert_eq!(tasks[2].destination.pixel_count(), 4);
    }

    #[test]
    fn test_engine_rejects_bad_options() {
        assert!(matches!(
            BlendEngine::new(BlendOptions::new(Strategy::Threaded { threads: 0 })),
            Err(BlendError::InvalidThreadCount)
        ));
        assert!(matches!(
            BlendEngine::new(BlendOptions::new(Strategy::Vectorized { packet_width: 0 })),
            Err(BlendError::InvalidPacketWidth)
        ));
        assert!(matches!(
            BlendEngine::new(BlendOptions::new(Strategy::Vectorized { packet_width: 5 })),
            Err(BlendError::UnsupportedPacketWidth(5))
        ));
    }

    #[test]
    fn test_options_builder() {
        let opts = BlendOptions::new(Strategy::vectorized()).with_saturate(true);
        assert!(opts.saturate);
        assert_eq!(opts.strategy, Strategy::Vectorized { packet_width: 8 });
        assert!(!BlendOptions::default().saturate);
    }

    #[test]
    fn test_engine_debug_shows_workers() {
        let engine = BlendEngine::new(BlendOptions::new(Strategy::Threaded { threads: 2 })).unwrap();
        assert!(format!("{engine:?}").contains("Some(2)"));
    }
}
