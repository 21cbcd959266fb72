//! The free-running tick counter that timestamps edges.
//!
//! Ticks are `u32` and wrap. Every elapsed-time comparison in this crate goes through
//! [`ticks_since`], so wraparound is absorbed by modular arithmetic.

/// A monotonic, wrapping tick counter driven by a fixed-period timer.
pub trait TickSource {
    /// The current tick count.
    fn now_ticks(&self) -> u32;
}

impl<T: TickSource + ?Sized> TickSource for &T {
    #[inline]
    fn now_ticks(&self) -> u32 {
        (**self).now_ticks()
    }
}

/// Ticks elapsed from `earlier` to `now`, correct across one wrap of the counter.
#[inline]
#[must_use]
pub const fn ticks_since(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier)
}

/// Millisecond ticks from [`embassy_time::Instant`], truncated to 32 bits.
///
/// Configure debounce and long-press windows in milliseconds when using this source.
#[cfg(feature = "embassy-time")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyTicks;

#[cfg(feature = "embassy-time")]
impl TickSource for EmbassyTicks {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the tick counter is defined to wrap at 32 bits"
    )]
    fn now_ticks(&self) -> u32 {
        embassy_time::Instant::now().as_millis() as u32
    }
}
