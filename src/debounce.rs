//! The debounce handshake between an edge interrupt and the polling loop.
//!
//! This is a timing lockout, not a filter. The interrupt handler stamps the tick of the
//! *first* edge on a line and ignores every further edge until that stamp is resolved.
//! The polling loop waits until the debounce window has passed since the stamp, then reads
//! the line once and compares it with the last settled level. However many bounces happened
//! in between, at most one [`Edge`] comes out per window, and it reflects the level at the
//! end of the window.
//!
//! See [`DebounceChannel`] for usage.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::Callback;
use crate::pin::{EdgeInput, Level, Pull, read_level};
use crate::ticks::{TickSource, ticks_since};
use crate::{Error, Result};

/// Stored in the pending stamp when no edge is waiting.
const NOT_PENDING: u32 = 0;

// ============================================================================
// Edge
// ============================================================================

/// A debounced change of a line's settled level.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Settled level went from low to high.
    Rising,
    /// Settled level went from high to low.
    Falling,
}

impl Edge {
    /// The edge that takes a line from `from` to `to`, if the levels differ.
    #[must_use]
    pub const fn between(from: Level, to: Level) -> Option<Self> {
        match (from, to) {
            (Level::Low, Level::High) => Some(Self::Rising),
            (Level::High, Level::Low) => Some(Self::Falling),
            _ => None,
        }
    }

    /// The level the line settles at after this edge.
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::Rising => Level::High,
            Self::Falling => Level::Low,
        }
    }
}

// ============================================================================
// DebounceConfig
// ============================================================================

/// Fixed configuration of a [`DebounceChannel`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceConfig {
    /// Ticks a line must be left alone after its first edge before it is read.
    pub debounce_window: u32,
    /// Settled level assumed at startup.
    pub initial_level: Level,
    /// Pull resistor applied by [`DebounceChannel::begin`].
    pub pull: Pull,
}

impl DebounceConfig {
    /// A channel that idles at `initial_level`.
    #[must_use]
    pub const fn new(debounce_window: u32, initial_level: Level, pull: Pull) -> Self {
        Self {
            debounce_window,
            initial_level,
            pull,
        }
    }
}

// ============================================================================
// DebounceChannelStatic - state shared with the interrupt handler
// ============================================================================

/// The part of a debounce channel that the interrupt handler touches.
///
/// Put it in a `static` and hand the interrupt handler a reference. Only [`notify`](Self::notify)
/// runs in interrupt context; everything else belongs to the [`DebounceChannel`] that
/// claims it.
pub struct DebounceChannelStatic {
    pin_mask: u32,
    pending_since: AtomicU32,
    claimed: AtomicBool,
}

impl DebounceChannelStatic {
    /// Creates the shared state for the line selected by `pin_mask` in the
    /// interrupt handler's changed-pins mask.
    #[must_use]
    pub const fn new(pin_mask: u32) -> Self {
        Self {
            pin_mask,
            pending_since: AtomicU32::new(NOT_PENDING),
            claimed: AtomicBool::new(false),
        }
    }

    /// Records an edge at tick `now` if `changed_mask` includes this line and no edge is
    /// already pending. Otherwise does nothing.
    ///
    /// Call this from the edge interrupt handler, once per invocation, with a mask of the
    /// lines that changed since the previous invocation. It never reads the pin.
    #[inline]
    pub fn notify(&self, now: u32, changed_mask: u32) {
        if changed_mask & self.pin_mask == 0 {
            return;
        }
        // Tick 0 would read as "nothing pending". Stamp it as the tick before, which
        // shortens that one window by a tick and keeps the stamp in the past.
        let stamp = if now == NOT_PENDING { u32::MAX } else { now };
        // A failed exchange means an earlier edge is still unresolved: coalesce.
        let _ = self.pending_since.compare_exchange(
            NOT_PENDING,
            stamp,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Whether an edge has been recorded and not yet resolved.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_since.load(Ordering::Acquire) != NOT_PENDING
    }

    /// The mask this channel answers to.
    #[must_use]
    pub const fn pin_mask(&self) -> u32 {
        self.pin_mask
    }

    fn pending_since(&self) -> Option<u32> {
        match self.pending_since.load(Ordering::Acquire) {
            NOT_PENDING => None,
            stamp => Some(stamp),
        }
    }

    /// Takes ownership of the pending edge stamped `snapshot`.
    ///
    /// Fails if the stamp changed since it was read; the caller must then leave the
    /// edge for a later poll.
    fn try_take(&self, snapshot: u32) -> bool {
        self.pending_since
            .compare_exchange(snapshot, NOT_PENDING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Puts a taken stamp back, unless a newer edge has been recorded meanwhile.
    fn restore(&self, snapshot: u32) {
        let _ = self.pending_since.compare_exchange(
            NOT_PENDING,
            snapshot,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    fn claim(&self) -> Result<()> {
        if self.pin_mask == 0 {
            return Err(Error::EmptyPinMask);
        }
        if self.claimed.swap(true, Ordering::AcqRel) {
            return Err(Error::ChannelInUse);
        }
        Ok(())
    }
}

// ============================================================================
// DebounceChannel - the polling side
// ============================================================================

/// One debounced binary input, resolved from the polling loop.
///
/// # Example
///
/// ```rust,ignore
/// use input_envoy::debounce::{DebounceChannel, DebounceChannelStatic, DebounceConfig, Edge};
/// use input_envoy::pin::{Level, Pull};
///
/// static SWITCH_STATIC: DebounceChannelStatic = DebounceChannelStatic::new(1 << 3);
///
/// // In the pin-change interrupt handler:
/// //     SWITCH_STATIC.notify(ticks.now_ticks(), changed);
///
/// let config = DebounceConfig::new(30, Level::High, Pull::Up);
/// let mut switch = DebounceChannel::new(&SWITCH_STATIC, pin, ticks, config)?;
/// switch.begin()?;
/// loop {
///     if switch.resolve() == Some(Edge::Falling) {
///         change_mode();
///     }
/// }
/// ```
pub struct DebounceChannel<'a, P, T> {
    channel_static: &'a DebounceChannelStatic,
    pin: P,
    ticks: T,
    debounce_window: u32,
    pull: Pull,
    stable_level: Level,
    on_rising: Option<Callback>,
    on_falling: Option<Callback>,
}

impl<'a, P: EdgeInput, T: TickSource> DebounceChannel<'a, P, T> {
    /// Creates a channel that resolves edges recorded in `channel_static`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPinMask`] if the static's mask selects no line, or
    /// [`Error::ChannelInUse`] if another device already claimed it.
    pub fn new(
        channel_static: &'a DebounceChannelStatic,
        pin: P,
        ticks: T,
        config: DebounceConfig,
    ) -> Result<Self> {
        channel_static.claim()?;
        Ok(Self {
            channel_static,
            pin,
            ticks,
            debounce_window: config.debounce_window,
            pull: config.pull,
            stable_level: config.initial_level,
            on_rising: None,
            on_falling: None,
        })
    }

    /// Configures the pin and arms its edge interrupt.
    ///
    /// Must run before the platform's interrupts are enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PinSetup`] if the GPIO collaborator rejects either step.
    pub fn begin(&mut self) -> Result<()> {
        self.pin
            .configure_input(self.pull)
            .map_err(|_| Error::PinSetup)?;
        self.pin
            .enable_edge_interrupt()
            .map_err(|_| Error::PinSetup)
    }

    /// Same as [`DebounceChannelStatic::notify`].
    #[inline]
    pub fn notify(&self, now: u32, changed_mask: u32) {
        self.channel_static.notify(now, changed_mask);
    }

    /// Registers the callback run when a rising edge is resolved. `None` disables it.
    pub fn set_on_rising(&mut self, callback: Option<Callback>) {
        self.on_rising = callback;
    }

    /// Registers the callback run when a falling edge is resolved. `None` disables it.
    pub fn set_on_falling(&mut self, callback: Option<Callback>) {
        self.on_falling = callback;
    }

    /// Resolves the pending edge once its debounce window has passed.
    ///
    /// Returns `None` when nothing is pending, when the line is still settling, when the
    /// line settled back at its previous level, or when the pin could not be read (the
    /// edge then stays pending). Runs at most one callback.
    pub fn resolve(&mut self) -> Option<Edge> {
        let edge = self.resolve_quiet()?;
        let callback = match edge {
            Edge::Rising => self.on_rising,
            Edge::Falling => self.on_falling,
        };
        if let Some(callback) = callback {
            callback();
        }
        Some(edge)
    }

    /// [`resolve`](Self::resolve) without running callbacks, for the devices built on top.
    pub(crate) fn resolve_quiet(&mut self) -> Option<Edge> {
        let snapshot = self.channel_static.pending_since()?;
        if ticks_since(self.ticks.now_ticks(), snapshot) < self.debounce_window {
            return None;
        }

        // Take the stamp before sampling. An edge that lands after this point is stamped
        // fresh and resolved on a later poll, so none is lost between sample and commit.
        if !self.channel_static.try_take(snapshot) {
            debug!("input-envoy: pending edge changed during resolution, retrying");
            return None;
        }

        let Some(level) = read_level(&mut self.pin) else {
            self.channel_static.restore(snapshot);
            return None;
        };

        let edge = Edge::between(self.stable_level, level);
        self.stable_level = level;
        if let Some(edge) = edge {
            trace!("input-envoy: resolved {}", edge);
        }
        edge
    }

    /// Whether an edge is recorded and not yet resolved.
    ///
    /// Keep the tick counter running while this is `true`.
    #[must_use]
    pub fn pending_timeout(&self) -> bool {
        self.channel_static.is_pending()
    }

    /// The last level accepted as settled.
    #[must_use]
    pub const fn stable_level(&self) -> Level {
        self.stable_level
    }

    /// Reads the live (undebounced) level of the pin.
    pub(crate) fn read_live_level(&mut self) -> Option<Level> {
        read_level(&mut self.pin)
    }

    pub(crate) fn now_ticks(&self) -> u32 {
        self.ticks.now_ticks()
    }
}
