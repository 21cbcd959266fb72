//! A device abstraction for mechanical (quadrature) rotary encoders.
//!
//! See [`RotaryEncoder`] for usage example.

use crate::Callback;
use crate::debounce::{DebounceChannel, DebounceChannelStatic, DebounceConfig, Edge};
use crate::pin::{EdgeInput, Level, PressedTo, Pull, read_level};
use crate::ticks::TickSource;
use crate::{Error, Result};

/// Default debounce window for the encoder's clock line, in ticks.
pub const ENCODER_DEBOUNCE_TICKS: u32 = 2;

/// Direction of one detent.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// Clockwise.
    Clockwise,
    /// Counter-clockwise.
    CounterClockwise,
}

impl Rotation {
    /// The opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Fixed configuration of a [`RotaryEncoder`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotaryEncoderConfig {
    /// Ticks the clock line must settle after an edge.
    pub debounce_window: u32,
    /// Level of both lines while their contacts are open.
    pub passive_level: Level,
    /// Pull resistor applied to both lines by [`RotaryEncoder::begin`].
    pub pull: Pull,
    /// Swap the reported directions.
    pub reverse: bool,
}

impl RotaryEncoderConfig {
    /// Defaults for an encoder whose contacts close to `pressed_to`, with an
    /// [`ENCODER_DEBOUNCE_TICKS`] debounce window and no reversal.
    #[must_use]
    pub const fn new(pressed_to: PressedTo) -> Self {
        Self {
            debounce_window: ENCODER_DEBOUNCE_TICKS,
            passive_level: pressed_to.passive_level(),
            pull: pressed_to.pull(),
            reverse: false,
        }
    }
}

/// A device abstraction for a rotary encoder with clock (A) and data (B) lines.
///
/// Only the clock line is debounced and wired to the edge interrupt. A settled *falling*
/// clock edge counts as one detent; rising clock edges are the trailing half of the same
/// detent and are ignored. At that moment the data line is read directly:
///
/// | data line        | `reverse: false`   | `reverse: true`    |
/// |------------------|--------------------|--------------------|
/// | at passive level | `CounterClockwise` | `Clockwise`        |
/// | at active level  | `Clockwise`        | `CounterClockwise` |
///
/// Which of these is "clockwise" depends on the encoder's phase and on the wiring, so check
/// it against the actual part and flip `reverse` if needed.
///
/// # Example
///
/// ```rust,ignore
/// use input_envoy::debounce::DebounceChannelStatic;
/// use input_envoy::pin::PressedTo;
/// use input_envoy::rotary_encoder::{RotaryEncoder, RotaryEncoderConfig, Rotation};
///
/// static CLOCK_STATIC: DebounceChannelStatic = DebounceChannelStatic::new(1 << 4);
///
/// let mut encoder = RotaryEncoder::new(
///     &CLOCK_STATIC,
///     clock_pin,
///     data_pin,
///     ticks,
///     RotaryEncoderConfig::new(PressedTo::Ground),
/// )?;
/// encoder.begin()?;
/// loop {
///     match encoder.process() {
///         Some(Rotation::Clockwise) => volume += 1,
///         Some(Rotation::CounterClockwise) => volume -= 1,
///         None => {}
///     }
/// }
/// ```
pub struct RotaryEncoder<'a, C, D, T> {
    clock: DebounceChannel<'a, C, T>,
    data: D,
    config: RotaryEncoderConfig,
    on_clockwise: Option<Callback>,
    on_counter_clockwise: Option<Callback>,
}

impl<'a, C: EdgeInput, D: EdgeInput, T: TickSource> RotaryEncoder<'a, C, D, T> {
    /// Creates a new `RotaryEncoder` whose clock line is recorded in `clock_static`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`DebounceChannel::new`].
    pub fn new(
        clock_static: &'a DebounceChannelStatic,
        clock_pin: C,
        data_pin: D,
        ticks: T,
        config: RotaryEncoderConfig,
    ) -> Result<Self> {
        let clock = DebounceChannel::new(
            clock_static,
            clock_pin,
            ticks,
            DebounceConfig::new(config.debounce_window, config.passive_level, config.pull),
        )?;
        Ok(Self {
            clock,
            data: data_pin,
            config,
            on_clockwise: None,
            on_counter_clockwise: None,
        })
    }

    /// Configures both lines and arms the clock line's edge interrupt. Run before enabling
    /// interrupts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PinSetup`] if either pin cannot be configured.
    pub fn begin(&mut self) -> Result<()> {
        self.clock.begin()?;
        self.data
            .configure_input(self.config.pull)
            .map_err(|_| Error::PinSetup)
    }

    /// Forwards an edge notification from the interrupt handler.
    #[inline]
    pub fn notify(&self, now: u32, changed_mask: u32) {
        self.clock.notify(now, changed_mask);
    }

    /// Registers the clockwise callback. `None` disables it.
    pub fn set_on_clockwise(&mut self, callback: Option<Callback>) {
        self.on_clockwise = callback;
    }

    /// Registers the counter-clockwise callback. `None` disables it.
    pub fn set_on_counter_clockwise(&mut self, callback: Option<Callback>) {
        self.on_counter_clockwise = callback;
    }

    /// Reports the detent completed since the last call, if any, and runs its callback.
    pub fn process(&mut self) -> Option<Rotation> {
        if self.clock.resolve_quiet()? != Edge::Falling {
            return None;
        }
        // The clock edge has settled, so the data line is read as is.
        let data_level = read_level(&mut self.data)?;
        let rotation = if data_level == self.config.passive_level {
            Rotation::CounterClockwise
        } else {
            Rotation::Clockwise
        };
        let rotation = if self.config.reverse {
            rotation.reversed()
        } else {
            rotation
        };
        debug!("RotaryEncoder: {}", rotation);

        let callback = match rotation {
            Rotation::Clockwise => self.on_clockwise,
            Rotation::CounterClockwise => self.on_counter_clockwise,
        };
        if let Some(callback) = callback {
            callback();
        }
        Some(rotation)
    }

    /// Whether a clock edge awaits its debounce decision.
    #[must_use]
    pub fn pending_timeout(&self) -> bool {
        self.clock.pending_timeout()
    }

    pub(crate) fn clear_callbacks(&mut self) {
        self.on_clockwise = None;
        self.on_counter_clockwise = None;
    }
}
