//! A device abstraction for a rotary encoder with a built-in push button.
//!
//! See [`Knob`] for usage example.

use crate::{Callback, Result};
use crate::button::{Button, ButtonAction};
use crate::pin::EdgeInput;
use crate::rotary_encoder::{RotaryEncoder, Rotation};
use crate::ticks::TickSource;

/// An action reported by [`Knob::process`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KnobAction {
    /// The button was released.
    Release,
    /// The button was pressed.
    Press,
    /// The button has been held for its long-press window.
    LongPress,
    /// Turned clockwise with the button released.
    Clockwise,
    /// Turned counter-clockwise with the button released.
    CounterClockwise,
    /// Turned clockwise while the button was held.
    PressedClockwise,
    /// Turned counter-clockwise while the button was held.
    PressedCounterClockwise,
}

/// A rotary encoder and its push button, arbitrated as one input.
///
/// Turning while the button is held reports [`KnobAction::PressedClockwise`] /
/// [`KnobAction::PressedCounterClockwise`], and the release that ends that hold is
/// swallowed, so "hold and turn" never also reads as a click. Turning with the button up
/// reports plain [`KnobAction::Clockwise`] / [`KnobAction::CounterClockwise`].
///
/// Each call to [`process()`](Self::process) reports at most one action. Rotation goes
/// first: when the encoder reports a detent, the button is left untouched until the next
/// call, so a press or release that settles at the same moment is reported one poll later
/// rather than lost.
///
/// # Example
///
/// ```rust,ignore
/// use input_envoy::button::{Button, ButtonConfig};
/// use input_envoy::debounce::DebounceChannelStatic;
/// use input_envoy::knob::{Knob, KnobAction};
/// use input_envoy::pin::PressedTo;
/// use input_envoy::rotary_encoder::{RotaryEncoder, RotaryEncoderConfig};
///
/// static BUTTON_STATIC: DebounceChannelStatic = DebounceChannelStatic::new(1 << 2);
/// static CLOCK_STATIC: DebounceChannelStatic = DebounceChannelStatic::new(1 << 3);
///
/// // Edge interrupt handler:
/// //     BUTTON_STATIC.notify(now, changed);
/// //     CLOCK_STATIC.notify(now, changed);
///
/// let button = Button::new(&BUTTON_STATIC, sw_pin, ticks, ButtonConfig::new(PressedTo::Ground))?;
/// let encoder = RotaryEncoder::new(
///     &CLOCK_STATIC,
///     clk_pin,
///     dt_pin,
///     ticks,
///     RotaryEncoderConfig::new(PressedTo::Ground),
/// )?;
/// let mut knob = Knob::new(button, encoder);
/// knob.begin()?;
///
/// loop {
///     match knob.process() {
///         Some(KnobAction::Clockwise) => hour += 1,
///         Some(KnobAction::PressedClockwise) => minute += 1,
///         Some(KnobAction::Release) => next_field(),
///         _ => {}
///     }
/// }
/// ```
pub struct Knob<'a, B, C, D, T> {
    button: Button<'a, B, T>,
    encoder: RotaryEncoder<'a, C, D, T>,
    suppress_next_release: bool,
    on_release: Option<Callback>,
    on_press: Option<Callback>,
    on_long_press: Option<Callback>,
    on_clockwise: Option<Callback>,
    on_counter_clockwise: Option<Callback>,
    on_pressed_clockwise: Option<Callback>,
    on_pressed_counter_clockwise: Option<Callback>,
}

impl<'a, B, C, D, T> Knob<'a, B, C, D, T>
where
    B: EdgeInput,
    C: EdgeInput,
    D: EdgeInput,
    T: TickSource,
{
    /// Combines a button and an encoder into one knob.
    ///
    /// Callbacks already registered on `button` or `encoder` are dropped: the knob runs its
    /// own, once per action.
    #[must_use]
    pub fn new(mut button: Button<'a, B, T>, mut encoder: RotaryEncoder<'a, C, D, T>) -> Self {
        button.clear_callbacks();
        encoder.clear_callbacks();
        Self {
            button,
            encoder,
            suppress_next_release: false,
            on_release: None,
            on_press: None,
            on_long_press: None,
            on_clockwise: None,
            on_counter_clockwise: None,
            on_pressed_clockwise: None,
            on_pressed_counter_clockwise: None,
        }
    }

    /// Sets up the button and both encoder lines. Run before enabling interrupts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PinSetup`](crate::Error::PinSetup) if any pin cannot be configured.
    pub fn begin(&mut self) -> Result<()> {
        self.button.begin()?;
        self.encoder.begin()
    }

    /// Forwards an edge notification from the interrupt handler to the button and encoder.
    #[inline]
    pub fn notify(&self, now: u32, changed_mask: u32) {
        self.button.notify(now, changed_mask);
        self.encoder.notify(now, changed_mask);
    }

    /// Registers the release callback. `None` disables it.
    pub fn set_on_release(&mut self, callback: Option<Callback>) {
        self.on_release = callback;
    }

    /// Registers the press callback. `None` disables it.
    pub fn set_on_press(&mut self, callback: Option<Callback>) {
        self.on_press = callback;
    }

    /// Registers the long-press callback. `None` disables it.
    pub fn set_on_long_press(&mut self, callback: Option<Callback>) {
        self.on_long_press = callback;
    }

    /// Registers the clockwise callback. `None` disables it.
    pub fn set_on_clockwise(&mut self, callback: Option<Callback>) {
        self.on_clockwise = callback;
    }

    /// Registers the counter-clockwise callback. `None` disables it.
    pub fn set_on_counter_clockwise(&mut self, callback: Option<Callback>) {
        self.on_counter_clockwise = callback;
    }

    /// Registers the held-and-turned-clockwise callback. `None` disables it.
    pub fn set_on_pressed_clockwise(&mut self, callback: Option<Callback>) {
        self.on_pressed_clockwise = callback;
    }

    /// Registers the held-and-turned-counter-clockwise callback. `None` disables it.
    pub fn set_on_pressed_counter_clockwise(&mut self, callback: Option<Callback>) {
        self.on_pressed_counter_clockwise = callback;
    }

    /// Returns whether the button's settled state is pressed.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.button.is_pressed()
    }

    /// Reports at most one action and runs its callback.
    pub fn process(&mut self) -> Option<KnobAction> {
        let action = match self.encoder.process() {
            Some(rotation) => Some(self.rotated(rotation)),
            None => self.button_action(),
        }?;
        debug!("Knob: {}", action);

        let callback = match action {
            KnobAction::Release => self.on_release,
            KnobAction::Press => self.on_press,
            KnobAction::LongPress => self.on_long_press,
            KnobAction::Clockwise => self.on_clockwise,
            KnobAction::CounterClockwise => self.on_counter_clockwise,
            KnobAction::PressedClockwise => self.on_pressed_clockwise,
            KnobAction::PressedCounterClockwise => self.on_pressed_counter_clockwise,
        };
        if let Some(callback) = callback {
            callback();
        }
        Some(action)
    }

    /// Whether the tick counter must keep running for the button or the encoder.
    #[must_use]
    pub fn pending_timeout(&self) -> bool {
        self.button.pending_timeout() || self.encoder.pending_timeout()
    }

    fn rotated(&mut self, rotation: Rotation) -> KnobAction {
        if !self.button.is_pressed() {
            return match rotation {
                Rotation::Clockwise => KnobAction::Clockwise,
                Rotation::CounterClockwise => KnobAction::CounterClockwise,
            };
        }
        self.suppress_next_release = true;
        match rotation {
            Rotation::Clockwise => KnobAction::PressedClockwise,
            Rotation::CounterClockwise => KnobAction::PressedCounterClockwise,
        }
    }

    fn button_action(&mut self) -> Option<KnobAction> {
        match self.button.process()? {
            ButtonAction::LongPress => Some(KnobAction::LongPress),
            ButtonAction::Press => {
                // A new hold starts with nothing to swallow.
                self.suppress_next_release = false;
                Some(KnobAction::Press)
            }
            ButtonAction::Release => {
                if core::mem::take(&mut self.suppress_next_release) {
                    trace!("Knob: release after turning while held suppressed");
                    return None;
                }
                Some(KnobAction::Release)
            }
        }
    }
}
