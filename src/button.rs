//! A device abstraction for buttons with interrupt-driven debouncing and long-press detection.
//!
//! See [`Button`] for usage example.

use crate::Callback;
use crate::debounce::{DebounceChannel, DebounceChannelStatic, DebounceConfig};
use crate::pin::{EdgeInput, Level, PressedTo, Pull};
use crate::ticks::{TickSource, ticks_since};
use crate::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default debounce window for a button, in ticks.
pub const BUTTON_DEBOUNCE_TICKS: u32 = 10;

/// Default hold time that counts as a long press, in ticks.
pub const LONG_PRESS_TICKS: u32 = 500;

// ============================================================================
// ButtonAction - What the button reports
// ============================================================================

/// An action reported by [`Button::process`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    /// The button went back to its passive level.
    Release,
    /// The button reached its active level.
    Press,
    /// The button has been held for the long-press window.
    LongPress,
}

// ============================================================================
// ButtonConfig
// ============================================================================

/// Fixed configuration of a [`Button`].
///
/// Start from [`ButtonConfig::new`] and override fields with struct-update syntax:
///
/// ```rust
/// use input_envoy::button::ButtonConfig;
/// use input_envoy::pin::PressedTo;
///
/// const CONFIG: ButtonConfig = ButtonConfig {
///     debounce_window: 20,
///     allow_consecutive_long_presses: true,
///     ..ButtonConfig::new(PressedTo::Ground)
/// };
/// assert_eq!(CONFIG.long_press_window, Some(500));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// Ticks the line must settle after an edge.
    pub debounce_window: u32,
    /// Level of the pin while the button is released.
    pub passive_level: Level,
    /// Pull resistor applied by [`Button::begin`].
    pub pull: Pull,
    /// Ticks of continuous hold that make a long press. `None` turns long-press
    /// tracking off.
    pub long_press_window: Option<u32>,
    /// Swallow the release that ends a hold which already reported a long press.
    pub suppress_release_after_long_press: bool,
    /// Keep reporting [`ButtonAction::LongPress`] every `long_press_window` while held,
    /// instead of once per hold.
    pub allow_consecutive_long_presses: bool,
}

impl ButtonConfig {
    /// Defaults for a button wired as `pressed_to`: [`BUTTON_DEBOUNCE_TICKS`] debounce,
    /// [`LONG_PRESS_TICKS`] long press, one long press per hold, and its release suppressed.
    #[must_use]
    pub const fn new(pressed_to: PressedTo) -> Self {
        Self {
            debounce_window: BUTTON_DEBOUNCE_TICKS,
            passive_level: pressed_to.passive_level(),
            pull: pressed_to.pull(),
            long_press_window: Some(LONG_PRESS_TICKS),
            suppress_release_after_long_press: true,
            allow_consecutive_long_presses: false,
        }
    }

    /// The level that means "pressed".
    #[must_use]
    pub const fn active_level(&self) -> Level {
        self.passive_level.inverted()
    }
}

// ============================================================================
// Button Virtual Device
// ============================================================================

/// A device abstraction for a button with debouncing and long-press detection.
///
/// # Hardware Requirements
///
/// The button can be wired in two ways:
/// - [`PressedTo::Voltage`]: Button connects pin to voltage when pressed (uses pull-down)
/// - [`PressedTo::Ground`]: Button connects pin to GND when pressed (uses pull-up)
///
/// Any other combination of passive level and pull resistor can be set directly in
/// [`ButtonConfig`].
///
/// # Usage
///
/// Call [`process()`](Self::process) once per pass of the polling loop. Each call reports
/// at most one [`ButtonAction`]:
///
/// - `Press` when a debounced press settles,
/// - `LongPress` once the press has been held for the long-press window (once per hold,
///   or repeatedly with `allow_consecutive_long_presses`),
/// - `Release` when the button settles released, unless the hold already reported a long
///   press and `suppress_release_after_long_press` is set.
///
/// # Example
///
/// ```rust,ignore
/// use input_envoy::button::{Button, ButtonAction, ButtonConfig};
/// use input_envoy::debounce::DebounceChannelStatic;
/// use input_envoy::pin::PressedTo;
///
/// static BUTTON_STATIC: DebounceChannelStatic = DebounceChannelStatic::new(1 << 13);
///
/// // Edge interrupt handler:
/// //     BUTTON_STATIC.notify(now, changed);
///
/// let mut button = Button::new(&BUTTON_STATIC, pin, ticks, ButtonConfig::new(PressedTo::Ground))?;
/// button.begin()?;
/// button.set_on_long_press(Some(enter_setup_mode));
///
/// loop {
///     match button.process() {
///         Some(ButtonAction::Press) => {
///             // Handle press (fires on the down edge)
///         }
///         Some(ButtonAction::Release) => {
///             // Handle release after a short press
///         }
///         Some(ButtonAction::LongPress) | None => {}
///     }
///     if !button.pending_timeout() {
///         // Safe to pause the tick counter and sleep.
///     }
/// }
/// ```
pub struct Button<'a, P, T> {
    channel: DebounceChannel<'a, P, T>,
    config: ButtonConfig,
    last_press_ticks: u32,
    suppress_next_release: bool,
    long_press_lockout: bool,
    on_release: Option<Callback>,
    on_press: Option<Callback>,
    on_long_press: Option<Callback>,
}

impl<'a, P: EdgeInput, T: TickSource> Button<'a, P, T> {
    /// Creates a new `Button` on the line recorded in `button_static`.
    ///
    /// The button starts out released.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroLongPressWindow`] for a long-press window of zero ticks, and
    /// the errors of [`DebounceChannel::new`].
    pub fn new(
        button_static: &'a DebounceChannelStatic,
        pin: P,
        ticks: T,
        config: ButtonConfig,
    ) -> Result<Self> {
        if config.long_press_window == Some(0) {
            return Err(Error::ZeroLongPressWindow);
        }
        let channel = DebounceChannel::new(
            button_static,
            pin,
            ticks,
            DebounceConfig::new(config.debounce_window, config.passive_level, config.pull),
        )?;
        Ok(Self {
            channel,
            config,
            last_press_ticks: 0,
            suppress_next_release: false,
            long_press_lockout: false,
            on_release: None,
            on_press: None,
            on_long_press: None,
        })
    }

    /// Configures the pin and arms its edge interrupt. Run before enabling interrupts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PinSetup`] if the pin cannot be configured.
    pub fn begin(&mut self) -> Result<()> {
        self.channel.begin()
    }

    /// Forwards an edge notification from the interrupt handler.
    #[inline]
    pub fn notify(&self, now: u32, changed_mask: u32) {
        self.channel.notify(now, changed_mask);
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

    /// Returns whether the button's settled state is pressed.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.channel.stable_level() == self.config.active_level()
    }

    /// Advances the button's state machine and reports at most one action.
    ///
    /// Runs the matching callback, if one is registered.
    pub fn process(&mut self) -> Option<ButtonAction> {
        let action = match self.channel.resolve_quiet() {
            Some(edge) if edge.level() == self.config.active_level() => Some(self.pressed()),
            Some(_) => self.released(),
            None => self.held(),
        }?;
        debug!("Button: {}", action);

        let callback = match action {
            ButtonAction::Release => self.on_release,
            ButtonAction::Press => self.on_press,
            ButtonAction::LongPress => self.on_long_press,
        };
        if let Some(callback) = callback {
            callback();
        }
        Some(action)
    }

    /// Whether the tick counter must keep running for this button.
    ///
    /// `true` while an edge awaits its debounce decision and, when long presses are
    /// tracked, for as long as the button is held.
    #[must_use]
    pub fn pending_timeout(&self) -> bool {
        self.channel.pending_timeout()
            || (self.config.long_press_window.is_some() && self.is_pressed())
    }

    #[inline]
    fn pressed(&mut self) -> ButtonAction {
        self.long_press_lockout = false;
        self.suppress_next_release = false;
        self.last_press_ticks = self.channel.now_ticks();
        ButtonAction::Press
    }

    #[inline]
    fn released(&mut self) -> Option<ButtonAction> {
        self.long_press_lockout = false;
        let suppress = core::mem::take(&mut self.suppress_next_release);
        if suppress && self.config.suppress_release_after_long_press {
            trace!("Button: release after long press suppressed");
            return None;
        }
        Some(ButtonAction::Release)
    }

    /// No edge this poll: report a long press if the button has been held long enough.
    fn held(&mut self) -> Option<ButtonAction> {
        let long_press_window = self.config.long_press_window?;
        // An unresolved edge may be a release in progress.
        if self.channel.pending_timeout() || !self.is_pressed() {
            return None;
        }
        if self.channel.read_live_level()? != self.config.active_level() {
            return None;
        }
        let now = self.channel.now_ticks();
        if ticks_since(now, self.last_press_ticks) < long_press_window {
            return None;
        }
        if self.long_press_lockout && !self.config.allow_consecutive_long_presses {
            return None;
        }
        self.last_press_ticks = now;
        self.suppress_next_release = true;
        self.long_press_lockout = true;
        Some(ButtonAction::LongPress)
    }

    pub(crate) fn clear_callbacks(&mut self) {
        self.on_release = None;
        self.on_press = None;
        self.on_long_press = None;
    }
}
