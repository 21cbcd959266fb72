//! Pin levels, pull resistors, button wiring, and the GPIO collaborator trait.

use embedded_hal::digital::InputPin;

// ============================================================================
// Level
// ============================================================================

/// Electrical level of a digital line.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic low.
    Low,
    /// Logic high.
    High,
}

impl Level {
    /// Returns whether this is [`Level::High`].
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// The opposite level.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(is_high: bool) -> Self {
        if is_high { Self::High } else { Self::Low }
    }
}

// ============================================================================
// Pull
// ============================================================================

/// Internal pull resistor to enable on an input.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// No internal pull; the board provides one.
    None,
    /// Internal pull-up.
    Up,
    /// Internal pull-down.
    Down,
}

// ============================================================================
// PressedTo - How a contact is wired
// ============================================================================

/// Describes how a contact (button or encoder switch) is physically wired.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressedTo {
    /// Contact connects the pin to voltage when closed.
    /// Uses internal pull-down resistor. Pin idles LOW and reads HIGH when closed.
    Voltage,

    /// Contact connects the pin to ground (GND) when closed.
    /// Uses internal pull-up resistor. Pin idles HIGH and reads LOW when closed.
    Ground,
}

impl PressedTo {
    /// The level the pin reads while the contact is open.
    #[must_use]
    pub const fn passive_level(self) -> Level {
        match self {
            Self::Voltage => Level::Low,
            Self::Ground => Level::High,
        }
    }

    /// The pull resistor that holds the pin at its passive level.
    #[must_use]
    pub const fn pull(self) -> Pull {
        match self {
            Self::Voltage => Pull::Down,
            Self::Ground => Pull::Up,
        }
    }
}

// ============================================================================
// EdgeInput - GPIO collaborator
// ============================================================================

/// An input pin that can also be configured and armed for edge interrupts.
///
/// Level reads come from [`InputPin`]. The two setup methods are only called from a
/// device's `begin()`, before interrupts are enabled.
pub trait EdgeInput: InputPin {
    /// Configures the pin as an input with the given pull resistor.
    ///
    /// # Errors
    ///
    /// Returns the HAL's error if the pin cannot be configured.
    fn configure_input(&mut self, pull: Pull) -> Result<(), Self::Error>;

    /// Enables the pin's edge (pin-change) interrupt.
    ///
    /// # Errors
    ///
    /// Returns the HAL's error if the interrupt cannot be enabled.
    fn enable_edge_interrupt(&mut self) -> Result<(), Self::Error>;
}

/// Reads a pin as a [`Level`], logging and discarding read errors.
pub(crate) fn read_level<P: InputPin>(pin: &mut P) -> Option<Level> {
    pin.is_high().map_or_else(
        |_| {
            warn!("input-envoy: pin read failed");
            None
        },
        |is_high| Some(Level::from(is_high)),
    )
}
