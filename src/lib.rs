//! Interrupt-driven debouncing for buttons and rotary encoders.
//!
//! An edge interrupt records *when* a line first changed; the polling loop later decides
//! *what* changed, once the line has had a debounce window to settle. The devices built on
//! that handshake turn settled edges into application actions.
//!
//! # Glossary
//!
//! - **Debounce window:** Ticks that must pass after an edge before the line's level is trusted.
//! - **Passive/active level:** The idle level of a line versus the level meaning "engaged"
//!   (pressed, contact closed).
//! - **Interrupt context:** The platform's edge-interrupt handler. It only ever calls `notify`.
//! - **Polling context:** The main loop. It calls `process` (or `resolve`) and runs callbacks.
//!
//! # Devices
//!
//! - [`debounce::DebounceChannel`]: One debounced line, yields [`Edge`](debounce::Edge)s.
//! - [`button::Button`]: Press, release, and long press.
//! - [`rotary_encoder::RotaryEncoder`]: Clockwise and counter-clockwise detents.
//! - [`knob::Knob`]: A rotary encoder with a push button, including "rotate while held".
//!
//! # Wiring it up
//!
//! Each debounced line has a [`DebounceChannelStatic`](debounce::DebounceChannelStatic) that
//! lives in a `static`, so the interrupt handler can reach it. The device that owns the pin
//! borrows that static and lives in the polling loop.
//!
//! ```rust,ignore
//! use input_envoy::button::{Button, ButtonAction, ButtonConfig};
//! use input_envoy::debounce::DebounceChannelStatic;
//! use input_envoy::pin::PressedTo;
//!
//! // PB3 on the port whose change interrupt we handle.
//! static BUTTON_STATIC: DebounceChannelStatic = DebounceChannelStatic::new(1 << 3);
//!
//! fn on_port_change_interrupt(now: u32, changed: u32) {
//!     BUTTON_STATIC.notify(now, changed);
//! }
//!
//! fn main_loop(pin: impl EdgeInput, ticks: impl TickSource) -> input_envoy::Result<()> {
//!     let mut button = Button::new(&BUTTON_STATIC, pin, ticks, ButtonConfig::new(PressedTo::Ground))?;
//!     button.begin()?; // before enabling interrupts
//!     loop {
//!         match button.process() {
//!             Some(ButtonAction::Press) => { /* ... */ }
//!             Some(ButtonAction::LongPress) => { /* ... */ }
//!             Some(ButtonAction::Release) | None => {}
//!         }
//!     }
//! }
//! ```
//!
//! # Power down
//!
//! The tick counter must keep running while a decision is outstanding. Check
//! `pending_timeout()` on every device before pausing it.
#![cfg_attr(not(any(test, feature = "host")), no_std)]

#[macro_use]
mod fmt;

pub mod button;
pub mod debounce;
mod error;
pub mod knob;
pub mod pin;
pub mod rotary_encoder;
#[cfg(feature = "host")]
pub mod sim;
pub mod ticks;

/// A single-slot, zero-argument callback. Registering a new one replaces the old one.
pub type Callback = fn();

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
