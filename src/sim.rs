//! Host-side stand-ins for the GPIO and tick-counter collaborators.
//!
//! Used by the integration tests to script line levels and time without hardware.
#![cfg(feature = "host")]

use core::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

use crate::pin::{EdgeInput, Level, Pull};
use crate::ticks::TickSource;

// ============================================================================
// SimTicks
// ============================================================================

/// A tick counter that only moves when told to.
#[derive(Debug, Default)]
pub struct SimTicks {
    now: Cell<u32>,
}

impl SimTicks {
    /// A counter starting at `now`.
    #[must_use]
    pub const fn new(now: u32) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Jumps to tick `now`.
    pub fn set(&self, now: u32) {
        self.now.set(now);
    }

    /// Moves forward by `ticks`, wrapping like a hardware counter.
    pub fn advance(&self, ticks: u32) {
        self.now.set(self.now.get().wrapping_add(ticks));
    }

    /// The current tick.
    #[must_use]
    pub fn get(&self) -> u32 {
        self.now.get()
    }
}

impl TickSource for SimTicks {
    fn now_ticks(&self) -> u32 {
        self.now.get()
    }
}

// ============================================================================
// SimPin
// ============================================================================

/// Error returned by a [`SimPin`] told to fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SimPinError;

impl embedded_hal::digital::Error for SimPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

type ReadHook = Box<dyn FnOnce()>;

struct SimLine {
    level: Cell<Level>,
    pull: Cell<Option<Pull>>,
    edge_interrupt: Cell<bool>,
    fail_reads: Cell<bool>,
    fail_setup: Cell<bool>,
    reads: Cell<u32>,
    on_next_read: RefCell<Option<ReadHook>>,
}

/// A simulated input line.
///
/// Clones share the same line: keep one clone in the test to drive the level and give
/// another to the device under test.
#[derive(Clone)]
pub struct SimPin {
    line: Rc<SimLine>,
}

impl SimPin {
    /// A line currently at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self {
            line: Rc::new(SimLine {
                level: Cell::new(level),
                pull: Cell::new(None),
                edge_interrupt: Cell::new(false),
                fail_reads: Cell::new(false),
                fail_setup: Cell::new(false),
                reads: Cell::new(0),
                on_next_read: RefCell::new(None),
            }),
        }
    }

    /// Drives the line to `level`.
    pub fn set_level(&self, level: Level) {
        self.line.level.set(level);
    }

    /// The level the line is at.
    #[must_use]
    pub fn level(&self) -> Level {
        self.line.level.get()
    }

    /// The pull configured by `begin()`, if it ran.
    #[must_use]
    pub fn pull(&self) -> Option<Pull> {
        self.line.pull.get()
    }

    /// Whether `begin()` armed the edge interrupt.
    #[must_use]
    pub fn edge_interrupt_enabled(&self) -> bool {
        self.line.edge_interrupt.get()
    }

    /// Makes level reads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.line.fail_reads.set(fail);
    }

    /// Makes pin setup fail (or succeed again).
    pub fn set_fail_setup(&self, fail: bool) {
        self.line.fail_setup.set(fail);
    }

    /// How many times the level has been read.
    #[must_use]
    pub fn reads(&self) -> u32 {
        self.line.reads.get()
    }

    /// Runs `hook` at the start of the next level read, as if an interrupt fired just
    /// before the pin was sampled. The hook may change the level.
    pub fn on_next_read(&self, hook: impl FnOnce() + 'static) {
        *self.line.on_next_read.borrow_mut() = Some(Box::new(hook));
    }
}

impl ErrorType for SimPin {
    type Error = SimPinError;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let hook = self.line.on_next_read.borrow_mut().take();
        if let Some(hook) = hook {
            hook();
        }
        self.line.reads.set(self.line.reads.get().wrapping_add(1));
        if self.line.fail_reads.get() {
            return Err(SimPinError);
        }
        Ok(self.line.level.get().is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|is_high| !is_high)
    }
}

impl EdgeInput for SimPin {
    fn configure_input(&mut self, pull: Pull) -> Result<(), Self::Error> {
        if self.line.fail_setup.get() {
            return Err(SimPinError);
        }
        self.line.pull.set(Some(pull));
        Ok(())
    }

    fn enable_edge_interrupt(&mut self) -> Result<(), Self::Error> {
        if self.line.fail_setup.get() {
            return Err(SimPinError);
        }
        self.line.edge_interrupt.set(true);
        Ok(())
    }
}
