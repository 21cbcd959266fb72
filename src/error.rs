/// Errors from constructing or setting up an input device.
///
/// Polling never fails: `process()` and `resolve()` are total, and a pin that cannot be
/// read simply produces no action on that poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The channel's pin mask has no bits set, so no notification could ever reach it.
    #[display("pin mask is empty")]
    EmptyPinMask,
    /// The channel static already backs another device.
    #[display("debounce channel is already claimed by another device")]
    ChannelInUse,
    /// A long-press window of zero ticks would fire on every poll.
    #[display("long-press window must be at least one tick")]
    ZeroLongPressWindow,
    /// The GPIO collaborator failed to configure a pin.
    #[display("pin setup failed")]
    PinSetup,
}

/// Result type for this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
