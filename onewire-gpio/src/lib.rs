#![no_std]
#![deny(missing_docs)]

//! # onewire-gpio
//!
//! A 1-Wire master implemented entirely in software: every reset pulse and time slot is
//! produced by toggling one open-drain GPIO line against a blocking (or async) delay.
//!
//! The pin must be configured open-drain with an external pull-up (4.7 kΩ typical).
//! [`set_low`](embedded_hal::digital::OutputPin::set_low) drives the line low,
//! [`set_high`](embedded_hal::digital::OutputPin::set_high) releases it, and
//! [`is_high`](embedded_hal::digital::InputPin::is_high) samples it.
//!
//! Timing is only as good as the delay provider. Interrupts that fire inside a slot stretch it;
//! mask them around transactions if the platform allows it.

pub use embedded_onewire::{OneWire, OneWireAsync, OneWireError, OneWireResult};
mod onewire;
mod onewire_async;
mod status;
mod timing;

pub use status::BusStatus;
pub use timing::{OneWireTiming, OneWireTimingBuilder};

/// A bit-banged 1-Wire master.
///
/// Takes ownership of a pin implementing both [`InputPin`](embedded_hal::digital::InputPin) and
/// [`OutputPin`](embedded_hal::digital::OutputPin), and a delay provider implementing
/// [`DelayNs`](embedded_hal::delay::DelayNs) (for [`OneWire`]) or
/// [`DelayNs`](embedded_hal_async::delay::DelayNs) (for [`OneWireAsync`]).
///
/// Not reentrant: one transaction at a time, driven by the owner.
pub struct OneWireGpio<P, D> {
    pub(crate) pin: P,
    pub(crate) delay: D,
    pub(crate) timing: OneWireTiming,
}

impl<P, D> OneWireGpio<P, D> {
    /// Creates a new master on `pin` with standard-speed timing.
    pub fn new(pin: P, delay: D) -> Self {
        OneWireGpio {
            pin,
            delay,
            timing: OneWireTiming::default(),
        }
    }

    /// Replace the slot timing.
    pub fn with_timing(mut self, timing: OneWireTiming) -> Self {
        self.timing = timing;
        self
    }

    /// The slot timing in use.
    pub fn timing(&self) -> &OneWireTiming {
        &self.timing
    }

    /// Gives back the pin and the delay provider.
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}
