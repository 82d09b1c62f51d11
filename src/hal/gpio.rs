//! GPIO Abstractions
//!
//! Type-safe GPIO pin wrappers for the RS232 bridge.
//! Provides semantic meaning to pins through the type system.
//!
//! The handshake lines sit behind an inverting RS232 transceiver, so the
//! logic level seen by the MCU is active low on both of them.

use embassy_stm32::gpio::{Input, Output};

/// Status LED state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LedState {
    /// LED is off
    #[default]
    Off,
    /// LED is on
    On,
}

impl LedState {
    /// Toggle the LED state
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

impl defmt::Format for LedState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::On => defmt::write!(f, "ON"),
        }
    }
}

/// Status LED driver
pub struct StatusLed<'d> {
    pin: Output<'d>,
    state: LedState,
}

impl<'d> StatusLed<'d> {
    /// Create a new status LED (initially off)
    #[must_use]
    pub fn new(mut pin: Output<'d>) -> Self {
        pin.set_low();
        Self {
            pin,
            state: LedState::Off,
        }
    }

    /// Drive the LED to a state
    pub fn set(&mut self, state: LedState) {
        match state {
            LedState::On => self.pin.set_high(),
            LedState::Off => self.pin.set_low(),
        }
        self.state = state;
    }

    /// Toggle LED state
    pub fn toggle(&mut self) {
        self.set(self.state.toggle());
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> LedState {
        self.state
    }
}

/// RTS output (request to send, driven by us)
pub struct RtsOutput<'d> {
    pin: Output<'d>,
}

impl<'d> RtsOutput<'d> {
    /// Wrap the pin and assert RTS
    #[must_use]
    pub fn new(pin: Output<'d>) -> Self {
        let mut rts = Self { pin };
        rts.set_ready(true);
        rts
    }

    /// Assert (ready to receive) or deassert RTS
    pub fn set_ready(&mut self, ready: bool) {
        if ready {
            self.pin.set_low();
        } else {
            self.pin.set_high();
        }
    }

    /// Check if RTS is asserted
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pin.is_set_low()
    }
}

/// CTS input (clear to send, driven by the peer)
pub struct CtsInput<'d> {
    pin: Input<'d>,
}

impl<'d> CtsInput<'d> {
    /// Wrap the pin
    #[must_use]
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }

    /// Check if the peer accepts data
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.pin.is_low()
    }
}
