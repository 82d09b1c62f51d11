//! Flow Control
//!
//! State machines for software (XON/XOFF) and hardware (RTS/CTS) flow
//! control. The logic here is pure: it decides, the transport applies the
//! decisions to the UART and pins.
//!
//! Interrupt side:
//! - [`FlowControl::filter_rx_byte`] consumes in-band control bytes.
//! - [`FlowControl::check_rx_headroom`] engages backpressure.
//! - [`FlowControl::tx_permitted`] gates the transmitter.
//!
//! Tick side:
//! - [`FlowControl::tick`] emits pending XOFF/XON, releases RTS and decides
//!   whether the transmitter should be re-armed.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::{FLOW_CONTROL_RX_LIMIT, XOFF, XON};
use crate::types::FlowControlMode;

/// Two-state machine used by both software directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlowState {
    /// Data may flow
    #[default]
    Ok,
    /// Data must pause
    Wait,
}

#[cfg(feature = "embedded")]
impl defmt::Format for FlowState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Ok => defmt::write!(f, "OK"),
            Self::Wait => defmt::write!(f, "WAIT"),
        }
    }
}

/// Backpressure action requested by the RX path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backpressure {
    /// Enough headroom, nothing to do
    None,
    /// XOFF must go out on the next tick
    XoffScheduled,
    /// RTS must be deasserted now
    DeassertRts,
}

/// Actions decided by the periodic tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TickActions {
    /// Control byte to send ahead of queued data
    pub control_byte: Option<u8>,
    /// New RTS level (true = ready to receive)
    pub rts_ready: Option<bool>,
    /// Re-arm the transmitter
    pub kick_tx: bool,
}

/// Flow control state for one UART
#[derive(Debug, Default)]
pub struct FlowControl {
    mode: FlowControlMode,
    rx: FlowState,
    tx: FlowState,
    xoff_pending: AtomicBool,
}

impl FlowControl {
    /// Create flow control for a mode, both directions open
    #[must_use]
    pub const fn new(mode: FlowControlMode) -> Self {
        Self {
            mode,
            rx: FlowState::Ok,
            tx: FlowState::Ok,
            xoff_pending: AtomicBool::new(false),
        }
    }

    /// Switch mode and reopen both directions
    pub fn reset(&mut self, mode: FlowControlMode) {
        self.mode = mode;
        self.rx = FlowState::Ok;
        self.tx = FlowState::Ok;
        self.xoff_pending.store(false, Ordering::Relaxed);
    }

    /// Active mode
    #[must_use]
    pub const fn mode(&self) -> FlowControlMode {
        self.mode
    }

    /// Software RX state (are we choking the peer)
    #[must_use]
    pub const fn rx_state(&self) -> FlowState {
        self.rx
    }

    /// Software TX state (is the peer choking us)
    #[must_use]
    pub const fn tx_state(&self) -> FlowState {
        self.tx
    }

    /// Whether an XOFF is waiting for the next tick
    #[must_use]
    pub fn xoff_pending(&self) -> bool {
        self.xoff_pending.load(Ordering::Relaxed)
    }

    /// Consume an in-band control byte
    ///
    /// Returns true when the byte was XON/XOFF under software flow control;
    /// such bytes are never stored as data.
    pub fn filter_rx_byte(&mut self, byte: u8) -> bool {
        if self.mode != FlowControlMode::Software {
            return false;
        }

        match byte {
            XON => {
                self.tx = FlowState::Ok;
                true
            }
            XOFF => {
                self.tx = FlowState::Wait;
                true
            }
            _ => false,
        }
    }

    /// Evaluate RX headroom before a byte is stored
    pub fn check_rx_headroom(&mut self, headroom: usize) -> Backpressure {
        if headroom > FLOW_CONTROL_RX_LIMIT {
            return Backpressure::None;
        }

        match self.mode {
            FlowControlMode::Off => Backpressure::None,
            FlowControlMode::Software => {
                if self.rx == FlowState::Ok {
                    self.rx = FlowState::Wait;
                    self.xoff_pending.store(true, Ordering::Relaxed);
                    Backpressure::XoffScheduled
                } else {
                    Backpressure::None
                }
            }
            FlowControlMode::Hardware => Backpressure::DeassertRts,
        }
    }

    /// Whether the transmitter may send a data byte
    #[must_use]
    pub fn tx_permitted(&self, cts_clear: bool) -> bool {
        match self.mode {
            FlowControlMode::Off => true,
            FlowControlMode::Software => self.tx == FlowState::Ok,
            FlowControlMode::Hardware => cts_clear,
        }
    }

    /// Periodic flow control work
    pub fn tick(&mut self, headroom: usize, cts_clear: bool) -> TickActions {
        let mut actions = TickActions::default();
        let recovered = headroom > FLOW_CONTROL_RX_LIMIT;

        match self.mode {
            FlowControlMode::Off => {}
            FlowControlMode::Software => {
                if self.xoff_pending.swap(false, Ordering::Relaxed) {
                    actions.control_byte = Some(XOFF);
                    actions.kick_tx = true;
                } else if self.rx == FlowState::Wait && recovered {
                    self.rx = FlowState::Ok;
                    actions.control_byte = Some(XON);
                    actions.kick_tx = true;
                }

                if self.tx == FlowState::Ok {
                    actions.kick_tx = true;
                }
            }
            FlowControlMode::Hardware => {
                if recovered {
                    actions.rts_ready = Some(true);
                }
                if cts_clear {
                    actions.kick_tx = true;
                }
            }
        }

        actions
    }
}
