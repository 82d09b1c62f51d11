//! UART Transport
//!
//! Event handlers that move bytes between the UART FIFOs and the ring
//! buffers, plus the stop-the-world configuration reset.
//!
//! Hardware vectors are modelled as [`UartEvent`]s delivered to
//! [`Transport::handle_event`]. Register access sits behind the
//! [`UartHardware`] trait so the handlers can run against a simulated UART.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::flow_control::{Backpressure, FlowControl};
use crate::ring_buffer::SerialBuffers;
use crate::types::{BufferSplit, ErrorCount, LineConfig};

/// Hardware event delivered to the transport
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UartEvent {
    /// Bytes are waiting in the receive FIFO
    RxReady,
    /// A byte arrived with a parity or framing error
    RxError,
    /// The transmit FIFO has room
    TxReady,
}

#[cfg(feature = "embedded")]
impl defmt::Format for UartEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::RxReady => defmt::write!(f, "RX"),
            Self::RxError => defmt::write!(f, "RXE"),
            Self::TxReady => defmt::write!(f, "TX"),
        }
    }
}

/// Register-level UART and handshake pin access
pub trait UartHardware {
    /// Take the next byte from the receive FIFO
    fn read_rx(&mut self) -> Option<u8>;

    /// Whether the transmit FIFO can take another byte
    fn tx_has_room(&self) -> bool;

    /// Put a byte into the transmit FIFO
    fn write_tx(&mut self, byte: u8);

    /// Enable or disable the transmit-ready event source
    fn set_tx_event(&mut self, enabled: bool);

    /// Enable or disable the receive and receive-error event sources
    fn set_rx_events(&mut self, enabled: bool);

    /// Drive RTS (true = ready to receive)
    fn set_rts(&mut self, ready: bool);

    /// Sample CTS (true = peer ready to receive)
    fn cts_clear(&self) -> bool;

    /// Hold the TX line in break (spacing) state
    fn set_break(&mut self, active: bool);

    /// Stop, reprogram and restart the UART with new line parameters
    fn configure(&mut self, config: &LineConfig);
}

/// Receive error counters
///
/// Written only from the RX event path with single atomic increments.
#[derive(Debug, Default)]
pub struct ErrorCounters {
    overrun: AtomicU32,
    parity: AtomicU32,
}

impl ErrorCounters {
    /// Create zeroed counters
    #[must_use]
    pub const fn new() -> Self {
        Self {
            overrun: AtomicU32::new(0),
            parity: AtomicU32::new(0),
        }
    }

    /// Count a byte dropped on a full RX ring
    pub fn record_overrun(&self) {
        self.overrun.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a byte received with a parity error
    pub fn record_parity(&self) {
        self.parity.fetch_add(1, Ordering::Relaxed);
    }

    /// Read both counters
    #[must_use]
    pub fn snapshot(&self) -> ErrorCount {
        ErrorCount {
            overrun: self.overrun.load(Ordering::Relaxed),
            parity: self.parity.load(Ordering::Relaxed),
        }
    }
}

/// Interrupt-driven byte mover between UART and ring buffers
pub struct Transport<H: UartHardware> {
    hw: H,
    buffers: SerialBuffers,
    flow: FlowControl,
    errors: ErrorCounters,
    control_byte: Option<u8>,
    break_remaining_ms: u16,
}

impl<H: UartHardware> Transport<H> {
    /// Create a transport and bring the UART up
    pub fn new(hw: H, config: &LineConfig, split: BufferSplit) -> Self {
        let mut transport = Self {
            hw,
            buffers: SerialBuffers::new(split),
            flow: FlowControl::new(config.flow_control),
            errors: ErrorCounters::new(),
            control_byte: None,
            break_remaining_ms: 0,
        };
        transport.apply_configuration(config, split);
        transport
    }

    /// Dispatch a hardware event to its handler
    pub fn handle_event(&mut self, event: UartEvent) {
        match event {
            UartEvent::RxReady => self.on_rx(),
            UartEvent::RxError => {
                // The byte is delivered like any other, the error is only counted.
                self.on_rx();
                self.errors.record_parity();
            }
            UartEvent::TxReady => self.on_tx(),
        }
    }

    /// Drain the receive FIFO into the RX ring
    pub fn on_rx(&mut self) {
        self.hw.set_rx_events(false);

        while let Some(byte) = self.hw.read_rx() {
            if self.flow.filter_rx_byte(byte) {
                continue;
            }

            if self.flow.check_rx_headroom(self.buffers.rx_headroom())
                == Backpressure::DeassertRts
            {
                self.hw.set_rts(false);
            }

            if !self.buffers.rx().push(byte) {
                self.errors.record_overrun();
            }
        }

        self.hw.set_rx_events(true);
    }

    /// Fill the transmit FIFO from the TX ring
    pub fn on_tx(&mut self) {
        while self.hw.tx_has_room() {
            if let Some(byte) = self.control_byte.take() {
                self.hw.write_tx(byte);
                continue;
            }

            if self.break_remaining_ms > 0 || !self.flow.tx_permitted(self.hw.cts_clear()) {
                self.hw.set_tx_event(false);
                return;
            }

            let Some(byte) = self.buffers.tx().pop() else {
                self.hw.set_tx_event(false);
                return;
            };
            self.hw.write_tx(byte);
        }
    }

    /// Enable the transmit event and service it right away
    pub fn kick_tx(&mut self) {
        self.hw.set_tx_event(true);
        self.on_tx();
    }

    /// Periodic work: RX drain, flow control and break timing
    pub fn tick(&mut self) {
        // Bytes below the FIFO trigger level never raise an RX event.
        self.on_rx();

        let actions = self
            .flow
            .tick(self.buffers.rx_headroom(), self.hw.cts_clear());
        if let Some(byte) = actions.control_byte {
            debug!("flow control: queue control byte {=u8}", byte);
            self.control_byte = Some(byte);
        }
        if let Some(ready) = actions.rts_ready {
            self.hw.set_rts(ready);
        }

        if self.break_remaining_ms > 0 {
            self.break_remaining_ms -= 1;
            if self.break_remaining_ms == 0 {
                debug!("break condition released");
                self.hw.set_break(false);
                self.kick_tx();
            }
        }

        if actions.kick_tx {
            self.kick_tx();
        }
    }

    /// Hold the line in break for a number of ticks
    ///
    /// Zero releases an active break immediately.
    pub fn start_break(&mut self, duration_ms: u16) {
        debug!("break condition for {=u16} ms", duration_ms);
        self.break_remaining_ms = duration_ms;
        self.hw.set_break(duration_ms > 0);
        if duration_ms == 0 {
            self.kick_tx();
        }
    }

    /// Stop-the-world reset of buffers, flow control and hardware
    ///
    /// Everything buffered before the call is discarded.
    pub fn apply_configuration(&mut self, config: &LineConfig, split: BufferSplit) {
        self.hw.set_rx_events(false);
        self.hw.set_tx_event(false);

        self.buffers.reinit(split);
        self.flow.reset(config.flow_control);
        self.control_byte = None;
        self.break_remaining_ms = 0;

        self.hw.set_break(false);
        self.hw.configure(config);
        self.hw.set_rts(true);

        self.hw.set_rx_events(true);
    }

    /// Buffer arena
    #[must_use]
    pub const fn buffers(&self) -> &SerialBuffers {
        &self.buffers
    }

    /// Mutable buffer arena
    pub fn buffers_mut(&mut self) -> &mut SerialBuffers {
        &mut self.buffers
    }

    /// Flow control state
    #[must_use]
    pub const fn flow(&self) -> &FlowControl {
        &self.flow
    }

    /// Live error counters
    #[must_use]
    pub fn error_count(&self) -> ErrorCount {
        self.errors.snapshot()
    }

    /// Whether a break condition is active
    #[must_use]
    pub const fn break_active(&self) -> bool {
        self.break_remaining_ms > 0
    }

    /// Underlying hardware
    #[must_use]
    pub const fn hardware(&self) -> &H {
        &self.hw
    }

    /// Mutable underlying hardware
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }
}
