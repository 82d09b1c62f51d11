//! Shared test doubles
//!
//! A scripted UART and a notification sink that can be told to refuse.

#![allow(dead_code)]

use std::collections::VecDeque;

use rs232_firmware::callback::{Notification, NotificationSink};
use rs232_firmware::device::Rs232;
use rs232_firmware::types::LineConfig;
use rs232_firmware::uart::UartHardware;

/// Simulated UART with an unbounded RX FIFO and a TX FIFO of scripted room
#[derive(Debug)]
pub struct MockUart {
    /// Bytes waiting to be read by the RX handler
    pub rx_fifo: VecDeque<u8>,
    /// Bytes the TX handler put on the wire
    pub wire: Vec<u8>,
    /// Remaining TX FIFO slots
    pub tx_room: usize,
    pub tx_event: bool,
    pub rx_events: bool,
    pub rts_ready: bool,
    pub cts_clear: bool,
    pub break_active: bool,
    /// Every configuration the transport programmed
    pub configured: Vec<LineConfig>,
}

impl MockUart {
    /// UART whose TX FIFO never fills
    pub fn new() -> Self {
        Self {
            rx_fifo: VecDeque::new(),
            wire: Vec::new(),
            tx_room: usize::MAX,
            tx_event: false,
            rx_events: false,
            rts_ready: false,
            cts_clear: true,
            break_active: false,
            configured: Vec::new(),
        }
    }

    /// UART whose TX FIFO is full
    pub fn stalled() -> Self {
        Self {
            tx_room: 0,
            ..Self::new()
        }
    }

    /// Queue bytes as if they arrived on the line
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx_fifo.extend(bytes.iter().copied());
    }
}

impl UartHardware for MockUart {
    fn read_rx(&mut self) -> Option<u8> {
        self.rx_fifo.pop_front()
    }

    fn tx_has_room(&self) -> bool {
        self.tx_room > 0
    }

    fn write_tx(&mut self, byte: u8) {
        assert!(self.tx_room > 0, "write into a full TX FIFO");
        if self.tx_room != usize::MAX {
            self.tx_room -= 1;
        }
        self.wire.push(byte);
    }

    fn set_tx_event(&mut self, enabled: bool) {
        self.tx_event = enabled;
    }

    fn set_rx_events(&mut self, enabled: bool) {
        self.rx_events = enabled;
    }

    fn set_rts(&mut self, ready: bool) {
        self.rts_ready = ready;
    }

    fn cts_clear(&self) -> bool {
        self.cts_clear
    }

    fn set_break(&mut self, active: bool) {
        self.break_active = active;
    }

    fn configure(&mut self, config: &LineConfig) {
        self.configured.push(*config);
    }
}

/// Sink that records what it accepts
#[derive(Debug)]
pub struct MockSink {
    pub accepting: bool,
    pub sent: Vec<Notification>,
    /// Number of refused offers
    pub refused: usize,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            accepting: true,
            sent: Vec::new(),
            refused: 0,
        }
    }

    pub fn busy() -> Self {
        Self {
            accepting: false,
            ..Self::new()
        }
    }
}

impl NotificationSink for MockSink {
    fn try_send(&mut self, notification: Notification) -> Result<(), Notification> {
        if self.accepting {
            self.sent.push(notification);
            Ok(())
        } else {
            self.refused += 1;
            Err(notification)
        }
    }
}

/// Device in power-up configuration over a free-running mock UART
pub fn device() -> Rs232<MockUart> {
    Rs232::new(MockUart::new())
}

/// Mock hardware of a device
pub fn hw(device: &mut Rs232<MockUart>) -> &mut MockUart {
    device.transport_mut().hardware_mut()
}

/// Deterministic test pattern
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
