//! USART Binding
//!
//! [`UartHardware`] implementation for USART2 on the STM32G474 with RTS/CTS
//! on plain GPIO.
//!
//! The driver runs the UART in blocking mode and synthesizes events by
//! polling: [`Stm32Uart::poll_event`] reports what the interrupt vectors
//! would have raised, subject to the same enable masks.

use embassy_stm32::mode::Blocking;
use embassy_stm32::pac;
use embassy_stm32::usart::{self, DataBits, Uart};

use crate::hal::gpio::{CtsInput, RtsOutput};
use crate::types::{LineConfig, Parity, StopBits};
use crate::uart::{UartEvent, UartHardware};

/// USART2 with handshake lines
pub struct Stm32Uart<'d> {
    uart: Uart<'d, Blocking>,
    rts: RtsOutput<'d>,
    cts: CtsInput<'d>,
    rx_events: bool,
    tx_event: bool,
    /// Byte pulled from the data register by [`Self::poll_event`]
    pending: Option<u8>,
    /// A parity or framing error was flagged while draining
    line_error: bool,
}

impl<'d> Stm32Uart<'d> {
    /// Wrap an initialized UART and its handshake pins
    #[must_use]
    pub fn new(uart: Uart<'d, Blocking>, rts: RtsOutput<'d>, cts: CtsInput<'d>) -> Self {
        Self {
            uart,
            rts,
            cts,
            rx_events: false,
            tx_event: false,
            pending: None,
            line_error: false,
        }
    }

    /// Next event an enabled interrupt source would raise
    pub fn poll_event(&mut self) -> Option<UartEvent> {
        if self.rx_events {
            if self.line_error {
                self.line_error = false;
                return Some(UartEvent::RxError);
            }
            if self.pending.is_some() {
                return Some(UartEvent::RxReady);
            }
            match self.uart.nb_read() {
                Ok(byte) => {
                    self.pending = Some(byte);
                    return Some(UartEvent::RxReady);
                }
                Err(nb::Error::Other(usart::Error::Parity | usart::Error::Framing)) => {
                    return Some(UartEvent::RxError);
                }
                Err(nb::Error::Other(err)) => {
                    warn!("usart: rx error {}", err);
                }
                Err(nb::Error::WouldBlock) => {}
            }
        }

        if self.tx_event && self.tx_has_room() {
            return Some(UartEvent::TxReady);
        }

        None
    }
}

impl UartHardware for Stm32Uart<'_> {
    fn read_rx(&mut self) -> Option<u8> {
        if let Some(byte) = self.pending.take() {
            return Some(byte);
        }
        match self.uart.nb_read() {
            Ok(byte) => Some(byte),
            Err(nb::Error::Other(usart::Error::Parity | usart::Error::Framing)) => {
                // The flag is cleared by the read; surface it as its own event.
                self.line_error = true;
                None
            }
            Err(nb::Error::Other(err)) => {
                warn!("usart: rx error {}", err);
                None
            }
            Err(nb::Error::WouldBlock) => None,
        }
    }

    fn tx_has_room(&self) -> bool {
        pac::USART2.isr().read().txe()
    }

    fn write_tx(&mut self, byte: u8) {
        if let Err(err) = self.uart.blocking_write(&[byte]) {
            warn!("usart: tx failed: {}", err);
        }
    }

    fn set_tx_event(&mut self, enabled: bool) {
        self.tx_event = enabled;
    }

    fn set_rx_events(&mut self, enabled: bool) {
        self.rx_events = enabled;
    }

    fn set_rts(&mut self, ready: bool) {
        self.rts.set_ready(ready);
    }

    fn cts_clear(&self) -> bool {
        self.cts.is_clear()
    }

    fn set_break(&mut self, active: bool) {
        // The peripheral can only emit a single break frame.
        if active {
            self.uart.send_break();
        }
    }

    fn configure(&mut self, config: &LineConfig) {
        let usart_config = usart_config(config);
        if let Err(err) = self.uart.set_config(&usart_config) {
            warn!("usart: reconfiguration rejected: {}", err);
        }
        self.pending = None;
        self.line_error = false;
    }
}

/// Map line parameters onto the peripheral configuration
///
/// The data-bit count of the peripheral includes the parity bit. Forced
/// parity has no hardware mode and is programmed as no parity.
fn usart_config(config: &LineConfig) -> usart::Config {
    let mut out = usart::Config::default();
    out.baudrate = config.baud_rate.as_bps();

    out.parity = match config.parity {
        Parity::Odd => usart::Parity::ParityOdd,
        Parity::Even => usart::Parity::ParityEven,
        Parity::None | Parity::Forced1 | Parity::Forced0 => usart::Parity::ParityNone,
    };

    out.stop_bits = match config.stop_bits {
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };

    let frame_bits = config.word_length.bits() + u8::from(config.parity.is_checked());
    out.data_bits = match frame_bits {
        9 => DataBits::DataBits9,
        8 => DataBits::DataBits8,
        7 => DataBits::DataBits7,
        _ => {
            warn!("usart: {=u8}-bit frames unsupported, using 7", frame_bits);
            DataBits::DataBits7
        }
    };

    out
}
