//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the RS232 bridge.
//! Buffer geometry, flow-control thresholds, line parameter bounds and
//! pin mappings are centralized here.

use crate::types::{BaudRate, FlowControlMode, LineConfig, Parity, StopBits, WordLength};

/// System clock frequency (STM32G474 @ 170MHz)
pub const SYSTEM_CLOCK_HZ: u32 = 170_000_000;

/// Total bytes shared between the RX and TX ring buffers
pub const BUFFER_SIZE: usize = 10 * 1024;

/// Smallest allowed size of either ring buffer
pub const BUFFER_SIZE_MIN: u16 = 1024;

/// Maximum payload bytes carried by one read/write chunk
pub const CHUNK_SIZE: usize = 60;

/// Software flow control: resume transmission (DC1)
pub const XON: u8 = 17;

/// Software flow control: pause transmission (DC3)
pub const XOFF: u8 = 19;

/// RX headroom (free bytes) at or below which backpressure is engaged
pub const FLOW_CONTROL_RX_LIMIT: usize = 64;

/// Lowest accepted baud rate
pub const BAUD_RATE_MIN: u32 = 100;

/// Highest accepted baud rate
pub const BAUD_RATE_MAX: u32 = 2_000_000;

/// Default baud rate after power-up
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// UART oversampling factor
pub const OVERSAMPLING: u8 = 16;

/// Period of the cooperative tick in milliseconds
pub const TICK_PERIOD_MS: u64 = 1;

/// Interval at which the target binding polls UART events, in microseconds
pub const EVENT_POLL_PERIOD_US: u64 = 50;

/// Depth of the outbound notification channel
pub const NOTIFICATION_QUEUE_DEPTH: usize = 1;

/// Maximum payload length of one protocol message
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// Status LED (directly on MCU)
    pub const LED_STATUS: &str = "PA5";

    /// USART2 TX (RS232 transceiver DIN)
    pub const UART_TX: &str = "PA2";

    /// USART2 RX (RS232 transceiver ROUT)
    pub const UART_RX: &str = "PA3";

    /// RTS output, driven as plain GPIO
    pub const RTS: &str = "PA1";

    /// CTS input, sampled as plain GPIO
    pub const CTS: &str = "PA0";
}

/// Interrupt priorities
pub mod irq {
    //! NVIC priorities for the serial path (lower is more urgent)

    /// Receive and receive-error events
    pub const RX_PRIORITY: u8 = 0;

    /// Transmit-ready events
    pub const TX_PRIORITY: u8 = 1;
}

/// Build the power-up line configuration (115200 8N1, no flow control)
#[must_use]
pub const fn default_line_config() -> LineConfig {
    LineConfig {
        baud_rate: BaudRate::DEFAULT,
        parity: Parity::None,
        stop_bits: StopBits::One,
        word_length: WordLength::Eight,
        flow_control: FlowControlMode::Off,
        oversampling: OVERSAMPLING,
    }
}
