//! RS232 Bridge Firmware Library
//!
//! This library provides the core of an STM32G474-based RS232 bridge. A
//! host exchanges bytes with a serial peer through chunked reads and writes,
//! with optional XON/XOFF or RTS/CTS flow control and autonomous
//! notifications for received data, frame thresholds and line errors.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Host Protocol  │  Rs232 Driver  │  Callback Dispatcher      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     STREAM LAYER                             │
//! │  Read/Write Chunker  │  Frame Readable  │  Flow Control      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   TRANSPORT LAYER                            │
//! │  RX/TX Event Handlers  │  Ring Buffers  │  Error Counters    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / SCHEDULER                            │
//! │  USART2  │  RTS/CTS GPIO  │  embassy-rs 1 ms tick            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Execution contexts
//!
//! - **Interrupt**: [`device::Rs232::handle_event`] moves bytes between
//!   the UART and the rings.
//! - **Tick**: [`device::Rs232::tick`] drains RX, runs flow control and
//!   dispatches notifications.
//! - **Request**: [`protocol::handle_request`] serves host messages.
//!
//! Everything below the HAL is hardware independent and tested on the host
//! with the `std` feature.

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_sync;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// STM32G474 USART and GPIO bindings.
#[cfg(feature = "embedded")]
pub mod hal;

/// System configuration and constants
pub mod config;

/// Shared types used across modules
pub mod types;

/// Ring buffers for the RX and TX paths
pub mod ring_buffer;

/// XON/XOFF and RTS/CTS state machines
pub mod flow_control;

/// Interrupt-side byte movement
pub mod uart;

/// Chunked read/write streaming
pub mod stream;

/// Buffered notification delivery
pub mod callback;

/// Top-level driver instance
pub mod device;

/// Host request handling
pub mod protocol;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::callback::{Notification, NotificationSink};
    pub use crate::config::*;
    pub use crate::device::Rs232;
    pub use crate::protocol::{handle_request, Outcome, Request, Response};
    pub use crate::types::*;
    pub use crate::uart::{UartEvent, UartHardware};

    // Embassy
    #[cfg(feature = "embedded")]
    pub use embassy_time::{Duration, Instant, Ticker, Timer};

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
