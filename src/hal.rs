//! Hardware Abstraction Layer
//!
//! Provides safe abstractions over STM32G474 peripherals.
//! This module isolates hardware-specific code behind the
//! [`UartHardware`](crate::uart::UartHardware) seam.

pub mod gpio;
pub mod uart;
