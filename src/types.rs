//! Shared types used across the RS232 firmware
//!
//! Line parameters, buffer geometry and counters. Each type that carries a
//! bounded value validates at construction so the rest of the firmware never
//! sees an out-of-range setting.

use core::fmt;

use crate::config::{
    BAUD_RATE_MAX, BAUD_RATE_MIN, BUFFER_SIZE, BUFFER_SIZE_MIN, DEFAULT_BAUD_RATE, OVERSAMPLING,
};

/// Baud rate in bits per second with validation
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BaudRate(u32);

impl BaudRate {
    /// Power-up baud rate
    pub const DEFAULT: Self = Self(DEFAULT_BAUD_RATE);

    /// Create a baud rate, returns None if out of range
    #[must_use]
    pub const fn from_bps(bps: u32) -> Option<Self> {
        if bps >= BAUD_RATE_MIN && bps <= BAUD_RATE_MAX {
            Some(Self(bps))
        } else {
            None
        }
    }

    /// Get the rate in bits per second
    #[must_use]
    pub const fn as_bps(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BaudRate({} bps)", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BaudRate {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} bps", self.0);
    }
}

/// Parity mode
///
/// The forced modes are accepted and reported back but the hardware
/// adapter programs them as no parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
    /// Parity bit always 1 (mark)
    Forced1,
    /// Parity bit always 0 (space)
    Forced0,
}

impl Parity {
    /// Decode the protocol value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Odd),
            2 => Some(Self::Even),
            3 => Some(Self::Forced1),
            4 => Some(Self::Forced0),
            _ => None,
        }
    }

    /// Encode as protocol value
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Odd => 1,
            Self::Even => 2,
            Self::Forced1 => 3,
            Self::Forced0 => 4,
        }
    }

    /// Whether the UART actually generates and checks a parity bit
    #[must_use]
    pub const fn is_checked(self) -> bool {
        matches!(self, Self::Odd | Self::Even)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Parity {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::None => defmt::write!(f, "N"),
            Self::Odd => defmt::write!(f, "O"),
            Self::Even => defmt::write!(f, "E"),
            Self::Forced1 => defmt::write!(f, "M"),
            Self::Forced0 => defmt::write!(f, "S"),
        }
    }
}

/// Number of stop bits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StopBits {
    /// One stop bit
    #[default]
    One,
    /// Two stop bits
    Two,
}

impl StopBits {
    /// Decode the protocol value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// Encode as protocol value
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Data bits per character
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WordLength {
    /// 5 data bits
    Five,
    /// 6 data bits
    Six,
    /// 7 data bits
    Seven,
    /// 8 data bits
    #[default]
    Eight,
}

impl WordLength {
    /// Decode the protocol value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            5 => Some(Self::Five),
            6 => Some(Self::Six),
            7 => Some(Self::Seven),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    /// Number of data bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

/// Flow control mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlowControlMode {
    /// No flow control
    #[default]
    Off,
    /// In-band XON/XOFF
    Software,
    /// RTS/CTS handshake lines
    Hardware,
}

impl FlowControlMode {
    /// Decode the protocol value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Software),
            2 => Some(Self::Hardware),
            _ => None,
        }
    }

    /// Encode as protocol value
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Software => 1,
            Self::Hardware => 2,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FlowControlMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "FC-OFF"),
            Self::Software => defmt::write!(f, "FC-XON/XOFF"),
            Self::Hardware => defmt::write!(f, "FC-RTS/CTS"),
        }
    }
}

/// Complete UART line configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineConfig {
    /// Baud rate
    pub baud_rate: BaudRate,
    /// Parity mode
    pub parity: Parity,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Data bits
    pub word_length: WordLength,
    /// Flow control mode
    pub flow_control: FlowControlMode,
    /// Oversampling factor
    pub oversampling: u8,
}

impl LineConfig {
    /// Validate raw protocol values
    ///
    /// Fields are checked in order (baud, parity, stop bits, word length,
    /// flow control) and the first violation is reported.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] for the first out-of-range field.
    pub const fn from_raw(
        baud_rate: u32,
        parity: u8,
        stop_bits: u8,
        word_length: u8,
        flow_control: u8,
    ) -> Result<Self, ConfigError> {
        let Some(baud_rate) = BaudRate::from_bps(baud_rate) else {
            return Err(ConfigError::BaudRate(baud_rate));
        };
        let Some(parity) = Parity::from_raw(parity) else {
            return Err(ConfigError::Parity(parity));
        };
        let Some(stop_bits) = StopBits::from_raw(stop_bits) else {
            return Err(ConfigError::StopBits(stop_bits));
        };
        let Some(word_length) = WordLength::from_raw(word_length) else {
            return Err(ConfigError::WordLength(word_length));
        };
        let Some(flow_control) = FlowControlMode::from_raw(flow_control) else {
            return Err(ConfigError::FlowControl(flow_control));
        };

        Ok(Self {
            baud_rate,
            parity,
            stop_bits,
            word_length,
            flow_control,
            oversampling: OVERSAMPLING,
        })
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        crate::config::default_line_config()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LineConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{} {}{}{} {}",
            self.baud_rate,
            self.word_length.bits(),
            self.parity,
            self.stop_bits.as_raw(),
            self.flow_control
        );
    }
}

/// Division of the shared buffer arena into RX and TX rings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSplit {
    rx_size: u16,
    tx_size: u16,
}

impl BufferSplit {
    /// Even split of the arena
    pub const EVEN: Self = Self {
        rx_size: (BUFFER_SIZE / 2) as u16,
        tx_size: (BUFFER_SIZE / 2) as u16,
    };

    /// Validate a split
    ///
    /// # Errors
    ///
    /// Either half below [`BUFFER_SIZE_MIN`] or a sum different from
    /// [`BUFFER_SIZE`] is rejected.
    pub const fn new(rx_size: u16, tx_size: u16) -> Result<Self, ConfigError> {
        if rx_size < BUFFER_SIZE_MIN || tx_size < BUFFER_SIZE_MIN {
            return Err(ConfigError::BufferTooSmall { rx_size, tx_size });
        }
        if rx_size as usize + tx_size as usize != BUFFER_SIZE {
            return Err(ConfigError::BufferSizeMismatch { rx_size, tx_size });
        }
        Ok(Self { rx_size, tx_size })
    }

    /// RX ring capacity in bytes
    #[must_use]
    pub const fn rx_size(self) -> u16 {
        self.rx_size
    }

    /// TX ring capacity in bytes
    #[must_use]
    pub const fn tx_size(self) -> u16 {
        self.tx_size
    }
}

impl Default for BufferSplit {
    fn default() -> Self {
        Self::EVEN
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BufferSplit {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "rx={} tx={}", self.rx_size, self.tx_size);
    }
}

/// Current ring buffer occupancy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BufferStatus {
    /// Bytes waiting in the RX ring
    pub rx_used: u16,
    /// Bytes waiting in the TX ring
    pub tx_used: u16,
}

/// Snapshot of the receive error counters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ErrorCount {
    /// Bytes discarded because the RX ring was full
    pub overrun: u32,
    /// Bytes received with a parity error
    pub parity: u32,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ErrorCount {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "overrun={} parity={}", self.overrun, self.parity);
    }
}

/// Rejected configuration parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Baud rate outside the supported range
    BaudRate(u32),
    /// Unknown parity value
    Parity(u8),
    /// Unsupported stop bit count
    StopBits(u8),
    /// Unsupported word length
    WordLength(u8),
    /// Unknown flow control value
    FlowControl(u8),
    /// A ring would be smaller than the minimum
    BufferTooSmall {
        /// Requested RX size
        rx_size: u16,
        /// Requested TX size
        tx_size: u16,
    },
    /// The two rings do not add up to the arena size
    BufferSizeMismatch {
        /// Requested RX size
        rx_size: u16,
        /// Requested TX size
        tx_size: u16,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaudRate(bps) => write!(
                f,
                "baud rate {bps} outside {BAUD_RATE_MIN}..={BAUD_RATE_MAX}"
            ),
            Self::Parity(raw) => write!(f, "invalid parity {raw}"),
            Self::StopBits(raw) => write!(f, "invalid stop bits {raw}"),
            Self::WordLength(raw) => write!(f, "invalid word length {raw}"),
            Self::FlowControl(raw) => write!(f, "invalid flow control {raw}"),
            Self::BufferTooSmall { rx_size, tx_size } => write!(
                f,
                "buffer split rx={rx_size} tx={tx_size} below minimum {BUFFER_SIZE_MIN}"
            ),
            Self::BufferSizeMismatch { rx_size, tx_size } => write!(
                f,
                "buffer split rx={rx_size} tx={tx_size} does not sum to {BUFFER_SIZE}"
            ),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::BaudRate(bps) => defmt::write!(f, "BaudRate({})", bps),
            Self::Parity(raw) => defmt::write!(f, "Parity({})", raw),
            Self::StopBits(raw) => defmt::write!(f, "StopBits({})", raw),
            Self::WordLength(raw) => defmt::write!(f, "WordLength({})", raw),
            Self::FlowControl(raw) => defmt::write!(f, "FlowControl({})", raw),
            Self::BufferTooSmall { rx_size, tx_size } => {
                defmt::write!(f, "BufferTooSmall({}, {})", rx_size, tx_size);
            }
            Self::BufferSizeMismatch { rx_size, tx_size } => {
                defmt::write!(f, "BufferSizeMismatch({}, {})", rx_size, tx_size);
            }
        }
    }
}
