//! Host Protocol
//!
//! Typed boundary between host messages and the [`Rs232`] driver.
//!
//! Requests are identified by a function ID and carry a packed
//! little-endian payload. [`Request::decode`] turns the raw payload into a
//! typed request, [`handle_request`] runs it against the driver and
//! [`Response::encode`] / [`Notification::encode`] produce the reply bytes.
//! Message headers and packet routing live outside this crate.

use core::fmt;

use heapless::Vec;

use crate::callback::Notification;
use crate::config::{CHUNK_SIZE, MAX_PAYLOAD_LEN};
use crate::device::Rs232;
use crate::stream::ReadChunk;
use crate::types::{BufferSplit, BufferStatus, ConfigError, ErrorCount, LineConfig};
use crate::uart::UartHardware;

/// Function IDs of requests and notifications
pub mod function_id {
    //! Numeric message identifiers shared with the host bindings

    /// Write one chunk of a message
    pub const WRITE_LOW_LEVEL: u8 = 1;
    /// Read one chunk of received data
    pub const READ_LOW_LEVEL: u8 = 2;
    /// Push received data autonomously
    pub const ENABLE_READ_CALLBACK: u8 = 3;
    /// Stop pushing received data
    pub const DISABLE_READ_CALLBACK: u8 = 4;
    /// Query the read notification
    pub const IS_READ_CALLBACK_ENABLED: u8 = 5;
    /// Set line parameters
    pub const SET_CONFIGURATION: u8 = 6;
    /// Get line parameters
    pub const GET_CONFIGURATION: u8 = 7;
    /// Hold the line in break
    pub const SET_BREAK_CONDITION: u8 = 8;
    /// Set the RX/TX buffer split
    pub const SET_BUFFER_CONFIG: u8 = 9;
    /// Get the RX/TX buffer split
    pub const GET_BUFFER_CONFIG: u8 = 10;
    /// Get buffer occupancy
    pub const GET_BUFFER_STATUS: u8 = 11;
    /// Get receive error counters
    pub const GET_ERROR_COUNT: u8 = 12;
    /// Set the frame-readable threshold
    pub const SET_FRAME_READABLE_CALLBACK_CONFIGURATION: u8 = 13;
    /// Get the frame-readable threshold
    pub const GET_FRAME_READABLE_CALLBACK_CONFIGURATION: u8 = 14;
    /// Notification: received data chunk
    pub const CALLBACK_READ_LOW_LEVEL: u8 = 15;
    /// Notification: error counters changed
    pub const CALLBACK_ERROR_COUNT: u8 = 16;
    /// Notification: frames readable
    pub const CALLBACK_FRAME_READABLE: u8 = 17;
}

/// Encoded payload of a reply or notification
pub type Payload = Vec<u8, MAX_PAYLOAD_LEN>;

/// Malformed request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// No request has this function ID
    UnknownFunction(u8),
    /// The payload is shorter than the request layout
    Truncated {
        /// Bytes the layout needs
        expected: usize,
        /// Bytes received
        actual: usize,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFunction(id) => write!(f, "unknown function id {id}"),
            Self::Truncated { expected, actual } => {
                write!(f, "payload truncated: expected {expected} bytes, got {actual}")
            }
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ProtocolError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::UnknownFunction(id) => defmt::write!(f, "UnknownFunction({})", id),
            Self::Truncated { expected, actual } => {
                defmt::write!(f, "Truncated({}/{})", actual, expected);
            }
        }
    }
}

/// Decoded host request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Write one chunk of a message
    WriteLowLevel {
        /// Length of the whole message
        message_length: u16,
        /// Offset of this chunk
        chunk_offset: u16,
        /// Chunk bytes, zero padded
        data: [u8; CHUNK_SIZE],
    },
    /// Read up to `length` bytes as one logical message
    ReadLowLevel {
        /// Requested message length
        length: u16,
    },
    /// Enable the read notification
    EnableReadCallback,
    /// Disable the read notification
    DisableReadCallback,
    /// Query the read notification
    IsReadCallbackEnabled,
    /// Set line parameters, raw protocol values
    SetConfiguration {
        /// Bits per second
        baud_rate: u32,
        /// Parity value
        parity: u8,
        /// Stop bits value
        stop_bits: u8,
        /// Word length value
        word_length: u8,
        /// Flow control value
        flow_control: u8,
    },
    /// Get line parameters
    GetConfiguration,
    /// Hold the line in break
    SetBreakCondition {
        /// Break duration in milliseconds
        break_time_ms: u16,
    },
    /// Set the buffer split
    SetBufferConfig {
        /// TX ring size
        send_buffer_size: u16,
        /// RX ring size
        receive_buffer_size: u16,
    },
    /// Get the buffer split
    GetBufferConfig,
    /// Get buffer occupancy
    GetBufferStatus,
    /// Get receive error counters
    GetErrorCount,
    /// Set the frame-readable threshold
    SetFrameReadableConfig {
        /// Frame size in bytes, 0 disables
        frame_size: u16,
    },
    /// Get the frame-readable threshold
    GetFrameReadableConfig,
}

impl Request {
    /// Decode a request payload
    ///
    /// Trailing bytes beyond the layout are ignored.
    ///
    /// # Errors
    ///
    /// Unknown function IDs and short payloads are rejected.
    pub fn decode(function_id: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        use self::function_id as id;

        let mut r = PayloadReader::new(payload);
        let request = match function_id {
            id::WRITE_LOW_LEVEL => {
                r.require(4 + CHUNK_SIZE)?;
                Self::WriteLowLevel {
                    message_length: r.u16()?,
                    chunk_offset: r.u16()?,
                    data: r.array()?,
                }
            }
            id::READ_LOW_LEVEL => Self::ReadLowLevel { length: r.u16()? },
            id::ENABLE_READ_CALLBACK => Self::EnableReadCallback,
            id::DISABLE_READ_CALLBACK => Self::DisableReadCallback,
            id::IS_READ_CALLBACK_ENABLED => Self::IsReadCallbackEnabled,
            id::SET_CONFIGURATION => {
                r.require(8)?;
                Self::SetConfiguration {
                    baud_rate: r.u32()?,
                    parity: r.u8()?,
                    stop_bits: r.u8()?,
                    word_length: r.u8()?,
                    flow_control: r.u8()?,
                }
            }
            id::GET_CONFIGURATION => Self::GetConfiguration,
            id::SET_BREAK_CONDITION => Self::SetBreakCondition {
                break_time_ms: r.u16()?,
            },
            id::SET_BUFFER_CONFIG => {
                r.require(4)?;
                Self::SetBufferConfig {
                    send_buffer_size: r.u16()?,
                    receive_buffer_size: r.u16()?,
                }
            }
            id::GET_BUFFER_CONFIG => Self::GetBufferConfig,
            id::GET_BUFFER_STATUS => Self::GetBufferStatus,
            id::GET_ERROR_COUNT => Self::GetErrorCount,
            id::SET_FRAME_READABLE_CALLBACK_CONFIGURATION => Self::SetFrameReadableConfig {
                frame_size: r.u16()?,
            },
            id::GET_FRAME_READABLE_CALLBACK_CONFIGURATION => Self::GetFrameReadableConfig,
            other => return Err(ProtocolError::UnknownFunction(other)),
        };
        Ok(request)
    }

    /// Function ID this request was decoded from
    #[must_use]
    pub const fn function_id(&self) -> u8 {
        use self::function_id as id;

        match self {
            Self::WriteLowLevel { .. } => id::WRITE_LOW_LEVEL,
            Self::ReadLowLevel { .. } => id::READ_LOW_LEVEL,
            Self::EnableReadCallback => id::ENABLE_READ_CALLBACK,
            Self::DisableReadCallback => id::DISABLE_READ_CALLBACK,
            Self::IsReadCallbackEnabled => id::IS_READ_CALLBACK_ENABLED,
            Self::SetConfiguration { .. } => id::SET_CONFIGURATION,
            Self::GetConfiguration => id::GET_CONFIGURATION,
            Self::SetBreakCondition { .. } => id::SET_BREAK_CONDITION,
            Self::SetBufferConfig { .. } => id::SET_BUFFER_CONFIG,
            Self::GetBufferConfig => id::GET_BUFFER_CONFIG,
            Self::GetBufferStatus => id::GET_BUFFER_STATUS,
            Self::GetErrorCount => id::GET_ERROR_COUNT,
            Self::SetFrameReadableConfig { .. } => id::SET_FRAME_READABLE_CALLBACK_CONFIGURATION,
            Self::GetFrameReadableConfig => id::GET_FRAME_READABLE_CALLBACK_CONFIGURATION,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Request {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Request(fid={})", self.function_id());
    }
}

/// Reply payload of a getter-style request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Bytes accepted from a write chunk
    WriteLowLevel {
        /// Accepted byte count
        written: u8,
    },
    /// One chunk of received data
    ReadLowLevel(ReadChunk),
    /// Whether the read notification is on
    ReadCallbackEnabled(bool),
    /// Current line parameters
    Configuration(LineConfig),
    /// Current buffer split
    BufferConfig(BufferSplit),
    /// Current buffer occupancy
    BufferStatus(BufferStatus),
    /// Current receive error counters
    ErrorCount(ErrorCount),
    /// Current frame-readable threshold
    FrameReadableConfig(u16),
}

impl Response {
    /// Encode as a packed little-endian payload
    #[must_use]
    pub fn encode(&self) -> Payload {
        let mut w = PayloadWriter::new();
        match self {
            Self::WriteLowLevel { written } => w.u8(*written),
            Self::ReadLowLevel(chunk) => w.chunk(chunk),
            Self::ReadCallbackEnabled(enabled) => w.u8(u8::from(*enabled)),
            Self::Configuration(config) => {
                w.u32(config.baud_rate.as_bps());
                w.u8(config.parity.as_raw());
                w.u8(config.stop_bits.as_raw());
                w.u8(config.word_length.bits());
                w.u8(config.flow_control.as_raw());
            }
            Self::BufferConfig(split) => {
                w.u16(split.tx_size());
                w.u16(split.rx_size());
            }
            Self::BufferStatus(status) => {
                w.u16(status.tx_used);
                w.u16(status.rx_used);
            }
            Self::ErrorCount(count) => w.error_count(*count),
            Self::FrameReadableConfig(frame_size) => w.u16(*frame_size),
        }
        w.finish()
    }
}

impl Notification {
    /// Function ID the notification is sent under
    #[must_use]
    pub const fn function_id(&self) -> u8 {
        match self {
            Self::ReadLowLevel(_) => function_id::CALLBACK_READ_LOW_LEVEL,
            Self::ErrorCount(_) => function_id::CALLBACK_ERROR_COUNT,
            Self::FrameReadable(_) => function_id::CALLBACK_FRAME_READABLE,
        }
    }

    /// Encode as a packed little-endian payload
    #[must_use]
    pub fn encode(&self) -> Payload {
        let mut w = PayloadWriter::new();
        match self {
            Self::ReadLowLevel(chunk) => w.chunk(chunk),
            Self::ErrorCount(count) => w.error_count(*count),
            Self::FrameReadable(frames) => w.u16(*frames),
        }
        w.finish()
    }
}

/// Result of running a request against the driver
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Done, nothing to send back
    Empty,
    /// Send this reply
    Message(Response),
    /// A parameter was out of range, nothing changed
    InvalidParameter(ConfigError),
}

/// Execute a decoded request
pub fn handle_request<H: UartHardware>(device: &mut Rs232<H>, request: Request) -> Outcome {
    trace!("protocol: function {=u8}", request.function_id());

    match request {
        Request::WriteLowLevel {
            message_length,
            chunk_offset,
            data,
        } => Outcome::Message(Response::WriteLowLevel {
            written: device.write(&data, message_length, chunk_offset),
        }),
        Request::ReadLowLevel { length } => {
            Outcome::Message(Response::ReadLowLevel(device.read(length)))
        }
        Request::EnableReadCallback => {
            device.enable_read_notification();
            Outcome::Empty
        }
        Request::DisableReadCallback => {
            device.disable_read_notification();
            Outcome::Empty
        }
        Request::IsReadCallbackEnabled => Outcome::Message(Response::ReadCallbackEnabled(
            device.is_read_notification_enabled(),
        )),
        Request::SetConfiguration {
            baud_rate,
            parity,
            stop_bits,
            word_length,
            flow_control,
        } => match device.set_line_config(baud_rate, parity, stop_bits, word_length, flow_control)
        {
            Ok(()) => Outcome::Empty,
            Err(err) => Outcome::InvalidParameter(err),
        },
        Request::GetConfiguration => Outcome::Message(Response::Configuration(device.line_config())),
        Request::SetBreakCondition { break_time_ms } => {
            device.set_break_condition(break_time_ms);
            Outcome::Empty
        }
        Request::SetBufferConfig {
            send_buffer_size,
            receive_buffer_size,
        } => match device.set_buffer_split(receive_buffer_size, send_buffer_size) {
            Ok(()) => Outcome::Empty,
            Err(err) => Outcome::InvalidParameter(err),
        },
        Request::GetBufferConfig => Outcome::Message(Response::BufferConfig(device.buffer_split())),
        Request::GetBufferStatus => {
            Outcome::Message(Response::BufferStatus(device.buffer_occupancy()))
        }
        Request::GetErrorCount => Outcome::Message(Response::ErrorCount(device.error_counters())),
        Request::SetFrameReadableConfig { frame_size } => {
            device.set_frame_readable_threshold(frame_size);
            Outcome::Empty
        }
        Request::GetFrameReadableConfig => {
            Outcome::Message(Response::FrameReadableConfig(device.frame_readable_threshold()))
        }
    }
}

/// Little-endian cursor over a request payload
struct PayloadReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Fail early when the whole layout does not fit
    fn require(&self, len: usize) -> Result<(), ProtocolError> {
        if self.bytes.len() < len {
            return Err(ProtocolError::Truncated {
                expected: len,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let end = self.pos + N;
        let field = self
            .bytes
            .get(self.pos..end)
            .ok_or(ProtocolError::Truncated {
                expected: end,
                actual: self.bytes.len(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(field);
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        self.array::<1>().map(|[b]| b)
    }

    fn u16(&mut self) -> Result<u16, ProtocolError> {
        self.array().map(u16::from_le_bytes)
    }

    fn u32(&mut self) -> Result<u32, ProtocolError> {
        self.array().map(u32::from_le_bytes)
    }
}

/// Little-endian payload builder
///
/// The largest layout (a read chunk) is exactly [`MAX_PAYLOAD_LEN`] bytes,
/// so pushes cannot overflow.
struct PayloadWriter {
    buf: Payload,
}

impl PayloadWriter {
    const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn bytes(&mut self, bytes: &[u8]) {
        let _ = self.buf.extend_from_slice(bytes);
    }

    fn u8(&mut self, value: u8) {
        self.bytes(&[value]);
    }

    fn u16(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    fn chunk(&mut self, chunk: &ReadChunk) {
        self.u16(chunk.message_length);
        self.u16(chunk.chunk_offset);
        let mut data = [0u8; CHUNK_SIZE];
        data[..chunk.data.len()].copy_from_slice(&chunk.data);
        self.bytes(&data);
    }

    fn error_count(&mut self, count: ErrorCount) {
        self.u32(count.overrun);
        self.u32(count.parity);
    }

    fn finish(self) -> Payload {
        self.buf
    }
}
