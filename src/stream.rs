//! Stream Chunker
//!
//! Converts between logical messages and the bounded chunks the host
//! protocol carries.
//!
//! # Write direction
//!
//! The host sends up to [`CHUNK_SIZE`] bytes per request, tagged with the
//! total message length and the chunk's offset. Whatever fits in the TX ring
//! is accepted; the host resends the rest.
//!
//! # Read direction
//!
//! [`ReadStreamStatus`] snapshots the RX occupancy when a stream starts and
//! hands it out in chunks until exactly that many bytes were delivered.
//! Bytes arriving meanwhile belong to the next stream.

use heapless::Vec;

use crate::config::CHUNK_SIZE;
use crate::ring_buffer::RingBuffer;

/// One chunk of a logical read message
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ReadChunk {
    /// Length of the whole logical message
    pub message_length: u16,
    /// Offset of this chunk within the message
    pub chunk_offset: u16,
    /// Payload bytes
    pub data: Vec<u8, CHUNK_SIZE>,
}

impl ReadChunk {
    /// Zero-length chunk reported when nothing is readable
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            message_length: 0,
            chunk_offset: 0,
            data: Vec::new(),
        }
    }

    /// Check if the chunk carries no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this chunk completes its message
    #[must_use]
    pub fn is_last(&self) -> bool {
        usize::from(self.chunk_offset) + self.data.len() == usize::from(self.message_length)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ReadChunk {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Chunk({}+{}/{})",
            self.chunk_offset,
            self.data.len(),
            self.message_length
        );
    }
}

/// Progress of the logical message currently being read out
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadStreamStatus {
    in_progress: bool,
    stream_sent: u16,
    stream_total_length: u16,
}

impl ReadStreamStatus {
    /// Create an idle stream
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_progress: false,
            stream_sent: 0,
            stream_total_length: 0,
        }
    }

    /// Drop any stream in progress
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether a message is partially delivered
    #[must_use]
    pub const fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Bytes of the current message already delivered
    #[must_use]
    pub const fn sent(&self) -> u16 {
        self.stream_sent
    }

    /// Length of the current message
    #[must_use]
    pub const fn total_length(&self) -> u16 {
        self.stream_total_length
    }

    /// Produce the next chunk from the RX ring
    ///
    /// A new stream is started only when none is in progress; its length is
    /// the ring occupancy at that instant, capped at `max_length`. Returns
    /// None when idle and nothing is buffered.
    pub fn next_chunk(&mut self, rx: &mut RingBuffer<'_>, max_length: u16) -> Option<ReadChunk> {
        if !self.in_progress {
            let available = u16::try_from(rx.used()).unwrap_or(u16::MAX);
            let total = available.min(max_length);
            if total == 0 {
                return None;
            }
            self.stream_total_length = total;
            self.stream_sent = 0;
        }

        let remaining = usize::from(self.stream_total_length - self.stream_sent);
        let mut chunk = ReadChunk {
            message_length: self.stream_total_length,
            chunk_offset: self.stream_sent,
            data: Vec::new(),
        };

        for _ in 0..remaining.min(CHUNK_SIZE) {
            let Some(byte) = rx.pop() else {
                break;
            };
            // Capacity is CHUNK_SIZE and the loop never exceeds it.
            let _ = chunk.data.push(byte);
        }

        // Only this stream consumes the RX ring, so the pops above cannot
        // come up short while the snapshot is valid.
        let delivered = u16::try_from(chunk.data.len()).unwrap_or(0);
        self.stream_sent += delivered;

        if delivered == 0 || self.stream_sent >= self.stream_total_length {
            self.reset();
        } else {
            self.in_progress = true;
        }

        Some(chunk)
    }
}

/// Accept one write chunk into the TX ring
///
/// The number of meaningful bytes in `data` is bounded by the chunk size and
/// by what is left of the message after `chunk_offset`. Returns how many of
/// them the ring took.
pub fn write_chunk(
    tx: &mut RingBuffer<'_>,
    data: &[u8],
    message_length: u16,
    chunk_offset: u16,
) -> u8 {
    let remaining = usize::from(message_length.saturating_sub(chunk_offset));
    let len = data.len().min(CHUNK_SIZE).min(remaining);
    let accepted = tx.push_slice(&data[..len]);
    u8::try_from(accepted).unwrap_or(u8::MAX)
}

/// Detector for "a whole number of frames is readable"
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReadable {
    frame_size: u16,
    already_sent: bool,
}

impl FrameReadable {
    /// Create a disabled detector
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frame_size: 0,
            already_sent: false,
        }
    }

    /// Set the frame size (0 disables) and clear the latch
    pub fn set_frame_size(&mut self, frame_size: u16) {
        self.frame_size = frame_size;
        self.already_sent = false;
    }

    /// Configured frame size
    #[must_use]
    pub const fn frame_size(&self) -> u16 {
        self.frame_size
    }

    /// Whether a notification fired for the current crossing
    #[must_use]
    pub const fn already_sent(&self) -> bool {
        self.already_sent
    }

    /// Clear the latch
    pub fn reset(&mut self) {
        self.already_sent = false;
    }

    /// Re-arm once the buffer fell below one frame
    pub fn refresh(&mut self, used: usize) {
        if used < usize::from(self.frame_size) {
            self.already_sent = false;
        }
    }

    /// Fire once per threshold crossing
    ///
    /// Returns the number of complete frames buffered.
    pub fn check(&mut self, used: usize) -> Option<u16> {
        if self.frame_size == 0 || self.already_sent {
            return None;
        }

        let frame_size = usize::from(self.frame_size);
        if used < frame_size {
            return None;
        }

        self.already_sent = true;
        Some(u16::try_from(used / frame_size).unwrap_or(u16::MAX))
    }
}
