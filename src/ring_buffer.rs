//! Ring Buffers
//!
//! Fixed-capacity circular byte queues for the RX and TX paths.
//!
//! The cursors of a ring ([`RingState`]) are kept apart from its storage so
//! the RX and TX rings can share one arena ([`SerialBuffers`]) and be
//! re-split at runtime without reallocating. A [`RingBuffer`] is the
//! short-lived view that joins a cursor pair with its slice of the arena.
//!
//! One slot is always left empty to tell "full" from "empty": a ring over
//! `C` bytes holds at most `C - 1` bytes.
//!
//! Rings are not synchronized. Each has exactly one producer and one
//! consumer (RX: event handler produces, stream logic consumes; TX: stream
//! logic produces, event handler consumes).

use crate::config::BUFFER_SIZE;
use crate::types::BufferSplit;

/// Read and write cursors of one ring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RingState {
    start: usize,
    end: usize,
}

impl RingState {
    /// Create an empty cursor pair
    #[must_use]
    pub const fn new() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Bytes stored for a ring of the given capacity
    #[must_use]
    pub const fn used(&self, capacity: usize) -> usize {
        if self.end < self.start {
            capacity + self.end - self.start
        } else {
            self.end - self.start
        }
    }

    /// Rewind both cursors
    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
    }
}

/// Circular FIFO view over a storage slice
pub struct RingBuffer<'a> {
    storage: &'a mut [u8],
    state: &'a mut RingState,
}

impl<'a> RingBuffer<'a> {
    /// Join a storage slice with its cursors
    ///
    /// The capacity is the length of `storage`.
    pub fn new(storage: &'a mut [u8], state: &'a mut RingState) -> Self {
        Self { storage, state }
    }

    /// Empty the ring
    pub fn init(&mut self) {
        self.state.reset();
    }

    /// Capacity in bytes (one more than the usable space)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes currently stored
    #[must_use]
    pub fn used(&self) -> usize {
        self.state.used(self.storage.len())
    }

    /// Bytes that can still be pushed
    #[must_use]
    pub fn free(&self) -> usize {
        self.capacity().saturating_sub(1).saturating_sub(self.used())
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.start == self.state.end
    }

    /// Check if full
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.next(self.state.end) == self.state.start
    }

    /// Append a byte
    ///
    /// Returns false and leaves the ring unchanged when full.
    pub fn push(&mut self, byte: u8) -> bool {
        let new_end = self.next(self.state.end);
        if new_end == self.state.start {
            return false;
        }

        self.storage[self.state.end] = byte;
        self.state.end = new_end;
        true
    }

    /// Remove the oldest byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }

        let byte = self.storage[self.state.start];
        self.state.start = self.next(self.state.start);
        Some(byte)
    }

    /// Push as many bytes as fit, returns the count accepted
    pub fn push_slice(&mut self, data: &[u8]) -> usize {
        data.iter().take_while(|&&byte| self.push(byte)).count()
    }

    fn next(&self, index: usize) -> usize {
        let next = index + 1;
        if next >= self.storage.len() {
            0
        } else {
            next
        }
    }
}

/// Shared arena for the RX and TX rings
///
/// The RX ring always starts at offset 0, the TX ring follows it.
pub struct SerialBuffers {
    storage: [u8; BUFFER_SIZE],
    split: BufferSplit,
    rx: RingState,
    tx: RingState,
}

impl SerialBuffers {
    /// Create an empty arena with the given split
    #[must_use]
    pub const fn new(split: BufferSplit) -> Self {
        Self {
            storage: [0; BUFFER_SIZE],
            split,
            rx: RingState::new(),
            tx: RingState::new(),
        }
    }

    /// Clear the arena and re-divide it
    pub fn reinit(&mut self, split: BufferSplit) {
        self.storage.fill(0);
        self.split = split;
        self.rx.reset();
        self.tx.reset();
    }

    /// Current split
    #[must_use]
    pub const fn split(&self) -> BufferSplit {
        self.split
    }

    /// View of the RX ring
    pub fn rx(&mut self) -> RingBuffer<'_> {
        let (rx, _) = self.storage.split_at_mut(usize::from(self.split.rx_size()));
        RingBuffer::new(rx, &mut self.rx)
    }

    /// View of the TX ring
    pub fn tx(&mut self) -> RingBuffer<'_> {
        let (_, tx) = self.storage.split_at_mut(usize::from(self.split.rx_size()));
        RingBuffer::new(tx, &mut self.tx)
    }

    /// Bytes waiting in the RX ring
    #[must_use]
    pub const fn rx_used(&self) -> usize {
        self.rx.used(self.split.rx_size() as usize)
    }

    /// Bytes waiting in the TX ring
    #[must_use]
    pub const fn tx_used(&self) -> usize {
        self.tx.used(self.split.tx_size() as usize)
    }

    /// Free bytes left in the RX ring before it reports full
    #[must_use]
    pub const fn rx_headroom(&self) -> usize {
        self.split.rx_size() as usize - self.rx_used()
    }
}
