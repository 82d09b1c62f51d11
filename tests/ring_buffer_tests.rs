//! Ring Buffer Tests
//!
//! Tests for the fixed-capacity byte rings and the shared RX/TX arena.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --test ring_buffer_tests

use rs232_firmware::config::BUFFER_SIZE;
use rs232_firmware::ring_buffer::{RingBuffer, RingState, SerialBuffers};
use rs232_firmware::types::BufferSplit;

// =============================================================================
// Single Ring Tests
// =============================================================================

#[test]
fn test_new_ring_is_empty() {
    let mut storage = [0u8; 8];
    let mut state = RingState::new();
    let ring = RingBuffer::new(&mut storage, &mut state);

    assert!(ring.is_empty());
    assert!(!ring.is_full());
    assert_eq!(ring.used(), 0);
    assert_eq!(ring.free(), 7);
    assert_eq!(ring.capacity(), 8);
}

#[test]
fn test_fifo_order() {
    let mut storage = [0u8; 8];
    let mut state = RingState::new();
    let mut ring = RingBuffer::new(&mut storage, &mut state);

    for byte in [1, 2, 3] {
        assert!(ring.push(byte));
    }

    assert_eq!(ring.pop(), Some(1));
    assert_eq!(ring.pop(), Some(2));
    assert_eq!(ring.pop(), Some(3));
    assert_eq!(ring.pop(), None);
}

#[test]
fn test_holds_capacity_minus_one() {
    let mut storage = [0u8; 8];
    let mut state = RingState::new();
    let mut ring = RingBuffer::new(&mut storage, &mut state);

    for byte in 0..7 {
        assert!(ring.push(byte), "byte {byte} should fit");
    }
    assert!(ring.is_full());
    assert_eq!(ring.free(), 0);

    // Full ring rejects and stays unchanged
    assert!(!ring.push(99));
    assert_eq!(ring.used(), 7);
    assert_eq!(ring.pop(), Some(0));
}

#[test]
fn test_wraparound_keeps_order() {
    let mut storage = [0u8; 4];
    let mut state = RingState::new();
    let mut ring = RingBuffer::new(&mut storage, &mut state);

    let mut next_in = 0u8;
    let mut next_out = 0u8;
    for _ in 0..20 {
        while ring.push(next_in) {
            next_in = next_in.wrapping_add(1);
        }
        assert_eq!(ring.used(), 3);

        // Drain two to move the cursors across the end of storage
        for _ in 0..2 {
            assert_eq!(ring.pop(), Some(next_out));
            next_out = next_out.wrapping_add(1);
        }
    }
}

#[test]
fn test_pop_on_empty_leaves_state() {
    let mut storage = [0u8; 4];
    let mut state = RingState::new();
    {
        let mut ring = RingBuffer::new(&mut storage, &mut state);
        assert_eq!(ring.pop(), None);
    }
    assert_eq!(state, RingState::new());
}

#[test]
fn test_push_slice_stops_when_full() {
    let mut storage = [0u8; 6];
    let mut state = RingState::new();
    let mut ring = RingBuffer::new(&mut storage, &mut state);

    assert_eq!(ring.push_slice(&[1, 2, 3, 4, 5, 6, 7, 8]), 5);
    assert!(ring.is_full());
    assert_eq!(ring.push_slice(&[9]), 0);
}

#[test]
fn test_init_clears() {
    let mut storage = [0u8; 6];
    let mut state = RingState::new();
    let mut ring = RingBuffer::new(&mut storage, &mut state);

    ring.push_slice(&[1, 2, 3]);
    ring.init();
    assert!(ring.is_empty());
    assert_eq!(ring.pop(), None);
}

#[test]
fn test_state_survives_view() {
    let mut storage = [0u8; 6];
    let mut state = RingState::new();

    RingBuffer::new(&mut storage, &mut state).push_slice(&[4, 5]);
    assert_eq!(state.used(6), 2);

    let mut ring = RingBuffer::new(&mut storage, &mut state);
    assert_eq!(ring.pop(), Some(4));
}

// =============================================================================
// Arena Tests
// =============================================================================

#[test]
fn test_even_split_geometry() {
    let mut buffers = SerialBuffers::new(BufferSplit::EVEN);

    assert_eq!(buffers.rx().capacity(), BUFFER_SIZE / 2);
    assert_eq!(buffers.tx().capacity(), BUFFER_SIZE / 2);
    assert_eq!(buffers.rx_headroom(), BUFFER_SIZE / 2);
}

#[test]
fn test_rx_and_tx_are_independent() {
    let mut buffers = SerialBuffers::new(BufferSplit::EVEN);

    buffers.rx().push_slice(b"abc");
    buffers.tx().push_slice(b"xy");

    assert_eq!(buffers.rx_used(), 3);
    assert_eq!(buffers.tx_used(), 2);
    assert_eq!(buffers.tx().pop(), Some(b'x'));
    assert_eq!(buffers.rx().pop(), Some(b'a'));
}

#[test]
fn test_full_rx_does_not_spill_into_tx() {
    let split = BufferSplit::new(1024, (BUFFER_SIZE - 1024) as u16).unwrap();
    let mut buffers = SerialBuffers::new(split);

    let accepted = buffers.rx().push_slice(&[0xAA; 2000]);
    assert_eq!(accepted, 1023);
    assert_eq!(buffers.tx_used(), 0);
    assert_eq!(buffers.tx().pop(), None);
}

#[test]
fn test_reinit_resplits_and_clears() {
    let mut buffers = SerialBuffers::new(BufferSplit::EVEN);
    buffers.rx().push_slice(&[1; 100]);
    buffers.tx().push_slice(&[2; 100]);

    let split = BufferSplit::new(8192, 2048).unwrap();
    buffers.reinit(split);

    assert_eq!(buffers.split(), split);
    assert_eq!(buffers.rx_used(), 0);
    assert_eq!(buffers.tx_used(), 0);
    assert_eq!(buffers.rx().capacity(), 8192);
    assert_eq!(buffers.tx().capacity(), 2048);
}

#[test]
fn test_headroom_tracks_occupancy() {
    let mut buffers = SerialBuffers::new(BufferSplit::EVEN);
    buffers.rx().push_slice(&[0; 1000]);
    assert_eq!(buffers.rx_headroom(), BUFFER_SIZE / 2 - 1000);
}
