//! Callback Dispatcher Tests
//!
//! Tests for per-kind retry slots and the send attempt helper.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --test callback_tests

mod common;

use std::cell::Cell;

use common::MockSink;
use rs232_firmware::callback::{attempt_send, CallbackSlot, CallbackState, Notification};
use rs232_firmware::types::ErrorCount;

fn errors(overrun: u32, parity: u32) -> Notification {
    Notification::ErrorCount(ErrorCount { overrun, parity })
}

// =============================================================================
// attempt_send
// =============================================================================

#[test]
fn test_attempt_send_accepted() {
    let mut sink = MockSink::new();
    let state = attempt_send(&mut sink, Notification::FrameReadable(3));
    assert_eq!(state, CallbackState::Idle);
    assert_eq!(sink.sent, [Notification::FrameReadable(3)]);
}

#[test]
fn test_attempt_send_refused_keeps_payload() {
    let mut sink = MockSink::busy();
    let state = attempt_send(&mut sink, Notification::FrameReadable(3));
    assert_eq!(state, CallbackState::Buffered(Notification::FrameReadable(3)));
    assert!(sink.sent.is_empty());
}

// =============================================================================
// CallbackSlot
// =============================================================================

#[test]
fn test_slot_idle_without_trigger() {
    let mut slot = CallbackSlot::new();
    let mut sink = MockSink::new();

    assert!(!slot.tick(&mut sink, || None));
    assert!(!slot.is_buffered());
    assert!(sink.sent.is_empty());
}

#[test]
fn test_slot_delivers_triggered_payload() {
    let mut slot = CallbackSlot::new();
    let mut sink = MockSink::new();

    assert!(slot.tick(&mut sink, || Some(errors(1, 0))));
    assert_eq!(sink.sent, [errors(1, 0)]);
    assert_eq!(slot.state(), &CallbackState::Idle);
}

#[test]
fn test_slot_retries_identical_payload() {
    let mut slot = CallbackSlot::new();
    let mut sink = MockSink::busy();

    assert!(!slot.tick(&mut sink, || Some(errors(1, 0))));
    assert!(slot.is_buffered());

    // Counters moved on meanwhile, but the buffered payload is what goes out
    assert!(!slot.tick(&mut sink, || Some(errors(5, 5))));
    sink.accepting = true;
    assert!(slot.tick(&mut sink, || Some(errors(9, 9))));

    assert_eq!(sink.sent, [errors(1, 0)]);
    assert_eq!(sink.refused, 2);
    assert!(!slot.is_buffered());
}

#[test]
fn test_trigger_not_evaluated_while_buffered() {
    let mut slot = CallbackSlot::new();
    let mut sink = MockSink::busy();
    let evaluated = Cell::new(0);

    let trigger = || {
        evaluated.set(evaluated.get() + 1);
        Some(Notification::FrameReadable(1))
    };

    slot.tick(&mut sink, trigger);
    slot.tick(&mut sink, trigger);
    slot.tick(&mut sink, trigger);
    assert_eq!(evaluated.get(), 1);

    sink.accepting = true;
    slot.tick(&mut sink, trigger);
    assert_eq!(evaluated.get(), 1);

    // Idle again, trigger runs
    slot.tick(&mut sink, trigger);
    assert_eq!(evaluated.get(), 2);
}

#[test]
fn test_slots_are_independent() {
    let mut error_slot = CallbackSlot::new();
    let mut frame_slot = CallbackSlot::new();
    let mut sink = MockSink::busy();

    error_slot.tick(&mut sink, || Some(errors(0, 1)));
    sink.accepting = true;
    frame_slot.tick(&mut sink, || Some(Notification::FrameReadable(2)));

    assert!(error_slot.is_buffered());
    assert!(!frame_slot.is_buffered());
    assert_eq!(sink.sent, [Notification::FrameReadable(2)]);
}

#[test]
fn test_default_slot_is_idle() {
    assert_eq!(CallbackSlot::default(), CallbackSlot::new());
    assert_eq!(CallbackState::default(), CallbackState::Idle);
}
