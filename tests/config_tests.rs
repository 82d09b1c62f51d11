//! Configuration and Constants Tests
//!
//! Tests to verify configuration values are valid and consistent.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --test config_tests

use rs232_firmware::config::*;
use rs232_firmware::types::{BufferSplit, LineConfig};

// =============================================================================
// Clock Tests
// =============================================================================

#[test]
fn system_clock_valid() {
    // STM32G474 max clock is 170 MHz
    assert_eq!(SYSTEM_CLOCK_HZ, 170_000_000);
}

#[test]
fn max_baud_reachable_with_oversampling() {
    // USARTDIV must be at least 16 with 16x oversampling
    assert!(SYSTEM_CLOCK_HZ / BAUD_RATE_MAX >= u32::from(OVERSAMPLING));
}

// =============================================================================
// Buffer Geometry Tests
// =============================================================================

#[test]
fn arena_fits_two_minimum_rings() {
    assert!(BUFFER_SIZE >= 2 * usize::from(BUFFER_SIZE_MIN));
}

#[test]
fn arena_size_fits_u16() {
    assert!(BUFFER_SIZE <= usize::from(u16::MAX));
}

#[test]
fn even_split_is_valid() {
    let even = BufferSplit::EVEN;
    assert!(BufferSplit::new(even.rx_size(), even.tx_size()).is_ok());
}

#[test]
fn flow_control_limit_below_minimum_ring() {
    assert!(FLOW_CONTROL_RX_LIMIT < usize::from(BUFFER_SIZE_MIN));
}

// =============================================================================
// Protocol Sizing Tests
// =============================================================================

#[test]
fn read_chunk_fits_payload() {
    // message_length + chunk_offset + data
    assert!(4 + CHUNK_SIZE <= MAX_PAYLOAD_LEN);
}

#[test]
fn chunk_length_fits_u8() {
    assert!(CHUNK_SIZE <= usize::from(u8::MAX));
}

// =============================================================================
// Flow Control Constants Tests
// =============================================================================

#[test]
fn xon_xoff_are_dc1_dc3() {
    assert_eq!(XON, 0x11);
    assert_eq!(XOFF, 0x13);
}

// =============================================================================
// Timing Tests
// =============================================================================

#[test]
fn event_poll_divides_tick() {
    assert_eq!((TICK_PERIOD_MS * 1000) % EVENT_POLL_PERIOD_US, 0);
}

#[test]
fn default_line_config_matches_constants() {
    let config = default_line_config();
    assert_eq!(config.baud_rate.as_bps(), DEFAULT_BAUD_RATE);
    assert_eq!(config.oversampling, OVERSAMPLING);
    assert_eq!(config, LineConfig::default());
}

// =============================================================================
// Pin Assignment Tests
// =============================================================================

#[test]
fn pins_are_distinct() {
    let all = [
        pins::LED_STATUS,
        pins::UART_TX,
        pins::UART_RX,
        pins::RTS,
        pins::CTS,
    ];
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn rx_outranks_tx() {
    assert!(irq::RX_PRIORITY < irq::TX_PRIORITY);
}
