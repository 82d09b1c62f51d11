//! Flow Control Tests
//!
//! Tests for the XON/XOFF and RTS/CTS state machines in isolation.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --test flow_control_tests

use rs232_firmware::config::{FLOW_CONTROL_RX_LIMIT, XOFF, XON};
use rs232_firmware::flow_control::{Backpressure, FlowControl, FlowState, TickActions};
use rs232_firmware::types::FlowControlMode;

const PLENTY: usize = 4096;
const TIGHT: usize = FLOW_CONTROL_RX_LIMIT;

// =============================================================================
// Mode Off
// =============================================================================

#[test]
fn test_off_passes_control_bytes_as_data() {
    let mut flow = FlowControl::new(FlowControlMode::Off);
    assert!(!flow.filter_rx_byte(XON));
    assert!(!flow.filter_rx_byte(XOFF));
}

#[test]
fn test_off_never_applies_backpressure() {
    let mut flow = FlowControl::new(FlowControlMode::Off);
    assert_eq!(flow.check_rx_headroom(0), Backpressure::None);
    assert!(flow.tx_permitted(false));
    assert_eq!(flow.tick(0, false), TickActions::default());
}

// =============================================================================
// Software (XON/XOFF)
// =============================================================================

#[test]
fn test_software_consumes_control_bytes() {
    let mut flow = FlowControl::new(FlowControlMode::Software);

    assert!(flow.filter_rx_byte(XOFF));
    assert_eq!(flow.tx_state(), FlowState::Wait);
    assert!(!flow.tx_permitted(true));

    assert!(flow.filter_rx_byte(XON));
    assert_eq!(flow.tx_state(), FlowState::Ok);
    assert!(flow.tx_permitted(false));

    assert!(!flow.filter_rx_byte(b'A'));
}

#[test]
fn test_software_schedules_xoff_once() {
    let mut flow = FlowControl::new(FlowControlMode::Software);

    assert_eq!(flow.check_rx_headroom(PLENTY), Backpressure::None);
    assert!(!flow.xoff_pending());

    assert_eq!(flow.check_rx_headroom(TIGHT), Backpressure::XoffScheduled);
    assert!(flow.xoff_pending());
    assert_eq!(flow.rx_state(), FlowState::Wait);

    // Still tight: already choking, nothing new
    assert_eq!(flow.check_rx_headroom(TIGHT - 1), Backpressure::None);
}

#[test]
fn test_software_tick_sends_xoff_then_xon() {
    let mut flow = FlowControl::new(FlowControlMode::Software);
    flow.check_rx_headroom(TIGHT);

    let actions = flow.tick(TIGHT, true);
    assert_eq!(actions.control_byte, Some(XOFF));
    assert!(actions.kick_tx);
    assert!(!flow.xoff_pending());

    // Still tight: no control byte
    let actions = flow.tick(TIGHT, true);
    assert_eq!(actions.control_byte, None);

    // Drained: XON, back to OK
    let actions = flow.tick(PLENTY, true);
    assert_eq!(actions.control_byte, Some(XON));
    assert_eq!(flow.rx_state(), FlowState::Ok);

    let actions = flow.tick(PLENTY, true);
    assert_eq!(actions.control_byte, None);
}

#[test]
fn test_software_tick_kicks_only_when_peer_allows() {
    let mut flow = FlowControl::new(FlowControlMode::Software);
    assert!(flow.tick(PLENTY, true).kick_tx);

    flow.filter_rx_byte(XOFF);
    assert!(!flow.tick(PLENTY, true).kick_tx);

    flow.filter_rx_byte(XON);
    assert!(flow.tick(PLENTY, true).kick_tx);
}

#[test]
fn test_software_ignores_cts() {
    let mut flow = FlowControl::new(FlowControlMode::Software);
    let actions = flow.tick(PLENTY, false);
    assert!(actions.kick_tx);
    assert_eq!(actions.rts_ready, None);
}

// =============================================================================
// Hardware (RTS/CTS)
// =============================================================================

#[test]
fn test_hardware_does_not_filter() {
    let mut flow = FlowControl::new(FlowControlMode::Hardware);
    assert!(!flow.filter_rx_byte(XON));
    assert!(!flow.filter_rx_byte(XOFF));
}

#[test]
fn test_hardware_deasserts_rts_on_low_headroom() {
    let mut flow = FlowControl::new(FlowControlMode::Hardware);
    assert_eq!(flow.check_rx_headroom(PLENTY), Backpressure::None);
    assert_eq!(flow.check_rx_headroom(TIGHT), Backpressure::DeassertRts);
    assert!(!flow.xoff_pending());
}

#[test]
fn test_hardware_tick_reasserts_rts_on_recovery() {
    let mut flow = FlowControl::new(FlowControlMode::Hardware);
    assert_eq!(flow.tick(TIGHT, true).rts_ready, None);
    assert_eq!(flow.tick(TIGHT + 1, true).rts_ready, Some(true));
}

#[test]
fn test_hardware_tx_follows_cts() {
    let mut flow = FlowControl::new(FlowControlMode::Hardware);
    assert!(flow.tx_permitted(true));
    assert!(!flow.tx_permitted(false));
    assert!(flow.tick(PLENTY, true).kick_tx);
    assert!(!flow.tick(PLENTY, false).kick_tx);
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn test_reset_reopens_and_switches_mode() {
    let mut flow = FlowControl::new(FlowControlMode::Software);
    flow.filter_rx_byte(XOFF);
    flow.check_rx_headroom(0);

    flow.reset(FlowControlMode::Hardware);
    assert_eq!(flow.mode(), FlowControlMode::Hardware);
    assert_eq!(flow.rx_state(), FlowState::Ok);
    assert_eq!(flow.tx_state(), FlowState::Ok);
    assert!(!flow.xoff_pending());
}
