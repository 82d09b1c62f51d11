//! RS232 Bridge Main Application
//!
//! Entry point for the STM32G474-based RS232 bridge firmware.
//! Initializes hardware and spawns async tasks.

#![no_std]
#![no_main]

use defmt::unwrap;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::usart::{self, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use {defmt_rtt as _, panic_probe as _};

use rs232_firmware::hal::gpio::{CtsInput, RtsOutput, StatusLed};
use rs232_firmware::hal::uart::Stm32Uart;
use rs232_firmware::prelude::*;

/// Notifications on their way to the host link
static NOTIFICATIONS: Channel<CriticalSectionRawMutex, Notification, NOTIFICATION_QUEUE_DEPTH> =
    Channel::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("RS232 Bridge Firmware v{}", env!("CARGO_PKG_VERSION"));

    // Initialize STM32G474 peripherals with default clock configuration
    let config = embassy_stm32::Config::default();
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // Status LED on PA5 for Nucleo boards
    let led = StatusLed::new(Output::new(p.PA5, Level::Low, Speed::Low));

    // USART2: PA2 = TX, PA3 = RX. Line parameters are applied by the driver.
    let uart = unwrap!(Uart::new_blocking(
        p.USART2,
        p.PA3,
        p.PA2,
        usart::Config::default()
    ));
    let rts = RtsOutput::new(Output::new(p.PA1, Level::Low, Speed::Low));
    let cts = CtsInput::new(Input::new(p.PA0, Pull::Up));

    info!("USART2 initialized");

    spawner.spawn(serial_task(Stm32Uart::new(uart, rts, cts))).unwrap();
    spawner.spawn(host_link_task()).unwrap();
    spawner.spawn(heartbeat_task(led)).unwrap();

    info!("Tasks spawned");
}

/// Serial task - delivers UART events and runs the 1 ms tick
#[embassy_executor::task]
async fn serial_task(uart: Stm32Uart<'static>) {
    let mut bridge = Rs232::new(uart);
    let mut sink = NOTIFICATIONS.sender();

    let polls_per_tick = TICK_PERIOD_MS * 1000 / EVENT_POLL_PERIOD_US;
    let mut ticker = Ticker::every(Duration::from_micros(EVENT_POLL_PERIOD_US));
    let mut polls = 0;

    loop {
        while let Some(event) = bridge.transport_mut().hardware_mut().poll_event() {
            bridge.handle_event(event);
        }

        polls += 1;
        if polls >= polls_per_tick {
            polls = 0;
            bridge.tick(&mut sink);
        }

        ticker.next().await;
    }
}

/// Host link task - forwards notifications to the host
///
/// Packet framing toward the host is board specific; this task logs the
/// encoded payloads.
#[embassy_executor::task]
async fn host_link_task() {
    let receiver = NOTIFICATIONS.receiver();
    loop {
        let notification = receiver.receive().await;
        let payload = notification.encode();
        debug!(
            "notify fid={} len={}: {}",
            notification.function_id(),
            payload.len(),
            notification
        );
    }
}

/// Heartbeat task - blinks LED to show system is running
#[embassy_executor::task]
async fn heartbeat_task(mut led: StatusLed<'static>) {
    loop {
        led.toggle();
        Timer::after(Duration::from_millis(100)).await;
        led.toggle();
        Timer::after(Duration::from_millis(900)).await;
    }
}
