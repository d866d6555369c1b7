//! LD2410S - Radar Presence Sensor Firmware
//!
//! Runs the LD2410S driver on an RP2040 board and publishes presence,
//! distance and device identity telemetry.
//!
//! Pin assignments (Raspberry Pi Pico):
//! - GPIO0 / GPIO1: UART0 TX / RX to the radar
//! - GPIO15: query button to GND
//! - GPIO25: on-board LED, lit while a target is present

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ld2410s_driver::Ld2410s;

use crate::transport::{channel_sink, EmbassyClock, RadarUart};

mod channels;
mod config;
mod tasks;
mod transport;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("LD2410S firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Setup UART for the radar
    let link = config::link_config();
    if !link.is_radar_compatible() {
        warn!("UART framing {:?} does not match the radar (8N1)", link);
    }

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, config::uart_config(&link));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", link.baudrate);

    let radar = Ld2410s::new(RadarUart::new(rx, tx), EmbassyClock, config::driver_config())
        .with_sink(channel_sink());

    let presence_led = Output::new(p.PIN_25, Level::Low);
    let query_button = Input::new(p.PIN_15, Pull::Up);

    // Spawn tasks
    spawner.spawn(tasks::radar_task(radar)).unwrap();
    spawner.spawn(tasks::telemetry_task(presence_led)).unwrap();
    spawner.spawn(tasks::query_button_task(query_button)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
