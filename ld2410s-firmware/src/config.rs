//! Build-time radar configuration
//!
//! Constants generated by build.rs from radar.toml.

use embassy_rp::uart;
use ld2410s_driver::DriverConfig;
use ld2410s_hal::uart::{DataBits, Parity, StopBits};
use ld2410s_hal::UartConfig;

include!(concat!(env!("OUT_DIR"), "/radar_config.rs"));

/// Driver settings from radar.toml
pub fn driver_config() -> DriverConfig {
    DriverConfig::default()
        .with_throttle_ms(THROTTLE_MS)
        .with_settle_ms(SETTLE_MS)
        .with_ack_timeout_ms(ACK_TIMEOUT_MS)
}

/// Serial link settings for the radar UART
pub fn link_config() -> UartConfig {
    UartConfig {
        baudrate: BAUDRATE,
        ..UartConfig::default()
    }
}

/// Convert to the embassy-rp UART configuration
///
/// The RP2040 UART tops out at 8 data bits.
pub fn uart_config(link: &UartConfig) -> uart::Config {
    let mut config = uart::Config::default();
    config.baudrate = link.baudrate;
    config.data_bits = match link.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight | DataBits::Nine => uart::DataBits::DataBits8,
    };
    config.parity = match link.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    config.stop_bits = match link.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    config
}
