//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use ld2410s_driver::TelemetryEvent;

/// Channel capacity for radar telemetry
const TELEMETRY_CHANNEL_SIZE: usize = 16;

/// Telemetry published by the radar task
pub static TELEMETRY: Channel<CriticalSectionRawMutex, TelemetryEvent, TELEMETRY_CHANNEL_SIZE> =
    Channel::new();

/// Request to re-read firmware version and serial number
pub static QUERY_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
