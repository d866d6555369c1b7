//! Radar transport and clock on top of embassy-rp
//!
//! The driver polls without blocking, so reads only happen once the
//! buffered UART reports data ready.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx, Error as UartError};
use embassy_time::Instant;

use ld2410s_driver::{ForwardEvents, TelemetryEvent};
use ld2410s_hal::{MonotonicClock, UartRx, UartTx};

use crate::channels::TELEMETRY;

/// Buffered UART connected to the radar
pub struct RadarUart {
    rx: BufferedUartRx,
    tx: BufferedUartTx,
}

impl RadarUart {
    pub fn new(rx: BufferedUartRx, tx: BufferedUartTx) -> Self {
        Self { rx, tx }
    }
}

impl UartRx for RadarUart {
    fn read_available_byte(&mut self) -> Option<u8> {
        match embedded_io::ReadReady::read_ready(&mut self.rx) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!("Radar UART error: {:?}", e);
                return None;
            }
        }

        let mut byte = [0u8; 1];
        match embedded_io::Read::read(&mut self.rx, &mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                warn!("Radar UART error: {:?}", e);
                None
            }
        }
    }
}

impl UartTx for RadarUart {
    type Error = UartError;

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        embedded_io::Write::write_all(&mut self.tx, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        embedded_io::Write::flush(&mut self.tx)
    }
}

/// Milliseconds since boot, wrapping at `u32::MAX`
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// Sink forwarding every event to [`TELEMETRY`]
pub type ChannelSink = ForwardEvents<fn(TelemetryEvent) -> bool>;

pub fn channel_sink() -> ChannelSink {
    ForwardEvents(publish as fn(TelemetryEvent) -> bool)
}

/// Returns false when the channel is full so the driver offers it again
fn publish(event: TelemetryEvent) -> bool {
    let sent = TELEMETRY.try_send(event).is_ok();
    if !sent {
        warn!("Telemetry channel full, dropping event");
    }
    sent
}
