//! Telemetry task
//!
//! Logs radar telemetry and drives the presence LED.

use defmt::*;
use embassy_rp::gpio::Output;

use ld2410s_driver::{DistanceKind, EnergyKind, TelemetryEvent};

use crate::channels::TELEMETRY;

#[embassy_executor::task]
pub async fn telemetry_task(mut presence_led: Output<'static>) {
    info!("Telemetry task started");

    loop {
        match TELEMETRY.receive().await {
            TelemetryEvent::PresenceChanged(state) => {
                info!(
                    "Presence: moving={} still={}",
                    state.has_moving_target(),
                    state.has_still_target()
                );
                if state.has_target() {
                    presence_led.set_high();
                } else {
                    presence_led.set_low();
                }
            }
            TelemetryEvent::DistanceUpdated(kind, distance) => match kind {
                DistanceKind::Moving => debug!("Moving target: {} cm", distance),
                DistanceKind::Still => debug!("Still target: {} cm", distance),
                DistanceKind::Detection => debug!("Detection distance: {} cm", distance),
            },
            TelemetryEvent::EnergyUpdated(kind, energy) => match kind {
                EnergyKind::Moving => trace!("Moving energy: {}", energy),
                EnergyKind::Still => trace!("Still energy: {}", energy),
            },
            TelemetryEvent::VersionKnown(version) => {
                info!("Radar firmware: {}", version.as_str())
            }
            TelemetryEvent::SerialNumberKnown(serial) => {
                info!("Radar serial number: {}", serial.as_str())
            }
        }
    }
}
