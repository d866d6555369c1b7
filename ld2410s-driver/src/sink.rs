//! Telemetry output
//!
//! The driver reports what it learns through a [`TelemetrySink`]. Every
//! method has a default that accepts and discards, so a consumer only
//! implements what it cares about; firmware that prefers an event stream
//! wraps a function in [`ForwardEvents`].
//!
//! Each method returns whether the value was accepted. A refused reading
//! is not remembered as published and goes out again with the next report.

use heapless::String;

use ld2410s_protocol::ack::{MAX_SERIAL_TEXT_LEN, MAX_VERSION_LEN};
use ld2410s_protocol::TargetState;

/// Which distance a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DistanceKind {
    /// Distance to the moving target
    Moving,
    /// Distance to the still target
    Still,
    /// Detection distance reported by the radar
    Detection,
}

/// Which energy value a reading belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnergyKind {
    Moving,
    Still,
}

/// Receiver of radar telemetry
///
/// Methods return `true` if the value was accepted.
pub trait TelemetrySink {
    /// Target state byte changed
    fn presence_changed(&mut self, state: TargetState) -> bool {
        let _ = state;
        true
    }

    /// A distance changed
    fn distance_updated(&mut self, kind: DistanceKind, distance: i16) -> bool {
        let _ = (kind, distance);
        true
    }

    /// An energy value changed
    fn energy_updated(&mut self, kind: EnergyKind, energy: u8) -> bool {
        let _ = (kind, energy);
        true
    }

    /// Firmware version answered, formatted as `v{major}.{minor}.{patch}`
    fn version_known(&mut self, version: &str) -> bool {
        let _ = version;
        true
    }

    /// Serial number answered
    fn serial_number_known(&mut self, serial: &str) -> bool {
        let _ = serial;
        true
    }
}

/// Discards everything
impl TelemetrySink for () {}

/// Owned form of every sink callback
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryEvent {
    PresenceChanged(TargetState),
    DistanceUpdated(DistanceKind, i16),
    EnergyUpdated(EnergyKind, u8),
    VersionKnown(String<MAX_VERSION_LEN>),
    SerialNumberKnown(String<MAX_SERIAL_TEXT_LEN>),
}

/// Sink that turns every callback into a [`TelemetryEvent`]
///
/// The wrapped function returns whether it accepted the event.
pub struct ForwardEvents<F>(pub F);

impl<F: FnMut(TelemetryEvent) -> bool> TelemetrySink for ForwardEvents<F> {
    fn presence_changed(&mut self, state: TargetState) -> bool {
        (self.0)(TelemetryEvent::PresenceChanged(state))
    }

    fn distance_updated(&mut self, kind: DistanceKind, distance: i16) -> bool {
        (self.0)(TelemetryEvent::DistanceUpdated(kind, distance))
    }

    fn energy_updated(&mut self, kind: EnergyKind, energy: u8) -> bool {
        (self.0)(TelemetryEvent::EnergyUpdated(kind, energy))
    }

    fn version_known(&mut self, version: &str) -> bool {
        let mut text = String::new();
        // Versions are produced by `FirmwareVersion::to_text` and always fit
        let _ = text.push_str(version);
        (self.0)(TelemetryEvent::VersionKnown(text))
    }

    fn serial_number_known(&mut self, serial: &str) -> bool {
        let mut text = String::new();
        let _ = text.push_str(serial);
        (self.0)(TelemetryEvent::SerialNumberKnown(text))
    }
}
