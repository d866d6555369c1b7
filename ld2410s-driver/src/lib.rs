//! LD2410S presence radar driver
//!
//! Owns the whole receive pipeline and the command channel for one radar:
//!
//! - Drains the UART every tick and reassembles frames
//! - Validates and decodes periodic reports, throttled, into telemetry
//! - Queues commands and sends them half-duplex, one outstanding at a time
//! - Correlates acknowledgements and keeps the last known device info
//!
//! Everything runs from [`Ld2410s::poll`]; nothing blocks. The settling
//! delay between commands and the acknowledgement timeout are both measured
//! against the injected [`MonotonicClock`](ld2410s_hal::MonotonicClock).

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

mod fmt;

pub mod config;
pub mod driver;
pub mod info;
pub mod sequence;
pub mod sink;

pub use config::DriverConfig;
pub use driver::{DriverError, Ld2410s};
pub use info::DeviceInfo;
pub use sequence::{CommandSequence, FailureReason, SequenceStatus};
pub use sink::{DistanceKind, EnergyKind, ForwardEvents, TelemetryEvent, TelemetrySink};
