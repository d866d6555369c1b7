//! LD2410S Hardware Abstraction Layer
//!
//! This crate defines the boundary traits between the radar driver and the
//! board it runs on. Chip-specific crates (or the firmware itself) implement
//! them so the same driver logic runs on any MCU, or on the host in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ld2410s-driver (frame pipeline)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ld2410s-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ firmware UART │       │  host mocks   │
//! │  + Instant    │       │  (tests)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Byte stream to and from the radar
//! - [`clock::MonotonicClock`] - Millisecond time source for throttling and settling

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::MonotonicClock;
pub use uart::{UartConfig, UartRx, UartTx};
