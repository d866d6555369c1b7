//! LD2410S Radar Communication Protocol
//!
//! This crate turns the raw UART byte stream of an HLK-LD2410S presence radar
//! into typed frames, and builds the command frames sent back to it. The
//! radar emits two frame shapes, told apart by their 4-byte sentinels:
//!
//! ```text
//! Periodic report (radar → host, unsolicited):
//! ┌─────────────┬──────────────────────────────────┬─────────────┐
//! │ F4 F3 F2 F1 │ LEN(2) STATE DIST(2) ENERGY ...  │ F8 F7 F6 F5 │
//! └─────────────┴──────────────────────────────────┴─────────────┘
//!
//! Command / acknowledgement (host ↔ radar):
//! ┌─────────────┬────────┬──────────┬─────────────┬─────────────┐
//! │ FD FC FB FA │ LEN(2) │ OPCODE(2)│ PAYLOAD     │ 04 03 02 01 │
//! └─────────────┴────────┴──────────┴─────────────┴─────────────┘
//! ```
//!
//! The pipeline is `FrameBuffer::feed` → [`validate`] → either
//! [`PeriodicDecoder`] or [`CommandAck::from_frame`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod ack;
pub mod command;
pub mod frame;
pub mod report;
pub mod validate;

pub use ack::{AckPayload, CommandAck, FirmwareVersion};
pub use command::{Command, Opcode};
pub use frame::{FrameBuffer, FrameError, FrameKind, RawFrame, FRAME_CAPACITY};
pub use report::{PeriodicDecoder, PeriodicReading, TargetState};
pub use validate::{validate, ValidatedFrame};
