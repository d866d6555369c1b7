//! Periodic report decoding
//!
//! Report body layout (offsets after the `F4 F3 F2 F1` header):
//!
//! | Offset | Size | Field                                 |
//! |--------|------|---------------------------------------|
//! | 0      | 2    | Body length                           |
//! | 2      | 1    | Target state bitmask                  |
//! | 3      | 2    | Moving target distance (cm)           |
//! | 5      | 1    | Moving target energy                  |
//! | 6      | 2    | Still target distance (cm)            |
//! | 8      | 1    | Still target energy                   |
//! | 9      | 2    | Detection distance (cm)               |
//!
//! Only the first five bytes are guaranteed; the radar's minimal report
//! mode stops after the moving distance.

use crate::frame::FrameKind;
use crate::validate::ValidatedFrame;

const TARGET_STATE: usize = 2;
const MOVING_DISTANCE: usize = 3;
const MOVING_ENERGY: usize = 5;
const STILL_DISTANCE: usize = 6;
const STILL_ENERGY: usize = 8;
const DETECTION_DISTANCE: usize = 9;

/// Default minimum interval between two emitted readings
pub const DEFAULT_THROTTLE_MS: u32 = 1000;

/// Target state bitmask
///
/// - `0x00` = no target
/// - `0x01` = moving target
/// - `0x02` = still target
/// - `0x03` = moving + still targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetState(u8);

impl TargetState {
    /// Nothing detected
    pub const NONE: TargetState = TargetState(0x00);

    /// Wrap a raw state byte
    pub fn from_byte(byte: u8) -> Self {
        TargetState(byte)
    }

    /// Raw state byte
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Any target present (any bit set)
    pub fn has_target(self) -> bool {
        self.0 != 0
    }

    /// Bit 0: moving target present
    pub fn has_moving_target(self) -> bool {
        self.0 & 0x01 != 0
    }

    /// Bit 1: still target present
    pub fn has_still_target(self) -> bool {
        self.0 & 0x02 != 0
    }
}

/// One decoded periodic report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodicReading {
    /// Target state bitmask
    pub target_state: TargetState,
    /// Moving target distance in cm
    pub moving_distance: i16,
    /// Moving target energy, if reported
    pub moving_energy: Option<u8>,
    /// Still target distance in cm, if reported
    pub still_distance: Option<i16>,
    /// Still target energy, if reported
    pub still_energy: Option<u8>,
    /// Aggregate detection distance in cm, if reported
    pub detection_distance: Option<i16>,
}

impl PeriodicReading {
    /// Extract a reading from a validated periodic frame
    ///
    /// Returns `None` for acknowledgement frames or a body too short to hold
    /// the target state and moving distance.
    pub fn from_frame(frame: &ValidatedFrame) -> Option<Self> {
        if frame.kind() != FrameKind::Periodic {
            return None;
        }
        let body = frame.body();

        Some(Self {
            target_state: TargetState::from_byte(*body.get(TARGET_STATE)?),
            moving_distance: read_i16(body, MOVING_DISTANCE)?,
            moving_energy: body.get(MOVING_ENERGY).copied(),
            still_distance: read_i16(body, STILL_DISTANCE),
            still_energy: body.get(STILL_ENERGY).copied(),
            detection_distance: read_i16(body, DETECTION_DISTANCE),
        })
    }
}

/// Signed 16-bit value stored low byte first, `(high << 8) + low`
fn read_i16(body: &[u8], offset: usize) -> Option<i16> {
    let low = *body.get(offset)?;
    let high = *body.get(offset + 1)?;
    Some(i16::from_le_bytes([low, high]))
}

/// Decode a periodic frame unless the previous reading is too recent
///
/// `last_emit_ms` is the time the previous reading was produced (`None`
/// before the first one). A frame arriving less than `throttle_ms` after it
/// is discarded entirely.
pub fn decode_periodic(
    frame: &ValidatedFrame,
    now_ms: u32,
    last_emit_ms: Option<u32>,
    throttle_ms: u32,
) -> Option<PeriodicReading> {
    if let Some(last) = last_emit_ms {
        if now_ms.wrapping_sub(last) < throttle_ms {
            return None;
        }
    }
    PeriodicReading::from_frame(frame)
}

/// Rate-limited periodic report decoder
///
/// Keeps the time of the last emitted reading so high-rate radar output
/// does not flood whatever stores the readings downstream.
#[derive(Debug, Clone)]
pub struct PeriodicDecoder {
    throttle_ms: u32,
    last_emit_ms: Option<u32>,
}

impl Default for PeriodicDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_MS)
    }
}

impl PeriodicDecoder {
    /// Create a decoder emitting at most one reading per `throttle_ms`
    pub fn new(throttle_ms: u32) -> Self {
        Self {
            throttle_ms,
            last_emit_ms: None,
        }
    }

    /// Minimum interval between readings
    pub fn throttle_ms(&self) -> u32 {
        self.throttle_ms
    }

    /// Time of the last emitted reading
    pub fn last_emit_ms(&self) -> Option<u32> {
        self.last_emit_ms
    }

    /// Decode a frame received at `now_ms`
    ///
    /// The emit time only advances when a reading is actually returned.
    pub fn decode(&mut self, frame: &ValidatedFrame, now_ms: u32) -> Option<PeriodicReading> {
        let reading = decode_periodic(frame, now_ms, self.last_emit_ms, self.throttle_ms)?;
        self.last_emit_ms = Some(now_ms);
        Some(reading)
    }
}
