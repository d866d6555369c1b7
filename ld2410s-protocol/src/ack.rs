//! Acknowledgement decoding
//!
//! Every command is answered by an acknowledgement frame echoing its
//! opcode. Most acknowledgements carry nothing beyond the status; the
//! firmware-version and serial-number queries carry a result payload at
//! fixed offsets:
//!
//! ```text
//! offset: 0..4    4..6  6     7       8..10   10..12  12..14  ...
//! version: HEADER LEN  0x00  STATUS  MAJOR   MINOR   PATCH   FOOTER
//! serial:  HEADER LEN  0x11  STATUS  ACK     SN_LEN  SN bytes... FOOTER
//! ```

use core::fmt::{self, Write};

use heapless::String;

use crate::command::Opcode;
use crate::frame::{FrameError, FrameKind, MAX_FRAME_LEN, SENTINEL_LEN};
use crate::validate::ValidatedFrame;

/// Firmware version field offsets (major, minor, patch), each `u16` LE
const VERSION_OFFSETS: [usize; 3] = [8, 10, 12];

/// Serial number length field offset (`u16` LE)
const SERIAL_LEN_OFFSET: usize = 10;

/// First serial number byte
const SERIAL_OFFSET: usize = 12;

/// Longest formatted version string ("v65535.65535.65535")
pub const MAX_VERSION_LEN: usize = 18;

/// Longest serial number an acknowledgement can carry, in bytes
pub const MAX_SERIAL_LEN: usize = MAX_FRAME_LEN - SERIAL_OFFSET - SENTINEL_LEN;

/// Serial number text capacity; bytes above 0x7F take two bytes as UTF-8
pub const MAX_SERIAL_TEXT_LEN: usize = 2 * MAX_SERIAL_LEN;

/// Radar firmware version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl FirmwareVersion {
    /// Format as `v<major>.<minor>.<patch>`
    pub fn to_text(&self) -> String<MAX_VERSION_LEN> {
        let mut text = String::new();
        // Cannot overflow: three u16 fields fit MAX_VERSION_LEN
        let _ = write!(text, "{}", self);
        text
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Result payload carried by an acknowledgement
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckPayload {
    /// Acknowledged by status alone
    None,
    /// Answer to the firmware version query
    FirmwareVersion(FirmwareVersion),
    /// Answer to the serial number query
    SerialNumber(String<MAX_SERIAL_TEXT_LEN>),
}

/// A decoded, successful acknowledgement
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandAck {
    /// Opcode of the command being acknowledged
    pub opcode: Opcode,
    /// Opcode-specific result
    pub payload: AckPayload,
}

impl CommandAck {
    /// Decode an acknowledgement from a validated frame
    ///
    /// Unknown opcodes decode to an empty payload rather than an error so
    /// newer radar firmware does not break the driver.
    pub fn from_frame(frame: &ValidatedFrame) -> Result<Self, FrameError> {
        let code = match (frame.kind(), frame.opcode()) {
            (FrameKind::CommandAck, Some(code)) => code,
            _ => return Err(FrameError::BadHeader),
        };
        let opcode = Opcode::from_code(code);
        let bytes = frame.as_bytes();

        let payload = match opcode {
            Opcode::GetFirmwareVersion => AckPayload::FirmwareVersion(parse_version(bytes)?),
            Opcode::GetSerialNumber => AckPayload::SerialNumber(parse_serial(bytes)?),
            _ => AckPayload::None,
        };

        Ok(Self { opcode, payload })
    }
}

/// Decode an acknowledgement (see [`CommandAck::from_frame`])
pub fn decode_ack(frame: &ValidatedFrame) -> Result<CommandAck, FrameError> {
    CommandAck::from_frame(frame)
}

/// Read a little-endian `u16` that must end before the footer
fn read_u16(bytes: &[u8], offset: usize) -> Result<u16, FrameError> {
    if offset + 2 > bytes.len() - SENTINEL_LEN {
        return Err(FrameError::TooShort);
    }
    Ok(u16::from_le_bytes([bytes[offset], bytes[offset + 1]]))
}

fn parse_version(bytes: &[u8]) -> Result<FirmwareVersion, FrameError> {
    let [major, minor, patch] = VERSION_OFFSETS;
    Ok(FirmwareVersion {
        major: read_u16(bytes, major)?,
        minor: read_u16(bytes, minor)?,
        patch: read_u16(bytes, patch)?,
    })
}

fn parse_serial(bytes: &[u8]) -> Result<String<MAX_SERIAL_TEXT_LEN>, FrameError> {
    let len = usize::from(read_u16(bytes, SERIAL_LEN_OFFSET)?);
    let end = SERIAL_OFFSET + len;
    if end > bytes.len() - SENTINEL_LEN {
        return Err(FrameError::TooShort);
    }

    let mut serial = String::new();
    for &byte in &bytes[SERIAL_OFFSET..end] {
        // Bytes map one-to-one onto chars so odd values never fail the decode
        serial
            .push(char::from(byte))
            .map_err(|_| FrameError::PayloadTooLarge)?;
    }
    Ok(serial)
}
