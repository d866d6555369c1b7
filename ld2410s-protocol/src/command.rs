//! Command opcodes and command frame encoding
//!
//! Command frame format:
//! - HEADER (4 bytes): `FD FC FB FA`
//! - LENGTH (2 bytes, LE): opcode field + payload length
//! - OPCODE (2 bytes, LE)
//! - PAYLOAD (0-67 bytes): opcode-specific data
//! - FOOTER (4 bytes): `04 03 02 01`

use heapless::Vec;

use crate::frame::{FrameError, CMD_FRAME_FOOTER, CMD_FRAME_HEADER, MAX_FRAME_LEN, SENTINEL_LEN};

/// LD2410S command words
pub mod opcode {
    /// Read firmware version
    pub const GET_FIRMWARE_VERSION: u16 = 0x00;
    /// Write serial number
    pub const SET_SERIAL_NUMBER: u16 = 0x10;
    /// Read serial number
    pub const GET_SERIAL_NUMBER: u16 = 0x11;
    /// Write common parameters (distances, timeout, report rates)
    pub const SET_COMMON_PARAMETERS: u16 = 0x70;
    /// Read common parameters
    pub const GET_COMMON_PARAMETERS: u16 = 0x71;
    /// Write per-gate trigger threshold
    pub const SET_TRIGGER_GATE_THRESHOLD: u16 = 0x72;
    /// Read per-gate trigger threshold
    pub const GET_TRIGGER_GATE_THRESHOLD: u16 = 0x73;
    /// Write per-gate hold (still) threshold
    pub const SET_STILL_GATE_THRESHOLD: u16 = 0x76;
    /// Read per-gate hold (still) threshold
    pub const GET_STILL_GATE_THRESHOLD: u16 = 0x77;
    /// Switch between minimal and standard report frames
    pub const SET_REPORT_MODE: u16 = 0x7A;
    /// Leave configuration mode
    pub const DISABLE_CONFIG: u16 = 0xFE;
    /// Enter configuration mode
    pub const ENABLE_CONFIG: u16 = 0xFF;
}

/// Bytes a command frame adds around its payload
pub const COMMAND_OVERHEAD: usize = 2 * SENTINEL_LEN + 2 + 2;

/// Largest payload that still fits the receive buffer once echoed back
pub const MAX_COMMAND_PAYLOAD: usize = MAX_FRAME_LEN - COMMAND_OVERHEAD;

/// Largest encoded command frame
pub const MAX_COMMAND_FRAME_LEN: usize = MAX_FRAME_LEN;

/// Enable-config payload: protocol value `0x0001`, little-endian
const ENABLE_CONFIG_VALUE: [u8; 2] = [0x01, 0x00];

/// Known command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    EnableConfig,
    DisableConfig,
    SetReportMode,
    GetFirmwareVersion,
    SetSerialNumber,
    GetSerialNumber,
    SetCommonParameters,
    GetCommonParameters,
    SetTriggerGateThreshold,
    GetTriggerGateThreshold,
    SetStillGateThreshold,
    GetStillGateThreshold,
    /// Opcode outside the known set, kept for forward compatibility
    Unknown(u16),
}

impl Opcode {
    /// Parse an opcode from its wire value
    pub fn from_code(code: u16) -> Self {
        match code {
            opcode::ENABLE_CONFIG => Opcode::EnableConfig,
            opcode::DISABLE_CONFIG => Opcode::DisableConfig,
            opcode::SET_REPORT_MODE => Opcode::SetReportMode,
            opcode::GET_FIRMWARE_VERSION => Opcode::GetFirmwareVersion,
            opcode::SET_SERIAL_NUMBER => Opcode::SetSerialNumber,
            opcode::GET_SERIAL_NUMBER => Opcode::GetSerialNumber,
            opcode::SET_COMMON_PARAMETERS => Opcode::SetCommonParameters,
            opcode::GET_COMMON_PARAMETERS => Opcode::GetCommonParameters,
            opcode::SET_TRIGGER_GATE_THRESHOLD => Opcode::SetTriggerGateThreshold,
            opcode::GET_TRIGGER_GATE_THRESHOLD => Opcode::GetTriggerGateThreshold,
            opcode::SET_STILL_GATE_THRESHOLD => Opcode::SetStillGateThreshold,
            opcode::GET_STILL_GATE_THRESHOLD => Opcode::GetStillGateThreshold,
            other => Opcode::Unknown(other),
        }
    }

    /// Convert to wire value
    pub fn code(self) -> u16 {
        match self {
            Opcode::EnableConfig => opcode::ENABLE_CONFIG,
            Opcode::DisableConfig => opcode::DISABLE_CONFIG,
            Opcode::SetReportMode => opcode::SET_REPORT_MODE,
            Opcode::GetFirmwareVersion => opcode::GET_FIRMWARE_VERSION,
            Opcode::SetSerialNumber => opcode::SET_SERIAL_NUMBER,
            Opcode::GetSerialNumber => opcode::GET_SERIAL_NUMBER,
            Opcode::SetCommonParameters => opcode::SET_COMMON_PARAMETERS,
            Opcode::GetCommonParameters => opcode::GET_COMMON_PARAMETERS,
            Opcode::SetTriggerGateThreshold => opcode::SET_TRIGGER_GATE_THRESHOLD,
            Opcode::GetTriggerGateThreshold => opcode::GET_TRIGGER_GATE_THRESHOLD,
            Opcode::SetStillGateThreshold => opcode::SET_STILL_GATE_THRESHOLD,
            Opcode::GetStillGateThreshold => opcode::GET_STILL_GATE_THRESHOLD,
            Opcode::Unknown(code) => code,
        }
    }

    /// Returns true for the two commands that switch configuration mode
    pub fn is_config_switch(self) -> bool {
        matches!(self, Opcode::EnableConfig | Opcode::DisableConfig)
    }

    /// Returns true if the radar only accepts this command in configuration mode
    pub fn requires_config_mode(self) -> bool {
        !self.is_config_switch()
    }

    /// Returns true if an ack carrying `acked` answers this command
    ///
    /// Acks echo only the low byte of the opcode.
    pub fn is_acked_by(self, acked: Opcode) -> bool {
        self.code() & 0x00FF == acked.code()
    }
}

/// Encode a command frame into `buffer`
///
/// Returns the number of bytes written.
pub fn encode(opcode: u16, payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if payload.len() > MAX_COMMAND_PAYLOAD {
        return Err(FrameError::PayloadTooLarge);
    }
    let frame_len = COMMAND_OVERHEAD + payload.len();
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    // Length covers the opcode field plus the payload
    let length = (2 + payload.len()) as u16;
    let payload_end = 8 + payload.len();

    buffer[..4].copy_from_slice(&CMD_FRAME_HEADER);
    buffer[4..6].copy_from_slice(&length.to_le_bytes());
    buffer[6..8].copy_from_slice(&opcode.to_le_bytes());
    buffer[8..payload_end].copy_from_slice(payload);
    buffer[payload_end..frame_len].copy_from_slice(&CMD_FRAME_FOOTER);

    Ok(frame_len)
}

/// A command waiting to be sent to the radar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command opcode
    pub opcode: Opcode,
    /// Payload data
    pub payload: Vec<u8, MAX_COMMAND_PAYLOAD>,
}

impl Command {
    /// Create a command with the given opcode and payload
    pub fn new(opcode: Opcode, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { opcode, payload })
    }

    /// Create a command with no payload
    pub fn empty(opcode: Opcode) -> Self {
        Self {
            opcode,
            payload: Vec::new(),
        }
    }

    /// Enter configuration mode
    pub fn enable_config() -> Self {
        Self {
            opcode: Opcode::EnableConfig,
            payload: Vec::from_slice(&ENABLE_CONFIG_VALUE).unwrap_or_default(),
        }
    }

    /// Leave configuration mode
    pub fn disable_config() -> Self {
        Self::empty(Opcode::DisableConfig)
    }

    /// Query the firmware version
    pub fn get_firmware_version() -> Self {
        Self::empty(Opcode::GetFirmwareVersion)
    }

    /// Query the serial number
    pub fn get_serial_number() -> Self {
        Self::empty(Opcode::GetSerialNumber)
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        encode(self.opcode.code(), &self.payload, buffer)
    }

    /// Encode this command into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_COMMAND_FRAME_LEN>, FrameError> {
        let mut buffer = [0u8; MAX_COMMAND_FRAME_LEN];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameBuffer, FrameKind};
    use crate::validate::validate;

    #[test]
    fn test_encode_enable_config() {
        let encoded = Command::enable_config().encode_to_vec().unwrap();
        assert_eq!(
            &encoded[..],
            &[0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xFF, 0x00, 0x01, 0x00, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn test_encode_disable_config() {
        let encoded = Command::disable_config().encode_to_vec().unwrap();
        assert_eq!(
            &encoded[..],
            &[0xFD, 0xFC, 0xFB, 0xFA, 0x02, 0x00, 0xFE, 0x00, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn test_encode_length_counts_opcode() {
        let command = Command::new(Opcode::SetCommonParameters, &[1, 2, 3, 4, 5, 6]).unwrap();
        let encoded = command.encode_to_vec().unwrap();
        assert_eq!(encoded.len(), COMMAND_OVERHEAD + 6);
        assert_eq!(u16::from_le_bytes([encoded[4], encoded[5]]), 8);
        assert_eq!(&encoded[8..14], &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buffer = [0u8; 8];
        assert_eq!(
            Command::get_firmware_version().encode(&mut buffer),
            Err(FrameError::BufferTooSmall)
        );
    }

    #[test]
    fn test_payload_too_large() {
        let payload = [0u8; MAX_COMMAND_PAYLOAD + 1];
        assert_eq!(
            Command::new(Opcode::SetSerialNumber, &payload),
            Err(FrameError::PayloadTooLarge)
        );
        let mut buffer = [0u8; 128];
        assert_eq!(
            encode(opcode::SET_SERIAL_NUMBER, &payload, &mut buffer),
            Err(FrameError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_largest_command_fits_frame_buffer() {
        let payload = [0x11u8; MAX_COMMAND_PAYLOAD];
        let encoded = Command::new(Opcode::SetSerialNumber, &payload)
            .unwrap()
            .encode_to_vec()
            .unwrap();

        let mut buffer = FrameBuffer::new();
        let mut frames = 0;
        for &byte in encoded.iter() {
            if let Ok(Some(frame)) = buffer.feed(byte) {
                assert_eq!(frame.len(), encoded.len());
                frames += 1;
            }
        }
        assert_eq!(frames, 1);
    }

    #[test]
    fn test_encoded_command_reparses_as_ack_frame() {
        for code in [opcode::GET_FIRMWARE_VERSION, opcode::SET_COMMON_PARAMETERS, opcode::ENABLE_CONFIG] {
            let command = Command::new(Opcode::from_code(code), &[0xAB, 0xCD]).unwrap();
            let encoded = command.encode_to_vec().unwrap();

            let mut buffer = FrameBuffer::new();
            let frame = encoded
                .iter()
                .find_map(|&b| buffer.feed(b).ok().flatten())
                .unwrap();

            assert_eq!(frame.kind(), FrameKind::CommandAck);
            let bytes = frame.as_bytes();
            assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), code);

            // An outgoing command has 0x00 where an ack carries its status
            assert_eq!(validate(frame), Err(FrameError::CommandFailed { opcode: code }));
        }
    }

    #[test]
    fn test_opcode_roundtrip() {
        let codes = [0x00, 0x10, 0x11, 0x70, 0x71, 0x72, 0x73, 0x76, 0x77, 0x7A, 0xFE, 0xFF];
        for code in codes {
            let parsed = Opcode::from_code(code);
            assert!(!matches!(parsed, Opcode::Unknown(_)));
            assert_eq!(parsed.code(), code);
        }
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(Opcode::from_code(0x61), Opcode::Unknown(0x61));
        assert_eq!(Opcode::Unknown(0x61).code(), 0x61);
    }

    #[test]
    fn test_config_mode_requirement() {
        assert!(!Opcode::EnableConfig.requires_config_mode());
        assert!(!Opcode::DisableConfig.requires_config_mode());
        assert!(Opcode::GetFirmwareVersion.requires_config_mode());
        assert!(Opcode::SetStillGateThreshold.requires_config_mode());
    }

    #[test]
    fn test_ack_correlation_uses_low_byte() {
        assert!(Opcode::GetSerialNumber.is_acked_by(Opcode::GetSerialNumber));
        assert!(!Opcode::GetSerialNumber.is_acked_by(Opcode::GetFirmwareVersion));
        assert!(Opcode::Unknown(0x0161).is_acked_by(Opcode::Unknown(0x61)));
    }
}
