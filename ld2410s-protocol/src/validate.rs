//! Frame classification and validation
//!
//! A [`RawFrame`] only guarantees its footer. Validation checks what the
//! downstream decoders rely on: a minimum length, the header that belongs
//! with the footer and, for acknowledgements, the status byte.
//!
//! A frame failing validation is dropped on its own; it never stalls the
//! stream or asks the radar for a retransmission.

use crate::frame::{FrameError, FrameKind, RawFrame, SENTINEL_LEN};

/// Shortest acknowledgement that can carry an opcode and status
pub const ACK_MIN_LEN: usize = 10;

/// Shortest periodic frame body (bytes between header and footer)
pub const PERIODIC_MIN_BODY_LEN: usize = 5;

/// Offset of the echoed opcode in an acknowledgement
pub const ACK_OPCODE_OFFSET: usize = 6;

/// Offset of the status byte in an acknowledgement
pub const ACK_STATUS_OFFSET: usize = 7;

/// Status byte value for a successful command
pub const ACK_STATUS_SUCCESS: u8 = 0x01;

/// A frame that passed validation for its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFrame {
    raw: RawFrame,
}

impl ValidatedFrame {
    /// Frame kind
    pub fn kind(&self) -> FrameKind {
        self.raw.kind()
    }

    /// All bytes of the frame, header and footer included
    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    /// Bytes between the header and footer sentinels
    pub fn body(&self) -> &[u8] {
        let bytes = self.raw.as_bytes();
        &bytes[SENTINEL_LEN..bytes.len() - SENTINEL_LEN]
    }

    /// Opcode echoed by an acknowledgement, `None` for periodic frames
    pub fn opcode(&self) -> Option<u16> {
        match self.kind() {
            FrameKind::CommandAck => Some(ack_opcode(self.as_bytes())),
            FrameKind::Periodic => None,
        }
    }

    /// Give back the underlying raw frame
    pub fn into_raw(self) -> RawFrame {
        self.raw
    }
}

/// Opcode byte of an acknowledgement of at least [`ACK_MIN_LEN`] bytes
///
/// The radar echoes the command word with bit 8 set, so only the low byte
/// identifies the command; the high byte is the status.
fn ack_opcode(bytes: &[u8]) -> u16 {
    u16::from(bytes[ACK_OPCODE_OFFSET])
}

/// Validate a raw frame according to its kind
///
/// - Acknowledgement: at least [`ACK_MIN_LEN`] bytes (`TooShort`), starts
///   with the command header (`BadHeader`), status byte is success
///   (`CommandFailed`).
/// - Periodic: body of at least [`PERIODIC_MIN_BODY_LEN`] bytes
///   (`TooShort`), starts with the data header (`BadHeader`).
pub fn validate(raw: RawFrame) -> Result<ValidatedFrame, FrameError> {
    let bytes = raw.as_bytes();
    let kind = raw.kind();

    match kind {
        FrameKind::CommandAck => {
            if bytes.len() < ACK_MIN_LEN {
                return Err(FrameError::TooShort);
            }
            if !bytes.starts_with(kind.header()) {
                return Err(FrameError::BadHeader);
            }
            if bytes[ACK_STATUS_OFFSET] != ACK_STATUS_SUCCESS {
                return Err(FrameError::CommandFailed {
                    opcode: ack_opcode(bytes),
                });
            }
        }
        FrameKind::Periodic => {
            if bytes.len() < 2 * SENTINEL_LEN + PERIODIC_MIN_BODY_LEN {
                return Err(FrameError::TooShort);
            }
            if !bytes.starts_with(kind.header()) {
                return Err(FrameError::BadHeader);
            }
        }
    }

    Ok(ValidatedFrame { raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{CMD_FRAME_FOOTER, CMD_FRAME_HEADER, DATA_FRAME_FOOTER, DATA_FRAME_HEADER};

    fn frame(kind: FrameKind, parts: &[&[u8]]) -> RawFrame {
        let mut bytes = std::vec::Vec::new();
        for part in parts {
            bytes.extend_from_slice(part);
        }
        RawFrame::new(kind, &bytes).unwrap()
    }

    #[test]
    fn test_valid_ack() {
        let raw = frame(
            FrameKind::CommandAck,
            &[&CMD_FRAME_HEADER, &[0x04, 0x00, 0xFF, 0x01, 0x00, 0x00], &CMD_FRAME_FOOTER],
        );
        let validated = validate(raw).unwrap();
        assert_eq!(validated.kind(), FrameKind::CommandAck);
        assert_eq!(validated.opcode(), Some(0xFF));
        assert_eq!(validated.body(), &[0x04, 0x00, 0xFF, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_ack_too_short() {
        let raw = frame(FrameKind::CommandAck, &[&[0xFD, 0xFC], &CMD_FRAME_FOOTER]);
        assert_eq!(validate(raw), Err(FrameError::TooShort));
    }

    #[test]
    fn test_ack_bad_header() {
        let raw = frame(
            FrameKind::CommandAck,
            &[&[0xFD, 0xFC, 0xFB, 0x00], &[0x02, 0x00, 0xFE, 0x01], &CMD_FRAME_FOOTER],
        );
        assert_eq!(validate(raw), Err(FrameError::BadHeader));
    }

    #[test]
    fn test_ack_failed_status() {
        let raw = frame(
            FrameKind::CommandAck,
            &[&CMD_FRAME_HEADER, &[0x02, 0x00, 0x70, 0x00], &CMD_FRAME_FOOTER],
        );
        assert_eq!(
            validate(raw),
            Err(FrameError::CommandFailed { opcode: 0x70 })
        );
    }

    #[test]
    fn test_valid_periodic() {
        let raw = frame(
            FrameKind::Periodic,
            &[&DATA_FRAME_HEADER, &[0x00, 0x00, 0x01, 0x12, 0x00], &DATA_FRAME_FOOTER],
        );
        let validated = validate(raw).unwrap();
        assert_eq!(validated.body(), &[0x00, 0x00, 0x01, 0x12, 0x00]);
        assert_eq!(validated.opcode(), None);
    }

    #[test]
    fn test_periodic_too_short() {
        let raw = frame(
            FrameKind::Periodic,
            &[&DATA_FRAME_HEADER, &[0x00, 0x01], &DATA_FRAME_FOOTER],
        );
        assert_eq!(validate(raw), Err(FrameError::TooShort));
    }

    #[test]
    fn test_periodic_missing_header() {
        // Stream joined mid-frame: tail of a report without its header
        let raw = frame(
            FrameKind::Periodic,
            &[&[0x00, 0x00, 0x00, 0x01, 0x12, 0x00, 0x00, 0x00, 0x00], &DATA_FRAME_FOOTER],
        );
        assert_eq!(validate(raw), Err(FrameError::BadHeader));
    }
}
