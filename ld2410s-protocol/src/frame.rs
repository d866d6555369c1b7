//! Frame sentinels and byte-stream reassembly
//!
//! The radar gives no length-prefixed sync point that can be trusted from an
//! arbitrary starting position, so frames are delimited by their footers
//! alone: bytes accumulate until the last four equal one of the two footer
//! sentinels. Everything since the previous frame (or reset) is that frame.

use heapless::Vec;

/// Working buffer capacity in bytes
///
/// Larger than any frame the radar sends, with margin.
pub const FRAME_CAPACITY: usize = 80;

/// Longest frame the buffer can yield
///
/// One slot of the working buffer is never filled: the byte that would land
/// there triggers the overflow reset instead.
pub const MAX_FRAME_LEN: usize = FRAME_CAPACITY - 1;

/// Length of every header and footer sentinel
pub const SENTINEL_LEN: usize = 4;

/// Command and acknowledgement frame header
pub const CMD_FRAME_HEADER: [u8; SENTINEL_LEN] = [0xFD, 0xFC, 0xFB, 0xFA];
/// Command and acknowledgement frame footer
pub const CMD_FRAME_FOOTER: [u8; SENTINEL_LEN] = [0x04, 0x03, 0x02, 0x01];
/// Periodic report frame header
pub const DATA_FRAME_HEADER: [u8; SENTINEL_LEN] = [0xF4, 0xF3, 0xF2, 0xF1];
/// Periodic report frame footer
pub const DATA_FRAME_FOOTER: [u8; SENTINEL_LEN] = [0xF8, 0xF7, 0xF6, 0xF5];

/// Errors that can occur during frame reassembly, validation or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Frame shorter than the minimum for its kind
    TooShort,
    /// Header sentinel does not match the footer that closed the frame
    BadHeader,
    /// Radar reported a non-success status for this opcode
    CommandFailed {
        /// Opcode echoed in the failed acknowledgement
        opcode: u16,
    },
    /// Working buffer filled up without a footer; contents discarded
    BufferOverflow,
    /// Command payload does not fit in a frame
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Which of the two frame shapes a frame is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// Unsolicited target report
    Periodic,
    /// Reply to a command
    CommandAck,
}

impl FrameKind {
    /// Identify the frame kind from its last four bytes
    pub fn from_footer(tail: &[u8]) -> Option<Self> {
        if tail == DATA_FRAME_FOOTER {
            Some(FrameKind::Periodic)
        } else if tail == CMD_FRAME_FOOTER {
            Some(FrameKind::CommandAck)
        } else {
            None
        }
    }

    /// Header sentinel frames of this kind must start with
    pub fn header(self) -> &'static [u8; SENTINEL_LEN] {
        match self {
            FrameKind::Periodic => &DATA_FRAME_HEADER,
            FrameKind::CommandAck => &CMD_FRAME_HEADER,
        }
    }

    /// Footer sentinel that terminates frames of this kind
    pub fn footer(self) -> &'static [u8; SENTINEL_LEN] {
        match self {
            FrameKind::Periodic => &DATA_FRAME_FOOTER,
            FrameKind::CommandAck => &CMD_FRAME_FOOTER,
        }
    }
}

/// A complete, footer-terminated frame copied out of the working buffer
///
/// Nothing about the content has been checked yet; see
/// [`validate`](crate::validate::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    kind: FrameKind,
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl RawFrame {
    /// Build a frame from bytes already known to end in `kind`'s footer
    pub fn new(kind: FrameKind, bytes: &[u8]) -> Result<Self, FrameError> {
        let bytes = Vec::from_slice(bytes).map_err(|_| FrameError::BufferOverflow)?;
        Ok(Self { kind, bytes })
    }

    /// Frame kind, decided by the footer
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// All bytes of the frame, header and footer included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Frame length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-length frame (never produced by [`FrameBuffer`])
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Bounded reassembly buffer for the incoming byte stream
///
/// Bytes are fed one at a time. The buffer never grows past
/// [`FRAME_CAPACITY`] and never hands out a partial frame.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    buffer: Vec<u8, MAX_FRAME_LEN>,
}

impl FrameBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Discard everything accumulated so far
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes accumulated since the last frame or reset
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// True if nothing has accumulated since the last frame or reset
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` when this byte completed a footer,
    /// `Ok(None)` when more bytes are needed, or
    /// `Err(FrameError::BufferOverflow)` when the buffer was already full.
    /// On overflow the accumulated bytes and this byte are dropped and the
    /// buffer is left empty, ready for the next byte.
    pub fn feed(&mut self, byte: u8) -> Result<Option<RawFrame>, FrameError> {
        if self.buffer.len() >= MAX_FRAME_LEN {
            self.reset();
            return Err(FrameError::BufferOverflow);
        }

        // Cannot fail: length checked above
        let _ = self.buffer.push(byte);

        let len = self.buffer.len();
        if len < SENTINEL_LEN {
            return Ok(None);
        }

        match FrameKind::from_footer(&self.buffer[len - SENTINEL_LEN..]) {
            Some(kind) => {
                let frame = RawFrame {
                    kind,
                    bytes: self.buffer.clone(),
                };
                self.reset();
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feed_all(buffer: &mut FrameBuffer, bytes: &[u8]) -> std::vec::Vec<RawFrame> {
        let mut frames = std::vec::Vec::new();
        for &byte in bytes {
            if let Ok(Some(frame)) = buffer.feed(byte) {
                frames.push(frame);
            }
        }
        frames
    }

    #[test]
    fn test_periodic_frame_detected() {
        let bytes = [
            0xF4, 0xF3, 0xF2, 0xF1, 0x00, 0x00, 0x01, 0x12, 0x00, 0xF8, 0xF7, 0xF6, 0xF5,
        ];
        let mut buffer = FrameBuffer::new();
        let frames = feed_all(&mut buffer, &bytes);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind(), FrameKind::Periodic);
        assert_eq!(frames[0].as_bytes(), &bytes);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_ack_frame_detected() {
        let bytes = [
            0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xFF, 0x01, 0x00, 0x00, 0x04, 0x03, 0x02, 0x01,
        ];
        let mut buffer = FrameBuffer::new();
        let frames = feed_all(&mut buffer, &bytes);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind(), FrameKind::CommandAck);
        assert_eq!(frames[0].len(), bytes.len());
    }

    #[test]
    fn test_bare_footer_is_a_frame() {
        // Four bytes are enough; content is judged downstream
        let mut buffer = FrameBuffer::new();
        let frames = feed_all(&mut buffer, &CMD_FRAME_FOOTER);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 4);
    }

    #[test]
    fn test_short_input_never_matches() {
        let mut buffer = FrameBuffer::new();
        for &byte in &DATA_FRAME_FOOTER[1..] {
            assert_eq!(buffer.feed(byte), Ok(None));
        }
        assert_eq!(buffer.pending(), 3);
    }

    #[test]
    fn test_leading_garbage_kept_in_frame() {
        // Mid-frame start: the stray bytes end up in front of the first frame
        let mut data = std::vec![0x12, 0x34];
        data.extend_from_slice(&DATA_FRAME_HEADER);
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&DATA_FRAME_FOOTER);

        let mut buffer = FrameBuffer::new();
        let frames = feed_all(&mut buffer, &data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes()[0], 0x12);
    }

    #[test]
    fn test_overflow_resets() {
        let mut buffer = FrameBuffer::new();
        for _ in 0..MAX_FRAME_LEN {
            assert_eq!(buffer.feed(0x00), Ok(None));
        }
        assert_eq!(buffer.pending(), MAX_FRAME_LEN);

        assert_eq!(buffer.feed(0x00), Err(FrameError::BufferOverflow));
        assert!(buffer.is_empty());

        // Usable again straight away
        let frames = feed_all(&mut buffer, &CMD_FRAME_FOOTER);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_same_frame_twice_identical() {
        let bytes = [
            0xFD, 0xFC, 0xFB, 0xFA, 0x02, 0x00, 0x00, 0x01, 0x04, 0x03, 0x02, 0x01,
        ];
        let mut buffer = FrameBuffer::new();
        let first = feed_all(&mut buffer, &bytes);
        buffer.reset();
        let second = feed_all(&mut buffer, &bytes);
        assert_eq!(first, second);
    }

    #[test]
    fn test_back_to_back_frames_in_order() {
        let mut data = std::vec::Vec::new();
        data.extend_from_slice(&DATA_FRAME_HEADER);
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0x20, 0x00]);
        data.extend_from_slice(&DATA_FRAME_FOOTER);
        data.extend_from_slice(&CMD_FRAME_HEADER);
        data.extend_from_slice(&[0x02, 0x00, 0xFE, 0x01]);
        data.extend_from_slice(&CMD_FRAME_FOOTER);

        let mut buffer = FrameBuffer::new();
        let frames = feed_all(&mut buffer, &data);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].kind(), FrameKind::Periodic);
        assert_eq!(frames[1].kind(), FrameKind::CommandAck);
    }

    proptest! {
        #[test]
        fn prop_frame_iff_footer_at_tail(bytes in proptest::collection::vec(any::<u8>(), 0..400)) {
            let mut buffer = FrameBuffer::new();
            let mut model: std::vec::Vec<u8> = std::vec::Vec::new();

            for byte in bytes {
                let result = buffer.feed(byte);

                if model.len() >= MAX_FRAME_LEN {
                    model.clear();
                    prop_assert_eq!(result, Err(FrameError::BufferOverflow));
                    continue;
                }

                model.push(byte);
                let tail_matches = model.len() >= SENTINEL_LEN
                    && FrameKind::from_footer(&model[model.len() - SENTINEL_LEN..]).is_some();

                match result {
                    Ok(Some(frame)) => {
                        prop_assert!(tail_matches);
                        prop_assert_eq!(frame.as_bytes(), &model[..]);
                        model.clear();
                    }
                    Ok(None) => prop_assert!(!tail_matches),
                    Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                }
                prop_assert_eq!(buffer.pending(), model.len());
            }
        }

        #[test]
        fn prop_noise_never_exceeds_capacity(bytes in proptest::collection::vec(0x05u8..0xF0, 0..1000)) {
            // No footer can form from bytes in this range
            let mut buffer = FrameBuffer::new();
            for byte in bytes {
                let result = buffer.feed(byte);
                prop_assert!(matches!(result, Ok(None) | Err(FrameError::BufferOverflow)));
                prop_assert!(buffer.pending() <= MAX_FRAME_LEN);
            }
        }
    }
}
