//! ScreenLogic frame header
//!
//! Every framed message starts with the same 8 byte header.

use super::{Error, HEADER_SIZE, MAX_BODY_SIZE, MessageCode, Result};

/// Frame header (8 bytes)
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        Sequence (2)           |         Type Code (2)         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Body Length (4)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// All fields are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    sequence: u16,
    code: u16,
    body_len: u32,
}

impl FrameHeader {
    /// Create a new frame header
    #[must_use]
    pub const fn new(sequence: u16, code: u16, body_len: u32) -> Self {
        Self {
            sequence,
            code,
            body_len,
        }
    }

    /// Get sequence number
    #[must_use]
    pub const fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Get raw type code
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Get type code as a known message code
    #[must_use]
    pub fn message_code(&self) -> Option<MessageCode> {
        MessageCode::from_u16(self.code)
    }

    /// Get body length
    #[must_use]
    pub const fn body_len(&self) -> u32 {
        self.body_len
    }

    /// Reject body lengths no gateway would ever send.
    pub fn validate(&self) -> Result<()> {
        if self.body_len as usize > MAX_BODY_SIZE {
            return Err(Error::Framing(format!(
                "body length {} exceeds {MAX_BODY_SIZE}",
                self.body_len
            )));
        }
        Ok(())
    }

    /// Convert to bytes (little-endian)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        bytes[0..2].copy_from_slice(&self.sequence.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.code.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.body_len.to_le_bytes());

        bytes
    }

    /// Parse from bytes (little-endian)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::Truncated {
                needed: HEADER_SIZE,
                remaining: bytes.len(),
            });
        }

        let header = Self {
            sequence: u16::from_le_bytes([bytes[0], bytes[1]]),
            code: u16::from_le_bytes([bytes[2], bytes[3]]),
            body_len: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        };

        header.validate()?;
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = FrameHeader::new(0x0102, 12526, 4);
        let bytes = header.to_bytes();

        assert_eq!(bytes, [0x02, 0x01, 0xEE, 0x30, 0x04, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = FrameHeader::new(7, MessageCode::PoolStatus.as_u16(), 123);
        let decoded = FrameHeader::from_bytes(&header.to_bytes()).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(decoded.message_code(), Some(MessageCode::PoolStatus));
    }

    #[test]
    fn test_short_header() {
        let result = FrameHeader::from_bytes(&[0u8; 7]);
        assert!(matches!(
            result,
            Err(Error::Truncated {
                needed: 8,
                remaining: 7
            })
        ));
    }

    #[test]
    fn test_oversized_body_rejected() {
        let header = FrameHeader::new(1, 15, u32::MAX);
        let result = FrameHeader::from_bytes(&header.to_bytes());
        assert!(matches!(result, Err(Error::Framing(_))));
    }
}
