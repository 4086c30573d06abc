//! Fixed-length HID output reports.
//!
//! Lighting commands use two report formats:
//! - Long reports: 20 bytes (report ID 0x11)
//! - Very long reports: 64 bytes (report ID 0x12), used for per-key
//!   group writes that carry up to 14 key entries
//!
//! Every frame is zero-padded to its full length before it is sent.

/// Report ID for 20-byte messages.
pub const LONG_REPORT_ID: u8 = 0x11;
/// Report ID for 64-byte messages.
pub const VERY_LONG_REPORT_ID: u8 = 0x12;

/// Long report length (including report ID).
pub const LONG_REPORT_LEN: usize = 20;
/// Very long report length (including report ID).
pub const VERY_LONG_REPORT_LEN: usize = 64;

/// One output report, always exactly `len()` bytes long.
///
/// Bytes are appended with [`Frame::push`]; unused trailing bytes stay
/// zero. Writing past the end is an encoder bug and panics.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
    cursor: usize,
}

impl Frame {
    /// A zeroed frame of `len` bytes starting with `header`.
    pub fn new(header: &[u8], len: usize) -> Self {
        let mut frame = Self {
            bytes: vec![0u8; len],
            cursor: 0,
        };
        frame.extend(header);
        frame
    }

    /// A 20-byte frame starting with `header`.
    pub fn long(header: &[u8]) -> Self {
        Self::new(header, LONG_REPORT_LEN)
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) {
        assert!(
            self.cursor < self.bytes.len(),
            "frame overflow: {} byte report already full",
            self.bytes.len()
        );
        self.bytes[self.cursor] = byte;
        self.cursor += 1;
    }

    /// Append several bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    /// Overwrite a byte that was already written or is padding.
    pub fn set(&mut self, index: usize, byte: u8) {
        self.bytes[index] = byte;
        self.cursor = self.cursor.max(index + 1);
    }

    /// Number of bytes still available before the frame is full.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Number of bytes written so far (header included).
    pub fn written(&self) -> usize {
        self.cursor
    }

    pub fn report_id(&self) -> u8 {
        self.bytes[0]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({:02X?})", self.bytes)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_frame_is_padded() {
        let frame = Frame::long(&[LONG_REPORT_ID, 0xFF, 0x0C, 0x5A]);
        assert_eq!(frame.len(), LONG_REPORT_LEN);
        assert_eq!(frame.report_id(), LONG_REPORT_ID);
        assert_eq!(&frame.as_bytes()[..4], &[0x11, 0xFF, 0x0C, 0x5A]);
        assert!(frame.as_bytes()[4..].iter().all(|&b| b == 0));
        assert_eq!(frame.written(), 4);
        assert_eq!(frame.remaining(), 16);
    }

    #[test]
    fn very_long_frame_keeps_length() {
        let mut frame = Frame::new(&[VERY_LONG_REPORT_ID], VERY_LONG_REPORT_LEN);
        frame.extend(&[1, 2, 3]);
        assert_eq!(frame.len(), VERY_LONG_REPORT_LEN);
        assert_eq!(&frame.as_bytes()[..4], &[0x12, 1, 2, 3]);
    }

    #[test]
    fn set_overwrites_and_advances_cursor() {
        let mut frame = Frame::long(&[LONG_REPORT_ID, 0x01]);
        frame.set(1, 0xFF);
        frame.set(10, 0x64);
        assert_eq!(frame.as_bytes()[1], 0xFF);
        assert_eq!(frame.as_bytes()[10], 0x64);
        assert_eq!(frame.written(), 11);
    }

    #[test]
    fn frame_can_be_filled_exactly() {
        let mut frame = Frame::long(&[LONG_REPORT_ID]);
        for i in 1..LONG_REPORT_LEN {
            frame.push(i as u8);
        }
        assert_eq!(frame.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "frame overflow")]
    fn pushing_past_the_end_panics() {
        let mut frame = Frame::long(&[0u8; LONG_REPORT_LEN]);
        frame.push(0x00);
    }
}
