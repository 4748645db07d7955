//! Checked byte cursor and record framing primitives.
//!
//! Decoding never indexes the input directly; every read goes through
//! [`Reader`], which tracks its absolute position within the message body
//! so diagnostics can point at the exact spot the input ran dry.

use bytes::BufMut;

use crate::constants::TAG_SIZE;
use crate::error::{DecodeError, FieldPath};

/// A failed read: the cursor needed more bytes than were left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ShortRead {
    /// Absolute offset of the read within the message body.
    pub offset: usize,
    /// Bytes the read required.
    pub needed: usize,
    /// Bytes that were left.
    pub available: usize,
}

impl ShortRead {
    /// Attach a field path, producing the decode error callers report.
    pub fn at(self, path: &FieldPath) -> DecodeError {
        DecodeError::TruncatedInput {
            path: path.clone(),
            offset: self.offset,
            needed: self.needed,
            available: self.available,
        }
    }
}

/// Reading cursor over a borrowed buffer.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    base: usize,
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Cursor over a whole message body.
    pub fn new(buf: &'a [u8]) -> Self {
        Reader {
            buf,
            base: 0,
            pos: 0,
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Take the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ShortRead> {
        if self.remaining() < n {
            return Err(ShortRead {
                offset: self.offset(),
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Split off the next `n` bytes as a sub-cursor. The sub-cursor keeps
    /// reporting absolute offsets within the enclosing message body.
    pub fn sub(&mut self, n: usize) -> Result<Reader<'a>, ShortRead> {
        let base = self.offset();
        let bytes = self.take(n)?;
        Ok(Reader {
            buf: bytes,
            base,
            pos: 0,
        })
    }

    pub fn take_u8(&mut self) -> Result<u8, ShortRead> {
        Ok(self.take(1)?[0])
    }

    pub fn take_u16_le(&mut self) -> Result<u16, ShortRead> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn take_u32_le(&mut self) -> Result<u32, ShortRead> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn take_u64_le(&mut self) -> Result<u64, ShortRead> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Record lengths travel big-endian, unlike scalar payloads.
    pub fn take_u16_be(&mut self) -> Result<u16, ShortRead> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Append a record header with a placeholder length, returning the offset
/// the record starts at.
pub(crate) fn put_record_header(out: &mut Vec<u8>, tag: u8) -> usize {
    let start = out.len();
    out.put_u8(tag);
    out.put_u16(0);
    start
}

/// Patch the length of the record opened at `start` once its payload size
/// is known. Payload sizes were bounded at registry build, so the length
/// always fits the 16-bit header.
pub(crate) fn patch_record_len(out: &mut [u8], start: usize, payload_len: usize) {
    let bytes = (payload_len as u16).to_be_bytes();
    out[start + TAG_SIZE] = bytes[0];
    out[start + TAG_SIZE + 1] = bytes[1];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_and_reports_short_reads() {
        let data = [0x01, 0x02, 0x03];
        let mut r = Reader::new(&data);

        assert_eq!(r.take(2).unwrap(), &[0x01, 0x02]);
        assert_eq!(r.offset(), 2);
        assert_eq!(r.remaining(), 1);

        let short = r.take(2).unwrap_err();
        assert_eq!(
            short,
            ShortRead {
                offset: 2,
                needed: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn test_scalars_are_little_endian() {
        let data = [0x2A, 0x00, 0x00, 0x00, 0x34, 0x12];
        let mut r = Reader::new(&data);
        assert_eq!(r.take_u32_le().unwrap(), 42);
        assert_eq!(r.take_u16_le().unwrap(), 0x1234);
    }

    #[test]
    fn test_record_length_is_big_endian() {
        let data = [0x00, 0x04];
        let mut r = Reader::new(&data);
        assert_eq!(r.take_u16_be().unwrap(), 4);
    }

    #[test]
    fn test_sub_cursor_keeps_absolute_offsets() {
        let data = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE];
        let mut r = Reader::new(&data);
        r.take(2).unwrap();

        let mut sub = r.sub(2).unwrap();
        assert_eq!(sub.offset(), 2);
        sub.take_u8().unwrap();
        assert_eq!(sub.offset(), 3);
        assert_eq!(sub.remaining(), 1);

        // parent cursor skipped past the sub-extent
        assert_eq!(r.offset(), 4);
        assert_eq!(r.remaining(), 1);
    }

    #[test]
    fn test_record_header_roundtrip() {
        let mut out = Vec::new();
        out.extend_from_slice(&[0xFF, 0xFF]);
        let start = put_record_header(&mut out, 0x10);
        assert_eq!(start, 2);
        out.extend_from_slice(b"hi");
        patch_record_len(&mut out, start, 2);
        assert_eq!(&out[2..], &[0x10, 0x00, 0x02, b'h', b'i']);
    }
}
