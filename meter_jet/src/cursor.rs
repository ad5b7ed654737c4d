use std::io;
use std::ops::{Deref, DerefMut};

use leb::{self, ReadLEB};

use crate::parser::DecodeError;

/// A read position over a borrowed input buffer. Every read advances the
/// cursor; reading past the end fails with `UnexpectedEndOfInput`.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> ReadCursor<'a> {
        ReadCursor { buffer, position: 0 }
    }

    pub fn read(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.position.checked_add(n)
            .filter(|end| *end <= self.buffer.len())
            .ok_or(DecodeError::UnexpectedEndOfInput)?;
        let bytes = &self.buffer[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek(0).ok_or(DecodeError::UnexpectedEndOfInput)?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read(N)?);
        Ok(array)
    }

    pub fn read_string(&mut self, n: usize) -> Result<String, DecodeError> {
        let bytes = self.read(n)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// A cursor over the next `n` bytes, which are consumed from this one.
    pub fn sub_cursor(&mut self, n: usize) -> Result<ReadCursor<'a>, DecodeError> {
        self.read(n).map(ReadCursor::new)
    }

    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.position.checked_add(offset).and_then(|i| self.buffer.get(i)).copied()
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.buffer.len()
    }

    pub fn bytes_read(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn read_varuint32(&mut self) -> Result<u32, DecodeError> {
        Ok(self.read_varuint(32)? as u32)
    }

    pub fn read_varint32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_varint(32)? as i32)
    }

    pub fn read_varint64(&mut self) -> Result<i64, DecodeError> {
        Ok(self.read_varint(64)?)
    }
}

impl<'a> io::Read for ReadCursor<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.buffer[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

/// A growable output buffer.
#[derive(Debug, Default)]
pub struct WriteCursor {
    buffer: Vec<u8>,
}

impl WriteCursor {
    pub fn new() -> WriteCursor {
        WriteCursor::default()
    }

    pub fn with_capacity(capacity: usize) -> WriteCursor {
        WriteCursor { buffer: Vec::with_capacity(capacity) }
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes the raw UTF-8 bytes, without a length prefix.
    pub fn write_string(&mut self, string: &str) {
        self.write_bytes(string.as_bytes());
    }

    pub fn write_varuint(&mut self, value: u64) -> usize {
        leb::push_unsigned(&mut self.buffer, value)
    }

    pub fn write_varint(&mut self, value: i64) -> usize {
        leb::push_signed(&mut self.buffer, value)
    }

    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    /// Opens a writer for a length-prefixed payload. The payload starts
    /// `extra_offset` bytes ahead of the current position, leaving room for
    /// the prefix, which `Subregion::finish` fills in once the length is known.
    pub fn reserve_subregion(&mut self, extra_offset: usize) -> Subregion {
        let start = self.buffer.len();
        self.buffer.resize(start + extra_offset, 0);
        Subregion {
            cursor: self,
            start,
            reserved: extra_offset,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl io::Write for WriteCursor {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The payload side of `WriteCursor::reserve_subregion`. Writes through it land
/// in the parent buffer; it derefs to the parent so subregions can nest.
pub struct Subregion<'c> {
    cursor: &'c mut WriteCursor,
    start: usize,
    reserved: usize,
}

impl<'c> Subregion<'c> {
    /// Bytes written into the payload so far.
    pub fn payload_len(&self) -> usize {
        self.cursor.buffer.len() - self.start - self.reserved
    }

    /// Writes the payload length as a varuint in front of the payload and
    /// returns the payload length. The reserved gap shrinks or grows to the
    /// width of the prefix.
    pub fn finish(self) -> usize {
        let length = self.payload_len();
        let prefix = leb::encode_unsigned(length as u64);
        self.cursor.buffer
            .splice(self.start..self.start + self.reserved, prefix)
            .for_each(drop);
        length
    }
}

impl<'c> Deref for Subregion<'c> {
    type Target = WriteCursor;

    fn deref(&self) -> &WriteCursor {
        &*self.cursor
    }
}

impl<'c> DerefMut for Subregion<'c> {
    fn deref_mut(&mut self) -> &mut WriteCursor {
        &mut *self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance() {
        let bytes = [1u8, 2, 3, 4, 5, 6];
        let mut cursor = ReadCursor::new(&bytes);
        assert_eq!(cursor.read_byte().unwrap(), 1);
        assert_eq!(cursor.peek(0), Some(2));
        assert_eq!(cursor.read_array::<2>().unwrap(), [2, 3]);
        assert_eq!(cursor.bytes_read(), 3);
        assert_eq!(cursor.read(3).unwrap(), &[4, 5, 6]);
        assert!(cursor.at_end());
        assert_eq!(cursor.peek(0), None);
        assert_eq!(cursor.peek(usize::MAX), None);
    }

    #[test]
    fn reading_past_the_end_fails() {
        let bytes = [1u8, 2];
        let mut cursor = ReadCursor::new(&bytes);
        assert!(matches!(cursor.read(3), Err(DecodeError::UnexpectedEndOfInput)));
        // a failed read does not move the cursor
        assert_eq!(cursor.bytes_read(), 0);
        cursor.read(2).unwrap();
        assert!(matches!(cursor.read_byte(), Err(DecodeError::UnexpectedEndOfInput)));
        assert!(matches!(cursor.read_varuint32(), Err(DecodeError::UnexpectedEndOfInput)));
    }

    #[test]
    fn reads_strings_and_varints() {
        let bytes = [0xAC, 0x02, 0x7f, b'h', b'i'];
        let mut cursor = ReadCursor::new(&bytes);
        assert_eq!(cursor.read_varuint32().unwrap(), 300);
        assert_eq!(cursor.read_varint32().unwrap(), -1);
        assert_eq!(cursor.read_string(2).unwrap(), "hi");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes = [0xff, 0xfe];
        let mut cursor = ReadCursor::new(&bytes);
        assert!(matches!(cursor.read_string(2), Err(DecodeError::InvalidUtf8(_))));
    }

    #[test]
    fn subregion_prefixes_its_length() {
        let mut cursor = WriteCursor::new();
        cursor.write_byte(0xaa);
        let mut payload = cursor.reserve_subregion(5);
        payload.write_bytes(&[1, 2, 3]);
        assert_eq!(payload.payload_len(), 3);
        assert_eq!(payload.finish(), 3);
        cursor.write_byte(0xbb);
        assert_eq!(cursor.into_inner(), vec![0xaa, 3, 1, 2, 3, 0xbb]);
    }

    #[test]
    fn subregion_grows_when_the_prefix_does_not_fit() {
        let mut cursor = WriteCursor::new();
        let mut payload = cursor.reserve_subregion(0);
        payload.write_bytes(&[7u8; 200]);
        payload.finish();
        let bytes = cursor.into_inner();
        assert_eq!(&bytes[..2], &[0xc8, 0x01]);
        assert_eq!(bytes.len(), 202);
    }

    #[test]
    fn subregions_nest() {
        let mut cursor = WriteCursor::new();
        let mut outer = cursor.reserve_subregion(5);
        outer.write_byte(9);
        let mut inner = outer.reserve_subregion(5);
        inner.write_bytes(&[1, 2]);
        inner.finish();
        outer.finish();
        assert_eq!(cursor.into_inner(), vec![4, 9, 2, 1, 2]);
    }
}
