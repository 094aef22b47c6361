//! Decode context: a byte buffer plus a read offset

use bytes::Bytes;

use crate::{Error, Result};

/// Read position over an immutable buffer.
///
/// A read that would run past the end fails with
/// [`Error::BufferOverrun`] and leaves the offset untouched.
#[derive(Debug, Clone)]
pub struct Cursor {
    buffer: Bytes,
    offset: usize,
}

impl Cursor {
    /// Start reading `buffer` from the beginning
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
            offset: 0,
        }
    }

    /// Current read offset
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// Whether every byte has been consumed
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(Error::BufferOverrun {
                available: self.remaining(),
                required: len,
            });
        }
        Ok(())
    }

    /// Consume `len` bytes, sharing the underlying buffer
    pub fn take(&mut self, len: usize) -> Result<Bytes> {
        self.check(len)?;
        let chunk = self.buffer.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(chunk)
    }

    /// Consume exactly `N` bytes into an array
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let array = self.peek_array()?;
        self.offset += N;
        Ok(array)
    }

    /// Read `N` bytes without consuming them
    pub fn peek_array<const N: usize>(&self) -> Result<[u8; N]> {
        self.check(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(&self.buffer[self.offset..self.offset + N]);
        Ok(array)
    }

    /// Consume a single byte
    pub fn take_u8(&mut self) -> Result<u8> {
        let [byte] = self.take_array::<1>()?;
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_offset() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        assert_eq!(cursor.take(2).unwrap().as_ref(), &[1, 2]);
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.take_array::<3>().unwrap(), [3, 4, 5]);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_overrun_leaves_offset() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        cursor.take_u8().unwrap();

        let err = cursor.take(4).unwrap_err();
        assert_eq!(
            err,
            Error::BufferOverrun {
                available: 2,
                required: 4
            }
        );
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let cursor = Cursor::new(vec![0u8, 1, 0, 0, 9]);
        assert_eq!(cursor.peek_array::<4>().unwrap(), [0, 1, 0, 0]);
        assert_eq!(cursor.offset(), 0);
    }
}
