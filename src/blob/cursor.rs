//! Bounds-checked sequential reader over a signature blob.
//!
//! This module provides the [`crate::blob::ByteCursor`] type, the cursor every other
//! decoding component reads through. It wraps a borrowed byte slice and a position,
//! and guarantees that:
//!
//! - the position never exceeds the length of the slice
//! - a read either consumes exactly the requested number of bytes, or fails with
//!   [`crate::Error::Truncated`] and leaves the position untouched
//!
//! No read ever returns partial data.
//!
//! # Usage Examples
//!
//! ```rust
//! use cilsig::blob::ByteCursor;
//!
//! let data = [0x20, 0x01, 0x01, 0x0E];
//! let mut cursor = ByteCursor::new(&data);
//!
//! assert_eq!(cursor.peek_byte()?, 0x20);
//! assert_eq!(cursor.read_byte()?, 0x20);
//! assert_eq!(cursor.read_bytes(2)?, &[0x01, 0x01]);
//! assert_eq!(cursor.pos(), 3);
//! assert_eq!(cursor.remaining(), 1);
//!
//! // Asking for more than is left fails without moving the cursor
//! assert!(cursor.read_bytes(2).is_err());
//! assert_eq!(cursor.pos(), 3);
//! # Ok::<(), cilsig::Error>(())
//! ```

use crate::Result;

/// A cursor over an immutable signature blob.
///
/// `ByteCursor` is created per decode call and borrows the caller's buffer; it never
/// copies or mutates the underlying bytes. Offsets reported in errors are relative
/// to the start of that buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    /// The blob being decoded
    data: &'a [u8],
    /// Current position within the blob, always `<= data.len()`
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a new [`ByteCursor`] positioned at the start of `data`.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, position: 0 }
    }

    /// Returns the length of the underlying blob.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying blob is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if at least one byte is left to read.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the cursor within the blob.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining from the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Ensures that at least `needed` bytes are available from the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than `needed` bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(truncated_error!(self.position, needed, self.remaining()));
        }
        Ok(())
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the cursor is at the end of the blob.
    pub fn peek_byte(&self) -> Result<u8> {
        match self.data.get(self.position) {
            Some(byte) => Ok(*byte),
            None => Err(truncated_error!(self.position, 1, 0)),
        }
    }

    /// Read one byte and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the cursor is at the end of the blob.
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.position += 1;
        Ok(byte)
    }

    /// Read `length` bytes as a slice borrowed from the blob and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than `length` bytes remain; the
    /// position is left unchanged in that case.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        self.ensure_remaining(length)?;

        let end = self.position + length;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Move the position forward by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the cursor is at the end of the blob.
    pub fn advance(&mut self) -> Result<()> {
        self.read_byte().map(|_| ())
    }

    /// Execute a closure transactionally, rolling the position back on failure.
    ///
    /// # Errors
    /// Returns any error produced by `f`; the position is restored to its value
    /// before the call when that happens.
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_position = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = saved_position;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ErrorKind};

    #[test]
    fn test_sequential_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.len(), 5);
        assert!(!cursor.is_empty());
        assert_eq!(cursor.read_byte().unwrap(), 0x01);
        assert_eq!(cursor.read_bytes(3).unwrap(), &[0x02, 0x03, 0x04]);
        assert_eq!(cursor.pos(), 4);
        assert_eq!(cursor.remaining(), 1);
        assert!(cursor.has_more_data());

        cursor.advance().unwrap();
        assert!(!cursor.has_more_data());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0xAA, 0xBB];
        let cursor = ByteCursor::new(&data);

        assert_eq!(cursor.peek_byte().unwrap(), 0xAA);
        assert_eq!(cursor.peek_byte().unwrap(), 0xAA);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn test_empty_blob() {
        let mut cursor = ByteCursor::new(&[]);

        assert!(cursor.is_empty());
        assert_eq!(
            cursor.peek_byte(),
            Err(Error::Truncated {
                offset: 0,
                needed: 1,
                remaining: 0
            })
        );
        assert_eq!(cursor.read_byte().unwrap_err().kind(), ErrorKind::Truncated);
        assert_eq!(cursor.read_bytes(0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_failed_read_keeps_position() {
        let data = [0x01, 0x02, 0x03];
        let mut cursor = ByteCursor::new(&data);
        cursor.advance().unwrap();

        assert_eq!(
            cursor.read_bytes(3),
            Err(Error::Truncated {
                offset: 1,
                needed: 3,
                remaining: 2
            })
        );
        assert_eq!(cursor.pos(), 1);
        assert_eq!(cursor.read_bytes(2).unwrap(), &[0x02, 0x03]);
    }

    #[test]
    fn test_transactional() {
        let data = [0x01, 0x02, 0x03];

        let mut cursor = ByteCursor::new(&data);
        let sum = cursor
            .transactional(|c| Ok(u16::from(c.read_byte()?) + u16::from(c.read_byte()?)))
            .unwrap();
        assert_eq!(sum, 3);
        assert_eq!(cursor.pos(), 2);

        let mut cursor = ByteCursor::new(&data);
        let result = cursor.transactional(|c| {
            c.read_byte()?;
            c.read_bytes(5)
        });
        assert!(result.is_err());
        assert_eq!(cursor.pos(), 0);
    }
}
