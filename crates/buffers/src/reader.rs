//! Binary buffer reader with cursor tracking.

use std::str;

use crate::BufferError;

/// A binary buffer reader that reads data from a byte slice.
///
/// The reader maintains a cursor position and provides bounds-checked
/// `try_*` methods that return [`BufferError::EndOfBuffer`] instead of
/// panicking when a read would run past the end of the slice.
///
/// # Example
///
/// ```
/// use binarytf_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.try_u8(), Ok(0x01));
/// assert_eq!(reader.try_u16(), Ok(0x0203));
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        let end = uint8.len();
        Self { uint8, x: 0, end }
    }

    /// Creates a reader starting at a custom cursor position.
    pub fn from_slice(uint8: &'a [u8], x: usize, end: usize) -> Self {
        Self { uint8, x, end }
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.x)
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) {
        self.x += length;
    }

    /// Checks that `n` more bytes are available from the current cursor.
    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if self.x + n > self.end {
            Err(BufferError::EndOfBuffer { expected: n })
        } else {
            Ok(())
        }
    }

    /// Peeks at the current byte without advancing.
    pub fn try_peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.uint8[self.x])
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn try_u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads an unsigned 16-bit big-endian integer.
    #[inline]
    pub fn try_u16(&mut self) -> Result<u16, BufferError> {
        self.check(2)?;
        let val = u16::from_be_bytes([self.uint8[self.x], self.uint8[self.x + 1]]);
        self.x += 2;
        Ok(val)
    }

    /// Reads an unsigned 32-bit big-endian integer.
    #[inline]
    pub fn try_u32(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let val = u32::from_be_bytes([
            self.uint8[self.x],
            self.uint8[self.x + 1],
            self.uint8[self.x + 2],
            self.uint8[self.x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    /// Reads a 64-bit big-endian float.
    #[inline]
    pub fn try_f64(&mut self) -> Result<f64, BufferError> {
        self.check(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.uint8[self.x..self.x + 8]);
        self.x += 8;
        Ok(f64::from_be_bytes(bytes))
    }

    /// Reads `size` raw bytes and advances the cursor.
    pub fn try_buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        let end = x + size;
        self.x = end;
        Ok(&self.uint8[x..end])
    }

    /// Reads a UTF-8 string of `size` bytes.
    pub fn try_utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        self.check(size)?;
        let start = self.x;
        self.x += size;
        str::from_utf8(&self.uint8[start..self.x]).map_err(|_| BufferError::InvalidUtf8)
    }

    /// Reads up to the next occurrence of `delimiter`, returning the bytes
    /// before it and consuming the delimiter itself. Reaching the end of the
    /// buffer without finding the delimiter is an end-of-buffer error.
    pub fn try_scan(&mut self, delimiter: u8) -> Result<&'a [u8], BufferError> {
        let start = self.x;
        match self.uint8[start..self.end].iter().position(|&b| b == delimiter) {
            Some(pos) => {
                self.x = start + pos + 1;
                Ok(&self.uint8[start..start + pos])
            }
            None => Err(BufferError::EndOfBuffer { expected: 1 }),
        }
    }
}
