//! Binary buffer writer with auto-growing capacity.

/// A binary buffer writer that grows automatically as needed.
///
/// The buffer starts small (16 bytes) and doubles to the next power of two
/// whenever a write would overflow it, so appends are amortized O(1) and a
/// large composite never triggers a reallocation per byte.
///
/// # Example
///
/// ```
/// use binarytf_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u16(0x0203);
/// let data = writer.flush();
/// assert_eq!(data, [0x01, 0x02, 0x03]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Current cursor position.
    pub x: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with the default initial capacity (16 bytes).
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    /// Creates a new writer with a custom initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: vec![0u8; capacity.max(1)],
            x: 0,
        }
    }

    /// Ensures the buffer can hold `capacity` more bytes past the cursor.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let required = self.x + capacity;
        if required > self.uint8.len() {
            self.grow(required.next_power_of_two());
        }
    }

    fn grow(&mut self, new_size: usize) {
        let mut new_buf = vec![0u8; new_size];
        new_buf[..self.x].copy_from_slice(&self.uint8[..self.x]);
        self.uint8 = new_buf;
    }

    /// Returns the written prefix and resets the cursor.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[..self.x].to_vec();
        self.x = 0;
        result
    }

    /// Resets the cursor without returning the written bytes.
    pub fn reset(&mut self) {
        self.x = 0;
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = val;
        self.x += 1;
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.ensure_capacity(2);
        let bytes = val.to_be_bytes();
        self.uint8[self.x..self.x + 2].copy_from_slice(&bytes);
        self.x += 2;
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.ensure_capacity(4);
        let bytes = val.to_be_bytes();
        self.uint8[self.x..self.x + 4].copy_from_slice(&bytes);
        self.x += 4;
    }

    /// Writes a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.ensure_capacity(4);
        let bytes = val.to_be_bytes();
        self.uint8[self.x..self.x + 4].copy_from_slice(&bytes);
        self.x += 4;
    }

    /// Writes an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.ensure_capacity(8);
        let bytes = val.to_be_bytes();
        self.uint8[self.x..self.x + 8].copy_from_slice(&bytes);
        self.x += 8;
    }

    /// Writes a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.ensure_capacity(8);
        let bytes = val.to_be_bytes();
        self.uint8[self.x..self.x + 8].copy_from_slice(&bytes);
        self.x += 8;
    }

    /// Writes a u8 followed by a u32 (big-endian).
    pub fn u8u32(&mut self, u8_val: u8, u32_val: u32) {
        self.ensure_capacity(5);
        self.uint8[self.x] = u8_val;
        let bytes = u32_val.to_be_bytes();
        self.uint8[self.x + 1..self.x + 5].copy_from_slice(&bytes);
        self.x += 5;
    }

    /// Writes a u8 followed by a f64 (big-endian).
    pub fn u8f64(&mut self, u8_val: u8, f64_val: f64) {
        self.ensure_capacity(9);
        self.uint8[self.x] = u8_val;
        let bytes = f64_val.to_be_bytes();
        self.uint8[self.x + 1..self.x + 9].copy_from_slice(&bytes);
        self.x += 9;
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, buf: &[u8]) {
        let length = buf.len();
        self.ensure_capacity(length);
        self.uint8[self.x..self.x + length].copy_from_slice(buf);
        self.x += length;
    }

    /// Writes a UTF-8 string. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        let bytes = s.as_bytes();
        self.buf(bytes);
        bytes.len()
    }
}
