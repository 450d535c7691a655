use byteorder::{ByteOrder, LittleEndian};

use crate::error::BedrockError;
use crate::types::Result;

/// Byte buffer paired with a read/write position.
/// All multi-byte values are little endian, which is what the world format uses
/// throughout. Writes overwrite at the position and grow the buffer when they
/// run past its end.
#[derive(Debug, Clone, Default)]
pub struct ByteCursor {
    buffer: Vec<u8>,
    position: usize,
}

impl ByteCursor {
    /// Creates an empty cursor for writing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cursor whose buffer can hold `capacity` bytes without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            position: 0,
        }
    }

    /// Creates a cursor for reading `bytes` from the start.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor back to the start, e.g. to read what was just written.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    fn ensure(&self, requested: usize) -> Result<()> {
        if requested > self.remaining() {
            return Err(BedrockError::OutOfBounds {
                position: self.position,
                requested,
                len: self.buffer.len(),
            });
        }
        Ok(())
    }

    /// Skips `amount` bytes without reading them.
    pub fn advance(&mut self, amount: usize) -> Result<()> {
        self.ensure(amount)?;
        self.position += amount;
        Ok(())
    }

    /// Returns the next `amount` bytes and moves past them.
    pub fn read_bytes(&mut self, amount: usize) -> Result<&[u8]> {
        self.ensure(amount)?;
        let start = self.position;
        self.position += amount;
        Ok(&self.buffer[start..self.position])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.read_bytes(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads a u16 length prefix followed by that many bytes of UTF-8 text.
    /// A zero length yields `None`; tag names are left blank this way for
    /// root and list elements.
    pub fn read_length_prefixed_string(&mut self) -> Result<Option<String>> {
        let length = self.read_u16()? as usize;
        if length == 0 {
            return Ok(None);
        }

        let bytes = self.read_bytes(length)?.to_vec();
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| BedrockError::invalid_data(format!("String is not valid UTF-8: {}", e)))
    }

    /// Writes `bytes` at the position, overwriting what is there and growing
    /// the buffer as needed.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        let overlap = end.min(self.buffer.len()).saturating_sub(self.position);

        self.buffer[self.position..self.position + overlap].copy_from_slice(&bytes[..overlap]);
        self.buffer.extend_from_slice(&bytes[overlap..]);
        self.position = end;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_u16(value as u16);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub fn write_u64(&mut self, value: u64) {
        let mut bytes = [0u8; 8];
        LittleEndian::write_u64(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_u64(value as u64);
    }

    // Floats go through their bit patterns so NaN payloads survive.
    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    /// Writes a u16 length prefix and the UTF-8 bytes of `value`.
    pub fn write_length_prefixed_string(&mut self, value: &str) -> Result<()> {
        let length = u16::try_from(value.len()).map_err(|_| {
            BedrockError::invalid_data(format!(
                "String of {} bytes does not fit a u16 length prefix",
                value.len()
            ))
        })?;
        self.write_u16(length);
        self.write_bytes(value.as_bytes());
        Ok(())
    }
}
