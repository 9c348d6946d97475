//! Bit cursor over payload bytes
//!
//! Records are packed most-significant bit first, so a 1-bit flag followed by
//! a 7-bit field occupy bit 7 and bits 6..0 of the same byte.

/// Reads big-endian bit fields from a byte slice
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Bits not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    /// Read `bits` (at most 64) bits, or `None` when not enough remain.
    pub fn read(&mut self, bits: u32) -> Option<u64> {
        let bits = bits as usize;
        if bits > 64 || bits > self.remaining() {
            return None;
        }
        let mut value = 0u64;
        for _ in 0..bits {
            let byte = self.data[self.position / 8];
            let bit = (byte >> (7 - (self.position % 8))) & 1;
            value = (value << 1) | bit as u64;
            self.position += 1;
        }
        Some(value)
    }
}

/// Accumulates big-endian bit fields into bytes
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `bits` bits of `value`.
    pub fn push(&mut self, value: u64, bits: u32) {
        for i in (0..bits).rev() {
            if self.bit_len % 8 == 0 {
                self.bytes.push(0);
            }
            if (value >> i) & 1 == 1 {
                if let Some(last) = self.bytes.last_mut() {
                    *last |= 1 << (7 - (self.bit_len % 8));
                }
            }
            self.bit_len += 1;
        }
    }

    /// Finish writing; fails with the bit count if it is not byte aligned.
    pub fn into_bytes(self) -> Result<Vec<u8>, usize> {
        if self.bit_len % 8 == 0 {
            Ok(self.bytes)
        } else {
            Err(self.bit_len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_sub_byte_fields() {
        let data = [0x81, 0x23];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read(1), Some(1));
        assert_eq!(reader.read(7), Some(0x01));
        assert_eq!(reader.read(4), Some(2));
        assert_eq!(reader.read(4), Some(3));
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read(1), None);
    }

    #[test]
    fn test_read_across_bytes() {
        let data = [0xF1, 0x90, 0xAA];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read(16), Some(0xF190));
        assert_eq!(reader.remaining(), 8);
        assert_eq!(reader.read(16), None);
        assert_eq!(reader.read(8), Some(0xAA));
    }

    #[test]
    fn test_writer_packs_msb_first() {
        let mut writer = BitWriter::new();
        writer.push(1, 1);
        writer.push(0x01, 7);
        writer.push(0xF190, 16);
        assert_eq!(writer.into_bytes().unwrap(), vec![0x81, 0xF1, 0x90]);
    }

    #[test]
    fn test_writer_rejects_unaligned() {
        let mut writer = BitWriter::new();
        writer.push(0x5, 4);
        assert_eq!(writer.into_bytes(), Err(4));
    }
}
