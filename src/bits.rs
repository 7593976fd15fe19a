//! Conversions between bytes and strings of '0'/'1' characters.

use crate::error::{Error, Result};

/// Return bit `index` of `byte`, counted from the least-significant bit.
pub fn bit_at(byte: u8, index: u8) -> Result<u8> {
    if index > 7 {
        return Err(Error::InvalidBitIndex(index));
    }
    Ok((byte >> index) & 1)
}

/// Render a byte as eight bit characters, most-significant bit first.
pub fn byte_to_bits(byte: u8) -> String {
    (0..8)
        .rev()
        .map(|i| if (byte >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Pack up to eight bit characters into a byte, padding on the right with zeros.
pub fn bits_to_byte(bits: &str) -> Result<u8> {
    if bits.len() > 8 {
        return Err(Error::InvalidBitString(bits.to_string()));
    }

    let mut byte = 0u8;
    for (pos, c) in bits.chars().enumerate() {
        match c {
            '0' => {}
            '1' => byte |= 1 << (7 - pos),
            _ => return Err(Error::InvalidBitString(bits.to_string())),
        }
    }
    Ok(byte)
}

/// Accumulates code strings and emits packed bytes, MSB first.
#[derive(Debug, Default)]
pub struct BitPacker {
    bytes: Vec<u8>,
    pending: String,
    bit_count: u64,
}

impl BitPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append a code and flush every complete byte.
    pub fn push_code(&mut self, code: &str) -> Result<()> {
        self.pending.push_str(code);
        self.bit_count += code.len() as u64;

        while self.pending.len() >= 8 {
            let byte = bits_to_byte(&self.pending[..8])?;
            self.bytes.push(byte);
            self.pending.replace_range(..8, "");
        }
        Ok(())
    }

    /// Number of bits pushed so far, padding excluded.
    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    /// Flush the trailing partial byte (zero-padded) and return the buffer.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if !self.pending.is_empty() {
            let byte = bits_to_byte(&self.pending)?;
            self.bytes.push(byte);
        }
        Ok(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_at_counts_from_lsb() {
        assert_eq!(bit_at(0b0000_0101, 2).unwrap(), 1);
        assert_eq!(bit_at(0b0000_0101, 1).unwrap(), 0);
        assert_eq!(bit_at(0b1000_0000, 7).unwrap(), 1);
        assert!(matches!(bit_at(0xff, 8), Err(Error::InvalidBitIndex(8))));
    }

    #[test]
    fn byte_to_bits_is_msb_first() {
        assert_eq!(byte_to_bits(14), "00001110");
        assert_eq!(byte_to_bits(0), "00000000");
        assert_eq!(byte_to_bits(255), "11111111");
    }

    #[test]
    fn bits_to_byte_pads_right() {
        assert_eq!(bits_to_byte("00000101").unwrap(), 5);
        assert_eq!(bits_to_byte("101").unwrap(), 0b1010_0000);
        assert_eq!(bits_to_byte("").unwrap(), 0);
        assert!(bits_to_byte("100000000").is_err());
        assert!(bits_to_byte("10x").is_err());
    }

    #[test]
    fn packer_flushes_full_and_partial_bytes() {
        // codes {0: "0", 1: "10", 2: "11"} over [1, 2, 1, 0, 2]
        let mut packer = BitPacker::new();
        for code in ["10", "11", "10", "0", "11"] {
            packer.push_code(code).unwrap();
        }
        assert_eq!(packer.bit_count(), 9);
        let bytes = packer.finish().unwrap();
        let bits: Vec<String> = bytes.iter().map(|&b| byte_to_bits(b)).collect();
        assert_eq!(bits, vec!["10111001", "10000000"]);
    }

    #[test]
    fn packer_exact_byte_has_no_padding_byte() {
        let mut packer = BitPacker::with_capacity(1);
        for code in ["10", "11", "10", "0"] {
            packer.push_code(code).unwrap();
        }
        packer.push_code("0").unwrap();
        assert_eq!(packer.finish().unwrap(), vec![0b1011_1000]);
    }
}
