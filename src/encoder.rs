//! Compression: bytes in, `[count][records][size][bits]` out.

use log::{debug, info};

use crate::bits::BitPacker;
use crate::error::{Error, Result};
use crate::huffman::{
    CodeTable, FreqTable, avg_length, build_code_table, build_huffman_tree, entropy_from_freq,
    improve_tree, number_nodes,
};
use crate::tree_bytes::{num_nodes_to_byte, size_to_bytes, tree_to_bytes};

/// Encoding of an empty input: no records and a size of zero.
pub const EMPTY_ENCODING: [u8; 5] = [0, 0, 0, 0, 0];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    /// Run the leaf-swapping pass before codes are derived.
    pub improve_tree: bool,
}

/// Informational numbers about one compression; none of this is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    pub input_len: usize,
    pub output_len: usize,
    pub unique_symbols: usize,
    pub node_count: usize,
    pub bits_per_symbol: f64,
    pub entropy: f64,
}

impl CompressionReport {
    /// Space saved relative to the input, in percent.
    pub fn ratio(&self) -> f64 {
        if self.input_len == 0 {
            return 0.0;
        }
        100.0 * (1.0 - (self.output_len as f64) / (self.input_len as f64))
    }
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with(data, &CodecOptions::default()).map(|(bytes, _)| bytes)
}

pub fn compress_with(data: &[u8], options: &CodecOptions) -> Result<(Vec<u8>, CompressionReport)> {
    let size = size_to_bytes(data.len())?;
    let freq = FreqTable::analyze(data);

    let Some(mut tree) = build_huffman_tree(&freq) else {
        debug!("Empty input, writing empty encoding");
        let report = CompressionReport {
            input_len: 0,
            output_len: EMPTY_ENCODING.len(),
            unique_symbols: 0,
            node_count: 0,
            bits_per_symbol: 0.0,
            entropy: 0.0,
        };
        return Ok((EMPTY_ENCODING.to_vec(), report));
    };

    if options.improve_tree {
        improve_tree(&mut tree, &freq);
    }

    let codes = build_code_table(&tree);
    let node_count = number_nodes(&mut tree)?;
    let records = tree_to_bytes(&tree)?;
    let bits_per_symbol = avg_length(&tree, &freq);
    info!("Bits per symbol: {}", bits_per_symbol);

    let payload = encode_data(data, &codes)?;

    let mut bytes = Vec::with_capacity(1 + records.len() + size.len() + payload.len());
    bytes.push(num_nodes_to_byte(&tree)?);
    bytes.extend_from_slice(&records);
    bytes.extend_from_slice(&size);
    bytes.extend_from_slice(&payload);

    debug!(
        "Compressed {} bytes into {} ({} records, {} payload bytes)",
        data.len(),
        bytes.len(),
        node_count,
        payload.len()
    );

    let report = CompressionReport {
        input_len: data.len(),
        output_len: bytes.len(),
        unique_symbols: freq.len(),
        node_count,
        bits_per_symbol,
        entropy: entropy_from_freq(&freq),
    };
    Ok((bytes, report))
}

/// Concatenate the code of every input byte and pack the bits MSB first.
pub fn encode_data(data: &[u8], code_table: &CodeTable) -> Result<Vec<u8>> {
    debug!("Starting data encoding...");
    let mut packer = BitPacker::with_capacity(data.len() / 2);

    for &byte in data {
        let code = code_table.get(&byte).ok_or(Error::MissingCode(byte))?;
        packer.push_code(code)?;
    }

    let bit_count = packer.bit_count();
    let bytes = packer.finish()?;
    debug!("Packed {} bits into {} bytes", bit_count, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::byte_to_bits;

    #[test]
    fn empty_input_has_fixed_encoding() {
        assert_eq!(compress(&[]).unwrap(), EMPTY_ENCODING.to_vec());
    }

    #[test]
    fn layout_of_two_symbol_input() {
        // freq {1: 2, 2: 1}: 2 is lighter and goes left.
        let bytes = compress(&[1, 2, 1]).unwrap();
        assert_eq!(bytes, vec![1, 0, 2, 0, 1, 3, 0, 0, 0, 0b1010_0000]);
    }

    #[test]
    fn single_symbol_input_uses_one_bit_per_byte() {
        let (bytes, report) = compress_with(b"aaaaaaaaa", &CodecOptions::default()).unwrap();
        assert_eq!(&bytes[..5], &[1, 0, b'a', 0, b'a']);
        assert_eq!(&bytes[5..9], &[9, 0, 0, 0]);
        assert_eq!(&bytes[9..], &[0xff, 0x80]);
        assert_eq!(report.bits_per_symbol, 1.0);
        assert_eq!(report.node_count, 1);
    }

    #[test]
    fn encode_data_packs_codes() {
        let codes: CodeTable = [(0, "0"), (1, "10"), (2, "11")]
            .into_iter()
            .map(|(s, c)| (s, c.to_string()))
            .collect();

        let packed = encode_data(&[1, 2, 1, 0], &codes).unwrap();
        let bits: Vec<String> = packed.iter().map(|&b| byte_to_bits(b)).collect();
        assert_eq!(bits, vec!["10111000"]);

        let packed = encode_data(&[1, 2, 1, 0, 2], &codes).unwrap();
        let bits: Vec<String> = packed.iter().map(|&b| byte_to_bits(b)).collect();
        assert_eq!(bits, vec!["10111001", "10000000"]);

        assert!(matches!(
            encode_data(&[7], &codes),
            Err(Error::MissingCode(7))
        ));
    }

    #[test]
    fn report_tracks_sizes() {
        let input = b"mississippi river".repeat(20);
        let (bytes, report) = compress_with(&input, &CodecOptions { improve_tree: true }).unwrap();
        assert_eq!(report.input_len, input.len());
        assert_eq!(report.output_len, bytes.len());
        assert_eq!(report.node_count + 1, report.unique_symbols);
        assert!(report.bits_per_symbol >= report.entropy);
        assert!(report.bits_per_symbol < report.entropy + 1.0);
        assert!(report.ratio() > 0.0);
    }
}
