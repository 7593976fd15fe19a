//! Decompression: the reverse of [`crate::encoder`].

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, trace, warn};

use crate::bits::{bit_at, byte_to_bits};
use crate::error::{Error, Result};
use crate::huffman::{Node, build_code_table};
use crate::tree_bytes::{RECORD_LEN, ReadNode, bytes_to_nodes, bytes_to_size, generate_tree_general};

/// Parsed fixed part of a compressed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub records: Vec<ReadNode>,
    pub original_size: u32,
    /// Offset of the first bitstream byte.
    pub payload_offset: usize,
}

pub fn read_header(data: &[u8]) -> Result<Header> {
    let Some(&node_count) = data.first() else {
        return Err(Error::TruncatedHeader {
            needed: 1,
            actual: 0,
        });
    };

    let records_end = 1 + node_count as usize * RECORD_LEN;
    let payload_offset = records_end + 4;
    debug!(
        "Header: {} records, payload at offset {}",
        node_count, payload_offset
    );
    if payload_offset > data.len() {
        return Err(Error::TruncatedHeader {
            needed: payload_offset,
            actual: data.len(),
        });
    }

    let records = bytes_to_nodes(&data[1..records_end])?;
    let mut size = [0u8; 4];
    size.copy_from_slice(&data[records_end..payload_offset]);

    Ok(Header {
        records,
        original_size: bytes_to_size(size),
        payload_offset,
    })
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let header = read_header(data)?;
    let payload = &data[header.payload_offset..];
    let size = header.original_size as usize;

    if header.records.is_empty() {
        if size == 0 && payload.is_empty() {
            debug!("Empty tree, nothing to decode");
            return Ok(Vec::new());
        }
        return Err(Error::EmptyTree {
            declared_size: header.original_size,
            payload_len: payload.len(),
        });
    }

    let tree = generate_tree_general(&header.records, header.records.len() - 1)?;
    decode_data(payload, &tree, size)
}

/// Decode exactly `size` symbols from `encoded`; trailing padding is ignored.
pub fn decode_data(encoded: &[u8], tree: &Node, size: usize) -> Result<Vec<u8>> {
    debug!("Starting bitstream decoding...");
    let start_time = Instant::now();

    let reverse_table: HashMap<String, u8> = build_code_table(tree)
        .into_iter()
        .map(|(b, c)| (c, b))
        .collect();
    let longest = reverse_table.keys().map(String::len).max().unwrap_or(0);
    debug!(
        "Reverse lookup table created. Entries: {}, longest code: {} bits",
        reverse_table.len(),
        longest
    );

    let mut result = Vec::with_capacity(size);
    let mut current_code = String::with_capacity(longest);

    'bytes: for &byte in encoded {
        if result.len() == size {
            break;
        }
        trace!("Payload byte {}", byte_to_bits(byte));
        for index in (0..8).rev() {
            current_code.push(if bit_at(byte, index)? == 1 { '1' } else { '0' });
            if let Some(&symbol) = reverse_table.get(&current_code) {
                result.push(symbol);
                current_code.clear();
                if result.len() == size {
                    break 'bytes;
                }
            } else if current_code.len() >= longest {
                return Err(Error::CorruptBitstream {
                    decoded: result.len(),
                    expected: size,
                });
            }
        }
    }

    if result.len() < size {
        return Err(Error::CorruptBitstream {
            decoded: result.len(),
            expected: size,
        });
    }
    if size == 0 && !encoded.is_empty() {
        warn!(
            "Ignoring {} payload bytes for an empty output",
            encoded.len()
        );
    }

    debug!(
        "Bitstream decoding finished in {:.2?}, {} bytes",
        start_time.elapsed(),
        result.len()
    );
    Ok(result)
}
