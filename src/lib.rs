//! Byte-oriented Huffman codec.
//!
//! A compressed file is laid out as
//!
//! ```text
//! [node count: u8][node count * 4 bytes of tree records][original size: u32 LE][bitstream]
//! ```
//!
//! The tree records describe the internal nodes of the Huffman tree in
//! postorder (see [`tree_bytes`]); the bitstream holds the code of every
//! input byte, most-significant bit first, with the last byte zero-padded.
//!
//! ```
//! let packed = huffman_codec::compress(b"abracadabra").unwrap();
//! assert_eq!(huffman_codec::decompress(&packed).unwrap(), b"abracadabra");
//! ```

pub mod bits;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod file;
pub mod huffman;
pub mod tree_bytes;

pub use decoder::decompress;
pub use encoder::{CodecOptions, CompressionReport, compress, compress_with};
pub use error::{Error, Result};
pub use huffman::{CodeTable, FreqTable, Node, Symbol};
