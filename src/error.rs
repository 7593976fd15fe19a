//! Error types for the codec.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while compressing or decompressing.
#[derive(Debug, Error)]
pub enum Error {
    /// Bit index outside of a byte.
    #[error("bit index {0} is out of range 0..=7")]
    InvalidBitIndex(u8),

    /// Bit string longer than a byte or containing something other than '0'/'1'.
    #[error("invalid bit string {0:?}")]
    InvalidBitString(String),

    /// A tree record points nowhere, loops back, or carries an unknown type.
    #[error("malformed tree record {index}: {reason}")]
    MalformedTreeRecord { index: usize, reason: String },

    /// More internal nodes than a one-byte number can address.
    #[error("tree has {0} internal nodes; at most 255 can be numbered")]
    TooManyNodes(usize),

    /// Serialization was attempted before `number_nodes`.
    #[error("internal node has no number; run number_nodes first")]
    UnnumberedNode,

    /// The file ends before the header does.
    #[error("truncated header: need {needed} bytes, got {actual}")]
    TruncatedHeader { needed: usize, actual: usize },

    /// A zero-node header that still declares data.
    #[error("empty tree but {declared_size} symbols declared and {payload_len} payload bytes")]
    EmptyTree {
        declared_size: u32,
        payload_len: usize,
    },

    /// The bitstream does not decode to the declared number of symbols.
    #[error("corrupt bitstream: decoded {decoded} of {expected} symbols")]
    CorruptBitstream { decoded: usize, expected: usize },

    /// A symbol in the input has no code in the table.
    #[error("symbol {0:#04x} has no code")]
    MissingCode(u8),

    /// The size field is 32 bits wide.
    #[error("input of {0} bytes does not fit the 32-bit size field")]
    InputTooLarge(usize),

    /// I/O error from the file layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedTreeRecord {
            index,
            reason: reason.into(),
        }
    }
}
