//! Error types for huffpress.
//!
//! All operations return structured errors rather than panicking. A failed
//! compress or decompress call leaves no partial-success state behind: the
//! caller gets the error and decides what to do with the output stream.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all operations in the crate.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: the bit cursor ran out of input or was misused
/// - Tree: a tree (built or deserialized) violates a structural invariant
/// - Codec: encode lookup failures and truncated payloads
/// - I/O: the underlying stream failed
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of stream)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Tree construction or tree description error
    #[error("huffman tree error: {0}")]
    Tree(#[from] TreeError),

    /// Stream encoder/decoder error
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Underlying stream error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True if the input ran out before a structurally required bit, either
    /// inside the tree header or in the middle of a payload codeword.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(
            self,
            Error::BitIo(BitIoError::UnexpectedEof)
                | Error::Codec(CodecError::UnexpectedEndOfStream { .. })
        )
    }

    /// True if a tree description was read completely but describes an
    /// invalid tree.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::Tree(e) if e.is_format_error())
    }
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// The underlying reader hit end of file before the requested bits
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Huffman tree errors.
///
/// Everything except `EmptyFrequencyTable` is a format error: the tree
/// shape is complete but breaks an invariant the decoder depends on.
#[derive(Debug, Error)]
pub enum TreeError {
    /// No symbols with non-zero frequency (cannot build a tree)
    #[error("empty frequency table: cannot build tree")]
    EmptyFrequencyTable,

    /// Tree has no end-of-message leaf, so decoding could never terminate
    #[error("tree has no end-of-message leaf")]
    MissingEndOfMessage,

    /// Tree has more than one end-of-message leaf
    #[error("tree has more than one end-of-message leaf")]
    DuplicateEndOfMessage,

    /// The same byte value appears in two leaves
    #[error("byte {0:#04x} appears in more than one leaf")]
    DuplicateSymbol(u8),

    /// Tree is deeper than any full tree over the byte alphabet can be
    #[error("tree depth exceeds limit of {limit}")]
    TooDeep { limit: usize },
}

impl TreeError {
    pub fn is_format_error(&self) -> bool {
        !matches!(self, TreeError::EmptyFrequencyTable)
    }
}

/// Stream codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input byte has no codeword in the encoding table
    #[error("byte {byte:#04x} at offset {offset} has no codeword in the tree")]
    UnmappedByte { byte: u8, offset: u64 },

    /// Compressed payload ended in the middle of a codeword
    #[error("stream ended mid-codeword after {bits_read} bits ({bytes_decoded} bytes decoded)")]
    UnexpectedEndOfStream { bits_read: u64, bytes_decoded: u64 },

    /// Output path names the input file, which would be truncated
    #[error("output {} is the same file as the input", path.display())]
    OutputIsInput { path: PathBuf },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
