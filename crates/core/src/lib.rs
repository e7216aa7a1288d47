//! huffpress-core: Huffman compression with a self-describing tree header
//!
//! A compressed stream carries its own code: a compact pre-order description
//! of the Huffman tree, followed by one codeword per input byte and a final
//! end-of-message codeword. No lengths or tables are stored beside it.
//!
//! # Architecture
//!
//! - `bitio`: MSB-first bit reading/writing over byte streams
//! - `tree`: symbols, nodes and the validated `HuffmanTree`
//! - `builder`: frequency counting and priority-queue tree construction
//! - `tree_codec`: tree description writer/reader
//! - `table`: codewords and the symbol → codeword table
//! - `codec`: stream encoder and decoder
//! - `metrics`: counters for reporting runs
//!
//! # Example
//! ```
//! use huffpress_core::{compress_bytes, decompress_bytes};
//!
//! let packed = compress_bytes(b"abracadabra").unwrap();
//! assert_eq!(decompress_bytes(&packed).unwrap(), b"abracadabra");
//! ```

pub mod bitio;
pub mod builder;
pub mod codec;
pub mod error;
pub mod metrics;
pub mod table;
pub mod tree;
pub mod tree_codec;

// Re-export commonly used types
pub use builder::FrequencyTable;
pub use codec::{
    compress, compress_bytes, compress_file, compress_with_tree, decompress, decompress_bytes,
    decompress_file, CompressStats, DecompressStats,
};
pub use error::{Error, Result};
pub use table::{Codeword, EncodingTable};
pub use tree::{HuffmanTree, Node, Symbol};
