//! Stream encoder and decoder.
//!
//! # Compressed Format
//!
//! ```text
//! +----------------------+
//! | tree description     |  see tree_codec, not byte-aligned
//! +----------------------+
//! | codeword per byte    |  0 or more, in input order
//! +----------------------+
//! | end-of-message code  |  exactly one
//! +----------------------+
//! | zero padding         |  0-7 bits to the byte boundary
//! +----------------------+
//! ```
//!
//! The decoder never looks at the padding: the end-of-message codeword ends
//! the payload, so there is no length field.
//!
//! Every call owns its tree, table and cursor; calls on different streams
//! share nothing.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::bitio::{BitReader, BitWriter};
use crate::builder::FrequencyTable;
use crate::error::{BitIoError, CodecError, Error, Result};
use crate::table::EncodingTable;
use crate::tree::{HuffmanTree, Node, Symbol};
use crate::tree_codec::{read_tree, write_tree};

/// Chunk size for pulling input and pushing decoded output.
const IO_CHUNK: usize = 8192;

/// What one `compress` call produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressStats {
    /// Uncompressed bytes consumed
    pub input_bytes: u64,
    /// Bits in the tree description
    pub header_bits: u64,
    /// Bits of codewords, end-of-message included
    pub payload_bits: u64,
    /// Compressed bytes written, padding included
    pub output_bytes: u64,
    /// Leaves in the tree used
    pub symbols: usize,
}

/// What one `decompress` call consumed and produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompressStats {
    /// Compressed bytes touched, final padded byte included
    pub input_bytes: u64,
    /// Bits in the tree description
    pub header_bits: u64,
    /// Bits of codewords, end-of-message included
    pub payload_bits: u64,
    /// Decoded bytes written
    pub output_bytes: u64,
    /// Leaves in the decoded tree
    pub symbols: usize,
}

/// Compress `input` with `tree` into `output`.
///
/// Writes the tree description, the codeword of every input byte, the
/// end-of-message codeword, then pads and flushes.
///
/// # Errors
/// - `CodecError::UnmappedByte` if an input byte has no leaf in `tree`.
///   Whatever was already written to `output` is not meaningful.
/// - I/O errors from either stream
pub fn compress<R: Read, W: Write>(
    tree: &HuffmanTree,
    mut input: R,
    output: W,
) -> Result<CompressStats> {
    let table = EncodingTable::from_tree(tree);
    let mut writer = BitWriter::new(output);

    write_tree(tree, &mut writer)?;
    let header_bits = writer.bits_written();

    let mut offset = 0u64;
    let mut buf = vec![0u8; IO_CHUNK];
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &buf[..n] {
            let codeword = table
                .byte(byte)
                .ok_or(CodecError::UnmappedByte { byte, offset })?;
            codeword.write_to(&mut writer)?;
            offset += 1;
        }
    }

    table.end_of_message().write_to(&mut writer)?;
    let payload_bits = writer.bits_written() - header_bits;
    writer.flush()?;

    let stats = CompressStats {
        input_bytes: offset,
        header_bits,
        payload_bits,
        output_bytes: writer.bits_written() / 8,
        symbols: tree.leaf_count(),
    };
    debug!(
        input_bytes = stats.input_bytes,
        header_bits = stats.header_bits,
        payload_bits = stats.payload_bits,
        output_bytes = stats.output_bytes,
        "compressed stream"
    );
    Ok(stats)
}

/// Walk `tree` from the root, one bit per branch, and return the leaf's
/// symbol. A leaf root returns immediately without reading.
///
/// # Errors
/// `BitIoError::UnexpectedEof` if the stream ends before a leaf.
pub fn decode_symbol<R: Read>(tree: &HuffmanTree, reader: &mut BitReader<R>) -> Result<Symbol> {
    let mut node = tree.root();
    loop {
        match node {
            Node::Leaf(symbol) => return Ok(*symbol),
            Node::Branch { left, right } => {
                node = if reader.read_bit()? { right } else { left };
            }
        }
    }
}

/// Decompress `input` into `output`.
///
/// Reads the tree description, then decodes symbols until end-of-message.
/// Bits after the end-of-message codeword are ignored.
///
/// # Errors
/// - `BitIoError::UnexpectedEof` if the stream ends inside the tree header
/// - `CodecError::UnexpectedEndOfStream` if it ends inside the payload
/// - a `TreeError` format variant for an invalid tree description
///
/// On error `output` may already hold a prefix of the decoded data.
pub fn decompress<R: Read, W: Write>(input: R, mut output: W) -> Result<DecompressStats> {
    let mut reader = BitReader::new(input);
    let tree = read_tree(&mut reader)?;
    let header_bits = reader.bits_read();

    let mut pending = Vec::with_capacity(IO_CHUNK);
    let mut decoded = 0u64;
    loop {
        match decode_symbol(&tree, &mut reader) {
            Ok(Symbol::Byte(b)) => {
                pending.push(b);
                decoded += 1;
                if pending.len() == IO_CHUNK {
                    output.write_all(&pending)?;
                    pending.clear();
                }
            }
            Ok(Symbol::EndOfMessage) => break,
            Err(Error::BitIo(BitIoError::UnexpectedEof)) => {
                return Err(CodecError::UnexpectedEndOfStream {
                    bits_read: reader.bits_read(),
                    bytes_decoded: decoded,
                }
                .into());
            }
            Err(e) => return Err(e),
        }
    }
    output.write_all(&pending)?;
    output.flush()?;

    let bits_read = reader.bits_read();
    let stats = DecompressStats {
        input_bytes: bits_read.div_ceil(8),
        header_bits,
        payload_bits: bits_read - header_bits,
        output_bytes: decoded,
        symbols: tree.leaf_count(),
    };
    debug!(
        input_bytes = stats.input_bytes,
        output_bytes = stats.output_bytes,
        symbols = stats.symbols,
        "decompressed stream"
    );
    Ok(stats)
}

/// Compress `data` with a tree built from its own byte counts.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let tree = HuffmanTree::from_bytes(data)?;
    compress_with_tree(&tree, data)
}

/// Compress `data` with a caller-supplied tree.
pub fn compress_with_tree(tree: &HuffmanTree, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress(tree, data, &mut out)?;
    Ok(out)
}

/// Decompress a complete compressed buffer.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(data, &mut out)?;
    Ok(out)
}

/// Compress the file at `src` into `dst`.
///
/// Makes two passes over `src`: one to count bytes and build the tree, one
/// to encode. `dst` is removed if compression fails.
///
/// # Errors
/// `CodecError::OutputIsInput` if `dst` resolves to `src`; neither file is
/// touched.
pub fn compress_file(src: &Path, dst: &Path) -> Result<CompressStats> {
    ensure_distinct(src, dst)?;
    let frequencies = FrequencyTable::from_reader(BufReader::new(File::open(src)?))?;
    let tree = HuffmanTree::from_frequencies(&frequencies)?;

    let input = BufReader::new(File::open(src)?);
    let output = BufWriter::new(File::create(dst)?);
    compress(&tree, input, output).inspect_err(|_| discard(dst))
}

/// Decompress the file at `src` into `dst`. `dst` is removed if
/// decompression fails. Refuses a `dst` that resolves to `src`.
pub fn decompress_file(src: &Path, dst: &Path) -> Result<DecompressStats> {
    ensure_distinct(src, dst)?;
    let input = BufReader::new(File::open(src)?);
    let output = BufWriter::new(File::create(dst)?);
    decompress(input, output).inspect_err(|_| discard(dst))
}

/// Compare resolved paths so `a.txt` and `./a.txt` count as one file. A
/// `dst` that does not exist yet cannot be `src`.
fn ensure_distinct(src: &Path, dst: &Path) -> Result<()> {
    let Ok(resolved_dst) = fs::canonicalize(dst) else {
        return Ok(());
    };
    if fs::canonicalize(src)? == resolved_dst {
        return Err(CodecError::OutputIsInput {
            path: dst.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "could not remove partial output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;

    fn sample_tree() -> HuffmanTree {
        HuffmanTree::new(Node::branch(
            Node::end_of_message(),
            Node::branch(Node::byte(b'A'), Node::byte(b'B')),
        ))
        .unwrap()
    }

    #[test]
    fn test_sample_compression_layout() {
        let out = compress_with_tree(&sample_tree(), b"AB").unwrap();
        // tree (24 bits) | 10 11 0 | 000 padding
        assert_eq!(out, vec![0b1001_0101, 0b0000_0101, 0b0100_0010, 0b1011_0000]);
        assert_eq!(decompress_bytes(&out).unwrap(), b"AB");
    }

    #[test]
    fn test_stats() {
        let mut out = Vec::new();
        let stats = compress(&sample_tree(), &b"AAB"[..], &mut out).unwrap();
        assert_eq!(
            stats,
            CompressStats {
                input_bytes: 3,
                header_bits: 24,
                payload_bits: 7,
                output_bytes: 4,
                symbols: 3,
            }
        );
        assert_eq!(out.len(), 4);

        let mut decoded = Vec::new();
        let stats = decompress(&out[..], &mut decoded).unwrap();
        assert_eq!(decoded, b"AAB");
        assert_eq!(stats.header_bits, 24);
        assert_eq!(stats.payload_bits, 7);
        assert_eq!(stats.output_bytes, 3);
        assert_eq!(stats.input_bytes, 4);
        assert_eq!(stats.symbols, 3);
    }

    #[test]
    fn test_unmapped_byte() {
        let result = compress_with_tree(&sample_tree(), b"ABC");
        assert!(matches!(
            result,
            Err(Error::Codec(CodecError::UnmappedByte { byte: b'C', offset: 2 }))
        ));
    }

    #[test]
    fn test_empty_input() {
        let out = compress_bytes(b"").unwrap();
        // EOM leaf "00", empty EOM codeword, padding
        assert_eq!(out, vec![0]);
        assert!(decompress_bytes(&out).unwrap().is_empty());
    }

    #[test]
    fn test_degenerate_tree_ignores_trailing_bytes() {
        let decoded = decompress_bytes(&[0x00, 0xFF, 0xFF]).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_padding_not_decoded() {
        // EOM is "0", so padding zeros would decode as EOM if read; the
        // decoder must stop at the first one.
        let out = compress_with_tree(&sample_tree(), b"B").unwrap();
        assert_eq!(decompress_bytes(&out).unwrap(), b"B");
    }

    #[test]
    fn test_truncated_payload() {
        let tree = HuffmanTree::from_bytes(b"hello, huffman").unwrap();
        let out = compress_with_tree(&tree, b"hello, huffman").unwrap();
        let result = decompress_bytes(&out[..out.len() - 1]);
        let err = result.unwrap_err();
        assert!(err.is_end_of_stream(), "unexpected error: {err}");
    }

    #[test]
    fn test_truncated_payload_error_kind() {
        // Header is exactly 3 bytes; cutting the payload byte leaves the
        // decoder at the root with nothing to read.
        let out = compress_with_tree(&sample_tree(), b"AB").unwrap();
        let result = decompress_bytes(&out[..3]);
        assert!(matches!(
            result,
            Err(Error::Codec(CodecError::UnexpectedEndOfStream {
                bits_read: 24,
                bytes_decoded: 0
            }))
        ));
    }

    #[test]
    fn test_truncated_header() {
        let result = decompress_bytes(&[0b1001_0101]);
        assert!(matches!(result, Err(Error::BitIo(BitIoError::UnexpectedEof))));
        assert!(decompress_bytes(&[]).unwrap_err().is_end_of_stream());
    }

    #[test]
    fn test_invalid_header() {
        let result = decompress_bytes(&[0b1000_0000, 0x00]);
        assert!(matches!(
            result,
            Err(Error::Tree(TreeError::DuplicateEndOfMessage))
        ));
    }

    #[test]
    fn test_decode_symbol_sequence() {
        // 10 11 0 after no header: drive decode_symbol directly
        let bits = [0b1011_0000u8];
        let mut reader = BitReader::new(&bits[..]);
        let tree = sample_tree();
        assert_eq!(decode_symbol(&tree, &mut reader).unwrap(), Symbol::Byte(b'A'));
        assert_eq!(decode_symbol(&tree, &mut reader).unwrap(), Symbol::Byte(b'B'));
        assert_eq!(decode_symbol(&tree, &mut reader).unwrap(), Symbol::EndOfMessage);
        assert_eq!(reader.bits_read(), 5);
    }

    #[test]
    fn test_deterministic_output() {
        let data = b"determinism matters for reproducible archives";
        assert_eq!(compress_bytes(data).unwrap(), compress_bytes(data).unwrap());
    }

    #[test]
    fn test_large_round_trip() {
        let data: Vec<u8> = (0..100_000u32).map(|i| ((i * 31) % 97) as u8).collect();
        let out = compress_bytes(&data).unwrap();
        assert!(out.len() < data.len());
        assert_eq!(decompress_bytes(&out).unwrap(), data);
    }
}
