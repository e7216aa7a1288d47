//! Integration tests for the full compression pipeline.
//!
//! These tests go through the public API end to end: histogram -> tree ->
//! compressed stream (in memory or on disk) -> decoded bytes, and check that
//! the output matches the input exactly.

use std::fs;
use std::io::BufReader;

use huffpress_core::{
    bitio::BitReader,
    compress, compress_bytes, compress_file, compress_with_tree, decompress, decompress_bytes,
    decompress_file,
    error::{CodecError, Error},
    tree_codec::read_tree,
    EncodingTable, FrequencyTable, HuffmanTree, Node, Symbol,
};

/// The worked example: EOM on the left, A and B under the right branch.
fn ab_tree() -> HuffmanTree {
    HuffmanTree::new(Node::branch(
        Node::end_of_message(),
        Node::branch(Node::byte(0x41), Node::byte(0x42)),
    ))
    .expect("valid tree")
}

#[test]
fn test_worked_example() {
    let tree = ab_tree();

    let table = EncodingTable::from_tree(&tree);
    assert_eq!(table.get(Symbol::EndOfMessage).unwrap().to_string(), "0");
    assert_eq!(table.get(Symbol::Byte(b'A')).unwrap().to_string(), "10");
    assert_eq!(table.get(Symbol::Byte(b'B')).unwrap().to_string(), "11");

    let packed = compress_with_tree(&tree, b"AB").expect("compression failed");
    // header: 1 00 1 01 01000001 01 01000010
    // payload: 10 11 0, then 000 padding
    assert_eq!(packed, vec![0x95, 0x05, 0x42, 0xB0]);

    let decoded = decompress_bytes(&packed).expect("decompression failed");
    assert_eq!(decoded, b"AB");
}

#[test]
fn test_round_trip_text() {
    let input: &[u8] = b"hello world! this is a test of the full pipeline \
        with some repetition: aaaaaaaaaa bbbbbbbbbb cccccccccc";

    let packed = compress_bytes(input).expect("compression failed");
    assert!(packed.len() < input.len());

    let decoded = decompress_bytes(&packed).expect("decompression failed");
    assert_eq!(decoded, input, "output doesn't match input");
}

/// Test with all symbols present (full 256-byte alphabet).
#[test]
fn test_all_symbols() {
    let input: Vec<u8> = (0..=255).collect();

    let tree = HuffmanTree::from_bytes(&input).unwrap();
    assert_eq!(tree.leaf_count(), 257);

    let table = EncodingTable::from_tree(&tree);
    assert_eq!(table.len(), 257);
    assert!(table.is_prefix_free());

    let packed = compress_with_tree(&tree, &input).unwrap();
    assert_eq!(decompress_bytes(&packed).unwrap(), input);
}

#[test]
fn test_single_repeated_byte() {
    let input = vec![b'X'; 64 * 1024];

    let packed = compress_bytes(&input).unwrap();
    // One bit per byte plus a tiny header
    assert!(packed.len() < input.len() / 7);

    assert_eq!(decompress_bytes(&packed).unwrap(), input);
}

#[test]
fn test_empty_message() {
    let packed = compress_bytes(b"").unwrap();
    assert_eq!(packed, vec![0x00]);
    assert!(decompress_bytes(&packed).unwrap().is_empty());
}

#[test]
fn test_tree_from_other_data_covers_input() {
    // A tree built from a superset alphabet encodes any subset message
    let tree = HuffmanTree::from_bytes(b"the quick brown fox jumps over the lazy dog").unwrap();
    let packed = compress_with_tree(&tree, b"fox dog").unwrap();
    assert_eq!(decompress_bytes(&packed).unwrap(), b"fox dog");
}

#[test]
fn test_tree_missing_input_byte() {
    let tree = HuffmanTree::from_bytes(b"abc").unwrap();
    let result = compress_with_tree(&tree, b"abcd");
    assert!(matches!(
        result,
        Err(Error::Codec(CodecError::UnmappedByte { byte: b'd', offset: 3 }))
    ));
}

#[test]
fn test_header_parses_back_to_same_tree() {
    let input = b"she sells sea shells by the sea shore";
    let tree = HuffmanTree::from_bytes(input).unwrap();
    let packed = compress_with_tree(&tree, input).unwrap();

    let mut reader = BitReader::new(&packed[..]);
    let parsed = read_tree(&mut reader).unwrap();
    assert_eq!(parsed, tree);
}

#[test]
fn test_truncation_detected() {
    let input = b"The quick brown fox jumps over the lazy dog. ".repeat(20);
    let packed = compress_bytes(&input).unwrap();

    let err = decompress_bytes(&packed[..packed.len() - 1]).unwrap_err();
    assert!(err.is_end_of_stream(), "expected end of stream, got {err}");
}

#[test]
fn test_streaming_api_with_writers() {
    let input = b"streams are just readers and writers".to_vec();
    let tree = HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(&input)).unwrap();

    let mut packed = Vec::new();
    let stats = compress(&tree, &input[..], &mut packed).unwrap();
    assert_eq!(stats.input_bytes, input.len() as u64);
    assert_eq!(stats.output_bytes, packed.len() as u64);

    let mut decoded = Vec::new();
    let stats = decompress(&packed[..], &mut decoded).unwrap();
    assert_eq!(decoded, input);
    assert_eq!(stats.output_bytes, input.len() as u64);
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("input.txt");
    let packed = dir.path().join("input.txt.huf");
    let restored = dir.path().join("input.txt.huf.decomp");

    let content =
        b"Huffman coding is a greedy algorithm that builds optimal prefix codes.\n".repeat(50);
    fs::write(&src, &content).unwrap();

    let stats = compress_file(&src, &packed).unwrap();
    assert_eq!(stats.input_bytes, content.len() as u64);
    assert_eq!(fs::metadata(&packed).unwrap().len(), stats.output_bytes);

    decompress_file(&packed, &restored).unwrap();
    assert_eq!(fs::read(&restored).unwrap(), content);
}

#[test]
fn test_failed_decompress_removes_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("broken.huf");
    let dst = dir.path().join("broken.huf.decomp");

    let packed = compress_bytes(&b"truncate me please".repeat(10)).unwrap();
    fs::write(&src, &packed[..packed.len() - 1]).unwrap();

    let err = decompress_file(&src, &dst).unwrap_err();
    assert!(err.is_end_of_stream());
    assert!(!dst.exists());
}

#[test]
fn test_frequency_table_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("counts.bin");
    fs::write(&src, b"aab").unwrap();

    let table = FrequencyTable::from_reader(BufReader::new(fs::File::open(&src).unwrap())).unwrap();
    assert_eq!(table.count(Symbol::Byte(b'a')), 2);
    assert_eq!(table.count(Symbol::Byte(b'b')), 1);
    assert_eq!(table.count(Symbol::EndOfMessage), 1);
}

#[test]
fn test_compress_refuses_aliased_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.txt");
    let aliased = dir.path().join(".").join("a.txt");
    let content = b"irreplaceable notes, no backup".to_vec();
    fs::write(&src, &content).unwrap();

    let err = compress_file(&src, &aliased).unwrap_err();
    assert!(matches!(err, Error::Codec(CodecError::OutputIsInput { .. })));
    assert_eq!(fs::read(&src).unwrap(), content);
}

#[test]
fn test_decompress_refuses_aliased_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("a.huf");
    let aliased = dir.path().join(".").join("a.huf");
    let packed = compress_bytes(b"keep the archive").unwrap();
    fs::write(&src, &packed).unwrap();

    let err = decompress_file(&src, &aliased).unwrap_err();
    assert!(matches!(err, Error::Codec(CodecError::OutputIsInput { .. })));
    assert_eq!(fs::read(&src).unwrap(), packed);
}

#[test]
fn test_existing_distinct_output_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("b.txt");
    let dst = dir.path().join("b.txt.huf");
    fs::write(&src, b"fresh contents").unwrap();
    fs::write(&dst, b"stale").unwrap();

    compress_file(&src, &dst).unwrap();
    assert_eq!(decompress_bytes(&fs::read(&dst).unwrap()).unwrap(), b"fresh contents");
}
