//! Bit-level tree description.
//!
//! # Format
//!
//! Pre-order, self-delimiting, not byte-aligned:
//!
//! ```text
//! Branch            1 <left> <right>
//! Leaf(Byte(b))     0 1 b7 b6 b5 b4 b3 b2 b1 b0
//! Leaf(EndOfMsg)    0 0
//! ```
//!
//! A branch tag (`1`) never collides with a leaf tag (`0x`), and the two leaf
//! tags differ in their second bit, so the description parses without
//! lookahead.
//!
//! Both directions run on an explicit stack, so a hostile header can cost at
//! most [`MAX_DEPTH`] pending branches before it is rejected.

use std::io::{Read, Write};

use tracing::trace;

use crate::bitio::{BitReader, BitWriter};
use crate::error::{Result, TreeError};
use crate::tree::{HuffmanTree, LeafCensus, Node, Symbol, MAX_DEPTH};

/// Write the description of `tree`. Does not pad or flush.
pub fn write_tree<W: Write>(tree: &HuffmanTree, writer: &mut BitWriter<W>) -> Result<()> {
    let start = writer.bits_written();
    let mut stack = vec![tree.root()];

    while let Some(node) = stack.pop() {
        match node {
            Node::Branch { left, right } => {
                writer.write_bit(true)?;
                stack.push(right);
                stack.push(left);
            }
            Node::Leaf(Symbol::Byte(b)) => {
                writer.write_bits(0b01, 2)?;
                writer.write_bits(*b as u64, 8)?;
            }
            Node::Leaf(Symbol::EndOfMessage) => {
                writer.write_bits(0b00, 2)?;
            }
        }
    }

    trace!(bits = writer.bits_written() - start, "wrote tree description");
    Ok(())
}

/// Where a finished subtree attaches when the stack unwinds.
enum Pending {
    /// Branch whose left subtree is being read
    Left,
    /// Branch whose left subtree is done; right is being read
    Right(Node),
}

/// Read one tree description, leaving `reader` on the first bit after it.
///
/// # Errors
/// - `BitIoError::UnexpectedEof` if the stream ends inside the description
/// - a `TreeError` format variant as soon as a read leaf or branch breaks a
///   tree invariant (duplicate symbol, second end-of-message, too deep), or
///   once the tree completes without an end-of-message leaf
pub fn read_tree<R: Read>(reader: &mut BitReader<R>) -> Result<HuffmanTree> {
    let start = reader.bits_read();
    let mut census = LeafCensus::new();
    let mut stack: Vec<Pending> = Vec::new();

    loop {
        let mut node = if reader.read_bit()? {
            // Children of this branch would sit at depth stack.len() + 1
            if stack.len() >= MAX_DEPTH {
                return Err(TreeError::TooDeep { limit: MAX_DEPTH }.into());
            }
            stack.push(Pending::Left);
            continue;
        } else if reader.read_bit()? {
            let byte = reader.read_bits(8)? as u8;
            census.record(Symbol::Byte(byte))?;
            Node::byte(byte)
        } else {
            census.record(Symbol::EndOfMessage)?;
            Node::end_of_message()
        };

        // Attach the finished subtree, folding completed branches upward
        loop {
            match stack.pop() {
                None => {
                    let leaf_count = census.finish()?;
                    trace!(
                        bits = reader.bits_read() - start,
                        leaves = leaf_count,
                        "read tree description"
                    );
                    return Ok(HuffmanTree::from_checked(node, leaf_count));
                }
                Some(Pending::Left) => {
                    stack.push(Pending::Right(node));
                    break;
                }
                Some(Pending::Right(left)) => node = Node::branch(left, node),
            }
        }
    }
}

/// Length in bits of the description of `tree`.
pub fn description_bits(tree: &HuffmanTree) -> u64 {
    let mut bits = 0u64;
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        bits += match node {
            Node::Branch { left, right } => {
                stack.push(left);
                stack.push(right);
                1
            }
            Node::Leaf(Symbol::Byte(_)) => 10,
            Node::Leaf(Symbol::EndOfMessage) => 2,
        };
    }
    bits
}
