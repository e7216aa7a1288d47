//! Huffman tree model.
//!
//! A tree is a full binary tree: every `Branch` owns exactly two children and
//! every `Leaf` carries one [`Symbol`]. The path from the root to a leaf is
//! that symbol's codeword (left = 0, right = 1).
//!
//! [`HuffmanTree`] is the validated form. Constructing one checks that:
//! - exactly one leaf holds [`Symbol::EndOfMessage`]
//! - no byte value appears in two leaves
//! - no leaf is deeper than [`MAX_DEPTH`]
//!
//! Once built, a tree is never mutated.

use std::fmt;

use crate::error::{Result, TreeError};

/// Deepest leaf a valid tree can have. A full binary tree over the 257
/// possible symbols (256 bytes plus end-of-message) is at most this deep.
pub const MAX_DEPTH: usize = 256;

/// A member of the coding alphabet.
///
/// Ordering puts `EndOfMessage` before every byte; the tree builder relies
/// on this for deterministic tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// Synthetic terminator with no byte value
    EndOfMessage,
    /// A concrete input byte
    Byte(u8),
}

impl Symbol {
    /// The byte value, or `None` for the end-of-message marker.
    pub fn byte(self) -> Option<u8> {
        match self {
            Symbol::Byte(b) => Some(b),
            Symbol::EndOfMessage => None,
        }
    }

    pub fn is_end_of_message(self) -> bool {
        self == Symbol::EndOfMessage
    }
}

impl From<u8> for Symbol {
    fn from(byte: u8) -> Self {
        Symbol::Byte(byte)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::EndOfMessage => write!(f, "EOM"),
            Symbol::Byte(b) if b.is_ascii_graphic() => write!(f, "'{}'", *b as char),
            Symbol::Byte(b) => write!(f, "{:#04x}", b),
        }
    }
}

/// A tree node. Each branch exclusively owns its two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Symbol),
    Branch { left: Box<Node>, right: Box<Node> },
}

impl Node {
    /// Leaf holding a concrete byte.
    pub fn byte(byte: u8) -> Self {
        Node::Leaf(Symbol::Byte(byte))
    }

    /// Leaf holding the end-of-message marker.
    pub fn end_of_message() -> Self {
        Node::Leaf(Symbol::EndOfMessage)
    }

    pub fn branch(left: Node, right: Node) -> Self {
        Node::Branch {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// The leaf's symbol, or `None` for a branch.
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            Node::Leaf(symbol) => Some(*symbol),
            Node::Branch { .. } => None,
        }
    }

    /// Child selected by one codeword bit (`false` = left, `true` = right).
    /// `None` for a leaf.
    pub fn child(&self, bit: bool) -> Option<&Node> {
        match self {
            Node::Leaf(_) => None,
            Node::Branch { left, right } => Some(if bit { right } else { left }),
        }
    }
}

/// Tracks which symbols have been seen while walking or reading a tree.
#[derive(Debug)]
pub(crate) struct LeafCensus {
    seen: [bool; 256],
    end_of_message: bool,
    leaves: usize,
}

impl LeafCensus {
    pub(crate) fn new() -> Self {
        Self {
            seen: [false; 256],
            end_of_message: false,
            leaves: 0,
        }
    }

    /// Record one leaf, rejecting duplicates.
    pub(crate) fn record(&mut self, symbol: Symbol) -> std::result::Result<(), TreeError> {
        match symbol {
            Symbol::EndOfMessage => {
                if self.end_of_message {
                    return Err(TreeError::DuplicateEndOfMessage);
                }
                self.end_of_message = true;
            }
            Symbol::Byte(b) => {
                let slot = &mut self.seen[b as usize];
                if *slot {
                    return Err(TreeError::DuplicateSymbol(b));
                }
                *slot = true;
            }
        }
        self.leaves += 1;
        Ok(())
    }

    /// Check the end-of-message leaf was seen.
    pub(crate) fn finish(&self) -> std::result::Result<usize, TreeError> {
        if !self.end_of_message {
            return Err(TreeError::MissingEndOfMessage);
        }
        Ok(self.leaves)
    }
}

/// A validated Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
    leaf_count: usize,
}

impl HuffmanTree {
    /// Validate `root` and wrap it.
    ///
    /// # Errors
    /// A `TreeError` format variant if the end-of-message leaf is missing or
    /// repeated, a byte appears twice, or the tree is deeper than
    /// [`MAX_DEPTH`].
    pub fn new(root: Node) -> Result<Self> {
        let mut census = LeafCensus::new();
        let mut stack: Vec<(&Node, usize)> = vec![(&root, 0)];

        while let Some((node, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(TreeError::TooDeep { limit: MAX_DEPTH }.into());
            }
            match node {
                Node::Leaf(symbol) => census.record(*symbol)?,
                Node::Branch { left, right } => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }

        let leaf_count = census.finish()?;
        Ok(Self { root, leaf_count })
    }

    /// Wrap a root whose leaves were already checked with a `LeafCensus`.
    pub(crate) fn from_checked(root: Node, leaf_count: usize) -> Self {
        Self { root, leaf_count }
    }

    /// The tree for an empty message: a lone end-of-message leaf.
    pub fn degenerate() -> Self {
        Self {
            root: Node::end_of_message(),
            leaf_count: 1,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Number of leaves, end-of-message included.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// True if the root itself is the end-of-message leaf.
    pub fn is_degenerate(&self) -> bool {
        self.root.is_leaf()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                Node::Leaf(_) => deepest = deepest.max(depth),
                Node::Branch { left, right } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }

    /// True if `symbol` sits on some leaf.
    pub fn contains(&self, symbol: Symbol) -> bool {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(s) if *s == symbol => return true,
                Node::Leaf(_) => {}
                Node::Branch { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        false
    }
}

impl fmt::Display for HuffmanTree {
    /// Indented outline, one node per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(&self.root, 0usize, "root")];
        while let Some((node, depth, label)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match node {
                Node::Leaf(symbol) => writeln!(f, "{}{} -> {}", indent, label, symbol)?,
                Node::Branch { left, right } => {
                    writeln!(f, "{}{} -> *", indent, label)?;
                    stack.push((right, depth + 1, "1"));
                    stack.push((left, depth + 1, "0"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample_tree() -> Node {
        Node::branch(
            Node::end_of_message(),
            Node::branch(Node::byte(b'A'), Node::byte(b'B')),
        )
    }

    #[test]
    fn test_valid_tree() {
        let tree = HuffmanTree::new(sample_tree()).unwrap();
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.depth(), 2);
        assert!(!tree.is_degenerate());
        assert!(tree.contains(Symbol::Byte(b'B')));
        assert!(tree.contains(Symbol::EndOfMessage));
        assert!(!tree.contains(Symbol::Byte(b'C')));
    }

    #[test]
    fn test_degenerate_tree() {
        let tree = HuffmanTree::new(Node::end_of_message()).unwrap();
        assert!(tree.is_degenerate());
        assert_eq!(tree, HuffmanTree::degenerate());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_missing_end_of_message() {
        let result = HuffmanTree::new(Node::branch(Node::byte(1), Node::byte(2)));
        assert!(matches!(
            result,
            Err(Error::Tree(TreeError::MissingEndOfMessage))
        ));
    }

    #[test]
    fn test_duplicate_end_of_message() {
        let result = HuffmanTree::new(Node::branch(
            Node::end_of_message(),
            Node::end_of_message(),
        ));
        assert!(matches!(
            result,
            Err(Error::Tree(TreeError::DuplicateEndOfMessage))
        ));
    }

    #[test]
    fn test_duplicate_byte() {
        let result = HuffmanTree::new(Node::branch(
            Node::end_of_message(),
            Node::branch(Node::byte(9), Node::byte(9)),
        ));
        assert!(matches!(result, Err(Error::Tree(TreeError::DuplicateSymbol(9)))));
    }

    #[test]
    fn test_too_deep() {
        // Right-leaning spine one level past the limit. Byte 0 hangs off both
        // the top and the bottom, but the bottom leaf is rejected on depth
        // before it is counted.
        let mut node = Node::end_of_message();
        for i in 0..=MAX_DEPTH {
            let byte = Node::byte((i % 256) as u8);
            node = Node::branch(byte, node);
        }
        let result = HuffmanTree::new(node);
        assert!(matches!(
            result,
            Err(Error::Tree(TreeError::TooDeep { limit: MAX_DEPTH }))
        ));
    }

    #[test]
    fn test_child_navigation() {
        let root = sample_tree();
        assert_eq!(root.child(false).and_then(Node::symbol), Some(Symbol::EndOfMessage));
        let right = root.child(true).unwrap();
        assert_eq!(right.child(false).and_then(Node::symbol), Some(Symbol::Byte(b'A')));
        assert!(Node::byte(0).child(true).is_none());
    }

    #[test]
    fn test_symbol_order_and_display() {
        assert!(Symbol::EndOfMessage < Symbol::Byte(0));
        assert!(Symbol::Byte(1) < Symbol::Byte(2));
        assert_eq!(Symbol::Byte(b'A').to_string(), "'A'");
        assert_eq!(Symbol::Byte(0x0a).to_string(), "0x0a");
        assert_eq!(Symbol::EndOfMessage.to_string(), "EOM");
        assert_eq!(Symbol::Byte(7).byte(), Some(7));
        assert_eq!(Symbol::EndOfMessage.byte(), None);
    }

    #[test]
    fn test_display_outline() {
        let tree = HuffmanTree::new(sample_tree()).unwrap();
        let text = tree.to_string();
        assert_eq!(text, "root -> *\n  0 -> EOM\n  1 -> *\n    0 -> 'A'\n    1 -> 'B'\n");
    }
}
