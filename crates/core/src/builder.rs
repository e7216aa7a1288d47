//! Frequency counting and Huffman tree construction.
//!
//! The histogram always carries one extra symbol, end-of-message, counted
//! once per message. Construction is the standard priority-queue merge:
//! repeatedly join the two lightest subtrees until one remains.
//!
//! Ties are broken by insertion order (end-of-message first, then bytes in
//! ascending order, then merged subtrees in the order they were created),
//! so the same histogram always yields the same tree.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io::{self, Read};

use tracing::debug;

use crate::error::{Result, TreeError};
use crate::tree::{HuffmanTree, Node, Symbol};

/// Read size used when counting a stream.
const READ_CHUNK: usize = 8192;

/// Symbol counts for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    end_of_message: u64,
}

impl FrequencyTable {
    /// An all-zero table (no end-of-message count either).
    pub fn new() -> Self {
        Self {
            counts: [0; 256],
            end_of_message: 0,
        }
    }

    /// Count every byte of `data`, plus one end-of-message.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.add_bytes(data);
        table.end_of_message = 1;
        table
    }

    /// Count a whole stream in one pass, plus one end-of-message.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut table = Self::new();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            table.add_bytes(&buf[..n]);
        }
        table.end_of_message = 1;
        Ok(table)
    }

    pub fn add_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
    }

    pub fn set(&mut self, symbol: Symbol, count: u64) {
        match symbol {
            Symbol::EndOfMessage => self.end_of_message = count,
            Symbol::Byte(b) => self.counts[b as usize] = count,
        }
    }

    pub fn count(&self, symbol: Symbol) -> u64 {
        match symbol {
            Symbol::EndOfMessage => self.end_of_message,
            Symbol::Byte(b) => self.counts[b as usize],
        }
    }

    /// Symbols with a non-zero count, end-of-message first, then bytes in
    /// ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        let eom = (self.end_of_message > 0).then_some((Symbol::EndOfMessage, self.end_of_message));
        eom.into_iter().chain(
            self.counts
                .iter()
                .enumerate()
                .filter(|(_, &count)| count > 0)
                .map(|(byte, &count)| (Symbol::Byte(byte as u8), count)),
        )
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.symbols().count()
    }

    /// Sum of all byte counts (end-of-message excluded).
    pub fn total_bytes(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A pending subtree in the merge queue.
struct HeapEntry {
    weight: u64,
    order: u64,
    node: Node,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.order == other.order
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Reversed so BinaryHeap pops the lightest, oldest entry first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl HuffmanTree {
    /// Build a tree from a histogram.
    ///
    /// The lighter of each merged pair becomes the left child.
    ///
    /// # Errors
    /// - `TreeError::EmptyFrequencyTable` if every count is zero
    /// - `TreeError::MissingEndOfMessage` if the end-of-message count is zero
    pub fn from_frequencies(table: &FrequencyTable) -> Result<Self> {
        if table.distinct() == 0 {
            return Err(TreeError::EmptyFrequencyTable.into());
        }
        if table.count(Symbol::EndOfMessage) == 0 {
            return Err(TreeError::MissingEndOfMessage.into());
        }

        let mut heap = BinaryHeap::new();
        let mut order = 0u64;
        for (symbol, weight) in table.symbols() {
            heap.push(HeapEntry {
                weight,
                order,
                node: Node::Leaf(symbol),
            });
            order += 1;
        }

        let root = loop {
            let Some(x) = heap.pop() else {
                return Err(TreeError::EmptyFrequencyTable.into());
            };
            let Some(y) = heap.pop() else {
                break x.node;
            };
            heap.push(HeapEntry {
                weight: x.weight.saturating_add(y.weight),
                order,
                node: Node::branch(x.node, y.node),
            });
            order += 1;
        };

        let tree = HuffmanTree::new(root)?;
        debug!(
            symbols = tree.leaf_count(),
            depth = tree.depth(),
            "built huffman tree"
        );
        Ok(tree)
    }

    /// Count `data` and build its tree.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_frequencies(&FrequencyTable::from_bytes(data))
    }
}
