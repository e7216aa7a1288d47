//! Codewords and the symbol → codeword encoding table.
//!
//! A codeword is the root-to-leaf path of a symbol (0 = left, 1 = right),
//! stored as a packed, MSB-first bit vector so it can be written to a
//! [`BitWriter`] 64 bits at a time.

use std::fmt;
use std::io::Write;

use crate::bitio::BitWriter;
use crate::builder::FrequencyTable;
use crate::error::Result;
use crate::tree::{HuffmanTree, Node, Symbol};

const WORD_BITS: usize = 64;

/// A variable-length bit sequence.
///
/// # Invariants
/// - bit `i` lives in `words[i / 64]` at position `63 - i % 64`
/// - bits past `len` in the last word are zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Codeword {
    words: Vec<u64>,
    len: usize,
}

impl Codeword {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        let offset = self.len % WORD_BITS;
        if offset == 0 {
            self.words.push(0);
        }
        if bit {
            if let Some(word) = self.words.last_mut() {
                *word |= 1 << (WORD_BITS - 1 - offset);
            }
        }
        self.len += 1;
    }

    /// Bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        let word = self.words[index / WORD_BITS];
        Some((word >> (WORD_BITS - 1 - index % WORD_BITS)) & 1 == 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// True if every bit of `self` matches the start of `other`.
    /// A codeword is a prefix of itself.
    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        if self.len > other.len {
            return false;
        }
        let full = self.len / WORD_BITS;
        if self.words[..full] != other.words[..full] {
            return false;
        }
        let rem = self.len % WORD_BITS;
        if rem == 0 {
            return true;
        }
        let mask = !0u64 << (WORD_BITS - rem);
        self.words[full] == other.words[full] & mask
    }

    /// Write the bits in order.
    pub fn write_to<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        let mut remaining = self.len;
        for &word in &self.words {
            let count = remaining.min(WORD_BITS);
            writer.write_bits(word >> (WORD_BITS - count), count)?;
            remaining -= count;
        }
        Ok(())
    }

    fn extended(&self, bit: bool) -> Codeword {
        let mut next = self.clone();
        next.push(bit);
        next
    }
}

impl FromIterator<bool> for Codeword {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut codeword = Codeword::new();
        for bit in iter {
            codeword.push(bit);
        }
        codeword
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol → codeword mapping for one tree.
#[derive(Debug, Clone)]
pub struct EncodingTable {
    bytes: Vec<Option<Codeword>>,
    end_of_message: Codeword,
}

impl EncodingTable {
    /// Walk `tree` once and record the path to every leaf.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut bytes = vec![None; 256];
        let mut end_of_message = None;

        let mut stack = vec![(tree.root(), Codeword::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                Node::Leaf(Symbol::Byte(b)) => bytes[*b as usize] = Some(path),
                Node::Leaf(Symbol::EndOfMessage) => end_of_message = Some(path),
                Node::Branch { left, right } => {
                    stack.push((right, path.extended(true)));
                    stack.push((left, path.extended(false)));
                }
            }
        }

        Self {
            bytes,
            // HuffmanTree guarantees exactly one end-of-message leaf
            end_of_message: end_of_message.unwrap_or_default(),
        }
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Codeword> {
        match symbol {
            Symbol::EndOfMessage => Some(&self.end_of_message),
            Symbol::Byte(b) => self.byte(b),
        }
    }

    pub fn byte(&self, byte: u8) -> Option<&Codeword> {
        self.bytes[byte as usize].as_ref()
    }

    pub fn end_of_message(&self) -> &Codeword {
        &self.end_of_message
    }

    /// Entries, end-of-message first, then bytes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Codeword)> + '_ {
        std::iter::once((Symbol::EndOfMessage, &self.end_of_message)).chain(
            self.bytes
                .iter()
                .enumerate()
                .filter_map(|(b, cw)| cw.as_ref().map(|cw| (Symbol::Byte(b as u8), cw))),
        )
    }

    /// Number of symbols in the table, end-of-message included.
    pub fn len(&self) -> usize {
        1 + self.bytes.iter().filter(|cw| cw.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pairwise check that no codeword is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let entries: Vec<_> = self.iter().collect();
        for (i, (_, a)) in entries.iter().enumerate() {
            for (_, b) in &entries[i + 1..] {
                if a.is_prefix_of(b) || b.is_prefix_of(a) {
                    return false;
                }
            }
        }
        true
    }

    /// Payload size in bits for a message with these counts: every codeword
    /// times its count, end-of-message included. Symbols missing from the
    /// table are ignored.
    pub fn payload_bits(&self, frequencies: &FrequencyTable) -> u64 {
        self.iter()
            .map(|(symbol, cw)| frequencies.count(symbol) * cw.len() as u64)
            .sum()
    }
}
