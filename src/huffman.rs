use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use log::{debug, trace};

use crate::error::{Error, Result};

pub type Symbol = u8;
pub type CodeTable = HashMap<Symbol, String>;

/// Largest number of internal nodes the one-byte node count can describe.
pub const MAX_INTERNAL_NODES: usize = u8::MAX as usize;

/// Occurrence counts per byte value.
///
/// Symbols are remembered in the order they were first seen. Tree
/// construction breaks weight ties by that order, so the same input always
/// yields the same tree.
#[derive(Debug, Clone)]
pub struct FreqTable {
    counts: [u64; 256],
    order: Vec<Symbol>,
}

impl Default for FreqTable {
    fn default() -> Self {
        Self {
            counts: [0; 256],
            order: Vec::new(),
        }
    }
}

impl FreqTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every byte of `data` in a single pass.
    pub fn analyze(data: &[u8]) -> Self {
        let mut freq = Self::new();
        for &byte in data {
            freq.add(byte, 1);
        }
        debug!(
            "Frequency table: {} unique symbols over {} bytes",
            freq.len(),
            data.len()
        );
        freq
    }

    fn add(&mut self, symbol: Symbol, count: u64) {
        if count == 0 {
            return;
        }
        let slot = &mut self.counts[symbol as usize];
        if *slot == 0 {
            self.order.push(symbol);
        }
        *slot += count;
    }

    pub fn get(&self, symbol: Symbol) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.order.iter().map(|&s| self.get(s)).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.order.iter().map(|&s| (s, self.get(s)))
    }
}

impl FromIterator<(Symbol, u64)> for FreqTable {
    fn from_iter<I: IntoIterator<Item = (Symbol, u64)>>(iter: I) -> Self {
        let mut freq = Self::new();
        for (symbol, count) in iter {
            freq.add(symbol, count);
        }
        freq
    }
}

impl PartialEq for FreqTable {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl Eq for FreqTable {}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Node {
    Leaf { byte: Symbol },
    Internal {
        number: Option<u8>,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn leaf(byte: Symbol) -> Self {
        Node::Leaf { byte }
    }

    pub fn internal(left: Node, right: Node) -> Self {
        Node::Internal {
            number: None,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            Node::Leaf { byte } => Some(*byte),
            Node::Internal { .. } => None,
        }
    }

    pub fn number(&self) -> Option<u8> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { number, .. } => *number,
        }
    }
}

pub type HuffmanTree = Node;

/// Working entry of the greedy merge.
#[derive(Eq, PartialEq)]
struct HeapNode {
    freq: u64,
    seq: usize,
    node: Node,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for Min-Heap behavior in BinaryHeap (which is max-heap by default).
        // Equal weights pop in creation order, so merged nodes queue behind older ones.
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn entropy_from_freq(freq: &FreqTable) -> f64 {
    let total = freq.total();
    if total == 0 {
        return 0.0;
    }
    let total_f = total as f64;

    let entropy: f64 = freq
        .iter()
        .map(|(_, count)| {
            let p = count as f64 / total_f;
            -p * p.log2()
        })
        .sum();

    debug!(
        "Calculated entropy: {:.4} bits/symbol (Total samples: {})",
        entropy, total
    );
    entropy
}

/// Build the Huffman tree for `frequencies`.
///
/// Returns `None` for an empty table. A single symbol becomes both children
/// of the root so that it still gets a one-bit code.
pub fn build_huffman_tree(frequencies: &FreqTable) -> Option<HuffmanTree> {
    debug!(
        "Building Huffman Tree from {} unique symbols",
        frequencies.len()
    );

    let (first, first_freq) = frequencies.iter().next()?;
    if frequencies.len() == 1 {
        trace!(
            "Single symbol {:#04x} (x{}), duplicating leaf",
            first, first_freq
        );
        return Some(Node::internal(Node::leaf(first), Node::leaf(first)));
    }

    let mut heap = BinaryHeap::with_capacity(frequencies.len());
    for (seq, (byte, freq)) in frequencies.iter().enumerate() {
        heap.push(HeapNode {
            freq,
            seq,
            node: Node::leaf(byte),
        });
    }
    let mut next_seq = heap.len();

    while heap.len() > 1 {
        let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
            break;
        };
        let freq = left.freq + right.freq;
        trace!(
            "Merging weights {} + {} -> {} (seq {})",
            left.freq, right.freq, freq, next_seq
        );
        heap.push(HeapNode {
            freq,
            seq: next_seq,
            node: Node::internal(left.node, right.node),
        });
        next_seq += 1;
    }

    debug!("Tree construction complete.");
    heap.pop().map(|n| n.node)
}

/// Map every leaf symbol to its path: '0' for left, '1' for right.
pub fn build_code_table(tree: &Node) -> CodeTable {
    let mut table = CodeTable::new();
    let mut stack = vec![(tree, String::new())];

    while let Some((node, prefix)) = stack.pop() {
        match node {
            Node::Leaf { byte } => {
                trace!(
                    "Assigning code to byte {:#04x} ('{}') : '{}'",
                    byte,
                    (*byte as char).escape_default(),
                    prefix
                );
                table.insert(*byte, prefix);
            }
            Node::Internal { left, right, .. } => {
                // Right goes on the stack first so the left subtree is visited first.
                stack.push((right.as_ref(), format!("{}1", prefix)));
                stack.push((left.as_ref(), format!("{}0", prefix)));
            }
        }
    }
    table
}

/// Expected code length in bits per symbol for `freq` under `tree`.
pub fn avg_length(tree: &Node, freq: &FreqTable) -> f64 {
    let codes = build_code_table(tree);
    let mut total_bits = 0u64;
    let mut total_symbols = 0u64;
    for (&symbol, code) in &codes {
        let count = freq.get(symbol);
        total_bits += code.len() as u64 * count;
        total_symbols += count;
    }
    if total_symbols == 0 {
        return 0.0;
    }
    total_bits as f64 / total_symbols as f64
}

/// Number internal nodes in postorder starting at 0; returns how many there are.
pub fn number_nodes(tree: &mut Node) -> Result<usize> {
    let mut next = 0;
    number_postorder(tree, &mut next)?;
    debug!("Numbered {} internal nodes", next);
    Ok(next)
}

fn number_postorder(node: &mut Node, next: &mut usize) -> Result<()> {
    if let Node::Internal {
        number,
        left,
        right,
    } = node
    {
        number_postorder(left, next)?;
        number_postorder(right, next)?;
        if *next >= MAX_INTERNAL_NODES {
            return Err(Error::TooManyNodes(*next + 1));
        }
        *number = Some(*next as u8);
        *next += 1;
    }
    Ok(())
}

/// Reassign leaf symbols, keeping the shape, to move towards the assignment
/// of a freshly built Huffman tree for `freq`.
///
/// Leaves of both trees are paired up left to right; wherever they disagree
/// the wanted symbol is swapped in from wherever it currently sits.
pub fn improve_tree(tree: &mut Node, freq: &FreqTable) {
    let Some(ideal) = build_huffman_tree(freq) else {
        return;
    };
    let ideal_leaves = leaf_symbols(&ideal);
    let mut symbols = leaf_symbols(tree);

    let mut swaps = 0;
    for i in 0..symbols.len().min(ideal_leaves.len()) {
        let wanted = ideal_leaves[i];
        if symbols[i] == wanted {
            continue;
        }
        if let Some(j) = symbols.iter().position(|&s| s == wanted) {
            trace!(
                "Swapping leaf {} ({:#04x}) with leaf {} ({:#04x})",
                i, symbols[i], j, wanted
            );
            symbols.swap(i, j);
            swaps += 1;
        }
    }

    let mut assigned = symbols.into_iter();
    assign_leaf_symbols(tree, &mut assigned);
    debug!("Tree improvement made {} swaps", swaps);
}

/// Leaf symbols in left-to-right (postorder) order.
pub fn leaf_symbols(tree: &Node) -> Vec<Symbol> {
    fn walk(node: &Node, out: &mut Vec<Symbol>) {
        match node {
            Node::Leaf { byte } => out.push(*byte),
            Node::Internal { left, right, .. } => {
                walk(left, out);
                walk(right, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

fn assign_leaf_symbols(node: &mut Node, symbols: &mut impl Iterator<Item = Symbol>) {
    match node {
        Node::Leaf { byte } => {
            if let Some(symbol) = symbols.next() {
                *byte = symbol;
            }
        }
        Node::Internal { left, right, .. } => {
            assign_leaf_symbols(left, symbols);
            assign_leaf_symbols(right, symbols);
        }
    }
}
