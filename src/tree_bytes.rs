//! Flat on-disk form of a numbered Huffman tree.
//!
//! Every internal node becomes a four-byte record
//! `[left_type, left_data, right_type, right_data]`, written in postorder.
//! A type of [`LEAF`] means the data byte is a symbol; [`INTERNAL`] means it
//! refers to another record.

use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::huffman::Node;

pub const LEAF: u8 = 0;
pub const INTERNAL: u8 = 1;

pub const RECORD_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadNode {
    pub l_type: u8,
    pub l_data: u8,
    pub r_type: u8,
    pub r_data: u8,
}

impl ReadNode {
    pub fn new(l_type: u8, l_data: u8, r_type: u8, r_data: u8) -> Self {
        Self {
            l_type,
            l_data,
            r_type,
            r_data,
        }
    }

    pub fn to_bytes(self) -> [u8; RECORD_LEN] {
        [self.l_type, self.l_data, self.r_type, self.r_data]
    }
}

/// Serialize the internal nodes of a numbered tree in postorder.
pub fn tree_to_bytes(tree: &Node) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_postorder(tree, &mut bytes)?;
    debug!("Serialized tree into {} records", bytes.len() / RECORD_LEN);
    Ok(bytes)
}

fn write_postorder(node: &Node, bytes: &mut Vec<u8>) -> Result<()> {
    if let Node::Internal { left, right, .. } = node {
        write_postorder(left, bytes)?;
        write_postorder(right, bytes)?;
        let (l_type, l_data) = child_entry(left)?;
        let (r_type, r_data) = child_entry(right)?;
        bytes.extend_from_slice(&ReadNode::new(l_type, l_data, r_type, r_data).to_bytes());
    }
    Ok(())
}

fn child_entry(child: &Node) -> Result<(u8, u8)> {
    match child {
        Node::Leaf { byte } => Ok((LEAF, *byte)),
        Node::Internal { number, .. } => number
            .map(|n| (INTERNAL, n))
            .ok_or(Error::UnnumberedNode),
    }
}

/// Record count header byte for a numbered tree: the root's number plus one.
pub fn num_nodes_to_byte(tree: &Node) -> Result<u8> {
    match tree {
        Node::Leaf { .. } => Ok(0),
        Node::Internal { number, .. } => {
            let number = number.ok_or(Error::UnnumberedNode)?;
            number.checked_add(1).ok_or(Error::TooManyNodes(256))
        }
    }
}

pub fn size_to_bytes(size: usize) -> Result<[u8; 4]> {
    let size = u32::try_from(size).map_err(|_| Error::InputTooLarge(size))?;
    Ok(size.to_le_bytes())
}

pub fn bytes_to_size(buf: [u8; 4]) -> u32 {
    u32::from_le_bytes(buf)
}

/// Split a buffer into records.
pub fn bytes_to_nodes(buf: &[u8]) -> Result<Vec<ReadNode>> {
    if buf.len() % RECORD_LEN != 0 {
        return Err(Error::malformed(
            buf.len() / RECORD_LEN,
            format!("{} trailing bytes in record buffer", buf.len() % RECORD_LEN),
        ));
    }
    Ok(buf
        .chunks_exact(RECORD_LEN)
        .map(|c| ReadNode::new(c[0], c[1], c[2], c[3]))
        .collect())
}

/// Rebuild the tree rooted at `records[root_index]`, following record numbers
/// as absolute indices. Makes no assumption about record order.
pub fn generate_tree_general(records: &[ReadNode], root_index: usize) -> Result<Node> {
    let mut visited = vec![false; records.len()];
    let tree = general_subtree(records, root_index, &mut visited)?;

    let unused = visited.iter().filter(|&&v| !v).count();
    if unused > 0 {
        warn!("{} tree records are not reachable from the root", unused);
    }
    Ok(tree)
}

fn general_subtree(records: &[ReadNode], index: usize, visited: &mut [bool]) -> Result<Node> {
    let record = records.get(index).ok_or_else(|| {
        Error::malformed(index, format!("no such record among {}", records.len()))
    })?;
    if std::mem::replace(&mut visited[index], true) {
        return Err(Error::malformed(
            index,
            "record is referenced more than once",
        ));
    }
    trace!("Record {}: {:?}", index, record);

    let left = general_child(records, index, record.l_type, record.l_data, visited)?;
    let right = general_child(records, index, record.r_type, record.r_data, visited)?;
    Ok(Node::internal(left, right))
}

fn general_child(
    records: &[ReadNode],
    parent: usize,
    kind: u8,
    data: u8,
    visited: &mut [bool],
) -> Result<Node> {
    match kind {
        LEAF => Ok(Node::leaf(data)),
        INTERNAL => general_subtree(records, data as usize, visited),
        other => Err(Error::malformed(parent, format!("unknown child type {}", other))),
    }
}

/// Rebuild the tree rooted at `records[root_index]`, assuming the records are
/// in postorder. Record numbers are ignored: an internal right child is the
/// record just before its parent, an internal left child is the record just
/// before the right subtree's records.
pub fn generate_tree_postorder(records: &[ReadNode], root_index: usize) -> Result<Node> {
    if root_index >= records.len() {
        return Err(Error::malformed(
            root_index,
            format!("no such record among {}", records.len()),
        ));
    }
    let mut next = root_index + 1;
    let tree = postorder_subtree(records, &mut next)?;
    if next > 0 {
        warn!("{} tree records precede the reconstructed subtree", next);
    }
    Ok(tree)
}

fn postorder_subtree(records: &[ReadNode], next: &mut usize) -> Result<Node> {
    let Some(index) = next.checked_sub(1) else {
        return Err(Error::malformed(0, "ran out of preceding records"));
    };
    *next = index;
    let record = records[index];
    trace!("Record {}: {:?}", index, record);

    let right = postorder_child(records, index, record.r_type, record.r_data, next)?;
    let left = postorder_child(records, index, record.l_type, record.l_data, next)?;
    Ok(Node::internal(left, right))
}

fn postorder_child(
    records: &[ReadNode],
    parent: usize,
    kind: u8,
    data: u8,
    next: &mut usize,
) -> Result<Node> {
    match kind {
        LEAF => Ok(Node::leaf(data)),
        INTERNAL => postorder_subtree(records, next),
        other => Err(Error::malformed(parent, format!("unknown child type {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::{FreqTable, build_code_table, build_huffman_tree, number_nodes};

    fn pair(a: u8, b: u8) -> Node {
        Node::internal(Node::leaf(a), Node::leaf(b))
    }

    #[test]
    fn serializes_in_postorder() {
        let mut tree = pair(3, 2);
        number_nodes(&mut tree).unwrap();
        assert_eq!(tree_to_bytes(&tree).unwrap(), vec![0, 3, 0, 2]);
        assert_eq!(num_nodes_to_byte(&tree).unwrap(), 1);

        let mut tree = Node::internal(pair(3, 2), Node::leaf(5));
        number_nodes(&mut tree).unwrap();
        assert_eq!(tree_to_bytes(&tree).unwrap(), vec![0, 3, 0, 2, 1, 0, 0, 5]);
        assert_eq!(num_nodes_to_byte(&tree).unwrap(), 2);
    }

    #[test]
    fn unnumbered_tree_is_rejected() {
        let tree = Node::internal(pair(3, 2), Node::leaf(5));
        assert!(matches!(tree_to_bytes(&tree), Err(Error::UnnumberedNode)));
        assert!(matches!(
            num_nodes_to_byte(&tree),
            Err(Error::UnnumberedNode)
        ));
    }

    #[test]
    fn size_is_little_endian() {
        assert_eq!(size_to_bytes(300).unwrap(), [44, 1, 0, 0]);
        assert_eq!(bytes_to_size([44, 1, 0, 0]), 300);
    }

    #[test]
    fn splits_records() {
        assert_eq!(
            bytes_to_nodes(&[0, 1, 0, 2]).unwrap(),
            vec![ReadNode::new(0, 1, 0, 2)]
        );
        assert!(bytes_to_nodes(&[]).unwrap().is_empty());
        assert!(matches!(
            bytes_to_nodes(&[0, 1, 0, 2, 0]),
            Err(Error::MalformedTreeRecord { .. })
        ));
    }

    #[test]
    fn general_follows_indices() {
        let records = [
            ReadNode::new(0, 5, 0, 7),
            ReadNode::new(0, 10, 0, 12),
            ReadNode::new(1, 1, 1, 0),
        ];
        let tree = generate_tree_general(&records, 2).unwrap();
        assert_eq!(tree, Node::internal(pair(10, 12), pair(5, 7)));
    }

    #[test]
    fn postorder_follows_positions() {
        let records = [
            ReadNode::new(0, 5, 0, 7),
            ReadNode::new(0, 10, 0, 12),
            ReadNode::new(1, 0, 1, 0),
        ];
        let tree = generate_tree_postorder(&records, 2).unwrap();
        assert_eq!(tree, Node::internal(pair(5, 7), pair(10, 12)));
    }

    #[test]
    fn strategies_agree_on_serialized_trees() {
        // Left subtree deeper than one record, which positional decoding must skip over.
        let mut tree = Node::internal(
            Node::internal(pair(1, 2), Node::leaf(3)),
            Node::internal(Node::leaf(4), pair(5, 6)),
        );
        let count = number_nodes(&mut tree).unwrap();
        let records = bytes_to_nodes(&tree_to_bytes(&tree).unwrap()).unwrap();
        assert_eq!(records.len(), count);

        let general = generate_tree_general(&records, count - 1).unwrap();
        let postorder = generate_tree_postorder(&records, count - 1).unwrap();
        assert_eq!(general, postorder);
        assert_eq!(build_code_table(&general), build_code_table(&tree));
    }

    #[test]
    fn round_trip_preserves_codes() {
        let freq = FreqTable::analyze(b"she sells sea shells by the sea shore");
        let mut tree = build_huffman_tree(&freq).unwrap();
        let count = number_nodes(&mut tree).unwrap();
        let records = bytes_to_nodes(&tree_to_bytes(&tree).unwrap()).unwrap();
        let rebuilt = generate_tree_general(&records, count - 1).unwrap();
        assert_eq!(build_code_table(&rebuilt), build_code_table(&tree));
    }

    #[test]
    fn general_rejects_bad_records() {
        let out_of_bounds = [ReadNode::new(1, 7, 0, 1)];
        assert!(matches!(
            generate_tree_general(&out_of_bounds, 0),
            Err(Error::MalformedTreeRecord { index: 7, .. })
        ));

        let cycle = [ReadNode::new(1, 0, 0, 1)];
        assert!(matches!(
            generate_tree_general(&cycle, 0),
            Err(Error::MalformedTreeRecord { index: 0, .. })
        ));

        let shared = [ReadNode::new(0, 1, 0, 2), ReadNode::new(1, 0, 1, 0)];
        assert!(generate_tree_general(&shared, 1).is_err());

        let bad_type = [ReadNode::new(2, 0, 0, 1)];
        assert!(generate_tree_general(&bad_type, 0).is_err());

        assert!(generate_tree_general(&[], 0).is_err());
    }

    #[test]
    fn postorder_rejects_missing_records() {
        let records = [ReadNode::new(1, 0, 0, 1)];
        assert!(matches!(
            generate_tree_postorder(&records, 0),
            Err(Error::MalformedTreeRecord { .. })
        ));
        assert!(generate_tree_postorder(&records, 3).is_err());
    }
}
