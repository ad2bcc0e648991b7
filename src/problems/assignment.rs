//! Bitmask encoding of 0/1 assignments to the vertices of a bag.
//!
//! Bit `i` of a mask is the value of `bag[i]`. Bags are sorted, so two nodes
//! agree on the bit order of their shared vertices.

use crate::decomposition::NodeId;
use crate::error::AlgorithmFailure;
use crate::hypergraph::{Hyperedge, Vertex};
use crate::tables::NodeTableStore;

/// Largest bag the reference algorithms enumerate.
pub const MAX_BAG_SIZE: usize = 24;

pub fn check_bag(bag: &[Vertex]) -> Result<(), AlgorithmFailure> {
    if bag.len() > MAX_BAG_SIZE {
        return Err(AlgorithmFailure::new(format!(
            "bag of {} vertices exceeds the limit of {MAX_BAG_SIZE}",
            bag.len()
        )));
    }
    Ok(())
}

/// All assignments of a bag of `len` vertices.
pub fn assignments(len: usize) -> std::ops::Range<u64> {
    0..(1u64 << len)
}

/// Masks of the (non-empty) hyperedges within `bag`.
pub fn edge_masks(bag: &[Vertex], edges: &[Hyperedge]) -> Vec<u64> {
    edges
        .iter()
        .map(|e| mask_of(bag, e.vertices()))
        .filter(|&m| m != 0)
        .collect()
}

/// Mask of the members of `vertices` that lie in `bag`.
pub fn mask_of(bag: &[Vertex], vertices: &[Vertex]) -> u64 {
    vertices
        .iter()
        .filter_map(|v| bag.binary_search(v).ok())
        .fold(0, |mask, i| mask | (1 << i))
}

/// Vertices set to 1 by `mask`.
pub fn selected(bag: &[Vertex], mask: u64) -> impl Iterator<Item = Vertex> + '_ {
    bag.iter()
        .enumerate()
        .filter(move |(i, _)| mask & (1 << i) != 0)
        .map(|(_, &v)| v)
}

/// Moves the bits of shared vertices from one bag's encoding to another's.
#[derive(Debug, Clone)]
pub struct Projection {
    pairs: Vec<(u32, u32)>,
    target_mask: u64,
}

impl Projection {
    pub fn new(from: &[Vertex], to: &[Vertex]) -> Self {
        let mut pairs = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < from.len() && j < to.len() {
            match from[i].cmp(&to[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    pairs.push((i as u32, j as u32));
                    i += 1;
                    j += 1;
                }
            }
        }
        let target_mask = pairs.iter().fold(0, |m, &(_, t)| m | (1u64 << t));
        Self { pairs, target_mask }
    }

    pub fn apply(&self, mask: u64) -> u64 {
        self.pairs
            .iter()
            .filter(|&&(f, _)| mask & (1 << f) != 0)
            .fold(0, |out, &(_, t)| out | (1 << t))
    }

    /// Bits of the shared vertices in the target encoding.
    pub fn target_mask(&self) -> u64 {
        self.target_mask
    }
}

/// Table of `node`, turning a missing one into a failure of the calling
/// algorithm.
pub fn table_of<T>(tables: &NodeTableStore<T>, node: NodeId) -> Result<&T, AlgorithmFailure> {
    tables.at(node).map_err(|e| AlgorithmFailure::new(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_maps_shared_bits() {
        let from = [1, 3, 5, 7];
        let to = [0, 3, 7];
        let p = Projection::new(&from, &to);
        // 3 and 7 set in `from` -> bits 1 and 2 in `to`
        assert_eq!(p.apply(0b1010), 0b110);
        assert_eq!(p.apply(0b0101), 0);
        assert_eq!(p.target_mask(), 0b110);
    }

    #[test]
    fn masks_and_selection() {
        let bag = [2, 4, 6];
        assert_eq!(mask_of(&bag, &[4, 6, 9]), 0b110);
        assert_eq!(selected(&bag, 0b101).collect::<Vec<_>>(), vec![2, 6]);
        let edges = [Hyperedge::new(0, [2, 4]), Hyperedge::new(1, [8, 9])];
        assert_eq!(edge_masks(&bag, &edges), vec![0b011]);
        assert_eq!(assignments(3).count(), 8);
        assert!(check_bag(&[0; 25]).is_err());
    }
}
