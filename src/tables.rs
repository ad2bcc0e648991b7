//! Per-node storage of DP tables.
//!
//! The store owns every table handed to it. Slots are indexed densely by
//! [`NodeId`], so lookups and evictions are O(1).
//!
//! Tables are tagged with the pass that inserted them. Inserting twice for
//! the same node within one pass is a contract violation; inserting over a
//! table left by an earlier pass replaces it, which is how multi-pass
//! pipelines rewrite tables.

use crate::decomposition::NodeId;
use crate::error::TableStoreError;

#[derive(Debug)]
struct Entry<T> {
    table: T,
    pass: usize,
}

/// Mapping from decomposition node to its DP table.
#[derive(Debug)]
pub struct NodeTableStore<T> {
    slots: Vec<Option<Entry<T>>>,
    len: usize,
    peak: usize,
    pass: usize,
}

impl<T> Default for NodeTableStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodeTableStore<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Store pre-sized for a decomposition with `node_count` nodes.
    pub fn with_capacity(node_count: usize) -> Self {
        let mut slots = Vec::with_capacity(node_count);
        slots.resize_with(node_count, || None);
        Self {
            slots,
            len: 0,
            peak: 0,
            pass: 0,
        }
    }

    /// Start a new pass and return its number (1-based).
    pub fn begin_pass(&mut self) -> usize {
        self.pass += 1;
        self.pass
    }

    /// Number of the current pass; 0 before the first pass started.
    pub fn current_pass(&self) -> usize {
        self.pass
    }

    /// Store `table` for `node`.
    ///
    /// Fails, leaving the stored table untouched, if `node` already holds a
    /// table inserted during the current pass.
    pub fn insert(&mut self, node: NodeId, table: T) -> Result<(), TableStoreError> {
        let idx = node.index();
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        let pass = self.pass;
        match &mut self.slots[idx] {
            Some(entry) if entry.pass == pass => Err(TableStoreError::DuplicateInsert { node, pass }),
            Some(entry) => {
                *entry = Entry { table, pass };
                Ok(())
            }
            slot @ None => {
                *slot = Some(Entry { table, pass });
                self.len += 1;
                self.peak = self.peak.max(self.len);
                Ok(())
            }
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    pub fn get(&self, node: NodeId) -> Option<&T> {
        self.slots
            .get(node.index())
            .and_then(Option::as_ref)
            .map(|e| &e.table)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        self.slots
            .get_mut(node.index())
            .and_then(Option::as_mut)
            .map(|e| &mut e.table)
    }

    /// Table of `node`, failing if none is stored.
    pub fn at(&self, node: NodeId) -> Result<&T, TableStoreError> {
        self.get(node).ok_or(TableStoreError::MissingTable { node })
    }

    /// Pass that inserted the table of `node`.
    pub fn pass_of(&self, node: NodeId) -> Option<usize> {
        self.slots
            .get(node.index())
            .and_then(Option::as_ref)
            .map(|e| e.pass)
    }

    /// Drop the table of `node`; returns whether one was stored.
    pub fn erase(&mut self, node: NodeId) -> bool {
        match self.slots.get_mut(node.index()).and_then(Option::take) {
            Some(_) => {
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest number of tables held at once since creation.
    pub fn peak_len(&self) -> usize {
        self.peak
    }

    /// Stored tables in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .map(|e| (NodeId::new(i as u32), &e.table))
        })
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_erase() {
        let mut store = NodeTableStore::with_capacity(2);
        store.begin_pass();
        let n0 = NodeId::new(0);
        let n5 = NodeId::new(5);
        store.insert(n0, "root").unwrap();
        store.insert(n5, "far").unwrap();
        assert!(store.contains(n5));
        assert_eq!(store.at(n0), Ok(&"root"));
        assert_eq!(store.len(), 2);
        assert!(store.erase(n5));
        assert!(!store.erase(n5));
        assert_eq!(store.at(n5), Err(TableStoreError::MissingTable { node: n5 }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.peak_len(), 2);
    }

    #[test]
    fn double_insert_within_pass_is_rejected() {
        let mut store = NodeTableStore::new();
        let pass = store.begin_pass();
        let n = NodeId::new(3);
        store.insert(n, 1).unwrap();
        assert_eq!(
            store.insert(n, 2),
            Err(TableStoreError::DuplicateInsert { node: n, pass })
        );
        assert_eq!(store.get(n), Some(&1));
    }

    #[test]
    fn later_pass_replaces_table() {
        let mut store = NodeTableStore::new();
        let n = NodeId::new(0);
        store.begin_pass();
        store.insert(n, 1).unwrap();
        store.begin_pass();
        store.insert(n, 2).unwrap();
        assert_eq!(store.get(n), Some(&2));
        assert_eq!(store.pass_of(n), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn iter_yields_live_tables_in_node_order() {
        let mut store = NodeTableStore::new();
        store.begin_pass();
        for i in [4u32, 1, 2] {
            store.insert(NodeId::new(i), i).unwrap();
        }
        store.erase(NodeId::new(2));
        let seen: Vec<_> = store.iter().map(|(n, &t)| (n.index(), t)).collect();
        assert_eq!(seen, vec![(1, 1), (4, 4)]);
        store.clear();
        assert!(store.is_empty());
    }
}
