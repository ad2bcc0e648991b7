//! Assorted utilities and helpers.
//!
//! Bags are kept as sorted, duplicate-free vectors throughout the crate, so
//! the set operations here are linear merges over sorted slices.

use std::ops::Range;

use crate::hypergraph::Vertex;

/// Sort and deduplicate a collection of vertices into bag form.
pub fn normalize_bag<I>(vertices: I) -> Vec<Vertex>
where
    I: IntoIterator<Item = Vertex>,
{
    let mut bag: Vec<Vertex> = vertices.into_iter().collect();
    bag.sort_unstable();
    bag.dedup();
    bag
}

/// Elements of `a` that are not in `b`. Both inputs must be sorted.
pub fn sorted_difference(a: &[Vertex], b: &[Vertex]) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;
    for &x in a {
        while j < b.len() && b[j] < x {
            j += 1;
        }
        if j == b.len() || b[j] != x {
            out.push(x);
        }
    }
    out
}

/// Elements present in both `a` and `b`. Both inputs must be sorted.
pub fn sorted_intersection(a: &[Vertex], b: &[Vertex]) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Sorted union of `a` and `b`. Both inputs must be sorted.
pub fn sorted_union(a: &[Vertex], b: &[Vertex]) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Returns true if every element of `sub` occurs in `sup`. Both must be sorted.
pub fn is_sorted_subset(sub: &[Vertex], sup: &[Vertex]) -> bool {
    let mut j = 0;
    for &x in sub {
        while j < sup.len() && sup[j] < x {
            j += 1;
        }
        if j == sup.len() || sup[j] != x {
            return false;
        }
        j += 1;
    }
    true
}

/// Split `child_count` children into the groups of a bounded join chain.
///
/// Every group except the last leaves one slot free for the next chain link,
/// so it holds `limit - 1` children; the last group holds the remaining
/// `2..=limit` children. Returns a single group when no split is needed.
///
/// # Panics
/// Panics if `limit < 2`.
pub fn chain_groups(child_count: usize, limit: usize) -> Vec<Range<usize>> {
    assert!(limit >= 2, "child limit must be at least 2");
    let mut groups = Vec::new();
    let mut start = 0;
    while child_count - start > limit {
        groups.push(start..start + limit - 1);
        start += limit - 1;
    }
    groups.push(start..child_count);
    groups
}
