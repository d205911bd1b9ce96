//! Pre-commit cycle detection
//!
//! Answers one question before an edge is committed: would adding
//! `source -> target` close a directed cycle? The search walks forward from
//! `target` over the existing edges; reaching `source` means the candidate
//! edge would complete a loop.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::types::DagEdge;

/// Check whether adding `source -> target` to `edges` would create a cycle
///
/// Self-loops are always cycles. Runs a breadth-first search in O(V + E).
pub fn would_create_cycle(edges: &[DagEdge], source: &str, target: &str) -> bool {
    if source == target {
        return true;
    }

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(target);
    queue.push_back(target);

    while let Some(node) = queue.pop_front() {
        let Some(next) = adjacency.get(node) else {
            continue;
        };
        for &neighbor in next {
            if neighbor == source {
                return true;
            }
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    false
}

/// Check a batch of candidate edges, adding them one at a time
///
/// Returns the first candidate that would close a cycle against the
/// existing edges plus the candidates accepted before it.
pub fn first_cycle_closing<'a>(edges: &[DagEdge], candidates: &'a [DagEdge]) -> Option<&'a DagEdge> {
    let mut working: Vec<DagEdge> = edges.to_vec();
    for candidate in candidates {
        if would_create_cycle(&working, &candidate.source, &candidate.target) {
            return Some(candidate);
        }
        working.push(candidate.clone());
    }
    None
}
