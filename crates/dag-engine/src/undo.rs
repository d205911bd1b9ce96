//! Undo/redo history
//!
//! Each committed edit pushes a zstd-compressed JSON snapshot of the whole
//! graph. Undoing swaps an earlier snapshot back in, so no intent needs an
//! inverse.

use std::collections::VecDeque;

use crate::error::{EditorError, Result};
use crate::types::DagGraph;

const COMPRESSION_LEVEL: i32 = 3;

/// Undo/redo stack of compressed graph snapshots
#[derive(Debug)]
pub struct UndoStack {
    snapshots: VecDeque<Vec<u8>>,
    /// Index of the snapshot matching the live graph
    current: usize,
    max_snapshots: usize,
}

impl UndoStack {
    /// Create a stack keeping at most `max_snapshots` states (minimum 1)
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: 0,
            max_snapshots: max_snapshots.max(1),
        }
    }

    /// Record a new state, dropping any redo history
    pub fn push(&mut self, graph: &DagGraph) -> Result<()> {
        let json = serde_json::to_vec(graph)?;
        let compressed = zstd::encode_all(&json[..], COMPRESSION_LEVEL)
            .map_err(|e| EditorError::Compression(e.to_string()))?;

        while self.snapshots.len() > self.current + 1 {
            self.snapshots.pop_back();
        }

        self.snapshots.push_back(compressed);
        self.current = self.snapshots.len() - 1;

        while self.snapshots.len() > self.max_snapshots {
            self.snapshots.pop_front();
            self.current = self.current.saturating_sub(1);
        }

        Ok(())
    }

    /// Step back one state, or None at the oldest one
    pub fn undo(&mut self) -> Option<Result<DagGraph>> {
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        Some(self.decompress(self.current))
    }

    /// Step forward one state, or None at the newest one
    pub fn redo(&mut self) -> Option<Result<DagGraph>> {
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        Some(self.decompress(self.current))
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Forget all history
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = 0;
    }

    /// Total compressed size of the history in bytes
    pub fn compressed_size(&self) -> usize {
        self.snapshots.iter().map(Vec::len).sum()
    }

    fn decompress(&self, index: usize) -> Result<DagGraph> {
        let compressed = self
            .snapshots
            .get(index)
            .ok_or_else(|| EditorError::Compression(format!("no snapshot at index {}", index)))?;
        let json = zstd::decode_all(&compressed[..]).map_err(|e| EditorError::Compression(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(crate::config::defaults::UNDO_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DagBuilder;

    fn graph_with(ids: &[&str]) -> DagGraph {
        ids.iter()
            .fold(DagBuilder::new().root("root"), |b, id| b.task(*id, "BashOperator"))
            .build()
    }

    fn ids(graph: &DagGraph) -> Vec<String> {
        graph.nodes().iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_undo_walks_back() {
        let mut stack = UndoStack::new(10);
        stack.push(&graph_with(&[])).unwrap();
        stack.push(&graph_with(&["a"])).unwrap();
        stack.push(&graph_with(&["a", "b"])).unwrap();

        assert_eq!(ids(&stack.undo().unwrap().unwrap()), vec!["root", "a"]);
        assert_eq!(ids(&stack.undo().unwrap().unwrap()), vec!["root"]);
        assert!(stack.undo().is_none());
    }

    #[test]
    fn test_redo_and_truncation() {
        let mut stack = UndoStack::new(10);
        stack.push(&graph_with(&[])).unwrap();
        stack.push(&graph_with(&["a"])).unwrap();

        stack.undo();
        assert!(stack.can_redo());
        assert_eq!(ids(&stack.redo().unwrap().unwrap()), vec!["root", "a"]);
        assert!(stack.redo().is_none());

        stack.undo();
        stack.push(&graph_with(&["z"])).unwrap();
        assert!(!stack.can_redo());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let mut stack = UndoStack::new(3);
        for i in 0..5 {
            stack.push(&graph_with(&[&format!("t{}", i)])).unwrap();
        }
        assert_eq!(stack.len(), 3);
        stack.undo();
        assert_eq!(ids(&stack.undo().unwrap().unwrap()), vec!["root", "t2"]);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_snapshots_are_compressed() {
        let mut stack = UndoStack::default();
        let big: Vec<String> = (0..200).map(|i| format!("task_{}", i)).collect();
        let refs: Vec<&str> = big.iter().map(String::as_str).collect();
        let graph = graph_with(&refs);

        stack.push(&graph).unwrap();
        let raw = serde_json::to_vec(&graph).unwrap().len();
        assert!(stack.compressed_size() < raw);
        stack.clear();
        assert!(stack.is_empty());
    }
}
