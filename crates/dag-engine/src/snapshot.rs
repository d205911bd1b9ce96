//! Snapshot envelope
//!
//! The `(nodes, edges)` pair that persistence and export layers consume,
//! wrapped with a small metadata block:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "...", "operatorType": "...", "position": {"x": 0, "y": 0}, "attributes": {} }],
//!   "edges": [{ "id": "...", "source": "...", "target": "...", "sourceOutlet": null }],
//!   "metadata": { "version": "1.0", "savedAt": "...", "nodeCount": 1, "edgeCount": 0 }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::error::{EditorError, Result};
use crate::types::{DagEdge, DagGraph, DagNode};
use crate::validation::validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub node_count: usize,
    pub edge_count: usize,
}

/// A serializable copy of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<DagNode>,
    pub edges: Vec<DagEdge>,
    /// Absent in hand-written or older files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SnapshotMetadata>,
}

impl GraphSnapshot {
    /// Copy a graph into a snapshot
    ///
    /// With `require_acyclic` the capture fails if the graph has a cycle,
    /// which export writers rely on.
    pub fn capture(graph: &DagGraph, require_acyclic: bool) -> Result<Self> {
        if require_acyclic {
            let report = validate(graph);
            if report.has_cycles {
                return Err(EditorError::CyclicGraph(report.cycle_edges));
            }
        }

        Ok(Self {
            nodes: graph.nodes().to_vec(),
            edges: graph.edges().to_vec(),
            metadata: Some(SnapshotMetadata {
                version: defaults::SNAPSHOT_VERSION.to_string(),
                saved_at: Utc::now(),
                node_count: graph.nodes().len(),
                edge_count: graph.edges().len(),
            }),
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Unwrap into a graph without checking any invariant
    pub fn into_graph(self) -> DagGraph {
        DagGraph::from_parts(self.nodes, self.edges)
    }
}
