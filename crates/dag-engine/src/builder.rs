//! Fluent builder for DAG graphs
//!
//! Builds graphs directly, without going through reconciliation. Useful for
//! tests, fixtures and restoring hand-written graphs.

use crate::types::{Attributes, DagEdge, DagGraph, DagNode, Outlet, Position, ROOT_OPERATOR};

/// Fluent builder for constructing DAG graphs
///
/// # Example
///
/// ```ignore
/// let graph = DagBuilder::new()
///     .root("dag")
///     .task("extract", "BashOperator")
///     .with_attribute("task_id", serde_json::json!("extract"))
///     .task("check", "BranchPythonOperator")
///     .connect("dag", "extract")
///     .connect("extract", "check")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct DagBuilder {
    nodes: Vec<DagNode>,
    edges: Vec<DagEdge>,
}

impl DagBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root (`DAG`) node
    pub fn root(self, id: impl Into<String>) -> Self {
        self.task(id, ROOT_OPERATOR)
    }

    /// Add a node with the given operator type
    pub fn task(mut self, id: impl Into<String>, operator_type: impl Into<String>) -> Self {
        self.nodes.push(DagNode::new(id, operator_type));
        self
    }

    /// Set an attribute on the most recently added node
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.attributes.insert(key.into(), value);
        }
        self
    }

    /// Replace the attributes of the most recently added node
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.attributes = attributes;
        }
        self
    }

    /// Place the most recently added node
    pub fn at(mut self, x: f64, y: f64) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.position = Position::new(x, y);
        }
        self
    }

    /// Add an edge without an outlet
    pub fn connect(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(DagEdge::new(source, target, None));
        self
    }

    /// Add an edge leaving a branch outlet
    pub fn connect_outlet(mut self, source: impl Into<String>, target: impl Into<String>, outlet: Outlet) -> Self {
        self.edges.push(DagEdge::new(source, target, Some(outlet)));
        self
    }

    /// Build the graph without validation
    pub fn build(self) -> DagGraph {
        DagGraph::from_parts(self.nodes, self.edges)
    }
}
