//! Core types for DAG graphs
//!
//! These types define the node/edge collections the editor owns, the
//! operator classification that drives fan-out/fan-in policy, and the
//! lookup helpers every other module builds on.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Free-form node configuration (task name, parameters, ...)
///
/// The core never interprets this map; only palette and export layers know
/// the per-operator schema.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Operator type of the DAG definition block
pub const ROOT_OPERATOR: &str = "DAG";

/// Operator type of the conditional fan-out block
pub const BRANCH_OPERATOR: &str = "BranchPythonOperator";

/// Id given to a synthesized root
pub const DEFAULT_ROOT_ID: &str = "dag_definition";

/// Structural role of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// The DAG definition itself; accepts no incoming edges
    Root,
    /// Conditional fan-out through the `true`/`false` outlets
    Branch,
    /// Any ordinary operator: single fan-in, single fan-out
    Task,
}

impl OperatorKind {
    /// Classify an operator type tag
    pub fn classify(operator_type: &str) -> Self {
        match operator_type {
            ROOT_OPERATOR => Self::Root,
            BRANCH_OPERATOR => Self::Branch,
            _ => Self::Task,
        }
    }

    /// Whether nodes of this kind may keep several outgoing edges
    pub fn is_multi_fan_out(self) -> bool {
        matches!(self, Self::Root | Self::Branch)
    }
}

/// Named exit point on a branch node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outlet {
    True,
    False,
}

impl Outlet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
        }
    }
}

impl std::fmt::Display for Outlet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas position (top-left corner of the node)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DagNode {
    /// Unique identifier, stable for the node's lifetime
    pub id: NodeId,
    /// Operator type tag (e.g. "BashOperator")
    pub operator_type: String,
    /// Position on the canvas
    #[serde(default)]
    pub position: Position,
    /// Opaque configuration
    #[serde(default)]
    pub attributes: Attributes,
    /// Whether the detail panel is open (affects layout height)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub expanded: bool,
}

impl DagNode {
    /// Create a node with empty attributes at the origin
    pub fn new(id: impl Into<String>, operator_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operator_type: operator_type.into(),
            position: Position::default(),
            attributes: Attributes::new(),
            expanded: false,
        }
    }

    /// Replace the attribute map
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The root the editor synthesizes when none exists
    pub fn default_root() -> Self {
        let attributes = serde_json::json!({
            "label": "DAG Definition",
            "task_id": DEFAULT_ROOT_ID,
            "parameters": {
                "dag_id": "my_dag",
                "schedule_interval": "@daily",
            },
        });
        let attributes = match attributes {
            serde_json::Value::Object(map) => map,
            _ => Attributes::new(),
        };
        Self::new(DEFAULT_ROOT_ID, ROOT_OPERATOR).with_attributes(attributes)
    }

    /// Structural role derived from the operator type
    pub fn kind(&self) -> OperatorKind {
        OperatorKind::classify(&self.operator_type)
    }

    pub fn is_root(&self) -> bool {
        self.kind() == OperatorKind::Root
    }

    pub fn is_branch(&self) -> bool {
        self.kind() == OperatorKind::Branch
    }

    /// Human-readable name: `task_id`, then `label`, then the id
    pub fn display_name(&self) -> &str {
        ["task_id", "label"]
            .iter()
            .find_map(|key| self.attributes.get(*key).and_then(|v| v.as_str()))
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.id)
    }
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DagEdge {
    /// Derived from `(source, outlet, target)`, see [`DagEdge::derive_id`]
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// `None` for single-output sources, `true`/`false` for branches
    #[serde(default)]
    pub source_outlet: Option<Outlet>,
}

impl DagEdge {
    /// Create an edge whose id is derived from its endpoints
    pub fn new(source: impl Into<String>, target: impl Into<String>, outlet: Option<Outlet>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: Self::derive_id(&source, outlet, &target),
            source,
            target,
            source_outlet: outlet,
        }
    }

    /// Deterministic edge id, so duplicates are detectable by identity
    ///
    /// `-` separates the parts, so a `-` or `\` inside a node id is
    /// escaped with a backslash. Ids without either come out as `ea-b`.
    pub fn derive_id(source: &str, outlet: Option<Outlet>, target: &str) -> EdgeId {
        let source = escape_id_part(source);
        let target = escape_id_part(target);
        match outlet {
            Some(outlet) => format!("e{}-{}-{}", source, outlet, target),
            None => format!("e{}-{}", source, target),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

fn escape_id_part(id: &str) -> Cow<'_, str> {
    if id.contains(['-', '\\']) {
        Cow::Owned(id.replace('\\', "\\\\").replace('-', "\\-"))
    } else {
        Cow::Borrowed(id)
    }
}

/// The node/edge collections owned by an editing session
///
/// Node order is significant: it is insertion order, and both anchor
/// tie-breaking and layout ordering use it as the stable tie-break.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DagGraph {
    #[serde(default)]
    nodes: Vec<DagNode>,
    #[serde(default)]
    edges: Vec<DagEdge>,
}

impl DagGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from raw collections without enforcing invariants
    ///
    /// Restored or imported data goes through here; the validator reports
    /// whatever invariants it breaks.
    pub fn from_parts(nodes: Vec<DagNode>, edges: Vec<DagEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn into_parts(self) -> (Vec<DagNode>, Vec<DagEdge>) {
        (self.nodes, self.edges)
    }

    pub fn nodes(&self) -> &[DagNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DagEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&DagNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find an edge by ID
    pub fn find_edge(&self, id: &str) -> Option<&DagEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.find_node(id).is_some()
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.find_edge(id).is_some()
    }

    /// Operator kind of a node, if present
    pub fn kind_of(&self, id: &str) -> Option<OperatorKind> {
        self.find_node(id).map(DagNode::kind)
    }

    /// The first root node in node order
    pub fn root(&self) -> Option<&DagNode> {
        self.nodes.iter().find(|n| n.is_root())
    }

    /// All root nodes (more than one only in restored snapshots)
    pub fn roots(&self) -> impl Iterator<Item = &DagNode> + '_ {
        self.nodes.iter().filter(|n| n.is_root())
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a DagEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a DagEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// The single incoming edge of a node, if any
    pub fn incoming_edge(&self, node_id: &str) -> Option<&DagEdge> {
        self.edges.iter().find(|e| e.target == node_id)
    }

    /// First outgoing edge leaving through the given outlet
    pub fn outgoing_edge_on(&self, node_id: &str, outlet: Option<Outlet>) -> Option<&DagEdge> {
        self.edges
            .iter()
            .find(|e| e.source == node_id && e.source_outlet == outlet)
    }

    /// Whether a node has an outgoing edge, optionally restricted to an outlet
    pub fn has_outgoing_edge(&self, node_id: &str, outlet: Option<Outlet>) -> bool {
        match outlet {
            Some(outlet) => self.outgoing_edge_on(node_id, Some(outlet)).is_some(),
            None => self.outgoing_edges(node_id).next().is_some(),
        }
    }

    /// Whether a node has an incoming edge
    pub fn has_incoming_edge(&self, node_id: &str) -> bool {
        self.incoming_edge(node_id).is_some()
    }

    /// IDs of the nodes feeding this node
    pub fn predecessors(&self, node_id: &str) -> Vec<NodeId> {
        self.incoming_edges(node_id).map(|e| e.source.clone()).collect()
    }

    /// IDs of the nodes this node feeds
    pub fn successors(&self, node_id: &str) -> Vec<NodeId> {
        self.outgoing_edges(node_id).map(|e| e.target.clone()).collect()
    }

    /// Most recently added node lacking an outgoing edge
    pub fn most_recent_open_node(&self, excluding: &str) -> Option<&DagNode> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.id != excluding && !self.has_outgoing_edge(&n.id, None))
    }

    pub(crate) fn push_node(&mut self, node: DagNode) {
        self.nodes.push(node);
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut DagNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub(crate) fn remove_node(&mut self, id: &str) -> Option<DagNode> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(pos))
    }

    /// Add an edge unless one with the same id exists; returns whether it was added
    pub(crate) fn push_edge(&mut self, edge: DagEdge) -> bool {
        if self.contains_edge(&edge.id) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub(crate) fn remove_edge(&mut self, id: &str) -> Option<DagEdge> {
        let pos = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(pos))
    }

    /// Remove every edge matching the predicate, returning them in order
    pub(crate) fn remove_edges_where(&mut self, mut pred: impl FnMut(&DagEdge) -> bool) -> Vec<DagEdge> {
        let (removed, kept): (Vec<_>, Vec<_>) = self.edges.drain(..).partition(|e| pred(e));
        self.edges = kept;
        removed
    }

    /// Insert the default root at the front if the graph has none
    ///
    /// Returns true when a root was synthesized.
    pub(crate) fn ensure_root(&mut self) -> bool {
        if self.root().is_some() {
            return false;
        }
        let mut root = DagNode::default_root();
        // Keep the id unique even if a task happens to use it
        while self.contains_node(&root.id) {
            root.id = format!("{}_root", root.id);
        }
        log::debug!("Synthesized default root '{}'", root.id);
        self.nodes.insert(0, root);
        true
    }

    pub(crate) fn set_positions(&mut self, positioned: &[DagNode]) {
        for placed in positioned {
            if let Some(node) = self.node_mut(&placed.id) {
                node.position = placed.position;
            }
        }
    }
}
