//! Edge reconciliation
//!
//! Every editing intent is a pure transformation `(graph, intent) -> graph`.
//! Operations work on a private copy and only hand it back once every rule
//! has been satisfied, so a rejected intent leaves the caller's graph
//! exactly as it was.
//!
//! Connection rules enforced here:
//! - every node has at most one incoming edge, the root has none
//! - ordinary tasks have at most one outgoing edge
//! - the root and branches may fan out; branch edges carry an outlet
//! - no edge may close a directed cycle

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Zone};
use crate::cycle::{first_cycle_closing, would_create_cycle};
use crate::error::{EditorError, Result};
use crate::types::{Attributes, DagEdge, DagGraph, DagNode, EdgeId, NodeId, OperatorKind, Outlet};

/// An editing intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    /// Draw an edge between two existing nodes
    #[serde(rename_all = "camelCase")]
    Connect {
        source: NodeId,
        target: NodeId,
        #[serde(default)]
        outlet: Option<Outlet>,
    },
    /// Drop a new node, optionally relative to an anchor
    #[serde(rename_all = "camelCase")]
    InsertNode {
        node: DagNode,
        #[serde(default)]
        anchor: Option<Anchor>,
    },
    /// Detach a node and re-attach it at a new anchor
    #[serde(rename_all = "camelCase")]
    MoveNode {
        node_id: NodeId,
        #[serde(default)]
        anchor: Option<Anchor>,
    },
    #[serde(rename_all = "camelCase")]
    DeleteNode { node_id: NodeId },
    #[serde(rename_all = "camelCase")]
    DeleteEdge { edge_id: EdgeId },
    /// Shallow-merge a patch into a node's attributes
    #[serde(rename_all = "camelCase")]
    UpdateAttributes { node_id: NodeId, patch: Attributes },
    /// Open or close a node's detail panel
    #[serde(rename_all = "camelCase")]
    SetExpanded { node_id: NodeId, expanded: bool },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::InsertNode { .. } => "insertNode",
            Self::MoveNode { .. } => "moveNode",
            Self::DeleteNode { .. } => "deleteNode",
            Self::DeleteEdge { .. } => "deleteEdge",
            Self::UpdateAttributes { .. } => "updateAttributes",
            Self::SetExpanded { .. } => "setExpanded",
        }
    }

    /// Whether the intent can change edges (and therefore layout)
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::UpdateAttributes { .. })
    }
}

/// A splice edge dropped because it would have closed a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleConflict {
    pub source: NodeId,
    pub target: NodeId,
}

/// What a successful intent did to the edge set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub added_edges: Vec<EdgeId>,
    pub removed_edges: Vec<EdgeId>,
    /// Splice edges skipped by the cycle check; the node itself was kept
    pub conflicts: Vec<CycleConflict>,
    /// A default root was created to host the new node
    pub root_synthesized: bool,
    /// False for idempotent no-ops
    pub changed: bool,
}

/// New graph plus a summary of the change
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub graph: DagGraph,
    pub outcome: Outcome,
}

impl Reconciled {
    fn diff(before: &DagGraph, after: DagGraph) -> Self {
        let added_edges = after
            .edges()
            .iter()
            .filter(|e| !before.contains_edge(&e.id))
            .map(|e| e.id.clone())
            .collect();
        let removed_edges = before
            .edges()
            .iter()
            .filter(|e| !after.contains_edge(&e.id))
            .map(|e| e.id.clone())
            .collect();
        let changed = &after != before;
        Self {
            graph: after,
            outcome: Outcome {
                added_edges,
                removed_edges,
                conflicts: Vec::new(),
                root_synthesized: false,
                changed,
            },
        }
    }

    fn unchanged(graph: &DagGraph) -> Self {
        Self {
            graph: graph.clone(),
            outcome: Outcome::default(),
        }
    }
}

/// Apply an intent to a graph
pub fn apply(graph: &DagGraph, intent: &Intent) -> Result<Reconciled> {
    match intent {
        Intent::Connect {
            source,
            target,
            outlet,
        } => connect(graph, source, target, *outlet),
        Intent::InsertNode { node, anchor } => insert_node(graph, node.clone(), anchor.as_ref()),
        Intent::MoveNode { node_id, anchor } => move_node(graph, node_id, anchor.as_ref()),
        Intent::DeleteNode { node_id } => delete_node(graph, node_id),
        Intent::DeleteEdge { edge_id } => Ok(delete_edge(graph, edge_id)),
        Intent::UpdateAttributes { node_id, patch } => update_attributes(graph, node_id, patch),
        Intent::SetExpanded { node_id, expanded } => set_expanded(graph, node_id, *expanded),
    }
}

/// Connect `source -> target`
///
/// Replaces whatever edge currently feeds `target`, and for single fan-out
/// sources whatever edge currently leaves `source`. Connecting an edge that
/// already exists is a no-op.
pub fn connect(graph: &DagGraph, source: &str, target: &str, outlet: Option<Outlet>) -> Result<Reconciled> {
    let source_kind = graph
        .kind_of(source)
        .ok_or_else(|| EditorError::NodeNotFound(source.to_string()))?;
    let target_kind = graph
        .kind_of(target)
        .ok_or_else(|| EditorError::NodeNotFound(target.to_string()))?;

    if target_kind == OperatorKind::Root {
        return Err(EditorError::invalid_target(target, "the DAG root accepts no incoming edges"));
    }

    let outlet = match source_kind {
        OperatorKind::Branch => Some(outlet.unwrap_or(Outlet::True)),
        _ => None,
    };
    let edge = DagEdge::new(source, target, outlet);
    if graph.contains_edge(&edge.id) {
        log::debug!("Edge '{}' already exists, skipping", edge.id);
        return Ok(Reconciled::unchanged(graph));
    }

    if would_create_cycle(graph.edges(), source, target) {
        return Err(EditorError::cycle(source, target));
    }

    let mut work = graph.clone();
    work.remove_edges_where(|e| e.target == target);
    if !source_kind.is_multi_fan_out() {
        work.remove_edges_where(|e| e.source == source);
    }
    work.push_edge(edge);

    Ok(Reconciled::diff(graph, work))
}

/// Insert a new node, splicing it in relative to the anchor
///
/// Without an anchor the node hangs off the root. A root-typed node never
/// receives edges, and only one may exist.
pub fn insert_node(graph: &DagGraph, node: DagNode, anchor: Option<&Anchor>) -> Result<Reconciled> {
    if graph.contains_node(&node.id) {
        return Err(EditorError::DuplicateNode(node.id));
    }

    if node.is_root() {
        if let Some(existing) = graph.root() {
            return Err(EditorError::DuplicateRoot {
                existing: existing.id.clone(),
            });
        }
        let mut work = graph.clone();
        work.push_node(node);
        return Ok(Reconciled::diff(graph, work));
    }

    if let Some(anchor) = anchor {
        check_zone(graph, anchor)?;
    }

    let mut work = graph.clone();
    let root_synthesized = work.ensure_root();
    let node_id = node.id.clone();
    let is_branch = node.is_branch();
    work.push_node(node);

    let splice = plan_attach(&work, &node_id, is_branch, anchor);
    let conflicts = splice.apply(&mut work);

    let mut reconciled = Reconciled::diff(graph, work);
    reconciled.outcome.conflicts = conflicts;
    reconciled.outcome.root_synthesized = root_synthesized;
    Ok(reconciled)
}

/// Move an existing node to a new anchor
///
/// The node is detached first; when it had exactly one predecessor and one
/// successor the gap is healed by joining them directly. Any cycle in the
/// re-attachment aborts the whole move.
pub fn move_node(graph: &DagGraph, node_id: &str, anchor: Option<&Anchor>) -> Result<Reconciled> {
    let node = graph
        .find_node(node_id)
        .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
    if node.is_root() {
        return Err(EditorError::invalid_target(node_id, "the DAG root cannot be moved"));
    }
    if let Some(anchor) = anchor {
        if anchor.target_node_id == node_id {
            return Err(EditorError::invalid_target(node_id, "a node cannot anchor on itself"));
        }
        check_zone(graph, anchor)?;
    }
    let is_branch = node.is_branch();

    let mut work = graph.clone();
    let incoming = work.incoming_edge(node_id).cloned();
    let outgoing: Vec<DagEdge> = work.outgoing_edges(node_id).cloned().collect();
    work.remove_edges_where(|e| e.touches(node_id));

    if let (Some(pred), [succ]) = (incoming, outgoing.as_slice()) {
        if pred.source != succ.target {
            work.push_edge(DagEdge::new(pred.source, succ.target.clone(), pred.source_outlet));
        }
    }

    let splice = plan_attach(&work, node_id, is_branch, anchor);
    if let Some(hit) = first_cycle_closing(&splice.edges_after_removal(&work), &splice.add) {
        return Err(EditorError::cycle(hit.source.clone(), hit.target.clone()));
    }
    splice.apply(&mut work);

    Ok(Reconciled::diff(graph, work))
}

/// Delete a node and every edge touching it
///
/// Neighbours are not reconnected. The root is protected.
pub fn delete_node(graph: &DagGraph, node_id: &str) -> Result<Reconciled> {
    let node = graph
        .find_node(node_id)
        .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
    if node.is_root() {
        return Err(EditorError::ProtectedNode(node_id.to_string()));
    }

    let mut work = graph.clone();
    work.remove_node(node_id);
    work.remove_edges_where(|e| e.touches(node_id));
    Ok(Reconciled::diff(graph, work))
}

/// Remove a single edge; unknown ids are a no-op
pub fn delete_edge(graph: &DagGraph, edge_id: &str) -> Reconciled {
    let mut work = graph.clone();
    if work.remove_edge(edge_id).is_none() {
        log::debug!("Edge '{}' not found, nothing to delete", edge_id);
        return Reconciled::unchanged(graph);
    }
    Reconciled::diff(graph, work)
}

pub fn update_attributes(graph: &DagGraph, node_id: &str, patch: &Attributes) -> Result<Reconciled> {
    let mut work = graph.clone();
    let node = work
        .node_mut(node_id)
        .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
    for (key, value) in patch {
        node.attributes.insert(key.clone(), value.clone());
    }
    Ok(Reconciled::diff(graph, work))
}

pub fn set_expanded(graph: &DagGraph, node_id: &str, expanded: bool) -> Result<Reconciled> {
    let mut work = graph.clone();
    let node = work
        .node_mut(node_id)
        .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
    node.expanded = expanded;
    Ok(Reconciled::diff(graph, work))
}

/// Reject zones that make no sense for the anchor's kind
fn check_zone(graph: &DagGraph, anchor: &Anchor) -> Result<()> {
    let id = &anchor.target_node_id;
    let kind = graph
        .kind_of(id)
        .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;

    let invalid_zone = || EditorError::InvalidZone {
        node_id: id.clone(),
        zone: anchor.zone.to_string(),
    };
    match (kind, anchor.zone) {
        (OperatorKind::Root, Zone::Above) => Err(EditorError::invalid_target(
            id.as_str(),
            "nothing can be placed above the DAG root",
        )),
        (OperatorKind::Root, Zone::Below) => Ok(()),
        (OperatorKind::Branch, Zone::Below) => Err(invalid_zone()),
        (OperatorKind::Branch, _) => Ok(()),
        (_, Zone::BranchTrue | Zone::BranchFalse) => Err(invalid_zone()),
        _ => Ok(()),
    }
}

/// Edge changes that attach a detached node
#[derive(Debug, Default)]
struct Splice {
    remove: Vec<EdgeId>,
    add: Vec<DagEdge>,
}

impl Splice {
    fn edges_after_removal(&self, graph: &DagGraph) -> Vec<DagEdge> {
        graph
            .edges()
            .iter()
            .filter(|e| !self.remove.contains(&e.id))
            .cloned()
            .collect()
    }

    /// Apply the splice, or nothing at all if any edge would close a cycle
    fn apply(self, graph: &mut DagGraph) -> Vec<CycleConflict> {
        if let Some(hit) = first_cycle_closing(&self.edges_after_removal(graph), &self.add) {
            log::warn!(
                "Splice edge '{}' -> '{}' would create a cycle, leaving node unattached",
                hit.source,
                hit.target
            );
            return vec![CycleConflict {
                source: hit.source.clone(),
                target: hit.target.clone(),
            }];
        }
        graph.remove_edges_where(|e| self.remove.contains(&e.id));
        for edge in self.add {
            graph.push_edge(edge);
        }
        Vec::new()
    }
}

/// Work out how to attach `node_id` (which has no edges) at `anchor`
///
/// Assumes the zone was already checked against the anchor's kind.
fn plan_attach(graph: &DagGraph, node_id: &str, is_branch: bool, anchor: Option<&Anchor>) -> Splice {
    // A spliced branch continues the chain through its true outlet
    let onward = if is_branch { Some(Outlet::True) } else { None };
    let mut splice = Splice::default();

    let Some(anchor) = anchor else {
        let upstream = graph
            .root()
            .or_else(|| graph.most_recent_open_node(node_id))
            .map(|n| n.id.clone());
        if let Some(upstream) = upstream {
            splice.add.push(attach_from(graph, &upstream, node_id));
        }
        return splice;
    };
    let target = anchor.target_node_id.as_str();

    match anchor.zone {
        Zone::Above => {
            match graph.incoming_edge(target) {
                Some(pred) => {
                    splice.remove.push(pred.id.clone());
                    splice
                        .add
                        .push(DagEdge::new(pred.source.clone(), node_id, pred.source_outlet));
                }
                None => {
                    if let Some(root) = graph.root() {
                        splice.add.push(DagEdge::new(root.id.clone(), node_id, None));
                    }
                }
            }
            splice.add.push(DagEdge::new(node_id, target, onward));
        }
        Zone::Below if graph.kind_of(target) == Some(OperatorKind::Root) => {
            splice.add.push(DagEdge::new(target, node_id, None));
        }
        Zone::Below => {
            if let Some(succ) = graph.outgoing_edges(target).next() {
                splice.remove.push(succ.id.clone());
                splice.add.push(DagEdge::new(node_id, succ.target.clone(), onward));
            }
            splice.add.insert(0, DagEdge::new(target, node_id, None));
        }
        Zone::BranchTrue | Zone::BranchFalse => {
            let outlet = anchor.zone.outlet();
            if let Some(succ) = graph.outgoing_edge_on(target, outlet) {
                splice.remove.push(succ.id.clone());
                splice.add.push(DagEdge::new(node_id, succ.target.clone(), onward));
            }
            splice.add.insert(0, DagEdge::new(target, node_id, outlet));
        }
    }

    splice
}

/// Edge from an upstream node picked without an explicit zone
fn attach_from(graph: &DagGraph, upstream: &str, node_id: &str) -> DagEdge {
    let outlet = match graph.kind_of(upstream) {
        Some(OperatorKind::Branch) => Some(Outlet::True),
        _ => None,
    };
    DagEdge::new(upstream, node_id, outlet)
}
