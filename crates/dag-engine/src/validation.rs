//! Whole-graph validation
//!
//! Runs after every committed mutation and on demand before export. The
//! findings are advisory: the validator never blocks or rolls back an edit,
//! it only describes what is wrong with the current graph.
//!
//! Checks:
//! - graph is non-empty and has exactly one root
//! - edges reference existing nodes
//! - no directed cycle (Kahn's algorithm), naming every edge on a cycle
//! - fan-in and fan-out limits (only breakable by restored snapshots)
//! - every node has a name and at least one edge

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::cycle::would_create_cycle;
use crate::types::{DagEdge, DagGraph, EdgeId, NodeId, OperatorKind};

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum ValidationIssue {
    /// The graph has no nodes at all
    EmptyGraph,
    /// No root node exists
    MissingRoot,
    /// More than one root node exists
    #[serde(rename_all = "camelCase")]
    MultipleRoots { root_ids: Vec<NodeId> },
    /// At least one directed cycle exists
    #[serde(rename_all = "camelCase")]
    CycleDetected { edge_ids: Vec<EdgeId> },
    /// An edge references a node that does not exist
    #[serde(rename_all = "camelCase")]
    DanglingEdge { edge_id: EdgeId, node_id: NodeId },
    /// A node has more incoming edges than allowed
    #[serde(rename_all = "camelCase")]
    FanInExceeded { node_id: NodeId, count: usize },
    /// A single-output node has more than one outgoing edge
    #[serde(rename_all = "camelCase")]
    FanOutExceeded { node_id: NodeId, count: usize },
    /// Node has neither a `task_id` nor a `label`
    #[serde(rename_all = "camelCase")]
    MissingLabel { node_id: NodeId },
    /// Node has neither incoming nor outgoing edges
    #[serde(rename_all = "camelCase")]
    OrphanedNode { node_id: NodeId },
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingLabel { .. } | Self::OrphanedNode { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGraph => write!(f, "The DAG contains no nodes"),
            Self::MissingRoot => write!(f, "The DAG has no root definition node"),
            Self::MultipleRoots { root_ids } => {
                write!(f, "The DAG has {} root nodes: {}", root_ids.len(), root_ids.join(", "))
            }
            Self::CycleDetected { edge_ids } => {
                write!(f, "The DAG contains a cycle through edges: {}", edge_ids.join(", "))
            }
            Self::DanglingEdge { edge_id, node_id } => {
                write!(f, "Edge '{}' references unknown node '{}'", edge_id, node_id)
            }
            Self::FanInExceeded { node_id, count } => {
                write!(f, "Node '{}' has {} incoming edges", node_id, count)
            }
            Self::FanOutExceeded { node_id, count } => {
                write!(f, "Node '{}' has {} outgoing edges but allows one", node_id, count)
            }
            Self::MissingLabel { node_id } => write!(f, "Node '{}' has no task_id or label", node_id),
            Self::OrphanedNode { node_id } => {
                write!(f, "Node '{}' has no incoming or outgoing edges", node_id)
            }
        }
    }
}

/// Result of validating a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when there are no error-level issues
    pub is_valid: bool,
    pub has_cycles: bool,
    /// Edges lying on at least one cycle, in edge order
    pub cycle_edges: Vec<EdgeId>,
    pub has_orphan_nodes: bool,
    pub orphan_nodes: Vec<NodeId>,
    pub has_multiple_roots: bool,
    pub root_count: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }
}

/// Validate a graph
///
/// Returns every finding, not just the first.
pub fn validate(graph: &DagGraph) -> ValidationReport {
    let mut issues = Vec::new();

    if graph.is_empty() {
        issues.push(ValidationIssue::EmptyGraph);
    }

    let root_ids: Vec<NodeId> = graph.roots().map(|n| n.id.clone()).collect();
    match root_ids.len() {
        0 if !graph.is_empty() => issues.push(ValidationIssue::MissingRoot),
        0 | 1 => {}
        _ => issues.push(ValidationIssue::MultipleRoots {
            root_ids: root_ids.clone(),
        }),
    }

    check_edge_references(graph, &mut issues);

    let cycle_edges = if has_cycle(graph) {
        let edges = edges_on_cycles(graph.edges());
        issues.push(ValidationIssue::CycleDetected {
            edge_ids: edges.clone(),
        });
        edges
    } else {
        Vec::new()
    };

    check_fan_limits(graph, &mut issues);

    for node in graph.nodes() {
        let named = ["task_id", "label"].iter().any(|key| {
            node.attributes
                .get(*key)
                .and_then(|v| v.as_str())
                .is_some_and(|s| !s.trim().is_empty())
        });
        if !named {
            issues.push(ValidationIssue::MissingLabel {
                node_id: node.id.clone(),
            });
        }
    }

    let orphan_nodes = orphans(graph);
    for node_id in &orphan_nodes {
        issues.push(ValidationIssue::OrphanedNode {
            node_id: node_id.clone(),
        });
    }

    let report = ValidationReport {
        is_valid: !issues.iter().any(ValidationIssue::is_error),
        has_cycles: !cycle_edges.is_empty(),
        cycle_edges,
        has_orphan_nodes: !orphan_nodes.is_empty(),
        orphan_nodes,
        has_multiple_roots: root_ids.len() > 1,
        root_count: root_ids.len(),
        issues,
    };
    log::debug!(
        "Validated graph: {} nodes, {} edges, {} issues",
        graph.nodes().len(),
        graph.edges().len(),
        report.issues.len()
    );
    report
}

/// Check that every edge endpoint exists
fn check_edge_references(graph: &DagGraph, issues: &mut Vec<ValidationIssue>) {
    let node_ids: HashSet<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();

    for edge in graph.edges() {
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint.as_str()) {
                issues.push(ValidationIssue::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }
}

/// Detect cycles using Kahn's algorithm (topological sort)
fn has_cycle(graph: &DagGraph) -> bool {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for node in graph.nodes() {
        in_degree.insert(&node.id, 0);
    }
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in graph.edges() {
        in_degree.entry(&edge.source).or_insert(0);
        *in_degree.entry(&edge.target).or_insert(0) += 1;
        adjacency.entry(&edge.source).or_default().push(&edge.target);
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut visited = 0;
    while let Some(node_id) = queue.pop_front() {
        visited += 1;
        let Some(targets) = adjacency.get(node_id) else {
            continue;
        };
        for &target in targets {
            if let Some(deg) = in_degree.get_mut(target) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(target);
                }
            }
        }
    }

    visited < in_degree.len()
}

/// Edges that close a cycle when put back after being taken out
fn edges_on_cycles(edges: &[DagEdge]) -> Vec<EdgeId> {
    (0..edges.len())
        .filter(|&i| {
            let edge = &edges[i];
            let rest: Vec<DagEdge> = edges
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, e)| e.clone())
                .collect();
            would_create_cycle(&rest, &edge.source, &edge.target)
        })
        .map(|i| edges[i].id.clone())
        .collect()
}

fn check_fan_limits(graph: &DagGraph, issues: &mut Vec<ValidationIssue>) {
    for node in graph.nodes() {
        let fan_in = graph.incoming_edges(&node.id).count();
        let max_in = if node.is_root() { 0 } else { 1 };
        if fan_in > max_in {
            issues.push(ValidationIssue::FanInExceeded {
                node_id: node.id.clone(),
                count: fan_in,
            });
        }

        let fan_out = graph.outgoing_edges(&node.id).count();
        if node.kind() == OperatorKind::Task && fan_out > 1 {
            issues.push(ValidationIssue::FanOutExceeded {
                node_id: node.id.clone(),
                count: fan_out,
            });
        }
    }
}

/// Nodes with no incident edge, root included
fn orphans(graph: &DagGraph) -> Vec<NodeId> {
    let connected: HashSet<&str> = graph
        .edges()
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    graph
        .nodes()
        .iter()
        .filter(|n| !connected.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DagBuilder;
    use crate::types::{DagNode, Outlet, BRANCH_OPERATOR, ROOT_OPERATOR};

    fn named(builder: DagBuilder, id: &str) -> DagBuilder {
        builder.with_attribute("task_id", serde_json::json!(id))
    }

    fn valid_graph() -> DagGraph {
        let b = named(DagBuilder::new().root("root"), "root");
        let b = named(b.task("a", "BashOperator"), "a");
        let b = named(b.task("br", BRANCH_OPERATOR), "br");
        let b = named(b.task("yes", "BashOperator"), "yes");
        let b = named(b.task("no", "BashOperator"), "no");
        b.connect("root", "a")
            .connect("a", "br")
            .connect_outlet("br", "yes", Outlet::True)
            .connect_outlet("br", "no", Outlet::False)
            .build()
    }

    #[test]
    fn test_valid_graph() {
        let report = validate(&valid_graph());
        assert!(report.is_valid, "{:?}", report.issues);
        assert!(report.issues.is_empty());
        assert_eq!(report.root_count, 1);
        assert!(!report.has_cycles);
        assert!(!report.has_multiple_roots);
    }

    #[test]
    fn test_root_only_graph_is_valid() {
        let graph = DagGraph::from_parts(vec![DagNode::new("root", ROOT_OPERATOR)], vec![]);
        let report = validate(&graph);
        assert!(report.is_valid);
        assert_eq!(report.root_count, 1);
        // A lone root has no edges, so it is unnamed and orphaned. Both are warnings.
        assert!(report.has_orphan_nodes);
        assert_eq!(report.orphan_nodes, vec!["root"]);
        assert_eq!(report.warnings().count(), 2);
    }

    #[test]
    fn test_empty_graph_is_invalid() {
        let report = validate(&DagGraph::new());
        assert!(!report.is_valid);
        assert_eq!(report.issues, vec![ValidationIssue::EmptyGraph]);
    }

    #[test]
    fn test_cycle_edges_are_named() {
        let mut graph = valid_graph();
        graph.push_node(DagNode::new("x", "BashOperator"));
        graph.push_edge(DagEdge::new("yes", "x", None));
        graph.push_edge(DagEdge::new("x", "a", None));

        let report = validate(&graph);
        assert!(report.has_cycles);
        assert!(!report.is_valid);
        assert_eq!(report.cycle_edges, vec!["ea-br", "ebr-true-yes", "eyes-x", "ex-a"]);
    }

    #[test]
    fn test_orphans_are_warnings() {
        let mut graph = valid_graph();
        graph.push_node(DagNode::new("loose", "BashOperator").with_attributes(
            serde_json::json!({"label": "Loose"}).as_object().unwrap().clone(),
        ));

        let report = validate(&graph);
        assert!(report.is_valid);
        assert!(report.has_orphan_nodes);
        assert_eq!(report.orphan_nodes, vec!["loose"]);
        assert_eq!(
            report.warnings().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["Node 'loose' has no incoming or outgoing edges"]
        );
    }

    #[test]
    fn test_disconnected_fragment_is_not_orphaned() {
        let mut graph = valid_graph();
        graph.push_node(DagNode::new("x", "BashOperator"));
        graph.push_node(DagNode::new("y", "BashOperator"));
        graph.push_edge(DagEdge::new("x", "y", None));

        let report = validate(&graph);
        assert!(report.is_valid);
        assert!(!report.has_orphan_nodes);
        assert!(report.orphan_nodes.is_empty());
    }

    #[test]
    fn test_kahn_over_long_chains() {
        let mut builder = DagBuilder::new().root("n0");
        for i in 1..500 {
            builder = builder
                .task(&format!("n{}", i), "BashOperator")
                .connect(&format!("n{}", i - 1), &format!("n{}", i));
        }
        let mut graph = builder.build();
        assert!(!has_cycle(&graph));

        // Diamonds converge without tripping the in-degree count
        graph.push_node(DagNode::new("side", "BashOperator"));
        graph.push_edge(DagEdge::new("n10", "side", None));
        graph.push_edge(DagEdge::new("side", "n20", None));
        assert!(!has_cycle(&graph));

        graph.push_edge(DagEdge::new("n499", "n250", None));
        assert!(has_cycle(&graph));
    }

    #[test]
    fn test_multiple_roots_and_missing_root() {
        let graph = DagBuilder::new().root("r1").root("r2").build();
        let report = validate(&graph);
        assert!(report.has_multiple_roots);
        assert_eq!(report.root_count, 2);
        assert!(!report.is_valid);
        assert_eq!(report.orphan_nodes, vec!["r1", "r2"]);

        let graph = DagBuilder::new().task("a", "BashOperator").build();
        let report = validate(&graph);
        assert!(report.issues.contains(&ValidationIssue::MissingRoot));
        assert_eq!(report.orphan_nodes, vec!["a"]);
    }

    #[test]
    fn test_restored_fan_violations() {
        let graph = DagBuilder::new()
            .root("root")
            .task("a", "BashOperator")
            .task("b", "BashOperator")
            .task("c", "BashOperator")
            .connect("root", "a")
            .connect("a", "b")
            .connect("a", "c")
            .connect("root", "c")
            .connect("b", "root")
            .build();

        let report = validate(&graph);
        assert!(report.issues.contains(&ValidationIssue::FanOutExceeded {
            node_id: "a".into(),
            count: 2
        }));
        assert!(report.issues.contains(&ValidationIssue::FanInExceeded {
            node_id: "c".into(),
            count: 2
        }));
        assert!(report.issues.contains(&ValidationIssue::FanInExceeded {
            node_id: "root".into(),
            count: 1
        }));
    }

    #[test]
    fn test_dangling_edge() {
        let mut graph = valid_graph();
        graph.push_edge(DagEdge::new("no", "ghost", None));
        let report = validate(&graph);
        assert!(report.issues.contains(&ValidationIssue::DanglingEdge {
            edge_id: "eno-ghost".into(),
            node_id: "ghost".into()
        }));
    }

    #[test]
    fn test_report_wire_shape() {
        let json = serde_json::to_value(validate(&valid_graph())).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["rootCount"], 1);
        assert!(json["cycleEdges"].as_array().unwrap().is_empty());

        let issue = serde_json::to_value(ValidationIssue::OrphanedNode { node_id: "n".into() }).unwrap();
        assert_eq!(issue["code"], "orphanedNode");
        assert_eq!(issue["nodeId"], "n");
    }
}
