//! Drop-point anchoring
//!
//! When a block is dropped (or an existing node is dragged) the editor picks
//! the nearest node as the anchor and a zone around it that says where the
//! dropped node attaches.
//!
//! Resolution rules:
//! - the anchor is the node whose centre is closest to the drop point, by
//!   Euclidean distance, within a maximum search radius
//! - equidistant candidates resolve to the first one in node order
//! - the zone follows the drop point's side of the anchor centre: above or
//!   below for ordinary nodes, left/right under a branch for its
//!   `true`/`false` outlets, always below for the root

use serde::{Deserialize, Serialize};

use crate::layout::LayoutConfig;
use crate::types::{DagGraph, NodeId, OperatorKind, Outlet, Position};

/// Where a node attaches relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    /// Between the anchor and its predecessor
    Above,
    /// Between the anchor and its successor
    Below,
    /// On the branch's `true` outlet chain
    BranchTrue,
    /// On the branch's `false` outlet chain
    BranchFalse,
}

impl Zone {
    /// Outlet used by branch zones
    pub fn outlet(self) -> Option<Outlet> {
        match self {
            Self::BranchTrue => Some(Outlet::True),
            Self::BranchFalse => Some(Outlet::False),
            Self::Above | Self::Below => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::BranchTrue => "branch-true",
            Self::BranchFalse => "branch-false",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Existing node plus zone used as the reference point for a drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub target_node_id: NodeId,
    pub zone: Zone,
}

impl Anchor {
    pub fn new(target_node_id: impl Into<String>, zone: Zone) -> Self {
        Self {
            target_node_id: target_node_id.into(),
            zone,
        }
    }

    pub fn above(target_node_id: impl Into<String>) -> Self {
        Self::new(target_node_id, Zone::Above)
    }

    pub fn below(target_node_id: impl Into<String>) -> Self {
        Self::new(target_node_id, Zone::Below)
    }
}

/// Pick the anchor for a drop point
///
/// `excluding` skips the node being dragged so it never anchors on itself.
pub fn resolve_anchor(
    graph: &DagGraph,
    drop_point: Position,
    layout: &LayoutConfig,
    max_radius: f64,
    excluding: Option<&str>,
) -> Option<Anchor> {
    let mut best: Option<(f64, &crate::types::DagNode, Position)> = None;

    for node in graph.nodes() {
        if excluding == Some(node.id.as_str()) {
            continue;
        }
        let size = layout.size_of(node);
        let centre = Position::new(
            node.position.x + size.width / 2.0,
            node.position.y + size.height / 2.0,
        );
        let distance = drop_point.distance_to(&centre);
        if distance > max_radius {
            continue;
        }
        // Strict comparison keeps the first node on ties
        if best.map_or(true, |(d, _, _)| distance < d) {
            best = Some((distance, node, centre));
        }
    }

    let (_, node, centre) = best?;
    let zone = match node.kind() {
        OperatorKind::Root => Zone::Below,
        OperatorKind::Branch if drop_point.y < centre.y => Zone::Above,
        OperatorKind::Branch if drop_point.x <= centre.x => Zone::BranchTrue,
        OperatorKind::Branch => Zone::BranchFalse,
        OperatorKind::Task if drop_point.y < centre.y => Zone::Above,
        OperatorKind::Task => Zone::Below,
    };

    Some(Anchor::new(node.id.clone(), zone))
}
