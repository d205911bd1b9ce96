//! Hierarchical top-down layout
//!
//! Assigns canvas positions with a layered (Sugiyama-style) arrangement:
//!
//! 1. Build a disposable working edge list from the real edges, dropping
//!    self-loops, edges into the root and edges that close a cycle.
//! 2. Virtually anchor every node without a predecessor to the root so
//!    disconnected fragments still land below it. These edges live only in
//!    the working list.
//! 3. Rank nodes by longest path from the sources.
//! 4. Order each rank with barycenter sweeps, input order as tie-break.
//! 5. Place nodes centred under their parents, then push apart so nothing
//!    in a rank overlaps.
//!
//! The result is translated so the root sits at the origin. The function is
//! pure: the same `(nodes, edges)` always yields the same positions and the
//! edges are never touched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{DagEdge, DagNode, OperatorKind, Position};

/// Width and height of a node box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

impl NodeSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Spacing and node-size settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Horizontal gap between neighbours in a rank
    pub node_sep: f64,
    /// Vertical gap between ranks
    pub rank_sep: f64,
    pub task_size: NodeSize,
    pub branch_size: NodeSize,
    pub root_size: NodeSize,
    /// Height of any node whose detail panel is open
    pub expanded_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_sep: 100.0,
            rank_sep: 150.0,
            task_size: NodeSize::new(220.0, 100.0),
            branch_size: NodeSize::new(220.0, 110.0),
            root_size: NodeSize::new(260.0, 110.0),
            expanded_height: 260.0,
        }
    }
}

impl LayoutConfig {
    /// Box size for a node, by kind and detail-panel state
    pub fn size_of(&self, node: &DagNode) -> NodeSize {
        let base = match node.kind() {
            OperatorKind::Root => self.root_size,
            OperatorKind::Branch => self.branch_size,
            OperatorKind::Task => self.task_size,
        };
        if node.expanded {
            NodeSize::new(base.width, base.height.max(self.expanded_height))
        } else {
            base
        }
    }
}

/// Compute positions for every node
///
/// Returns the nodes in their input order with only `position` changed.
pub fn layout(nodes: &[DagNode], edges: &[DagEdge], config: &LayoutConfig) -> Vec<DagNode> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let count = nodes.len();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, node) in nodes.iter().enumerate() {
        index.entry(node.id.as_str()).or_insert(i);
    }
    let root = nodes.iter().position(DagNode::is_root);

    let mut working: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|e| Some((*index.get(e.source.as_str())?, *index.get(e.target.as_str())?)))
        .filter(|&(s, t)| s != t && Some(t) != root)
        .collect();
    working = drop_back_edges(count, &working, root);

    if let Some(root) = root {
        let mut has_pred = vec![false; count];
        for &(_, t) in &working {
            has_pred[t] = true;
        }
        for (i, has_pred) in has_pred.into_iter().enumerate() {
            if i != root && !has_pred {
                working.push((root, i));
            }
        }
    }

    let ranks = assign_ranks(count, &working);
    let layers = order_layers(count, &working, &ranks);
    let sizes: Vec<NodeSize> = nodes.iter().map(|n| config.size_of(n)).collect();
    let mut positions = place(&layers, &working, &sizes, config);

    let (dx, dy) = match root {
        Some(root) => (positions[root].x, positions[root].y),
        None => (
            positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
            positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
        ),
    };
    for p in &mut positions {
        p.x -= dx;
        p.y -= dy;
    }

    nodes
        .iter()
        .zip(positions)
        .map(|(node, position)| DagNode {
            position,
            ..node.clone()
        })
        .collect()
}

/// Remove edges that point back onto the DFS stack
fn drop_back_edges(count: usize, edges: &[(usize, usize)], root: Option<usize>) -> Vec<(usize, usize)> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (i, &(s, _)) in edges.iter().enumerate() {
        out[s].push(i);
    }

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut state = vec![0u8; count];
    let mut back = vec![false; edges.len()];
    let starts = root.into_iter().chain(0..count);

    for start in starts {
        if state[start] != 0 {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        state[start] = 1;
        while let Some(&mut (node, ref mut cursor)) = stack.last_mut() {
            if let Some(&edge) = out[node].get(*cursor) {
                *cursor += 1;
                let target = edges[edge].1;
                match state[target] {
                    0 => {
                        state[target] = 1;
                        stack.push((target, 0));
                    }
                    1 => back[edge] = true,
                    _ => {}
                }
            } else {
                state[node] = 2;
                stack.pop();
            }
        }
    }

    edges
        .iter()
        .zip(back)
        .filter(|(_, is_back)| !is_back)
        .map(|(e, _)| *e)
        .collect()
}

/// Longest-path ranking over an acyclic edge list (Kahn order)
fn assign_ranks(count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut in_degree = vec![0usize; count];
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); count];
    for &(s, t) in edges {
        in_degree[t] += 1;
        out[s].push(t);
    }

    let mut ranks = vec![0usize; count];
    let mut queue: std::collections::VecDeque<usize> =
        (0..count).filter(|&i| in_degree[i] == 0).collect();
    while let Some(node) = queue.pop_front() {
        for &next in &out[node] {
            ranks[next] = ranks[next].max(ranks[node] + 1);
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }
    ranks
}

/// Group nodes by rank and reduce crossings with barycenter sweeps
fn order_layers(count: usize, edges: &[(usize, usize)], ranks: &[usize]) -> Vec<Vec<usize>> {
    let depth = ranks.iter().copied().max().unwrap_or(0) + 1;
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); depth];
    for node in 0..count {
        layers[ranks[node]].push(node);
    }

    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); count];
    for &(s, t) in edges {
        preds[t].push(s);
        succs[s].push(t);
    }

    const SWEEPS: usize = 4;
    let mut slot = vec![0usize; count];
    let refresh = |layers: &[Vec<usize>], slot: &mut [usize]| {
        for layer in layers {
            for (i, &node) in layer.iter().enumerate() {
                slot[node] = i;
            }
        }
    };
    refresh(&layers, &mut slot);

    for sweep in 0..SWEEPS {
        let downward = sweep % 2 == 0;
        let order: Vec<usize> = if downward {
            (1..depth).collect()
        } else {
            (0..depth.saturating_sub(1)).rev().collect()
        };
        for r in order {
            let neighbours = if downward { &preds } else { &succs };
            let mut keyed: Vec<(f64, usize, usize)> = layers[r]
                .iter()
                .map(|&node| {
                    let adjacent = &neighbours[node];
                    let bary = if adjacent.is_empty() {
                        slot[node] as f64
                    } else {
                        adjacent.iter().map(|&n| slot[n] as f64).sum::<f64>() / adjacent.len() as f64
                    };
                    (bary, slot[node], node)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            layers[r] = keyed.into_iter().map(|(_, _, node)| node).collect();
            refresh(&layers, &mut slot);
        }
    }

    layers
}

/// Assign top-left positions rank by rank
fn place(
    layers: &[Vec<usize>],
    edges: &[(usize, usize)],
    sizes: &[NodeSize],
    config: &LayoutConfig,
) -> Vec<Position> {
    let count = sizes.len();
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); count];
    for &(s, t) in edges {
        preds[t].push(s);
    }

    let mut centres = vec![0.0f64; count];
    let mut positions = vec![Position::default(); count];
    let mut top = 0.0f64;

    for layer in layers {
        if layer.is_empty() {
            continue;
        }
        let widths: Vec<f64> = layer.iter().map(|&n| sizes[n].width).collect();
        let total: f64 = widths.iter().sum::<f64>() + config.node_sep * (layer.len() - 1) as f64;

        // Packed centres around x = 0, used when a node has no parent
        let mut packed = Vec::with_capacity(layer.len());
        let mut cursor = -total / 2.0;
        for w in &widths {
            packed.push(cursor + w / 2.0);
            cursor += w + config.node_sep;
        }

        let desired: Vec<f64> = layer
            .iter()
            .zip(&packed)
            .map(|(&node, &fallback)| {
                let parents = &preds[node];
                if parents.is_empty() {
                    fallback
                } else {
                    parents.iter().map(|&p| centres[p]).sum::<f64>() / parents.len() as f64
                }
            })
            .collect();

        let mut placed: Vec<f64> = Vec::with_capacity(layer.len());
        for i in 0..layer.len() {
            let mut c = desired[i];
            if i > 0 {
                let min = placed[i - 1] + (widths[i - 1] + widths[i]) / 2.0 + config.node_sep;
                c = c.max(min);
            }
            placed.push(c);
        }
        // Pushing apart only moves nodes right; recentre on the mean overshoot
        let shift = placed.iter().zip(&desired).map(|(p, d)| p - d).sum::<f64>() / layer.len() as f64;

        let height = layer.iter().map(|&n| sizes[n].height).fold(0.0, f64::max);
        for (i, &node) in layer.iter().enumerate() {
            centres[node] = placed[i] - shift;
            positions[node] = Position::new(centres[node] - widths[i] / 2.0, top);
        }
        top += height + config.rank_sep;
    }

    positions
}
