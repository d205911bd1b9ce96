//! Editing session
//!
//! [`EditorSession`] owns the graph and is its only writer. Every intent
//! goes through the same pipeline:
//!
//! ```text
//! intent -> reconcile (cycle check) -> swap graph -> layout -> validate
//!        -> undo snapshot -> events -> autosave
//! ```
//!
//! A rejected intent stops after `reconcile`; the graph is never touched.
//!
//! Drags follow a small state machine. A drag starts `Previewing`, hovering
//! updates the anchor, and the drop either commits (back to `Idle`, whether
//! the intent is accepted or rejected) or is cancelled with no side effects.

use crate::anchor::{resolve_anchor, Anchor};
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::events::{EditorEvent, EventSink, HistoryDirection, NullEventSink};
use crate::layout::layout;
use crate::persist::Autosaver;
use crate::reconcile::{self, Intent, Outcome, Reconciled};
use crate::registry::PaletteRegistry;
use crate::snapshot::GraphSnapshot;
use crate::types::{Attributes, DagGraph, DagNode, NodeId, Outlet, Position};
use crate::undo::UndoStack;
use crate::validation::{validate, ValidationReport};

/// What is being dragged
#[derive(Debug, Clone, PartialEq)]
pub enum DragSubject {
    /// A palette block not yet in the graph
    NewNode(DagNode),
    /// A node already on the canvas
    ExistingNode(NodeId),
}

impl DragSubject {
    pub fn node_id(&self) -> &str {
        match self {
            Self::NewNode(node) => &node.id,
            Self::ExistingNode(id) => id,
        }
    }
}

/// Interaction state of the session
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Previewing {
        subject: DragSubject,
        anchor: Option<Anchor>,
    },
}

/// The single writer of a DAG graph
pub struct EditorSession {
    graph: DagGraph,
    config: EditorConfig,
    history: UndoStack,
    events: Box<dyn EventSink>,
    autosave: Option<Autosaver>,
    interaction: Interaction,
    report: ValidationReport,
}

impl EditorSession {
    /// Create a session over an empty graph
    pub fn new(config: EditorConfig) -> Self {
        let graph = DagGraph::new();
        let mut history = UndoStack::new(config.undo_depth);
        if let Err(e) = history.push(&graph) {
            log::warn!("Failed to record initial undo snapshot: {}", e);
        }
        let report = validate(&graph);
        Self {
            graph,
            config,
            history,
            events: Box::new(NullEventSink),
            autosave: None,
            interaction: Interaction::Idle,
            report,
        }
    }

    /// Send events to the given sink
    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Box::new(sink);
        self
    }

    /// Hand snapshots to an autosaver after each commit
    pub fn with_autosave(mut self, autosaver: Autosaver) -> Self {
        self.autosave = Some(autosaver);
        self
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Validation report of the current graph
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self.interaction, Interaction::Previewing { .. })
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply an intent
    ///
    /// On rejection the graph is unchanged and a `MutationRejected` event is
    /// emitted before the error is returned.
    pub fn apply(&mut self, intent: Intent) -> Result<Outcome> {
        match reconcile::apply(&self.graph, &intent) {
            Ok(Reconciled { graph, outcome }) => {
                if outcome.changed {
                    log::debug!(
                        "Committed {}: +{:?} -{:?}",
                        intent.name(),
                        outcome.added_edges,
                        outcome.removed_edges
                    );
                    self.emit(EditorEvent::MutationCommitted {
                        intent: intent.name().to_string(),
                        outcome: outcome.clone(),
                    });
                    self.commit(graph, intent.is_structural());
                }
                Ok(outcome)
            }
            Err(e) => {
                log::warn!("Rejected {}: {}", intent.name(), e);
                self.emit(EditorEvent::rejected(intent.name(), &e));
                Err(e)
            }
        }
    }

    pub fn connect(&mut self, source: &str, target: &str, outlet: Option<Outlet>) -> Result<Outcome> {
        self.apply(Intent::Connect {
            source: source.to_string(),
            target: target.to_string(),
            outlet,
        })
    }

    pub fn insert_node(&mut self, node: DagNode, anchor: Option<Anchor>) -> Result<Outcome> {
        self.apply(Intent::InsertNode { node, anchor })
    }

    pub fn move_node(&mut self, node_id: &str, anchor: Option<Anchor>) -> Result<Outcome> {
        self.apply(Intent::MoveNode {
            node_id: node_id.to_string(),
            anchor,
        })
    }

    pub fn delete_node(&mut self, node_id: &str) -> Result<Outcome> {
        self.apply(Intent::DeleteNode {
            node_id: node_id.to_string(),
        })
    }

    pub fn delete_edge(&mut self, edge_id: &str) -> Result<Outcome> {
        self.apply(Intent::DeleteEdge {
            edge_id: edge_id.to_string(),
        })
    }

    pub fn update_attributes(&mut self, node_id: &str, patch: Attributes) -> Result<Outcome> {
        self.apply(Intent::UpdateAttributes {
            node_id: node_id.to_string(),
            patch,
        })
    }

    pub fn set_expanded(&mut self, node_id: &str, expanded: bool) -> Result<Outcome> {
        self.apply(Intent::SetExpanded {
            node_id: node_id.to_string(),
            expanded,
        })
    }

    /// Instantiate a palette template and drop it at a canvas point
    pub fn drop_template(&mut self, registry: &PaletteRegistry, template_id: &str, at: Position) -> Result<Outcome> {
        let node = registry.instantiate(template_id)?;
        let anchor = self.anchor_at(at, None);
        self.insert_node(node, anchor)
    }

    /// Nearest anchor to a canvas point within the configured radius
    pub fn anchor_at(&self, point: Position, excluding: Option<&str>) -> Option<Anchor> {
        resolve_anchor(
            &self.graph,
            point,
            &self.config.layout,
            self.config.anchor_radius,
            excluding,
        )
    }

    /// Start dragging a palette block
    pub fn begin_drag_new(&mut self, node: DagNode) -> Result<()> {
        self.begin_drag(DragSubject::NewNode(node))
    }

    /// Start dragging an existing node
    pub fn begin_drag_existing(&mut self, node_id: &str) -> Result<()> {
        if !self.graph.contains_node(node_id) {
            return Err(EditorError::NodeNotFound(node_id.to_string()));
        }
        self.begin_drag(DragSubject::ExistingNode(node_id.to_string()))
    }

    fn begin_drag(&mut self, subject: DragSubject) -> Result<()> {
        if self.is_previewing() {
            return Err(EditorError::InvalidInteraction("a drag is already in progress".into()));
        }
        self.emit(EditorEvent::PreviewStarted {
            subject: subject.node_id().to_string(),
            anchor: None,
        });
        self.interaction = Interaction::Previewing { subject, anchor: None };
        Ok(())
    }

    /// Update the preview anchor for the current drag position
    pub fn hover(&mut self, point: Position) -> Result<Option<Anchor>> {
        let Interaction::Previewing { subject, .. } = &self.interaction else {
            return Err(EditorError::InvalidInteraction("hover without an active drag".into()));
        };
        let excluding = match subject {
            DragSubject::ExistingNode(id) => Some(id.as_str()),
            DragSubject::NewNode(_) => None,
        };
        let resolved = self.anchor_at(point, excluding);
        let subject_id = subject.node_id().to_string();

        if let Interaction::Previewing { anchor, .. } = &mut self.interaction {
            if *anchor != resolved {
                *anchor = resolved.clone();
                self.emit(EditorEvent::PreviewUpdated {
                    subject: subject_id,
                    anchor: resolved.clone(),
                });
            }
        }
        Ok(resolved)
    }

    /// Drop the dragged node at the current preview anchor
    ///
    /// The session is back to `Idle` afterwards, even on rejection.
    pub fn commit_drag(&mut self) -> Result<Outcome> {
        let Interaction::Previewing { subject, anchor } = std::mem::take(&mut self.interaction) else {
            return Err(EditorError::InvalidInteraction("no drag to commit".into()));
        };
        let intent = match subject {
            DragSubject::NewNode(node) => Intent::InsertNode { node, anchor },
            DragSubject::ExistingNode(node_id) => Intent::MoveNode { node_id, anchor },
        };
        self.apply(intent)
    }

    /// Abandon the current drag; returns false if there was none
    pub fn cancel_drag(&mut self) -> bool {
        if !self.is_previewing() {
            return false;
        }
        self.interaction = Interaction::Idle;
        self.emit(EditorEvent::PreviewCancelled);
        true
    }

    /// Step back one commit
    pub fn undo(&mut self) -> Result<bool> {
        self.ensure_idle("undo")?;
        match self.history.undo() {
            Some(graph) => {
                self.restore_history(graph?, HistoryDirection::Undo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Step forward one undone commit
    pub fn redo(&mut self) -> Result<bool> {
        self.ensure_idle("redo")?;
        match self.history.redo() {
            Some(graph) => {
                self.restore_history(graph?, HistoryDirection::Redo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Copy the current graph for persistence or export
    pub fn snapshot(&self, require_acyclic: bool) -> Result<GraphSnapshot> {
        GraphSnapshot::capture(&self.graph, require_acyclic)
    }

    /// Replace the graph with a saved snapshot
    ///
    /// Nothing is checked on the way in; the returned report says what is
    /// wrong with the restored data. A non-empty snapshot without a root gets
    /// the default root. History starts over from the restored state.
    pub fn restore(&mut self, snapshot: GraphSnapshot) -> Result<&ValidationReport> {
        self.ensure_idle("restore")?;
        let mut graph = snapshot.into_graph();
        let root_synthesized = if !graph.is_empty() && graph.ensure_root() {
            graph.root().map(|r| r.id.clone())
        } else {
            None
        };
        log::info!(
            "Restoring snapshot with {} nodes and {} edges",
            graph.nodes().len(),
            graph.edges().len()
        );
        self.emit(EditorEvent::SnapshotRestored {
            node_count: graph.nodes().len(),
            edge_count: graph.edges().len(),
            root_synthesized,
        });

        self.history.clear();
        self.commit(graph, true);
        Ok(&self.report)
    }

    /// Recompute positions without changing structure
    pub fn relayout(&mut self) {
        let positioned = layout(self.graph.nodes(), self.graph.edges(), &self.config.layout);
        self.graph.set_positions(&positioned);
        self.emit(EditorEvent::LayoutUpdated {
            node_count: positioned.len(),
        });
    }

    /// Flush pending autosaves and stop the writer task
    pub async fn shutdown(mut self) -> Result<()> {
        match self.autosave.take() {
            Some(autosaver) => autosaver.shutdown().await,
            None => Ok(()),
        }
    }

    /// Swap in a new graph and run the post-commit steps
    fn commit(&mut self, graph: DagGraph, structural: bool) {
        self.graph = graph;
        if structural && self.config.auto_layout {
            self.relayout();
        }
        if let Err(e) = self.history.push(&self.graph) {
            log::warn!("Failed to record undo snapshot: {}", e);
        }
        self.revalidate();
        self.schedule_autosave();
    }

    fn restore_history(&mut self, graph: DagGraph, direction: HistoryDirection) {
        log::debug!("History {:?}: {} nodes", direction, graph.nodes().len());
        self.graph = graph;
        self.emit(EditorEvent::HistoryRestored { direction });
        self.revalidate();
        self.schedule_autosave();
    }

    fn revalidate(&mut self) {
        self.report = validate(&self.graph);
        if !self.report.is_valid {
            log::debug!("Graph has {} validation errors", self.report.errors().count());
        }
        self.emit(EditorEvent::ValidationCompleted {
            report: self.report.clone(),
        });
    }

    fn schedule_autosave(&self) {
        let Some(autosaver) = &self.autosave else {
            return;
        };
        match GraphSnapshot::capture(&self.graph, false) {
            Ok(snapshot) => {
                if !autosaver.notify(snapshot) {
                    log::warn!("Autosave task has stopped, snapshot dropped");
                }
            }
            Err(e) => log::warn!("Failed to capture autosave snapshot: {}", e),
        }
    }

    fn ensure_idle(&self, action: &str) -> Result<()> {
        if self.is_previewing() {
            return Err(EditorError::InvalidInteraction(format!("cannot {} during a drag", action)));
        }
        Ok(())
    }

    fn emit(&self, event: EditorEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Failed to deliver editor event: {}", e);
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::anchor::Zone;
    use crate::events::VecEventSink;
    use crate::persist::MemorySnapshotStore;
    use crate::types::{DagEdge, BRANCH_OPERATOR, DEFAULT_ROOT_ID, ROOT_OPERATOR};

    fn task(id: &str) -> DagNode {
        DagNode::new(id, "BashOperator")
    }

    fn edge_ids(session: &EditorSession) -> Vec<String> {
        let mut ids: Vec<String> = session.graph().edges().iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids
    }

    /// root -> a -> b
    fn session_with_chain() -> EditorSession {
        let mut session = EditorSession::default();
        session.insert_node(DagNode::new("root", ROOT_OPERATOR), None).unwrap();
        session.insert_node(task("a"), None).unwrap();
        session.insert_node(task("b"), Some(Anchor::below("a"))).unwrap();
        session
    }

    #[test]
    fn test_scenario_root_into_empty_graph() {
        let mut session = EditorSession::default();
        session.insert_node(DagNode::new("root", ROOT_OPERATOR), None).unwrap();

        assert_eq!(session.graph().nodes().len(), 1);
        assert!(session.graph().edges().is_empty());
        assert_eq!(session.report().root_count, 1);
        assert!(session.report().is_valid);
    }

    #[test]
    fn test_scenario_task_without_anchor_hangs_off_root() {
        let mut session = EditorSession::default();
        session.insert_node(DagNode::new("root", ROOT_OPERATOR), None).unwrap();

        session.begin_drag_new(task("a")).unwrap();
        assert_eq!(session.hover(Position::new(5000.0, 5000.0)).unwrap(), None);
        session.commit_drag().unwrap();

        assert_eq!(edge_ids(&session), vec!["eroot-a"]);
        assert!(!session.is_previewing());
    }

    #[test]
    fn test_scenario_insert_below() {
        let session = session_with_chain();
        assert_eq!(edge_ids(&session), vec!["ea-b", "eroot-a"]);
    }

    #[test]
    fn test_scenario_back_edge_rejected() {
        let mut session = session_with_chain();
        let err = session.connect("b", "a", None).unwrap_err();
        assert!(matches!(err, EditorError::WouldCreateCycle { .. }));
        assert_eq!(edge_ids(&session), vec!["ea-b", "eroot-a"]);
    }

    #[test]
    fn test_scenario_branch_fan_out() {
        let mut session = session_with_chain();
        session
            .insert_node(DagNode::new("c", BRANCH_OPERATOR), Some(Anchor::below("b")))
            .unwrap();
        session.insert_node(task("d"), None).unwrap();
        session.insert_node(task("e"), None).unwrap();

        session.connect("c", "d", Some(Outlet::True)).unwrap();
        session.connect("c", "e", Some(Outlet::False)).unwrap();

        let graph = session.graph();
        assert_eq!(graph.outgoing_edges("c").count(), 2);
        assert_eq!(graph.incoming_edges("d").count(), 1);
        assert_eq!(graph.incoming_edges("e").count(), 1);
        assert!(session.report().is_valid, "{:?}", session.report().issues);
    }

    #[test]
    fn test_scenario_root_delete_protected() {
        let mut session = session_with_chain();
        let before = session.graph().clone();

        let err = session.delete_node("root").unwrap_err();
        assert!(matches!(err, EditorError::ProtectedNode(_)));
        assert_eq!(session.graph(), &before);
    }

    #[test]
    fn test_layout_runs_after_commit() {
        let session = session_with_chain();
        let root = session.graph().find_node("root").unwrap();
        let a = session.graph().find_node("a").unwrap();
        let b = session.graph().find_node("b").unwrap();
        assert_eq!(root.position, Position::new(0.0, 0.0));
        assert!(a.position.y > root.position.y);
        assert!(b.position.y > a.position.y);
    }

    #[test]
    fn test_drag_existing_node() {
        let mut session = session_with_chain();
        session.insert_node(task("c"), Some(Anchor::below("b"))).unwrap();

        // Drag c to just below a's centre
        let a = session.graph().find_node("a").unwrap().clone();
        let size = session.config().layout.size_of(&a);
        let point = Position::new(a.position.x + size.width / 2.0, a.position.y + size.height / 2.0 + 10.0);

        session.begin_drag_existing("c").unwrap();
        assert_eq!(session.hover(point).unwrap(), Some(Anchor::below("a")));
        session.commit_drag().unwrap();

        assert_eq!(edge_ids(&session), vec!["ea-c", "ec-b", "eroot-a"]);
    }

    #[test]
    fn test_hover_reports_anchor_changes() {
        let sink = Arc::new(VecEventSink::new());
        let mut session = session_with_chain().with_events(sink.clone());
        let a = session.graph().find_node("a").unwrap().clone();
        let size = session.config().layout.size_of(&a);
        let below_a = Position::new(a.position.x + size.width / 2.0, a.position.y + size.height / 2.0 + 10.0);
        let far_away = Position::new(10_000.0, 10_000.0);

        sink.clear();
        session.begin_drag_new(task("x")).unwrap();
        session.hover(below_a).unwrap();
        session.hover(below_a).unwrap();
        session.hover(far_away).unwrap();

        let events = sink.events();
        assert_eq!(
            events,
            vec![
                EditorEvent::PreviewStarted {
                    subject: "x".into(),
                    anchor: None
                },
                EditorEvent::PreviewUpdated {
                    subject: "x".into(),
                    anchor: Some(Anchor::below("a"))
                },
                EditorEvent::PreviewUpdated {
                    subject: "x".into(),
                    anchor: None
                },
            ]
        );
    }

    #[test]
    fn test_cancel_drag_has_no_side_effects() {
        let sink = Arc::new(VecEventSink::new());
        let mut session = session_with_chain().with_events(sink.clone());
        let before = session.graph().clone();

        session.begin_drag_new(task("x")).unwrap();
        session.hover(Position::new(0.0, 0.0)).unwrap();
        assert!(session.cancel_drag());
        assert!(!session.cancel_drag());

        assert_eq!(session.graph(), &before);
        assert!(matches!(sink.events().last(), Some(EditorEvent::PreviewCancelled)));
    }

    #[test]
    fn test_interaction_misuse() {
        let mut session = session_with_chain();
        assert!(matches!(session.commit_drag(), Err(EditorError::InvalidInteraction(_))));
        assert!(matches!(
            session.hover(Position::default()),
            Err(EditorError::InvalidInteraction(_))
        ));

        session.begin_drag_existing("a").unwrap();
        assert!(matches!(
            session.begin_drag_new(task("x")),
            Err(EditorError::InvalidInteraction(_))
        ));
        assert!(matches!(session.undo(), Err(EditorError::InvalidInteraction(_))));
        assert!(matches!(
            session.begin_drag_existing("ghost"),
            Err(EditorError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_rejected_drag_returns_to_idle() {
        let mut session = session_with_chain();
        session.begin_drag_existing("root").unwrap();
        let err = session.commit_drag().unwrap_err();
        assert!(matches!(err, EditorError::InvalidTarget { .. }));
        assert_eq!(session.interaction(), &Interaction::Idle);
    }

    #[test]
    fn test_events_for_commit_and_rejection() {
        let sink = Arc::new(VecEventSink::new());
        let mut session = session_with_chain().with_events(sink.clone());

        session.connect("root", "b", None).unwrap();
        let _ = session.delete_node("root");

        let events = sink.events();
        assert!(matches!(&events[0], EditorEvent::MutationCommitted { intent, .. } if intent == "connect"));
        assert!(events.iter().any(|e| matches!(e, EditorEvent::LayoutUpdated { node_count: 3 })));
        assert!(events.iter().any(|e| matches!(e, EditorEvent::ValidationCompleted { .. })));
        assert!(matches!(
            events.last(),
            Some(EditorEvent::MutationRejected { kind, .. }) if kind == "protectedNode"
        ));
    }

    #[test]
    fn test_idempotent_connect_does_not_commit() {
        let mut session = session_with_chain();
        let depth = session.history.len();
        let outcome = session.connect("a", "b", None).unwrap();
        assert!(!outcome.changed);
        assert_eq!(session.history.len(), depth);
    }

    #[test]
    fn test_undo_redo() {
        let mut session = session_with_chain();
        session.delete_node("b").unwrap();
        assert!(!session.graph().contains_node("b"));

        assert!(session.undo().unwrap());
        assert!(session.graph().contains_node("b"));
        assert_eq!(edge_ids(&session), vec!["ea-b", "eroot-a"]);

        assert!(session.redo().unwrap());
        assert!(!session.graph().contains_node("b"));
        assert!(!session.redo().unwrap());
    }

    #[test]
    fn test_undo_back_to_empty() {
        let mut session = EditorSession::default();
        session.insert_node(task("a"), None).unwrap();
        assert!(session.undo().unwrap());
        assert!(session.graph().is_empty());
        assert!(!session.undo().unwrap());
    }

    #[test]
    fn test_restore_synthesizes_root() {
        let sink = Arc::new(VecEventSink::new());
        let mut session = EditorSession::default().with_events(sink.clone());
        let snapshot = GraphSnapshot {
            nodes: vec![task("a"), task("b")],
            edges: vec![DagEdge::new("a", "b", None)],
            metadata: None,
        };

        let report = session.restore(snapshot).unwrap();
        assert_eq!(report.root_count, 1);
        assert_eq!(session.graph().nodes()[0].id, DEFAULT_ROOT_ID);
        assert!(!session.can_undo());
        assert!(sink.events().iter().any(|e| matches!(
            e,
            EditorEvent::SnapshotRestored { root_synthesized: Some(id), .. } if id == DEFAULT_ROOT_ID
        )));
    }

    #[test]
    fn test_restore_keeps_cycles_as_findings() {
        let mut session = EditorSession::default();
        let snapshot = GraphSnapshot {
            nodes: vec![DagNode::new("root", ROOT_OPERATOR), task("a"), task("b")],
            edges: vec![
                DagEdge::new("root", "a", None),
                DagEdge::new("a", "b", None),
                DagEdge::new("b", "a", None),
            ],
            metadata: None,
        };

        let report = session.restore(snapshot).unwrap();
        assert!(report.has_cycles);
        assert!(matches!(session.snapshot(true), Err(EditorError::CyclicGraph(_))));
        // Editing still works on a flagged graph
        session.delete_edge("eb-a").unwrap();
        assert!(!session.report().has_cycles);
    }

    #[test]
    fn test_drop_template() {
        use crate::descriptor::{OperatorCategory, OperatorTemplate};

        let mut registry = PaletteRegistry::new();
        registry.register(OperatorTemplate::new(
            "bash_basic",
            "BashOperator",
            "Bash Command",
            OperatorCategory::Bash,
        ));
        let mut session = session_with_chain();

        session
            .drop_template(&registry, "bash_basic", Position::new(9000.0, 9000.0))
            .unwrap();
        let dropped = session.graph().nodes().last().unwrap();
        assert_eq!(dropped.operator_type, "BashOperator");
        assert!(session.graph().incoming_edge(&dropped.id).is_some_and(|e| e.source == "root"));

        let err = session.drop_template(&registry, "missing", Position::default()).unwrap_err();
        assert!(matches!(err, EditorError::UnknownTemplate(_)));
    }

    #[test]
    fn test_branch_zone_from_hover() {
        let mut session = EditorSession::default();
        session.insert_node(DagNode::new("root", ROOT_OPERATOR), None).unwrap();
        session.insert_node(DagNode::new("br", BRANCH_OPERATOR), None).unwrap();

        let br = session.graph().find_node("br").unwrap().clone();
        let size = session.config().layout.size_of(&br);
        let left_below = Position::new(br.position.x + 10.0, br.position.y + size.height);

        session.begin_drag_new(task("yes")).unwrap();
        let anchor = session.hover(left_below).unwrap().unwrap();
        assert_eq!(anchor.zone, Zone::BranchTrue);
        session.commit_drag().unwrap();
        assert!(session.graph().contains_edge("ebr-true-yes"));
    }

    #[test]
    fn test_attribute_update_keeps_positions() {
        let mut session = session_with_chain();
        let before: Vec<Position> = session.graph().nodes().iter().map(|n| n.position).collect();

        let mut patch = Attributes::new();
        patch.insert("task_id".into(), serde_json::json!("extract"));
        session.update_attributes("a", patch).unwrap();

        let after: Vec<Position> = session.graph().nodes().iter().map(|n| n.position).collect();
        assert_eq!(before, after);
        assert_eq!(session.graph().find_node("a").unwrap().display_name(), "extract");
    }

    #[test]
    fn test_expanding_node_moves_children_down() {
        let mut session = session_with_chain();
        let b_before = session.graph().find_node("b").unwrap().position.y;
        session.set_expanded("a", true).unwrap();
        let b_after = session.graph().find_node("b").unwrap().position.y;
        assert!(b_after > b_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_after_commits() {
        let store = Arc::new(MemorySnapshotStore::new());
        let config = EditorConfig::default();
        let autosaver = Autosaver::spawn(store.clone(), config.autosave_debounce());
        let mut session = EditorSession::new(config).with_autosave(autosaver);

        session.insert_node(DagNode::new("root", ROOT_OPERATOR), None).unwrap();
        session.insert_node(task("a"), None).unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(store.save_count(), 1);
        let saved = store.latest().unwrap();
        assert_eq!(saved.nodes.len(), 2);
        assert_eq!(saved.edges.len(), 1);

        session.delete_node("a").unwrap();
        tokio_test::assert_ok!(session.shutdown().await);
        assert_eq!(store.save_count(), 2);
    }
}
