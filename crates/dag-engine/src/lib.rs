//! DAG Engine - Graph consistency and editing core for the visual DAG builder
//!
//! This crate owns the node/edge model of an Airflow-style DAG and keeps it
//! consistent while the user edits it. It provides:
//!
//! - Cycle-safe edge reconciliation for drops, drags and deletes
//! - A deterministic layered layout after every structural change
//! - Full-graph validation with errors and warnings
//! - Compressed snapshot-based undo/redo
//! - Debounced autosave to a pluggable snapshot store
//! - A palette registry of operator templates collected at link time
//!
//! # Architecture
//!
//! Every edit is an [`Intent`] applied by the pure functions in
//! [`reconcile`]. [`EditorSession`] is the single writer around them:
//!
//! - `reconcile`: `(graph, intent) -> graph` or a rejection, never a partial write
//! - `layout`: positions from structure, no incremental state
//! - `validation`: a report over the whole graph, recomputed per commit
//! - `EventSink`: event streaming to whatever UI layer hosts the editor
//!
//! # Example
//!
//! ```ignore
//! use dag_engine::{Anchor, DagNode, EditorSession, ROOT_OPERATOR};
//!
//! let mut session = EditorSession::default();
//! session.insert_node(DagNode::new("root", ROOT_OPERATOR), None)?;
//! session.insert_node(DagNode::new("extract", "BashOperator"), None)?;
//! session.insert_node(DagNode::new("load", "PythonOperator"), Some(Anchor::below("extract")))?;
//! assert!(session.report().is_valid);
//! ```

pub mod anchor;
pub mod builder;
pub mod config;
pub mod cycle;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod layout;
pub mod persist;
pub mod reconcile;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod types;
pub mod undo;
pub mod validation;

// Re-export key types
pub use anchor::{resolve_anchor, Anchor, Zone};
pub use builder::DagBuilder;
pub use config::EditorConfig;
pub use cycle::would_create_cycle;
pub use descriptor::{
    OperatorCategory, OperatorDescriptor, OperatorTemplate, ParameterSpec, ParameterType, TemplateFn,
};
pub use error::{EditorError, Result};
pub use events::{EditorEvent, EventSink, NullEventSink, VecEventSink};
pub use layout::{layout, LayoutConfig, NodeSize};
pub use persist::{Autosaver, MemorySnapshotStore, SnapshotStore};
pub use reconcile::{Intent, Outcome};
pub use registry::PaletteRegistry;
pub use session::{DragSubject, EditorSession, Interaction};
pub use snapshot::{GraphSnapshot, SnapshotMetadata};
pub use types::{
    Attributes, DagEdge, DagGraph, DagNode, EdgeId, NodeId, OperatorKind, Outlet, Position, BRANCH_OPERATOR,
    DEFAULT_ROOT_ID, ROOT_OPERATOR,
};
pub use undo::UndoStack;
pub use validation::{validate, Severity, ValidationIssue, ValidationReport};
