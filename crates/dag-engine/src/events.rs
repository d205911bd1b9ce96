//! Editor events
//!
//! The session reports every commit, rejection, layout pass and validation
//! result through an [`EventSink`], so a UI layer can react without polling
//! the graph.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;
use crate::error::EditorError;
use crate::reconcile::Outcome;
use crate::types::NodeId;
use crate::validation::ValidationReport;

/// Trait for delivering editor events
///
/// Abstracts the transport (channel, UI bridge, test collector).
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be delivered (e.g. channel closed)
    fn send(&self, event: EditorEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Which way through history a restore went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryDirection {
    Undo,
    Redo,
}

/// Events emitted by an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// A drag began; no anchor is resolved yet
    #[serde(rename_all = "camelCase")]
    PreviewStarted {
        subject: String,
        anchor: Option<Anchor>,
    },

    /// The drag moved onto a different anchor, or off every anchor
    #[serde(rename_all = "camelCase")]
    PreviewUpdated {
        subject: String,
        anchor: Option<Anchor>,
    },

    /// The pending preview was discarded
    PreviewCancelled,

    /// An intent was applied
    #[serde(rename_all = "camelCase")]
    MutationCommitted { intent: String, outcome: Outcome },

    /// An intent was refused; the graph is unchanged
    #[serde(rename_all = "camelCase")]
    MutationRejected {
        intent: String,
        kind: String,
        message: String,
    },

    /// Positions were recomputed
    #[serde(rename_all = "camelCase")]
    LayoutUpdated { node_count: usize },

    /// Validation ran on the committed graph
    #[serde(rename_all = "camelCase")]
    ValidationCompleted { report: ValidationReport },

    /// Undo or redo swapped in an earlier state
    #[serde(rename_all = "camelCase")]
    HistoryRestored { direction: HistoryDirection },

    /// A saved snapshot replaced the graph
    #[serde(rename_all = "camelCase")]
    SnapshotRestored {
        node_count: usize,
        edge_count: usize,
        root_synthesized: Option<NodeId>,
    },
}

impl EditorEvent {
    /// Create a rejection event from an error
    pub fn rejected(intent: &str, error: &EditorError) -> Self {
        Self::MutationRejected {
            intent: intent.to_string(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// A no-op event sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: EditorEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
#[derive(Default)]
pub struct VecEventSink {
    events: Mutex<Vec<EditorEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.lock().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        (**self).send(event)
    }
}
