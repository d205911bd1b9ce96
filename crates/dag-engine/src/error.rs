//! Error types for the editing core

use thiserror::Error;

use crate::types::NodeId;

/// Result type alias using EditorError
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors that reject an editing intent or a snapshot operation
///
/// Rejections never leave a partially applied mutation behind: the graph
/// the session holds is only replaced once an operation fully succeeds.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Committing the edge would close a directed cycle
    #[error("Connecting '{source_id}' -> '{target_id}' would create a cycle")]
    WouldCreateCycle { source_id: NodeId, target_id: NodeId },

    /// The node cannot take part in the requested connection
    #[error("Invalid target '{node_id}': {reason}")]
    InvalidTarget { node_id: NodeId, reason: String },

    /// Delete attempted on the DAG root
    #[error("Node '{0}' is the DAG root and cannot be deleted")]
    ProtectedNode(NodeId),

    /// Referenced node does not exist
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node with the same id is already in the graph
    #[error("Node '{0}' already exists")]
    DuplicateNode(NodeId),

    /// A second root was dropped while one already exists
    #[error("Graph already has a root node '{existing}'")]
    DuplicateRoot { existing: NodeId },

    /// The anchor zone does not fit the anchor's operator kind
    #[error("Zone {zone} is not valid for anchor '{node_id}'")]
    InvalidZone { node_id: NodeId, zone: String },

    /// No palette template with this id
    #[error("Unknown operator template: {0}")]
    UnknownTemplate(String),

    /// Interaction state machine was driven out of order
    #[error("Invalid interaction: {0}")]
    InvalidInteraction(String),

    /// Snapshot requested with an acyclicity guarantee but the graph has a cycle
    #[error("Graph contains a cycle through edges: {0:?}")]
    CyclicGraph(Vec<String>),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// Snapshot store failure
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl EditorError {
    /// Create an invalid target error with a reason
    pub fn invalid_target(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a cycle rejection for a candidate edge
    pub fn cycle(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::WouldCreateCycle {
            source_id: source.into(),
            target_id: target.into(),
        }
    }

    /// Short machine-readable kind, used in rejection events
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WouldCreateCycle { .. } => "wouldCreateCycle",
            Self::InvalidTarget { .. } => "invalidTarget",
            Self::ProtectedNode(_) => "protectedNode",
            Self::NodeNotFound(_) => "nodeNotFound",
            Self::DuplicateNode(_) => "duplicateNode",
            Self::DuplicateRoot { .. } => "duplicateRoot",
            Self::InvalidZone { .. } => "invalidZone",
            Self::UnknownTemplate(_) => "unknownTemplate",
            Self::InvalidInteraction(_) => "invalidInteraction",
            Self::CyclicGraph(_) => "cyclicGraph",
            Self::Serialization(_) => "serialization",
            Self::Compression(_) => "compression",
            Self::Persistence(_) => "persistence",
        }
    }
}
