use thiserror::Error;

use crate::model::AttributeKind;
use crate::{EdgeId, NodeId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("{0} is already bound")]
    AlreadyBound(&'static str),
    #[error("Node {node} is not incident to edge {edge}")]
    NotIncident { edge: EdgeId, node: NodeId },
    #[error("Edges {0} and {1} share no common node")]
    NoCommonNode(EdgeId, EdgeId),
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),
    #[error("Attribute {name} holds a {found} value, {expected} requested")]
    AttributeTypeMismatch {
        name: String,
        expected: AttributeKind,
        found: AttributeKind,
    },
    #[error("Volume counters are not initialized")]
    UninitializedCounters,
    #[error("Unknown volume category: {0}")]
    UnknownVolumeCategory(String),
    #[error("Input network is disconnected ({0} components)")]
    DisconnectedInput(usize),
    #[error("Inconsistent topology: {0}")]
    InconsistentTopology(String),
    #[error("Invalid edge index: {0}")]
    InvalidEdgeIndex(EdgeId),
    #[error("Invalid node index: {0}")]
    InvalidNodeIndex(NodeId),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
