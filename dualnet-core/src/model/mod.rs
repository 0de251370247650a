//! Data model of the street network
//!
//! Contains the graph entities, their attributes and volume counters.

pub mod attributes;
pub mod edge;
pub mod graph;
pub mod network;
pub mod node;
pub mod volumes;

pub use attributes::{AttributeKind, AttributeOverlay, AttributeValue, EdgeAttributes};
pub use edge::{Edge, EdgeKind};
pub use graph::Graph;
pub use network::StreetNetwork;
pub use node::Node;
pub use volumes::{VolumeBatch, VolumeCategories, VolumeCounters};
