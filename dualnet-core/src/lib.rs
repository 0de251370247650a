//! Street network data model with an angular dual graph.
//!
//! The primal graph represents street segments as edges and junctions as
//! nodes. The dual graph turns every segment into a node and every turn
//! between two segments at a junction into an edge weighted by its
//! deflection angle.

pub mod algo;
pub mod error;
pub mod geometry;
pub mod loading;
pub mod model;
pub mod prelude;

pub use error::Error;
pub use geometry::{Geographic, GeometryAdapter, LineEnd, Planar};
pub use loading::{NetworkConfig, build_primal_graph, create_street_network};
pub use model::{
    AttributeKind, AttributeOverlay, AttributeValue, Edge, EdgeAttributes, EdgeKind, Graph, Node,
    StreetNetwork, VolumeBatch, VolumeCategories,
};

/// Index of an edge inside its graph arena
pub type EdgeId = usize;
/// Index of a node inside its graph arena
pub type NodeId = usize;
/// Partition tag of an edge
pub type RegionId = u32;
/// Identifier of a feature in an external layer (barrier, park, water body)
pub type LayerId = i64;
/// Traffic volume counter value
pub type Volume = u64;
