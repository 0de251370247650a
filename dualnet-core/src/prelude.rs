// Re-export key components
pub use crate::algo::{DualGraphBuilder, build_dual_graph};
pub use crate::geometry::{Geographic, GeometryAdapter, LineEnd, Planar, deflection_degrees};
pub use crate::loading::{NetworkConfig, build_primal_graph, create_street_network};
pub use crate::model::{
    AttributeKind, AttributeOverlay, AttributeValue, Edge, EdgeKind, Graph, Node, StreetNetwork,
    VolumeBatch, VolumeCategories,
};

pub use crate::Error;

// Core identifier types
pub use crate::EdgeId;
pub use crate::LayerId;
pub use crate::NodeId;
pub use crate::RegionId;
pub use crate::Volume;
