//! This module is responsible for building a street network from line
//! geometries, the overlay result and the build configuration.

mod builder;
mod config;
mod primal;

pub use builder::create_street_network;
pub use config::NetworkConfig;
pub use primal::build_primal_graph;
