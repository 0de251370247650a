//! Graph algorithms over the primal network

pub mod dual;

pub use dual::{DualGraphBuilder, build_dual_graph};
