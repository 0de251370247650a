//! Built street network: primal and dual graphs with frozen topology

use super::{Edge, Graph, Node, VolumeBatch};
use crate::{EdgeId, Error, NodeId, Volume};

/// Primal graph together with its angular dual.
///
/// Only shared references to the graphs are handed out, so topology,
/// geometry and attributes cannot change once the network exists. Volume
/// counters and the `is_known` flag are atomic and may be updated
/// concurrently from many workers.
#[derive(Debug)]
pub struct StreetNetwork {
    primal: Graph,
    dual: Graph,
}

impl StreetNetwork {
    pub(crate) fn new(primal: Graph, dual: Graph) -> Self {
        Self { primal, dual }
    }

    pub fn primal(&self) -> &Graph {
        &self.primal
    }

    pub fn dual(&self) -> &Graph {
        &self.dual
    }

    /// Dual node standing for a primal edge
    pub fn dual_node_of(&self, edge: EdgeId) -> Result<&Node, Error> {
        let dual = self.primal.edge(edge)?.dual_node().ok_or_else(|| {
            Error::InconsistentTopology(format!("edge {edge} has no dual node"))
        })?;
        self.dual.node(dual)
    }

    /// Primal edge represented by a dual node
    pub fn primal_edge_of(&self, dual_node: NodeId) -> Result<&Edge, Error> {
        let edge = self.dual.node(dual_node)?.primal_edge().ok_or_else(|| {
            Error::InconsistentTopology(format!("dual node {dual_node} has no primal edge"))
        })?;
        self.primal.edge(edge)
    }

    /// Dual edges (turns) touching the dual node of a primal edge
    pub fn turns_from(&self, edge: EdgeId) -> Result<Vec<&Edge>, Error> {
        self.dual_node_of(edge)?
            .edges()
            .iter()
            .map(|turn| self.dual.edge(*turn))
            .collect()
    }

    pub fn increment_volume(
        &self,
        edge: EdgeId,
        category: &str,
        amount: Volume,
    ) -> Result<Volume, Error> {
        self.primal.increment_volume(edge, category, amount)
    }

    pub fn reset_volumes(&self) -> Result<(), Error> {
        self.primal.reset_volumes()
    }

    pub fn volume_batch(&self) -> Result<VolumeBatch, Error> {
        self.primal.volume_batch()
    }

    pub fn merge_volumes(&self, batch: &VolumeBatch) -> Result<(), Error> {
        self.primal.merge_volumes(batch)
    }

    /// Marks a primal edge as validated against ground truth
    pub fn set_known(&self, edge: EdgeId, known: bool) -> Result<(), Error> {
        self.primal.edge(edge)?.set_known(known);
        Ok(())
    }
}
