//! Index-addressed graph arenas.
//!
//! Edges refer to nodes by index and nodes to edges by index, so the graph
//! holds no reference cycles and is `Sync` once built.

use std::sync::Arc;

use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use rayon::prelude::*;

use super::attributes::{AttributeOverlay, EdgeAttributes};
use super::volumes::{VolumeBatch, VolumeCategories};
use super::{Edge, Node};
use crate::{EdgeId, Error, NodeId, Volume};

#[derive(Debug, Default)]
pub struct Graph {
    edges: Vec<Edge>,
    nodes: Vec<Node>,
    categories: Option<Arc<VolumeCategories>>,
    overlay_applied: bool,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            edges: Vec::with_capacity(edges),
            nodes: Vec::with_capacity(nodes),
            ..Self::default()
        }
    }

    /// Appends an edge whose id must be the next free edge index
    pub(crate) fn push_edge(&mut self, edge: Edge) -> Result<EdgeId, Error> {
        let id = self.edges.len();
        if edge.id() != id {
            return Err(Error::InconsistentTopology(format!(
                "edge id {} pushed at index {id}",
                edge.id()
            )));
        }
        self.edges.push(edge);
        Ok(id)
    }

    /// Appends a node whose id must be the next free node index
    pub(crate) fn push_node(&mut self, node: Node) -> Result<NodeId, Error> {
        let id = self.nodes.len();
        if node.id() != id {
            return Err(Error::InconsistentTopology(format!(
                "node id {} pushed at index {id}",
                node.id()
            )));
        }
        self.nodes.push(node);
        Ok(id)
    }

    /// Binds an edge to its endpoints and registers it on both nodes
    pub(crate) fn connect(&mut self, edge: EdgeId, from: NodeId, to: NodeId) -> Result<(), Error> {
        self.node(from)?;
        self.node(to)?;
        self.edge_mut(edge)?.set_nodes(from, to)?;
        self.nodes[from].add_incident_edge(edge);
        self.nodes[to].add_incident_edge(edge);
        Ok(())
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge, Error> {
        self.edges.get(id).ok_or(Error::InvalidEdgeIndex(id))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.nodes.get(id).ok_or(Error::InvalidNodeIndex(id))
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, Error> {
        self.edges.get_mut(id).ok_or(Error::InvalidEdgeIndex(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        self.nodes.get_mut(id).ok_or(Error::InvalidNodeIndex(id))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Endpoint of `edge` opposite to `node`
    pub fn other_node(&self, edge: EdgeId, node: NodeId) -> Result<NodeId, Error> {
        self.edge(edge)?.other_node(node)
    }

    /// Node shared by two edges
    pub fn common_node(&self, a: EdgeId, b: EdgeId) -> Result<NodeId, Error> {
        self.edge(a)?.common_node(self.edge(b)?)
    }

    /// Edges incident to `node` other than `edge`
    pub fn other_edges(&self, node: NodeId, edge: EdgeId) -> Result<Vec<EdgeId>, Error> {
        Ok(self.node(node)?.other_edges(edge))
    }

    /// Checks that edges and nodes reference each other consistently
    pub fn validate_topology(&self) -> Result<(), Error> {
        for edge in &self.edges {
            let (from, to) = edge.endpoints()?;
            for node in [from, to] {
                let incident = self
                    .nodes
                    .get(node)
                    .is_some_and(|n| n.is_incident(edge.id()));
                if !incident {
                    return Err(Error::InconsistentTopology(format!(
                        "edge {} is not registered on its endpoint {node}",
                        edge.id()
                    )));
                }
            }
        }

        for node in &self.nodes {
            for &edge in node.edges() {
                let bound = self
                    .edges
                    .get(edge)
                    .and_then(|e| e.endpoints().ok())
                    .is_some_and(|(from, to)| from == node.id() || to == node.id());
                if !bound {
                    return Err(Error::InconsistentTopology(format!(
                        "node {} lists edge {edge} which does not end there",
                        node.id()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Attaches the overlay result to every edge and freezes attributes.
    ///
    /// Edges absent from the overlay get empty attributes.
    pub fn apply_overlay(&mut self, mut overlay: AttributeOverlay) -> Result<(), Error> {
        if self.overlay_applied {
            return Err(Error::AlreadyBound("attribute overlay"));
        }
        if let Some(max) = overlay.max_edge() {
            if max >= self.edges.len() {
                return Err(Error::InvalidEdgeIndex(max));
            }
        }

        let mut populated = 0;
        for edge in &mut self.edges {
            let id = edge.id();
            let region = overlay.regions.remove(&id);
            let attributes = match overlay.entries.remove(&id) {
                Some(attributes) => {
                    populated += 1;
                    attributes
                }
                None => EdgeAttributes::default(),
            };
            edge.populate(attributes, region)?;
        }
        self.overlay_applied = true;

        debug!(
            "Applied overlay attributes to {populated} of {} edges",
            self.edges.len()
        );
        Ok(())
    }

    pub fn overlay_applied(&self) -> bool {
        self.overlay_applied
    }

    /// Gives every edge the same zeroed counter set
    pub fn init_volumes(&mut self, categories: VolumeCategories) -> Result<(), Error> {
        if self.categories.is_some() {
            return Err(Error::AlreadyBound("volume categories"));
        }
        let categories = Arc::new(categories);
        for edge in &mut self.edges {
            edge.init_volumes(Arc::clone(&categories))?;
        }
        self.categories = Some(categories);
        Ok(())
    }

    pub fn volume_categories(&self) -> Result<&Arc<VolumeCategories>, Error> {
        self.categories.as_ref().ok_or(Error::UninitializedCounters)
    }

    pub fn increment_volume(
        &self,
        edge: EdgeId,
        category: &str,
        amount: Volume,
    ) -> Result<Volume, Error> {
        self.edge(edge)?.increment_volume(category, amount)
    }

    /// Zeroes all counters of all edges
    pub fn reset_volumes(&self) -> Result<(), Error> {
        self.volume_categories()?;
        self.edges.par_iter().try_for_each(Edge::reset_volumes)
    }

    /// Empty worker-local batch matching this graph's categories
    pub fn volume_batch(&self) -> Result<VolumeBatch, Error> {
        Ok(VolumeBatch::new(Arc::clone(self.volume_categories()?)))
    }

    /// Adds a worker batch into the shared counters.
    ///
    /// The whole batch is checked before any counter changes, including
    /// against overflow. Increments racing with the merge can still make a
    /// single counter fail, which leaves that counter unchanged.
    pub fn merge_volumes(&self, batch: &VolumeBatch) -> Result<(), Error> {
        let categories = self.volume_categories()?;
        if batch.categories().names() != categories.names() {
            return Err(Error::InvalidData(
                "Volume batch was created for different categories".to_string(),
            ));
        }
        if let Some(&(edge, _)) = batch.totals.keys().find(|(edge, _)| *edge >= self.edges.len()) {
            return Err(Error::InvalidEdgeIndex(edge));
        }
        for (&(edge, slot), &amount) in &batch.totals {
            if !self.edges[edge].volumes()?.has_room(slot, amount) {
                return Err(Error::InvalidData(format!(
                    "Volume overflow on edge {edge} in category {}",
                    categories.names()[slot]
                )));
            }
        }

        for (&(edge, slot), &amount) in &batch.totals {
            self.edges[edge].volumes()?.increment_slot(slot, amount)?;
        }
        Ok(())
    }

    /// Number of connected components
    pub fn connected_components(&self) -> Result<usize, Error> {
        Ok(petgraph::algo::connected_components(&self.to_petgraph()?))
    }

    /// Exports the topology to petgraph for external algorithms.
    ///
    /// Node indices match node ids; edge weights are [`Edge::weight`].
    pub fn to_petgraph(&self) -> Result<UnGraph<NodeId, f64>, Error> {
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.edges.len());
        for node in &self.nodes {
            graph.add_node(node.id());
        }
        for edge in &self.edges {
            let (from, to) = edge.endpoints()?;
            graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), edge.weight());
        }
        Ok(graph)
    }
}
