use geo::Point;

use crate::{EdgeId, Error, NodeId};

/// Graph node.
///
/// In the primal graph a node is a junction or dead end. In the dual graph a
/// node stands for one primal street segment; [`Node::primal_edge`] then
/// names that segment and is the inverse of
/// [`Edge::dual_node`](crate::Edge::dual_node) on the primal side.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    coord: Point<f64>,
    /// Incident edges with set semantics, kept in insertion order
    edges: Vec<EdgeId>,
    primal_edge: Option<EdgeId>,
}

impl Node {
    pub fn new(id: NodeId, coord: Point<f64>) -> Self {
        Self {
            id,
            coord,
            edges: Vec::new(),
            primal_edge: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn coord(&self) -> Point<f64> {
        self.coord
    }

    /// Adds an incident edge. Returns `false` if it was already present.
    pub fn add_incident_edge(&mut self, edge: EdgeId) -> bool {
        if self.edges.contains(&edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    pub fn is_incident(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    /// Incident edges other than `edge`
    pub fn other_edges(&self, edge: EdgeId) -> Vec<EdgeId> {
        self.edges.iter().copied().filter(|e| *e != edge).collect()
    }

    /// Primal segment represented by this dual node
    pub fn primal_edge(&self) -> Option<EdgeId> {
        self.primal_edge
    }

    pub(crate) fn assign_primal_edge(&mut self, edge: EdgeId) -> Result<(), Error> {
        if self.primal_edge.is_some() {
            return Err(Error::AlreadyBound("primal edge of dual node"));
        }
        self.primal_edge = Some(edge);
        Ok(())
    }
}
