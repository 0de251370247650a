//! Primal to dual transformation.
//!
//! Every primal edge becomes one dual node placed at the edge centroid. At
//! every junction of degree n, each of the n·(n-1)/2 pairs of incident edges
//! becomes a dual edge weighted by the deflection angle of that turn.

use geo::{LineString, Point};
use itertools::Itertools;
use log::{debug, info};

use crate::geometry::{LineEnd, deflection_degrees};
use crate::{Edge, EdgeId, Error, GeometryAdapter, Graph, Node, NodeId, StreetNetwork};

pub struct DualGraphBuilder<'a, G: GeometryAdapter> {
    primal: Graph,
    dual: Graph,
    geometry: &'a G,
}

impl<'a, G: GeometryAdapter> DualGraphBuilder<'a, G> {
    pub fn new(primal: Graph, geometry: &'a G) -> Self {
        let dual = Graph::with_capacity(primal.edge_count(), primal.edge_count() * 2);
        Self {
            primal,
            dual,
            geometry,
        }
    }

    /// Runs the transformation and freezes both graphs into a network.
    ///
    /// # Errors
    ///
    /// `InconsistentTopology` if a primal edge has unbound endpoints, the
    /// adjacency lists disagree with the edges, or the graph was already
    /// transformed.
    pub fn build(mut self) -> Result<StreetNetwork, Error> {
        self.primal.validate_topology()?;
        if let Some(edge) = self.primal.edges().iter().find(|e| e.dual_node().is_some()) {
            return Err(Error::InconsistentTopology(format!(
                "edge {} already has a dual node",
                edge.id()
            )));
        }

        let mut junctions = 0;
        for node in 0..self.primal.node_count() {
            let (incident, junction) = {
                let node = self.primal.node(node)?;
                if node.degree() < 2 {
                    continue;
                }
                (node.edges().to_vec(), node.coord())
            };
            junctions += 1;

            for (a, b) in incident.into_iter().tuple_combinations() {
                self.add_turn(node, junction, a, b)?;
            }
        }

        // segments that take part in no turn still get their dual node
        for edge in 0..self.primal.edge_count() {
            self.dual_node_for(edge)?;
        }

        debug!("Enumerated turns at {junctions} junctions");
        info!(
            "Built dual graph with {} nodes and {} edges",
            self.dual.node_count(),
            self.dual.edge_count()
        );
        Ok(StreetNetwork::new(self.primal, self.dual))
    }

    fn add_turn(
        &mut self,
        node: NodeId,
        junction: Point<f64>,
        a: EdgeId,
        b: EdgeId,
    ) -> Result<EdgeId, Error> {
        // a loop enters the turn through whichever end deflects least
        let bearings_b = self.leaving_bearings(b, node)?;
        let deflection = self
            .leaving_bearings(a, node)?
            .into_iter()
            .cartesian_product(bearings_b)
            .map(|(bearing_a, bearing_b)| deflection_degrees(bearing_a, bearing_b))
            .fold(f64::INFINITY, f64::min);
        let dual_a = self.dual_node_for(a)?;
        let dual_b = self.dual_node_for(b)?;

        let line = LineString::from(vec![
            self.dual.node(dual_a)?.coord().0,
            junction.0,
            self.dual.node(dual_b)?.coord().0,
        ]);
        let id = self.dual.edge_count();
        self.dual
            .push_edge(Edge::turn(id, line, deflection, self.geometry))?;
        self.dual.connect(id, dual_a, dual_b)?;
        Ok(id)
    }

    /// Dual node of a primal edge, created on first use
    fn dual_node_for(&mut self, edge: EdgeId) -> Result<NodeId, Error> {
        let primal_edge = self.primal.edge(edge)?;
        if let Some(existing) = primal_edge.dual_node() {
            return Ok(existing);
        }

        let centroid = primal_edge.centroid();
        let id = self
            .dual
            .push_node(Node::new(self.dual.node_count(), centroid))?;
        self.dual.node_mut(id)?.assign_primal_edge(edge)?;
        self.primal.edge_mut(edge)?.assign_dual_node(id)?;
        Ok(id)
    }

    /// Bearings of `edge` leaving `node`.
    ///
    /// A loop leaves its node at both ends; both bearings are returned.
    fn leaving_bearings(&self, edge: EdgeId, node: NodeId) -> Result<Vec<f64>, Error> {
        let edge = self.primal.edge(edge)?;
        let (from, to) = edge.endpoints()?;

        let mut ends = Vec::with_capacity(2);
        if from == node {
            ends.push(LineEnd::Start);
        }
        if to == node {
            ends.push(LineEnd::End);
        }
        if ends.is_empty() {
            return Err(Error::NotIncident {
                edge: edge.id(),
                node,
            });
        }

        ends.into_iter()
            .map(|end| {
                self.geometry.bearing_at(edge.line(), end).ok_or_else(|| {
                    Error::DegenerateGeometry(format!("edge {} has no direction", edge.id()))
                })
            })
            .collect()
    }
}

/// Builds the dual graph of `primal` and returns both as a network
pub fn build_dual_graph<G: GeometryAdapter>(
    primal: Graph,
    geometry: &G,
) -> Result<StreetNetwork, Error> {
    DualGraphBuilder::new(primal, geometry).build()
}
