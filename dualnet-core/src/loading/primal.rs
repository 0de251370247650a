use geo::{Coord, LineString, Point};
use log::{debug, info, trace, warn};
use rstar::{PointDistance, RTree, primitives::GeomWithData};

use super::config::NetworkConfig;
use crate::{Edge, Error, GeometryAdapter, Graph, Node, NodeId};

type NodePoint = GeomWithData<[f64; 2], NodeId>;

/// Merges endpoints that lie within the tolerance of an existing node
struct NodeSnapper {
    tree: RTree<NodePoint>,
    tolerance_sq: f64,
    merged: usize,
}

impl NodeSnapper {
    fn new(tolerance: f64) -> Self {
        Self {
            tree: RTree::new(),
            tolerance_sq: tolerance * tolerance,
            merged: 0,
        }
    }

    fn snap(&mut self, graph: &mut Graph, coord: Coord<f64>) -> Result<NodeId, Error> {
        let query = [coord.x, coord.y];
        if let Some(existing) = self.tree.nearest_neighbor(&query) {
            if existing.distance_2(&query) <= self.tolerance_sq {
                trace!("Snapped {coord:?} to node {}", existing.data);
                self.merged += 1;
                return Ok(existing.data);
            }
        }

        let id = graph.push_node(Node::new(graph.node_count(), Point::from(coord)))?;
        self.tree.insert(GeomWithData::new(query, id));
        Ok(id)
    }
}

/// Builds the primal graph: one edge per line, shared endpoints resolved
/// within `config.node_tolerance`.
///
/// Edge ids follow input order, node ids follow first appearance. Any
/// degenerate line aborts the build.
///
/// Snapping is order dependent and not transitive: each endpoint joins the
/// nearest node created so far, so two endpoints within the tolerance of each
/// other can still end up on different nodes if the first of them snapped to
/// an earlier node. Keep the tolerance well below the spacing of distinct
/// junctions.
///
/// # Errors
///
/// `DegenerateGeometry` for invalid lines or forbidden self-loops,
/// `DisconnectedInput` if connectivity is required and not met.
pub fn build_primal_graph<G: GeometryAdapter>(
    lines: Vec<LineString<f64>>,
    config: &NetworkConfig,
    geometry: &G,
) -> Result<Graph, Error> {
    config.validate()?;

    let mut graph = Graph::with_capacity(lines.len() * 2, lines.len());
    let mut snapper = NodeSnapper::new(config.node_tolerance);

    for (id, line) in lines.into_iter().enumerate() {
        let edge = Edge::new(id, line, geometry)?
            .with_loops_permitted(config.allow_loops)
            .with_region(config.default_region);

        let (start, end) = match (edge.line().0.first(), edge.line().0.last()) {
            (Some(start), Some(end)) => (*start, *end),
            _ => {
                return Err(Error::DegenerateGeometry(format!(
                    "edge {id} has no endpoints"
                )));
            }
        };

        graph.push_edge(edge)?;
        let from = snapper.snap(&mut graph, start)?;
        let to = snapper.snap(&mut graph, end)?;
        graph.connect(id, from, to)?;
    }

    debug!(
        "Merged {} endpoints into existing nodes",
        snapper.merged
    );

    graph.init_volumes(config.categories()?)?;

    let components = graph.connected_components()?;
    if components > 1 {
        if config.require_connected {
            return Err(Error::DisconnectedInput(components));
        }
        warn!("Street network has {components} disconnected components");
    }

    info!(
        "Built primal graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Planar;

    fn line(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(coords.to_vec())
    }

    #[test]
    fn endpoints_within_tolerance_share_a_node() {
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0005, 0.0), (2.0, 0.0)]),
            line(&[(1.0, 0.0003), (1.0, 1.0)]),
        ];
        let config = NetworkConfig {
            node_tolerance: 0.001,
            ..NetworkConfig::default()
        };
        let graph = build_primal_graph(lines, &config, &Planar).unwrap();

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.node(1).unwrap().degree(), 3);
        assert_eq!(graph.edge(1).unwrap().endpoints(), Ok((1, 2)));
        assert_eq!(graph.edge(2).unwrap().endpoints(), Ok((1, 3)));
        graph.validate_topology().unwrap();
    }

    #[test]
    fn snapping_follows_input_order() {
        // the second start is near the first, the third only near the second
        let lines = vec![
            line(&[(0.0, 0.0), (0.0, 5.0)]),
            line(&[(0.9, 0.0), (0.9, -5.0)]),
            line(&[(1.7, 0.0), (1.7, 5.0)]),
        ];
        let config = NetworkConfig {
            node_tolerance: 1.0,
            ..NetworkConfig::default()
        };
        let graph = build_primal_graph(lines, &config, &Planar).unwrap();

        assert_eq!(graph.common_node(0, 1), Ok(0));
        assert_eq!(graph.common_node(1, 2), Err(Error::NoCommonNode(1, 2)));
        assert_eq!(graph.node(0).unwrap().degree(), 2);
    }

    #[test]
    fn endpoints_beyond_tolerance_stay_apart() {
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.1, 0.0), (2.0, 0.0)]),
        ];
        let graph = build_primal_graph(lines, &NetworkConfig::default(), &Planar).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.connected_components(), Ok(2));
    }

    #[test]
    fn disconnected_input_only_fails_when_required() {
        let lines = || {
            vec![
                line(&[(0.0, 0.0), (1.0, 0.0)]),
                line(&[(5.0, 5.0), (6.0, 5.0)]),
            ]
        };
        let strict = NetworkConfig {
            require_connected: true,
            ..NetworkConfig::default()
        };

        assert_eq!(
            build_primal_graph(lines(), &strict, &Planar).err(),
            Some(Error::DisconnectedInput(2))
        );
        assert!(build_primal_graph(lines(), &NetworkConfig::default(), &Planar).is_ok());
    }

    #[test]
    fn degenerate_line_aborts_build() {
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0, 0.0), (1.0, 0.0)]),
        ];
        assert!(matches!(
            build_primal_graph(lines, &NetworkConfig::default(), &Planar),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn closed_ring_needs_loops_allowed() {
        let ring = || vec![line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])];
        assert!(matches!(
            build_primal_graph(ring(), &NetworkConfig::default(), &Planar),
            Err(Error::DegenerateGeometry(_))
        ));

        let config = NetworkConfig {
            allow_loops: true,
            ..NetworkConfig::default()
        };
        let graph = build_primal_graph(ring(), &config, &Planar).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert!(graph.edge(0).unwrap().is_loop());
        assert_eq!(graph.node(0).unwrap().degree(), 1);
    }

    #[test]
    fn counters_start_at_zero() {
        let config = NetworkConfig {
            volume_categories: vec!["walk".to_string(), "bike".to_string()],
            ..NetworkConfig::default()
        };
        let graph =
            build_primal_graph(vec![line(&[(0.0, 0.0), (0.0, 3.0)])], &config, &Planar).unwrap();
        let edge = graph.edge(0).unwrap();
        assert_eq!(edge.volumes().unwrap().snapshot(), vec![("walk", 0), ("bike", 0)]);
    }
}
