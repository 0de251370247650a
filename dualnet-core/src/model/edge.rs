//! Graph edge: a street segment in the primal graph, a turn in the dual graph

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use geo::{LineString, Point};

use super::attributes::EdgeAttributes;
use super::volumes::{VolumeCategories, VolumeCounters};
use crate::{EdgeId, Error, GeometryAdapter, LayerId, NodeId, RegionId, Volume};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Street segment of the primal graph
    Segment,
    /// Turn between two segments, edge of the dual graph
    Turn,
}

#[derive(Debug)]
pub struct Edge {
    id: EdgeId,
    kind: EdgeKind,
    region_id: RegionId,
    line: LineString<f64>,
    length: f64,
    centroid: Point<f64>,
    from_node: Option<NodeId>,
    to_node: Option<NodeId>,
    loops_permitted: bool,
    /// Dual node standing for this segment
    dual_node: Option<NodeId>,
    /// Turn cost, only set on dual edges
    deflection_degrees: f64,
    attributes: EdgeAttributes,
    attributes_populated: bool,
    volumes: Option<VolumeCounters>,
    known: AtomicBool,
}

impl Edge {
    /// Creates a street segment, caching its length and centroid.
    ///
    /// # Errors
    ///
    /// `DegenerateGeometry` if the line has fewer than two vertices, a
    /// non-finite coordinate, or zero length.
    pub fn new(
        id: EdgeId,
        line: LineString<f64>,
        geometry: &impl GeometryAdapter,
    ) -> Result<Self, Error> {
        if line.0.len() < 2 {
            return Err(Error::DegenerateGeometry(format!(
                "edge {id} has {} vertices",
                line.0.len()
            )));
        }
        if line.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(Error::DegenerateGeometry(format!(
                "edge {id} has non-finite coordinates"
            )));
        }

        let length = geometry.length(&line);
        if !length.is_finite() || length <= 0.0 {
            return Err(Error::DegenerateGeometry(format!(
                "edge {id} has length {length}"
            )));
        }
        let centroid = geometry.centroid(&line).ok_or_else(|| {
            Error::DegenerateGeometry(format!("edge {id} has no centroid"))
        })?;

        Ok(Self::with_measures(id, EdgeKind::Segment, line, length, centroid))
    }

    /// Creates a dual-graph edge. Turn geometry runs through the junction and
    /// may collapse to a point, so it skips the segment checks.
    pub(crate) fn turn(
        id: EdgeId,
        line: LineString<f64>,
        deflection_degrees: f64,
        geometry: &impl GeometryAdapter,
    ) -> Self {
        let length = geometry.length(&line);
        let centroid = geometry
            .centroid(&line)
            .unwrap_or_else(|| Point::new(f64::NAN, f64::NAN));
        let mut edge = Self::with_measures(id, EdgeKind::Turn, line, length, centroid);
        edge.deflection_degrees = deflection_degrees;
        edge
    }

    fn with_measures(
        id: EdgeId,
        kind: EdgeKind,
        line: LineString<f64>,
        length: f64,
        centroid: Point<f64>,
    ) -> Self {
        Self {
            id,
            kind,
            region_id: RegionId::default(),
            line,
            length,
            centroid,
            from_node: None,
            to_node: None,
            loops_permitted: false,
            dual_node: None,
            deflection_degrees: 0.0,
            attributes: EdgeAttributes::default(),
            attributes_populated: false,
            volumes: None,
            known: AtomicBool::new(false),
        }
    }

    /// Allows `from_node == to_node` for this edge
    pub fn with_loops_permitted(mut self, permitted: bool) -> Self {
        self.loops_permitted = permitted;
        self
    }

    pub fn with_region(mut self, region: RegionId) -> Self {
        self.region_id = region;
        self
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn region_id(&self) -> RegionId {
        self.region_id
    }

    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn centroid(&self) -> Point<f64> {
        self.centroid
    }

    /// Deflection angle in degrees for dual edges, 0 for street segments
    pub fn deflection_angle(&self) -> f64 {
        self.deflection_degrees
    }

    /// Routing weight: length for segments, deflection for turns
    pub fn weight(&self) -> f64 {
        match self.kind {
            EdgeKind::Segment => self.length,
            EdgeKind::Turn => self.deflection_degrees,
        }
    }

    pub fn from_node(&self) -> Option<NodeId> {
        self.from_node
    }

    pub fn to_node(&self) -> Option<NodeId> {
        self.to_node
    }

    pub fn is_loop(&self) -> bool {
        self.from_node.is_some() && self.from_node == self.to_node
    }

    /// Both endpoints, failing if the edge was never bound
    pub fn endpoints(&self) -> Result<(NodeId, NodeId), Error> {
        match (self.from_node, self.to_node) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(Error::InconsistentTopology(format!(
                "edge {} has unbound endpoints",
                self.id
            ))),
        }
    }

    /// Binds the endpoints. Must be called exactly once.
    pub fn set_nodes(&mut self, from: NodeId, to: NodeId) -> Result<(), Error> {
        if self.from_node.is_some() || self.to_node.is_some() {
            return Err(Error::AlreadyBound("edge endpoints"));
        }
        if from == to && !self.loops_permitted {
            return Err(Error::DegenerateGeometry(format!(
                "edge {} starts and ends at node {from}",
                self.id
            )));
        }
        self.from_node = Some(from);
        self.to_node = Some(to);
        Ok(())
    }

    /// Given one endpoint, returns the other one
    pub fn other_node(&self, node: NodeId) -> Result<NodeId, Error> {
        match (self.from_node, self.to_node) {
            (Some(from), Some(to)) if from == node => Ok(to),
            (Some(from), Some(to)) if to == node => Ok(from),
            _ => Err(Error::NotIncident {
                edge: self.id,
                node,
            }),
        }
    }

    /// Node shared with `other`, compared by node index.
    ///
    /// If the edges share both endpoints, `from_node` is returned.
    pub fn common_node(&self, other: &Edge) -> Result<NodeId, Error> {
        let theirs = [other.from_node, other.to_node];
        [self.from_node, self.to_node]
            .into_iter()
            .flatten()
            .find(|node| theirs.contains(&Some(*node)))
            .ok_or(Error::NoCommonNode(self.id, other.id))
    }

    pub fn dual_node(&self) -> Option<NodeId> {
        self.dual_node
    }

    pub(crate) fn assign_dual_node(&mut self, node: NodeId) -> Result<(), Error> {
        if self.dual_node.is_some() {
            return Err(Error::AlreadyBound("dual node"));
        }
        self.dual_node = Some(node);
        Ok(())
    }

    pub fn attributes(&self) -> &EdgeAttributes {
        &self.attributes
    }

    pub(crate) fn populate(
        &mut self,
        attributes: EdgeAttributes,
        region: Option<RegionId>,
    ) -> Result<(), Error> {
        if self.attributes_populated {
            return Err(Error::AlreadyBound("edge attributes"));
        }
        self.attributes = attributes;
        if let Some(region) = region {
            self.region_id = region;
        }
        self.attributes_populated = true;
        Ok(())
    }

    pub fn positive_barriers(&self) -> &[LayerId] {
        self.attributes.positive_barriers()
    }

    pub fn negative_barriers(&self) -> &[LayerId] {
        self.attributes.negative_barriers()
    }

    pub fn barriers(&self) -> &[LayerId] {
        self.attributes.barriers()
    }

    pub fn water_bodies(&self) -> &[LayerId] {
        self.attributes.water_bodies()
    }

    pub fn parks(&self) -> &[LayerId] {
        self.attributes.parks()
    }

    pub fn integer_attribute(&self, name: &str) -> Result<i64, Error> {
        self.attributes.integer(name)
    }

    pub fn double_attribute(&self, name: &str) -> Result<f64, Error> {
        self.attributes.double(name)
    }

    pub fn string_attribute(&self, name: &str) -> Result<&str, Error> {
        self.attributes.string(name)
    }

    /// Establishes the counter key set; a second call fails.
    pub fn init_volumes(&mut self, categories: Arc<VolumeCategories>) -> Result<(), Error> {
        if self.volumes.is_some() {
            return Err(Error::AlreadyBound("volume counters"));
        }
        self.volumes = Some(VolumeCounters::new(categories));
        Ok(())
    }

    pub fn volumes(&self) -> Result<&VolumeCounters, Error> {
        self.volumes.as_ref().ok_or(Error::UninitializedCounters)
    }

    pub fn increment_volume(&self, category: &str, amount: Volume) -> Result<Volume, Error> {
        self.volumes()?.increment(category, amount)
    }

    pub fn volume(&self, category: &str) -> Result<Volume, Error> {
        self.volumes()?.get(category)
    }

    pub fn reset_volumes(&self) -> Result<(), Error> {
        self.volumes()?.reset();
        Ok(())
    }

    pub fn is_known(&self) -> bool {
        self.known.load(Ordering::Relaxed)
    }

    pub fn set_known(&self, known: bool) {
        self.known.store(known, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Planar;
    use crate::model::AttributeOverlay;
    use geo::line_string;

    fn segment(id: EdgeId) -> Edge {
        Edge::new(id, line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0)], &Planar).unwrap()
    }

    #[test]
    fn caches_length_and_centroid() {
        let edge = segment(3);
        assert_eq!(edge.id(), 3);
        assert_eq!(edge.kind(), EdgeKind::Segment);
        assert!((edge.length() - 4.0).abs() < 1e-12);
        assert_eq!(edge.centroid(), Point::new(2.0, 0.0));
        assert_eq!(edge.deflection_angle(), 0.0);
        assert!(!edge.is_known());
    }

    #[test]
    fn rejects_degenerate_lines() {
        let collapsed = line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0)];
        assert!(matches!(
            Edge::new(0, collapsed, &Planar),
            Err(Error::DegenerateGeometry(_))
        ));

        let single = LineString::from(vec![(0.0, 0.0)]);
        assert!(matches!(
            Edge::new(0, single, &Planar),
            Err(Error::DegenerateGeometry(_))
        ));

        let infinite = LineString::from(vec![(0.0, 0.0), (f64::INFINITY, 0.0)]);
        assert!(matches!(
            Edge::new(0, infinite, &Planar),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn endpoints_bind_once() {
        let mut edge = segment(0);
        assert!(edge.endpoints().is_err());

        edge.set_nodes(1, 2).unwrap();
        assert_eq!(edge.endpoints(), Ok((1, 2)));
        assert_eq!(edge.set_nodes(2, 3), Err(Error::AlreadyBound("edge endpoints")));
        assert_eq!(edge.endpoints(), Ok((1, 2)));
    }

    #[test]
    fn self_loops_need_permission() {
        let mut edge = segment(0);
        assert!(matches!(edge.set_nodes(4, 4), Err(Error::DegenerateGeometry(_))));

        let mut looped = segment(1).with_loops_permitted(true);
        looped.set_nodes(4, 4).unwrap();
        assert!(looped.is_loop());
        assert_eq!(looped.other_node(4), Ok(4));
    }

    #[test]
    fn other_node_of_each_endpoint() {
        let mut edge = segment(5);
        edge.set_nodes(10, 11).unwrap();

        assert_eq!(edge.other_node(10), Ok(11));
        assert_eq!(edge.other_node(11), Ok(10));
        assert_eq!(
            edge.other_node(12),
            Err(Error::NotIncident { edge: 5, node: 12 })
        );
    }

    #[test]
    fn common_node_by_identity() {
        let mut a = segment(0);
        let mut b = segment(1);
        let mut c = segment(2);
        a.set_nodes(1, 2).unwrap();
        b.set_nodes(3, 2).unwrap();
        c.set_nodes(4, 5).unwrap();

        assert_eq!(a.common_node(&b), Ok(2));
        assert_eq!(b.common_node(&a), Ok(2));
        assert_eq!(a.common_node(&c), Err(Error::NoCommonNode(0, 2)));
    }

    #[test]
    fn parallel_edges_share_from_node() {
        let mut a = segment(0);
        let mut b = segment(1);
        a.set_nodes(7, 8).unwrap();
        b.set_nodes(8, 7).unwrap();

        assert_eq!(a.common_node(&b), Ok(7));
        assert_eq!(b.common_node(&a), Ok(8));
    }

    #[test]
    fn dual_node_is_assigned_once() {
        let mut edge = segment(0);
        edge.assign_dual_node(3).unwrap();
        assert_eq!(edge.assign_dual_node(4), Err(Error::AlreadyBound("dual node")));
        assert_eq!(edge.dual_node(), Some(3));
    }

    #[test]
    fn volumes_require_initialization() {
        let mut edge = segment(0);
        assert_eq!(edge.reset_volumes(), Err(Error::UninitializedCounters));
        assert_eq!(
            edge.increment_volume("pedestrian", 1),
            Err(Error::UninitializedCounters)
        );

        let categories = Arc::new(VolumeCategories::new(["pedestrian"]).unwrap());
        edge.init_volumes(categories.clone()).unwrap();
        assert_eq!(
            edge.init_volumes(categories),
            Err(Error::AlreadyBound("volume counters"))
        );

        assert_eq!(edge.increment_volume("pedestrian", 4), Ok(4));
        edge.reset_volumes().unwrap();
        assert_eq!(edge.volume("pedestrian"), Ok(0));
    }

    #[test]
    fn attributes_populate_once() {
        let mut overlay = AttributeOverlay::new();
        overlay
            .add_positive_barrier(0, 9)
            .insert_attribute(0, "surface", "gravel");
        let attributes = overlay.entries.remove(&0).unwrap();

        let mut edge = segment(0);
        edge.populate(attributes.clone(), Some(2)).unwrap();
        assert_eq!(edge.region_id(), 2);
        assert_eq!(edge.barriers(), &[9]);
        assert_eq!(edge.string_attribute("surface"), Ok("gravel"));
        assert!(matches!(
            edge.integer_attribute("surface"),
            Err(Error::AttributeTypeMismatch { .. })
        ));

        assert_eq!(
            edge.populate(attributes, None),
            Err(Error::AlreadyBound("edge attributes"))
        );
    }
}
