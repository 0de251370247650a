use dualnet_core::prelude::*;
use geo::LineString;
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};
use wkt::{ToWkt, TryFromWkt};

use crate::overlay::PyAttributeOverlay;

pub(crate) fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::AttributeNotFound(_)
        | Error::InvalidEdgeIndex(_)
        | Error::InvalidNodeIndex(_)
        | Error::UnknownVolumeCategory(_) => PyKeyError::new_err(err.to_string()),
        Error::DegenerateGeometry(_)
        | Error::DisconnectedInput(_)
        | Error::AttributeTypeMismatch { .. }
        | Error::InvalidData(_)
        | Error::Config(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// StreetNetwork
///
/// A street network built from line geometries, holding the primal graph
/// (segments as edges, junctions as nodes) and its angular dual graph
/// (segments as nodes, turns as edges weighted by deflection angle).
///
/// Topology is frozen once built. Volume counters can be updated at any
/// time and from any thread.
///
/// Example:
///
/// .. code-block:: python
///
///     network = create_street_network(
///         ["LINESTRING (0 0, 1 0)", "LINESTRING (1 0, 1 1)"],
///         volume_categories=["pedestrian"],
///     )
///     network.increment_volume(0, "pedestrian")
#[gen_stub_pyclass]
#[pyclass(name = "StreetNetwork")]
pub struct PyStreetNetwork {
    pub(crate) network: StreetNetwork,
}

/// Street segment of the primal graph
#[gen_stub_pyclass]
#[pyclass(name = "Edge", get_all)]
#[derive(Clone)]
pub struct PyEdge {
    pub id: usize,
    pub region_id: u32,
    pub length: f64,
    pub from_node: usize,
    pub to_node: usize,
    pub dual_node: Option<usize>,
    pub positive_barriers: Vec<i64>,
    pub negative_barriers: Vec<i64>,
    pub barriers: Vec<i64>,
    pub parks: Vec<i64>,
    pub water_bodies: Vec<i64>,
    pub is_known: bool,
    pub wkt: String,
}

/// Turn between two street segments, an edge of the dual graph
#[gen_stub_pyclass]
#[pyclass(name = "Turn", get_all)]
#[derive(Clone)]
pub struct PyTurn {
    pub id: usize,
    pub from_edge: usize,
    pub to_edge: usize,
    pub deflection: f64,
}

impl PyEdge {
    fn from_edge(edge: &Edge) -> PyResult<Self> {
        let (from_node, to_node) = edge.endpoints().map_err(to_py_err)?;
        Ok(Self {
            id: edge.id(),
            region_id: edge.region_id(),
            length: edge.length(),
            from_node,
            to_node,
            dual_node: edge.dual_node(),
            positive_barriers: edge.positive_barriers().to_vec(),
            negative_barriers: edge.negative_barriers().to_vec(),
            barriers: edge.barriers().to_vec(),
            parks: edge.parks().to_vec(),
            water_bodies: edge.water_bodies().to_vec(),
            is_known: edge.is_known(),
            wkt: edge.line().wkt_string(),
        })
    }
}

#[gen_stub_pymethods]
#[pymethods]
impl PyStreetNetwork {
    pub fn edge_count(&self) -> usize {
        self.network.primal().edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.network.primal().node_count()
    }

    pub fn dual_node_count(&self) -> usize {
        self.network.dual().node_count()
    }

    pub fn dual_edge_count(&self) -> usize {
        self.network.dual().edge_count()
    }

    /// Street segment by id
    pub fn edge(&self, edge_id: usize) -> PyResult<PyEdge> {
        let edge = self.network.primal().edge(edge_id).map_err(to_py_err)?;
        PyEdge::from_edge(edge)
    }

    /// Integer, float or string attribute attached by the overlay
    pub fn attribute(&self, py: Python<'_>, edge_id: usize, name: &str) -> PyResult<Py<PyAny>> {
        let edge = self.network.primal().edge(edge_id).map_err(to_py_err)?;
        let value = edge.attributes().get(name).map_err(to_py_err)?;
        let object = match value {
            AttributeValue::Integer(value) => (*value).into_pyobject(py)?.into_any().unbind(),
            AttributeValue::Double(value) => (*value).into_pyobject(py)?.into_any().unbind(),
            AttributeValue::String(value) => value.as_str().into_pyobject(py)?.into_any().unbind(),
        };
        Ok(object)
    }

    /// All turns of the dual graph, expressed with primal edge ids
    pub fn turns(&self) -> PyResult<Vec<PyTurn>> {
        self.network
            .dual()
            .edges()
            .iter()
            .map(|turn| {
                let (a, b) = turn.endpoints().map_err(to_py_err)?;
                Ok(PyTurn {
                    id: turn.id(),
                    from_edge: self.network.primal_edge_of(a).map_err(to_py_err)?.id(),
                    to_edge: self.network.primal_edge_of(b).map_err(to_py_err)?.id(),
                    deflection: turn.deflection_angle(),
                })
            })
            .collect()
    }

    /// Turns touching the given street segment
    pub fn turns_from(&self, edge_id: usize) -> PyResult<Vec<usize>> {
        Ok(self
            .network
            .turns_from(edge_id)
            .map_err(to_py_err)?
            .iter()
            .map(|turn| turn.id())
            .collect())
    }

    #[pyo3(signature = (edge_id, category, amount = 1))]
    pub fn increment_volume(&self, edge_id: usize, category: &str, amount: u64) -> PyResult<u64> {
        self.network
            .increment_volume(edge_id, category, amount)
            .map_err(to_py_err)
    }

    pub fn reset_volumes(&self) -> PyResult<()> {
        self.network.reset_volumes().map_err(to_py_err)
    }

    /// `(category, volume)` pairs of a street segment
    pub fn volumes(&self, edge_id: usize) -> PyResult<Vec<(String, u64)>> {
        let edge = self.network.primal().edge(edge_id).map_err(to_py_err)?;
        let counters = edge.volumes().map_err(to_py_err)?;
        Ok(counters
            .snapshot()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect())
    }

    #[pyo3(signature = (edge_id, known = true))]
    pub fn set_known(&self, edge_id: usize, known: bool) -> PyResult<()> {
        self.network.set_known(edge_id, known).map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "StreetNetwork with {} edges, {} nodes and {} turns",
            self.edge_count(),
            self.node_count(),
            self.dual_edge_count()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

/// Create a street network and its dual graph from WKT line strings
///
/// Parameters
/// ----------
/// wkt_lines : list[str]
///     One ``LINESTRING`` per street segment. Edge ids follow list order.
/// overlay : AttributeOverlay, optional
///     Barrier, park, water body and generic attributes per edge.
/// node_tolerance : float, default=1e-6
///     Endpoints closer than this share one junction.
/// volume_categories : list[str], optional
///     Names of the traffic volume counters on every edge.
/// require_connected : bool, default=False
///     Raise if the network has more than one component.
/// allow_loops : bool, default=False
///     Accept segments that start and end at the same junction.
/// geographic : bool, default=False
///     Treat coordinates as lon/lat and measure in meters.
///
/// Returns
/// -------
/// StreetNetwork
///
/// Raises
/// ------
/// ValueError
///     If a geometry is invalid or the input violates the configuration
#[gen_stub_pyfunction]
#[pyfunction(name = "create_street_network")]
#[pyo3(signature = (
    wkt_lines,
    overlay = None,
    node_tolerance = 1e-6,
    volume_categories = None,
    require_connected = false,
    allow_loops = false,
    geographic = false
))]
pub fn py_create_street_network(
    wkt_lines: Vec<String>,
    overlay: Option<PyRef<'_, PyAttributeOverlay>>,
    node_tolerance: f64,
    volume_categories: Option<Vec<String>>,
    require_connected: bool,
    allow_loops: bool,
    geographic: bool,
) -> PyResult<PyStreetNetwork> {
    let lines = wkt_lines
        .iter()
        .enumerate()
        .map(|(idx, wkt)| {
            LineString::<f64>::try_from_wkt_str(wkt)
                .map_err(|e| PyValueError::new_err(format!("Invalid WKT line {idx}: {e}")))
        })
        .collect::<PyResult<Vec<_>>>()?;

    let config = NetworkConfig {
        node_tolerance,
        volume_categories: volume_categories.unwrap_or_default(),
        require_connected,
        allow_loops,
        ..NetworkConfig::default()
    };
    let overlay = overlay.map(|o| o.overlay.clone());

    let network = if geographic {
        create_street_network(lines, overlay, &config, &Geographic)
    } else {
        create_street_network(lines, overlay, &config, &Planar)
    }
    .map_err(to_py_err)?;

    Ok(PyStreetNetwork { network })
}
