use dualnet_core::prelude::*;
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyInt};
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};

/// AttributeOverlay
///
/// Collects the result of a spatial overlay (barriers, parks, water bodies
/// and generic attributes) per street segment, before the network is built.
/// Lists are append-only.
///
/// Example:
///
/// .. code-block:: python
///
///     overlay = AttributeOverlay()
///     overlay.add_positive_barrier(0, 17)
///     overlay.insert_attribute(0, "name", "Canal Street")
///     network = create_street_network(lines, overlay)
#[gen_stub_pyclass]
#[pyclass(name = "AttributeOverlay")]
#[derive(Default)]
pub struct PyAttributeOverlay {
    pub(crate) overlay: AttributeOverlay,
}

/// Converts a Python int, float or str; anything else is rejected.
///
/// `bool` is not an integer here, and an int that does not fit in 64 bits
/// raises `OverflowError` instead of becoming a float.
fn extract_attribute(value: &Bound<'_, PyAny>) -> PyResult<AttributeValue> {
    if value.is_instance_of::<PyBool>() {
        return Err(PyTypeError::new_err(
            "Attribute values must be int, float or str, not bool",
        ));
    }
    if value.is_instance_of::<PyInt>() {
        return Ok(AttributeValue::Integer(value.extract::<i64>()?));
    }
    if value.is_instance_of::<PyFloat>() {
        return Ok(AttributeValue::Double(value.extract::<f64>()?));
    }
    if let Ok(value) = value.extract::<String>() {
        return Ok(AttributeValue::String(value));
    }
    Err(PyTypeError::new_err(
        "Attribute values must be int, float or str",
    ))
}

#[gen_stub_pymethods]
#[pymethods]
impl PyAttributeOverlay {
    #[new]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_positive_barrier(&mut self, edge_id: usize, barrier: i64) {
        self.overlay.add_positive_barrier(edge_id, barrier);
    }

    pub fn add_negative_barrier(&mut self, edge_id: usize, barrier: i64) {
        self.overlay.add_negative_barrier(edge_id, barrier);
    }

    pub fn add_park(&mut self, edge_id: usize, park: i64) {
        self.overlay.add_park(edge_id, park);
    }

    pub fn add_water_body(&mut self, edge_id: usize, water_body: i64) {
        self.overlay.add_water_body(edge_id, water_body);
    }

    pub fn set_region(&mut self, edge_id: usize, region: u32) {
        self.overlay.set_region(edge_id, region);
    }

    /// Sets an integer, float or string attribute of a segment
    pub fn insert_attribute(
        &mut self,
        edge_id: usize,
        name: String,
        value: &Bound<'_, PyAny>,
    ) -> PyResult<()> {
        self.overlay
            .insert_attribute(edge_id, name, extract_attribute(value)?);
        Ok(())
    }

    fn __repr__(&self) -> String {
        if self.overlay.is_empty() {
            "Empty AttributeOverlay".to_string()
        } else {
            "AttributeOverlay".to_string()
        }
    }
}
