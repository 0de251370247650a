use pyo3::prelude::*;
use pyo3_stub_gen::define_stub_info_gatherer;

use model::{PyEdge, PyStreetNetwork, PyTurn, py_create_street_network};
use overlay::PyAttributeOverlay;

pub mod model;
pub mod overlay;

/// A Python module implemented in Rust.
#[pymodule]
fn dualnet(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyStreetNetwork>()?;
    m.add_class::<PyEdge>()?;
    m.add_class::<PyTurn>()?;
    m.add_class::<PyAttributeOverlay>()?;
    m.add_function(wrap_pyfunction!(py_create_street_network, m)?)?;
    Ok(())
}

define_stub_info_gatherer!(stub_info);
