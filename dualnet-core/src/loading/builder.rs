use geo::LineString;
use log::info;

use super::config::NetworkConfig;
use super::primal::build_primal_graph;
use crate::algo::build_dual_graph;
use crate::{AttributeOverlay, Error, GeometryAdapter, StreetNetwork};

/// Creates a street network: primal graph, overlay attributes, dual graph.
///
/// The build either completes or returns the first error; no partially
/// built network is ever returned.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a geometry is
/// degenerate, the overlay references unknown edges, or connectivity is
/// required and not met.
pub fn create_street_network<G: GeometryAdapter>(
    lines: Vec<LineString<f64>>,
    overlay: Option<AttributeOverlay>,
    config: &NetworkConfig,
    geometry: &G,
) -> Result<StreetNetwork, Error> {
    validate_input(&lines, config)?;

    info!("Processing {} street geometries", lines.len());
    let mut primal = build_primal_graph(lines, config, geometry)?;

    match overlay {
        Some(overlay) => {
            info!("Applying overlay attributes");
            primal.apply_overlay(overlay)?;
        }
        None => primal.apply_overlay(AttributeOverlay::new())?,
    }

    let network = build_dual_graph(primal, geometry)?;

    info!("Street network created successfully");
    Ok(network)
}

fn validate_input(lines: &[LineString<f64>], config: &NetworkConfig) -> Result<(), Error> {
    config.validate()?;

    if lines.is_empty() {
        return Err(Error::InvalidData(
            "No street geometries provided".to_string(),
        ));
    }

    Ok(())
}
