use serde::{Deserialize, Serialize};

use crate::{Error, RegionId, VolumeCategories};

/// Configuration of a street network build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Endpoints closer than this (in geometry units) share one node
    pub node_tolerance: f64,
    /// Volume counter categories given to every edge
    pub volume_categories: Vec<String>,
    /// Fail the build if the network has more than one component
    pub require_connected: bool,
    /// Accept edges that start and end at the same node
    pub allow_loops: bool,
    /// Region assigned to edges the overlay does not tag
    pub default_region: RegionId,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_tolerance: 1e-6,
            volume_categories: Vec::new(),
            require_connected: false,
            allow_loops: false,
            default_region: 0,
        }
    }
}

impl NetworkConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: NetworkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.node_tolerance.is_finite() || self.node_tolerance < 0.0 {
            return Err(Error::InvalidData(format!(
                "Node tolerance must be a finite non-negative number, got {}",
                self.node_tolerance
            )));
        }
        self.categories()?;
        Ok(())
    }

    pub(crate) fn categories(&self) -> Result<VolumeCategories, Error> {
        VolumeCategories::new(self.volume_categories.iter().cloned())
    }
}
