//! Categorical and generic edge attributes

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{EdgeId, Error, LayerId, RegionId};

/// Generic attribute value. The set of kinds is closed and accessors never
/// coerce between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Integer,
    Double,
    String,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::Integer => "integer",
            AttributeKind::Double => "double",
            AttributeKind::String => "string",
        };
        f.write_str(name)
    }
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Integer(_) => AttributeKind::Integer,
            AttributeValue::Double(_) => AttributeKind::Double,
            AttributeValue::String(_) => AttributeKind::String,
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

/// Attributes attached to one edge by the overlay pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeAttributes {
    positive_barriers: Vec<LayerId>,
    negative_barriers: Vec<LayerId>,
    /// Union of positive and negative barriers
    barriers: Vec<LayerId>,
    water_bodies: Vec<LayerId>,
    parks: Vec<LayerId>,
    values: HashMap<String, AttributeValue>,
}

impl EdgeAttributes {
    pub fn positive_barriers(&self) -> &[LayerId] {
        &self.positive_barriers
    }

    pub fn negative_barriers(&self) -> &[LayerId] {
        &self.negative_barriers
    }

    pub fn barriers(&self) -> &[LayerId] {
        &self.barriers
    }

    pub fn water_bodies(&self) -> &[LayerId] {
        &self.water_bodies
    }

    pub fn parks(&self) -> &[LayerId] {
        &self.parks
    }

    pub fn values(&self) -> &HashMap<String, AttributeValue> {
        &self.values
    }

    pub fn get(&self, name: &str) -> Result<&AttributeValue, Error> {
        self.values
            .get(name)
            .ok_or_else(|| Error::AttributeNotFound(name.to_string()))
    }

    pub fn integer(&self, name: &str) -> Result<i64, Error> {
        match self.get(name)? {
            AttributeValue::Integer(value) => Ok(*value),
            other => Err(mismatch(name, AttributeKind::Integer, other)),
        }
    }

    pub fn double(&self, name: &str) -> Result<f64, Error> {
        match self.get(name)? {
            AttributeValue::Double(value) => Ok(*value),
            other => Err(mismatch(name, AttributeKind::Double, other)),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str, Error> {
        match self.get(name)? {
            AttributeValue::String(value) => Ok(value),
            other => Err(mismatch(name, AttributeKind::String, other)),
        }
    }

    fn push_positive_barrier(&mut self, id: LayerId) {
        self.positive_barriers.push(id);
        self.push_barrier(id);
    }

    fn push_negative_barrier(&mut self, id: LayerId) {
        self.negative_barriers.push(id);
        self.push_barrier(id);
    }

    // keeps `barriers` equal to the ordered union of both signed lists
    fn push_barrier(&mut self, id: LayerId) {
        if !self.barriers.contains(&id) {
            self.barriers.push(id);
        }
    }
}

fn mismatch(name: &str, expected: AttributeKind, found: &AttributeValue) -> Error {
    Error::AttributeTypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

/// Result of the external spatial overlay, collected per edge.
///
/// The overlay is append-only: ids are pushed onto the lists and nothing is
/// ever removed. It is applied to a graph once with
/// [`Graph::apply_overlay`](crate::Graph::apply_overlay), after which edge
/// attributes are only reachable through shared references.
#[derive(Debug, Clone, Default)]
pub struct AttributeOverlay {
    pub(crate) entries: HashMap<EdgeId, EdgeAttributes>,
    pub(crate) regions: HashMap<EdgeId, RegionId>,
}

impl AttributeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.regions.is_empty()
    }

    pub fn add_positive_barrier(&mut self, edge: EdgeId, barrier: LayerId) -> &mut Self {
        self.entry(edge).push_positive_barrier(barrier);
        self
    }

    pub fn add_negative_barrier(&mut self, edge: EdgeId, barrier: LayerId) -> &mut Self {
        self.entry(edge).push_negative_barrier(barrier);
        self
    }

    pub fn add_water_body(&mut self, edge: EdgeId, water_body: LayerId) -> &mut Self {
        self.entry(edge).water_bodies.push(water_body);
        self
    }

    pub fn add_park(&mut self, edge: EdgeId, park: LayerId) -> &mut Self {
        self.entry(edge).parks.push(park);
        self
    }

    /// Sets a generic attribute, replacing an earlier value of the same name
    pub fn insert_attribute(
        &mut self,
        edge: EdgeId,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> &mut Self {
        self.entry(edge).values.insert(name.into(), value.into());
        self
    }

    pub fn set_region(&mut self, edge: EdgeId, region: RegionId) -> &mut Self {
        self.regions.insert(edge, region);
        self
    }

    /// Highest edge id referenced by the overlay
    pub(crate) fn max_edge(&self) -> Option<EdgeId> {
        self.entries.keys().chain(self.regions.keys()).copied().max()
    }

    fn entry(&mut self, edge: EdgeId) -> &mut EdgeAttributes {
        self.entries.entry(edge).or_default()
    }
}
