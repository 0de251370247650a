//! Geometric measurements over street geometries.
//!
//! Graph construction never computes lengths or angles itself; it goes
//! through a [`GeometryAdapter`], so the same network code works for projected
//! and for lon/lat input.

use geo::{Bearing, Centroid, Coord, Euclidean, Haversine, Length, LineString, Point};

/// End of a line a bearing is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    Start,
    End,
}

/// Measurements the graph needs from its geometry backend
pub trait GeometryAdapter {
    /// Length of the line in the adapter's units
    fn length(&self, line: &LineString<f64>) -> f64;

    /// Centroid of the line, `None` for an empty line
    fn centroid(&self, line: &LineString<f64>) -> Option<Point<f64>>;

    /// Bearing in degrees of the line leaving the given end.
    ///
    /// Returns `None` when every vertex of the line coincides.
    fn bearing_at(&self, line: &LineString<f64>, end: LineEnd) -> Option<f64>;
}

/// Euclidean plane, for projected coordinates.
///
/// Bearings are counterclockwise from the x axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planar;

/// Spherical earth (haversine), for lon/lat coordinates.
///
/// Lengths are in meters, bearings clockwise from north.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl GeometryAdapter for Planar {
    fn length(&self, line: &LineString<f64>) -> f64 {
        Euclidean.length(line)
    }

    fn centroid(&self, line: &LineString<f64>) -> Option<Point<f64>> {
        line.centroid()
    }

    fn bearing_at(&self, line: &LineString<f64>, end: LineEnd) -> Option<f64> {
        let (origin, toward) = leaving_segment(line, end)?;
        Some((toward.y - origin.y).atan2(toward.x - origin.x).to_degrees())
    }
}

impl GeometryAdapter for Geographic {
    fn length(&self, line: &LineString<f64>) -> f64 {
        Haversine.length(line)
    }

    fn centroid(&self, line: &LineString<f64>) -> Option<Point<f64>> {
        line.centroid()
    }

    fn bearing_at(&self, line: &LineString<f64>, end: LineEnd) -> Option<f64> {
        let (origin, toward) = leaving_segment(line, end)?;
        Some(Haversine.bearing(Point::from(origin), Point::from(toward)))
    }
}

/// The endpoint at `end` and the first vertex that differs from it walking
/// into the line.
fn leaving_segment(line: &LineString<f64>, end: LineEnd) -> Option<(Coord<f64>, Coord<f64>)> {
    match end {
        LineEnd::Start => {
            let first = *line.0.first()?;
            line.0.iter().find(|c| **c != first).map(|c| (first, *c))
        }
        LineEnd::End => {
            let last = *line.0.last()?;
            line.0.iter().rev().find(|c| **c != last).map(|c| (last, *c))
        }
    }
}

/// Deflection angle in degrees between two edges meeting at a node, given
/// their bearings leaving that node.
///
/// Straight continuation yields 0, a full reversal yields 180.
pub fn deflection_degrees(bearing_a: f64, bearing_b: f64) -> f64 {
    let diff = (bearing_a - bearing_b).rem_euclid(360.0);
    let between = if diff > 180.0 { 360.0 - diff } else { diff };
    (180.0 - between).clamp(0.0, 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    const EPS: f64 = 1e-9;

    #[test]
    fn planar_measurements() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0)];
        assert!((Planar.length(&line) - 5.0).abs() < EPS);

        let centroid = Planar.centroid(&line).unwrap();
        assert!((centroid.x() - 1.5).abs() < EPS);
        assert!((centroid.y() - 2.0).abs() < EPS);
    }

    #[test]
    fn bearing_leaves_from_either_end() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];

        let at_start = Planar.bearing_at(&line, LineEnd::Start).unwrap();
        assert!(at_start.abs() < EPS);

        // leaving (1, 1) toward (1, 0) points down
        let at_end = Planar.bearing_at(&line, LineEnd::End).unwrap();
        assert!((at_end + 90.0).abs() < EPS);
    }

    #[test]
    fn closed_ring_has_two_distinct_ends() {
        let ring = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let start = Planar.bearing_at(&ring, LineEnd::Start).unwrap();
        let end = Planar.bearing_at(&ring, LineEnd::End).unwrap();
        assert!(start.abs() < EPS);
        assert!((end - 45.0).abs() < EPS);
    }

    #[test]
    fn bearing_skips_repeated_vertices() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.0), (x: 0.0, y: 2.0)];
        let bearing = Planar.bearing_at(&line, LineEnd::Start).unwrap();
        assert!((bearing - 90.0).abs() < EPS);
    }

    #[test]
    fn bearing_of_collapsed_line_is_none() {
        let line = line_string![(x: 2.0, y: 2.0), (x: 2.0, y: 2.0)];
        assert!(Planar.bearing_at(&line, LineEnd::End).is_none());
    }

    #[test]
    fn geographic_bearing_is_clockwise_from_north() {
        let line = line_string![(x: 13.40, y: 52.50), (x: 13.40, y: 52.51)];
        let bearing = Geographic.bearing_at(&line, LineEnd::Start).unwrap();
        assert!(bearing.abs() < 1e-6 || (bearing - 360.0).abs() < 1e-6);
        assert!(Geographic.length(&line) > 1000.0);
    }

    #[test]
    fn deflection_folds_to_half_circle() {
        // opposite bearings at the node: straight through
        assert!(deflection_degrees(0.0, 180.0).abs() < EPS);
        assert!((deflection_degrees(180.0, 90.0) - 90.0).abs() < EPS);
        assert!((deflection_degrees(45.0, 45.0) - 180.0).abs() < EPS);
        assert!((deflection_degrees(-170.0, 170.0) - 160.0).abs() < EPS);
        assert!((deflection_degrees(30.0, 250.0) - deflection_degrees(250.0, 30.0)).abs() < EPS);
    }
}
