use dualnet_core::prelude::*;
use geo::LineString;

fn lines() -> Vec<LineString<f64>> {
    vec![
        LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]),
        LineString::from(vec![(10.0, 0.0), (10.0, 10.0)]),
        LineString::from(vec![(10.0, 10.0), (0.0, 10.0)]),
    ]
}

fn overlay() -> AttributeOverlay {
    let mut overlay = AttributeOverlay::new();
    overlay
        .add_positive_barrier(0, 11)
        .add_positive_barrier(0, 12)
        .add_negative_barrier(0, 12)
        .add_negative_barrier(0, 13)
        .add_negative_barrier(1, 20)
        .add_park(2, 300)
        .add_water_body(2, 400)
        .set_region(2, 7)
        .insert_attribute(0, "name", "Canal Street")
        .insert_attribute(0, "lanes", 2_i64)
        .insert_attribute(1, "gradient", 0.04);
    overlay
}

#[test]
fn overlay_reaches_every_edge() {
    let config = NetworkConfig {
        default_region: 1,
        ..NetworkConfig::default()
    };
    let network = create_street_network(lines(), Some(overlay()), &config, &Planar).unwrap();
    let primal = network.primal();

    let canal = primal.edge(0).unwrap();
    assert_eq!(canal.positive_barriers(), &[11, 12]);
    assert_eq!(canal.negative_barriers(), &[12, 13]);
    assert_eq!(canal.barriers(), &[11, 12, 13]);
    assert_eq!(canal.string_attribute("name"), Ok("Canal Street"));
    assert_eq!(canal.integer_attribute("lanes"), Ok(2));
    assert_eq!(canal.region_id(), 1);

    let ramp = primal.edge(1).unwrap();
    assert_eq!(ramp.barriers(), &[20]);
    assert!(ramp.positive_barriers().is_empty());
    assert_eq!(ramp.double_attribute("gradient"), Ok(0.04));

    let park_side = primal.edge(2).unwrap();
    assert!(park_side.barriers().is_empty());
    assert_eq!(park_side.parks(), &[300]);
    assert_eq!(park_side.water_bodies(), &[400]);
    assert_eq!(park_side.region_id(), 7);
}

#[test]
fn lookups_fail_without_coercion() {
    let network =
        create_street_network(lines(), Some(overlay()), &NetworkConfig::default(), &Planar)
            .unwrap();
    let canal = network.primal().edge(0).unwrap();

    assert_eq!(
        canal.integer_attribute("surface"),
        Err(Error::AttributeNotFound("surface".to_string()))
    );
    assert_eq!(
        canal.integer_attribute("name"),
        Err(Error::AttributeTypeMismatch {
            name: "name".to_string(),
            expected: AttributeKind::Integer,
            found: AttributeKind::String,
        })
    );
    assert!(matches!(
        canal.double_attribute("lanes"),
        Err(Error::AttributeTypeMismatch { .. })
    ));
}

#[test]
fn overlay_is_applied_before_dual_construction() {
    let config = NetworkConfig::default();
    let mut primal = build_primal_graph(lines(), &config, &Planar).unwrap();
    primal.apply_overlay(overlay()).unwrap();
    assert!(primal.overlay_applied());
    assert_eq!(
        primal.apply_overlay(AttributeOverlay::new()),
        Err(Error::AlreadyBound("attribute overlay"))
    );

    let network = DualGraphBuilder::new(primal, &Planar).build().unwrap();
    assert_eq!(network.primal().edge(0).unwrap().barriers(), &[11, 12, 13]);
    assert_eq!(network.dual().node_count(), 3);
    assert_eq!(network.dual().edge_count(), 2);
}
