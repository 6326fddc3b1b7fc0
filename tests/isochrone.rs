use std::sync::{Arc, Mutex};
use std::thread;

use geo::{coord, Area, Intersects, Point};
use isochrone_engine::{
    compute_isochrone, reachable_within, Error, IsochroneConfig, IsochroneEngine, NodeId, Query,
    RawEdge, RawNode, RoadGraph, TransportMode,
};

const A: NodeId = 1;
const B: NodeId = 2;
const C: NodeId = 3;
const D: NodeId = 4;

fn node(id: NodeId, x: f64, y: f64) -> RawNode {
    RawNode { id, x, y }
}

fn square() -> RoadGraph {
    let nodes = vec![
        node(A, 0.0, 0.0),
        node(B, 0.0, 1.0),
        node(C, 1.0, 1.0),
        node(D, 1.0, 0.0),
    ];
    let edges = [(A, B), (B, C), (C, D), (D, A)]
        .into_iter()
        .map(|(from, to)| RawEdge {
            from,
            to,
            length: Some(600.0),
        })
        .collect();
    RoadGraph::build_bidirectional(nodes, edges).unwrap()
}

/// `n` x `n` street grid south of Eindhoven's centre, lengths from coordinates
fn grid(n: i64) -> RoadGraph {
    let id = |row: i64, col: i64| row * n + col + 1;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for row in 0..n {
        for col in 0..n {
            nodes.push(RawNode {
                id: id(row, col),
                x: 5.47 + col as f64 * 0.002,
                y: 51.43 + row as f64 * 0.002,
            });
            if col + 1 < n {
                edges.push(RawEdge {
                    from: id(row, col),
                    to: id(row, col + 1),
                    length: None,
                });
            }
            if row + 1 < n {
                edges.push(RawEdge {
                    from: id(row, col),
                    to: id(row + 1, col),
                    length: None,
                });
            }
        }
    }
    RoadGraph::build_bidirectional(nodes, edges).unwrap()
}

fn grid_centre() -> Point<f64> {
    Point::new(5.4801, 51.4401)
}

#[test]
fn square_budget_below_one_edge_reaches_only_the_corner() {
    let mut graph = square();
    let polygon = compute_isochrone(&mut graph, Point::new(0.0, 0.0), 60.0, 5.0).unwrap();
    assert_eq!(polygon.source, A);
    assert_eq!(polygon.vertices, vec![coord! { x: 0.0, y: 0.0 }]);

    let reached = reachable_within(&graph, A, 5.0).unwrap();
    assert_eq!(reached.node_ids().collect::<Vec<_>>(), vec![A]);
}

#[test]
fn square_budget_of_exactly_one_edge_reaches_both_neighbours() {
    let mut graph = square();
    let polygon = compute_isochrone(&mut graph, Point::new(0.0, 0.0), 60.0, 10.0).unwrap();
    assert_eq!(
        polygon.vertices,
        vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 1.0 },
        ]
    );
    assert!(!polygon.is_degenerate());
}

#[test]
fn zero_budget_gives_the_source_alone() {
    let mut engine = IsochroneEngine::new(grid(6));
    let polygon = engine.compute(&Query::new(grid_centre(), 75.0, 0.0)).unwrap();
    assert_eq!(polygon.vertices.len(), 1);
    assert_eq!(
        polygon.vertices[0],
        engine.graph().node_by_id(polygon.source).unwrap().coord()
    );
}

#[test]
fn reachable_area_grows_with_budget() {
    let mut engine = IsochroneEngine::new(grid(8));
    let mut previous_area = 0.0;
    let mut previous_nodes: Vec<NodeId> = Vec::new();

    for budget in [0.0, 2.0, 4.0, 6.0, 10.0, 15.0, 30.0] {
        let polygon = engine.compute(&Query::new(grid_centre(), 75.0, budget)).unwrap();
        let area = polygon.to_geo_polygon().unsigned_area();
        assert!(area >= previous_area, "area shrank at budget {budget}");
        previous_area = area;

        let reached = reachable_within(engine.graph(), polygon.source, budget).unwrap();
        assert!(previous_nodes.iter().all(|&id| reached.contains(id)));
        previous_nodes = reached.node_ids().collect();
    }
}

#[test]
fn every_reached_node_lies_in_the_polygon() {
    let mut engine = IsochroneEngine::new(grid(8));
    let polygon = engine.compute(&Query::new(grid_centre(), 75.0, 8.0)).unwrap();
    let hull = polygon.to_geo_polygon();

    let reached = reachable_within(engine.graph(), polygon.source, 8.0).unwrap();
    assert!(reached.len() > 3);
    for id in reached.node_ids() {
        let node = engine.graph().node_by_id(id).unwrap();
        assert!(hull.intersects(&node.point()), "node {id} outside hull");
    }
}

#[test]
fn identical_queries_give_identical_polygons() {
    let query = Query::new(grid_centre(), 250.0, 3.0);

    let mut first = IsochroneEngine::new(grid(8));
    let mut second = IsochroneEngine::new(grid(8));
    let a = first.compute(&query).unwrap();
    let b = second.compute(&query).unwrap();
    let c = first.compute(&query).unwrap();

    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(a.to_geojson_string(), b.to_geojson_string());
}

#[test]
fn equidistant_click_snaps_to_smaller_id() {
    let nodes = vec![node(20, 1.0, 0.0), node(10, -1.0, 0.0)];
    let mut graph = RoadGraph::build_from(nodes, vec![]).unwrap();
    let polygon = compute_isochrone(&mut graph, Point::new(0.0, 0.0), 60.0, 15.0).unwrap();
    assert_eq!(polygon.source, 10);
}

#[test]
fn rejected_speed_leaves_weights_alone() {
    let mut graph = square();
    graph.reweight(60.0).unwrap();
    let before = graph.outgoing(A);

    assert!(matches!(graph.reweight(0.0), Err(Error::InvalidSpeed(_))));
    assert!(matches!(graph.reweight(-5.0), Err(Error::InvalidSpeed(_))));
    assert_eq!(graph.outgoing(A), before);
}

#[test]
fn walking_is_slower_than_driving() {
    let config = IsochroneConfig::default();
    let mut engine = IsochroneEngine::new(grid(8));

    let walk = engine
        .compute(&Query::for_mode(grid_centre(), TransportMode::Walk, &config))
        .unwrap();
    let drive = engine
        .compute(&Query::for_mode(grid_centre(), TransportMode::Drive, &config))
        .unwrap();

    assert!(walk.to_geo_polygon().unsigned_area() < drive.to_geo_polygon().unsigned_area());
}

#[test]
fn bands_match_separate_queries() {
    let mut engine = IsochroneEngine::new(grid(8));
    let budgets = [3.0, 6.0, 9.0];
    let bands = engine.compute_bands(grid_centre(), 75.0, &budgets).unwrap();

    for (band, &budget) in bands.iter().zip(&budgets) {
        let single = engine.compute(&Query::new(grid_centre(), 75.0, budget)).unwrap();
        assert_eq!(band, &single);
    }
}

#[test]
fn shared_engine_serializes_queries() {
    let engine = Arc::new(Mutex::new(IsochroneEngine::new(grid(8))));
    let speeds = [75.0, 250.0, 833.0];

    let handles = speeds
        .iter()
        .map(|&speed| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut engine = engine.lock().unwrap();
                engine.compute(&Query::new(grid_centre(), speed, 5.0)).unwrap()
            })
        })
        .collect::<Vec<_>>();

    let mut reference = IsochroneEngine::new(grid(8));
    for (handle, &speed) in handles.into_iter().zip(&speeds) {
        let polygon = handle.join().unwrap();
        let expected = reference.compute(&Query::new(grid_centre(), speed, 5.0)).unwrap();
        assert_eq!(polygon, expected);
    }
}
