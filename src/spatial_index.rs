use geo::Point;
use log::trace;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::error::{Error, Result};
use crate::graph::{Node, NodeId, RoadGraph};
use crate::utils::calculate_distance;

type IndexedPoint = GeomWithData<[f64; 2], Node>;

/// Nearest-node lookup over a graph's node coordinates.
///
/// Coordinates are projected with a local equirectangular projection
/// centred on the graph's mean latitude, so distances are planar but a
/// degree of longitude isn't weighted like a degree of latitude.
/// Equidistant candidates resolve to the smallest node id.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
    lon_scale: f64,
}

impl SpatialIndex {
    pub fn new(graph: &RoadGraph) -> Self {
        let lon_scale = if graph.is_empty() {
            1.0
        } else {
            let mean_lat = graph.nodes().map(|n| n.lat).sum::<f64>() / graph.node_count() as f64;
            mean_lat.to_radians().cos()
        };

        let points = graph
            .nodes()
            .map(|node| GeomWithData::new(project(node.lon, node.lat, lon_scale), *node))
            .collect::<Vec<_>>();

        Self {
            tree: RTree::bulk_load(points),
            lon_scale,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Returns the id of the node closest to `point` (x = lon, y = lat).
    ///
    /// # Errors
    ///
    /// [`Error::EmptyGraph`] if the index holds no nodes,
    /// [`Error::InvalidQuery`] if the point isn't finite.
    pub fn nearest(&self, point: Point<f64>) -> Result<NodeId> {
        self.nearest_node(point).map(|node| node.id)
    }

    /// Like [`SpatialIndex::nearest`], also returning the great-circle
    /// distance in meters between `point` and the chosen node.
    pub fn nearest_with_distance(&self, point: Point<f64>) -> Result<(NodeId, f64)> {
        let node = self.nearest_node(point)?;
        let meters = calculate_distance(point.y(), point.x(), node.lat, node.lon);
        Ok((node.id, meters))
    }

    fn nearest_node(&self, point: Point<f64>) -> Result<Node> {
        if !point.x().is_finite() || !point.y().is_finite() {
            return Err(Error::InvalidQuery(format!(
                "query point ({}, {}) is not finite",
                point.x(),
                point.y()
            )));
        }

        let query = project(point.x(), point.y(), self.lon_scale);
        let mut candidates = self.tree.nearest_neighbor_iter(&query);
        let first = candidates.next().ok_or(Error::EmptyGraph)?;

        // Projecting absolute longitudes rounds equidistant nodes apart, so
        // the tree only proposes candidates and the final ranking is done on
        // the scaled coordinate difference.
        let cutoff = distance_2(first.geom(), &query) * (1.0 + TIE_TOLERANCE) + f64::MIN_POSITIVE;
        let mut best = first.data;
        let mut best_distance = self.scaled_distance_2(&best, point);

        // Candidates arrive in non-decreasing projected distance order.
        for candidate in candidates {
            if distance_2(candidate.geom(), &query) > cutoff {
                break;
            }
            let distance = self.scaled_distance_2(&candidate.data, point);
            let closer = distance < best_distance;
            let tied_lower_id = distance == best_distance && candidate.data.id < best.id;
            if closer || tied_lower_id {
                best = candidate.data;
                best_distance = distance;
            }
        }

        trace!("Snapped ({}, {}) to node {}", point.x(), point.y(), best.id);
        Ok(best)
    }

    fn scaled_distance_2(&self, node: &Node, point: Point<f64>) -> f64 {
        let dx = (node.lon - point.x()) * self.lon_scale;
        let dy = node.lat - point.y();
        dx * dx + dy * dy
    }
}

const TIE_TOLERANCE: f64 = 1e-6;

fn project(lon: f64, lat: f64, lon_scale: f64) -> [f64; 2] {
    [lon * lon_scale, lat]
}

fn distance_2(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}
