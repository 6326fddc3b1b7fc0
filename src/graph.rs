//! Road network model: an arena of nodes and directed edges with
//! speed-dependent traversal times.

use geo::{Coord, Point};
use log::{debug, info, warn};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::calculate_distance;

/// Opaque node identifier, OSM-style.
pub type NodeId = i64;

/// Node record as handed over by the graph source.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct RawNode {
    pub id: NodeId,
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
}

/// Edge record as handed over by the graph source.
///
/// `length` is in meters. When the source doesn't provide one it is
/// derived from the endpoint coordinates.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct RawEdge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub length: Option<f64>,
}

/// Serialized road network snapshot for one area and transport mode.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
    #[serde(default)]
    pub bidirectional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub lon: f64,
    pub lat: f64,
}

impl Node {
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Physical length in meters
    pub length: f64,
    /// Minutes needed to traverse the edge at the graph's current speed
    pub traversal_time: f64,
}

/// Weighted road graph.
///
/// Nodes and edges live in petgraph's dense arrays and reference each other
/// by index. Coordinates and lengths are fixed at construction; only
/// `traversal_time` changes, and only through [`RoadGraph::reweight`].
#[derive(Debug, Clone)]
pub struct RoadGraph {
    graph: DiGraph<Node, Edge>,
    node_index_map: HashMap<NodeId, NodeIndex>,
    speed: Option<f64>,
}

impl RoadGraph {
    /// Builds a directed graph with exactly the given edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphConstruction`] when a node id is duplicated,
    /// a coordinate is not finite, an edge references an unknown node or an
    /// edge length is negative or not finite.
    pub fn build_from(raw_nodes: Vec<RawNode>, raw_edges: Vec<RawEdge>) -> Result<Self> {
        create_graph(raw_nodes, raw_edges, false)
    }

    /// Like [`RoadGraph::build_from`], but every raw edge is traversable in
    /// both directions.
    pub fn build_bidirectional(raw_nodes: Vec<RawNode>, raw_edges: Vec<RawEdge>) -> Result<Self> {
        create_graph(raw_nodes, raw_edges, true)
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        create_graph(snapshot.nodes, snapshot.edges, snapshot.bidirectional)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Recomputes every edge's traversal time as `length / speed`.
    ///
    /// `speed` is in meters per minute. The speed is validated before any
    /// edge is touched, so a failed call leaves the graph as it was.
    pub fn reweight(&mut self, speed: f64) -> Result<()> {
        if speed.is_nan() || speed.is_infinite() || speed <= 0.0 {
            return Err(Error::InvalidSpeed(speed));
        }
        if self.speed == Some(speed) {
            return Ok(());
        }

        for edge in self.graph.edge_weights_mut() {
            edge.traversal_time = edge.length / speed;
        }
        self.speed = Some(speed);

        debug!("Reweighted {} edges for {:.2} m/min", self.graph.edge_count(), speed);
        Ok(())
    }

    /// Speed (m/min) the traversal times currently correspond to, `None`
    /// until the first successful reweight.
    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn is_weighted(&self) -> bool {
        self.speed.is_some()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_index_map.get(&id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.graph[index]
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.node_index(id).map(|index| &self.graph[index])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Outgoing edges of `index`, parallel edges included.
    pub fn edges(&self, index: NodeIndex) -> impl Iterator<Item = EdgeReference<'_, Edge>> {
        self.graph.edges(index)
    }

    /// Outgoing edges as `(target id, edge)` pairs.
    pub fn outgoing(&self, id: NodeId) -> Vec<(NodeId, Edge)> {
        self.node_index(id)
            .map(|index| {
                self.graph
                    .edges(index)
                    .map(|e| (self.graph[e.target()].id, *e.weight()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// Function to create the network graph
fn create_graph(
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
    bidirectional: bool,
) -> Result<RoadGraph> {
    let mut graph = DiGraph::<Node, Edge>::with_capacity(
        nodes.len(),
        if bidirectional {
            edges.len() * 2
        } else {
            edges.len()
        },
    );
    let mut node_index_map = HashMap::with_capacity(nodes.len());

    // Add nodes to the graph and keep track of their indices
    for raw in nodes {
        if !raw.x.is_finite() || !raw.y.is_finite() {
            return Err(Error::GraphConstruction(format!(
                "node {} has invalid coordinates ({}, {})",
                raw.id, raw.x, raw.y
            )));
        }
        if node_index_map.contains_key(&raw.id) {
            return Err(Error::GraphConstruction(format!("duplicate node id {}", raw.id)));
        }
        let node_index = graph.add_node(Node {
            id: raw.id,
            lon: raw.x,
            lat: raw.y,
        });
        node_index_map.insert(raw.id, node_index);
    }

    // Add edges to the graph
    for raw in edges {
        let lookup = |id: NodeId| {
            node_index_map.get(&id).copied().ok_or_else(|| {
                Error::GraphConstruction(format!(
                    "edge {} -> {} references unknown node {}",
                    raw.from, raw.to, id
                ))
            })
        };
        let start_index = lookup(raw.from)?;
        let end_index = lookup(raw.to)?;

        let length = match raw.length {
            Some(length) => length,
            None => edge_length(&graph[start_index], &graph[end_index]),
        };
        if !length.is_finite() || length < 0.0 {
            return Err(Error::GraphConstruction(format!(
                "edge {} -> {} has invalid length {}",
                raw.from, raw.to, length
            )));
        }
        if length == 0.0 && start_index != end_index {
            warn!("Edge {} -> {} has zero length", raw.from, raw.to);
        }

        let edge = Edge {
            length,
            traversal_time: 0.0,
        };
        graph.add_edge(start_index, end_index, edge);
        if bidirectional {
            graph.add_edge(end_index, start_index, edge);
        }
    }

    info!(
        "Built road graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(RoadGraph {
        graph,
        node_index_map,
        speed: None,
    })
}

fn edge_length(start: &Node, end: &Node) -> f64 {
    calculate_distance(start.lat, start.lon, end.lat, end.lon)
}
