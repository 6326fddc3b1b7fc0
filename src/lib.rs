//! Isochrones on road networks.
//!
//! A query snaps a point to the nearest graph node, weights the network for
//! a travel speed, collects every node reachable within a time budget and
//! wraps them in a convex polygon.
//!
//! ```no_run
//! use geo::Point;
//! use isochrone_engine::{IsochroneEngine, Query, RawEdge, RawNode, RoadGraph};
//!
//! let nodes = vec![
//!     RawNode { id: 1, x: 5.4785, y: 51.4398 },
//!     RawNode { id: 2, x: 5.4790, y: 51.4410 },
//! ];
//! let edges = vec![RawEdge { from: 1, to: 2, length: None }];
//! let graph = RoadGraph::build_bidirectional(nodes, edges)?;
//!
//! let mut engine = IsochroneEngine::new(graph);
//! let polygon = engine.compute(&Query::new(Point::new(5.4786, 51.4399), 75.0, 15.0))?;
//! println!("{}", polygon.to_geojson_string());
//! # Ok::<(), isochrone_engine::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod hull;
pub mod isochrone;
pub mod reachability;
pub mod spatial_index;
pub mod utils;

#[cfg(feature = "python")]
mod python;

pub use config::{IsochroneConfig, ModeSpeeds, TransportMode};
pub use error::{Error, Result};
pub use graph::{Edge, GraphSnapshot, Node, NodeId, RawEdge, RawNode, RoadGraph};
pub use hull::convex_hull;
pub use isochrone::{compute_isochrone, IsochroneEngine, IsochronePolygon, Query, Style};
pub use reachability::{reachable_within, ReachableSet};
pub use spatial_index::SpatialIndex;
