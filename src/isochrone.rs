use geo::{Coord, LineString, Point, Polygon};
use geojson::{Feature, JsonObject};
use log::{debug, warn};

use crate::config::{IsochroneConfig, TransportMode};
use crate::error::{Error, Result};
use crate::graph::{NodeId, RoadGraph};
use crate::hull::convex_hull;
use crate::reachability::{reachable_within, validate_budget, ReachableSet};
use crate::spatial_index::SpatialIndex;
use crate::utils;

/// One isochrone request: where, how fast (m/min) and for how long (min).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pub point: Point<f64>,
    pub speed: f64,
    pub time_budget: f64,
}

impl Query {
    pub fn new(point: Point<f64>, speed: f64, time_budget: f64) -> Self {
        Self {
            point,
            speed,
            time_budget,
        }
    }

    /// Query at the configured speed of `mode` and the configured default
    /// time budget.
    pub fn for_mode(point: Point<f64>, mode: TransportMode, config: &IsochroneConfig) -> Self {
        Self::new(point, config.meters_per_minute(mode), config.time_budget)
    }

    pub fn validate(&self) -> Result<()> {
        validate_speed(self.speed)?;
        validate_budget(self.time_budget)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill_color: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill_color: "orange".to_string(),
        }
    }
}

impl From<&IsochroneConfig> for Style {
    fn from(config: &IsochroneConfig) -> Self {
        Self {
            fill_color: config.fill_color.clone(),
        }
    }
}

/// Convex area reachable for one query.
///
/// `vertices` run counter-clockwise in (lon, lat) and are not closed. A
/// query that reaches a single location gives one vertex, one that reaches
/// only collinear locations gives two.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochronePolygon {
    pub vertices: Vec<Coord<f64>>,
    pub style: Style,
    pub source: NodeId,
    pub speed: f64,
    pub time_budget: f64,
}

impl IsochronePolygon {
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Closed exterior ring, padded to four positions when degenerate.
    pub fn exterior(&self) -> Vec<Coord<f64>> {
        utils::closed_ring(&self.vertices)
    }

    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.exterior()), vec![])
    }

    pub fn properties(&self) -> JsonObject {
        let mut properties = JsonObject::new();
        properties.insert("fillColor".to_string(), self.style.fill_color.clone().into());
        properties.insert("timeBudget".to_string(), self.time_budget.into());
        properties.insert("speed".to_string(), self.speed.into());
        properties.insert("sourceNode".to_string(), self.source.into());
        properties
    }

    pub fn to_feature(&self) -> Feature {
        utils::polygon_to_feature(&self.to_geo_polygon(), self.properties())
    }

    pub fn to_geojson_string(&self) -> String {
        utils::polygon_to_geojson_string(&self.to_geo_polygon(), self.properties())
    }
}

/// Holds a road graph together with its spatial index and answers
/// isochrone queries against it.
///
/// Queries reweight the graph in place, so `compute` takes `&mut self`;
/// two queries on one engine can never interleave.
pub struct IsochroneEngine {
    graph: RoadGraph,
    index: SpatialIndex,
    style: Style,
}

impl IsochroneEngine {
    pub fn new(graph: RoadGraph) -> Self {
        let index = SpatialIndex::new(&graph);
        Self {
            graph,
            index,
            style: Style::default(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn compute(&mut self, query: &Query) -> Result<IsochronePolygon> {
        query.validate()?;
        run_query(&mut self.graph, &self.index, query, &self.style)
    }

    /// One polygon per budget, in the order given, from a single search at
    /// the largest budget.
    pub fn compute_bands(
        &mut self,
        point: Point<f64>,
        speed: f64,
        time_budgets: &[f64],
    ) -> Result<Vec<IsochronePolygon>> {
        validate_speed(speed)?;
        for &budget in time_budgets {
            validate_budget(budget)?;
        }
        let Some(max_budget) = time_budgets.iter().copied().reduce(f64::max) else {
            return Ok(Vec::new());
        };

        let source = self.index.nearest(point)?;
        self.graph.reweight(speed)?;
        let reached = reachable_within(&self.graph, source, max_budget)?;

        time_budgets
            .iter()
            .map(|&budget| -> Result<IsochronePolygon> {
                let band = reached.within(budget)?;
                Ok(emit(&self.graph, &band, speed, &self.style))
            })
            .collect()
    }
}

/// Computes the isochrone of a single query against `graph`.
///
/// Builds a throwaway spatial index; callers issuing many queries against
/// one graph should keep an [`IsochroneEngine`] instead.
pub fn compute_isochrone(
    graph: &mut RoadGraph,
    click_point: Point<f64>,
    speed: f64,
    time_budget: f64,
) -> Result<IsochronePolygon> {
    let query = Query::new(click_point, speed, time_budget);
    query.validate()?;
    let index = SpatialIndex::new(graph);
    run_query(graph, &index, &query, &Style::default())
}

fn run_query(
    graph: &mut RoadGraph,
    index: &SpatialIndex,
    query: &Query,
    style: &Style,
) -> Result<IsochronePolygon> {
    let (source, snap_distance) = index.nearest_with_distance(query.point)?;
    debug!(
        "Query ({}, {}) snapped to node {} at {:.1} m",
        query.point.x(),
        query.point.y(),
        source,
        snap_distance
    );

    graph.reweight(query.speed)?;
    let isolated = graph
        .node_index(source)
        .is_some_and(|index| graph.edges(index).next().is_none());
    if isolated {
        warn!("Source node {source} has no outgoing edges");
    }

    let reached = reachable_within(graph, source, query.time_budget)?;
    Ok(emit(graph, &reached, query.speed, style))
}

fn emit(graph: &RoadGraph, reached: &ReachableSet, speed: f64, style: &Style) -> IsochronePolygon {
    let points = reached
        .node_ids()
        .filter_map(|id| graph.node_by_id(id).map(|node| (id, node.coord())));
    let vertices = convex_hull(points);

    debug!(
        "Isochrone of {} min around node {}: {} nodes, {} hull vertices",
        reached.time_budget(),
        reached.source(),
        reached.len(),
        vertices.len()
    );

    IsochronePolygon {
        vertices,
        style: style.clone(),
        source: reached.source(),
        speed,
        time_budget: reached.time_budget(),
    }
}

fn validate_speed(speed: f64) -> Result<()> {
    if speed.is_nan() || speed.is_infinite() || speed <= 0.0 {
        return Err(Error::InvalidQuery(format!("speed must be positive, got {speed}")));
    }
    Ok(())
}
