use geo::Point;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::{
    Error, IsochroneConfig, IsochroneEngine, Query, RawEdge, RawNode, RoadGraph, Style,
    TransportMode,
};

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn build_engine(
    nodes: Vec<(i64, f64, f64)>,
    edges: Vec<(i64, i64, f64)>,
    bidirectional: bool,
    config: &IsochroneConfig,
) -> Result<IsochroneEngine, Error> {
    let nodes = nodes
        .into_iter()
        .map(|(id, x, y)| RawNode { id, x, y })
        .collect();
    let edges = edges
        .into_iter()
        .map(|(from, to, length)| RawEdge {
            from,
            to,
            length: Some(length),
        })
        .collect();

    let graph = if bidirectional {
        RoadGraph::build_bidirectional(nodes, edges)?
    } else {
        RoadGraph::build_from(nodes, edges)?
    };
    Ok(IsochroneEngine::new(graph).with_style(Style::from(config)))
}

/// Calculates an isochrone around a point, returned as a GeoJSON feature
#[pyfunction]
#[pyo3(signature = (nodes, edges, lon, lat, network_type, time_limit=None, bidirectional=true))]
fn calc_isochrone(
    nodes: Vec<(i64, f64, f64)>,
    edges: Vec<(i64, i64, f64)>,
    lon: f64,
    lat: f64,
    network_type: String,
    time_limit: Option<f64>,
    bidirectional: bool,
) -> PyResult<String> {
    let config = IsochroneConfig::default();
    let mode: TransportMode = network_type.parse()?;

    let mut engine = build_engine(nodes, edges, bidirectional, &config)?;
    let mut query = Query::for_mode(Point::new(lon, lat), mode, &config);
    if let Some(time_limit) = time_limit {
        query.time_budget = time_limit;
    }

    let isochrone = engine.compute(&query)?;
    Ok(isochrone.to_geojson_string())
}

/// Calculates one isochrone per time limit from a single search
#[pyfunction]
#[pyo3(signature = (nodes, edges, lon, lat, network_type, time_limits, bidirectional=true))]
fn calc_isochrones(
    nodes: Vec<(i64, f64, f64)>,
    edges: Vec<(i64, i64, f64)>,
    lon: f64,
    lat: f64,
    network_type: String,
    time_limits: Vec<f64>,
    bidirectional: bool,
) -> PyResult<Vec<String>> {
    let config = IsochroneConfig::default();
    let mode: TransportMode = network_type.parse()?;

    let mut engine = build_engine(nodes, edges, bidirectional, &config)?;
    let isochrones = engine.compute_bands(
        Point::new(lon, lat),
        config.meters_per_minute(mode),
        &time_limits,
    )?;

    Ok(isochrones
        .iter()
        .map(|isochrone| isochrone.to_geojson_string())
        .collect())
}

/// Python module for quickly creating isochrones
#[pymodule]
#[pyo3(name = "isochrone_engine")]
fn py_module(_py: Python, m: &PyModule) -> PyResult<()> {
    pyo3_log::init();
    m.add_function(wrap_pyfunction!(calc_isochrone, m)?)?;
    m.add_function(wrap_pyfunction!(calc_isochrones, m)?)?;
    Ok(())
}
