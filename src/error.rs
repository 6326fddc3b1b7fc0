use thiserror::Error;

use crate::graph::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Graph construction error: {0}")]
    GraphConstruction(String),
    #[error("Invalid speed {0} m/min, speed must be positive")]
    InvalidSpeed(f64),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Graph has no nodes")]
    EmptyGraph,
    #[error("Source node {0} is not part of the graph")]
    UnknownSourceNode(NodeId),
    #[error("Graph has not been weighted for a travel speed")]
    Unweighted,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
