use geo::{Coord, Polygon};
use geojson::{Feature, GeoJson, Geometry, JsonObject, Value};

pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let radius_earth = 6371000.0; // Radius of the Earth in meters

    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + (dlon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    let c = 2.0 * a.sqrt().asin();

    radius_earth * c // Distance in meters
}

pub fn kph_to_meters_per_minute(speed_kph: f64) -> f64 {
    speed_kph * 1000.0 / 60.0
}

/// Closes a vertex ring by repeating its first vertex.
///
/// GeoJSON linear rings need at least four positions, so degenerate hulls
/// (a single point or a segment) are padded with the closing vertex.
pub fn closed_ring(vertices: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let Some(&first) = vertices.first() else {
        return Vec::new();
    };

    let mut ring = vertices.to_vec();
    ring.push(first);
    while ring.len() < 4 {
        ring.push(first);
    }
    ring
}

pub fn polygon_to_feature(polygon: &Polygon<f64>, properties: JsonObject) -> Feature {
    let exterior_coords = polygon
        .exterior()
        .0
        .iter()
        .map(|coord| vec![coord.x, coord.y])
        .collect::<Vec<_>>();

    let geojson_polygon = Geometry::new(Value::Polygon(vec![exterior_coords]));

    Feature {
        bbox: None,
        geometry: Some(geojson_polygon),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn polygon_to_geojson(polygon: &Polygon<f64>, properties: JsonObject) -> GeoJson {
    GeoJson::Feature(polygon_to_feature(polygon, properties))
}

// Convert polygon to GeoJSON string
pub fn polygon_to_geojson_string(polygon: &Polygon<f64>, properties: JsonObject) -> String {
    let geojson = polygon_to_geojson(polygon, properties);
    geojson.to_string()
}
