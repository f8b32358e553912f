// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distance and route export helpers.

use crate::models::GeoFix;
use geo::{LineString, Point};
use geojson::{Feature, Geometry, JsonObject};

/// Mean Earth radius used for all distances (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Polyline precision (standard Google encoded polyline).
const POLYLINE_PRECISION: u32 = 5;

/// Haversine distance between two fixes in kilometers.
///
/// Not guarded against NaN; fixes are validated at intake.
pub fn haversine_km(a: &GeoFix, b: &GeoFix) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Sum of distances between consecutive fixes.
pub fn route_distance_km(fixes: &[GeoFix]) -> f64 {
    fixes.windows(2).map(|w| haversine_km(&w[0], &w[1])).sum()
}

/// Convert a route to a `geo` line string (x = longitude).
pub fn route_line(fixes: &[GeoFix]) -> LineString<f64> {
    fixes.iter().map(GeoFix::coord).collect()
}

/// Encode a route as a precision-5 polyline.
pub fn encode_route(fixes: &[GeoFix]) -> Result<String, RouteExportError> {
    polyline::encode_coordinates(route_line(fixes), POLYLINE_PRECISION)
        .map_err(|e| RouteExportError::Polyline(e.to_string()))
}

/// GeoJSON feature for map display: a `LineString`, or a `Point` when the
/// route holds a single fix.
pub fn route_feature(
    activity_id: u64,
    fixes: &[GeoFix],
    distance_km: f64,
) -> Result<Feature, RouteExportError> {
    let value = match fixes {
        [] => return Err(RouteExportError::Empty),
        [only] => geojson::Value::from(&Point::from(only.coord())),
        _ => geojson::Value::from(&route_line(fixes)),
    };
    let geometry = Geometry::new(value);

    let mut properties = JsonObject::new();
    properties.insert("activity_id".to_string(), activity_id.into());
    properties.insert("distance_km".to_string(), distance_km.into());
    properties.insert("points".to_string(), fixes.len().into());

    Ok(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Errors from route export.
#[derive(Debug, thiserror::Error)]
pub enum RouteExportError {
    #[error("Route has no points")]
    Empty,

    #[error("Failed to encode polyline: {0}")]
    Polyline(String),
}
