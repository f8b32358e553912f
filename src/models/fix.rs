// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location fix model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single timestamped latitude/longitude sample from a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeoFix {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// When the provider produced the fix
    pub timestamp: DateTime<Utc>,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    /// True if both coordinates are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Convert to a `geo` coordinate (x = longitude, y = latitude).
    pub fn coord(&self) -> geo::Coord<f64> {
        geo::coord! { x: self.longitude, y: self.latitude }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_fix() {
        let now = Utc::now();
        assert!(GeoFix::new(37.3861, -122.0839, now).is_valid());
        assert!(GeoFix::new(-90.0, 180.0, now).is_valid());
    }

    #[test]
    fn test_invalid_fix() {
        let now = Utc::now();
        assert!(!GeoFix::new(91.0, 0.0, now).is_valid());
        assert!(!GeoFix::new(0.0, -180.5, now).is_valid());
        assert!(!GeoFix::new(f64::NAN, 0.0, now).is_valid());
        assert!(!GeoFix::new(0.0, f64::INFINITY, now).is_valid());
    }

    #[test]
    fn test_coord_axis_order() {
        let fix = GeoFix::new(10.0, 20.0, Utc::now());
        let c = fix.coord();
        assert_eq!(c.x, 20.0);
        assert_eq!(c.y, 10.0);
    }
}
