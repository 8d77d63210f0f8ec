//! Great-circle distance and the rectangular pre-filter used before it.
//!
//! Searches run in two phases: a cheap [`BoundingBox`] narrows the candidate
//! set (storage can answer it with plain range predicates), then
//! [`haversine_km`] decides actual membership.

use crate::features::parking::models::Coordinate;
use crate::shared::constants::{DEGREES_PER_KM, EARTH_RADIUS_KM};

/// Haversine distance in kilometers, unrounded
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Round to two decimals, the precision distances are reported with
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Reported distance between two optional points.
///
/// Returns `None` ("unknown") when either side has no coordinate.
pub fn distance_km(from: Option<Coordinate>, to: Option<Coordinate>) -> Option<f64> {
    match (from, to) {
        (Some(from), Some(to)) => Some(round_km(haversine_km(from, to))),
        _ => None,
    }
}

/// Latitude/longitude rectangle around a search point.
///
/// `min_lon`/`max_lon` are kept unwrapped and may fall outside [-180, 180]
/// when the box straddles the antimeridian; use [`Self::longitude_ranges`]
/// for storage predicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box of `radius_km` around `center` using 1° latitude ≈ 111 km and a
    /// longitude degree scaled by the cosine of the box's poleward edge.
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let lat_delta = radius_km.max(0.0) * DEGREES_PER_KM;
        let min_lat = (center.latitude - lat_delta).max(-90.0);
        let max_lat = (center.latitude + lat_delta).min(90.0);

        // The circle is widest poleward of its center, where degrees are shortest
        let edge_lat = min_lat.abs().max(max_lat.abs());
        let cos_edge = edge_lat.to_radians().cos();

        // Touching a pole means every longitude is in range
        let lon_delta = if cos_edge < f64::EPSILON {
            180.0
        } else {
            (lat_delta / cos_edge).min(180.0)
        };

        Self {
            min_lat,
            max_lat,
            min_lon: center.longitude - lon_delta,
            max_lon: center.longitude + lon_delta,
        }
    }

    /// Longitude span as up to two closed ranges inside [-180, 180].
    ///
    /// Both entries are identical unless the box crosses the antimeridian.
    pub fn longitude_ranges(&self) -> [(f64, f64); 2] {
        if self.max_lon - self.min_lon >= 360.0 {
            let full = (-180.0, 180.0);
            return [full, full];
        }

        if self.min_lon < -180.0 {
            [(self.min_lon + 360.0, 180.0), (-180.0, self.max_lon)]
        } else if self.max_lon > 180.0 {
            [(self.min_lon, 180.0), (-180.0, self.max_lon - 360.0)]
        } else {
            let range = (self.min_lon, self.max_lon);
            [range, range]
        }
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        if point.latitude < self.min_lat || point.latitude > self.max_lat {
            return false;
        }

        self.longitude_ranges()
            .iter()
            .any(|(min, max)| point.longitude >= *min && point.longitude <= *max)
    }
}
