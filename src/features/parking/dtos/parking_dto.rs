use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::parking::models::{Coordinate, SpotStatus};
use crate::features::parking::services::{
    DetectionOutcome, LotSearch, LotSort, RankedLot, RankedSpot, SpotSearch, StatusChange,
};
use crate::shared::constants::{
    DEFAULT_LOT_MAX_RESULTS, DEFAULT_LOT_RADIUS_KM, DEFAULT_SPOT_MAX_RESULTS,
    DEFAULT_SPOT_RADIUS_KM,
};

// =============================================================================
// QUERY PARAMS
// =============================================================================

/// Query params for the nearby lots search.
///
/// Values stay raw strings until [`NearbyLotsQuery::into_search`] parses them.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbyLotsQuery {
    /// Latitude of the user, decimal degrees
    #[param(value_type = f64)]
    pub lat: Option<String>,
    /// Longitude of the user, decimal degrees
    #[param(value_type = f64)]
    pub lon: Option<String>,
    /// Search radius in kilometers (default: 10)
    #[param(value_type = Option<f64>)]
    pub radius: Option<String>,
    /// Maximum number of lots (default: 20)
    #[param(value_type = Option<u32>)]
    pub max_results: Option<String>,
    /// `distance` (default) or `availability`
    #[param(value_type = Option<String>)]
    pub sort: Option<String>,
}

impl NearbyLotsQuery {
    pub fn into_search(self) -> Result<LotSearch> {
        let center = parse_center(self.lat, self.lon)?;
        let sort = match present(self.sort) {
            None => LotSort::default(),
            Some(value) => value.parse()?,
        };

        Ok(LotSearch {
            center,
            radius_km: parse_radius(self.radius, DEFAULT_LOT_RADIUS_KM)?,
            max_results: parse_max_results(self.max_results, DEFAULT_LOT_MAX_RESULTS)?,
            sort,
        })
    }
}

/// Query params for spot searches and recommendations
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbySpotsQuery {
    /// Latitude of the user, decimal degrees
    #[param(value_type = f64)]
    pub lat: Option<String>,
    /// Longitude of the user, decimal degrees
    #[param(value_type = f64)]
    pub lon: Option<String>,
    /// Search radius in kilometers (default: 5)
    #[param(value_type = Option<f64>)]
    pub radius: Option<String>,
    /// Maximum number of spots (default: 50)
    #[param(value_type = Option<u32>)]
    pub max_results: Option<String>,
}

impl NearbySpotsQuery {
    pub fn into_search(self) -> Result<SpotSearch> {
        Ok(SpotSearch {
            center: parse_center(self.lat, self.lon)?,
            radius_km: parse_radius(self.radius, DEFAULT_SPOT_RADIUS_KM)?,
            max_results: parse_max_results(self.max_results, DEFAULT_SPOT_MAX_RESULTS)?,
        })
    }
}

impl FromStr for LotSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "distance" => Ok(LotSort::Distance),
            "availability" => Ok(LotSort::Availability),
            _ => Err(AppError::BadRequest(format!(
                "Invalid sort '{}', expected 'distance' or 'availability'",
                s
            ))),
        }
    }
}

/// Treat empty query values the same as absent ones
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_center(lat: Option<String>, lon: Option<String>) -> Result<Coordinate> {
    let (Some(lat), Some(lon)) = (present(lat), present(lon)) else {
        return Err(AppError::Validation("Coordinates required".to_string()));
    };

    let (Ok(latitude), Ok(longitude)) = (lat.parse::<f64>(), lon.parse::<f64>()) else {
        return Err(AppError::Validation("Invalid coordinates".to_string()));
    };

    Coordinate::new(latitude, longitude)
}

fn parse_radius(value: Option<String>, default: f64) -> Result<f64> {
    let Some(value) = present(value) else {
        return Ok(default);
    };

    match value.parse::<f64>() {
        Ok(radius) if radius.is_finite() => Ok(radius),
        _ => Err(AppError::BadRequest(format!("Invalid radius '{}'", value))),
    }
}

fn parse_max_results(value: Option<String>, default: usize) -> Result<usize> {
    let Some(value) = present(value) else {
        return Ok(default);
    };

    value
        .parse::<usize>()
        .map_err(|_| AppError::BadRequest(format!("Invalid max_results '{}'", value)))
}

// =============================================================================
// SEARCH RESPONSES
// =============================================================================

/// Lot entry in a nearby search
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParkingLotResponseDto {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_capacity: i32,
    pub is_verified: bool,
    /// Null unless sorted by availability
    pub available_spots: Option<i64>,
    pub distance_km: f64,
}

impl From<RankedLot> for ParkingLotResponseDto {
    fn from(r: RankedLot) -> Self {
        Self {
            id: r.lot.id,
            name: r.lot.name,
            address: r.lot.address,
            city: r.lot.city,
            latitude: r.lot.latitude,
            longitude: r.lot.longitude,
            total_capacity: r.lot.total_capacity,
            is_verified: r.lot.is_verified,
            available_spots: r.available_spots,
            distance_km: r.distance_km,
        }
    }
}

/// Spot entry in a nearby search or recommendation list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParkingSpotResponseDto {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub lot_name: String,
    pub spot_number: String,
    pub status: SpotStatus,
    pub is_reserved: bool,
    #[schema(value_type = String, example = "2.50")]
    pub hourly_rate: Decimal,
    /// Own coordinate, or the lot's when the spot has none
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Null when neither the spot nor its lot has a coordinate
    pub distance_km: Option<f64>,
}

impl From<RankedSpot> for ParkingSpotResponseDto {
    fn from(r: RankedSpot) -> Self {
        Self {
            id: r.spot.id,
            lot_id: r.spot.lot_id,
            lot_name: r.lot_name,
            spot_number: r.spot.spot_number,
            status: r.spot.status,
            is_reserved: r.spot.is_reserved,
            hourly_rate: r.spot.hourly_rate,
            latitude: r.coordinate.map(|c| c.latitude),
            longitude: r.coordinate.map(|c| c.longitude),
            distance_km: r.distance_km,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NearbyLotsResponseDto {
    pub user_location: Coordinate,
    pub search_radius_km: f64,
    pub nearby_parking_lots: Vec<ParkingLotResponseDto>,
}

impl NearbyLotsResponseDto {
    pub fn new(search: &LotSearch, lots: Vec<RankedLot>) -> Self {
        Self {
            user_location: search.center,
            search_radius_km: search.radius_km,
            nearby_parking_lots: lots.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NearbySpotsResponseDto {
    pub user_location: Coordinate,
    pub search_radius_km: f64,
    pub available_spots: Vec<ParkingSpotResponseDto>,
}

impl NearbySpotsResponseDto {
    pub fn new(search: &SpotSearch, spots: Vec<RankedSpot>) -> Self {
        Self {
            user_location: search.center,
            search_radius_km: search.radius_km,
            available_spots: spots.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationsResponseDto {
    pub user_location: Coordinate,
    pub recommended_spots: Vec<ParkingSpotResponseDto>,
}

impl RecommendationsResponseDto {
    pub fn new(search: &SpotSearch, spots: Vec<RankedSpot>) -> Self {
        Self {
            user_location: search.center,
            recommended_spots: spots.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// OCCUPANCY
// =============================================================================

/// Manual status change; `reserved` is not accepted
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSpotStatusDto {
    pub status: SpotStatus,
}

/// Classifier output for one spot
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DetectionRequestDto {
    pub is_occupied: bool,
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be between 0 and 1"))]
    #[schema(minimum = 0.0, maximum = 1.0)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpotStatusChangeDto {
    pub spot_id: Uuid,
    pub previous_status: SpotStatus,
    pub updated_status: SpotStatus,
    pub status_changed: bool,
}

impl From<StatusChange> for SpotStatusChangeDto {
    fn from(c: StatusChange) -> Self {
        Self {
            status_changed: c.changed(),
            spot_id: c.spot.id,
            previous_status: c.previous_status,
            updated_status: c.spot.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectionResponseDto {
    pub detection_id: Uuid,
    pub is_occupied: bool,
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
    #[serde(flatten)]
    pub status: SpotStatusChangeDto,
}

impl From<DetectionOutcome> for DetectionResponseDto {
    fn from(o: DetectionOutcome) -> Self {
        Self {
            detection_id: o.detection.id,
            is_occupied: o.detection.is_occupied,
            confidence: o.detection.confidence,
            detected_at: o.detection.detected_at,
            status: o.change.into(),
        }
    }
}
