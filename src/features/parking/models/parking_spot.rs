use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Coordinate, ParkingLot};

/// Spot status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "spot_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl std::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpotStatus::Available => write!(f, "available"),
            SpotStatus::Occupied => write!(f, "occupied"),
            SpotStatus::Reserved => write!(f, "reserved"),
            SpotStatus::Maintenance => write!(f, "maintenance"),
        }
    }
}

/// Database model for a single parking spot
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub spot_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: SpotStatus,
    pub is_reserved: bool,
    pub hourly_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParkingSpot {
    /// The spot's own surveyed location, if any
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }

    /// Own coordinate, falling back to the parent lot's.
    ///
    /// `None` means the spot cannot be ranked by distance.
    pub fn effective_coordinate(&self, lot: &ParkingLot) -> Option<Coordinate> {
        debug_assert_eq!(self.lot_id, lot.id);
        self.coordinate().or_else(|| lot.coordinate())
    }

    pub fn is_available(&self) -> bool {
        self.status == SpotStatus::Available && !self.is_reserved
    }
}

/// Status/reservation filter applied when loading spots for a set of lots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpotFilter {
    pub status: Option<SpotStatus>,
    pub reserved: Option<bool>,
}

impl SpotFilter {
    /// Free to park right now
    pub fn available() -> Self {
        Self {
            status: Some(SpotStatus::Available),
            reserved: Some(false),
        }
    }

    pub fn matches(&self, spot: &ParkingSpot) -> bool {
        self.status.map_or(true, |status| spot.status == status)
            && self.reserved.map_or(true, |reserved| spot.is_reserved == reserved)
    }
}
