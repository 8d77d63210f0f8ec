use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Coordinate;

/// Database model for a provider-owned parking lot
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: Uuid,
    pub provider_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_verified: bool,
    pub is_active: bool,
    pub total_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParkingLot {
    /// Stored location, if both components have been filled in
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }

    /// Only verified, active lots are shown to drivers
    pub fn is_eligible(&self) -> bool {
        self.is_verified && self.is_active
    }
}

/// Flag filter applied to lots before any geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotFilter {
    pub verified: bool,
    pub active: bool,
}

impl LotFilter {
    pub fn eligible() -> Self {
        Self {
            verified: true,
            active: true,
        }
    }

    pub fn matches(&self, lot: &ParkingLot) -> bool {
        lot.is_verified == self.verified && lot.is_active == self.active
    }
}
