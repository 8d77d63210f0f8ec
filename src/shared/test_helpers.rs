use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::parking::geo::BoundingBox;
use crate::features::parking::models::{
    DetectionResult, LotFilter, ParkingLot, ParkingSpot, SpotDetection, SpotFilter, SpotStatus,
};
use crate::features::parking::services::ParkingStore;

pub fn lot_id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// Verified, active lot at `position` (latitude, longitude)
pub fn lot_at(n: u128, position: Option<(f64, f64)>) -> ParkingLot {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    ParkingLot {
        id: lot_id(n),
        provider_id: None,
        name: format!("Lot {}", n),
        address: Some(format!("{} Main Street", n)),
        city: Some("Springfield".to_string()),
        latitude: position.map(|(lat, _)| lat),
        longitude: position.map(|(_, lon)| lon),
        is_verified: true,
        is_active: true,
        total_capacity: 50,
        created_at,
        updated_at: created_at,
    }
}

/// Available, unreserved spot of `lot` without its own coordinate
pub fn spot_in(lot: &ParkingLot, n: u128) -> ParkingSpot {
    ParkingSpot {
        id: Uuid::from_u128((lot.id.as_u128() << 16) | n),
        lot_id: lot.id,
        spot_number: format!("A{:02}", n),
        latitude: None,
        longitude: None,
        status: SpotStatus::Available,
        is_reserved: false,
        hourly_rate: Decimal::new(250, 2),
        created_at: lot.created_at,
        updated_at: lot.updated_at,
    }
}

/// [`ParkingStore`] over plain vectors
#[derive(Default)]
pub struct InMemoryParkingStore {
    lots: Mutex<Vec<ParkingLot>>,
    spots: Mutex<Vec<ParkingSpot>>,
    detections: Mutex<Vec<SpotDetection>>,
    lot_queries: AtomicUsize,
}

impl InMemoryParkingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lot(self, lot: ParkingLot) -> Self {
        self.lots.lock().unwrap().push(lot);
        self
    }

    pub fn with_spot(self, spot: ParkingSpot) -> Self {
        self.spots.lock().unwrap().push(spot);
        self
    }

    /// Number of bounding-box lookups served
    pub fn lot_queries(&self) -> usize {
        self.lot_queries.load(Ordering::SeqCst)
    }

    pub fn detections(&self) -> Vec<SpotDetection> {
        self.detections.lock().unwrap().clone()
    }
}

#[async_trait]
impl ParkingStore for InMemoryParkingStore {
    async fn find_lots_in_box(
        &self,
        filter: &LotFilter,
        bbox: &BoundingBox,
    ) -> Result<Vec<ParkingLot>> {
        self.lot_queries.fetch_add(1, Ordering::SeqCst);

        let mut lots: Vec<ParkingLot> = self
            .lots
            .lock()
            .unwrap()
            .iter()
            .filter(|lot| filter.matches(lot))
            .filter(|lot| lot.coordinate().is_some_and(|c| bbox.contains(c)))
            .cloned()
            .collect();
        lots.sort_by_key(|lot| lot.id);
        Ok(lots)
    }

    async fn find_spots_by_lots(
        &self,
        lot_ids: &[Uuid],
        filter: &SpotFilter,
    ) -> Result<Vec<ParkingSpot>> {
        let mut spots: Vec<ParkingSpot> = self
            .spots
            .lock()
            .unwrap()
            .iter()
            .filter(|spot| lot_ids.contains(&spot.lot_id) && filter.matches(spot))
            .cloned()
            .collect();
        spots.sort_by(|a, b| {
            a.lot_id
                .cmp(&b.lot_id)
                .then_with(|| a.spot_number.cmp(&b.spot_number))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(spots)
    }

    async fn count_spots_by_lots(
        &self,
        lot_ids: &[Uuid],
        filter: &SpotFilter,
    ) -> Result<HashMap<Uuid, i64>> {
        let mut counts = HashMap::new();
        for spot in self.spots.lock().unwrap().iter() {
            if lot_ids.contains(&spot.lot_id) && filter.matches(spot) {
                *counts.entry(spot.lot_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn get_spot(&self, id: Uuid) -> Result<ParkingSpot> {
        self.spots
            .lock()
            .unwrap()
            .iter()
            .find(|spot| spot.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Parking spot {} not found", id)))
    }

    async fn update_spot_status(&self, id: Uuid, status: SpotStatus) -> Result<ParkingSpot> {
        let mut spots = self.spots.lock().unwrap();
        let spot = spots
            .iter_mut()
            .find(|spot| spot.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Parking spot {} not found", id)))?;
        spot.status = status;
        spot.updated_at = Utc::now();
        Ok(spot.clone())
    }

    async fn record_detection(
        &self,
        spot_id: Uuid,
        detection: &DetectionResult,
    ) -> Result<SpotDetection> {
        let recorded = SpotDetection {
            id: Uuid::now_v7(),
            spot_id,
            is_occupied: detection.is_occupied,
            confidence: detection.confidence,
            detected_at: Utc::now(),
        };
        self.detections.lock().unwrap().push(recorded.clone());
        Ok(recorded)
    }
}
