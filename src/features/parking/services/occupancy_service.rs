use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::parking::models::{DetectionResult, ParkingSpot, SpotDetection, SpotStatus};
use crate::features::parking::services::parking_store::ParkingStore;
use crate::features::parking::services::recommendation_cache::RecommendationCache;

/// Outcome of a status write
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub spot: ParkingSpot,
    pub previous_status: SpotStatus,
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        self.spot.status != self.previous_status
    }
}

/// Outcome of applying a classifier result
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub detection: SpotDetection,
    pub change: StatusChange,
}

/// Applies externally driven spot status changes and keeps cached rankings honest
pub struct OccupancyService {
    store: Arc<dyn ParkingStore>,
    cache: Arc<dyn RecommendationCache>,
    confidence_threshold: f64,
}

impl OccupancyService {
    pub fn new(
        store: Arc<dyn ParkingStore>,
        cache: Arc<dyn RecommendationCache>,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            store,
            cache,
            confidence_threshold,
        }
    }

    /// Manual status change by the lot operator.
    ///
    /// `reserved` is owned by the reservation flow and is rejected here.
    pub async fn update_status(&self, spot_id: Uuid, status: SpotStatus) -> Result<StatusChange> {
        if status == SpotStatus::Reserved {
            return Err(AppError::Validation(
                "Spots are reserved through reservations, not status updates".to_string(),
            ));
        }

        let spot = self.store.get_spot(spot_id).await?;
        self.transition(spot, status).await
    }

    /// Record a classifier result and flip available/occupied when it is confident enough
    pub async fn apply_detection(
        &self,
        spot_id: Uuid,
        detection: DetectionResult,
    ) -> Result<DetectionOutcome> {
        if !(0.0..=1.0).contains(&detection.confidence) {
            return Err(AppError::Validation(
                "Confidence must be between 0 and 1".to_string(),
            ));
        }

        let spot = self.store.get_spot(spot_id).await?;
        let recorded = self.store.record_detection(spot_id, &detection).await?;

        let target = resolve_status(spot.status, &detection, self.confidence_threshold);
        let change = self.transition(spot, target).await?;

        tracing::debug!(
            "Detection for spot {}: occupied={} confidence={:.2} -> {}",
            spot_id,
            detection.is_occupied,
            detection.confidence,
            change.spot.status
        );

        Ok(DetectionOutcome {
            detection: recorded,
            change,
        })
    }

    async fn transition(&self, spot: ParkingSpot, status: SpotStatus) -> Result<StatusChange> {
        let previous_status = spot.status;
        if previous_status == status {
            return Ok(StatusChange {
                spot,
                previous_status,
            });
        }

        let updated = self.store.update_spot_status(spot.id, status).await?;
        self.cache.invalidate_all().await;

        tracing::info!(
            "Spot {} status changed: {} -> {}",
            updated.id,
            previous_status,
            updated.status
        );

        Ok(StatusChange {
            spot: updated,
            previous_status,
        })
    }
}

/// Status a detection implies for a spot currently in `current`.
///
/// Only available <-> occupied flips happen, and only above `threshold`.
pub fn resolve_status(current: SpotStatus, detection: &DetectionResult, threshold: f64) -> SpotStatus {
    if detection.confidence <= threshold {
        return current;
    }

    match (current, detection.is_occupied) {
        (SpotStatus::Available, true) => SpotStatus::Occupied,
        (SpotStatus::Occupied, false) => SpotStatus::Available,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::features::parking::models::Coordinate;
    use crate::features::parking::services::recommendation_cache::{
        CacheKey, CachedRanking, SearchKind, TtlRecommendationCache,
    };
    use crate::shared::test_helpers::{lot_at, spot_in, InMemoryParkingStore};

    const THRESHOLD: f64 = 0.6;

    fn detection(is_occupied: bool, confidence: f64) -> DetectionResult {
        DetectionResult {
            is_occupied,
            confidence,
        }
    }

    #[test]
    fn test_resolve_status_flips_when_confident() {
        assert_eq!(
            resolve_status(SpotStatus::Available, &detection(true, 0.9), THRESHOLD),
            SpotStatus::Occupied
        );
        assert_eq!(
            resolve_status(SpotStatus::Occupied, &detection(false, 0.95), THRESHOLD),
            SpotStatus::Available
        );
    }

    #[test]
    fn test_resolve_status_ignores_low_confidence() {
        assert_eq!(
            resolve_status(SpotStatus::Available, &detection(true, 0.6), THRESHOLD),
            SpotStatus::Available
        );
        assert_eq!(
            resolve_status(SpotStatus::Occupied, &detection(false, 0.3), THRESHOLD),
            SpotStatus::Occupied
        );
    }

    #[test]
    fn test_resolve_status_leaves_other_states() {
        assert_eq!(
            resolve_status(SpotStatus::Reserved, &detection(false, 0.99), THRESHOLD),
            SpotStatus::Reserved
        );
        assert_eq!(
            resolve_status(SpotStatus::Maintenance, &detection(true, 0.99), THRESHOLD),
            SpotStatus::Maintenance
        );
    }

    fn setup() -> (
        Arc<InMemoryParkingStore>,
        Arc<TtlRecommendationCache>,
        OccupancyService,
        Uuid,
    ) {
        let lot = lot_at(1, Some((40.0, -75.0)));
        let spot = spot_in(&lot, 1);
        let spot_id = spot.id;
        let store = Arc::new(InMemoryParkingStore::new().with_lot(lot).with_spot(spot));
        let cache = Arc::new(TtlRecommendationCache::new(Duration::from_secs(60), 8));
        let service = OccupancyService::new(store.clone(), cache.clone(), THRESHOLD);
        (store, cache, service, spot_id)
    }

    #[tokio::test]
    async fn test_detection_is_recorded_and_applied() {
        let (store, _, service, spot_id) = setup();

        let outcome = service
            .apply_detection(spot_id, detection(true, 0.87))
            .await
            .unwrap();

        assert_eq!(outcome.change.previous_status, SpotStatus::Available);
        assert_eq!(outcome.change.spot.status, SpotStatus::Occupied);
        assert!(outcome.change.changed());
        assert_eq!(outcome.detection.spot_id, spot_id);
        assert_eq!(store.detections().len(), 1);
        assert_eq!(
            store.get_spot(spot_id).await.unwrap().status,
            SpotStatus::Occupied
        );
    }

    #[tokio::test]
    async fn test_low_confidence_detection_is_recorded_only() {
        let (store, _, service, spot_id) = setup();

        let outcome = service
            .apply_detection(spot_id, detection(true, 0.4))
            .await
            .unwrap();

        assert!(!outcome.change.changed());
        assert_eq!(store.detections().len(), 1);
    }

    #[tokio::test]
    async fn test_detection_rejects_bad_confidence() {
        let (_, _, service, spot_id) = setup();

        let result = service.apply_detection(spot_id, detection(true, 1.5)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_spot_is_not_found() {
        let (_, _, service, _) = setup();

        let result = service
            .update_status(Uuid::from_u128(999), SpotStatus::Occupied)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_manual_update_rejects_reserved() {
        let (_, _, service, spot_id) = setup();

        let result = service.update_status(spot_id, SpotStatus::Reserved).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_status_change_invalidates_cache() {
        let (_, cache, service, spot_id) = setup();
        let key = CacheKey::new(
            SearchKind::NearbySpots,
            Coordinate {
                latitude: 40.0,
                longitude: -75.0,
            },
            5.0,
            50,
        );
        cache.put(key, CachedRanking::Spots(vec![])).await;

        service
            .update_status(spot_id, SpotStatus::Maintenance)
            .await
            .unwrap();

        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_unchanged_status_keeps_cache() {
        let (_, cache, service, spot_id) = setup();
        let key = CacheKey::new(
            SearchKind::Recommendations,
            Coordinate {
                latitude: 40.0,
                longitude: -75.0,
            },
            5.0,
            50,
        );
        cache.put(key, CachedRanking::Spots(vec![])).await;

        let change = service
            .update_status(spot_id, SpotStatus::Available)
            .await
            .unwrap();

        assert!(!change.changed());
        assert!(cache.get(&key).await.is_some());
    }
}
