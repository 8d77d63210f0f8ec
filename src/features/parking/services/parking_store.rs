use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::parking::geo::BoundingBox;
use crate::features::parking::models::{
    DetectionResult, LotFilter, ParkingLot, ParkingSpot, SpotDetection, SpotFilter, SpotStatus,
};

/// Read/write access to lots and spots, independent of the storage engine
#[async_trait]
pub trait ParkingStore: Send + Sync {
    /// Lots matching `filter` whose stored coordinate falls inside `bbox`.
    /// Lots without a coordinate are never returned.
    async fn find_lots_in_box(
        &self,
        filter: &LotFilter,
        bbox: &BoundingBox,
    ) -> Result<Vec<ParkingLot>>;

    /// Spots of the given lots matching `filter`
    async fn find_spots_by_lots(
        &self,
        lot_ids: &[Uuid],
        filter: &SpotFilter,
    ) -> Result<Vec<ParkingSpot>>;

    /// Number of spots matching `filter` per lot; lots with no match may be absent
    async fn count_spots_by_lots(
        &self,
        lot_ids: &[Uuid],
        filter: &SpotFilter,
    ) -> Result<HashMap<Uuid, i64>>;

    async fn get_spot(&self, id: Uuid) -> Result<ParkingSpot>;

    async fn update_spot_status(&self, id: Uuid, status: SpotStatus) -> Result<ParkingSpot>;

    async fn record_detection(
        &self,
        spot_id: Uuid,
        detection: &DetectionResult,
    ) -> Result<SpotDetection>;
}

/// PostgreSQL-backed [`ParkingStore`]
pub struct PgParkingStore {
    pool: PgPool,
}

impl PgParkingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LOT_COLUMNS: &str = r#"
    id, provider_id, name, address, city, latitude, longitude,
    is_verified, is_active, total_capacity, created_at, updated_at
"#;

const SPOT_COLUMNS: &str = r#"
    id, lot_id, spot_number, latitude, longitude,
    status, is_reserved, hourly_rate, created_at, updated_at
"#;

#[async_trait]
impl ParkingStore for PgParkingStore {
    async fn find_lots_in_box(
        &self,
        filter: &LotFilter,
        bbox: &BoundingBox,
    ) -> Result<Vec<ParkingLot>> {
        let [primary, secondary] = bbox.longitude_ranges();

        let sql = format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM parking_lots
            WHERE is_verified = $1
            AND is_active = $2
            AND latitude IS NOT NULL
            AND longitude IS NOT NULL
            AND latitude BETWEEN $3 AND $4
            AND (longitude BETWEEN $5 AND $6 OR longitude BETWEEN $7 AND $8)
            ORDER BY id
            "#
        );

        sqlx::query_as::<_, ParkingLot>(&sql)
            .bind(filter.verified)
            .bind(filter.active)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(primary.0)
            .bind(primary.1)
            .bind(secondary.0)
            .bind(secondary.1)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find lots in bounding box: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_spots_by_lots(
        &self,
        lot_ids: &[Uuid],
        filter: &SpotFilter,
    ) -> Result<Vec<ParkingSpot>> {
        if lot_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {SPOT_COLUMNS}
            FROM parking_spots
            WHERE lot_id = ANY($1)
            AND ($2::spot_status IS NULL OR status = $2)
            AND ($3::boolean IS NULL OR is_reserved = $3)
            ORDER BY lot_id, spot_number, id
            "#
        );

        sqlx::query_as::<_, ParkingSpot>(&sql)
            .bind(lot_ids)
            .bind(filter.status)
            .bind(filter.reserved)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find spots for lots: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn count_spots_by_lots(
        &self,
        lot_ids: &[Uuid],
        filter: &SpotFilter,
    ) -> Result<HashMap<Uuid, i64>> {
        if lot_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT lot_id, COUNT(*)
            FROM parking_spots
            WHERE lot_id = ANY($1)
            AND ($2::spot_status IS NULL OR status = $2)
            AND ($3::boolean IS NULL OR is_reserved = $3)
            GROUP BY lot_id
            "#,
        )
        .bind(lot_ids)
        .bind(filter.status)
        .bind(filter.reserved)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count spots for lots: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().collect())
    }

    async fn get_spot(&self, id: Uuid) -> Result<ParkingSpot> {
        let sql = format!("SELECT {SPOT_COLUMNS} FROM parking_spots WHERE id = $1");

        sqlx::query_as::<_, ParkingSpot>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get parking spot: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Parking spot {} not found", id)))
    }

    async fn update_spot_status(&self, id: Uuid, status: SpotStatus) -> Result<ParkingSpot> {
        let sql = format!(
            r#"
            UPDATE parking_spots
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {SPOT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ParkingSpot>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update parking spot status: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Parking spot {} not found", id)))
    }

    async fn record_detection(
        &self,
        spot_id: Uuid,
        detection: &DetectionResult,
    ) -> Result<SpotDetection> {
        sqlx::query_as::<_, SpotDetection>(
            r#"
            INSERT INTO spot_detections (id, spot_id, is_occupied, confidence)
            VALUES ($1, $2, $3, $4)
            RETURNING id, spot_id, is_occupied, confidence, detected_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(spot_id)
        .bind(detection.is_occupied)
        .bind(detection.confidence)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record spot detection: {:?}", e);
            AppError::Database(e)
        })
    }
}
