use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::features::parking::models::Coordinate;
use crate::features::parking::services::proximity_service::{LotSort, RankedLot, RankedSpot};

/// Which ranking a cached entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    NearbyLots(LotSort),
    NearbySpots,
    Recommendations,
}

/// Cache key: coordinate quantized to 4 decimals (~11 m), radius to whole
/// meters at or below the requested one.
///
/// Searches run at the key's own center and radius, so every request that
/// maps to a key gets the ranking computed for exactly that key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: SearchKind,
    pub lat_e4: i64,
    pub lon_e4: i64,
    pub radius_m: i64,
    pub max_results: usize,
}

impl CacheKey {
    pub fn new(kind: SearchKind, center: Coordinate, radius_km: f64, max_results: usize) -> Self {
        // Nearest meter, stepping down when that would widen the request
        let mut radius_m = (radius_km * 1_000.0).round() as i64;
        if radius_m as f64 / 1_000.0 > radius_km {
            radius_m = radius_m.saturating_sub(1);
        }

        Self {
            kind,
            lat_e4: (center.latitude * 10_000.0).round() as i64,
            lon_e4: (center.longitude * 10_000.0).round() as i64,
            radius_m,
            max_results,
        }
    }

    /// Grid point the key stands for
    pub fn center(&self) -> Coordinate {
        Coordinate {
            latitude: self.lat_e4 as f64 / 10_000.0,
            longitude: self.lon_e4 as f64 / 10_000.0,
        }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_m as f64 / 1_000.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedRanking {
    Lots(Vec<RankedLot>),
    Spots(Vec<RankedSpot>),
}

/// Storage for ranked search results, injected into the proximity service
#[async_trait]
pub trait RecommendationCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<CachedRanking>;

    async fn put(&self, key: CacheKey, value: CachedRanking);

    /// Drop everything; called whenever spot availability changes
    async fn invalidate_all(&self);
}

/// Cache that never stores anything
pub struct NoopRecommendationCache;

#[async_trait]
impl RecommendationCache for NoopRecommendationCache {
    async fn get(&self, _key: &CacheKey) -> Option<CachedRanking> {
        None
    }

    async fn put(&self, _key: CacheKey, _value: CachedRanking) {}

    async fn invalidate_all(&self) {}
}

struct CacheEntry {
    value: CachedRanking,
    inserted_at: Instant,
}

/// In-process cache with a fixed time-to-live and entry cap
pub struct TtlRecommendationCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl TtlRecommendationCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl RecommendationCache for TtlRecommendationCache {
    async fn get(&self, key: &CacheKey) -> Option<CachedRanking> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    async fn put(&self, key: CacheKey, value: CachedRanking) {
        if self.max_entries == 0 {
            return;
        }

        let mut entries = self.entries.write().await;

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| *key);
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        tracing::debug!("Recommendation cache invalidated ({} entries)", dropped);
    }
}
