use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::Result;
use crate::features::parking::geo::{self, BoundingBox};
use crate::features::parking::models::{Coordinate, LotFilter, ParkingLot, ParkingSpot, SpotFilter};
use crate::features::parking::services::parking_store::ParkingStore;
use crate::features::parking::services::recommendation_cache::{
    CacheKey, CachedRanking, RecommendationCache, SearchKind,
};
use crate::shared::constants::{RECOMMENDATION_LIMIT, SPOT_SEARCH_LOT_FACTOR};

/// Ordering applied to nearby lots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LotSort {
    /// Nearest first
    #[default]
    Distance,
    /// Most free spots first, then nearest
    Availability,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotSearch {
    pub center: Coordinate,
    pub radius_km: f64,
    pub max_results: usize,
    pub sort: LotSort,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotSearch {
    pub center: Coordinate,
    pub radius_km: f64,
    pub max_results: usize,
}

impl LotSearch {
    /// The search as it actually runs: center on the ~11 m cache grid,
    /// radius in whole meters no larger than requested
    pub fn resolved(&self) -> Self {
        self.resolve().0
    }

    fn resolve(&self) -> (Self, CacheKey) {
        let key = CacheKey::new(
            SearchKind::NearbyLots(self.sort),
            self.center,
            self.radius_km,
            self.max_results,
        );
        let search = Self {
            center: key.center(),
            radius_km: key.radius_km(),
            ..*self
        };
        (search, key)
    }
}

impl SpotSearch {
    /// See [`LotSearch::resolved`]
    pub fn resolved(&self) -> Self {
        self.resolve(SearchKind::NearbySpots).0
    }

    fn resolve(&self, kind: SearchKind) -> (Self, CacheKey) {
        let key = CacheKey::new(kind, self.center, self.radius_km, self.max_results);
        let search = Self {
            center: key.center(),
            radius_km: key.radius_km(),
            ..*self
        };
        (search, key)
    }
}

/// A lot inside the search radius
#[derive(Debug, Clone, PartialEq)]
pub struct RankedLot {
    pub lot: ParkingLot,
    /// Rounded to two decimals
    pub distance_km: f64,
    /// Filled in by availability-sorted searches
    pub available_spots: Option<i64>,
}

/// A bookable spot together with the lot data needed to present it
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSpot {
    pub spot: ParkingSpot,
    pub lot_name: String,
    pub lot_verified: bool,
    /// Own coordinate or the lot's
    pub coordinate: Option<Coordinate>,
    pub distance_km: Option<f64>,
}

impl RankedSpot {
    fn new(spot: ParkingSpot, lot: &ParkingLot, center: Coordinate) -> Self {
        let coordinate = spot.effective_coordinate(lot);
        Self {
            distance_km: geo::distance_km(Some(center), coordinate),
            coordinate,
            lot_name: lot.name.clone(),
            lot_verified: lot.is_verified,
            spot,
        }
    }
}

/// Locates and ranks lots and spots around a point
pub struct ProximityService {
    store: Arc<dyn ParkingStore>,
    cache: Arc<dyn RecommendationCache>,
}

impl ProximityService {
    pub fn new(store: Arc<dyn ParkingStore>, cache: Arc<dyn RecommendationCache>) -> Self {
        Self { store, cache }
    }

    /// Eligible lots within `radius_km`, ranked per `search.sort`.
    ///
    /// Distances are measured from [`LotSearch::resolved`].
    pub async fn nearby_lots(&self, search: &LotSearch) -> Result<Vec<RankedLot>> {
        let (search, key) = search.resolve();
        if let Some(CachedRanking::Lots(lots)) = self.cache.get(&key).await {
            tracing::debug!("Nearby lots served from cache");
            return Ok(lots);
        }

        let lots = self.rank_lots(&search).await?;
        self.cache.put(key, CachedRanking::Lots(lots.clone())).await;
        Ok(lots)
    }

    /// Available, unreserved spots of nearby lots, nearest lot first
    pub async fn nearby_available_spots(&self, search: &SpotSearch) -> Result<Vec<RankedSpot>> {
        let (search, key) = search.resolve(SearchKind::NearbySpots);
        if let Some(CachedRanking::Spots(spots)) = self.cache.get(&key).await {
            tracing::debug!("Nearby spots served from cache");
            return Ok(spots);
        }

        let spots = self.collect_available_spots(&search).await?;
        self.cache.put(key, CachedRanking::Spots(spots.clone())).await;
        Ok(spots)
    }

    /// The closest individual spots in verified lots, at most [`RECOMMENDATION_LIMIT`]
    pub async fn recommend_spots(&self, search: &SpotSearch) -> Result<Vec<RankedSpot>> {
        let (search, key) = search.resolve(SearchKind::Recommendations);
        if let Some(CachedRanking::Spots(spots)) = self.cache.get(&key).await {
            tracing::debug!("Recommendations served from cache");
            return Ok(spots);
        }

        let candidates = self.collect_available_spots(&search).await?;
        let spots = rank_spots_by_distance(candidates, RECOMMENDATION_LIMIT);

        self.cache.put(key, CachedRanking::Spots(spots.clone())).await;
        Ok(spots)
    }

    async fn rank_lots(&self, search: &LotSearch) -> Result<Vec<RankedLot>> {
        if search.radius_km.is_nan() || search.radius_km <= 0.0 || search.max_results == 0 {
            return Ok(Vec::new());
        }

        let bbox = BoundingBox::around(search.center, search.radius_km);
        let candidates = self
            .store
            .find_lots_in_box(&LotFilter::eligible(), &bbox)
            .await?;
        let candidate_count = candidates.len();

        let mut ranked = lots_within_radius(search.center, search.radius_km, candidates);

        match search.sort {
            LotSort::Distance => ranked.sort_by(compare_by_distance),
            LotSort::Availability => {
                let lot_ids: Vec<Uuid> = ranked.iter().map(|r| r.lot.id).collect();
                let counts = self
                    .store
                    .count_spots_by_lots(&lot_ids, &SpotFilter::available())
                    .await?;

                for entry in &mut ranked {
                    entry.available_spots = Some(counts.get(&entry.lot.id).copied().unwrap_or(0));
                }

                ranked.sort_by(|a, b| {
                    b.available_spots
                        .cmp(&a.available_spots)
                        .then_with(|| compare_by_distance(a, b))
                });
            }
        }

        ranked.truncate(search.max_results);

        tracing::debug!(
            "Lot search at ({}, {}) r={}km: {} candidates, {} ranked",
            search.center.latitude,
            search.center.longitude,
            search.radius_km,
            candidate_count,
            ranked.len()
        );

        Ok(ranked)
    }

    async fn collect_available_spots(&self, search: &SpotSearch) -> Result<Vec<RankedSpot>> {
        if search.max_results == 0 {
            return Ok(Vec::new());
        }

        let lots = self
            .rank_lots(&LotSearch {
                center: search.center,
                radius_km: search.radius_km,
                max_results: search.max_results.saturating_mul(SPOT_SEARCH_LOT_FACTOR),
                sort: LotSort::Distance,
            })
            .await?;
        if lots.is_empty() {
            return Ok(Vec::new());
        }

        let lot_ids: Vec<Uuid> = lots.iter().map(|r| r.lot.id).collect();
        let spots = self
            .store
            .find_spots_by_lots(&lot_ids, &SpotFilter::available())
            .await?;

        let mut by_lot: HashMap<Uuid, Vec<ParkingSpot>> = HashMap::new();
        for spot in spots.into_iter().filter(ParkingSpot::is_available) {
            by_lot.entry(spot.lot_id).or_default().push(spot);
        }

        let mut result = Vec::new();
        'lots: for ranked in &lots {
            let Some(mut spots) = by_lot.remove(&ranked.lot.id) else {
                continue;
            };
            spots.sort_by(|a, b| {
                a.spot_number
                    .cmp(&b.spot_number)
                    .then_with(|| a.id.cmp(&b.id))
            });

            for spot in spots {
                if result.len() >= search.max_results {
                    break 'lots;
                }
                result.push(RankedSpot::new(spot, &ranked.lot, search.center));
            }
        }

        Ok(result)
    }
}

/// Exact-distance pass over bounding-box candidates.
///
/// Membership uses the unrounded distance; ineligible or unlocated lots are skipped.
fn lots_within_radius(
    center: Coordinate,
    radius_km: f64,
    candidates: Vec<ParkingLot>,
) -> Vec<RankedLot> {
    candidates
        .into_iter()
        .filter(ParkingLot::is_eligible)
        .filter_map(|lot| {
            let Some(coordinate) = lot.coordinate() else {
                tracing::debug!("Skipping lot {} without coordinates", lot.id);
                return None;
            };

            let exact = geo::haversine_km(center, coordinate);
            (exact <= radius_km).then(|| RankedLot {
                distance_km: geo::round_km(exact),
                lot,
                available_spots: None,
            })
        })
        .collect()
}

fn compare_by_distance(a: &RankedLot, b: &RankedLot) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.lot.id.cmp(&b.lot.id))
}

/// Keep spots of verified lots with a known distance, nearest first
fn rank_spots_by_distance(candidates: Vec<RankedSpot>, limit: usize) -> Vec<RankedSpot> {
    let mut ranked: Vec<(f64, RankedSpot)> = candidates
        .into_iter()
        .filter(|s| s.lot_verified)
        .filter_map(|s| s.distance_km.map(|d| (d, s)))
        .collect();

    ranked.sort_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.spot.id.cmp(&b.spot.id)));
    ranked.truncate(limit);
    ranked.into_iter().map(|(_, s)| s).collect()
}
