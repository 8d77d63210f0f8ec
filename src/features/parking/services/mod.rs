pub mod occupancy_service;
pub mod parking_store;
pub mod proximity_service;
pub mod recommendation_cache;

pub use occupancy_service::{DetectionOutcome, OccupancyService, StatusChange};
pub use parking_store::{ParkingStore, PgParkingStore};
pub use proximity_service::{
    LotSearch, LotSort, ProximityService, RankedLot, RankedSpot, SpotSearch,
};
pub use recommendation_cache::{
    NoopRecommendationCache, RecommendationCache, TtlRecommendationCache,
};
