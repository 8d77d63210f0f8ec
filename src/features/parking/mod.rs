//! Parking proximity search feature.
//!
//! Finds verified, active parking lots and bookable spots around a user's
//! location and ranks them by great-circle distance. Candidates are narrowed
//! with a latitude/longitude bounding box before the exact haversine pass.
//!
//! Spot status is kept current by lot operators and by an external occupancy
//! classifier; every status change invalidates cached rankings.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/parking-lots/nearby` | Lots within `radius` km (default 10), nearest or most available first |
//! | GET | `/api/parking-spots/nearby` | Available spots of nearby lots (default radius 5 km) |
//! | GET | `/api/parking-spots/recommendations` | Closest 10 spots in verified lots |
//! | PATCH | `/api/parking-spots/{id}/status` | Set a spot available, occupied or under maintenance |
//! | POST | `/api/parking-spots/{id}/detections` | Apply an occupancy classifier result |

pub mod dtos;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{
    NoopRecommendationCache, OccupancyService, PgParkingStore, ProximityService,
    RecommendationCache, TtlRecommendationCache,
};
