use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::parking::handlers::{occupancy_handler, proximity_handler};
use crate::features::parking::services::{OccupancyService, ProximityService};

/// Create routes for the parking feature
///
/// Note: search endpoints are public (no authentication required)
pub fn routes(proximity: Arc<ProximityService>, occupancy: Arc<OccupancyService>) -> Router {
    let search_routes = Router::new()
        .route(
            "/api/parking-lots/nearby",
            get(proximity_handler::nearby_lots),
        )
        .route(
            "/api/parking-spots/nearby",
            get(proximity_handler::nearby_spots),
        )
        .route(
            "/api/parking-spots/recommendations",
            get(proximity_handler::recommendations),
        )
        .with_state(proximity);

    let occupancy_routes = Router::new()
        .route(
            "/api/parking-spots/{id}/status",
            patch(occupancy_handler::update_spot_status),
        )
        .route(
            "/api/parking-spots/{id}/detections",
            post(occupancy_handler::submit_detection),
        )
        .with_state(occupancy);

    search_routes.merge(occupancy_routes)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::features::parking::models::{ParkingSpot, SpotStatus};
    use crate::features::parking::services::TtlRecommendationCache;
    use crate::shared::test_helpers::{lot_at, lot_id, spot_in, InMemoryParkingStore};

    struct Fixture {
        server: TestServer,
        spot: ParkingSpot,
    }

    fn fixture() -> Fixture {
        let near = lot_at(1, Some((40.01, -75.0)));
        let far = lot_at(2, Some((41.0, -75.0)));
        let spot = spot_in(&near, 1);
        let mut busy = spot_in(&near, 2);
        busy.status = SpotStatus::Occupied;

        let store = Arc::new(
            InMemoryParkingStore::new()
                .with_spot(spot.clone())
                .with_spot(busy)
                .with_spot(spot_in(&far, 1))
                .with_lot(near)
                .with_lot(far),
        );
        let cache = Arc::new(TtlRecommendationCache::new(Duration::from_secs(60), 64));
        let proximity = Arc::new(ProximityService::new(store.clone(), cache.clone()));
        let occupancy = Arc::new(OccupancyService::new(store, cache, 0.6));

        let server = TestServer::new(routes(proximity, occupancy)).unwrap();
        Fixture { server, spot }
    }

    #[tokio::test]
    async fn test_nearby_lots_response_shape() {
        let Fixture { server, .. } = fixture();

        let response = server
            .get("/api/parking-lots/nearby")
            .add_query_param("lat", "40.0")
            .add_query_param("lon", "-75.0")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["meta"]["total"], json!(1));
        assert_eq!(body["data"]["search_radius_km"], json!(10.0));
        assert_eq!(
            body["data"]["user_location"],
            json!({ "latitude": 40.0, "longitude": -75.0 })
        );

        let lots = body["data"]["nearby_parking_lots"].as_array().unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0]["id"], json!(lot_id(1)));
        assert_eq!(lots[0]["distance_km"], json!(1.11));
        assert_eq!(lots[0]["available_spots"], Value::Null);
    }

    #[tokio::test]
    async fn test_response_echoes_the_search_that_ran() {
        let Fixture { server, .. } = fixture();

        let response = server
            .get("/api/parking-lots/nearby")
            .add_query_param("lat", "40.00004")
            .add_query_param("lon", "-75.00003")
            .add_query_param("radius", "9.9996")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["search_radius_km"], json!(9.999));
        assert_eq!(
            body["data"]["user_location"],
            json!({ "latitude": 40.0, "longitude": -75.0 })
        );
        let lots = body["data"]["nearby_parking_lots"].as_array().unwrap();
        assert_eq!(lots[0]["distance_km"], json!(1.11));
    }

    #[tokio::test]
    async fn test_nearby_lots_sorted_by_availability() {
        let Fixture { server, .. } = fixture();

        let response = server
            .get("/api/parking-lots/nearby")
            .add_query_param("lat", "40.0")
            .add_query_param("lon", "-75.0")
            .add_query_param("radius", "200")
            .add_query_param("sort", "availability")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let lots = body["data"]["nearby_parking_lots"].as_array().unwrap();
        assert_eq!(lots.len(), 2);
        assert!(lots.iter().all(|lot| lot["available_spots"] == json!(1)));
        assert_eq!(lots[0]["id"], json!(lot_id(1)));
    }

    #[tokio::test]
    async fn test_missing_coordinates_is_bad_request() {
        let Fixture { server, .. } = fixture();

        let response = server
            .get("/api/parking-lots/nearby")
            .add_query_param("lat", "40.0")
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Coordinates required"));
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_bad_request() {
        let Fixture { server, .. } = fixture();

        let cases = [
            ("north", "-75.0", "5"),
            ("95", "-75.0", "5"),
            ("40", "-75", "far"),
        ];
        for (lat, lon, radius) in cases {
            let response = server
                .get("/api/parking-spots/nearby")
                .add_query_param("lat", lat)
                .add_query_param("lon", lon)
                .add_query_param("radius", radius)
                .await;

            response.assert_status_bad_request();
        }
    }

    #[tokio::test]
    async fn test_nearby_spots_lists_available_spots() {
        let Fixture { server, spot } = fixture();

        let response = server
            .get("/api/parking-spots/nearby")
            .add_query_param("lat", "40.0")
            .add_query_param("lon", "-75.0")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["search_radius_km"], json!(5.0));
        let spots = body["data"]["available_spots"].as_array().unwrap();
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0]["id"], json!(spot.id));
        assert_eq!(spots[0]["lot_name"], json!("Lot 1"));
        assert_eq!(spots[0]["status"], json!("available"));
        assert_eq!(spots[0]["hourly_rate"], json!("2.50"));
        assert_eq!(spots[0]["latitude"], json!(40.01));
        assert_eq!(spots[0]["distance_km"], json!(1.11));
    }

    #[tokio::test]
    async fn test_recommendations_response_shape() {
        let Fixture { server, spot } = fixture();

        let response = server
            .get("/api/parking-spots/recommendations")
            .add_query_param("lat", "40.0")
            .add_query_param("lon", "-75.0")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["data"].get("search_radius_km").is_none());
        let spots = body["data"]["recommended_spots"].as_array().unwrap();
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0]["id"], json!(spot.id));
    }

    #[tokio::test]
    async fn test_empty_area_is_empty_list() {
        let Fixture { server, .. } = fixture();

        let response = server
            .get("/api/parking-lots/nearby")
            .add_query_param("lat", "-33.87")
            .add_query_param("lon", "151.21")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["nearby_parking_lots"], json!([]));
    }

    #[tokio::test]
    async fn test_status_update_hides_spot_from_search() {
        let Fixture { server, spot } = fixture();
        let nearby = || {
            server
                .get("/api/parking-spots/nearby")
                .add_query_param("lat", "40.0")
                .add_query_param("lon", "-75.0")
        };

        let before: Value = nearby().await.json();
        assert_eq!(before["meta"]["total"], json!(1));

        let response = server
            .patch(&format!("/api/parking-spots/{}/status", spot.id))
            .json(&json!({ "status": "maintenance" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["previous_status"], json!("available"));
        assert_eq!(body["data"]["updated_status"], json!("maintenance"));
        assert_eq!(body["data"]["status_changed"], json!(true));

        let after: Value = nearby().await.json();
        assert_eq!(after["data"]["available_spots"], json!([]));
    }

    #[tokio::test]
    async fn test_status_update_rejects_reserved() {
        let Fixture { server, spot } = fixture();

        let response = server
            .patch(&format!("/api/parking-spots/{}/status", spot.id))
            .json(&json!({ "status": "reserved" }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_status_update_unknown_spot() {
        let Fixture { server, .. } = fixture();

        let response = server
            .patch(&format!(
                "/api/parking-spots/{}/status",
                uuid::Uuid::from_u128(404)
            ))
            .json(&json!({ "status": "occupied" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_detection_applies_confident_result() {
        let Fixture { server, spot } = fixture();

        let response = server
            .post(&format!("/api/parking-spots/{}/detections", spot.id))
            .json(&json!({ "is_occupied": true, "confidence": 0.92 }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["spot_id"], json!(spot.id));
        assert_eq!(body["data"]["updated_status"], json!("occupied"));
        assert_eq!(body["data"]["status_changed"], json!(true));
        assert_eq!(body["data"]["confidence"], json!(0.92));
    }

    #[tokio::test]
    async fn test_detection_rejects_invalid_body() {
        let Fixture { server, spot } = fixture();

        let response = server
            .post(&format!("/api/parking-spots/{}/detections", spot.id))
            .json(&json!({ "is_occupied": true, "confidence": 1.5 }))
            .await;
        response.assert_status_bad_request();

        let response = server
            .post(&format!("/api/parking-spots/{}/detections", spot.id))
            .json(&json!({ "confidence": 0.9 }))
            .await;
        response.assert_status_bad_request();
    }
}
