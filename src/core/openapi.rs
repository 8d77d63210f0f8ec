use utoipa::{Modify, OpenApi};

use crate::features::parking::dtos as parking_dtos;
use crate::features::parking::handlers::{occupancy_handler, proximity_handler};
use crate::features::parking::models::{Coordinate, SpotStatus};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Proximity search (public)
        proximity_handler::nearby_lots,
        proximity_handler::nearby_spots,
        proximity_handler::recommendations,
        // Occupancy
        occupancy_handler::update_spot_status,
        occupancy_handler::submit_detection,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Coordinate,
            SpotStatus,
            // Proximity search
            parking_dtos::ParkingLotResponseDto,
            parking_dtos::ParkingSpotResponseDto,
            parking_dtos::NearbyLotsResponseDto,
            parking_dtos::NearbySpotsResponseDto,
            parking_dtos::RecommendationsResponseDto,
            ApiResponse<parking_dtos::NearbyLotsResponseDto>,
            ApiResponse<parking_dtos::NearbySpotsResponseDto>,
            ApiResponse<parking_dtos::RecommendationsResponseDto>,
            // Occupancy
            parking_dtos::UpdateSpotStatusDto,
            parking_dtos::DetectionRequestDto,
            parking_dtos::SpotStatusChangeDto,
            parking_dtos::DetectionResponseDto,
            ApiResponse<parking_dtos::SpotStatusChangeDto>,
            ApiResponse<parking_dtos::DetectionResponseDto>,
        )
    ),
    tags(
        (name = "parking", description = "Nearby parking lots, spots and recommendations"),
    ),
    info(
        title = "ParkIt API",
        version = "0.1.0",
        description = "API documentation for ParkIt",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
