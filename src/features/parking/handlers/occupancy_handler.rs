use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::parking::dtos::{
    DetectionRequestDto, DetectionResponseDto, SpotStatusChangeDto, UpdateSpotStatusDto,
};
use crate::features::parking::models::DetectionResult;
use crate::features::parking::services::OccupancyService;
use crate::shared::types::ApiResponse;

/// Set a spot to available, occupied or maintenance
#[utoipa::path(
    patch,
    path = "/api/parking-spots/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Parking spot ID")
    ),
    request_body = UpdateSpotStatusDto,
    responses(
        (status = 200, description = "Status applied", body = ApiResponse<SpotStatusChangeDto>),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Parking spot not found")
    ),
    tag = "parking"
)]
pub async fn update_spot_status(
    State(service): State<Arc<OccupancyService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateSpotStatusDto>,
) -> Result<Json<ApiResponse<SpotStatusChangeDto>>> {
    let change = service.update_status(id, dto.status).await?;

    Ok(Json(ApiResponse::success(
        Some(change.into()),
        Some("Spot status updated".to_string()),
        None,
    )))
}

/// Submit an occupancy classifier result for a spot
///
/// The detection is always stored; the spot status flips only above the
/// configured confidence threshold.
#[utoipa::path(
    post,
    path = "/api/parking-spots/{id}/detections",
    params(
        ("id" = Uuid, Path, description = "Parking spot ID")
    ),
    request_body = DetectionRequestDto,
    responses(
        (status = 200, description = "Detection recorded", body = ApiResponse<DetectionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Parking spot not found")
    ),
    tag = "parking"
)]
pub async fn submit_detection(
    State(service): State<Arc<OccupancyService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<DetectionRequestDto>,
) -> Result<Json<ApiResponse<DetectionResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = service
        .apply_detection(
            id,
            DetectionResult {
                is_occupied: dto.is_occupied,
                confidence: dto.confidence,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(
        Some(outcome.into()),
        Some("Detection recorded".to_string()),
        None,
    )))
}
