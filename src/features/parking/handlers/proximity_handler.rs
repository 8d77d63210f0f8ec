use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::parking::dtos::{
    NearbyLotsQuery, NearbyLotsResponseDto, NearbySpotsQuery, NearbySpotsResponseDto,
    RecommendationsResponseDto,
};
use crate::features::parking::services::ProximityService;
use crate::shared::types::{ApiResponse, Meta};

/// Find verified, active parking lots around a point
///
/// Results are nearest first by default; `sort=availability` puts lots with
/// the most free spots first.
#[utoipa::path(
    get,
    path = "/api/parking-lots/nearby",
    params(NearbyLotsQuery),
    responses(
        (status = 200, description = "Nearby parking lots", body = ApiResponse<NearbyLotsResponseDto>),
        (status = 400, description = "Missing or invalid query parameters")
    ),
    tag = "parking"
)]
pub async fn nearby_lots(
    State(service): State<Arc<ProximityService>>,
    Query(query): Query<NearbyLotsQuery>,
) -> Result<Json<ApiResponse<NearbyLotsResponseDto>>> {
    let search = query.into_search()?;
    let lots = service.nearby_lots(&search).await?;
    let total = lots.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(NearbyLotsResponseDto::new(&search.resolved(), lots)),
        None,
        Some(Meta { total }),
    )))
}

/// Find available, unreserved spots in nearby lots
#[utoipa::path(
    get,
    path = "/api/parking-spots/nearby",
    params(NearbySpotsQuery),
    responses(
        (status = 200, description = "Available spots, nearest lot first", body = ApiResponse<NearbySpotsResponseDto>),
        (status = 400, description = "Missing or invalid query parameters")
    ),
    tag = "parking"
)]
pub async fn nearby_spots(
    State(service): State<Arc<ProximityService>>,
    Query(query): Query<NearbySpotsQuery>,
) -> Result<Json<ApiResponse<NearbySpotsResponseDto>>> {
    let search = query.into_search()?;
    let spots = service.nearby_available_spots(&search).await?;
    let total = spots.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(NearbySpotsResponseDto::new(&search.resolved(), spots)),
        None,
        Some(Meta { total }),
    )))
}

/// Recommend the closest individual spots in verified lots
#[utoipa::path(
    get,
    path = "/api/parking-spots/recommendations",
    params(NearbySpotsQuery),
    responses(
        (status = 200, description = "Recommended spots, nearest first", body = ApiResponse<RecommendationsResponseDto>),
        (status = 400, description = "Missing or invalid query parameters")
    ),
    tag = "parking"
)]
pub async fn recommendations(
    State(service): State<Arc<ProximityService>>,
    Query(query): Query<NearbySpotsQuery>,
) -> Result<Json<ApiResponse<RecommendationsResponseDto>>> {
    let search = query.into_search()?;
    let spots = service.recommend_spots(&search).await?;
    let total = spots.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(RecommendationsResponseDto::new(&search.resolved(), spots)),
        None,
        Some(Meta { total }),
    )))
}
