//! HTTP handlers for recommendation endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ProviderChain;
use crate::services::farm::FarmService;
use crate::services::recommendation::{Recommendation, RecommendationService};
use crate::AppState;

/// Request body for recommendation generation
///
/// `userId` is accepted for parity with the alert endpoint but the stored
/// rows are scoped by farm alone.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecommendationsRequest {
    pub farm_id: Option<Uuid>,
    #[allow(dead_code)]
    pub user_id: Option<Uuid>,
}

/// Response for recommendation generation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecommendationsResponse {
    pub success: bool,
    pub count: usize,
    pub recommendations: Vec<Recommendation>,
}

/// Generate a recommendation batch for a farm
pub async fn generate_recommendations(
    State(state): State<AppState>,
    Json(request): Json<GenerateRecommendationsRequest>,
) -> AppResult<Json<GenerateRecommendationsResponse>> {
    let farm_id = request
        .farm_id
        .ok_or_else(|| AppError::Validation("farmId is required".to_string()))?;

    let farm = FarmService::new(state.db.clone()).get_farm(farm_id).await?;

    let chain = ProviderChain::from_config(&state.config.providers);
    let service = RecommendationService::with_providers(state.db, chain);
    let recommendations = service.generate(&farm).await?;

    Ok(Json(GenerateRecommendationsResponse {
        success: true,
        count: recommendations.len(),
        recommendations,
    }))
}

/// Query parameters for recommendation listings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsQuery {
    pub farm_id: Uuid,
}

/// List recommendations for a farm
pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationsQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let service = RecommendationService::new(state.db);
    let recommendations = service.list(query.farm_id).await?;
    Ok(Json(recommendations))
}
