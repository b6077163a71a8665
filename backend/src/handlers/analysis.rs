//! HTTP handlers for crop analysis endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ProviderChain;
use crate::models::{CropAnalysis, ImagePayload};
use crate::services::analysis::{AnalysisResult, AnalysisService, CropImage};
use crate::services::farm::FarmService;
use crate::AppState;

/// Request body for crop image analysis
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCropRequest {
    pub farm_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub image_data: Option<String>,
    pub image_name: Option<String>,
}

/// Response for crop image analysis
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCropResponse {
    pub success: bool,
    pub analysis: CropAnalysis,
    pub image_record: CropImage,
}

/// Analyze an uploaded crop image
pub async fn analyze_crop_image(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCropRequest>,
) -> AppResult<Json<AnalyzeCropResponse>> {
    let (farm_id, user_id, image_data) =
        match (request.farm_id, request.user_id, request.image_data) {
            (Some(farm_id), Some(user_id), Some(image_data)) => (farm_id, user_id, image_data),
            _ => {
                return Err(AppError::Validation(
                    "farmId, userId, and imageData are required".to_string(),
                ))
            }
        };

    let image = ImagePayload::from_data_uri(&image_data).map_err(AppError::BadImage)?;

    let farm = FarmService::new(state.db.clone()).get_farm(farm_id).await?;

    let chain = ProviderChain::from_config(&state.config.providers);
    let service = AnalysisService::with_providers(state.db, chain);
    let (analysis, image_record, _result) = service
        .analyze(&farm, user_id, &image, request.image_name.as_deref())
        .await?;

    Ok(Json(AnalyzeCropResponse {
        success: true,
        analysis,
        image_record,
    }))
}

/// Query parameters for analysis listings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysesQuery {
    pub farm_id: Uuid,
}

/// List analysis results for a farm
pub async fn list_analyses(
    State(state): State<AppState>,
    Query(query): Query<AnalysesQuery>,
) -> AppResult<Json<Vec<AnalysisResult>>> {
    let service = AnalysisService::new(state.db);
    let results = service.list_results(query.farm_id).await?;
    Ok(Json(results))
}

/// List uploaded crop images for a farm
pub async fn list_crop_images(
    State(state): State<AppState>,
    Query(query): Query<AnalysesQuery>,
) -> AppResult<Json<Vec<CropImage>>> {
    let service = AnalysisService::new(state.db);
    let images = service.list_images(query.farm_id).await?;
    Ok(Json(images))
}
