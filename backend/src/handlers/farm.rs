//! HTTP handlers for farm management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::farm::{CreateFarmInput, Farm, FarmService, UpdateFarmInput};
use crate::AppState;

/// Register a farm
pub async fn create_farm(
    State(state): State<AppState>,
    Json(input): Json<CreateFarmInput>,
) -> AppResult<Json<Farm>> {
    let service = FarmService::new(state.db);
    let farm = service.create_farm(input).await?;
    Ok(Json(farm))
}

/// Query parameters identifying the requesting user
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Uuid,
}

/// List farms for a user
pub async fn list_farms(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> AppResult<Json<Vec<Farm>>> {
    let service = FarmService::new(state.db);
    let farms = service.list_farms(query.user_id).await?;
    Ok(Json(farms))
}

/// Get a farm by ID
pub async fn get_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<Farm>> {
    let service = FarmService::new(state.db);
    let farm = service.get_farm(farm_id).await?;
    Ok(Json(farm))
}

/// Update a farm
pub async fn update_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<UpdateFarmInput>,
) -> AppResult<Json<Farm>> {
    let service = FarmService::new(state.db);
    let farm = service.update_farm(farm_id, input).await?;
    Ok(Json(farm))
}

/// Delete a farm
pub async fn delete_farm(
    State(state): State<AppState>,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = FarmService::new(state.db);
    service.delete_farm(farm_id).await?;
    Ok(Json(()))
}
