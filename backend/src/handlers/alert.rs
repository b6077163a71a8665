//! HTTP handlers for alert endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ProviderChain;
use crate::services::alert::{Alert, AlertService};
use crate::services::farm::FarmService;
use crate::AppState;

/// Request body for alert generation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAlertsRequest {
    pub farm_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Response for alert generation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAlertsResponse {
    pub success: bool,
    pub count: usize,
    pub alerts: Vec<Alert>,
}

/// Generate an alert batch for a farm
pub async fn generate_alerts(
    State(state): State<AppState>,
    Json(request): Json<GenerateAlertsRequest>,
) -> AppResult<Json<GenerateAlertsResponse>> {
    let (farm_id, user_id) = match (request.farm_id, request.user_id) {
        (Some(farm_id), Some(user_id)) => (farm_id, user_id),
        _ => {
            return Err(AppError::Validation(
                "farmId and userId are required".to_string(),
            ))
        }
    };

    let farm = FarmService::new(state.db.clone()).get_farm(farm_id).await?;

    let chain = ProviderChain::from_config(&state.config.providers);
    let service = AlertService::with_providers(state.db, chain);
    let alerts = service.generate(&farm, user_id).await?;

    Ok(Json(GenerateAlertsResponse {
        success: true,
        count: alerts.len(),
        alerts,
    }))
}

/// Query parameters for alert listings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsQuery {
    pub user_id: Uuid,
    pub farm_id: Option<Uuid>,
}

/// List alerts for a user
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> AppResult<Json<Vec<Alert>>> {
    let service = AlertService::new(state.db);
    let alerts = service.list(query.user_id, query.farm_id).await?;
    Ok(Json(alerts))
}

/// Unread alert count response
#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Count unread alerts for a user
pub async fn get_unread_count(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> AppResult<Json<UnreadCountResponse>> {
    let service = AlertService::new(state.db);
    let count = service.unread_count(query.user_id, query.farm_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark one alert as read
pub async fn mark_alert_read(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
    Query(query): Query<AlertsQuery>,
) -> AppResult<Json<Alert>> {
    let service = AlertService::new(state.db);
    let alert = service.mark_read(query.user_id, alert_id).await?;
    Ok(Json(alert))
}

/// Response for the mark-all-read operation
#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// Mark every unread alert as read
pub async fn mark_all_alerts_read(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> AppResult<Json<MarkAllReadResponse>> {
    let service = AlertService::new(state.db);
    let updated = service.mark_all_read(query.user_id, query.farm_id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
