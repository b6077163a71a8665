//! Route definitions for the ClimaSmart backend

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Farm management
        .nest("/farms", farm_routes())
        // Alert generation and panel queries
        .nest("/alerts", alert_routes())
        // Recommendation generation and listing
        .nest("/recommendations", recommendation_routes())
        // Crop image analysis
        .nest("/analysis", analysis_routes())
}

/// Farm management routes
fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farms).post(handlers::create_farm))
        .route(
            "/:farm_id",
            get(handlers::get_farm)
                .put(handlers::update_farm)
                .delete(handlers::delete_farm),
        )
}

/// Alert routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/generate", post(handlers::generate_alerts))
        .route("/unread-count", get(handlers::get_unread_count))
        .route("/mark-all-read", post(handlers::mark_all_alerts_read))
        .route("/:alert_id/read", post(handlers::mark_alert_read))
}

/// Recommendation routes
fn recommendation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_recommendations))
        .route("/generate", post(handlers::generate_recommendations))
}

/// Crop analysis routes
fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_analyses))
        .route("/analyze", post(handlers::analyze_crop_image))
        .route("/images", get(handlers::list_crop_images))
}
