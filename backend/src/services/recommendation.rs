//! Recommendation generation and listing
//!
//! Same pipeline shape as alerts: fallback chain, deterministic default
//! batch, single-statement batch insert. The stored row keeps the name of
//! the provider that produced the batch in `source_model`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::chain::FALLBACK_SOURCE;
use crate::external::ProviderChain;
use crate::models::{
    default_recommendation_batch, extract_recommendation_batch, GeneratedRecommendation,
    STEWARDSHIP_TYPES,
};
use crate::services::farm::Farm;

/// Recommendation service for generation and listing
#[derive(Clone)]
pub struct RecommendationService {
    db: PgPool,
    providers: Option<ProviderChain>,
}

/// Stored recommendation record
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub rec_type: String,
    pub priority: String,
    pub source_model: Option<String>,
    pub created_at: DateTime<Utc>,
}

const RECOMMENDATION_COLUMNS: &str =
    "id, farm_id, title, description, rec_type, priority, source_model, created_at";

impl RecommendationService {
    /// Create a new RecommendationService instance (reads only)
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            providers: None,
        }
    }

    /// Create a new RecommendationService with a provider chain
    pub fn with_providers(db: PgPool, providers: ProviderChain) -> Self {
        Self {
            db,
            providers: Some(providers),
        }
    }

    /// Generate and store a recommendation batch for a farm.
    pub async fn generate(&self, farm: &Farm) -> AppResult<Vec<Recommendation>> {
        let prompt = recommendation_prompt(farm);

        let generated = match &self.providers {
            Some(chain) => {
                chain
                    .generate("recommendations", &prompt, None, |text| {
                        extract_recommendation_batch(text, &STEWARDSHIP_TYPES)
                    })
                    .await
            }
            None => None,
        };

        let (recommendations, source) = match generated {
            Some((recommendations, provider)) => (recommendations, provider),
            None => (
                default_recommendation_batch(farm.has_irrigation),
                FALLBACK_SOURCE,
            ),
        };

        tracing::info!(
            farm_id = %farm.id,
            source,
            count = recommendations.len(),
            "storing recommendation batch"
        );

        self.insert_batch(farm.id, source, &recommendations).await
    }

    /// Insert a validated batch as one statement, returning the stored rows.
    async fn insert_batch(
        &self,
        farm_id: Uuid,
        source: &str,
        recommendations: &[GeneratedRecommendation],
    ) -> AppResult<Vec<Recommendation>> {
        let titles: Vec<String> = recommendations.iter().map(|r| r.title.clone()).collect();
        let descriptions: Vec<String> = recommendations
            .iter()
            .map(|r| r.description.clone())
            .collect();
        let types: Vec<String> = recommendations.iter().map(|r| r.rec_type.clone()).collect();
        let priorities: Vec<String> = recommendations
            .iter()
            .map(|r| r.priority.as_str().to_string())
            .collect();

        let rows = sqlx::query_as::<_, Recommendation>(&format!(
            r#"
            INSERT INTO recommendations (farm_id, title, description, rec_type, priority, source_model)
            SELECT $1, batch.title, batch.description, batch.rec_type, batch.priority, $2
            FROM UNNEST($3::text[], $4::text[], $5::text[], $6::text[])
                AS batch(title, description, rec_type, priority)
            RETURNING {}
            "#,
            RECOMMENDATION_COLUMNS
        ))
        .bind(farm_id)
        .bind(source)
        .bind(&titles)
        .bind(&descriptions)
        .bind(&types)
        .bind(&priorities)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// List recommendations for a farm, newest first
    pub async fn list(&self, farm_id: Uuid) -> AppResult<Vec<Recommendation>> {
        let recommendations = sqlx::query_as::<_, Recommendation>(&format!(
            "SELECT {} FROM recommendations WHERE farm_id = $1 ORDER BY created_at DESC",
            RECOMMENDATION_COLUMNS
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(recommendations)
    }
}

/// Build the recommendation generation prompt from the farm profile
fn recommendation_prompt(farm: &Farm) -> String {
    format!(
        "Generate 5 farm recommendations for: {} ({}ha, {} soil, irrigation: {}) in JSON only:\n\
         {{\"recommendations\": [{{\"title\": \"Soil Testing\", \"description\": \"Test soil\", \
         \"type\": \"soil\", \"priority\": \"high\"}}]}}\n\
         Valid types: soil, crop_management, irrigation, pest_management, monitoring.",
        farm.name,
        farm.area_ha
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        farm.soil_type.as_deref().unwrap_or("unknown"),
        if farm.has_irrigation { "yes" } else { "no" }
    )
}
