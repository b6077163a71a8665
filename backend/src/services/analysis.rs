//! Crop image analysis pipeline
//!
//! One uploaded image yields one stored image row and one analysis row,
//! written in a single transaction. The vision-capable providers run through
//! the fallback chain; when none yields a usable analysis, the placeholder
//! analysis is stored so the panel always has something to render.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ProviderChain;
use crate::models::{extract_crop_analysis, CropAnalysis, ImagePayload};
use crate::services::farm::Farm;

/// Analysis service for the crop image pipeline
#[derive(Clone)]
pub struct AnalysisService {
    db: PgPool,
    providers: Option<ProviderChain>,
}

/// Stored crop image record
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CropImage {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub user_id: Uuid,
    pub storage_path: String,
    pub captured_at: DateTime<Utc>,
    pub ai_label: Option<String>,
    pub ai_confidence: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Stored analysis result record
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub image_id: Uuid,
    pub user_id: Uuid,
    pub farm_id: Uuid,
    pub analysis_text: String,
    pub severity_level: String,
    pub recommendations: String,
    pub created_at: DateTime<Utc>,
}

const IMAGE_COLUMNS: &str =
    "id, farm_id, user_id, storage_path, captured_at, ai_label, ai_confidence, created_at";

const RESULT_COLUMNS: &str = "id, image_id, user_id, farm_id, analysis_text, severity_level, \
                              recommendations, created_at";

impl AnalysisService {
    /// Create a new AnalysisService instance (reads only)
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            providers: None,
        }
    }

    /// Create a new AnalysisService with a provider chain
    pub fn with_providers(db: PgPool, providers: ProviderChain) -> Self {
        Self {
            db,
            providers: Some(providers),
        }
    }

    /// Analyze an uploaded crop image and persist the result.
    ///
    /// Provider failure is not an error: the placeholder analysis is stored
    /// instead. The image row and the analysis row commit together or not at
    /// all.
    pub async fn analyze(
        &self,
        farm: &Farm,
        user_id: Uuid,
        image: &ImagePayload,
        image_name: Option<&str>,
    ) -> AppResult<(CropAnalysis, CropImage, AnalysisResult)> {
        let prompt = analysis_prompt();

        let generated = match &self.providers {
            Some(chain) => {
                chain
                    .generate("crop-analysis", &prompt, Some(image), extract_crop_analysis)
                    .await
            }
            None => None,
        };

        let analysis = match generated {
            Some((analysis, provider)) => {
                tracing::info!(farm_id = %farm.id, provider, "crop analysis produced");
                analysis
            }
            None => {
                tracing::warn!(farm_id = %farm.id, "no provider produced a usable analysis");
                CropAnalysis::fallback()
            }
        };

        let captured_at = Utc::now();
        let storage_path = format!(
            "crop-images/{}/{}-{}",
            user_id,
            captured_at.timestamp_millis(),
            image_name.unwrap_or("crop.jpg")
        );

        let analysis_text = serde_json::to_string(&analysis)
            .map_err(|e| AppError::Internal(format!("Failed to serialize analysis: {}", e)))?;
        // Stored as a 0-1 fraction, matching the panel's progress rendering.
        let confidence_fraction = Decimal::new(analysis.confidence as i64, 2);

        let mut tx = self.db.begin().await?;

        let image_record = sqlx::query_as::<_, CropImage>(&format!(
            r#"
            INSERT INTO images (farm_id, user_id, storage_path, captured_at, ai_label, ai_confidence)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            IMAGE_COLUMNS
        ))
        .bind(farm.id)
        .bind(user_id)
        .bind(&storage_path)
        .bind(captured_at)
        .bind(&analysis.disease)
        .bind(confidence_fraction)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query_as::<_, AnalysisResult>(&format!(
            r#"
            INSERT INTO analysis_results (image_id, user_id, farm_id, analysis_text, severity_level, recommendations)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            RESULT_COLUMNS
        ))
        .bind(image_record.id)
        .bind(user_id)
        .bind(farm.id)
        .bind(&analysis_text)
        .bind(analysis.severity.as_str())
        .bind(&analysis.immediate_actions)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((analysis, image_record, result))
    }

    /// List analysis results for a farm, newest first
    pub async fn list_results(&self, farm_id: Uuid) -> AppResult<Vec<AnalysisResult>> {
        let results = sqlx::query_as::<_, AnalysisResult>(&format!(
            "SELECT {} FROM analysis_results WHERE farm_id = $1 ORDER BY created_at DESC",
            RESULT_COLUMNS
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(results)
    }

    /// List uploaded crop images for a farm, newest first
    pub async fn list_images(&self, farm_id: Uuid) -> AppResult<Vec<CropImage>> {
        let images = sqlx::query_as::<_, CropImage>(&format!(
            "SELECT {} FROM images WHERE farm_id = $1 ORDER BY created_at DESC",
            IMAGE_COLUMNS
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(images)
    }
}

/// The vision analysis prompt requesting the full structured shape
fn analysis_prompt() -> String {
    "You are an expert agricultural pathologist. Analyze this crop image and identify any \
     visible diseases, pests, or stress conditions.\n\n\
     Respond in JSON format only:\n\
     {\"disease\": \"Disease name or 'Healthy'\", \"severity\": \"low|medium|high|critical\", \
     \"confidence\": 0-100, \"cropType\": \"Crop species\", \"growthStage\": \"Growth stage\", \
     \"overallHealth\": \"Overall condition\", \"description\": \"What you see\", \
     \"symptoms\": [\"Visible symptoms\"], \"possibleCauses\": [\"Likely causes\"], \
     \"riskFactors\": \"Conditions that worsen this\", \"immediateActions\": \"Next 24-48 hours\", \
     \"shortTermTreatment\": \"Next 1-2 weeks\", \"longTermManagement\": \"Season strategy\", \
     \"recommendedProducts\": [\"Up to 6 products\"], \"monitoringSchedule\": \"How often to check\", \
     \"weatherConsiderations\": \"Weather impact\", \"alternativeSolutions\": \"Organic options\"}"
        .to_string()
}
