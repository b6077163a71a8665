//! Alert generation and panel queries
//!
//! Generation runs the provider fallback chain against the farm profile and
//! always ends with a stored batch: when no provider yields usable output,
//! the deterministic default batch is inserted instead. Reads and `is_read`
//! mutations back the alerts panel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::chain::FALLBACK_SOURCE;
use crate::external::ProviderChain;
use crate::models::{default_alert_batch, extract_alert_batch, GeneratedAlert};
use crate::services::farm::Farm;

/// Alert service for generation and panel queries
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
    providers: Option<ProviderChain>,
}

/// Stored alert record
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub farm_id: Uuid,
    pub level: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

const ALERT_COLUMNS: &str = "id, user_id, farm_id, level, title, message, is_read, created_at";

impl AlertService {
    /// Create a new AlertService instance (reads only)
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            providers: None,
        }
    }

    /// Create a new AlertService with a provider chain for generation
    pub fn with_providers(db: PgPool, providers: ProviderChain) -> Self {
        Self {
            db,
            providers: Some(providers),
        }
    }

    /// Generate and store an alert batch for a farm.
    ///
    /// Never fails for provider reasons: chain exhaustion falls through to
    /// the default batch, and only the batch insert can error out.
    pub async fn generate(&self, farm: &Farm, user_id: Uuid) -> AppResult<Vec<Alert>> {
        let prompt = alert_prompt(farm);

        let generated = match &self.providers {
            Some(chain) => {
                chain
                    .generate("alerts", &prompt, None, extract_alert_batch)
                    .await
            }
            None => None,
        };

        let (alerts, source) = match generated {
            Some((alerts, provider)) => (alerts, provider),
            None => (
                default_alert_batch(
                    farm.area_ha.map(|a| a.to_string()).as_deref(),
                    farm.soil_type.as_deref(),
                    farm.has_irrigation,
                ),
                FALLBACK_SOURCE,
            ),
        };

        tracing::info!(
            farm_id = %farm.id,
            source,
            count = alerts.len(),
            "storing alert batch"
        );

        self.insert_batch(user_id, farm.id, &alerts).await
    }

    /// Insert a validated batch as one statement, returning the stored rows.
    async fn insert_batch(
        &self,
        user_id: Uuid,
        farm_id: Uuid,
        alerts: &[GeneratedAlert],
    ) -> AppResult<Vec<Alert>> {
        let levels: Vec<String> = alerts.iter().map(|a| a.level.as_str().to_string()).collect();
        let titles: Vec<String> = alerts.iter().map(|a| a.title.clone()).collect();
        let messages: Vec<String> = alerts.iter().map(|a| a.message.clone()).collect();

        let rows = sqlx::query_as::<_, Alert>(&format!(
            r#"
            INSERT INTO alerts (user_id, farm_id, level, title, message, is_read)
            SELECT $1, $2, batch.level, batch.title, batch.message, FALSE
            FROM UNNEST($3::text[], $4::text[], $5::text[]) AS batch(level, title, message)
            RETURNING {}
            "#,
            ALERT_COLUMNS
        ))
        .bind(user_id)
        .bind(farm_id)
        .bind(&levels)
        .bind(&titles)
        .bind(&messages)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// List alerts for a user, newest first, optionally scoped to one farm
    pub async fn list(&self, user_id: Uuid, farm_id: Option<Uuid>) -> AppResult<Vec<Alert>> {
        let alerts = sqlx::query_as::<_, Alert>(&format!(
            r#"
            SELECT {}
            FROM alerts
            WHERE user_id = $1 AND ($2::uuid IS NULL OR farm_id = $2)
            ORDER BY created_at DESC
            "#,
            ALERT_COLUMNS
        ))
        .bind(user_id)
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Count unread alerts for a user
    pub async fn unread_count(&self, user_id: Uuid, farm_id: Option<Uuid>) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM alerts
            WHERE user_id = $1 AND is_read = FALSE AND ($2::uuid IS NULL OR farm_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(farm_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Mark one alert as read
    pub async fn mark_read(&self, user_id: Uuid, alert_id: Uuid) -> AppResult<Alert> {
        let alert = sqlx::query_as::<_, Alert>(&format!(
            r#"
            UPDATE alerts
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            ALERT_COLUMNS
        ))
        .bind(alert_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert".to_string()))?;

        Ok(alert)
    }

    /// Mark every unread alert as read, returning how many changed
    pub async fn mark_all_read(&self, user_id: Uuid, farm_id: Option<Uuid>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE alerts
            SET is_read = TRUE
            WHERE user_id = $1 AND is_read = FALSE AND ($2::uuid IS NULL OR farm_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(farm_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Build the alert generation prompt from the farm profile
fn alert_prompt(farm: &Farm) -> String {
    format!(
        "Generate 4 farm alerts for {} ({}ha, {} soil, irrigation: {}) in JSON only:\n\
         {{\"alerts\": [{{\"level\": \"critical\", \"title\": \"Alert 1\", \"message\": \"Msg\"}}, \
         {{\"level\": \"warning\", \"title\": \"Alert 2\", \"message\": \"Msg\"}}, \
         {{\"level\": \"warning\", \"title\": \"Alert 3\", \"message\": \"Msg\"}}, \
         {{\"level\": \"info\", \"title\": \"Alert 4\", \"message\": \"Msg\"}}]}}",
        farm.name,
        farm.area_ha
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        farm.soil_type.as_deref().unwrap_or("unknown"),
        if farm.has_irrigation { "yes" } else { "no" }
    )
}
