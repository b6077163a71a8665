//! Farm registry service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Farm service for managing farm records
#[derive(Clone)]
pub struct FarmService {
    db: PgPool,
}

/// Farm record
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub area_ha: Option<Decimal>,
    pub soil_type: Option<String>,
    pub has_irrigation: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a farm
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarmInput {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub area_ha: Option<Decimal>,
    #[validate(length(max = 60))]
    pub soil_type: Option<String>,
    pub has_irrigation: Option<bool>,
}

/// Input for updating a farm
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFarmInput {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub area_ha: Option<Decimal>,
    #[validate(length(max = 60))]
    pub soil_type: Option<String>,
    pub has_irrigation: Option<bool>,
}

const FARM_COLUMNS: &str = "id, user_id, name, latitude, longitude, area_ha, soil_type, \
                            has_irrigation, created_at, updated_at";

impl FarmService {
    /// Create a new FarmService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a farm
    pub async fn create_farm(&self, input: CreateFarmInput) -> AppResult<Farm> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let farm = sqlx::query_as::<_, Farm>(&format!(
            r#"
            INSERT INTO farms (user_id, name, latitude, longitude, area_ha, soil_type, has_irrigation)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FARM_COLUMNS
        ))
        .bind(input.user_id)
        .bind(&input.name)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.area_ha)
        .bind(&input.soil_type)
        .bind(input.has_irrigation.unwrap_or(false))
        .fetch_one(&self.db)
        .await?;

        Ok(farm)
    }

    /// Get a farm by ID
    pub async fn get_farm(&self, farm_id: Uuid) -> AppResult<Farm> {
        let farm = sqlx::query_as::<_, Farm>(&format!(
            "SELECT {} FROM farms WHERE id = $1",
            FARM_COLUMNS
        ))
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

        Ok(farm)
    }

    /// List farms owned by a user
    pub async fn list_farms(&self, user_id: Uuid) -> AppResult<Vec<Farm>> {
        let farms = sqlx::query_as::<_, Farm>(&format!(
            "SELECT {} FROM farms WHERE user_id = $1 ORDER BY created_at DESC",
            FARM_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(farms)
    }

    /// Update a farm
    pub async fn update_farm(&self, farm_id: Uuid, input: UpdateFarmInput) -> AppResult<Farm> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let farm = sqlx::query_as::<_, Farm>(&format!(
            r#"
            UPDATE farms
            SET name = COALESCE($2, name),
                latitude = COALESCE($3, latitude),
                longitude = COALESCE($4, longitude),
                area_ha = COALESCE($5, area_ha),
                soil_type = COALESCE($6, soil_type),
                has_irrigation = COALESCE($7, has_irrigation),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FARM_COLUMNS
        ))
        .bind(farm_id)
        .bind(&input.name)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.area_ha)
        .bind(&input.soil_type)
        .bind(input.has_irrigation)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

        Ok(farm)
    }

    /// Delete a farm and its dependent records
    pub async fn delete_farm(&self, farm_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM farms WHERE id = $1")
            .bind(farm_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farm".to_string()));
        }

        Ok(())
    }
}
