use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::settings::models::DefaultSetting;

/// Repository for the per-company default settings row
#[async_trait]
pub trait DefaultSettingRepository: Send + Sync {
    /// Fetch a company's default settings, if the row exists
    async fn find_for_company(&self, company_id: i64) -> Result<Option<DefaultSetting>>;

    /// Insert or replace the company's default discount links
    async fn upsert(&self, setting: &DefaultSetting) -> Result<DefaultSetting>;
}

pub struct MySqlDefaultSettingRepository {
    pool: MySqlPool,
}

impl MySqlDefaultSettingRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DefaultSettingRepository for MySqlDefaultSettingRepository {
    async fn find_for_company(&self, company_id: i64) -> Result<Option<DefaultSetting>> {
        let row = sqlx::query_as::<_, DefaultSettingRow>(
            r#"
            SELECT id, company_id, sales_discount_id, purchase_discount_id,
                   created_at, updated_at
            FROM default_settings
            WHERE company_id = ?
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch default settings: {}", e)))?;

        Ok(row.map(DefaultSettingRow::into_default_setting))
    }

    async fn upsert(&self, setting: &DefaultSetting) -> Result<DefaultSetting> {
        // One row per company; company_id carries a unique index
        sqlx::query(
            r#"
            INSERT INTO default_settings (
                company_id, sales_discount_id, purchase_discount_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                sales_discount_id = VALUES(sales_discount_id),
                purchase_discount_id = VALUES(purchase_discount_id),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(setting.company_id)
        .bind(setting.sales_discount_id)
        .bind(setting.purchase_discount_id)
        .bind(setting.created_at)
        .bind(setting.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to save default settings: {}", e)))?;

        self.find_for_company(setting.company_id)
            .await?
            .ok_or_else(|| AppError::internal("Default settings row missing after upsert"))
    }
}

// Helper struct for database mapping

#[derive(Debug, sqlx::FromRow)]
struct DefaultSettingRow {
    id: i64,
    company_id: i64,
    sales_discount_id: Option<i64>,
    purchase_discount_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DefaultSettingRow {
    fn into_default_setting(self) -> DefaultSetting {
        DefaultSetting {
            id: self.id,
            company_id: self.company_id,
            sales_discount_id: self.sales_discount_id,
            purchase_discount_id: self.purchase_discount_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
