// Tenant-scoped MySQL persistence for discount definitions.
//
// Every read and write is filtered by company_id so a discount is invisible
// outside its owning tenant; cross-tenant ids surface as Ok(None) here and
// become NotFound at the layer that required a hit. A single row read
// returns all gate fields (enabled, window, scope) together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::discounts::models::Discount;

/// Repository for discount database operations
#[async_trait]
pub trait DiscountRepository: Send + Sync {
    /// Insert a discount and return it with its generated id
    async fn create(&self, discount: &Discount) -> Result<Discount>;

    /// Find a discount by id within the owning company
    async fn find_by_id(&self, id: i64, company_id: i64) -> Result<Option<Discount>>;

    /// List a company's discounts with pagination
    async fn list(&self, company_id: i64, limit: i64, offset: i64) -> Result<Vec<Discount>>;

    /// Persist edits to an existing discount
    async fn update(&self, discount: &Discount) -> Result<()>;

    /// Toggle the enabled flag (the normal decommission path)
    async fn set_enabled(
        &self,
        id: i64,
        company_id: i64,
        enabled: bool,
        updated_by: Option<i64>,
    ) -> Result<()>;

    /// Whether catalog items or document lines still reference the discount
    async fn is_referenced(&self, id: i64, company_id: i64) -> Result<bool>;

    /// Hard-delete a discount; callers must check `is_referenced` first
    async fn delete(&self, id: i64, company_id: i64) -> Result<()>;
}

pub struct MySqlDiscountRepository {
    pool: MySqlPool,
}

impl MySqlDiscountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscountRepository for MySqlDiscountRepository {
    async fn create(&self, discount: &Discount) -> Result<Discount> {
        let result = sqlx::query(
            r#"
            INSERT INTO discounts (
                company_id, name, description, rate, computation, type, scope,
                start_date, end_date, enabled, created_by, updated_by,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(discount.company_id)
        .bind(&discount.name)
        .bind(&discount.description)
        .bind(discount.rate)
        .bind(discount.computation.to_string())
        .bind(discount.discount_type.to_string())
        .bind(discount.scope.map(|s| s.to_string()))
        .bind(discount.start_date)
        .bind(discount.end_date)
        .bind(discount.enabled)
        .bind(discount.created_by)
        .bind(discount.updated_by)
        .bind(discount.created_at)
        .bind(discount.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create discount: {}", e)))?;

        let mut created = discount.clone();
        created.id = result.last_insert_id() as i64;

        Ok(created)
    }

    async fn find_by_id(&self, id: i64, company_id: i64) -> Result<Option<Discount>> {
        let row = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT id, company_id, name, description, rate, computation, type, scope,
                   start_date, end_date, enabled, created_by, updated_by,
                   created_at, updated_at
            FROM discounts
            WHERE id = ? AND company_id = ?
            "#,
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch discount: {}", e)))?;

        row.map(DiscountRow::into_discount).transpose()
    }

    async fn list(&self, company_id: i64, limit: i64, offset: i64) -> Result<Vec<Discount>> {
        let limit = limit.clamp(1, 100);
        let offset = offset.max(0);

        let rows = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT id, company_id, name, description, rate, computation, type, scope,
                   start_date, end_date, enabled, created_by, updated_by,
                   created_at, updated_at
            FROM discounts
            WHERE company_id = ?
            ORDER BY name, id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to list discounts: {}", e)))?;

        rows.into_iter().map(DiscountRow::into_discount).collect()
    }

    async fn update(&self, discount: &Discount) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET name = ?, description = ?, rate = ?, computation = ?, type = ?,
                scope = ?, start_date = ?, end_date = ?, enabled = ?,
                updated_by = ?, updated_at = ?
            WHERE id = ? AND company_id = ?
            "#,
        )
        .bind(&discount.name)
        .bind(&discount.description)
        .bind(discount.rate)
        .bind(discount.computation.to_string())
        .bind(discount.discount_type.to_string())
        .bind(discount.scope.map(|s| s.to_string()))
        .bind(discount.start_date)
        .bind(discount.end_date)
        .bind(discount.enabled)
        .bind(discount.updated_by)
        .bind(discount.updated_at)
        .bind(discount.id)
        .bind(discount.company_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update discount: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Discount with id '{}' not found",
                discount.id
            )));
        }

        Ok(())
    }

    async fn set_enabled(
        &self,
        id: i64,
        company_id: i64,
        enabled: bool,
        updated_by: Option<i64>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET enabled = ?, updated_by = ?, updated_at = NOW()
            WHERE id = ? AND company_id = ?
            "#,
        )
        .bind(enabled)
        .bind(updated_by)
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to toggle discount: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Discount with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn is_referenced(&self, id: i64, company_id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM items
                 WHERE discount_id = ? AND company_id = ?)
                +
                (SELECT COUNT(*) FROM document_items
                 WHERE discount_id = ? AND company_id = ?)
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to check discount references: {}", e)))?;

        Ok(count > 0)
    }

    async fn delete(&self, id: i64, company_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = ? AND company_id = ?")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete discount: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Discount with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}

// Helper struct for database mapping

#[derive(Debug, sqlx::FromRow)]
struct DiscountRow {
    id: i64,
    company_id: i64,
    name: String,
    description: Option<String>,
    rate: Decimal,
    computation: String,
    #[sqlx(rename = "type")]
    discount_type: String,
    scope: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    enabled: bool,
    created_by: Option<i64>,
    updated_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DiscountRow {
    fn into_discount(self) -> Result<Discount> {
        let computation = self
            .computation
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid computation in database: {}", e)))?;

        let discount_type = self
            .discount_type
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid discount type in database: {}", e)))?;

        let scope = self
            .scope
            .map(|s| s.parse())
            .transpose()
            .map_err(|e| AppError::Internal(format!("Invalid scope in database: {}", e)))?;

        Ok(Discount {
            id: self.id,
            company_id: self.company_id,
            name: self.name,
            description: self.description,
            rate: self.rate,
            computation,
            discount_type,
            scope,
            start_date: self.start_date,
            end_date: self.end_date,
            enabled: self.enabled,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
