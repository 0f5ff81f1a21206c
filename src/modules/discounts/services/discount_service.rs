use std::sync::Arc;

use chrono::Utc;

use crate::core::error::AppError;
use crate::modules::discounts::models::{
    CreateDiscountRequest, Discount, DiscountResponse, UpdateDiscountRequest,
};
use crate::modules::discounts::repositories::DiscountRepository;

/// Service for discount administration
pub struct DiscountService {
    discount_repo: Arc<dyn DiscountRepository>,
}

impl DiscountService {
    pub fn new(discount_repo: Arc<dyn DiscountRepository>) -> Self {
        Self { discount_repo }
    }

    /// Create a new discount for the company
    pub async fn create_discount(
        &self,
        request: CreateDiscountRequest,
        company_id: i64,
        acting_user_id: Option<i64>,
    ) -> Result<DiscountResponse, AppError> {
        let mut discount = Discount::new(
            company_id,
            request.name,
            request.description,
            request.rate,
            request.computation,
            request.discount_type,
            request.scope,
            request.start_date,
            request.end_date,
        )?;

        discount.created_by = acting_user_id;
        discount.updated_by = acting_user_id;

        let created = self.discount_repo.create(&discount).await?;

        tracing::info!(
            company_id = company_id,
            discount_id = created.id,
            "Created discount"
        );

        Ok(created.into())
    }

    /// Get a discount by id
    pub async fn get_discount(
        &self,
        id: i64,
        company_id: i64,
    ) -> Result<DiscountResponse, AppError> {
        let discount = self
            .discount_repo
            .find_by_id(id, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Discount with id '{}' not found", id)))?;

        Ok(discount.into())
    }

    /// List the company's discounts
    pub async fn list_discounts(
        &self,
        company_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DiscountResponse>, AppError> {
        let discounts = self.discount_repo.list(company_id, limit, offset).await?;

        Ok(discounts.into_iter().map(Into::into).collect())
    }

    /// Update an existing discount; absent request fields are left unchanged.
    ///
    /// The merged state goes through full entity validation again, so an edit
    /// can never produce an invalid stored discount.
    pub async fn update_discount(
        &self,
        id: i64,
        request: UpdateDiscountRequest,
        company_id: i64,
        acting_user_id: Option<i64>,
    ) -> Result<DiscountResponse, AppError> {
        let existing = self
            .discount_repo
            .find_by_id(id, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Discount with id '{}' not found", id)))?;

        let mut updated = Discount::new(
            existing.company_id,
            request.name.unwrap_or(existing.name),
            request.description.or(existing.description),
            request.rate.unwrap_or(existing.rate),
            request.computation.unwrap_or(existing.computation),
            request.discount_type.unwrap_or(existing.discount_type),
            request.scope.or(existing.scope),
            request.start_date.or(existing.start_date),
            request.end_date.or(existing.end_date),
        )?;

        updated.id = existing.id;
        updated.enabled = existing.enabled;
        updated.created_by = existing.created_by;
        updated.created_at = existing.created_at;
        updated.updated_by = acting_user_id;
        updated.updated_at = Utc::now();

        self.discount_repo.update(&updated).await?;

        Ok(updated.into())
    }

    /// Enable or disable a discount.
    ///
    /// Disabling is the normal decommission path for a discount that is
    /// still referenced by items or document lines.
    pub async fn set_enabled(
        &self,
        id: i64,
        company_id: i64,
        enabled: bool,
        acting_user_id: Option<i64>,
    ) -> Result<DiscountResponse, AppError> {
        self.discount_repo
            .set_enabled(id, company_id, enabled, acting_user_id)
            .await?;

        tracing::info!(
            company_id = company_id,
            discount_id = id,
            enabled = enabled,
            "Toggled discount"
        );

        self.get_discount(id, company_id).await
    }

    /// Hard-delete a discount that nothing references anymore
    pub async fn delete_discount(&self, id: i64, company_id: i64) -> Result<(), AppError> {
        if self.discount_repo.is_referenced(id, company_id).await? {
            return Err(AppError::Validation(
                "Discount is still referenced by items or document lines; disable it instead"
                    .to_string(),
            ));
        }

        self.discount_repo.delete(id, company_id).await?;

        tracing::info!(
            company_id = company_id,
            discount_id = id,
            "Deleted discount"
        );

        Ok(())
    }
}
