use std::sync::Arc;

use chrono::Utc;

use crate::core::error::AppError;
use crate::modules::discounts::models::{DiscountType, DocumentDirection};
use crate::modules::discounts::repositories::DiscountRepository;
use crate::modules::settings::models::{
    DefaultSetting, DefaultSettingResponse, UpdateDefaultSettingRequest,
};
use crate::modules::settings::repositories::DefaultSettingRepository;

/// Service for the company's default discount links
pub struct DefaultSettingService {
    default_setting_repo: Arc<dyn DefaultSettingRepository>,
    discount_repo: Arc<dyn DiscountRepository>,
}

impl DefaultSettingService {
    pub fn new(
        default_setting_repo: Arc<dyn DefaultSettingRepository>,
        discount_repo: Arc<dyn DiscountRepository>,
    ) -> Self {
        Self {
            default_setting_repo,
            discount_repo,
        }
    }

    /// Get the company's default discount links; a company with no row yet
    /// simply has nothing configured.
    pub async fn get_defaults(&self, company_id: i64) -> Result<DefaultSettingResponse, AppError> {
        let setting = self
            .default_setting_repo
            .find_for_company(company_id)
            .await?
            .unwrap_or_else(|| DefaultSetting::new(company_id));

        Ok(setting.into())
    }

    /// Replace the company's default discount links.
    ///
    /// Each referenced discount must exist in the company and carry the
    /// direction-compatible type; a `none`-typed discount can never be a
    /// default. The resolver still re-checks on read, since a discount's
    /// type can change after the link is written.
    pub async fn update_defaults(
        &self,
        request: UpdateDefaultSettingRequest,
        company_id: i64,
    ) -> Result<DefaultSettingResponse, AppError> {
        if let Some(id) = request.sales_discount_id {
            self.validate_link(id, company_id, DocumentDirection::Sale)
                .await?;
        }

        if let Some(id) = request.purchase_discount_id {
            self.validate_link(id, company_id, DocumentDirection::Purchase)
                .await?;
        }

        let mut setting = self
            .default_setting_repo
            .find_for_company(company_id)
            .await?
            .unwrap_or_else(|| DefaultSetting::new(company_id));

        setting.sales_discount_id = request.sales_discount_id;
        setting.purchase_discount_id = request.purchase_discount_id;
        setting.updated_at = Utc::now();

        let saved = self.default_setting_repo.upsert(&setting).await?;

        tracing::info!(
            company_id = company_id,
            sales_discount_id = ?saved.sales_discount_id,
            purchase_discount_id = ?saved.purchase_discount_id,
            "Updated default discount links"
        );

        Ok(saved.into())
    }

    async fn validate_link(
        &self,
        discount_id: i64,
        company_id: i64,
        direction: DocumentDirection,
    ) -> Result<(), AppError> {
        let discount = self
            .discount_repo
            .find_by_id(discount_id, company_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Discount with id '{}' not found", discount_id))
            })?;

        let required_type = match direction {
            DocumentDirection::Sale => DiscountType::Sales,
            DocumentDirection::Purchase => DiscountType::Purchase,
        };

        if discount.discount_type != required_type {
            return Err(AppError::Validation(format!(
                "Discount '{}' has type '{}' and cannot be the {} default",
                discount.name, discount.discount_type, direction
            )));
        }

        Ok(())
    }
}
