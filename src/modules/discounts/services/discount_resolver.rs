use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::error::AppError;
use crate::modules::discounts::models::{Discount, DocumentDirection, ItemNature};
use crate::modules::discounts::repositories::DiscountRepository;
use crate::modules::settings::repositories::DefaultSettingRepository;

/// DiscountResolver decides which discount, if any, is in effect for a
/// document line.
///
/// An explicit reference that does not exist in the caller's company is a
/// hard failure; an explicit reference that exists but is disabled, expired,
/// or scope-mismatched simply yields no discount. Company defaults degrade
/// gracefully on every failure so a stale default never blocks document
/// creation.
pub struct DiscountResolver {
    discount_repo: Arc<dyn DiscountRepository>,
    default_setting_repo: Arc<dyn DefaultSettingRepository>,
}

impl DiscountResolver {
    pub fn new(
        discount_repo: Arc<dyn DiscountRepository>,
        default_setting_repo: Arc<dyn DefaultSettingRepository>,
    ) -> Self {
        Self {
            discount_repo,
            default_setting_repo,
        }
    }

    /// Resolve the effective discount for a document line.
    ///
    /// `as_of` is normally "now" or the document's effective date.
    pub async fn resolve(
        &self,
        company_id: i64,
        explicit_discount_id: Option<i64>,
        line_scope: ItemNature,
        direction: DocumentDirection,
        as_of: DateTime<Utc>,
    ) -> Result<Option<Discount>, AppError> {
        if let Some(discount_id) = explicit_discount_id {
            // A line cannot reference a discount that does not exist in the
            // caller's company; cross-tenant ids are indistinguishable from
            // missing ones.
            let discount = self
                .discount_repo
                .find_by_id(discount_id, company_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Discount with id '{}' not found", discount_id))
                })?;

            return Ok(Self::applicable(discount, line_scope, as_of));
        }

        // No explicit reference: fall back to the single configured default
        // for the document direction. There is no best-rate search and no
        // stacking beyond this one link.
        let Some(settings) = self.default_setting_repo.find_for_company(company_id).await? else {
            return Ok(None);
        };

        let Some(default_id) = settings.discount_for(direction) else {
            return Ok(None);
        };

        // A stale link (discount deleted since it was configured) is not an
        // error for defaulting.
        let Some(discount) = self.discount_repo.find_by_id(default_id, company_id).await? else {
            tracing::warn!(
                company_id = company_id,
                discount_id = default_id,
                "Default discount link points at a missing discount"
            );
            return Ok(None);
        };

        // The link is only ever written with a direction-compatible discount,
        // but the type can change after being set; re-check rather than trust
        // the link. This also keeps none-typed discounts out of defaulting.
        if !discount.allows_default_for(direction) {
            tracing::warn!(
                company_id = company_id,
                discount_id = default_id,
                discount_type = %discount.discount_type,
                direction = %direction,
                "Default discount link is stale for its direction"
            );
            return Ok(None);
        }

        Ok(Self::applicable(discount, line_scope, as_of))
    }

    /// Apply the enabled/validity/scope gates shared by both resolution
    /// paths. Inapplicability is a normal outcome, not an error.
    fn applicable(
        discount: Discount,
        line_scope: ItemNature,
        as_of: DateTime<Utc>,
    ) -> Option<Discount> {
        if !discount.is_active_at(as_of) {
            return None;
        }

        if !discount.matches_scope(line_scope) {
            return None;
        }

        Some(discount)
    }
}
