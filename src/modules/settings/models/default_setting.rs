// Per-company default settings link.
//
// One row per company, pointing at the discount to fall back to when a
// document line does not specify one explicitly, chosen by document
// direction. The resolver re-validates the target on every read since the
// link can go stale after the discount is edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::discounts::models::DocumentDirection;

/// Company-wide default discount links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultSetting {
    /// Storage-assigned identifier (0 before insert)
    pub id: i64,

    /// Owning company; exactly one row per company
    pub company_id: i64,

    /// Default discount for sales documents
    pub sales_discount_id: Option<i64>,

    /// Default discount for purchase documents
    pub purchase_discount_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DefaultSetting {
    pub fn new(company_id: i64) -> Self {
        let now = Utc::now();

        Self {
            id: 0, // Will be set by database
            company_id,
            sales_discount_id: None,
            purchase_discount_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The configured default discount id for a document direction, if any
    pub fn discount_for(&self, direction: DocumentDirection) -> Option<i64> {
        match direction {
            DocumentDirection::Sale => self.sales_discount_id,
            DocumentDirection::Purchase => self.purchase_discount_id,
        }
    }
}

/// Request body for updating the default discount links.
///
/// Each field replaces the stored link outright; send null to clear one.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDefaultSettingRequest {
    pub sales_discount_id: Option<i64>,
    pub purchase_discount_id: Option<i64>,
}

/// Response DTO for the default settings
#[derive(Debug, Clone, Serialize)]
pub struct DefaultSettingResponse {
    pub sales_discount_id: Option<i64>,
    pub purchase_discount_id: Option<i64>,
}

impl From<DefaultSetting> for DefaultSettingResponse {
    fn from(setting: DefaultSetting) -> Self {
        DefaultSettingResponse {
            sales_discount_id: setting.sales_discount_id,
            purchase_discount_id: setting.purchase_discount_id,
        }
    }
}
