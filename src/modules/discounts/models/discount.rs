// Discount definition entity and its applicability gates.
//
// A discount belongs to exactly one company and is attached to catalog
// items or document line items, or offered as a company-wide default for
// sales/purchase documents. The entity stores the raw rate; interpretation
// (percentage vs. fixed amount) happens in the calculator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// How a discount's rate is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountComputation {
    /// Rate is a percentage of the base amount (0-100)
    Percentage,
    /// Rate is an absolute monetary amount
    Fixed,
}

impl Default for DiscountComputation {
    fn default() -> Self {
        DiscountComputation::Percentage
    }
}

impl std::fmt::Display for DiscountComputation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountComputation::Percentage => write!(f, "percentage"),
            DiscountComputation::Fixed => write!(f, "fixed"),
        }
    }
}

impl std::str::FromStr for DiscountComputation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountComputation::Percentage),
            "fixed" => Ok(DiscountComputation::Fixed),
            _ => Err(format!("Invalid discount computation: {}", s)),
        }
    }
}

/// Which document direction a discount may be offered as a default for.
///
/// Only gates default selection; a discount explicitly attached to a line
/// is not required to match its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Sales,
    Purchase,
    None,
}

impl Default for DiscountType {
    fn default() -> Self {
        DiscountType::Sales
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Sales => write!(f, "sales"),
            DiscountType::Purchase => write!(f, "purchase"),
            DiscountType::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sales" => Ok(DiscountType::Sales),
            "purchase" => Ok(DiscountType::Purchase),
            "none" => Ok(DiscountType::None),
            _ => Err(format!("Invalid discount type: {}", s)),
        }
    }
}

/// Nature of a catalog item or document line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemNature {
    Product,
    Service,
}

impl std::fmt::Display for ItemNature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemNature::Product => write!(f, "product"),
            ItemNature::Service => write!(f, "service"),
        }
    }
}

impl std::str::FromStr for ItemNature {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "product" => Ok(ItemNature::Product),
            "service" => Ok(ItemNature::Service),
            _ => Err(format!("Invalid item nature: {}", s)),
        }
    }
}

/// Direction of the document a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentDirection {
    Sale,
    Purchase,
}

impl std::fmt::Display for DocumentDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentDirection::Sale => write!(f, "sale"),
            DocumentDirection::Purchase => write!(f, "purchase"),
        }
    }
}

impl std::str::FromStr for DocumentDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sale" => Ok(DocumentDirection::Sale),
            "purchase" => Ok(DocumentDirection::Purchase),
            _ => Err(format!("Invalid document direction: {}", s)),
        }
    }
}

/// Represents a discount definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    /// Storage-assigned identifier (0 before insert)
    pub id: i64,

    /// Owning company; set once at creation, never mutated
    pub company_id: i64,

    /// Display name
    pub name: String,

    /// Display description, no computational role
    pub description: Option<String>,

    /// Raw rate, interpreted per `computation` (DECIMAL(15,4) in storage)
    pub rate: Decimal,

    /// How the rate is interpreted
    pub computation: DiscountComputation,

    /// Gates default selection per document direction
    #[serde(rename = "type")]
    pub discount_type: DiscountType,

    /// When set, restricts applicability to lines of this nature
    pub scope: Option<ItemNature>,

    /// Validity window start; absent means unbounded
    pub start_date: Option<DateTime<Utc>>,

    /// Validity window end; absent means unbounded
    pub end_date: Option<DateTime<Utc>>,

    /// A disabled discount is never resolvable, even if directly referenced
    pub enabled: bool,

    /// Opaque audit user references; resolved by the storage collaborator
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discount {
    /// Create a new discount with validation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        company_id: i64,
        name: String,
        description: Option<String>,
        rate: Decimal,
        computation: DiscountComputation,
        discount_type: DiscountType,
        scope: Option<ItemNature>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        Self::validate_name(&name)?;
        Self::validate_rate(rate, computation)?;
        Self::validate_window(start_date, end_date)?;

        let now = Utc::now();

        Ok(Self {
            id: 0, // Will be set by database
            company_id,
            name,
            description,
            rate,
            computation,
            discount_type,
            scope,
            start_date,
            end_date,
            enabled: true,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check whether the discount is enabled and `as_of` falls within the
    /// validity window. Both bounds are inclusive so same-instant windows
    /// stay usable; an absent bound is unbounded on that side.
    pub fn is_active_at(&self, as_of: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }

        if let Some(start) = self.start_date {
            if as_of < start {
                return false;
            }
        }

        if let Some(end) = self.end_date {
            if as_of > end {
                return false;
            }
        }

        true
    }

    /// Check whether the discount applies to a line of the given nature.
    ///
    /// An unset scope matches any line; a set scope is a restriction, not a
    /// hard binding requirement.
    pub fn matches_scope(&self, line_scope: ItemNature) -> bool {
        match self.scope {
            Some(scope) => scope == line_scope,
            None => true,
        }
    }

    /// Check whether the discount may be offered as a default for the given
    /// document direction. A `none`-typed discount is only reachable via
    /// explicit reference.
    pub fn allows_default_for(&self, direction: DocumentDirection) -> bool {
        match (self.discount_type, direction) {
            (DiscountType::Sales, DocumentDirection::Sale) => true,
            (DiscountType::Purchase, DocumentDirection::Purchase) => true,
            _ => false,
        }
    }

    // Validation methods

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Discount name cannot be empty"));
        }

        if name.len() > 255 {
            return Err(AppError::validation(
                "Discount name cannot exceed 255 characters",
            ));
        }

        Ok(())
    }

    fn validate_rate(rate: Decimal, computation: DiscountComputation) -> Result<()> {
        if rate < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Discount rate must be non-negative, got: {}",
                rate
            )));
        }

        if rate.normalize().scale() > 4 {
            return Err(AppError::validation(
                "Discount rate cannot have more than 4 decimal places",
            ));
        }

        // Percentage rates are clamped to a sane range at input time; the
        // calculator treats an out-of-range stored value as a data-integrity
        // failure rather than silently capping it.
        if computation == DiscountComputation::Percentage && rate > Decimal::from(100) {
            return Err(AppError::validation(format!(
                "Percentage discount rate cannot exceed 100, got: {}",
                rate
            )));
        }

        Ok(())
    }

    fn validate_window(
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(AppError::validation(
                    "Discount start date must not be after end date",
                ));
            }
        }

        Ok(())
    }
}

/// Request body for creating a discount
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiscountRequest {
    pub name: String,
    pub description: Option<String>,
    pub rate: Decimal,
    #[serde(default)]
    pub computation: DiscountComputation,
    #[serde(rename = "type", default)]
    pub discount_type: DiscountType,
    pub scope: Option<ItemNature>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Request body for updating a discount; absent fields are left unchanged
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDiscountRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rate: Option<Decimal>,
    pub computation: Option<DiscountComputation>,
    #[serde(rename = "type")]
    pub discount_type: Option<DiscountType>,
    pub scope: Option<ItemNature>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Response DTO for a discount
#[derive(Debug, Clone, Serialize)]
pub struct DiscountResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub rate: String,
    pub computation: DiscountComputation,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub scope: Option<ItemNature>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Discount> for DiscountResponse {
    fn from(discount: Discount) -> Self {
        DiscountResponse {
            id: discount.id,
            name: discount.name,
            description: discount.description,
            rate: discount.rate.to_string(),
            computation: discount.computation,
            discount_type: discount.discount_type,
            scope: discount.scope,
            start_date: discount.start_date.map(|d| d.to_rfc3339()),
            end_date: discount.end_date.map(|d| d.to_rfc3339()),
            enabled: discount.enabled,
            created_at: discount.created_at.to_rfc3339(),
            updated_at: discount.updated_at.to_rfc3339(),
        }
    }
}
