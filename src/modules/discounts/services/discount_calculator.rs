use rust_decimal::Decimal;

use crate::core::error::AppError;
use crate::core::Currency;
use crate::modules::discounts::models::{Discount, DiscountComputation};

/// DiscountCalculator turns a resolved discount and a base amount into the
/// monetary amount to subtract, rounded to the currency's minor unit.
///
/// The caller subtracts the result from the line total itself; returning the
/// adjustment rather than the post-discount total keeps composition with tax
/// and other adjustments explicit.
pub struct DiscountCalculator;

impl DiscountCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute the discount amount for a base amount.
    ///
    /// No resolved discount means zero; a fixed discount is clamped to the
    /// base amount so over-discounting never produces a negative total.
    pub fn apply(
        &self,
        discount: Option<&Discount>,
        base_amount: Decimal,
        currency: Currency,
    ) -> Result<Decimal, AppError> {
        let Some(discount) = discount else {
            return Ok(Decimal::ZERO);
        };

        if base_amount < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "Base amount must be non-negative, got: {}",
                base_amount
            )));
        }

        let amount = match discount.computation {
            DiscountComputation::Fixed => {
                self.validate_fixed_rate(discount.rate)?;
                discount.rate.min(base_amount)
            }
            DiscountComputation::Percentage => {
                self.validate_percentage_rate(discount.rate)?;
                base_amount * discount.rate / Decimal::from(100)
            }
        };

        Ok(currency.round(amount))
    }

    /// Validate a fixed-amount rate: non-negative.
    fn validate_fixed_rate(&self, rate: Decimal) -> Result<(), AppError> {
        if rate < Decimal::ZERO {
            return Err(AppError::InvalidRate(format!(
                "Fixed discount rate cannot be negative, got: {}",
                rate
            )));
        }

        Ok(())
    }

    /// Validate a percentage rate is within [0, 100].
    ///
    /// An out-of-range stored rate is a data-integrity problem upstream; it
    /// fails the calculation instead of being silently capped.
    pub fn validate_percentage_rate(&self, rate: Decimal) -> Result<(), AppError> {
        if rate < Decimal::ZERO {
            return Err(AppError::InvalidRate(format!(
                "Percentage discount rate cannot be negative, got: {}",
                rate
            )));
        }

        if rate > Decimal::from(100) {
            return Err(AppError::InvalidRate(format!(
                "Percentage discount rate cannot exceed 100, got: {}",
                rate
            )));
        }

        Ok(())
    }
}

impl Default for DiscountCalculator {
    fn default() -> Self {
        Self::new()
    }
}
