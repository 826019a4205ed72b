//! Pricing
//!
//! Money arithmetic shared by orders and the discount calculator. Amounts stay in one currency;
//! percentages are applied in decimal space and rounded once to the currency's minor unit,
//! midpoint away from zero.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors that can occur while pricing lines and discounts.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line total or sum did not fit in minor units.
    #[error("amount overflowed minor units")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Price of `quantity` units at `unit_price`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the result does not fit in minor units.
pub fn line_total<'a>(
    unit_price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Sum a list of amounts, starting from zero in `currency`.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if an amount is in a different currency.
pub fn total_price<'a>(
    amounts: impl IntoIterator<Item = Money<'a, Currency>>,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    let total = amounts
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| acc.add(amount))?;

    Ok(total)
}

/// Calculate `percent` of an amount, rounded to minor units.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result cannot be represented.
pub fn percent_of<'a>(
    amount: &Money<'a, Currency>,
    percent: &Percentage,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = percent_of_minor(percent, amount.to_minor_units())?;

    Ok(Money::from_minor(minor, amount.currency()))
}

/// Calculate a percentage of a minor unit amount, rounded midpoint away from zero.
pub(crate) fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let factor = *percent * Decimal::ONE;

    let Some(applied) = factor.checked_mul(Decimal::from(minor)) else {
        return Err(PricingError::PercentConversion);
    };

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let Some(rounded) = rounded.to_i64() else {
        return Err(PricingError::PercentConversion);
    };

    Ok(rounded)
}

/// Converts a fractional percentage (`0.25`) to percent points (`25`) for display.
pub fn percent_points(percent: &Percentage) -> Decimal {
    (*percent * Decimal::ONE * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize()
}
