//! Product Fixtures

use std::str::FromStr;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    ids::{ProductId, ProductTypeId},
    products::{Product, ProductType},
    tags::string::StringTagCollection,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products, in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product type in YAML
#[derive(Debug, Deserialize)]
pub struct ProductTypeFixture {
    /// Product type id
    pub id: ProductTypeId,

    /// Product type handle
    pub handle: String,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: ProductId,

    /// Product title
    pub title: String,

    /// URL handle; derived from the title when absent
    #[serde(default)]
    pub handle: Option<String>,

    /// Vendor
    #[serde(default)]
    pub vendor: String,

    /// Product type
    #[serde(rename = "type")]
    pub product_type: ProductTypeFixture,

    /// Comma-delimited tags (e.g. `"sticker, decal"`)
    #[serde(default)]
    pub tags: String,

    /// Product price (e.g., "250.00 RUB")
    pub price: String,

    /// Weight (e.g. `"0.5"`)
    #[serde(default)]
    pub weight: Option<String>,

    /// Quantity on hand; `-1` when untracked
    #[serde(default)]
    pub quantity: i64,

    /// Published flag
    #[serde(default = "published_default")]
    pub published: bool,
}

fn published_default() -> bool {
    true
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;
        let price = Money::from_minor(minor_units, currency);

        let weight = fixture
            .weight
            .as_deref()
            .map(parse_decimal)
            .transpose()?
            .unwrap_or(Decimal::ZERO);

        let mut product = Product::new(
            fixture.id,
            fixture.title,
            ProductType::new(fixture.product_type.id, fixture.product_type.handle),
            price,
        )
        .with_vendor(fixture.vendor)
        .with_weight(weight)
        .with_quantity(fixture.quantity);

        product.tags = StringTagCollection::parse_delimited(&fixture.tags);
        product.published = fixture.published;

        if let Some(handle) = fixture.handle {
            product.handle = handle;
        }

        Ok(product)
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount cannot
/// be parsed as a decimal, or if the currency code is not an ISO 4217 code.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = iso::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    let minor_units = parse_amount(amount, currency)
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse an amount in major units (e.g. "1001.50") into minor units of `currency`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidAmount`] if the amount is not a decimal, is finer than the
/// currency's minor unit, or does not fit.
pub fn parse_amount(s: &str, currency: &Currency) -> Result<i64, FixtureError> {
    let amount = parse_decimal(s)?;

    10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .filter(|value| value.fract().is_zero())
        .and_then(|value| value.to_i64())
        .ok_or_else(|| FixtureError::InvalidAmount(s.to_string()))
}

/// Parse an amount in major units into [`Money`].
///
/// # Errors
///
/// Returns [`FixtureError::InvalidAmount`] if the amount is not a decimal or does not fit.
pub fn parse_money<'a>(s: &str, currency: &'a Currency) -> Result<Money<'a, Currency>, FixtureError> {
    Ok(Money::from_minor(parse_amount(s, currency)?, currency))
}

/// Parse a decimal string.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidAmount`] if the string is not a decimal.
pub fn parse_decimal(s: &str) -> Result<Decimal, FixtureError> {
    Decimal::from_str(s.trim()).map_err(|_err| FixtureError::InvalidAmount(s.to_string()))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        Decimal::from_str(percent_str.trim())
            .ok()
            .and_then(|points| points.checked_div(Decimal::ONE_HUNDRED))
    } else {
        Decimal::from_str(trimmed).ok()
    };

    fraction
        .map(Percentage::from)
        .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, JPY, RUB};

    use crate::tags::collection::TagCollection;

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99RUB");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_any_iso_currency() -> Result<(), FixtureError> {
        let (rub_minor, rub) = parse_price("250.00 RUB")?;
        let (eur_minor, eur) = parse_price("2.50 EUR")?;

        assert_eq!(rub_minor, 25_000);
        assert_eq!(rub, RUB);
        assert_eq!(eur_minor, 250);
        assert_eq!(eur, EUR);

        Ok(())
    }

    #[test]
    fn parse_amount_uses_currency_exponent() -> Result<(), FixtureError> {
        assert_eq!(parse_amount("1001", RUB)?, 100_100);
        assert_eq!(parse_amount("500", JPY)?, 500);

        Ok(())
    }

    #[test]
    fn parse_amount_rejects_fractions_of_a_minor_unit() -> Result<(), FixtureError> {
        assert_eq!(parse_amount("1.50", RUB)?, 150);
        assert_eq!(parse_amount("1.500", RUB)?, 150);

        assert!(matches!(
            parse_amount("1.005", RUB),
            Err(FixtureError::InvalidAmount(ref amount)) if amount == "1.005"
        ));
        assert!(matches!(
            parse_amount("9.5", JPY),
            Err(FixtureError::InvalidAmount(_))
        ));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("15%")?, parse_percentage("0.15")?);
        assert!(parse_percentage("lots").is_err());

        Ok(())
    }

    #[test]
    fn product_fixture_converts() -> Result<(), FixtureError> {
        let fixture: ProductFixture = serde_norway::from_str(
            "id: 4\ntitle: Sticker Star\ntype: { id: 1, handle: stickers }\ntags: 'sticker, decal'\nprice: 250.00 RUB\nweight: '0.1'\nquantity: -1\n",
        )?;

        let product = Product::try_from(fixture)?;

        assert_eq!(product.id, ProductId::new(4));
        assert_eq!(product.handle, "sticker_star");
        assert_eq!(product.tags.iter().collect::<Vec<_>>(), ["decal", "sticker"]);
        assert_eq!(product.price, Money::from_minor(25_000, RUB));
        assert!(!product.tracks_stock());

        Ok(())
    }
}
