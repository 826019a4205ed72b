//! Discount Fixtures

use jiff::Timestamp;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    discounts::{AppliesTo, CustomerEligibility, Discount, DiscountKind, MinimumRequirement},
    fixtures::{
        FixtureError,
        products::{parse_money, parse_percentage},
    },
    ids::{DiscountId, IdList},
};

/// Wrapper for discounts in YAML
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Discounts
    pub discounts: Vec<DiscountFixture>,
}

/// Discount type in YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTypeFixture {
    /// Percentage off, `value` is e.g. `"10%"`
    Percentage,

    /// Fixed amount off, `value` is in major units of the catalog currency
    FixedAmount,

    /// Free shipping, no `value`
    FreeShipping,

    /// Buy X get Y, no `value`
    BuyXGetY,
}

/// Discount scope in YAML
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesToFixture {
    /// Whole order
    #[default]
    EntireOrder,

    /// Products listed in `applicable_objects`
    SpecificProducts,

    /// Collections listed in `applicable_objects`
    SpecificCollections,
}

/// Minimum requirement kind in YAML
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumFixture {
    /// No minimum
    #[default]
    None,

    /// Subtotal of at least `minimum_requirement_value`
    MinimumAmount,

    /// At least `minimum_requirement_value` items
    MinimumQuantity,
}

/// Customer eligibility kind in YAML
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityFixture {
    /// Anyone
    #[default]
    Everyone,

    /// Customers listed in `eligible_objects`
    SpecificCustomers,

    /// Customer groups listed in `eligible_objects`
    SpecificGroups,
}

/// Discount Fixture
#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    /// Discount id
    pub id: DiscountId,

    /// Discount code
    pub handle: String,

    /// Discount type
    #[serde(rename = "type")]
    pub kind: DiscountTypeFixture,

    /// Percentage or amount, depending on `type`
    #[serde(default)]
    pub value: Option<String>,

    /// Scope
    #[serde(default)]
    pub applies_to: AppliesToFixture,

    /// Comma-delimited product or collection ids
    #[serde(default)]
    pub applicable_objects: String,

    /// Minimum requirement kind
    #[serde(default)]
    pub minimum_requirement: MinimumFixture,

    /// Amount in major units, or an item count
    #[serde(default)]
    pub minimum_requirement_value: Option<String>,

    /// Eligibility kind
    #[serde(default)]
    pub customer_eligibility: EligibilityFixture,

    /// Comma-delimited customer or group ids
    #[serde(default)]
    pub eligible_objects: String,

    /// Start of the active window
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// End of the active window
    #[serde(default)]
    pub ends_at: Option<Timestamp>,

    /// Active flag
    #[serde(default = "active_default")]
    pub active: bool,

    /// Usage limit, `0` for unlimited
    #[serde(default)]
    pub max_times_used: u32,

    /// One use per customer
    #[serde(default)]
    pub one_use_per_customer: bool,

    /// Times already used
    #[serde(default)]
    pub times_used: u32,
}

fn active_default() -> bool {
    true
}

impl DiscountFixture {
    /// Convert into a [`Discount`] whose amounts are in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a value is missing or malformed.
    pub fn try_into_discount(
        self,
        currency: &'static Currency,
    ) -> Result<Discount<'static>, FixtureError> {
        let kind = match self.kind {
            DiscountTypeFixture::Percentage => {
                DiscountKind::Percentage(parse_percentage(self.required_value()?)?)
            }
            DiscountTypeFixture::FixedAmount => {
                DiscountKind::FixedAmount(parse_money(self.required_value()?, currency)?)
            }
            DiscountTypeFixture::FreeShipping => DiscountKind::FreeShipping,
            DiscountTypeFixture::BuyXGetY => DiscountKind::BuyXGetY,
        };

        let applies_to = match self.applies_to {
            AppliesToFixture::EntireOrder => AppliesTo::EntireOrder,
            AppliesToFixture::SpecificProducts => {
                AppliesTo::SpecificProducts(IdList::parse(&self.applicable_objects)?)
            }
            AppliesToFixture::SpecificCollections => {
                AppliesTo::SpecificCollections(IdList::parse(&self.applicable_objects)?)
            }
        };

        let minimum = match self.minimum_requirement {
            MinimumFixture::None => MinimumRequirement::None,
            MinimumFixture::MinimumAmount => {
                MinimumRequirement::MinimumAmount(parse_money(self.required_minimum()?, currency)?)
            }
            MinimumFixture::MinimumQuantity => {
                let value = self.required_minimum()?;
                let count = value
                    .trim()
                    .parse()
                    .map_err(|_err| FixtureError::InvalidAmount(value.to_string()))?;

                MinimumRequirement::MinimumQuantity(count)
            }
        };

        let eligibility = match self.customer_eligibility {
            EligibilityFixture::Everyone => CustomerEligibility::Everyone,
            EligibilityFixture::SpecificCustomers => {
                CustomerEligibility::SpecificCustomers(IdList::parse(&self.eligible_objects)?)
            }
            EligibilityFixture::SpecificGroups => {
                CustomerEligibility::SpecificGroups(IdList::parse(&self.eligible_objects)?)
            }
        };

        let mut discount = Discount::new(self.id, self.handle, kind)
            .with_applies_to(applies_to)
            .with_minimum(minimum)
            .with_eligibility(eligibility)
            .with_active(self.active)
            .with_schedule(self.starts_at.unwrap_or(Timestamp::UNIX_EPOCH), self.ends_at)
            .with_usage_limit(self.max_times_used, self.one_use_per_customer);

        discount.usage.times_used = self.times_used;

        Ok(discount)
    }

    fn required_value(&self) -> Result<&str, FixtureError> {
        self.value
            .as_deref()
            .ok_or_else(|| FixtureError::MissingValue(format!("discount {} value", self.id)))
    }

    fn required_minimum(&self) -> Result<&str, FixtureError> {
        self.minimum_requirement_value.as_deref().ok_or_else(|| {
            FixtureError::MissingValue(format!("discount {} minimum requirement", self.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::RUB};
    use testresult::TestResult;

    use super::*;
    use crate::ids::ProductId;

    #[test]
    fn percentage_discount_on_products() -> TestResult {
        let fixture: DiscountFixture = serde_norway::from_str(
            "id: 1\nhandle: STICKERS10\ntype: percentage\nvalue: 10%\napplies_to: specific_products\napplicable_objects: '1, 2'\nminimum_requirement: minimum_quantity\nminimum_requirement_value: '2'\n",
        )?;

        let discount = fixture.try_into_discount(RUB)?;

        assert!(matches!(discount.kind, DiscountKind::Percentage(_)));
        assert!(
            matches!(&discount.applies_to, AppliesTo::SpecificProducts(ids) if ids.contains(ProductId::new(2)))
        );
        assert_eq!(discount.minimum, MinimumRequirement::MinimumQuantity(2));
        assert!(discount.active);

        Ok(())
    }

    #[test]
    fn fixed_amount_uses_catalog_currency() -> TestResult {
        let fixture: DiscountFixture = serde_norway::from_str(
            "id: 2\nhandle: MINUS100\ntype: fixed_amount\nvalue: '100'\nminimum_requirement: minimum_amount\nminimum_requirement_value: '500'\n",
        )?;

        let discount = fixture.try_into_discount(RUB)?;

        assert_eq!(
            discount.kind,
            DiscountKind::FixedAmount(Money::from_minor(10_000, RUB))
        );
        assert_eq!(
            discount.minimum,
            MinimumRequirement::MinimumAmount(Money::from_minor(50_000, RUB))
        );

        Ok(())
    }

    #[test]
    fn missing_value_is_an_error() -> TestResult {
        let fixture: DiscountFixture =
            serde_norway::from_str("id: 3\nhandle: BROKEN\ntype: percentage\n")?;

        assert!(matches!(
            fixture.try_into_discount(RUB),
            Err(FixtureError::MissingValue(_))
        ));

        Ok(())
    }
}
