//! Discount Calculator
//!
//! Evaluates the discounts attached to an order in attachment order and sums their
//! contributions. Each discount goes through the same gates: activity, customer eligibility,
//! minimum requirement, then scope. Free shipping is waived at most once per order no matter
//! how many discounts grant it.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use tracing::{debug, debug_span, warn};

use crate::{
    catalog::Catalog,
    discounts::{
        AppliesTo, CustomerEligibility, Discount, DiscountError, DiscountKind,
        MinimumRequirement, UnsupportedFeature,
    },
    ids::DiscountId,
    orders::{Order, PricedLine},
    pricing::{percent_of, total_price},
    tags::collection::TagCollection,
};

/// What to do with a discount that needs an unsupported feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedPolicy {
    /// Report it in the breakdown, log a warning and contribute nothing
    #[default]
    Skip,

    /// Fail the calculation
    Reject,
}

/// Why a discount contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The discount is switched off
    Inactive,

    /// The order's customer is not eligible
    NotEligible,

    /// The order does not reach the minimum requirement
    MinimumNotMet,

    /// The discount needs a feature that is not implemented
    Unsupported(UnsupportedFeature),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => f.write_str("inactive"),
            Self::NotEligible => f.write_str("customer not eligible"),
            Self::MinimumNotMet => f.write_str("minimum not met"),
            Self::Unsupported(feature) => write!(f, "unsupported: {feature}"),
        }
    }
}

/// Result of evaluating one discount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscountOutcome<'a> {
    /// The discount contributed this amount (possibly zero)
    Applied(Money<'a, Currency>),

    /// The discount contributed nothing
    Skipped(SkipReason),
}

/// One attached discount and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountLine<'a> {
    /// Discount identifier
    pub discount: DiscountId,

    /// Discount code
    pub handle: String,

    /// What it contributed
    pub outcome: DiscountOutcome<'a>,
}

/// Per-discount outcomes and their sum.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountBreakdown<'a> {
    /// Outcomes, in attachment order
    pub lines: Vec<DiscountLine<'a>>,

    /// Sum of applied amounts
    pub total: Money<'a, Currency>,

    /// Whether a free-shipping discount waived the shipping cost
    pub shipping_waived: bool,
}

impl<'a> DiscountBreakdown<'a> {
    /// Discounts that applied, with their amounts.
    pub fn applied(&self) -> impl Iterator<Item = (&DiscountLine<'a>, Money<'a, Currency>)> {
        self.lines.iter().filter_map(|line| match line.outcome {
            DiscountOutcome::Applied(amount) => Some((line, amount)),
            DiscountOutcome::Skipped(_) => None,
        })
    }

    /// Discounts that were skipped, with the reason.
    pub fn skipped(&self) -> impl Iterator<Item = (&DiscountLine<'a>, SkipReason)> {
        self.lines.iter().filter_map(|line| match line.outcome {
            DiscountOutcome::Skipped(reason) => Some((line, reason)),
            DiscountOutcome::Applied(_) => None,
        })
    }
}

/// Money totals derived for an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Shipping cost
    pub shipping: Money<'a, Currency>,

    /// Total discount
    pub discount: Money<'a, Currency>,

    /// Subtotal minus discount
    pub discounted_subtotal: Money<'a, Currency>,

    /// Subtotal plus shipping minus discount
    pub total: Money<'a, Currency>,

    /// Sum of payments
    pub paid: Money<'a, Currency>,

    /// Total minus paid
    pub balance_due: Money<'a, Currency>,

    /// How the discount was reached
    pub breakdown: DiscountBreakdown<'a>,
}

/// Applies an order's discounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountCalculator {
    unsupported: UnsupportedPolicy,
}

struct OrderFacts<'l, 'c, 'a, T: TagCollection> {
    lines: &'l [PricedLine<'c, 'a, T>],
    subtotal: Money<'a, Currency>,
    item_count: u64,
}

impl<'l, 'c, 'a, T: TagCollection> OrderFacts<'l, 'c, 'a, T> {
    fn new(order: &Order<'a>, lines: &'l [PricedLine<'c, 'a, T>]) -> Result<Self, DiscountError> {
        Ok(Self {
            lines,
            subtotal: total_price(lines.iter().map(|line| line.total), order.currency())?,
            item_count: order.item_count(),
        })
    }
}

impl DiscountCalculator {
    /// Create a calculator with the given policy for unsupported features.
    pub fn new(unsupported: UnsupportedPolicy) -> Self {
        Self { unsupported }
    }

    /// Policy for unsupported features.
    pub fn unsupported_policy(&self) -> UnsupportedPolicy {
        self.unsupported
    }

    /// Evaluate every discount attached to `order`.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if a line cannot be priced, an amount is in the wrong
    /// currency, or a discount needs an unsupported feature under [`UnsupportedPolicy::Reject`].
    pub fn compute<'a, T: TagCollection>(
        &self,
        order: &Order<'a>,
        catalog: &Catalog<'a, T>,
    ) -> Result<DiscountBreakdown<'a>, DiscountError> {
        let lines = order.priced_lines(catalog)?;

        self.compute_priced(order, &lines)
    }

    /// Like [`Self::compute`], for lines the caller already priced.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if an amount is in the wrong currency, or a discount needs an
    /// unsupported feature under [`UnsupportedPolicy::Reject`].
    pub fn compute_priced<'a, T: TagCollection>(
        &self,
        order: &Order<'a>,
        lines: &[PricedLine<'_, 'a, T>],
    ) -> Result<DiscountBreakdown<'a>, DiscountError> {
        self.apply(order, &OrderFacts::new(order, lines)?)
    }

    /// Derive every money total for `order`.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] under the same conditions as [`Self::compute`], or if
    /// payments cannot be summed.
    pub fn totals<'a, T: TagCollection>(
        &self,
        order: &Order<'a>,
        catalog: &Catalog<'a, T>,
    ) -> Result<OrderTotals<'a>, DiscountError> {
        let lines = order.priced_lines(catalog)?;

        self.totals_priced(order, &lines)
    }

    /// Like [`Self::totals`], for lines the caller already priced.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] under the same conditions as [`Self::compute_priced`], or if
    /// payments cannot be summed.
    pub fn totals_priced<'a, T: TagCollection>(
        &self,
        order: &Order<'a>,
        lines: &[PricedLine<'_, 'a, T>],
    ) -> Result<OrderTotals<'a>, DiscountError> {
        let facts = OrderFacts::new(order, lines)?;
        let breakdown = self.apply(order, &facts)?;
        let subtotal = facts.subtotal;
        let shipping = order.shipping_cost;
        let discount = breakdown.total;
        let total = subtotal.add(shipping)?.sub(discount)?;
        let paid = order.amount_paid()?;

        Ok(OrderTotals {
            subtotal,
            shipping,
            discount,
            discounted_subtotal: subtotal.sub(discount)?,
            total,
            paid,
            balance_due: total.sub(paid)?,
            breakdown,
        })
    }

    fn apply<'a, T: TagCollection>(
        &self,
        order: &Order<'a>,
        facts: &OrderFacts<'_, '_, 'a, T>,
    ) -> Result<DiscountBreakdown<'a>, DiscountError> {
        let _span = debug_span!("compute_discounts", order = %order.id).entered();

        let mut shipping_waived = false;
        let mut total = Money::from_minor(0, order.currency());
        let mut breakdown = Vec::with_capacity(order.discounts().len());

        for discount in order.discounts() {
            let outcome = self.evaluate(discount, order, facts, &mut shipping_waived)?;

            debug!(
                discount = %discount.id,
                handle = %discount.handle,
                outcome = ?outcome,
                "discount evaluated"
            );

            if let DiscountOutcome::Applied(amount) = outcome {
                total = total.add(amount)?;
            }

            breakdown.push(DiscountLine {
                discount: discount.id,
                handle: discount.handle.clone(),
                outcome,
            });
        }

        Ok(DiscountBreakdown {
            lines: breakdown,
            total,
            shipping_waived,
        })
    }

    fn evaluate<'a, T: TagCollection>(
        &self,
        discount: &Discount<'a>,
        order: &Order<'a>,
        facts: &OrderFacts<'_, '_, 'a, T>,
        shipping_waived: &mut bool,
    ) -> Result<DiscountOutcome<'a>, DiscountError> {
        if !discount.active {
            return Ok(DiscountOutcome::Skipped(SkipReason::Inactive));
        }

        match &discount.eligibility {
            CustomerEligibility::Everyone => {}
            CustomerEligibility::SpecificCustomers(customers) => {
                if !customers.contains(order.customer) {
                    return Ok(DiscountOutcome::Skipped(SkipReason::NotEligible));
                }
            }
            CustomerEligibility::SpecificGroups(_) => {
                return self.unsupported(discount, UnsupportedFeature::CustomerGroups);
            }
        }

        if !Self::meets_minimum(discount, order, facts)? {
            return Ok(DiscountOutcome::Skipped(SkipReason::MinimumNotMet));
        }

        if matches!(discount.kind, DiscountKind::BuyXGetY) {
            return self.unsupported(discount, UnsupportedFeature::BuyXGetY);
        }

        let zero = Money::from_minor(0, order.currency());

        let amount = match &discount.applies_to {
            AppliesTo::EntireOrder => match &discount.kind {
                DiscountKind::Percentage(percent) => percent_of(&facts.subtotal, percent)?,
                DiscountKind::FixedAmount(amount) => Self::in_order_currency(discount, order, *amount)?,
                DiscountKind::FreeShipping => Self::waive_shipping(order, shipping_waived),
                DiscountKind::BuyXGetY => zero,
            },
            AppliesTo::SpecificProducts(products) => {
                let mut amount = zero;

                for line in facts
                    .lines
                    .iter()
                    .filter(|line| products.contains(line.product.id))
                {
                    let contribution = match &discount.kind {
                        DiscountKind::Percentage(percent) => percent_of(&line.total, percent)?,
                        DiscountKind::FixedAmount(amount) => {
                            Self::in_order_currency(discount, order, *amount)?
                        }
                        DiscountKind::FreeShipping => Self::waive_shipping(order, shipping_waived),
                        DiscountKind::BuyXGetY => zero,
                    };

                    amount = amount.add(contribution)?;
                }

                amount
            }
            AppliesTo::SpecificCollections(_) => {
                return self.unsupported(discount, UnsupportedFeature::SpecificCollections);
            }
        };

        Ok(DiscountOutcome::Applied(amount))
    }

    fn meets_minimum<'a, T: TagCollection>(
        discount: &Discount<'a>,
        order: &Order<'a>,
        facts: &OrderFacts<'_, '_, 'a, T>,
    ) -> Result<bool, DiscountError> {
        let met = match &discount.minimum {
            MinimumRequirement::None => true,
            MinimumRequirement::MinimumAmount(threshold) => {
                let threshold = Self::in_order_currency(discount, order, *threshold)?;

                facts.subtotal.to_minor_units() >= threshold.to_minor_units()
            }
            MinimumRequirement::MinimumQuantity(count) => facts.item_count >= u64::from(*count),
        };

        Ok(met)
    }

    fn waive_shipping<'a>(order: &Order<'a>, shipping_waived: &mut bool) -> Money<'a, Currency> {
        if *shipping_waived {
            return Money::from_minor(0, order.currency());
        }

        *shipping_waived = true;

        order.shipping_cost
    }

    fn in_order_currency<'a>(
        discount: &Discount<'a>,
        order: &Order<'a>,
        amount: Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        if amount.currency() != order.currency() {
            return Err(DiscountError::CurrencyMismatch {
                discount: discount.id,
                expected: order.currency().iso_alpha_code,
                actual: amount.currency().iso_alpha_code,
            });
        }

        Ok(amount)
    }

    fn unsupported<'a>(
        &self,
        discount: &Discount<'a>,
        feature: UnsupportedFeature,
    ) -> Result<DiscountOutcome<'a>, DiscountError> {
        match self.unsupported {
            UnsupportedPolicy::Reject => Err(DiscountError::Unsupported {
                discount: discount.id,
                feature,
            }),
            UnsupportedPolicy::Skip => {
                warn!(
                    discount = %discount.id,
                    handle = %discount.handle,
                    %feature,
                    "discount uses an unsupported feature, skipping"
                );

                Ok(DiscountOutcome::Skipped(SkipReason::Unsupported(feature)))
            }
        }
    }
}
