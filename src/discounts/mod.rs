//! Discounts
//!
//! A discount pairs a value ([`DiscountKind`]) with the gates that decide whether it applies to
//! an order: scope, minimum requirement, customer eligibility, activity, schedule and usage.
//! ID lists naming applicable products or eligible customers are parsed once when the discount
//! is built, never during calculation.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rustc_hash::FxHashSet;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    ids::{CollectionId, CustomerGroupId, CustomerId, DiscountId, IdList, ProductId},
    orders::OrderError,
    pricing::{PricingError, percent_points},
};

pub mod calculator;

/// Errors raised by discounts and the discount calculator.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// A discount needs a feature that is not implemented, and the calculator rejects those.
    #[error("discount {discount} uses an unsupported feature: {feature}")]
    Unsupported {
        /// Offending discount
        discount: DiscountId,

        /// Missing feature
        feature: UnsupportedFeature,
    },

    /// The discount has reached its usage limit.
    #[error("discount {0} has reached its usage limit")]
    UsageExhausted(DiscountId),

    /// The customer already used a one-use-per-customer discount.
    #[error("customer {customer} already used discount {discount}")]
    AlreadyUsed {
        /// Offending discount
        discount: DiscountId,

        /// Customer who used it
        customer: CustomerId,
    },

    /// A discount amount is not in the order's currency.
    #[error("discount {discount} is in {actual}, but the order is in {expected}")]
    CurrencyMismatch {
        /// Offending discount
        discount: DiscountId,

        /// Order currency
        expected: &'static str,

        /// Discount currency
        actual: &'static str,
    },

    /// Errors bubbled up from resolving order lines.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Errors bubbled up from price calculations.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Features a discount can name that the calculator does not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedFeature {
    /// Buy-X-get-Y discounts
    BuyXGetY,

    /// Scoping to specific collections
    SpecificCollections,

    /// Eligibility for customer groups
    CustomerGroups,
}

impl fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BuyXGetY => "buy X get Y",
            Self::SpecificCollections => "specific collections",
            Self::CustomerGroups => "customer groups",
        })
    }
}

/// What a discount takes off.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountKind<'a> {
    /// A fraction of the subtotal, or of each applicable line
    Percentage(Percentage),

    /// A fixed amount, once per order or once per applicable line
    FixedAmount(Money<'a, Currency>),

    /// The order's shipping cost, at most once per order
    FreeShipping,

    /// Buy X, get Y
    BuyXGetY,
}

/// What a discount applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppliesTo {
    /// The whole order
    #[default]
    EntireOrder,

    /// Lines for these products
    SpecificProducts(IdList<ProductId>),

    /// Products in these collections
    SpecificCollections(IdList<CollectionId>),
}

/// What an order must reach before a discount applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MinimumRequirement<'a> {
    /// No minimum
    #[default]
    None,

    /// Subtotal must be at least this amount
    MinimumAmount(Money<'a, Currency>),

    /// Total item count must be at least this
    MinimumQuantity(u32),
}

/// Who may use a discount.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CustomerEligibility {
    /// Any customer
    #[default]
    Everyone,

    /// Only these customers
    SpecificCustomers(IdList<CustomerId>),

    /// Only members of these groups
    SpecificGroups(IdList<CustomerGroupId>),
}

/// Usage counters and limits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscountUsage {
    /// How many times the discount was used
    pub times_used: u32,

    /// Usage limit; `0` means unlimited
    pub max_times_used: u32,

    /// Whether each customer may use the discount only once
    pub one_use_per_customer: bool,

    /// Customers who used the discount; tracked only for one-use-per-customer discounts
    pub used_by: FxHashSet<CustomerId>,
}

impl DiscountUsage {
    /// Whether the usage limit has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.max_times_used > 0 && self.times_used >= self.max_times_used
    }
}

/// Whether a discount can be used at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// Usable
    Available,

    /// Switched off
    Inactive,

    /// Before its start date
    NotStarted,

    /// At or after its end date
    Expired,

    /// Usage limit reached
    UsageExhausted,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Available => "available",
            Self::Inactive => "inactive",
            Self::NotStarted => "not started",
            Self::Expired => "expired",
            Self::UsageExhausted => "usage limit reached",
        })
    }
}

/// A promotional rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Discount<'a> {
    /// Discount identifier
    pub id: DiscountId,

    /// Discount code
    pub handle: String,

    /// Value
    pub kind: DiscountKind<'a>,

    /// Scope
    pub applies_to: AppliesTo,

    /// Minimum requirement
    pub minimum: MinimumRequirement<'a>,

    /// Customer eligibility
    pub eligibility: CustomerEligibility,

    /// Whether the discount is switched on
    pub active: bool,

    /// Usage counters
    pub usage: DiscountUsage,

    /// Start of the validity window
    pub starts_at: Timestamp,

    /// End of the validity window, exclusive
    pub ends_at: Option<Timestamp>,
}

impl<'a> Discount<'a> {
    /// Create an active, unlimited discount on the entire order, open to everyone.
    pub fn new(id: DiscountId, handle: impl Into<String>, kind: DiscountKind<'a>) -> Self {
        Self {
            id,
            handle: handle.into(),
            kind,
            applies_to: AppliesTo::EntireOrder,
            minimum: MinimumRequirement::None,
            eligibility: CustomerEligibility::Everyone,
            active: true,
            usage: DiscountUsage::default(),
            starts_at: Timestamp::UNIX_EPOCH,
            ends_at: None,
        }
    }

    /// Set the scope.
    #[must_use]
    pub fn with_applies_to(mut self, applies_to: AppliesTo) -> Self {
        self.applies_to = applies_to;
        self
    }

    /// Set the minimum requirement.
    #[must_use]
    pub fn with_minimum(mut self, minimum: MinimumRequirement<'a>) -> Self {
        self.minimum = minimum;
        self
    }

    /// Set the customer eligibility.
    #[must_use]
    pub fn with_eligibility(mut self, eligibility: CustomerEligibility) -> Self {
        self.eligibility = eligibility;
        self
    }

    /// Switch the discount on or off.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Set the validity window.
    #[must_use]
    pub fn with_schedule(mut self, starts_at: Timestamp, ends_at: Option<Timestamp>) -> Self {
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self
    }

    /// Set the usage limits.
    #[must_use]
    pub fn with_usage_limit(mut self, max_times_used: u32, one_use_per_customer: bool) -> Self {
        self.usage.max_times_used = max_times_used;
        self.usage.one_use_per_customer = one_use_per_customer;
        self
    }

    /// Whether the discount can be used at `at`.
    pub fn availability(&self, at: Timestamp) -> Availability {
        if !self.active {
            return Availability::Inactive;
        }

        if at < self.starts_at {
            return Availability::NotStarted;
        }

        if self.ends_at.is_some_and(|end| at >= end) {
            return Availability::Expired;
        }

        if self.usage.is_exhausted() {
            return Availability::UsageExhausted;
        }

        Availability::Available
    }

    /// Record a use by `customer`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::UsageExhausted`] once the usage limit is reached, or
    /// [`DiscountError::AlreadyUsed`] if the discount is one-use-per-customer and `customer`
    /// already used it.
    pub fn record_use(&mut self, customer: CustomerId) -> Result<(), DiscountError> {
        if self.usage.is_exhausted() {
            return Err(DiscountError::UsageExhausted(self.id));
        }

        if self.usage.one_use_per_customer && self.usage.used_by.contains(&customer) {
            return Err(DiscountError::AlreadyUsed {
                discount: self.id,
                customer,
            });
        }

        self.usage.times_used = self
            .usage
            .times_used
            .checked_add(1)
            .ok_or(DiscountError::UsageExhausted(self.id))?;

        if self.usage.one_use_per_customer {
            self.usage.used_by.insert(customer);
        }

        Ok(())
    }
}

impl fmt::Display for Discount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiscountKind::Percentage(percent) => write!(f, "{}% off", percent_points(percent))?,
            DiscountKind::FixedAmount(amount) => write!(f, "{amount} off")?,
            DiscountKind::FreeShipping => f.write_str("Free shipping")?,
            DiscountKind::BuyXGetY => f.write_str("Buy X get Y")?,
        }

        match &self.applies_to {
            AppliesTo::EntireOrder => f.write_str(" on the entire order.")?,
            AppliesTo::SpecificProducts(ids) => write!(f, " on {} products.", ids.len())?,
            AppliesTo::SpecificCollections(ids) => write!(f, " on {} collections.", ids.len())?,
        }

        match &self.minimum {
            MinimumRequirement::None => {}
            MinimumRequirement::MinimumAmount(amount) => {
                write!(f, " Applies to orders of {amount} or more.")?;
            }
            MinimumRequirement::MinimumQuantity(count) => {
                write!(f, " Applies to orders of {count} items or more.")?;
            }
        }

        match &self.eligibility {
            CustomerEligibility::Everyone => f.write_str(" For everyone."),
            CustomerEligibility::SpecificCustomers(ids) => write!(f, " For {} customers.", ids.len()),
            CustomerEligibility::SpecificGroups(ids) => {
                write!(f, " For {} customer groups.", ids.len())
            }
        }
    }
}
