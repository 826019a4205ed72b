//! Orders
//!
//! An order holds product lines, the discounts attached to it, payments and status flags.
//! Lines reference products by id; prices come from the catalog when totals are derived.

use std::fmt;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    discounts::{Availability, Discount},
    ids::{CustomerId, DiscountId, OrderId, PaymentId, ProductId},
    pricing::{PricingError, line_total, total_price},
    products::Product,
    tags::collection::TagCollection,
};

/// Errors raised by orders.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// A line references a product the catalog does not have (line number is 1-based).
    #[error("line {line} references product {product}, which is not in the catalog")]
    MissingProduct {
        /// Line number
        line: usize,

        /// Referenced product
        product: ProductId,
    },

    /// An amount is in a different currency from the order.
    #[error("order {order} is in {expected}, got an amount in {actual}")]
    CurrencyMismatch {
        /// Order
        order: OrderId,

        /// Order currency
        expected: &'static str,

        /// Offending currency
        actual: &'static str,
    },

    /// A payment belongs to a different order.
    #[error("payment {payment} belongs to order {belongs_to}, not {order}")]
    ForeignPayment {
        /// Order
        order: OrderId,

        /// Payment
        payment: PaymentId,

        /// Order the payment names
        belongs_to: OrderId,
    },

    /// A canceled order cannot move forward.
    #[error("order {order} is canceled and cannot be {action}")]
    Canceled {
        /// Order
        order: OrderId,

        /// Attempted transition, e.g. `"shipped"`
        action: &'static str,
    },

    /// The discount cannot be attached at this time.
    #[error("discount {discount} cannot be attached to order {order}: {availability}")]
    DiscountUnavailable {
        /// Order
        order: OrderId,

        /// Discount
        discount: DiscountId,

        /// Why the discount is unavailable
        availability: Availability,
    },

    /// The discount is already attached.
    #[error("discount {discount} is already attached to order {order}")]
    DuplicateDiscount {
        /// Order
        order: OrderId,

        /// Discount
        discount: DiscountId,
    },

    /// Errors bubbled up from price calculations.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    /// Ordered product
    pub product: ProductId,

    /// Units ordered
    pub quantity: u32,
}

/// A line resolved against the catalog.
#[derive(Debug, Clone)]
pub struct PricedLine<'c, 'a, T: TagCollection> {
    /// Line number, 1-based
    pub line: usize,

    /// Resolved product
    pub product: &'c Product<'a, T>,

    /// Units ordered
    pub quantity: u32,

    /// Unit price times quantity
    pub total: Money<'a, Currency>,
}

/// A payment against an order.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment<'a> {
    /// Payment identifier
    pub id: PaymentId,

    /// Paying customer
    pub customer: CustomerId,

    /// Order paid for
    pub order: OrderId,

    /// When the payment was made
    pub paid_at: Timestamp,

    /// Amount paid
    pub amount: Money<'a, Currency>,

    /// Free-form note
    pub note: String,
}

/// Summary of an order's status flags, most advanced first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Canceled
    Canceled,

    /// Shipped
    Shipped,

    /// Fulfilled, not yet shipped
    Fulfilled,

    /// Paid, not yet fulfilled
    Paid,

    /// Placed, awaiting payment
    Open,

    /// Not yet placed
    Draft,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Canceled => "canceled",
            Self::Shipped => "shipped",
            Self::Fulfilled => "fulfilled",
            Self::Paid => "paid",
            Self::Open => "open",
            Self::Draft => "draft",
        })
    }
}

/// A customer order.
#[derive(Debug, Clone)]
pub struct Order<'a> {
    /// Order identifier
    pub id: OrderId,

    /// Ordering customer
    pub customer: CustomerId,

    /// When the order was created
    pub created_at: Timestamp,

    /// When the order was paid
    pub paid_at: Option<Timestamp>,

    /// When the order was fulfilled
    pub fulfilled_at: Option<Timestamp>,

    /// When the order was shipped
    pub shipped_at: Option<Timestamp>,

    /// When the order was canceled
    pub canceled_at: Option<Timestamp>,

    /// Whether the order is still a draft
    pub draft: bool,

    /// Shipping cost
    pub shipping_cost: Money<'a, Currency>,

    /// Free-form note
    pub note: String,

    currency: &'a Currency,
    lines: Vec<OrderLine>,
    discounts: Vec<Discount<'a>>,
    payments: Vec<Payment<'a>>,
}

impl<'a> Order<'a> {
    /// Create an empty draft order with free shipping.
    pub fn new(
        id: OrderId,
        customer: CustomerId,
        currency: &'a Currency,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            customer,
            created_at,
            paid_at: None,
            fulfilled_at: None,
            shipped_at: None,
            canceled_at: None,
            draft: true,
            shipping_cost: Money::from_minor(0, currency),
            note: String::new(),
            currency,
            lines: Vec::new(),
            discounts: Vec::new(),
            payments: Vec::new(),
        }
    }

    /// Add a product line.
    #[must_use]
    pub fn with_line(mut self, product: ProductId, quantity: u32) -> Self {
        self.add_line(product, quantity);
        self
    }

    /// Set the shipping cost.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::CurrencyMismatch`] if the cost is in another currency.
    pub fn with_shipping(mut self, cost: Money<'a, Currency>) -> Result<Self, OrderError> {
        self.check_currency(cost.currency())?;
        self.shipping_cost = cost;

        Ok(self)
    }

    /// Attach a discount as stored, without availability checks. Used when loading existing
    /// orders; the calculator still skips discounts that are inactive.
    #[must_use]
    pub fn with_discount(mut self, discount: Discount<'a>) -> Self {
        self.discounts.push(discount);
        self
    }

    /// Add a product line.
    pub fn add_line(&mut self, product: ProductId, quantity: u32) {
        self.lines.push(OrderLine { product, quantity });
    }

    /// Attach a discount that is available at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::DiscountUnavailable`] if the discount is not available, or
    /// [`OrderError::DuplicateDiscount`] if it is already attached.
    pub fn attach_discount(
        &mut self,
        discount: Discount<'a>,
        at: Timestamp,
    ) -> Result<(), OrderError> {
        let availability = discount.availability(at);

        if availability != Availability::Available {
            return Err(OrderError::DiscountUnavailable {
                order: self.id,
                discount: discount.id,
                availability,
            });
        }

        if self.discounts.iter().any(|attached| attached.id == discount.id) {
            return Err(OrderError::DuplicateDiscount {
                order: self.id,
                discount: discount.id,
            });
        }

        self.discounts.push(discount);

        Ok(())
    }

    /// Record a payment.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::ForeignPayment`] if the payment names another order, or
    /// [`OrderError::CurrencyMismatch`] if it is in another currency.
    pub fn record_payment(&mut self, payment: Payment<'a>) -> Result<(), OrderError> {
        if payment.order != self.id {
            return Err(OrderError::ForeignPayment {
                order: self.id,
                payment: payment.id,
                belongs_to: payment.order,
            });
        }

        self.check_currency(payment.amount.currency())?;
        self.payments.push(payment);

        Ok(())
    }

    /// Mark the order as paid.
    pub fn mark_paid(&mut self, at: Timestamp) {
        self.paid_at.get_or_insert(at);
        self.draft = false;
    }

    /// Mark the order as fulfilled.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Canceled`] if the order is canceled.
    pub fn mark_fulfilled(&mut self, at: Timestamp) -> Result<(), OrderError> {
        self.ensure_not_canceled("fulfilled")?;
        self.fulfilled_at.get_or_insert(at);
        self.draft = false;

        Ok(())
    }

    /// Mark the order as shipped.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Canceled`] if the order is canceled.
    pub fn mark_shipped(&mut self, at: Timestamp) -> Result<(), OrderError> {
        self.ensure_not_canceled("shipped")?;
        self.shipped_at.get_or_insert(at);
        self.draft = false;

        Ok(())
    }

    /// Cancel the order. Canceling twice keeps the first timestamp.
    pub fn cancel(&mut self, at: Timestamp) {
        self.canceled_at.get_or_insert(at);
        self.draft = false;
    }

    /// The most advanced status flag.
    pub fn status(&self) -> OrderStatus {
        if self.canceled_at.is_some() {
            OrderStatus::Canceled
        } else if self.shipped_at.is_some() {
            OrderStatus::Shipped
        } else if self.fulfilled_at.is_some() {
            OrderStatus::Fulfilled
        } else if self.paid_at.is_some() {
            OrderStatus::Paid
        } else if self.draft {
            OrderStatus::Draft
        } else {
            OrderStatus::Open
        }
    }

    /// Order currency.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Product lines, in order.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Attached discounts, in attachment order.
    pub fn discounts(&self) -> &[Discount<'a>] {
        &self.discounts
    }

    /// Recorded payments.
    pub fn payments(&self) -> &[Payment<'a>] {
        &self.payments
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Resolve every line against the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingProduct`] for a line whose product is not in the catalog,
    /// or [`OrderError::CurrencyMismatch`] if the catalog is priced in another currency.
    pub fn priced_lines<'c, T: TagCollection>(
        &self,
        catalog: &'c Catalog<'a, T>,
    ) -> Result<Vec<PricedLine<'c, 'a, T>>, OrderError> {
        self.check_currency(catalog.currency())?;

        self.lines
            .iter()
            .enumerate()
            .map(|(idx, line)| -> Result<PricedLine<'c, 'a, T>, OrderError> {
                let product = catalog
                    .get(line.product)
                    .ok_or(OrderError::MissingProduct {
                        line: idx + 1,
                        product: line.product,
                    })?;

                Ok(PricedLine {
                    line: idx + 1,
                    product,
                    quantity: line.quantity,
                    total: line_total(&product.price, line.quantity)?,
                })
            })
            .collect()
    }

    /// Sum of line totals, before shipping and discounts.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] if a line cannot be priced.
    pub fn subtotal<T: TagCollection>(
        &self,
        catalog: &Catalog<'a, T>,
    ) -> Result<Money<'a, Currency>, OrderError> {
        let lines = self.priced_lines(catalog)?;

        Ok(total_price(
            lines.into_iter().map(|line| line.total),
            self.currency,
        )?)
    }

    /// Sum of recorded payments.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Pricing`] if payments cannot be summed.
    pub fn amount_paid(&self) -> Result<Money<'a, Currency>, OrderError> {
        Ok(total_price(
            self.payments.iter().map(|payment| payment.amount),
            self.currency,
        )?)
    }

    fn check_currency(&self, currency: &Currency) -> Result<(), OrderError> {
        if currency == self.currency {
            return Ok(());
        }

        Err(OrderError::CurrencyMismatch {
            order: self.id,
            expected: self.currency.iso_alpha_code,
            actual: currency.iso_alpha_code,
        })
    }

    fn ensure_not_canceled(&self, action: &'static str) -> Result<(), OrderError> {
        if self.canceled_at.is_some() {
            return Err(OrderError::Canceled {
                order: self.id,
                action,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::{GBP, RUB};
    use testresult::TestResult;

    use super::*;
    use crate::{discounts::DiscountKind, ids::ProductTypeId, products::ProductType};

    fn ts(s: &str) -> Result<Timestamp, jiff::Error> {
        s.parse()
    }

    fn catalog() -> Result<Catalog<'static>, crate::catalog::CatalogError> {
        let product = |id, price| {
            Product::new(
                ProductId::new(id),
                format!("Product {id}"),
                ProductType::new(ProductTypeId::new(1), "misc"),
                Money::from_minor(price, RUB),
            )
        };

        Catalog::with_products([product(1, 25_000), product(2, 10_000)], RUB)
    }

    fn order() -> Result<Order<'static>, jiff::Error> {
        Ok(Order::new(
            OrderId::new(1),
            CustomerId::new(1),
            RUB,
            ts("2024-03-01T10:00:00Z")?,
        ))
    }

    #[test]
    fn subtotal_and_item_count() -> TestResult {
        let catalog = catalog()?;
        let order = order()?
            .with_line(ProductId::new(1), 2)
            .with_line(ProductId::new(2), 3);

        assert_eq!(order.subtotal(&catalog)?, Money::from_minor(80_000, RUB));
        assert_eq!(order.item_count(), 5);

        Ok(())
    }

    #[test]
    fn missing_product_is_reported_with_line_number() -> TestResult {
        let catalog = catalog()?;
        let order = order()?
            .with_line(ProductId::new(1), 1)
            .with_line(ProductId::new(9), 1);

        assert_eq!(
            order.subtotal(&catalog),
            Err(OrderError::MissingProduct {
                line: 2,
                product: ProductId::new(9),
            })
        );

        Ok(())
    }

    #[test]
    fn status_follows_flags() -> TestResult {
        let mut order = order()?;
        assert_eq!(order.status(), OrderStatus::Draft);

        order.mark_paid(ts("2024-03-01T11:00:00Z")?);
        assert_eq!(order.status(), OrderStatus::Paid);

        order.mark_shipped(ts("2024-03-02T09:00:00Z")?)?;
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert!(!order.draft);

        Ok(())
    }

    #[test]
    fn canceled_order_cannot_ship() -> TestResult {
        let mut order = order()?;
        order.cancel(ts("2024-03-01T12:00:00Z")?);

        assert_eq!(
            order.mark_shipped(ts("2024-03-02T09:00:00Z")?),
            Err(OrderError::Canceled {
                order: OrderId::new(1),
                action: "shipped",
            })
        );
        assert!(order.mark_fulfilled(ts("2024-03-02T09:00:00Z")?).is_err());
        assert_eq!(order.status(), OrderStatus::Canceled);

        Ok(())
    }

    #[test]
    fn attach_discount_checks_availability_and_duplicates() -> TestResult {
        let at = ts("2024-03-01T10:00:00Z")?;
        let mut order = order()?;
        let discount = Discount::new(
            DiscountId::new(5),
            "SPRING",
            DiscountKind::Percentage(Percentage::from(0.1)),
        );

        order.attach_discount(discount.clone(), at)?;

        assert_eq!(
            order.attach_discount(discount.clone(), at),
            Err(OrderError::DuplicateDiscount {
                order: OrderId::new(1),
                discount: DiscountId::new(5),
            })
        );

        let inactive = Discount {
            id: DiscountId::new(6),
            ..discount.with_active(false)
        };

        assert!(matches!(
            order.attach_discount(inactive, at),
            Err(OrderError::DiscountUnavailable {
                availability: Availability::Inactive,
                ..
            })
        ));
        assert_eq!(order.discounts().len(), 1);

        Ok(())
    }

    #[test]
    fn payments_are_summed_and_checked() -> TestResult {
        let mut order = order()?;
        let payment = |id, amount| Payment {
            id: PaymentId::new(id),
            customer: CustomerId::new(1),
            order: OrderId::new(1),
            paid_at: Timestamp::UNIX_EPOCH,
            amount,
            note: String::new(),
        };

        order.record_payment(payment(1, Money::from_minor(10_000, RUB)))?;
        order.record_payment(payment(2, Money::from_minor(5_000, RUB)))?;

        assert_eq!(order.amount_paid()?, Money::from_minor(15_000, RUB));
        assert!(matches!(
            order.record_payment(payment(3, Money::from_minor(100, GBP))),
            Err(OrderError::CurrencyMismatch { .. })
        ));

        Ok(())
    }
}
