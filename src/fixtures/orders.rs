//! Order Fixtures

use jiff::Timestamp;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    discounts::Discount,
    fixtures::{FixtureError, products::parse_money},
    ids::{CustomerId, DiscountId, OrderId, PaymentId, ProductId},
    orders::{Order, Payment},
};

/// Wrapper for orders in YAML
#[derive(Debug, Deserialize)]
pub struct OrdersFixture {
    /// Orders
    pub orders: Vec<OrderFixture>,
}

/// Order line in YAML
#[derive(Debug, Deserialize)]
pub struct OrderLineFixture {
    /// Product id; not checked against the catalog at load time
    pub product: ProductId,

    /// Quantity
    pub quantity: u32,
}

/// Payment in YAML
#[derive(Debug, Deserialize)]
pub struct PaymentFixture {
    /// Payment id
    pub id: PaymentId,

    /// Payment time
    pub paid_at: Timestamp,

    /// Amount in major units of the catalog currency
    pub amount: String,

    /// Free-form note
    #[serde(default)]
    pub note: String,
}

/// Order Fixture
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Order id
    pub id: OrderId,

    /// Customer id
    pub customer: CustomerId,

    /// Creation time
    pub created_at: Timestamp,

    /// Payment time
    #[serde(default)]
    pub paid_at: Option<Timestamp>,

    /// Fulfilment time
    #[serde(default)]
    pub fulfilled_at: Option<Timestamp>,

    /// Shipping time
    #[serde(default)]
    pub shipped_at: Option<Timestamp>,

    /// Cancellation time
    #[serde(default)]
    pub canceled_at: Option<Timestamp>,

    /// Draft flag
    #[serde(default)]
    pub draft: bool,

    /// Shipping cost in major units of the catalog currency
    #[serde(default)]
    pub shipping_cost: Option<String>,

    /// Free-form note
    #[serde(default)]
    pub note: String,

    /// Product lines
    #[serde(default)]
    pub lines: Vec<OrderLineFixture>,

    /// Ids of attached discounts
    #[serde(default)]
    pub discounts: Vec<DiscountId>,

    /// Payments received
    #[serde(default)]
    pub payments: Vec<PaymentFixture>,
}

impl OrderFixture {
    /// Convert into an [`Order`] priced in `currency`, attaching discounts from `discounts` as
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::DiscountNotFound`] for an unknown discount id, or another
    /// [`FixtureError`] for a malformed amount.
    pub fn try_into_order(
        self,
        currency: &'static Currency,
        discounts: &[Discount<'static>],
    ) -> Result<Order<'static>, FixtureError> {
        let mut order = Order::new(self.id, self.customer, currency, self.created_at);

        if let Some(shipping) = self.shipping_cost.as_deref() {
            order = order.with_shipping(parse_money(shipping, currency)?)?;
        }

        for line in self.lines {
            order.add_line(line.product, line.quantity);
        }

        for id in self.discounts {
            let discount = discounts
                .iter()
                .find(|discount| discount.id == id)
                .ok_or_else(|| FixtureError::DiscountNotFound(id.to_string()))?;

            order = order.with_discount(discount.clone());
        }

        for payment in self.payments {
            order.record_payment(Payment {
                id: payment.id,
                customer: self.customer,
                order: self.id,
                paid_at: payment.paid_at,
                amount: parse_money(&payment.amount, currency)?,
                note: payment.note,
            })?;
        }

        order.paid_at = self.paid_at;
        order.fulfilled_at = self.fulfilled_at;
        order.shipped_at = self.shipped_at;
        order.canceled_at = self.canceled_at;
        order.draft = self.draft;
        order.note = self.note;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::RUB};
    use testresult::TestResult;

    use super::*;
    use crate::{discounts::DiscountKind, orders::OrderStatus};

    const ORDER: &str = "
id: 7
customer: 3
created_at: 2024-03-01T10:00:00Z
paid_at: 2024-03-01T11:00:00Z
shipping_cost: '300'
lines:
  - { product: 1, quantity: 2 }
discounts: [5]
payments:
  - { id: 1, paid_at: 2024-03-01T11:00:00Z, amount: '800' }
";

    #[test]
    fn order_fixture_converts() -> TestResult {
        let fixture: OrderFixture = serde_norway::from_str(ORDER)?;
        let discounts = [Discount::new(
            DiscountId::new(5),
            "SHIP",
            DiscountKind::FreeShipping,
        )];

        let order = fixture.try_into_order(RUB, &discounts)?;

        assert_eq!(order.status(), OrderStatus::Paid);
        assert_eq!(order.shipping_cost, Money::from_minor(30_000, RUB));
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.discounts().len(), 1);
        assert_eq!(order.amount_paid()?, Money::from_minor(80_000, RUB));

        Ok(())
    }

    #[test]
    fn unknown_discount_is_an_error() -> TestResult {
        let fixture: OrderFixture = serde_norway::from_str(ORDER)?;

        assert!(matches!(
            fixture.try_into_order(RUB, &[]),
            Err(FixtureError::DiscountNotFound(id)) if id == "5"
        ));

        Ok(())
    }
}
