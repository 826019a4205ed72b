//! Integration tests for discount calculation over the default fixture set

use jiff::Timestamp;
use rusty_money::{Money, iso::RUB};
use testresult::TestResult;

use storefront::{
    discounts::{
        DiscountError, UnsupportedFeature,
        calculator::{DiscountCalculator, DiscountOutcome, SkipReason, UnsupportedPolicy},
    },
    fixtures::Fixture,
    ids::{CustomerId, DiscountId, OrderId, ProductId},
    orders::{Order, OrderError, OrderStatus},
    receipt::OrderReceipt,
};

fn outcomes(
    fixture: &Fixture,
    order: u32,
) -> Result<Vec<(String, DiscountOutcome<'static>)>, Box<dyn std::error::Error>> {
    let order = fixture.order(OrderId::new(order))?;
    let breakdown = DiscountCalculator::default().compute(order, fixture.catalog()?)?;

    Ok(breakdown
        .lines
        .into_iter()
        .map(|line| (line.handle, line.outcome))
        .collect())
}

#[test]
fn free_shipping_is_deducted_once() -> TestResult {
    let fixture = Fixture::from_set("default")?;

    let outcomes = outcomes(&fixture, 1)?;

    assert_eq!(
        outcomes,
        [
            (
                "FREESHIP".to_string(),
                DiscountOutcome::Applied(Money::from_minor(30_000, RUB))
            ),
            (
                "SHIPTOO".to_string(),
                DiscountOutcome::Applied(Money::from_minor(0, RUB))
            ),
            (
                "VIP100".to_string(),
                DiscountOutcome::Skipped(SkipReason::NotEligible)
            ),
            (
                "BIG10".to_string(),
                DiscountOutcome::Skipped(SkipReason::MinimumNotMet)
            ),
            (
                "BOGO".to_string(),
                DiscountOutcome::Skipped(SkipReason::Unsupported(UnsupportedFeature::BuyXGetY))
            ),
        ]
    );

    Ok(())
}

#[test]
fn minimum_amount_is_inclusive() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let catalog = fixture.catalog()?;
    let big10 = fixture.discount(DiscountId::new(1))?.clone();

    let at_1000 = Order::new(OrderId::new(100), CustomerId::new(1), RUB, Timestamp::UNIX_EPOCH)
        .with_line(ProductId::new(1), 4)
        .with_discount(big10.clone());

    let at_1001 = at_1000.clone().with_line(ProductId::new(4), 1);

    let calculator = DiscountCalculator::default();

    assert_eq!(
        calculator.compute(&at_1000, catalog)?.total,
        Money::from_minor(0, RUB)
    );
    assert_eq!(
        calculator.compute(&at_1001, catalog)?.total,
        Money::from_minor(10_010, RUB)
    );

    Ok(())
}

#[test]
fn eligible_customer_gets_the_full_value() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order(OrderId::new(2))?;

    let totals = DiscountCalculator::default().totals(order, fixture.catalog()?)?;

    assert_eq!(totals.subtotal, Money::from_minor(100_100, RUB));
    assert_eq!(totals.discount, Money::from_minor(20_010, RUB));
    assert_eq!(totals.total, Money::from_minor(80_090, RUB));
    assert_eq!(totals.balance_due, totals.total);

    Ok(())
}

#[test]
fn product_scoped_percentage_and_inactive_discount() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order(OrderId::new(4))?;

    let totals = DiscountCalculator::default().totals(order, fixture.catalog()?)?;
    let skipped: Vec<_> = totals.breakdown.skipped().map(|(_, reason)| reason).collect();

    assert_eq!(order.status(), OrderStatus::Shipped);
    assert_eq!(totals.discount, Money::from_minor(3_750, RUB));
    assert_eq!(totals.total, Money::from_minor(56_250, RUB));
    assert_eq!(totals.balance_due, Money::from_minor(6_250, RUB));
    assert_eq!(skipped, [SkipReason::Inactive]);

    Ok(())
}

#[test]
fn missing_product_is_reported_with_its_line() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order(OrderId::new(3))?;

    let result = DiscountCalculator::default().compute(order, fixture.catalog()?);

    assert!(matches!(
        result,
        Err(DiscountError::Order(OrderError::MissingProduct { line: 1, product }))
            if product == ProductId::new(99)
    ));

    Ok(())
}

#[test]
fn unsupported_features_are_rejected_under_reject() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order(OrderId::new(1))?;

    let result = DiscountCalculator::new(UnsupportedPolicy::Reject).compute(order, fixture.catalog()?);

    assert!(matches!(
        result,
        Err(DiscountError::Unsupported {
            feature: UnsupportedFeature::BuyXGetY,
            ..
        })
    ));

    Ok(())
}

#[test]
fn receipt_renders_totals() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let order = fixture.order(OrderId::new(1))?;

    let receipt = OrderReceipt::new(order, fixture.catalog()?, &DiscountCalculator::default())?;

    let mut out = Vec::new();
    receipt.write_to(&mut out)?;

    let text = String::from_utf8(out)?;

    assert!(text.contains("Order #1 (paid)"));
    assert!(text.contains("Sticker Star"));
    assert!(text.contains("FREESHIP"));
    assert_eq!(receipt.totals().balance_due, Money::from_minor(0, RUB));

    Ok(())
}
