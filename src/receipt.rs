//! Receipt
//!
//! Renders an order as a table of priced lines followed by a right-aligned summary of
//! shipping, discounts, payments and the balance due.

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    discounts::{
        DiscountError,
        calculator::{DiscountCalculator, DiscountOutcome, OrderTotals},
    },
    ids::OrderId,
    orders::{Order, OrderStatus, PricedLine},
    pricing::percent_points,
    tags::collection::TagCollection,
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error pricing the order or its discounts.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A priced order, ready to print.
#[derive(Debug, Clone)]
pub struct OrderReceipt<'c, 'a, T: TagCollection> {
    order: OrderId,
    status: OrderStatus,
    lines: Vec<PricedLine<'c, 'a, T>>,
    totals: OrderTotals<'a>,
}

impl<'c, 'a, T: TagCollection> OrderReceipt<'c, 'a, T> {
    /// Price an order and its discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the order cannot be priced.
    pub fn new(
        order: &Order<'a>,
        catalog: &'c Catalog<'a, T>,
        calculator: &DiscountCalculator,
    ) -> Result<Self, ReceiptError> {
        let lines = order.priced_lines(catalog).map_err(DiscountError::from)?;
        let totals = calculator.totals_priced(order, &lines)?;

        Ok(Self {
            order: order.id,
            status: order.status(),
            lines,
            totals,
        })
    }

    /// Money totals for the order.
    pub fn totals(&self) -> &OrderTotals<'a> {
        &self.totals
    }

    /// Priced lines, in order.
    pub fn lines(&self) -> &[PricedLine<'c, 'a, T>] {
        &self.lines
    }

    /// Discount as a fraction of the subtotal.
    pub fn savings_percent(&self) -> Percentage {
        let subtotal_minor = self.totals.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(0.0);
        }

        let discount = Decimal::from(self.totals.discount.to_minor_units());
        let subtotal = Decimal::from(subtotal_minor);

        Percentage::from(discount / subtotal)
    }

    /// Writes the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        writeln!(out, "\n Order #{} ({})", self.order, self.status)
            .map_err(|_err| ReceiptError::IO)?;

        let mut builder = Builder::default();

        builder.push_record(["", "Product", "Tags", "Qty", "Unit Price", "Line Total"]);

        for line in &self.lines {
            builder.push_record([
                format!("#{:<3}", line.line),
                line.product.title.clone(),
                line.product.tags.iter().collect::<Vec<_>>().join("\n"),
                line.quantity.to_string(),
                format!("{}", line.product.price),
                format!("{}", line.total),
            ]);
        }

        write_receipt_table(&mut out, builder, self.lines.len())?;
        write_receipt_summary(&mut out, self)?;

        Ok(())
    }
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    line_count: usize,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    for row in 1..=line_count {
        table.modify((row, 2), color_dark_grey());
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary<T: TagCollection>(
    out: &mut impl io::Write,
    receipt: &OrderReceipt<'_, '_, T>,
) -> Result<(), ReceiptError> {
    let totals = receipt.totals();
    let mut rows: SmallVec<[(String, String); 12]> = SmallVec::new();

    rows.push((" Subtotal:".to_string(), format!("{}  ", totals.subtotal)));
    rows.push((" Shipping:".to_string(), format!("{}  ", totals.shipping)));

    for line in &totals.breakdown.lines {
        let value = match line.outcome {
            DiscountOutcome::Applied(amount) => format!("-{amount}  "),
            DiscountOutcome::Skipped(reason) => format!("\x1b[90m{reason}\x1b[0m  "),
        };

        rows.push((format!(" {}:", line.handle), value));
    }

    rows.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}  \x1b[0m", totals.total),
    ));
    rows.push((" Paid:".to_string(), format!("{}  ", totals.paid)));
    rows.push((" Balance due:".to_string(), format!("{}  ", totals.balance_due)));

    let savings_points = percent_points(&receipt.savings_percent());
    rows.push((
        " Savings:".to_string(),
        format!("({savings_points}%) {}  ", totals.discount),
    ));

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::RUB;
    use testresult::TestResult;

    use super::*;
    use crate::{
        discounts::{Discount, DiscountKind},
        ids::{CustomerId, DiscountId, ProductId, ProductTypeId},
        products::{Product, ProductType},
    };

    fn catalog() -> Result<Catalog<'static>, crate::catalog::CatalogError> {
        Catalog::with_products(
            [Product::new(
                ProductId::new(1),
                "Sticker Star",
                ProductType::new(ProductTypeId::new(1), "stickers"),
                Money::from_minor(25_000, RUB),
            )
            .with_tags("sticker, decal")],
            RUB,
        )
    }

    fn order() -> Result<Order<'static>, crate::orders::OrderError> {
        Order::new(OrderId::new(7), CustomerId::new(1), RUB, Timestamp::UNIX_EPOCH)
            .with_line(ProductId::new(1), 4)
            .with_shipping(Money::from_minor(30_000, RUB))
            .map(|order| {
                order.with_discount(Discount::new(
                    DiscountId::new(1),
                    "QUARTER",
                    DiscountKind::Percentage(Percentage::from(0.25)),
                ))
            })
    }

    #[test]
    fn savings_percent_is_discount_over_subtotal() -> TestResult {
        let catalog = catalog()?;
        let receipt = OrderReceipt::new(&order()?, &catalog, &DiscountCalculator::default())?;

        assert_eq!(receipt.totals().discount, Money::from_minor(25_000, RUB));
        assert_eq!(percent_points(&receipt.savings_percent()), Decimal::from(25));

        Ok(())
    }

    #[test]
    fn subtotal_comes_from_the_receipt_lines() -> TestResult {
        let catalog = catalog()?;
        let receipt = OrderReceipt::new(&order()?, &catalog, &DiscountCalculator::default())?;

        let minor: i64 = receipt.lines().iter().map(|line| line.total.to_minor_units()).sum();

        assert_eq!(receipt.totals().subtotal.to_minor_units(), minor);

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_summary() -> TestResult {
        let catalog = catalog()?;
        let receipt = OrderReceipt::new(&order()?, &catalog, &DiscountCalculator::default())?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("Order #7 (draft)"), "missing header: {text}");
        assert!(text.contains("Sticker Star"), "missing product: {text}");
        assert!(text.contains("QUARTER:"), "missing discount: {text}");
        assert!(text.contains("Balance due:"), "missing balance: {text}");
        assert!(text.contains("(25%)"), "missing savings: {text}");

        Ok(())
    }

    #[test]
    fn empty_order_has_zero_savings() -> TestResult {
        let catalog = catalog()?;
        let order = Order::new(OrderId::new(8), CustomerId::new(1), RUB, Timestamp::UNIX_EPOCH);
        let receipt = OrderReceipt::new(&order, &catalog, &DiscountCalculator::default())?;

        assert_eq!(receipt.savings_percent(), Percentage::from(0.0));
        assert!(receipt.lines().is_empty());

        Ok(())
    }

    #[test]
    fn visible_width_ignores_ansi() {
        assert_eq!(visible_width("\x1b[1mTotal:\x1b[0m"), 6);
    }
}
