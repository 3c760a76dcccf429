//! Receipt
//!
//! Table rendering for the cart and for order confirmations.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
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
    cart::{CartLine, CartSnapshot},
    checkout::Order,
    pricing::{CartTotals, PricingPolicy, format_money, line_total},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Write the cart lines followed by the order summary.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_cart(
    mut out: impl io::Write,
    snapshot: &CartSnapshot,
    policy: &PricingPolicy,
) -> Result<(), ReceiptError> {
    if snapshot.is_empty() {
        writeln!(out, "Your cart is empty.")?;

        return Ok(());
    }

    let currency = policy.currency();

    write_lines_table(&mut out, snapshot.lines(), currency)?;
    write_cart_summary(&mut out, snapshot.totals(), policy)?;

    writeln!(out, " Deliver to: {}", snapshot.shipping_address())?;
    writeln!(out, " Payment:    {}", snapshot.payment_method())?;
    writeln!(out)?;

    Ok(())
}

/// Write an order confirmation.
///
/// Shipping is always free on a placed order; tax is charged on the order
/// total at the policy's confirmation rate.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_order(
    mut out: impl io::Write,
    order: &Order,
    policy: &PricingPolicy,
) -> Result<(), ReceiptError> {
    let currency = policy.currency();
    let money = |amount| format_money(&Money::from_decimal(amount, currency));

    writeln!(out, "\n Order {} confirmed", order.id)?;
    writeln!(out, " Placed on {}", order.date)?;

    write_lines_table(&mut out, &order.items, currency)?;

    let tax_label = format!(
        " Tax ({}%):",
        policy.tax_rate().saturating_mul(Decimal::ONE_HUNDRED).normalize()
    );

    let summary = [
        (" Items:", order.item_count().to_string()),
        (" Subtotal:", money(order.total)),
        (" Shipping:", money(Decimal::ZERO)),
        (tax_label.as_str(), money(order.tax(policy.tax_rate()))),
        (" Total:", money(order.total_with_tax(policy.tax_rate()))),
        (" Deliver to:", order.address.clone()),
        (" Payment:", order.payment_method.clone()),
    ];

    write_summary(&mut out, &summary)?;

    writeln!(out)?;

    Ok(())
}

fn write_lines_table(
    out: &mut impl io::Write,
    lines: &[CartLine],
    currency: &'static Currency,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Item", "Unit", "Price", "Qty", "Total"]);

    for line in lines {
        let product = line.product();

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.unit.clone(),
            format_money(&Money::from_decimal(product.price, currency)),
            line.quantity().to_string(),
            format_money(&Money::from_decimal(
                line_total(product.price, line.quantity()),
                currency,
            )),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}")?;

    Ok(())
}

fn write_cart_summary(
    out: &mut impl io::Write,
    totals: &CartTotals,
    policy: &PricingPolicy,
) -> Result<(), ReceiptError> {
    let delivery = if totals.qualifies_for_free_delivery {
        "FREE".to_string()
    } else {
        format_money(&totals.delivery_fee)
    };

    let summary = [
        (
            " Subtotal:",
            format!(
                "({} items) {}",
                totals.total_items,
                format_money(&totals.subtotal)
            ),
        ),
        (" Delivery:", delivery),
        (" Total:", format_money(&totals.grand_total)),
    ];

    write_summary(out, &summary)?;

    if totals.qualifies_for_free_delivery {
        writeln!(out, "\n You qualify for free delivery!")?;
    } else {
        writeln!(
            out,
            "\n Add {} more for free delivery (orders over {})",
            format_money(&totals.amount_away_from_free_delivery),
            format_money(&policy.free_delivery_threshold()),
        )?;
    }

    writeln!(out)?;

    Ok(())
}

/// Writes label/value pairs with right-aligned labels and values.
fn write_summary(out: &mut impl io::Write, rows: &[(&str, String)]) -> Result<(), ReceiptError> {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or_default();

    for (label, value) in rows {
        writeln!(out, "{label:>label_width$}  {value:>value_width$}")?;
    }

    Ok(())
}
