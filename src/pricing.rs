//! Pricing
//!
//! Cart aggregates are pure functions of the line list and a [`PricingPolicy`].
//! Nothing here is cached, so a total can never lag behind the lines it was
//! computed from.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use thiserror::Error;

use crate::cart::CartLine;

/// Order subtotal at which delivery becomes free, in major units.
pub const FREE_DELIVERY_THRESHOLD: i64 = 150;

/// Delivery fee charged below the free-delivery threshold, in major units.
pub const STANDARD_DELIVERY_FEE: i64 = 40;

/// Tax shown on order confirmations, in percent.
pub const CONFIRMATION_TAX_PERCENT: i64 = 18;

/// Errors that can occur while configuring pricing.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Currency code not supported by the storefront
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Threshold, fee or tax rate below zero
    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),
}

/// Delivery pricing rules applied to every cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    currency: &'static Currency,
    free_delivery_threshold: Decimal,
    standard_delivery_fee: Decimal,
    tax_rate: Decimal,
}

impl PricingPolicy {
    /// Create a policy with custom delivery rules.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeAmount`] if the threshold or fee is negative.
    pub fn new(
        currency: &'static Currency,
        free_delivery_threshold: Decimal,
        standard_delivery_fee: Decimal,
    ) -> Result<Self, PricingError> {
        if free_delivery_threshold.is_sign_negative() {
            return Err(PricingError::NegativeAmount("free delivery threshold"));
        }

        if standard_delivery_fee.is_sign_negative() {
            return Err(PricingError::NegativeAmount("delivery fee"));
        }

        Ok(Self {
            currency,
            free_delivery_threshold,
            standard_delivery_fee,
            tax_rate: Decimal::new(CONFIRMATION_TAX_PERCENT, 2),
        })
    }

    /// Replace the confirmation tax rate, given as a fraction (`0.18` for 18%).
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeAmount`] if the rate is negative.
    pub fn with_tax_rate(self, tax_rate: Decimal) -> Result<Self, PricingError> {
        if tax_rate.is_sign_negative() {
            return Err(PricingError::NegativeAmount("tax rate"));
        }

        Ok(Self { tax_rate, ..self })
    }

    /// Currency all amounts are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Subtotal needed for free delivery.
    pub fn free_delivery_threshold(&self) -> Money<'static, Currency> {
        Money::from_decimal(self.free_delivery_threshold, self.currency)
    }

    /// Fee charged when the subtotal is below the threshold.
    pub fn standard_delivery_fee(&self) -> Money<'static, Currency> {
        Money::from_decimal(self.standard_delivery_fee, self.currency)
    }

    /// Tax rate applied on order confirmations, as a fraction.
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Compute every aggregate for the given lines.
    pub fn totals(&self, lines: &[CartLine]) -> CartTotals {
        let total_items = lines
            .iter()
            .fold(0_u64, |acc, line| acc.saturating_add(u64::from(line.quantity())));

        let subtotal = lines.iter().fold(Decimal::ZERO, |acc, line| {
            acc.saturating_add(line_total(line.product().price, line.quantity()))
        });

        let qualifies = subtotal >= self.free_delivery_threshold;

        let delivery_fee = if qualifies {
            Decimal::ZERO
        } else {
            self.standard_delivery_fee
        };

        let amount_away = self
            .free_delivery_threshold
            .saturating_sub(subtotal)
            .max(Decimal::ZERO);

        CartTotals {
            total_items,
            line_count: lines.len(),
            subtotal: Money::from_decimal(subtotal, self.currency),
            qualifies_for_free_delivery: qualifies,
            delivery_fee: Money::from_decimal(delivery_fee, self.currency),
            amount_away_from_free_delivery: Money::from_decimal(amount_away, self.currency),
            grand_total: Money::from_decimal(subtotal.saturating_add(delivery_fee), self.currency),
        }
    }

    /// Price of a single line in this policy's currency.
    pub fn line_price(&self, line: &CartLine) -> Money<'static, Currency> {
        Money::from_decimal(
            line_total(line.product().price, line.quantity()),
            self.currency,
        )
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            currency: INR,
            free_delivery_threshold: Decimal::from(FREE_DELIVERY_THRESHOLD),
            standard_delivery_fee: Decimal::from(STANDARD_DELIVERY_FEE),
            tax_rate: Decimal::new(CONFIRMATION_TAX_PERCENT, 2),
        }
    }
}

/// Aggregates derived from a cart's lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of line quantities
    pub total_items: u64,

    /// Number of distinct products
    pub line_count: usize,

    /// Sum of price × quantity
    pub subtotal: Money<'static, Currency>,

    /// Subtotal has reached the free-delivery threshold
    pub qualifies_for_free_delivery: bool,

    /// Zero when qualified, otherwise the standard fee
    pub delivery_fee: Money<'static, Currency>,

    /// How much more is needed for free delivery, never negative
    pub amount_away_from_free_delivery: Money<'static, Currency>,

    /// Subtotal plus delivery fee
    pub grand_total: Money<'static, Currency>,
}

/// Price × quantity, saturating rather than overflowing.
pub fn line_total(price: Decimal, quantity: u32) -> Decimal {
    price.saturating_mul(Decimal::from(quantity))
}

/// Format money as the currency symbol followed by exactly two decimals.
///
/// No grouping separators: `₹1500.00`, never `₹1,500.00`. Halves round away
/// from zero.
pub fn format_money(money: &Money<'_, Currency>) -> String {
    format!(
        "{}{:.2}",
        money.currency().symbol,
        money
            .amount()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Look up a supported currency by ISO code.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] for codes the storefront does not sell in.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, PricingError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "INR" => Ok(INR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(PricingError::UnknownCurrency(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::products::Product;

    use super::*;

    fn line(id: &str, price: i64, quantity: u32) -> CartLine {
        CartLine::new(
            Product::new(id, id, Decimal::from(price), "1 pc", "Test"),
            quantity,
        )
    }

    fn inr(amount: i64) -> Money<'static, Currency> {
        Money::from_decimal(Decimal::from(amount), INR)
    }

    #[test]
    fn empty_cart_totals() {
        let totals = PricingPolicy::default().totals(&[]);

        assert_eq!(totals.total_items, 0);
        assert_eq!(totals.line_count, 0);
        assert_eq!(totals.subtotal, inr(0));
        assert!(!totals.qualifies_for_free_delivery);
        assert_eq!(totals.delivery_fee, inr(40));
        assert_eq!(totals.amount_away_from_free_delivery, inr(150));
        assert_eq!(totals.grand_total, inr(40));
    }

    #[test]
    fn below_threshold_pays_standard_fee() {
        let totals = PricingPolicy::default().totals(&[line("a", 80, 1)]);

        assert_eq!(totals.total_items, 1);
        assert_eq!(totals.subtotal, inr(80));
        assert!(!totals.qualifies_for_free_delivery);
        assert_eq!(totals.delivery_fee, inr(40));
        assert_eq!(totals.amount_away_from_free_delivery, inr(70));
        assert_eq!(totals.grand_total, inr(120));
    }

    #[test]
    fn exactly_at_threshold_qualifies() {
        let totals = PricingPolicy::default().totals(&[line("a", 50, 3)]);

        assert_eq!(totals.subtotal, inr(150));
        assert!(totals.qualifies_for_free_delivery);
        assert_eq!(totals.delivery_fee, inr(0));
        assert_eq!(totals.amount_away_from_free_delivery, inr(0));
    }

    #[test]
    fn above_threshold_never_reports_negative_amount_away() {
        let totals = PricingPolicy::default().totals(&[line("a", 80, 2), line("b", 100, 1)]);

        assert_eq!(totals.total_items, 3);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.subtotal, inr(260));
        assert!(totals.qualifies_for_free_delivery);
        assert_eq!(totals.delivery_fee, inr(0));
        assert_eq!(totals.amount_away_from_free_delivery, inr(0));
        assert_eq!(totals.grand_total, inr(260));
    }

    #[test]
    fn fractional_prices_sum_exactly() {
        let lines = [
            CartLine::new(
                Product::new("a", "a", Decimal::new(1999, 2), "1 pc", "Test"),
                3,
            ),
            CartLine::new(
                Product::new("b", "b", Decimal::new(1, 1), "1 pc", "Test"),
                2,
            ),
        ];

        let totals = PricingPolicy::default().totals(&lines);

        assert_eq!(
            totals.subtotal,
            Money::from_decimal(Decimal::new(6017, 2), INR)
        );
    }

    #[test]
    fn custom_policy_rules_apply() -> TestResult {
        let policy = PricingPolicy::new(GBP, Decimal::from(40), Decimal::new(499, 2))?;

        let totals = policy.totals(&[line("a", 30, 1)]);

        assert_eq!(totals.subtotal.currency(), GBP);
        assert_eq!(
            totals.delivery_fee,
            Money::from_decimal(Decimal::new(499, 2), GBP)
        );
        assert_eq!(
            totals.amount_away_from_free_delivery,
            Money::from_decimal(Decimal::from(10), GBP)
        );

        Ok(())
    }

    #[test]
    fn negative_policy_amounts_are_rejected() {
        assert_eq!(
            PricingPolicy::new(INR, Decimal::from(-1), Decimal::ZERO),
            Err(PricingError::NegativeAmount("free delivery threshold"))
        );
        assert_eq!(
            PricingPolicy::new(INR, Decimal::ZERO, Decimal::from(-1)),
            Err(PricingError::NegativeAmount("delivery fee"))
        );
    }

    #[test]
    fn line_price_multiplies_quantity() {
        let policy = PricingPolicy::default();

        assert_eq!(policy.line_price(&line("a", 45, 4)), inr(180));
    }

    #[test]
    fn format_money_uses_two_decimals_without_grouping() {
        assert_eq!(format_money(&inr(1500)), "₹1500.00");
        assert_eq!(
            format_money(&Money::from_decimal(Decimal::new(4996, 3), GBP)),
            "£5.00"
        );
    }

    #[test]
    fn format_money_rounds_halves_away_from_zero() {
        let gbp = |amount| Money::from_decimal(amount, GBP);

        assert_eq!(format_money(&gbp(Decimal::new(125, 3))), "£0.13");
        assert_eq!(format_money(&gbp(Decimal::new(135, 3))), "£0.14");
    }

    #[test]
    fn default_tax_rate_is_eighteen_percent() -> TestResult {
        assert_eq!(PricingPolicy::default().tax_rate(), Decimal::new(18, 2));

        let policy = PricingPolicy::default().with_tax_rate(Decimal::new(5, 2))?;

        assert_eq!(policy.tax_rate(), Decimal::new(5, 2));
        assert_eq!(
            PricingPolicy::default().with_tax_rate(Decimal::from(-1)),
            Err(PricingError::NegativeAmount("tax rate"))
        );

        Ok(())
    }

    #[test]
    fn currency_codes_are_case_insensitive() -> TestResult {
        assert_eq!(currency_from_code("inr")?, INR);
        assert_eq!(currency_from_code(" usd ")?, USD);
        assert_eq!(
            currency_from_code("XYZ"),
            Err(PricingError::UnknownCurrency("XYZ".to_string()))
        );

        Ok(())
    }
}
