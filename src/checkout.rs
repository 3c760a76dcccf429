//! Checkout
//!
//! Turns the cart into an [`Order`]: validate, wait out the simulated
//! round-trip, record the order under [`LAST_ORDER_KEY`], then clear the cart.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use jiff::{Zoned, civil::Date};
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{CartLine, CartStore},
    storage::{KeyValueStore, LAST_ORDER_KEY, SharedStore, StorageError, read_json, write_json},
};

/// Simulated order placement round-trip.
pub const DEFAULT_CHECKOUT_LATENCY: Duration = Duration::from_millis(1000);

const ORDER_ID_PREFIX: &str = "ORD-";
const ORDER_ID_LEN: usize = 8;

/// Checkout errors
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Shipping address is blank
    #[error("Please enter a shipping address")]
    MissingAddress,

    /// Payment method is blank
    #[error("Please choose a payment method")]
    MissingPaymentMethod,

    /// Nothing to order
    #[error("Your cart is empty")]
    EmptyCart,

    /// Another checkout has not finished yet
    #[error("An order is already being placed")]
    InProgress,

    /// The order could not be recorded
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Order identifier, `ORD-` followed by eight uppercase alphanumerics.
///
/// Ids are for display only and are not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generate a fresh id from `rng`.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let suffix: String = (0..ORDER_ID_LEN)
            .filter_map(|_| char::from_digit(rng.gen_range(0..36), 36))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        Self(format!("{ORDER_ID_PREFIX}{suffix}"))
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A placed order. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier
    pub id: OrderId,

    /// Lines as they were at checkout
    pub items: Vec<CartLine>,

    /// Sum of line totals, excluding delivery
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Long-form order date, e.g. "October 16, 2026"
    pub date: String,

    /// Shipping address
    pub address: String,

    /// Payment method label
    pub payment_method: String,
}

impl Order {
    /// Total number of units ordered.
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity()))
            .sum()
    }

    /// Tax on the order total at `rate`, rounded to cents.
    pub fn tax(&self, rate: Decimal) -> Decimal {
        self.total
            .saturating_mul(rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Order total plus [`Order::tax`].
    pub fn total_with_tax(&self, rate: Decimal) -> Decimal {
        self.total.saturating_add(self.tax(rate))
    }
}

/// Where to ship and how to pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Shipping address
    pub address: String,

    /// Payment method label
    pub payment_method: String,
}

impl CheckoutRequest {
    /// Create a request.
    pub fn new(address: impl Into<String>, payment_method: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            payment_method: payment_method.into(),
        }
    }

    /// Use the address and payment method currently held by `cart`.
    pub fn from_cart(cart: &CartStore) -> Self {
        Self::new(cart.shipping_address(), cart.payment_method())
    }

    fn validate(&self, cart: &CartStore) -> Result<(), CheckoutError> {
        if self.address.trim().is_empty() {
            return Err(CheckoutError::MissingAddress);
        }

        if self.payment_method.trim().is_empty() {
            return Err(CheckoutError::MissingPaymentMethod);
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(())
    }
}

/// Places orders, one at a time.
#[derive(Debug)]
pub struct Checkout {
    store: SharedStore,
    latency: Duration,
    busy: AtomicBool,
}

impl Checkout {
    /// Create a checkout that records orders in `store`.
    pub fn new(store: SharedStore, latency: Duration) -> Self {
        Self {
            store,
            latency,
            busy: AtomicBool::new(false),
        }
    }

    /// Returns true while an order is being placed.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Place an order for everything in `cart`, dated today.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything changes,
    /// [`CheckoutError::InProgress`] if another order is being placed, or
    /// [`CheckoutError::Storage`] if the order could not be recorded. The
    /// cart is only cleared on success.
    pub async fn place_order(
        &self,
        cart: &mut CartStore,
        request: &CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        self.place_order_on(cart, request, Zoned::now().date()).await
    }

    /// Place an order with an explicit order date.
    ///
    /// # Errors
    ///
    /// See [`Self::place_order`].
    pub async fn place_order_on(
        &self,
        cart: &mut CartStore,
        request: &CheckoutRequest,
        date: Date,
    ) -> Result<Order, CheckoutError> {
        request.validate(cart)?;

        let _guard = BusyGuard::acquire(&self.busy).ok_or(CheckoutError::InProgress)?;

        debug!(latency_ms = self.latency.as_millis(), "placing order");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let order = Order {
            id: OrderId::generate(&mut rand::thread_rng()),
            items: cart.lines().to_vec(),
            total: *cart.totals().subtotal.amount(),
            date: format_order_date(date),
            address: request.address.trim().to_string(),
            payment_method: request.payment_method.trim().to_string(),
        };

        write_json(self.store.as_ref(), LAST_ORDER_KEY, &order)?;

        cart.clear_cart();

        info!(order = %order.id, total = %order.total, items = order.item_count(), "order placed");

        Ok(order)
    }

    /// The most recently placed order.
    pub fn last_order(&self) -> Option<Order> {
        last_order(self.store.as_ref())
    }
}

/// Read the most recently placed order from `store`.
///
/// A missing record, an unreadable store or a corrupt record all read as `None`.
pub fn last_order(store: &dyn KeyValueStore) -> Option<Order> {
    match read_json(store, LAST_ORDER_KEY) {
        Ok(order) => order,
        Err(err) => {
            warn!("failed to read last order: {err}");

            None
        }
    }
}

/// Format a date the way order confirmations show it, e.g. "October 16, 2026".
pub fn format_order_date(date: Date) -> String {
    date.strftime("%B %-d, %Y").to_string()
}

/// Holds the busy flag until dropped.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
