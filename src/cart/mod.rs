//! Cart
//!
//! [`CartStore`] is the single owner of the cart's lines. Every mutation goes
//! through it; after a change it writes the full line list to storage and
//! hands a fresh [`CartSnapshot`] to every subscriber.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    pricing::{CartTotals, PricingPolicy},
    products::{Product, ProductId},
    storage::SharedStore,
};

mod persistence;

use persistence::CartPersistence;

/// Shipping address used until the shopper sets one.
pub const DEFAULT_SHIPPING_ADDRESS: &str = "123 Main St, Mumbai, India";

/// Payment method used until the shopper picks one.
pub const DEFAULT_PAYMENT_METHOD: &str = "Cash on Delivery";

/// One product and how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// Create a line. A quantity of zero is raised to one.
    pub fn new(product: Product, quantity: u32) -> Self {
        Self {
            product,
            quantity: quantity.max(1),
        }
    }

    /// Product on this line
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Quantity, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Identifier of the product on this line
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }
}

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&CartSnapshot) + Send>;

/// Immutable view of the cart at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
    totals: CartTotals,
    shipping_address: String,
    payment_method: String,
}

impl CartSnapshot {
    /// Lines in insertion order
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Aggregates computed from [`Self::lines`]
    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Shipping address
    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Payment method label
    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    /// Returns true if there are no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Take the lines out of the snapshot.
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }
}

/// Owner and sole mutator of the cart.
pub struct CartStore {
    lines: Vec<CartLine>,
    shipping_address: String,
    payment_method: String,
    policy: PricingPolicy,
    persistence: Option<CartPersistence>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl CartStore {
    /// Create an empty cart that is never persisted.
    pub fn new(policy: PricingPolicy) -> Self {
        Self {
            lines: Vec::new(),
            shipping_address: DEFAULT_SHIPPING_ADDRESS.to_string(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            policy,
            persistence: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Open the cart persisted in `store`.
    ///
    /// Unreadable or corrupt state is logged and replaced by an empty cart.
    pub fn open(store: SharedStore, policy: PricingPolicy) -> Self {
        let persistence = CartPersistence::new(store);
        let lines = persistence.load();

        Self {
            lines,
            persistence: Some(persistence),
            ..Self::new(policy)
        }
    }

    /// Add one unit of `product`, creating its line if needed.
    pub fn add_to_cart(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(1);

            debug!(product = %product.id, quantity = line.quantity, "incremented cart line");
        } else {
            self.lines.push(CartLine::new(product.clone(), 1));

            debug!(product = %product.id, "added cart line");
        }

        self.commit();
    }

    /// Remove the line for `product_id`.
    ///
    /// Returns false, without persisting or notifying, if there was no such line.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.lines.len();

        self.lines.retain(|line| line.product_id() != product_id);

        let removed = self.lines.len() < len_before;

        if removed {
            debug!(product = %product_id, "removed cart line");

            self.commit();
        }

        removed
    }

    /// Set the quantity of an existing line.
    ///
    /// Zero or negative quantities remove the line. A product that is not in
    /// the cart is left out: this never adds a line. Returns true if the cart
    /// changed.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_from_cart(product_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let Some(line) = self.line_mut(product_id) else {
            return false;
        };

        if line.quantity == quantity {
            return false;
        }

        line.quantity = quantity;

        debug!(product = %product_id, quantity, "updated cart line quantity");

        self.commit();

        true
    }

    /// Add one to an existing line.
    ///
    /// Same as `update_quantity(id, current + 1)`, so for a product already in
    /// the cart it ends in the same state as [`Self::add_to_cart`].
    pub fn increase_quantity(&mut self, product_id: &ProductId) -> bool {
        match self.quantity_of(product_id) {
            0 => false,
            current => self.update_quantity(product_id, i64::from(current) + 1),
        }
    }

    /// Take one from an existing line, removing it when it reaches zero.
    pub fn decrease_quantity(&mut self, product_id: &ProductId) -> bool {
        match self.quantity_of(product_id) {
            0 => false,
            current => self.update_quantity(product_id, i64::from(current) - 1),
        }
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        self.lines.clear();

        debug!("cleared cart");

        self.commit();
    }

    /// Current lines plus freshly computed aggregates.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            totals: self.totals(),
            shipping_address: self.shipping_address.clone(),
            payment_method: self.payment_method.clone(),
        }
    }

    /// Aggregates for the current lines.
    pub fn totals(&self) -> CartTotals {
        self.policy.totals(&self.lines)
    }

    /// Price of one line under this cart's policy.
    pub fn line_price(&self, line: &CartLine) -> Money<'static, Currency> {
        self.policy.line_price(line)
    }

    /// Quantity of `product_id` in the cart, zero if absent.
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, CartLine::quantity)
    }

    /// Line for `product_id`, if present.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Pricing rules for this cart.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Shipping address used at checkout.
    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Payment method used at checkout.
    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    /// Change the shipping address.
    pub fn set_shipping_address(&mut self, address: impl Into<String>) {
        self.shipping_address = address.into();
        self.notify();
    }

    /// Change the payment method.
    pub fn set_payment_method(&mut self, method: impl Into<String>) {
        self.payment_method = method.into();
        self.notify();
    }

    /// Call `subscriber` with a new snapshot after every change.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&CartSnapshot) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        self.subscribers.push((id, Box::new(subscriber)));

        id
    }

    /// Stop notifying a subscriber. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let len_before = self.subscribers.len();

        self.subscribers.retain(|(existing, _)| *existing != id);

        self.subscribers.len() < len_before
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }

    fn commit(&mut self) {
        if let Some(persistence) = &self.persistence {
            persistence.save(&self.lines);
        }

        self.notify();
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }

        let snapshot = self.snapshot();

        for (_, subscriber) in &mut self.subscribers {
            subscriber(&snapshot);
        }
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .field("shipping_address", &self.shipping_address)
            .field("payment_method", &self.payment_method)
            .field("policy", &self.policy)
            .field("persistent", &self.persistence.is_some())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}
