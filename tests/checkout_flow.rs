//! Integration tests for placing orders

use std::{sync::Arc, time::Duration};

use rust_decimal::Decimal;
use testresult::TestResult;

use freshcart::{
    cart::CartStore,
    checkout::{Checkout, CheckoutError, CheckoutRequest, DEFAULT_CHECKOUT_LATENCY, last_order},
    pricing::PricingPolicy,
    products::Product,
    storage::{CART_KEY, KeyValueStore, LAST_ORDER_KEY, MemoryStore, SharedStore},
};

fn cart_worth_260(store: SharedStore) -> CartStore {
    let mut cart = CartStore::open(store, PricingPolicy::default());
    let apples = Product::new("apples", "Red Apples", Decimal::from(80), "1 kg", "Fruits");
    let paneer = Product::new("paneer", "Fresh Paneer", Decimal::from(100), "200 g", "Dairy");

    cart.add_to_cart(&apples);
    cart.add_to_cart(&apples);
    cart.add_to_cart(&paneer);

    cart
}

#[tokio::test(start_paused = true)]
async fn checkout_records_order_and_empties_cart() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let mut cart = cart_worth_260(store.clone());
    let checkout = Checkout::new(store.clone(), DEFAULT_CHECKOUT_LATENCY);
    let request = CheckoutRequest::from_cart(&cart);

    let order = checkout.place_order(&mut cart, &request).await?;

    assert_eq!(order.total, Decimal::from(260));
    assert_eq!(order.item_count(), 3);
    assert!(order.id.as_str().starts_with("ORD-"));
    assert!(cart.is_empty());
    assert_eq!(cart.totals().total_items, 0);

    let recorded = last_order(store.as_ref());

    assert_eq!(recorded.map(|order| order.total), Some(Decimal::from(260)));

    let reopened = CartStore::open(store, PricingPolicy::default());

    assert!(reopened.is_empty(), "cleared cart should stay cleared");

    Ok(())
}

#[tokio::test]
async fn empty_address_is_rejected_without_side_effects() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let mut cart = cart_worth_260(store.clone());
    let stored_cart = store.get(CART_KEY)?;
    let checkout = Checkout::new(store.clone(), Duration::ZERO);

    let result = checkout
        .place_order(&mut cart, &CheckoutRequest::new("", "Cash on Delivery"))
        .await;

    assert!(matches!(result, Err(CheckoutError::MissingAddress)));
    assert_eq!(cart.totals().total_items, 3);
    assert_eq!(store.get(CART_KEY)?, stored_cart);
    assert_eq!(store.get(LAST_ORDER_KEY)?, None);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn checkout_waits_out_latency() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let mut cart = cart_worth_260(store.clone());
    let checkout = Checkout::new(store, Duration::from_secs(3));
    let request = CheckoutRequest::from_cart(&cart);
    let started = tokio::time::Instant::now();

    checkout.place_order(&mut cart, &request).await?;

    assert!(started.elapsed() >= Duration::from_secs(3));

    Ok(())
}

#[tokio::test]
async fn custom_address_and_payment_are_recorded() -> TestResult {
    let store = Arc::new(MemoryStore::new());
    let mut cart = cart_worth_260(store.clone());
    let checkout = Checkout::new(store, Duration::ZERO);

    cart.set_shipping_address("  42 Marine Drive, Mumbai  ");
    cart.set_payment_method("UPI");

    let request = CheckoutRequest::from_cart(&cart);
    let order = checkout.place_order(&mut cart, &request).await?;

    assert_eq!(order.address, "42 Marine Drive, Mumbai");
    assert_eq!(order.payment_method, "UPI");
    assert_eq!(checkout.last_order(), Some(order));

    Ok(())
}
