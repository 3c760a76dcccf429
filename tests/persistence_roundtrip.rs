//! Integration tests for cart persistence across restarts

use std::sync::Arc;

use rust_decimal::Decimal;
use testresult::TestResult;

use freshcart::{
    cart::CartStore,
    pricing::PricingPolicy,
    products::{Product, ProductId},
    session,
    storage::{CART_KEY, FileStore, KeyValueStore},
};

fn milk() -> Product {
    let mut milk = Product::new(1_i64, "Toned Milk", Decimal::new(2750, 2), "500 ml", "Dairy");
    milk.details.description = Some("Pasteurised toned milk".to_string());
    milk.stock = Some(120);
    milk
}

fn bread() -> Product {
    Product::new("bread", "Whole Wheat Bread", Decimal::from(45), "400 g", "Bakery")
}

#[test]
fn reopening_restores_the_same_lines() -> TestResult {
    let dir = tempfile::tempdir()?;

    let original = {
        let mut cart = CartStore::open(Arc::new(FileStore::new(dir.path())), PricingPolicy::default());

        cart.add_to_cart(&milk());
        cart.add_to_cart(&bread());
        cart.add_to_cart(&milk());
        cart.update_quantity(&ProductId::from("bread"), 3);

        cart.lines().to_vec()
    };

    let reopened = CartStore::open(Arc::new(FileStore::new(dir.path())), PricingPolicy::default());

    assert_eq!(reopened.lines(), original.as_slice());
    assert_eq!(reopened.quantity_of(&ProductId::Numeric(1)), 2);
    assert_eq!(*reopened.totals().subtotal.amount(), Decimal::from(190));

    Ok(())
}

#[test]
fn stored_cart_uses_documented_layout() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(FileStore::new(dir.path()));
    let mut cart = CartStore::open(store.clone(), PricingPolicy::default());

    cart.add_to_cart(&milk());

    let raw = store.get(CART_KEY)?.unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    assert_eq!(value[0]["quantity"], 1);
    assert_eq!(value[0]["product"]["id"], 1);
    assert_eq!(value[0]["product"]["price"], 27.5);
    assert_eq!(value[0]["product"]["description"], "Pasteurised toned milk");

    Ok(())
}

#[test]
fn corrupt_cart_file_starts_empty() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join(format!("{CART_KEY}.json")), "not json")?;

    let cart = CartStore::open(Arc::new(FileStore::new(dir.path())), PricingPolicy::default());

    assert!(cart.is_empty());

    Ok(())
}

#[test]
fn session_survives_restart() -> TestResult {
    let dir = tempfile::tempdir()?;

    session::sign_in(&FileStore::new(dir.path()), "admin@freshcart.test", "secret")?;

    let user = session::current_user(&FileStore::new(dir.path()));

    assert!(user.is_some_and(|user| user.is_admin()));

    Ok(())
}
