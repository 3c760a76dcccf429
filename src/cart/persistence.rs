//! Cart persistence
//!
//! Writes are best effort: a failed save is logged and the in-memory cart
//! carries on. A failed or corrupt load yields an empty cart, while a single
//! unreadable line is skipped and the rest of the cart is kept.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{
    cart::CartLine,
    products::{Product, ProductId},
    storage::{CART_KEY, SharedStore, StorageError, read_json, write_json},
};

pub(super) struct CartPersistence {
    store: SharedStore,
}

impl CartPersistence {
    pub(super) fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub(super) fn load(&self) -> Vec<CartLine> {
        match self.try_load() {
            Ok(lines) => {
                debug!(lines = lines.len(), "rehydrated cart");

                lines
            }
            Err(err) => {
                error!("failed to load cart, starting empty: {err}");

                Vec::new()
            }
        }
    }

    pub(super) fn save(&self, lines: &[CartLine]) {
        if let Err(err) = write_json(self.store.as_ref(), CART_KEY, lines) {
            error!("failed to save cart: {err}");
        }
    }

    fn try_load(&self) -> Result<Vec<CartLine>, StorageError> {
        let raw: Vec<Value> = read_json(self.store.as_ref(), CART_KEY)?.unwrap_or_default();

        Ok(sanitize(decode_lines(raw)))
    }
}

/// Decode each stored line on its own so one bad entry cannot sink the cart.
fn decode_lines(raw: Vec<Value>) -> Vec<StoredLine> {
    let mut skipped = 0_usize;

    let stored = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<StoredLine>(value) {
            Ok(line) => Some(line),
            Err(err) => {
                skipped += 1;
                warn!("skipping unreadable cart line: {err}");

                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, "some stored cart lines could not be read");
    }

    stored
}

/// Raw line as found in storage, before the one-line-per-product rule is enforced.
#[derive(Deserialize)]
struct StoredLine {
    product: Product,
    quantity: i64,
}

/// Drop empty or negatively priced lines and fold duplicate products into the
/// first occurrence.
fn sanitize(stored: Vec<StoredLine>) -> Vec<CartLine> {
    let mut positions: FxHashMap<ProductId, usize> = FxHashMap::default();
    let mut lines: Vec<CartLine> = Vec::with_capacity(stored.len());
    let mut dropped = 0_usize;
    let mut merged = 0_usize;

    for StoredLine { product, quantity } in stored {
        let Ok(quantity) = u32::try_from(quantity) else {
            dropped += 1;
            continue;
        };

        if quantity == 0 || product.price.is_sign_negative() {
            dropped += 1;
            continue;
        }

        if let Some(line) = positions
            .get(&product.id)
            .and_then(|&position| lines.get_mut(position))
        {
            line.quantity = line.quantity.saturating_add(quantity);
            merged += 1;
            continue;
        }

        positions.insert(product.id.clone(), lines.len());
        lines.push(CartLine::new(product, quantity));
    }

    if dropped > 0 || merged > 0 {
        warn!(dropped, merged, "repaired stored cart lines");
    }

    lines
}
