//! freshcart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartLine, CartSnapshot, CartStore, SubscriptionId},
    catalog::{
        Catalog, CatalogError, CatalogState, ProductQuery, StaticCatalog, browse, category_labels,
    },
    checkout::{Checkout, CheckoutError, CheckoutRequest, Order, OrderId, last_order},
    pricing::{CartTotals, PricingError, PricingPolicy, format_money},
    products::{NutrientValue, Product, ProductDetails, ProductId},
    receipt::{ReceiptError, write_cart, write_order},
    session::{Role, SessionError, UserMarker, current_user, sign_in, sign_out, sign_up},
    storage::{FileStore, KeyValueStore, MemoryStore, SharedStore, StorageError},
};
