//! Catalog
//!
//! The catalog is a collaborator: the cart never asks where products come
//! from. [`browse`] and [`category_labels`] turn a slow, empty or failing
//! catalog into something the storefront can always render.

use std::{collections::BTreeMap, fmt::Debug};

use thiserror::Error;
use tracing::warn;

use crate::products::{Product, ProductId};

mod fixtures;

pub use fixtures::{StaticCatalog, parse_price};

/// Categories offered when the catalog cannot list its own.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["Dairy", "Bakery", "Grains", "Fruits", "Vegetables"];

/// Category label meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Products priced in different currencies
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two products share an identifier
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// Catalog backend could not answer
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Filter for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Only products in this category; `All` or `None` means every category
    pub category: Option<String>,

    /// Case-insensitive text matched against name or category
    pub search: Option<String>,
}

impl ProductQuery {
    /// Query matching every product.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a category.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to products whose name or category contains `text`.
    #[must_use]
    pub fn matching(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Returns true if `product` satisfies every filter in the query.
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty() && *category != ALL_CATEGORIES)
            .is_none_or(|category| product.in_category(category));

        let search_ok = self
            .search
            .as_deref()
            .map(|text| text.trim().to_lowercase())
            .filter(|text| !text.is_empty())
            .is_none_or(|text| product.matches_search(&text));

        category_ok && search_ok
    }
}

/// Source of products.
pub trait Catalog: Debug {
    /// Products matching `query`, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the backend cannot answer.
    fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogError>;

    /// Distinct category labels, sorted.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the backend cannot answer.
    fn categories(&self) -> Result<Vec<String>, CatalogError>;

    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the backend cannot answer.
    fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self
            .products(&ProductQuery::all())?
            .into_iter()
            .find(|product| &product.id == id))
    }
}

/// What a product listing can show.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    /// Products to display
    Loaded(Vec<Product>),

    /// The catalog answered, but nothing matched
    Empty,

    /// The catalog failed; the shopper may retry
    Unavailable {
        /// Human-readable reason
        message: String,
    },
}

impl CatalogState {
    /// Products to render, empty unless loaded.
    pub fn products(&self) -> &[Product] {
        match self {
            Self::Loaded(products) => products,
            Self::Empty | Self::Unavailable { .. } => &[],
        }
    }

    /// Returns true if retrying could change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Query the catalog, folding failures into [`CatalogState::Unavailable`].
pub fn browse(catalog: &dyn Catalog, query: &ProductQuery) -> CatalogState {
    match catalog.products(query) {
        Ok(products) if products.is_empty() => CatalogState::Empty,
        Ok(products) => CatalogState::Loaded(products),
        Err(err) => {
            warn!("failed to load products: {err}");

            CatalogState::Unavailable {
                message: format!("Failed to load products: {err}"),
            }
        }
    }
}

/// Category labels to offer, falling back to [`DEFAULT_CATEGORIES`].
pub fn category_labels(catalog: &dyn Catalog) -> Vec<String> {
    match catalog.categories() {
        Ok(categories) if !categories.is_empty() => categories,
        Ok(_) => default_categories(),
        Err(err) => {
            warn!("failed to load categories, using defaults: {err}");

            default_categories()
        }
    }
}

/// Group products by category label, keeping catalog order within a group.
pub fn group_by_category(products: &[Product]) -> BTreeMap<&str, Vec<&Product>> {
    let mut groups: BTreeMap<&str, Vec<&Product>> = BTreeMap::new();

    for product in products {
        groups
            .entry(product.category.as_str())
            .or_default()
            .push(product);
    }

    groups
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect()
}
