//! Static catalog loaded from YAML

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError, ProductQuery},
    pricing::currency_from_code,
    products::{Product, ProductDetails, ProductId},
};

const BUNDLED_CATALOG: &str = include_str!("../../fixtures/products.yml");

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
struct ProductsFixture {
    products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
struct ProductFixture {
    id: ProductId,
    name: String,

    /// Price with currency, e.g. "80 INR"
    price: String,

    #[serde(default)]
    unit: String,
    category: String,

    #[serde(default)]
    image: String,

    #[serde(default)]
    stock: Option<u32>,

    #[serde(default)]
    rating: Option<Decimal>,

    #[serde(default)]
    reviews: Option<u32>,

    #[serde(flatten)]
    details: ProductDetails,
}

impl ProductFixture {
    fn into_product(self) -> Result<(Product, &'static Currency), CatalogError> {
        let (price, currency) = parse_price(&self.price)?;

        let product = Product {
            id: self.id,
            name: self.name,
            price,
            unit: self.unit,
            category: self.category,
            image: self.image,
            stock: self.stock,
            rating: self.rating,
            reviews: self.reviews,
            details: self.details,
        };

        Ok((product, currency))
    }
}

/// In-memory catalog, typically loaded from a YAML file.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
    currency: Option<&'static Currency>,
}

impl StaticCatalog {
    /// Build a catalog from products already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateProduct`] if two products share an id,
    /// or [`CatalogError::InvalidPrice`] if a price is negative.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();

        for (position, product) in products.iter().enumerate() {
            if product.price.is_sign_negative() {
                return Err(CatalogError::InvalidPrice(format!(
                    "{} costs {}",
                    product.id, product.price
                )));
            }

            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }

        Ok(Self {
            products,
            index,
            currency: None,
        })
    }

    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, a price cannot be parsed,
    /// prices mix currencies, or ids repeat.
    pub fn from_yaml_str(contents: &str) -> Result<Self, CatalogError> {
        let fixture: ProductsFixture = serde_norway::from_str(contents)?;
        let mut currency: Option<&'static Currency> = None;
        let mut products = Vec::with_capacity(fixture.products.len());

        for product_fixture in fixture.products {
            let (product, product_currency) = product_fixture.into_product()?;

            match currency {
                Some(existing) if existing != product_currency => {
                    return Err(CatalogError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        product_currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(product_currency),
            }

            products.push(product);
        }

        debug!(products = products.len(), "loaded catalog");

        Ok(Self {
            currency,
            ..Self::new(products)?
        })
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// The catalog that ships with the storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled YAML is invalid.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUNDLED_CATALOG)
    }

    /// Currency the catalog is priced in, if it was loaded from YAML.
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .products
            .iter()
            .filter(|product| query.matches(product))
            .cloned()
            .collect())
    }

    fn categories(&self) -> Result<Vec<String>, CatalogError> {
        let mut categories: Vec<String> = self
            .products
            .iter()
            .map(|product| product.category.clone())
            .collect();

        categories.sort_unstable();
        categories.dedup();

        Ok(categories)
    }

    fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self
            .index
            .get(id)
            .and_then(|&position| self.products.get(position))
            .cloned())
    }
}

/// Parse a price string (e.g., "2.99 GBP") into an amount and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if
/// the amount is not a non-negative decimal, or if the currency is unknown.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), CatalogError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, code] = parts.as_slice() else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(CatalogError::InvalidPrice(s.to_string()));
    }

    let currency =
        currency_from_code(code).map_err(|_err| CatalogError::UnknownCurrency((*code).to_string()))?;

    Ok((amount, currency))
}
