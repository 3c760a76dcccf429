//! Products

use std::{collections::BTreeMap, convert::Infallible, fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product identifier.
///
/// Static catalogs use string slugs while the remote catalog hands out numeric
/// ids, so both shapes are accepted. A numeric id never equals a string id,
/// even when they print the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Numeric identifier
    Numeric(i64),

    /// String identifier
    Text(String),
}

impl ProductId {
    /// Parse an identifier typed by a person, preferring the numeric form.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        trimmed
            .parse::<i64>()
            .map_or_else(|_err| Self::Text(trimmed.to_string()), Self::Numeric)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl FromStr for ProductId {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier, unique within a catalog
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Unit price in major currency units
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Unit label, e.g. "1 kg"
    #[serde(default)]
    pub unit: String,

    /// Category label
    pub category: String,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Units in stock, when the catalog reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,

    /// Average review rating, when the catalog reports it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub rating: Option<Decimal>,

    /// Review count, when the catalog reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,

    /// Descriptive metadata
    #[serde(flatten)]
    pub details: ProductDetails,
}

impl Product {
    /// Create a product with no optional metadata.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
        unit: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            unit: unit.into(),
            category: category.into(),
            image: String::new(),
            stock: None,
            rating: None,
            reviews: None,
            details: ProductDetails::default(),
        }
    }

    /// Returns true if the product name or category contains `needle`, ignoring case.
    ///
    /// `needle` is expected to be lowercased already.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.category.to_lowercase().contains(needle)
    }

    /// Returns true if the product belongs to exactly the given category label.
    pub fn in_category(&self, category: &str) -> bool {
        self.category == category
    }
}

/// Optional descriptive metadata for a product.
///
/// Every field is optional because catalogs differ in what they provide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    /// Long-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nutritional facts, e.g. `calories -> 52` or `vitamins -> "C, A"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<BTreeMap<String, NutrientValue>>,

    /// Ingredient list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,

    /// Dietary notes, e.g. "Vegan"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_info: Option<String>,

    /// Packaging notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging_info: Option<String>,

    /// Storage instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_instructions: Option<String>,

    /// Allergen warnings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergens: Option<String>,

    /// Shelf life or best-before note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
}

impl ProductDetails {
    /// Returns true if no metadata is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single nutritional fact: a quantity or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NutrientValue {
    /// Numeric amount, e.g. grams or kcal
    Amount(f64),

    /// Descriptive value, e.g. `"C, A"`
    Text(String),
}

impl fmt::Display for NutrientValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(amount) => write!(f, "{amount}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_prefers_numeric_ids() {
        assert_eq!(ProductId::parse("42"), ProductId::Numeric(42));
        assert_eq!(ProductId::parse(" apples "), ProductId::Text("apples".to_string()));
    }

    #[test]
    fn numeric_and_text_ids_are_distinct() {
        assert_ne!(ProductId::from(7), ProductId::from("7"));
    }

    #[test]
    fn ids_round_trip_through_json_in_both_shapes() -> TestResult {
        assert_eq!(serde_json::to_string(&ProductId::from(3))?, "3");
        assert_eq!(serde_json::to_string(&ProductId::from("milk"))?, "\"milk\"");

        assert_eq!(serde_json::from_str::<ProductId>("3")?, ProductId::Numeric(3));
        assert_eq!(
            serde_json::from_str::<ProductId>("\"milk\"")?,
            ProductId::Text("milk".to_string())
        );

        Ok(())
    }

    #[test]
    fn deserializes_remote_shape_with_missing_optional_fields() -> TestResult {
        let json = r#"{
            "id": 12,
            "name": "Brown Eggs",
            "category": "Dairy",
            "price": 84.5,
            "image": "eggs.jpg",
            "stock": 30,
            "rating": 4.5,
            "reviews": 18,
            "nutritionalInfo": { "protein": 6.3 }
        }"#;

        let product: Product = serde_json::from_str(json)?;

        assert_eq!(product.id, ProductId::Numeric(12));
        assert_eq!(product.price, Decimal::new(845, 1));
        assert_eq!(product.unit, "");
        assert_eq!(product.stock, Some(30));
        assert_eq!(product.rating, Some(Decimal::new(45, 1)));
        assert!(product.details.description.is_none());
        assert_eq!(
            product
                .details
                .nutritional_info
                .as_ref()
                .and_then(|facts| facts.get("protein")),
            Some(&NutrientValue::Amount(6.3))
        );

        Ok(())
    }

    #[test]
    fn nutritional_info_accepts_numbers_and_text() -> TestResult {
        let json = r#"{
            "id": 3,
            "name": "Orange Juice",
            "category": "Beverages",
            "price": 120,
            "nutritionalInfo": { "calories": 47, "vitamins": "C, A" }
        }"#;

        let product: Product = serde_json::from_str(json)?;
        let facts = product.details.nutritional_info.unwrap_or_default();

        assert_eq!(facts.get("calories"), Some(&NutrientValue::Amount(47.0)));
        assert_eq!(
            facts.get("vitamins"),
            Some(&NutrientValue::Text("C, A".to_string()))
        );
        assert_eq!(
            facts.get("vitamins").map(ToString::to_string).as_deref(),
            Some("C, A")
        );

        let value = serde_json::to_value(&facts)?;

        assert_eq!(value["vitamins"], serde_json::json!("C, A"));
        assert_eq!(value["calories"], serde_json::json!(47.0));

        Ok(())
    }

    #[test]
    fn serializes_price_as_number_and_skips_absent_metadata() -> TestResult {
        let product = Product::new("apple", "Red Apple", Decimal::from(80), "1 kg", "Fruits");

        let value = serde_json::to_value(&product)?;

        assert_eq!(value["price"], serde_json::json!(80.0));
        assert!(value.get("description").is_none());
        assert!(value.get("stock").is_none());
        assert!(product.details.is_empty());

        Ok(())
    }

    #[test]
    fn search_ignores_case_but_category_is_exact() {
        let product = Product::new("apple", "Red Apple", Decimal::from(80), "1 kg", "Fruits");

        assert!(product.matches_search("apple"));
        assert!(product.matches_search("fruit"));
        assert!(!product.matches_search("milk"));
        assert!(product.in_category("Fruits"));
        assert!(!product.in_category("FRUITS"));
    }
}
